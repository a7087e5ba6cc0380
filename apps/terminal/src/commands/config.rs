//! # Config Commands
//!
//! Company settings, the tax rate and payment methods.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::rejected;
use crate::error::{ApiError, ApiResult};
use crate::state::RegisterState;
use till_core::validation::validate_tax_rate_bps;
use till_core::{CompanySettings, CoreError, PaymentMethod, TaxRate, ValidationError};

/// Gets the company settings in effect.
pub fn get_settings(register: &RegisterState) -> CompanySettings {
    debug!("get_settings command");
    register.with_register(|r| r.settings.clone())
}

/// Fields the operator may change. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub currency_symbol: Option<String>,
    pub tax_name: Option<String>,
}

pub fn update_settings(
    register: &RegisterState,
    update: SettingsUpdate,
) -> ApiResult<CompanySettings> {
    debug!(update = ?update, "update_settings command");

    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(ApiError::validation("Store name is required"));
        }
    }

    Ok(register.with_register_mut(|r| {
        let settings = &mut r.settings;
        if let Some(name) = update.name {
            settings.name = name.trim().to_string();
        }
        if let Some(address) = update.address {
            settings.address = address;
        }
        if let Some(phone) = update.phone {
            settings.phone = phone;
        }
        if let Some(symbol) = update.currency_symbol {
            settings.currency_symbol = symbol;
        }
        if let Some(tax_name) = update.tax_name {
            settings.tax_name = tax_name;
        }
        info!(store = %settings.name, "Company settings updated");
        settings.clone()
    }))
}

/// Sets the tax rate, as a percentage, for settings and the open cart.
pub fn set_tax_rate(register: &RegisterState, percentage: f64) -> ApiResult<CompanySettings> {
    debug!(percentage = percentage, "set_tax_rate command");

    if !percentage.is_finite() || percentage < 0.0 {
        return Err(rejected(CoreError::Validation(ValidationError::Negative {
            field: "tax rate".to_string(),
        })));
    }
    let rate = TaxRate::from_percentage(percentage);
    validate_tax_rate_bps(rate.bps()).map_err(|e| rejected(e.into()))?;

    Ok(register.with_register_mut(|r| {
        r.settings.tax_rate = rate;
        r.cart.set_tax_rate(rate);
        info!(bps = rate.bps(), "Tax rate updated");
        r.settings.clone()
    }))
}

/// Payment methods the operator can choose at checkout.
pub fn list_payment_methods(register: &RegisterState) -> Vec<PaymentMethod> {
    debug!("list_payment_methods command");
    register.with_register(|r| r.catalog.active_payment_methods().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::{add_to_cart, get_cart};
    use crate::error::ErrorCode;
    use crate::state::{ConfigState, Register};
    use till_store::demo::demo_state;

    fn demo_register() -> RegisterState {
        RegisterState::new(Register::from_persisted(demo_state(), &ConfigState::default()).unwrap())
    }

    #[test]
    fn test_tax_rate_applies_to_cart() {
        let register = demo_register();
        add_to_cart(&register, "P001").unwrap();

        let settings = set_tax_rate(&register, 10.0).unwrap();
        assert_eq!(settings.tax_rate, TaxRate::from_bps(1000));

        let cart = get_cart(&register);
        assert_eq!(cart.tax_cents, 1_500);
        assert_eq!(cart.total_cents, 16_500);
    }

    #[test]
    fn test_tax_rate_bounds() {
        let register = demo_register();
        assert_eq!(
            set_tax_rate(&register, -1.0).unwrap_err().code,
            ErrorCode::ValidationError
        );
        assert_eq!(
            set_tax_rate(&register, 150.0).unwrap_err().code,
            ErrorCode::ValidationError
        );
        assert_eq!(get_settings(&register).tax_rate, TaxRate::from_bps(1800));
    }

    #[test]
    fn test_update_settings() {
        let register = demo_register();

        let settings = update_settings(
            &register,
            SettingsUpdate {
                name: Some("  Zapatería Lima ".into()),
                phone: Some("01-555-0000".into()),
                ..SettingsUpdate::default()
            },
        )
        .unwrap();
        assert_eq!(settings.name, "Zapatería Lima");
        assert_eq!(settings.phone, "01-555-0000");
        assert_eq!(settings.tax_name, "IGV");

        let err = update_settings(
            &register,
            SettingsUpdate {
                name: Some(" ".into()),
                ..SettingsUpdate::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_payment_methods_active_only() {
        let register = demo_register();
        register.with_register_mut(|r| {
            let mut methods = r.catalog.payment_methods().to_vec();
            methods[3].is_active = false;
            r.catalog.set_payment_methods(methods);
        });

        let names: Vec<String> = list_payment_methods(&register)
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names.len(), 3);
        assert!(!names.contains(&"Transferencia Bancaria".to_string()));
    }
}
