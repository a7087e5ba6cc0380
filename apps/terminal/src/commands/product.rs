//! # Product Commands
//!
//! Catalog lookup for the console.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Search Flow                                  │
//! │                                                                         │
//! │  Operator types "air"                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  search_products("air", category: None)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Case-insensitive substring over name and code                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<ProductDto> (display only, nothing is added to the cart)          │
//! │                                                                         │
//! │  Scanner input takes the exact-code path instead (cart::scan_code).    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{lookup_product, rejected};
use crate::error::{ApiError, ApiResult};
use crate::state::RegisterState;
use till_core::{Catalog, Product};

/// Product as shown to the operator, with category and brand names
/// resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub code: String,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub price_retail_cents: i64,
    pub price_wholesale_cents: i64,
    pub price_special_cents: i64,
    pub stock: i64,
    pub min_stock: i64,
    pub is_low_stock: bool,
    pub is_active: bool,
}

impl ProductDto {
    pub fn from_product(product: &Product, catalog: &Catalog) -> Self {
        ProductDto {
            id: product.id.clone(),
            code: product.code.clone(),
            name: product.name.clone(),
            category: catalog.category_name(&product.category_id).to_string(),
            brand: catalog.brand_name(&product.brand_id).to_string(),
            price_retail_cents: product.price_retail.cents(),
            price_wholesale_cents: product.price_wholesale.cents(),
            price_special_cents: product.price_special.cents(),
            stock: product.stock,
            min_stock: product.min_stock,
            is_low_stock: product.is_low_stock(),
            is_active: product.is_active,
        }
    }
}

/// Lists products whose name or code contains `query`. An empty query
/// lists the whole catalog.
pub fn search_products(
    register: &RegisterState,
    query: &str,
    category_id: Option<&str>,
) -> ApiResult<Vec<ProductDto>> {
    debug!(query = %query, category = ?category_id, "search_products command");

    register.with_register(|r| {
        let found = r.catalog.search(query, category_id).map_err(rejected)?;
        Ok(found
            .into_iter()
            .map(|p| ProductDto::from_product(p, &r.catalog))
            .collect())
    })
}

/// Gets a product by exact code or id.
pub fn get_product(register: &RegisterState, code_or_id: &str) -> ApiResult<ProductDto> {
    debug!(code = %code_or_id, "get_product command");

    register.with_register(|r| {
        lookup_product(&r.catalog, code_or_id)
            .map(|p| ProductDto::from_product(p, &r.catalog))
            .ok_or_else(|| ApiError::not_found("Product", code_or_id))
    })
}

/// Products at or below their reorder threshold.
pub fn get_low_stock(register: &RegisterState) -> Vec<ProductDto> {
    debug!("get_low_stock command");

    register.with_register(|r| {
        r.catalog
            .low_stock()
            .into_iter()
            .map(|p| ProductDto::from_product(p, &r.catalog))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::{ConfigState, Register};
    use till_store::demo::demo_state;

    fn demo_register() -> RegisterState {
        RegisterState::new(Register::from_persisted(demo_state(), &ConfigState::default()).unwrap())
    }

    #[test]
    fn test_search_by_name_and_code() {
        let register = demo_register();

        let by_name = search_products(&register, "air", None).unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].code, "P001");
        assert_eq!(by_name[0].category, "Zapatillas");
        assert_eq!(by_name[0].brand, "Nike");

        let by_code = search_products(&register, "p00", Some("2")).unwrap();
        let codes: Vec<&str> = by_code.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["P003", "P004"]);
    }

    #[test]
    fn test_search_never_touches_cart() {
        let register = demo_register();
        search_products(&register, "P001", None).unwrap();
        assert!(register.with_register(|r| r.cart.is_empty()));
    }

    #[test]
    fn test_get_product_by_code_or_id() {
        let register = demo_register();

        assert_eq!(get_product(&register, "P002").unwrap().name, "Adidas Superstar");
        assert_eq!(get_product(&register, "2").unwrap().code, "P002");
        assert_eq!(
            get_product(&register, "NOPE").unwrap_err().code,
            ErrorCode::NotFound
        );
    }

    #[test]
    fn test_low_stock() {
        let register = demo_register();
        let low = get_low_stock(&register);

        // P003 holds 10 against a minimum of 15.
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].code, "P003");
        assert!(low[0].is_low_stock);
    }
}
