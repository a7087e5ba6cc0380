//! # Demo Data
//!
//! A small catalog for development and first runs: two sneaker lines, two
//! phones, four payment methods and the walk-in client.

use till_core::{
    Brand, Category, Client, CompanySettings, Money, PaymentMethod, Product, User, UserRole,
    DEFAULT_CLIENT_NAME,
};

use crate::snapshot::PersistedState;

/// Builds a complete first-run state: catalog, settings, empty ledger, no
/// open session.
pub fn demo_state() -> PersistedState {
    PersistedState {
        session: None,
        settings: Some(CompanySettings::default()),
        payment_methods: Some(payment_methods()),
        user: Some(User {
            id: "1".to_string(),
            name: "Admin User".to_string(),
            email: "admin@till.local".to_string(),
            role: UserRole::Admin,
            is_active: true,
        }),
        products: Some(products()),
        categories: Some(categories()),
        brands: Some(brands()),
        clients: Some(clients()),
        sales: Some(Vec::new()),
        session_history: Some(Vec::new()),
    }
}

pub fn payment_methods() -> Vec<PaymentMethod> {
    [
        ("1", "Efectivo"),
        ("2", "Tarjeta de Crédito/Débito"),
        ("3", "Yape / Plin"),
        ("4", "Transferencia Bancaria"),
    ]
    .into_iter()
    .map(|(id, name)| PaymentMethod {
        id: id.to_string(),
        name: name.to_string(),
        is_active: true,
    })
    .collect()
}

pub fn products() -> Vec<Product> {
    // (id, code, name, category, brand, buy, retail, wholesale, special, stock, min)
    const ROWS: [(&str, &str, &str, &str, &str, i64, i64, i64, i64, i64, i64); 4] = [
        ("1", "P001", "Nike Air Max", "1", "1", 80, 150, 130, 110, 50, 10),
        ("2", "P002", "Adidas Superstar", "1", "2", 60, 110, 95, 85, 35, 10),
        ("3", "P003", "Samsung Galaxy S23", "2", "3", 600, 900, 850, 800, 10, 15),
        ("4", "P004", "iPhone 14", "2", "4", 700, 1100, 1050, 980, 8, 5),
    ];

    ROWS.iter()
        .map(
            |&(id, code, name, category, brand, buy, retail, wholesale, special, stock, min)| {
                Product {
                    id: id.to_string(),
                    code: code.to_string(),
                    name: name.to_string(),
                    category_id: category.to_string(),
                    brand_id: brand.to_string(),
                    buy_price: Money::from_major(buy),
                    price_retail: Money::from_major(retail),
                    price_wholesale: Money::from_major(wholesale),
                    price_special: Money::from_major(special),
                    stock,
                    min_stock: min,
                    is_active: true,
                }
            },
        )
        .collect()
}

pub fn categories() -> Vec<Category> {
    [
        ("1", "Zapatillas", "#ff6b6b"),
        ("2", "Electrónica", "#4ecdc4"),
        ("3", "Accesorios", "#ffe66d"),
    ]
    .into_iter()
    .map(|(id, name, color)| Category {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        is_active: true,
    })
    .collect()
}

pub fn brands() -> Vec<Brand> {
    [
        ("1", "Nike", "#000000"),
        ("2", "Adidas", "#0051ba"),
        ("3", "Samsung", "#1428a0"),
        ("4", "Apple", "#555555"),
    ]
    .into_iter()
    .map(|(id, name, color)| Brand {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        is_active: true,
    })
    .collect()
}

pub fn clients() -> Vec<Client> {
    vec![
        Client {
            id: "1".to_string(),
            name: DEFAULT_CLIENT_NAME.to_string(),
            email: "-".to_string(),
            phone: "-".to_string(),
            tax_id: "00000000".to_string(),
            address: "-".to_string(),
            is_active: true,
        },
        Client {
            id: "2".to_string(),
            name: "Empresa ABC S.A.".to_string(),
            email: "contacto@abc.com".to_string(),
            phone: "555-1234".to_string(),
            tax_id: "20123456789".to_string(),
            address: "Av. Siempre Viva 123".to_string(),
            is_active: true,
        },
    ]
}
