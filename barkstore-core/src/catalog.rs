//! Read-only product catalog.
//!
//! Products are reference data sourced outside the storefront: either the
//! built-in set or a JSON file named in the configuration. They are loaded
//! once at startup and never mutated.

use barkstore_sdk::objects::Product;
use compact_str::ToCompactString;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog validation error: {0}")]
    Validation(String),
}

/// In-memory, read-only catalog.
///
/// Stored as a `Vec` and searched linearly: the product count is small
/// enough that a scan beats hashing.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// The catalog shipped with the storefront.
    pub fn builtin() -> Self {
        Self {
            products: builtin_products(),
        }
    }

    /// Load a catalog from a JSON file holding an array of products.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let products: Vec<Product> = serde_json::from_str(&raw)?;
        let catalog = Self { products };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for (i, product) in self.products.iter().enumerate() {
            if product.price < Decimal::ZERO {
                return Err(CatalogError::Validation(format!(
                    "product {} has a negative price",
                    product.id
                )));
            }
            if self.products[..i].iter().any(|p| p.id == product.id) {
                return Err(CatalogError::Validation(format!(
                    "duplicate product id {}",
                    product.id
                )));
            }
        }
        Ok(())
    }

    /// Look up one product by id.
    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// All products, in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn product(
    id: u32,
    name: &str,
    price: Decimal,
    description: &str,
    category: &str,
    tags: [&str; 2],
    stock: u32,
    rating: f32,
) -> Product {
    Product {
        id,
        name: name.to_compact_string(),
        price,
        image: format!("/images/{id}.webp").into(),
        description: description.to_string(),
        category: Some(category.to_compact_string()),
        tags: tags.iter().map(|t| t.to_compact_string()).collect(),
        stock: Some(stock),
        rating: Some(rating),
    }
}

fn builtin_products() -> Vec<Product> {
    vec![
        product(
            1,
            "Product 1",
            dec!(1.00),
            "High-quality product with exceptional features for everyday use.",
            "Basic",
            ["affordable", "essential"],
            100,
            4.5,
        ),
        product(
            2,
            "Product 2",
            dec!(10.00),
            "Premium product designed for superior performance and durability.",
            "Premium",
            ["premium", "performance"],
            50,
            4.8,
        ),
        product(
            3,
            "Product 3",
            dec!(2.00),
            "Affordable option with reliable quality for budget-conscious shoppers.",
            "Budget",
            ["affordable", "reliable"],
            150,
            4.2,
        ),
        product(
            4,
            "Product 4",
            dec!(3.00),
            "Value-for-money product with great features and performance.",
            "Value",
            ["value", "features"],
            80,
            4.4,
        ),
        product(
            5,
            "Product 5",
            dec!(5.00),
            "Versatile product suitable for a variety of uses and needs.",
            "Versatile",
            ["versatile", "multi-use"],
            60,
            4.6,
        ),
        product(
            6,
            "Product 6",
            dec!(8.00),
            "Top-notch product with advanced features and modern design.",
            "Advanced",
            ["advanced", "modern"],
            30,
            4.7,
        ),
    ]
}
