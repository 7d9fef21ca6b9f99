use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The single admin identity. Seeded once at startup, immutable after.
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

/// A flat product record. `sale_end` is the empty string when the product
/// has no sale window; `created_at` is set at creation and never changes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub discount: f64,
    pub sale_end: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub sale_end: Option<String>,
}

/// Partial update: only supplied fields are validated and replaced.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub discount: Option<f64>,
    pub sale_end: Option<String>,
}

impl ProductPatch {
    /// Replace the supplied fields on `product`. `id` and `created_at`
    /// are never touched.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(discount) = self.discount {
            product.discount = discount;
        }
        if let Some(sale_end) = &self.sale_end {
            product.sale_end = sale_end.clone();
        }
    }

}
