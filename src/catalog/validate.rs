use thiserror::Error;

use super::filter::parse_sale_end;
use crate::db::{CreateProductRequest, Product, ProductPatch};

/// Validation failures, one per rule. `code()` is the machine-readable
/// reason carried in 400 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,
    #[error("Price must be a positive number")]
    InvalidPrice,
    #[error("Discount must be between 0 and 100")]
    InvalidDiscountRange,
    #[error("Sale end date is required for discounted products")]
    SaleEndRequired,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NameRequired => "name_required",
            ValidationError::InvalidPrice => "invalid_price",
            ValidationError::InvalidDiscountRange => "invalid_discount_range",
            ValidationError::SaleEndRequired => "sale_end_required",
        }
    }
}

fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    Ok(())
}

fn check_price(price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ValidationError::InvalidPrice);
    }
    Ok(())
}

fn check_discount(discount: f64) -> Result<(), ValidationError> {
    if !discount.is_finite() || !(0.0..=100.0).contains(&discount) {
        return Err(ValidationError::InvalidDiscountRange);
    }
    Ok(())
}

/// discount > 0 requires a non-empty, parseable sale end timestamp.
fn check_sale_window(discount: f64, sale_end: &str) -> Result<(), ValidationError> {
    if discount > 0.0 && parse_sale_end(sale_end).is_none() {
        return Err(ValidationError::SaleEndRequired);
    }
    Ok(())
}

/// Validate a create request before any store mutation.
pub fn validate_new(req: &CreateProductRequest) -> Result<(), ValidationError> {
    check_name(&req.name)?;
    check_price(req.price)?;
    let discount = req.discount.unwrap_or(0.0);
    check_discount(discount)?;
    check_sale_window(discount, req.sale_end.as_deref().unwrap_or(""))
}

/// Validate a partial update against the stored product. Only supplied
/// fields are checked on their own, but the sale-window invariant must
/// hold on the merged result: raising the discount while the stored
/// sale_end is still empty is rejected.
pub fn validate_patch(current: &Product, patch: &ProductPatch) -> Result<(), ValidationError> {
    if let Some(name) = &patch.name {
        check_name(name)?;
    }
    if let Some(price) = patch.price {
        check_price(price)?;
    }
    if let Some(discount) = patch.discount {
        check_discount(discount)?;
    }

    let merged_discount = patch.discount.unwrap_or(current.discount);
    let merged_sale_end = patch.sale_end.as_deref().unwrap_or(&current.sale_end);
    check_sale_window(merged_discount, merged_sale_end)
}
