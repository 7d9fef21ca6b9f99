use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Product;

/// A sale counts as "upcoming" when it ends within this many days.
const UPCOMING_WINDOW_DAYS: f64 = 7.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiscountFilter {
    #[default]
    All,
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaleStatusFilter {
    #[default]
    All,
    Active,
    Ended,
    Upcoming,
}

// Criteria arrive straight from query parameters. Like the price bounds,
// a value outside the vocabulary is a no-op rather than an error, so both
// enums fall back to All instead of failing deserialization.

impl<'de> Deserialize<'de> for DiscountFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "yes" => DiscountFilter::Yes,
            "no" => DiscountFilter::No,
            _ => DiscountFilter::All,
        })
    }
}

impl<'de> Deserialize<'de> for SaleStatusFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "active" => SaleStatusFilter::Active,
            "ended" => SaleStatusFilter::Ended,
            "upcoming" => SaleStatusFilter::Upcoming,
            _ => SaleStatusFilter::All,
        })
    }
}

/// Filter criteria as they arrive in query parameters. Price bounds stay
/// strings on purpose: an empty or non-numeric bound is a no-op, never an
/// error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub name: String,
    pub min_price: String,
    pub max_price: String,
    pub discount: DiscountFilter,
    pub sale_status: SaleStatusFilter,
}

/// Dashboard summary counts, always computed over the unfiltered set.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_products: usize,
    pub products_on_sale: usize,
    pub upcoming_expirations: usize,
}

pub(crate) fn parse_sale_end(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Time until the sale ends, in fractional days. Negative once ended.
fn days_until(sale_end: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (sale_end - now).num_milliseconds() as f64 / 86_400_000.0
}

/// The "upcoming" predicate: sale still running and ending within seven
/// days, boundary inclusive. Shared by filtering and the dashboard.
fn ends_within_window(sale_end: &str, now: DateTime<Utc>) -> bool {
    parse_sale_end(sale_end).is_some_and(|end| {
        let days = days_until(end, now);
        days > 0.0 && days <= UPCOMING_WINDOW_DAYS
    })
}

fn matches_sale_status(product: &Product, wanted: SaleStatusFilter, now: DateTime<Utc>) -> bool {
    match wanted {
        SaleStatusFilter::All => true,
        // A product without a parseable sale_end can never satisfy a date
        // comparison, so it only passes "all".
        SaleStatusFilter::Active => {
            parse_sale_end(&product.sale_end).is_some_and(|end| end > now)
        }
        SaleStatusFilter::Ended => {
            parse_sale_end(&product.sale_end).is_some_and(|end| end <= now)
        }
        SaleStatusFilter::Upcoming => ends_within_window(&product.sale_end, now),
    }
}

fn parse_price_bound(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// Evaluate the filter over a product list. Pure, order-preserving, all
/// predicates ANDed.
pub fn filter_products(
    products: &[Product],
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
) -> Vec<Product> {
    let needle = criteria.name.to_lowercase();
    let min_price = parse_price_bound(&criteria.min_price);
    let max_price = parse_price_bound(&criteria.max_price);

    products
        .iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .filter(|p| min_price.map_or(true, |min| p.price >= min))
        .filter(|p| max_price.map_or(true, |max| p.price <= max))
        .filter(|p| match criteria.discount {
            DiscountFilter::All => true,
            DiscountFilter::Yes => p.discount > 0.0,
            DiscountFilter::No => p.discount == 0.0,
        })
        .filter(|p| matches_sale_status(p, criteria.sale_status, now))
        .cloned()
        .collect()
}

/// Dashboard counts over the unfiltered product set.
pub fn summarize(products: &[Product], now: DateTime<Utc>) -> Summary {
    Summary {
        total_products: products.len(),
        products_on_sale: products.iter().filter(|p| p.discount > 0.0).count(),
        upcoming_expirations: products
            .iter()
            .filter(|p| ends_within_window(&p.sale_end, now))
            .count(),
    }
}
