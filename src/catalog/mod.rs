//! Pure product logic: the filter/query evaluator, the sale-window
//! classifier behind it, and the validation rules shared by create and
//! update. Nothing in here touches the store or the clock on its own;
//! callers pass `now` in so classification is re-evaluated per request.

pub mod filter;
pub mod validate;

pub use filter::{filter_products, summarize, FilterCriteria, Summary};
pub use validate::{validate_new, validate_patch, ValidationError};
