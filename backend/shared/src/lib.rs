pub mod models;
pub mod validation;

pub use models::*;
pub use validation::{
    check_category_transition, sanitize_search_query, validate_part_data, PartChanges,
    ValidationError,
};
