//! Part Validation Module
//!
//! Pure validation for part payloads received by the API.
//!
//! # Overview
//!
//! 1. **Parts** - `validate_part_data` cleans an untyped JSON object into
//!    `PartChanges`, failing on the first invalid field
//! 2. **Transitions** - `check_category_transition` guards the
//!    review/cnc/hand/completed workflow
//! 3. **Sanitizers** - `sanitize_search_query` for free-text search
//!
//! Nothing here touches I/O or shared state.
//!
//! # Usage
//!
//! ```
//! use serde_json::json;
//! use shared::validation::validate_part_data;
//!
//! let raw = json!({"name": "  Drive Gear ", "type": "CNC", "amount": "2"});
//! let changes = validate_part_data(raw.as_object().unwrap()).unwrap();
//! assert_eq!(changes.name.as_deref(), Some("Drive Gear"));
//! assert_eq!(changes.amount, Some(2));
//! ```

pub mod error;
pub mod misc_info;
pub mod parts;
pub mod sanitizers;
pub mod transitions;
pub mod validators;

pub use error::ValidationError;
pub use misc_info::{MiscInfo, MiscItem, MiscObject, MiscScalar, MiscValue};
pub use parts::{validate_part_data, PartChanges, DEFAULT_AMOUNT};
pub use sanitizers::sanitize_search_query;
pub use transitions::{check_category_transition, status_after_transition};
pub use validators::is_valid_url;
