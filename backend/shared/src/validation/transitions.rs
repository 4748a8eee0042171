//! Category workflow
//!
//! Parts move between workflow columns along a fixed set of edges:
//!
//! ```text
//! review    -> cnc | hand | completed
//! cnc       -> completed
//! hand      -> completed
//! completed -> cnc | hand
//! ```

use super::error::ValidationError;
use crate::models::PartCategory::{self, Cnc, Completed, Hand, Review};
use crate::models::PartStatus;

/// Allowed `(from, to)` category edges
pub const ALLOWED_TRANSITIONS: [(PartCategory, PartCategory); 7] = [
    (Review, Cnc),
    (Review, Hand),
    (Review, Completed),
    (Cnc, Completed),
    (Hand, Completed),
    (Completed, Cnc),
    (Completed, Hand),
];

fn allowed_targets(from: PartCategory) -> impl Iterator<Item = PartCategory> {
    ALLOWED_TRANSITIONS
        .into_iter()
        .filter(move |(source, _)| *source == from)
        .map(|(_, target)| target)
}

fn is_allowed(from: PartCategory, to: PartCategory) -> bool {
    allowed_targets(from).any(|target| target == to)
}

/// Check that a part may move from `current` to `next`
///
/// When `part_type` is given (and non-empty), a part may only enter the
/// `cnc` or `hand` column matching its type. Returns the parsed target
/// category on success.
pub fn check_category_transition(
    current: &str,
    next: &str,
    part_type: Option<&str>,
) -> Result<PartCategory, ValidationError> {
    let from: PartCategory = current
        .parse()
        .map_err(|_| ValidationError::new(format!("Invalid current category: {}", current)))?;

    let to = next
        .parse::<PartCategory>()
        .ok()
        .filter(|to| is_allowed(from, *to))
        .ok_or_else(|| {
            ValidationError::new(format!("Cannot transition from {} to {}", current, next))
        })?;

    if let (Some(required), Some(part_type)) =
        (to.required_type(), part_type.filter(|t| !t.is_empty()))
    {
        if part_type != required.as_str() {
            return Err(ValidationError::new(format!(
                "Part type {} cannot be moved to {} category",
                part_type, next
            )));
        }
    }

    Ok(to)
}

/// Status a part takes on after moving between categories
pub fn status_after_transition(from: PartCategory, to: PartCategory) -> PartStatus {
    match (from, to) {
        (_, Completed) => PartStatus::Completed,
        (Completed, _) => PartStatus::InProgress,
        _ => PartStatus::Approved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_no_self_loops() {
        for category in PartCategory::ALL {
            assert!(!is_allowed(category, category), "{category} loops onto itself");
        }
    }

    #[test]
    fn test_allowed_targets() {
        let from_review: Vec<_> = allowed_targets(Review).collect();
        assert_eq!(from_review, vec![Cnc, Hand, Completed]);
        let from_cnc: Vec<_> = allowed_targets(Cnc).collect();
        assert_eq!(from_cnc, vec![Completed]);
        let from_completed: Vec<_> = allowed_targets(Completed).collect();
        assert_eq!(from_completed, vec![Cnc, Hand]);
    }

    #[test]
    fn test_reverting_completed_part() {
        assert_eq!(check_category_transition("completed", "cnc", Some("cnc")), Ok(Cnc));
        let err = check_category_transition("completed", "cnc", Some("hand")).unwrap_err();
        assert_eq!(err.message, "Part type hand cannot be moved to cnc category");
        assert_eq!(err.field, None);
    }

    #[test]
    fn test_illegal_edges() {
        let err = check_category_transition("cnc", "hand", None).unwrap_err();
        assert_eq!(err.message, "Cannot transition from cnc to hand");
        assert!(check_category_transition("review", "review", None).is_err());
        assert!(check_category_transition("review", "archived", None).is_err());
    }

    #[test]
    fn test_unknown_current_category() {
        let err = check_category_transition("archived", "cnc", None).unwrap_err();
        assert_eq!(err.message, "Invalid current category: archived");
    }

    #[test]
    fn test_status_after_transition() {
        assert_eq!(status_after_transition(Review, Cnc), PartStatus::Approved);
        assert_eq!(status_after_transition(Hand, Completed), PartStatus::Completed);
        assert_eq!(status_after_transition(Completed, Hand), PartStatus::InProgress);
    }

    #[test]
    fn test_part_type_only_checked_for_workshop_columns() {
        assert!(check_category_transition("review", "completed", Some("hand")).is_ok());
        assert!(check_category_transition("review", "hand", Some("")).is_ok());
        assert!(check_category_transition("review", "hand", Some("CNC")).is_err());
    }
}
