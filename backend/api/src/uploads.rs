//! CAD file uploads
//!
//! Only STEP files are accepted. A stored file is named after the part it
//! belongs to plus the client's file name reduced to `[A-Za-z0-9._-]`, so it
//! always lands directly inside the upload directory.

use std::path::Path;

use crate::error::ApiError;

pub const ALLOWED_EXTENSIONS: [&str; 2] = ["step", "stp"];

/// Whether `file_name` ends in an allowed extension, ignoring case
pub fn has_allowed_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Name an upload is stored under: `<part id>_<sanitized client name>`
pub fn stored_file_name(part_id: i64, original: &str) -> Result<String, ApiError> {
    // Some browsers send the full client-side path
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if !has_allowed_extension(base) {
        return Err(ApiError::validation(
            "file",
            format!(
                "file must have one of these extensions: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ),
        ));
    }

    let safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    Ok(format!("{}_{}", part_id, safe.trim_start_matches('.')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_extension_allow_list_ignores_case() {
        assert!(has_allowed_extension("bracket.step"));
        assert!(has_allowed_extension("bracket.STP"));
        assert!(has_allowed_extension("gear.v2.Step"));
        assert!(!has_allowed_extension("gear.stl"));
        assert!(!has_allowed_extension("step"));
        assert!(!has_allowed_extension(".step"));
        assert!(!has_allowed_extension(""));
    }

    #[test]
    fn test_stored_name_is_prefixed_and_sanitized() {
        assert_eq!(stored_file_name(7, "Bracket.STEP").unwrap(), "7_Bracket.STEP");
        assert_eq!(
            stored_file_name(3, "drive gear (rev 2).stp").unwrap(),
            "3_drive_gear__rev_2_.stp"
        );
        assert_eq!(
            stored_file_name(3, "C:\\cad\\frame.step").unwrap(),
            "3_frame.step"
        );
        assert_eq!(stored_file_name(3, "../../etc/x.step").unwrap(), "3_x.step");
    }

    #[test]
    fn test_rejects_other_extensions() {
        let err = stored_file_name(1, "panel.dwg").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(stored_file_name(1, "model.step.exe").is_err());
        assert!(stored_file_name(1, "").is_err());
    }
}
