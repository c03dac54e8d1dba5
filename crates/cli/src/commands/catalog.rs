//! Catalog file checks.

use std::path::Path;

use parts_assist_agent::fetch::{Catalog, validate_catalog};
use serde_json::json;
use tracing::error;

use super::print_json;

/// Validate a catalog file, printing a summary.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or any validation
/// problem is found.
pub fn validate(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::from_path(path)?;

    let errors = validate_catalog(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    print_json(&json!({
        "path": path.display().to_string(),
        "valid": true,
        "parts": catalog.parts.len(),
        "symptoms": catalog.symptoms.len(),
    }))
}
