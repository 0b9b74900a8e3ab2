//! Pre-flight validation.
//!
//! Everything here runs before the first request is sent. Any failure is a
//! configuration error and the run stops without exporting outputs.

use apkdeploy_error::{DeployError, ErrorCategory, Result, configuration_error};
use apkdeploy_schema::{UploadMetadata, UploadTarget};
use reqwest::header::HeaderValue;
use std::path::Path;

/// Validates that every required metadata field is non-empty and that the
/// token can travel in a request header.
pub fn validate_metadata(metadata: &UploadMetadata) -> Result<()> {
    for (field, value) in metadata.required_fields() {
        if value.is_empty() {
            return Err(configuration_error(format!("no {field} parameter specified"))
                .with_context("field", field));
        }
    }
    HeaderValue::from_str(&metadata.api_token).map_err(|e| {
        DeployError::with_source(
            "api_token contains characters not allowed in a header",
            ErrorCategory::Configuration,
            e,
        )
        .with_context("field", "api_token")
    })?;
    Ok(())
}

/// Validates the reconciled target list.
pub fn validate_targets(targets: &[UploadTarget]) -> Result<()> {
    if targets.is_empty() {
        return Err(configuration_error("no package path specified"));
    }

    for (idx, target) in targets.iter().enumerate() {
        if target.package_path.is_empty() {
            return Err(configuration_error("empty package path in package list")
                .with_context("index", idx.to_string()));
        }
        require_path("package path", &target.package_path)?;

        if target.has_mapping() {
            require_path("mapping path", &target.mapping_path)?;
        }
    }
    Ok(())
}

/// Runs both checks, metadata first.
pub fn validate(metadata: &UploadMetadata, targets: &[UploadTarget]) -> Result<()> {
    validate_metadata(metadata)?;
    validate_targets(targets)
}

fn require_path(label: &str, path: &str) -> Result<()> {
    match Path::new(path).try_exists() {
        Ok(true) => Ok(()),
        Ok(false) => Err(configuration_error(format!("{label} does not exist"))
            .with_context("path", path)),
        Err(e) => Err(DeployError::with_source(
            format!("failed to check if {label} exists"),
            ErrorCategory::Configuration,
            e,
        )
        .with_context("path", path)),
    }
}
