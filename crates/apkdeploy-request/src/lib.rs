//! Builds the multipart POST for one upload target.
//!
//! Files are read completely while the body is assembled, so a package that
//! disappears or cannot be read fails here as a request-construction error
//! rather than halfway through the network call. No credential is attached;
//! that is the executor's job.

use apkdeploy_error::{DeployError, ErrorCategory, Result};
use apkdeploy_schema::{UploadMetadata, UploadTarget};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Request};
use std::fs::File;
use std::io;
use std::path::Path;

/// Form part carrying the package.
pub const PACKAGE_PART: &str = "ipa";
/// Form part carrying the mapping/symbol file.
pub const MAPPING_PART: &str = "dsym";

/// File parts for a target: the package always, the mapping when present.
pub fn target_files(target: &UploadTarget) -> Vec<(&'static str, &Path)> {
    let mut files = vec![(PACKAGE_PART, target.package())];
    if let Some(mapping) = target.mapping() {
        files.push((MAPPING_PART, mapping));
    }
    files
}

/// Assemble the multipart form from plain fields and file parts.
pub fn build_form(fields: Vec<(&'static str, String)>, files: &[(&'static str, &Path)]) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    for (name, path) in files {
        form = form.part(*name, file_part(path)?);
    }
    Ok(form)
}

fn file_part(path: &Path) -> Result<Part> {
    let mut file = File::open(path).map_err(|e| io_failure("failed to open file", path, e))?;
    let mut contents = Vec::new();
    io::copy(&mut file, &mut contents).map_err(|e| io_failure("failed to read file", path, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    Ok(Part::bytes(contents).file_name(file_name))
}

fn io_failure(message: &str, path: &Path, err: io::Error) -> DeployError {
    DeployError::with_source(message, ErrorCategory::RequestConstruction, err)
        .with_context("path", path.display().to_string())
}

/// Build a POST to `url` carrying `fields` and `files` as multipart/form-data.
pub fn create_request(
    client: &Client,
    url: &str,
    fields: Vec<(&'static str, String)>,
    files: &[(&'static str, &Path)],
) -> Result<Request> {
    let form = build_form(fields, files)?;
    client.post(url).multipart(form).build().map_err(|e| {
        DeployError::with_source("failed to create request", ErrorCategory::RequestConstruction, e)
            .with_context("url", url)
    })
}

/// The upload request for one target with the run's shared metadata.
pub fn upload_request(
    client: &Client,
    url: &str,
    target: &UploadTarget,
    metadata: &UploadMetadata,
) -> Result<Request> {
    create_request(client, url, metadata.form_fields(), &target_files(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &[u8]) -> String {
        let p = dir.path().join(name);
        std::fs::write(&p, contents).unwrap();
        p.to_string_lossy().into_owned()
    }

    #[test]
    fn target_files_without_mapping() {
        let t = UploadTarget::package_only("/tmp/app.apk");
        let files = target_files(&t);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "ipa");
    }

    #[test]
    fn target_files_with_mapping() {
        let t = UploadTarget::new("/tmp/app.apk", "/tmp/mapping.txt");
        let names: Vec<&str> = target_files(&t).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["ipa", "dsym"]);
    }

    #[test]
    fn request_is_a_multipart_post() {
        let dir = TempDir::new().unwrap();
        let apk = write(&dir, "app.apk", b"PK\x03\x04apk");
        let client = Client::new();
        let req = upload_request(
            &client,
            "https://rink.hockeyapp.net/api/2/apps/upload",
            &UploadTarget::package_only(apk),
            &UploadMetadata::default(),
        )
        .unwrap();

        assert_eq!(req.method(), reqwest::Method::POST);
        assert_eq!(req.url().path(), "/api/2/apps/upload");
        let ct = req.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap();
        assert!(ct.starts_with("multipart/form-data; boundary="));
        assert!(req.headers().get(AUTHORIZATION).is_none());
        assert!(req.headers().get("X-HockeyAppToken").is_none());
    }

    #[test]
    fn missing_package_is_a_request_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone.apk");
        let client = Client::new();
        let err = upload_request(
            &client,
            "https://rink.hockeyapp.net/api/2/apps/upload",
            &UploadTarget::package_only(missing.to_string_lossy()),
            &UploadMetadata::default(),
        )
        .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::RequestConstruction);
        assert!(err.message().contains("failed to open file"));
        assert_eq!(
            err.context_value("path"),
            Some(missing.display().to_string().as_str())
        );
    }

    #[test]
    fn missing_mapping_is_a_request_error() {
        let dir = TempDir::new().unwrap();
        let apk = write(&dir, "app.apk", b"apk");
        let mapping = dir.path().join("mapping.txt");
        let err = build_form(
            vec![],
            &target_files(&UploadTarget::new(apk, mapping.to_string_lossy())),
        )
        .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::RequestConstruction);
    }

    #[test]
    fn invalid_url_is_a_request_error() {
        let client = Client::new();
        let err = create_request(&client, "not a url", vec![], &[]).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::RequestConstruction);
    }
}
