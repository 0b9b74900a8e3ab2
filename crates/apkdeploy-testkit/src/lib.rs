//! Shared test support.
//!
//! Keeping fixtures and doubles in one workspace-only crate avoids copy-paste
//! across the upload, engine and CLI tests.

pub mod http;
pub mod uploaders;

pub use http::{RecordedRequest, StubResponse, StubServer};
pub use uploaders::{ScriptedUploader, result_with_public};

use apkdeploy_config::vars;
use apkdeploy_env::MapEnv;
use apkdeploy_schema::UploadMetadata;
use std::fs;
use std::path::Path;

/// Minimal zip local-file header so fixtures look like an APK to a human.
pub const FAKE_APK_BYTES: &[u8] = b"PK\x03\x04fake-apk-contents";

/// Write a fake package under `dir` and return its path as a string.
pub fn write_package(dir: &Path, name: &str) -> String {
    write_file(dir, name, FAKE_APK_BYTES)
}

/// Write a fake mapping file under `dir` and return its path as a string.
pub fn write_mapping(dir: &Path, name: &str) -> String {
    write_file(dir, name, b"com.example.App -> a:\n")
}

fn write_file(dir: &Path, name: &str, contents: &[u8]) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

/// Metadata with every required field filled in.
pub fn valid_metadata() -> UploadMetadata {
    UploadMetadata {
        api_token: "test-token-1234".into(),
        notes_type: "0".into(),
        notify: "2".into(),
        status: "2".into(),
        mandatory: "0".into(),
        ..UploadMetadata::default()
    }
}

/// Environment for a single-package run against `api_base`.
pub fn valid_env(package_path: &str, api_base: &str) -> MapEnv {
    MapEnv::from_pairs(valid_env_pairs(package_path, api_base))
}

/// The same variables as [`valid_env`], for feeding a child process.
pub fn valid_env_pairs(package_path: &str, api_base: &str) -> Vec<(&'static str, String)> {
    vec![
        (vars::APK_PATH, package_path.to_string()),
        (vars::API_TOKEN, "test-token-1234".to_string()),
        (vars::NOTES_TYPE, "0".to_string()),
        (vars::NOTIFY, "2".to_string()),
        (vars::STATUS, "2".to_string()),
        (vars::MANDATORY, "0".to_string()),
        (vars::API_BASE_URL, api_base.to_string()),
    ]
}

/// Write an executable stand-in for `envman` that appends `key=value` lines
/// to `store.env` next to it. Returns the script path and the store path.
#[cfg(unix)]
pub fn write_fake_envman(dir: &Path) -> (String, std::path::PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let store = dir.join("store.env");
    let script = dir.join("envman");
    fs::write(
        &script,
        format!(
            "#!/bin/sh\n[ \"$1\" = add ] && [ \"$2\" = --key ] || exit 9\nprintf '%s=%s\\n' \"$3\" \"$(cat)\" >> '{}'\n",
            store.display()
        ),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    (script.to_string_lossy().into_owned(), store)
}

/// Parse a store written by [`write_fake_envman`]. A missing store is empty.
pub fn read_store(store: &Path) -> Vec<(String, String)> {
    fs::read_to_string(store)
        .unwrap_or_default()
        .lines()
        .filter_map(|l| l.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
