//! Configuration for a deploy run.
//!
//! All inputs arrive as environment variables set by the CI system. The
//! resulting [`DeployConfig`] is built once and handed to whatever needs it;
//! nothing reads the environment after startup.

use apkdeploy_env::{EnvLookup, get_list, get_non_empty, get_var_or_empty, parse_toggle};
use apkdeploy_error::{DeployError, ErrorCategory, Result, configuration_error};
use apkdeploy_logging::{LogFormat, LogLevel, Logger, LoggingConfig};
use apkdeploy_reconcile::{PathInput, RawPaths};
use apkdeploy_schema::UploadMetadata;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://rink.hockeyapp.net";
pub const DEFAULT_ENVMAN: &str = "envman";

/// Input variable names.
pub mod vars {
    pub const APK_PATH: &str = "apk_path";
    pub const APK_PATH_LIST: &str = "apk_path_list";
    pub const MAPPING_PATH: &str = "mapping_path";
    pub const MAPPING_PATH_LIST: &str = "mapping_path_list";
    pub const USE_APK_PATH_LIST: &str = "use_apk_path_list";
    pub const API_TOKEN: &str = "api_token";
    pub const APP_ID: &str = "app_id";
    pub const NOTES: &str = "notes";
    pub const NOTES_TYPE: &str = "notes_type";
    pub const NOTIFY: &str = "notify";
    pub const STATUS: &str = "status";
    pub const MANDATORY: &str = "mandatory";
    pub const TAGS: &str = "tags";
    pub const COMMIT_SHA: &str = "commit_sha";
    pub const BUILD_SERVER_URL: &str = "build_server_url";
    pub const REPOSITORY_URL: &str = "repository_url";
    pub const API_BASE_URL: &str = "api_base_url";
    pub const LOG_LEVEL: &str = "APKDEPLOY_LOG_LEVEL";
    pub const LOG_FORMAT: &str = "APKDEPLOY_LOG_FORMAT";
    pub const NO_COLOR: &str = "NO_COLOR";
    pub const ENVMAN: &str = "APKDEPLOY_ENVMAN";
}

/// Everything a run needs, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    pub paths: PathInput,
    pub metadata: UploadMetadata,
    /// Scheme and host of the distribution service.
    pub api_base: String,
    pub logging: LoggingConfig,
    /// Program used to publish outputs.
    pub envman: String,
}

impl DeployConfig {
    /// Build the configuration from an environment lookup.
    ///
    /// Only malformed values fail here. Missing required values are left
    /// empty for `apkdeploy-validate` to report.
    pub fn from_env(env: &dyn EnvLookup) -> Result<Self> {
        let use_list = match get_non_empty(env, vars::USE_APK_PATH_LIST) {
            None => None,
            Some(raw) => Some(parse_toggle(&raw).ok_or_else(|| {
                configuration_error("use_apk_path_list must be true or false")
                    .with_context("value", raw)
            })?),
        };

        let single_package = get_var_or_empty(env, vars::APK_PATH).trim().to_string();
        let package_list = get_list(env, vars::APK_PATH_LIST);
        if use_list.is_none()
            && !package_list.is_empty()
            && single_package.contains(apkdeploy_env::LIST_SEPARATOR)
        {
            return Err(configuration_error(
                "apk_path holds a |-delimited list while apk_path_list is also set, use one or the other",
            )
            .with_context("apk_path", single_package));
        }

        let paths = PathInput::from_raw(RawPaths {
            single_package,
            package_list,
            single_mapping: get_var_or_empty(env, vars::MAPPING_PATH).trim().to_string(),
            mapping_list: get_list(env, vars::MAPPING_PATH_LIST),
            use_list,
        });

        let metadata = UploadMetadata {
            notes: get_var_or_empty(env, vars::NOTES),
            notes_type: get_var_or_empty(env, vars::NOTES_TYPE),
            notify: get_var_or_empty(env, vars::NOTIFY),
            status: get_var_or_empty(env, vars::STATUS),
            mandatory: get_var_or_empty(env, vars::MANDATORY),
            tags: get_var_or_empty(env, vars::TAGS),
            commit_sha: get_var_or_empty(env, vars::COMMIT_SHA),
            build_server_url: get_var_or_empty(env, vars::BUILD_SERVER_URL),
            repository_url: get_var_or_empty(env, vars::REPOSITORY_URL),
            app_id: get_non_empty(env, vars::APP_ID).map(|s| s.trim().to_string()),
            api_token: get_var_or_empty(env, vars::API_TOKEN),
        };

        let api_base = get_non_empty(env, vars::API_BASE_URL)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        parse_api_base(&api_base)?;

        Ok(Self {
            paths,
            metadata,
            api_base,
            logging: logging_from_env(env)?,
            envman: get_non_empty(env, vars::ENVMAN).unwrap_or_else(|| DEFAULT_ENVMAN.to_string()),
        })
    }

    /// Metadata as it goes on the wire.
    pub fn wire_metadata(&self) -> UploadMetadata {
        UploadMetadata {
            mandatory: normalize_mandatory(&self.metadata.mandatory),
            ..self.metadata.clone()
        }
    }

    /// Label/value pairs for the startup summary. The token is masked.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let m = &self.metadata;
        let mut rows = vec![("PathMode", self.paths.mode().to_string())];
        rows.extend(path_rows(&self.paths));
        rows.extend([
            ("APIToken", mask_secret(&m.api_token)),
            ("AppID", m.app_id.clone().unwrap_or_default()),
            ("Notes", m.notes.clone()),
            ("NotesType", m.notes_type.clone()),
            ("Notify", m.notify.clone()),
            ("Status", m.status.clone()),
            ("Tags", m.tags.clone()),
            ("CommitSHA", m.commit_sha.clone()),
            ("BuildServerURL", m.build_server_url.clone()),
            ("RepositoryURL", m.repository_url.clone()),
            ("Mandatory", m.mandatory.clone()),
            ("APIBaseURL", self.api_base.clone()),
        ]);
        rows
    }

    pub fn print(&self, log: &Logger) {
        log.info("Configs:");
        for (label, value) in self.summary() {
            log.detail(format_args!("- {label}: {value}"));
        }
    }
}

fn path_rows(paths: &PathInput) -> Vec<(&'static str, String)> {
    match paths {
        PathInput::Merged {
            single_package,
            package_list,
            single_mapping,
            mapping_list,
        }
        | PathInput::Toggle {
            single_package,
            package_list,
            single_mapping,
            mapping_list,
            ..
        } => vec![
            ("ApkPath", single_package.clone()),
            ("ApkPathList", package_list.join("|")),
            ("MappingPath", single_mapping.clone()),
            ("MappingPathList", mapping_list.join("|")),
        ],
        PathInput::Delimited {
            packages,
            mapping,
            mapping_list,
        } => vec![
            ("ApkPath", packages.clone()),
            ("MappingPath", mapping.clone()),
            ("MappingPathList", mapping_list.join("|")),
        ],
        PathInput::List {
            package_list,
            mapping_list,
        } => vec![
            ("ApkPathList", package_list.join("|")),
            ("MappingPathList", mapping_list.join("|")),
        ],
    }
}

fn logging_from_env(env: &dyn EnvLookup) -> Result<LoggingConfig> {
    let mut config = LoggingConfig::default();
    if let Some(raw) = get_non_empty(env, vars::LOG_LEVEL) {
        config.level = raw
            .parse::<LogLevel>()
            .map_err(|e| configuration_error(e).with_context("variable", vars::LOG_LEVEL))?;
    }
    if let Some(raw) = get_non_empty(env, vars::LOG_FORMAT) {
        config.format = raw
            .parse::<LogFormat>()
            .map_err(|e| configuration_error(e).with_context("variable", vars::LOG_FORMAT))?;
    }
    if env.get(vars::NO_COLOR).is_some() {
        config.colors = false;
    }
    Ok(config)
}

/// Parse and check the distribution service base URL.
pub fn parse_api_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| {
        DeployError::with_source("invalid api_base_url", ErrorCategory::Configuration, e)
            .with_context("value", raw)
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(configuration_error(format!("unsupported api_base_url scheme '{other}'"))
            .with_context("value", raw)),
    }
}

/// "1" or "true" means mandatory; anything else is sent as "0".
pub fn normalize_mandatory(raw: &str) -> String {
    let v = raw.trim();
    if v == "1" || v.eq_ignore_ascii_case("true") {
        "1".to_string()
    } else {
        "0".to_string()
    }
}

/// Show only the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}
