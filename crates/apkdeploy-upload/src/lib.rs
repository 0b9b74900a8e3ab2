//! Upload executor.
//!
//! One target, one POST, one attempt. The credential travels in a dedicated
//! header. Only `201 Created` counts as success; anything else is a server
//! error carrying the status and whatever body came back.

use apkdeploy_error::{
    DeployError, ErrorCategory, Result, configuration_error, response_parse_error, server_error,
};
use apkdeploy_logging::Logger;
use apkdeploy_ports::Uploader;
use apkdeploy_request::upload_request;
use apkdeploy_schema::{UploadMetadata, UploadResult, UploadTarget};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

/// Header carrying the API token.
pub const TOKEN_HEADER: &str = "x-hockeyapptoken";

/// Endpoint for an upload: per-app when an identifier is known, otherwise the
/// anonymous endpoint that creates or matches the app from the package.
pub fn upload_url(api_base: &str, app_id: Option<&str>) -> Result<String> {
    let mut url = Url::parse(api_base).map_err(|e| {
        DeployError::with_source("invalid api base url", ErrorCategory::Configuration, e)
            .with_context("value", api_base)
    })?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| configuration_error("api base url cannot carry a path").with_context("value", api_base))?;
        segments.pop_if_empty().extend(["api", "2", "apps"]);
        match app_id {
            Some(id) if !id.is_empty() => {
                segments.extend([id, "app_versions", "upload"]);
            }
            _ => {
                segments.push("upload");
            }
        }
    }
    Ok(url.into())
}

pub fn is_upload_success(status: StatusCode) -> bool {
    status == StatusCode::CREATED
}

/// Decode the response body into an [`UploadResult`].
pub fn parse_upload_response(body: &str) -> Result<UploadResult> {
    serde_json::from_str::<UploadResult>(body)
        .map(UploadResult::normalized)
        .map_err(|e| {
            DeployError::with_source(
                "failed to parse response body",
                ErrorCategory::ResponseParse,
                e,
            )
            .with_context("body", body)
        })
}

/// Uploads over HTTP with a blocking reqwest client reused across targets.
pub struct HttpUploader<'a> {
    client: Client,
    api_base: String,
    log: &'a Logger,
}

impl<'a> HttpUploader<'a> {
    pub fn new(api_base: impl Into<String>, log: &'a Logger) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("apkdeploy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                DeployError::with_source("failed to build http client", ErrorCategory::Transport, e)
            })?;
        Ok(Self::with_client(client, api_base, log))
    }

    pub fn with_client(client: Client, api_base: impl Into<String>, log: &'a Logger) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            log,
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn log_response(&self, status: StatusCode, body: &str) {
        self.log.info("Response:");
        self.log.detail(format_args!("status code: {}", status.as_u16()));
        self.log.detail(format_args!("body: {body}"));
    }
}

impl Uploader for HttpUploader<'_> {
    fn upload(&self, target: &UploadTarget, metadata: &UploadMetadata) -> Result<UploadResult> {
        let url = upload_url(&self.api_base, metadata.app_id())?;
        let mut request = upload_request(&self.client, &url, target, metadata)?;

        let token = HeaderValue::from_str(&metadata.api_token).map_err(|e| {
            DeployError::with_source(
                "api token is not a valid header value",
                ErrorCategory::RequestConstruction,
                e,
            )
        })?;
        request
            .headers_mut()
            .insert(HeaderName::from_static(TOKEN_HEADER), token);

        self.log.info(format_args!("Performing request to {url}"));
        let response = self.client.execute(request).map_err(|e| {
            DeployError::with_source("performing request failed", ErrorCategory::Transport, e)
                .with_context("url", url.as_str())
        })?;

        let status = response.status();
        let body = response.text();

        if !is_upload_success(status) {
            let body = match body {
                Ok(body) => {
                    self.log_response(status, &body);
                    body
                }
                Err(e) => {
                    self.log.warn(format_args!("failed to read response body, error: {e}"));
                    String::new()
                }
            };
            return Err(server_error(status.as_u16(), body));
        }

        let body = body.map_err(|e| {
            DeployError::with_source("failed to read response body", ErrorCategory::Transport, e)
                .with_context("status", status.as_u16().to_string())
        })?;
        self.log.done("Request succeeded");
        self.log_response(status, &body);

        if body.trim().is_empty() {
            return Err(response_parse_error("empty response body")
                .with_context("status", status.as_u16().to_string()));
        }
        let result = parse_upload_response(&body)?;
        if let Some(url) = &result.public_url {
            self.log.done(format_args!("Public URL: {url}"));
        }
        if let Some(url) = &result.build_url {
            self.log.done(format_args!("Build (direct download) URL: {url}"));
        }
        if let Some(url) = &result.config_url {
            self.log.done(format_args!("Config URL: {url}"));
        }
        Ok(result)
    }
}
