//! Names of the keys published to the environment store.

pub const STATUS: &str = "HOCKEYAPP_DEPLOY_STATUS";
pub const PUBLIC_URL: &str = "HOCKEYAPP_DEPLOY_PUBLIC_URL";
pub const BUILD_URL: &str = "HOCKEYAPP_DEPLOY_BUILD_URL";
pub const CONFIG_URL: &str = "HOCKEYAPP_DEPLOY_CONFIG_URL";
pub const PUBLIC_URL_LIST: &str = "HOCKEYAPP_DEPLOY_PUBLIC_URL_LIST";
pub const BUILD_URL_LIST: &str = "HOCKEYAPP_DEPLOY_BUILD_URL_LIST";
pub const CONFIG_URL_LIST: &str = "HOCKEYAPP_DEPLOY_CONFIG_URL_LIST";

/// Separator used when a list is published as a single value.
pub const LIST_SEPARATOR: &str = "|";
