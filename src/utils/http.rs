use crate::error::{AvatarError, Result};
use std::time::Duration;

/// Get standard user agent string
pub fn get_user_agent() -> &'static str {
    concat!("qlogo-fetch/", env!("CARGO_PKG_VERSION"))
}

/// Build the shared HTTP client. Timeouts are applied per request since
/// probes and downloads use different limits.
pub fn build_client(user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(AvatarError::Client)
}
