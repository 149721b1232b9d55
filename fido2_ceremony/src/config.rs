//! Central configuration for the fido2_ceremony crate

use std::{env, sync::LazyLock, time::Duration};

/// Route prefix shared by the ceremony endpoints and navigation targets
///
/// Default: "/auth"
pub static FIDO2_ROUTE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("FIDO2_ROUTE_PREFIX").unwrap_or_else(|_| "/auth".to_string()));

/// Timeout applied to every HTTP request made by [`crate::CeremonyClient`]
///
/// Read from `FIDO2_HTTP_TIMEOUT` in seconds. Default: 30
pub static FIDO2_HTTP_TIMEOUT: LazyLock<Duration> = LazyLock::new(|| {
    Duration::from_secs(parse_timeout_secs(env::var("FIDO2_HTTP_TIMEOUT").ok().as_deref()))
});

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

fn parse_timeout_secs(value: Option<&str>) -> u64 {
    match value {
        None => DEFAULT_HTTP_TIMEOUT_SECS,
        Some(v) => match v.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                tracing::warn!(
                    "Invalid FIDO2_HTTP_TIMEOUT: {}. Using default '{}'",
                    v,
                    DEFAULT_HTTP_TIMEOUT_SECS
                );
                DEFAULT_HTTP_TIMEOUT_SECS
            }
        },
    }
}

/// Paths of the relying-party endpoints and the pages a flow navigates to.
///
/// All paths are relative to the server base URL handed to
/// [`crate::CeremonyClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub registration_options: String,
    pub registration_verify: String,
    pub authentication_options: String,
    pub authentication_verify: String,
    /// Where a verified registration lands
    pub login_page: String,
    pub authentication_success_page: String,
    pub authentication_error_page: String,
}

impl Endpoints {
    /// Build the endpoint set under an arbitrary route prefix.
    pub fn with_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        Self {
            registration_options: format!("{prefix}/generate-registration-options"),
            registration_verify: format!("{prefix}/verify-registration-response"),
            authentication_options: format!("{prefix}/generate-authentication-options"),
            authentication_verify: format!("{prefix}/verify-authentication-response"),
            login_page: format!("{prefix}/login"),
            authentication_success_page: format!("{prefix}/authenticate_fido2_success"),
            authentication_error_page: format!("{prefix}/authenticate_fido2_error"),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::with_prefix(FIDO2_ROUTE_PREFIX.as_str())
    }
}
