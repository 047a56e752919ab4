//! The `lookup` template global, a stand-in for Ansible's `lookup('env', …)`
//! that templates in this corpus are written against.

use crate::error::ConfigError;

/// The prefix used to recognise a lookup-domain failure when it resurfaces as
/// a [`minijinja::Error`] from a failed render.
pub const INVALID_DOMAIN_PREFIX: &str = "invalid lookup domain ";

/// Reads a process environment variable by name, simulating Ansible's
/// `lookup('env', …)`.
///
/// Only the `env` domain is supported; any other domain is a configuration
/// error (surfaced to callers as a [`minijinja::Error`] so it can propagate
/// through template rendering, then reclassified by
/// [`classify_lookup_error`]).
pub fn lookup(domain: String, key: String) -> Result<String, minijinja::Error> {
    if domain != "env" {
        return Err(minijinja::Error::new(
            minijinja::ErrorKind::InvalidOperation,
            format!("{INVALID_DOMAIN_PREFIX}{domain:?}"),
        ));
    }

    Ok(std::env::var(&key).unwrap_or_default())
}

/// Recovers a [`ConfigError::InvalidLookupDomain`] from a render error, if
/// that's what caused it.
///
/// [`lookup`] can only communicate failure through [`minijinja::Error`], so
/// this walks back the message it produced to recover the structured error
/// the rest of the crate works with.
pub fn classify_lookup_error(err: &minijinja::Error) -> Option<ConfigError> {
    if err.kind() != minijinja::ErrorKind::InvalidOperation {
        return None;
    }

    let detail = err.detail()?;
    let domain = detail.strip_prefix(INVALID_DOMAIN_PREFIX)?;
    let domain = domain.trim_matches('"').to_owned();

    Some(ConfigError::InvalidLookupDomain { domain })
}
