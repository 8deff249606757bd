//! Link classification and validation for navigation entries.
//!
//! Menu links are either app routes (`/swap`) or external URLs, which must
//! point at an allow-listed domain.

use crate::config::ALLOWED_LINK_DOMAINS;

/// Where a navigation link leads.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    /// Route handled by the exchange app itself
    Internal(String),
    /// Absolute URL opened outside the app
    External(String),
}

/// Errors that can occur during link validation.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkValidationError {
    /// Link is empty
    Empty,
    /// External link doesn't use http:// or https://
    InvalidProtocol,
    /// External link has no host
    NoHost,
    /// Domain is not in the allowed list
    DomainNotAllowed(String),
}

impl std::fmt::Display for LinkValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "link is empty"),
            Self::InvalidProtocol => write!(f, "link must be a route or an http(s) URL"),
            Self::NoHost => write!(f, "link has no host"),
            Self::DomainNotAllowed(domain) => write!(f, "domain '{}' is not allowed", domain),
        }
    }
}

/// Classify a link without validating it.
pub fn classify_link(href: &str) -> LinkTarget {
    let href = href.trim();
    if href.starts_with('/') && !href.starts_with("//") {
        LinkTarget::Internal(href.to_string())
    } else {
        LinkTarget::External(href.to_string())
    }
}

/// Validate a menu link.
///
/// Checks:
/// 1. Link is not empty
/// 2. Internal routes are accepted as-is
/// 3. External links use http:// or https:// and have a host
/// 4. Host is in the allowed domains list
pub fn validate_link(href: &str) -> Result<LinkTarget, LinkValidationError> {
    if href.trim().is_empty() {
        return Err(LinkValidationError::Empty);
    }

    let target = classify_link(href);
    let LinkTarget::External(url) = &target else {
        return Ok(target);
    };

    let url_lower = url.to_lowercase();
    if !url_lower.starts_with("http://") && !url_lower.starts_with("https://") {
        return Err(LinkValidationError::InvalidProtocol);
    }

    let host = extract_host(&url_lower).ok_or(LinkValidationError::NoHost)?;
    if !is_domain_allowed(&host) {
        return Err(LinkValidationError::DomainNotAllowed(host));
    }

    Ok(target)
}

/// Extract host from a lowercased URL
fn extract_host(url: &str) -> Option<String> {
    let without_protocol = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;

    // Host ends at the first path, query or fragment delimiter
    let host_part = without_protocol.split(['/', '?', '#']).next()?;
    let host = host_part.split(':').next()?;
    let host = host.strip_prefix("www.").unwrap_or(host);

    if host.is_empty() {
        return None;
    }

    Some(host.to_string())
}

/// Check if a domain or one of its parents is allowed
fn is_domain_allowed(host: &str) -> bool {
    ALLOWED_LINK_DOMAINS
        .iter()
        .any(|allowed| host == *allowed || host.ends_with(&format!(".{}", allowed)))
}
