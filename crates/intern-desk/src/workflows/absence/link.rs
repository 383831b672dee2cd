use url::Url;

use crate::workflows::error::ValidationError;

/// Whether `raw` names its own scheme: `scheme://...`, or `scheme:` followed
/// by something other than a port number (`javascript:`, `data:`).
fn has_explicit_scheme(raw: &str) -> bool {
    if raw.contains("://") {
        return true;
    }
    let Some((scheme, rest)) = raw.split_once(':') else {
        return false;
    };
    let is_scheme = scheme
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    let is_port = rest.chars().next().is_some_and(|c| c.is_ascii_digit());
    is_scheme && !is_port
}

/// Normalize an optional exam link. Blank input means "no link"; a missing
/// scheme is completed with `https://`; anything but http(s) is refused.
pub fn sanitize_link(raw: &str) -> Result<Option<String>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let candidate = if has_explicit_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let parsed = Url::parse(&candidate).map_err(|_| ValidationError::InvalidLink {
        link: trimmed.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(Some(parsed.to_string())),
        "http" | "https" => Err(ValidationError::InvalidLink {
            link: trimmed.to_string(),
        }),
        _ => Err(ValidationError::UnsafeLink {
            link: trimmed.to_string(),
        }),
    }
}
