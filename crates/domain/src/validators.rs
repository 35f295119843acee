use crate::DomainError;

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Lower-cases a domain name and strips a single trailing root dot.
pub fn normalize_domain(name: &str) -> String {
    let trimmed = name.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    trimmed.to_ascii_lowercase()
}

/// Normalizes and validates a domain name for use as a query or rule pattern.
pub fn validate_domain_name(name: &str) -> Result<String, DomainError> {
    let normalized = normalize_domain(name);

    if normalized.is_empty() {
        return Err(DomainError::InvalidDomainName(
            "domain name cannot be empty".to_string(),
        ));
    }
    if normalized.len() > MAX_DOMAIN_LEN {
        return Err(DomainError::InvalidDomainName(format!(
            "'{normalized}' exceeds {MAX_DOMAIN_LEN} characters"
        )));
    }

    for label in normalized.split('.') {
        if label.is_empty() {
            return Err(DomainError::InvalidDomainName(format!(
                "'{normalized}' contains an empty label"
            )));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "label '{label}' exceeds {MAX_LABEL_LEN} characters"
            )));
        }
        if !label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(DomainError::InvalidDomainName(format!(
                "label '{label}' contains invalid characters"
            )));
        }
    }

    Ok(normalized)
}

/// Returns true if `pattern` equals `name` or is a dot-separated suffix of it.
///
/// Both arguments must already be normalized.
/// - "example.com" matches "example.com" and "ads.example.com"
/// - "example.com" does NOT match "badexample.com"
#[inline]
pub fn matches_suffix(pattern: &str, name: &str) -> bool {
    if name == pattern {
        return true;
    }
    name.len() > pattern.len()
        && name.ends_with(pattern)
        && name.as_bytes()[name.len() - pattern.len() - 1] == b'.'
}

/// Number of labels in a normalized name. Used to rank pattern specificity.
#[inline]
pub fn label_count(name: &str) -> usize {
    if name.is_empty() {
        0
    } else {
        name.split('.').count()
    }
}
