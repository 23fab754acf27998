//! Field-level checks used by the request body `validate()` methods.
//!
//! Every check pushes a human-readable message onto `errors` instead of
//! returning early, so a single bad request reports all of its problems.

/// Validate email format (basic validation)
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Accepts absolute `http://` / `https://` URLs with a non-empty host.
pub fn is_valid_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) => rest
            .split('/')
            .next()
            .is_some_and(|host| !host.is_empty() && !host.contains(char::is_whitespace)),
        None => false,
    }
}

pub fn check_length(field: &str, value: &str, min: usize, max: usize, errors: &mut Vec<String>) {
    let len = value.chars().count();
    if len < min {
        errors.push(format!("{} must be at least {} characters", field, min));
    } else if len > max {
        errors.push(format!("{} must be at most {} characters", field, max));
    }
}

pub fn check_email(field: &str, value: &str, errors: &mut Vec<String>) {
    check_length(field, value, 6, 60, errors);
    if !is_valid_email(value) {
        errors.push(format!("{} is not a valid email address", field));
    }
}

pub fn check_url(field: &str, value: &str, errors: &mut Vec<String>) {
    if !is_valid_url(value) {
        errors.push(format!("{} is not a valid URL", field));
    }
}

pub fn check_non_negative(field: &str, value: i64, errors: &mut Vec<String>) {
    if value < 0 {
        errors.push(format!("{} must be greater than or equal to 0", field));
    }
}

/// Equity is a fraction of the company: `0.0 ..= 1.0`.
pub fn check_equity(field: &str, value: f64, errors: &mut Vec<String>) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(format!("{} must be between 0 and 1", field));
    }
}

/// Turn collected messages into the `Result` returned by `validate()`.
pub fn finish(errors: Vec<String>) -> Result<(), Vec<String>> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("test@example.com"));
        assert!(!is_valid_email("invalid"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@b."));
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("http://c1.img"));
        assert!(is_valid_url("https://example.com/logo.png"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("https://"));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn test_length_collects_messages() {
        let mut errors = Vec::new();
        check_length("handle", "", 1, 25, &mut errors);
        check_length("name", "ok", 1, 25, &mut errors);
        check_length("title", &"x".repeat(30), 1, 25, &mut errors);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("handle"));
        assert!(errors[1].starts_with("title"));
    }

    #[test]
    fn test_equity_bounds() {
        let mut errors = Vec::new();
        check_equity("equity", 0.0, &mut errors);
        check_equity("equity", 1.0, &mut errors);
        assert!(errors.is_empty());
        check_equity("equity", 1.5, &mut errors);
        assert_eq!(errors.len(), 1);
    }
}
