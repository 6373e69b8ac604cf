use once_cell::sync::Lazy;
use regex::Regex;

pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Normalises an email for storage and lookup.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Password policy: minimum length plus upper-case, lower-case and digit.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("ada@example.com"));
        assert!(validate_email("first.last+tag@sub.example.io"));
        assert!(!validate_email("ada@example"));
        assert!(!validate_email("ada example.com"));
        assert!(!validate_email("@example.com"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("Secret123").is_ok());
        assert!(validate_password("Sh0rt").unwrap_err().contains("at least 8"));
        assert!(validate_password("secret123").unwrap_err().contains("uppercase"));
        assert!(validate_password("SECRET123").unwrap_err().contains("lowercase"));
        assert!(validate_password("SecretPass").unwrap_err().contains("number"));
    }
}
