//! Utility functions and helpers.

pub mod http;

use std::sync::OnceLock;

use regex::Regex;

/// Mask the middle of a phone number, keeping a 3-digit prefix and 4-digit suffix.
///
/// Numbers too short to keep both ends are masked entirely.
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().filter(|c| !c.is_whitespace()).collect();
    if chars.len() < 7 {
        return "*".repeat(chars.len());
    }
    let prefix: String = chars[..3].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}****{}", prefix, suffix)
}

/// Check a contact address has the `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email.trim()))
}
