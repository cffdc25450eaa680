//! Contact identifiers: email syntax checks and phone canonicalization.

use std::sync::LazyLock;

use regex::Regex;
use rlibphonenumber::{PhoneNumber, PhoneNumberFormat, PHONE_NUMBER_UTIL};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Digits with an optional leading `+` and the usual separators.
static PHONE_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9()\-. ]+$").expect("phone pattern is valid"));

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginKind {
    Email,
    Phone,
}

/// A syntactically valid contact identifier in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLogin {
    pub kind: LoginKind,
    pub value: String,
}

pub fn is_valid_email(input: &str) -> bool {
    EMAIL_RE.is_match(input.trim())
}

/// True when the input is made only of phone characters and carries a
/// plausible number of digits. Letters never qualify, so vanity numbers such
/// as `998243aaaa` are rejected here rather than translated.
pub fn looks_like_phone(input: &str) -> bool {
    let trimmed = input.trim();
    if !PHONE_SHAPE_RE.is_match(trimmed) {
        return false;
    }
    let digits = trimmed.chars().filter(|c| c.is_ascii_digit()).count();
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

/// Canonicalize phone input to E.164 (`+` followed by country code and
/// number), applying `default_region` when no country code is present.
/// Numbers that cannot exist in their region, such as a bare local fragment,
/// give `None`.
pub fn canonicalize_phone(input: &str, default_region: &str) -> Option<String> {
    if !looks_like_phone(input) {
        return None;
    }
    let trimmed = input.trim();
    let util = &*PHONE_NUMBER_UTIL;
    let parsed = util.parse(trimmed, default_region).ok()?;
    if !util.is_valid_number(&parsed) {
        return None;
    }
    let formatted = format_parsed_number(&parsed);
    let digits = formatted.chars().filter(|c| c.is_ascii_digit()).count();
    if digits > MAX_PHONE_DIGITS {
        return None;
    }
    Some(formatted)
}

fn format_parsed_number(number: &PhoneNumber) -> String {
    PHONE_NUMBER_UTIL
        .format(number, PhoneNumberFormat::E164)
        .into_owned()
}

/// Classify search input as an email or phone login, normalizing it.
pub fn parse_login(input: &str, default_region: &str) -> Option<ParsedLogin> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if is_valid_email(trimmed) {
        return Some(ParsedLogin {
            kind: LoginKind::Email,
            value: trimmed.to_lowercase(),
        });
    }
    canonicalize_phone(trimmed, default_region).map(|value| ParsedLogin {
        kind: LoginKind::Phone,
        value,
    })
}

/// Drop the store's SMS suffix from phone logins.
pub fn strip_sms_domain<'a>(login: &'a str, sms_domain: &str) -> &'a str {
    if sms_domain.is_empty() || login.len() < sms_domain.len() {
        return login;
    }
    let split = login.len() - sms_domain.len();
    match login.get(split..) {
        Some(suffix) if suffix.eq_ignore_ascii_case(sms_domain) => &login[..split],
        _ => login,
    }
}

/// Normalize a stored or user-supplied login for comparisons: SMS suffix
/// stripped, phones in E.164, everything else lowercased.
pub fn normalize_login(login: &str, sms_domain: &str, default_region: &str) -> String {
    let bare = strip_sms_domain(login.trim(), sms_domain);
    if !bare.contains('@') {
        if let Some(phone) = canonicalize_phone(bare, default_region) {
            return phone;
        }
    }
    bare.to_lowercase()
}

/// Email with every `.` removed from the local part. `None` for non-emails.
pub fn email_without_local_dots(email: &str) -> Option<String> {
    let (local, domain) = email.rsplit_once('@')?;
    Some(format!("{}@{}", local.replace('.', ""), domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("marc@expensify.com"));
        assert!(is_valid_email("barry.allen@expensify.com"));
        assert!(is_valid_email("  peter.parker@expensify.com "));
        assert!(!is_valid_email("marc@expensify"));
        assert!(!is_valid_email("marc"));
        assert!(!is_valid_email("marc @expensify.com"));
    }

    #[test]
    fn test_looks_like_phone() {
        assert!(looks_like_phone("5005550006"));
        assert!(looks_like_phone("+1 (800)324-3233"));
        assert!(looks_like_phone("800.324.3233"));
        assert!(!looks_like_phone("998243aaaa"));
        assert!(!looks_like_phone("12345"));
        assert!(!looks_like_phone("++15005550006"));
    }

    #[test]
    fn test_canonicalize_phone_adds_country_code() {
        assert_eq!(
            canonicalize_phone("2125550123", "US").as_deref(),
            Some("+12125550123")
        );
        assert_eq!(
            canonicalize_phone("+12125550123", "US").as_deref(),
            Some("+12125550123")
        );
        assert_eq!(
            canonicalize_phone("+1 (800)324-3233", "US").as_deref(),
            Some("+18003243233")
        );
        assert_eq!(canonicalize_phone("998243aaaa", "US"), None);
    }

    #[test]
    fn test_canonicalize_phone_rejects_impossible_numbers() {
        assert!(looks_like_phone("3243233"));
        assert_eq!(canonicalize_phone("3243233", "US"), None);
        assert_eq!(canonicalize_phone("0000000", "US"), None);
        assert_eq!(canonicalize_phone("555 1234", "US"), None);
        assert_eq!(parse_login("1234567", "US"), None);
    }

    #[test]
    fn test_parse_login() {
        let email = parse_login("Marc@Expensify.com", "US").unwrap();
        assert_eq!(email.kind, LoginKind::Email);
        assert_eq!(email.value, "marc@expensify.com");

        let phone = parse_login("+1 (800)324-3233", "US").unwrap();
        assert_eq!(phone.kind, LoginKind::Phone);
        assert_eq!(phone.value, "+18003243233");

        assert_eq!(parse_login("marc@expensify", "US"), None);
        assert_eq!(parse_login("", "US"), None);
    }

    #[test]
    fn test_strip_sms_domain() {
        assert_eq!(
            strip_sms_domain("+15005550006@expensify.sms", "@expensify.sms"),
            "+15005550006"
        );
        assert_eq!(
            strip_sms_domain("thor@expensify.com", "@expensify.sms"),
            "thor@expensify.com"
        );
        assert_eq!(strip_sms_domain("a", "@expensify.sms"), "a");
    }

    #[test]
    fn test_normalize_login() {
        assert_eq!(
            normalize_login("+15005550006@expensify.sms", "@expensify.sms", "US"),
            "+15005550006"
        );
        assert_eq!(
            normalize_login(" PeterParker@Expensify.com ", "@expensify.sms", "US"),
            "peterparker@expensify.com"
        );
    }

    #[test]
    fn test_email_without_local_dots() {
        assert_eq!(
            email_without_local_dots("barry.allen@expensify.com").as_deref(),
            Some("barryallen@expensify.com")
        );
        assert_eq!(email_without_local_dots("no-at-sign"), None);
    }
}
