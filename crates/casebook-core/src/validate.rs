//! Field format validators for case intake.
//!
//! ## Summary
//! Pure checks for the identity/contact fields collected on a case. These
//! only decide well-formedness; required-vs-optional policy lives with the
//! operations that call them.

use crate::constants::{CIBIL_MAX, CIBIL_MIN};

/// A customer phone number: exactly 10 ASCII digits.
#[must_use]
pub fn is_ten_digit_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}

/// Minimal email shape check: one `@` with a non-empty local part and a
/// domain containing a dot, no whitespace anywhere.
#[must_use]
pub fn is_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((head, tld)) => !head.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Aadhaar number: exactly 12 ASCII digits.
#[must_use]
pub fn is_aadhaar(aadhaar: &str) -> bool {
    aadhaar.len() == 12 && aadhaar.bytes().all(|b| b.is_ascii_digit())
}

/// PAN: five uppercase letters, four digits, one uppercase letter.
#[must_use]
pub fn is_pan(pan: &str) -> bool {
    let bytes = pan.as_bytes();
    bytes.len() == 10
        && bytes[..5].iter().all(u8::is_ascii_uppercase)
        && bytes[5..9].iter().all(u8::is_ascii_digit)
        && bytes[9].is_ascii_uppercase()
}

/// CIBIL score range check, inclusive on both ends.
#[must_use]
pub fn is_cibil_score(score: i32) -> bool {
    (CIBIL_MIN..=CIBIL_MAX).contains(&score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_valid() {
        assert!(is_ten_digit_phone("9876543210"));
    }

    #[test]
    fn test_phone_rejects_short_and_alpha() {
        assert!(!is_ten_digit_phone("98765"));
        assert!(!is_ten_digit_phone("98765abc10"));
        assert!(!is_ten_digit_phone("98765432100"));
    }

    #[test]
    fn test_email_valid() {
        assert!(is_email("rohit@example.com"));
        assert!(is_email("a.b+c@mail.co.in"));
    }

    #[test]
    fn test_email_invalid() {
        assert!(!is_email("no-at-sign"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("user@"));
        assert!(!is_email("user@nodot"));
        assert!(!is_email("user@.com"));
        assert!(!is_email("user name@example.com"));
    }

    #[test]
    fn test_aadhaar() {
        assert!(is_aadhaar("123456789012"));
        assert!(!is_aadhaar("12345678901"));
        assert!(!is_aadhaar("12345678901a"));
    }

    #[test]
    fn test_pan() {
        assert!(is_pan("ABCDE1234F"));
        assert!(!is_pan("abcde1234f"));
        assert!(!is_pan("ABCD1234F"));
        assert!(!is_pan("ABCDE12345"));
    }

    #[test]
    fn test_cibil_bounds() {
        assert!(is_cibil_score(300));
        assert!(is_cibil_score(900));
        assert!(is_cibil_score(750));
        assert!(!is_cibil_score(299));
        assert!(!is_cibil_score(901));
    }
}
