//! Normalization and validation of Senegalese mobile numbers.
//!
//! Mobile money init calls require a wallet number in its nine-digit
//! national form. User input arrives in many shapes (`77 123 45 67`,
//! `+221771234567`, `00 221 77-123-45-67`); everything is normalized here,
//! before any network call is made.

use crate::error::ValidationError;

/// Operator prefixes recognized for mobile wallets
pub const MOBILE_PREFIXES: [&str; 5] = ["70", "75", "76", "77", "78"];

/// Length of a national mobile number
const NATIONAL_LEN: usize = 9;

/// Country calling code, stripped when present
const COUNTRY_CODE: &str = "221";

/// Normalize a raw phone input to its nine-digit national form
///
/// Accepts spaces, dots, dashes and parentheses as separators, an optional
/// `+` or `00` international marker, and an optional `221` country code.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPhone`] when the input contains
/// unexpected characters, is not nine digits long after stripping the
/// country code, or does not start with a recognized operator prefix.
pub fn normalize(raw: &str) -> Result<String, ValidationError> {
    let mut digits = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if !matches!(c, ' ' | '-' | '.' | '(' | ')' | '+') {
            return Err(ValidationError::InvalidPhone(raw.to_string()));
        }
    }

    let national = if let Some(rest) = digits.strip_prefix("00221") {
        rest
    } else if digits.len() == NATIONAL_LEN + COUNTRY_CODE.len() {
        digits.strip_prefix(COUNTRY_CODE).unwrap_or(digits.as_str())
    } else {
        digits.as_str()
    };

    if national.len() != NATIONAL_LEN
        || !MOBILE_PREFIXES.iter().any(|p| national.starts_with(p))
    {
        return Err(ValidationError::InvalidPhone(raw.to_string()));
    }

    Ok(national.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;

    #[test]
    fn spaced_national_number_normalizes() {
        assert_eq!(normalize("77 123 45 67").unwrap(), "771234567");
    }

    #[test]
    fn bare_country_code_is_stripped() {
        assert_eq!(normalize("221771234567").unwrap(), "771234567");
    }

    #[test]
    fn plus_prefixed_international_form() {
        assert_eq!(normalize("+221 78 000 11 22").unwrap(), "780001122");
    }

    #[test]
    fn double_zero_international_form() {
        assert_eq!(normalize("00221701234567").unwrap(), "701234567");
    }

    #[test]
    fn too_short_number_is_rejected() {
        assert!(normalize("12345").is_err());
    }

    #[test]
    fn unknown_operator_prefix_is_rejected() {
        assert!(normalize("691234567").is_err());
    }

    #[test]
    fn letters_are_rejected() {
        assert!(normalize("77 12E 45 67").is_err());
    }

    #[test]
    fn error_carries_the_original_input() {
        let err = normalize("12345").unwrap_err();
        assert_eq!(err, ValidationError::InvalidPhone("12345".to_string()));
    }
}
