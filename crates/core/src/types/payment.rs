//! Payment form normalisation and validation.
//!
//! Input is normalised the way the payment form formats it while typing
//! (card number grouped in fours, expiry as `MM/YY`, digits-only CVV,
//! letters-only cardholder name) and then validated field by field.

use core::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::form::FormErrors;
use super::status::PaymentMethod;

/// Number of digits in a card number.
pub const CARD_NUMBER_LENGTH: usize = 16;

/// Minimum cardholder name length after trimming.
pub const MIN_CARDHOLDER_NAME_LENGTH: usize = 3;

/// Fields of the payment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentField {
    CardNumber,
    CardholderName,
    ExpiryDate,
    Cvv,
}

/// Payment form as submitted by the customer.
///
/// `Debug` redacts the card number and CVV.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub cardholder_name: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl fmt::Debug for PaymentForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentForm")
            .field("card_number", &"[REDACTED]")
            .field("cardholder_name", &self.cardholder_name)
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &"[REDACTED]")
            .field("payment_method", &self.payment_method)
            .finish()
    }
}

/// A payment form that passed validation.
///
/// The card number carries no spaces.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedPayment {
    pub card_number: String,
    pub cardholder_name: String,
    pub expiry_date: String,
    pub cvv: String,
    pub payment_method: PaymentMethod,
}

impl fmt::Debug for ValidatedPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedPayment")
            .field("card_number", &"[REDACTED]")
            .field("cardholder_name", &self.cardholder_name)
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &"[REDACTED]")
            .field("payment_method", &self.payment_method)
            .finish()
    }
}

impl PaymentForm {
    /// Apply input formatting to every field.
    #[must_use]
    pub fn normalize(self) -> Self {
        let card: String = strip_whitespace(&self.card_number)
            .chars()
            .take(CARD_NUMBER_LENGTH)
            .collect();

        Self {
            card_number: format_card_number(&card),
            cardholder_name: sanitize_cardholder_name(&self.cardholder_name),
            expiry_date: format_expiry_date(&self.expiry_date),
            cvv: sanitize_cvv(&self.cvv),
            payment_method: self.payment_method,
        }
    }

    /// Validate the form as of `today`.
    ///
    /// # Errors
    ///
    /// Returns one message per invalid field.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidatedPayment, FormErrors<PaymentField>> {
        let mut errors = FormErrors::new();

        let card_number = strip_whitespace(&self.card_number);
        if let Some(message) = card_number_error(&card_number) {
            errors.add(PaymentField::CardNumber, message);
        }
        if let Some(message) = cardholder_name_error(&self.cardholder_name) {
            errors.add(PaymentField::CardholderName, message);
        }
        if let Some(message) = expiry_date_error(&self.expiry_date, today) {
            errors.add(PaymentField::ExpiryDate, message);
        }
        if let Some(message) = cvv_error(&self.cvv) {
            errors.add(PaymentField::Cvv, message);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedPayment {
            card_number,
            cardholder_name: self.cardholder_name.clone(),
            expiry_date: self.expiry_date.clone(),
            cvv: self.cvv.clone(),
            payment_method: self.payment_method,
        })
    }
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Group a card number into blocks of four separated by spaces.
///
/// Whitespace in the input is ignored; other characters are kept as-is.
#[must_use]
pub fn format_card_number(value: &str) -> String {
    let cleaned: Vec<char> = value.chars().filter(|c| !c.is_whitespace()).collect();
    cleaned
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format an expiry date as `MM/YY` from whatever digits were entered.
///
/// Fewer than two digits are returned unformatted; digits past the fourth
/// are dropped.
#[must_use]
pub fn format_expiry_date(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 2 {
        return digits;
    }
    let (month, rest) = digits.split_at(2);
    let year: String = rest.chars().take(2).collect();
    format!("{month}/{year}")
}

/// Keep at most four digits of a CVV.
#[must_use]
pub fn sanitize_cvv(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).take(4).collect()
}

/// Keep only ASCII letters and whitespace of a cardholder name.
#[must_use]
pub fn sanitize_cardholder_name(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect()
}

fn card_number_error(cleaned: &str) -> Option<&'static str> {
    if cleaned.is_empty() {
        Some("Card number is required")
    } else if cleaned.chars().count() != CARD_NUMBER_LENGTH {
        Some("Card number must be 16 digits")
    } else if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        Some("Card number must contain only digits")
    } else {
        None
    }
}

fn cardholder_name_error(name: &str) -> Option<&'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Some("Cardholder name is required")
    } else if trimmed.chars().count() < MIN_CARDHOLDER_NAME_LENGTH {
        Some("Name must be at least 3 characters")
    } else {
        None
    }
}

fn expiry_date_error(expiry: &str, today: NaiveDate) -> Option<&'static str> {
    if expiry.is_empty() {
        return Some("Expiry date is required");
    }

    let mut parts = expiry.split('/');
    let month = parts.next().unwrap_or_default();
    let year = parts.next().unwrap_or_default();
    if month.len() != 2 || year.len() != 2 {
        return Some("Invalid format (MM/YY)");
    }

    let (Some(month), Some(year)) = (parse_two_digits(month), parse_two_digits(year)) else {
        return Some("Invalid month");
    };

    let current_year = today.year().rem_euclid(100);
    let current_month = i32::try_from(today.month()).unwrap_or(1);

    if !(1..=12).contains(&month) {
        Some("Invalid month")
    } else if year < current_year || (year == current_year && month < current_month) {
        Some("Card has expired")
    } else {
        None
    }
}

/// Parse a two-character numeric field.
///
/// Returns `None` when the field is not numeric.
fn parse_two_digits(value: &str) -> Option<i32> {
    if value.chars().all(|c| c.is_ascii_digit()) {
        value.parse().ok()
    } else {
        None
    }
}

fn cvv_error(cvv: &str) -> Option<&'static str> {
    let len = cvv.len();
    if cvv.is_empty() {
        Some("CVV is required")
    } else if !(3..=4).contains(&len) || !cvv.chars().all(|c| c.is_ascii_digit()) {
        Some("CVV must be 3 or 4 digits")
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn valid_form() -> PaymentForm {
        PaymentForm {
            card_number: "4242 4242 4242 4242".to_string(),
            cardholder_name: "Ada Lovelace".to_string(),
            expiry_date: "12/27".to_string(),
            cvv: "123".to_string(),
            payment_method: PaymentMethod::CreditCard,
        }
    }

    #[test]
    fn test_format_card_number_groups_in_fours() {
        assert_eq!(format_card_number("4242424242424242"), "4242 4242 4242 4242");
        assert_eq!(format_card_number("42 424"), "4242 4");
        assert_eq!(format_card_number(""), "");
    }

    #[test]
    fn test_format_expiry_date() {
        assert_eq!(format_expiry_date("1"), "1");
        assert_eq!(format_expiry_date("12"), "12/");
        assert_eq!(format_expiry_date("1a2/2 7"), "12/27");
        assert_eq!(format_expiry_date("122799"), "12/27");
    }

    #[test]
    fn test_sanitizers() {
        assert_eq!(sanitize_cvv("1a2b3c4d5"), "1234");
        assert_eq!(sanitize_cardholder_name("Ada L0velace-King"), "Ada LvelaceKing");
    }

    #[test]
    fn test_normalize_truncates_card_number_to_sixteen_digits() {
        let form = PaymentForm {
            card_number: "4242424242424242999".to_string(),
            ..valid_form()
        }
        .normalize();
        assert_eq!(form.card_number, "4242 4242 4242 4242");
    }

    #[test]
    fn test_valid_form_strips_card_spaces() {
        let payment = valid_form().validate(today()).unwrap();
        assert_eq!(payment.card_number, "4242424242424242");
        assert_eq!(payment.payment_method, PaymentMethod::CreditCard);
    }

    #[test]
    fn test_empty_form_reports_every_required_field() {
        let errors = PaymentForm::default().validate(today()).unwrap_err();
        assert_eq!(errors.get(PaymentField::CardNumber), Some("Card number is required"));
        assert_eq!(
            errors.get(PaymentField::CardholderName),
            Some("Cardholder name is required")
        );
        assert_eq!(errors.get(PaymentField::ExpiryDate), Some("Expiry date is required"));
        assert_eq!(errors.get(PaymentField::Cvv), Some("CVV is required"));
    }

    #[test]
    fn test_card_number_rules() {
        let short = PaymentForm {
            card_number: "4242 4242".to_string(),
            ..valid_form()
        };
        assert_eq!(
            short.validate(today()).unwrap_err().get(PaymentField::CardNumber),
            Some("Card number must be 16 digits")
        );

        let letters = PaymentForm {
            card_number: "4242 4242 4242 42ab".to_string(),
            ..valid_form()
        };
        assert_eq!(
            letters.validate(today()).unwrap_err().get(PaymentField::CardNumber),
            Some("Card number must contain only digits")
        );
    }

    #[test]
    fn test_short_cardholder_name() {
        let form = PaymentForm {
            cardholder_name: "  Al ".to_string(),
            ..valid_form()
        };
        assert_eq!(
            form.validate(today()).unwrap_err().get(PaymentField::CardholderName),
            Some("Name must be at least 3 characters")
        );
    }

    #[test]
    fn test_expiry_rules() {
        let cases = [
            ("12/", "Invalid format (MM/YY)"),
            ("1", "Invalid format (MM/YY)"),
            ("13/27", "Invalid month"),
            ("00/27", "Invalid month"),
            ("12/25", "Card has expired"),
            ("09/26", "Card has expired"),
        ];
        for (expiry, expected) in cases {
            let form = PaymentForm {
                expiry_date: expiry.to_string(),
                ..valid_form()
            };
            assert_eq!(
                form.validate(today()).unwrap_err().get(PaymentField::ExpiryDate),
                Some(expected),
                "expiry {expiry}"
            );
        }
    }

    #[test]
    fn test_expiry_in_current_month_is_valid() {
        let form = PaymentForm {
            expiry_date: "10/26".to_string(),
            ..valid_form()
        };
        assert!(form.validate(today()).is_ok());
    }

    #[test]
    fn test_cvv_rules() {
        for cvv in ["12", "12345", "12a"] {
            let form = PaymentForm {
                cvv: cvv.to_string(),
                ..valid_form()
            };
            assert_eq!(
                form.validate(today()).unwrap_err().get(PaymentField::Cvv),
                Some("CVV must be 3 or 4 digits")
            );
        }
        let four = PaymentForm {
            cvv: "1234".to_string(),
            ..valid_form()
        };
        assert!(four.validate(today()).is_ok());
    }

    #[test]
    fn test_debug_redacts_card_data() {
        let output = format!("{:?}", valid_form());
        assert!(!output.contains("4242"));
        assert!(!output.contains("123"));
        assert!(output.contains("[REDACTED]"));
    }
}
