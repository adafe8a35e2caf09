//! Shipping address form and its wire representation.

use serde::{Deserialize, Serialize};

use super::form::FormErrors;

/// Fields of the shipping form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShippingField {
    FullName,
    AddressLine1,
    City,
    State,
    ZipCode,
    Country,
    Phone,
}

/// Shipping details as entered on the checkout shipping step.
///
/// Stored in the session between the shipping and payment steps so the
/// form can be pre-filled when the customer goes back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: String,
}

/// Shipping address in the shape the order service expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
}

impl ShippingForm {
    /// Copy of the form with surrounding whitespace removed from every field.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            address_line1: self.address_line1.trim().to_string(),
            address_line2: self.address_line2.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
            country: self.country.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }

    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns one message per invalid field.
    pub fn validate(&self) -> Result<(), FormErrors<ShippingField>> {
        let mut errors = FormErrors::new();

        let required = [
            (ShippingField::FullName, &self.full_name, "Full name is required"),
            (ShippingField::AddressLine1, &self.address_line1, "Address is required"),
            (ShippingField::City, &self.city, "City is required"),
            (ShippingField::State, &self.state, "State is required"),
            (ShippingField::ZipCode, &self.zip_code, "ZIP code is required"),
            (ShippingField::Country, &self.country, "Country is required"),
            (ShippingField::Phone, &self.phone, "Phone number is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.add(field, message);
            }
        }

        if !errors.has(ShippingField::ZipCode) && !is_valid_zip_code(self.zip_code.trim()) {
            errors.add(ShippingField::ZipCode, "Invalid ZIP code");
        }
        if !errors.has(ShippingField::Phone) && !is_valid_phone(&self.phone) {
            errors.add(ShippingField::Phone, "Phone number must be 10 to 15 digits");
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Convert to the order service's address shape.
    ///
    /// Address lines are joined with `", "` when the second line is present.
    #[must_use]
    pub fn to_address(&self) -> ShippingAddress {
        let line2 = self.address_line2.trim();
        let street = if line2.is_empty() {
            self.address_line1.trim().to_string()
        } else {
            format!("{}, {line2}", self.address_line1.trim())
        };

        ShippingAddress {
            street,
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
            country: self.country.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }
}

fn is_valid_zip_code(zip: &str) -> bool {
    (3..=10).contains(&zip.chars().count())
        && zip
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
}

fn is_valid_phone(phone: &str) -> bool {
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let mut digits = 0usize;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '(' | ')' => {}
            _ => return false,
        }
    }
    (10..=15).contains(&digits)
}
