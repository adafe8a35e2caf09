//! Shipping step form.

use fsad_core::{FormErrors, ShippingField, ShippingForm};

/// Shipping form display data for templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingFormView {
    pub values: ShippingForm,
    pub full_name_error: Option<String>,
    pub address_line1_error: Option<String>,
    pub city_error: Option<String>,
    pub state_error: Option<String>,
    pub zip_code_error: Option<String>,
    pub country_error: Option<String>,
    pub phone_error: Option<String>,
}

impl ShippingFormView {
    /// Form pre-filled with `values` (the stored address when going back).
    #[must_use]
    pub fn prefilled(values: ShippingForm) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_errors(values: ShippingForm, errors: &FormErrors<ShippingField>) -> Self {
        let error = |field| errors.get(field).map(str::to_string);
        Self {
            full_name_error: error(ShippingField::FullName),
            address_line1_error: error(ShippingField::AddressLine1),
            city_error: error(ShippingField::City),
            state_error: error(ShippingField::State),
            zip_code_error: error(ShippingField::ZipCode),
            country_error: error(ShippingField::Country),
            phone_error: error(ShippingField::Phone),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_are_mapped_to_fields() {
        let form = ShippingForm::default();
        let errors = form.validate().err().unwrap_or_default();
        let view = ShippingFormView::with_errors(form, &errors);
        assert_eq!(view.city_error.as_deref(), Some("City is required"));
        assert_eq!(view.phone_error.as_deref(), Some("Phone number is required"));
    }
}
