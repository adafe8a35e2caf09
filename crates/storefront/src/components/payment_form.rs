//! Payment step form.

use fsad_core::{FormErrors, PaymentField, PaymentForm, PaymentMethod};

/// A payment method radio option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodOption {
    pub label: &'static str,
    pub selected: bool,
}

/// Payment form display data for templates.
///
/// Values are always the normalised ones; raw card input is never echoed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFormView {
    pub card_number: String,
    pub cardholder_name: String,
    pub expiry_date: String,
    pub cvv: String,
    pub methods: Vec<MethodOption>,
    pub card_number_error: Option<String>,
    pub cardholder_name_error: Option<String>,
    pub expiry_date_error: Option<String>,
    pub cvv_error: Option<String>,
}

impl PaymentFormView {
    /// A blank form with the default method selected.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_form(&PaymentForm::default(), &FormErrors::new())
    }

    /// Re-render a rejected submission. `form` must already be normalised.
    #[must_use]
    pub fn from_form(form: &PaymentForm, errors: &FormErrors<PaymentField>) -> Self {
        let error = |field| errors.get(field).map(str::to_string);
        Self {
            card_number: form.card_number.clone(),
            cardholder_name: form.cardholder_name.clone(),
            expiry_date: form.expiry_date.clone(),
            cvv: form.cvv.clone(),
            methods: PaymentMethod::ALL
                .into_iter()
                .map(|method| MethodOption {
                    label: method.label(),
                    selected: method == form.payment_method,
                })
                .collect(),
            card_number_error: error(PaymentField::CardNumber),
            cardholder_name_error: error(PaymentField::CardholderName),
            expiry_date_error: error(PaymentField::ExpiryDate),
            cvv_error: error(PaymentField::Cvv),
        }
    }
}
