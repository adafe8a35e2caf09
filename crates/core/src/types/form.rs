//! Per-field validation errors for HTML forms.

/// Validation messages keyed by form field.
///
/// Holds at most one message per field; the first rule that fails for a
/// field wins, matching how the forms report errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormErrors<F> {
    entries: Vec<(F, String)>,
}

impl<F: Copy + PartialEq> FormErrors<F> {
    /// An empty error set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a message for `field` unless it already has one.
    pub fn add(&mut self, field: F, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.entries.push((field, message.into()));
        }
    }

    /// Message for `field`, if any.
    #[must_use]
    pub fn get(&self, field: F) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| message.as_str())
    }

    /// Whether `field` has an error.
    #[must_use]
    pub fn has(&self, field: F) -> bool {
        self.get(field).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// All messages in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = (F, &str)> {
        self.entries.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl<F: Copy + PartialEq> Default for FormErrors<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Field {
        A,
        B,
    }

    #[test]
    fn test_first_message_per_field_wins() {
        let mut errors = FormErrors::new();
        errors.add(Field::A, "first");
        errors.add(Field::A, "second");
        errors.add(Field::B, "other");

        assert_eq!(errors.get(Field::A), Some("first"));
        assert_eq!(errors.len(), 2);
        assert!(errors.has(Field::B));
    }
}
