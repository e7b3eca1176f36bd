//! Entry forms for products, assignments and returns.
//!
//! Each form keeps a local draft with one string per field. The draft is
//! invisible to the rest of the application until the form is submitted,
//! at which point required fields are checked, the record is handed to the
//! [`RecordStore`], and a success notification is produced.
//!
//! # Example
//!
//! ```
//! use equiptrack::form::{AssignmentForm, EntryForm};
//! use equiptrack::store::RecordStore;
//!
//! let store = RecordStore::new();
//! let mut form = EntryForm::<AssignmentForm>::new();
//! for (field, value) in [
//!     ("productSerialNo", "DMM001"),
//!     ("productDescription", "Digital Multimeter"),
//!     ("model", "87V"),
//!     ("productType", "Measuring Instrument"),
//!     ("quantity", "1"),
//!     ("employeeId", "EMP001"),
//!     ("employeeName", "John Smith"),
//!     ("employeeEmailId", "john.smith@company.com"),
//!     ("dateAssigned", "2024-03-01"),
//!     ("assignedBy", "Admin"),
//! ] {
//!     form.set(field, value).unwrap();
//! }
//!
//! let submission = form.submit(&store).unwrap();
//! assert_eq!(submission.notification.title, "Product Assigned");
//! assert_eq!(store.assignments().len(), 1);
//! ```

mod kinds;

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::notification::Notification;
use crate::store::RecordStore;

pub use kinds::{AssignmentForm, ProductForm, ReturnForm};

/// How a field's value is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Free text.
    Text,
    /// A calendar date, entered as `YYYY-MM-DD`.
    Date,
    /// A number. Not checked; stored as typed.
    Number,
    /// An email address. Not checked; stored as typed.
    Email,
    /// One of a fixed set of options.
    Choice(&'static [&'static str]),
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Date => write!(f, "date"),
            Self::Number => write!(f, "number"),
            Self::Email => write!(f, "email"),
            Self::Choice(options) => write!(f, "one of {}", options.join("/")),
        }
    }
}

/// Description of one labelled input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field identifier, matching the record's serialized name.
    pub id: &'static str,
    /// Label shown next to the input.
    pub label: &'static str,
    /// Input kind.
    pub input: InputKind,
    /// Whether submission is blocked while this field is empty.
    pub required: bool,
    /// Hint shown in an empty input.
    pub placeholder: Option<&'static str>,
}

impl FieldSpec {
    /// Whether `name` refers to this field.
    ///
    /// Matching ignores case, `_` and `-`, so `product_serial_no`,
    /// `product-serial-no` and `productSerialNo` all match.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        normalize(self.id) == normalize(name)
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// A kind of entry form: its fields, its record, and how it is stored.
pub trait FormKind {
    /// The record produced by a successful submit.
    type Record: Clone + fmt::Debug + Serialize;

    /// Short machine name (`product`, `assignment`, `return`).
    const NAME: &'static str;

    /// Heading of the form page.
    const TITLE: &'static str;

    /// Label of the submit button.
    const SUBMIT_LABEL: &'static str;

    /// Whether the draft is cleared after a successful submit.
    const RESETS_ON_SUBMIT: bool;

    /// The form's fields in display order.
    fn fields() -> &'static [FieldSpec];

    /// Title and description of the success notification.
    fn success_message() -> (&'static str, &'static str);

    /// Build the record fields from a complete draft and add them to the
    /// store.
    ///
    /// # Errors
    ///
    /// Returns an error if a draft value cannot be converted into its
    /// record field.
    fn commit(draft: &Draft, store: &RecordStore) -> Result<Self::Record>;
}

/// Field values of a form, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    fields: &'static [FieldSpec],
    values: Vec<String>,
}

impl Draft {
    /// Create an empty draft for the given fields.
    #[must_use]
    pub fn empty(fields: &'static [FieldSpec]) -> Self {
        Self {
            fields,
            values: vec![String::new(); fields.len()],
        }
    }

    /// Current value of a field, or `None` if there is no such field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.values[index].as_str())
    }

    /// Current value of a field, empty if there is no such field.
    #[must_use]
    pub fn value(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }

    /// Iterate over `(field, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldSpec, &str)> {
        self.fields
            .iter()
            .zip(self.values.iter().map(String::as_str))
    }

    /// Required fields that are still empty, in field order.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        self.iter()
            .filter(|(spec, value)| spec.required && value.is_empty())
            .map(|(spec, _)| spec.id)
            .collect()
    }

    /// Whether every field is empty.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|spec| spec.matches(name))
    }
}

/// Lifecycle state of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    /// The draft is being edited and has not been handed over.
    #[default]
    Editing,
    /// The last action was a successful submit.
    Submitted,
}

/// Outcome of a successful submit.
#[derive(Debug, Clone)]
pub struct Submission<R> {
    /// The record as stored.
    pub record: R,
    /// Confirmation for the user.
    pub notification: Notification,
}

/// An entry form bound to one record kind.
#[derive(Debug)]
pub struct EntryForm<K: FormKind> {
    draft: Draft,
    state: FormState,
    kind: PhantomData<K>,
}

impl<K: FormKind> EntryForm<K> {
    /// Create a form with an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self {
            draft: Draft::empty(K::fields()),
            state: FormState::Editing,
            kind: PhantomData,
        }
    }

    /// The form's fields in display order.
    #[must_use]
    pub fn fields(&self) -> &'static [FieldSpec] {
        K::fields()
    }

    /// The current draft.
    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> FormState {
        self.state
    }

    /// Current value of one field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.draft.get(name)
    }

    /// Set one field of the draft.
    ///
    /// Choice fields only accept one of their options (case-insensitive);
    /// an empty value clears them. Editing after a submit puts the form
    /// back into [`FormState::Editing`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the form has no such field, or
    /// [`Error::InvalidChoice`] for a value outside a choice field's options.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let index = self.draft.position(name).ok_or_else(|| Error::UnknownField {
            form: K::NAME,
            field: name.to_string(),
        })?;
        let spec = self.draft.fields[index];
        let mut value = value.into();

        if let InputKind::Choice(options) = spec.input {
            if !value.is_empty() {
                let chosen = options
                    .iter()
                    .find(|option| option.eq_ignore_ascii_case(value.trim()))
                    .ok_or_else(|| Error::InvalidChoice {
                        field: spec.id,
                        value: value.clone(),
                        allowed: options.join(", "),
                    })?;
                value = (*chosen).to_string();
            }
        }

        self.draft.values[index] = value;
        self.state = FormState::Editing;
        Ok(())
    }

    /// Reset the draft to its empty initial state.
    pub fn clear(&mut self) {
        self.draft = Draft::empty(K::fields());
        self.state = FormState::Editing;
    }

    /// Required fields that are still empty.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        self.draft.missing_required()
    }

    /// Validate the draft and hand it to the store.
    ///
    /// On success the draft is cleared if the form kind resets on submit,
    /// and kept otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] naming the first empty required
    /// field. Neither the draft nor the store is touched in that case.
    pub fn submit(&mut self, store: &RecordStore) -> Result<Submission<K::Record>> {
        if let Some(&field) = self.draft.missing_required().first() {
            debug!(form = K::NAME, field, "submit blocked by empty required field");
            return Err(Error::MissingField {
                form: K::NAME,
                field,
            });
        }

        let record = K::commit(&self.draft, store)?;
        debug!(form = K::NAME, payload = ?record, "form submitted");
        info!(form = K::NAME, "record saved");

        let (title, description) = K::success_message();
        let notification = Notification::success(title, description);

        if K::RESETS_ON_SUBMIT {
            self.draft = Draft::empty(K::fields());
        }
        self.state = FormState::Submitted;

        Ok(Submission {
            record,
            notification,
        })
    }
}

impl<K: FormKind> Default for EntryForm<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_matches_ignores_case_and_separators() {
        let spec = ProductForm::fields()
            .iter()
            .find(|spec| spec.id == "productSerialNumber")
            .unwrap();
        assert!(spec.matches("productSerialNumber"));
        assert!(spec.matches("product_serial_number"));
        assert!(spec.matches("PRODUCT-SERIAL-NUMBER"));
        assert!(!spec.matches("serial"));
    }

    #[test]
    fn test_new_form_has_blank_draft() {
        let form = EntryForm::<ProductForm>::new();
        assert!(form.draft().is_blank());
        assert_eq!(form.state(), FormState::Editing);
        assert_eq!(form.fields().len(), 17);
    }

    #[test]
    fn test_set_and_get() {
        let mut form = EntryForm::<ReturnForm>::new();
        form.set("model_no", "TBS1000").unwrap();
        assert_eq!(form.get("modelNo"), Some("TBS1000"));
        assert_eq!(form.get("nonexistent"), None);
    }

    #[test]
    fn test_set_unknown_field() {
        let mut form = EntryForm::<AssignmentForm>::new();
        let err = form.set("colour", "red").unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownField {
                form: "assignment",
                ..
            }
        ));
    }

    #[test]
    fn test_choice_field_normalizes_and_rejects() {
        let mut form = EntryForm::<ProductForm>::new();
        form.set("calibrationRequired", "YES").unwrap();
        assert_eq!(form.get("calibrationRequired"), Some("yes"));

        let err = form.set("calibrationRequired", "sometimes").unwrap_err();
        assert!(matches!(err, Error::InvalidChoice { .. }));
        // Rejected value leaves the previous choice in place.
        assert_eq!(form.get("calibrationRequired"), Some("yes"));

        form.set("calibrationRequired", "").unwrap();
        assert_eq!(form.get("calibrationRequired"), Some(""));
    }

    #[test]
    fn test_submit_blocked_names_first_missing_field() {
        let store = RecordStore::new();
        let mut form = EntryForm::<ReturnForm>::new();
        form.set("productSerialNo", "OSC001").unwrap();

        let err = form.submit(&store).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingField {
                form: "return",
                field: "productDescription"
            }
        ));
        assert!(store.returns().is_empty());
        assert_eq!(form.get("productSerialNo"), Some("OSC001"));
        assert_eq!(form.state(), FormState::Editing);
    }

    #[test]
    fn test_whitespace_counts_as_filled() {
        let mut form = EntryForm::<ReturnForm>::new();
        form.set("productSerialNo", " ").unwrap();
        assert!(!form.missing_required().contains(&"productSerialNo"));
    }

    #[test]
    fn test_clear_resets_draft() {
        let mut form = EntryForm::<AssignmentForm>::new();
        form.set("employeeId", "EMP001").unwrap();
        form.clear();
        assert!(form.draft().is_blank());
    }

    #[test]
    fn test_input_kind_display() {
        assert_eq!(InputKind::Date.to_string(), "date");
        assert_eq!(InputKind::Choice(&["yes", "no"]).to_string(), "one of yes/no");
    }
}
