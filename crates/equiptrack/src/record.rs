//! Record types for equiptrack.
//!
//! Three independent record kinds live in the store: products registered
//! into inventory, assignments of products to employees, and returns.
//! None of them reference each other; matching a return against its
//! assignment is left to whoever reads the tables.
//!
//! Every kind comes in two shapes: a `*Fields` struct holding what the
//! caller supplies, and the record itself, which adds the identifier the
//! store assigned. Field names serialize in camelCase.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Store-assigned record identifier.
///
/// Identifiers are unique within a store and strictly increasing in the
/// order records were created. They serialize as decimal strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u64);

impl RecordId {
    /// Wrap a raw identifier value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map(Self)
            .map_err(|_| de::Error::custom(format!("invalid record id: {raw:?}")))
    }
}

/// Whether a product needs periodic calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Calibration {
    /// Calibration required.
    Yes,
    /// No calibration required.
    No,
}

impl Calibration {
    /// The accepted input values, in display order.
    pub const CHOICES: &'static [&'static str] = &["yes", "no"];

    /// The value as entered in a form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

impl fmt::Display for Calibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "Yes"),
            Self::No => write!(f, "No"),
        }
    }
}

impl FromStr for Calibration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            _ => Err(Error::InvalidChoice {
                field: "calibrationRequired",
                value: s.to_string(),
                allowed: Self::CHOICES.join(", "),
            }),
        }
    }
}

/// Caller-supplied fields of a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductFields {
    pub department: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub inward_date: String,
    pub quantity: String,
    pub product_serial_number: String,
    pub brand_make: String,
    pub range: String,
    pub model_number: String,
    /// Unset until one of the radio options is picked.
    pub calibration_required: Option<Calibration>,
    pub last_calibration_date: String,
    pub next_calibration_date: String,
    pub asset_tag_number: String,
    pub project: String,
    pub mqi_serial_number: String,
    pub cost: String,
    pub purchase_date: String,
}

/// A product registered in inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// Everything the caller supplied, untouched.
    #[serde(flatten)]
    pub fields: ProductFields,
}

/// Caller-supplied fields of an assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssignmentFields {
    pub product_serial_no: String,
    pub product_description: String,
    pub model: String,
    pub product_type: String,
    pub mqi_serial_no: String,
    pub quantity: String,
    pub employee_id: String,
    pub employee_name: String,
    pub employee_email_id: String,
    pub date_assigned: String,
    /// Empty while the product is still out.
    pub date_returned: String,
    pub assigned_by: String,
}

/// A product handed to an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: AssignmentFields,
}

/// Caller-supplied fields of a return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReturnFields {
    pub product_serial_no: String,
    pub product_description: String,
    pub model_no: String,
    pub mqi_serial_no: String,
    pub quantity: String,
    pub employee_id: String,
    pub employee_name: String,
    pub employee_email_id: String,
    /// Ignored by the store, which stamps its own date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
}

/// A product handed back by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Return {
    pub id: RecordId,
    pub product_serial_no: String,
    pub product_description: String,
    pub model_no: String,
    pub mqi_serial_no: String,
    pub quantity: String,
    pub employee_id: String,
    pub employee_name: String,
    pub employee_email_id: String,
    /// UTC day the return was recorded, `YYYY-MM-DD`.
    pub return_date: String,
}

impl Return {
    /// Build a return from caller fields, discarding any caller date.
    #[must_use]
    pub fn from_fields(id: RecordId, fields: ReturnFields, return_date: String) -> Self {
        Self {
            id,
            product_serial_no: fields.product_serial_no,
            product_description: fields.product_description,
            model_no: fields.model_no,
            mqi_serial_no: fields.mqi_serial_no,
            quantity: fields.quantity,
            employee_id: fields.employee_id,
            employee_name: fields.employee_name,
            employee_email_id: fields.employee_email_id,
            return_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_display() {
        assert_eq!(RecordId::new(42).to_string(), "42");
        assert_eq!(RecordId::new(7).get(), 7);
    }

    #[test]
    fn test_record_id_ordering() {
        assert!(RecordId::new(1) < RecordId::new(2));
    }

    #[test]
    fn test_calibration_parse() {
        assert_eq!("yes".parse::<Calibration>().unwrap(), Calibration::Yes);
        assert_eq!(" No ".parse::<Calibration>().unwrap(), Calibration::No);
        assert!(matches!(
            "maybe".parse::<Calibration>(),
            Err(Error::InvalidChoice { .. })
        ));
    }

    #[test]
    fn test_calibration_display() {
        assert_eq!(Calibration::Yes.to_string(), "Yes");
        assert_eq!(Calibration::No.as_str(), "no");
    }

    #[test]
    fn test_product_serializes_camel_case_with_id() {
        let product = Product {
            id: RecordId::new(3),
            fields: ProductFields {
                kind: "Measuring Instrument".to_string(),
                product_serial_number: "DMM001".to_string(),
                calibration_required: Some(Calibration::Yes),
                ..ProductFields::default()
            },
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["id"], "3");
        assert_eq!(json["type"], "Measuring Instrument");
        assert_eq!(json["productSerialNumber"], "DMM001");
        assert_eq!(json["calibrationRequired"], "yes");
    }

    #[test]
    fn test_record_id_reads_back_from_string() {
        let product: Product =
            serde_json::from_str(r#"{"id": "17", "title": "Oscilloscope"}"#).unwrap();
        assert_eq!(product.id, RecordId::new(17));
        assert_eq!(product.fields.title, "Oscilloscope");

        assert!(serde_json::from_str::<RecordId>(r#""abc""#).is_err());
        assert!(serde_json::from_str::<RecordId>("17").is_err());
    }

    #[test]
    fn test_assignment_fields_deserialize() {
        let json = r#"{
            "productSerialNo": "DMM001",
            "employeeEmailId": "john.smith@company.com",
            "dateReturned": ""
        }"#;
        let fields: AssignmentFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.product_serial_no, "DMM001");
        assert_eq!(fields.employee_email_id, "john.smith@company.com");
        assert!(fields.date_returned.is_empty());
        assert!(fields.assigned_by.is_empty());
    }

    #[test]
    fn test_return_from_fields_discards_caller_date() {
        let fields = ReturnFields {
            product_serial_no: "OSC001".to_string(),
            return_date: Some("2020-01-01".to_string()),
            ..ReturnFields::default()
        };
        let record = Return::from_fields(RecordId::new(1), fields, "2024-03-15".to_string());

        assert_eq!(record.product_serial_no, "OSC001");
        assert_eq!(record.return_date, "2024-03-15");
    }
}
