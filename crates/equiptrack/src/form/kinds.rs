//! The three concrete entry forms.

use crate::error::Result;
use crate::record::{
    Assignment, AssignmentFields, Calibration, Product, ProductFields, Return, ReturnFields,
};
use crate::store::RecordStore;

use super::{Draft, FieldSpec, FormKind, InputKind};

const fn field(
    id: &'static str,
    label: &'static str,
    input: InputKind,
    required: bool,
    placeholder: Option<&'static str>,
) -> FieldSpec {
    FieldSpec {
        id,
        label,
        input,
        required,
        placeholder,
    }
}

static PRODUCT_FIELDS: [FieldSpec; 17] = [
    field("department", "Department", InputKind::Text, true, Some("Enter department")),
    field("title", "Title", InputKind::Text, true, Some("Enter product title")),
    field("type", "Type", InputKind::Text, true, Some("Enter product type")),
    field("inwardDate", "Inward Date", InputKind::Date, true, None),
    field("quantity", "Quantity", InputKind::Number, true, Some("Enter quantity")),
    field(
        "productSerialNumber",
        "Product Serial Number",
        InputKind::Text,
        true,
        Some("Enter serial number"),
    ),
    field("brandMake", "Brand/Make", InputKind::Text, true, Some("Enter brand/make")),
    field("range", "Range", InputKind::Text, false, Some("Enter range")),
    field(
        "modelNumber",
        "Model Number",
        InputKind::Text,
        true,
        Some("Enter model number"),
    ),
    field(
        "calibrationRequired",
        "Calibration Required",
        InputKind::Choice(Calibration::CHOICES),
        false,
        None,
    ),
    field(
        "lastCalibrationDate",
        "Last Calibration Date",
        InputKind::Date,
        false,
        None,
    ),
    field(
        "nextCalibrationDate",
        "Next Calibration Date",
        InputKind::Date,
        false,
        None,
    ),
    field(
        "assetTagNumber",
        "Asset Tag Number",
        InputKind::Text,
        false,
        Some("Enter asset tag number"),
    ),
    field("project", "Project", InputKind::Text, false, Some("Enter project name")),
    field(
        "mqiSerialNumber",
        "MQI Serial Number",
        InputKind::Text,
        false,
        Some("Enter MQI serial number"),
    ),
    field("cost", "Cost", InputKind::Number, false, Some("Enter cost")),
    field("purchaseDate", "Purchase Date", InputKind::Date, false, None),
];

static ASSIGNMENT_FIELDS: [FieldSpec; 12] = [
    field(
        "productSerialNo",
        "Product Serial No",
        InputKind::Text,
        true,
        Some("Enter product serial number"),
    ),
    field(
        "productDescription",
        "Product Description",
        InputKind::Text,
        true,
        Some("Enter product description"),
    ),
    field("model", "Model", InputKind::Text, true, Some("Enter model")),
    field(
        "productType",
        "Product Type",
        InputKind::Text,
        true,
        Some("Enter product type"),
    ),
    field(
        "mqiSerialNo",
        "MQI Serial No",
        InputKind::Text,
        false,
        Some("Enter MQI serial number"),
    ),
    field("quantity", "Quantity", InputKind::Number, true, Some("Enter quantity")),
    field("employeeId", "Employee ID", InputKind::Text, true, Some("Enter employee ID")),
    field(
        "employeeName",
        "Employee Name",
        InputKind::Text,
        true,
        Some("Enter employee name"),
    ),
    field(
        "employeeEmailId",
        "Employee Email ID",
        InputKind::Email,
        true,
        Some("Enter employee email"),
    ),
    field("dateAssigned", "Date Assigned", InputKind::Date, true, None),
    field("dateReturned", "Date Returned", InputKind::Date, false, None),
    field("assignedBy", "Assigned By", InputKind::Text, true, Some("Enter assigned by")),
];

static RETURN_FIELDS: [FieldSpec; 8] = [
    field(
        "productSerialNo",
        "Product Serial No",
        InputKind::Text,
        true,
        Some("Enter product serial number"),
    ),
    field(
        "productDescription",
        "Product Description",
        InputKind::Text,
        true,
        Some("Enter product description"),
    ),
    field("modelNo", "Model No", InputKind::Text, true, Some("Enter model number")),
    field(
        "mqiSerialNo",
        "MQI Serial No",
        InputKind::Text,
        false,
        Some("Enter MQI serial number"),
    ),
    field("quantity", "Quantity", InputKind::Number, true, Some("Enter quantity")),
    field("employeeId", "Employee ID", InputKind::Text, true, Some("Enter employee ID")),
    field(
        "employeeName",
        "Employee Name",
        InputKind::Text,
        true,
        Some("Enter employee name"),
    ),
    field(
        "employeeEmailId",
        "Employee Email ID",
        InputKind::Email,
        true,
        Some("Enter employee email"),
    ),
];

/// Form registering a new product. Keeps its draft after submit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductForm;

impl FormKind for ProductForm {
    type Record = Product;

    const NAME: &'static str = "product";
    const TITLE: &'static str = "Add New Product";
    const SUBMIT_LABEL: &'static str = "Add Product";
    const RESETS_ON_SUBMIT: bool = false;

    fn fields() -> &'static [FieldSpec] {
        &PRODUCT_FIELDS
    }

    fn success_message() -> (&'static str, &'static str) {
        (
            "Product Added",
            "New product has been successfully added to the database",
        )
    }

    fn commit(draft: &Draft, store: &RecordStore) -> Result<Product> {
        let calibration = draft.value("calibrationRequired");
        let calibration_required = if calibration.is_empty() {
            None
        } else {
            Some(calibration.parse::<Calibration>()?)
        };

        Ok(store.add_product(ProductFields {
            department: draft.value("department"),
            title: draft.value("title"),
            kind: draft.value("type"),
            inward_date: draft.value("inwardDate"),
            quantity: draft.value("quantity"),
            product_serial_number: draft.value("productSerialNumber"),
            brand_make: draft.value("brandMake"),
            range: draft.value("range"),
            model_number: draft.value("modelNumber"),
            calibration_required,
            last_calibration_date: draft.value("lastCalibrationDate"),
            next_calibration_date: draft.value("nextCalibrationDate"),
            asset_tag_number: draft.value("assetTagNumber"),
            project: draft.value("project"),
            mqi_serial_number: draft.value("mqiSerialNumber"),
            cost: draft.value("cost"),
            purchase_date: draft.value("purchaseDate"),
        }))
    }
}

/// Form assigning a product to an employee. Clears its draft after submit.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentForm;

impl FormKind for AssignmentForm {
    type Record = Assignment;

    const NAME: &'static str = "assignment";
    const TITLE: &'static str = "Assign Product";
    const SUBMIT_LABEL: &'static str = "Assign Product";
    const RESETS_ON_SUBMIT: bool = true;

    fn fields() -> &'static [FieldSpec] {
        &ASSIGNMENT_FIELDS
    }

    fn success_message() -> (&'static str, &'static str) {
        (
            "Product Assigned",
            "Product has been successfully assigned to employee",
        )
    }

    fn commit(draft: &Draft, store: &RecordStore) -> Result<Assignment> {
        Ok(store.add_assignment(AssignmentFields {
            product_serial_no: draft.value("productSerialNo"),
            product_description: draft.value("productDescription"),
            model: draft.value("model"),
            product_type: draft.value("productType"),
            mqi_serial_no: draft.value("mqiSerialNo"),
            quantity: draft.value("quantity"),
            employee_id: draft.value("employeeId"),
            employee_name: draft.value("employeeName"),
            employee_email_id: draft.value("employeeEmailId"),
            date_assigned: draft.value("dateAssigned"),
            date_returned: draft.value("dateReturned"),
            assigned_by: draft.value("assignedBy"),
        }))
    }
}

/// Form recording a product return. Keeps its draft after submit.
///
/// The return date is not a field: the store stamps it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnForm;

impl FormKind for ReturnForm {
    type Record = Return;

    const NAME: &'static str = "return";
    const TITLE: &'static str = "Return Product";
    const SUBMIT_LABEL: &'static str = "Return Product";
    const RESETS_ON_SUBMIT: bool = false;

    fn fields() -> &'static [FieldSpec] {
        &RETURN_FIELDS
    }

    fn success_message() -> (&'static str, &'static str) {
        ("Product Returned", "Product has been successfully returned")
    }

    fn commit(draft: &Draft, store: &RecordStore) -> Result<Return> {
        Ok(store.add_return(ReturnFields {
            product_serial_no: draft.value("productSerialNo"),
            product_description: draft.value("productDescription"),
            model_no: draft.value("modelNo"),
            mqi_serial_no: draft.value("mqiSerialNo"),
            quantity: draft.value("quantity"),
            employee_id: draft.value("employeeId"),
            employee_name: draft.value("employeeName"),
            employee_email_id: draft.value("employeeEmailId"),
            return_date: None,
        }))
    }
}
