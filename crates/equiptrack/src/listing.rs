//! Read-only table views over the record store.
//!
//! The listing view keeps one piece of state, the selected table, and
//! derives everything else from the store on each render. An empty
//! collection renders as a single placeholder row spanning every column.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use crate::config::ListingConfig;
use crate::error::{Error, Result};
use crate::record::{Assignment, Product, Return};
use crate::store::RecordStore;

/// The tables that can be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    /// Registered products.
    #[default]
    Products,
    /// Product assignments.
    Assignments,
    /// Product returns.
    Returns,
}

impl TableName {
    /// All tables in selector order.
    pub const ALL: [TableName; 3] = [Self::Products, Self::Assignments, Self::Returns];

    /// Selector value of the table.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Assignments => "assignments",
            Self::Returns => "returns",
        }
    }

    /// Human-readable name shown in the selector.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Products => "Products",
            Self::Assignments => "Product Assignments",
            Self::Returns => "Product Returns",
        }
    }

    /// Resolve a selector, falling back to products for unknown values.
    #[must_use]
    pub fn from_selector(selector: &str) -> Self {
        selector.parse().unwrap_or_else(|_| {
            warn!(selector, "unknown table selector, showing products");
            Self::Products
        })
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|table| key == table.as_str() || key == table.title().to_ascii_lowercase())
            .or(match key.as_str() {
                "product" => Some(Self::Products),
                "assignment" => Some(Self::Assignments),
                "return" => Some(Self::Returns),
                _ => None,
            })
            .ok_or_else(|| Error::UnknownTable(s.to_string()))
    }
}

/// How a rendered table is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One `label: value` block per record.
    Plain,
    /// Aligned columns.
    #[default]
    Table,
    /// JSON array of records.
    Json,
}

/// One body row of a rendered table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// A record, one cell per column.
    Record(Vec<String>),
    /// Shown instead of records when the collection is empty.
    Placeholder {
        /// Number of columns the row spans.
        colspan: usize,
        /// Text of the row.
        text: String,
    },
}

/// A table ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    /// Which table this is.
    pub table: TableName,
    /// Column headers.
    pub headers: Vec<&'static str>,
    /// Body rows in store order.
    pub rows: Vec<Row>,
}

impl RenderedTable {
    /// Whether the body is the empty-state placeholder.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.rows.as_slice(), [Row::Placeholder { .. }])
    }

    /// Number of record rows.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row, Row::Record(_)))
            .count()
    }

    /// Format as an aligned text grid.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            if let Row::Record(cells) = row {
                for (width, cell) in widths.iter_mut().zip(cells) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }
        // Total width including the " | " separators.
        let total = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.table.title());
        let _ = writeln!(out, "{}", join_padded(&self.headers, &widths));
        let _ = writeln!(out, "{}", "-".repeat(total));
        for row in &self.rows {
            match row {
                Row::Record(cells) => {
                    let _ = writeln!(out, "{}", join_padded(cells, &widths));
                }
                Row::Placeholder { text, .. } => {
                    let _ = writeln!(out, "{text:^total$}");
                }
            }
        }
        out
    }

    /// Format as one `header: value` block per record.
    #[must_use]
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            match row {
                Row::Record(cells) => {
                    for (header, cell) in self.headers.iter().zip(cells) {
                        let _ = writeln!(out, "{header}: {cell}");
                    }
                    out.push('\n');
                }
                Row::Placeholder { text, .. } => {
                    let _ = writeln!(out, "{text}");
                }
            }
        }
        out
    }
}

fn join_padded<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

const PRODUCT_HEADERS: &[&str] = &[
    "ID",
    "Department",
    "Title",
    "Type",
    "Serial Number",
    "Brand/Make",
    "Model",
    "Calibration Required",
    "Asset Tag",
    "MQI Serial",
    "Cost",
    "Purchase Date",
];

const ASSIGNMENT_HEADERS: &[&str] = &[
    "ID",
    "Product Serial No",
    "Description",
    "Model",
    "Type",
    "MQI Serial",
    "Quantity",
    "Employee ID",
    "Employee Name",
    "Employee Email",
    "Date Assigned",
    "Date Returned",
    "Assigned By",
];

const RETURN_HEADERS: &[&str] = &[
    "ID",
    "Product Serial No",
    "Description",
    "Model No",
    "MQI Serial",
    "Quantity",
    "Employee ID",
    "Employee Name",
    "Employee Email",
    "Return Date",
];

/// The database view: a table selector over the record store.
#[derive(Debug, Clone)]
pub struct ListingView {
    selected: TableName,
    currency_symbol: String,
    placeholder_text: String,
}

impl ListingView {
    /// Create a view showing the configured default table.
    #[must_use]
    pub fn new(config: &ListingConfig) -> Self {
        Self {
            selected: TableName::from_selector(&config.default_table),
            currency_symbol: config.currency_symbol.clone(),
            placeholder_text: config.placeholder_text.clone(),
        }
    }

    /// The currently selected table.
    #[must_use]
    pub fn selected(&self) -> TableName {
        self.selected
    }

    /// Select a table.
    pub fn select(&mut self, table: TableName) {
        self.selected = table;
    }

    /// Select a table by selector string, falling back to products.
    pub fn select_by_name(&mut self, selector: &str) -> TableName {
        self.selected = TableName::from_selector(selector);
        self.selected
    }

    /// Render the selected table.
    #[must_use]
    pub fn render(&self, store: &RecordStore) -> RenderedTable {
        self.render_table(store, self.selected)
    }

    /// Render a specific table.
    #[must_use]
    pub fn render_table(&self, store: &RecordStore, table: TableName) -> RenderedTable {
        let (headers, rows): (&[&'static str], Vec<Vec<String>>) = match table {
            TableName::Products => (
                PRODUCT_HEADERS,
                store.products().iter().map(|p| self.product_row(p)).collect(),
            ),
            TableName::Assignments => (
                ASSIGNMENT_HEADERS,
                store.assignments().iter().map(assignment_row).collect(),
            ),
            TableName::Returns => (
                RETURN_HEADERS,
                store.returns().iter().map(return_row).collect(),
            ),
        };

        let rows = if rows.is_empty() {
            vec![Row::Placeholder {
                colspan: headers.len(),
                text: self.placeholder_text.clone(),
            }]
        } else {
            rows.into_iter().map(Row::Record).collect()
        };

        RenderedTable {
            table,
            headers: headers.to_vec(),
            rows,
        }
    }

    /// Render the selected table in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn format(&self, store: &RecordStore, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(self.render(store).to_text()),
            OutputFormat::Plain => Ok(self.render(store).to_plain()),
            OutputFormat::Json => {
                let json = match self.selected {
                    TableName::Products => serde_json::to_string_pretty(&store.products())?,
                    TableName::Assignments => serde_json::to_string_pretty(&store.assignments())?,
                    TableName::Returns => serde_json::to_string_pretty(&store.returns())?,
                };
                Ok(json)
            }
        }
    }

    fn product_row(&self, product: &Product) -> Vec<String> {
        let p = &product.fields;
        let cost = if p.cost.is_empty() {
            String::new()
        } else {
            format!("{}{}", self.currency_symbol, p.cost)
        };
        vec![
            product.id.to_string(),
            p.department.clone(),
            p.title.clone(),
            p.kind.clone(),
            p.product_serial_number.clone(),
            p.brand_make.clone(),
            p.model_number.clone(),
            p.calibration_required
                .map(|c| c.to_string())
                .unwrap_or_default(),
            p.asset_tag_number.clone(),
            p.mqi_serial_number.clone(),
            cost,
            p.purchase_date.clone(),
        ]
    }
}

impl Default for ListingView {
    fn default() -> Self {
        Self::new(&ListingConfig::default())
    }
}

fn assignment_row(assignment: &Assignment) -> Vec<String> {
    let a = &assignment.fields;
    vec![
        assignment.id.to_string(),
        a.product_serial_no.clone(),
        a.product_description.clone(),
        a.model.clone(),
        a.product_type.clone(),
        a.mqi_serial_no.clone(),
        a.quantity.clone(),
        a.employee_id.clone(),
        a.employee_name.clone(),
        a.employee_email_id.clone(),
        a.date_assigned.clone(),
        a.date_returned.clone(),
        a.assigned_by.clone(),
    ]
}

fn return_row(record: &Return) -> Vec<String> {
    vec![
        record.id.to_string(),
        record.product_serial_no.clone(),
        record.product_description.clone(),
        record.model_no.clone(),
        record.mqi_serial_no.clone(),
        record.quantity.clone(),
        record.employee_id.clone(),
        record.employee_name.clone(),
        record.employee_email_id.clone(),
        record.return_date.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AssignmentFields, Calibration, ProductFields, ReturnFields};

    #[test]
    fn test_table_name_parse() {
        assert_eq!("products".parse::<TableName>().unwrap(), TableName::Products);
        assert_eq!(" Returns ".parse::<TableName>().unwrap(), TableName::Returns);
        assert_eq!(
            "Product Assignments".parse::<TableName>().unwrap(),
            TableName::Assignments
        );
        assert_eq!("return".parse::<TableName>().unwrap(), TableName::Returns);
        assert!(matches!(
            "widgets".parse::<TableName>(),
            Err(Error::UnknownTable(_))
        ));
    }

    #[test]
    fn test_from_selector_falls_back_to_products() {
        assert_eq!(TableName::from_selector("widgets"), TableName::Products);
        assert_eq!(TableName::from_selector(""), TableName::Products);
        assert_eq!(TableName::from_selector("returns"), TableName::Returns);
    }

    #[test]
    fn test_empty_store_renders_one_placeholder_per_table() {
        let store = RecordStore::new();
        let view = ListingView::default();

        for table in TableName::ALL {
            let rendered = view.render_table(&store, table);
            assert_eq!(rendered.rows.len(), 1);
            assert!(rendered.is_empty());
            match &rendered.rows[0] {
                Row::Placeholder { colspan, text } => {
                    assert_eq!(*colspan, rendered.headers.len());
                    assert_eq!(text, "No records found");
                }
                Row::Record(_) => panic!("expected placeholder"),
            }
        }
    }

    #[test]
    fn test_rows_follow_store_order() {
        let store = RecordStore::new();
        for serial in ["S1", "S2", "S3"] {
            store.add_assignment(AssignmentFields {
                product_serial_no: serial.to_string(),
                ..AssignmentFields::default()
            });
        }
        let mut view = ListingView::default();
        view.select(TableName::Assignments);

        let rendered = view.render(&store);
        let serials: Vec<&str> = rendered
            .rows
            .iter()
            .map(|row| match row {
                Row::Record(cells) => cells[1].as_str(),
                Row::Placeholder { .. } => "",
            })
            .collect();
        assert_eq!(serials, vec!["S1", "S2", "S3"]);
        assert_eq!(rendered.record_count(), 3);
    }

    #[test]
    fn test_product_row_formats_cost_and_calibration() {
        let store = RecordStore::new();
        store.add_product(ProductFields {
            product_serial_number: "DMM001".to_string(),
            calibration_required: Some(Calibration::Yes),
            cost: "299.99".to_string(),
            ..ProductFields::default()
        });
        store.add_product(ProductFields::default());

        let rendered = ListingView::default().render(&store);
        let Row::Record(first) = &rendered.rows[0] else {
            panic!("expected record row");
        };
        assert_eq!(first[4], "DMM001");
        assert_eq!(first[7], "Yes");
        assert_eq!(first[10], "$299.99");

        let Row::Record(second) = &rendered.rows[1] else {
            panic!("expected record row");
        };
        assert_eq!(second[7], "");
        assert_eq!(second[10], "");
    }

    #[test]
    fn test_returns_table_shows_return_date() {
        let store = RecordStore::new();
        let record = store.add_return(ReturnFields::default());
        let rendered = ListingView::default().render_table(&store, TableName::Returns);

        assert_eq!(rendered.headers.last(), Some(&"Return Date"));
        let Row::Record(cells) = &rendered.rows[0] else {
            panic!("expected record row");
        };
        assert_eq!(cells.last(), Some(&record.return_date));
    }

    #[test]
    fn test_default_table_from_config() {
        let config = ListingConfig {
            default_table: "returns".to_string(),
            ..ListingConfig::default()
        };
        assert_eq!(ListingView::new(&config).selected(), TableName::Returns);
    }

    #[test]
    fn test_select_by_name_unknown_falls_back() {
        let mut view = ListingView::default();
        view.select(TableName::Returns);
        assert_eq!(view.select_by_name("bogus"), TableName::Products);
        assert_eq!(view.selected(), TableName::Products);
    }

    #[test]
    fn test_text_output_contains_headers_and_placeholder() {
        let store = RecordStore::new();
        let text = ListingView::default().render(&store).to_text();
        assert!(text.starts_with("Products\n"));
        assert!(text.contains("Serial Number"));
        assert!(text.contains("No records found"));
    }

    #[test]
    fn test_plain_output() {
        let store = RecordStore::new();
        store.add_product(ProductFields {
            title: "Oscilloscope".to_string(),
            ..ProductFields::default()
        });
        let plain = ListingView::default().render(&store).to_plain();
        assert!(plain.contains("Title: Oscilloscope"));
        assert!(plain.contains("ID: 1"));
    }

    #[test]
    fn test_json_output() {
        let store = RecordStore::new();
        let mut view = ListingView::default();
        view.select(TableName::Returns);
        assert_eq!(view.format(&store, OutputFormat::Json).unwrap(), "[]");

        store.add_return(ReturnFields {
            employee_id: "EMP002".to_string(),
            ..ReturnFields::default()
        });
        let json = view.format(&store, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["employeeId"], "EMP002");
        assert!(value[0]["returnDate"].is_string());
    }

    #[test]
    fn test_json_output_ids_are_strings() {
        let store = RecordStore::new();
        store.add_product(ProductFields {
            title: "Digital Multimeter".to_string(),
            product_serial_number: "DMM001".to_string(),
            ..ProductFields::default()
        });
        let json = ListingView::default()
            .format(&store, OutputFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value[0]["id"].is_string(), "id serialized as {}", value[0]["id"]);
        assert_eq!(value[0]["id"], store.products()[0].id.to_string());
        assert_eq!(value[0]["productSerialNumber"], "DMM001");
    }
}
