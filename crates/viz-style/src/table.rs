//! Accessible table transform, shared by the standalone table style and the
//! table attached to every chart.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use viz_core::{FieldCatalog, Record};

use crate::settings::DataSettings;

/// One table cell. `scope` is set on header cells for accessibility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    pub data: Value,
    pub header: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TableCell {
    pub fn header(data: impl Into<Value>, scope: &str) -> Self {
        Self {
            data: data.into(),
            header: true,
            scope: Some(scope.to_string()),
        }
    }

    pub fn row(data: impl Into<Value>) -> Self {
        Self {
            data: data.into(),
            header: false,
            scope: None,
        }
    }
}

/// Which fields act as headers when building a table.
#[derive(Debug, Clone, Default)]
pub struct TableShape {
    /// Field whose values become the column headers; switches to one row
    /// per selected field.
    pub table_header_field: Option<String>,
    /// Field whose value leads each row as a row header.
    pub row_header_field: Option<String>,
}

impl TableShape {
    fn has_any_header(&self) -> bool {
        self.table_header_field.is_some() || self.row_header_field.is_some()
    }
}

/// Column header cells. A leading empty cell aligns the headers when rows
/// carry their own header cell.
pub fn table_header(
    data: &DataSettings,
    catalog: &FieldCatalog,
    records: &[(String, Record)],
    shape: &TableShape,
) -> Vec<TableCell> {
    let mut header = Vec::new();
    if shape.has_any_header() {
        header.push(TableCell::row(""));
    }

    match &shape.table_header_field {
        Some(field) => {
            for (_, record) in records.iter().filter(|(_, r)| r.has_field(field)) {
                header.push(TableCell::header(record.text(field), "col"));
            }
        }
        None => {
            for label in data.field_labels(catalog).values() {
                header.push(TableCell::header(label.clone(), "col"));
            }
        }
    }
    header
}

/// Table body. With a table-header field the table is transposed: one row
/// per selected field, one column per record. Otherwise one row per record.
pub fn table_rows(
    data: &DataSettings,
    catalog: &FieldCatalog,
    records: &[(String, Record)],
    shape: &TableShape,
) -> Vec<Vec<TableCell>> {
    let mut rows = Vec::new();

    if shape.table_header_field.is_some() {
        for field in data.selected_fields() {
            let mut row = vec![TableCell::header(data.field_label(&field, catalog), "row")];
            for (_, record) in records {
                row.push(TableCell::row(record.text(&field)));
            }
            rows.push(row);
        }
    } else {
        for (_, record) in records {
            let mut row = Vec::new();
            if let Some(field) = &shape.row_header_field {
                row.push(TableCell::header(record.text(field), "row"));
            }
            for field in data.selected_fields() {
                row.push(TableCell::row(record.text(&field)));
            }
            rows.push(row);
        }
    }
    rows
}

/// The full table specification for one record group.
pub fn table_build_settings(
    data: &DataSettings,
    catalog: &FieldCatalog,
    records: &[(String, Record)],
    shape: &TableShape,
) -> Value {
    json!({
        "data": serde_json::to_value(table_rows(data, catalog, records, shape)).unwrap_or(Value::Null),
        "columns": serde_json::to_value(table_header(data, catalog, records, shape)).unwrap_or(Value::Null),
    })
}

/// Options for the standalone `table` style.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TableConfig {
    pub datatable: bool,
    pub table_header_field: String,
    pub row_header_field: String,
    pub options: TableOptions,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            datatable: true,
            table_header_field: String::new(),
            row_header_field: String::new(),
            options: TableOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TableOptions {
    pub page_length: u32,
    pub searching: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_length: 10,
            searching: true,
        }
    }
}

impl TableConfig {
    pub fn shape(&self) -> TableShape {
        TableShape {
            table_header_field: Some(self.table_header_field.clone())
                .filter(|f| !f.is_empty()),
            row_header_field: Some(self.row_header_field.clone()).filter(|f| !f.is_empty()),
        }
    }
}
