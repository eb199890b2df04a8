//! Decode an Athena result CSV into columns and string rows.
//!
//! The header names the columns; column types are inferred from the values
//! with Arrow's CSV reader and reported with Athena type names. Cell text is
//! read back as written, so `007` stays `007` in a `bigint` column.

use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};

use crate::error::AthenaError;
use crate::table::TableColumn;

/// Decoded CSV body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedCsv {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Decode `body` as UTF-8 CSV with a header row.
///
/// Empty cells become `None`. An empty body yields no columns and no rows.
pub fn decode_csv(body: &[u8]) -> Result<DecodedCsv, AthenaError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| AthenaError::Parse(format!("result object is not valid UTF-8: {e}")))?;
    if text.trim().is_empty() {
        return Ok(DecodedCsv::default());
    }

    let format = Format::default().with_header(true);
    let (schema, _) = format.infer_schema(Cursor::new(text.as_bytes()), None)?;

    let columns: Vec<TableColumn> = schema
        .fields()
        .iter()
        .map(|field| TableColumn {
            name: field.name().clone(),
            data_type: athena_type_name(field.data_type()).to_string(),
        })
        .collect();

    // Values are read as text; the inferred types only name the columns.
    let text_schema = Schema::new(
        schema
            .fields()
            .iter()
            .map(|field| Field::new(field.name(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    );
    let reader = ReaderBuilder::new(Arc::new(text_schema))
        .with_format(format)
        .build(Cursor::new(text.as_bytes()))?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch?;
        let strings = batch
            .columns()
            .iter()
            .map(|array| {
                array.as_string_opt::<i32>().ok_or_else(|| {
                    AthenaError::Parse(format!("expected a text column, got {}", array.data_type()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            let record = strings
                .iter()
                .map(|array| {
                    if array.is_null(row) {
                        None
                    } else {
                        Some(array.value(row).to_string())
                    }
                })
                .collect();
            rows.push(record);
        }
    }

    Ok(DecodedCsv { columns, rows })
}

/// Athena name for an inferred Arrow type.
fn athena_type_name(data_type: &DataType) -> &'static str {
    match data_type {
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => "bigint",
        DataType::Float16 | DataType::Float32 | DataType::Float64 => "double",
        DataType::Boolean => "boolean",
        DataType::Date32 | DataType::Date64 => "date",
        DataType::Timestamp(_, _) => "timestamp",
        _ => "varchar",
    }
}
