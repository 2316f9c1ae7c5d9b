// src/frame.rs

use arrow::array::{Array, ArrayRef, AsArray, Float64Array};
use arrow::compute::{cast, cast_with_options, concat_batches, is_not_null, sum, CastOptions};
use arrow::datatypes::{DataType, Float64Type, Int64Type, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use crate::error::{BenchError, Result};

/// The CSV payload as parsed: an inferred schema plus its record batches.
#[derive(Debug, Clone)]
pub struct RawRecords {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl RawRecords {
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        RawRecords { schema, batches }
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }
}

/// Columnar view: every batch concatenated into one `RecordBatch`.
#[derive(Debug, Clone)]
pub struct TabularView {
    batch: RecordBatch,
}

impl TabularView {
    pub fn new(records: &RawRecords) -> Result<Self> {
        let batch = concat_batches(records.schema(), records.batches())?;
        Ok(TabularView { batch })
    }

    fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| BenchError::MissingColumn(name.to_string()))
    }

    /// Rows in `name`, counted with a pass over the column's validity.
    /// Null cells count as rows.
    pub fn count(&self, name: &str) -> Result<usize> {
        let valid = is_not_null(self.column(name)?)?;
        Ok(valid.true_count() + valid.false_count())
    }

    /// Column cast to Float64. Text that does not parse as a number, including
    /// text with surrounding whitespace, is a `Coercion` error rather than a null.
    pub fn column_f64(&self, name: &str) -> Result<Float64Array> {
        let column = self.column(name)?;

        let options = CastOptions {
            safe: false,
            ..Default::default()
        };
        match cast_with_options(column, &DataType::Float64, &options) {
            Ok(arr) => Ok(arr.as_primitive::<Float64Type>().clone()),
            Err(err) => match first_unparsable(column) {
                Some((row, value)) => Err(BenchError::Coercion {
                    column: name.to_string(),
                    row,
                    value,
                }),
                None => Err(err.into()),
            },
        }
    }

    /// Sum of a column; nulls are skipped and an all-null column sums to 0.
    pub fn sum(&self, name: &str) -> Result<f64> {
        let values = self.column_f64(name)?;
        Ok(sum(&values).unwrap_or(0.0))
    }
}

/// Locate the first non-null cell whose text form is not a float.
fn first_unparsable(column: &ArrayRef) -> Option<(usize, String)> {
    let text = cast(column, &DataType::Utf8).ok()?;
    text.as_string::<i32>()
        .iter()
        .enumerate()
        .find_map(|(row, v)| match v {
            Some(s) if s.parse::<f64>().is_err() => Some((row, s.to_string())),
            _ => None,
        })
}

/// A single cell of the row-oriented view.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Value {
    /// Numeric reading of the cell: `Ok(None)` for null, `Err` carrying the
    /// raw text when it is not a number. Text is parsed as-is, untrimmed.
    pub fn to_f64(&self) -> std::result::Result<Option<f64>, String> {
        match self {
            Value::Null => Ok(None),
            Value::Integer(i) => Ok(Some(*i as f64)),
            Value::Number(n) => Ok(Some(*n)),
            Value::Text(s) => s.parse::<f64>().map(Some).map_err(|_| s.clone()),
        }
    }
}

/// One record, with column names shared across every row of the view.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    names: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl Row {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| &self.values[idx])
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Row-oriented view over the same records as [`TabularView`].
#[derive(Debug, Clone, Default)]
pub struct RowView {
    rows: Vec<Row>,
}

impl RowView {
    pub fn from_records(records: &RawRecords) -> Result<Self> {
        let names: Arc<Vec<String>> = Arc::new(
            records
                .schema()
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect(),
        );

        let mut rows = Vec::with_capacity(records.num_rows());
        for batch in records.batches() {
            let mut batch_rows: Vec<Vec<Value>> = (0..batch.num_rows())
                .map(|_| Vec::with_capacity(names.len()))
                .collect();

            for column in batch.columns() {
                for (row, value) in column_values(column)?.into_iter().enumerate() {
                    batch_rows[row].push(value);
                }
            }

            rows.extend(batch_rows.into_iter().map(|values| Row {
                names: Arc::clone(&names),
                values,
            }));
        }

        Ok(RowView { rows })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Materialise one Arrow column as row values. Anything that is not a
/// float or an integer is carried as its text form.
fn column_values(column: &ArrayRef) -> Result<Vec<Value>> {
    let values = match column.data_type() {
        DataType::Null => vec![Value::Null; column.len()],
        DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            cast(column, &DataType::Float64)?
                .as_primitive::<Float64Type>()
                .iter()
                .map(|v| v.map_or(Value::Null, Value::Number))
                .collect()
        }
        dt if dt.is_integer() => cast(column, &DataType::Int64)?
            .as_primitive::<Int64Type>()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Integer))
            .collect(),
        _ => cast(column, &DataType::Utf8)?
            .as_string::<i32>()
            .iter()
            .map(|v| v.map_or(Value::Null, |s| Value::Text(s.to_string())))
            .collect(),
    };
    Ok(values)
}
