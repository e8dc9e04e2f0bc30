//! Conversion of Arrow record batches into [`Dataset`]s.

use crate::core::{Dataset, Value};
use crate::prelude::*;
use arrow::array::{
    Array, ArrayRef, BinaryArray, BooleanArray, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray, UInt64Array,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;

/// Converts record batches into a dataset.
///
/// Batches are concatenated in order and rows are indexed by their 0-based
/// position across all batches. An empty batch list yields an empty dataset.
pub fn record_batches_to_dataset(batches: &[RecordBatch]) -> Result<Dataset> {
    let Some(first) = batches.first() else {
        return Ok(Dataset::new());
    };
    let schema = first.schema();
    let total_rows = batches.iter().map(RecordBatch::num_rows).sum();

    let mut builder = Dataset::builder();
    for (position, field) in schema.fields().iter().enumerate() {
        let mut values = Vec::with_capacity(total_rows);
        for batch in batches {
            let column = batch.columns().get(position).ok_or_else(|| {
                TermError::data_source(
                    "arrow",
                    format!("record batch is missing column '{}'", field.name()),
                )
            })?;
            append_values(column, &mut values)?;
        }
        builder = builder.column(field.name().clone(), values);
    }
    builder.build()
}

fn append_values(array: &ArrayRef, out: &mut Vec<Value>) -> Result<()> {
    match array.data_type() {
        DataType::Null => out.extend(std::iter::repeat(Value::Null).take(array.len())),
        DataType::Boolean => {
            let typed = downcast::<BooleanArray>(array)?;
            out.extend(typed.iter().map(|v| v.map_or(Value::Null, Value::Bool)));
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let widened = cast(array, &DataType::Int64)?;
            let typed = downcast::<Int64Array>(&widened)?;
            out.extend(typed.iter().map(|v| v.map_or(Value::Null, Value::Int)));
        }
        DataType::UInt64 => {
            // Values beyond i64::MAX keep their magnitude as floats.
            let typed = downcast::<UInt64Array>(array)?;
            out.extend(typed.iter().map(|v| match v {
                None => Value::Null,
                Some(v) => i64::try_from(v).map_or(Value::Float(v as f64), Value::Int),
            }));
        }
        DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let widened = cast(array, &DataType::Float64)?;
            let typed = downcast::<Float64Array>(&widened)?;
            out.extend(typed.iter().map(|v| v.map_or(Value::Null, Value::Float)));
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let strings = cast(array, &DataType::Utf8)?;
            let typed = downcast::<StringArray>(&strings)?;
            out.extend(
                typed
                    .iter()
                    .map(|v| v.map_or(Value::Null, |s| Value::Str(s.to_string()))),
            );
        }
        DataType::Binary | DataType::LargeBinary | DataType::BinaryView => {
            let bytes = cast(array, &DataType::Binary)?;
            let typed = downcast::<BinaryArray>(&bytes)?;
            out.extend(
                typed
                    .iter()
                    .map(|v| v.map_or(Value::Null, |b| Value::Bytes(b.to_vec()))),
            );
        }
        DataType::Date32 | DataType::Date64 => {
            let micros = cast(array, &DataType::Timestamp(TimeUnit::Microsecond, None))?;
            let typed = downcast::<TimestampMicrosecondArray>(&micros)?;
            for v in typed.iter() {
                out.push(v.map_or(Ok(Value::Null), micros_to_value)?);
            }
        }
        DataType::Timestamp(unit, _) => {
            // Zoned timestamps keep their UTC wall time.
            let raw = cast(array, &DataType::Int64)?;
            let typed = downcast::<Int64Array>(&raw)?;
            let (multiplier, divisor) = match unit {
                TimeUnit::Second => (1_000_000, 1),
                TimeUnit::Millisecond => (1_000, 1),
                TimeUnit::Microsecond => (1, 1),
                TimeUnit::Nanosecond => (1, 1_000),
            };
            for v in typed.iter() {
                out.push(match v {
                    None => Value::Null,
                    Some(v) => {
                        let micros = v.checked_mul(multiplier).ok_or_else(|| {
                            TermError::Parse(format!("timestamp {v} is out of range"))
                        })?;
                        micros_to_value(micros.div_euclid(divisor))?
                    }
                });
            }
        }
        other => {
            return Err(TermError::type_mismatch(
                "boolean, integer, float, string, binary, date or timestamp column",
                other.to_string(),
            ))
        }
    }
    Ok(())
}

fn micros_to_value(micros: i64) -> Result<Value> {
    DateTime::from_timestamp_micros(micros)
        .map(|dt| Value::DateTime(dt.naive_utc()))
        .ok_or_else(|| TermError::Parse(format!("timestamp {micros}us is out of range")))
}

fn downcast<T: 'static>(array: &ArrayRef) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        TermError::Internal(format!(
            "unexpected array layout for type {}",
            array.data_type()
        ))
    })
}
