//! Tabular Loader: CSV and Parquet payloads as Arrow record batches.
//!
//! Decoding always yields a single [`RecordBatch`]. CSV columns are read as
//! nullable UTF-8 with no type inference; the consumer decides how to
//! interpret each cell. Parquet columns keep their stored types.
//!
//! The CSV delimiter is detected from the header line: a tab anywhere in the
//! header selects tab-separated parsing, otherwise comma. Header names are
//! trimmed, which lets the whitespace-padded BLS `pr.data.*` files load as-is.

use std::io::Cursor;
use std::str::FromStr;
use std::sync::Arc;

use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};

use quest_types::StoreLocation;

use crate::blob::BlobStore;
use crate::error::TableError;

/// Rows per decoded CSV batch before concatenation.
const CSV_BATCH_SIZE: usize = 8192;

/// Serialized table formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// Delimited text with a header row.
    Csv,
    /// Apache Parquet.
    Parquet,
}

impl TableFormat {
    /// Content type written alongside encoded tables.
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Parquet => "application/octet-stream",
        }
    }
}

impl FromStr for TableFormat {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            other => Err(TableError::UnsupportedFormat(other.to_owned())),
        }
    }
}

impl core::fmt::Display for TableFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Parquet => f.write_str("parquet"),
        }
    }
}

/// Decode a payload into a single record batch.
///
/// # Errors
///
/// Returns [`TableError`] if the payload is not valid for `format`.
pub fn decode_table(body: &Bytes, format: TableFormat) -> Result<RecordBatch, TableError> {
    match format {
        TableFormat::Csv => decode_csv(body),
        TableFormat::Parquet => decode_parquet(body.clone()),
    }
}

/// Encode a record batch. Returns the payload and its content type.
///
/// # Errors
///
/// Returns [`TableError`] if the batch cannot be encoded.
pub fn encode_table(
    batch: &RecordBatch,
    format: TableFormat,
) -> Result<(Bytes, &'static str), TableError> {
    let body = match format {
        TableFormat::Csv => {
            let mut writer = WriterBuilder::new().with_header(true).build(Vec::new());
            writer.write(batch)?;
            writer.into_inner()
        }
        TableFormat::Parquet => {
            let mut buf = Vec::new();
            let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), None)?;
            writer.write(batch)?;
            writer.close()?;
            buf
        }
    };
    Ok((Bytes::from(body), format.content_type()))
}

/// Read and decode the table stored at `location + name`.
///
/// # Errors
///
/// Returns [`TableError::Store`] if the object cannot be read, or a codec
/// error if it cannot be decoded.
pub async fn read_table<S>(
    store: &S,
    location: &StoreLocation,
    name: &str,
    format: TableFormat,
) -> Result<RecordBatch, TableError>
where
    S: BlobStore + ?Sized,
{
    let body = store.get(&location.bucket, &location.key(name)).await?;
    let batch = decode_table(&body, format)?;
    tracing::debug!(
        uri = location.uri(name),
        %format,
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "loaded table"
    );
    Ok(batch)
}

/// Encode `batch` and store it at `location + name`.
///
/// # Errors
///
/// Returns [`TableError`] if encoding or the write fails.
pub async fn write_table<S>(
    store: &S,
    location: &StoreLocation,
    name: &str,
    batch: &RecordBatch,
    format: TableFormat,
) -> Result<(), TableError>
where
    S: BlobStore + ?Sized,
{
    let (body, content_type) = encode_table(batch, format)?;
    store
        .put(&location.bucket, &location.key(name), body, content_type)
        .await?;
    tracing::debug!(uri = location.uri(name), %format, rows = batch.num_rows(), "stored table");
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn decode_csv(body: &Bytes) -> Result<RecordBatch, TableError> {
    let text = std::str::from_utf8(body)?;
    let header = text.lines().next().unwrap_or_default().trim_end_matches('\r');
    if header.trim().is_empty() {
        return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
    }

    let delimiter = if header.contains('\t') { b'\t' } else { b',' };
    let schema = header_schema(header, char::from(delimiter));

    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(true)
        .with_delimiter(delimiter)
        .with_batch_size(CSV_BATCH_SIZE)
        .build(Cursor::new(body.as_ref()))?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(arrow::compute::concat_batches(&schema, &batches)?)
}

/// All-UTF-8 schema from a header line, names trimmed of padding and quotes.
fn header_schema(header: &str, delimiter: char) -> SchemaRef {
    let fields: Vec<Field> = header
        .split(delimiter)
        .map(|name| Field::new(name.trim().trim_matches('"'), DataType::Utf8, true))
        .collect();
    Arc::new(Schema::new(fields))
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

fn decode_parquet(body: Bytes) -> Result<RecordBatch, TableError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(body)?;
    let schema = Arc::clone(builder.schema());
    let reader = builder.build()?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(arrow::compute::concat_batches(&schema, &batches)?)
}
