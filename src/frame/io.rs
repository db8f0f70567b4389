//! File codecs: newline-delimited JSON, CSV and Parquet
//!
//! Readers infer the schema from the data, the way a dataframe library reading an
//! untyped file would; the model's cast rules bring the columns to their declared types.

use arrow::compute::concat_batches;
use arrow::csv::reader::Format as CsvFormat;
use arrow::json::reader::infer_json_schema_from_seekable;
use arrow::json::LineDelimitedWriter;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::file::reader::ChunkReader;
use std::io::{BufRead, Read, Seek, Write};
use std::sync::Arc;

use super::error::FrameError;

/// Read newline-delimited JSON into a single batch
pub fn read_json<R: BufRead + Seek>(mut reader: R) -> Result<RecordBatch, FrameError> {
    let (schema, _) = infer_json_schema_from_seekable(&mut reader, None)?;
    reader.rewind()?;

    let schema = Arc::new(schema);
    let batches = arrow::json::ReaderBuilder::new(schema.clone())
        .build(reader)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

/// Write a batch as newline-delimited JSON
pub fn write_json<W: Write>(writer: W, batch: &RecordBatch) -> Result<(), FrameError> {
    let mut writer = LineDelimitedWriter::new(writer);
    writer.write_batches(&[batch])?;
    writer.finish()?;
    Ok(())
}

/// Read a CSV file with a header row into a single batch
pub fn read_csv<R: Read + Seek>(mut reader: R) -> Result<RecordBatch, FrameError> {
    let (schema, _) = CsvFormat::default()
        .with_header(true)
        .infer_schema(&mut reader, None)?;
    reader.rewind()?;

    let schema = Arc::new(schema);
    let batches = arrow::csv::ReaderBuilder::new(schema.clone())
        .with_header(true)
        .build(reader)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

/// Write a batch as CSV with a header row
pub fn write_csv<W: Write>(writer: W, batch: &RecordBatch) -> Result<(), FrameError> {
    let mut writer = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .build(writer);
    writer.write(batch)?;
    Ok(())
}

/// Read every row group of a Parquet file into a single batch
pub fn read_parquet<R: ChunkReader + 'static>(reader: R) -> Result<RecordBatch, FrameError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
    let schema = builder.schema().clone();
    let batches = builder.build()?.collect::<Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

/// Write a batch as a Parquet file
pub fn write_parquet<W: Write + Send>(writer: W, batch: &RecordBatch) -> Result<(), FrameError> {
    let mut writer = ArrowWriter::try_new(writer, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}
