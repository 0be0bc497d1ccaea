// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Output encodings for records and batches.
///
/// Three encodings are supported, selected by the output file extension:
///
/// * text (`.txt`): one `key: value` line per field, collections kept in their
///   bracketed single-line form; batch records separated by a blank line.
/// * tabular (`.csv`): one header row and one row per record, after
///   [`flatten`]ing lists and mappings into `|`-joined strings. A batch header
///   is the sorted union of every record's keys.
/// * structured (`.json`): nested, pretty-printed with two-space indentation,
///   non-ASCII characters written literally.
use std::{
    collections::BTreeSet,
    io,
    path::Path,
};

use tracing::info;

use crate::{
    console,
    error::Error,
    file,
    record::{Record, Scalar, Value},
};

/// Separator used when collapsing collections into one cell.
const CELL_SEPARATOR: &str = "|";

/// Encoding selected for an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum OutputFormat
{
    Text,
    Csv,
    Json,
}

impl OutputFormat
{
    /// Selects the encoding from the path's trailing extension
    /// (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for any extension other than
    /// `txt`, `csv` or `json`, or when the path has none.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    ///
    /// use gitfo::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::from_path(Path::new("repos.CSV"),)?, OutputFormat::Csv);
    /// assert!(OutputFormat::from_path(Path::new("output.xyz"),).is_err());
    /// # Ok::<(), gitfo::Error>(())
    /// ```
    pub fn from_path(path: &Path,) -> Result<Self, Error,>
    {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str(),)
            .map(str::to_ascii_lowercase,);

        match extension.as_deref() {
            Some("txt",) => Ok(Self::Text,),
            Some("csv",) => Ok(Self::Csv,),
            Some("json",) => Ok(Self::Json,),
            _ => Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            },),
        }
    }
}

/// Prints one record to stdout with console emphasis.
///
/// # Errors
///
/// Returns [`Error::Console`] when stdout cannot be written.
pub fn render_to_console(record: &Record,) -> Result<(), Error,>
{
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    console::write_record(&mut handle, record,).map_err(|source| Error::Console {
        source,
    },)
}

/// Writes one record to `path`, encoded according to its extension.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] before touching the filesystem when
/// the extension is not supported. Encoding and write failures leave no file
/// behind.
pub fn render_to_file(record: &Record, path: &Path,) -> Result<(), Error,>
{
    let format = OutputFormat::from_path(path,)?;
    let bytes = encode_record(record, format,)?;
    file::write_output(path, &bytes,)?;
    info!("wrote 1 record to {}", path.display());
    Ok((),)
}

/// Writes every record of a batch to `path`, encoded according to its
/// extension.
///
/// # Errors
///
/// See [`render_to_file`].
pub fn render_batch_to_file(records: &[Record], path: &Path,) -> Result<(), Error,>
{
    let format = OutputFormat::from_path(path,)?;
    let bytes = encode_batch(records, format,)?;
    file::write_output(path, &bytes,)?;
    info!("wrote {} records to {}", records.len(), path.display());
    Ok((),)
}

/// Encodes a single record.
///
/// # Errors
///
/// Returns [`Error::Serialize`] or [`Error::Csv`] when the encoder fails.
pub fn encode_record(record: &Record, format: OutputFormat,) -> Result<Vec<u8,>, Error,>
{
    match format {
        OutputFormat::Text => Ok(text_block(record,).into_bytes(),),
        OutputFormat::Csv => {
            let flat = flatten(record,);
            let header: Vec<String,> = flat.keys().map(str::to_owned,).collect();
            csv_table(&header, std::slice::from_ref(&flat,),)
        }
        OutputFormat::Json => json_document(record,),
    }
}

/// Encodes a batch of records.
///
/// # Errors
///
/// Returns [`Error::Serialize`] or [`Error::Csv`] when the encoder fails.
pub fn encode_batch(records: &[Record], format: OutputFormat,) -> Result<Vec<u8,>, Error,>
{
    match format {
        OutputFormat::Text => {
            let blocks: Vec<String,> = records.iter().map(text_block,).collect();
            Ok(blocks.join("\n",).into_bytes(),)
        }
        OutputFormat::Csv => {
            let flat: Vec<Record,> = records.iter().map(flatten,).collect();
            csv_table(&batch_header(&flat,), &flat,)
        }
        OutputFormat::Json => json_document(&records,),
    }
}

/// Collapses lists and mappings into single `|`-joined strings.
///
/// Lists join their elements; mappings join `key:value` pairs in mapping
/// order. Scalars are left untouched, so flattening a flat record is a no-op.
///
/// # Examples
///
/// ```
/// use gitfo::{Record, Scalar, Value, flatten};
///
/// let record = Record::new().with("array", vec![Scalar::from("item1",), Scalar::from("item2",)],);
/// assert_eq!(flatten(&record,).get("array"), Some(&Value::from("item1|item2")));
/// ```
pub fn flatten(record: &Record,) -> Record
{
    record.iter().map(|(key, value,)| (key, Value::Scalar(flatten_value(value,),),),).collect()
}

/// Sorted union of the keys of every record.
pub fn batch_header(records: &[Record],) -> Vec<String,>
{
    let keys: BTreeSet<&str,> = records.iter().flat_map(Record::keys,).collect();
    keys.into_iter().map(str::to_owned,).collect()
}

fn flatten_value(value: &Value,) -> Scalar
{
    match value {
        Value::Scalar(scalar,) => scalar.clone(),
        Value::List(items,) => {
            let parts: Vec<String,> = items.iter().map(Scalar::to_string,).collect();
            Scalar::Str(parts.join(CELL_SEPARATOR,),)
        }
        Value::Mapping(mapping,) => {
            let parts: Vec<String,> =
                mapping.iter().map(|(key, value,)| format!("{key}:{value}"),).collect();
            Scalar::Str(parts.join(CELL_SEPARATOR,),)
        }
    }
}

fn text_block(record: &Record,) -> String
{
    record.iter().map(|(key, value,)| format!("{key}: {}\n", value.to_text()),).collect()
}

fn csv_table(header: &[String], rows: &[Record],) -> Result<Vec<u8,>, Error,>
{
    if header.is_empty() {
        return Ok(Vec::new(),);
    }

    let mut writer = csv::Writer::from_writer(Vec::new(),);
    writer.write_record(header,)?;
    for row in rows {
        let cells = header.iter().map(|key| match row.get(key,) {
            Some(value,) => flatten_value(value,).to_string(),
            None => String::new(),
        },);
        writer.write_record(cells,)?;
    }

    writer.into_inner().map_err(|error| Error::from(csv::Error::from(error.into_error(),),),)
}

fn json_document<T: serde::Serialize + ?Sized,>(value: &T,) -> Result<Vec<u8,>, Error,>
{
    let mut bytes = serde_json::to_vec_pretty(value,)?;
    bytes.push(b'\n',);
    Ok(bytes,)
}
