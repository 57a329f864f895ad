//! Attribute-table glue: field values, the source trait shapes pull rows
//! from, and the byte-level pieces of the dBase codec the shape layer
//! touches (fixed-width number formatting, code-page text encoding).
//!
//! Full `.dbf` parsing lives outside this crate; only the row-by-index
//! contract and the value encodings appear here.

use crate::error::{Result, ShpError};
use crate::io::code_page;
use crate::progress::ProgressSink;
use indexmap::IndexMap;
use std::fmt;

/// One attribute cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Int(i32),
    Real(f64),
    Text(String),
    Bool(bool),
    /// Calendar date, stored as year/month/day the way dBase does.
    Date { year: i32, month: u8, day: u8 },
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, ""),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Real(v) => write!(f, "{v}"),
            FieldValue::Text(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{}", if *v { "T" } else { "F" }),
            FieldValue::Date { year, month, day } => {
                write!(f, "{year:04}{month:02}{day:02}")
            }
        }
    }
}

/// Field descriptor: dBase type character plus fixed width and precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeField {
    pub name: String,
    /// dBase type character: C, N, F, L or D.
    pub field_type: char,
    pub length: u8,
    pub decimals: u8,
}

impl AttributeField {
    pub fn new(name: &str, field_type: char, length: u8, decimals: u8) -> Self {
        AttributeField {
            name: name.to_string(),
            field_type,
            length,
            decimals,
        }
    }
}

/// Format a number into the fixed-width dBase character representation.
///
/// The value is rendered with exactly `decimals` fractional digits and
/// right-aligned into `width` characters. A rendering that does not fit is
/// an error, never a truncation; silently dropping digits would corrupt the
/// value on round-trip.
pub fn encode_number(value: f64, width: u8, decimals: u8) -> Result<String> {
    let rendered = format!("{value:.prec$}", prec = decimals as usize);
    if rendered.len() > width as usize {
        return Err(ShpError::NumberOutOfRange {
            value,
            width,
            decimals,
        });
    }
    Ok(format!("{rendered:>w$}", w = width as usize))
}

/// Encode one cell into its fixed-width byte representation.
///
/// Text is encoded through the table's LDID code page and padded with
/// spaces; null cells become all-space fields.
pub fn encode_value(value: &FieldValue, field: &AttributeField, ldid: u8) -> Result<Vec<u8>> {
    let width = field.length as usize;
    let mut bytes = match value {
        FieldValue::Null => Vec::new(),
        FieldValue::Int(v) => encode_number(*v as f64, field.length, 0)?.into_bytes(),
        FieldValue::Real(v) => encode_number(*v, field.length, field.decimals)?.into_bytes(),
        FieldValue::Text(v) => {
            let raw = code_page::encode_text(v, ldid);
            if raw.len() > width {
                return Err(ShpError::InvalidArgument(format!(
                    "text value does not fit field {} of width {}",
                    field.name, field.length
                )));
            }
            raw
        }
        FieldValue::Bool(v) => vec![if *v { b'T' } else { b'F' }],
        FieldValue::Date { .. } => value.to_string().into_bytes(),
    };
    if bytes.len() > width {
        return Err(ShpError::InvalidArgument(format!(
            "value does not fit field {} of width {}",
            field.name, field.length
        )));
    }
    bytes.resize(width, b' ');
    Ok(bytes)
}

/// Row-by-index attribute supplier consumed by the shape layer.
pub trait AttributeSource {
    /// Fetch `count` rows starting at `start_index`.
    fn get_attributes(&self, start_index: usize, count: usize) -> Result<Vec<Vec<FieldValue>>>;

    /// Replace `rows.len()` rows starting at `start_index`.
    fn set_attributes(&mut self, start_index: usize, rows: Vec<Vec<FieldValue>>) -> Result<()>;

    /// Append one row.
    fn add_row(&mut self, row: Vec<FieldValue>) -> Result<()>;

    /// Overwrite one row in place.
    fn edit(&mut self, index: usize, values: Vec<FieldValue>) -> Result<()>;

    fn num_rows(&self) -> usize;

    /// Count rows matching each `field=value` expression, optionally over a
    /// leading sample only, reporting progress per row scanned.
    fn get_counts(
        &self,
        expressions: &[String],
        progress: &mut dyn ProgressSink,
        sample_size: Option<usize>,
    ) -> Result<Vec<usize>>;
}

/// In-memory attribute table.
///
/// Fields keep insertion order and are addressed by name; rows are dense
/// vectors with one cell per field.
#[derive(Debug)]
pub struct MemoryAttributeSource {
    fields: IndexMap<String, AttributeField>,
    rows: Vec<Vec<FieldValue>>,
    /// Code page of the table, used when cells are serialized.
    pub ldid: u8,
}

impl MemoryAttributeSource {
    pub fn new() -> Self {
        MemoryAttributeSource {
            fields: IndexMap::new(),
            rows: Vec::new(),
            ldid: 0x57,
        }
    }

    /// Add a field; only valid while the table has no rows.
    pub fn add_field(&mut self, field: AttributeField) -> Result<()> {
        if !self.rows.is_empty() {
            return Err(ShpError::InvalidArgument(
                "cannot add a field to a table that already has rows".to_string(),
            ));
        }
        self.fields.insert(field.name.clone(), field);
        Ok(())
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, name: &str) -> Option<&AttributeField> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &AttributeField> {
        self.fields.values()
    }

    fn check_row(&self, row: &[FieldValue]) -> Result<()> {
        if row.len() != self.fields.len() {
            return Err(ShpError::InvalidArgument(format!(
                "row has {} values but the table has {} fields",
                row.len(),
                self.fields.len()
            )));
        }
        Ok(())
    }
}

impl Default for MemoryAttributeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeSource for MemoryAttributeSource {
    fn get_attributes(&self, start_index: usize, count: usize) -> Result<Vec<Vec<FieldValue>>> {
        if start_index + count > self.rows.len() {
            return Err(ShpError::InvalidArgument(format!(
                "row range {}..{} out of bounds for {} rows",
                start_index,
                start_index + count,
                self.rows.len()
            )));
        }
        Ok(self.rows[start_index..start_index + count].to_vec())
    }

    fn set_attributes(&mut self, start_index: usize, rows: Vec<Vec<FieldValue>>) -> Result<()> {
        if start_index + rows.len() > self.rows.len() {
            return Err(ShpError::InvalidArgument(format!(
                "row range {}..{} out of bounds for {} rows",
                start_index,
                start_index + rows.len(),
                self.rows.len()
            )));
        }
        for (i, row) in rows.into_iter().enumerate() {
            self.check_row(&row)?;
            self.rows[start_index + i] = row;
        }
        Ok(())
    }

    fn add_row(&mut self, row: Vec<FieldValue>) -> Result<()> {
        self.check_row(&row)?;
        self.rows.push(row);
        Ok(())
    }

    fn edit(&mut self, index: usize, values: Vec<FieldValue>) -> Result<()> {
        if index >= self.rows.len() {
            return Err(ShpError::InvalidArgument(format!(
                "row index {index} out of bounds for {} rows",
                self.rows.len()
            )));
        }
        self.check_row(&values)?;
        self.rows[index] = values;
        Ok(())
    }

    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn get_counts(
        &self,
        expressions: &[String],
        progress: &mut dyn ProgressSink,
        sample_size: Option<usize>,
    ) -> Result<Vec<usize>> {
        // Expressions are simple "field=value" equality tests against the
        // displayed cell text.
        let mut tests = Vec::with_capacity(expressions.len());
        for expr in expressions {
            let (name, wanted) = expr.split_once('=').ok_or_else(|| {
                ShpError::InvalidArgument(format!("malformed count expression: {expr}"))
            })?;
            let column = self.fields.get_index_of(name.trim()).ok_or_else(|| {
                ShpError::InvalidArgument(format!("unknown field in count expression: {name}"))
            })?;
            tests.push((column, wanted.trim().to_string()));
        }

        let limit = sample_size
            .map(|n| n.min(self.rows.len()))
            .unwrap_or(self.rows.len());
        let mut counts = vec![0usize; tests.len()];
        for (i, row) in self.rows[..limit].iter().enumerate() {
            for (slot, (column, wanted)) in tests.iter().enumerate() {
                if row[*column].to_string() == *wanted {
                    counts[slot] += 1;
                }
            }
            progress.update(i as u64 + 1, limit as u64);
            if progress.is_cancelled() {
                return Err(ShpError::Cancelled);
            }
        }
        Ok(counts)
    }
}
