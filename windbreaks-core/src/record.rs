//! Tabular records and the in-memory table that carries them.
//!
//! Cells are typed once when they are read: empty cells become
//! [`AttributeValue::Missing`], anything that parses as a number becomes
//! [`AttributeValue::Number`] and the rest is kept as text.

use std::fmt;

use crate::Crs;

/// A single typed cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttributeValue {
    /// The cell was empty or held `NaN`.
    #[default]
    Missing,
    /// A numeric cell.
    Number(f64),
    /// Any other cell.
    Text(String),
}

impl AttributeValue {
    /// Type a raw cell.
    ///
    /// # Examples
    /// ```
    /// use windbreaks_core::AttributeValue;
    ///
    /// assert_eq!(AttributeValue::parse(" 42.5 "), AttributeValue::Number(42.5));
    /// assert_eq!(AttributeValue::parse(""), AttributeValue::Missing);
    /// assert_eq!(AttributeValue::parse("KS"), AttributeValue::Text("KS".into()));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_nan() => Self::Missing,
            Ok(value) => Self::Number(value),
            Err(_) => Self::Text(trimmed.to_owned()),
        }
    }

    /// Finite numeric value of the cell, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    /// Text content of the cell, if it holds text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Whether the cell is empty.
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Self::Missing
        } else {
            Self::Number(value)
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A tabular row: named attributes in column order.
///
/// # Examples
/// ```
/// use windbreaks_core::{AttributeValue, Record};
///
/// let record = Record::from_fields([
///     ("BEGIN_LAT", AttributeValue::Number(42.0)),
///     ("EVENT_TYPE", AttributeValue::from("Hail")),
/// ]);
/// assert_eq!(record.number("BEGIN_LAT"), Some(42.0));
/// assert_eq!(record.number("EVENT_TYPE"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, AttributeValue)>,
}

impl Record {
    /// Create an empty record.
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Build a record from `(name, value)` pairs. Later duplicates replace
    /// earlier values.
    pub fn from_fields<N, I>(fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, AttributeValue)>,
    {
        let mut record = Self::new();
        for (name, value) in fields {
            record.insert(name, value);
        }
        record
    }

    /// Set a field, returning the previous value when the field existed.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: AttributeValue,
    ) -> Option<AttributeValue> {
        let name = name.into();
        if let Some((_, existing)) = self.fields.iter_mut().find(|(field, _)| *field == name) {
            return Some(std::mem::replace(existing, value));
        }
        self.fields.push((name, value));
        None
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Finite numeric value of a field.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(AttributeValue::as_number)
    }

    /// Text value of a field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_text)
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        let index = self.fields.iter().position(|(field, _)| field == name)?;
        Some(self.fields.remove(index).1)
    }

    /// Iterate over `(name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Field names in column order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Inferred type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-missing cell is numeric.
    Number,
    /// Every non-missing cell is text.
    Text,
    /// Both numeric and text cells are present.
    Mixed,
    /// The column holds no values.
    Empty,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Number => "float64",
            Self::Text => "object",
            Self::Mixed => "mixed",
            Self::Empty => "empty",
        };
        f.write_str(label)
    }
}

/// Description of one column as reported by [`Table::describe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummary {
    /// Zero-based column position.
    pub index: usize,
    /// Column name.
    pub name: String,
    /// Inferred column type.
    pub kind: ColumnKind,
}

/// An in-memory table: ordered column names plus records.
///
/// A table may carry a CRS, in which case ingestion keeps it rather than
/// defaulting to NAD83.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    records: Vec<Record>,
    crs: Option<Crs>,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new<N: Into<String>>(columns: impl IntoIterator<Item = N>) -> Self {
        let mut table = Self::default();
        for column in columns {
            table.add_column(column.into());
        }
        table
    }

    /// Attach a CRS to the table.
    #[must_use]
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    /// Append a record, registering any columns the table has not seen.
    pub fn push(&mut self, record: Record) {
        for name in record.names() {
            if !self.has_column(name) {
                self.columns.push(name.to_owned());
            }
        }
        self.records.push(record);
    }

    fn add_column(&mut self, name: String) {
        if !self.has_column(&name) {
            self.columns.push(name);
        }
    }

    /// Whether the table has a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Records in order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Mutable access to the records.
    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    /// Consume the table, yielding its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// CRS carried by the table, if any.
    pub const fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keep only the records matching `predicate`.
    #[must_use]
    pub fn filter(mut self, mut predicate: impl FnMut(&Record) -> bool) -> Self {
        self.records.retain(|record| predicate(record));
        self
    }

    /// Concatenate tables, taking the union of their columns in order of
    /// first appearance. The CRS of the first table that has one is kept.
    ///
    /// # Examples
    /// ```
    /// use windbreaks_core::{AttributeValue, Record, Table};
    ///
    /// let mut first = Table::new(["a"]);
    /// first.push(Record::from_fields([("a", AttributeValue::Number(1.0))]));
    /// let mut second = Table::new(["b"]);
    /// second.push(Record::from_fields([("b", AttributeValue::Number(2.0))]));
    ///
    /// let combined = Table::concat([first, second]);
    /// assert_eq!(combined.columns(), ["a", "b"]);
    /// assert_eq!(combined.len(), 2);
    /// ```
    pub fn concat(tables: impl IntoIterator<Item = Self>) -> Self {
        let mut combined = Self::default();
        for table in tables {
            for column in table.columns {
                combined.add_column(column);
            }
            if combined.crs.is_none() {
                combined.crs = table.crs;
            }
            combined.records.extend(table.records);
        }
        combined
    }

    /// Describe each column: position, name and inferred type.
    pub fn describe(&self) -> Vec<ColumnSummary> {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, name)| ColumnSummary {
                index,
                name: name.clone(),
                kind: self.column_kind(name),
            })
            .collect()
    }

    /// Infer the type of one column.
    pub fn column_kind(&self, name: &str) -> ColumnKind {
        let mut numbers = false;
        let mut texts = false;
        for value in self.records.iter().filter_map(|record| record.get(name)) {
            match value {
                AttributeValue::Number(_) => numbers = true,
                AttributeValue::Text(_) => texts = true,
                AttributeValue::Missing => {}
            }
        }
        match (numbers, texts) {
            (true, true) => ColumnKind::Mixed,
            (true, false) => ColumnKind::Number,
            (false, true) => ColumnKind::Text,
            (false, false) => ColumnKind::Empty,
        }
    }
}
