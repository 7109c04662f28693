//! Loosely-typed tabular data
//!
//! Snapshot files are wide CSV tables whose column set drifts between scraper
//! revisions. [`Frame`] keeps them as named columns of [`Cell`]s until the
//! [`ColumnNormalizer`](crate::normalize::ColumnNormalizer) has canonicalized
//! the values and the typed records in [`record`](crate::record) are extracted.

use std::{
    collections::HashMap,
    fmt, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, SecondsFormat, Utc};

/// A single table value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Instant(DateTime<Utc>),
}

impl Cell {
    fn from_field(field: &str) -> Self {
        if field.is_empty() {
            Cell::Null
        } else {
            Cell::Text(field.to_owned())
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(v) => Some(*v),
            _ => None,
        }
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Cell::Instant(v) => Some(*v),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Text(_) => "text",
            Cell::Integer(_) => "integer",
            Cell::Float(_) => "float",
            Cell::Bool(_) => "bool",
            Cell::Instant(_) => "instant",
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(v) => write!(f, "{v}"),
            Cell::Instant(v) => f.write_str(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

impl From<DateTime<Utc>> for Cell {
    fn from(value: DateTime<Utc>) -> Self {
        Cell::Instant(value)
    }
}

impl From<Option<i64>> for Cell {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Cell::Null, Cell::Integer)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_owned())
    }
}

impl From<Option<&str>> for Cell {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Cell::Null, Cell::from)
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum FrameError {
    #[display("failed to read CSV file {}", path.display())]
    Read { path: PathBuf, source: csv::Error },
    #[display("failed to write CSV file {}", path.display())]
    Write { path: PathBuf, source: csv::Error },
    #[display("row has {found} cells but the table has {expected} columns")]
    RowWidth { expected: usize, found: usize },
}

/// Structural problems found while extracting typed records from a [`Frame`].
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SchemaError {
    #[display("required column '{column}' is missing")]
    MissingColumn { column: String },
    #[display("column '{column}' row {row}: expected {expected}, found {found}")]
    InvalidCell {
        column: String,
        row: usize,
        expected: &'static str,
        found: &'static str,
    },
}

/// Named columns of [`Cell`] rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Frame {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: vec![],
        }
    }

    /// Reads a CSV file with a header row. Empty fields become [`Cell::Null`],
    /// everything else [`Cell::Text`].
    pub fn read_csv<P>(path: P) -> Result<Self, FrameError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let reader = csv::Reader::from_path(path).map_err(|source| FrameError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_csv_reader(reader).map_err(|source| FrameError::Read {
            path: path.to_owned(),
            source,
        })
    }

    pub fn from_csv_reader<R>(mut reader: csv::Reader<R>) -> Result<Self, csv::Error>
    where
        R: io::Read,
    {
        let mut frame = Self::new(reader.headers()?.iter());
        for record in reader.records() {
            let record = record?;
            frame.rows.push(record.iter().map(Cell::from_field).collect());
        }
        Ok(frame)
    }

    pub fn write_csv<P>(&self, path: P) -> Result<(), FrameError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let write = || -> Result<(), csv::Error> {
            let mut writer = csv::Writer::from_path(path)?;
            self.write_records(&mut writer)?;
            writer.flush()?;
            Ok(())
        };
        write().map_err(|source| FrameError::Write {
            path: path.to_owned(),
            source,
        })
    }

    pub fn write_records<W>(&self, writer: &mut csv::Writer<W>) -> Result<(), csv::Error>
    where
        W: io::Write,
    {
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(ToString::to_string))?;
        }
        Ok(())
    }

    /// Stacks frames vertically.
    ///
    /// The result has the union of all columns in first-seen order; cells of
    /// columns a frame does not have are [`Cell::Null`].
    #[must_use]
    pub fn concat<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = Frame>,
    {
        let frames = frames.into_iter().collect::<Vec<_>>();
        let mut columns = Vec::<String>::new();
        let mut positions = HashMap::<String, usize>::new();
        for frame in &frames {
            for column in &frame.columns {
                if !positions.contains_key(column) {
                    positions.insert(column.clone(), columns.len());
                    columns.push(column.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(frames.iter().map(Frame::len).sum());
        for frame in frames {
            let mapping = frame
                .columns
                .iter()
                .map(|c| positions[c])
                .collect::<Vec<_>>();
            for row in frame.rows {
                let mut out = vec![Cell::Null; columns.len()];
                for (cell, &pos) in row.into_iter().zip(&mapping) {
                    out[pos] = cell;
                }
                rows.push(out);
            }
        }

        Self { columns, rows }
    }

    /// Drops a leading unnamed column, the row index pandas writes by default.
    pub fn drop_unnamed_index(&mut self) {
        if self.columns.first().is_some_and(String::is_empty) {
            self.columns.remove(0);
            for row in &mut self.rows {
                if !row.is_empty() {
                    row.remove(0);
                }
            }
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), FrameError> {
        if row.len() != self.columns.len() {
            return Err(FrameError::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Appends a column, or replaces the values of an existing one.
    pub fn set_column<S>(&mut self, name: S, values: Vec<Cell>) -> Result<(), FrameError>
    where
        S: Into<String>,
    {
        if values.len() != self.rows.len() {
            return Err(FrameError::RowWidth {
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        let name = name.into();
        match self.column_index(&name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name);
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, SchemaError> {
        self.column_index(name)
            .ok_or_else(|| SchemaError::MissingColumn {
                column: name.to_owned(),
            })
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Mutable access to every cell of one column.
    pub fn column_cells_mut(&mut self, idx: usize) -> impl Iterator<Item = &mut Cell> {
        self.rows.iter_mut().map(move |row| &mut row[idx])
    }

    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }
}
