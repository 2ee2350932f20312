use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::SpireError;

/// An in-memory tab-separated table: ordered header row plus string cells.
///
/// SPIRE serves every metadata and annotation payload as TSV, so this is the
/// common currency of the crate. Cells are kept as strings; nothing here
/// interprets them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Parses tab-separated text. The first record is the header.
    pub fn from_tsv_str(text: &str) -> Result<Self, SpireError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(text.as_bytes());

        let columns = reader
            .headers()
            .map_err(|err| SpireError::TableParse(err.to_string()))?
            .iter()
            .map(|field| field.to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| SpireError::TableParse(err.to_string()))?;
            rows.push(record.iter().map(|field| field.to_string()).collect());
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns all cells of the named column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>, SpireError> {
        let index = self
            .column_index(name)
            .ok_or_else(|| SpireError::MissingColumn(name.to_string()))?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
            .collect())
    }

    /// Rows whose `column` cell equals `value`. Row order is preserved and
    /// duplicates are kept; upstream tables are taken as-is.
    pub fn filter_eq(&self, column: &str, value: &str) -> Result<Table, SpireError> {
        self.filter_by(column, |cell| cell == value)
    }

    /// Rows whose `column` cell is a member of `values`. Same ordering and
    /// duplicate behavior as [`Table::filter_eq`].
    pub fn filter_in(&self, column: &str, values: &HashSet<String>) -> Result<Table, SpireError> {
        self.filter_by(column, |cell| values.contains(cell))
    }

    fn filter_by<F>(&self, column: &str, keep: F) -> Result<Table, SpireError>
    where
        F: Fn(&str) -> bool,
    {
        let index = self
            .column_index(column)
            .ok_or_else(|| SpireError::MissingColumn(column.to_string()))?;
        let rows = self
            .rows
            .iter()
            .filter(|row| keep(row.get(index).map(String::as_str).unwrap_or("")))
            .cloned()
            .collect();
        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    pub fn to_tsv_string(&self) -> String {
        let mut out = self.columns.join("\t");
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join("\t"));
            out.push('\n');
        }
        out
    }

    pub fn write_tsv(&self, path: &Path) -> Result<(), SpireError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| SpireError::Filesystem(err.to_string()))?;
        }
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(path)
            .map_err(|err| SpireError::Filesystem(err.to_string()))?;
        writer
            .write_record(&self.columns)
            .map_err(|err| SpireError::Filesystem(err.to_string()))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|err| SpireError::Filesystem(err.to_string()))?;
        }
        writer
            .flush()
            .map_err(|err| SpireError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tsv_string())
    }
}
