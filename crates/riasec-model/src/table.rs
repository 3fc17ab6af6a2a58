use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("column '{column}' has {got} values but the table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("row {row} has {got} fields but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },
}

/// A loosely-typed CSV table: one header row plus string rows.
///
/// Used for the externally supplied STEM table, whose columns beyond `Code`
/// are not known ahead of time, and for the merged output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, checking every row against the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, TableError> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(TableError::RaggedRow {
                    row: i,
                    expected: headers.len(),
                    got: row.len(),
                });
            }
        }
        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Values of one column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>, TableError> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Replace the column called `name`, or append it if absent.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::LengthMismatch {
                column: name.to_string(),
                expected: self.rows.len(),
                got: values.len(),
            });
        }

        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Count of non-empty cells per column, in header order.
    pub fn non_empty_counts(&self) -> Vec<(&str, usize)> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let count = self.rows.iter().filter(|r| !r[i].trim().is_empty()).count();
                (h.as_str(), count)
            })
            .collect()
    }
}
