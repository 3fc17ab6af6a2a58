// Left-join the STEM table onto the all-occupations table.
//
// Every left row appears exactly once in the result. Right-side columns are
// appended after the left columns, minus the join key and minus any column
// whose name the left side already has (the left value wins).

use std::collections::HashMap;

use crate::table::{Table, TableError};

/// Result of a left join, with counts for logging.
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub table: Table,
    pub stats: MergeStats,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub left_rows: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Right-side columns dropped because the left side has the same name.
    pub dropped_columns: Vec<String>,
}

/// Left join `left` onto `right` on column `key`.
///
/// When `right` repeats a key, the first row with that key is used and a
/// warning is recorded.
pub fn left_join(left: &Table, right: &Table, key: &str) -> Result<MergeResult, TableError> {
    let left_key = left
        .column_index(key)
        .ok_or_else(|| TableError::MissingColumn(format!("{key} (left table)")))?;
    let right_key = right
        .column_index(key)
        .ok_or_else(|| TableError::MissingColumn(format!("{key} (right table)")))?;

    let mut warnings = Vec::new();

    // Right columns carried into the output
    let mut dropped_columns = Vec::new();
    let carried: Vec<usize> = right
        .headers
        .iter()
        .enumerate()
        .filter(|&(i, name)| {
            if i == right_key {
                return false;
            }
            if left.column_index(name).is_some() {
                dropped_columns.push(name.clone());
                return false;
            }
            true
        })
        .map(|(i, _)| i)
        .collect();

    // Index right rows by key, first occurrence wins
    let mut index: HashMap<&str, &Vec<String>> = HashMap::new();
    for row in &right.rows {
        let k = row[right_key].as_str();
        if index.contains_key(k) {
            warnings.push(format!("duplicate key '{k}' in right table; keeping first row"));
        } else {
            index.insert(k, row);
        }
    }

    let mut headers = left.headers.clone();
    headers.extend(carried.iter().map(|&i| right.headers[i].clone()));

    let mut matched = 0;
    let rows: Vec<Vec<String>> = left
        .rows
        .iter()
        .map(|row| {
            let mut out = row.clone();
            match index.get(row[left_key].as_str()) {
                Some(right_row) => {
                    matched += 1;
                    out.extend(carried.iter().map(|&i| right_row[i].clone()));
                }
                None => out.extend(carried.iter().map(|_| String::new())),
            }
            out
        })
        .collect();

    let stats = MergeStats {
        left_rows: left.len(),
        matched,
        unmatched: left.len() - matched,
        dropped_columns,
    };

    Ok(MergeResult {
        table: Table { headers, rows },
        stats,
        warnings,
    })
}
