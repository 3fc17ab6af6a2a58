use std::collections::HashSet;
use std::hash::Hash;

use crate::occupation::OccupationRow;

/// Outcome of removing repeated keys from a row set.
#[derive(Debug, Clone)]
pub struct DedupeResult<T> {
    pub rows: Vec<T>,
    pub before: usize,
    pub removed: usize,
}

/// Keep the first row for each distinct key, preserving first-seen order.
pub fn dedupe_by_key<T, K, F>(rows: Vec<T>, mut key: F) -> DedupeResult<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let before = rows.len();
    let mut seen = HashSet::new();
    let rows: Vec<T> = rows.into_iter().filter(|row| seen.insert(key(row))).collect();
    let removed = before - rows.len();
    DedupeResult { rows, before, removed }
}

/// Deduplicate occupation rows on their `Code`.
pub fn dedupe_occupations(rows: Vec<OccupationRow>) -> DedupeResult<OccupationRow> {
    dedupe_by_key(rows, |r| r.code.clone())
}

/// Rows whose job zone is at least `min_zone`.
///
/// Rows with a missing or non-numeric job zone never pass.
pub fn filter_by_zone(rows: &[OccupationRow], min_zone: u8) -> Vec<OccupationRow> {
    rows.iter()
        .filter(|r| r.job_zone_level().is_some_and(|z| z >= min_zone))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(code: &str, name: &str, zone: &str) -> OccupationRow {
        OccupationRow {
            code: code.into(),
            occupation: name.into(),
            job_zone: zone.into(),
            interest1: "Realistic".into(),
            interest2: "Investigative".into(),
            interest3: String::new(),
        }
    }

    fn sample() -> Vec<OccupationRow> {
        vec![
            occ("17-2051.00", "Civil Engineers", "4"),
            occ("15-1252.00", "Software Developers", "4"),
            occ("17-2051.00", "Civil Engineers (second query)", "4"),
            occ("47-2031.00", "Carpenters", "2"),
            occ("15-1252.00", "Software Developers (again)", "4"),
        ]
    }

    #[test]
    fn test_keeps_first_occurrence() {
        let result = dedupe_occupations(sample());
        assert_eq!(result.before, 5);
        assert_eq!(result.removed, 2);
        let names: Vec<&str> = result.rows.iter().map(|r| r.occupation.as_str()).collect();
        assert_eq!(names, vec!["Civil Engineers", "Software Developers", "Carpenters"]);
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let once = dedupe_occupations(sample());
        let twice = dedupe_occupations(once.rows.clone());
        assert_eq!(twice.removed, 0);
        assert_eq!(twice.rows, once.rows);
    }

    #[test]
    fn test_empty_input() {
        let result = dedupe_occupations(Vec::new());
        assert!(result.rows.is_empty());
        assert_eq!(result.removed, 0);
    }

    #[test]
    fn test_filter_by_zone() {
        let mut rows = dedupe_occupations(sample()).rows;
        rows.push(occ("99-9999.00", "Unknown zone", ""));
        let filtered = filter_by_zone(&rows, 3);
        let codes: Vec<&str> = filtered.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["17-2051.00", "15-1252.00"]);
        assert_eq!(filter_by_zone(&rows, 1).len(), 3);
    }
}
