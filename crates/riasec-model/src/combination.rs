// Interest-area combinations used to query the O*NET interests table.
//
// The remote site answers one query per ordered subset of 2 or 3 interest
// areas. Order inside a subset follows the order of the configured list;
// subsets themselves come out in lexicographic index order, all triples
// first, then all pairs.

use crate::interest::InterestArea;

/// A query key of two or three interest areas.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    areas: Vec<InterestArea>,
}

impl Combination {
    pub fn areas(&self) -> &[InterestArea] {
        &self.areas
    }

    pub fn arity(&self) -> usize {
        self.areas.len()
    }

    /// Compact label such as `RIA`.
    pub fn label(&self) -> String {
        self.areas.iter().map(|a| a.letter()).collect()
    }
}

/// All `k`-element combinations of `items`, in lexicographic index order.
///
/// Elements keep their relative input order; no element is reused.
pub fn combinations<T: Clone>(items: &[T], k: usize) -> Vec<Vec<T>> {
    let n = items.len();
    if k == 0 || k > n {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        out.push(indices.iter().map(|&i| items[i].clone()).collect());

        // Rightmost index that can still advance
        let Some(pos) = (0..k).rev().find(|&i| indices[i] < n - k + i) else {
            break;
        };
        indices[pos] += 1;
        for j in pos + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
    out
}

/// Every 3-way combination followed by every 2-way combination.
pub fn interest_combinations(areas: &[InterestArea]) -> Vec<Combination> {
    combinations(areas, 3)
        .into_iter()
        .chain(combinations(areas, 2))
        .map(|areas| Combination { areas })
        .collect()
}

/// Number of combinations [`interest_combinations`] yields for `n` areas.
pub fn expected_count(n: usize) -> usize {
    binomial(n, 3) + binomial(n, 2)
}

fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use InterestArea::*;

    #[test]
    fn test_ria_scenario() {
        let combos = interest_combinations(&[Realistic, Investigative, Artistic]);
        let labels: Vec<String> = combos.iter().map(Combination::label).collect();
        assert_eq!(labels, vec!["RIA", "RI", "RA", "IA"]);
    }

    #[test]
    fn test_full_riasec_count() {
        let combos = interest_combinations(&InterestArea::ALL);
        assert_eq!(combos.len(), 20 + 15);
        assert_eq!(combos.len(), expected_count(6));
        assert!(combos[..20].iter().all(|c| c.arity() == 3));
        assert!(combos[20..].iter().all(|c| c.arity() == 2));
    }

    #[test]
    fn test_no_duplicate_sets() {
        let combos = interest_combinations(&InterestArea::ALL);
        let sets: HashSet<Vec<InterestArea>> = combos
            .iter()
            .map(|c| {
                let mut v = c.areas().to_vec();
                v.sort();
                v
            })
            .collect();
        assert_eq!(sets.len(), combos.len());
    }

    #[test]
    fn test_order_follows_input_not_sorted() {
        let combos = interest_combinations(&[Social, Realistic]);
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].areas(), &[Social, Realistic]);
    }

    #[test]
    fn test_counts_for_small_inputs() {
        for n in 0..=6 {
            let items: Vec<usize> = (0..n).collect();
            let total = combinations(&items, 3).len() + combinations(&items, 2).len();
            assert_eq!(total, expected_count(n), "n = {n}");
        }
    }

    #[test]
    fn test_lexicographic_index_order() {
        let combos = combinations(&['a', 'b', 'c', 'd'], 2);
        let joined: Vec<String> = combos.iter().map(|c| c.iter().collect()).collect();
        assert_eq!(joined, vec!["ab", "ac", "ad", "bc", "bd", "cd"]);
    }
}
