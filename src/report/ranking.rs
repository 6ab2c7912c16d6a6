//! Top-N ranking by volume

use crate::report::error::{ReportError, ReportResult};
use serde::Serialize;
use std::fmt::Display;

/// Number of clients listed in global statistics
pub const TOP_CLIENTS: usize = 5;

/// One ranked entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub name: String,
    pub count: usize,
}

/// Rank keys by count descending, truncated to `n`
///
/// Ties keep the order of `counts`. Every key must resolve to a name; an
/// unresolvable key is a data-consistency failure, not silently dropped.
pub fn top_n<K, F>(counts: &[(K, usize)], n: usize, mut resolve: F) -> ReportResult<Vec<RankedEntry>>
where
    K: Display,
    F: FnMut(&K) -> Option<String>,
{
    let mut ranked = counts
        .iter()
        .map(|(key, count)| {
            resolve(key)
                .map(|name| RankedEntry {
                    name,
                    count: *count,
                })
                .ok_or_else(|| {
                    ReportError::DataConsistency(format!("no name found for ranked key {}", key))
                })
        })
        .collect::<ReportResult<Vec<_>>>()?;

    // sort_by is stable, so ties stay in encounter order
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn names() -> HashMap<&'static str, String> {
        [("c1", "Acme"), ("c2", "Beta"), ("c3", "Gamma")]
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect()
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let names = names();
        let counts = vec![("c1", 5), ("c2", 5), ("c3", 1)];
        let top = top_n(&counts, 2, |k| names.get(k).cloned()).unwrap();
        assert_eq!(
            top,
            vec![
                RankedEntry { name: "Acme".to_string(), count: 5 },
                RankedEntry { name: "Beta".to_string(), count: 5 },
            ]
        );

        let counts = vec![("c2", 5), ("c1", 5), ("c3", 1)];
        let top = top_n(&counts, 2, |k| names.get(k).cloned()).unwrap();
        assert_eq!(top[0].name, "Beta");
        assert_eq!(top[1].name, "Acme");
    }

    #[test]
    fn test_sorted_descending_and_truncated() {
        let names = names();
        let counts = vec![("c3", 1), ("c2", 4), ("c1", 9)];
        let top = top_n(&counts, 5, |k| names.get(k).cloned()).unwrap();
        let order: Vec<usize> = top.iter().map(|e| e.count).collect();
        assert_eq!(order, vec![9, 4, 1]);

        assert!(top_n(&counts, 0, |k| names.get(k).cloned()).unwrap().is_empty());
    }

    #[test]
    fn test_unresolvable_key_is_consistency_error() {
        let names = names();
        let counts = vec![("c1", 2), ("ghost", 1)];
        let err = top_n(&counts, 5, |k| names.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ReportError::DataConsistency(_)));
    }

    #[test]
    fn test_empty_counts() {
        let counts: Vec<(&str, usize)> = Vec::new();
        assert!(top_n(&counts, 5, |_| None).unwrap().is_empty());
    }
}
