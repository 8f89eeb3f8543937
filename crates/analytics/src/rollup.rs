//! Generic group-by-key → fold-accumulator → materialize skeleton shared
//! by every rollup. Each aggregator supplies a key extractor (returning
//! `None` to skip a record), an accumulator fold, and a finalizer.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

pub fn rollup<R, K, Acc, Row>(
    records: &[R],
    key: impl Fn(&R) -> Option<K>,
    fold: impl Fn(&mut Acc, &R),
    finish: impl Fn(K, Acc) -> Row,
) -> Vec<Row>
where
    K: Eq + Hash,
    Acc: Default,
{
    let mut groups: HashMap<K, Acc> = HashMap::new();
    for record in records {
        if let Some(k) = key(record) {
            fold(groups.entry(k).or_default(), record);
        }
    }
    groups.into_iter().map(|(k, acc)| finish(k, acc)).collect()
}

/// Sort by the rollup's ranking key and truncate to the caller's limit.
/// Comparators must be total (tie-break on the group key) so output is
/// independent of map iteration order.
pub fn rank<Row>(
    mut rows: Vec<Row>,
    cmp: impl Fn(&Row, &Row) -> Ordering,
    limit: usize,
) -> Vec<Row> {
    rows.sort_by(cmp);
    rows.truncate(limit);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountAcc {
        n: u64,
    }

    #[test]
    fn test_grouping_is_a_partition() {
        let records = vec!["a", "b", "a", "c", "a", "b"];
        let rows = rollup(
            &records,
            |r| Some(r.to_string()),
            |acc: &mut CountAcc, _| acc.n += 1,
            |key, acc| (key, acc.n),
        );
        let total: u64 = rows.iter().map(|(_, n)| n).sum();
        assert_eq!(total, records.len() as u64);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_key_extractor_skips() {
        let records = vec![Some("a"), None, Some("a")];
        let rows = rollup(
            &records,
            |r| r.map(str::to_string),
            |acc: &mut CountAcc, _| acc.n += 1,
            |key, acc| (key, acc.n),
        );
        assert_eq!(rows, vec![("a".to_string(), 2)]);
    }

    #[test]
    fn test_rank_is_deterministic_under_ties() {
        let rows = vec![("b".to_string(), 2u64), ("a".to_string(), 2), ("c".to_string(), 5)];
        let ranked = rank(
            rows,
            |x, y| y.1.cmp(&x.1).then_with(|| x.0.cmp(&y.0)),
            10,
        );
        assert_eq!(ranked[0].0, "c");
        assert_eq!(ranked[1].0, "a");
        assert_eq!(ranked[2].0, "b");
    }
}
