//! Partition rows by a grouping key into per-group `(time, value)` series.
//!
//! Grouping is deterministic:
//! - groups are ordered by key ascending
//! - each series is sorted by time ascending, ties keeping input order

use std::collections::BTreeMap;

use crate::domain::{GroupKey, GroupSeries, SampleRow, ValueColumn};

/// Grouping output.
#[derive(Debug, Clone)]
pub struct GroupSet {
    pub groups: Vec<GroupSeries>,
    /// Rows that lack the selected key column (8-field rows grouped by `k`).
    pub rows_without_key: usize,
}

/// Group rows by `key`, extracting `value` as the fitted y-column.
///
/// `key_filter` restricts the output to a single group (rows for other keys
/// are dropped, not counted as missing).
pub fn group_rows(
    rows: &[SampleRow],
    key: GroupKey,
    value: ValueColumn,
    key_filter: Option<i64>,
) -> GroupSet {
    let mut buckets: BTreeMap<i64, Vec<(f64, f64)>> = BTreeMap::new();
    let mut rows_without_key = 0usize;

    for row in rows {
        let Some(k) = row.key(key) else {
            rows_without_key += 1;
            continue;
        };
        if let Some(filter) = key_filter {
            if k != filter {
                continue;
            }
        }
        buckets.entry(k).or_default().push((row.time, row.value(value)));
    }

    let groups = buckets
        .into_iter()
        .map(|(k, mut points)| {
            points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
            let (times, values) = points.into_iter().unzip();
            GroupSeries {
                key: k,
                times,
                values,
            }
        })
        .collect();

    GroupSet {
        groups,
        rows_without_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(time: f64, aa: f64, i: i64, k: Option<i64>) -> SampleRow {
        SampleRow {
            aa,
            ab: 0.0,
            ba: 0.0,
            bb: 0.0,
            ss_ratio: 1.0,
            time,
            i,
            j: 0,
            k,
        }
    }

    #[test]
    fn groups_are_keyed_and_time_sorted() {
        let rows = vec![
            row(30.0, 3.0, 1, Some(10)),
            row(10.0, 1.0, 1, Some(10)),
            row(20.0, 2.0, 2, Some(11)),
            row(15.0, 9.0, 1, Some(10)),
        ];

        let set = group_rows(&rows, GroupKey::K, ValueColumn::Aa, None);
        assert_eq!(set.rows_without_key, 0);
        assert_eq!(set.groups.len(), 2);

        let g = &set.groups[0];
        assert_eq!(g.key, 10);
        assert_eq!(g.times, vec![10.0, 15.0, 30.0]);
        assert_eq!(g.values, vec![1.0, 9.0, 3.0]);

        assert_eq!(set.groups[1].key, 11);
    }

    #[test]
    fn rows_missing_k_are_counted_not_grouped() {
        let rows = vec![row(10.0, 1.0, 1, None), row(20.0, 2.0, 1, Some(5))];

        let set = group_rows(&rows, GroupKey::K, ValueColumn::Aa, None);
        assert_eq!(set.rows_without_key, 1);
        assert_eq!(set.groups.len(), 1);

        // Grouping by `i` uses the same rows without loss.
        let set = group_rows(&rows, GroupKey::I, ValueColumn::Aa, None);
        assert_eq!(set.rows_without_key, 0);
        assert_eq!(set.groups.len(), 1);
        assert_eq!(set.groups[0].len(), 2);
    }

    #[test]
    fn key_filter_selects_single_group() {
        let rows = vec![
            row(10.0, 1.0, 1, Some(5)),
            row(20.0, 2.0, 2, Some(6)),
            row(30.0, 3.0, 3, Some(6)),
        ];

        let set = group_rows(&rows, GroupKey::K, ValueColumn::Aa, Some(6));
        assert_eq!(set.groups.len(), 1);
        assert_eq!(set.groups[0].key, 6);
        assert_eq!(set.groups[0].len(), 2);
    }
}
