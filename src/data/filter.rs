use std::collections::HashSet;

use anyhow::Result;

use super::model::{Table, TemperatureRecord, lock_records, temperature_records};

// ---------------------------------------------------------------------------
// TimeSet – lock-derived time keys
// ---------------------------------------------------------------------------

/// Membership set of time keys, compared by exact value.
///
/// `0.0` and `-0.0` are the same key; NaN is never a member.
#[derive(Debug, Clone, Default)]
pub struct TimeSet {
    keys: HashSet<u64>,
}

fn time_key(time: f64) -> Option<u64> {
    if time.is_nan() {
        return None;
    }
    // Collapse -0.0 onto 0.0 so bit patterns agree with `==`.
    Some(if time == 0.0 { 0.0f64.to_bits() } else { time.to_bits() })
}

impl TimeSet {
    pub fn contains(&self, time: f64) -> bool {
        time_key(time).is_some_and(|k| self.keys.contains(&k))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<f64> for TimeSet {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        TimeSet {
            keys: iter.into_iter().filter_map(time_key).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Lock extraction
// ---------------------------------------------------------------------------

/// Ordered `time` values of every row whose `lock` equals the sentinel.
pub fn extract_lock_times(table: &Table) -> Result<Vec<f64>> {
    Ok(lock_records(table)?
        .into_iter()
        .filter(|r| r.is_locked())
        .map(|r| r.time)
        .collect())
}

// ---------------------------------------------------------------------------
// Temperature filtering
// ---------------------------------------------------------------------------

/// A temperature table split into the full series and the rows selected by a
/// [`TimeSet`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredTemperatures {
    pub all: Vec<TemperatureRecord>,
    /// Rows whose `time` is in the set, in source order.
    pub selected: Vec<TemperatureRecord>,
}

/// Select the rows of a temperature table whose `time` is in `times`.
pub fn filter_temperatures(table: &Table, times: &TimeSet) -> Result<FilteredTemperatures> {
    let all = temperature_records(table)?;
    let selected = all
        .iter()
        .filter(|r| times.contains(r.time))
        .copied()
        .collect();
    Ok(FilteredTemperatures { all, selected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn numeric_table(columns: &[&str], rows: &[&[f64]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| CellValue::Float(*v)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_only_exact_sentinel_rows_are_extracted() {
        let lock = numeric_table(
            &["time", "lock"],
            &[
                &[1.0, 4999.99],
                &[2.0, 4999.98],
                &[3.0, 5000.0],
                &[4.0, 4999.99],
                &[5.0, 0.0],
            ],
        );
        assert_eq!(extract_lock_times(&lock).unwrap(), vec![1.0, 4.0]);
    }

    #[test]
    fn test_no_sentinel_rows_gives_empty_times() {
        let lock = numeric_table(&["time", "lock"], &[&[1.0, 0.0], &[2.0, 5000.0]]);
        assert!(extract_lock_times(&lock).unwrap().is_empty());
    }

    #[test]
    fn test_missing_lock_column_is_an_error() {
        let lock = numeric_table(&["time", "value"], &[&[1.0, 4999.99]]);
        assert!(extract_lock_times(&lock).is_err());
    }

    #[test]
    fn test_filter_preserves_source_order() {
        let temp = numeric_table(
            &["time", "temperature"],
            &[&[3.0, 30.0], &[1.0, 10.0], &[2.0, 20.0], &[3.0, 31.0]],
        );
        let times: TimeSet = [1.0, 3.0].into_iter().collect();
        let filtered = filter_temperatures(&temp, &times).unwrap();

        assert_eq!(filtered.all.len(), 4);
        let selected: Vec<(f64, f64)> = filtered
            .selected
            .iter()
            .map(|r| (r.time, r.temperature))
            .collect();
        assert_eq!(selected, vec![(3.0, 30.0), (1.0, 10.0), (3.0, 31.0)]);
    }

    #[test]
    fn test_empty_time_set_selects_nothing() {
        let temp = numeric_table(&["time", "temperature"], &[&[1.0, 5.0]]);
        let filtered = filter_temperatures(&temp, &TimeSet::default()).unwrap();
        assert!(filtered.selected.is_empty());
        assert_eq!(filtered.all.len(), 1);
    }

    #[test]
    fn test_time_set_membership() {
        let times: TimeSet = [0.0, 1.5, f64::NAN].into_iter().collect();
        assert_eq!(times.len(), 2);
        assert!(times.contains(-0.0));
        assert!(times.contains(1.5));
        assert!(!times.contains(1.5000001));
        assert!(!times.contains(f64::NAN));
    }

    #[test]
    fn test_integer_and_float_times_join() {
        let lock = Table::new(
            vec!["time".into(), "lock".into()],
            vec![vec![CellValue::Integer(7), CellValue::Float(4999.99)]],
        );
        let temp = numeric_table(&["time", "temperature"], &[&[7.0, 12.0]]);
        let times: TimeSet = extract_lock_times(&lock).unwrap().into_iter().collect();
        let filtered = filter_temperatures(&temp, &times).unwrap();
        assert_eq!(filtered.selected.len(), 1);
    }
}
