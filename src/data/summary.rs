//! Fixed temperature buckets and the summary text shown after each table.

use std::fmt;

use super::model::TemperatureRecord;

/// Shown when a table produced no filtered rows.
pub const NO_DATA_TEXT: &str = "No temperature data available.";

/// Shown when filtered rows exist but none fall into a bucket (all negative or NaN).
pub const NO_MATCHES_TEXT: &str = "No suggestions based on current data.";

/// A half-open temperature range `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub low: f64,
    pub high: f64,
}

impl Bucket {
    pub fn contains(&self, temperature: f64) -> bool {
        temperature >= self.low && temperature < self.high
    }
}

/// Contiguous and exhaustive for non-negative temperatures.
pub const BUCKETS: [Bucket; 5] = [
    Bucket { low: 0.0, high: 10.0 },
    Bucket { low: 10.0, high: 20.0 },
    Bucket { low: 20.0, high: 30.0 },
    Bucket { low: 30.0, high: 40.0 },
    Bucket { low: 40.0, high: f64::INFINITY },
];

/// A non-empty bucket and how many filtered rows fell into it.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketCount {
    /// 1-based position in [`BUCKETS`].
    pub index: usize,
    pub bucket: Bucket,
    pub count: usize,
}

impl fmt::Display for BucketCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Range {}: Temperature between {} and {} degrees, {} data points.",
            self.index, self.bucket.low, self.bucket.high, self.count
        )
    }
}

/// Summary of one temperature table.
#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    /// Nothing was selected for the table.
    NoData,
    /// Rows were selected but every bucket is empty.
    NoMatches,
    Ranges(Vec<BucketCount>),
}

impl Summary {
    /// The text that replaces whatever summary was displayed before.
    pub fn text(&self) -> String {
        match self {
            Summary::NoData => NO_DATA_TEXT.to_string(),
            Summary::NoMatches => NO_MATCHES_TEXT.to_string(),
            Summary::Ranges(counts) => counts
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Count the filtered rows per bucket. `None` or an empty slice means the
/// table produced no data.
pub fn summarize(filtered: Option<&[TemperatureRecord]>) -> Summary {
    let records = match filtered {
        Some(records) if !records.is_empty() => records,
        _ => return Summary::NoData,
    };

    let counts: Vec<BucketCount> = BUCKETS
        .iter()
        .enumerate()
        .map(|(i, bucket)| BucketCount {
            index: i + 1,
            bucket: *bucket,
            count: records
                .iter()
                .filter(|r| bucket.contains(r.temperature))
                .count(),
        })
        .filter(|c| c.count > 0)
        .collect();

    if counts.is_empty() {
        Summary::NoMatches
    } else {
        Summary::Ranges(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(temps: &[f64]) -> Vec<TemperatureRecord> {
        temps
            .iter()
            .enumerate()
            .map(|(i, &temperature)| TemperatureRecord {
                time: i as f64,
                temperature,
            })
            .collect()
    }

    fn bucket_of(temperature: f64) -> Option<usize> {
        BUCKETS.iter().position(|b| b.contains(temperature))
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(bucket_of(0.0), Some(0));
        assert_eq!(bucket_of(9.999), Some(0));
        assert_eq!(bucket_of(10.0), Some(1));
        assert_eq!(bucket_of(39.9999), Some(3));
        assert_eq!(bucket_of(40.0), Some(4));
        assert_eq!(bucket_of(1e6), Some(4));
        assert_eq!(bucket_of(-0.5), None);
        assert_eq!(bucket_of(f64::NAN), None);
    }

    #[test]
    fn test_buckets_do_not_overlap() {
        for t in [0.0, 5.0, 10.0, 19.5, 20.0, 30.0, 40.0, 1e9] {
            let hits = BUCKETS.iter().filter(|b| b.contains(t)).count();
            assert_eq!(hits, 1, "temperature {t}");
        }
    }

    #[test]
    fn test_single_range_text() {
        let summary = summarize(Some(&records(&[5.0])));
        assert_eq!(
            summary.text(),
            "Range 1: Temperature between 0 and 10 degrees, 1 data points."
        );
    }

    #[test]
    fn test_only_non_empty_ranges_are_listed() {
        let summary = summarize(Some(&records(&[1.0, 2.0, 45.0, 22.0, -3.0])));
        assert_eq!(
            summary.text(),
            "Range 1: Temperature between 0 and 10 degrees, 2 data points.\n\
             Range 3: Temperature between 20 and 30 degrees, 1 data points.\n\
             Range 5: Temperature between 40 and inf degrees, 1 data points."
        );
    }

    #[test]
    fn test_absent_result_is_no_data() {
        assert_eq!(summarize(None), Summary::NoData);
        assert_eq!(summarize(Some(&[])), Summary::NoData);
        assert_eq!(summarize(None).text(), "No temperature data available.");
    }

    #[test]
    fn test_all_negative_is_no_matches() {
        let summary = summarize(Some(&records(&[-1.0, -20.0])));
        assert_eq!(summary, Summary::NoMatches);
        assert_eq!(summary.text(), NO_MATCHES_TEXT);
    }

    #[test]
    fn test_summary_is_deterministic() {
        let data = records(&[0.5, 11.0, 12.0, 33.3, 39.9999, 40.0, 1e6, -1.0]);
        let first = summarize(Some(&data));
        for _ in 0..10 {
            assert_eq!(summarize(Some(&data)), first);
        }
    }
}
