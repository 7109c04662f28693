//! Survival summaries of right-censored time-to-trend data
//!
//! # Overview
//!
//! A video of the training table ends its observation in one of two ways:
//!
//! - **Event**: first seen on the trending list inside the reliable window
//! - **Censored**: first seen after the window closed, so its true
//!   time-to-trend is unknown
//!
//! ```text
//! Event:     |----x     (trended after 1.2 days)
//! Censored:  |-------> (not trending before the window closed)
//! ```
//!
//! Means over such data are biased; the Kaplan-Meier median accounts for the
//! censored rows. [`SurvivalStatsMap`] groups the table by any key (day of
//! week, category) so censoring patterns can be compared across groups.
//!
//! # Examples
//!
//! ```
//! use youtrend_analysis::survival::SurvivalStats;
//!
//! // (time-to-trend in days, is_censored)
//! let data = [(0.5, false), (0.5, false), (2.0, true), (3.0, true)];
//! let stats = SurvivalStats::from_data(&data);
//!
//! assert_eq!(stats.rows_count, 4);
//! assert_eq!(stats.censored_count, 2);
//! assert_eq!(stats.mean_complete, 0.5);
//! assert_eq!(stats.mean_all, 1.5);
//! assert_eq!(stats.median_km, Some(0.5));
//! ```

use std::collections::BTreeMap;

use youtrend_dataset::encoding::TrainingRecord;
use youtrend_stats::survival::KaplanMeierCurve;

/// Survival statistics for a group of observations
#[derive(Debug, Clone)]
pub struct SurvivalStats {
    /// Total number of observations
    pub rows_count: usize,
    /// Number of censored observations
    pub censored_count: usize,
    /// Mean time-to-trend of uncensored observations only
    pub mean_complete: f64,
    /// Naive mean time-to-trend of all observations
    pub mean_all: f64,
    /// Kaplan-Meier median time-to-trend
    pub median_km: Option<f64>,
    /// Kaplan-Meier survival curve
    pub km_curve: KaplanMeierCurve,
}

#[derive(Debug, Clone)]
pub struct SurvivalStatsMap<K> {
    pub map: BTreeMap<K, SurvivalStats>,
}

impl SurvivalStats {
    /// # Arguments
    /// * `data` - Slice of (`time_to_trend_days`, `is_censored`) tuples
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_data(data: &[(f64, bool)]) -> Self {
        let rows_count = data.len();
        let censored_count = data.iter().filter(|(_, c)| *c).count();

        let complete = data
            .iter()
            .filter(|(_, c)| !*c)
            .map(|(t, _)| *t)
            .collect::<Vec<_>>();

        let mean_complete = if complete.is_empty() {
            0.0
        } else {
            complete.iter().sum::<f64>() / complete.len() as f64
        };

        let mean_all = if data.is_empty() {
            0.0
        } else {
            data.iter().map(|(t, _)| *t).sum::<f64>() / rows_count as f64
        };

        let km_curve = KaplanMeierCurve::from_data(data.to_vec());
        let median_km = km_curve.median_survival();

        Self {
            rows_count,
            censored_count,
            mean_complete,
            mean_all,
            median_km,
            km_curve,
        }
    }

    /// Survival statistics of training records.
    #[must_use]
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TrainingRecord>,
    {
        let data = records
            .into_iter()
            .map(|r| (r.time_to_trend_days, r.is_censored()))
            .collect::<Vec<_>>();
        Self::from_data(&data)
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn censored_fraction(&self) -> f64 {
        if self.rows_count == 0 {
            return 0.0;
        }
        self.censored_count as f64 / self.rows_count as f64
    }
}

impl<K> SurvivalStatsMap<K> {
    /// Collect time-to-trend data grouped by a custom key
    ///
    /// # Examples
    ///
    /// ```
    /// use youtrend_analysis::survival::SurvivalStatsMap;
    /// use youtrend_dataset::encoding::TrainingRecord;
    ///
    /// let records: Vec<TrainingRecord> = vec![]; // from FeatureEncoder::fit
    ///
    /// let by_day = SurvivalStatsMap::collect_by_group(&records, |r| r.day_name());
    /// let by_category = SurvivalStatsMap::collect_by_group(&records, |r| {
    ///     r.category().unwrap_or("(none)").to_owned()
    /// });
    /// assert!(by_day.map.is_empty() && by_category.map.is_empty());
    /// ```
    pub fn collect_by_group<F>(records: &[TrainingRecord], mut group: F) -> Self
    where
        F: FnMut(&TrainingRecord) -> K,
        K: Ord,
    {
        let mut data_map: BTreeMap<K, Vec<(f64, bool)>> = BTreeMap::new();

        for record in records {
            data_map
                .entry(group(record))
                .or_default()
                .push((record.time_to_trend_days, record.is_censored()));
        }

        Self {
            map: data_map
                .into_iter()
                .map(|(key, data)| (key, SurvivalStats::from_data(&data)))
                .collect(),
        }
    }
}
