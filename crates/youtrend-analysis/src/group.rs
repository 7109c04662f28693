//! Kaplan-Meier survival of one (day of week, category) group
//!
//! Small groups often contain few or no censored rows, which makes the
//! Kaplan-Meier curve drop to zero at the last observed event. The estimator
//! therefore tops up the censored share of a group with duplicated rows
//! ("ghost samples") before fitting, drawn with a seeded generator so the
//! same table always yields the same curve.

use std::collections::BTreeSet;

use rand::{SeedableRng as _, seq::index};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use youtrend_dataset::encoding::TrainingRecord;

use crate::survival::SurvivalStats;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum GroupError {
    #[display(
        "unknown group ({day}, {category}); valid days: {}; valid categories: {}",
        valid_days.join(", "),
        valid_categories.join(", ")
    )]
    InvalidGroup {
        day: String,
        category: String,
        valid_days: Vec<String>,
        valid_categories: Vec<String>,
    },
    #[display("minimum censored fraction must be within [0, 1], got {fraction}")]
    InvalidFraction { fraction: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Lower bound on the censored share of a group before fitting.
    pub min_censored_fraction: f64,
    pub seed: u64,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            min_censored_fraction: 0.05,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroupSurvival {
    pub day: String,
    /// `None` when no record matched the day, so only the category was used.
    pub category: Option<String>,
    /// Number of duplicated rows added as censored.
    pub ghost_count: usize,
    pub stats: SurvivalStats,
}

#[derive(Debug, Clone)]
pub struct GroupSurvivalEstimator<'a> {
    records: &'a [TrainingRecord],
    config: GroupConfig,
    days: BTreeSet<&'static str>,
    categories: BTreeSet<&'a str>,
}

impl<'a> GroupSurvivalEstimator<'a> {
    pub fn new(records: &'a [TrainingRecord], config: GroupConfig) -> Result<Self, GroupError> {
        let fraction = config.min_censored_fraction;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(GroupError::InvalidFraction { fraction });
        }
        Ok(Self {
            records,
            config,
            days: records.iter().map(TrainingRecord::day_name).collect(),
            categories: records.iter().filter_map(TrainingRecord::category).collect(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    /// Fits the survival curve of the videos published on `day` in `category`.
    ///
    /// Both labels are matched case-insensitively against the observed ones
    /// and reported in their observed spelling. When no video matches the
    /// pair, the whole category is used instead.
    ///
    /// ```
    /// use youtrend_analysis::group::{GroupConfig, GroupError, GroupSurvivalEstimator};
    ///
    /// let estimator = GroupSurvivalEstimator::new(&[], GroupConfig::default()).unwrap();
    /// let err = estimator.estimate("monday", "music").unwrap_err();
    /// assert!(matches!(err, GroupError::InvalidGroup { .. }));
    /// ```
    pub fn estimate(&self, day: &str, category: &str) -> Result<GroupSurvival, GroupError> {
        let (Some(day), Some(category)) = (
            observed_label(self.days.iter().copied(), day),
            observed_label(self.categories.iter().copied(), category),
        ) else {
            return Err(GroupError::InvalidGroup {
                day: day.trim().to_owned(),
                category: category.trim().to_owned(),
                valid_days: self.days.iter().map(|d| (*d).to_owned()).collect(),
                valid_categories: self.categories.iter().map(|c| (*c).to_owned()).collect(),
            });
        };
        let (day, category) = (day.to_owned(), category.to_owned());

        let in_category = |r: &&TrainingRecord| r.category() == Some(category.as_str());
        let mut group = self
            .records
            .iter()
            .filter(in_category)
            .filter(|r| r.day_name() == day)
            .collect::<Vec<_>>();
        let mut resolved = true;
        if group.is_empty() {
            tracing::debug!(%day, %category, "no video for day, falling back to category");
            group = self.records.iter().filter(in_category).collect();
            resolved = false;
        }

        let mut data = group
            .iter()
            .map(|r| (r.time_to_trend_days, r.is_censored()))
            .collect::<Vec<_>>();
        let ghost_count = self.add_ghost_samples(&mut data);
        tracing::debug!(
            rows = group.len(),
            ghost_count,
            "fitting group survival curve"
        );

        Ok(GroupSurvival {
            day,
            category: resolved.then_some(category),
            ghost_count,
            stats: SurvivalStats::from_data(&data),
        })
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn add_ghost_samples(&self, data: &mut Vec<(f64, bool)>) -> usize {
        let len = data.len();
        let target = (self.config.min_censored_fraction * len as f64).ceil() as usize;
        let censored = data.iter().filter(|(_, c)| *c).count();
        if censored >= target {
            return 0;
        }

        let mut rng = Pcg32::seed_from_u64(self.config.seed);
        let ghosts = index::sample(&mut rng, len, target)
            .into_iter()
            .map(|i| (data[i].0, true))
            .collect::<Vec<_>>();
        data.extend(ghosts);
        target
    }
}

/// The observed label equal to `wanted`, preferring an exact match over a
/// case-insensitive one.
fn observed_label<'s, I>(labels: I, wanted: &str) -> Option<&'s str>
where
    I: IntoIterator<Item = &'s str> + Clone,
{
    let wanted = wanted.trim();
    let lowercase = wanted.to_lowercase();
    labels
        .clone()
        .into_iter()
        .find(|label| *label == wanted)
        .or_else(|| {
            labels
                .into_iter()
                .find(|label| label.to_lowercase() == lowercase)
        })
}
