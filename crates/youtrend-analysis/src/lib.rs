//! Survival analysis of the YouTrend training table
//!
//! # Overview
//!
//! Two workflows operate on the encoded training records
//! ([`youtrend_dataset::encoding::TrainingRecord`]):
//!
//! ## Censoring Analysis
//!
//! 1. **Group** ([`survival::SurvivalStatsMap`]): split the table by day of
//!    week, category or any other key
//! 2. **Summarize** ([`survival::SurvivalStats`]): censored share, naive and
//!    complete means, Kaplan-Meier median per group
//!
//! ## Group Survival
//!
//! [`group::GroupSurvivalEstimator`] fits the Kaplan-Meier curve of a single
//! (day of week, category) group, padding its censored share with seeded
//! ghost samples so small groups still yield a usable curve.
//!
//! # Examples
//!
//! ```
//! use youtrend_analysis::{
//!     group::{GroupConfig, GroupSurvivalEstimator},
//!     survival::SurvivalStatsMap,
//! };
//! use youtrend_dataset::encoding::TrainingRecord;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let records: Vec<TrainingRecord> = vec![]; // from FeatureEncoder::fit
//!
//! let by_day = SurvivalStatsMap::collect_by_group(&records, TrainingRecord::day_name);
//! for (day, stats) in &by_day.map {
//!     println!("{day}: {:.1}% censored", stats.censored_fraction() * 100.0);
//! }
//!
//! let estimator = GroupSurvivalEstimator::new(&records, GroupConfig::default())?;
//! assert!(estimator.estimate("Monday", "Music").is_err());
//! # Ok(())
//! # }
//! ```

pub mod group;
pub mod survival;
