use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use youtrend_analysis::group::{GroupConfig, GroupSurvival, GroupSurvivalEstimator};
use youtrend_dataset::encoding::{EncoderInput, FeatureEncoder};

use crate::{config::Config, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GroupSurvivalArg {
    /// Labeled training table CSV
    table: PathBuf,
    /// Day of week of publication (e.g. monday)
    #[arg(long)]
    day: String,
    /// Video category (e.g. music)
    #[arg(long)]
    category: String,
    /// Minimum censored share of the group before fitting
    #[arg(long)]
    min_censored_fraction: Option<f64>,
    /// Seed of the ghost-sample generator
    #[arg(long)]
    seed: Option<u64>,
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the curve as JSON to this path instead of printing a table
    #[arg(long)]
    output: Option<PathBuf>,
}

impl GroupSurvivalArg {
    fn resolve(&self, config: &GroupConfig) -> GroupConfig {
        GroupConfig {
            min_censored_fraction: self
                .min_censored_fraction
                .unwrap_or(config.min_censored_fraction),
            seed: self.seed.unwrap_or(config.seed),
        }
    }
}

#[derive(Debug, Serialize)]
struct CurveReport<'a> {
    day: &'a str,
    category: Option<&'a str>,
    rows: usize,
    ghost_count: usize,
    median_days: Option<f64>,
    times: &'a [f64],
    survival_prob: &'a [f64],
}

impl<'a> From<&'a GroupSurvival> for CurveReport<'a> {
    fn from(group: &'a GroupSurvival) -> Self {
        Self {
            day: &group.day,
            category: group.category.as_deref(),
            rows: group.stats.rows_count,
            ghost_count: group.ghost_count,
            median_days: group.stats.median_km,
            times: &group.stats.km_curve.times,
            survival_prob: &group.stats.km_curve.survival_prob,
        }
    }
}

pub(crate) fn run(arg: &GroupSurvivalArg) -> anyhow::Result<()> {
    let config = Config::load(arg.config.as_deref())?;
    let group_config = arg.resolve(&config.group);

    let fitted = FeatureEncoder::default()
        .fit(EncoderInput::File(arg.table.clone()))
        .with_context(|| format!("Failed to read training table: {}", arg.table.display()))?;
    let estimator = GroupSurvivalEstimator::new(&fitted.table.records, group_config)?;
    let group = estimator.estimate(&arg.day, &arg.category)?;

    if let Some(path) = &arg.output {
        return Output::save_json(&CurveReport::from(&group), Some(path.clone()));
    }

    println!(
        "Group: {} / {}",
        group.day,
        group.category.as_deref().unwrap_or("None")
    );
    println!(
        "  Videos: {} ({} ghost samples)",
        group.stats.rows_count, group.ghost_count
    );
    match group.stats.median_km {
        Some(median) => println!("  Median time-to-trend (KM): {median:.2} days"),
        None => println!("  Median time-to-trend (KM): N/A"),
    }
    println!();
    println!("  {:>10} {:>12} {:>8} {:>8}", "Days", "P(survive)", "AtRisk", "Events");
    println!("  {}", "-".repeat(41));
    let km = &group.stats.km_curve;
    for i in 0..km.times.len() {
        println!(
            "  {:>10.2} {:>12.4} {:>8} {:>8}",
            km.times[i], km.survival_prob[i], km.at_risk[i], km.events[i]
        );
    }
    Ok(())
}
