//! Censoring analysis command
//!
//! Summarizes how much of the training table is right-censored, overall and
//! per day of week and category, with Kaplan-Meier medians next to the
//! biased naive means.

mod table;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Args;
use youtrend_analysis::survival::{SurvivalStats, SurvivalStatsMap};
use youtrend_dataset::encoding::{EncoderInput, FeatureEncoder, TrainingRecord};

use self::table::SurvivalTableRow;

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeCensoringArg {
    /// Labeled training table CSV
    pub table: PathBuf,

    /// Output directory for KM curve CSV files
    #[arg(long)]
    pub km_output_dir: Option<PathBuf>,
}

pub(crate) fn run(arg: &AnalyzeCensoringArg) -> anyhow::Result<()> {
    let fitted = FeatureEncoder::default()
        .fit(EncoderInput::File(arg.table.clone()))
        .with_context(|| format!("Failed to read training table: {}", arg.table.display()))?;
    let records = &fitted.table.records;

    println!("Censoring Analysis Report ({} videos)", records.len());
    println!("==========================================\n");

    table::print_legend();
    println!();

    analyze_overall_censoring(records);
    println!();

    let by_day = SurvivalStatsMap::collect_by_group(records, |r| {
        (r.day_of_week.num_days_from_monday(), r.day_name())
    });
    println!("Censoring by Day of Week");
    table::print_survival_table(
        "Day",
        SurvivalTableRow::from_map(&by_day.map, |(_, day)| (*day).to_owned()),
    );
    println!();

    let by_category = SurvivalStatsMap::collect_by_group(records, |r| {
        r.category().unwrap_or("(none)").to_owned()
    });
    println!("Censoring by Category");
    table::print_survival_table(
        "Category",
        SurvivalTableRow::from_map(&by_category.map, Clone::clone),
    );

    if let Some(dir) = &arg.km_output_dir {
        println!();
        save_km_curves(
            dir,
            "day_of_week",
            by_day.map.iter().map(|((_, day), stats)| (*day, stats)),
        )?;
        save_km_curves(
            dir,
            "category",
            by_category
                .map
                .iter()
                .map(|(category, stats)| (category.as_str(), stats)),
        )?;
    }

    Ok(())
}

fn analyze_overall_censoring(records: &[TrainingRecord]) {
    let stats = SurvivalStats::from_records(records);
    let complete = stats.rows_count - stats.censored_count;

    println!("Overall Statistics:");
    println!(
        "  Videos: {} total, {} trending in window ({:.1}%), {} censored ({:.1}%)",
        stats.rows_count,
        complete,
        100.0 * (1.0 - stats.censored_fraction()),
        stats.censored_count,
        100.0 * stats.censored_fraction(),
    );
    match stats.median_km {
        Some(median) => println!("  Kaplan-Meier median time-to-trend: {median:.2} days"),
        None => println!("  Kaplan-Meier median time-to-trend: N/A"),
    }
}

/// Save the KM curve of every group to `<dir>/<name>_km.csv`
fn save_km_curves<'a, I>(dir: &Path, name: &str, groups: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = (&'a str, &'a SurvivalStats)>,
{
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let csv_path = dir.join(format!("{name}_km.csv"));
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("Failed to create CSV file: {}", csv_path.display()))?;
    writer.write_record(["group", "time", "survival_prob", "at_risk", "events"])?;

    for (group, stats) in groups {
        let km = &stats.km_curve;
        for i in 0..km.times.len() {
            writer
                .write_record([
                    group.to_owned(),
                    km.times[i].to_string(),
                    km.survival_prob[i].to_string(),
                    km.at_risk[i].to_string(),
                    km.events[i].to_string(),
                ])
                .with_context(|| format!("Failed to write CSV data for group {group}"))?;
        }
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write CSV file: {}", csv_path.display()))?;
    println!("KM curves saved to: {}", csv_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_km_curves() {
        let dir = tempfile::tempdir().unwrap();
        let stats = SurvivalStats::from_data(&[(1.0, false), (2.0, true), (3.0, false)]);
        let label = "Say \"Hi\", Inc";
        save_km_curves(
            dir.path(),
            "category",
            [("Film & Animation", &stats), (label, &stats)],
        )
        .unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join("category_km.csv")).unwrap();
        let headers = reader.headers().unwrap().iter().collect::<Vec<_>>();
        assert_eq!(headers, ["group", "time", "survival_prob", "at_risk", "events"]);
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[0][0], "Film & Animation");
        assert_eq!(&rows[0][1], "1");
        assert_eq!(&rows[2][0], label);
        assert_eq!(&rows[3][3], "1");
    }
}
