//! Survival analysis table display

use youtrend_analysis::survival::SurvivalStats;

/// A row in a survival analysis table
pub(super) struct SurvivalTableRow<'a> {
    /// Label for this row (e.g., day of week, category)
    pub label: String,
    pub stats: &'a SurvivalStats,
}

impl<'a> SurvivalTableRow<'a> {
    pub(super) fn from_map<K, I, F>(map: I, mut label: F) -> Vec<Self>
    where
        I: IntoIterator<Item = (K, &'a SurvivalStats)>,
        F: FnMut(K) -> String,
    {
        map.into_iter()
            .map(|(key, stats)| SurvivalTableRow {
                label: label(key),
                stats,
            })
            .collect()
    }
}

fn print_survival_table_header(label_col: &str) {
    println!(
        "  {:<20} {:>8} {:>10} {:>12} {:>12} {:>10} {:>12} {:>12}",
        label_col,
        "Videos",
        "Censored%",
        "Mean(Comp)",
        "Mean(All)",
        "All/Comp",
        "Median(KM)",
        "KM vs All",
    );
}

fn print_survival_table_separator() {
    // label(20) + count(8) + censored%(10) + mean_comp(12) + mean_all(12) + all_comp(10) + median_km(12) + km_vs_all(12) + spaces(7)
    println!("  {}", "-".repeat(103));
}

fn print_survival_table_row(row: &SurvivalTableRow) {
    let stats = row.stats;
    let median_str = stats
        .median_km
        .map_or("N/A".to_string(), |m| format!("{m:.2}"));

    println!(
        "  {:<20} {:>8} {:>9.1}% {:>12.2} {:>12.2} {:>10} {:>12} {:>12}",
        row.label,
        stats.rows_count,
        stats.censored_fraction() * 100.0,
        stats.mean_complete,
        stats.mean_all,
        all_comp_ratio_str(stats),
        median_str,
        km_vs_all_str(stats),
    );
}

/// Mean(All) / Mean(Comp), flagged when the optimistic bias exceeds 1.5x
fn all_comp_ratio_str(stats: &SurvivalStats) -> String {
    if stats.rows_count == stats.censored_count || stats.mean_complete == 0.0 {
        return "N/A".to_string();
    }
    let ratio = stats.mean_all / stats.mean_complete;
    if ratio > 1.5 {
        format!("!{ratio:.2}x")
    } else {
        format!("{ratio:.2}x")
    }
}

/// Difference between KM median and naive mean as percentage
fn km_vs_all_str(stats: &SurvivalStats) -> String {
    if stats.mean_all == 0.0 {
        return "N/A".to_string();
    }
    stats.median_km.map_or("N/A".to_string(), |km| {
        let pct = (km - stats.mean_all) / stats.mean_all * 100.0;
        if pct >= 0.0 {
            format!("+{pct:.1}%")
        } else {
            format!("{pct:.1}%")
        }
    })
}

pub(super) fn print_survival_table(label_col: &str, rows: Vec<SurvivalTableRow>) {
    print_survival_table_header(label_col);
    print_survival_table_separator();

    for row in rows {
        print_survival_table_row(&row);
    }
}

pub(super) fn print_legend() {
    println!("Legend:");
    println!("  Mean(Comp)  : Mean time-to-trend in days of uncensored videos only");
    println!("  Mean(All)   : Naive mean of all videos (uncensored + censored, biased estimate)");
    println!("  All/Comp    : Optimistic bias ratio (! when > 1.5)");
    println!("  Median(KM)  : Kaplan-Meier median time-to-trend (handles censoring)");
    println!("  KM vs All   : Difference between KM median and naive mean (% change)");
}
