use clap::{Parser, Subcommand};

use self::{
    analyze_censoring::AnalyzeCensoringArg, encode::EncodeArg, group_survival::GroupSurvivalArg,
    label::LabelArg, predict::PredictArg,
};

mod analyze_censoring;
mod encode;
mod group_survival;
mod label;
mod predict;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Label trending-list snapshots with time-to-trend and censoring
    Label(#[clap(flatten)] LabelArg),
    /// Build the training table and the encoder artifact
    Encode(#[clap(flatten)] EncodeArg),
    /// Predict the probability that a video has not trended yet
    Predict(#[clap(flatten)] PredictArg),
    /// Analyze censoring in the training table
    AnalyzeCensoring(#[clap(flatten)] AnalyzeCensoringArg),
    /// Kaplan-Meier survival of one (day of week, category) group
    GroupSurvival(#[clap(flatten)] GroupSurvivalArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Label(arg) => label::run(&arg)?,
        Mode::Encode(arg) => encode::run(&arg)?,
        Mode::Predict(arg) => predict::run(&arg)?,
        Mode::AnalyzeCensoring(arg) => analyze_censoring::run(&arg)?,
        Mode::GroupSurvival(arg) => group_survival::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_predict_curve() {
        let args = CommandArgs::try_parse_from([
            "youtrend",
            "predict",
            "--model",
            "model.json",
            "--encoder",
            "encoder.json",
            "--curve",
            "--span",
            "7",
            "abc123",
        ])
        .unwrap();
        let Mode::Predict(arg) = args.mode else {
            panic!("unexpected mode");
        };
        assert!(arg.curve);
        assert_eq!(arg.span, 7.0);
        assert_eq!(arg.gap, 1.0);
        assert_eq!(arg.video.as_deref(), Some("abc123"));
    }
}
