//! Survival probability curves
//!
//! A curve samples the survival function every `gap_days` after an anchor
//! instant, over `span_days`. The anchor is the publication instant, or a
//! later caller-supplied start. Curves are fully materialized since callers
//! plot or print them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    PredictError,
    model::{Covariates, SurvivalModel},
    preprocess::elapsed_days,
    survival::survival_function,
};

/// Upper bound on the number of points of one curve.
pub const MAX_CURVE_POINTS: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    /// 1-based sample index.
    pub step: usize,
    /// Days since publication at this sample.
    pub elapsed_days: f64,
    pub probability: f64,
}

/// Samples `floor(span_days / gap_days)` points of the survival curve.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use youtrend_predict::{
///     curve::trend_curve,
///     model::{Coefficients, Covariates, ModelFamily, SurvivalModel},
/// };
///
/// let model = SurvivalModel {
///     family: ModelFamily::Weibull,
///     primary: Coefficients::default(),
///     ancillary: Coefficients::default(),
/// };
/// let published_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let curve = trend_curve(&model, &Covariates::new(), published_at, None, 7.0, 2.0).unwrap();
/// let steps = curve.iter().map(|p| p.step).collect::<Vec<_>>();
/// assert_eq!(steps, [1, 2, 3]);
/// assert_eq!(curve[2].elapsed_days, 6.0);
/// ```
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn trend_curve(
    model: &SurvivalModel,
    covariates: &Covariates,
    published_at: DateTime<Utc>,
    start: Option<DateTime<Utc>>,
    span_days: f64,
    gap_days: f64,
) -> Result<Vec<CurvePoint>, PredictError> {
    let invalid = || PredictError::InvalidCurve {
        span_days,
        gap_days,
    };
    if !span_days.is_finite() || !gap_days.is_finite() || span_days <= 0.0 || gap_days <= 0.0 {
        return Err(invalid());
    }
    // Exact multiples may divide to just below the integer.
    let ratio = span_days / gap_days;
    let count = (ratio + ratio * 1e-9).floor();
    if count > MAX_CURVE_POINTS as f64 {
        return Err(invalid());
    }
    let count = count as usize;

    let anchor = start.map_or(published_at, |start| start.max(published_at));
    let offset = elapsed_days(published_at, anchor)?;

    (1..=count)
        .map(|step| -> Result<CurvePoint, PredictError> {
            let elapsed_days = offset + gap_days * step as f64;
            Ok(CurvePoint {
                step,
                elapsed_days,
                probability: survival_function(model, covariates, elapsed_days)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use crate::model::{Coefficients, ModelFamily};

    use super::*;

    fn model() -> SurvivalModel {
        SurvivalModel {
            family: ModelFamily::LogLogistic,
            primary: Coefficients {
                intercept: 1.0,
                weights: Default::default(),
            },
            ancillary: Coefficients::default(),
        }
    }

    fn published_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_length_is_floor_of_span_over_gap() {
        for (span, gap, expected) in [
            (10.0, 1.0, 10),
            (10.0, 3.0, 3),
            (1.0, 2.0, 0),
            (7.5, 0.5, 15),
            (1.2, 0.4, 3),
            (0.7, 0.1, 7),
            (0.3, 0.1, 3),
        ] {
            let curve =
                trend_curve(&model(), &Covariates::new(), published_at(), None, span, gap).unwrap();
            assert_eq!(curve.len(), expected, "span {span} gap {gap}");
            assert!(curve.iter().map(|p| p.step).eq(1..=curve.len()));
        }
    }

    #[test]
    fn test_probabilities_follow_survival_function() {
        let curve =
            trend_curve(&model(), &Covariates::new(), published_at(), None, 5.0, 1.0).unwrap();
        for point in &curve {
            let expected =
                survival_function(&model(), &Covariates::new(), point.elapsed_days).unwrap();
            assert_eq!(point.probability, expected);
        }
        assert!(curve.windows(2).all(|w| w[1].probability <= w[0].probability));
    }

    #[test]
    fn test_later_start_shifts_samples() {
        let start = published_at() + TimeDelta::days(2);
        let curve = trend_curve(
            &model(),
            &Covariates::new(),
            published_at(),
            Some(start),
            3.0,
            1.0,
        )
        .unwrap();
        let elapsed = curve.iter().map(|p| p.elapsed_days).collect::<Vec<_>>();
        assert_eq!(elapsed, [3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_earlier_start_is_ignored() {
        let start = published_at() - TimeDelta::days(2);
        let curve = trend_curve(
            &model(),
            &Covariates::new(),
            published_at(),
            Some(start),
            2.0,
            1.0,
        )
        .unwrap();
        assert_eq!(curve[0].elapsed_days, 1.0);
    }

    #[test]
    fn test_invalid_parameters() {
        for (span, gap) in [
            (10.0, 0.0),
            (10.0, -1.0),
            (-1.0, 1.0),
            (f64::NAN, 1.0),
            (10.0, f64::INFINITY),
            (1e9, 1e-3),
        ] {
            let err = trend_curve(&model(), &Covariates::new(), published_at(), None, span, gap)
                .unwrap_err();
            assert!(matches!(err, PredictError::InvalidCurve { .. }), "span {span} gap {gap}");
        }
    }
}
