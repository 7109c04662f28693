/// Kaplan-Meier survival curve for time-to-event data.
///
/// The Kaplan-Meier estimator is a non-parametric estimate of the survival function.
/// It accounts for right-censored observations: videos that had not entered the
/// trending list when the observation window closed.
///
/// The curve stores parallel vectors describing the step function at each event time.
#[derive(Debug, Clone, PartialEq)]
pub struct KaplanMeierCurve {
    /// Times at which at least one event (non-censored observation) occurred, ascending.
    pub times: Vec<f64>,
    /// Survival probability just after each corresponding time, in `[0.0, 1.0]`.
    pub survival_prob: Vec<f64>,
    /// Number of subjects still at risk just before each time point.
    pub at_risk: Vec<usize>,
    /// Number of events observed at each time point.
    pub events: Vec<usize>,
}

impl KaplanMeierCurve {
    /// Computes the Kaplan-Meier survival curve from survival data.
    ///
    /// # Arguments
    ///
    /// * `data` - `(time, is_censored)` pairs. `is_censored` is `true` when the event
    ///   was not observed before the end of the observation window.
    ///
    /// Non-finite times are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use youtrend_stats::survival::KaplanMeierCurve;
    /// let data = vec![(1.0, false), (2.0, true), (3.0, false)];
    /// let curve = KaplanMeierCurve::from_data(data);
    /// assert_eq!(curve.times, vec![1.0, 3.0]);
    /// assert_eq!(curve.at_risk, vec![3, 1]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_data(mut data: Vec<(f64, bool)>) -> Self {
        data.retain(|(time, _)| time.is_finite());
        data.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut times = vec![];
        let mut survival_prob = vec![];
        let mut at_risk_vec = vec![];
        let mut events_vec = vec![];

        let mut current_survival = 1.0;
        let total = data.len();

        let mut i = 0;
        while i < data.len() {
            let current_time = data[i].0;
            let at_risk = total - i;

            let mut event_count = 0;
            let mut j = i;
            while j < data.len() && data[j].0 == current_time {
                if !data[j].1 {
                    event_count += 1;
                }
                j += 1;
            }

            if event_count > 0 {
                current_survival *= 1.0 - (event_count as f64 / at_risk as f64);

                times.push(current_time);
                survival_prob.push(current_survival);
                at_risk_vec.push(at_risk);
                events_vec.push(event_count);
            }

            i = j;
        }

        Self {
            times,
            survival_prob,
            at_risk: at_risk_vec,
            events: events_vec,
        }
    }

    /// Returns `true` if no event was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns the median survival time.
    ///
    /// The first time at which the survival probability drops to or below 50%,
    /// linearly interpolated between the surrounding event times. `None` when the
    /// curve never reaches 50%.
    ///
    /// # Examples
    ///
    /// ```
    /// # use youtrend_stats::survival::KaplanMeierCurve;
    /// let curve = KaplanMeierCurve::from_data(vec![(1.0, false), (2.0, false)]);
    /// assert_eq!(curve.median_survival(), Some(1.0));
    /// ```
    #[must_use]
    pub fn median_survival(&self) -> Option<f64> {
        let i = self.survival_prob.iter().position(|&p| p <= 0.5)?;
        if i == 0 {
            return Some(self.times[0]);
        }
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (s0, s1) = (self.survival_prob[i - 1], self.survival_prob[i]);
        Some(t0 + (0.5 - s0) / (s1 - s0) * (t1 - t0))
    }

    /// Returns the survival probability at `time`.
    ///
    /// Step function: constant between event times, `1.0` before the first
    /// event, and the last estimate after the last event.
    ///
    /// # Examples
    ///
    /// ```
    /// # use youtrend_stats::survival::KaplanMeierCurve;
    /// let curve = KaplanMeierCurve::from_data(vec![(1.0, false), (2.0, false)]);
    /// assert_eq!(curve.survival_at(0.5), 1.0);
    /// assert_eq!(curve.survival_at(1.5), 0.5);
    /// ```
    #[must_use]
    pub fn survival_at(&self, time: f64) -> f64 {
        let idx = self.times.partition_point(|&t| t <= time);
        if idx == 0 {
            1.0
        } else {
            self.survival_prob[idx - 1]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_data() {
        let curve = KaplanMeierCurve::from_data(vec![]);
        assert!(curve.is_empty());
        assert_eq!(curve.median_survival(), None);
        assert_eq!(curve.survival_at(10.0), 1.0);
    }

    #[test]
    fn test_all_censored_stays_at_one() {
        let curve = KaplanMeierCurve::from_data(vec![(1.0, true), (2.0, true)]);
        assert!(curve.is_empty());
        assert_eq!(curve.survival_at(5.0), 1.0);
    }

    #[test]
    fn test_censoring_reduces_risk_set() {
        // 4 subjects: event at 1, censored at 2, events at 3 and 4
        let data = vec![(3.0, false), (1.0, false), (2.0, true), (4.0, false)];
        let curve = KaplanMeierCurve::from_data(data);

        assert_eq!(curve.times, vec![1.0, 3.0, 4.0]);
        assert_eq!(curve.at_risk, vec![4, 2, 1]);
        assert_eq!(curve.events, vec![1, 1, 1]);
        assert!((curve.survival_prob[0] - 0.75).abs() < 1e-12);
        assert!((curve.survival_prob[1] - 0.375).abs() < 1e-12);
        assert!(curve.survival_prob[2].abs() < 1e-12);
    }

    #[test]
    fn test_tied_event_times() {
        let data = vec![(1.0, false), (1.0, false), (1.0, true), (2.0, false)];
        let curve = KaplanMeierCurve::from_data(data);
        assert_eq!(curve.times, vec![1.0, 2.0]);
        assert_eq!(curve.events, vec![2, 1]);
        assert!((curve.survival_prob[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_median_interpolates() {
        // survival: 0.75 at 1, 0.5 at 2 -> median hits exactly at 2
        let data = vec![(1.0, false), (2.0, false), (3.0, false), (4.0, false)];
        let curve = KaplanMeierCurve::from_data(data);
        let median = curve.median_survival().unwrap();
        assert!((median - 2.0).abs() < 1e-9);

        // survival: 2/3 at 1, 0 at 2 -> interpolated median at 1.25
        let curve = KaplanMeierCurve::from_data(vec![(1.0, false), (2.0, false), (2.0, false)]);
        let median = curve.median_survival().unwrap();
        assert!((median - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_times_ignored() {
        let curve = KaplanMeierCurve::from_data(vec![(f64::NAN, false), (1.0, false)]);
        assert_eq!(curve.times, vec![1.0]);
        assert_eq!(curve.at_risk, vec![1]);
    }
}
