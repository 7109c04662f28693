//! Statistical utilities for the YouTrend duration model.
//!
//! - **Survival analysis**: Kaplan-Meier estimator for time-to-event data with
//!   right-censoring
//!
//! # Modules
//!
//! - [`survival`]: Kaplan-Meier survival curves for analyzing time-to-trend data
//!
//! # Examples
//!
//! ```
//! use youtrend_stats::survival::KaplanMeierCurve;
//!
//! // Data: (time in days, is_censored)
//! let data = vec![
//!     (1.5, false), // Entered trending after 1.5 days
//!     (3.0, true),  // Still not trending when observation ended
//!     (4.25, false),
//! ];
//! let curve = KaplanMeierCurve::from_data(data);
//! assert_eq!(curve.times, vec![1.5, 4.25]);
//! ```

pub mod survival;
