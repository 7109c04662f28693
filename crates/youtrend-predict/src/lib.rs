//! Prediction engine of the YouTrend duration model
//!
//! Evaluates a fitted accelerated-failure-time model for single videos:
//!
//! 1. **Encode** the raw record with the persisted category vocabulary
//! 2. **Prepare** ([`preprocess::PredictionPreprocessor`]): scale continuous
//!    features and compute the elapsed time since publication
//! 3. **Evaluate** ([`survival::survival_function`]): closed-form survival of
//!    the model family
//! 4. **Sample** ([`curve::trend_curve`]): a survival curve over a span of days
//!
//! [`context::PredictionContext`] bundles the loaded model and encoder
//! artifact and exposes `predict` / `predict_curve`.

pub use self::error::PredictError;

pub mod context;
pub mod curve;
mod error;
pub mod model;
pub mod preprocess;
pub mod survival;
