//! Closed-form survival functions of the fitted model families
//!
//! Both functions take the model read-only and hold no state, so one model can
//! be evaluated from many threads at once.
//!
//! | family       | scale               | shape                | `S(t)`                    |
//! |--------------|---------------------|----------------------|---------------------------|
//! | Weibull      | `λ = exp(primary·x)` | `ρ = exp(ancillary·x)` | `exp(-(t/λ)^ρ)`          |
//! | log-logistic | `α = exp(primary·x)` | `β = exp(ancillary·x)` | `1 / (1 + (t/α)^β)`      |
//! | log-normal   | `μ = primary·x`      | `σ = exp(ancillary·x)` | `1 - Φ((ln t - μ) / σ)`  |
//!
//! `t` is the elapsed time in days since publication; `S(0) = 1` for every
//! family.

use statrs::distribution::{ContinuousCDF as _, Normal};

use crate::model::{Covariates, ModelError, ModelFamily, SurvivalModel};

/// Cumulative hazard `H(t) = -ln S(t)`.
pub fn cumulative_hazard(
    model: &SurvivalModel,
    covariates: &Covariates,
    time: f64,
) -> Result<f64, ModelError> {
    if time.is_nan() {
        return Err(ModelError::InvalidTime { time });
    }
    let primary = model.primary.linear_predictor(covariates)?;
    let ancillary = model.ancillary.linear_predictor(covariates)?;
    if time <= 0.0 {
        return Ok(0.0);
    }

    let hazard = match model.family {
        ModelFamily::Weibull => {
            let (lambda, rho) = (primary.exp(), ancillary.exp());
            (time / lambda).powf(rho)
        }
        ModelFamily::LogLogistic => {
            let (alpha, beta) = (primary.exp(), ancillary.exp());
            (time / alpha).powf(beta).ln_1p()
        }
        ModelFamily::LogNormal => {
            let (mu, sigma) = (primary, ancillary.exp());
            let z = (time.ln() - mu) / sigma;
            -Normal::standard().sf(z).ln()
        }
    };
    Ok(hazard.max(0.0))
}

/// Probability that the video has not entered the trending list `time` days
/// after publication.
///
/// ```
/// use youtrend_predict::{
///     model::{Coefficients, Covariates, ModelFamily, SurvivalModel},
///     survival::survival_function,
/// };
///
/// let model = SurvivalModel {
///     family: ModelFamily::Weibull,
///     primary: Coefficients { intercept: 0.0, weights: Default::default() },
///     ancillary: Coefficients::default(),
/// };
/// let covariates = Covariates::new();
/// assert_eq!(survival_function(&model, &covariates, 0.0).unwrap(), 1.0);
/// // λ = ρ = 1: S(1) = exp(-1)
/// let s = survival_function(&model, &covariates, 1.0).unwrap();
/// assert!((s - (-1.0_f64).exp()).abs() < 1e-12);
/// ```
pub fn survival_function(
    model: &SurvivalModel,
    covariates: &Covariates,
    time: f64,
) -> Result<f64, ModelError> {
    let hazard = cumulative_hazard(model, covariates, time)?;
    Ok((-hazard).exp().clamp(0.0, 1.0))
}
