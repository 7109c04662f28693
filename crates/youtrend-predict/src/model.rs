//! Fitted accelerated-failure-time models
//!
//! The model is fitted by an external survival library and persisted as JSON:
//!
//! ```json
//! {
//!   "family": "weibull",
//!   "primary": {
//!     "intercept": 1.2,
//!     "weights": { "creatorSubscriberNumber": -0.8, "videoCat_Music": 0.1 }
//!   },
//!   "ancillary": { "intercept": 0.3 }
//! }
//! ```
//!
//! `primary` is the linear predictor of the scale parameter (`lambda` for
//! Weibull, `alpha` for log-logistic, `mu` for log-normal) and `ancillary` the
//! one of the shape parameter (`rho`, `beta`, `sigma`).

use std::{
    collections::BTreeMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ModelError {
    #[display("covariate '{name}' used by the model is missing")]
    MissingCovariate { name: String },
    #[display("invalid elapsed time {time}")]
    InvalidTime { time: f64 },
    #[display("failed to open model file {}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[display("failed to parse model file {}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    Weibull,
    LogLogistic,
    LogNormal,
}

/// Named covariate values of one video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Covariates(BTreeMap<String, f64>);

impl Covariates {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S>(&mut self, name: S, value: f64)
    where
        S: Into<String>,
    {
        self.0.insert(name.into(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S> FromIterator<(S, f64)> for Covariates
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }
}

/// Intercept and named weights of one linear predictor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub intercept: f64,
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

impl Coefficients {
    /// `intercept + Σ weight·x`. Every weighted covariate must be present.
    pub fn linear_predictor(&self, covariates: &Covariates) -> Result<f64, ModelError> {
        self.weights
            .iter()
            .try_fold(self.intercept, |acc, (name, weight)| {
                let value = covariates
                    .get(name)
                    .ok_or_else(|| ModelError::MissingCovariate { name: name.clone() })?;
                Ok(acc + weight * value)
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalModel {
    pub family: ModelFamily,
    #[serde(alias = "lambda", alias = "alpha", alias = "mu")]
    pub primary: Coefficients,
    #[serde(default, alias = "rho", alias = "beta", alias = "sigma")]
    pub ancillary: Coefficients,
}

impl SurvivalModel {
    pub fn load<P>(path: P) -> Result<Self, ModelError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ModelError::Io {
            path: path.to_owned(),
            source,
        })?;
        let model: Self = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            ModelError::Json {
                path: path.to_owned(),
                source,
            }
        })?;
        tracing::debug!(
            path = %path.display(),
            family = ?model.family,
            covariates = model.covariate_names().count(),
            "loaded survival model"
        );
        Ok(model)
    }

    /// Every covariate name the model weights, without duplicates.
    pub fn covariate_names(&self) -> impl Iterator<Item = &str> {
        let mut names = self
            .primary
            .weights
            .keys()
            .chain(self.ancillary.weights.keys())
            .map(String::as_str)
            .collect::<Vec<_>>();
        names.sort_unstable();
        names.dedup();
        names.into_iter()
    }
}
