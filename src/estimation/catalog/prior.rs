//! Prior densities attached to estimated parameters.
//!
//! Purpose
//! -------
//! Represent the prior of an estimated parameter as a closed set of
//! variants, [`Prior`], selected by the shape code stored in the
//! estimated-parameter tables and built eagerly from validated
//! hyper-parameters.
//!
//! Key behaviors
//! -------------
//! - Decode the table's shape code into a [`PriorShape`] tag
//!   (`1` Beta, `2` Gamma, `3` Normal, `4` inverse gamma type 1, `5` Uniform,
//!   `6` inverse gamma type 2; `0`/NaN means "no prior").
//! - Map `(mean, std, p3, p4)` into the natural parameters of each family
//!   and store a ready-to-evaluate `statrs` distribution where one exists.
//! - Evaluate log densities with [`Prior::ln_pdf`]; `Prior::None` contributes
//!   `0.0` so it is neutral in a sum of log priors.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every constructed variant holds finite, admissible parameters; invalid
//!   hyper-parameters are rejected with `EstimationError::InvalidPriorParam`.
//! - `p3` / `p4` are the lower / upper support bounds for Beta and Uniform
//!   and the shift for Gamma; NaN means "use the default".
//!
//! Conventions
//! -----------
//! - Inverse gamma type 1 is the density of `σ` when `σ²` is inverse gamma;
//!   type 2 is the inverse gamma density of `σ²` itself. Both use the
//!   `(s, ν)` parameterization.
//! - Densities are evaluated in log space throughout.
//!
//! Testing notes
//! -------------
//! - Unit tests check shape-code decoding, that every family reproduces the
//!   requested prior mean, and a handful of closed-form log densities.
use crate::estimation::errors::{EstimationError, EstimationResult};
use statrs::{
    distribution::{Beta, Continuous, Gamma, InverseGamma, Normal, Uniform},
    function::gamma::ln_gamma,
    statistics::Distribution,
};

const IG1_MAX_ITER: usize = 200;
const IG1_NU_CEILING: f64 = 1e12;

/// Shape tag decoded from the prior-shape column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorShape {
    Beta,
    Gamma,
    Normal,
    InvGamma1,
    Uniform,
    InvGamma2,
}

impl PriorShape {
    /// Decode a raw table code.
    ///
    /// Returns `Ok(None)` for `0` and NaN (no prior declared).
    ///
    /// # Errors
    /// [`EstimationError::UnknownPriorShape`] for any other value outside
    /// `1..=6` or for non-integral codes.
    pub fn from_code(code: f64) -> EstimationResult<Option<Self>> {
        if code.is_nan() || code == 0.0 {
            return Ok(None);
        }
        if code.fract() != 0.0 {
            return Err(EstimationError::UnknownPriorShape { code });
        }
        match code as i64 {
            1 => Ok(Some(PriorShape::Beta)),
            2 => Ok(Some(PriorShape::Gamma)),
            3 => Ok(Some(PriorShape::Normal)),
            4 => Ok(Some(PriorShape::InvGamma1)),
            5 => Ok(Some(PriorShape::Uniform)),
            6 => Ok(Some(PriorShape::InvGamma2)),
            _ => Err(EstimationError::UnknownPriorShape { code }),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PriorShape::Beta => "beta",
            PriorShape::Gamma => "gamma",
            PriorShape::Normal => "normal",
            PriorShape::InvGamma1 => "inverse gamma (type 1)",
            PriorShape::Uniform => "uniform",
            PriorShape::InvGamma2 => "inverse gamma (type 2)",
        }
    }
}

/// Prior density of one estimated parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Prior {
    /// No prior; contributes zero to the log prior density.
    None,
    /// Generalized beta on `[lower, upper]`.
    Beta { dist: Beta, lower: f64, upper: f64 },
    /// Gamma shifted by `shift`.
    Gamma { dist: Gamma, shift: f64 },
    Normal { dist: Normal },
    /// Inverse gamma type 1 with scale `s` and degrees of freedom `nu`.
    InvGamma1 { s: f64, nu: f64 },
    Uniform { dist: Uniform },
    /// Inverse gamma type 2, stored as shape `nu / 2` and rate `s / 2`.
    InvGamma2 { dist: InverseGamma, s: f64, nu: f64 },
}

impl Prior {
    /// Build a prior of the given shape from its table hyper-parameters.
    ///
    /// Parameters
    /// ----------
    /// - `shape`: decoded tag, `None` yields [`Prior::None`].
    /// - `mean`, `std`: prior mean and standard deviation.
    /// - `p3`, `p4`: family-specific extra parameters (NaN = default).
    ///
    /// Errors
    /// ------
    /// - [`EstimationError::InvalidPriorParam`] naming the family and the
    ///   offending hyper-parameter.
    pub fn construct(
        shape: Option<PriorShape>, mean: f64, std: f64, p3: f64, p4: f64,
    ) -> EstimationResult<Self> {
        let Some(shape) = shape else {
            return Ok(Prior::None);
        };
        match shape {
            PriorShape::Beta => beta_prior(mean, std, p3, p4),
            PriorShape::Gamma => gamma_prior(mean, std, p3),
            PriorShape::Normal => {
                let mean = require_finite(shape, "mean", mean)?;
                let std = require_positive(shape, "std", std)?;
                let dist = Normal::new(mean, std).map_err(|_| invalid(shape, "std", std))?;
                Ok(Prior::Normal { dist })
            }
            PriorShape::InvGamma1 => inv_gamma1_prior(mean, std),
            PriorShape::Uniform => uniform_prior(mean, std, p3, p4),
            PriorShape::InvGamma2 => {
                let mean = require_positive(shape, "mean", mean)?;
                let std = require_positive(shape, "std", std)?;
                let nu = 4.0 + 2.0 * mean * mean / (std * std);
                let s = mean * (nu - 2.0);
                let dist = InverseGamma::new(nu / 2.0, s / 2.0)
                    .map_err(|_| invalid(shape, "std", std))?;
                Ok(Prior::InvGamma2 { dist, s, nu })
            }
        }
    }

    /// Log prior density at `x`; `0.0` for [`Prior::None`], `-∞` outside
    /// the support.
    pub fn ln_pdf(&self, x: f64) -> f64 {
        match self {
            Prior::None => 0.0,
            Prior::Beta { dist, lower, upper } => {
                let width = upper - lower;
                dist.ln_pdf((x - lower) / width) - width.ln()
            }
            Prior::Gamma { dist, shift } => dist.ln_pdf(x - shift),
            Prior::Normal { dist } => dist.ln_pdf(x),
            Prior::InvGamma1 { s, nu } => {
                if x <= 0.0 {
                    return f64::NEG_INFINITY;
                }
                std::f64::consts::LN_2 - ln_gamma(nu / 2.0) + (nu / 2.0) * (s / 2.0).ln()
                    - (nu + 1.0) * x.ln()
                    - s / (2.0 * x * x)
            }
            Prior::Uniform { dist } => dist.ln_pdf(x),
            Prior::InvGamma2 { dist, .. } => dist.ln_pdf(x),
        }
    }

    /// Mean implied by the constructed parameters, `None` for no prior.
    pub fn mean(&self) -> Option<f64> {
        match self {
            Prior::None => None,
            Prior::Beta { dist, lower, upper } => dist.mean().map(|m| lower + m * (upper - lower)),
            Prior::Gamma { dist, shift } => dist.mean().map(|m| m + shift),
            Prior::Normal { dist } => dist.mean(),
            Prior::InvGamma1 { s, nu } => Some(ig1_mean(*s, *nu)),
            Prior::Uniform { dist } => dist.mean(),
            Prior::InvGamma2 { dist, .. } => dist.mean(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Prior::None)
    }

    /// Family of the prior, `None` for [`Prior::None`].
    pub fn shape(&self) -> Option<PriorShape> {
        match self {
            Prior::None => None,
            Prior::Beta { .. } => Some(PriorShape::Beta),
            Prior::Gamma { .. } => Some(PriorShape::Gamma),
            Prior::Normal { .. } => Some(PriorShape::Normal),
            Prior::InvGamma1 { .. } => Some(PriorShape::InvGamma1),
            Prior::Uniform { .. } => Some(PriorShape::Uniform),
            Prior::InvGamma2 { .. } => Some(PriorShape::InvGamma2),
        }
    }
}

fn beta_prior(mean: f64, std: f64, p3: f64, p4: f64) -> EstimationResult<Prior> {
    let shape = PriorShape::Beta;
    let lower = if p3.is_nan() { 0.0 } else { require_finite(shape, "p3", p3)? };
    let upper = if p4.is_nan() { 1.0 } else { require_finite(shape, "p4", p4)? };
    if lower >= upper {
        return Err(EstimationError::InvalidPriorParam {
            shape: shape.name(),
            param: "p4",
            value: upper,
            reason: "Upper support bound must exceed the lower bound.",
        });
    }
    let mean = require_finite(shape, "mean", mean)?;
    let std = require_positive(shape, "std", std)?;
    if mean <= lower || mean >= upper {
        return Err(EstimationError::InvalidPriorParam {
            shape: shape.name(),
            param: "mean",
            value: mean,
            reason: "Mean must lie strictly inside the support.",
        });
    }
    let width = upper - lower;
    let m = (mean - lower) / width;
    let s = std / width;
    let alpha = (1.0 - m) * m * m / (s * s) - m;
    let beta = alpha * (1.0 / m - 1.0);
    if alpha <= 0.0 || beta <= 0.0 {
        return Err(EstimationError::InvalidPriorParam {
            shape: shape.name(),
            param: "std",
            value: std,
            reason: "Standard deviation too large for a beta with this mean.",
        });
    }
    let dist = Beta::new(alpha, beta).map_err(|_| invalid(shape, "std", std))?;
    Ok(Prior::Beta { dist, lower, upper })
}

fn gamma_prior(mean: f64, std: f64, p3: f64) -> EstimationResult<Prior> {
    let shape = PriorShape::Gamma;
    let shift = if p3.is_nan() { 0.0 } else { require_finite(shape, "p3", p3)? };
    let mean = require_finite(shape, "mean", mean)?;
    let std = require_positive(shape, "std", std)?;
    let centered = mean - shift;
    if centered <= 0.0 {
        return Err(EstimationError::InvalidPriorParam {
            shape: shape.name(),
            param: "mean",
            value: mean,
            reason: "Mean must exceed the lower bound p3.",
        });
    }
    let k = centered * centered / (std * std);
    let rate = centered / (std * std);
    let dist = Gamma::new(k, rate).map_err(|_| invalid(shape, "std", std))?;
    Ok(Prior::Gamma { dist, shift })
}

fn uniform_prior(mean: f64, std: f64, p3: f64, p4: f64) -> EstimationResult<Prior> {
    let shape = PriorShape::Uniform;
    let (lower, upper) = if p3.is_finite() && p4.is_finite() {
        (p3, p4)
    } else {
        let mean = require_finite(shape, "mean", mean)?;
        let std = require_positive(shape, "std", std)?;
        let half_width = 3f64.sqrt() * std;
        (mean - half_width, mean + half_width)
    };
    let dist = Uniform::new(lower, upper).map_err(|_| EstimationError::InvalidPriorParam {
        shape: shape.name(),
        param: "p4",
        value: upper,
        reason: "Upper bound must exceed the lower bound.",
    })?;
    Ok(Prior::Uniform { dist })
}

fn inv_gamma1_prior(mean: f64, std: f64) -> EstimationResult<Prior> {
    let shape = PriorShape::InvGamma1;
    let mean = require_positive(shape, "mean", mean)?;
    let std = require_positive(shape, "std", std)?;
    let second_moment = mean * mean + std * std;

    // log of the implied mean minus log of the target mean, increasing in nu
    let gap = |nu: f64| {
        0.5 * ((nu - 2.0) * second_moment / 2.0).ln() + ln_gamma((nu - 1.0) / 2.0)
            - ln_gamma(nu / 2.0)
            - mean.ln()
    };

    let mut lo = 2.0;
    let mut hi = 4.0;
    while gap(hi) <= 0.0 {
        lo = hi;
        hi *= 2.0;
        if hi > IG1_NU_CEILING {
            return Err(invalid(shape, "std", std));
        }
    }
    for _ in 0..IG1_MAX_ITER {
        let mid = 0.5 * (lo + hi);
        if gap(mid) > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
        if hi - lo <= 1e-12 * hi {
            break;
        }
    }
    let nu = 0.5 * (lo + hi);
    let s = (nu - 2.0) * second_moment;
    Ok(Prior::InvGamma1 { s, nu })
}

fn ig1_mean(s: f64, nu: f64) -> f64 {
    (s / 2.0).sqrt() * (ln_gamma((nu - 1.0) / 2.0) - ln_gamma(nu / 2.0)).exp()
}

fn require_finite(shape: PriorShape, param: &'static str, value: f64) -> EstimationResult<f64> {
    if !value.is_finite() {
        return Err(EstimationError::InvalidPriorParam {
            shape: shape.name(),
            param,
            value,
            reason: "Value must be finite.",
        });
    }
    Ok(value)
}

fn require_positive(shape: PriorShape, param: &'static str, value: f64) -> EstimationResult<f64> {
    let value = require_finite(shape, param, value)?;
    if value <= 0.0 {
        return Err(EstimationError::InvalidPriorParam {
            shape: shape.name(),
            param,
            value,
            reason: "Value must be strictly positive.",
        });
    }
    Ok(value)
}

fn invalid(shape: PriorShape, param: &'static str, value: f64) -> EstimationError {
    EstimationError::InvalidPriorParam {
        shape: shape.name(),
        param,
        value,
        reason: "Rejected by the distribution constructor.",
    }
}
