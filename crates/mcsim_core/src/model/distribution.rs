use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::{Binomial, Distribution as _, LogNormal, Normal, Poisson, Triangular, Uniform};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Largest binomial trial count accepted; every integer up to it is exact in f64
pub const MAX_BINOMIAL_TRIALS: u64 = 1 << 53;

/// The supported distribution families, without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    Normal,
    Uniform,
    Triangular,
    LogNormal,
    Binomial,
    Poisson,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 6] = [
        DistributionKind::Normal,
        DistributionKind::Uniform,
        DistributionKind::Triangular,
        DistributionKind::LogNormal,
        DistributionKind::Binomial,
        DistributionKind::Poisson,
    ];

    pub const NAMES: [&'static str; 6] = [
        "normal",
        "uniform",
        "triangular",
        "lognormal",
        "binomial",
        "poisson",
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DistributionKind::Normal => "normal",
            DistributionKind::Uniform => "uniform",
            DistributionKind::Triangular => "triangular",
            DistributionKind::LogNormal => "lognormal",
            DistributionKind::Binomial => "binomial",
            DistributionKind::Poisson => "poisson",
        }
    }

    /// Parameter names this family requires, in display order
    #[must_use]
    pub const fn parameters(self) -> &'static [&'static str] {
        match self {
            DistributionKind::Normal => &["mean", "std"],
            DistributionKind::Uniform => &["min", "max"],
            DistributionKind::Triangular => &["min", "mode", "max"],
            DistributionKind::LogNormal => &["log_mean", "log_std"],
            DistributionKind::Binomial => &["trials", "p"],
            DistributionKind::Poisson => &["rate"],
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistributionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DistributionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// A distribution family together with its typed parameters.
///
/// Construction is unchecked; domain checks happen in [`Distribution::sampler`],
/// which [`Variable::new`](super::Variable::new) calls before a variable
/// exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Distribution {
    Normal {
        mean: f64,
        std: f64,
    },
    Uniform {
        min: f64,
        max: f64,
    },
    Triangular {
        min: f64,
        mode: f64,
        max: f64,
    },
    /// Draws are `exp(Normal(log_mean, log_std))`.
    LogNormal {
        log_mean: f64,
        log_std: f64,
    },
    Binomial {
        trials: u64,
        p: f64,
    },
    Poisson {
        rate: f64,
    },
}

impl Distribution {
    #[must_use]
    pub fn kind(&self) -> DistributionKind {
        match self {
            Distribution::Normal { .. } => DistributionKind::Normal,
            Distribution::Uniform { .. } => DistributionKind::Uniform,
            Distribution::Triangular { .. } => DistributionKind::Triangular,
            Distribution::LogNormal { .. } => DistributionKind::LogNormal,
            Distribution::Binomial { .. } => DistributionKind::Binomial,
            Distribution::Poisson { .. } => DistributionKind::Poisson,
        }
    }

    /// Parameter values in the order of [`DistributionKind::parameters`]
    #[must_use]
    pub fn parameters(&self) -> Vec<(&'static str, f64)> {
        let values = match *self {
            Distribution::Normal { mean, std } => vec![mean, std],
            Distribution::Uniform { min, max } => vec![min, max],
            Distribution::Triangular { min, mode, max } => vec![min, mode, max],
            Distribution::LogNormal { log_mean, log_std } => vec![log_mean, log_std],
            Distribution::Binomial { trials, p } => vec![trials as f64, p],
            Distribution::Poisson { rate } => vec![rate],
        };
        self.kind().parameters().iter().copied().zip(values).collect()
    }

    /// Build a distribution from a kind name and a string-keyed parameter
    /// mapping, as supplied by forms and configuration files.
    ///
    /// The mapping must contain exactly the parameters the kind requires.
    /// Only presence and shape are checked here; numeric domains are checked
    /// by [`Distribution::sampler`].
    pub fn from_parameters<I, K>(
        variable: &str,
        kind: &str,
        parameters: I,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let kind: DistributionKind =
            kind.parse().map_err(|()| ValidationError::UnknownKind {
                variable: variable.to_string(),
                kind: kind.to_string(),
            })?;

        let mut values: FxHashMap<String, f64> = FxHashMap::default();
        for (name, value) in parameters {
            let name = name.as_ref();
            if !kind.parameters().contains(&name) {
                return Err(ValidationError::UnexpectedParameter {
                    variable: variable.to_string(),
                    kind,
                    parameter: name.to_string(),
                });
            }
            values.insert(name.to_string(), value);
        }

        let get = |parameter: &'static str| {
            values
                .get(parameter)
                .copied()
                .ok_or_else(|| ValidationError::MissingParameter {
                    variable: variable.to_string(),
                    kind,
                    parameter,
                })
        };

        Ok(match kind {
            DistributionKind::Normal => Distribution::Normal {
                mean: get("mean")?,
                std: get("std")?,
            },
            DistributionKind::Uniform => Distribution::Uniform {
                min: get("min")?,
                max: get("max")?,
            },
            DistributionKind::Triangular => Distribution::Triangular {
                min: get("min")?,
                mode: get("mode")?,
                max: get("max")?,
            },
            DistributionKind::LogNormal => Distribution::LogNormal {
                log_mean: get("log_mean")?,
                log_std: get("log_std")?,
            },
            DistributionKind::Binomial => {
                let trials = get("trials")?;
                if !(trials.is_finite() && trials >= 0.0 && trials.fract() == 0.0) {
                    return Err(ValidationError::InvalidParameter {
                        variable: variable.to_string(),
                        kind,
                        parameter: "trials",
                        value: trials,
                        reason: "must be a non-negative integer",
                    });
                }
                if trials > MAX_BINOMIAL_TRIALS as f64 {
                    return Err(ValidationError::InvalidParameter {
                        variable: variable.to_string(),
                        kind,
                        parameter: "trials",
                        value: trials,
                        reason: "is too large",
                    });
                }
                Distribution::Binomial {
                    trials: trials as u64,
                    p: get("p")?,
                }
            }
            DistributionKind::Poisson => Distribution::Poisson {
                rate: get("rate")?,
            },
        })
    }

    /// Check parameter domains and prepare a sampler.
    ///
    /// `variable` is only used to make error messages self-contained.
    pub fn sampler(&self, variable: &str) -> Result<Sampler, ValidationError> {
        let kind = self.kind();
        let invalid = |parameter: &'static str, value: f64, reason: &'static str| {
            ValidationError::InvalidParameter {
                variable: variable.to_string(),
                kind,
                parameter,
                value,
                reason,
            }
        };

        for (parameter, value) in self.parameters() {
            if !value.is_finite() {
                return Err(invalid(parameter, value, "must be a finite number"));
            }
        }

        let sampler = match *self {
            Distribution::Normal { mean, std } => {
                if std < 0.0 {
                    return Err(invalid("std", std, "must be non-negative"));
                }
                if std == 0.0 {
                    Sampler::Constant(mean)
                } else {
                    Normal::new(mean, std)
                        .map(Sampler::Normal)
                        .map_err(|_| invalid("std", std, "must be non-negative"))?
                }
            }
            Distribution::Uniform { min, max } => {
                if min > max {
                    return Err(invalid("min", min, "must not exceed max"));
                }
                if min == max {
                    Sampler::Constant(min)
                } else {
                    Uniform::new_inclusive(min, max)
                        .map(Sampler::Uniform)
                        .map_err(|_| invalid("max", max, "range is not representable"))?
                }
            }
            Distribution::Triangular { min, mode, max } => {
                if min > max {
                    return Err(invalid("min", min, "must not exceed max"));
                }
                if mode < min || mode > max {
                    return Err(invalid("mode", mode, "must lie between min and max"));
                }
                if min == max {
                    Sampler::Constant(min)
                } else {
                    Triangular::new(min, max, mode)
                        .map(Sampler::Triangular)
                        .map_err(|_| invalid("mode", mode, "must lie between min and max"))?
                }
            }
            Distribution::LogNormal { log_mean, log_std } => {
                if log_std < 0.0 {
                    return Err(invalid("log_std", log_std, "must be non-negative"));
                }
                if log_std == 0.0 {
                    Sampler::Constant(log_mean.exp())
                } else {
                    LogNormal::new(log_mean, log_std)
                        .map(Sampler::LogNormal)
                        .map_err(|_| invalid("log_std", log_std, "must be non-negative"))?
                }
            }
            Distribution::Binomial { trials, p } => {
                if !(0.0..=1.0).contains(&p) {
                    return Err(invalid("p", p, "must lie in [0, 1]"));
                }
                if trials > MAX_BINOMIAL_TRIALS {
                    return Err(invalid("trials", trials as f64, "is too large"));
                }
                Binomial::new(trials, p)
                    .map(Sampler::Binomial)
                    .map_err(|_| invalid("p", p, "must lie in [0, 1]"))?
            }
            Distribution::Poisson { rate } => {
                if rate < 0.0 {
                    return Err(invalid("rate", rate, "must be non-negative"));
                }
                if rate == 0.0 {
                    Sampler::Constant(0.0)
                } else {
                    Poisson::new(rate)
                        .map(Sampler::Poisson)
                        .map_err(|_| invalid("rate", rate, "is too large to sample"))?
                }
            }
        };
        Ok(sampler)
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind())?;
        for (i, (name, value)) in self.parameters().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}

/// A validated, ready-to-draw distribution.
///
/// Degenerate parameterizations (zero spread, zero rate) collapse to
/// `Constant` so they return their exact value.
#[derive(Debug, Clone)]
pub enum Sampler {
    Constant(f64),
    Normal(Normal<f64>),
    Uniform(Uniform<f64>),
    Triangular(Triangular<f64>),
    LogNormal(LogNormal<f64>),
    Binomial(Binomial),
    Poisson(Poisson<f64>),
}

impl Sampler {
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Sampler::Constant(value) => *value,
            Sampler::Normal(d) => d.sample(rng),
            Sampler::Uniform(d) => d.sample(rng),
            Sampler::Triangular(d) => d.sample(rng),
            Sampler::LogNormal(d) => d.sample(rng),
            Sampler::Binomial(d) => d.sample(rng) as f64,
            Sampler::Poisson(d) => d.sample(rng),
        }
    }

    /// Replace the contents of `buf` with `n` independent draws
    pub fn sample_into<R: Rng + ?Sized>(&self, rng: &mut R, n: usize, buf: &mut Vec<f64>) {
        buf.clear();
        buf.reserve(n);
        buf.extend((0..n).map(|_| self.sample(rng)));
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn draw(distribution: Distribution, n: usize) -> Vec<f64> {
        let sampler = distribution.sampler("x").unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut buf = Vec::new();
        sampler.sample_into(&mut rng, n, &mut buf);
        buf
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in DistributionKind::ALL {
            assert_eq!(kind.as_str().parse::<DistributionKind>(), Ok(kind));
        }
        assert!("uniforme".parse::<DistributionKind>().is_err());
        assert_eq!(DistributionKind::NAMES.len(), DistributionKind::ALL.len());
    }

    #[test]
    fn test_from_parameters_requires_exact_keys() {
        let ok = Distribution::from_parameters("x", "normal", [("mean", 1.0), ("std", 2.0)]);
        assert_eq!(ok, Ok(Distribution::Normal { mean: 1.0, std: 2.0 }));

        let missing = Distribution::from_parameters("x", "triangular", [("min", 0.0), ("max", 1.0)]);
        assert!(matches!(
            missing,
            Err(ValidationError::MissingParameter { parameter: "mode", .. })
        ));

        let extra = Distribution::from_parameters("x", "poisson", [("rate", 1.0), ("lambda", 1.0)]);
        assert!(matches!(
            extra,
            Err(ValidationError::UnexpectedParameter { ref parameter, .. }) if parameter == "lambda"
        ));

        let unknown = Distribution::from_parameters("x", "gamma", [("shape", 1.0)]);
        assert!(matches!(unknown, Err(ValidationError::UnknownKind { .. })));
    }

    #[test]
    fn test_binomial_trials_must_be_integral() {
        let err = Distribution::from_parameters("n", "binomial", [("trials", 2.5), ("p", 0.5)]);
        assert!(matches!(
            err,
            Err(ValidationError::InvalidParameter { parameter: "trials", .. })
        ));
        let err = Distribution::from_parameters("n", "binomial", [("trials", -1.0), ("p", 0.5)]);
        assert!(err.is_err());
    }

    #[test]
    fn test_huge_binomial_trials_rejected() {
        let err = Distribution::from_parameters("n", "binomial", [("trials", 1e30), ("p", 0.5)]);
        assert!(matches!(
            err,
            Err(ValidationError::InvalidParameter { parameter: "trials", reason: "is too large", .. })
        ));

        let typed = Distribution::Binomial { trials: u64::MAX, p: 0.5 };
        assert!(matches!(
            typed.sampler("n"),
            Err(ValidationError::InvalidParameter { parameter: "trials", .. })
        ));

        let largest = Distribution::Binomial { trials: MAX_BINOMIAL_TRIALS, p: 0.5 };
        assert!(largest.sampler("n").is_ok());
    }

    #[test]
    fn test_domain_checks() {
        let cases = [
            (Distribution::Normal { mean: 0.0, std: -1.0 }, "std"),
            (Distribution::Uniform { min: 2.0, max: 1.0 }, "min"),
            (Distribution::Triangular { min: 0.0, mode: 5.0, max: 1.0 }, "mode"),
            (Distribution::LogNormal { log_mean: 0.0, log_std: -0.1 }, "log_std"),
            (Distribution::Binomial { trials: 10, p: 1.5 }, "p"),
            (Distribution::Poisson { rate: -2.0 }, "rate"),
            (Distribution::Normal { mean: f64::NAN, std: 1.0 }, "mean"),
        ];
        for (distribution, expected) in cases {
            match distribution.sampler("v") {
                Err(ValidationError::InvalidParameter { parameter, .. }) => {
                    assert_eq!(parameter, expected, "{distribution}")
                }
                other => panic!("expected invalid {expected} for {distribution}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_degenerate_parameters_are_constant() {
        assert!(draw(Distribution::Normal { mean: 5.0, std: 0.0 }, 50).iter().all(|&v| v == 5.0));
        assert!(draw(Distribution::Uniform { min: 3.0, max: 3.0 }, 50).iter().all(|&v| v == 3.0));
        assert!(
            draw(Distribution::Triangular { min: 1.0, mode: 1.0, max: 1.0 }, 50)
                .iter()
                .all(|&v| v == 1.0)
        );
        assert!(draw(Distribution::Poisson { rate: 0.0 }, 50).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_sample_ranges() {
        let n = 2_000;

        let uniform = draw(Distribution::Uniform { min: -1.0, max: 4.0 }, n);
        assert_eq!(uniform.len(), n);
        assert!(uniform.iter().all(|v| (-1.0..=4.0).contains(v)));

        let triangular = draw(Distribution::Triangular { min: 0.0, mode: 2.0, max: 3.0 }, n);
        assert!(triangular.iter().all(|v| (0.0..=3.0).contains(v)));

        let binomial = draw(Distribution::Binomial { trials: 12, p: 0.3 }, n);
        assert!(binomial.iter().all(|v| v.fract() == 0.0 && (0.0..=12.0).contains(v)));

        let poisson = draw(Distribution::Poisson { rate: 4.5 }, n);
        assert!(poisson.iter().all(|v| v.fract() == 0.0 && *v >= 0.0));

        let lognormal = draw(Distribution::LogNormal { log_mean: 0.0, log_std: 0.5 }, n);
        assert!(lognormal.iter().all(|v| *v > 0.0));
    }

    #[test]
    fn test_normal_moments() {
        let values = draw(Distribution::Normal { mean: 10.0, std: 2.0 }, 20_000);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!((mean - 10.0).abs() < 0.1, "mean was {mean}");
    }

    #[test]
    fn test_display() {
        let d = Distribution::Triangular { min: 1.0, mode: 2.0, max: 4.0 };
        assert_eq!(d.to_string(), "triangular(min=1, mode=2, max=4)");
    }

    #[test]
    fn test_serde_tagged() {
        let d: Distribution =
            serde_json::from_str(r#"{"kind":"lognormal","log_mean":0.0,"log_std":0.25}"#).unwrap();
        assert_eq!(d, Distribution::LogNormal { log_mean: 0.0, log_std: 0.25 });
    }
}
