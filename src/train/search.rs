//! Hyperparameter spaces and random sampling for model tuning.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;

/// One sampled hyperparameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Int(i64),
    Str(String),
}

impl ParamValue {
    /// Numeric view; integers widen to `f32`.
    #[must_use]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f32),
            Self::Str(_) => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
        }
    }
}

/// A named assignment of hyperparameter values.
pub type ParamSet = BTreeMap<String, ParamValue>;

/// Renders a parameter set as `name=value` pairs for log lines.
#[must_use]
pub fn params_to_string(params: &ParamSet) -> String {
    params
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One dimension of a search space.
#[derive(Debug, Clone)]
pub enum HyperParam {
    /// Uniform (or log-uniform) over `[low, high]`.
    Continuous { low: f32, high: f32, log_scale: bool },
    /// Uniform over the inclusive integer range.
    Integer { low: i64, high: i64 },
    /// Uniform over an explicit list of values.
    Categorical { choices: Vec<ParamValue> },
}

impl HyperParam {
    #[must_use]
    pub fn continuous(low: f32, high: f32) -> Self {
        Self::Continuous { low, high, log_scale: false }
    }

    #[must_use]
    pub fn continuous_log(low: f32, high: f32) -> Self {
        Self::Continuous { low, high, log_scale: true }
    }

    #[must_use]
    pub fn integer(low: i64, high: i64) -> Self {
        Self::Integer { low, high }
    }

    #[must_use]
    pub fn categorical(choices: Vec<ParamValue>) -> Self {
        Self::Categorical { choices }
    }

    /// Draws one value from this dimension.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> ParamValue {
        match self {
            Self::Continuous { low, high, log_scale } => {
                let value = if *log_scale {
                    let (lo, hi) = (low.ln(), high.ln());
                    rng.gen_range(lo..=hi).exp()
                } else {
                    rng.gen_range(*low..=*high)
                };
                ParamValue::Float(value)
            }
            Self::Integer { low, high } => ParamValue::Int(rng.gen_range(*low..=*high)),
            Self::Categorical { choices } => {
                let idx = rng.gen_range(0..choices.len());
                choices[idx].clone()
            }
        }
    }
}

/// A named collection of [`HyperParam`] dimensions.
#[derive(Debug, Clone, Default)]
pub struct ParamSpace {
    params: BTreeMap<String, HyperParam>,
}

impl ParamSpace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str, param: HyperParam) -> Self {
        self.params.insert(name.to_string(), param);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Draws one full assignment from the space.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> ParamSet {
        self.params
            .iter()
            .map(|(name, param)| (name.clone(), param.sample(rng)))
            .collect()
    }
}

fn floats(values: &[f32]) -> Vec<ParamValue> {
    values.iter().map(|&v| ParamValue::Float(v)).collect()
}

fn ints(values: &[i64]) -> Vec<ParamValue> {
    values.iter().map(|&v| ParamValue::Int(v)).collect()
}

/// Default gradient boosting parameters.
#[must_use]
pub fn gbt_default_params() -> ParamSet {
    let mut params = ParamSet::new();
    params.insert("eta".into(), ParamValue::Float(0.05));
    params.insert("gamma".into(), ParamValue::Float(0.05));
    params.insert("lambda".into(), ParamValue::Float(0.05));
    params.insert("max_depth".into(), ParamValue::Int(21));
    params.insert("min_child_weight".into(), ParamValue::Int(21));
    params.insert("subsample".into(), ParamValue::Float(0.5));
    params.insert("colsample_bytree".into(), ParamValue::Float(0.5));
    params.insert("objective".into(), ParamValue::Str("reg:squarederror".into()));
    params
}

/// Search space for gradient boosting tuning. Every dimension is a
/// fixed value list; random search picks one value per dimension.
#[must_use]
pub fn gbt_search_space() -> ParamSpace {
    ParamSpace::new()
        .with("eta", HyperParam::categorical(floats(&[0.01, 0.05, 0.1, 0.2, 0.3])))
        .with("gamma", HyperParam::categorical(floats(&[0.0, 0.05, 0.1, 0.5, 1.0, 2.0])))
        .with("lambda", HyperParam::categorical(floats(&[0.0, 0.01, 0.05, 0.1, 0.5, 1.0])))
        .with("max_depth", HyperParam::categorical(ints(&[3, 5, 8, 12, 15, 18, 21])))
        .with(
            "min_child_weight",
            HyperParam::categorical(ints(&[9, 12, 15, 18, 21, 24])),
        )
        .with("subsample", HyperParam::categorical(floats(&[0.3, 0.5, 1.0])))
        .with(
            "colsample_bytree",
            HyperParam::categorical(floats(&[0.4, 0.5, 0.6, 0.7])),
        )
        .with(
            "objective",
            HyperParam::categorical(vec![ParamValue::Str("reg:squarederror".into())]),
        )
}
