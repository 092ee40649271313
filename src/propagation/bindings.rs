//! Variable bindings for propagation
//!
//! [`Bindings`] holds the two parallel mappings the engine consumes: nominal
//! values and standard uncertainties, both keyed by variable name.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::uncertain::UncertainValue;

/// One entry of a parameter file: either `{"value": .., "uncertainty": ..}`
/// or a bare number for an exact constant
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ParameterEntry {
    Uncertain(UncertainValue),
    Exact(f64),
}

/// Values and uncertainties of named variables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bindings {
    values: HashMap<String, f64>,
    uncertainties: HashMap<String, f64>,
}

impl Bindings {
    /// Create empty bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create bindings from the two mappings directly
    pub fn from_maps(values: HashMap<String, f64>, uncertainties: HashMap<String, f64>) -> Self {
        Self {
            values,
            uncertainties,
        }
    }

    /// Split a mapping of uncertain values into values and uncertainties
    pub fn from_uncertain_values<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, UncertainValue)>,
        S: Into<String>,
    {
        let mut bindings = Self::new();
        for (name, uval) in entries {
            bindings.insert(name, uval);
        }
        bindings
    }

    /// Load bindings from a JSON object of parameters
    ///
    /// Each entry is either `{"value": 0.5, "uncertainty": 0.1}` or a bare
    /// number, which is bound as an exact constant.
    ///
    /// ```
    /// use errprop_rs::propagation::Bindings;
    ///
    /// let bindings = Bindings::from_json(r#"{"ff": {"value": 0.1, "uncertainty": 0.02}, "Q": 3.0}"#).unwrap();
    /// assert_eq!(bindings.value("Q"), Some(3.0));
    /// assert_eq!(bindings.uncertainty("ff"), Some(0.02));
    /// assert_eq!(bindings.uncertainty("Q"), None);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: BTreeMap<String, ParameterEntry> = serde_json::from_str(json)?;
        let mut bindings = Self::new();
        for (name, entry) in entries {
            match entry {
                ParameterEntry::Uncertain(uval) => bindings.insert(name, uval),
                ParameterEntry::Exact(value) => bindings.insert_value(name, value),
            }
        }
        Ok(bindings)
    }

    /// Bind a value together with its uncertainty
    pub fn insert(&mut self, name: impl Into<String>, uval: UncertainValue) {
        let name = name.into();
        let (value, uncertainty) = uval.into_parts();
        self.values.insert(name.clone(), value);
        self.uncertainties.insert(name, uncertainty);
    }

    /// Bind a value without an uncertainty
    pub fn insert_value(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Add all entries of `other`, overwriting existing ones
    pub fn merge(&mut self, other: &Bindings) {
        self.values
            .extend(other.values.iter().map(|(k, v)| (k.clone(), *v)));
        self.uncertainties
            .extend(other.uncertainties.iter().map(|(k, v)| (k.clone(), *v)));
    }

    /// Nominal value of a variable
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Uncertainty of a variable, if one was supplied
    pub fn uncertainty(&self, name: &str) -> Option<f64> {
        self.uncertainties.get(name).copied()
    }

    /// Value and uncertainty of a variable; a missing uncertainty reads as zero
    pub fn get(&self, name: &str) -> Option<UncertainValue> {
        self.value(name)
            .map(|value| UncertainValue::new(value, self.uncertainty(name).unwrap_or(0.0)))
    }

    /// The value mapping
    pub fn values(&self) -> &HashMap<String, f64> {
        &self.values
    }

    /// The uncertainty mapping
    pub fn uncertainties(&self) -> &HashMap<String, f64> {
        &self.uncertainties
    }

    /// Names with a bound value, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.keys().cloned().collect();
        names.sort();
        names
    }

    /// Bound variables as uncertain values, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (String, UncertainValue)> + '_ {
        self.names().into_iter().filter_map(move |name| {
            let uval = self.get(&name)?;
            Some((name, uval))
        })
    }

    /// Number of variables with a bound value
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values are bound
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
