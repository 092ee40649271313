//! # Result Tables
//!
//! Solver output is collected in a [`Table`], an insertion-ordered mapping of
//! names to [`Displayable`] entries. A single recursive [`Displayable::render`]
//! turns any entry into its display string: numbers with two decimals,
//! uncertain values as `value+-uncertainty`, text verbatim, nested tables as
//! `{key: value, ...}`.
//!
//! ## Example Usage
//!
//! ```rust
//! use errprop_rs::report::{Displayable, Table};
//! use errprop_rs::UncertainValue;
//!
//! let mut table = Table::new();
//! table.insert("r2", 0.8123);
//! table.insert("slope", UncertainValue::new(0.5, 0.1));
//! table.insert("group", "all");
//!
//! assert_eq!(Displayable::from(table).render(), "{r2: 0.81, slope: 0.50+-0.10, group: all}");
//! ```

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::Result;
use crate::uncertain::UncertainValue;

/// A value that can appear in a result table
#[derive(Debug, Clone, PartialEq)]
pub enum Displayable {
    /// Plain number, rendered with two decimals
    Scalar(f64),

    /// Value with uncertainty, rendered as `value+-uncertainty`
    Uncertain(UncertainValue),

    /// Free text, rendered verbatim
    Text(String),

    /// Nested table
    Table(Table),
}

impl Displayable {
    /// Display string of this entry
    pub fn render(&self) -> String {
        match self {
            Displayable::Scalar(value) => format!("{:.2}", value),
            Displayable::Uncertain(uval) => uval.to_string(),
            Displayable::Text(text) => text.clone(),
            Displayable::Table(table) => {
                let entries: Vec<String> = table
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, value.render()))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
        }
    }
}

impl fmt::Display for Displayable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Serialize for Displayable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Displayable::Scalar(value) => serializer.serialize_f64(*value),
            Displayable::Uncertain(uval) => uval.serialize(serializer),
            Displayable::Text(text) => serializer.serialize_str(text),
            Displayable::Table(table) => table.serialize(serializer),
        }
    }
}

impl From<f64> for Displayable {
    fn from(value: f64) -> Self {
        Displayable::Scalar(value)
    }
}

impl From<UncertainValue> for Displayable {
    fn from(uval: UncertainValue) -> Self {
        Displayable::Uncertain(uval)
    }
}

impl From<String> for Displayable {
    fn from(text: String) -> Self {
        Displayable::Text(text)
    }
}

impl From<&str> for Displayable {
    fn from(text: &str) -> Self {
        Displayable::Text(text.to_string())
    }
}

impl From<Table> for Displayable {
    fn from(table: Table) -> Self {
        Displayable::Table(table)
    }
}

/// Insertion-ordered mapping of names to displayable entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    entries: Vec<(String, Displayable)>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry
    ///
    /// An existing key keeps its position and has its value replaced; a new
    /// key is appended.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Displayable>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up an entry by key
    pub fn get(&self, key: &str) -> Option<&Displayable> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Look up an uncertain value by key
    pub fn get_uncertain(&self, key: &str) -> Option<UncertainValue> {
        match self.get(key) {
            Some(Displayable::Uncertain(uval)) => Some(*uval),
            _ => None,
        }
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Displayable)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(key, rendered value)` rows, e.g. for writing a two-column file
    pub fn render_rows(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), value.render()))
            .collect()
    }

    /// Serialize to a JSON object in insertion order
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>, V: Into<Displayable>> FromIterator<(K, V)> for Table {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Table::new();
        for (key, value) in iter {
            table.insert(key, value);
        }
        table
    }
}
