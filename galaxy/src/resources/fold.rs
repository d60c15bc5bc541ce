//! Translation between typed wire records and attribute maps
//!
//! [`StateBuilder`] folds a response into state: absent scalars become
//! null, absent lists become empty lists, integers are stored as numbers.
//! [`PlanReader`] goes the other way and only ever yields known values,
//! so unknown or null plan entries are simply left out of payloads.

use std::collections::HashMap;
use tfplug::types::{AttributePath, Dynamic, DynamicValue};

use crate::error::GalaxyError;

#[derive(Debug, Default)]
pub struct StateBuilder {
    values: HashMap<String, Dynamic>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(mut self, name: &str, value: Option<&str>) -> Self {
        self.values.insert(name.to_string(), string(value));
        self
    }

    pub fn int(mut self, name: &str, value: Option<i64>) -> Self {
        self.values.insert(name.to_string(), int(value));
        self
    }

    /// Fills a server-omitted integer with the well-known default
    pub fn int_or(self, name: &str, value: Option<i64>, default: Option<i64>) -> Self {
        self.int(name, value.or(default))
    }

    pub fn bool(mut self, name: &str, value: Option<bool>) -> Self {
        self.values.insert(name.to_string(), boolean(value));
        self
    }

    pub fn bool_or(self, name: &str, value: Option<bool>, default: bool) -> Self {
        self.bool(name, Some(value.unwrap_or(default)))
    }

    /// Absent lists fold to an empty list, never null
    pub fn strings(mut self, name: &str, value: Option<&[String]>) -> Self {
        self.values.insert(name.to_string(), strings(value));
        self
    }

    pub fn objects(mut self, name: &str, value: Vec<Dynamic>) -> Self {
        self.values.insert(name.to_string(), Dynamic::List(value));
        self
    }

    pub fn build(self) -> DynamicValue {
        DynamicValue::new(Dynamic::Map(self.values))
    }

    /// For nested list elements
    pub fn build_object(self) -> Dynamic {
        Dynamic::Map(self.values)
    }
}

pub fn string(value: Option<&str>) -> Dynamic {
    value
        .map(|s| Dynamic::String(s.to_string()))
        .unwrap_or(Dynamic::Null)
}

pub fn int(value: Option<i64>) -> Dynamic {
    value
        .map(|i| Dynamic::Number(i as f64))
        .unwrap_or(Dynamic::Null)
}

pub fn boolean(value: Option<bool>) -> Dynamic {
    value.map(Dynamic::Bool).unwrap_or(Dynamic::Null)
}

pub fn strings(value: Option<&[String]>) -> Dynamic {
    Dynamic::List(
        value
            .unwrap_or_default()
            .iter()
            .map(|s| Dynamic::String(s.clone()))
            .collect(),
    )
}

/// Read access to planned state, prior state or configuration
pub struct PlanReader<'a> {
    value: &'a DynamicValue,
}

impl<'a> PlanReader<'a> {
    pub fn new(value: &'a DynamicValue) -> Self {
        Self { value }
    }

    fn known(&self, name: &str) -> Option<&'a Dynamic> {
        self.value
            .get(&AttributePath::new(name))
            .filter(|v| v.is_known() && !v.is_null())
    }

    pub fn string(&self, name: &str) -> Option<String> {
        self.known(name).and_then(Dynamic::as_str).map(str::to_string)
    }

    pub fn required_string(&self, name: &str) -> Result<String, GalaxyError> {
        self.string(name).ok_or_else(|| GalaxyError::missing(name))
    }

    /// Numbers with a fractional part are rejected, not truncated
    pub fn int(&self, name: &str) -> Result<Option<i64>, GalaxyError> {
        match self.known(name).and_then(Dynamic::as_number) {
            None => Ok(None),
            Some(n) if n.fract() == 0.0 => Ok(Some(n as i64)),
            Some(n) => Err(GalaxyError::Configuration(format!(
                "{} must be a whole number, got {}",
                name, n
            ))),
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.known(name).and_then(Dynamic::as_bool)
    }

    /// Known string elements of a list; unknown elements are skipped
    pub fn strings(&self, name: &str) -> Option<Vec<String>> {
        self.known(name).and_then(Dynamic::as_list).map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
    }

    pub fn objects(&self, name: &str) -> Option<Vec<&'a HashMap<String, Dynamic>>> {
        self.known(name)
            .and_then(Dynamic::as_list)
            .map(|items| items.iter().filter_map(Dynamic::as_map).collect())
    }
}

/// Field access on one element of a list of objects
pub fn field_string(object: &HashMap<String, Dynamic>, name: &str) -> Option<String> {
    object.get(name).and_then(Dynamic::as_str).map(str::to_string)
}

pub fn field_strings(object: &HashMap<String, Dynamic>, name: &str) -> Option<Vec<String>> {
    object.get(name).and_then(Dynamic::as_list).map(|items| {
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect()
    })
}
