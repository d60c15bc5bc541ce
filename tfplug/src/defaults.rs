//! Default value providers for attributes
//!
//! Defaults apply during planning to optional+computed attributes whose
//! configuration value is null. An explicit value in configuration always
//! wins.
//!
//! ```no_run
//! use tfplug::schema::{AttributeBuilder, AttributeType};
//! use tfplug::defaults::StaticDefault;
//!
//! let port = AttributeBuilder::new("port", AttributeType::Number)
//!     .optional_computed()
//!     .default(StaticDefault::number(5432.0))
//!     .build();
//! ```

use crate::schema::{Default, DefaultRequest, DefaultResponse};
use crate::types::{Dynamic, DynamicValue};

/// StaticDefault provides a static default value
pub struct StaticDefault {
    value: Dynamic,
}

impl StaticDefault {
    /// Create a new static default provider with the given value
    pub fn create(value: Dynamic) -> Box<dyn Default> {
        Box::new(Self { value })
    }

    /// Create a static string default
    pub fn string(value: &str) -> Box<dyn Default> {
        Self::create(Dynamic::String(value.to_string()))
    }

    /// Create a static number default
    pub fn number(value: f64) -> Box<dyn Default> {
        Self::create(Dynamic::Number(value))
    }

    /// Create a static boolean default
    pub fn bool(value: bool) -> Box<dyn Default> {
        Self::create(Dynamic::Bool(value))
    }

    /// Create a static list default
    pub fn list(values: Vec<Dynamic>) -> Box<dyn Default> {
        Self::create(Dynamic::List(values))
    }
}

impl Default for StaticDefault {
    fn description(&self) -> String {
        format!("static default value: {:?}", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: DynamicValue::new(self.value.clone()),
        }
    }
}

/// Computes the default from the attribute path
pub struct ConditionalDefault<F>
where
    F: Fn(&DefaultRequest) -> Dynamic + Send + Sync,
{
    description: String,
    condition_fn: F,
}

impl<F> ConditionalDefault<F>
where
    F: Fn(&DefaultRequest) -> Dynamic + Send + Sync + 'static,
{
    pub fn create(description: &str, condition_fn: F) -> Box<dyn Default> {
        Box::new(Self {
            description: description.to_string(),
            condition_fn,
        })
    }
}

impl<F> Default for ConditionalDefault<F>
where
    F: Fn(&DefaultRequest) -> Dynamic + Send + Sync,
{
    fn description(&self) -> String {
        self.description.clone()
    }

    fn default_value(&self, request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: DynamicValue::new((self.condition_fn)(&request)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributePath;

    fn request(name: &str) -> DefaultRequest {
        DefaultRequest {
            path: AttributePath::new(name),
        }
    }

    #[test]
    fn static_default_string() {
        let default = StaticDefault::string("UTC");
        let response = default.default_value(request("timezone"));
        assert_eq!(response.value.value, Dynamic::String("UTC".to_string()));
    }

    #[test]
    fn static_default_number() {
        let default = StaticDefault::number(5432.0);
        let response = default.default_value(request("port"));
        assert_eq!(response.value.value, Dynamic::Number(5432.0));
    }

    #[test]
    fn static_default_bool() {
        let default = StaticDefault::bool(false);
        let response = default.default_value(request("read_only"));
        assert_eq!(response.value.value, Dynamic::Bool(false));
    }

    #[test]
    fn static_default_list() {
        let default = StaticDefault::list(vec![]);
        let response = default.default_value(request("catalog_refs"));
        assert_eq!(response.value.value, Dynamic::List(vec![]));
    }

    #[test]
    fn conditional_default_sees_path() {
        let default = ConditionalDefault::create("port by attribute", |req| {
            if req.path == AttributePath::new("port") {
                Dynamic::Number(1433.0)
            } else {
                Dynamic::Null
            }
        });

        assert_eq!(
            default.default_value(request("port")).value.value,
            Dynamic::Number(1433.0)
        );
        assert!(default.default_value(request("other")).value.is_null());
    }
}
