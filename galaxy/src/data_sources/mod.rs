//! Read-only data sources
//!
//! Singular and list sources are derived from the resource adapters so
//! their attributes always match the resource of the same entity.

pub mod catalog_validation;
pub mod entity;
pub mod list;
pub mod role_grants;

pub use catalog_validation::CatalogValidationDataSource;
pub use entity::EntityDataSource;
pub use list::EntityListDataSource;
pub use role_grants::RoleGrantsDataSource;

use std::collections::HashMap;
use std::sync::Arc;
use tfplug::data_source::{ConfigureDataSourceRequest, ConfigureDataSourceResponse};
use tfplug::schema::Attribute;
use tfplug::types::{Diagnostic, Dynamic, DynamicValue};

use crate::provider_data::GalaxyProviderData;

/// Provider data slot every data source carries
#[derive(Default)]
pub(crate) struct Configured {
    data: Option<Arc<GalaxyProviderData>>,
}

impl Configured {
    pub(crate) fn with(data: Arc<GalaxyProviderData>) -> Self {
        Self { data: Some(data) }
    }

    pub(crate) fn configure(
        &mut self,
        type_name: &str,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];
        match request.provider_data {
            Some(data) => match data.downcast::<GalaxyProviderData>() {
                Ok(data) => self.data = Some(data),
                Err(_) => {
                    tracing::error!(type_name, "provider data has the wrong type");
                    diagnostics.push(Diagnostic::error(
                        "Invalid provider data",
                        "Failed to extract GalaxyProviderData from provider data",
                    ));
                }
            },
            None => diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the data source",
            )),
        }
        ConfigureDataSourceResponse { diagnostics }
    }

    pub(crate) fn get(&self) -> Result<&GalaxyProviderData, Diagnostic> {
        self.data.as_deref().ok_or_else(|| {
            Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            )
        })
    }
}

/// Keeps exactly the named attributes of a folded state, filling gaps
/// with null so the value conforms to an object type
pub(crate) fn project(state: DynamicValue, attributes: &[Attribute]) -> HashMap<String, Dynamic> {
    let mut values = match state.value {
        Dynamic::Map(values) => values,
        _ => HashMap::new(),
    };
    attributes
        .iter()
        .map(|attribute| {
            let value = values.remove(&attribute.name).unwrap_or(Dynamic::Null);
            (attribute.name.clone(), value)
        })
        .collect()
}
