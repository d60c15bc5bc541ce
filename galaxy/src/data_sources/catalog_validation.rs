//! `galaxy_<family>_catalog_validation` probes
//!
//! A failed probe is reported as a warning with `validation_successful`
//! false. It never fails the apply.

use async_trait::async_trait;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::plan::validate_config;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, DynamicValue};
use tracing::warn;

use super::Configured;
use crate::api::catalogs::CatalogFamily;
use crate::error::GalaxyError;
use crate::provider_data::GalaxyProviderData;
use crate::resources::fold::{PlanReader, StateBuilder};

pub struct CatalogValidationDataSource {
    family: CatalogFamily,
    type_name: String,
    provider_data: Configured,
}

impl CatalogValidationDataSource {
    pub fn new(family: CatalogFamily) -> Self {
        Self {
            family,
            type_name: format!("galaxy_{}_catalog_validation", family.as_str()),
            provider_data: Configured::default(),
        }
    }

    pub fn with_provider_data(family: CatalogFamily, data: Arc<GalaxyProviderData>) -> Self {
        Self {
            provider_data: Configured::with(data),
            ..Self::new(family)
        }
    }

    fn build_schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description(&format!(
                "Checks that Galaxy can reach the backend of a {} catalog",
                self.family
            ))
            .attribute(
                AttributeBuilder::new("catalog_id", AttributeType::String)
                    .description("Catalog to probe")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("validation_successful", AttributeType::Bool)
                    .description("Whether the probe succeeded")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("validation_message", AttributeType::String)
                    .description("Server explanation, if any")
                    .computed()
                    .build(),
            )
            .build()
    }
}

#[async_trait]
impl DataSource for CatalogValidationDataSource {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name.clone(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: self.build_schema(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: validate_config(&self.build_schema(), &request.config),
        }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let data = match self.provider_data.get() {
            Ok(data) => data,
            Err(diag) => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![diag],
                }
            }
        };

        let catalog_id = match PlanReader::new(&request.config).required_string("catalog_id") {
            Ok(id) => id,
            Err(e) => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![e.to_diagnostic("Invalid configuration")],
                }
            }
        };

        let mut diagnostics = vec![];
        let catalogs = data.client.catalogs();
        let probe = tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![GalaxyError::Cancelled
                        .to_diagnostic(format!("Failed to validate {} catalog", self.family))],
                };
            }
            probe = catalogs.validate(self.family, &catalog_id) => probe,
        };
        let (successful, message) = match probe {
            Ok(outcome) => (outcome.validation_successful, outcome.validation_message),
            Err(e) => {
                warn!(
                    family = %self.family,
                    catalog_id = %catalog_id,
                    error = %e,
                    "validation probe failed"
                );
                diagnostics.push(Diagnostic::warning(
                    "Catalog validation failed",
                    format!("{} catalog {}: {}", self.family, catalog_id, e),
                ));
                (false, Some(e.to_string()))
            }
        };

        ReadDataSourceResponse {
            state: StateBuilder::new()
                .string("catalog_id", Some(catalog_id.as_str()))
                .bool("validation_successful", Some(successful))
                .string("validation_message", message.as_deref())
                .build(),
            diagnostics,
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for CatalogValidationDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        self.provider_data.configure(&self.type_name, request)
    }
}
