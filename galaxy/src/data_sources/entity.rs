//! Singular `galaxy_<kind>` data sources

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
use tfplug::schema::{Attribute, AttributeBuilder, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, Dynamic, DynamicValue};
use tracing::debug;

use super::{project, Configured};
use crate::error::GalaxyError;
use crate::provider_data::GalaxyProviderData;
use crate::resources::fold::PlanReader;
use crate::resources::RecordAdapter;

/// Looks up one entity by identity
pub struct EntityDataSource<A> {
    adapter: A,
    type_name: String,
    provider_data: Configured,
}

impl<A: RecordAdapter> EntityDataSource<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            type_name: adapter.type_name(),
            adapter,
            provider_data: Configured::default(),
        }
    }

    pub fn with_provider_data(adapter: A, data: Arc<GalaxyProviderData>) -> Self {
        Self {
            provider_data: Configured::with(data),
            ..Self::new(adapter)
        }
    }

    /// Resource attributes without the write-only ones; identity is
    /// required, everything else computed
    fn attributes(&self) -> Vec<Attribute> {
        let id = self.adapter.id_attribute();
        let write_only = self.adapter.write_only();
        self.adapter
            .schema()
            .block
            .attributes
            .into_iter()
            .filter(|attribute| !write_only.contains(&attribute.name.as_str()))
            .map(|attribute| {
                let builder = AttributeBuilder::new(&attribute.name, attribute.r#type)
                    .description(&attribute.description);
                let builder = if attribute.name == id {
                    builder.required()
                } else {
                    builder.computed()
                };
                if attribute.sensitive {
                    builder.sensitive().build()
                } else {
                    builder.build()
                }
            })
            .collect()
    }

    fn build_schema(&self) -> Schema {
        self.attributes()
            .into_iter()
            .fold(
                SchemaBuilder::new()
                    .version(0)
                    .description(&format!("Looks up a {} by identifier", self.adapter.label())),
                |builder, attribute| builder.attribute(attribute),
            )
            .build()
    }

    async fn lookup(
        &self,
        data: &GalaxyProviderData,
        config: &DynamicValue,
    ) -> Result<DynamicValue, GalaxyError> {
        let id = PlanReader::new(config).required_string(self.adapter.id_attribute())?;
        debug!(type_name = %self.type_name, id = %id, "data source read");
        let record: A::Record = data.client.entities(self.adapter.kind()).get(&id).await?;
        let values = project(self.adapter.fold(record), &self.attributes());
        Ok(DynamicValue::new(Dynamic::Map(values)))
    }
}

#[async_trait]
impl<A: RecordAdapter> DataSource for EntityDataSource<A> {
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

        let result = tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(GalaxyError::Cancelled),
            result = self.lookup(data, &request.config) => result,
        };

        match result {
            Ok(state) => ReadDataSourceResponse {
                state,
                diagnostics: vec![],
            },
            Err(e) => {
                let id = PlanReader::new(&request.config)
                    .string(self.adapter.id_attribute())
                    .unwrap_or_default();
                let detail = if e.is_not_found() {
                    format!("{} {} does not exist", self.adapter.label(), id)
                } else {
                    format!("{} {}: {}", self.adapter.label(), id, e)
                };
                ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![Diagnostic::error(
                        format!("Failed to read {}", self.adapter.label()),
                        detail,
                    )],
                }
            }
        }
    }
}

#[async_trait]
impl<A: RecordAdapter> DataSourceWithConfigure for EntityDataSource<A> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        self.provider_data.configure(&self.type_name, request)
    }
}
