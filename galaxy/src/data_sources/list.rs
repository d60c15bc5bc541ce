//! `galaxy_<kinds>` list data sources

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, Dynamic, DynamicValue};
use tracing::debug;

use super::{project, Configured};
use crate::error::GalaxyError;
use crate::provider_data::GalaxyProviderData;
use crate::resources::RecordAdapter;

/// Every entity of one kind, all pages collected
pub struct EntityListDataSource<A> {
    adapter: A,
    type_name: String,
    provider_data: Configured,
}

impl<A: RecordAdapter> EntityListDataSource<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            type_name: adapter.list_type_name(),
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

    fn element_attributes(&self) -> Vec<Attribute> {
        let write_only = self.adapter.write_only();
        self.adapter
            .schema()
            .block
            .attributes
            .into_iter()
            .filter(|attribute| !write_only.contains(&attribute.name.as_str()))
            .collect()
    }

    fn build_schema(&self) -> Schema {
        let element = self
            .element_attributes()
            .into_iter()
            .map(|attribute| (attribute.name, attribute.r#type))
            .collect::<HashMap<_, _>>();

        SchemaBuilder::new()
            .version(0)
            .description(&format!("Lists every {}", self.adapter.label()))
            .attribute(
                AttributeBuilder::new(
                    "result",
                    AttributeType::List(Box::new(AttributeType::Object(element))),
                )
                .description("Entities in server order")
                .computed()
                .build(),
            )
            .build()
    }

    async fn collect(&self, data: &GalaxyProviderData) -> Result<Vec<Dynamic>, GalaxyError> {
        let records: Vec<A::Record> = data.client.entities(self.adapter.kind()).list().await?;
        debug!(type_name = %self.type_name, count = records.len(), "listed");
        let attributes = self.element_attributes();
        Ok(records
            .into_iter()
            .map(|record| Dynamic::Map(project(self.adapter.fold(record), &attributes)))
            .collect())
    }
}

#[async_trait]
impl<A: RecordAdapter> DataSource for EntityListDataSource<A> {
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
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn read(&self, ctx: Context, _request: ReadDataSourceRequest) -> ReadDataSourceResponse {
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
            result = self.collect(data) => result,
        };

        match result {
            Ok(items) => {
                let mut values = HashMap::new();
                values.insert("result".to_string(), Dynamic::List(items));
                ReadDataSourceResponse {
                    state: DynamicValue::new(Dynamic::Map(values)),
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    format!("Failed to list {}", self.adapter.label()),
                    e.to_string(),
                )],
            },
        }
    }
}

#[async_trait]
impl<A: RecordAdapter> DataSourceWithConfigure for EntityListDataSource<A> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        self.provider_data.configure(&self.type_name, request)
    }
}
