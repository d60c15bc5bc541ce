//! `galaxy_role_grants`: the grant list of one role

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
use tfplug::plan::validate_config;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, Dynamic, DynamicValue};

use super::Configured;
use crate::error::GalaxyError;
use crate::provider_data::GalaxyProviderData;
use crate::resources::attributes::object_list;
use crate::resources::fold::{PlanReader, StateBuilder};

#[derive(Default)]
pub struct RoleGrantsDataSource {
    provider_data: Configured,
}

impl RoleGrantsDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider_data(data: Arc<GalaxyProviderData>) -> Self {
        Self {
            provider_data: Configured::with(data),
        }
    }

    fn build_schema() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Roles granted directly to a role")
            .attribute(
                AttributeBuilder::new("role_id", AttributeType::String)
                    .description("Role whose grants are listed")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "result",
                    object_list(&[
                        ("granted_role_id", AttributeType::String),
                        ("granted_role_name", AttributeType::String),
                        ("admin_option", AttributeType::Bool),
                    ]),
                )
                .description("Direct grants in server order")
                .computed()
                .build(),
            )
            .build()
    }
}

#[async_trait]
impl DataSource for RoleGrantsDataSource {
    fn type_name(&self) -> &str {
        "galaxy_role_grants"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::build_schema(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: validate_config(&Self::build_schema(), &request.config),
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

        let Some(role_id) = PlanReader::new(&request.config).string("role_id") else {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    "Missing role_id",
                    "role_id must be known to list its grants",
                )],
            };
        };

        let roles = data.client.roles();
        let grants = tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(GalaxyError::Cancelled),
            grants = roles.grants(&role_id) => grants.map_err(GalaxyError::from),
        };

        match grants {
            Ok(grants) => {
                let result = grants
                    .iter()
                    .map(|grant| {
                        StateBuilder::new()
                            .string("granted_role_id", Some(grant.role_id.as_str()))
                            .string("granted_role_name", Some(grant.role_name.as_str()))
                            .bool("admin_option", Some(grant.admin_option))
                            .build_object()
                    })
                    .collect::<Vec<_>>();
                let mut values = HashMap::new();
                values.insert("role_id".to_string(), Dynamic::String(role_id));
                values.insert("result".to_string(), Dynamic::List(result));
                ReadDataSourceResponse {
                    state: DynamicValue::new(Dynamic::Map(values)),
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    "Failed to list role grants",
                    format!("role {}: {}", role_id, e),
                )],
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for RoleGrantsDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        self.provider_data.configure("galaxy_role_grants", request)
    }
}
