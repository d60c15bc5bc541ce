//! Terraform provider for the Starburst Galaxy control plane
//!
//! [`GalaxyProvider`] reads its credentials, builds one shared
//! [`api::Client`] and hands it to every resource and data source as
//! [`GalaxyProviderData`].

pub mod api;
pub mod data_sources;
pub mod error;
pub mod logging;
pub mod provider_data;
pub mod resources;

pub use error::GalaxyError;
pub use provider_data::GalaxyProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::{DataSource, DataSourceWithConfigure};
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory, StopProviderRequest, StopProviderResponse,
    ValidateProviderConfigRequest, ValidateProviderConfigResponse,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue, ServerCapabilities};
use tracing::{debug, info};

use api::catalogs::CatalogFamily;
use data_sources::{
    CatalogValidationDataSource, EntityDataSource, EntityListDataSource, RoleGrantsDataSource,
};
use resources::{
    BigQueryCatalogAdapter, CassandraCatalogAdapter, ClusterAdapter, ColumnMaskAdapter,
    DataProductAdapter, EntityAdapter, GalaxyResource, GcsCatalogAdapter, JdbcCatalogAdapter,
    MongoDbCatalogAdapter, OpenSearchCatalogAdapter, PolicyAdapter, RecordAdapter, RoleAdapter,
    RoleGrantAdapter, RowFilterAdapter, S3CatalogAdapter, ServiceAccountAdapter,
    ServiceAccountPasswordAdapter, SnowflakeCatalogAdapter, SqlJobAdapter, TagAdapter,
};

/// Provider attribute, its environment fallback
const SETTINGS: [(&str, &str); 3] = [
    ("client_id", "GALAXY_CLIENT_ID"),
    ("client_secret", "GALAXY_CLIENT_SECRET"),
    ("domain", "GALAXY_DOMAIN"),
];

#[derive(Default)]
pub struct GalaxyProvider {
    provider_data: Option<Arc<GalaxyProviderData>>,
}

impl GalaxyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider_data(&self) -> Option<Arc<GalaxyProviderData>> {
        self.provider_data.clone()
    }

    /// Configured value, then the environment; empty strings count as unset
    fn setting(config: &DynamicValue, name: &str, env: &str) -> Option<String> {
        config
            .get_string(&AttributePath::new(name))
            .ok()
            .or_else(|| std::env::var(env).ok())
            .filter(|value| !value.is_empty())
    }
}

fn register_resource<A>(resources: &mut HashMap<String, ResourceFactory>, adapter: A)
where
    A: EntityAdapter + Clone,
{
    resources.insert(
        adapter.type_name(),
        Box::new(move || {
            Box::new(GalaxyResource::new(adapter.clone())) as Box<dyn ResourceWithConfigure>
        }),
    );
}

/// Singular and list data sources of one record kind
fn register_record_sources<A>(sources: &mut HashMap<String, DataSourceFactory>, adapter: A)
where
    A: RecordAdapter + Clone,
{
    let single = adapter.clone();
    sources.insert(
        adapter.type_name(),
        Box::new(move || {
            Box::new(EntityDataSource::new(single.clone())) as Box<dyn DataSourceWithConfigure>
        }),
    );
    let list = adapter.clone();
    sources.insert(
        adapter.list_type_name(),
        Box::new(move || {
            Box::new(EntityListDataSource::new(list.clone())) as Box<dyn DataSourceWithConfigure>
        }),
    );
}

#[async_trait]
impl Provider for GalaxyProvider {
    fn type_name(&self) -> &str {
        "galaxy"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
            server_capabilities: ServerCapabilities {
                plan_destroy: true,
                get_provider_schema_optional: true,
                move_resource_state: false,
            },
        }
    }

    async fn schema(&self, _ctx: Context, _request: ProviderSchemaRequest) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Starburst Galaxy provider")
            .attribute(
                AttributeBuilder::new("client_id", AttributeType::String)
                    .description("OAuth client ID. Falls back to GALAXY_CLIENT_ID")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("client_secret", AttributeType::String)
                    .description("OAuth client secret. Falls back to GALAXY_CLIENT_SECRET")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("domain", AttributeType::String)
                    .description(
                        "Galaxy account domain, e.g. acme.galaxy.starburst.io. Falls back to GALAXY_DOMAIN",
                    )
                    .optional()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        let mut diagnostics = vec![];
        if let Ok(domain) = request.config.get_string(&AttributePath::new("domain")) {
            if let Err(e) = api::client::origin_url(&domain) {
                diagnostics.push(
                    Diagnostic::error("Invalid domain", e.to_string())
                        .with_attribute(AttributePath::new("domain")),
                );
            }
        }
        ValidateProviderConfigResponse { diagnostics }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        logging::init();
        let mut diagnostics = vec![];
        let [client_id, client_secret, domain] = SETTINGS.map(|(name, env)| {
            let value = Self::setting(&request.config, name, env);
            if value.is_none() {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Missing {}", name),
                        format!("{} is required (set it in the provider block or {})", name, env),
                    )
                    .with_attribute(AttributePath::new(name)),
                );
            }
            value
        });

        let (Some(client_id), Some(client_secret), Some(domain)) = (client_id, client_secret, domain)
        else {
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        };

        match api::Client::new(&domain, &client_id, &client_secret) {
            Ok(client) => {
                info!(domain = %domain, "galaxy provider configured");
                let data = Arc::new(GalaxyProviderData::new(client));
                self.provider_data = Some(data.clone());
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: Some(data),
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create API client",
                    e.to_string(),
                ));
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        }
    }

    async fn stop(&self, _ctx: Context, _request: StopProviderRequest) -> StopProviderResponse {
        debug!("galaxy provider stopping");
        StopProviderResponse { error: None }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut resources = HashMap::new();
        register_resource(&mut resources, ClusterAdapter);
        register_resource(&mut resources, RoleAdapter);
        register_resource(&mut resources, RoleGrantAdapter);
        register_resource(&mut resources, ServiceAccountAdapter);
        register_resource(&mut resources, ServiceAccountPasswordAdapter);
        register_resource(&mut resources, ColumnMaskAdapter);
        register_resource(&mut resources, RowFilterAdapter);
        register_resource(&mut resources, PolicyAdapter);
        register_resource(&mut resources, TagAdapter);
        register_resource(&mut resources, DataProductAdapter);
        register_resource(&mut resources, SqlJobAdapter);

        register_resource(&mut resources, S3CatalogAdapter);
        register_resource(&mut resources, GcsCatalogAdapter);
        for family in JdbcCatalogAdapter::families() {
            register_resource(&mut resources, JdbcCatalogAdapter::new(family));
        }
        register_resource(&mut resources, MongoDbCatalogAdapter);
        register_resource(&mut resources, CassandraCatalogAdapter);
        register_resource(&mut resources, OpenSearchCatalogAdapter);
        register_resource(&mut resources, BigQueryCatalogAdapter);
        register_resource(&mut resources, SnowflakeCatalogAdapter);
        resources
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut sources: HashMap<String, DataSourceFactory> = HashMap::new();
        register_record_sources(&mut sources, ClusterAdapter);
        register_record_sources(&mut sources, RoleAdapter);
        register_record_sources(&mut sources, ServiceAccountAdapter);
        register_record_sources(&mut sources, ColumnMaskAdapter);
        register_record_sources(&mut sources, RowFilterAdapter);
        register_record_sources(&mut sources, PolicyAdapter);
        register_record_sources(&mut sources, TagAdapter);
        register_record_sources(&mut sources, DataProductAdapter);
        register_record_sources(&mut sources, SqlJobAdapter);

        register_record_sources(&mut sources, S3CatalogAdapter);
        register_record_sources(&mut sources, GcsCatalogAdapter);
        for family in JdbcCatalogAdapter::families() {
            register_record_sources(&mut sources, JdbcCatalogAdapter::new(family));
        }
        register_record_sources(&mut sources, MongoDbCatalogAdapter);
        register_record_sources(&mut sources, CassandraCatalogAdapter);
        register_record_sources(&mut sources, OpenSearchCatalogAdapter);
        register_record_sources(&mut sources, BigQueryCatalogAdapter);
        register_record_sources(&mut sources, SnowflakeCatalogAdapter);

        sources.insert(
            "galaxy_role_grants".to_string(),
            Box::new(|| Box::new(RoleGrantsDataSource::new()) as Box<dyn DataSourceWithConfigure>),
        );
        for family in CatalogFamily::ALL {
            let name = CatalogValidationDataSource::new(family).type_name().to_string();
            sources.insert(
                name,
                Box::new(move || {
                    Box::new(CatalogValidationDataSource::new(family))
                        as Box<dyn DataSourceWithConfigure>
                }),
            );
        }
        sources
    }
}
