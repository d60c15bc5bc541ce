//! Host-facing resource wrapper shared by every adapter

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::plan::validate_config;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::{import_state_compound_id, import_state_passthrough_id};
use tracing::{debug, warn};

use super::adapter::EntityAdapter;
use super::fold::PlanReader;
use crate::error::GalaxyError;
use crate::provider_data::GalaxyProviderData;

/// Where write-only attributes are taken from after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOnly {
    /// Create: the response may carry the one-time value
    FromResponse,
    /// Read and update: the configured value, else prior state
    FromState,
}

fn is_missing(value: Option<&Dynamic>) -> bool {
    value.map_or(true, |v| !v.is_known() || v.is_null())
}

/// Runs an [`EntityAdapter`] under the host's resource protocol.
///
/// The wrapper owns everything that is the same for all entities:
/// provider data, cancellation, not-found handling, write-only
/// preservation and making sure no attribute is left unknown after apply.
pub struct GalaxyResource<A> {
    adapter: A,
    type_name: String,
    provider_data: Option<Arc<GalaxyProviderData>>,
}

impl<A: EntityAdapter> GalaxyResource<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            type_name: adapter.type_name(),
            adapter,
            provider_data: None,
        }
    }

    /// Pre-configured instance, bypassing `configure`
    pub fn with_provider_data(adapter: A, data: Arc<GalaxyProviderData>) -> Self {
        let mut resource = Self::new(adapter);
        resource.provider_data = Some(data);
        resource
    }

    fn provider_data(&self) -> Result<&GalaxyProviderData, Diagnostic> {
        self.provider_data.as_deref().ok_or_else(|| {
            Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            )
        })
    }

    fn identity(&self, state: &DynamicValue) -> String {
        PlanReader::new(state)
            .string(self.adapter.id_attribute())
            .unwrap_or_else(|| "<unknown>".to_string())
    }

    fn failure(&self, operation: &str, id: Option<&str>, error: &GalaxyError) -> Diagnostic {
        let summary = format!("Failed to {} {}", operation, self.adapter.label());
        match id {
            Some(id) => Diagnostic::error(
                summary,
                format!("{} {}: {}", self.adapter.label(), id, error),
            ),
            None => error.to_diagnostic(summary),
        }
    }

    /// Races an adapter call against host cancellation
    async fn run<T, F>(&self, ctx: &Context, operation: F) -> Result<T, GalaxyError>
    where
        F: Future<Output = Result<T, GalaxyError>> + Send,
    {
        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(GalaxyError::Cancelled),
            result = operation => result,
        }
    }

    /// Post-apply cleanup of a folded state.
    ///
    /// A missing identity is taken from the first source that knows it.
    /// Write-only attributes come from the response only on create; after
    /// that the server is never trusted with them and the sources win, even
    /// when the server echoes a value. Anything still unknown becomes null.
    fn finalize(
        &self,
        state: DynamicValue,
        sources: &[&DynamicValue],
        write_only: WriteOnly,
    ) -> DynamicValue {
        let mut values = match state.value {
            Dynamic::Map(values) => values,
            _ => Default::default(),
        };

        let known = |name: &str| {
            let path = AttributePath::new(name);
            sources
                .iter()
                .filter_map(|source| source.get(&path))
                .find(|v| v.is_known() && !v.is_null())
                .cloned()
        };

        for &name in self.adapter.write_only() {
            match write_only {
                WriteOnly::FromResponse if !is_missing(values.get(name)) => {}
                WriteOnly::FromResponse => {
                    if let Some(value) = known(name) {
                        values.insert(name.to_string(), value);
                    }
                }
                WriteOnly::FromState => {
                    values.insert(name.to_string(), known(name).unwrap_or(Dynamic::Null));
                }
            }
        }

        let id = self.adapter.id_attribute();
        if is_missing(values.get(id)) {
            if let Some(value) = known(id) {
                values.insert(id.to_string(), value);
            }
        }

        for attribute in &self.adapter.schema().block.attributes {
            let slot = values
                .entry(attribute.name.clone())
                .or_insert(Dynamic::Null);
            if slot.is_unknown() {
                *slot = Dynamic::Null;
            }
        }

        DynamicValue::new(Dynamic::Map(values))
    }
}

#[async_trait]
impl<A: EntityAdapter> Resource for GalaxyResource<A> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name.clone(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: self.adapter.schema(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = validate_config(&self.adapter.schema(), &request.config);
        diagnostics.extend(self.adapter.validate(&request.config));
        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    private: vec![],
                    diagnostics: vec![diag],
                }
            }
        };

        debug!(type_name = %self.type_name, "create");
        match self
            .run(&ctx, self.adapter.create(data, &request.planned_state))
            .await
        {
            Ok(state) => CreateResourceResponse {
                new_state: self.finalize(
                    state,
                    &[&request.planned_state],
                    WriteOnly::FromResponse,
                ),
                private: vec![],
                diagnostics: vec![],
            },
            Err(GalaxyError::Committed { id, source }) => {
                warn!(type_name = %self.type_name, id = %id, "created but response unreadable");
                let mut diagnostics = vec![];
                let mut state = request.planned_state.clone();
                if let Err(e) =
                    state.set_string(&AttributePath::new(self.adapter.id_attribute()), id.clone())
                {
                    tracing::error!(type_name = %self.type_name, id = %id, error = %e, "could not record committed id");
                    diagnostics.push(Diagnostic::error(
                        format!("Failed to record {} id", self.adapter.label()),
                        format!(
                            "{} {} exists remotely but its id could not be stored: {}; import it with this id",
                            self.adapter.label(),
                            id,
                            e
                        ),
                    ));
                }
                let error = GalaxyError::Committed {
                    id: id.clone(),
                    source,
                };
                diagnostics.insert(0, self.failure("create", Some(id.as_str()), &error));
                CreateResourceResponse {
                    new_state: self.finalize(
                        state,
                        &[&request.planned_state],
                        WriteOnly::FromResponse,
                    ),
                    private: vec![],
                    diagnostics,
                }
            }
            Err(e) => CreateResourceResponse {
                new_state: DynamicValue::null(),
                private: vec![],
                diagnostics: vec![self.failure("create", None, &e)],
            },
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![diag],
                    private: request.private,
                }
            }
        };

        let id = self.identity(&request.current_state);
        debug!(type_name = %self.type_name, id = %id, "read");
        match self
            .run(&ctx, self.adapter.read(data, &request.current_state))
            .await
        {
            Ok(state) => ReadResourceResponse {
                new_state: Some(self.finalize(
                    state,
                    &[&request.current_state],
                    WriteOnly::FromState,
                )),
                diagnostics: vec![],
                private: request.private,
            },
            Err(e) if e.is_not_found() => {
                debug!(type_name = %self.type_name, id = %id, "gone remotely, dropping from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                    private: request.private,
                }
            }
            Err(e) => ReadResourceResponse {
                diagnostics: vec![self.failure("read", Some(id.as_str()), &e)],
                new_state: Some(request.current_state),
                private: request.private,
            },
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    private: vec![],
                    diagnostics: vec![diag],
                }
            }
        };

        let id = self.identity(&request.prior_state);
        debug!(type_name = %self.type_name, id = %id, "update");
        match self
            .run(
                &ctx,
                self.adapter
                    .update(data, &request.planned_state, &request.prior_state),
            )
            .await
        {
            Ok(state) => UpdateResourceResponse {
                new_state: self.finalize(
                    state,
                    &[&request.planned_state, &request.prior_state],
                    WriteOnly::FromState,
                ),
                private: vec![],
                diagnostics: vec![],
            },
            Err(e) if e.is_not_found() => UpdateResourceResponse {
                diagnostics: vec![Diagnostic::error(
                    format!("Failed to update {}", self.adapter.label()),
                    format!(
                        "{} {} no longer exists; it was deleted outside of Terraform",
                        self.adapter.label(),
                        id
                    ),
                )],
                new_state: request.prior_state,
                private: vec![],
            },
            Err(e) => UpdateResourceResponse {
                diagnostics: vec![self.failure("update", Some(id.as_str()), &e)],
                new_state: request.prior_state,
                private: vec![],
            },
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return DeleteResourceResponse {
                    diagnostics: vec![diag],
                }
            }
        };

        let id = self.identity(&request.prior_state);
        debug!(type_name = %self.type_name, id = %id, "delete");
        match self
            .run(&ctx, self.adapter.delete(data, &request.prior_state))
            .await
        {
            Ok(()) => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(e) if e.is_not_found() => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(e) => DeleteResourceResponse {
                diagnostics: vec![self.failure("delete", Some(id.as_str()), &e)],
            },
        }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

#[async_trait]
impl<A: EntityAdapter> ResourceWithConfigure for GalaxyResource<A> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        match request.provider_data {
            Some(data) => match data.downcast::<GalaxyProviderData>() {
                Ok(provider_data) => self.provider_data = Some(provider_data),
                Err(_) => {
                    tracing::error!(type_name = %self.type_name, "provider data has the wrong type");
                    diagnostics.push(Diagnostic::error(
                        "Invalid provider data",
                        "Failed to extract GalaxyProviderData from provider data",
                    ));
                }
            },
            None => diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            )),
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl<A: EntityAdapter> ResourceWithImportState for GalaxyResource<A> {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };

        match self.adapter.import_attributes().as_slice() {
            [single] => import_state_passthrough_id(
                &ctx,
                AttributePath::new(single),
                &request,
                &mut response,
            ),
            attrs => {
                import_state_compound_id(&ctx, attrs, &request, &mut response);
            }
        }

        response
    }
}
