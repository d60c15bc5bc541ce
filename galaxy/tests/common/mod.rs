//! Shared fixtures: a mock Galaxy server and resources wired to it the way
//! the host wires them.

#![allow(clippy::disallowed_methods)]
#![allow(dead_code)]

use mockito::{Mock, ServerGuard};
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::{ConfigureDataSourceRequest, DataSourceWithConfigure};
use tfplug::provider::{ConfigureProviderRequest, Provider};
use tfplug::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest, ReadResourceRequest,
    ResourceWithConfigure, UpdateResourceRequest,
};
use tfplug::types::{AttributePath, ClientCapabilities, Dynamic, DynamicValue};

use galaxy::GalaxyProvider;

pub async fn token_mock(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", "/oauth/v2/token")
        .with_body(r#"{"access_token":"tok","token_type":"Bearer","expires_in":3600}"#)
        .create_async()
        .await
}

/// Provider configured against the mock server, plus its provider data
pub async fn configured_provider(
    server: &ServerGuard,
) -> (GalaxyProvider, Arc<dyn std::any::Any + Send + Sync>) {
    let mut config = DynamicValue::object();
    config
        .set_string(&AttributePath::new("client_id"), "id".to_string())
        .unwrap();
    config
        .set_string(&AttributePath::new("client_secret"), "secret".to_string())
        .unwrap();
    config
        .set_string(&AttributePath::new("domain"), server.url())
        .unwrap();

    let mut provider = GalaxyProvider::new();
    let response = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: "1.9.0".to_string(),
                config,
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let data = response.provider_data.unwrap();
    (provider, data)
}

pub async fn resource(server: &ServerGuard, type_name: &str) -> Box<dyn ResourceWithConfigure> {
    let (provider, data) = configured_provider(server).await;
    let factories = provider.resources();
    let mut resource = factories.get(type_name).unwrap()();
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(data),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    resource
}

pub async fn data_source(
    server: &ServerGuard,
    type_name: &str,
) -> Box<dyn DataSourceWithConfigure> {
    let (provider, data) = configured_provider(server).await;
    let factories = provider.data_sources();
    let mut source = factories.get(type_name).unwrap()();
    let response = source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: Some(data),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    source
}

/// Object value from attribute/value pairs; unlisted attributes are absent
pub fn state(pairs: &[(&str, Dynamic)]) -> DynamicValue {
    let mut value = DynamicValue::object();
    for (name, v) in pairs {
        value.set(&AttributePath::new(name), v.clone()).unwrap();
    }
    value
}

pub fn s(value: &str) -> Dynamic {
    Dynamic::String(value.to_string())
}

pub fn n(value: f64) -> Dynamic {
    Dynamic::Number(value)
}

pub fn create_request(type_name: &str, planned: DynamicValue) -> CreateResourceRequest {
    CreateResourceRequest {
        type_name: type_name.to_string(),
        config: planned.clone(),
        planned_state: planned,
        planned_private: vec![],
    }
}

pub fn read_request(type_name: &str, current: DynamicValue) -> ReadResourceRequest {
    ReadResourceRequest {
        type_name: type_name.to_string(),
        current_state: current,
        private: vec![],
        client_capabilities: ClientCapabilities::default(),
    }
}

pub fn update_request(
    type_name: &str,
    prior: DynamicValue,
    planned: DynamicValue,
) -> UpdateResourceRequest {
    UpdateResourceRequest {
        type_name: type_name.to_string(),
        config: planned.clone(),
        prior_state: prior,
        planned_state: planned,
        planned_private: vec![],
    }
}

pub fn delete_request(type_name: &str, prior: DynamicValue) -> DeleteResourceRequest {
    DeleteResourceRequest {
        type_name: type_name.to_string(),
        prior_state: prior,
        planned_private: vec![],
    }
}

pub fn string_at(state: &DynamicValue, name: &str) -> String {
    state.get_string(&AttributePath::new(name)).unwrap()
}
