//! Kind-generic CRUD over the Galaxy REST collections

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::catalogs::CatalogFamily;
use super::client::{decode, Client};
use super::common::entity_path;
use super::error::ApiError;

/// Closed set of entity families the provider manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Cluster,
    Catalog(CatalogFamily),
    Role,
    ServiceAccount,
    ColumnMask,
    RowFilter,
    Policy,
    Tag,
    DataProduct,
    SqlJob,
}

impl EntityKind {
    /// Collection path relative to the API prefix
    pub fn collection_path(&self) -> String {
        match self {
            EntityKind::Cluster => "cluster".to_string(),
            EntityKind::Catalog(family) => format!("catalog/{}", family.as_str()),
            EntityKind::Role => "role".to_string(),
            EntityKind::ServiceAccount => "serviceAccount".to_string(),
            EntityKind::ColumnMask => "columnMask".to_string(),
            EntityKind::RowFilter => "rowFilter".to_string(),
            EntityKind::Policy => "policy".to_string(),
            EntityKind::Tag => "tag".to_string(),
            EntityKind::DataProduct => "dataProduct".to_string(),
            EntityKind::SqlJob => "sqlJob".to_string(),
        }
    }

    /// JSON field carrying the server-assigned identity
    pub fn id_field(&self) -> &'static str {
        match self {
            EntityKind::Cluster => "clusterId",
            EntityKind::Catalog(_) => "catalogId",
            EntityKind::Role => "roleId",
            EntityKind::ServiceAccount => "serviceAccountId",
            EntityKind::ColumnMask => "columnMaskId",
            EntityKind::RowFilter => "rowFilterId",
            EntityKind::Policy => "policyId",
            EntityKind::Tag => "tagId",
            EntityKind::DataProduct => "dataProductId",
            EntityKind::SqlJob => "sqlJobId",
        }
    }

    /// Human-readable name used in diagnostics
    pub fn label(&self) -> String {
        match self {
            EntityKind::Cluster => "cluster".to_string(),
            EntityKind::Catalog(family) => format!("{} catalog", family.as_str()),
            EntityKind::Role => "role".to_string(),
            EntityKind::ServiceAccount => "service account".to_string(),
            EntityKind::ColumnMask => "column mask".to_string(),
            EntityKind::RowFilter => "row filter".to_string(),
            EntityKind::Policy => "policy".to_string(),
            EntityKind::Tag => "tag".to_string(),
            EntityKind::DataProduct => "data product".to_string(),
            EntityKind::SqlJob => "SQL job".to_string(),
        }
    }

    /// Pulls the identity out of a raw response body
    pub fn id_of(&self, value: &Value) -> Option<String> {
        match value.get(self.id_field())? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// CRUD operations for one entity kind
pub struct EntityApi<'a> {
    client: &'a Client,
    kind: EntityKind,
}

impl<'a> EntityApi<'a> {
    pub(crate) fn new(client: &'a Client, kind: EntityKind) -> Self {
        Self { client, kind }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    fn instance_path(&self, id: &str) -> String {
        entity_path(&self.kind.collection_path(), id)
    }

    /// POST the payload and hand back the untyped response.
    ///
    /// Callers extract the identity before decoding so that a committed
    /// create is never lost to a decoding failure.
    pub async fn create_raw<B: Serialize>(&self, body: &B) -> Result<Value, ApiError> {
        let path = self.kind.collection_path();
        let body = serde_json::to_value(body).map_err(|e| ApiError::Mapping {
            method: "encode".to_string(),
            path: path.clone(),
            message: e.to_string(),
        })?;
        debug!(kind = %self.kind, "creating entity");
        self.client.send(Method::POST, &path, Some(body)).await
    }

    pub async fn create<T: DeserializeOwned, B: Serialize>(&self, body: &B) -> Result<T, ApiError> {
        let value = self.create_raw(body).await?;
        decode(&Method::POST, &self.kind.collection_path(), value)
    }

    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> Result<T, ApiError> {
        self.client.get(&self.instance_path(id)).await
    }

    /// PATCH and return the untyped response, which may be empty
    pub async fn update_raw<B: Serialize>(&self, id: &str, body: &B) -> Result<Value, ApiError> {
        let path = self.instance_path(id);
        let body = serde_json::to_value(body).map_err(|e| ApiError::Mapping {
            method: "encode".to_string(),
            path: path.clone(),
            message: e.to_string(),
        })?;
        debug!(kind = %self.kind, id, "updating entity");
        self.client.send(Method::PATCH, &path, Some(body)).await
    }

    pub async fn update<T: DeserializeOwned, B: Serialize>(
        &self,
        id: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = self.update_raw(id, body).await?;
        decode(&Method::PATCH, &self.instance_path(id), value)
    }

    /// Deleting something that is already gone succeeds
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        debug!(kind = %self.kind, id, "deleting entity");
        match self.client.delete(&self.instance_path(id)).await {
            Err(e) if e.is_not_found() => {
                debug!(kind = %self.kind, id, "entity already gone");
                Ok(())
            }
            other => other,
        }
    }

    pub async fn list<T: DeserializeOwned>(&self) -> Result<Vec<T>, ApiError> {
        self.client
            .get_paginated(&self.kind.collection_path())
            .await
    }
}
