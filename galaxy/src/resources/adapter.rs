//! Adapter contracts between the lifecycle wrapper and each entity
//!
//! [`EntityAdapter`] is what [`GalaxyResource`](super::GalaxyResource)
//! drives. Most entities are plain REST records and only implement
//! [`RecordAdapter`]: a payload builder and a fold. The blanket impl below
//! supplies their CRUD. Sub-resources that do not map onto one collection
//! (role grants, service account passwords) implement `EntityAdapter`
//! directly.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tfplug::schema::Schema;
use tfplug::types::{Diagnostic, DynamicValue};
use tracing::debug;

use super::fold::PlanReader;
use crate::api::client::decode;
use crate::api::{ApiError, EntityKind};
use crate::error::GalaxyError;
use crate::provider_data::GalaxyProviderData;

/// Static description of a managed entity
pub trait EntityDescriptor: Send + Sync + 'static {
    /// External type name, `galaxy_<kind>`
    fn type_name(&self) -> String;

    fn schema(&self) -> Schema;

    /// Attribute holding the server-assigned identity
    fn id_attribute(&self) -> &'static str;

    /// Attributes the server returns at most once; state keeps the last
    /// known value
    fn write_only(&self) -> &'static [&'static str] {
        &[]
    }

    /// Attributes an import ID is split across, in `a/b` order
    fn import_attributes(&self) -> Vec<&'static str> {
        vec![self.id_attribute()]
    }

    /// Cross-attribute checks that per-attribute validators cannot express
    fn validate(&self, _config: &DynamicValue) -> Vec<Diagnostic> {
        vec![]
    }

    /// Name used in diagnostics, e.g. `role grant`
    fn label(&self) -> String {
        let type_name = self.type_name();
        type_name
            .strip_prefix("galaxy_")
            .unwrap_or(&type_name)
            .replace('_', " ")
    }
}

#[async_trait]
pub trait EntityAdapter: EntityDescriptor {
    async fn create(
        &self,
        data: &GalaxyProviderData,
        plan: &DynamicValue,
    ) -> Result<DynamicValue, GalaxyError>;

    async fn read(
        &self,
        data: &GalaxyProviderData,
        state: &DynamicValue,
    ) -> Result<DynamicValue, GalaxyError>;

    async fn update(
        &self,
        data: &GalaxyProviderData,
        plan: &DynamicValue,
        prior: &DynamicValue,
    ) -> Result<DynamicValue, GalaxyError>;

    async fn delete(
        &self,
        data: &GalaxyProviderData,
        state: &DynamicValue,
    ) -> Result<(), GalaxyError>;
}

/// An entity that is one typed record in one REST collection
pub trait RecordAdapter: EntityDescriptor {
    type Record: Serialize + DeserializeOwned + Send + Sync + 'static;

    fn kind(&self) -> EntityKind;

    /// Type name of the matching list data source, e.g. `galaxy_clusters`
    fn list_type_name(&self) -> String;

    /// Request body for create
    fn payload(&self, plan: &DynamicValue) -> Result<Self::Record, GalaxyError>;

    /// Request body for update; defaults to the create body
    fn update_payload(
        &self,
        plan: &DynamicValue,
        _prior: &DynamicValue,
    ) -> Result<Self::Record, GalaxyError> {
        self.payload(plan)
    }

    /// Response record to state
    fn fold(&self, record: Self::Record) -> DynamicValue;
}

#[async_trait]
impl<T: RecordAdapter> EntityAdapter for T {
    async fn create(
        &self,
        data: &GalaxyProviderData,
        plan: &DynamicValue,
    ) -> Result<DynamicValue, GalaxyError> {
        let kind = self.kind();
        let body = self.payload(plan)?;
        let raw = data.client.entities(kind).create_raw(&body).await?;

        let id = kind.id_of(&raw).ok_or_else(|| ApiError::Mapping {
            method: "POST".to_string(),
            path: kind.collection_path(),
            message: format!("response has no {}", kind.id_field()),
        })?;
        debug!(kind = %kind, id = %id, "entity created");

        let record = decode::<T::Record>(&Method::POST, &kind.collection_path(), raw)
            .map_err(|source| GalaxyError::Committed { id, source })?;
        Ok(self.fold(record))
    }

    async fn read(
        &self,
        data: &GalaxyProviderData,
        state: &DynamicValue,
    ) -> Result<DynamicValue, GalaxyError> {
        let id = PlanReader::new(state).required_string(self.id_attribute())?;
        let record: T::Record = data.client.entities(self.kind()).get(&id).await?;
        Ok(self.fold(record))
    }

    async fn update(
        &self,
        data: &GalaxyProviderData,
        plan: &DynamicValue,
        prior: &DynamicValue,
    ) -> Result<DynamicValue, GalaxyError> {
        let kind = self.kind();
        let id = PlanReader::new(prior).required_string(self.id_attribute())?;
        let body = self.update_payload(plan, prior)?;
        let api = data.client.entities(kind);

        let raw = api.update_raw(&id, &body).await?;
        // some endpoints answer an update with an empty body
        let record: T::Record = if kind.id_of(&raw).is_some() {
            decode(&Method::PATCH, &kind.collection_path(), raw)?
        } else {
            api.get(&id).await?
        };
        Ok(self.fold(record))
    }

    async fn delete(
        &self,
        data: &GalaxyProviderData,
        state: &DynamicValue,
    ) -> Result<(), GalaxyError> {
        let id = PlanReader::new(state).required_string(self.id_attribute())?;
        data.client.entities(self.kind()).delete(&id).await?;
        Ok(())
    }
}
