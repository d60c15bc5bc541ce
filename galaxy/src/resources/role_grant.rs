//! `galaxy_role_grant`
//!
//! A grant is one element of the parent role's `directlyGrantedRoles` list.
//! Only the element this resource declares is managed; grants made by other
//! configurations or by hand are left alone. Every mutation of a parent's
//! list holds that parent's lock from the read to the write.

use async_trait::async_trait;
use tfplug::defaults::StaticDefault;
use tfplug::plan_modifier::{RequiresReplace, UseStateForUnknown};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::DynamicValue;
use tracing::debug;

use super::adapter::{EntityAdapter, EntityDescriptor};
use super::fold::{PlanReader, StateBuilder};
use crate::api::common::entity_path;
use crate::api::roles::RoleGrant;
use crate::api::ApiError;
use crate::error::GalaxyError;
use crate::provider_data::GalaxyProviderData;

#[derive(Debug, Clone, Copy, Default)]
pub struct RoleGrantAdapter;

/// State id of a grant, also its import id
pub fn grant_id(role_id: &str, granted_role_id: &str) -> String {
    format!("{}/{}", role_id, granted_role_id)
}

fn fold(role_id: &str, grant: &RoleGrant) -> DynamicValue {
    StateBuilder::new()
        .string("id", Some(grant_id(role_id, &grant.role_id).as_str()))
        .string("role_id", Some(role_id))
        .string("granted_role_id", Some(grant.role_id.as_str()))
        .bool("admin_option", Some(grant.admin_option))
        .string("granted_role_name", Some(grant.role_name.as_str()))
        .build()
}

fn grant_not_found(role_id: &str) -> GalaxyError {
    GalaxyError::Api(ApiError::NotFound {
        method: "GET".to_string(),
        path: entity_path("role", role_id),
    })
}

impl EntityDescriptor for RoleGrantAdapter {
    fn type_name(&self) -> String {
        "galaxy_role_grant".to_string()
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description(
                "Grants one role to another. Other grants on the parent role are not touched",
            )
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("role_id/granted_role_id")
                    .computed()
                    .plan_modifier(UseStateForUnknown::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("role_id", AttributeType::String)
                    .description("Role receiving the grant")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("granted_role_id", AttributeType::String)
                    .description("Role being granted")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("admin_option", AttributeType::Bool)
                    .description("Whether the grantee may grant the role onwards")
                    .optional_computed()
                    .default(StaticDefault::bool(false))
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("granted_role_name", AttributeType::String)
                    .description("Name of the granted role")
                    .computed()
                    .plan_modifier(UseStateForUnknown::create())
                    .build(),
            )
            .build()
    }

    fn id_attribute(&self) -> &'static str {
        "id"
    }

    fn import_attributes(&self) -> Vec<&'static str> {
        vec!["role_id", "granted_role_id"]
    }
}

#[async_trait]
impl EntityAdapter for RoleGrantAdapter {
    async fn create(
        &self,
        data: &GalaxyProviderData,
        plan: &DynamicValue,
    ) -> Result<DynamicValue, GalaxyError> {
        let reader = PlanReader::new(plan);
        let role_id = reader.required_string("role_id")?;
        let granted_role_id = reader.required_string("granted_role_id")?;
        let admin_option = reader.bool("admin_option").unwrap_or(false);
        let roles = data.client.roles();

        let _guard = data.lock_role_grants(&role_id).await;

        let mut grants = roles.grants(&role_id).await?;
        if grants.iter().any(|g| g.role_id == granted_role_id) {
            return Err(GalaxyError::Conflict(format!(
                "role {} is already granted to role {}; import it with id {}",
                granted_role_id,
                role_id,
                grant_id(&role_id, &granted_role_id)
            )));
        }

        let role_name = roles.role_name(&granted_role_id).await?;
        grants.push(RoleGrant {
            role_id: granted_role_id.clone(),
            role_name,
            admin_option,
        });
        roles.set_grants(&role_id, &grants).await?;
        debug!(role_id = %role_id, granted_role_id = %granted_role_id, "grant added");

        // the list is written; from here on state must keep the grant
        let committed = |source: ApiError| GalaxyError::Committed {
            id: grant_id(&role_id, &granted_role_id),
            source,
        };
        let written = roles.grants(&role_id).await.map_err(committed)?;
        let grant = written
            .iter()
            .find(|g| g.role_id == granted_role_id)
            .ok_or_else(|| {
                committed(ApiError::Mapping {
                    method: "PATCH".to_string(),
                    path: entity_path("role", &role_id),
                    message: format!("grant of {} missing after update", granted_role_id),
                })
            })?;
        Ok(fold(&role_id, grant))
    }

    async fn read(
        &self,
        data: &GalaxyProviderData,
        state: &DynamicValue,
    ) -> Result<DynamicValue, GalaxyError> {
        let reader = PlanReader::new(state);
        let role_id = reader.required_string("role_id")?;
        let granted_role_id = reader.required_string("granted_role_id")?;

        let grants = data.client.roles().grants(&role_id).await?;
        grants
            .iter()
            .find(|g| g.role_id == granted_role_id)
            .map(|grant| fold(&role_id, grant))
            .ok_or_else(|| grant_not_found(&role_id))
    }

    async fn update(
        &self,
        _data: &GalaxyProviderData,
        _plan: &DynamicValue,
        _prior: &DynamicValue,
    ) -> Result<DynamicValue, GalaxyError> {
        Err(GalaxyError::Configuration(
            "role grants cannot be changed in place; every attribute forces replacement"
                .to_string(),
        ))
    }

    async fn delete(
        &self,
        data: &GalaxyProviderData,
        state: &DynamicValue,
    ) -> Result<(), GalaxyError> {
        let reader = PlanReader::new(state);
        let role_id = reader.required_string("role_id")?;
        let granted_role_id = reader.required_string("granted_role_id")?;
        let roles = data.client.roles();

        let _guard = data.lock_role_grants(&role_id).await;

        let grants = roles.grants(&role_id).await?;
        let remaining: Vec<RoleGrant> = grants
            .iter()
            .filter(|g| g.role_id != granted_role_id)
            .cloned()
            .collect();
        if remaining.len() == grants.len() {
            debug!(role_id = %role_id, granted_role_id = %granted_role_id, "grant already absent");
            return Ok(());
        }

        roles.set_grants(&role_id, &remaining).await?;
        debug!(role_id = %role_id, granted_role_id = %granted_role_id, "grant removed");
        Ok(())
    }
}
