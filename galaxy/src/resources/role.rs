//! `galaxy_role`

use tfplug::plan_modifier::RequiresReplace;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::DynamicValue;
use tfplug::validator::StringLengthValidator;

use super::adapter::{EntityDescriptor, RecordAdapter};
use super::attributes::identity;
use super::fold::{PlanReader, StateBuilder};
use crate::api::roles::Role;
use crate::api::EntityKind;
use crate::error::GalaxyError;

#[derive(Debug, Clone, Copy, Default)]
pub struct RoleAdapter;

impl EntityDescriptor for RoleAdapter {
    fn type_name(&self) -> String {
        "galaxy_role".to_string()
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a Galaxy role")
            .attribute(identity("role_id", "Server-assigned role identifier"))
            .attribute(
                AttributeBuilder::new("role_name", AttributeType::String)
                    .description("Role name")
                    .required()
                    .validator(StringLengthValidator::create(Some(1), Some(255)))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("Role description")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("grant_to_creating_role", AttributeType::Bool)
                    .description("Grant the new role to the role that creates it. Only used at creation")
                    .optional()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("owner_role_id", AttributeType::String)
                    .description("Role that owns this role")
                    .computed()
                    .build(),
            )
            .build()
    }

    fn id_attribute(&self) -> &'static str {
        "role_id"
    }

    fn write_only(&self) -> &'static [&'static str] {
        &["grant_to_creating_role"]
    }
}

impl RecordAdapter for RoleAdapter {
    type Record = Role;

    fn kind(&self) -> EntityKind {
        EntityKind::Role
    }

    fn list_type_name(&self) -> String {
        "galaxy_roles".to_string()
    }

    fn payload(&self, plan: &DynamicValue) -> Result<Role, GalaxyError> {
        let plan = PlanReader::new(plan);
        Ok(Role {
            role_id: None,
            role_name: Some(plan.required_string("role_name")?),
            description: plan.string("description"),
            grant_to_creating_role: plan.bool("grant_to_creating_role"),
            owner_role_id: None,
        })
    }

    fn update_payload(&self, plan: &DynamicValue, _prior: &DynamicValue) -> Result<Role, GalaxyError> {
        Ok(Role {
            grant_to_creating_role: None,
            ..self.payload(plan)?
        })
    }

    fn fold(&self, role: Role) -> DynamicValue {
        StateBuilder::new()
            .string("role_id", role.role_id.as_deref())
            .string("role_name", role.role_name.as_deref())
            .string("description", role.description.as_deref())
            .string("owner_role_id", role.owner_role_id.as_deref())
            .build()
    }
}
