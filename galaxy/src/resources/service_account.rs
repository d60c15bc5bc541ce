//! `galaxy_service_account`

use tfplug::plan_modifier::RequiresReplace;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::DynamicValue;

use super::adapter::{EntityDescriptor, RecordAdapter};
use super::attributes::{identity, string_list};
use super::fold::{PlanReader, StateBuilder};
use crate::api::service_accounts::ServiceAccount;
use crate::api::EntityKind;
use crate::error::GalaxyError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceAccountAdapter;

impl EntityDescriptor for ServiceAccountAdapter {
    fn type_name(&self) -> String {
        "galaxy_service_account".to_string()
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a Galaxy service account")
            .attribute(identity(
                "service_account_id",
                "Server-assigned service account identifier",
            ))
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .description("Login name of the service account")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("additional_role_ids", string_list())
                    .description("Roles granted to the account besides its default role")
                    .optional_computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("with_initial_password", AttributeType::Bool)
                    .description("Generate a password at creation")
                    .optional()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .description("Initial password; only available right after creation")
                    .computed()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("created", AttributeType::String)
                    .description("Creation timestamp")
                    .computed()
                    .build(),
            )
            .build()
    }

    fn id_attribute(&self) -> &'static str {
        "service_account_id"
    }

    fn write_only(&self) -> &'static [&'static str] {
        &["with_initial_password", "password"]
    }
}

impl RecordAdapter for ServiceAccountAdapter {
    type Record = ServiceAccount;

    fn kind(&self) -> EntityKind {
        EntityKind::ServiceAccount
    }

    fn list_type_name(&self) -> String {
        "galaxy_service_accounts".to_string()
    }

    fn payload(&self, plan: &DynamicValue) -> Result<ServiceAccount, GalaxyError> {
        let plan = PlanReader::new(plan);
        Ok(ServiceAccount {
            username: Some(plan.required_string("username")?),
            additional_role_ids: plan.strings("additional_role_ids"),
            with_initial_password: plan.bool("with_initial_password"),
            ..Default::default()
        })
    }

    /// Only the role list can change in place
    fn update_payload(
        &self,
        plan: &DynamicValue,
        _prior: &DynamicValue,
    ) -> Result<ServiceAccount, GalaxyError> {
        Ok(ServiceAccount {
            additional_role_ids: PlanReader::new(plan).strings("additional_role_ids"),
            ..Default::default()
        })
    }

    fn fold(&self, account: ServiceAccount) -> DynamicValue {
        StateBuilder::new()
            .string("service_account_id", account.service_account_id.as_deref())
            .string("username", account.username.as_deref())
            .strings("additional_role_ids", account.additional_role_ids.as_deref())
            .string("password", account.password.as_deref())
            .string("created", account.created.as_deref())
            .build()
    }
}
