//! `galaxy_policy`

use tfplug::plan_modifier::RequiresReplace;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::ListLengthValidator;

use super::adapter::{EntityDescriptor, RecordAdapter};
use super::attributes::{identity, object_list, string_list};
use super::fold::{field_string, field_strings, PlanReader, StateBuilder};
use crate::api::policies::{Policy, PolicyScope};
use crate::api::EntityKind;
use crate::error::GalaxyError;

#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyAdapter;

fn scope_type() -> AttributeType {
    object_list(&[
        ("entity_id", AttributeType::String),
        ("entity_kind", AttributeType::String),
        ("schema_name", AttributeType::String),
        ("table_name", AttributeType::String),
        ("column_name", AttributeType::String),
        ("privileges", string_list()),
    ])
}

impl EntityDescriptor for PolicyAdapter {
    fn type_name(&self) -> String {
        "galaxy_policy".to_string()
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages an attribute-based access policy")
            .attribute(identity("policy_id", "Server-assigned policy identifier"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Policy name")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("Policy description")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("role_id", AttributeType::String)
                    .description("Role the policy applies to")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("predicate", AttributeType::String)
                    .description("Predicate deciding when the policy applies")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("expiration", AttributeType::String)
                    .description("RFC 3339 timestamp after which the policy lapses")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("scopes", scope_type())
                    .description("Entities the policy covers and the privileges it grants")
                    .required()
                    .validator(ListLengthValidator::create(Some(1), None))
                    .build(),
            )
            .build()
    }

    fn id_attribute(&self) -> &'static str {
        "policy_id"
    }

    fn validate(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = vec![];
        let Some(scopes) = PlanReader::new(config).objects("scopes") else {
            return diagnostics;
        };
        for (idx, scope) in scopes.iter().enumerate() {
            for field in ["entity_id", "entity_kind"] {
                let value = scope.get(field);
                // unknown values are checked at apply time
                if value.map_or(true, |v| v.is_null()) {
                    diagnostics.push(
                        Diagnostic::error(
                            "Missing required argument",
                            format!("scope {} needs {}", idx, field),
                        )
                        .with_attribute(
                            AttributePath::new("scopes")
                                .index(idx as i64)
                                .attribute(field),
                        ),
                    );
                }
            }
        }
        diagnostics
    }
}

impl RecordAdapter for PolicyAdapter {
    type Record = Policy;

    fn kind(&self) -> EntityKind {
        EntityKind::Policy
    }

    fn list_type_name(&self) -> String {
        "galaxy_policies".to_string()
    }

    fn payload(&self, plan: &DynamicValue) -> Result<Policy, GalaxyError> {
        let reader = PlanReader::new(plan);
        let scopes = reader
            .objects("scopes")
            .unwrap_or_default()
            .into_iter()
            .map(|scope| PolicyScope {
                entity_id: field_string(scope, "entity_id").unwrap_or_default(),
                entity_kind: field_string(scope, "entity_kind").unwrap_or_default(),
                schema_name: field_string(scope, "schema_name"),
                table_name: field_string(scope, "table_name"),
                column_name: field_string(scope, "column_name"),
                privileges: field_strings(scope, "privileges"),
            })
            .collect();

        Ok(Policy {
            policy_id: None,
            name: Some(reader.required_string("name")?),
            description: reader.string("description"),
            role_id: Some(reader.required_string("role_id")?),
            predicate: Some(reader.required_string("predicate")?),
            expiration: reader.string("expiration"),
            scopes: Some(scopes),
        })
    }

    fn fold(&self, policy: Policy) -> DynamicValue {
        let scopes = policy
            .scopes
            .unwrap_or_default()
            .iter()
            .map(|scope| {
                StateBuilder::new()
                    .string("entity_id", Some(scope.entity_id.as_str()))
                    .string("entity_kind", Some(scope.entity_kind.as_str()))
                    .string("schema_name", scope.schema_name.as_deref())
                    .string("table_name", scope.table_name.as_deref())
                    .string("column_name", scope.column_name.as_deref())
                    .strings("privileges", scope.privileges.as_deref())
                    .build_object()
            })
            .collect();

        StateBuilder::new()
            .string("policy_id", policy.policy_id.as_deref())
            .string("name", policy.name.as_deref())
            .string("description", policy.description.as_deref())
            .string("role_id", policy.role_id.as_deref())
            .string("predicate", policy.predicate.as_deref())
            .string("expiration", policy.expiration.as_deref())
            .objects("scopes", scopes)
            .build()
    }
}
