//! `galaxy_column_mask`

use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::DynamicValue;

use super::adapter::{EntityDescriptor, RecordAdapter};
use super::attributes::identity;
use super::fold::{PlanReader, StateBuilder};
use crate::api::policies::ColumnMask;
use crate::api::EntityKind;
use crate::error::GalaxyError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnMaskAdapter;

impl EntityDescriptor for ColumnMaskAdapter {
    fn type_name(&self) -> String {
        "galaxy_column_mask".to_string()
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a column mask applied through policies")
            .attribute(identity("column_mask_id", "Server-assigned column mask identifier"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Column mask name")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("Column mask description")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("expression", AttributeType::String)
                    .description("SQL expression producing the masked value")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("column_mask_type", AttributeType::String)
                    .description("SQL type of the masked column")
                    .required()
                    .build(),
            )
            .build()
    }

    fn id_attribute(&self) -> &'static str {
        "column_mask_id"
    }
}

impl RecordAdapter for ColumnMaskAdapter {
    type Record = ColumnMask;

    fn kind(&self) -> EntityKind {
        EntityKind::ColumnMask
    }

    fn list_type_name(&self) -> String {
        "galaxy_column_masks".to_string()
    }

    fn payload(&self, plan: &DynamicValue) -> Result<ColumnMask, GalaxyError> {
        let plan = PlanReader::new(plan);
        Ok(ColumnMask {
            column_mask_id: None,
            name: Some(plan.required_string("name")?),
            description: plan.string("description"),
            expression: Some(plan.required_string("expression")?),
            column_mask_type: Some(plan.required_string("column_mask_type")?),
        })
    }

    fn fold(&self, mask: ColumnMask) -> DynamicValue {
        StateBuilder::new()
            .string("column_mask_id", mask.column_mask_id.as_deref())
            .string("name", mask.name.as_deref())
            .string("description", mask.description.as_deref())
            .string("expression", mask.expression.as_deref())
            .string("column_mask_type", mask.column_mask_type.as_deref())
            .build()
    }
}
