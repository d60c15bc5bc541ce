//! `galaxy_row_filter`

use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::DynamicValue;

use super::adapter::{EntityDescriptor, RecordAdapter};
use super::attributes::identity;
use super::fold::{PlanReader, StateBuilder};
use crate::api::policies::RowFilter;
use crate::api::EntityKind;
use crate::error::GalaxyError;

#[derive(Debug, Clone, Copy, Default)]
pub struct RowFilterAdapter;

impl EntityDescriptor for RowFilterAdapter {
    fn type_name(&self) -> String {
        "galaxy_row_filter".to_string()
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a row filter applied through policies")
            .attribute(identity("row_filter_id", "Server-assigned row filter identifier"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Row filter name")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("Row filter description")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("expression", AttributeType::String)
                    .description("SQL boolean expression selecting visible rows")
                    .required()
                    .build(),
            )
            .build()
    }

    fn id_attribute(&self) -> &'static str {
        "row_filter_id"
    }
}

impl RecordAdapter for RowFilterAdapter {
    type Record = RowFilter;

    fn kind(&self) -> EntityKind {
        EntityKind::RowFilter
    }

    fn list_type_name(&self) -> String {
        "galaxy_row_filters".to_string()
    }

    fn payload(&self, plan: &DynamicValue) -> Result<RowFilter, GalaxyError> {
        let plan = PlanReader::new(plan);
        Ok(RowFilter {
            row_filter_id: None,
            name: Some(plan.required_string("name")?),
            description: plan.string("description"),
            expression: Some(plan.required_string("expression")?),
        })
    }

    fn fold(&self, filter: RowFilter) -> DynamicValue {
        StateBuilder::new()
            .string("row_filter_id", filter.row_filter_id.as_deref())
            .string("name", filter.name.as_deref())
            .string("description", filter.description.as_deref())
            .string("expression", filter.expression.as_deref())
            .build()
    }
}
