//! `galaxy_tag`

use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::DynamicValue;
use tfplug::validator::StringPatternValidator;

use super::adapter::{EntityDescriptor, RecordAdapter};
use super::attributes::identity;
use super::fold::{PlanReader, StateBuilder};
use crate::api::tags::Tag;
use crate::api::EntityKind;
use crate::error::GalaxyError;

#[derive(Debug, Clone, Copy, Default)]
pub struct TagAdapter;

impl EntityDescriptor for TagAdapter {
    fn type_name(&self) -> String {
        "galaxy_tag".to_string()
    }

    fn schema(&self) -> Schema {
        let mut color = AttributeBuilder::new("color", AttributeType::String)
            .description("Display color as #rrggbb; assigned by Galaxy when omitted")
            .optional_computed();
        if let Ok(validator) = StringPatternValidator::create(r"^#[0-9a-fA-F]{6}$", "a #rrggbb color")
        {
            color = color.validator(validator);
        }

        SchemaBuilder::new()
            .version(0)
            .description("Manages a Galaxy tag")
            .attribute(identity("tag_id", "Server-assigned tag identifier"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Tag name")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("Tag description")
                    .optional()
                    .build(),
            )
            .attribute(color.build())
            .build()
    }

    fn id_attribute(&self) -> &'static str {
        "tag_id"
    }
}

impl RecordAdapter for TagAdapter {
    type Record = Tag;

    fn kind(&self) -> EntityKind {
        EntityKind::Tag
    }

    fn list_type_name(&self) -> String {
        "galaxy_tags".to_string()
    }

    fn payload(&self, plan: &DynamicValue) -> Result<Tag, GalaxyError> {
        let plan = PlanReader::new(plan);
        Ok(Tag {
            tag_id: None,
            name: Some(plan.required_string("name")?),
            description: plan.string("description"),
            color: plan.string("color"),
        })
    }

    fn fold(&self, tag: Tag) -> DynamicValue {
        StateBuilder::new()
            .string("tag_id", tag.tag_id.as_deref())
            .string("name", tag.name.as_deref())
            .string("description", tag.description.as_deref())
            .string("color", tag.color.as_deref())
            .build()
    }
}
