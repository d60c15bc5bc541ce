//! `galaxy_data_product`

use tfplug::plan_modifier::RequiresReplace;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::DynamicValue;

use super::adapter::{EntityDescriptor, RecordAdapter};
use super::attributes::{identity, object_list};
use super::fold::{field_string, PlanReader, StateBuilder};
use crate::api::data_products::{Contact, DataProduct, Link};
use crate::api::EntityKind;
use crate::error::GalaxyError;

#[derive(Debug, Clone, Copy, Default)]
pub struct DataProductAdapter;

impl EntityDescriptor for DataProductAdapter {
    fn type_name(&self) -> String {
        "galaxy_data_product".to_string()
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a data product published from a catalog schema")
            .attribute(identity("data_product_id", "Server-assigned data product identifier"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Data product name")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("summary", AttributeType::String)
                    .description("One-line summary")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("Longer description")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("catalog_id", AttributeType::String)
                    .description("Catalog holding the published schema")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("schema_name", AttributeType::String)
                    .description("Published schema")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("default_cluster_id", AttributeType::String)
                    .description("Cluster used to query the product by default")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "contacts",
                    object_list(&[
                        ("user_id", AttributeType::String),
                        ("email", AttributeType::String),
                    ]),
                )
                .description("Owners to contact about the product")
                .optional_computed()
                .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "links",
                    object_list(&[
                        ("name", AttributeType::String),
                        ("uri", AttributeType::String),
                    ]),
                )
                .description("Related documentation links")
                .optional_computed()
                .build(),
            )
            .build()
    }

    fn id_attribute(&self) -> &'static str {
        "data_product_id"
    }
}

impl RecordAdapter for DataProductAdapter {
    type Record = DataProduct;

    fn kind(&self) -> EntityKind {
        EntityKind::DataProduct
    }

    fn list_type_name(&self) -> String {
        "galaxy_data_products".to_string()
    }

    fn payload(&self, plan: &DynamicValue) -> Result<DataProduct, GalaxyError> {
        let reader = PlanReader::new(plan);
        let contacts = reader.objects("contacts").map(|contacts| {
            contacts
                .into_iter()
                .map(|contact| Contact {
                    user_id: None,
                    email: field_string(contact, "email").unwrap_or_default(),
                })
                .collect()
        });
        let links = reader.objects("links").map(|links| {
            links
                .into_iter()
                .map(|link| Link {
                    name: field_string(link, "name").unwrap_or_default(),
                    uri: field_string(link, "uri").unwrap_or_default(),
                })
                .collect()
        });

        Ok(DataProduct {
            data_product_id: None,
            name: Some(reader.required_string("name")?),
            summary: Some(reader.required_string("summary")?),
            description: reader.string("description"),
            catalog_id: Some(reader.required_string("catalog_id")?),
            schema_name: Some(reader.required_string("schema_name")?),
            default_cluster_id: reader.string("default_cluster_id"),
            contacts,
            links,
        })
    }

    fn fold(&self, product: DataProduct) -> DynamicValue {
        let contacts = product
            .contacts
            .unwrap_or_default()
            .iter()
            .map(|contact| {
                StateBuilder::new()
                    .string("user_id", contact.user_id.as_deref())
                    .string("email", Some(contact.email.as_str()))
                    .build_object()
            })
            .collect();
        let links = product
            .links
            .unwrap_or_default()
            .iter()
            .map(|link| {
                StateBuilder::new()
                    .string("name", Some(link.name.as_str()))
                    .string("uri", Some(link.uri.as_str()))
                    .build_object()
            })
            .collect();

        StateBuilder::new()
            .string("data_product_id", product.data_product_id.as_deref())
            .string("name", product.name.as_deref())
            .string("summary", product.summary.as_deref())
            .string("description", product.description.as_deref())
            .string("catalog_id", product.catalog_id.as_deref())
            .string("schema_name", product.schema_name.as_deref())
            .string("default_cluster_id", product.default_cluster_id.as_deref())
            .objects("contacts", contacts)
            .objects("links", links)
            .build()
    }
}
