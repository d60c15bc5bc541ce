//! `galaxy_<family>_catalog` resources
//!
//! Every family shares identity, name, description and read-only mode; the
//! connection fields differ. Connection endpoints and credentials force
//! replacement because several backends cannot change them in place.

mod databases;
mod nosql;
mod object_storage;

pub use databases::{BigQueryCatalogAdapter, JdbcCatalogAdapter, SnowflakeCatalogAdapter};
pub use nosql::{CassandraCatalogAdapter, MongoDbCatalogAdapter, OpenSearchCatalogAdapter};
pub use object_storage::{GcsCatalogAdapter, S3CatalogAdapter};

use tfplug::defaults::StaticDefault;
use tfplug::plan_modifier::RequiresReplace;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::validator::{NumberRangeValidator, StringLengthValidator};

use super::attributes::identity;
use super::fold::{PlanReader, StateBuilder};
use crate::api::catalogs::{CatalogCommon, CatalogFamily};
use crate::error::GalaxyError;

pub(crate) fn type_name(family: CatalogFamily) -> String {
    format!("galaxy_{}_catalog", family.as_str())
}

pub(crate) fn list_type_name(family: CatalogFamily) -> String {
    format!("galaxy_{}_catalogs", family.as_str())
}

/// Common attributes followed by the family's own
fn catalog_schema(family: CatalogFamily, fields: Vec<Attribute>) -> Schema {
    let mut builder = SchemaBuilder::new()
        .version(0)
        .description(&format!("Manages a {} catalog", family.as_str()))
        .attribute(identity("catalog_id", "Server-assigned catalog identifier"))
        .attribute(
            AttributeBuilder::new("name", AttributeType::String)
                .description("Catalog name as seen from SQL")
                .required()
                .validator(StringLengthValidator::create(Some(1), Some(64)))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("description", AttributeType::String)
                .description("Catalog description")
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("read_only", AttributeType::Bool)
                .description("Reject writes through this catalog")
                .optional_computed()
                .default(StaticDefault::bool(false))
                .build(),
        );
    for field in fields {
        builder = builder.attribute(field);
    }
    builder.build()
}

fn common_payload(plan: &PlanReader<'_>) -> Result<CatalogCommon, GalaxyError> {
    Ok(CatalogCommon {
        catalog_id: None,
        name: Some(plan.required_string("name")?),
        description: plan.string("description"),
        read_only: Some(plan.bool("read_only").unwrap_or(false)),
    })
}

fn fold_common(common: &CatalogCommon) -> StateBuilder {
    StateBuilder::new()
        .string("catalog_id", common.catalog_id.as_deref())
        .string("name", common.name.as_deref())
        .string("description", common.description.as_deref())
        .bool_or("read_only", common.read_only, false)
}

fn fixed_string(name: &str, description: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .required()
        .plan_modifier(RequiresReplace::create())
        .build()
}

fn optional_fixed_string(name: &str, description: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .optional()
        .plan_modifier(RequiresReplace::create())
        .build()
}

fn string(name: &str, description: &str, required: bool) -> Attribute {
    let builder = AttributeBuilder::new(name, AttributeType::String).description(description);
    if required {
        builder.required().build()
    } else {
        builder.optional().build()
    }
}

/// Write-only credential; the server never returns it
fn secret(name: &str, description: &str, required: bool) -> Attribute {
    let builder = AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .sensitive()
        .plan_modifier(RequiresReplace::create());
    if required {
        builder.required().build()
    } else {
        builder.optional().build()
    }
}

fn optional_computed(name: &str, ty: AttributeType, description: &str) -> Attribute {
    AttributeBuilder::new(name, ty)
        .description(description)
        .optional_computed()
        .build()
}

fn port(default: Option<i64>) -> Attribute {
    let builder = AttributeBuilder::new("port", AttributeType::Number)
        .description("TCP port of the backend")
        .validator(NumberRangeValidator::create(Some(1.0), Some(65535.0)));
    match default {
        Some(port) => builder
            .optional_computed()
            .default(StaticDefault::number(port as f64))
            .build(),
        None => builder.optional().build(),
    }
}

/// Reads the planned port, falling back to the family default
fn planned_port(plan: &PlanReader<'_>, family: CatalogFamily) -> Result<Option<i64>, GalaxyError> {
    Ok(plan.int("port")?.or(family.default_port()))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::resources::adapter::{EntityDescriptor, RecordAdapter};
    use crate::api::catalogs::JdbcCatalog;
    use tfplug::types::{AttributePath, Dynamic, DynamicValue};

    fn plan(pairs: &[(&str, Dynamic)]) -> DynamicValue {
        let mut plan = DynamicValue::object();
        for (name, value) in pairs {
            plan.set(&AttributePath::new(name), value.clone()).unwrap();
        }
        plan
    }

    #[test]
    fn every_family_has_its_own_type_name() {
        let names: Vec<String> = CatalogFamily::ALL.iter().map(|f| type_name(*f)).collect();
        assert!(names.contains(&"galaxy_postgresql_catalog".to_string()));
        assert!(names.contains(&"galaxy_s3_catalog".to_string()));
        assert_eq!(list_type_name(CatalogFamily::Mongodb), "galaxy_mongodb_catalogs");
    }

    #[test]
    fn postgresql_port_defaults_when_server_omits_it() {
        let adapter = JdbcCatalogAdapter::new(CatalogFamily::Postgresql);
        let state = adapter.fold(JdbcCatalog {
            common: CatalogCommon {
                catalog_id: Some("c-1".to_string()),
                name: Some("pg".to_string()),
                ..Default::default()
            },
            endpoint: Some("db.internal".to_string()),
            ..Default::default()
        });

        assert_eq!(state.get_number(&AttributePath::new("port")).unwrap(), 5432.0);
        assert!(!state.get_bool(&AttributePath::new("read_only")).unwrap());
        assert_eq!(
            state.get(&AttributePath::new("password")),
            Some(&Dynamic::Null)
        );
    }

    #[test]
    fn unknown_planned_port_is_sent_as_default() {
        let adapter = JdbcCatalogAdapter::new(CatalogFamily::Sqlserver);
        let body = adapter
            .payload(&plan(&[
                ("name", Dynamic::String("mssql".into())),
                ("endpoint", Dynamic::String("db".into())),
                ("port", Dynamic::Unknown),
                ("database_name", Dynamic::String("app".into())),
                ("username", Dynamic::String("svc".into())),
                ("password", Dynamic::String("pw".into())),
            ]))
            .unwrap();
        assert_eq!(body.port, Some(1433));
        assert_eq!(body.password.as_deref(), Some("pw"));
    }

    #[test]
    fn mysql_has_no_database_name() {
        let schema = JdbcCatalogAdapter::new(CatalogFamily::Mysql).schema();
        assert!(schema.attribute("database_name").is_none());
        assert!(schema.attribute("port").unwrap().computed);

        let schema = JdbcCatalogAdapter::new(CatalogFamily::Redshift).schema();
        assert!(schema.attribute("database_name").unwrap().required);
        assert!(!schema.attribute("port").unwrap().computed);
    }

    #[test]
    fn credentials_are_write_only() {
        let adapter = JdbcCatalogAdapter::new(CatalogFamily::Postgresql);
        assert_eq!(adapter.write_only(), &["password"]);
        assert!(adapter.schema().attribute("password").unwrap().sensitive);
    }
}
