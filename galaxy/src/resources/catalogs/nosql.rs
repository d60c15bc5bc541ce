//! Document, wide-column and search catalogs

use tfplug::plan_modifier::RequiresReplace;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::OneOfValidator;

use super::{
    catalog_schema, common_payload, fixed_string, fold_common, list_type_name, optional_computed,
    optional_fixed_string, port, secret, string, type_name,
};
use crate::api::catalogs::{CassandraCatalog, CatalogFamily, MongoDbCatalog, OpenSearchCatalog};
use crate::api::EntityKind;
use crate::error::GalaxyError;
use crate::resources::adapter::{EntityDescriptor, RecordAdapter};
use crate::resources::fold::PlanReader;

#[derive(Debug, Clone, Copy, Default)]
pub struct MongoDbCatalogAdapter;

impl EntityDescriptor for MongoDbCatalogAdapter {
    fn type_name(&self) -> String {
        type_name(CatalogFamily::Mongodb)
    }

    fn schema(&self) -> Schema {
        catalog_schema(
            CatalogFamily::Mongodb,
            vec![
                fixed_string("connection_type", "How Galaxy reaches the cluster, e.g. direct"),
                fixed_string("hosts", "Comma separated host:port list"),
                fixed_string("username", "User the catalog connects as"),
                secret("password", "Password of the connecting user", true),
                optional_computed("tls_enabled", AttributeType::Bool, "Connect over TLS"),
                optional_computed(
                    "federated_database",
                    AttributeType::Bool,
                    "Target is an Atlas federated database",
                ),
            ],
        )
    }

    fn id_attribute(&self) -> &'static str {
        "catalog_id"
    }

    fn write_only(&self) -> &'static [&'static str] {
        &["password"]
    }
}

impl RecordAdapter for MongoDbCatalogAdapter {
    type Record = MongoDbCatalog;

    fn kind(&self) -> EntityKind {
        EntityKind::Catalog(CatalogFamily::Mongodb)
    }

    fn list_type_name(&self) -> String {
        list_type_name(CatalogFamily::Mongodb)
    }

    fn payload(&self, plan: &DynamicValue) -> Result<MongoDbCatalog, GalaxyError> {
        let reader = PlanReader::new(plan);
        Ok(MongoDbCatalog {
            common: common_payload(&reader)?,
            connection_type: Some(reader.required_string("connection_type")?),
            hosts: Some(reader.required_string("hosts")?),
            username: Some(reader.required_string("username")?),
            password: Some(reader.required_string("password")?),
            tls_enabled: reader.bool("tls_enabled"),
            federated_database: reader.bool("federated_database"),
        })
    }

    fn fold(&self, catalog: MongoDbCatalog) -> DynamicValue {
        fold_common(&catalog.common)
            .string("connection_type", catalog.connection_type.as_deref())
            .string("hosts", catalog.hosts.as_deref())
            .string("username", catalog.username.as_deref())
            .string("password", None)
            .bool("tls_enabled", catalog.tls_enabled)
            .bool("federated_database", catalog.federated_database)
            .build()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CassandraCatalogAdapter;

impl EntityDescriptor for CassandraCatalogAdapter {
    fn type_name(&self) -> String {
        type_name(CatalogFamily::Cassandra)
    }

    fn schema(&self) -> Schema {
        catalog_schema(
            CatalogFamily::Cassandra,
            vec![
                fixed_string("deployment_type", "Self-managed or a hosted service"),
                fixed_string("contact_points", "Comma separated seed hosts"),
                string("local_datacenter", "Datacenter used for local consistency", false),
                port(None),
                fixed_string("username", "User the catalog connects as"),
                secret("password", "Password of the connecting user", true),
            ],
        )
    }

    fn id_attribute(&self) -> &'static str {
        "catalog_id"
    }

    fn write_only(&self) -> &'static [&'static str] {
        &["password"]
    }
}

impl RecordAdapter for CassandraCatalogAdapter {
    type Record = CassandraCatalog;

    fn kind(&self) -> EntityKind {
        EntityKind::Catalog(CatalogFamily::Cassandra)
    }

    fn list_type_name(&self) -> String {
        list_type_name(CatalogFamily::Cassandra)
    }

    fn payload(&self, plan: &DynamicValue) -> Result<CassandraCatalog, GalaxyError> {
        let reader = PlanReader::new(plan);
        Ok(CassandraCatalog {
            common: common_payload(&reader)?,
            deployment_type: Some(reader.required_string("deployment_type")?),
            contact_points: Some(reader.required_string("contact_points")?),
            local_datacenter: reader.string("local_datacenter"),
            port: reader.int("port")?,
            username: Some(reader.required_string("username")?),
            password: Some(reader.required_string("password")?),
        })
    }

    fn fold(&self, catalog: CassandraCatalog) -> DynamicValue {
        fold_common(&catalog.common)
            .string("deployment_type", catalog.deployment_type.as_deref())
            .string("contact_points", catalog.contact_points.as_deref())
            .string("local_datacenter", catalog.local_datacenter.as_deref())
            .int("port", catalog.port)
            .string("username", catalog.username.as_deref())
            .string("password", None)
            .build()
    }
}

const AUTH_TYPES: &[&str] = &["ACCESS_KEY", "IAM_ROLE"];

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSearchCatalogAdapter;

impl EntityDescriptor for OpenSearchCatalogAdapter {
    fn type_name(&self) -> String {
        type_name(CatalogFamily::Opensearch)
    }

    fn schema(&self) -> Schema {
        catalog_schema(
            CatalogFamily::Opensearch,
            vec![
                fixed_string("endpoint", "Domain endpoint"),
                port(None),
                fixed_string("region", "AWS region of the domain"),
                AttributeBuilder::new("auth_type", AttributeType::String)
                    .description("ACCESS_KEY or IAM_ROLE")
                    .required()
                    .validator(OneOfValidator::create(AUTH_TYPES))
                    .plan_modifier(RequiresReplace::create())
                    .build(),
                optional_fixed_string("access_key", "Access key for ACCESS_KEY authentication"),
                secret("secret_key", "Secret key for ACCESS_KEY authentication", false),
                optional_fixed_string("role_arn", "IAM role for IAM_ROLE authentication"),
            ],
        )
    }

    fn id_attribute(&self) -> &'static str {
        "catalog_id"
    }

    fn write_only(&self) -> &'static [&'static str] {
        &["secret_key"]
    }

    fn validate(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let reader = PlanReader::new(config);
        let required: &[&str] = match reader.string("auth_type").as_deref() {
            Some("ACCESS_KEY") => &["access_key", "secret_key"],
            Some("IAM_ROLE") => &["role_arn"],
            _ => &[],
        };
        required
            .iter()
            .filter(|name| {
                config
                    .get(&AttributePath::new(name))
                    .map_or(true, |v| v.is_null())
            })
            .map(|name| {
                Diagnostic::error(
                    "Missing credential",
                    format!("{} is required for the chosen auth_type", name),
                )
                .with_attribute(AttributePath::new(name))
            })
            .collect()
    }
}

impl RecordAdapter for OpenSearchCatalogAdapter {
    type Record = OpenSearchCatalog;

    fn kind(&self) -> EntityKind {
        EntityKind::Catalog(CatalogFamily::Opensearch)
    }

    fn list_type_name(&self) -> String {
        list_type_name(CatalogFamily::Opensearch)
    }

    fn payload(&self, plan: &DynamicValue) -> Result<OpenSearchCatalog, GalaxyError> {
        let reader = PlanReader::new(plan);
        Ok(OpenSearchCatalog {
            common: common_payload(&reader)?,
            endpoint: Some(reader.required_string("endpoint")?),
            port: reader.int("port")?,
            region: Some(reader.required_string("region")?),
            auth_type: Some(reader.required_string("auth_type")?),
            access_key: reader.string("access_key"),
            secret_key: reader.string("secret_key"),
            role_arn: reader.string("role_arn"),
        })
    }

    fn fold(&self, catalog: OpenSearchCatalog) -> DynamicValue {
        fold_common(&catalog.common)
            .string("endpoint", catalog.endpoint.as_deref())
            .int("port", catalog.port)
            .string("region", catalog.region.as_deref())
            .string("auth_type", catalog.auth_type.as_deref())
            .string("access_key", catalog.access_key.as_deref())
            .string("secret_key", None)
            .string("role_arn", catalog.role_arn.as_deref())
            .build()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn opensearch_access_key_auth_needs_both_keys() {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("auth_type"), "ACCESS_KEY".to_string())
            .unwrap();
        config
            .set_string(&AttributePath::new("access_key"), "AKIA".to_string())
            .unwrap();

        let diags = OpenSearchCatalogAdapter.validate(&config);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].attribute.as_ref().unwrap().to_string(),
            "secret_key"
        );
    }

    #[test]
    fn opensearch_unknown_credential_is_not_flagged() {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("auth_type"), "IAM_ROLE".to_string())
            .unwrap();
        config.mark_unknown(&AttributePath::new("role_arn")).unwrap();

        assert!(OpenSearchCatalogAdapter.validate(&config).is_empty());
    }

    #[test]
    fn mongodb_payload_carries_password_and_fold_drops_it() {
        let mut plan = DynamicValue::object();
        for (name, value) in [
            ("name", "docs"),
            ("connection_type", "direct"),
            ("hosts", "mongo:27017"),
            ("username", "svc"),
            ("password", "pw"),
        ] {
            plan.set_string(&AttributePath::new(name), value.to_string())
                .unwrap();
        }

        let body = MongoDbCatalogAdapter.payload(&plan).unwrap();
        assert_eq!(body.password.as_deref(), Some("pw"));
        assert_eq!(body.common.read_only, Some(false));

        let state = MongoDbCatalogAdapter.fold(body);
        assert!(state.get(&AttributePath::new("password")).unwrap().is_null());
    }
}
