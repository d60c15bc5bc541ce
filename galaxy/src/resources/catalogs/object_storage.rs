//! Object storage backed catalogs: S3 and GCS

use tfplug::plan_modifier::RequiresReplace;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::OneOfValidator;

use super::{
    catalog_schema, common_payload, fold_common, list_type_name, optional_computed,
    optional_fixed_string, secret, string, type_name,
};
use crate::api::catalogs::{CatalogFamily, GcsCatalog, S3Catalog};
use crate::api::EntityKind;
use crate::error::GalaxyError;
use crate::resources::adapter::{EntityDescriptor, RecordAdapter};
use crate::resources::fold::PlanReader;

const TABLE_FORMATS: &[&str] = &["ICEBERG", "DELTA", "HIVE", "HUDI"];

fn metastore_type() -> Attribute {
    AttributeBuilder::new("metastore_type", AttributeType::String)
        .description("Metastore holding table metadata")
        .required()
        .plan_modifier(RequiresReplace::create())
        .build()
}

fn table_settings() -> Vec<Attribute> {
    vec![
        string("default_bucket", "Bucket new schemas are placed in", false),
        AttributeBuilder::new("default_table_format", AttributeType::String)
            .description("Format for tables created without an explicit one")
            .optional_computed()
            .validator(OneOfValidator::create(TABLE_FORMATS))
            .build(),
        optional_computed(
            "external_table_creation_enabled",
            AttributeType::Bool,
            "Allow CREATE TABLE with an external location",
        ),
        optional_computed(
            "external_table_writes_enabled",
            AttributeType::Bool,
            "Allow writes to external tables",
        ),
    ]
}

#[derive(Debug, Clone, Copy, Default)]
pub struct S3CatalogAdapter;

impl EntityDescriptor for S3CatalogAdapter {
    fn type_name(&self) -> String {
        type_name(CatalogFamily::S3)
    }

    fn schema(&self) -> Schema {
        let mut fields = vec![
            metastore_type(),
            optional_fixed_string("region", "AWS region of the bucket"),
            optional_fixed_string("aws_access_key", "Access key for key based authentication"),
            secret("aws_secret_key", "Secret key for key based authentication", false),
            optional_fixed_string("role_arn", "IAM role assumed for role based authentication"),
        ];
        fields.extend(table_settings());
        catalog_schema(CatalogFamily::S3, fields)
    }

    fn id_attribute(&self) -> &'static str {
        "catalog_id"
    }

    fn write_only(&self) -> &'static [&'static str] {
        &["aws_secret_key"]
    }

    /// Exactly one of key pair or role must be configured
    fn validate(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let reader = PlanReader::new(config);
        let keys = reader.string("aws_access_key").is_some();
        let secret = reader.string("aws_secret_key").is_some();
        let role = reader.string("role_arn").is_some();

        let mut diagnostics = vec![];
        if keys != secret {
            diagnostics.push(
                Diagnostic::error(
                    "Incomplete key pair",
                    "aws_access_key and aws_secret_key must be set together",
                )
                .with_attribute(AttributePath::new(if keys {
                    "aws_secret_key"
                } else {
                    "aws_access_key"
                })),
            );
        }
        if keys && role {
            diagnostics.push(
                Diagnostic::error(
                    "Conflicting credentials",
                    "role_arn cannot be combined with aws_access_key",
                )
                .with_attribute(AttributePath::new("role_arn")),
            );
        }
        diagnostics
    }
}

impl RecordAdapter for S3CatalogAdapter {
    type Record = S3Catalog;

    fn kind(&self) -> EntityKind {
        EntityKind::Catalog(CatalogFamily::S3)
    }

    fn list_type_name(&self) -> String {
        list_type_name(CatalogFamily::S3)
    }

    fn payload(&self, plan: &DynamicValue) -> Result<S3Catalog, GalaxyError> {
        let reader = PlanReader::new(plan);
        Ok(S3Catalog {
            common: common_payload(&reader)?,
            metastore_type: Some(reader.required_string("metastore_type")?),
            region: reader.string("region"),
            default_bucket: reader.string("default_bucket"),
            aws_access_key: reader.string("aws_access_key"),
            aws_secret_key: reader.string("aws_secret_key"),
            role_arn: reader.string("role_arn"),
            default_table_format: reader.string("default_table_format"),
            external_table_creation_enabled: reader.bool("external_table_creation_enabled"),
            external_table_writes_enabled: reader.bool("external_table_writes_enabled"),
        })
    }

    fn fold(&self, catalog: S3Catalog) -> DynamicValue {
        fold_common(&catalog.common)
            .string("metastore_type", catalog.metastore_type.as_deref())
            .string("region", catalog.region.as_deref())
            .string("default_bucket", catalog.default_bucket.as_deref())
            .string("aws_access_key", catalog.aws_access_key.as_deref())
            .string("aws_secret_key", None)
            .string("role_arn", catalog.role_arn.as_deref())
            .string("default_table_format", catalog.default_table_format.as_deref())
            .bool(
                "external_table_creation_enabled",
                catalog.external_table_creation_enabled,
            )
            .bool(
                "external_table_writes_enabled",
                catalog.external_table_writes_enabled,
            )
            .build()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GcsCatalogAdapter;

impl EntityDescriptor for GcsCatalogAdapter {
    fn type_name(&self) -> String {
        type_name(CatalogFamily::Gcs)
    }

    fn schema(&self) -> Schema {
        let mut fields = vec![
            secret("credentials_key", "Service account key JSON", true),
            metastore_type(),
        ];
        fields.extend(table_settings());
        catalog_schema(CatalogFamily::Gcs, fields)
    }

    fn id_attribute(&self) -> &'static str {
        "catalog_id"
    }

    fn write_only(&self) -> &'static [&'static str] {
        &["credentials_key"]
    }
}

impl RecordAdapter for GcsCatalogAdapter {
    type Record = GcsCatalog;

    fn kind(&self) -> EntityKind {
        EntityKind::Catalog(CatalogFamily::Gcs)
    }

    fn list_type_name(&self) -> String {
        list_type_name(CatalogFamily::Gcs)
    }

    fn payload(&self, plan: &DynamicValue) -> Result<GcsCatalog, GalaxyError> {
        let reader = PlanReader::new(plan);
        Ok(GcsCatalog {
            common: common_payload(&reader)?,
            credentials_key: Some(reader.required_string("credentials_key")?),
            metastore_type: Some(reader.required_string("metastore_type")?),
            default_bucket: reader.string("default_bucket"),
            default_table_format: reader.string("default_table_format"),
            external_table_creation_enabled: reader.bool("external_table_creation_enabled"),
            external_table_writes_enabled: reader.bool("external_table_writes_enabled"),
        })
    }

    /// An unchanged key is not resent
    fn update_payload(
        &self,
        plan: &DynamicValue,
        prior: &DynamicValue,
    ) -> Result<GcsCatalog, GalaxyError> {
        let mut body = self.payload(plan)?;
        if PlanReader::new(prior).string("credentials_key") == body.credentials_key {
            body.credentials_key = None;
        }
        Ok(body)
    }

    fn fold(&self, catalog: GcsCatalog) -> DynamicValue {
        fold_common(&catalog.common)
            .string("credentials_key", None)
            .string("metastore_type", catalog.metastore_type.as_deref())
            .string("default_bucket", catalog.default_bucket.as_deref())
            .string("default_table_format", catalog.default_table_format.as_deref())
            .bool(
                "external_table_creation_enabled",
                catalog.external_table_creation_enabled,
            )
            .bool(
                "external_table_writes_enabled",
                catalog.external_table_writes_enabled,
            )
            .build()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use tfplug::types::Dynamic;

    fn config(pairs: &[(&str, &str)]) -> DynamicValue {
        let mut config = DynamicValue::object();
        for (name, value) in pairs {
            config
                .set_string(&AttributePath::new(name), value.to_string())
                .unwrap();
        }
        config
    }

    #[test]
    fn s3_key_pair_must_be_complete() {
        let diags = S3CatalogAdapter.validate(&config(&[("aws_access_key", "AKIA")]));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Incomplete key pair");
        assert_eq!(
            diags[0].attribute.as_ref().unwrap().to_string(),
            "aws_secret_key"
        );

        assert!(S3CatalogAdapter
            .validate(&config(&[("role_arn", "arn:aws:iam::1:role/x")]))
            .is_empty());
    }

    #[test]
    fn s3_role_and_keys_conflict() {
        let diags = S3CatalogAdapter.validate(&config(&[
            ("aws_access_key", "AKIA"),
            ("aws_secret_key", "s"),
            ("role_arn", "arn"),
        ]));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Conflicting credentials");
    }

    #[test]
    fn s3_fold_never_carries_the_secret() {
        let state = S3CatalogAdapter.fold(S3Catalog {
            aws_secret_key: Some("leaked".to_string()),
            metastore_type: Some("glue".to_string()),
            ..Default::default()
        });
        assert_eq!(
            state.get(&AttributePath::new("aws_secret_key")),
            Some(&Dynamic::Null)
        );
        assert_eq!(
            state.get_string(&AttributePath::new("metastore_type")).unwrap(),
            "glue"
        );
    }

    #[test]
    fn gcs_update_omits_unchanged_key() {
        let plan = config(&[
            ("name", "lake"),
            ("credentials_key", "{}"),
            ("metastore_type", "galaxy"),
        ]);
        let body = GcsCatalogAdapter.update_payload(&plan, &plan).unwrap();
        assert_eq!(body.credentials_key, None);

        let prior = config(&[("credentials_key", "{\"old\":1}")]);
        let body = GcsCatalogAdapter.update_payload(&plan, &prior).unwrap();
        assert_eq!(body.credentials_key.as_deref(), Some("{}"));
    }
}
