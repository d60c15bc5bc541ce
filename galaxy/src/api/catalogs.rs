//! Catalog records, one per backend family, and the validation probe

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::Client;
use super::common::{entity_path, lossless_int};
use super::error::ApiError;

/// Backend family of a catalog; each has its own collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogFamily {
    S3,
    Gcs,
    Redshift,
    Postgresql,
    Mysql,
    Sqlserver,
    Mongodb,
    Cassandra,
    Opensearch,
    Bigquery,
    Snowflake,
}

impl CatalogFamily {
    pub const ALL: [CatalogFamily; 11] = [
        CatalogFamily::S3,
        CatalogFamily::Gcs,
        CatalogFamily::Redshift,
        CatalogFamily::Postgresql,
        CatalogFamily::Mysql,
        CatalogFamily::Sqlserver,
        CatalogFamily::Mongodb,
        CatalogFamily::Cassandra,
        CatalogFamily::Opensearch,
        CatalogFamily::Bigquery,
        CatalogFamily::Snowflake,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogFamily::S3 => "s3",
            CatalogFamily::Gcs => "gcs",
            CatalogFamily::Redshift => "redshift",
            CatalogFamily::Postgresql => "postgresql",
            CatalogFamily::Mysql => "mysql",
            CatalogFamily::Sqlserver => "sqlserver",
            CatalogFamily::Mongodb => "mongodb",
            CatalogFamily::Cassandra => "cassandra",
            CatalogFamily::Opensearch => "opensearch",
            CatalogFamily::Bigquery => "bigquery",
            CatalogFamily::Snowflake => "snowflake",
        }
    }

    /// Port the server assumes when none is configured
    pub fn default_port(&self) -> Option<i64> {
        match self {
            CatalogFamily::Postgresql => Some(5432),
            CatalogFamily::Mysql => Some(3306),
            CatalogFamily::Sqlserver => Some(1433),
            _ => None,
        }
    }
}

impl std::fmt::Display for CatalogFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields every catalog family carries
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCommon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct S3Catalog {
    #[serde(flatten)]
    pub common: CatalogCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metastore_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_table_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_table_creation_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_table_writes_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GcsCatalog {
    #[serde(flatten)]
    pub common: CatalogCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metastore_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_table_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_table_creation_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_table_writes_enabled: Option<bool>,
}

/// Redshift, PostgreSQL, MySQL and SQL Server share one wire shape
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JdbcCatalog {
    #[serde(flatten)]
    pub common: CatalogCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lossless_int::deserialize"
    )]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MongoDbCatalog {
    #[serde(flatten)]
    pub common: CatalogCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub federated_database: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CassandraCatalog {
    #[serde(flatten)]
    pub common: CatalogCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_points: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_datacenter: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lossless_int::deserialize"
    )]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenSearchCatalog {
    #[serde(flatten)]
    pub common: CatalogCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lossless_int::deserialize"
    )]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BigQueryCatalog {
    #[serde(flatten)]
    pub common: CatalogCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnowflakeCatalog {
    #[serde(flatten)]
    pub common: CatalogCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Outcome of the server-side connectivity check
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogValidation {
    #[serde(default)]
    pub validation_successful: bool,
    #[serde(default)]
    pub validation_message: Option<String>,
}

pub struct CatalogsApi<'a> {
    client: &'a Client,
}

impl<'a> CatalogsApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Read-only probe; never mutates the catalog
    pub async fn validate(
        &self,
        family: CatalogFamily,
        catalog_id: &str,
    ) -> Result<CatalogValidation, ApiError> {
        let path = format!(
            "{}/validate",
            entity_path(&format!("catalog/{}", family.as_str()), catalog_id)
        );
        debug!(family = family.as_str(), catalog_id, "validating catalog");
        self.client.get(&path).await
    }
}
