//! Relational and warehouse catalogs

use tfplug::schema::Schema;
use tfplug::types::DynamicValue;

use super::{
    catalog_schema, common_payload, fixed_string, fold_common, list_type_name, planned_port,
    port, secret, string, type_name,
};
use crate::api::catalogs::{BigQueryCatalog, CatalogFamily, JdbcCatalog, SnowflakeCatalog};
use crate::api::EntityKind;
use crate::error::GalaxyError;
use crate::resources::adapter::{EntityDescriptor, RecordAdapter};
use crate::resources::fold::PlanReader;

/// Redshift, PostgreSQL, MySQL and SQL Server.
///
/// The four share a wire shape and differ only in whether a database name
/// is part of the connection and in the port the server assumes.
#[derive(Debug, Clone, Copy)]
pub struct JdbcCatalogAdapter {
    family: CatalogFamily,
}

impl JdbcCatalogAdapter {
    pub fn new(family: CatalogFamily) -> Self {
        Self { family }
    }

    pub fn families() -> [CatalogFamily; 4] {
        [
            CatalogFamily::Redshift,
            CatalogFamily::Postgresql,
            CatalogFamily::Mysql,
            CatalogFamily::Sqlserver,
        ]
    }

    fn has_database_name(&self) -> bool {
        self.family != CatalogFamily::Mysql
    }
}

impl EntityDescriptor for JdbcCatalogAdapter {
    fn type_name(&self) -> String {
        type_name(self.family)
    }

    fn schema(&self) -> Schema {
        let mut fields = vec![
            fixed_string("endpoint", "Hostname of the database server"),
            port(self.family.default_port()),
        ];
        if self.has_database_name() {
            fields.push(fixed_string("database_name", "Database to connect to"));
        }
        fields.push(fixed_string("username", "User the catalog connects as"));
        fields.push(secret("password", "Password of the connecting user", true));
        catalog_schema(self.family, fields)
    }

    fn id_attribute(&self) -> &'static str {
        "catalog_id"
    }

    fn write_only(&self) -> &'static [&'static str] {
        &["password"]
    }
}

impl RecordAdapter for JdbcCatalogAdapter {
    type Record = JdbcCatalog;

    fn kind(&self) -> EntityKind {
        EntityKind::Catalog(self.family)
    }

    fn list_type_name(&self) -> String {
        list_type_name(self.family)
    }

    fn payload(&self, plan: &DynamicValue) -> Result<JdbcCatalog, GalaxyError> {
        let reader = PlanReader::new(plan);
        let database_name = if self.has_database_name() {
            Some(reader.required_string("database_name")?)
        } else {
            None
        };
        Ok(JdbcCatalog {
            common: common_payload(&reader)?,
            endpoint: Some(reader.required_string("endpoint")?),
            port: planned_port(&reader, self.family)?,
            database_name,
            username: Some(reader.required_string("username")?),
            password: Some(reader.required_string("password")?),
        })
    }

    fn fold(&self, catalog: JdbcCatalog) -> DynamicValue {
        let mut state = fold_common(&catalog.common)
            .string("endpoint", catalog.endpoint.as_deref())
            .int_or("port", catalog.port, self.family.default_port())
            .string("username", catalog.username.as_deref())
            .string("password", None);
        if self.has_database_name() {
            state = state.string("database_name", catalog.database_name.as_deref());
        }
        state.build()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BigQueryCatalogAdapter;

impl EntityDescriptor for BigQueryCatalogAdapter {
    fn type_name(&self) -> String {
        type_name(CatalogFamily::Bigquery)
    }

    fn schema(&self) -> Schema {
        catalog_schema(
            CatalogFamily::Bigquery,
            vec![
                fixed_string("project_id", "Google Cloud project holding the datasets"),
                secret("credentials_key", "Service account key JSON", true),
            ],
        )
    }

    fn id_attribute(&self) -> &'static str {
        "catalog_id"
    }

    fn write_only(&self) -> &'static [&'static str] {
        &["credentials_key"]
    }
}

impl RecordAdapter for BigQueryCatalogAdapter {
    type Record = BigQueryCatalog;

    fn kind(&self) -> EntityKind {
        EntityKind::Catalog(CatalogFamily::Bigquery)
    }

    fn list_type_name(&self) -> String {
        list_type_name(CatalogFamily::Bigquery)
    }

    fn payload(&self, plan: &DynamicValue) -> Result<BigQueryCatalog, GalaxyError> {
        let reader = PlanReader::new(plan);
        Ok(BigQueryCatalog {
            common: common_payload(&reader)?,
            project_id: Some(reader.required_string("project_id")?),
            credentials_key: Some(reader.required_string("credentials_key")?),
        })
    }

    fn fold(&self, catalog: BigQueryCatalog) -> DynamicValue {
        fold_common(&catalog.common)
            .string("project_id", catalog.project_id.as_deref())
            .string("credentials_key", None)
            .build()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SnowflakeCatalogAdapter;

impl EntityDescriptor for SnowflakeCatalogAdapter {
    fn type_name(&self) -> String {
        type_name(CatalogFamily::Snowflake)
    }

    fn schema(&self) -> Schema {
        catalog_schema(
            CatalogFamily::Snowflake,
            vec![
                fixed_string("account_identifier", "Snowflake account, e.g. org-account"),
                string("database_name", "Database exposed through the catalog", true),
                string("warehouse", "Warehouse queries run on", true),
                string("role", "Snowflake role to assume", false),
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

impl RecordAdapter for SnowflakeCatalogAdapter {
    type Record = SnowflakeCatalog;

    fn kind(&self) -> EntityKind {
        EntityKind::Catalog(CatalogFamily::Snowflake)
    }

    fn list_type_name(&self) -> String {
        list_type_name(CatalogFamily::Snowflake)
    }

    fn payload(&self, plan: &DynamicValue) -> Result<SnowflakeCatalog, GalaxyError> {
        let reader = PlanReader::new(plan);
        Ok(SnowflakeCatalog {
            common: common_payload(&reader)?,
            account_identifier: Some(reader.required_string("account_identifier")?),
            database_name: Some(reader.required_string("database_name")?),
            warehouse: Some(reader.required_string("warehouse")?),
            role: reader.string("role"),
            username: Some(reader.required_string("username")?),
            password: Some(reader.required_string("password")?),
        })
    }

    fn fold(&self, catalog: SnowflakeCatalog) -> DynamicValue {
        fold_common(&catalog.common)
            .string("account_identifier", catalog.account_identifier.as_deref())
            .string("database_name", catalog.database_name.as_deref())
            .string("warehouse", catalog.warehouse.as_deref())
            .string("role", catalog.role.as_deref())
            .string("username", catalog.username.as_deref())
            .string("password", None)
            .build()
    }
}
