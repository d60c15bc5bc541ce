//! Resource implementations
//!
//! Each entity is an adapter; [`GalaxyResource`] runs any adapter under the
//! host protocol.

pub mod adapter;
pub mod attributes;
pub mod catalogs;
pub mod cluster;
pub mod column_mask;
pub mod data_product;
pub mod fold;
pub mod lifecycle;
pub mod policy;
pub mod role;
pub mod role_grant;
pub mod row_filter;
pub mod service_account;
pub mod service_account_password;
pub mod sql_job;
pub mod tag;

pub use adapter::{EntityAdapter, EntityDescriptor, RecordAdapter};
pub use catalogs::{
    BigQueryCatalogAdapter, CassandraCatalogAdapter, GcsCatalogAdapter, JdbcCatalogAdapter,
    MongoDbCatalogAdapter, OpenSearchCatalogAdapter, S3CatalogAdapter, SnowflakeCatalogAdapter,
};
pub use cluster::ClusterAdapter;
pub use column_mask::ColumnMaskAdapter;
pub use data_product::DataProductAdapter;
pub use lifecycle::GalaxyResource;
pub use policy::PolicyAdapter;
pub use role::RoleAdapter;
pub use role_grant::RoleGrantAdapter;
pub use row_filter::RowFilterAdapter;
pub use service_account::ServiceAccountAdapter;
pub use service_account_password::ServiceAccountPasswordAdapter;
pub use sql_job::SqlJobAdapter;
pub use tag::TagAdapter;
