//! `galaxy_sql_job`

use tfplug::defaults::StaticDefault;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::DynamicValue;

use super::adapter::{EntityDescriptor, RecordAdapter};
use super::attributes::identity;
use super::fold::{PlanReader, StateBuilder};
use crate::api::sql_jobs::SqlJob;
use crate::api::EntityKind;
use crate::error::GalaxyError;

const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlJobAdapter;

impl EntityDescriptor for SqlJobAdapter {
    fn type_name(&self) -> String {
        "galaxy_sql_job".to_string()
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a scheduled SQL job")
            .attribute(identity("sql_job_id", "Server-assigned job identifier"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Job name")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("Job description")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("cluster_id", AttributeType::String)
                    .description("Cluster that runs the query")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("role_id", AttributeType::String)
                    .description("Role the query runs as")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("query", AttributeType::String)
                    .description("SQL text")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("cron_expression", AttributeType::String)
                    .description("Schedule in cron syntax; unscheduled when omitted")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("timezone", AttributeType::String)
                    .description("Timezone the schedule is evaluated in")
                    .optional_computed()
                    .default(StaticDefault::string(DEFAULT_TIMEZONE))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("status", AttributeType::String)
                    .description("Status of the last run")
                    .computed()
                    .build(),
            )
            .build()
    }

    fn id_attribute(&self) -> &'static str {
        "sql_job_id"
    }
}

impl RecordAdapter for SqlJobAdapter {
    type Record = SqlJob;

    fn kind(&self) -> EntityKind {
        EntityKind::SqlJob
    }

    fn list_type_name(&self) -> String {
        "galaxy_sql_jobs".to_string()
    }

    fn payload(&self, plan: &DynamicValue) -> Result<SqlJob, GalaxyError> {
        let plan = PlanReader::new(plan);
        Ok(SqlJob {
            sql_job_id: None,
            name: Some(plan.required_string("name")?),
            description: plan.string("description"),
            cluster_id: Some(plan.required_string("cluster_id")?),
            role_id: Some(plan.required_string("role_id")?),
            query: Some(plan.required_string("query")?),
            cron_expression: plan.string("cron_expression"),
            timezone: Some(
                plan.string("timezone")
                    .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            ),
            status: None,
        })
    }

    fn fold(&self, job: SqlJob) -> DynamicValue {
        StateBuilder::new()
            .string("sql_job_id", job.sql_job_id.as_deref())
            .string("name", job.name.as_deref())
            .string("description", job.description.as_deref())
            .string("cluster_id", job.cluster_id.as_deref())
            .string("role_id", job.role_id.as_deref())
            .string("query", job.query.as_deref())
            .string("cron_expression", job.cron_expression.as_deref())
            .string(
                "timezone",
                Some(job.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE)),
            )
            .string("status", job.status.as_deref())
            .build()
    }
}
