//! `galaxy_cluster`

use tfplug::plan_modifier::RequiresReplace;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::{NumberRangeValidator, StringLengthValidator};

use super::adapter::{EntityDescriptor, RecordAdapter};
use super::attributes::{identity, string_list};
use super::fold::{PlanReader, StateBuilder};
use crate::api::clusters::Cluster;
use crate::api::EntityKind;
use crate::error::GalaxyError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterAdapter;

impl EntityDescriptor for ClusterAdapter {
    fn type_name(&self) -> String {
        "galaxy_cluster".to_string()
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a Galaxy cluster")
            .attribute(identity("cluster_id", "Server-assigned cluster identifier"))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Cluster name")
                    .required()
                    .validator(StringLengthValidator::create(Some(1), Some(255)))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("cloud_region_id", AttributeType::String)
                    .description("Cloud region the cluster runs in")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("min_workers", AttributeType::Number)
                    .description("Minimum number of workers")
                    .required()
                    .validator(NumberRangeValidator::create(Some(0.0), None))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("max_workers", AttributeType::Number)
                    .description("Maximum number of workers")
                    .required()
                    .validator(NumberRangeValidator::create(Some(1.0), None))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("idle_stop_minutes", AttributeType::Number)
                    .description("Minutes of inactivity before the cluster suspends")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("private_link_cluster", AttributeType::Bool)
                    .description("Whether the cluster is reachable only over private link")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("result_cache_enabled", AttributeType::Bool)
                    .description("Whether query results are cached")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("result_cache_default_visibility_seconds", AttributeType::Number)
                    .description("How long cached results stay visible")
                    .optional()
                    .validator(NumberRangeValidator::create(Some(0.0), None))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("warp_resiliency_enabled", AttributeType::Bool)
                    .description("Whether fault-tolerant execution is enabled")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("catalog_refs", string_list())
                    .description("Catalog IDs attached to the cluster")
                    .optional_computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("processing_mode", AttributeType::String)
                    .description("Processing mode, e.g. WarpSpeed")
                    .optional_computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("cluster_state", AttributeType::String)
                    .description("Current state reported by Galaxy")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("trino_uri", AttributeType::String)
                    .description("Connection URI for Trino clients")
                    .computed()
                    .build(),
            )
            .build()
    }

    fn id_attribute(&self) -> &'static str {
        "cluster_id"
    }

    fn validate(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = vec![];
        let reader = PlanReader::new(config);

        if let (Ok(Some(min)), Ok(Some(max))) =
            (reader.int("min_workers"), reader.int("max_workers"))
        {
            if min > max {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid worker range",
                        format!("min_workers ({}) must not exceed max_workers ({})", min, max),
                    )
                    .with_attribute(AttributePath::new("min_workers")),
                );
            }
        }

        if let Ok(Some(_)) = reader.int("result_cache_default_visibility_seconds") {
            if reader.bool("result_cache_enabled") == Some(false) {
                diagnostics.push(
                    Diagnostic::error(
                        "Result cache disabled",
                        "result_cache_default_visibility_seconds requires result_cache_enabled = true",
                    )
                    .with_attribute(AttributePath::new("result_cache_default_visibility_seconds")),
                );
            }
        }

        diagnostics
    }
}

impl RecordAdapter for ClusterAdapter {
    type Record = Cluster;

    fn kind(&self) -> EntityKind {
        EntityKind::Cluster
    }

    fn list_type_name(&self) -> String {
        "galaxy_clusters".to_string()
    }

    fn payload(&self, plan: &DynamicValue) -> Result<Cluster, GalaxyError> {
        let plan = PlanReader::new(plan);
        Ok(Cluster {
            cluster_id: None,
            name: Some(plan.required_string("name")?),
            cloud_region_id: Some(plan.required_string("cloud_region_id")?),
            min_workers: plan.int("min_workers")?,
            max_workers: plan.int("max_workers")?,
            idle_stop_minutes: plan.int("idle_stop_minutes")?,
            private_link_cluster: plan.bool("private_link_cluster"),
            result_cache_enabled: plan.bool("result_cache_enabled"),
            result_cache_default_visibility_seconds: plan
                .int("result_cache_default_visibility_seconds")?,
            warp_resiliency_enabled: plan.bool("warp_resiliency_enabled"),
            catalog_refs: plan.strings("catalog_refs"),
            processing_mode: plan.string("processing_mode"),
            cluster_state: None,
            trino_uri: None,
        })
    }

    /// Region and private link are fixed at creation
    fn update_payload(
        &self,
        plan: &DynamicValue,
        _prior: &DynamicValue,
    ) -> Result<Cluster, GalaxyError> {
        Ok(Cluster {
            cloud_region_id: None,
            private_link_cluster: None,
            ..self.payload(plan)?
        })
    }

    fn fold(&self, cluster: Cluster) -> DynamicValue {
        StateBuilder::new()
            .string("cluster_id", cluster.cluster_id.as_deref())
            .string("name", cluster.name.as_deref())
            .string("cloud_region_id", cluster.cloud_region_id.as_deref())
            .int("min_workers", cluster.min_workers)
            .int("max_workers", cluster.max_workers)
            .int("idle_stop_minutes", cluster.idle_stop_minutes)
            .bool("private_link_cluster", cluster.private_link_cluster)
            .bool("result_cache_enabled", cluster.result_cache_enabled)
            .int(
                "result_cache_default_visibility_seconds",
                cluster.result_cache_default_visibility_seconds,
            )
            .bool("warp_resiliency_enabled", cluster.warp_resiliency_enabled)
            .strings("catalog_refs", cluster.catalog_refs.as_deref())
            // null stays null even when WarpSpeed was requested
            .string("processing_mode", cluster.processing_mode.as_deref())
            .string("cluster_state", cluster.cluster_state.as_deref())
            .string("trino_uri", cluster.trino_uri.as_deref())
            .build()
    }
}
