//! Templated pipelines that forward the node metrics of a domain/flavor pair to a Prometheus
//! remote write endpoint.
use super::document::{CollectorConfig, ConfigPatch, Section, PIPELINES};
use serde_yaml::{Mapping, Value};

const PIPELINE_RECEIVERS: [&str; 5] = [
    "kubeletstats",
    "prometheus",
    "otlp",
    "k8s_cluster",
    "hostmetrics",
];
const SHARED_PROCESSORS: [&str; 4] = ["attributes/metrics", "k8sattributes", "resource", "batch"];

/// Names of the collector components that make up a transfer-metrics pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferMetricsPipeline {
    domain_id: String,
    flavor_id: String,
}

impl TransferMetricsPipeline {
    pub fn new(domain_id: impl Into<String>, flavor_id: impl Into<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            flavor_id: flavor_id.into(),
        }
    }

    pub fn pipeline_name(&self) -> String {
        format!("metrics/{}{}", self.domain_id, self.flavor_id)
    }

    pub fn exporter_name(&self) -> String {
        format!("prometheusremotewrite/{}", self.domain_id)
    }

    pub fn filter_name(&self) -> String {
        format!("filter/basicmetrics{}{}", self.domain_id, self.flavor_id)
    }

    /// Filter processor keeping only the metrics of the flavor node.
    fn filter(&self) -> Value {
        let condition = format!(
            r#"resource.attributes["k8s.node.name"] != "{}""#,
            self.flavor_id
        );
        mapping([
            ("error_mode", Value::from("ignore")),
            (
                "metrics",
                mapping([("metric", Value::Sequence(vec![Value::from(condition)]))]),
            ),
        ])
    }

    fn exporter(endpoint: &str) -> Value {
        mapping([("endpoint", Value::from(endpoint))])
    }

    fn pipeline(&self) -> Value {
        let processors = std::iter::once(self.filter_name())
            .chain(SHARED_PROCESSORS.iter().map(|p| p.to_string()))
            .map(Value::from)
            .collect();
        mapping([
            (
                "receivers",
                Value::Sequence(PIPELINE_RECEIVERS.iter().map(|r| Value::from(*r)).collect()),
            ),
            ("processors", Value::Sequence(processors)),
            (
                "exporters",
                Value::Sequence(vec![Value::from(self.exporter_name())]),
            ),
        ])
    }

    /// Patch creating the filter, the exporter and the pipeline.
    pub fn add_patch(&self, exporter_endpoint: &str) -> ConfigPatch {
        let mut patch = ConfigPatch::default();
        patch
            .processors
            .insert(Value::from(self.filter_name()), self.filter());
        patch.exporters.insert(
            Value::from(self.exporter_name()),
            Self::exporter(exporter_endpoint),
        );
        patch.service.insert(
            Value::from(PIPELINES),
            mapping([(self.pipeline_name().as_str(), self.pipeline())]),
        );
        patch
    }

    /// Patch replacing the exporter endpoint and/or the filter definition.
    pub fn update_patch(
        &self,
        new_exporter: Option<&str>,
        new_processors: Option<Mapping>,
    ) -> ConfigPatch {
        let mut patch = ConfigPatch::default();
        if let Some(endpoint) = new_exporter {
            patch
                .exporters
                .insert(Value::from(self.exporter_name()), Self::exporter(endpoint));
        }
        if let Some(processors) = new_processors {
            patch
                .processors
                .insert(Value::from(self.filter_name()), Value::Mapping(processors));
        }
        patch
    }

    /// Removal specification matching exactly the stored pipeline, exporter and filter. The
    /// removal engine empties them and the pruner drops them, as nothing references them anymore.
    pub fn removal_spec(&self, config: &CollectorConfig) -> ConfigPatch {
        let mut spec = ConfigPatch::default();
        let pipeline_name = self.pipeline_name();
        if let Some(pipeline) = config.pipeline(&pipeline_name) {
            spec.service.insert(
                Value::from(PIPELINES),
                mapping([(pipeline_name.as_str(), pipeline.clone())]),
            );
        }
        for (section, name) in [
            (Section::Exporters, self.exporter_name()),
            (Section::Processors, self.filter_name()),
        ] {
            if let Some(component) = config.component(section, &name) {
                spec.section_mut(section)
                    .insert(Value::from(name), component.clone());
            }
        }
        spec
    }
}

fn mapping<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> Value {
    Value::Mapping(
        entries
            .into_iter()
            .map(|(key, value)| (Value::from(key), value))
            .collect(),
    )
}
