use super::merge::{merge, replace_entries};
use super::prune::prune_keeping;
use super::remove::{remove, remove_protecting};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use tracing::trace;

pub const PIPELINES: &str = "pipelines";
const EXTENSIONS: &str = "extensions";
const CONNECTORS: &str = "connectors";

/// Sections defining the components a pipeline list refers to. Connectors act both as exporters
/// and as receivers.
const PIPELINE_REFERENCES: [(&str, &[&str]); 3] = [
    ("receivers", &["receivers", CONNECTORS]),
    ("processors", &["processors"]),
    ("exporters", &["exporters", CONNECTORS]),
];

#[derive(Error, Debug)]
#[error("{0}")]
pub struct CollectorConfigError(pub String);

/// Top level sections of a collector configuration that requests are allowed to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Receivers,
    Processors,
    Exporters,
    Service,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Receivers,
        Section::Processors,
        Section::Exporters,
        Section::Service,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Section::Receivers => "receivers",
            Section::Processors => "processors",
            Section::Exporters => "exporters",
            Section::Service => "service",
        }
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Partial collector configuration. Depending on the operation it is applied as an additive
/// patch or as a removal specification. An empty section leaves the stored section untouched.
///
/// Every section is required when deserializing, even if it is an empty mapping.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ConfigPatch {
    pub receivers: Mapping,
    pub processors: Mapping,
    pub exporters: Mapping,
    pub service: Mapping,
}

impl ConfigPatch {
    pub fn section_mut(&mut self, section: Section) -> &mut Mapping {
        match section {
            Section::Receivers => &mut self.receivers,
            Section::Processors => &mut self.processors,
            Section::Exporters => &mut self.exporters,
            Section::Service => &mut self.service,
        }
    }

    pub fn section(&self, section: Section) -> &Mapping {
        match section {
            Section::Receivers => &self.receivers,
            Section::Processors => &self.processors,
            Section::Exporters => &self.exporters,
            Section::Service => &self.service,
        }
    }

    /// Non empty sections in a stable order.
    fn into_sections(self) -> impl Iterator<Item = (Section, Mapping)> {
        [
            (Section::Receivers, self.receivers),
            (Section::Processors, self.processors),
            (Section::Exporters, self.exporters),
            (Section::Service, self.service),
        ]
        .into_iter()
        .filter(|(_, mapping)| !mapping.is_empty())
    }
}

/// The whole OpenTelemetry Collector configuration document.
/// It enforces that the root of the tree is a mapping.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CollectorConfig(Mapping);

impl CollectorConfig {
    /// Deep merges every non empty section of `patch` into the document.
    pub fn apply_update(&mut self, patch: ConfigPatch) {
        for (section, mapping) in patch.into_sections() {
            trace!(%section, "merging section");
            merge(
                Mapping::from_iter([(Value::from(section.key()), Value::Mapping(mapping))]),
                &mut self.0,
            );
        }
    }

    /// Inserts every component named in `patch`, replacing the stored definition of components
    /// that already exist. Under `service`, named pipelines are replaced one by one so the rest of
    /// the pipelines are kept.
    pub fn apply_add(&mut self, patch: ConfigPatch) {
        for (section, mut mapping) in patch.into_sections() {
            trace!(%section, "adding section components");
            let mut stored = take_mapping(&mut self.0, section.key());
            if section == Section::Service {
                if let Some(Value::Mapping(pipelines)) = mapping.shift_remove(PIPELINES) {
                    let mut stored_pipelines = take_mapping(&mut stored, PIPELINES);
                    replace_entries(pipelines, &mut stored_pipelines);
                    stored.insert(Value::from(PIPELINES), Value::Mapping(stored_pipelines));
                }
            }
            replace_entries(mapping, &mut stored);
            self.0
                .insert(Value::from(section.key()), Value::Mapping(stored));
        }
    }

    /// Removes everything `spec` describes section by section, then prunes the vacuous nodes
    /// left behind. The `service.pipelines` mapping itself is never removed, and components still
    /// referenced by the service are never pruned: `batch: {}` is a complete definition.
    pub fn apply_removal(&mut self, spec: &ConfigPatch) {
        for section in Section::ALL {
            let section_spec = spec.section(section);
            if section_spec.is_empty() {
                continue;
            }
            let Some(Value::Mapping(stored)) = self.0.get_mut(section.key()) else {
                trace!(%section, "section absent from the document, nothing to remove");
                continue;
            };
            trace!(%section, "removing from section");
            match section {
                Section::Service => remove_protecting(section_spec, stored, &[PIPELINES]),
                _ => remove(section_spec, stored),
            }
        }
        let referenced = self.referenced_components();
        prune_keeping(&mut self.0, |section, entry| {
            referenced.iter().any(|(referenced_section, name)| {
                section.as_str() == Some(*referenced_section)
                    && entry.as_str() == Some(name.as_str())
            })
        });
    }

    /// Names of the pipelines under `service.pipelines` in stored order.
    pub fn pipeline_names(&self) -> Vec<String> {
        self.pipelines()
            .map(|pipelines| {
                pipelines
                    .keys()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn pipeline(&self, name: &str) -> Option<&Value> {
        self.pipelines().and_then(|pipelines| pipelines.get(name))
    }

    /// Returns the definition of the component `name` in the given section.
    pub fn component(&self, section: Section, name: &str) -> Option<&Value> {
        self.section(section).and_then(|mapping| mapping.get(name))
    }

    pub fn section(&self, section: Section) -> Option<&Mapping> {
        self.0.get(section.key()).and_then(Value::as_mapping)
    }

    fn pipelines(&self) -> Option<&Mapping> {
        self.section(Section::Service)
            .and_then(|service| service.get(PIPELINES))
            .and_then(Value::as_mapping)
    }

    /// `(section, component)` pairs named by the pipelines and by `service.extensions`.
    fn referenced_components(&self) -> Vec<(&'static str, String)> {
        let mut referenced = Vec::new();
        for pipeline in self.pipelines().into_iter().flat_map(Mapping::values) {
            for (list, sections) in PIPELINE_REFERENCES {
                for name in component_names(pipeline.get(list)) {
                    referenced.extend(sections.iter().map(|section| (*section, name.clone())));
                }
            }
        }
        let extensions = self
            .section(Section::Service)
            .and_then(|service| service.get(EXTENSIONS));
        referenced.extend(component_names(extensions).map(|name| (EXTENSIONS, name)));
        referenced
    }
}

fn component_names(list: Option<&Value>) -> impl Iterator<Item = String> + '_ {
    list.and_then(Value::as_sequence)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(String::from)
}

/// Takes the mapping stored at `key`, leaving an empty one in its place. Any non mapping value is
/// discarded.
fn take_mapping(parent: &mut Mapping, key: &str) -> Mapping {
    match parent.get_mut(key) {
        Some(Value::Mapping(mapping)) => std::mem::take(mapping),
        _ => Mapping::new(),
    }
}

impl From<Mapping> for CollectorConfig {
    fn from(value: Mapping) -> Self {
        Self(value)
    }
}

impl TryFrom<&str> for CollectorConfig {
    type Error = CollectorConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // an empty document is a valid, empty, configuration
        if value.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str::<CollectorConfig>(value)
            .map_err(|e| CollectorConfigError(format!("decoding collector config: {e}")))
    }
}

impl TryFrom<&CollectorConfig> for String {
    type Error = CollectorConfigError;

    fn try_from(value: &CollectorConfig) -> Result<Self, Self::Error> {
        serde_yaml::to_string(value)
            .map_err(|e| CollectorConfigError(format!("encoding collector config: {e}")))
    }
}
