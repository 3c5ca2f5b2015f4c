//! Rule registry and region dispatch.

use crate::policy::RegionConfig;
use crate::rule::{RegionArea, Rule, RuleMeta};
use crate::rules;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("rule id must be a dotted lowercase identifier, got `{0}`")]
    InvalidId(String),

    #[error("rule `{0}` is already registered")]
    Duplicate(String),

    #[error("rule `{id}` is missing required metadata field `{field}`")]
    MissingField { id: String, field: &'static str },

    #[error("rule `{0}` declares no required APIs")]
    NoApis(String),

    #[error("rule `{id}` declares malformed change trigger `{trigger}` (expected `service:Action`)")]
    InvalidTrigger { id: String, trigger: String },
}

#[derive(Default)]
pub struct RuleRegistry {
    rules: BTreeMap<&'static str, Arc<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_rules() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for rule in rules::builtin() {
            registry.register(rule)?;
        }
        Ok(registry)
    }

    /// Validate a rule's metadata and add it.
    pub fn register(&mut self, rule: Arc<dyn Rule>) -> Result<(), RegistryError> {
        validate_meta(rule.meta())?;
        let id = rule.meta().id;
        if self.rules.contains_key(id) {
            return Err(RegistryError::Duplicate(id.to_string()));
        }
        self.rules.insert(id, rule);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.get(id)
    }

    /// Rules in id order.
    pub fn rules(&self) -> impl Iterator<Item = &Arc<dyn Rule>> {
        self.rules.values()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.rules.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn change_triggers(&self, id: &str) -> Option<&'static [&'static str]> {
        self.rules.get(id).map(|r| r.meta().realtime_triggers)
    }

    /// Ids of the rules that declare `event` as a change trigger (case-insensitive).
    pub fn rules_for_trigger(&self, event: &str) -> Vec<&'static str> {
        self.rules
            .values()
            .filter(|r| {
                r.meta()
                    .realtime_triggers
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(event))
            })
            .map(|r| r.meta().id)
            .collect()
    }

    pub fn regions_for(&self, id: &str, regions: &RegionConfig) -> Option<Vec<String>> {
        self.rules
            .get(id)
            .map(|r| resolve_regions(r.meta().regions, regions))
    }
}

/// Regions a rule with the given area is dispatched over, deduplicated in configured order.
pub fn resolve_regions(area: RegionArea, regions: &RegionConfig) -> Vec<String> {
    let source: &[String] = match area {
        RegionArea::All => regions.default.as_slice(),
        RegionArea::Service(service) => regions
            .services
            .get(service)
            .unwrap_or(&regions.default)
            .as_slice(),
        RegionArea::Global => std::slice::from_ref(&regions.global),
    };

    let mut out: Vec<String> = Vec::with_capacity(source.len());
    for region in source {
        if !region.is_empty() && !out.contains(region) {
            out.push(region.clone());
        }
    }
    out
}

fn validate_meta(meta: &RuleMeta) -> Result<(), RegistryError> {
    if !is_valid_id(meta.id) {
        return Err(RegistryError::InvalidId(meta.id.to_string()));
    }

    let required = [
        ("title", meta.title),
        ("category", meta.category),
        ("description", meta.description),
        ("recommended_action", meta.recommended_action),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(RegistryError::MissingField {
                id: meta.id.to_string(),
                field,
            });
        }
    }

    if meta.apis.is_empty() {
        return Err(RegistryError::NoApis(meta.id.to_string()));
    }
    if meta
        .apis
        .iter()
        .any(|api| api.service.is_empty() || api.operation.is_empty())
    {
        return Err(RegistryError::MissingField {
            id: meta.id.to_string(),
            field: "apis",
        });
    }

    for trigger in meta.realtime_triggers {
        let valid = trigger
            .split_once(':')
            .is_some_and(|(service, action)| !service.is_empty() && !action.is_empty());
        if !valid {
            return Err(RegistryError::InvalidTrigger {
                id: meta.id.to_string(),
                trigger: trigger.to_string(),
            });
        }
    }

    Ok(())
}

fn is_valid_id(id: &str) -> bool {
    let mut segments = id.split('.');
    let valid_segment = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    };
    segments.clone().count() >= 2 && segments.all(valid_segment)
}
