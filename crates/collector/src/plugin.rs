// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Host-facing plugin contract
//!
//! The value types exchanged with the collection runtime and the
//! [`CollectorPlugin`] callback trait. Scheduling, serialization and transport
//! belong to the host.

use crate::error::{CollectorError, Result};
use crate::namespace::{MetricDescriptor, Namespace};
use crate::{PLUGIN_NAME, PLUGIN_VERSION};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Content type understood by the host
pub const SNAP_GOB_CONTENT_TYPE: &str = "snap.gob";

/// Single configuration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConfigValue {
    pub fn kind(&self) -> ConfigValueKind {
        match self {
            ConfigValue::Bool(_) => ConfigValueKind::Bool,
            ConfigValue::Int(_) => ConfigValueKind::Int,
            ConfigValue::Float(_) => ConfigValueKind::Float,
            ConfigValue::Str(_) => ConfigValueKind::Str,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Str(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Str(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigValueKind {
    Bool,
    Int,
    Float,
    Str,
}

/// Configuration supplied by the host, keyed by setting name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigMap(BTreeMap<String, ConfigValue>);

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    /// String setting; `Err` when present with another type
    pub fn get_str(&self, key: &str) -> Result<Option<&str>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(ConfigValue::Str(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(CollectorError::invalid(key, format!("expected string, got {:?}", other.kind()))),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Declared configuration setting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigRule {
    pub key: String,
    pub kind: ConfigValueKind,
    pub required: bool,
    pub description: String,
}

impl ConfigRule {
    pub fn string(key: impl Into<String>, required: bool, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: ConfigValueKind::Str,
            required,
            description: description.into(),
        }
    }
}

/// Settings a plugin expects, grouped under a namespace prefix
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigPolicy {
    pub namespace: Vec<String>,
    pub rules: Vec<ConfigRule>,
}

impl ConfigPolicy {
    pub fn add(&mut self, rule: ConfigRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    pub fn rule(&self, key: &str) -> Option<&ConfigRule> {
        self.rules.iter().find(|r| r.key == key)
    }

    /// Required keys absent from `cfg`
    pub fn missing<'a>(&'a self, cfg: &ConfigMap) -> Vec<&'a str> {
        self.rules
            .iter()
            .filter(|r| r.required && !cfg.contains_key(&r.key))
            .map(|r| r.key.as_str())
            .collect()
    }

    /// Validate `cfg` the way the host does before handing it over
    pub fn check(&self, cfg: &ConfigMap) -> Result<()> {
        let missing = self.missing(cfg);
        if !missing.is_empty() {
            return Err(CollectorError::MissingConfig(missing.join(", ")));
        }

        for rule in &self.rules {
            if let Some(value) = cfg.get(&rule.key)
                && value.kind() != rule.kind
            {
                return Err(CollectorError::invalid(
                    &rule.key,
                    format!("expected {:?}, got {:?}", rule.kind, value.kind()),
                ));
            }
        }

        Ok(())
    }
}

/// Metric available for collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricType {
    pub namespace: Namespace,
    /// Typed identity, present for metric types produced by enumeration
    #[serde(skip)]
    pub descriptor: Option<MetricDescriptor>,
    #[serde(skip)]
    pub config: ConfigMap,
    pub description: String,
    pub unit: String,
}

impl MetricType {
    /// Metric type known only by namespace, as handed back by a host
    pub fn from_namespace(namespace: Namespace, config: ConfigMap) -> Self {
        Self {
            namespace,
            descriptor: None,
            config,
            description: String::new(),
            unit: String::new(),
        }
    }
}

/// Collected metric value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub namespace: Namespace,
    pub data: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub description: String,
    pub unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PluginType {
    Collector,
    Processor,
    Publisher,
}

/// How the host routes tasks to plugin instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoutingStrategy {
    LeastRecentlyUsed,
    Sticky,
    ConfigBased,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginMeta {
    pub name: String,
    pub version: u32,
    pub plugin_type: PluginType,
    pub accepted_content_types: Vec<String>,
    pub returned_content_types: Vec<String>,
    pub routing: RoutingStrategy,
}

/// Metadata of the Neutron collector plugin
pub fn plugin_meta() -> PluginMeta {
    PluginMeta {
        name: PLUGIN_NAME.to_string(),
        version: PLUGIN_VERSION,
        plugin_type: PluginType::Collector,
        accepted_content_types: vec![SNAP_GOB_CONTENT_TYPE.to_string()],
        returned_content_types: vec![SNAP_GOB_CONTENT_TYPE.to_string()],
        routing: RoutingStrategy::Sticky,
    }
}

/// Callbacks a collector plugin exposes to the host
#[async_trait]
pub trait CollectorPlugin: Send {
    /// Enumerate every metric available with `cfg`
    async fn get_metric_types(&mut self, cfg: &ConfigMap) -> Result<Vec<MetricType>>;

    /// Read current values of `metric_types`
    async fn collect_metrics(&mut self, metric_types: &[MetricType]) -> Result<Vec<Metric>>;

    fn get_config_policy(&self) -> ConfigPolicy;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ConfigPolicy {
        let mut policy = ConfigPolicy::default();
        policy
            .add(ConfigRule::string("openstack_user", true, "user"))
            .add(ConfigRule::string("openstack_password", true, "password"))
            .add(ConfigRule::string("domain_name", false, "domain"));
        policy
    }

    #[test]
    fn test_policy_check() {
        let cfg = ConfigMap::new().with("openstack_user", "admin");
        assert_eq!(policy().missing(&cfg), vec!["openstack_password"]);

        let err = policy().check(&cfg).unwrap_err();
        assert!(matches!(err, CollectorError::MissingConfig(ref keys) if keys == "openstack_password"));

        let cfg = cfg.with("openstack_password", "secret");
        assert!(policy().check(&cfg).is_ok());

        let cfg = cfg.with("domain_name", 7i64);
        assert!(matches!(policy().check(&cfg), Err(CollectorError::InvalidConfig { .. })));
    }

    #[test]
    fn test_config_map_get_str() {
        let cfg: ConfigMap = [("a", ConfigValue::from("x")), ("b", ConfigValue::from(true))].into_iter().collect();
        assert_eq!(cfg.get_str("a").unwrap(), Some("x"));
        assert_eq!(cfg.get_str("missing").unwrap(), None);
        assert!(cfg.get_str("b").is_err());
    }

    #[test]
    fn test_config_map_deserialize() {
        let cfg: ConfigMap = serde_json::from_str(r#"{"openstack_user": "admin", "openstack_timeout_seconds": 5}"#).unwrap();
        assert_eq!(cfg.get("openstack_user"), Some(&ConfigValue::Str("admin".to_string())));
        assert_eq!(cfg.get("openstack_timeout_seconds"), Some(&ConfigValue::Int(5)));
    }

    #[test]
    fn test_plugin_meta() {
        let meta = plugin_meta();
        assert_eq!(meta.name, "neutron");
        assert_eq!(meta.version, 3);
        assert_eq!(meta.plugin_type, PluginType::Collector);
        assert_eq!(meta.routing, RoutingStrategy::Sticky);
        assert_eq!(meta.accepted_content_types, vec!["snap.gob"]);
    }
}
