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

//! Metric namespaces
//!
//! A namespace is the ordered path `/<vendor>/<domain>/<plugin>/<tenant>/<metric>`.
//! [`MetricDescriptor`] is its typed form; positional parsing only happens in
//! [`MetricDescriptor::from_namespace`].

use crate::PLUGIN_NAME;
use crate::error::{CollectorError, Result};
use neutron_openstack::ResourceKind;
use serde::{Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

pub const VENDOR: &str = "intel";
pub const DOMAIN: &str = "openstack";

/// Number of segments in a metric namespace
pub const NS_LENGTH: usize = 5;

/// Prefix of quota metric names
pub const QUOTA_PREFIX: &str = "quotas_";

const SEPARATOR: char = '/';
const TENANT_IDX: usize = 3;
const METRIC_IDX: usize = 4;

/// Ordered namespace segments
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Namespace {
    segments: Vec<String>,
}

impl Namespace {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Namespace of a plugin metric for one tenant
    pub fn metric(tenant: &str, metric_name: &str) -> Self {
        Self::new([VENDOR, DOMAIN, PLUGIN_NAME, tenant, metric_name])
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{SEPARATOR}{segment}")?;
        }
        Ok(())
    }
}

/// Parses with or without the leading separator
impl FromStr for Namespace {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.strip_prefix(SEPARATOR).unwrap_or(s);
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self::new(trimmed.split(SEPARATOR)))
    }
}

impl Serialize for Namespace {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What a metric measures
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Number of resources of a kind owned by the tenant
    Count(ResourceKind),
    /// Quota limit of the named kind, e.g. `network`
    Quota(String),
}

impl MetricKind {
    /// Last namespace segment for this metric
    pub fn metric_name(&self) -> String {
        match self {
            MetricKind::Count(kind) => kind.metric_name().to_string(),
            MetricKind::Quota(quota) => format!("{QUOTA_PREFIX}{quota}"),
        }
    }

    /// `None` when the name is neither a count metric nor prefixed with `quotas_`
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(kind) = ResourceKind::from_metric_name(name) {
            return Some(MetricKind::Count(kind));
        }
        name.strip_prefix(QUOTA_PREFIX)
            .filter(|quota| !quota.is_empty())
            .map(|quota| MetricKind::Quota(quota.to_string()))
    }
}

/// Typed identity of a plugin metric
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricDescriptor {
    pub tenant: String,
    pub kind: MetricKind,
}

impl MetricDescriptor {
    pub fn count(tenant: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            tenant: tenant.into(),
            kind: MetricKind::Count(kind),
        }
    }

    pub fn quota(tenant: impl Into<String>, quota: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            kind: MetricKind::Quota(quota.into()),
        }
    }

    pub fn namespace(&self) -> Namespace {
        Namespace::metric(&self.tenant, &self.kind.metric_name())
    }

    /// Recover the descriptor from namespace segments
    ///
    /// Only the segment count, the tenant and the metric name are inspected.
    pub fn from_namespace(ns: &Namespace) -> Result<Self> {
        if ns.len() != NS_LENGTH {
            return Err(CollectorError::MalformedNamespace {
                namespace: ns.to_string(),
                reason: format!("expected {NS_LENGTH} segments, got {}", ns.len()),
            });
        }

        let segments = ns.segments();
        let kind = MetricKind::parse(&segments[METRIC_IDX]).ok_or_else(|| CollectorError::MalformedNamespace {
            namespace: ns.to_string(),
            reason: format!("unknown metric, prefix '{QUOTA_PREFIX}' is desired"),
        })?;

        Ok(Self {
            tenant: segments[TENANT_IDX].clone(),
            kind,
        })
    }
}

impl fmt::Display for MetricDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.namespace(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(s: &str) -> Namespace {
        s.parse().unwrap()
    }

    #[test]
    fn test_namespace_display_and_parse() {
        let namespace = Namespace::metric("admin", "networks_count");
        assert_eq!(namespace.to_string(), "/intel/openstack/neutron/admin/networks_count");
        assert_eq!(ns("/intel/openstack/neutron/admin/networks_count"), namespace);
        assert_eq!(ns("intel/openstack/neutron/admin/networks_count"), namespace);
        assert!(ns("").is_empty());
        assert!(ns("/").is_empty());
    }

    #[test]
    fn test_metric_kind_parse() {
        assert_eq!(MetricKind::parse("ports_count"), Some(MetricKind::Count(ResourceKind::Ports)));
        assert_eq!(
            MetricKind::parse("quotas_security_group_rule"),
            Some(MetricKind::Quota("security_group_rule".to_string()))
        );
        assert_eq!(MetricKind::parse("quotas_"), None);
        assert_eq!(MetricKind::parse("volumes_count"), None);
        assert_eq!(MetricKind::Quota("port".to_string()).metric_name(), "quotas_port");
    }

    #[test]
    fn test_descriptor_from_namespace() {
        let desc = MetricDescriptor::from_namespace(&ns("/intel/openstack/neutron/demo/quotas_network")).unwrap();
        assert_eq!(desc, MetricDescriptor::quota("demo", "network"));
        assert_eq!(desc.namespace().to_string(), "/intel/openstack/neutron/demo/quotas_network");

        let desc = MetricDescriptor::from_namespace(&ns("/intel/openstack/neutron/demo/floatingips_count")).unwrap();
        assert_eq!(desc, MetricDescriptor::count("demo", ResourceKind::FloatingIps));
    }

    #[test]
    fn test_descriptor_rejects_malformed() {
        let err = MetricDescriptor::from_namespace(&ns("/intel/openstack/neutron/demo")).unwrap_err();
        assert!(matches!(err, CollectorError::MalformedNamespace { .. }));

        let err = MetricDescriptor::from_namespace(&ns("/intel/openstack/neutron/demo/ports_count/extra")).unwrap_err();
        assert!(matches!(err, CollectorError::MalformedNamespace { .. }));

        let err = MetricDescriptor::from_namespace(&ns("/intel/openstack/neutron/demo/volume_count")).unwrap_err();
        assert!(err.to_string().contains("quotas_"));
    }
}
