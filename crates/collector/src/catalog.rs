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

//! Descriptions and units of published metrics

use crate::namespace::MetricKind;
use neutron_openstack::ResourceKind;

/// Description and unit of a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricInfo {
    pub description: &'static str,
    pub unit: &'static str,
}

impl MetricInfo {
    const fn new(description: &'static str) -> Self {
        Self { description, unit: "" }
    }
}

const UNKNOWN: MetricInfo = MetricInfo::new("");

const QUOTA_INFO: &[(&str, MetricInfo)] = &[
    (
        "floatingip",
        MetricInfo::new("number of floating IP addresses allowed for a tenant ( -1 means no limit)"),
    ),
    ("ikepolicy", MetricInfo::new("number of IKE policies allowed for a tenant")),
    ("ipsec_site_connection", MetricInfo::new("number of IPSec connections allowed for a tenant")),
    ("ipsecpolicy", MetricInfo::new("number of IPSec policies allowed for a tenant")),
    ("network", MetricInfo::new("number of networks allowed for a tenant")),
    ("port", MetricInfo::new("number of ports allowed for a tenant")),
    (
        "rbac_policy",
        MetricInfo::new("number of role-based access control (RBAC) policies for a tenant"),
    ),
    ("router", MetricInfo::new("number of routers allowed for a tenant")),
    ("security_group", MetricInfo::new("number of security groups allowed for a tenant")),
    ("security_group_rule", MetricInfo::new("number of security group rules allowed for a tenant")),
    ("subnet", MetricInfo::new("number of subnets allowed for a tenant")),
    ("subnetpool", MetricInfo::new("number of subnet pools allowed for a tenant")),
];

pub fn count_info(kind: ResourceKind) -> MetricInfo {
    match kind {
        ResourceKind::Networks => MetricInfo::new("number of tenant networks"),
        ResourceKind::Subnets => MetricInfo::new("number of tenant subnets"),
        ResourceKind::Routers => MetricInfo::new("number of tenant routers"),
        ResourceKind::Ports => MetricInfo::new("number of tenant ports"),
        ResourceKind::FloatingIps => MetricInfo::new("number of tenant floating IPs"),
    }
}

/// Quota kinds missing from the table get an empty description
pub fn quota_info(quota: &str) -> MetricInfo {
    QUOTA_INFO
        .iter()
        .find(|(name, _)| *name == quota)
        .map(|(_, info)| *info)
        .unwrap_or(UNKNOWN)
}

pub fn info(kind: &MetricKind) -> MetricInfo {
    match kind {
        MetricKind::Count(kind) => count_info(*kind),
        MetricKind::Quota(quota) => quota_info(quota),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_descriptions() {
        assert_eq!(count_info(ResourceKind::FloatingIps).description, "number of tenant floating IPs");
        assert!(ResourceKind::ALL.iter().all(|k| count_info(*k).unit.is_empty()));
    }

    #[test]
    fn test_quota_descriptions() {
        assert_eq!(quota_info("subnetpool").description, "number of subnet pools allowed for a tenant");
        assert_eq!(info(&MetricKind::Quota("network".to_string())).description, "number of networks allowed for a tenant");
        assert_eq!(quota_info("l7policy"), UNKNOWN);
    }
}
