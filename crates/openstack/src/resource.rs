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

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Quota limits of a tenant, keyed by quota kind (`network`, `port`, ...)
///
/// `-1` means unlimited.
pub type QuotaSet = BTreeMap<String, i64>;

/// Neutron resource collections accounted per tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Networks,
    Subnets,
    Routers,
    Ports,
    FloatingIps,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Networks,
        ResourceKind::Subnets,
        ResourceKind::Routers,
        ResourceKind::Ports,
        ResourceKind::FloatingIps,
    ];

    /// Collection path below the Neutron `v2.0/` base, also the JSON list key
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Networks => "networks",
            ResourceKind::Subnets => "subnets",
            ResourceKind::Routers => "routers",
            ResourceKind::Ports => "ports",
            ResourceKind::FloatingIps => "floatingips",
        }
    }

    /// Name of the per-tenant count metric
    pub fn metric_name(&self) -> &'static str {
        match self {
            ResourceKind::Networks => "networks_count",
            ResourceKind::Subnets => "subnets_count",
            ResourceKind::Routers => "routers_count",
            ResourceKind::Ports => "ports_count",
            ResourceKind::FloatingIps => "floatingips_count",
        }
    }

    pub fn from_metric_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.metric_name() == name)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Owned Neutron resource, reduced to what per-tenant accounting needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl Resource {
    pub fn new(id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tenant_id: Some(tenant_id.into()),
            project_id: None,
        }
    }

    /// Owning tenant; newer Neutron releases may only fill `project_id`
    pub fn owner(&self) -> Option<&str> {
        self.tenant_id
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.project_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::from_metric_name(kind.metric_name()), Some(kind));
        }
        assert_eq!(ResourceKind::FloatingIps.path(), "floatingips");
        assert_eq!(ResourceKind::from_metric_name("quotas_port"), None);
    }

    #[test]
    fn test_owner_falls_back_to_project() {
        let r: Resource = serde_json::from_str(r#"{"id": "a", "project_id": "p1", "status": "ACTIVE"}"#).unwrap();
        assert_eq!(r.owner(), Some("p1"));

        let r: Resource = serde_json::from_str(r#"{"id": "b", "tenant_id": "t1", "project_id": "p1"}"#).unwrap();
        assert_eq!(r.owner(), Some("t1"));

        let r: Resource = serde_json::from_str(r#"{"id": "c", "tenant_id": "", "project_id": "p2"}"#).unwrap();
        assert_eq!(r.owner(), Some("p2"));

        let r: Resource = serde_json::from_str(r#"{"id": "d"}"#).unwrap();
        assert_eq!(r.owner(), None);
    }
}
