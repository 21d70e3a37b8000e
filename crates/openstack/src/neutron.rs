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

//! Per-tenant accounting on top of [`NetworkingApi`]
//!
//! Every map returned here is keyed by tenant *name* and contains every
//! tenant of the given list, with zero for tenants owning nothing.

use crate::{NetworkingApi, QuotaSet, Resource, ResourceKind, Result, Tenant};
use std::collections::HashMap;
use tracing::debug;

/// Retrieve the list of available tenants
pub async fn get_all_tenants<A>(api: &A) -> Result<Vec<Tenant>>
where
    A: NetworkingApi + ?Sized,
{
    let tenants = api.list_tenants().await?;
    debug!("Retrieved {} tenant(s)", tenants.len());
    Ok(tenants)
}

/// Count resources per tenant name
///
/// Tenants sharing a name accumulate into the same entry.
pub fn tally(tenants: &[Tenant], resources: &[Resource]) -> HashMap<String, i64> {
    let mut counts: HashMap<String, i64> = HashMap::with_capacity(tenants.len());

    for tenant in tenants {
        let owned = resources.iter().filter(|r| r.owner() == Some(tenant.id.as_str())).count() as i64;
        *counts.entry(tenant.name.clone()).or_insert(0) += owned;
    }

    counts
}

/// Retrieve the number of resources of one kind per tenant
pub async fn count_per_tenant<A>(api: &A, kind: ResourceKind, tenants: &[Tenant]) -> Result<HashMap<String, i64>>
where
    A: NetworkingApi + ?Sized,
{
    let resources = api.list_resources(kind).await?;
    debug!(kind = %kind, total = resources.len(), "Listed resources");
    Ok(tally(tenants, &resources))
}

/// Retrieve the number of networks per tenant
pub async fn get_network_count_per_tenant<A>(api: &A, tenants: &[Tenant]) -> Result<HashMap<String, i64>>
where
    A: NetworkingApi + ?Sized,
{
    count_per_tenant(api, ResourceKind::Networks, tenants).await
}

/// Retrieve the number of subnets per tenant
pub async fn get_subnets_count_per_tenant<A>(api: &A, tenants: &[Tenant]) -> Result<HashMap<String, i64>>
where
    A: NetworkingApi + ?Sized,
{
    count_per_tenant(api, ResourceKind::Subnets, tenants).await
}

/// Retrieve the number of routers per tenant
pub async fn get_routers_count_per_tenant<A>(api: &A, tenants: &[Tenant]) -> Result<HashMap<String, i64>>
where
    A: NetworkingApi + ?Sized,
{
    count_per_tenant(api, ResourceKind::Routers, tenants).await
}

/// Retrieve the number of ports per tenant
pub async fn get_ports_count_per_tenant<A>(api: &A, tenants: &[Tenant]) -> Result<HashMap<String, i64>>
where
    A: NetworkingApi + ?Sized,
{
    count_per_tenant(api, ResourceKind::Ports, tenants).await
}

/// Retrieve the number of floating IPs per tenant
pub async fn get_floating_ips_count_per_tenant<A>(api: &A, tenants: &[Tenant]) -> Result<HashMap<String, i64>>
where
    A: NetworkingApi + ?Sized,
{
    count_per_tenant(api, ResourceKind::FloatingIps, tenants).await
}

/// Retrieve the quotas of one tenant
pub async fn get_quotas_for_tenant<A>(api: &A, tenant_id: &str) -> Result<QuotaSet>
where
    A: NetworkingApi + ?Sized,
{
    api.get_quotas(tenant_id).await
}

/// Retrieve the quotas of every tenant, stopping at the first failure
pub async fn get_quotas_per_tenant<A>(api: &A, tenants: &[Tenant]) -> Result<HashMap<String, QuotaSet>>
where
    A: NetworkingApi + ?Sized,
{
    let mut quotas = HashMap::with_capacity(tenants.len());

    for tenant in tenants {
        let set = get_quotas_for_tenant(api, &tenant.id).await?;
        quotas.insert(tenant.name.clone(), set);
    }

    Ok(quotas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OpenStackError;
    use async_trait::async_trait;

    fn tenants() -> Vec<Tenant> {
        vec![Tenant::new("demo", "111111"), Tenant::new("admin", "222222")]
    }

    struct StaticApi {
        networks: Vec<Resource>,
        fail_quota_for: Option<&'static str>,
    }

    #[async_trait]
    impl NetworkingApi for StaticApi {
        async fn list_tenants(&self) -> Result<Vec<Tenant>> {
            Ok(tenants())
        }

        async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<Resource>> {
            match kind {
                ResourceKind::Networks => Ok(self.networks.clone()),
                _ => Ok(Vec::new()),
            }
        }

        async fn get_quotas(&self, tenant_id: &str) -> Result<QuotaSet> {
            if self.fail_quota_for == Some(tenant_id) {
                return Err(OpenStackError::MalformedQuota {
                    tenant_id: tenant_id.to_string(),
                    body: "{}".to_string(),
                });
            }
            Ok(QuotaSet::from([("network".to_string(), 10), ("port".to_string(), -1)]))
        }
    }

    #[test]
    fn test_tally_zero_fills_tenants() {
        let resources = vec![
            Resource::new("n1", "111111"),
            Resource::new("n2", "222222"),
            Resource::new("n3", "222222"),
            Resource::new("n4", "999999"),
        ];

        let counts = tally(&tenants(), &resources);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["demo"], 1);
        assert_eq!(counts["admin"], 2);
        assert!(!counts.contains_key("test"));

        let empty = tally(&tenants(), &[]);
        assert_eq!(empty["demo"], 0);
        assert_eq!(empty["admin"], 0);
    }

    #[test]
    fn test_tally_same_name_accumulates() {
        let tenants = vec![Tenant::new("dup", "a"), Tenant::new("dup", "b")];
        let resources = vec![Resource::new("n1", "a"), Resource::new("n2", "b")];
        assert_eq!(tally(&tenants, &resources)["dup"], 2);
    }

    #[tokio::test]
    async fn test_count_per_tenant() {
        let api = StaticApi {
            networks: vec![Resource::new("n1", "222222")],
            fail_quota_for: None,
        };

        let networks = get_network_count_per_tenant(&api, &tenants()).await.unwrap();
        assert_eq!(networks["admin"], 1);
        assert_eq!(networks["demo"], 0);

        let routers = get_routers_count_per_tenant(&api, &tenants()).await.unwrap();
        assert_eq!(routers.values().sum::<i64>(), 0);
        assert_eq!(routers.len(), 2);
    }

    #[tokio::test]
    async fn test_quotas_per_tenant() {
        let api = StaticApi {
            networks: Vec::new(),
            fail_quota_for: None,
        };
        let quotas = get_quotas_per_tenant(&api, &tenants()).await.unwrap();
        assert_eq!(quotas.len(), 2);
        assert_eq!(quotas["admin"]["port"], -1);

        let api = StaticApi {
            networks: Vec::new(),
            fail_quota_for: Some("222222"),
        };
        assert!(get_quotas_per_tenant(&api, &tenants()).await.is_err());
    }
}
