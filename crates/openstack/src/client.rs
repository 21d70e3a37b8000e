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

use crate::{KeystoneVersion, NetworkingApi, OpenStackError, QuotaSet, Resource, ResourceKind, Result, Session, Tenant};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, error};
use url::Url;

/// Upper bound on followed pages of one listing
const MAX_PAGES: usize = 10_000;

/// HTTP client for the identity and Neutron APIs of one session
#[derive(Clone)]
pub struct NeutronClient {
    client: Client,
    token: String,
    version: KeystoneVersion,
    identity_base: Url,
    network_base: Url,
}

impl NeutronClient {
    /// Create a client bound to an authenticated session
    ///
    /// Fails when the catalog has no public `network` endpoint.
    pub fn new(session: &Session) -> Result<Self> {
        Ok(Self {
            client: session.http().clone(),
            token: session.token().to_string(),
            version: session.version(),
            identity_base: session.identity_base()?,
            network_base: session.network_base()?,
        })
    }

    pub fn network_base(&self) -> &Url {
        &self.network_base
    }

    pub fn identity_base(&self) -> &Url {
        &self.identity_base
    }

    fn join(base: &Url, path: &str) -> Result<Url> {
        base.join(path).map_err(|e| OpenStackError::parse(format!("{base}{path}"), e))
    }

    async fn get_json(&self, url: &Url, ok_codes: &[StatusCode]) -> Result<Value> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .header("X-Auth-Token", &self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("Request to {} failed: {}", url, e);
                OpenStackError::http(url.as_str(), e)
            })?;

        let status = response.status();
        if !ok_codes.contains(&status) {
            return Err(OpenStackError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| OpenStackError::parse(url.as_str(), e))
    }

    /// Fetch every page of a collection and return the raw items
    ///
    /// A `next` link pointing back at an already fetched page, or a listing
    /// longer than [`MAX_PAGES`], is an error rather than a partial result.
    async fn fetch_all(&self, url: Url, key: &str) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(url);

        while let Some(url) = next.take() {
            if seen.len() >= MAX_PAGES {
                return Err(OpenStackError::parse(url.as_str(), format!("'{key}' listing exceeds {MAX_PAGES} pages")));
            }
            if !seen.insert(url.clone()) {
                return Err(OpenStackError::parse(url.as_str(), format!("'{key}' pagination links loop")));
            }

            let body = self.get_json(&url, &[StatusCode::OK]).await?;

            let page = body
                .get(key)
                .and_then(Value::as_array)
                .ok_or_else(|| OpenStackError::parse(url.as_str(), format!("missing '{key}' list")))?;

            if page.is_empty() {
                break;
            }
            items.extend(page.iter().cloned());

            next = next_link(&body, key)
                .map(|href| url.join(href).map_err(|e| OpenStackError::parse(href, e)))
                .transpose()?;
        }

        debug!("Fetched {} {} in {} page(s)", items.len(), key, seen.len());
        Ok(items)
    }
}

/// Extract the `next` link of a paginated response
///
/// Neutron and Keystone v2.0 use `<key>_links: [{"rel": "next", "href": ...}]`,
/// Keystone v3 uses `links: {"next": ...}`.
pub(crate) fn next_link<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    let linked = body
        .get(format!("{key}_links"))
        .and_then(Value::as_array)
        .and_then(|links| {
            links
                .iter()
                .find(|l| l.get("rel").and_then(Value::as_str) == Some("next"))
                .and_then(|l| l.get("href"))
                .and_then(Value::as_str)
        });

    linked.or_else(|| body.get("links").and_then(|l| l.get("next")).and_then(Value::as_str))
}

#[async_trait]
impl NetworkingApi for NeutronClient {
    async fn list_tenants(&self) -> Result<Vec<Tenant>> {
        let key = match self.version {
            KeystoneVersion::V2_0 => "tenants",
            KeystoneVersion::V3 => "projects",
        };

        let url = Self::join(&self.identity_base, key)?;
        let raw = self.fetch_all(url.clone(), key).await?;

        raw.into_iter()
            .map(|v| serde_json::from_value::<Tenant>(v).map_err(|e| OpenStackError::parse(url.as_str(), e)))
            .collect()
    }

    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<Resource>> {
        let url = Self::join(&self.network_base, kind.path())?;
        let raw = self.fetch_all(url.clone(), kind.path()).await?;

        raw.into_iter()
            .map(|v| serde_json::from_value::<Resource>(v).map_err(|e| OpenStackError::parse(url.as_str(), e)))
            .collect()
    }

    async fn get_quotas(&self, tenant_id: &str) -> Result<QuotaSet> {
        let url = Self::join(&self.network_base, &format!("quotas/{tenant_id}"))?;
        let body = self.get_json(&url, &[StatusCode::OK, StatusCode::MULTIPLE_CHOICES]).await?;

        parse_quota(tenant_id, &body)
    }
}

/// Decode the `quota` object of a quota response
pub(crate) fn parse_quota(tenant_id: &str, body: &Value) -> Result<QuotaSet> {
    body.get("quota")
        .and_then(|q| serde_json::from_value::<QuotaSet>(q.clone()).ok())
        .ok_or_else(|| OpenStackError::MalformedQuota {
            tenant_id: tenant_id.to_string(),
            body: body.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatalogEntry, Endpoint, Interface, ServiceCatalog};
    use serde_json::json;

    #[test]
    fn test_next_link_neutron_style() {
        let body = json!({
            "networks": [],
            "networks_links": [
                {"rel": "previous", "href": "http://neutron/v2.0/networks?marker=a&page_reverse=True"},
                {"rel": "next", "href": "http://neutron/v2.0/networks?marker=b"}
            ]
        });
        assert_eq!(next_link(&body, "networks"), Some("http://neutron/v2.0/networks?marker=b"));
        assert_eq!(next_link(&json!({"networks": []}), "networks"), None);
    }

    #[test]
    fn test_next_link_v3_style() {
        let body = json!({
            "projects": [],
            "links": {"self": "http://keystone/v3/projects", "next": "http://keystone/v3/projects?page=2", "previous": null}
        });
        assert_eq!(next_link(&body, "projects"), Some("http://keystone/v3/projects?page=2"));

        let last = json!({"projects": [], "links": {"next": null}});
        assert_eq!(next_link(&last, "projects"), None);
    }

    #[test]
    fn test_parse_quota() {
        let body = json!({
            "quota": {
                "subnet": 10, "network": 13, "floatingip": 50, "subnetpool": -1,
                "security_group_rule": 100, "security_group": 10, "router": 15,
                "rbac_policy": -1, "port": 50
            }
        });
        let quotas = parse_quota("222222", &body).unwrap();
        assert_eq!(quotas.len(), 9);
        assert_eq!(quotas["subnetpool"], -1);
        assert_eq!(quotas["network"], 13);
    }

    #[test]
    fn test_parse_quota_malformed() {
        let err = parse_quota("111111", &json!({"quotas": {"network": 1}})).unwrap_err();
        assert!(matches!(err, OpenStackError::MalformedQuota { ref tenant_id, .. } if tenant_id == "111111"));

        let err = parse_quota("111111", &json!({"quota": {"network": "many"}})).unwrap_err();
        assert!(matches!(err, OpenStackError::MalformedQuota { .. }));
    }

    #[test]
    fn test_client_requires_network_endpoint() {
        let root = Url::parse("http://keystone:5000/").unwrap();
        let session = Session::new("tok", KeystoneVersion::V2_0, root.clone(), ServiceCatalog::default(), Client::new());
        assert!(matches!(NeutronClient::new(&session), Err(OpenStackError::EndpointNotFound { .. })));

        let catalog = ServiceCatalog::new(vec![CatalogEntry {
            service_type: "network".to_string(),
            name: "neutron".to_string(),
            endpoints: vec![Endpoint {
                interface: Interface::Public,
                url: "http://neutron:9696".to_string(),
                region: None,
            }],
        }]);
        let session = Session::new("tok", KeystoneVersion::V2_0, root, catalog, Client::new());
        let client = NeutronClient::new(&session).unwrap();
        assert_eq!(client.network_base().as_str(), "http://neutron:9696/v2.0/");
        assert_eq!(client.identity_base().as_str(), "http://keystone:5000/v2.0/");
    }
}
