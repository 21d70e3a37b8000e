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

//! Keystone service catalog
//!
//! Keystone v2.0 lists one object per region with `publicURL`,
//! `internalURL` and `adminURL` fields, v3 lists one object per interface.
//! Both shapes are normalised into [`ServiceCatalog`].

use crate::{OpenStackError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Endpoint interface (availability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interface {
    Public,
    Internal,
    Admin,
}

impl Interface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interface::Public => "public",
            Interface::Internal => "internal",
            Interface::Admin => "admin",
        }
    }

    /// Parse an interface name, accepting the v2.0 `publicURL` spellings as well
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "public" | "publicurl" => Some(Interface::Public),
            "internal" | "internalurl" => Some(Interface::Internal),
            "admin" | "adminurl" => Some(Interface::Admin),
            _ => None,
        }
    }
}

/// Single service endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub interface: Interface,
    pub url: String,
    pub region: Option<String>,
}

/// Catalog entry for one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Service type, e.g. `network` or `identity`
    pub service_type: String,
    /// Service name, e.g. `neutron`
    pub name: String,
    pub endpoints: Vec<Endpoint>,
}

/// Normalised service catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCatalog {
    pub entries: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
struct V2Entry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    endpoints: Vec<V2Endpoint>,
}

#[derive(Deserialize)]
struct V2Endpoint {
    #[serde(rename = "publicURL")]
    public_url: Option<String>,
    #[serde(rename = "internalURL")]
    internal_url: Option<String>,
    #[serde(rename = "adminURL")]
    admin_url: Option<String>,
    region: Option<String>,
}

#[derive(Deserialize)]
struct V3Entry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    endpoints: Vec<V3Endpoint>,
}

#[derive(Deserialize)]
struct V3Endpoint {
    interface: String,
    url: String,
    region: Option<String>,
    region_id: Option<String>,
}

impl ServiceCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Parse the `access.serviceCatalog` array of a v2.0 token response
    pub fn from_v2(value: &serde_json::Value) -> Result<Self> {
        let raw: Vec<V2Entry> = serde_json::from_value(value.clone()).map_err(|e| OpenStackError::parse("serviceCatalog", e))?;

        let entries = raw
            .into_iter()
            .map(|entry| {
                let endpoints = entry
                    .endpoints
                    .into_iter()
                    .flat_map(|ep| {
                        let region = ep.region;
                        [
                            (Interface::Public, ep.public_url),
                            (Interface::Internal, ep.internal_url),
                            (Interface::Admin, ep.admin_url),
                        ]
                        .into_iter()
                        .filter_map(move |(interface, url)| {
                            url.map(|url| Endpoint {
                                interface,
                                url,
                                region: region.clone(),
                            })
                        })
                    })
                    .collect();

                CatalogEntry {
                    service_type: entry.service_type,
                    name: entry.name,
                    endpoints,
                }
            })
            .collect();

        Ok(Self { entries })
    }

    /// Parse the `token.catalog` array of a v3 token response
    pub fn from_v3(value: &serde_json::Value) -> Result<Self> {
        let raw: Vec<V3Entry> = serde_json::from_value(value.clone()).map_err(|e| OpenStackError::parse("catalog", e))?;

        let entries = raw
            .into_iter()
            .map(|entry| CatalogEntry {
                service_type: entry.service_type,
                name: entry.name,
                endpoints: entry
                    .endpoints
                    .into_iter()
                    .filter_map(|ep| {
                        Interface::parse(&ep.interface).map(|interface| Endpoint {
                            interface,
                            url: ep.url,
                            region: ep.region_id.or(ep.region),
                        })
                    })
                    .collect(),
            })
            .collect();

        Ok(Self { entries })
    }

    /// Look up the endpoint URL of a service
    ///
    /// The first endpoint matching type, interface and (when given) region wins.
    pub fn endpoint_url(&self, service_type: &str, interface: Interface, region: Option<&str>) -> Result<Url> {
        let endpoint = self
            .entries
            .iter()
            .filter(|entry| entry.service_type == service_type)
            .flat_map(|entry| entry.endpoints.iter())
            .find(|ep| ep.interface == interface && region.is_none_or(|r| ep.region.as_deref() == Some(r)))
            .ok_or_else(|| OpenStackError::EndpointNotFound {
                service_type: service_type.to_string(),
                interface: interface.as_str().to_string(),
            })?;

        Url::parse(&endpoint.url).map_err(|e| OpenStackError::parse(endpoint.url.clone(), e))
    }
}
