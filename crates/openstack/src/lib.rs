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

//! Minimal OpenStack client for Neutron accounting
//!
//! This crate authenticates against OpenStack Keystone and reads just
//! enough of the Neutron networking API to account resources per tenant.
//!
//! # Features
//!
//! - Keystone v2.0 and v3 password authentication
//! - Service catalog lookup of the `network` endpoint
//! - Tenant (v2.0) and project (v3) listing
//! - Paginated listing of networks, subnets, routers, ports and floating IPs
//! - Per-tenant quota retrieval
//!
//! # Example
//!
//! ```no_run
//! use neutron_openstack::{AuthOptions, NeutronClient, ResourceKind, authenticate, neutron};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let opts = AuthOptions::new("http://keystone:5000", "admin", "secret", "admin");
//! let session = authenticate(&opts).await?;
//! let client = NeutronClient::new(&session)?;
//!
//! let tenants = neutron::get_all_tenants(&client).await?;
//! let networks = neutron::count_per_tenant(&client, ResourceKind::Networks, &tenants).await?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

pub mod api;
pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod neutron;
pub mod resource;
pub mod session;

pub use api::NetworkingApi;
pub use auth::authenticate;
pub use catalog::{CatalogEntry, Endpoint, Interface, ServiceCatalog};
pub use client::NeutronClient;
pub use config::AuthOptions;
pub use error::{OpenStackError, Result};
pub use resource::{QuotaSet, Resource, ResourceKind};
pub use session::Session;

/// Keystone API version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeystoneVersion {
    /// Keystone API v2.0 (legacy, tenants)
    V2_0,
    /// Keystone API v3 (projects and domains)
    V3,
}

impl KeystoneVersion {
    /// Path segment used by this version
    pub fn path(&self) -> &'static str {
        match self {
            KeystoneVersion::V2_0 => "v2.0",
            KeystoneVersion::V3 => "v3",
        }
    }
}

/// Tenant (project) visible to the authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant name
    pub name: String,
    /// Tenant ID
    pub id: String,
}

impl Tenant {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}
