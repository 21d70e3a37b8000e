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

use crate::{Interface, KeystoneVersion, OpenStackError, Result, ServiceCatalog};
use reqwest::Client;
use std::fmt;
use time::OffsetDateTime;
use url::Url;

/// Service type of Neutron in the catalog
pub const NETWORK_SERVICE_TYPE: &str = "network";

/// Authenticated session
///
/// Holds the issued token, the catalog it came with and the HTTP client
/// every follow-up request goes through. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    token: String,
    version: KeystoneVersion,
    identity_root: Url,
    catalog: ServiceCatalog,
    expires_at: Option<OffsetDateTime>,
    region: Option<String>,
    http: Client,
}

impl Session {
    pub fn new(
        token: impl Into<String>,
        version: KeystoneVersion,
        identity_root: Url,
        catalog: ServiceCatalog,
        http: Client,
    ) -> Self {
        Self {
            token: token.into(),
            version,
            identity_root,
            catalog,
            expires_at: None,
            region: None,
            http,
        }
    }

    pub fn with_expiry(mut self, expires_at: Option<OffsetDateTime>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn version(&self) -> KeystoneVersion {
        self.version
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.expires_at
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Check if the token is known to be expired
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| OffsetDateTime::now_utc() >= exp)
    }

    /// Identity API base, e.g. `http://keystone:5000/v2.0/`
    pub fn identity_base(&self) -> Result<Url> {
        self.identity_root
            .join(&format!("{}/", self.version.path()))
            .map_err(|e| OpenStackError::ConfigError(format!("Invalid identity endpoint: {e}")))
    }

    /// Neutron API base, the public `network` endpoint with `v2.0/` appended
    pub fn network_base(&self) -> Result<Url> {
        let mut url = self
            .catalog
            .endpoint_url(NETWORK_SERVICE_TYPE, Interface::Public, self.region.as_deref())?;

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        url.join("v2.0/")
            .map_err(|e| OpenStackError::ConfigError(format!("Invalid network endpoint: {e}")))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("version", &self.version)
            .field("identity_root", &self.identity_root.as_str())
            .field("expires_at", &self.expires_at)
            .field("region", &self.region)
            .finish()
    }
}
