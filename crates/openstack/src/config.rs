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

use crate::{KeystoneVersion, OpenStackError, Result};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Default Keystone domain used when neither a domain name nor an id is configured
pub const DEFAULT_DOMAIN: &str = "Default";

/// Default request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Password authentication options
#[derive(Clone)]
pub struct AuthOptions {
    /// Keystone endpoint (e.g., http://keystone:5000 or http://keystone:5000/v3)
    pub identity_endpoint: String,

    /// User name
    pub username: String,

    /// Password
    pub password: String,

    /// Tenant/project name to scope the token to
    pub tenant_name: String,

    /// Domain name (selects Keystone v3)
    pub domain_name: Option<String>,

    /// Domain ID (selects Keystone v3, wins over the name)
    pub domain_id: Option<String>,

    /// Restrict catalog lookups to this region
    pub region: Option<String>,

    /// Verify SSL certificates
    pub verify_ssl: bool,

    /// Request timeout
    pub timeout: Duration,
}

impl AuthOptions {
    pub fn new(
        identity_endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        tenant_name: impl Into<String>,
    ) -> Self {
        Self {
            identity_endpoint: identity_endpoint.into(),
            username: username.into(),
            password: password.into(),
            tenant_name: tenant_name.into(),
            domain_name: None,
            domain_id: None,
            region: None,
            verify_ssl: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    pub fn with_domain_name(mut self, domain_name: impl Into<String>) -> Self {
        self.domain_name = Some(domain_name.into()).filter(|d: &String| !d.is_empty());
        self
    }

    pub fn with_domain_id(mut self, domain_id: impl Into<String>) -> Self {
        self.domain_id = Some(domain_id.into()).filter(|d: &String| !d.is_empty());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into()).filter(|r: &String| !r.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    fn parse_endpoint(&self) -> Result<Url> {
        Url::parse(self.identity_endpoint.trim())
            .map_err(|e| OpenStackError::ConfigError(format!("Invalid identity endpoint '{}': {}", self.identity_endpoint, e)))
    }

    /// Keystone API version to authenticate with
    ///
    /// An explicit `/v3` or `/v2.0` suffix on the endpoint wins. Otherwise a
    /// configured domain selects v3 and everything else falls back to v2.0.
    pub fn version(&self) -> Result<KeystoneVersion> {
        let url = self.parse_endpoint()?;
        match last_segment(&url) {
            Some("v3") => Ok(KeystoneVersion::V3),
            Some("v2.0") => Ok(KeystoneVersion::V2_0),
            _ if self.domain_id.is_some() || self.domain_name.is_some() => Ok(KeystoneVersion::V3),
            _ => Ok(KeystoneVersion::V2_0),
        }
    }

    /// Identity endpoint with any version suffix removed, always ending in `/`
    pub fn identity_root(&self) -> Result<Url> {
        let mut url = self.parse_endpoint()?;
        let mut segments: Vec<String> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).map(String::from).collect())
            .unwrap_or_default();

        if matches!(segments.last().map(String::as_str), Some("v3" | "v2.0")) {
            segments.pop();
        }

        let mut path = segments.join("/");
        if !path.is_empty() {
            path.push('/');
        }
        url.set_path(&format!("/{path}"));
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }

    /// Validate required fields
    pub fn validate(&self) -> Result<()> {
        if self.identity_endpoint.trim().is_empty() {
            return Err(OpenStackError::ConfigError("identity endpoint is required".to_string()));
        }
        if self.username.is_empty() {
            return Err(OpenStackError::ConfigError("username is required".to_string()));
        }

        self.parse_endpoint()?;

        if self.tenant_name.is_empty() {
            tracing::warn!("No tenant configured - the issued token will be unscoped");
        }

        Ok(())
    }
}

impl fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthOptions")
            .field("identity_endpoint", &self.identity_endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("tenant_name", &self.tenant_name)
            .field("domain_name", &self.domain_name)
            .field("domain_id", &self.domain_id)
            .field("region", &self.region)
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn last_segment(url: &Url) -> Option<&str> {
    url.path_segments()?.filter(|s| !s.is_empty()).next_back()
}
