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

//! Connection settings read from the host config map

use crate::error::{CollectorError, Result};
use crate::plugin::{ConfigMap, ConfigPolicy, ConfigRule, ConfigValue};
use neutron_openstack::AuthOptions;
use neutron_openstack::config::DEFAULT_TIMEOUT_SECONDS;
use std::time::Duration;

pub const CFG_AUTH_URL: &str = "openstack_auth_url";
pub const CFG_USER: &str = "openstack_user";
pub const CFG_PASSWORD: &str = "openstack_password";
pub const CFG_TENANT: &str = "openstack_tenant";
pub const CFG_DOMAIN_NAME: &str = "domain_name";
pub const CFG_DOMAIN_ID: &str = "domain_id";
pub const CFG_REGION: &str = "openstack_region";
pub const CFG_TIMEOUT_SECONDS: &str = "openstack_timeout_seconds";
pub const CFG_INSECURE: &str = "openstack_insecure";

/// Required settings in declaration order
pub const REQUIRED_KEYS: [&str; 4] = [CFG_AUTH_URL, CFG_USER, CFG_PASSWORD, CFG_TENANT];

/// Settings needed to reach the cloud
#[derive(Clone, PartialEq, Eq)]
pub struct PluginConfig {
    pub auth_url: String,
    pub user: String,
    pub password: String,
    pub tenant: String,
    pub domain_name: Option<String>,
    pub domain_id: Option<String>,
    pub region: Option<String>,
    pub timeout: Duration,
    pub insecure: bool,
}

impl std::fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginConfig")
            .field("auth_url", &self.auth_url)
            .field("user", &self.user)
            .field("password", &"***")
            .field("tenant", &self.tenant)
            .field("domain_name", &self.domain_name)
            .field("domain_id", &self.domain_id)
            .field("region", &self.region)
            .field("timeout", &self.timeout)
            .field("insecure", &self.insecure)
            .finish()
    }
}

impl PluginConfig {
    /// Read settings from a config map
    ///
    /// All four required keys missing are reported together.
    pub fn from_config_map(cfg: &ConfigMap) -> Result<Self> {
        let missing: Vec<&str> = REQUIRED_KEYS.iter().copied().filter(|k| !cfg.contains_key(k)).collect();
        if !missing.is_empty() {
            return Err(CollectorError::MissingConfig(missing.join(", ")));
        }

        let required = |key: &str| -> Result<String> {
            cfg.get_str(key)?
                .map(str::to_string)
                .ok_or_else(|| CollectorError::MissingConfig(key.to_string()))
        };
        let optional = |key: &str| -> Result<Option<String>> {
            Ok(cfg.get_str(key)?.filter(|s| !s.is_empty()).map(str::to_string))
        };

        let timeout = match cfg.get(CFG_TIMEOUT_SECONDS) {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            Some(ConfigValue::Int(secs)) if *secs > 0 => Duration::from_secs(*secs as u64),
            Some(ConfigValue::Str(s)) => s
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| CollectorError::invalid(CFG_TIMEOUT_SECONDS, format!("'{s}' is not a positive integer")))?,
            Some(other) => return Err(CollectorError::invalid(CFG_TIMEOUT_SECONDS, format!("{other:?} is not a positive integer"))),
        };

        let insecure = match cfg.get(CFG_INSECURE) {
            None => false,
            Some(ConfigValue::Bool(b)) => *b,
            Some(ConfigValue::Str(s)) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"),
            Some(other) => return Err(CollectorError::invalid(CFG_INSECURE, format!("{other:?} is not a boolean"))),
        };

        Ok(Self {
            auth_url: required(CFG_AUTH_URL)?,
            user: required(CFG_USER)?,
            password: required(CFG_PASSWORD)?,
            tenant: required(CFG_TENANT)?,
            domain_name: optional(CFG_DOMAIN_NAME)?,
            domain_id: optional(CFG_DOMAIN_ID)?,
            region: optional(CFG_REGION)?,
            timeout,
            insecure,
        })
    }

    /// Keystone authentication options for these settings
    pub fn auth_options(&self) -> AuthOptions {
        let mut opts = AuthOptions::new(&self.auth_url, &self.user, &self.password, &self.tenant)
            .with_timeout(self.timeout)
            .with_verify_ssl(!self.insecure);

        if let Some(name) = &self.domain_name {
            opts = opts.with_domain_name(name);
        }
        if let Some(id) = &self.domain_id {
            opts = opts.with_domain_id(id);
        }
        if let Some(region) = &self.region {
            opts = opts.with_region(region);
        }
        opts
    }
}

/// Settings declared to the host
pub fn config_policy() -> ConfigPolicy {
    let mut policy = ConfigPolicy::default();
    policy
        .add(ConfigRule::string(CFG_AUTH_URL, true, "URL for OpenStack Identity endpoint"))
        .add(ConfigRule::string(CFG_USER, true, "user name used to authenticate"))
        .add(ConfigRule::string(CFG_PASSWORD, true, "password used to authenticate"))
        .add(ConfigRule::string(CFG_TENANT, true, "tenant name used to authenticate"))
        .add(ConfigRule::string(CFG_DOMAIN_NAME, false, "Keystone v3 domain name of the user and tenant"))
        .add(ConfigRule::string(CFG_DOMAIN_ID, false, "Keystone v3 domain ID of the user and tenant"));
    policy
}
