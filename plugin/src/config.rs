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

use clap::{Parser, Subcommand};
use neutron_collector::ConfigMap;
use neutron_collector::config::{
    CFG_AUTH_URL, CFG_DOMAIN_ID, CFG_DOMAIN_NAME, CFG_INSECURE, CFG_PASSWORD, CFG_REGION, CFG_TENANT, CFG_TIMEOUT_SECONDS,
    CFG_USER,
};

pub const ENV_AUTH_URL: &str = "NEUTRON_AUTH_URL";
pub const ENV_USER: &str = "NEUTRON_USER";
pub const ENV_PASSWORD: &str = "NEUTRON_PASSWORD";
pub const ENV_TENANT: &str = "NEUTRON_TENANT";
pub const ENV_DOMAIN_NAME: &str = "NEUTRON_DOMAIN_NAME";
pub const ENV_DOMAIN_ID: &str = "NEUTRON_DOMAIN_ID";
pub const ENV_REGION: &str = "NEUTRON_REGION";
pub const ENV_TIMEOUT_SECONDS: &str = "NEUTRON_TIMEOUT_SECONDS";
pub const ENV_INSECURE: &str = "NEUTRON_INSECURE";

pub const ENV_LOG_LEVEL: &str = "NEUTRON_LOG_LEVEL";
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_LOG_JSON: &str = "NEUTRON_LOG_JSON";
pub const DEFAULT_LOG_JSON: bool = false;

/// Neutron collector runner
#[derive(Debug, Parser)]
#[command(name = "neutron-plugin", version, about = "Enumerate or collect OpenStack Neutron metrics once")]
pub struct Opt {
    /// URL for OpenStack Identity endpoint
    #[arg(long, env = ENV_AUTH_URL)]
    pub auth_url: Option<String>,

    /// User name used to authenticate
    #[arg(long, env = ENV_USER)]
    pub user: Option<String>,

    /// Password used to authenticate
    #[arg(long, env = ENV_PASSWORD, hide_env_values = true)]
    pub password: Option<String>,

    /// Tenant name used to authenticate
    #[arg(long, env = ENV_TENANT)]
    pub tenant: Option<String>,

    /// Keystone v3 domain name
    #[arg(long, env = ENV_DOMAIN_NAME)]
    pub domain_name: Option<String>,

    /// Keystone v3 domain ID
    #[arg(long, env = ENV_DOMAIN_ID)]
    pub domain_id: Option<String>,

    /// Only use catalog endpoints of this region
    #[arg(long, env = ENV_REGION)]
    pub region: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = ENV_TIMEOUT_SECONDS)]
    pub timeout_seconds: Option<u64>,

    /// Skip TLS certificate verification
    #[arg(long, env = ENV_INSECURE)]
    pub insecure: bool,

    /// Default log level, RUST_LOG takes precedence
    #[arg(long, env = ENV_LOG_LEVEL, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = ENV_LOG_JSON, default_value_t = DEFAULT_LOG_JSON)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print plugin metadata
    Meta,
    /// Print the configuration policy
    Policy,
    /// Enumerate available metrics
    List,
    /// Enumerate then collect metrics (the default)
    Collect {
        /// Only collect these namespaces, e.g. /intel/openstack/neutron/admin/ports_count
        #[arg(long = "metric")]
        metrics: Vec<String>,
    },
}

impl Opt {
    /// Settings as the host would hand them to the plugin
    pub fn config_map(&self) -> ConfigMap {
        let mut cfg = ConfigMap::new();

        let strings = [
            (CFG_AUTH_URL, &self.auth_url),
            (CFG_USER, &self.user),
            (CFG_PASSWORD, &self.password),
            (CFG_TENANT, &self.tenant),
            (CFG_DOMAIN_NAME, &self.domain_name),
            (CFG_DOMAIN_ID, &self.domain_id),
            (CFG_REGION, &self.region),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                cfg.insert(key, value.as_str());
            }
        }

        if let Some(secs) = self.timeout_seconds {
            cfg.insert(CFG_TIMEOUT_SECONDS, secs as i64);
        }
        if self.insecure {
            cfg.insert(CFG_INSECURE, true);
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neutron_collector::ConfigValue;
    use serial_test::serial;

    const ALL_ENV: [&str; 11] = [
        ENV_AUTH_URL,
        ENV_USER,
        ENV_PASSWORD,
        ENV_TENANT,
        ENV_DOMAIN_NAME,
        ENV_DOMAIN_ID,
        ENV_REGION,
        ENV_TIMEOUT_SECONDS,
        ENV_INSECURE,
        ENV_LOG_LEVEL,
        ENV_LOG_JSON,
    ];

    fn without_env<R>(f: impl FnOnce() -> R) -> R {
        temp_env::with_vars_unset(ALL_ENV, f)
    }

    #[test]
    #[serial]
    fn test_defaults() {
        without_env(|| {
            let opt = Opt::try_parse_from(["neutron-plugin"]).unwrap();
            assert_eq!(opt.log_level, DEFAULT_LOG_LEVEL);
            assert!(!opt.log_json);
            assert!(opt.command.is_none());
            assert!(opt.config_map().is_empty());
        });
    }

    #[test]
    #[serial]
    fn test_env_fallbacks() {
        without_env(|| {
            temp_env::with_vars(
                [
                    (ENV_AUTH_URL, Some("http://keystone:5000/v3")),
                    (ENV_USER, Some("admin")),
                    (ENV_PASSWORD, Some("secret")),
                    (ENV_TENANT, Some("admin")),
                    (ENV_DOMAIN_NAME, Some("Default")),
                    (ENV_TIMEOUT_SECONDS, Some("10")),
                    (ENV_LOG_JSON, Some("true")),
                ],
                || {
                    let opt = Opt::try_parse_from(["neutron-plugin", "list"]).unwrap();
                    assert!(opt.log_json);
                    assert_eq!(opt.command, Some(Command::List));

                    let cfg = opt.config_map();
                    assert_eq!(cfg.get(CFG_AUTH_URL), Some(&ConfigValue::from("http://keystone:5000/v3")));
                    assert_eq!(cfg.get(CFG_DOMAIN_NAME), Some(&ConfigValue::from("Default")));
                    assert_eq!(cfg.get(CFG_TIMEOUT_SECONDS), Some(&ConfigValue::Int(10)));
                    assert!(!cfg.contains_key(CFG_DOMAIN_ID));
                    assert!(!cfg.contains_key(CFG_INSECURE));
                },
            );
        });
    }

    #[test]
    #[serial]
    fn test_flags_override_env() {
        without_env(|| {
            temp_env::with_var(ENV_USER, Some("from-env"), || {
                let opt = Opt::try_parse_from([
                    "neutron-plugin",
                    "--user",
                    "from-flag",
                    "collect",
                    "--metric",
                    "/intel/openstack/neutron/admin/ports_count",
                ])
                .unwrap();
                assert_eq!(opt.user.as_deref(), Some("from-flag"));
                assert_eq!(
                    opt.command,
                    Some(Command::Collect {
                        metrics: vec!["/intel/openstack/neutron/admin/ports_count".to_string()]
                    })
                );
            });
        });
    }
}
