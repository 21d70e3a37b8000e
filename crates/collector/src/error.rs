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

use neutron_openstack::OpenStackError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CollectorError>;

/// Collector errors
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Required settings absent from the config map
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    /// Setting present with the wrong type or an unusable value
    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    /// Namespace cannot be mapped to a metric
    #[error("Incorrect namespace {namespace}: {reason}")]
    MalformedNamespace { namespace: String, reason: String },

    #[error(transparent)]
    OpenStack(#[from] OpenStackError),
}

impl CollectorError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if error is authentication related
    pub fn is_auth_error(&self) -> bool {
        matches!(self, CollectorError::OpenStack(e) if e.is_auth_error())
    }

    /// Check if error is a configuration problem
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CollectorError::MissingConfig(_)
                | CollectorError::InvalidConfig { .. }
                | CollectorError::OpenStack(OpenStackError::ConfigError(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = CollectorError::MissingConfig("openstack_user".to_string());
        assert!(err.is_config_error());
        assert!(!err.is_auth_error());
        assert!(err.to_string().contains("openstack_user"));

        let err: CollectorError = OpenStackError::AuthenticationFailed {
            endpoint: "http://keystone:5000".to_string(),
            username: "admin".to_string(),
            tenant: "admin".to_string(),
            reason: "status 401".to_string(),
        }
        .into();
        assert!(err.is_auth_error());
        assert!(!err.is_config_error());
    }
}
