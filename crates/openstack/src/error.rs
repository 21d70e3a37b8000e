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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpenStackError>;

/// OpenStack client errors
///
/// Variants carry the request context (endpoint, user, tenant, URL) so the
/// caller can surface it without re-deriving it. Passwords are never stored.
#[derive(Debug, Error)]
pub enum OpenStackError {
    /// Authentication was rejected or could not be completed
    #[error("Authentication failed against {endpoint} for user {username} (tenant {tenant}): {reason}")]
    AuthenticationFailed {
        endpoint: String,
        username: String,
        tenant: String,
        reason: String,
    },

    /// The service catalog has no endpoint for the requested service type
    #[error("No {interface} endpoint for service type '{service_type}' in catalog")]
    EndpointNotFound { service_type: String, interface: String },

    /// Transport level HTTP failure
    #[error("HTTP error requesting {url}: {reason}")]
    HttpError { url: String, reason: String },

    /// Unexpected status code
    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    /// Response parsing error
    #[error("Parse error for {url}: {reason}")]
    ParseError { url: String, reason: String },

    /// Quota response does not contain a `quota` object
    #[error("Incorrect quota response format for tenant {tenant_id}")]
    MalformedQuota { tenant_id: String, body: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl OpenStackError {
    pub(crate) fn http(url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::HttpError {
            url: url.into(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn parse(url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::ParseError {
            url: url.into(),
            reason: err.to_string(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            OpenStackError::HttpError { .. } => true,
            OpenStackError::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if error is authentication related
    pub fn is_auth_error(&self) -> bool {
        match self {
            OpenStackError::AuthenticationFailed { .. } => true,
            OpenStackError::UnexpectedStatus { status, .. } => *status == 401,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = OpenStackError::UnexpectedStatus {
            url: "http://neutron/v2.0/networks".to_string(),
            status: 503,
        };
        assert!(err.is_retryable());
        assert!(!err.is_auth_error());

        let err = OpenStackError::UnexpectedStatus {
            url: "http://neutron/v2.0/networks".to_string(),
            status: 401,
        };
        assert!(!err.is_retryable());
        assert!(err.is_auth_error());

        let err = OpenStackError::MalformedQuota {
            tenant_id: "111111".to_string(),
            body: "{}".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("111111"));
    }

    #[test]
    fn test_auth_error_message_has_context() {
        let err = OpenStackError::AuthenticationFailed {
            endpoint: "http://keystone:5000".to_string(),
            username: "admin".to_string(),
            tenant: "demo".to_string(),
            reason: "status 401".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("http://keystone:5000"));
        assert!(msg.contains("admin"));
        assert!(msg.contains("demo"));
    }
}
