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

//! Keystone password authentication

use crate::config::DEFAULT_DOMAIN;
use crate::{AuthOptions, KeystoneVersion, OpenStackError, Result, ServiceCatalog, Session};
use reqwest::Client;
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error, info};
use url::Url;

/// Authenticate with user name and password
///
/// Returns a [`Session`] carrying the token, its catalog and the HTTP
/// client configured from `opts`.
pub async fn authenticate(opts: &AuthOptions) -> Result<Session> {
    opts.validate()?;

    let http = Client::builder()
        .danger_accept_invalid_certs(!opts.verify_ssl)
        .timeout(opts.timeout)
        .build()
        .map_err(|e| OpenStackError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

    let version = opts.version()?;
    let root = opts.identity_root()?;

    let session = match version {
        KeystoneVersion::V2_0 => authenticate_v2(&http, opts, &root).await?,
        KeystoneVersion::V3 => authenticate_v3(&http, opts, &root).await?,
    };

    info!(
        user = %opts.username,
        tenant = %opts.tenant_name,
        version = version.path(),
        "Keystone authentication successful"
    );

    Ok(session.with_region(opts.region.clone()))
}

fn auth_failed(opts: &AuthOptions, reason: impl Into<String>) -> OpenStackError {
    OpenStackError::AuthenticationFailed {
        endpoint: opts.identity_endpoint.clone(),
        username: opts.username.clone(),
        tenant: opts.tenant_name.clone(),
        reason: reason.into(),
    }
}

fn join(opts: &AuthOptions, root: &Url, path: &str) -> Result<Url> {
    root.join(path).map_err(|e| auth_failed(opts, format!("invalid token URL: {e}")))
}

fn parse_time(value: Option<&Value>) -> Option<OffsetDateTime> {
    value
        .and_then(|v| v.as_str())
        .and_then(|s| OffsetDateTime::parse(s, &Rfc3339).ok())
}

pub(crate) fn v2_payload(opts: &AuthOptions) -> Value {
    let mut payload = json!({
        "auth": {
            "passwordCredentials": {
                "username": opts.username,
                "password": opts.password
            }
        }
    });

    if !opts.tenant_name.is_empty() {
        payload["auth"]["tenantName"] = json!(opts.tenant_name);
    }

    payload
}

pub(crate) fn v3_payload(opts: &AuthOptions) -> Value {
    let domain = match (&opts.domain_id, &opts.domain_name) {
        (Some(id), _) => json!({ "id": id }),
        (None, Some(name)) => json!({ "name": name }),
        (None, None) => json!({ "name": DEFAULT_DOMAIN }),
    };

    let mut payload = json!({
        "auth": {
            "identity": {
                "methods": ["password"],
                "password": {
                    "user": {
                        "name": opts.username,
                        "password": opts.password,
                        "domain": domain
                    }
                }
            }
        }
    });

    if !opts.tenant_name.is_empty() {
        payload["auth"]["scope"] = json!({
            "project": {
                "name": opts.tenant_name,
                "domain": domain
            }
        });
    }

    payload
}

async fn authenticate_v2(http: &Client, opts: &AuthOptions, root: &Url) -> Result<Session> {
    let url = join(opts, root, "v2.0/tokens")?;

    debug!("Authenticating with Keystone v2.0: {}", url);

    let response = http.post(url).json(&v2_payload(opts)).send().await.map_err(|e| {
        error!("Failed to send authentication request: {}", e);
        auth_failed(opts, e.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(auth_failed(opts, format!("status {status}")));
    }

    let body: Value = response.json().await.map_err(|e| auth_failed(opts, e.to_string()))?;

    parse_v2_token(http, opts, root, &body)
}

pub(crate) fn parse_v2_token(http: &Client, opts: &AuthOptions, root: &Url, body: &Value) -> Result<Session> {
    let access = body
        .get("access")
        .ok_or_else(|| auth_failed(opts, "missing access field"))?;

    let token = access
        .get("token")
        .and_then(|t| t.get("id"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| auth_failed(opts, "missing token id"))?;

    let catalog = match access.get("serviceCatalog") {
        Some(value) if !value.is_null() => ServiceCatalog::from_v2(value)?,
        _ => ServiceCatalog::default(),
    };

    let expires_at = parse_time(access.get("token").and_then(|t| t.get("expires")));

    Ok(Session::new(token, KeystoneVersion::V2_0, root.clone(), catalog, http.clone()).with_expiry(expires_at))
}

async fn authenticate_v3(http: &Client, opts: &AuthOptions, root: &Url) -> Result<Session> {
    let url = join(opts, root, "v3/auth/tokens")?;

    debug!("Authenticating with Keystone v3: {}", url);

    let response = http.post(url).json(&v3_payload(opts)).send().await.map_err(|e| {
        error!("Failed to send authentication request: {}", e);
        auth_failed(opts, e.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(auth_failed(opts, format!("status {status}")));
    }

    let token = response
        .headers()
        .get("X-Subject-Token")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| auth_failed(opts, "missing X-Subject-Token header"))?
        .to_string();

    let body: Value = response.json().await.map_err(|e| auth_failed(opts, e.to_string()))?;

    parse_v3_token(http, opts, root, token, &body)
}

pub(crate) fn parse_v3_token(http: &Client, opts: &AuthOptions, root: &Url, token: String, body: &Value) -> Result<Session> {
    let token_data = body.get("token").ok_or_else(|| auth_failed(opts, "missing token field"))?;

    let catalog = match token_data.get("catalog") {
        Some(value) if !value.is_null() => ServiceCatalog::from_v3(value)?,
        _ => ServiceCatalog::default(),
    };

    let expires_at = parse_time(token_data.get("expires_at"));

    Ok(Session::new(token, KeystoneVersion::V3, root.clone(), catalog, http.clone()).with_expiry(expires_at))
}
