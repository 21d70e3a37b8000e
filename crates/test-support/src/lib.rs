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

//! Fixture cloud for tests
//!
//! Starts an in-process HTTP server on `127.0.0.1:0` that answers like
//! Keystone (v2.0 and v3 token issue, tenant and project listing) and
//! Neutron (resource listing with optional pagination, quota reads).
//! The service catalog points the `network` service back at the same server.
//!
//! The canonical data set has two tenants, `demo` (111111) and `admin`
//! (222222). `admin` owns 2 networks, 3 subnets, 4 routers, 3 ports and
//! 2 floating IPs; `demo` owns 1 network.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const FIXTURE_TOKEN: &str = "2ed210f132564f21b178afb197ee99e3";
pub const FIXTURE_USER: &str = "admin";
pub const FIXTURE_PASSWORD: &str = "secret";
pub const FIXTURE_TENANT: &str = "admin";
pub const DEMO_TENANT_ID: &str = "111111";
pub const ADMIN_TENANT_ID: &str = "222222";

/// Collections served under `/v2.0/`
pub const COLLECTIONS: [&str; 5] = ["networks", "subnets", "routers", "ports", "floatingips"];

static INIT: Once = Once::new();

/// Initialize tracing for tests
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("neutron_openstack=debug,neutron_collector=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Tenants, resources and quotas served by the fixture
#[derive(Debug, Clone, Default)]
pub struct FixtureData {
    /// `(name, id)` pairs
    pub tenants: Vec<(String, String)>,
    /// Collection name to raw resource objects
    pub resources: BTreeMap<String, Vec<Value>>,
    /// Tenant ID to the `quota` object
    pub quotas: BTreeMap<String, Value>,
}

impl FixtureData {
    /// The canonical two-tenant data set
    pub fn canonical() -> Self {
        let mut data = FixtureData {
            tenants: vec![
                ("demo".to_string(), DEMO_TENANT_ID.to_string()),
                ("admin".to_string(), ADMIN_TENANT_ID.to_string()),
            ],
            ..Default::default()
        };

        data.add_resources("networks", DEMO_TENANT_ID, 1);
        data.add_resources("networks", ADMIN_TENANT_ID, 2);
        data.add_resources("subnets", ADMIN_TENANT_ID, 3);
        data.add_resources("routers", ADMIN_TENANT_ID, 4);
        data.add_resources("ports", ADMIN_TENANT_ID, 3);
        data.add_resources("floatingips", ADMIN_TENANT_ID, 2);

        data.quotas.insert(
            ADMIN_TENANT_ID.to_string(),
            json!({
                "subnet": 10,
                "network": 13,
                "floatingip": 50,
                "subnetpool": -1,
                "security_group_rule": 100,
                "security_group": 10,
                "router": 15,
                "rbac_policy": -1,
                "port": 50
            }),
        );
        data.quotas.insert(
            DEMO_TENANT_ID.to_string(),
            json!({
                "subnet": 11,
                "network": 12,
                "floatingip": 51,
                "subnetpool": 0,
                "security_group_rule": 101,
                "security_group": 11,
                "router": 16,
                "rbac_policy": 0,
                "port": 51
            }),
        );

        data
    }

    /// Append `count` resources owned by `tenant_id` to a collection
    pub fn add_resources(&mut self, collection: &str, tenant_id: &str, count: usize) {
        let items = self.resources.entry(collection.to_string()).or_default();
        for _ in 0..count {
            let idx = items.len();
            items.push(json!({
                "id": format!("{collection}-{tenant_id}-{idx}"),
                "name": format!("{collection}-{idx}"),
                "status": "ACTIVE",
                "admin_state_up": true,
                "tenant_id": tenant_id
            }));
        }
    }
}

struct CloudState {
    base: String,
    data: FixtureData,
    page_size: Option<usize>,
    failing: HashSet<String>,
    looping: HashSet<String>,
    reject_auth: bool,
    expires: String,
    auth_requests: AtomicUsize,
    api_requests: AtomicUsize,
}

impl CloudState {
    fn authorized(&self, headers: &HeaderMap) -> bool {
        self.api_requests.fetch_add(1, Ordering::SeqCst);
        headers.get("X-Auth-Token").and_then(|v| v.to_str().ok()) == Some(FIXTURE_TOKEN)
    }

    fn v2_catalog(&self) -> Value {
        json!([{
            "endpoints": [{
                "adminURL": self.base,
                "id": "3ffe125aa59547029ed774c10b932349",
                "internalURL": self.base,
                "publicURL": self.base,
                "region": "RegionOne"
            }],
            "endpoints_links": [],
            "name": "neutron",
            "type": "network"
        }])
    }

    fn v3_catalog(&self) -> Value {
        json!([{
            "type": "network",
            "name": "neutron",
            "endpoints": [
                {"interface": "public", "url": self.base, "region": "RegionOne", "region_id": "RegionOne"},
                {"interface": "internal", "url": self.base, "region": "RegionOne", "region_id": "RegionOne"}
            ]
        }])
    }
}

/// Builder for [`FixtureCloud`]
#[derive(Debug, Clone)]
pub struct FixtureCloudBuilder {
    data: FixtureData,
    page_size: Option<usize>,
    failing: HashSet<String>,
    looping: HashSet<String>,
    reject_auth: bool,
    expires: String,
}

impl Default for FixtureCloudBuilder {
    fn default() -> Self {
        Self {
            data: FixtureData::canonical(),
            page_size: None,
            failing: HashSet::new(),
            looping: HashSet::new(),
            reject_auth: false,
            expires: "2099-02-21T14:28:30Z".to_string(),
        }
    }
}

impl FixtureCloudBuilder {
    pub fn data(mut self, data: FixtureData) -> Self {
        self.data = data;
        self
    }

    /// Split listings into pages linked through `<collection>_links`
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// Answer a collection (or `quotas`) with 500
    pub fn failing(mut self, collection: &str) -> Self {
        self.failing.insert(collection.to_string());
        self
    }

    /// Link the last page of a paginated collection back to the first
    pub fn looping(mut self, collection: &str) -> Self {
        self.looping.insert(collection.to_string());
        self
    }

    /// Answer every token request with 401
    pub fn reject_auth(mut self) -> Self {
        self.reject_auth = true;
        self
    }

    /// Token expiry reported by the identity endpoints
    pub fn expires(mut self, expires: &str) -> Self {
        self.expires = expires.to_string();
        self
    }

    pub async fn start(self) -> std::io::Result<FixtureCloud> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let base = format!("http://{addr}/");

        let state = Arc::new(CloudState {
            base: base.clone(),
            data: self.data,
            page_size: self.page_size,
            failing: self.failing,
            looping: self.looping,
            reject_auth: self.reject_auth,
            expires: self.expires,
            auth_requests: AtomicUsize::new(0),
            api_requests: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/v2.0/tokens", post(v2_tokens))
            .route("/v3/auth/tokens", post(v3_tokens))
            .route("/v2.0/tenants", get(v2_tenants))
            .route("/v3/projects", get(v3_projects))
            .route("/v2.0/quotas/{tenant_id}", get(quotas))
            .route("/v2.0/{collection}", get(collection))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("fixture cloud stopped: {}", e);
            }
        });

        Ok(FixtureCloud { base, state, handle })
    }
}

/// Running fixture cloud; the server stops when this is dropped
pub struct FixtureCloud {
    base: String,
    state: Arc<CloudState>,
    handle: JoinHandle<()>,
}

impl FixtureCloud {
    pub fn builder() -> FixtureCloudBuilder {
        FixtureCloudBuilder::default()
    }

    /// Start with the canonical data set
    pub async fn start() -> std::io::Result<Self> {
        Self::builder().start().await
    }

    /// Identity endpoint, e.g. `http://127.0.0.1:41234/`
    pub fn endpoint(&self) -> &str {
        &self.base
    }

    /// Number of token requests served so far
    pub fn auth_requests(&self) -> usize {
        self.state.auth_requests.load(Ordering::SeqCst)
    }

    /// Number of authenticated API requests served so far
    pub fn api_requests(&self) -> usize {
        self.state.api_requests.load(Ordering::SeqCst)
    }
}

impl Drop for FixtureCloud {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": {"code": 401, "message": "unauthorized"}}))).into_response()
}

fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"NeutronError": {"message": "internal error"}}))).into_response()
}

async fn v2_tokens(State(state): State<Arc<CloudState>>, Json(body): Json<Value>) -> Response {
    state.auth_requests.fetch_add(1, Ordering::SeqCst);

    let creds = &body["auth"]["passwordCredentials"];
    if state.reject_auth || creds["username"] != FIXTURE_USER || creds["password"] != FIXTURE_PASSWORD {
        return unauthorized();
    }

    Json(json!({
        "access": {
            "metadata": {"is_admin": 0, "roles": ["3083d61996d648ca88d6ff420542f324"]},
            "serviceCatalog": state.v2_catalog(),
            "token": {
                "expires": state.expires,
                "id": FIXTURE_TOKEN,
                "issued_at": "2016-02-21T13:28:30.656527",
                "tenant": {
                    "description": null,
                    "enabled": true,
                    "id": "97ea299c37bb4e04b3779039ea8aba44",
                    "name": body["auth"]["tenantName"]
                }
            }
        }
    }))
    .into_response()
}

async fn v3_tokens(State(state): State<Arc<CloudState>>, Json(body): Json<Value>) -> Response {
    state.auth_requests.fetch_add(1, Ordering::SeqCst);

    let user = &body["auth"]["identity"]["password"]["user"];
    if state.reject_auth || user["name"] != FIXTURE_USER || user["password"] != FIXTURE_PASSWORD || user["domain"].is_null() {
        return unauthorized();
    }

    let payload = json!({
        "token": {
            "methods": ["password"],
            "expires_at": state.expires,
            "issued_at": "2016-02-21T13:28:30.000000Z",
            "project": {"id": "97ea299c37bb4e04b3779039ea8aba44", "name": body["auth"]["scope"]["project"]["name"]},
            "catalog": state.v3_catalog()
        }
    });

    (StatusCode::CREATED, [("X-Subject-Token", FIXTURE_TOKEN)], Json(payload)).into_response()
}

fn tenant_list(state: &CloudState) -> Vec<Value> {
    state
        .data
        .tenants
        .iter()
        .map(|(name, id)| json!({"description": format!("{name} tenant"), "enabled": true, "id": id, "name": name}))
        .collect()
}

async fn v2_tenants(State(state): State<Arc<CloudState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"tenants": tenant_list(&state), "tenants_links": []})).into_response()
}

async fn v3_projects(State(state): State<Arc<CloudState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "projects": tenant_list(&state),
        "links": {"self": format!("{}v3/projects", state.base), "next": null, "previous": null}
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<usize>,
}

async fn collection(
    State(state): State<Arc<CloudState>>,
    Path(collection): Path<String>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if !COLLECTIONS.contains(&collection.as_str()) {
        return StatusCode::NOT_FOUND.into_response();
    }
    if state.failing.contains(&collection) {
        return server_error();
    }

    let items = state.data.resources.get(&collection).cloned().unwrap_or_default();
    let links_key = format!("{collection}_links");

    let Some(page_size) = state.page_size else {
        return Json(json!({ collection.as_str(): items })).into_response();
    };

    let page = query.page.unwrap_or(0);
    let chunk: Vec<Value> = items.iter().skip(page * page_size).take(page_size).cloned().collect();

    let mut links = Vec::new();
    if (page + 1) * page_size < items.len() {
        links.push(json!({"rel": "next", "href": format!("{}v2.0/{}?page={}", state.base, collection, page + 1)}));
    } else if state.looping.contains(&collection) {
        links.push(json!({"rel": "next", "href": format!("{}v2.0/{}?page=0", state.base, collection)}));
    }
    if page > 0 {
        links.push(json!({"rel": "previous", "href": format!("{}v2.0/{}?page={}", state.base, collection, page - 1)}));
    }

    Json(json!({ collection.as_str(): chunk, links_key.as_str(): links })).into_response()
}

async fn quotas(State(state): State<Arc<CloudState>>, Path(tenant_id): Path<String>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if state.failing.contains("quotas") {
        return server_error();
    }

    match state.data.quotas.get(&tenant_id) {
        Some(quota) => Json(json!({ "quota": quota })).into_response(),
        None => Json(json!({ "detail": format!("no quota for {tenant_id}") })).into_response(),
    }
}
