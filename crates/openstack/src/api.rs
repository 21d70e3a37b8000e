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

use async_trait::async_trait;

use crate::{QuotaSet, Resource, ResourceKind, Result, Tenant};

/// Read access to the identity and networking APIs
#[async_trait]
pub trait NetworkingApi: Send + Sync {
    /// List every tenant (project) visible to the session
    async fn list_tenants(&self) -> Result<Vec<Tenant>>;

    /// List every resource of a kind, following pagination to the end
    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<Resource>>;

    /// Read the quota limits of a tenant
    async fn get_quotas(&self, tenant_id: &str) -> Result<QuotaSet>;
}
