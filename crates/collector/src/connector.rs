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
use neutron_openstack::{AuthOptions, NetworkingApi, NeutronClient, Session};

/// Produces sessions and API handles for the collector
#[async_trait]
pub trait Connector: Send + Sync {
    type Api: NetworkingApi;

    async fn authenticate(&self, opts: &AuthOptions) -> neutron_openstack::Result<Session>;

    fn connect(&self, session: &Session) -> neutron_openstack::Result<Self::Api>;
}

/// Connector backed by Keystone and the Neutron HTTP API
#[derive(Debug, Clone, Copy, Default)]
pub struct KeystoneConnector;

#[async_trait]
impl Connector for KeystoneConnector {
    type Api = NeutronClient;

    async fn authenticate(&self, opts: &AuthOptions) -> neutron_openstack::Result<Session> {
        neutron_openstack::authenticate(opts).await
    }

    fn connect(&self, session: &Session) -> neutron_openstack::Result<NeutronClient> {
        NeutronClient::new(session)
    }
}
