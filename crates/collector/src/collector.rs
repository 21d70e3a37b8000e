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

use crate::catalog;
use crate::config::{PluginConfig, config_policy};
use crate::connector::{Connector, KeystoneConnector};
use crate::error::Result;
use crate::namespace::{MetricDescriptor, MetricKind};
use crate::plugin::{CollectorPlugin, ConfigMap, ConfigPolicy, Metric, MetricType};
use async_trait::async_trait;
use neutron_openstack::{QuotaSet, ResourceKind, Session, neutron};
use std::collections::HashMap;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

/// Per-tenant values gathered in one collection cycle, keyed by tenant name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub networks: HashMap<String, i64>,
    pub subnets: HashMap<String, i64>,
    pub routers: HashMap<String, i64>,
    pub ports: HashMap<String, i64>,
    pub floating_ips: HashMap<String, i64>,
    pub quotas: HashMap<String, QuotaSet>,
}

impl Snapshot {
    pub fn count(&self, kind: ResourceKind, tenant: &str) -> Option<i64> {
        let counts = match kind {
            ResourceKind::Networks => &self.networks,
            ResourceKind::Subnets => &self.subnets,
            ResourceKind::Routers => &self.routers,
            ResourceKind::Ports => &self.ports,
            ResourceKind::FloatingIps => &self.floating_ips,
        };
        counts.get(tenant).copied()
    }

    pub fn quota(&self, tenant: &str, quota: &str) -> Option<i64> {
        self.quotas.get(tenant).and_then(|q| q.get(quota)).copied()
    }

    pub fn lookup(&self, descriptor: &MetricDescriptor) -> Option<i64> {
        match &descriptor.kind {
            MetricKind::Count(kind) => self.count(*kind, &descriptor.tenant),
            MetricKind::Quota(quota) => self.quota(&descriptor.tenant, quota),
        }
    }
}

/// Neutron collector logic
///
/// The session is owned by the caller: every operation takes the current one
/// (if any) and hands back the one it used, so callers decide where it lives.
#[derive(Debug, Clone, Default)]
pub struct NeutronCollector<C = KeystoneConnector> {
    connector: C,
}

impl<C: Connector> NeutronCollector<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Reuse `session` unless it is absent or expired
    async fn ensure_session(&self, session: Option<Session>, settings: &PluginConfig) -> Result<Session> {
        match session {
            Some(session) if !session.is_expired() => Ok(session),
            previous => {
                if previous.is_some() {
                    info!("Keystone token expired, authenticating again");
                }
                let session = self.connector.authenticate(&settings.auth_options()).await.inspect_err(|e| {
                    warn!(endpoint = %settings.auth_url, user = %settings.user, tenant = %settings.tenant, "{}", e)
                })?;
                Ok(session)
            }
        }
    }

    /// Session for the settings in `cfg`, reusing `session` while it is valid
    pub async fn session(&self, session: Option<Session>, cfg: &ConfigMap) -> Result<Session> {
        let settings = PluginConfig::from_config_map(cfg)?;
        self.ensure_session(session, &settings).await
    }

    /// Enumerate every metric available for the tenants visible with `cfg`
    ///
    /// Yields one metric per quota kind and one per resource count for each
    /// tenant. Any failure aborts the whole enumeration.
    pub async fn get_metric_types(&self, session: Option<Session>, cfg: &ConfigMap) -> Result<(Session, Vec<MetricType>)> {
        let session = self.session(session, cfg).await?;
        let metric_types = self.enumerate(&session, cfg).await?;
        Ok((session, metric_types))
    }

    /// Enumerate metrics with an already authenticated `session`
    pub async fn enumerate(&self, session: &Session, cfg: &ConfigMap) -> Result<Vec<MetricType>> {
        let api = self.connector.connect(session)?;

        let tenants = neutron::get_all_tenants(&api)
            .await
            .inspect_err(|e| warn!("Failed to list tenants: {}", e))?;

        let mut metric_types = Vec::new();

        for tenant in &tenants {
            let quotas = neutron::get_quotas_for_tenant(&api, &tenant.id)
                .await
                .inspect_err(|e| warn!(tenant = %tenant.name, "{}", e))?;

            metric_types.reserve(quotas.len() + ResourceKind::ALL.len());
            for quota in quotas.keys() {
                metric_types.push(metric_type(MetricDescriptor::quota(&tenant.name, quota), cfg));
            }

            for kind in ResourceKind::ALL {
                metric_types.push(metric_type(MetricDescriptor::count(&tenant.name, kind), cfg));
            }
        }

        info!(tenants = tenants.len(), metrics = metric_types.len(), "Enumerated metric types");
        Ok(metric_types)
    }

    /// Gather the per-tenant values of one cycle
    ///
    /// The five listings and the quota reads run concurrently; the first
    /// failure is returned and the other requests are dropped.
    pub async fn snapshot(&self, session: &Session) -> Result<Snapshot> {
        let api = self.connector.connect(session)?;
        let tenants = neutron::get_all_tenants(&api)
            .await
            .inspect_err(|e| warn!("Failed to list tenants: {}", e))?;

        let (networks, subnets, routers, ports, floating_ips, quotas) = tokio::try_join!(
            neutron::get_network_count_per_tenant(&api, &tenants),
            neutron::get_subnets_count_per_tenant(&api, &tenants),
            neutron::get_routers_count_per_tenant(&api, &tenants),
            neutron::get_ports_count_per_tenant(&api, &tenants),
            neutron::get_floating_ips_count_per_tenant(&api, &tenants),
            neutron::get_quotas_per_tenant(&api, &tenants),
        )
        .inspect_err(|e| warn!("Collection aborted: {}", e))?;

        Ok(Snapshot {
            networks,
            subnets,
            routers,
            ports,
            floating_ips,
            quotas,
        })
    }

    /// Read current values of `metric_types`
    ///
    /// Connection settings come from the first metric type. Metric types that
    /// cannot be resolved are skipped with a warning.
    pub async fn collect_metrics(
        &self,
        session: Option<Session>,
        metric_types: &[MetricType],
    ) -> Result<(Option<Session>, Vec<Metric>)> {
        let Some(first) = metric_types.first() else {
            return Ok((session, Vec::new()));
        };

        let session = self.session(session, &first.config).await?;
        let metrics = self.collect(&session, metric_types).await?;
        Ok((Some(session), metrics))
    }

    /// Read current values of `metric_types` with an already authenticated `session`
    pub async fn collect(&self, session: &Session, metric_types: &[MetricType]) -> Result<Vec<Metric>> {
        let snapshot = self.snapshot(session).await?;

        let timestamp = OffsetDateTime::now_utc();
        let metrics: Vec<Metric> = metric_types.iter().filter_map(|mt| resolve(&snapshot, mt, timestamp)).collect();

        debug!(requested = metric_types.len(), collected = metrics.len(), "Collected metrics");
        Ok(metrics)
    }

    pub fn get_config_policy(&self) -> ConfigPolicy {
        config_policy()
    }
}

fn metric_type(descriptor: MetricDescriptor, cfg: &ConfigMap) -> MetricType {
    let info = catalog::info(&descriptor.kind);
    MetricType {
        namespace: descriptor.namespace(),
        descriptor: Some(descriptor),
        config: cfg.clone(),
        description: info.description.to_string(),
        unit: info.unit.to_string(),
    }
}

/// Map a requested metric type to its value in `snapshot`
fn resolve(snapshot: &Snapshot, mt: &MetricType, timestamp: OffsetDateTime) -> Option<Metric> {
    let descriptor = match &mt.descriptor {
        Some(descriptor) => descriptor.clone(),
        None => match MetricDescriptor::from_namespace(&mt.namespace) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(namespace = %mt.namespace, "{}", e);
                return None;
            }
        },
    };

    let Some(data) = snapshot.lookup(&descriptor) else {
        warn!(
            namespace = %mt.namespace,
            tenant = %descriptor.tenant,
            "Incorrect namespace, metric with specified namespace does not exist"
        );
        return None;
    };

    let info = catalog::info(&descriptor.kind);
    Some(Metric {
        namespace: mt.namespace.clone(),
        data,
        timestamp,
        description: info.description.to_string(),
        unit: info.unit.to_string(),
    })
}

/// [`CollectorPlugin`] keeping the session between host calls
#[derive(Debug, Clone, Default)]
pub struct NeutronPlugin<C = KeystoneConnector> {
    collector: NeutronCollector<C>,
    session: Option<Session>,
}

impl NeutronPlugin<KeystoneConnector> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Connector> NeutronPlugin<C> {
    pub fn with_connector(connector: C) -> Self {
        Self {
            collector: NeutronCollector::new(connector),
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Authenticate if needed and keep the session before it is used
    ///
    /// A session obtained here survives a later failure of the same call
    /// unless that failure is an authentication error.
    async fn keep_session(&mut self, cfg: &ConfigMap) -> Result<Session> {
        let result = self.collector.session(self.session.clone(), cfg).await;
        let session = self.forget_on_auth_error(result)?;
        self.session = Some(session.clone());
        Ok(session)
    }

    /// A rejected token is forgotten so the next call authenticates again
    fn forget_on_auth_error<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result
            && e.is_auth_error()
        {
            self.session = None;
        }
        result
    }
}

#[async_trait]
impl<C: Connector> CollectorPlugin for NeutronPlugin<C> {
    async fn get_metric_types(&mut self, cfg: &ConfigMap) -> Result<Vec<MetricType>> {
        let session = self.keep_session(cfg).await?;
        let result = self.collector.enumerate(&session, cfg).await;
        self.forget_on_auth_error(result)
    }

    async fn collect_metrics(&mut self, metric_types: &[MetricType]) -> Result<Vec<Metric>> {
        let Some(first) = metric_types.first() else {
            return Ok(Vec::new());
        };

        let session = self.keep_session(&first.config).await?;
        let result = self.collector.collect(&session, metric_types).await;
        self.forget_on_auth_error(result)
    }

    fn get_config_policy(&self) -> ConfigPolicy {
        self.collector.get_config_policy()
    }
}
