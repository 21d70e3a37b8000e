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

//! Neutron collector plugin
//!
//! Publishes per-tenant OpenStack Neutron resource counts and quotas under
//! `/intel/openstack/neutron/<tenant>/<metric>`.
//!
//! The host runtime drives the plugin through [`CollectorPlugin`]:
//!
//! 1. [`CollectorPlugin::get_config_policy`] declares the connection settings
//! 2. [`CollectorPlugin::get_metric_types`] enumerates every available metric
//! 3. [`CollectorPlugin::collect_metrics`] reads current values for a subset
//!
//! [`NeutronPlugin`] is the ready-made implementation; [`NeutronCollector`]
//! holds the logic and takes the session explicitly.

pub mod catalog;
pub mod collector;
pub mod config;
pub mod connector;
pub mod error;
pub mod namespace;
pub mod plugin;

pub use collector::{NeutronCollector, NeutronPlugin};
pub use config::PluginConfig;
pub use connector::{Connector, KeystoneConnector};
pub use error::{CollectorError, Result};
pub use namespace::{MetricDescriptor, MetricKind, Namespace};
pub use plugin::{
    CollectorPlugin, ConfigMap, ConfigPolicy, ConfigRule, ConfigValue, Metric, MetricType, PluginMeta, PluginType,
    RoutingStrategy, plugin_meta,
};

/// Plugin name, also the third namespace segment
pub const PLUGIN_NAME: &str = "neutron";

/// Plugin version reported to the host
pub const PLUGIN_VERSION: u32 = 3;
