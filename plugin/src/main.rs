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

//! Runs the Neutron collector once outside a host runtime.

mod config;
mod logging;

use anyhow::Context;
use clap::Parser;
use config::{Command, Opt};
use neutron_collector::{CollectorPlugin, MetricType, Namespace, NeutronPlugin, plugin_meta};
use serde::Serialize;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present.
    dotenvy::dotenv().ok();

    let opt = Opt::parse();
    logging::init_logging(&opt.log_level, opt.log_json)?;

    let mut plugin = NeutronPlugin::new();
    let command = opt.command.clone().unwrap_or(Command::Collect { metrics: Vec::new() });

    match command {
        Command::Meta => print_json(&plugin_meta()),
        Command::Policy => print_json(&plugin.get_config_policy()),
        Command::List => {
            let cfg = opt.config_map();
            plugin.get_config_policy().check(&cfg)?;

            let metric_types = plugin.get_metric_types(&cfg).await.context("metric enumeration failed")?;
            print_json(&metric_types)
        }
        Command::Collect { metrics } => {
            let cfg = opt.config_map();
            plugin.get_config_policy().check(&cfg)?;

            let requested = if metrics.is_empty() {
                plugin.get_metric_types(&cfg).await.context("metric enumeration failed")?
            } else {
                metrics
                    .iter()
                    .map(|ns| Ok(MetricType::from_namespace(ns.parse::<Namespace>()?, cfg.clone())))
                    .collect::<anyhow::Result<Vec<_>>>()?
            };

            let collected = plugin.collect_metrics(&requested).await.context("metric collection failed")?;
            info!(requested = requested.len(), collected = collected.len(), "Collection finished");
            print_json(&collected)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    std::io::Write::write_all(&mut out, b"\n")?;
    Ok(())
}
