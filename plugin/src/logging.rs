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

use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber
///
/// Logs go to stderr so stdout carries only the JSON output.
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.parse().unwrap_or(Level::INFO.into()))
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if json { subscriber.json().try_init() } else { subscriber.try_init() };
    result.map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    info!("Logging initialized with level: {}", level);
    Ok(())
}
