//! cfgsync-testkit
//!
//! Reference round driver plus in-memory fixtures for scenario tests.

use anyhow::{Context, Result};
use cfgsync_match::MatchedMapping;
use std::fs;

mod driver;
pub mod fixtures;

pub use driver::{Comparator, DriverReport, RoundDriver, RoundReport};
pub use fixtures::{ConfigItem, ConfigItemList, NameComparator};

/// Install a fmt subscriber honouring `RUST_LOG` (default `info`).
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_test_writer()
        .try_init();
}

pub fn load_items_json(path: &str) -> Result<ConfigItemList> {
    let s = fs::read_to_string(path).with_context(|| format!("read items: {path}"))?;
    let items: Vec<ConfigItem> = serde_json::from_str(&s).context("parse items json")?;
    Ok(items.into())
}

/// Render a matched mapping as `source_id -> target_id` pairs.
pub fn matched_ids(
    mapping: &MatchedMapping,
    source: &ConfigItemList,
    target: &ConfigItemList,
) -> Vec<(String, String)> {
    mapping
        .iter()
        .filter_map(|(&l, &r)| Some((source.get(l)?.id.clone(), target.get(r)?.id.clone())))
        .collect()
}
