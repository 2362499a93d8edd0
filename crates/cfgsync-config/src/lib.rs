//! cfgsync-config
//!
//! Round-plan configuration for a match driver.
//!
//! YAML documents are merged in order (later overrides earlier), rendered to
//! canonical JSON and hashed, then decoded into a typed [`MatchConfig`].
//! Absent keys fall back to the default plan: seeded-only, unseeded-only, all.

use anyhow::{bail, Context, Result};
use cfgsync_match::RoundScope;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;

pub const DEFAULT_MAX_ROUNDS: usize = 16;

/// JSON-pointer prefixes read by [`MatchConfig::from_loaded`].
///
/// Keep in sync with the fields of `MatchConfig`; anything outside these is
/// reported by [`report_unused_keys`].
pub const CONSUMED_POINTERS: &[&str] = &["/rounds", "/max_rounds", "/stop_when_idle"];

/// One comparison round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    pub keep_seeded: bool,
    pub keep_unseeded: bool,
}

impl RoundConfig {
    pub fn new(keep_seeded: bool, keep_unseeded: bool) -> Self {
        Self {
            keep_seeded,
            keep_unseeded,
        }
    }

    /// `None` for a round that keeps neither flag.
    pub fn scope(&self) -> Option<RoundScope> {
        RoundScope::from_flags(self.keep_seeded, self.keep_unseeded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Round plan; the last entry repeats until the driver stops.
    pub rounds: Vec<RoundConfig>,
    /// Hard bound on rounds per reconciliation.
    pub max_rounds: usize,
    /// Once past the explicit plan, stop at the first round that confirms nothing.
    pub stop_when_idle: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            rounds: vec![
                RoundConfig::new(true, false),
                RoundConfig::new(false, true),
                RoundConfig::new(true, true),
            ],
            max_rounds: DEFAULT_MAX_ROUNDS,
            stop_when_idle: true,
        }
    }
}

impl MatchConfig {
    /// Decode and validate from a merged config document.
    pub fn from_loaded(loaded: &LoadedConfig) -> Result<Self> {
        let cfg: MatchConfig = serde_json::from_value(loaded.config_json.clone())
            .context("match config decode failed")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            bail!("CONFIG_INVALID max_rounds=0: at least one round is required");
        }
        if self.rounds.is_empty() {
            bail!("CONFIG_INVALID rounds=[]: round plan is empty");
        }
        for (i, r) in self.rounds.iter().enumerate() {
            if r.scope().is_none() {
                bail!(
                    "CONFIG_EMPTY_ROUND round={}: keep_seeded and keep_unseeded are both false",
                    i
                );
            }
        }
        Ok(())
    }

    /// Scope for the zero-based round `n`; past the plan the last entry repeats.
    pub fn scope_for_round(&self, n: usize) -> Option<RoundScope> {
        let last = self.rounds.len().checked_sub(1)?;
        self.rounds[n.min(last)].scope()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Consumed JSON-pointer prefixes used for this analysis (sorted, unique)
    pub consumed_prefixes: Vec<String>,
    /// Unused leaf pointers (sorted)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Report config leaves no `MatchConfig` field reads.
/// `Fail` turns a non-clean report into an error.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let consumed: BTreeSet<String> = CONSUMED_POINTERS
        .iter()
        .map(|p| normalize_pointer(p))
        .collect();
    let consumed_prefixes: Vec<String> = consumed.into_iter().collect();

    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        // An empty document has the single leaf "/" (an empty object).
        .filter(|lp| lp != "/")
        .filter(|lp| !consumed_prefixes.iter().any(|cp| is_prefix_pointer(cp, lp)))
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        consumed_prefixes,
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s) detected. First few: {}",
            report.unused_leaf_pointers.len(),
            preview_list(&report.unused_leaf_pointers, 12)
        );
    }

    Ok(report)
}

fn normalize_pointer(p: &str) -> String {
    let mut s = p.trim().to_string();
    if s.is_empty() {
        return "/".to_string();
    }
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    while s.ends_with('/') && s.len() > 1 {
        s.pop();
    }
    s
}

/// "/a/b" consumes "/a/b" and "/a/b/c" but NOT "/a/bc".
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if prefix == "/" || leaf == prefix {
        return true;
    }
    leaf.strip_prefix(prefix)
        .map(|rest| rest.starts_with('/'))
        .unwrap_or(false)
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) if !map.is_empty() => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) if !arr.is_empty() => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn preview_list(items: &[String], n: usize) -> String {
    let take = items.iter().take(n).cloned().collect::<Vec<_>>();
    format!("{:?}", take)
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    // serde_json's default map is ordered by key, so this is canonical.
    let canonical_json = serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Load, merge and decode in one step.
pub fn load_match_config(paths: &[&str]) -> Result<(MatchConfig, LoadedConfig)> {
    let loaded = load_layered_yaml(paths)?;
    let cfg = MatchConfig::from_loaded(&loaded)?;
    Ok((cfg, loaded))
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        // Arrays (the round plan) are replaced wholesale, never spliced.
        (_, b_other) => b_other,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
