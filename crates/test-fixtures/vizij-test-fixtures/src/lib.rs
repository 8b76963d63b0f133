use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    behaviors: HashMap<String, String>,
    #[serde(default)]
    scenarios: HashMap<String, ScenarioEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScenarioEntry {
    Path(String),
    Detailed { path: String },
}

impl ScenarioEntry {
    fn as_path(&self) -> &str {
        match self {
            ScenarioEntry::Path(path) => path,
            ScenarioEntry::Detailed { path } => path,
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Stored behavior libraries (the JSON accepted by
/// `vizij_behavior_core::parse_stored_library_json`).
pub mod behaviors {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.behaviors.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.behaviors, "behavior", name)?;
        read_to_string(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.behaviors, "behavior", name)?;
        Ok(resolve_path(rel))
    }
}

/// Scripted runs: which behavior to load, the ticks to apply and what to
/// expect along the way.
pub mod scenarios {
    use super::*;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Scenario {
        /// Key into the `behaviors` section of the manifest.
        pub behavior: String,
        /// Group names to activate before the first step.
        pub activate: Vec<String>,
        /// Scripted random draws; empty means the seeded default source.
        #[serde(default)]
        pub random: Vec<f32>,
        pub steps: Vec<Step>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Step {
        pub dt: f32,
        /// `(group, state)` names expected to be active after this step.
        #[serde(default)]
        pub expect_states: Vec<(String, String)>,
        /// Notifications expected from this step, as `"entered:<state>"` or
        /// `"exited:<state>"`, in order.
        #[serde(default)]
        pub expect_notifications: Option<Vec<String>>,
    }

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.scenarios.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.scenarios, "scenario", name)?;
        read_to_string(entry.as_path())
    }

    pub fn load(name: &str) -> Result<Scenario> {
        let entry = lookup(&MANIFEST.scenarios, "scenario", name)?;
        super::load_json(entry.as_path())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.scenarios, "scenario", name)?;
        Ok(resolve_path(entry.as_path()))
    }
}
