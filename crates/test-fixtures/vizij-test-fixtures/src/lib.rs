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
    datasets: HashMap<String, String>,
    boards: HashMap<String, String>,
    transitions: HashMap<String, TransitionEntry>,
}

/// A start/end board pair plus the datasets their classes are bound to.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionEntry {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub datasets: Vec<String>,
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

pub mod datasets {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.datasets.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.datasets, "dataset", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.datasets, "dataset", name)?;
        super::load_json(rel)
    }
}

pub mod boards {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.boards.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.boards, "board", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.boards, "board", name)?;
        super::load_json(rel)
    }
}

pub mod transitions {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.transitions.keys().cloned().collect()
    }

    pub fn entry(name: &str) -> Result<TransitionEntry> {
        lookup(&MANIFEST.transitions, "transition", name).cloned()
    }

    /// `(start board JSON, end board JSON)`
    pub fn boards_json(name: &str) -> Result<(String, String)> {
        let entry = entry(name)?;
        Ok((
            super::boards::json(&entry.start)?,
            super::boards::json(&entry.end)?,
        ))
    }

    /// JSON of every dataset the transition's boards are bound to.
    pub fn datasets_json(name: &str) -> Result<Vec<String>> {
        entry(name)?
            .datasets
            .iter()
            .map(|d| super::datasets::json(d))
            .collect()
    }
}
