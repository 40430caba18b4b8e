//! Shared fixtures for servo choreography tests and benches.
//!
//! - [`sequences`] and [`saves`] load the JSON files listed in `fixtures/manifest.json`.
//! - [`mock`] provides scripted controllers and a tick rig.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

pub mod mock;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    sequences: HashMap<String, Entry>,
    saves: HashMap<String, Entry>,
}

/// A manifest value is either a bare relative path or `{ "path": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Bare(String),
    Object { path: String },
}

#[derive(Copy, Clone)]
enum Shelf {
    Sequences,
    Saves,
}

impl Shelf {
    fn label(self) -> &'static str {
        match self {
            Shelf::Sequences => "sequence",
            Shelf::Saves => "save",
        }
    }

    fn entries(self) -> &'static HashMap<String, Entry> {
        match self {
            Shelf::Sequences => &MANIFEST.sequences,
            Shelf::Saves => &MANIFEST.saves,
        }
    }

    fn keys(self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn path(self, name: &str) -> Result<PathBuf> {
        let rel = match self.entries().get(name) {
            Some(Entry::Bare(rel)) | Some(Entry::Object { path: rel }) => rel,
            None => return Err(anyhow!("unknown {} fixture '{name}'", self.label())),
        };
        Ok(Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(rel))
    }

    fn text(self, name: &str) -> Result<String> {
        let path = self.path(name)?;
        fs::read_to_string(&path)
            .with_context(|| format!("reading {} fixture {}", self.label(), path.display()))
    }
}

/// Standalone sequences (`Sequence` JSON).
pub mod sequences {
    use super::*;
    use servo_choreo_core::Sequence;

    pub fn keys() -> Vec<String> {
        Shelf::Sequences.keys()
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Shelf::Sequences.path(name)
    }

    pub fn json(name: &str) -> Result<String> {
        Shelf::Sequences.text(name)
    }

    pub fn load(name: &str) -> Result<Sequence> {
        let text = json(name)?;
        serde_json::from_str(&text).with_context(|| format!("parsing sequence fixture '{name}'"))
    }
}

/// Engine saves (`SavedManager` JSON), validated on load.
pub mod saves {
    use super::*;
    use servo_choreo_core::{parse_saved_manager_json, SavedManager};

    pub fn keys() -> Vec<String> {
        Shelf::Saves.keys()
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Shelf::Saves.path(name)
    }

    pub fn json(name: &str) -> Result<String> {
        Shelf::Saves.text(name)
    }

    pub fn load(name: &str) -> Result<SavedManager> {
        let text = json(name)?;
        parse_saved_manager_json(&text).with_context(|| format!("parsing save fixture '{name}'"))
    }
}
