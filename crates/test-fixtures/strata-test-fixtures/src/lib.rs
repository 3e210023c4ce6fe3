//! Shared JSON fixtures for engine tests.
//!
//! Fixture documents live under `fixtures/` at the workspace root and are
//! indexed by `fixtures/manifest.json`. Tests request them by logical name
//! and parse them with the engine's own loaders.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    /// Engine configuration documents (parameters/states/blueprints).
    docs: HashMap<String, String>,
    /// Entity seed lists (registration descriptors).
    entities: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn read_fixture(rel: &str) -> Result<String> {
    let path = fixtures_root().join(rel);
    fs::read_to_string(&path).with_context(|| format!("reading fixture {}", path.display()))
}

/// Raw JSON text of an engine document fixture by logical name.
pub fn engine_doc_json(name: &str) -> Result<String> {
    let rel = MANIFEST
        .docs
        .get(name)
        .ok_or_else(|| anyhow!("unknown engine doc fixture '{name}'"))?;
    read_fixture(rel)
}

/// Raw JSON text of an entity seed list fixture by logical name.
pub fn entity_seeds_json(name: &str) -> Result<String> {
    let rel = MANIFEST
        .entities
        .get(name)
        .ok_or_else(|| anyhow!("unknown entity fixture '{name}'"))?;
    read_fixture(rel)
}

/// Logical names of all engine document fixtures.
pub fn engine_doc_names() -> Vec<String> {
    let mut names: Vec<String> = MANIFEST.docs.keys().cloned().collect();
    names.sort();
    names
}
