//! Shared JSON fixtures for integration tests and benches.
//!
//! Fixtures live in `fixtures/` at the workspace root and are indexed by
//! `fixtures/manifest.json`, one map of name -> relative path per document kind.

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
    motions: HashMap<String, String>,
    expressions: HashMap<String, String>,
    poses: HashMap<String, String>,
    physics: HashMap<String, String>,
    models: HashMap<String, String>,
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

fn lookup<'a>(map: &'a HashMap<String, String>, kind: &str, name: &str) -> Result<&'a str> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

macro_rules! fixture_kind {
    ($module:ident, $field:ident, $kind:literal) => {
        pub mod $module {
            use super::*;

            pub fn keys() -> Vec<String> {
                MANIFEST.$field.keys().cloned().collect()
            }

            pub fn json(name: &str) -> Result<String> {
                read_to_string(lookup(&MANIFEST.$field, $kind, name)?)
            }

            pub fn path(name: &str) -> Result<PathBuf> {
                Ok(resolve_path(lookup(&MANIFEST.$field, $kind, name)?))
            }
        }
    };
}

fixture_kind!(motions, motions, "motion");
fixture_kind!(expressions, expressions, "expression");
fixture_kind!(poses, poses, "pose");
fixture_kind!(physics, physics, "physics");
fixture_kind!(models, models, "model");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_entry_exists() {
        for (kind, map) in [
            ("motion", &MANIFEST.motions),
            ("expression", &MANIFEST.expressions),
            ("pose", &MANIFEST.poses),
            ("physics", &MANIFEST.physics),
            ("model", &MANIFEST.models),
        ] {
            for (name, rel) in map {
                assert!(resolve_path(rel).is_file(), "{kind} fixture '{name}' missing");
            }
        }
    }

    #[test]
    fn unknown_names_are_errors() {
        assert!(motions::json("nope").is_err());
        assert!(motions::json("angle-sweep").is_ok());
    }
}
