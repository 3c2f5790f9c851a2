// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Package metadata lookup.
//!
//! A release needs two facts about the package being released: its name and
//! its current version. Both are read from the package metadata file in the
//! module root. An npm style `package.json` is preferred. A Cargo style
//! `Cargo.toml` is used if no `package.json` exists.

use serde::Deserialize;
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Name of npm package metadata file.
pub const PACKAGE_JSON: &str = "package.json";

/// Name of Cargo package metadata file.
pub const CARGO_TOML: &str = "Cargo.toml";

/// Name and version of a package.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub version: String,
}

#[derive(Deserialize)]
struct CargoManifest {
    package: Manifest,
}

impl Manifest {
    /// Load package metadata from module root.
    ///
    /// # Errors
    ///
    /// - Return [`ManifestError::NotFound`] if the module root contains no
    ///   metadata file.
    /// - Return [`ManifestError::Read`] if the metadata file cannot be read.
    /// - Return [`ManifestError::Json`] or [`ManifestError::Toml`] if the
    ///   metadata file lacks a name or version.
    #[instrument(skip(module_root), level = "debug")]
    pub fn load(module_root: impl AsRef<Path>) -> Result<Self> {
        let package_json = module_root.as_ref().join(PACKAGE_JSON);
        if package_json.is_file() {
            debug!("read package metadata from {:?}", package_json.display());
            let data = read(&package_json)?;
            return Self::from_package_json(&data).map_err(|source| ManifestError::Json {
                source,
                path: package_json,
            });
        }

        let cargo_toml = module_root.as_ref().join(CARGO_TOML);
        if cargo_toml.is_file() {
            debug!("read package metadata from {:?}", cargo_toml.display());
            let data = read(&cargo_toml)?;
            return Self::from_cargo_toml(&data).map_err(|source| ManifestError::Toml {
                source,
                path: cargo_toml,
            });
        }

        Err(ManifestError::NotFound {
            module_root: module_root.as_ref().to_path_buf(),
        })
    }

    /// Parse `package.json` contents.
    pub fn from_package_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    /// Parse `Cargo.toml` contents.
    pub fn from_cargo_toml(data: &str) -> Result<Self, toml::de::Error> {
        toml::de::from_str::<CargoManifest>(data).map(|manifest| manifest.package)
    }
}

fn read(path: &Path) -> Result<String> {
    read_to_string(path).map_err(|source| ManifestError::Read {
        source,
        path: path.to_path_buf(),
    })
}

/// Package metadata error types.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// No metadata file in module root.
    #[error("no package.json or Cargo.toml found in {:?}", module_root.display())]
    NotFound { module_root: PathBuf },

    /// Metadata file cannot be read.
    #[error("failed to read package metadata at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// JSON metadata cannot be parsed.
    #[error("failed to parse package metadata at {:?}", path.display())]
    Json {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },

    /// TOML metadata cannot be parsed.
    #[error("failed to parse package metadata at {:?}", path.display())]
    Toml {
        #[source]
        source: toml::de::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ManifestError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[test]
    fn parse_package_json() -> anyhow::Result<()> {
        let result = Manifest::from_package_json(indoc! {r#"
            {
                "name": "blah",
                "version": "1.2.3",
                "private": false,
                "scripts": { "test": "node tests/all.js" }
            }
        "#})?;
        let expect = Manifest {
            name: "blah".into(),
            version: "1.2.3".into(),
        };
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn parse_cargo_toml() -> anyhow::Result<()> {
        let result = Manifest::from_cargo_toml(indoc! {r#"
            [package]
            name = "blah"
            version = "0.4.0"
            edition = "2021"

            [dependencies]
            serde = "1"
        "#})?;
        let expect = Manifest {
            name: "blah".into(),
            version: "0.4.0".into(),
        };
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn parse_package_json_without_version() {
        assert!(Manifest::from_package_json(r#"{"name": "blah"}"#).is_err());
    }

    #[sealed_test]
    fn load_prefers_package_json() -> anyhow::Result<()> {
        std::fs::write(PACKAGE_JSON, r#"{"name": "npm-blah", "version": "1.0.0"}"#)?;
        std::fs::write(CARGO_TOML, "[package]\nname = \"cargo-blah\"\nversion = \"2.0.0\"\n")?;

        let result = Manifest::load(".")?;
        assert_eq!(result.name, "npm-blah");
        assert_eq!(result.version, "1.0.0");

        Ok(())
    }

    #[sealed_test]
    fn load_falls_back_to_cargo_toml() -> anyhow::Result<()> {
        std::fs::write(CARGO_TOML, "[package]\nname = \"cargo-blah\"\nversion = \"2.0.0\"\n")?;

        let result = Manifest::load(".")?;
        assert_eq!(result.name, "cargo-blah");
        assert_eq!(result.version, "2.0.0");

        Ok(())
    }

    #[sealed_test]
    fn load_without_metadata_fails() {
        let result = Manifest::load(".");
        assert!(matches!(result, Err(ManifestError::NotFound { .. })));
    }
}
