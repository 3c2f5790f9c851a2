// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of publicist's options, and how layers of options are
//! combined into the one [`Config`] that drives a release run. File I/O is
//! left to the caller to figure out.
//!
//! # Layering
//!
//! Every option has a built-in default provided by [`Config::default`].
//! Callers supply overrides as [`Options`], whose fields mirror the fields of
//! [`Config`] but are all optional. Layers are combined field by field, where
//! the later layer wins, and a field left unset falls back to the earlier
//! layer. Template strings are never merged partially.
//!
//! # Option Names
//!
//! Option names are camelCase in every format, e.g., `changesCmd` or
//! `remoteName`. The same names double as template placeholders, so
//! `git push ${remoteName} v${version}` picks up the configured remote.
//! Unknown option names are rejected.

use crate::template::Values;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::PathBuf,
    str::FromStr,
};

macro_rules! release_options {
    ($($(#[$meta:meta])* $field:ident: $kind:ty = $default:expr,)*) => {
        /// Fully resolved release configuration.
        ///
        /// Owned by exactly one release run.
        #[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
        #[serde(rename_all = "camelCase")]
        pub struct Config {
            $($(#[$meta])* pub $field: $kind,)*
        }

        impl Default for Config {
            fn default() -> Self {
                Self {
                    $($field: $default.into(),)*
                }
            }
        }

        impl Config {
            /// Resolve configuration by applying overrides on top of self.
            ///
            /// Fields set in `overrides` replace fields in self. Fields left
            /// unset keep their current value. Neither input is modified.
            pub fn resolve(&self, overrides: &Options) -> Config {
                Config {
                    $($field: overrides.$field.clone().unwrap_or_else(|| self.$field.clone()),)*
                }
            }
        }

        /// Partial release configuration.
        ///
        /// Every field is optional, such that only the options that need to
        /// differ from an earlier layer have to be given.
        #[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
        #[serde(rename_all = "camelCase", deny_unknown_fields)]
        pub struct Options {
            $(
                $(#[$meta])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$kind>,
            )*
        }

        impl Options {
            /// Merge two layers of options into a new layer.
            ///
            /// Fields set in `overrides` win over fields set in self.
            pub fn merge(&self, overrides: &Options) -> Options {
                Options {
                    $($field: overrides.$field.clone().or_else(|| self.$field.clone()),)*
                }
            }
        }
    };
}

release_options! {
    /// Command listing uncommitted changes. Non-empty output aborts a release.
    changes_cmd: String = "git status -s -uno",

    /// Hint shown when uncommitted changes are found.
    changes_hint: String = "Releases must be made from a clean working tree. \
        Commit or stash your local changes before trying again.",

    /// Command verifying that the remote to push tags to exists.
    check_remote_cmd: String = "git ls-remote --exit-code ${remoteName}",

    /// Hint shown when the remote cannot be verified.
    check_remote_hint: String = "The remote \"${remoteName}\" could not be found. \
        Add it with \"git remote add ${remoteName} <url>\", or set the remoteName option.",

    /// Command printing the latest commit timestamp in seconds since epoch.
    raw_timestamp_cmd: String = "git show -s --format=%ct HEAD",

    /// Command printing the latest commit revision.
    revision_cmd: String = "git rev-parse --verify --short HEAD",

    /// Command printing the current branch name.
    branch_cmd: String = "git rev-parse --abbrev-ref HEAD",

    /// Command creating a local archive instead of publishing.
    pack_cmd: String = "npm pack",

    /// Command publishing a standard release.
    publish_cmd: String = "npm publish",

    /// Hint shown when a standard release cannot be published.
    publish_hint: String = "Publishing failed. Ensure that you are logged into the \
        registry, and that version ${version} has not been published already.",

    /// Command publishing a development release.
    publish_dev_cmd: String = "npm publish --tag ${devTag}",

    /// Hint shown when a development release cannot be published.
    publish_dev_hint: String = "Publishing failed. Ensure that you are logged into the \
        registry, and have permission to publish ${packageName}.",

    /// Command setting the version in package metadata without committing.
    version_cmd: String = "npm version --no-git-tag-version ${version}",

    /// Command applying a dist-tag to a published version.
    dist_tag_cmd: String = "npm dist-tag add ${packageName}@${version} ${tag}",

    /// Hint shown when a dist-tag cannot be applied.
    dist_tag_hint: String = "Applying dist-tag \"${tag}\" failed. Ensure that \
        ${packageName}@${version} is published, and that you may modify its tags.",

    /// Command restoring package metadata after a development release.
    clean_cmd: String = "git checkout -- package.json",

    /// Command tagging the current commit with the release version.
    vc_tag_cmd: String = "git tag -a v${version} -m 'Tagging the ${version} release'",

    /// Hint shown when the current commit cannot be tagged.
    vc_tag_hint: String = "Tagging failed. Check whether tag v${version} already exists.",

    /// Command pushing the release tag to the remote.
    #[serde(rename = "pushVCTagCmd")]
    push_vc_tag_cmd: String = "git push ${remoteName} v${version}",

    /// Hint shown when the release tag cannot be pushed.
    #[serde(rename = "pushVCTagHint")]
    push_vc_tag_hint: String = "Pushing tag v${version} to \"${remoteName}\" failed. \
        Ensure that you may push to the remote. Remove the local tag with \
        \"git tag -d v${version}\" before trying again.",

    /// Template of a development version.
    dev_version: String = "${version}-${preRelease}.${timestamp}.${revision}",

    /// Pre-release tag of development versions, and their dist-tag.
    dev_tag: String = "dev",

    /// Name of the remote that release tags are pushed to.
    remote_name: String = "upstream",

    /// Directory holding the package metadata file.
    module_root: String = "./",

    /// Name appended to development versions. Empty means the branch name is
    /// used when off of the main release line.
    dev_name: String = "",

    /// Branch whose development versions carry no qualifier.
    main_branch: String = "main",

    /// Abort when the working tree has uncommitted changes.
    check_changes: bool = true,
}

impl Config {
    /// Flatten configuration into template values.
    ///
    /// Every option becomes a placeholder under its camelCase name. Boolean
    /// options render as `true` or `false`.
    pub fn values(&self) -> Values {
        let Ok(Value::Object(map)) = serde_json::to_value(self) else {
            return Values::new();
        };

        map.into_iter()
            .map(|(key, value)| match value {
                Value::String(text) => (key, text),
                other => (key, other.to_string()),
            })
            .collect()
    }

    /// Module root with shell expansion applied.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ShellExpansion`] if expansion fails, e.g.,
    ///   an environment variable is not set.
    pub fn module_root(&self) -> Result<PathBuf> {
        Ok(PathBuf::from(
            shellexpand::full(self.module_root.as_str())
                .map_err(ConfigError::ShellExpansion)?
                .into_owned(),
        ))
    }
}

impl Display for Config {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

impl Options {
    /// Parse options from JSON object.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Json`] if the data is not a JSON object of
    ///   known options.
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(ConfigError::Json)
    }
}

impl FromStr for Options {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        toml::de::from_str(data).map_err(ConfigError::Deserialize)
    }
}

impl Display for Options {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize TOML options.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to deserialize JSON options.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[test]
    fn resolve_keeps_defaults_for_unset_fields() {
        let defaults = Config::default();
        let overrides = Options {
            remote_name: Some("origin".into()),
            check_changes: Some(false),
            ..Default::default()
        };

        let result = defaults.resolve(&overrides);
        let expect = Config {
            remote_name: "origin".into(),
            check_changes: false,
            ..Config::default()
        };
        assert_eq!(result, expect);

        // Inputs untouched.
        assert_eq!(defaults, Config::default());
        assert_eq!(overrides.remote_name.as_deref(), Some("origin"));
        assert_eq!(overrides.pack_cmd, None);
    }

    #[test]
    fn resolve_replaces_templates_whole() {
        let overrides = Options {
            publish_dev_cmd: Some("cargo publish".into()),
            ..Default::default()
        };

        let result = Config::default().resolve(&overrides);
        assert_eq!(result.publish_dev_cmd, "cargo publish");
        assert_eq!(result.publish_cmd, "npm publish");
    }

    #[test]
    fn merge_prefers_later_layer() {
        let user = Options {
            remote_name: Some("origin".into()),
            dev_tag: Some("nightly".into()),
            ..Default::default()
        };
        let project = Options {
            dev_tag: Some("canary".into()),
            ..Default::default()
        };

        let result = user.merge(&project);
        let expect = Options {
            remote_name: Some("origin".into()),
            dev_tag: Some("canary".into()),
            ..Default::default()
        };
        assert_eq!(result, expect);
    }

    #[test]
    fn deserialize_options_from_toml() -> anyhow::Result<()> {
        let result: Options = indoc! {r#"
            changesCmd = "git status --porcelain"
            pushVCTagCmd = "git push origin v${version}"
            devTag = "nightly"
            checkChanges = false
        "#}
        .parse()?;

        let expect = Options {
            changes_cmd: Some("git status --porcelain".into()),
            push_vc_tag_cmd: Some("git push origin v${version}".into()),
            dev_tag: Some("nightly".into()),
            check_changes: Some(false),
            ..Default::default()
        };
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn deserialize_options_from_json() -> anyhow::Result<()> {
        let result = Options::from_json(r#"{"remoteName": "origin", "moduleRoot": "pkg"}"#)?;
        let expect = Options {
            remote_name: Some("origin".into()),
            module_root: Some("pkg".into()),
            ..Default::default()
        };
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn reject_unknown_options() {
        assert!(Options::from_json(r#"{"changes": "git status"}"#).is_err());
        assert!("changes = \"git status\"".parse::<Options>().is_err());
    }

    #[test]
    fn serialize_options_skips_unset_fields() {
        let result = Options {
            dev_tag: Some("nightly".into()),
            push_vc_tag_hint: Some("ask for access".into()),
            ..Default::default()
        }
        .to_string();

        let expect = indoc! {r#"
            pushVCTagHint = "ask for access"
            devTag = "nightly"
        "#};
        assert_eq!(result, expect);
    }

    #[test]
    fn values_flatten_configuration() {
        let values = Config::default().values();
        assert_eq!(values.get("remoteName").map(String::as_str), Some("upstream"));
        assert_eq!(values.get("devTag").map(String::as_str), Some("dev"));
        assert_eq!(values.get("checkChanges").map(String::as_str), Some("true"));
        assert_eq!(
            values.get("pushVCTagCmd").map(String::as_str),
            Some("git push ${remoteName} v${version}")
        );
    }

    #[sealed_test(env = [("PKG_ROOT", "/tmp/blah/pkg")])]
    fn module_root_performs_shell_expansion() -> anyhow::Result<()> {
        let config = Config {
            module_root: "$PKG_ROOT/sub".into(),
            ..Config::default()
        };
        assert_eq!(config.module_root()?, PathBuf::from("/tmp/blah/pkg/sub"));

        Ok(())
    }
}
