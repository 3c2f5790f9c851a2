// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Release orchestration.
//!
//! A [`Publisher`] sequences the steps of a release. Each step renders a
//! command template from the run's [`Config`], and hands the result to a
//! [`CommandRunner`]. Two workflows are provided.
//!
//! # Development Releases
//!
//! 1. Abort if the working tree has uncommitted changes.
//! 2. Compute a development version from the latest commit.
//! 3. Write the development version into the package metadata.
//! 4. Publish under the development dist-tag, or pack a local archive when
//!    testing.
//! 5. Restore the package metadata. This step runs no matter how steps 3
//!    and 4 turned out.
//!
//! # Standard Releases
//!
//! 1. Abort if the working tree has uncommitted changes.
//! 2. Abort if the remote to push tags to cannot be verified.
//! 3. Tag the current commit with the package version, and push the tag.
//! 4. Publish, or pack a local archive when testing.
//!
//! # Dry Runs
//!
//! When a workflow runs in test mode, commands that are visible outside of
//! the local machine (publishing, dist-tags, version control tags) are only
//! logged as `command: <rendered command>`. Local commands still run, so a
//! test run exercises the whole pipeline and leaves an archive behind.

use crate::{
    config::{Config, ConfigError},
    log::{Log, TracingLog},
    manifest::{Manifest, ManifestError},
    runner::{CommandFailure, CommandRunner, ShellRunner},
    template::{render, Values},
    version::{qualifier, DevVersion, VersionError},
};

use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Label prefixed to commands that are logged instead of executed.
pub const DRY_RUN_LABEL: &str = "command: ";

/// Release channel to publish to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Standard release under the version from package metadata.
    #[default]
    Standard,

    /// Development release under the development dist-tag.
    Dev,
}

/// Release orchestrator.
///
/// Owns the configuration of exactly one release run, along with the
/// capabilities it needs to interact with the outside world.
#[derive(Debug)]
pub struct Publisher<R = ShellRunner, L = TracingLog>
where
    R: CommandRunner,
    L: Log,
{
    config: Config,
    values: Values,
    runner: R,
    log: L,
}

impl Publisher {
    /// Construct publisher that runs commands through the host shell, and
    /// logs through [`tracing`].
    pub fn with_shell(config: Config) -> Self {
        Self::new(config, ShellRunner::new(), TracingLog)
    }
}

impl<R, L> Publisher<R, L>
where
    R: CommandRunner,
    L: Log,
{
    /// Construct new publisher.
    pub fn new(config: Config, runner: R, log: L) -> Self {
        let values = config.values();
        Self {
            config,
            values,
            runner,
            log,
        }
    }

    /// Configuration of this release run.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Publish a development release.
    ///
    /// Returns the development version that was published, or packed when
    /// `is_test` is set.
    ///
    /// Once the version has been written to the package metadata, the clean
    /// command is guaranteed to run exactly once, even when writing the
    /// version or publishing fails.
    ///
    /// # Errors
    ///
    /// - Return [`PublishError::UncommittedChanges`] if the working tree is
    ///   not clean.
    /// - Return [`PublishError::Manifest`] if package metadata cannot be read.
    /// - Return [`PublishError::Command`] if any command fails. If both
    ///   publishing and cleanup fail, the publishing failure is returned.
    #[instrument(skip(self), level = "debug")]
    pub fn dev(&self, is_test: bool) -> Result<String> {
        self.check_changes()?;

        let module_root = self.config.module_root()?;
        let manifest = Manifest::load(&module_root)?;
        let version = self.dev_version(&manifest.version)?;
        info!("release {} at development version {version}", manifest.name);

        let released = self
            .set_version(&version)
            .and_then(|_| self.publish(is_test, Channel::Dev, &manifest, &version));
        let cleaned = self.clean(&module_root);

        match (released, cleaned) {
            (Ok(()), Ok(())) => Ok(version),
            (Err(error), Ok(())) | (Ok(()), Err(error)) => Err(error),
            (Err(error), Err(cleanup)) => {
                self.log.warn(&format!("cleanup failed as well: {cleanup}"));
                Err(error)
            }
        }
    }

    /// Publish a standard release.
    ///
    /// Tags the current commit with the version from the package metadata,
    /// pushes that tag, and publishes. The version itself is never modified.
    /// Returns the version that was released.
    ///
    /// # Errors
    ///
    /// - Return [`PublishError::UncommittedChanges`] if the working tree is
    ///   not clean.
    /// - Return [`PublishError::MissingRemote`] if the remote cannot be
    ///   verified.
    /// - Return [`PublishError::Manifest`] if package metadata cannot be read.
    /// - Return [`PublishError::Command`] if any command fails.
    #[instrument(skip(self), level = "debug")]
    pub fn standard(&self, is_test: bool) -> Result<String> {
        self.check_changes()?;
        self.check_remote()?;

        let manifest = Manifest::load(self.config.module_root()?)?;
        info!("release {} at version {}", manifest.name, manifest.version);

        self.tag_vc(is_test, &manifest.version)?;
        self.publish(is_test, Channel::Standard, &manifest, &manifest.version)?;

        Ok(manifest.version)
    }

    /// Verify that the working tree has no uncommitted changes.
    ///
    /// Does nothing if change checking is disabled.
    ///
    /// # Errors
    ///
    /// - Return [`PublishError::UncommittedChanges`] if the changes command
    ///   prints anything.
    /// - Return [`PublishError::Command`] if the changes command fails.
    #[instrument(skip(self), level = "debug")]
    pub fn check_changes(&self) -> Result<()> {
        if !self.config.check_changes {
            debug!("skip uncommitted changes check");
            return Ok(());
        }

        let changes = self.exec(&self.config.changes_cmd, &self.values, None, None)?;
        if !changes.trim().is_empty() {
            let hint = self.hint(&self.config.changes_hint, &self.values);
            return Err(PublishError::UncommittedChanges { changes, hint });
        }

        Ok(())
    }

    /// Verify that the remote to push tags to exists.
    ///
    /// # Errors
    ///
    /// - Return [`PublishError::MissingRemote`] if the remote check fails.
    #[instrument(skip(self), level = "debug")]
    pub fn check_remote(&self) -> Result<()> {
        let command = render(&self.config.check_remote_cmd, &self.values);
        debug!("run {command:?}");
        if let Err(failure) = self.runner.run(&command, None) {
            warn!("command {command:?} failed");
            let hint = self.hint(&self.config.check_remote_hint, &self.values);
            return Err(PublishError::MissingRemote {
                remote: self.config.remote_name.clone(),
                failure,
                hint,
            });
        }

        Ok(())
    }

    /// Compute development version of target base version.
    ///
    /// Looks up the timestamp and revision of the latest commit. The current
    /// branch is looked up only when no development name is configured.
    ///
    /// # Errors
    ///
    /// - Return [`PublishError::Command`] if a lookup command fails.
    /// - Return [`PublishError::Version`] if the timestamp cannot be parsed.
    #[instrument(skip(self), level = "debug")]
    pub fn dev_version(&self, base_version: &str) -> Result<String> {
        let timestamp = self.exec(&self.config.raw_timestamp_cmd, &self.values, None, None)?;
        let revision = self.exec(&self.config.revision_cmd, &self.values, None, None)?;
        let branch = if self.config.dev_name.trim().is_empty() {
            Some(self.exec(&self.config.branch_cmd, &self.values, None, None)?)
        } else {
            None
        };

        let version = DevVersion::from_raw(base_version, &self.config.dev_tag, timestamp, revision)?
            .with_qualifier(qualifier(
                &self.config.dev_name,
                branch.as_deref(),
                &self.config.main_branch,
            ));

        Ok(version.render(&self.config.dev_version))
    }

    /// Write target version into package metadata without committing it.
    ///
    /// # Errors
    ///
    /// - Return [`PublishError::Command`] if the version command fails.
    #[instrument(skip(self), level = "debug")]
    pub fn set_version(&self, version: &str) -> Result<()> {
        let values = self.values_with([("version", version)]);
        self.exec(&self.config.version_cmd, &values, None, None)?;

        Ok(())
    }

    /// Publish package to target channel, or pack a local archive if
    /// `is_test` is set.
    ///
    /// # Errors
    ///
    /// - Return [`PublishError::Command`] if the pack or publish command fails.
    #[instrument(skip(self, manifest), level = "debug")]
    pub fn publish(
        &self,
        is_test: bool,
        channel: Channel,
        manifest: &Manifest,
        version: &str,
    ) -> Result<()> {
        let values = self.values_with([("packageName", manifest.name.as_str()), ("version", version)]);
        if is_test {
            let archive = self.exec(&self.config.pack_cmd, &values, None, None)?;
            info!("packed {}", archive.trim());
            return Ok(());
        }

        let (template, hint) = match channel {
            Channel::Standard => (&self.config.publish_cmd, &self.config.publish_hint),
            Channel::Dev => (&self.config.publish_dev_cmd, &self.config.publish_dev_hint),
        };
        self.exec(template, &values, Some(hint.as_str()), None)?;

        Ok(())
    }

    /// Apply dist-tag to a published version of target package.
    ///
    /// # Errors
    ///
    /// - Return [`PublishError::Command`] if the dist-tag command fails.
    #[instrument(skip(self), level = "debug")]
    pub fn dist_tag(&self, is_test: bool, package_name: &str, version: &str, tag: &str) -> Result<()> {
        let values = self.values_with([
            ("packageName", package_name),
            ("version", version),
            ("tag", tag),
        ]);

        self.exec_visible(is_test, &self.config.dist_tag_cmd, &self.config.dist_tag_hint, &values)
    }

    /// Tag the current commit with target version, and push the tag to the
    /// configured remote.
    ///
    /// # Errors
    ///
    /// - Return [`PublishError::Command`] if tagging or pushing fails.
    #[instrument(skip(self), level = "debug")]
    pub fn tag_vc(&self, is_test: bool, version: &str) -> Result<()> {
        let values = self.values_with([("version", version)]);
        self.exec_visible(is_test, &self.config.vc_tag_cmd, &self.config.vc_tag_hint, &values)?;
        self.exec_visible(
            is_test,
            &self.config.push_vc_tag_cmd,
            &self.config.push_vc_tag_hint,
            &values,
        )
    }

    /// Restore package metadata inside of target module root.
    ///
    /// # Errors
    ///
    /// - Return [`PublishError::Command`] if the clean command fails.
    #[instrument(skip(self), level = "debug")]
    pub fn clean(&self, module_root: &Path) -> Result<()> {
        self.exec(&self.config.clean_cmd, &self.values, None, Some(module_root))?;

        Ok(())
    }

    fn values_with<'a>(&self, extras: impl IntoIterator<Item = (&'a str, &'a str)>) -> Values {
        let mut values = self.values.clone();
        values.extend(
            extras
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );
        values
    }

    fn hint(&self, template: &str, values: &Values) -> Option<String> {
        let hint = render(template, values);
        if hint.trim().is_empty() {
            return None;
        }

        self.log.warn(&hint);
        Some(hint)
    }

    fn exec(
        &self,
        template: &str,
        values: &Values,
        hint: Option<&str>,
        current_dir: Option<&Path>,
    ) -> Result<String> {
        let command = render(template, values);
        debug!("run {command:?}");
        self.runner.run(&command, current_dir).map_err(|failure| {
            warn!("command {command:?} failed");
            let hint = hint.and_then(|hint| self.hint(hint, values));
            PublishError::Command { failure, hint }
        })
    }

    fn exec_visible(&self, is_test: bool, template: &str, hint: &str, values: &Values) -> Result<()> {
        if is_test {
            let command = render(template, values);
            self.log.info(&format!("{DRY_RUN_LABEL}{command}"));
            return Ok(());
        }

        self.exec(template, values, Some(hint), None)?;

        Ok(())
    }
}

/// Release error types.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Working tree has uncommitted changes.
    #[error("you have uncommitted changes:\n{changes}")]
    UncommittedChanges {
        changes: String,
        hint: Option<String>,
    },

    /// Remote to push tags to cannot be verified.
    #[error("remote {remote:?} cannot be verified: {failure}")]
    MissingRemote {
        remote: String,
        failure: CommandFailure,
        hint: Option<String>,
    },

    /// External command fails.
    #[error("{failure}")]
    Command {
        failure: CommandFailure,
        hint: Option<String>,
    },

    /// Package metadata cannot be read.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Development version cannot be computed.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Configuration cannot be applied.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PublishError {
    /// Advisory text for the operator, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::UncommittedChanges { hint, .. }
            | Self::MissingRemote { hint, .. }
            | Self::Command { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = PublishError> = std::result::Result<T, E>;
