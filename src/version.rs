// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Development version calculation.
//!
//! A development release is published under a version derived from the
//! package's own version, a pre-release tag, and the latest commit:
//!
//! ```text
//! 1.2.3-dev.20151015T131223Z.039d221
//! ^^^^^ ^^^ ^^^^^^^^^^^^^^^^ ^^^^^^^
//! |     |   |                revision
//! |     |   commit timestamp
//! |     pre-release tag
//! base version
//! ```
//!
//! The layout is controlled by the `devVersion` template. The timestamp uses
//! a fixed-width profile of ISO 8601, `YYYYMMDDThhmmssZ`, always in UTC.
//! Builds made off of the main release line can carry an extra qualifier,
//! e.g., `1.2.3-dev.20151015T131223Z.039d221.my-feature`.

use crate::template::{render, Values};

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::fmt::Display;

/// Marker printed by `git rev-parse --abbrev-ref HEAD` on a detached HEAD.
const DETACHED_HEAD: &str = "HEAD";

/// Left-pad target value with zeros until it is at least `width` characters.
pub fn pad_zeros(num: impl Display, width: usize) -> String {
    format!("{num:0>width$}")
}

/// UTC calendar breakdown of a commit timestamp.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,

    /// Month of the year, starting at 1.
    pub month: u32,

    /// Day of the month, starting at 1.
    pub day: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

/// Break commit timestamp into UTC calendar fields.
///
/// Expects seconds since the Unix epoch as text, e.g., the output of
/// `git show -s --format=%ct HEAD`. Surrounding whitespace is ignored. A
/// timestamp of zero is the epoch itself.
///
/// # Errors
///
/// - Return [`VersionError::InvalidTimestamp`] if the text is not an integer.
/// - Return [`VersionError::TimestampOutOfRange`] if the integer cannot be
///   represented as a date.
pub fn from_timestamp(raw: impl AsRef<str>) -> Result<DateParts> {
    let raw = raw.as_ref().trim();
    let seconds = raw
        .parse::<i64>()
        .map_err(|_| VersionError::InvalidTimestamp(raw.to_string()))?;
    let date = DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or(VersionError::TimestampOutOfRange(seconds))?;

    Ok(DateParts {
        year: date.year(),
        month: date.month(),
        day: date.day(),
        hours: date.hour(),
        minutes: date.minute(),
        seconds: date.second(),
    })
}

/// Convert commit timestamp into the `YYYYMMDDThhmmssZ` profile of ISO 8601.
///
/// # Errors
///
/// - Return [`VersionError`] if the timestamp cannot be parsed.
pub fn convert_to_iso8601(raw: impl AsRef<str>) -> Result<String> {
    let date = from_timestamp(raw)?;

    Ok(format!(
        "{}{}{}T{}{}{}Z",
        pad_zeros(date.year, 4),
        pad_zeros(date.month, 2),
        pad_zeros(date.day, 2),
        pad_zeros(date.hours, 2),
        pad_zeros(date.minutes, 2),
        pad_zeros(date.seconds, 2),
    ))
}

/// Pick the name appended to a development version, if any.
///
/// An explicit, non-empty `dev_name` always wins. Otherwise the current
/// branch is used, unless it is the main release line, or HEAD is detached.
pub fn qualifier(dev_name: &str, branch: Option<&str>, main_branch: &str) -> Option<String> {
    let dev_name = dev_name.trim();
    if !dev_name.is_empty() {
        return Some(dev_name.to_string());
    }

    branch
        .map(str::trim)
        .filter(|branch| !branch.is_empty() && *branch != main_branch && *branch != DETACHED_HEAD)
        .map(ToString::to_string)
}

/// Components of a development version.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DevVersion {
    /// Base version from package metadata.
    pub version: String,

    /// Pre-release tag, e.g., "dev".
    pub pre_release: String,

    /// Commit timestamp in `YYYYMMDDThhmmssZ` form.
    pub timestamp: String,

    /// Commit revision, trimmed.
    pub revision: String,

    /// Optional name appended after the rendered template.
    pub qualifier: Option<String>,
}

impl DevVersion {
    /// Construct development version from raw command output.
    ///
    /// Converts `timestamp_raw` into its ISO 8601 profile, and trims any
    /// whitespace surrounding `revision_raw`.
    ///
    /// # Errors
    ///
    /// - Return [`VersionError`] if the timestamp cannot be parsed.
    pub fn from_raw(
        version: impl Into<String>,
        pre_release: impl Into<String>,
        timestamp_raw: impl AsRef<str>,
        revision_raw: impl AsRef<str>,
    ) -> Result<Self> {
        Ok(Self {
            version: version.into(),
            pre_release: pre_release.into(),
            timestamp: convert_to_iso8601(timestamp_raw)?,
            revision: revision_raw.as_ref().trim().to_string(),
            qualifier: None,
        })
    }

    /// Attach qualifier to development version.
    pub fn with_qualifier(mut self, qualifier: Option<String>) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// Render development version through target template.
    ///
    /// Available placeholders are `version`, `preRelease`, `timestamp`, and
    /// `revision`.
    pub fn render(&self, template: &str) -> String {
        let values = Values::from([
            ("version".into(), self.version.clone()),
            ("preRelease".into(), self.pre_release.clone()),
            ("timestamp".into(), self.timestamp.clone()),
            ("revision".into(), self.revision.trim().to_string()),
        ]);

        let mut rendered = render(template, &values);
        if let Some(qualifier) = &self.qualifier {
            rendered.push('.');
            rendered.push_str(qualifier);
        }

        rendered
    }
}

/// Version calculation error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// Timestamp is not an integer count of seconds.
    #[error("invalid commit timestamp {0:?}")]
    InvalidTimestamp(String),

    /// Timestamp cannot be represented as a calendar date.
    #[error("commit timestamp {0} is out of range")]
    TimestampOutOfRange(i64),
}

/// Friendly result alias :3
pub type Result<T, E = VersionError> = std::result::Result<T, E>;
