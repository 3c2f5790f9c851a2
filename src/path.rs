// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine where publicist looks for configuration files that live outside
//! of the package being released.

use std::path::PathBuf;

/// Name of project-level configuration file.
pub const PROJECT_CONFIG_FILE: &str = "publicist.toml";

/// Determine absolute path to user-level configuration file.
///
/// Uses XDG Base Directory path `$XDG_CONFIG_HOME/publicist/config.toml`, or
/// the platform equivalent. Does not check if the path returned actually
/// exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if configuration directory cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn user_config_file() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("publicist").join("config.toml"))
        .ok_or(NoWayHome)
}

/// No way to determine user's configuration directory.
///
/// # See Also
///
/// - [`dirs::config_dir`](https://docs.rs/dirs/latest/dirs/fn.config_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's configuration directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
