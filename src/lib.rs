// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Release automation for packages.
//!
//! Publicist stamps development builds with a version derived from the latest
//! commit, and publishes standard releases under the version already recorded
//! in package metadata. It does not know how to talk to version control or a
//! package registry itself. Every step of a release is a configurable command
//! template that is rendered, and handed off to a command runner.
//!
//! # See Also
//!
//! 1. [`Publisher`]
//! 2. [`Config`]
//! 3. [`template`]

pub mod config;
pub mod log;
pub mod manifest;
pub mod path;
pub mod publish;
pub mod runner;
pub mod template;
pub mod version;

pub use config::{Config, Options};
pub use log::{Log, TracingLog};
pub use manifest::Manifest;
pub use publish::{Channel, PublishError, Publisher};
pub use runner::{CommandFailure, CommandRunner, ShellRunner};
