// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

#![cfg(unix)]

use crate::{fixture_root, shell_config, traced_clean_cmd, RecordingLog};

use anyhow::Result;
use pretty_assertions::assert_eq;
use publicist::{Options, PublishError, Publisher, ShellRunner};
use sealed_test::prelude::*;
use std::{
    fs::{read_to_string, write},
    path::Path,
};

const DEV_VERSION: &str = "0.0.0-dev.20151015T131223Z.039d221";

fn cleaned_dirs() -> Result<Vec<String>> {
    Ok(read_to_string("cleaned.txt")?
        .lines()
        .map(ToString::to_string)
        .collect())
}

#[sealed_test]
fn dev_test_run_packs_and_restores() -> Result<()> {
    let config = shell_config(Options {
        clean_cmd: Some(traced_clean_cmd()?),
        ..Default::default()
    });
    let log = RecordingLog::default();

    let version = Publisher::new(config, ShellRunner::new(), &log).dev(true)?;
    assert_eq!(version, DEV_VERSION);
    assert_eq!(read_to_string("version.txt")?, format!("{DEV_VERSION}\n"));
    assert_eq!(
        read_to_string("packed.txt")?,
        format!("publicist-test-{DEV_VERSION}.tgz\n")
    );
    assert!(!Path::new("published.txt").exists());

    // Clean command runs exactly once, inside of the module root.
    let cleaned = cleaned_dirs()?;
    assert_eq!(cleaned.len(), 1);
    assert_eq!(
        Path::new(&cleaned[0]).canonicalize()?,
        Path::new(&fixture_root()).canonicalize()?
    );

    Ok(())
}

#[sealed_test]
fn dev_publishes_under_dev_tag() -> Result<()> {
    let config = shell_config(Options::default());
    let log = RecordingLog::default();

    Publisher::new(config, ShellRunner::new(), &log).dev(false)?;
    assert_eq!(
        read_to_string("published.txt")?,
        format!("{DEV_VERSION} dev\n")
    );
    assert!(!Path::new("packed.txt").exists());

    Ok(())
}

#[sealed_test]
fn dev_aborts_before_mutation_on_uncommitted_changes() -> Result<()> {
    write("changes.txt", " M package.json\n")?;
    let config = shell_config(Options {
        clean_cmd: Some(traced_clean_cmd()?),
        ..Default::default()
    });
    let log = RecordingLog::default();

    let result = Publisher::new(config, ShellRunner::new(), &log).dev(false);
    assert!(matches!(result, Err(PublishError::UncommittedChanges { .. })));
    assert!(!Path::new("version.txt").exists());
    assert!(!Path::new("published.txt").exists());
    assert!(!Path::new("cleaned.txt").exists());
    assert_eq!(log.warns.borrow().len(), 1);

    Ok(())
}

#[sealed_test]
fn dev_restores_once_when_publish_fails() -> Result<()> {
    let config = shell_config(Options {
        publish_dev_cmd: Some("echo registry unavailable >&2; exit 1".into()),
        publish_dev_hint: Some("log into the registry".into()),
        clean_cmd: Some(traced_clean_cmd()?),
        ..Default::default()
    });
    let log = RecordingLog::default();

    let result = Publisher::new(config, ShellRunner::new(), &log).dev(false);
    match result {
        Err(PublishError::Command { failure, hint }) => {
            assert_eq!(failure.output, "registry unavailable");
            assert_eq!(hint.as_deref(), Some("log into the registry"));
        }
        other => panic!("expected command failure, got {other:?}"),
    }

    assert_eq!(cleaned_dirs()?.len(), 1);
    assert_eq!(*log.warns.borrow(), vec!["log into the registry"]);

    Ok(())
}

#[sealed_test]
fn dev_version_uses_dev_name_from_json_options() -> Result<()> {
    let overrides = Options::from_json(r#"{"devName": "nightly", "devTag": "canary"}"#)?;
    let config = shell_config(overrides);
    let log = RecordingLog::default();

    let version = Publisher::new(config, ShellRunner::new(), &log).dev_version("1.2.3")?;
    assert_eq!(version, "1.2.3-canary.20151015T131223Z.039d221.nightly");

    Ok(())
}

#[sealed_test]
fn standard_dry_run_logs_instead_of_tagging() -> Result<()> {
    write("remote-upstream", "")?;
    let config = shell_config(Options::default());
    let log = RecordingLog::default();

    let version = Publisher::new(config, ShellRunner::new(), &log).standard(true)?;
    assert_eq!(version, "0.0.0");
    assert_eq!(
        *log.infos.borrow(),
        vec![
            "command: echo v0.0.0 >> tags.txt",
            "command: echo upstream v0.0.0 >> pushed.txt",
        ]
    );
    assert!(!Path::new("tags.txt").exists());
    assert!(!Path::new("pushed.txt").exists());
    assert!(!Path::new("published.txt").exists());
    assert_eq!(read_to_string("packed.txt")?, "publicist-test-0.0.0.tgz\n");

    Ok(())
}

#[sealed_test]
fn standard_tags_pushes_and_publishes() -> Result<()> {
    write("remote-origin", "")?;
    let config = shell_config(Options {
        remote_name: Some("origin".into()),
        ..Default::default()
    });
    let log = RecordingLog::default();

    Publisher::new(config, ShellRunner::new(), &log).standard(false)?;
    assert_eq!(read_to_string("tags.txt")?, "v0.0.0\n");
    assert_eq!(read_to_string("pushed.txt")?, "origin v0.0.0\n");
    assert_eq!(read_to_string("published.txt")?, "0.0.0\n");
    assert!(log.infos.borrow().is_empty());

    Ok(())
}

#[sealed_test]
fn standard_aborts_without_remote() -> Result<()> {
    let config = shell_config(Options::default());
    let log = RecordingLog::default();

    let result = Publisher::new(config, ShellRunner::new(), &log).standard(false);
    match &result {
        Err(PublishError::MissingRemote { remote, .. }) => assert_eq!(remote, "upstream"),
        other => panic!("expected missing remote, got {other:?}"),
    }

    assert!(result.err().and_then(|error| error.hint().map(String::from)).is_some());
    assert!(!Path::new("tags.txt").exists());
    assert!(!Path::new("published.txt").exists());

    Ok(())
}
