// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use publicist::{
    path::{user_config_file, PROJECT_CONFIG_FILE},
    Config, Manifest, Options, Publisher,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
    process::exit,
};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "publicist [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Log commands that publish or tag instead of running them.
    #[arg(short, long, global = true)]
    pub test: bool,

    /// Project configuration file to use instead of publicist.toml.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// JSON object of options that override every configuration file.
    #[arg(short, long, global = true, value_name = "json")]
    pub options: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let config = load_config(self.config.as_ref(), self.options.as_deref())?;
        debug!("resolved configuration:\n{config}");
        let publisher = Publisher::with_shell(config);

        match self.command {
            Command::Dev => run_dev(&publisher, self.test),
            Command::Standard => run_standard(&publisher, self.test),
            Command::DevVersion => run_dev_version(&publisher),
            Command::DistTag(opts) => run_dist_tag(&publisher, self.test, opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Publish development release stamped with latest commit.
    #[command(override_usage = "publicist dev [options]")]
    Dev,

    /// Tag and publish standard release of current version.
    #[command(override_usage = "publicist standard [options]")]
    Standard,

    /// Print development version without publishing anything.
    #[command(override_usage = "publicist dev-version [options]")]
    DevVersion,

    /// Apply dist-tag to published version of package.
    #[command(override_usage = "publicist dist-tag [options] <version> [<tag>]")]
    DistTag(DistTagOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct DistTagOptions {
    /// Published version to tag.
    #[arg(required = true, value_name = "version")]
    pub version: String,

    /// Dist-tag to apply. Defaults to the development tag.
    #[arg(value_name = "tag")]
    pub tag: Option<String>,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn load_config(project: Option<&PathBuf>, json: Option<&str>) -> Result<Config> {
    let mut options = Options::default();

    match user_config_file() {
        Ok(path) if path.is_file() => options = options.merge(&read_options(&path)?),
        Ok(_) => {}
        Err(error) => debug!("skip user configuration: {error}"),
    }

    let project = project
        .cloned()
        .or_else(|| Some(PathBuf::from(PROJECT_CONFIG_FILE)).filter(|path| path.is_file()));
    if let Some(path) = project {
        options = options.merge(&read_options(&path)?);
    }

    if let Some(json) = json {
        let overrides = Options::from_json(json).context("invalid --options")?;
        options = options.merge(&overrides);
    }

    Ok(Config::default().resolve(&options))
}

fn read_options(path: &Path) -> Result<Options> {
    debug!("load options from {:?}", path.display());
    let data = read_to_string(path)
        .with_context(|| format!("failed to read configuration at {:?}", path.display()))?;
    data.parse::<Options>()
        .with_context(|| format!("invalid configuration at {:?}", path.display()))
}

fn run_dev(publisher: &Publisher, is_test: bool) -> Result<()> {
    let version = publisher.dev(is_test)?;
    println!("{version}");

    Ok(())
}

fn run_standard(publisher: &Publisher, is_test: bool) -> Result<()> {
    let version = publisher.standard(is_test)?;
    println!("{version}");

    Ok(())
}

fn run_dev_version(publisher: &Publisher) -> Result<()> {
    let manifest = Manifest::load(publisher.config().module_root()?)?;
    println!("{}", publisher.dev_version(&manifest.version)?);

    Ok(())
}

fn run_dist_tag(publisher: &Publisher, is_test: bool, opts: DistTagOptions) -> Result<()> {
    let manifest = Manifest::load(publisher.config().module_root()?)?;
    let tag = opts.tag.unwrap_or_else(|| publisher.config().dev_tag.clone());
    publisher.dist_tag(is_test, &manifest.name, &opts.version, &tag)?;

    Ok(())
}
