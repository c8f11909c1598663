use std::path::{Path, PathBuf};

use sfdelta_metadata::MetadataRegistry;
use sfdelta_operations::config::{DEFAULT_API_VERSION, DeltaSection, IgnoreRules, RunConfig};
use sfdelta_operations::operations::{DeltaOperation, DeltaOutput};
use sfdelta_operations::providers::{FileSystemOutput, Git2Provider};
use tracing::debug;

use crate::Cli;
use crate::error::{CliError, Result};

pub(crate) fn run(cli: &Cli) -> Result<DeltaOutput> {
    if cli.output.exists() && !cli.output.is_dir() {
        return Err(CliError::OutputNotDirectory(cli.output.clone()));
    }

    let git = Git2Provider::open(&cli.repo)?;
    let section = load_section(cli.config.as_deref(), git.root())?;
    let registry = load_registry(metadata_overrides(cli, &section))?;
    let config = build_config(cli, &section)?;
    debug!(
        repo = %git.root().display(),
        output = %cli.output.display(),
        api_version = config.api_version(),
        generate_delta = config.generate_delta(),
        "configuration resolved"
    );

    let operation = DeltaOperation::new(git, FileSystemOutput::new(&cli.output), registry);
    Ok(operation.execute(config)?)
}

fn load_section(explicit: Option<&Path>, repo_root: &Path) -> Result<DeltaSection> {
    let section = match explicit {
        Some(path) => DeltaSection::load(path)?,
        None => DeltaSection::discover(repo_root)?.unwrap_or_default(),
    };
    Ok(section)
}

fn metadata_overrides<'a>(cli: &'a Cli, section: &'a DeltaSection) -> Option<&'a PathBuf> {
    cli.metadata.as_ref().or(section.metadata.as_ref())
}

fn load_registry(overrides: Option<&PathBuf>) -> Result<MetadataRegistry> {
    let registry = MetadataRegistry::builtin()?;
    match overrides {
        Some(path) => Ok(registry.with_overrides_from(path)?),
        None => Ok(registry),
    }
}

/// Command-line values win over the config file. A repeatable flag given at
/// least once replaces the file's list.
fn build_config(cli: &Cli, section: &DeltaSection) -> Result<RunConfig> {
    let prefer = |flags: &[String], file: &[String]| -> Vec<String> {
        if flags.is_empty() {
            file.to_vec()
        } else {
            flags.to_vec()
        }
    };

    let ignore = IgnoreRules::new(
        &prefer(&cli.ignore_pattern, &section.ignore),
        &prefer(&cli.ignore_destructive_pattern, &section.ignore_destructive),
    )?;
    let api_version = cli
        .api_version
        .as_deref()
        .or(section.api_version.as_deref())
        .unwrap_or(DEFAULT_API_VERSION);

    let mut config = RunConfig::new(&cli.from, &cli.to)
        .with_generate_delta(cli.generate_delta)
        .with_api_version(api_version)
        .with_source(prefer(&cli.source, &section.source))
        .with_ignore(ignore)
        .with_diff_settings(section.diff_settings());
    if let Some(types) = &section.site_collection_types {
        config = config.with_site_collection_types(types.clone());
    }
    Ok(config)
}
