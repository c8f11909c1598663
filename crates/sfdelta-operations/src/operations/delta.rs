use serde::Serialize;
use sfdelta_core::{ChangeRecord, Manifest};
use sfdelta_metadata::MetadataRegistry;
use tracing::{debug, info};

use crate::Result;
use crate::config::RunConfig;
use crate::handlers::HandlerFactory;
use crate::metadata_diff::ContentDiff;
use crate::package::{
    DESTRUCTIVE_CHANGES_FILE, DESTRUCTIVE_PACKAGE_FILE, PACKAGE_FILE, empty_package_xml,
    package_xml,
};
use crate::traits::{GitProvider, OutputWriter};
use crate::work::{Collaborators, Work};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaOutput {
    pub to_add: Manifest,
    pub to_destroy: Manifest,
    pub warnings: Vec<String>,
}

/// Computes the deployment delta between two revisions and writes the
/// manifests, plus the changed sources when the run materializes them.
pub struct DeltaOperation<G, W> {
    git: G,
    writer: W,
    registry: MetadataRegistry,
}

impl<G, W> DeltaOperation<G, W>
where
    G: GitProvider,
    W: OutputWriter,
{
    pub fn new(git: G, writer: W, registry: MetadataRegistry) -> Self {
        Self {
            git,
            writer,
            registry,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the revisions cannot be diffed, the diff worker pool
    /// cannot start, or a manifest cannot be written. Failures scoped to a
    /// single change record are reported as warnings instead.
    pub fn execute(&self, config: RunConfig) -> Result<DeltaOutput> {
        let lines = self
            .git
            .changed_lines(config.from_revision(), config.to_revision())?;
        info!(
            from = config.from_revision(),
            to = config.to_revision(),
            changes = lines.len(),
            "computing delta"
        );

        let differ = ContentDiff::new(config.diff_settings())?;
        let site_collection_types = config.site_collection_types().to_vec();
        let factory = HandlerFactory::new(&self.registry, &site_collection_types);
        let api_version = config.api_version().to_owned();

        let mut work = Work::new(config);
        let with = Collaborators {
            git: &self.git,
            writer: &self.writer,
            differ: &differ,
        };

        for line in lines.iter().filter(|line| !line.trim().is_empty()) {
            match ChangeRecord::parse(line) {
                Ok(record) => factory.handle(&record, &mut work, &with),
                Err(error) => work.warn(format!("skipped change line '{line}': {error}")),
            }
        }

        work.reconcile();
        let (to_add, to_destroy, warnings) = work.into_parts();

        self.writer
            .write_file(PACKAGE_FILE, package_xml(&to_add, &api_version).as_bytes())?;
        self.writer.write_file(
            DESTRUCTIVE_CHANGES_FILE,
            package_xml(&to_destroy, &api_version).as_bytes(),
        )?;
        self.writer.write_file(
            DESTRUCTIVE_PACKAGE_FILE,
            empty_package_xml(&api_version).as_bytes(),
        )?;
        debug!(
            added = to_add.len(),
            destroyed = to_destroy.len(),
            warnings = warnings.len(),
            "manifests written"
        );

        Ok(DeltaOutput {
            to_add,
            to_destroy,
            warnings,
        })
    }
}
