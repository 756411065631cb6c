//! Clap-free settings for the setup pipeline.

use crate::recipe::{FirebaseOptions, PackageVersions, ProjectDescriptor};
use camino::Utf8PathBuf;

/// Settings for [`run_setup`](crate::pipeline::run_setup).
#[derive(Debug, Clone)]
pub struct SetupSettings {
    /// Project root; every path in `project` is relative to it.
    pub project_root: Utf8PathBuf,
    pub project: ProjectDescriptor,
    pub firebase: FirebaseOptions,
    pub versions: PackageVersions,

    /// Stage and report only; never write source files.
    pub dry_run: bool,

    /// Where to write `report.json`, `report.md` and `patch.diff`, if anywhere.
    pub report_dir: Option<Utf8PathBuf>,
}

impl Default for SetupSettings {
    fn default() -> Self {
        Self {
            project_root: Utf8PathBuf::from("."),
            project: ProjectDescriptor::default(),
            firebase: FirebaseOptions::default(),
            versions: PackageVersions::default(),
            dry_run: false,
            report_dir: None,
        }
    }
}
