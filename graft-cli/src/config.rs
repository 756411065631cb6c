//! Configuration file loading for graft.
//!
//! Discovers and loads `graft.toml` from the project root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use graft_core::recipe::{FirebaseOptions, PackageVersions, ProjectDescriptor};
use graft_core::settings::SetupSettings;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "graft.toml";

/// Top-level configuration from graft.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GraftConfig {
    /// Where the project's files live.
    pub project: ProjectConfig,

    /// Firebase web app configuration.
    pub firebase: FirebaseConfig,

    /// Versions for newly declared dependencies.
    pub versions: VersionsConfig,

    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Main entry file (default: `src/main.ts`).
    pub main: Option<Utf8PathBuf>,

    /// Environment file (default: `src/environments/environment.ts`).
    pub environment: Option<Utf8PathBuf>,

    /// Manifest (default: `package.json`).
    pub package_json: Option<Utf8PathBuf>,
}

/// Firebase keys, spelled as the Firebase console prints them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    #[serde(rename = "databaseURL")]
    pub database_url: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VersionsConfig {
    pub firebase: Option<String>,
    pub angular_fire: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Never write source files.
    pub dry_run: bool,

    /// Directory for report.json, report.md and patch.diff.
    pub report_dir: Option<Utf8PathBuf>,
}

/// Discover the graft.toml config file.
///
/// Returns `None` if no config file is found in the project root.
pub fn discover_config(project_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = project_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a graft.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<GraftConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<GraftConfig> {
    let config: GraftConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the project root, or return default if not found.
pub fn load_or_default(project_root: &Utf8Path) -> anyhow::Result<GraftConfig> {
    match discover_config(project_root) {
        Some(path) => load_config(&path),
        None => Ok(GraftConfig::default()),
    }
}

/// Values given on the command line. `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct SetupOverrides {
    pub main: Option<Utf8PathBuf>,
    pub environment: Option<Utf8PathBuf>,
    pub no_environment: bool,
    pub package_json: Option<Utf8PathBuf>,
    pub no_package_json: bool,
    pub firebase: FirebaseConfig,
    pub firebase_version: Option<String>,
    pub angular_fire_version: Option<String>,
    pub dry_run: bool,
    pub report_dir: Option<Utf8PathBuf>,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: GraftConfig,
}

impl ConfigMerger {
    pub fn new(config: GraftConfig) -> Self {
        Self { config }
    }

    /// Merge with setup command CLI arguments.
    ///
    /// Every Firebase key except `appId` is required from one of the two sources.
    pub fn merge_setup_args(
        self,
        project_root: &Utf8Path,
        cli: SetupOverrides,
    ) -> anyhow::Result<SetupSettings> {
        let defaults = ProjectDescriptor::default();
        let file = self.config;

        let project = ProjectDescriptor {
            main_entry: cli
                .main
                .or(file.project.main)
                .unwrap_or(defaults.main_entry),
            environment: if cli.no_environment {
                None
            } else {
                cli.environment
                    .or(file.project.environment)
                    .or(defaults.environment)
            },
            package_json: if cli.no_package_json {
                None
            } else {
                cli.package_json
                    .or(file.project.package_json)
                    .or(defaults.package_json)
            },
        };

        let fb = cli.firebase;
        let ff = file.firebase;
        let firebase = FirebaseOptions {
            api_key: required("apiKey", "--api-key", fb.api_key.or(ff.api_key))?,
            auth_domain: required("authDomain", "--auth-domain", fb.auth_domain.or(ff.auth_domain))?,
            database_url: required(
                "databaseURL",
                "--database-url",
                fb.database_url.or(ff.database_url),
            )?,
            project_id: required("projectId", "--project-id", fb.project_id.or(ff.project_id))?,
            storage_bucket: required(
                "storageBucket",
                "--storage-bucket",
                fb.storage_bucket.or(ff.storage_bucket),
            )?,
            messaging_sender_id: required(
                "messagingSenderId",
                "--messaging-sender-id",
                fb.messaging_sender_id.or(ff.messaging_sender_id),
            )?,
            app_id: fb.app_id.or(ff.app_id),
        };

        let default_versions = PackageVersions::default();
        let versions = PackageVersions {
            firebase: cli
                .firebase_version
                .or(file.versions.firebase)
                .unwrap_or(default_versions.firebase),
            angular_fire: cli
                .angular_fire_version
                .or(file.versions.angular_fire)
                .unwrap_or(default_versions.angular_fire),
        };

        Ok(SetupSettings {
            project_root: project_root.to_path_buf(),
            project,
            firebase,
            versions,
            dry_run: cli.dry_run || file.output.dry_run,
            report_dir: cli.report_dir.or(file.output.report_dir),
        })
    }
}

fn required(key: &str, flag: &str, value: Option<String>) -> anyhow::Result<String> {
    value.with_context(|| {
        format!(
            "missing Firebase option `{}`: pass {} or set firebase.{} in {}",
            key, flag, key, CONFIG_FILE_NAME
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn full_firebase() -> FirebaseConfig {
        FirebaseConfig {
            api_key: Some("k".into()),
            auth_domain: Some("d".into()),
            database_url: Some("u".into()),
            project_id: Some("p".into()),
            storage_bucket: Some("b".into()),
            messaging_sender_id: Some("m".into()),
            app_id: None,
        }
    }

    #[test]
    fn parses_console_spelled_keys() {
        let config = parse_config(
            r#"
[project]
main = "projects/app/src/main.ts"

[firebase]
apiKey = "k"
databaseURL = "https://x.firebaseio.com"
appId = "1:2:web:3"

[versions]
angular_fire = "^5.2.0"

[output]
dry_run = true
"#,
        )
        .unwrap();

        assert_eq!(
            config.project.main.as_deref(),
            Some(Utf8Path::new("projects/app/src/main.ts"))
        );
        assert_eq!(config.firebase.api_key.as_deref(), Some("k"));
        assert_eq!(
            config.firebase.database_url.as_deref(),
            Some("https://x.firebaseio.com")
        );
        assert_eq!(config.firebase.app_id.as_deref(), Some("1:2:web:3"));
        assert_eq!(config.versions.angular_fire.as_deref(), Some("^5.2.0"));
        assert!(config.output.dry_run);
    }

    #[test]
    fn cli_overrides_file_values() {
        let mut file = GraftConfig::default();
        file.firebase = full_firebase();
        file.project.environment = Some("src/env/dev.ts".into());

        let cli = SetupOverrides {
            firebase: FirebaseConfig {
                api_key: Some("from-cli".into()),
                ..FirebaseConfig::default()
            },
            firebase_version: Some("^7.0.0".into()),
            ..SetupOverrides::default()
        };

        let settings = ConfigMerger::new(file)
            .merge_setup_args(Utf8Path::new("."), cli)
            .unwrap();
        assert_eq!(settings.firebase.api_key, "from-cli");
        assert_eq!(settings.firebase.project_id, "p");
        assert_eq!(
            settings.project.environment.as_deref(),
            Some(Utf8Path::new("src/env/dev.ts"))
        );
        assert_eq!(settings.versions.firebase, "^7.0.0");
        assert_eq!(settings.versions.angular_fire, "latest");
        assert_eq!(settings.project.main_entry, Utf8PathBuf::from("src/main.ts"));
    }

    #[test]
    fn no_environment_wins_over_file() {
        let mut file = GraftConfig::default();
        file.firebase = full_firebase();
        file.project.environment = Some("src/env/dev.ts".into());

        let cli = SetupOverrides {
            no_environment: true,
            no_package_json: true,
            ..SetupOverrides::default()
        };
        let settings = ConfigMerger::new(file)
            .merge_setup_args(Utf8Path::new("."), cli)
            .unwrap();
        assert_eq!(settings.project.environment, None);
        assert_eq!(settings.project.package_json, None);
    }

    #[test]
    fn missing_firebase_key_names_flag_and_config_key() {
        let err = ConfigMerger::new(GraftConfig::default())
            .merge_setup_args(Utf8Path::new("."), SetupOverrides::default())
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("apiKey"));
        assert!(msg.contains("--api-key"));
    }

    #[test]
    fn load_or_default_without_file() {
        let td = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
        let config = load_or_default(&root).unwrap();
        assert!(config.project.main.is_none());
        assert!(!config.output.dry_run);
    }
}
