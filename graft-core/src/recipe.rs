//! The Firebase setup recipe: which steps run, in which order, against which files.

use crate::chain::{ChangeSpec, PatchStep, RuleChain, TargetFile};
use crate::package::{NodeDependency, PackageDependencyStep};
use camino::Utf8PathBuf;
use graft_types::change::{Change, ConfigEntry, FailurePolicy};
use serde::{Deserialize, Serialize};

pub mod step_names {
    pub const PACKAGE_DEPENDENCIES: &str = "package-dependencies";
    pub const ENVIRONMENT_CONFIG: &str = "environment-config";
    pub const IMPORT_ENVIRONMENT: &str = "import-environment";
    pub const IMPORT_ANGULAR_FIRE: &str = "import-angular-fire";
    pub const REGISTER_ANGULAR_FIRE: &str = "register-angular-fire";
}

pub const ENVIRONMENT_IDENTIFIER: &str = "environment";
pub const FIREBASE_KEY: &str = "firebase";
pub const ANGULAR_FIRE_MODULE: &str = "AngularFireModule";
pub const ANGULAR_FIRE_PACKAGE: &str = "@angular/fire";
pub const FIREBASE_PACKAGE: &str = "firebase";
pub const INITIALIZE_APP: &str = "AngularFireModule.initializeApp(environment.firebase)";

/// File locations of the project being set up, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub main_entry: Utf8PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Utf8PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_json: Option<Utf8PathBuf>,
}

impl Default for ProjectDescriptor {
    fn default() -> Self {
        Self {
            main_entry: Utf8PathBuf::from("src/main.ts"),
            environment: Some(Utf8PathBuf::from("src/environments/environment.ts")),
            package_json: Some(Utf8PathBuf::from("package.json")),
        }
    }
}

/// Firebase web app configuration, as shown in the Firebase console.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseOptions {
    pub api_key: String,
    pub auth_domain: String,
    #[serde(rename = "databaseURL")]
    pub database_url: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
}

impl FirebaseOptions {
    /// Entries in the order they appear in the generated `firebase` block.
    pub fn entries(&self) -> Vec<ConfigEntry> {
        let mut entries = vec![
            ConfigEntry::new("apiKey", &self.api_key),
            ConfigEntry::new("authDomain", &self.auth_domain),
            ConfigEntry::new("databaseURL", &self.database_url),
            ConfigEntry::new("projectId", &self.project_id),
            ConfigEntry::new("storageBucket", &self.storage_bucket),
            ConfigEntry::new("messagingSenderId", &self.messaging_sender_id),
        ];
        if let Some(app_id) = &self.app_id {
            entries.push(ConfigEntry::new("appId", app_id));
        }
        entries
    }
}

/// Versions written to `package.json` for newly declared dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageVersions {
    pub firebase: String,
    pub angular_fire: String,
}

impl Default for PackageVersions {
    fn default() -> Self {
        Self {
            firebase: "latest".to_string(),
            angular_fire: "latest".to_string(),
        }
    }
}

/// Build the setup chain.
///
/// | step | policy |
/// |---|---|
/// | `package-dependencies` | warn and continue |
/// | `environment-config` | warn and continue |
/// | `import-environment` | abort |
/// | `import-angular-fire` | abort |
/// | `register-angular-fire` | abort |
///
/// Missing files never abort; they skip the step. Registration also skips while the root module
/// has no `environment` binding, so `environment.firebase` is never referenced unresolved.
pub fn firebase_chain(
    project: &ProjectDescriptor,
    options: &FirebaseOptions,
    versions: &PackageVersions,
) -> RuleChain {
    let root_module = TargetFile::RootModuleOf(project.main_entry.clone());

    RuleChain::new()
        .with_step(PackageDependencyStep::new(
            step_names::PACKAGE_DEPENDENCIES,
            FailurePolicy::WarnAndContinue,
            project.package_json.clone(),
            vec![
                NodeDependency::new(FIREBASE_PACKAGE, &versions.firebase),
                NodeDependency::new(ANGULAR_FIRE_PACKAGE, &versions.angular_fire),
            ],
        ))
        .with_step(PatchStep::new(
            step_names::ENVIRONMENT_CONFIG,
            FailurePolicy::WarnAndContinue,
            TargetFile::Path(project.environment.clone()),
            ChangeSpec::Fixed(Change::AppendObjectField {
                declarator: Some(ENVIRONMENT_IDENTIFIER.to_string()),
                key: FIREBASE_KEY.to_string(),
                entries: options.entries(),
            }),
        ))
        .with_step(PatchStep::new(
            step_names::IMPORT_ENVIRONMENT,
            FailurePolicy::Abort,
            root_module.clone(),
            ChangeSpec::ImportFromFile {
                identifier: ENVIRONMENT_IDENTIFIER.to_string(),
                file: project.environment.clone(),
            },
        ))
        .with_step(PatchStep::new(
            step_names::IMPORT_ANGULAR_FIRE,
            FailurePolicy::Abort,
            root_module.clone(),
            ChangeSpec::Fixed(Change::InsertImport {
                identifier: ANGULAR_FIRE_MODULE.to_string(),
                module: ANGULAR_FIRE_PACKAGE.to_string(),
            }),
        ))
        .with_step(
            PatchStep::new(
                step_names::REGISTER_ANGULAR_FIRE,
                FailurePolicy::Abort,
                root_module,
                ChangeSpec::Fixed(Change::RegisterInCall {
                    callee: "NgModule".to_string(),
                    property: Some("imports".to_string()),
                    token: INITIALIZE_APP.to_string(),
                }),
            )
            .requiring_binding(ENVIRONMENT_IDENTIFIER),
        )
}
