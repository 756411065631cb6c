mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{ConfigMerger, FirebaseConfig, SetupOverrides};
use graft_core::FsSourceView;
use graft_core::adapters::FsWritePort;
use graft_core::pipeline::{ToolError, run_setup, write_report_artifacts, write_staged};
use graft_core::recipe::{FirebaseOptions, PackageVersions, ProjectDescriptor, firebase_chain};
use graft_core::sink::TracingSink;
use graft_types::change::FailurePolicy;
use graft_types::outcome::ToolInfo;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "graft",
    version,
    about = "Idempotent, syntax-aware Firebase setup for Angular projects."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Wire Firebase into an Angular project. Safe to run repeatedly.
    Setup(SetupArgs),
    /// List the setup steps in execution order with their failure policies.
    Steps(StepsArgs),
}

#[derive(Debug, Parser)]
struct SetupArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    project_root: Utf8PathBuf,

    /// Main entry file (default: src/main.ts).
    #[arg(long)]
    main: Option<Utf8PathBuf>,

    /// Environment file (default: src/environments/environment.ts).
    #[arg(long, conflicts_with = "no_environment")]
    environment: Option<Utf8PathBuf>,

    /// The project has no environment file; skip the steps that need one.
    #[arg(long, default_value_t = false)]
    no_environment: bool,

    /// Manifest to declare dependencies in (default: package.json).
    #[arg(long, conflicts_with = "no_package_json")]
    package_json: Option<Utf8PathBuf>,

    /// Leave package.json alone.
    #[arg(long, default_value_t = false)]
    no_package_json: bool,

    #[arg(long, env = "GRAFT_FIREBASE_API_KEY")]
    api_key: Option<String>,

    #[arg(long, env = "GRAFT_FIREBASE_AUTH_DOMAIN")]
    auth_domain: Option<String>,

    #[arg(long, env = "GRAFT_FIREBASE_DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, env = "GRAFT_FIREBASE_PROJECT_ID")]
    project_id: Option<String>,

    #[arg(long, env = "GRAFT_FIREBASE_STORAGE_BUCKET")]
    storage_bucket: Option<String>,

    #[arg(long, env = "GRAFT_FIREBASE_MESSAGING_SENDER_ID")]
    messaging_sender_id: Option<String>,

    /// Optional; omitted from the generated config when not given.
    #[arg(long, env = "GRAFT_FIREBASE_APP_ID")]
    app_id: Option<String>,

    /// Version range for the `firebase` dependency (default: latest).
    #[arg(long)]
    firebase_version: Option<String>,

    /// Version range for the `@angular/fire` dependency (default: latest).
    #[arg(long)]
    angular_fire_version: Option<String>,

    /// Print the patch instead of writing files.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Write report.json, report.md and patch.diff here.
    #[arg(long)]
    report_dir: Option<Utf8PathBuf>,
}

impl SetupArgs {
    fn overrides(&self) -> SetupOverrides {
        SetupOverrides {
            main: self.main.clone(),
            environment: self.environment.clone(),
            no_environment: self.no_environment,
            package_json: self.package_json.clone(),
            no_package_json: self.no_package_json,
            firebase: FirebaseConfig {
                api_key: self.api_key.clone(),
                auth_domain: self.auth_domain.clone(),
                database_url: self.database_url.clone(),
                project_id: self.project_id.clone(),
                storage_bucket: self.storage_bucket.clone(),
                messaging_sender_id: self.messaging_sender_id.clone(),
                app_id: self.app_id.clone(),
            },
            firebase_version: self.firebase_version.clone(),
            angular_fire_version: self.angular_fire_version.clone(),
            dry_run: self.dry_run,
            report_dir: self.report_dir.clone(),
        }
    }
}

#[derive(Debug, Parser)]
struct StepsArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn real_main() -> Result<(), ToolError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Setup(args) => cmd_setup(args),
        Command::Steps(args) => cmd_steps(args).map_err(ToolError::from),
    }
}

fn cmd_setup(args: SetupArgs) -> Result<(), ToolError> {
    let project_root = args.project_root.clone();

    // Load config file and merge with CLI arguments
    let file_config = config::load_or_default(&project_root).context("load graft.toml config")?;
    let settings =
        ConfigMerger::new(file_config).merge_setup_args(&project_root, args.overrides())?;
    debug!(
        "merged settings: project={:?}, versions={:?}, dry_run={}",
        settings.project, settings.versions, settings.dry_run
    );

    let view = FsSourceView::new(project_root.clone());
    let outcome = run_setup(&settings, &view, &mut TracingSink, tool_info());

    if let Some(dir) = &settings.report_dir {
        let out_dir = under_root(&project_root, dir);
        write_report_artifacts(&outcome, &out_dir, &FsWritePort)
            .with_context(|| format!("write report artifacts to {}", out_dir))?;
        info!(dir = out_dir.as_str(), "wrote report");
    }

    if settings.dry_run {
        print!("{}", outcome.patch);
    } else if outcome.report.aborted_by.is_some() {
        info!("run aborted; no files written");
    } else {
        let written = write_staged(&outcome, &project_root, &FsWritePort)?;
        info!(files = written, "setup complete");
    }

    outcome.check()
}

fn cmd_steps(args: StepsArgs) -> anyhow::Result<()> {
    let chain = firebase_chain(
        &ProjectDescriptor::default(),
        &FirebaseOptions::default(),
        &PackageVersions::default(),
    );

    match args.format {
        OutputFormat::Text => {
            println!("  {:<3} {:<24} POLICY", "#", "STEP");
            for (i, (name, policy)) in chain.policies().enumerate() {
                println!("  {:<3} {:<24} {}", i + 1, name, policy_label(policy));
            }
        }
        OutputFormat::Json => {
            let steps: Vec<_> = chain
                .policies()
                .map(|(name, policy)| {
                    serde_json::json!({
                        "step": name,
                        "policy": policy,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&steps)?);
        }
    }
    Ok(())
}

fn policy_label(policy: FailurePolicy) -> &'static str {
    match policy {
        FailurePolicy::Abort => "abort",
        FailurePolicy::WarnAndContinue => "warn",
        FailurePolicy::SkipSilently => "skip",
    }
}

fn under_root(project_root: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "graft".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
