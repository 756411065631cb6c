//! CLI end-to-end tests against throwaway Angular projects.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MAIN: &str = "\
import { platformBrowserDynamic } from '@angular/platform-browser-dynamic';

import { AppModule } from './app/app.module';

platformBrowserDynamic().bootstrapModule(AppModule)
  .catch(err => console.error(err));
";

const APP_MODULE: &str = "\
import { BrowserModule } from '@angular/platform-browser';
import { NgModule } from '@angular/core';

@NgModule({
  imports: [
    BrowserModule
  ],
})
export class AppModule { }
";

const ENVIRONMENT: &str = "\
export const environment = {
  production: false
};
";

const PACKAGE_JSON: &str = "{\n  \"name\": \"demo\",\n  \"dependencies\": {}\n}\n";

fn graft() -> Command {
    let mut cmd = Command::cargo_bin("graft").expect("graft binary");
    for var in [
        "GRAFT_FIREBASE_API_KEY",
        "GRAFT_FIREBASE_AUTH_DOMAIN",
        "GRAFT_FIREBASE_DATABASE_URL",
        "GRAFT_FIREBASE_PROJECT_ID",
        "GRAFT_FIREBASE_STORAGE_BUCKET",
        "GRAFT_FIREBASE_MESSAGING_SENDER_ID",
        "GRAFT_FIREBASE_APP_ID",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn create_temp_project(app_module: &str) -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    let root = td.path();
    fs::create_dir_all(root.join("src/app")).unwrap();
    fs::create_dir_all(root.join("src/environments")).unwrap();
    fs::write(root.join("src/main.ts"), MAIN).unwrap();
    fs::write(root.join("src/app/app.module.ts"), app_module).unwrap();
    fs::write(root.join("src/environments/environment.ts"), ENVIRONMENT).unwrap();
    fs::write(root.join("package.json"), PACKAGE_JSON).unwrap();
    td
}

fn setup_in(root: &Path) -> Command {
    let mut cmd = graft();
    cmd.current_dir(root).args([
        "setup",
        "--api-key",
        "key",
        "--auth-domain",
        "demo.firebaseapp.com",
        "--database-url",
        "https://demo.firebaseio.com",
        "--project-id",
        "demo",
        "--storage-bucket",
        "demo.appspot.com",
        "--messaging-sender-id",
        "123",
    ]);
    cmd
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

#[test]
fn help_lists_subcommands() {
    graft()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("setup"))
        .stdout(predicate::str::contains("steps"));
}

#[test]
fn steps_lists_names_in_order() {
    graft()
        .arg("steps")
        .assert()
        .success()
        .stdout(predicate::str::contains("package-dependencies"))
        .stdout(predicate::str::contains("register-angular-fire"))
        .stdout(predicate::str::contains("abort"));
}

#[test]
fn steps_json_is_parseable() {
    let output = graft().args(["steps", "--format", "json"]).output().unwrap();
    assert!(output.status.success());
    let steps: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let steps = steps.as_array().unwrap();
    assert_eq!(steps.len(), 5);
    assert_eq!(steps[0]["step"], "package-dependencies");
    assert_eq!(steps[0]["policy"], "warn_and_continue");
    assert_eq!(steps[4]["policy"], "abort");
}

#[test]
fn missing_api_key_fails_with_hint() {
    let temp = create_temp_project(APP_MODULE);
    graft()
        .current_dir(temp.path())
        .arg("setup")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--api-key"));
    assert_eq!(read(temp.path(), "src/environments/environment.ts"), ENVIRONMENT);
}

#[test]
fn conflicting_environment_flags_are_rejected() {
    graft()
        .args(["setup", "--environment", "a.ts", "--no-environment"])
        .assert()
        .failure();
}

#[test]
fn dry_run_prints_patch_and_writes_nothing() {
    let temp = create_temp_project(APP_MODULE);
    setup_in(temp.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("diff --git a/src/app/app.module.ts"))
        .stdout(predicate::str::contains(
            "+    AngularFireModule.initializeApp(environment.firebase)",
        ));

    assert_eq!(read(temp.path(), "src/app/app.module.ts"), APP_MODULE);
    assert_eq!(read(temp.path(), "src/environments/environment.ts"), ENVIRONMENT);
    assert_eq!(read(temp.path(), "package.json"), PACKAGE_JSON);
}

#[test]
fn setup_writes_files_and_is_idempotent() {
    let temp = create_temp_project(APP_MODULE);
    setup_in(temp.path()).assert().success();

    let module = read(temp.path(), "src/app/app.module.ts");
    assert!(module.contains("import { AngularFireModule } from '@angular/fire';"));
    assert!(module.contains("import { environment } from '../environments/environment';"));
    assert!(module.contains("AngularFireModule.initializeApp(environment.firebase)"));

    let env = read(temp.path(), "src/environments/environment.ts");
    assert!(env.contains("    apiKey: 'key',"));

    let pkg = read(temp.path(), "package.json");
    assert!(pkg.contains("\"@angular/fire\": \"latest\""));

    setup_in(temp.path()).assert().success();
    assert_eq!(read(temp.path(), "src/app/app.module.ts"), module);
    assert_eq!(read(temp.path(), "src/environments/environment.ts"), env);
    assert_eq!(read(temp.path(), "package.json"), pkg);
}

#[test]
fn config_file_supplies_firebase_options() {
    let temp = create_temp_project(APP_MODULE);
    fs::write(
        temp.path().join("graft.toml"),
        r#"
[firebase]
apiKey = "from-file"
authDomain = "d"
databaseURL = "u"
projectId = "p"
storageBucket = "b"
messagingSenderId = "m"
appId = "a"
"#,
    )
    .unwrap();

    graft()
        .current_dir(temp.path())
        .args(["setup", "--no-package-json"])
        .assert()
        .success();

    let env = read(temp.path(), "src/environments/environment.ts");
    assert!(env.contains("apiKey: 'from-file'"));
    assert!(env.contains("appId: 'a'"));
    assert_eq!(read(temp.path(), "package.json"), PACKAGE_JSON);
}

#[test]
fn aborted_run_exits_2_and_writes_nothing() {
    let broken = "import { NgModule } from '@angular/core';\n\nexport class AppModule {}\n";
    let temp = create_temp_project(broken);
    setup_in(temp.path()).assert().failure().code(2);

    assert_eq!(read(temp.path(), "src/app/app.module.ts"), broken);
    assert_eq!(read(temp.path(), "src/environments/environment.ts"), ENVIRONMENT);
}

#[test]
fn report_dir_receives_artifacts() {
    let temp = create_temp_project(APP_MODULE);
    setup_in(temp.path())
        .args(["--dry-run", "--report-dir", "out"])
        .assert()
        .success();

    let out = temp.path().join("out");
    assert!(out.join("report.json").is_file());
    assert!(out.join("patch.diff").is_file());
    let md = fs::read_to_string(out.join("report.md")).unwrap();
    assert!(md.contains("register-angular-fire"));
}
