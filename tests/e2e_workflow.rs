//! End-to-end workflow tests over a pre-generated scaffolder tree.
//!
//! The scaffold step itself is a subprocess, so these tests lay down the
//! skeleton the scaffolder would have produced and drive the customization
//! pipeline against it.

use std::fs;
use std::path::{Path, PathBuf};

use mkdroid::{project, ProjectConfig, ProjectError, RewriteError, SharedConfig};
use tempfile::TempDir;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="com.example.app"
    android:versionCode="1"
    android:versionName="1.0">
    <application android:label="@string/app_name">
        <activity android:name="Main">
        </activity>
    </application>
</manifest>

"#;

const STRINGS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<resources>
    <string name="app_name">Main</string>
</resources>
"#;

const BUILD_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project name="example" default="help">
    <property file="local.properties" />
    <!-- The ant.properties file can be created by you. It is only edited by the
         'android' tool to add properties to it. -->
    <property file="ant.properties" />
    <!-- version-tag: 1 -->
    <!-- extension targets. Uncomment the ones where you want to do custom work -->
    <!-- <import file="custom_rules.xml" optional="true" /> -->
    <import file="${sdk.dir}/tools/ant/build.xml" />
</project>
"#;

const ANT_PROPERTIES: &str = "\
# This file is used to override default values used by the Ant build system.
# This file must be checked in Version Control Systems, as it is
# integral to the build system of your project.
key.store=release.keystore
";

const PROJECT_PROPERTIES: &str = "\
# Project target.
target=android-19
#proguard.config=${sdk.dir}/tools/proguard/proguard-android.txt:proguard-project.txt
";

/// Lay down the tree `android create project` would have generated.
fn scaffolded_tree(dest: &Path) {
    fs::create_dir_all(dest.join("src/com/example/app")).unwrap();
    fs::create_dir_all(dest.join("res/values")).unwrap();
    fs::create_dir_all(dest.join("res/layout")).unwrap();

    fs::write(dest.join("AndroidManifest.xml"), MANIFEST).unwrap();
    fs::write(dest.join("res/values/strings.xml"), STRINGS).unwrap();
    fs::write(
        dest.join("res/layout/main.xml"),
        "<LinearLayout>   \n</LinearLayout>\n",
    )
    .unwrap();
    fs::write(dest.join("build.xml"), BUILD_XML).unwrap();
    fs::write(dest.join("ant.properties"), ANT_PROPERTIES).unwrap();
    fs::write(dest.join("project.properties"), PROJECT_PROPERTIES).unwrap();
    fs::write(dest.join("proguard-project.txt"), "# proguard flags\n").unwrap();
    fs::write(
        dest.join("src/com/example/app/Main.java"),
        "package com.example.app;\n\npublic class Main {}\n",
    )
    .unwrap();
}

fn config(dest: PathBuf) -> ProjectConfig {
    ProjectConfig {
        api_level: 19,
        main_class: "com.example.app.Main".to_string(),
        title: r#"My "Cool" App"#.to_string(),
        name: "example".to_string(),
        artifact: "example.apk".to_string(),
        dest,
        native_build: false,
        custom_build: false,
        drop_build_props: false,
        drop_properties: false,
        drop_proguard: false,
    }
}

fn setup() -> (TempDir, ProjectConfig, SharedConfig) {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("app");
    scaffolded_tree(&dest);
    let shared = SharedConfig::beside(&dest);
    (dir, config(dest), shared)
}

#[test]
fn plain_create_flattens_titles_and_tidies() {
    let (_dir, cfg, shared) = setup();
    let report = project::customize_tree(&cfg, &shared).unwrap();

    // sources flattened
    assert!(cfg.dest.join("src/Main.java").is_file());
    assert!(!cfg.dest.join("src/com").exists());

    // title escaped into the string resource
    let strings = fs::read_to_string(cfg.dest.join("res/values/strings.xml")).unwrap();
    assert!(strings.contains(r#"<string name="app_name">My &quot;Cool&quot; App</string>"#));

    // uses-sdk before the application tag
    let manifest = fs::read_to_string(cfg.dest.join("AndroidManifest.xml")).unwrap();
    let sdk_pos = manifest.find("android:minSdkVersion=\"19\"").unwrap();
    let app_pos = manifest.find("<application").unwrap();
    assert!(sdk_pos < app_pos);

    // tidy dropped the manifest's trailing blank line and the layout's
    // trailing spaces
    assert!(manifest.ends_with("</manifest>\n"));
    let layout = fs::read_to_string(cfg.dest.join("res/layout/main.xml")).unwrap();
    assert_eq!(layout, "<LinearLayout>\n</LinearLayout>\n");

    // base ignore entries only
    let ignore = fs::read_to_string(cfg.dest.join(".gitignore")).unwrap();
    assert_eq!(ignore, "bin/\ngen/\nproguard/\nlocal.properties\n");

    assert_eq!(report.rewritten.len(), 2);
    assert_eq!(report.tidied, 4); // manifest, strings, layout, build.xml
    assert!(report.removed.is_empty());
}

#[test]
fn custom_native_build_rewrites_build_script_and_properties() {
    let (_dir, mut cfg, shared) = setup();
    cfg.custom_build = true;
    cfg.native_build = true;

    project::customize_tree(&cfg, &shared).unwrap();

    let build = fs::read_to_string(cfg.dest.join("build.xml")).unwrap();
    assert!(build.contains(r#"<loadproperties srcFile="../keystore.properties" />"#));
    assert!(build.contains(r#"<target name="clean-native">"#));
    assert!(build.contains(r#"<target name="-pre-build">"#));
    assert!(build.contains(r#"<target name="release-signed" depends="release">"#));
    assert!(build.contains(r#"tofile="bin/example.apk""#));
    assert!(build.contains("<!-- version-tag: custom -->"));

    let props = fs::read_to_string(cfg.dest.join("ant.properties")).unwrap();
    assert_eq!(props, "key.store=release.keystore\n");

    let ignore = fs::read_to_string(cfg.dest.join(".gitignore")).unwrap();
    assert_eq!(
        ignore,
        "bin/\ngen/\nproguard/\nlocal.properties\nobj/\nlibs/\nant.properties\n"
    );
}

#[test]
fn drop_build_props_strips_the_marked_block() {
    let (_dir, mut cfg, shared) = setup();
    cfg.drop_build_props = true;

    project::customize_tree(&cfg, &shared).unwrap();

    let build = fs::read_to_string(cfg.dest.join("build.xml")).unwrap();
    assert!(!build.contains("ant.properties"));
    assert!(build.contains(r#"<property file="local.properties" />"#));
    assert!(build.contains("<import file="));
}

#[test]
fn drop_proguard_removes_stub_and_dead_config_line() {
    let (_dir, mut cfg, shared) = setup();
    cfg.drop_proguard = true;

    let report = project::customize_tree(&cfg, &shared).unwrap();

    assert!(!cfg.dest.join("proguard-project.txt").exists());
    let props = fs::read_to_string(cfg.dest.join("project.properties")).unwrap();
    assert!(!props.contains("proguard.config"));
    assert!(props.contains("target=android-19"));
    assert!(report
        .removed
        .iter()
        .any(|p| p.ends_with("proguard-project.txt")));
}

#[test]
#[cfg(unix)]
fn drop_properties_replaces_copy_with_shared_symlink() {
    let (dir, mut cfg, shared) = setup();
    cfg.drop_properties = true;
    fs::write(dir.path().join("ant.properties"), "key.store=shared.keystore\n").unwrap();

    let report = project::customize_tree(&cfg, &shared).unwrap();

    let ant = cfg.dest.join("ant.properties");
    assert!(fs::symlink_metadata(&ant).unwrap().file_type().is_symlink());
    assert_eq!(
        fs::read_to_string(&ant).unwrap(),
        "key.store=shared.keystore\n"
    );
    assert!(report.linked.iter().any(|p| p.ends_with("ant.properties")));
}

#[test]
#[cfg(unix)]
fn local_properties_links_to_shared_copy_when_present() {
    let (dir, cfg, shared) = setup();
    fs::write(dir.path().join("local.properties"), "sdk.dir=/opt/android\n").unwrap();
    fs::write(cfg.dest.join("local.properties"), "sdk.dir=/stale\n").unwrap();

    project::customize_tree(&cfg, &shared).unwrap();

    let local = cfg.dest.join("local.properties");
    assert!(fs::symlink_metadata(&local).unwrap().file_type().is_symlink());
    assert_eq!(
        fs::read_to_string(&local).unwrap(),
        "sdk.dir=/opt/android\n"
    );
}

#[test]
fn integrity_failure_stops_the_run_without_cross_file_rollback() {
    let (_dir, cfg, shared) = setup();
    // break the manifest: no application tag, so step 2 must fail after
    // step 1 (strings.xml) has already committed
    fs::write(
        cfg.dest.join("AndroidManifest.xml"),
        "<manifest package=\"com.example.app\">\n</manifest>\n",
    )
    .unwrap();

    let err = project::customize_tree(&cfg, &shared).unwrap_err();
    match err {
        ProjectError::Rewrite(RewriteError::MissingEdits { missing, .. }) => {
            assert_eq!(missing, 1)
        }
        other => panic!("expected a missing-edit failure, got {other:?}"),
    }

    // earlier file committed
    let strings = fs::read_to_string(cfg.dest.join("res/values/strings.xml")).unwrap();
    assert!(strings.contains("&quot;Cool&quot;"));

    // failed file untouched
    let manifest = fs::read_to_string(cfg.dest.join("AndroidManifest.xml")).unwrap();
    assert_eq!(
        manifest,
        "<manifest package=\"com.example.app\">\n</manifest>\n"
    );

    // later steps never ran
    assert!(!cfg.dest.join(".gitignore").exists());
}

#[test]
#[cfg(unix)]
fn create_runs_scaffolder_then_customizes() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let sdk_root = dir.path().join("sdk");
    fs::create_dir_all(sdk_root.join("tools")).unwrap();
    let tool = sdk_root.join("tools/android");
    fs::write(&tool, "#!/bin/sh\nexit 0\n").unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let dest = dir.path().join("projects").join("app");
    fs::create_dir_all(dir.path().join("projects")).unwrap();
    scaffolded_tree(&dest);

    let sdk = mkdroid::SdkEnv::from_roots(&sdk_root, None);
    let report = project::create(&config(dest.clone()), &sdk).unwrap();

    assert_eq!(report.rewritten.len(), 2);
    assert!(dest.join("src/Main.java").is_file());
}

#[test]
#[cfg(unix)]
fn custom_build_without_shared_keystore_fails_before_any_rewrite() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let sdk_root = dir.path().join("sdk");
    fs::create_dir_all(sdk_root.join("tools")).unwrap();
    let tool = sdk_root.join("tools/android");
    fs::write(&tool, "#!/bin/sh\nexit 0\n").unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let dest = dir.path().join("projects").join("app");
    fs::create_dir_all(dir.path().join("projects")).unwrap();
    scaffolded_tree(&dest);

    let mut cfg = config(dest.clone());
    cfg.custom_build = true;

    let sdk = mkdroid::SdkEnv::from_roots(&sdk_root, None);
    let err = project::create(&cfg, &sdk).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Env(mkdroid::EnvError::SharedFileMissing { .. })
    ));

    // preflight failed, so nothing was rewritten
    let strings = fs::read_to_string(dest.join("res/values/strings.xml")).unwrap();
    assert_eq!(strings, STRINGS);
}
