//! The fixed rule tables applied to each generated file.
//!
//! Markers here are deliberately narrow substrings of the scaffolder's
//! template output. If a scaffolder release reshuffles a template, the count
//! gate fails loudly instead of producing a half-customized project.

use std::path::Path;

use crate::config::ProjectConfig;
use crate::marker::{escape_xml, Marker};
use crate::rewrite::RewriteError;
use crate::rules::{drop_phrases, strip_marked_span, Action, EditRule, RuleSet};

/// Header comment the scaffolder writes into ant.properties, dropped in
/// custom-build mode, one line per phrase, in this order.
pub const PROPERTIES_BOILERPLATE: &[&str] = &[
    "This file is used to override default values used by the Ant build system.",
    "This file must be checked in Version Control Systems, as it is",
    "integral to the build system of your project.",
];

/// Replace the `app_name` string resource's text with the escaped title.
pub fn set_app_title(strings_xml: &Path, title: &str) -> Result<(), RewriteError> {
    RuleSet::new(vec![EditRule::counted(
        Marker::regex(r#"name="app_name">(.+)</"#),
        Action::SubstituteCapture(escape_xml(title)),
    )])
    .run(strings_xml, "app_name string")
}

/// Insert a `<uses-sdk>` declaration before the `<application` opener.
pub fn declare_sdk_versions(manifest: &Path, api_level: u32) -> Result<(), RewriteError> {
    let block = format!(
        "    <uses-sdk\n        android:minSdkVersion=\"{api_level}\"\n        android:targetSdkVersion=\"{api_level}\" />"
    );
    RuleSet::new(vec![EditRule::counted(
        Marker::substring("<application"),
        Action::InsertBefore(block),
    )])
    .run(manifest, "application tag")
}

/// Custom-build rewrite of build.xml: keystore property load, optional
/// native hooks, signed release/install targets, and a version-tag pin so
/// SDK tooling stops regenerating the file.
///
/// Expected count is 3, or 4 in native-build mode.
pub fn customize_build_script(build_xml: &Path, cfg: &ProjectConfig) -> Result<(), RewriteError> {
    let mut rules = vec![EditRule::counted(
        Marker::substring(r#"<property file="ant.properties""#),
        Action::InsertAfter(
            r#"    <loadproperties srcFile="../keystore.properties" />"#.to_string(),
        ),
    )];

    if cfg.native_build {
        rules.push(EditRule::counted(
            Marker::substring("<!-- extension targets"),
            Action::InsertAfter(native_targets()),
        ));
    }

    rules.push(EditRule::counted(
        Marker::substring(r#"<import file="custom_rules.xml""#),
        Action::InsertAfter(signed_targets(&cfg.artifact)),
    ));

    rules.push(EditRule::counted(
        Marker::regex(r"version-tag: (\d+)"),
        Action::SubstituteCapture("custom".to_string()),
    ));

    RuleSet::new(rules).run(build_xml, "build script markers")
}

/// Remove-build-props mode: delete the explanatory comment block through the
/// property declaration, inclusive.
pub fn strip_build_properties_block(build_xml: &Path) -> Result<(), RewriteError> {
    strip_marked_span(
        build_xml,
        "ant.properties block markers",
        &Marker::substring("The ant.properties file can be created by you"),
        &Marker::substring(r#"<property file="ant.properties""#),
    )
}

/// Drop the scaffolder's ant.properties header comment.
pub fn strip_properties_boilerplate(ant_properties: &Path) -> Result<(), RewriteError> {
    drop_phrases(
        ant_properties,
        "properties boilerplate",
        PROPERTIES_BOILERPLATE,
    )
}

/// Drop the commented-out proguard.config line from project.properties.
pub fn strip_proguard_config(project_properties: &Path) -> Result<(), RewriteError> {
    RuleSet::new(vec![EditRule::counted(
        Marker::substring("proguard.config="),
        Action::Drop,
    )])
    .run(project_properties, "proguard config line")
}

fn native_targets() -> String {
    r#"    <target name="clean-native">
        <exec executable="${ndk.dir}/ndk-build" failonerror="true">
            <arg value="clean" />
        </exec>
    </target>

    <target name="-pre-build">
        <exec executable="${ndk.dir}/ndk-build" failonerror="true" />
    </target>"#
        .to_string()
}

fn signed_targets(artifact: &str) -> String {
    format!(
        r#"    <target name="release-signed" depends="release">
        <copy file="bin/${{ant.project.name}}-release.apk" tofile="bin/{artifact}" />
    </target>

    <target name="install-signed" depends="release-signed">
        <exec executable="${{sdk.dir}}/platform-tools/adb" failonerror="true">
            <arg value="install" />
            <arg value="-r" />
            <arg value="bin/{artifact}" />
        </exec>
    </target>

    <target name="help-signed">
        <echo message="release-signed: build bin/{artifact} with the shared keystore" />
        <echo message="install-signed: build and adb-install bin/{artifact}" />
    </target>"#
    )
}
