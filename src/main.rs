use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use mkdroid::{project, ProjectConfig, SdkEnv, SharedConfig};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mkdroid")]
#[command(about = "Scaffold and customize Android SDK projects", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a project and apply the customization passes
    Create {
        /// Target platform API level, e.g. 19
        #[arg(short = 't', long)]
        api_level: u32,

        /// Fully-qualified main activity class, e.g. com.example.app.Main
        #[arg(short, long)]
        main_class: String,

        /// Display title injected into the string resources
        #[arg(long)]
        title: String,

        /// Project name handed to the scaffolder (default: destination directory name)
        #[arg(long)]
        name: Option<String>,

        /// Signed release artifact file name (default: <name>.apk)
        #[arg(long)]
        artifact: Option<String>,

        /// Inject ndk-build hooks into the build script
        #[arg(long)]
        native: bool,

        /// Inject custom build targets and load the shared keystore properties
        #[arg(long)]
        custom_build: bool,

        /// Strip the marked ant.properties block from the build script
        #[arg(long)]
        drop_build_props: bool,

        /// Replace the per-project ant.properties with a symlink to the shared copy
        #[arg(long)]
        drop_properties: bool,

        /// Remove the proguard stub and its dead config line
        #[arg(long)]
        drop_proguard: bool,

        /// Show a unified diff of each rewritten file
        #[arg(short, long)]
        diff: bool,

        /// Destination directory for the generated project
        dest: PathBuf,
    },

    /// Report the resolved SDK/NDK environment and shared config files
    Doctor {
        /// Destination whose shared config files should be checked
        #[arg(long)]
        dest: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Create {
            api_level,
            main_class,
            title,
            name,
            artifact,
            native,
            custom_build,
            drop_build_props,
            drop_properties,
            drop_proguard,
            diff,
            dest,
        } => {
            let name = name
                .or_else(|| {
                    dest.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                })
                .unwrap_or_default();
            let artifact = artifact.unwrap_or_else(|| format!("{name}.apk"));

            let cfg = ProjectConfig {
                api_level,
                main_class,
                title,
                name,
                artifact,
                dest,
                native_build: native,
                custom_build,
                drop_build_props,
                drop_properties,
                drop_proguard,
            };
            cmd_create(&cfg, diff)
        }

        Commands::Doctor { dest } => cmd_doctor(dest),
    }
}

fn cmd_create(cfg: &ProjectConfig, show_diff: bool) -> Result<()> {
    let sdk = SdkEnv::discover()?;
    println!(
        "{}",
        format!("Using SDK: {}", sdk.sdk_root().display()).dimmed()
    );
    if let Some(ndk) = sdk.ndk_root() {
        println!("{}", format!("Using NDK: {}", ndk.display()).dimmed());
    }

    let report = project::create(cfg, &sdk)?;

    println!(
        "{} Scaffolded {} ({}, {})",
        "✓".green(),
        cfg.dest.display(),
        cfg.target(),
        cfg.package()
    );

    for file in &report.rewritten {
        println!("{} Rewrote {}", "✓".green(), file.path.display());
        if show_diff {
            if let Ok(after) = fs::read_to_string(&file.path) {
                if file.before != after {
                    display_diff(&file.path, &file.before, &after);
                }
            }
        }
    }
    for path in &report.removed {
        println!("{} Removed {}", "✓".green(), path.display());
    }
    for path in &report.linked {
        println!("{} Linked {} to the shared copy", "✓".green(), path.display());
    }
    if let Some(ignore) = &report.ignore_file {
        println!("{} Wrote {}", "✓".green(), ignore.display());
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} files rewritten", format!("{}", report.rewritten.len()).green());
    println!("  {} markup files tidied", format!("{}", report.tidied).green());
    println!("  {} shared links", format!("{}", report.linked.len()).green());

    Ok(())
}

fn cmd_doctor(dest: Option<PathBuf>) -> Result<()> {
    println!("{}", "Environment".bold());

    let sdk = match SdkEnv::discover() {
        Ok(sdk) => sdk,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            std::process::exit(1);
        }
    };
    println!("{} SDK root: {}", "✓".green(), sdk.sdk_root().display());

    match sdk.ndk_root() {
        Some(ndk) => println!("{} NDK root: {}", "✓".green(), ndk.display()),
        None => println!(
            "{} NDK root: {}",
            "⊙".yellow(),
            "not found (native builds unavailable)".dimmed()
        ),
    }

    let mut missing = 0;
    match sdk.android_tool() {
        Ok(tool) => println!("{} scaffolder: {}", "✓".green(), tool.display()),
        Err(e) => {
            eprintln!("{} scaffolder: {}", "✗".red(), e);
            missing += 1;
        }
    }

    if let Some(dest) = dest {
        let shared = SharedConfig::beside(&dest);
        println!();
        println!("{}", "Shared config".bold());
        for path in [
            shared.local_properties(),
            shared.ant_properties(),
            shared.keystore_properties(),
        ] {
            if path.is_file() {
                println!("{} {}", "✓".green(), path.display());
            } else {
                println!("{} {} {}", "⊙".yellow(), path.display(), "(absent)".dimmed());
            }
        }
    }

    if missing > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Show a unified diff between the pre-image and the committed file.
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (rewritten)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
    println!();
}
