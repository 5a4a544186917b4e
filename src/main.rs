use anyhow::Result;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use plugin_release::cli;
use plugin_release::config;
use plugin_release::domain::ParsedTag;
use plugin_release::git::Git2Repository;
use plugin_release::locator::FsTree;
use plugin_release::output::{self, OutputFormat};
use plugin_release::ui;
use plugin_release::ReleaseError;

#[derive(clap::Parser)]
#[command(
    name = "plugin-release",
    version,
    about = "Resolve plugin name, version, artifact path and changelog from a release tag"
)]
struct Args {
    #[arg(
        short,
        long,
        env = "GITHUB_REF_NAME",
        help = "Release tag of the form <plugin>/v<version>"
    )]
    tag: String,

    #[arg(short, long, default_value = ".", help = "Path inside the repository")]
    repo: PathBuf,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Directory searched for plugin artifacts")]
    plugins_root: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[arg(
        long,
        env = "GITHUB_OUTPUT",
        help = "File that GitHub-format outputs are appended to"
    )]
    github_output: Option<PathBuf>,

    #[arg(long, help = "Also write the changelog body to this file")]
    notes_file: Option<PathBuf>,

    #[arg(long, help = "Enable debug logging")]
    debug: bool,
}

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Warn
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("plugin_release")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

/// Report a failed stage and exit non-zero
fn fail(err: &ReleaseError) -> ! {
    ui::display_error(&ui::format_stage_error(err));
    std::process::exit(1);
}

fn main() -> Result<()> {
    let args = Args::parse();

    initialize_logger(args.debug)?;

    // The tag stage runs before anything touches the repository
    let tag = match ParsedTag::parse(&args.tag) {
        Ok(tag) => tag,
        Err(e) => fail(&e),
    };

    // Load configuration
    let mut config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => fail(&e),
    };

    if let Some(root) = args.plugins_root {
        config.artifact.plugins_root = root;
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }

    let repo = match Git2Repository::open(&args.repo) {
        Ok(repo) => repo,
        Err(e) => fail(&e),
    };

    let tree = FsTree::new(repo.root());

    let metadata = match cli::resolve_parsed(tag, &tree, &repo, &config) {
        Ok(metadata) => metadata,
        Err(e) => fail(&e),
    };

    for warning in &metadata.warnings {
        ui::display_boundary_warning(warning);
    }

    if let Some(path) = &args.notes_file {
        fs::write(path, format!("{}\n", metadata.changelog_body))?;
        ui::display_status(&format!("Wrote release notes to {}", path.display()));
    }

    if let Err(e) = output::emit(&metadata, args.format, args.github_output.as_deref()) {
        fail(&e);
    }

    ui::display_release_summary(&metadata);
    ui::display_success(&format!(
        "Resolved {}/v{}",
        metadata.plugin_name, metadata.version
    ));

    Ok(())
}
