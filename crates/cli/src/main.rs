//! Signature scanner command line.
//!
//! Opens every file given, lets the background scheduler scan them as an
//! editor would, then prints the symbol list of the displayed file.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use sigscan_core::{DocumentRegistry, ScanReason, Scheduler};
use sigscan_host::{LanguageStyles, ScanDriver, Workspace, parse_display_mode};
use tracing::info;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "sigscan")]
#[command(about = "List function signatures found by per-language extraction patterns")]
struct Args {
	/// Files to open, in tab order
	#[arg(required = true, value_name = "FILE")]
	files: Vec<PathBuf>,

	/// Styles file (TOML); the built-in styles are used otherwise
	#[arg(short, long, value_name = "PATH")]
	styles: Option<PathBuf>,

	/// File whose symbols are printed (defaults to the last file)
	#[arg(short, long, value_name = "FILE")]
	display: Option<PathBuf>,

	/// How symbols are rendered: name, name-and-args or signature
	#[arg(short, long, value_name = "MODE")]
	mode: Option<String>,

	/// Print where the first symbol with this name is defined
	#[arg(short, long, value_name = "NAME")]
	goto: Option<String>,

	/// Skip background scanning; only the displayed file is scanned
	#[arg(long)]
	no_autoscan: bool,

	/// Also print the keywords collected for the displayed file's language
	#[arg(short, long)]
	keywords: bool,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let subscriber = tracing_subscriber::fmt()
		.with_max_level(if args.verbose {
			tracing::Level::DEBUG
		} else {
			tracing::Level::INFO
		})
		.with_writer(std::io::stderr)
		.finish();
	tracing::subscriber::set_global_default(subscriber)?;

	let styles = match &args.styles {
		Some(path) => LanguageStyles::load(path)
			.with_context(|| format!("loading styles from {}", path.display()))?,
		None => LanguageStyles::builtin().context("parsing built-in styles")?,
	};
	let mut config = styles.scheduler_config();
	if let Some(mode) = &args.mode {
		config.display_mode = parse_display_mode(mode)?;
	}
	if args.no_autoscan {
		config.autoscan = false;
	}

	let mut workspace = Workspace::new();
	let mut docs = Vec::with_capacity(args.files.len());
	for path in &args.files {
		let doc = workspace
			.open_path(path, &styles)
			.with_context(|| format!("opening {}", path.display()))?;
		docs.push((doc, path));
	}

	let displayed = match &args.display {
		Some(wanted) => docs
			.iter()
			.find(|(_, path)| *path == wanted)
			.map(|(doc, _)| *doc)
			.with_context(|| format!("{} is not among the opened files", wanted.display()))?,
		None => match docs.last() {
			Some((doc, _)) => *doc,
			None => bail!("no files to scan"),
		},
	};
	workspace.set_displayed(displayed);
	let language = workspace.language(displayed);
	let displayed_path = docs
		.iter()
		.find(|(doc, _)| *doc == displayed)
		.map(|(_, path)| path.display().to_string())
		.unwrap_or_default();
	info!(
		files = docs.len(),
		displayed = %displayed_path,
		language = language.as_deref().unwrap_or("none"),
		"scanning"
	);

	let handle = ScanDriver::with_scheduler(Scheduler::new(config), workspace, styles).spawn();
	for (doc, _) in &docs {
		handle.notify(*doc, ScanReason::DocOpened).await?;
	}
	handle.wait_idle().await?;

	let results = handle.results().await?;
	for f in &results.functions {
		println!("{:>6}  {}", f.line + 1, f.display_text);
	}

	if let Some(name) = &args.goto {
		match handle.goto(name.as_str()).await? {
			Some(target) => println!("{displayed_path}:{}", target.line + 1),
			None => bail!("no symbol named {name} in {displayed_path}"),
		}
	}

	if args.keywords
		&& let Some(language) = &language
	{
		let keywords = handle.keywords(language.as_str()).await?;
		println!("{language}: {}", keywords.join(" "));
	}

	handle.shutdown().await?;
	Ok(())
}
