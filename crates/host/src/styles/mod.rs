//! Per-language extraction styles loaded from TOML.
//!
//! ```toml
//! [scan]
//! display_mode = "name-and-args"
//! slice_budget_ms = 50
//!
//! [languages.c]
//! extensions = ["c", "h"]
//! function_regex = '^\w[\w \t\*]*\([^;\)]*\)[ \t\r\n]*\{'
//! function_regex_trim = ["static ", "inline "]
//! function_regex_sort = 2
//! ```
//!
//! Every key is optional. A language without `function_regex` is never
//! scanned.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use sigscan_core::{DisplayMode, SchedulerConfig, SortMode, StyleConfig};

use crate::error::{ConfigError, Result};

/// Styles shipped with the crate.
const BUILTIN_STYLES: &str = include_str!("../../styles.toml");

#[derive(Debug, Default, Deserialize)]
struct StylesFile {
	#[serde(default)]
	scan: RawScan,
	#[serde(default)]
	languages: BTreeMap<String, RawLanguage>,
}

#[derive(Debug, Default, Deserialize)]
struct RawScan {
	display_mode: Option<String>,
	autoscan: Option<bool>,
	host_delay_ms: Option<u64>,
	continue_delay_ms: Option<u64>,
	slice_budget_ms: Option<u64>,
	/// Zero disables the cap.
	max_background_len: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLanguage {
	#[serde(default)]
	extensions: Vec<String>,
	#[serde(default)]
	function_regex: String,
	#[serde(default)]
	function_regex_trim: Vec<String>,
	function_regex_sort: Option<RawSortMode>,
}

/// Sort modes are numeric in legacy style files.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSortMode {
	Code(i64),
	Name(String),
}

fn parse_sort_mode(raw: RawSortMode) -> Result<SortMode> {
	match raw {
		RawSortMode::Code(0) => Ok(SortMode::None),
		RawSortMode::Code(1) => Ok(SortMode::CaseInsensitive),
		RawSortMode::Code(2) => Ok(SortMode::AlternateKey),
		RawSortMode::Code(n) => Err(ConfigError::InvalidSortMode(n.to_string())),
		RawSortMode::Name(name) => match name.as_str() {
			"none" => Ok(SortMode::None),
			"case-insensitive" => Ok(SortMode::CaseInsensitive),
			"alternate" => Ok(SortMode::AlternateKey),
			_ => Err(ConfigError::InvalidSortMode(name)),
		},
	}
}

/// Parses a display mode name as written in a styles file or on the command line.
pub fn parse_display_mode(name: &str) -> Result<DisplayMode> {
	match name {
		"name" => Ok(DisplayMode::Name),
		"name-and-args" => Ok(DisplayMode::NameAndArgs),
		"signature" => Ok(DisplayMode::Signature),
		_ => Err(ConfigError::InvalidDisplayMode(name.to_string())),
	}
}

/// Extraction settings for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageStyle {
	pub pattern: String,
	pub trim_tokens: Vec<String>,
	pub sort: SortMode,
	/// File extensions, lowercase and without the leading dot.
	pub extensions: Vec<String>,
}

/// Read-only style table handed to the scheduler as its [`StyleConfig`].
#[derive(Debug, Clone, Default)]
pub struct LanguageStyles {
	languages: BTreeMap<String, LanguageStyle>,
	scan: SchedulerConfig,
}

impl LanguageStyles {
	/// Parses a styles document.
	pub fn from_toml(source: &str) -> Result<Self> {
		let file: StylesFile = toml::from_str(source)?;

		let mut languages = BTreeMap::new();
		for (name, raw) in file.languages {
			let sort = raw
				.function_regex_sort
				.map(parse_sort_mode)
				.transpose()?
				.unwrap_or_default();
			let extensions = raw
				.extensions
				.iter()
				.map(|e| e.trim_start_matches('.').to_lowercase())
				.collect();
			languages.insert(
				name,
				LanguageStyle {
					pattern: raw.function_regex,
					trim_tokens: raw.function_regex_trim,
					sort,
					extensions,
				},
			);
		}

		let mut scan = SchedulerConfig::default();
		let raw = file.scan;
		if let Some(mode) = raw.display_mode.as_deref() {
			scan.display_mode = parse_display_mode(mode)?;
		}
		if let Some(autoscan) = raw.autoscan {
			scan.autoscan = autoscan;
		}
		if let Some(ms) = raw.host_delay_ms {
			scan.host_delay = Duration::from_millis(ms);
		}
		if let Some(ms) = raw.continue_delay_ms {
			scan.continue_delay = Duration::from_millis(ms);
		}
		if let Some(ms) = raw.slice_budget_ms {
			scan.slice_budget = Duration::from_millis(ms);
		}
		if let Some(len) = raw.max_background_len {
			scan.max_background_len = (len > 0).then_some(len);
		}

		Ok(Self { languages, scan })
	}

	/// Reads and parses a styles file.
	pub fn load(path: &Path) -> Result<Self> {
		let source = fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let styles = Self::from_toml(&source)?;
		tracing::debug!(
			path = %path.display(),
			languages = styles.languages.len(),
			"loaded styles"
		);
		Ok(styles)
	}

	/// The styles bundled with this crate.
	pub fn builtin() -> Result<Self> {
		Self::from_toml(BUILTIN_STYLES)
	}

	pub fn language(&self, name: &str) -> Option<&LanguageStyle> {
		self.languages.get(name)
	}

	pub fn languages(&self) -> impl Iterator<Item = (&str, &LanguageStyle)> {
		self.languages.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Adds or replaces the style for `name`.
	pub fn insert(&mut self, name: impl Into<String>, style: LanguageStyle) {
		self.languages.insert(name.into(), style);
	}

	/// Language whose extensions include the extension of `path`.
	pub fn language_for_path(&self, path: &Path) -> Option<&str> {
		let ext = path.extension()?.to_str()?.to_lowercase();
		self.languages
			.iter()
			.find(|(_, style)| style.extensions.contains(&ext))
			.map(|(name, _)| name.as_str())
	}

	/// Scheduler settings from the `[scan]` table.
	pub fn scheduler_config(&self) -> SchedulerConfig {
		self.scan
	}
}

impl StyleConfig for LanguageStyles {
	fn extraction_pattern(&self, language: &str) -> String {
		self.languages
			.get(language)
			.map(|s| s.pattern.clone())
			.unwrap_or_default()
	}

	fn trim_tokens(&self, language: &str) -> Vec<String> {
		self.languages
			.get(language)
			.map(|s| s.trim_tokens.clone())
			.unwrap_or_default()
	}

	fn sort_mode(&self, language: &str) -> SortMode {
		self.languages
			.get(language)
			.map(|s| s.sort)
			.unwrap_or_default()
	}
}

#[cfg(test)]
mod tests;
