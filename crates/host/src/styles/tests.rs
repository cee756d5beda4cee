use std::path::Path;
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;

const STYLES: &str = r#"
[scan]
display_mode = "signature"
slice_budget_ms = 10
max_background_len = 0

[languages.demo]
extensions = [".Demo", "dm"]
function_regex = '^func \w+\(.*\)'
function_regex_trim = ["func "]
function_regex_sort = 2

[languages.notes]
extensions = ["txt"]
"#;

#[test]
fn parses_languages_and_scan_settings() {
	let styles = LanguageStyles::from_toml(STYLES).unwrap();

	let demo = styles.language("demo").unwrap();
	assert_eq!(demo.pattern, r"^func \w+\(.*\)");
	assert_eq!(demo.trim_tokens, vec!["func ".to_string()]);
	assert_eq!(demo.sort, SortMode::AlternateKey);
	assert_eq!(demo.extensions, vec!["demo".to_string(), "dm".to_string()]);

	let cfg = styles.scheduler_config();
	assert_eq!(cfg.display_mode, DisplayMode::Signature);
	assert_eq!(cfg.slice_budget, Duration::from_millis(10));
	assert_eq!(cfg.max_background_len, None);
	assert_eq!(cfg.host_delay, Duration::from_millis(200));
	assert!(cfg.autoscan);
}

#[test]
fn language_without_regex_has_empty_pattern() {
	let styles = LanguageStyles::from_toml(STYLES).unwrap();
	assert_eq!(styles.extraction_pattern("notes"), "");
	assert_eq!(styles.extraction_pattern("unknown"), "");
	assert_eq!(styles.sort_mode("unknown"), SortMode::None);
}

#[test]
fn sort_mode_accepts_codes_and_names() {
	let styles = LanguageStyles::from_toml(
		r#"
		[languages.a]
		function_regex_sort = 1
		[languages.b]
		function_regex_sort = "alternate"
		[languages.c]
		function_regex_sort = "none"
		"#,
	)
	.unwrap();
	assert_eq!(styles.sort_mode("a"), SortMode::CaseInsensitive);
	assert_eq!(styles.sort_mode("b"), SortMode::AlternateKey);
	assert_eq!(styles.sort_mode("c"), SortMode::None);
}

#[test]
fn rejects_unknown_modes() {
	let err = LanguageStyles::from_toml("[languages.a]\nfunction_regex_sort = 7\n").unwrap_err();
	assert!(matches!(err, ConfigError::InvalidSortMode(ref s) if s == "7"));

	let err = LanguageStyles::from_toml("[scan]\ndisplay_mode = \"full\"\n").unwrap_err();
	assert!(matches!(err, ConfigError::InvalidDisplayMode(ref s) if s == "full"));

	let err = LanguageStyles::from_toml("[scan\n").unwrap_err();
	assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn detects_language_by_extension() {
	let styles = LanguageStyles::from_toml(STYLES).unwrap();
	assert_eq!(styles.language_for_path(Path::new("src/main.DM")), Some("demo"));
	assert_eq!(styles.language_for_path(Path::new("a.demo")), Some("demo"));
	assert_eq!(styles.language_for_path(Path::new("README")), None);
}

#[test]
fn builtin_styles_parse() {
	let styles = LanguageStyles::builtin().unwrap();
	assert_eq!(styles.language_for_path(Path::new("lib.rs")), Some("rust"));
	assert_eq!(styles.language_for_path(Path::new("x.h")), Some("c"));
	for (name, style) in styles.languages() {
		if !style.pattern.is_empty() {
			assert!(regex::Regex::new(&style.pattern).is_ok(), "bad builtin pattern for {name}");
		}
	}
	assert_eq!(styles.scheduler_config(), SchedulerConfig::default());
}
