//! User-keyword table fed by the scanner.

use std::collections::{BTreeSet, HashMap};

use sigscan_core::KeywordSink;

/// Discovered function names per language, as a highlighter would consume them.
#[derive(Debug, Default, Clone)]
pub struct KeywordTable {
	by_language: HashMap<String, BTreeSet<String>>,
	/// Lexer refresh requests per language.
	refreshes: HashMap<String, usize>,
}

impl KeywordTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Known names for `language`, sorted.
	pub fn keywords(&self, language: &str) -> Vec<String> {
		self.by_language
			.get(language)
			.map(|set| set.iter().cloned().collect())
			.unwrap_or_default()
	}

	pub fn contains(&self, language: &str, name: &str) -> bool {
		self.by_language
			.get(language)
			.is_some_and(|set| set.contains(name))
	}

	/// Number of times the lexer for `language` was asked to refresh.
	pub fn refresh_count(&self, language: &str) -> usize {
		self.refreshes.get(language).copied().unwrap_or(0)
	}
}

impl KeywordSink for KeywordTable {
	fn add_keyword(&mut self, language: &str, name: &str) -> bool {
		self.by_language
			.entry(language.to_string())
			.or_default()
			.insert(name.to_string())
	}

	fn refresh_lexer(&mut self, language: &str) {
		*self.refreshes.entry(language.to_string()).or_default() += 1;
		tracing::debug!(
			language,
			keywords = self.by_language.get(language).map_or(0, BTreeSet::len),
			"lexer refresh"
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_reports_growth_once_per_name() {
		let mut table = KeywordTable::new();
		assert!(table.add_keyword("c", "main"));
		assert!(!table.add_keyword("c", "main"));
		assert!(table.add_keyword("rust", "main"));
		assert_eq!(table.keywords("c"), vec!["main".to_string()]);
		assert!(table.contains("rust", "main"));
		assert!(!table.contains("go", "main"));
	}
}
