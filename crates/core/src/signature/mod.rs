//! Signature normalization and name extraction.
//!
//! Extraction patterns are plain regexes and happily match things that are
//! not signatures (`case ISD::SHL: switch (VT.SimpleTy)`). Nothing here
//! rejects such matches: an unparseable span is surfaced verbatim so a bad
//! pattern stays visible in the symbol list.

use crate::types::{DisplayMode, FunctionInfo};

/// Characters after which a declarator name starts.
const WORD_SEPARATORS: [char; 5] = [' ', '\t', ':', ',', '.'];

/// Leading pointer/reference markers dropped from a name.
const SIGILS: [char; 3] = ['*', '&', '^'];

/// Name and argument list split out of a normalized signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedSignature<'a> {
	pub name: &'a str,
	/// The name through the end of the signature, e.g. `alpha(x)`.
	pub name_and_args: &'a str,
}

/// Removes `/* ... */` spans. An unterminated comment runs to the end of `text`.
pub fn strip_comments(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut rest = text;
	while let Some(open) = rest.find("/*") {
		out.push_str(&rest[..open]);
		match rest[open + 2..].find("*/") {
			Some(close) => rest = &rest[open + 2 + close + 2..],
			None => return out,
		}
	}
	out.push_str(rest);
	out
}

/// Folds tabs and newlines into single spaces and drops `\r` and `{`.
fn collapse_whitespace(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		let c = match c {
			'\r' | '{' => continue,
			'\n' | '\t' => ' ',
			c => c,
		};
		if c == ' ' && out.ends_with(' ') {
			continue;
		}
		out.push(c);
	}
	out
}

/// Produces the canonical signature text for a raw match.
///
/// Comments go first, then whitespace is folded, then every trim token is
/// removed wherever it occurs (case-sensitive). Whitespace is folded again
/// because removing a token can leave two spaces side by side.
pub fn normalize(raw: &str, trim_tokens: &[String]) -> String {
	let mut sig = collapse_whitespace(&strip_comments(raw));
	let mut trimmed = false;
	for token in trim_tokens.iter().filter(|t| !t.is_empty()) {
		if sig.contains(token.as_str()) {
			sig = sig.replace(token.as_str(), "");
			trimmed = true;
		}
	}
	if trimmed {
		sig = collapse_whitespace(&sig);
	}
	sig.trim().to_string()
}

/// Splits a normalized signature into its name and `name(args)` tail.
///
/// Returns `None` when there is no `(` or nothing name-like precedes it.
/// Unlike a plain split at the `(`, whitespace between the name and the
/// argument list is skipped on purpose, so `alpha (x)` yields `alpha`
/// instead of falling back to the verbatim span.
pub fn parse(sig: &str) -> Option<ParsedSignature<'_>> {
	let brace = sig.find('(')?;
	let head = sig[..brace].trim_end();
	let mut start = head.rfind(WORD_SEPARATORS).map_or(0, |p| p + 1);
	while head[start..].starts_with(SIGILS) {
		start += 1;
	}
	let name = head[start..].trim();
	if name.is_empty() {
		return None;
	}
	Some(ParsedSignature {
		name,
		name_and_args: &sig[start..],
	})
}

/// Inserts a single space before the first `(` unless one is already there.
fn space_before_args(text: &str) -> String {
	match text.find('(') {
		Some(p) if p > 0 && !text[..p].ends_with(' ') => {
			format!("{} {}", &text[..p], &text[p..])
		}
		_ => text.to_string(),
	}
}

/// Builds the [`FunctionInfo`] for a normalized signature found on `line`.
pub fn function_info(line: usize, sig: String, mode: DisplayMode) -> FunctionInfo {
	let Some(parsed) = parse(&sig) else {
		return FunctionInfo {
			line,
			name: sig.clone(),
			display_text: sig.clone(),
			raw_signature: sig,
		};
	};
	let display_text = match mode {
		DisplayMode::Name => parsed.name.to_string(),
		DisplayMode::NameAndArgs => space_before_args(parsed.name_and_args),
		DisplayMode::Signature => space_before_args(&sig),
	};
	FunctionInfo {
		line,
		name: parsed.name.to_string(),
		display_text,
		raw_signature: sig,
	}
}

/// Sort key for [`crate::SortMode::AlternateKey`].
///
/// Takes the word that precedes the final parameter list, so
/// `static struct node *make_node (int)` sorts under `make_node` rather than
/// under its return type. Parentheses nested inside the arguments, as in
/// `int f(int (*cb)(int))`, do not count as a parameter list.
pub fn alternate_sort_key(sig: &str) -> String {
	let head = match last_top_level_paren(sig) {
		Some(p) => sig[..p].trim_end(),
		None => sig,
	};
	let word = head.rsplit(char::is_whitespace).next().unwrap_or(head);
	word.trim_start_matches(SIGILS).to_lowercase()
}

/// Byte offset of the `(` opening the last parenthesized group at depth zero.
fn last_top_level_paren(sig: &str) -> Option<usize> {
	let mut depth = 0usize;
	let mut last = None;
	for (i, c) in sig.char_indices() {
		match c {
			'(' => {
				if depth == 0 {
					last = Some(i);
				}
				depth += 1;
			}
			')' => depth = depth.saturating_sub(1),
			_ => {}
		}
	}
	last
}

#[cfg(test)]
mod tests;
