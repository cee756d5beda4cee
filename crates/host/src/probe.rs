//! Regex probe over a rope.

use std::borrow::Cow;
use std::cell::RefCell;

use regex::{Regex, RegexBuilder};
use ropey::Rope;
use sigscan_core::{ProbeError, ProbeMatch, TextProbe};

/// Most recently compiled extraction pattern.
///
/// Scans of one language run back to back, so a single slot avoids
/// recompiling the pattern on every slice.
#[derive(Debug, Default)]
pub struct PatternCache {
	cached: RefCell<Option<(String, Regex)>>,
}

impl PatternCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the compiled form of `pattern`.
	///
	/// Patterns are compiled in multi-line mode so `^` and `$` anchor at line
	/// boundaries, as editor search does.
	pub fn get(&self, pattern: &str) -> Result<Regex, ProbeError> {
		let mut slot = self.cached.borrow_mut();
		if let Some((source, re)) = slot.as_ref()
			&& source == pattern
		{
			return Ok(re.clone());
		}
		let re = RegexBuilder::new(pattern)
			.multi_line(true)
			.build()
			.map_err(|e| ProbeError::InvalidPattern {
				pattern: pattern.to_string(),
				message: e.to_string(),
			})?;
		*slot = Some((pattern.to_string(), re.clone()));
		Ok(re)
	}
}

/// [`TextProbe`] over one document's rope.
///
/// Regex search needs a contiguous view of the text. It is built on the first
/// search: a rope stored in a single chunk is borrowed, otherwise it is
/// flattened once and kept until [`detach`](TextProbe::detach). Length, line
/// and range queries read the rope directly.
pub struct RopeProbe<'a> {
	rope: &'a Rope,
	text: Option<Cow<'a, str>>,
	patterns: &'a PatternCache,
}

impl<'a> RopeProbe<'a> {
	pub fn new(rope: &'a Rope, patterns: &'a PatternCache) -> Self {
		Self {
			rope,
			text: None,
			patterns,
		}
	}

	fn contiguous(&mut self) -> &str {
		let rope = self.rope;
		self.text.get_or_insert_with(|| match rope.slice(..).as_str() {
			Some(s) => Cow::Borrowed(s),
			None => Cow::Owned(rope.to_string()),
		})
	}

	/// Char index of the first char starting at or after byte `i`.
	fn ceil_char(&self, i: usize) -> usize {
		let c = self.rope.byte_to_char(i);
		if self.rope.char_to_byte(c) < i { c + 1 } else { c }
	}
}

/// Smallest char boundary of `s` at or after `i`.
fn ceil_boundary(s: &str, i: usize) -> usize {
	let mut i = i.min(s.len());
	while !s.is_char_boundary(i) {
		i += 1;
	}
	i
}

impl TextProbe for RopeProbe<'_> {
	fn find_next(&mut self, pattern: &str, from: usize) -> Result<Option<ProbeMatch>, ProbeError> {
		let re = self.patterns.get(pattern)?;
		let text = self.contiguous();
		let from = ceil_boundary(text, from);
		Ok(re.find_at(text, from).map(|m| ProbeMatch {
			start: m.start(),
			end: m.end(),
		}))
	}

	fn text_range(&self, start: usize, end: usize) -> String {
		let len = self.rope.len_bytes();
		let start = self.rope.byte_to_char(start.min(len));
		let end = self.ceil_char(end.min(len)).max(start);
		self.rope.slice(start..end).to_string()
	}

	fn len(&self) -> usize {
		self.rope.len_bytes()
	}

	fn line_of(&self, offset: usize) -> usize {
		self.rope.byte_to_line(offset.min(self.rope.len_bytes()))
	}

	fn detach(&mut self) {
		self.text = None;
	}
}
