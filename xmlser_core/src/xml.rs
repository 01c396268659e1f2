//! XML name legality checks and entity escaping.

use std::borrow::Cow;

use crate::NameError;

/// Check that `name` can be used as a tag name.
pub fn check_tag(name: &str) -> Result<(), NameError> {
	let Some(first) = name.chars().next() else {
		return Err(NameError::EmptyTag);
	};

	if first.is_numeric() {
		return Err(NameError::LeadingDigit);
	}

	if name
		.get(..3)
		.is_some_and(|prefix| prefix.eq_ignore_ascii_case("xml"))
	{
		return Err(NameError::ReservedPrefix);
	}

	if name
		.chars()
		.any(|c| matches!(c, '<' | '>' | '&' | '"' | '\'') || c.is_whitespace())
	{
		return Err(NameError::SpecialCharacter);
	}

	Ok(())
}

/// Check that `name` can be used as an attribute name.
pub fn check_attribute(name: &str) -> Result<(), NameError> {
	let mut chars = name.chars();
	let Some(first) = chars.next() else {
		return Err(NameError::EmptyAttribute);
	};

	if !first.is_alphabetic() && !matches!(first, '_' | ':') {
		return Err(NameError::InvalidAttributeStart);
	}

	if !chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '.' | '-')) {
		return Err(NameError::InvalidAttributeCharacter);
	}

	Ok(())
}

/// Escape `&`, `<` and `>` for text content.
pub fn escape_text(text: &str) -> Cow<'_, str> {
	escape(text, false)
}

/// Escape `&`, `<`, `>` and both quote characters for an attribute value.
pub fn escape_attribute(text: &str) -> Cow<'_, str> {
	escape(text, true)
}

fn escape(text: &str, quotes: bool) -> Cow<'_, str> {
	let needs_escape = |c: char| matches!(c, '&' | '<' | '>') || (quotes && matches!(c, '"' | '\''));

	let Some(start) = text.find(needs_escape) else {
		return Cow::Borrowed(text);
	};

	let mut escaped = String::with_capacity(text.len() + 8);
	escaped.push_str(&text[..start]);

	for c in text[start..].chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' if quotes => escaped.push_str("&quot;"),
			'\'' if quotes => escaped.push_str("&apos;"),
			c => escaped.push(c),
		}
	}

	Cow::Owned(escaped)
}
