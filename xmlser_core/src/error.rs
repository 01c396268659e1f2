use std::fmt;

use miette::Diagnostic;
use miette::SourceSpan;
use thiserror::Error;

/// Number of characters shown on either side of the offending offset.
const CONTEXT_CHARS: usize = 10;

/// The grammar violation behind a [`FormatError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatErrorKind {
	InvalidAttribute,
	InvalidValue,
	InvalidRepetition,
	InvalidName,
	InvalidTag,
	InvalidCondition,
	UnexpectedEnd,
	TrailingCharacters,
}

impl FormatErrorKind {
	/// The message used when the compiler has nothing more specific to say.
	pub fn default_message(self) -> &'static str {
		match self {
			Self::InvalidAttribute => "Invalid attribute",
			Self::InvalidValue => "Invalid value",
			Self::InvalidRepetition => "Invalid repetition",
			Self::InvalidName => "Invalid name",
			Self::InvalidTag => "Invalid tag",
			Self::InvalidCondition => "Invalid condition",
			Self::UnexpectedEnd => "Unexpected end of format",
			Self::TrailingCharacters => "Trailing format characters",
		}
	}

	fn help(self) -> &'static str {
		match self {
			Self::InvalidAttribute => "lookup keys are identifiers, digits or quoted strings, e.g. `.name.0`",
			Self::InvalidValue => {
				"values are `?`, a lookup like `.name`, a quoted string or, where allowed, a bare \
				 word or integer"
			}
			Self::InvalidRepetition => "repeat with `*` followed by a lookup, `?` or an integer count",
			Self::InvalidName => "XML names must not be empty, start with a digit or start with `xml`",
			Self::InvalidTag => "inside a tag only `<`, `=`, `&`, `{`, `~` and the closing `>` are allowed",
			Self::InvalidCondition => "conditional operators are `?`, `=`, `<`, `>` and `/`",
			Self::UnexpectedEnd => "close every `<` with `>` and every `{` with `}`",
			Self::TrailingCharacters => {
				"a document has exactly one root tag; compile as a fragment for several"
			}
		}
	}
}

impl fmt::Display for FormatErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.default_message())
	}
}

/// A grammar violation found while compiling a format string.
///
/// Carries the byte offset of the problem together with a short window of
/// the surrounding format text so it reads well without the full source.
#[derive(Debug, Clone, Diagnostic, Error, PartialEq, Eq)]
#[error("{message} at {offset} around {before:?}, {after:?}")]
#[diagnostic(code(xmlser::format))]
pub struct FormatError {
	pub kind: FormatErrorKind,
	pub message: String,
	/// Byte offset into the format string.
	pub offset: usize,
	/// Up to ten characters preceding `offset`.
	pub before: String,
	/// Up to ten characters starting at `offset`.
	pub after: String,
	#[help]
	help: Option<String>,
	#[source_code]
	source_code: String,
	#[label("here")]
	span: SourceSpan,
}

impl FormatError {
	pub fn new(kind: FormatErrorKind, format: &str, offset: usize) -> Self {
		Self::with_message(kind, kind.default_message(), format, offset)
	}

	pub fn with_message(
		kind: FormatErrorKind,
		message: impl Into<String>,
		format: &str,
		offset: usize,
	) -> Self {
		let offset = offset.min(format.len());
		let (head, tail) = format.split_at(offset);
		let skip = head.chars().count().saturating_sub(CONTEXT_CHARS);
		let width = tail.chars().next().map_or(0, char::len_utf8);

		Self {
			kind,
			message: message.into(),
			offset,
			before: head.chars().skip(skip).collect(),
			after: tail.chars().take(CONTEXT_CHARS).collect(),
			help: Some(kind.help().to_string()),
			source_code: format.to_string(),
			span: SourceSpan::new(offset.into(), width),
		}
	}

	/// The full format string the error was raised for.
	pub fn format(&self) -> &str {
		&self.source_code
	}
}

/// Why a single lookup step failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum LookupFailure {
	#[error("no such key")]
	MissingKey,
	#[error("index out of range for a list of length {len}")]
	IndexOutOfRange { len: usize },
	#[error("record `{record}` has no such field")]
	MissingField { record: String },
	#[error("{type_name} values have no keys, fields or indices")]
	Unsupported { type_name: &'static str },
}

/// Which kind of XML name failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameTarget {
	Tag,
	Attribute,
}

impl fmt::Display for NameTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Tag => f.write_str("tag"),
			Self::Attribute => f.write_str("attribute"),
		}
	}
}

/// XML name legality failures.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Hash)]
pub enum NameError {
	#[error("XML tag must not be empty")]
	EmptyTag,
	#[error("XML tag must not start with a digit")]
	LeadingDigit,
	#[error("XML tag must not start with \"xml\"")]
	ReservedPrefix,
	#[error("XML tag must not contain special characters")]
	SpecialCharacter,
	#[error("XML attribute name must not be empty")]
	EmptyAttribute,
	#[error("XML attribute name must start with a letter, underscore or colon")]
	InvalidAttributeStart,
	#[error("XML attribute name contains invalid characters")]
	InvalidAttributeCharacter,
}

/// A failure while evaluating a compiled template against a value. These
/// signal that the data does not match what the template expects.
#[derive(Debug, Clone, Diagnostic, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValueError {
	#[error("lookup of `{key}` failed: {reason}")]
	#[diagnostic(
		code(xmlser::lookup),
		help("check that the input has the field, key or index the format string expects")
	)]
	Lookup { key: String, reason: LookupFailure },

	#[error("invalid {target} name `{name}` (from offset {offset}): {reason}")]
	#[diagnostic(code(xmlser::invalid_name))]
	InvalidName {
		target: NameTarget,
		name: String,
		reason: NameError,
		/// Byte offset of the name expression in the format string.
		offset: usize,
	},

	#[error("cannot repeat over a {type_name} value")]
	#[diagnostic(
		code(xmlser::not_iterable),
		help("repetition sources must be lists, mappings, strings, bytes or integer counts")
	)]
	NotIterable { type_name: &'static str },

	#[error("cannot generate tags from a {type_name} value")]
	#[diagnostic(
		code(xmlser::not_mapping),
		help("`<~...>` tags need a mapping whose keys become tag names")
	)]
	NotMapping { type_name: &'static str },

	#[error("a {type_name} value cannot contain other values")]
	#[diagnostic(code(xmlser::not_container))]
	NotContainer { type_name: &'static str },

	#[error("cannot compare a {lhs} value with a {rhs} value")]
	#[diagnostic(code(xmlser::incomparable))]
	Incomparable {
		lhs: &'static str,
		rhs: &'static str,
	},
}

/// Every failure the library and the command line can report.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum XmlserError {
	#[error(transparent)]
	#[diagnostic(transparent)]
	Format(#[from] FormatError),

	#[error(transparent)]
	#[diagnostic(transparent)]
	Value(#[from] ValueError),

	#[error(transparent)]
	#[diagnostic(code(xmlser::io_error))]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	#[diagnostic(code(xmlser::fmt_error))]
	Fmt(#[from] fmt::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(xmlser::config_parse),
		help("check that xmlser.toml is valid TOML with an optional [templates] table")
	)]
	ConfigParse(String),

	#[error("failed to parse input data: {0}")]
	#[diagnostic(code(xmlser::input_parse), help("input data must be a JSON document"))]
	InputParse(String),

	#[error("unknown template: `{0}`")]
	#[diagnostic(
		code(xmlser::unknown_template),
		help("define it under [templates] in xmlser.toml")
	)]
	UnknownTemplate(String),
}

pub type XmlserResult<T> = Result<T, XmlserError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
