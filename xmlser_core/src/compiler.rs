use std::borrow::Cow;

use snailquote::unescape;
use tracing::debug;

use crate::AttributeNode;
use crate::ConditionalNode;
use crate::FormatError;
use crate::FormatErrorKind;
use crate::GroupNode;
use crate::Key;
use crate::Node;
use crate::Operator;
use crate::RepeatNode;
use crate::RepeatSource;
use crate::Root;
use crate::TagNode;
use crate::TextNode;
use crate::Value;
use crate::ValueError;
use crate::ValueExpr;
use crate::eval;

/// Characters that end a bare word literal.
const SPECIAL: &str = "*/?.\"<=&{~>}";

type CompileResult<T> = Result<T, FormatError>;

/// Which literal forms a value position accepts.
#[derive(Debug, Clone, Copy)]
struct ValueOptions {
	/// Quoted strings, and bare words when `unquoted` is also set.
	strings: bool,
	/// Bare words and integers.
	unquoted: bool,
	/// Integers, when `unquoted` is also set.
	numbers: bool,
}

impl ValueOptions {
	const ANY: Self = Self {
		strings: true,
		unquoted: true,
		numbers: true,
	};
	/// Tag names, attribute names and text.
	const NO_NUMBERS: Self = Self {
		numbers: false,
		..Self::ANY
	};
	/// Repetition sources and conditional left-hand sides.
	const NO_STRINGS: Self = Self {
		strings: false,
		..Self::ANY
	};
	/// Attribute values.
	const QUOTED_ONLY: Self = Self {
		unquoted: false,
		..Self::ANY
	};
}

/// Recursive-descent compiler over a format string with one character of
/// lookahead.
pub(crate) struct Compiler<'a> {
	format: &'a str,
	offset: usize,
}

impl<'a> Compiler<'a> {
	pub(crate) fn new(format: &'a str) -> Self {
		Self { format, offset: 0 }
	}

	/// Compile the whole format string. With `single_root` exactly one,
	/// non-repeated root tag is required.
	pub(crate) fn compile(mut self, single_root: bool) -> CompileResult<Root> {
		let root = if single_root {
			if self.current()? != '<' {
				return Err(self.error_with(
					FormatErrorKind::InvalidTag,
					"Expected '<' to open the root tag",
					self.offset,
				));
			}
			self.bump('<');
			Root::Document(self.root_tag()?)
		} else {
			let mut nodes = vec![];
			while self.eat('<') {
				nodes.push(self.tag()?);
			}
			Root::Fragment(nodes)
		};

		if self.offset != self.format.len() {
			return Err(self.error(FormatErrorKind::TrailingCharacters, self.offset));
		}

		eval::check(&root).map_err(|error| self.static_error(error))?;

		debug!(
			length = self.format.len(),
			single_root, "compiled format string"
		);

		Ok(root)
	}

	fn error(&self, kind: FormatErrorKind, offset: usize) -> FormatError {
		FormatError::new(kind, self.format, offset)
	}

	fn error_with(
		&self,
		kind: FormatErrorKind,
		message: impl Into<String>,
		offset: usize,
	) -> FormatError {
		FormatError::with_message(kind, message, self.format, offset)
	}

	/// Literal names are known at compile time, so the skip walk reports them
	/// as format errors at the offset of the name.
	fn static_error(&self, error: ValueError) -> FormatError {
		match error {
			ValueError::InvalidName { reason, offset, .. } => {
				self.error_with(FormatErrorKind::InvalidName, reason.to_string(), offset)
			}
			other => self.error_with(FormatErrorKind::InvalidValue, other.to_string(), 0),
		}
	}

	fn peek(&self) -> Option<char> {
		self.format[self.offset..].chars().next()
	}

	/// The next character, or an unexpected end of format error.
	fn current(&self) -> CompileResult<char> {
		self.peek()
			.ok_or_else(|| self.error(FormatErrorKind::UnexpectedEnd, self.format.len()))
	}

	fn bump(&mut self, c: char) {
		self.offset += c.len_utf8();
	}

	fn eat(&mut self, expected: char) -> bool {
		if self.peek() == Some(expected) {
			self.bump(expected);
			true
		} else {
			false
		}
	}

	fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
		let start = self.offset;
		while let Some(c) = self.peek().filter(|c| predicate(*c)) {
			self.bump(c);
		}
		&self.format[start..self.offset]
	}

	fn digits(&mut self) -> &'a str {
		self.take_while(|c| c.is_ascii_digit())
	}

	/// `"..."` with backslash escapes.
	fn quoted(&mut self) -> CompileResult<String> {
		let start = self.offset;
		self.bump('"');
		let begin = self.offset;

		loop {
			match self.current()? {
				'"' => break,
				'\\' => {
					self.bump('\\');
					let escaped = self.current()?;
					self.bump(escaped);
				}
				c => self.bump(c),
			}
		}

		let raw = &self.format[begin..self.offset];
		self.bump('"');

		if !raw.contains('\\') {
			return Ok(raw.to_string());
		}

		unescape(&format!("\"{}\"", expand_hex_escapes(raw))).map_err(|_| {
			self.error_with(
				FormatErrorKind::InvalidValue,
				"Invalid escape sequence in quoted string",
				start,
			)
		})
	}

	fn key(&mut self) -> CompileResult<Key> {
		let start = self.offset;

		match self.current()? {
			c if c.is_alphabetic() => {
				let name = self.take_while(|c| c.is_alphanumeric() || c == '_');
				Ok(Key::Name(name.to_string()))
			}
			c if c.is_ascii_digit() => {
				self.digits().parse().map(Key::Index).map_err(|_| {
					self.error_with(FormatErrorKind::InvalidAttribute, "Index out of range", start)
				})
			}
			'"' => self.quoted().map(Key::Name),
			_ => Err(self.error(FormatErrorKind::InvalidAttribute, start)),
		}
	}

	/// Zero or more `.key` steps.
	fn lookup_chain(&mut self) -> CompileResult<Vec<Key>> {
		let mut keys = vec![];
		while self.eat('.') {
			keys.push(self.key()?);
		}
		Ok(keys)
	}

	fn value(&mut self, options: ValueOptions) -> CompileResult<ValueExpr> {
		let start = self.offset;

		match self.current()? {
			'.' => self.lookup_chain().map(ValueExpr::Lookup),
			'?' => {
				self.bump('?');
				Ok(ValueExpr::Identity)
			}
			'"' if options.strings => {
				self.quoted()
					.map(|text| ValueExpr::Literal(Value::Str(text)))
			}
			c if options.strings && options.unquoted && c.is_alphabetic() => {
				let word = self.take_while(|c| !SPECIAL.contains(c) && !c.is_whitespace());
				Ok(ValueExpr::Literal(Value::Str(word.to_string())))
			}
			c if options.numbers && options.unquoted && c.is_ascii_digit() => {
				self.digits()
					.parse()
					.map(|number| ValueExpr::Literal(Value::Int(number)))
					.map_err(|_| {
						self.error_with(
							FormatErrorKind::InvalidValue,
							"Integer literal out of range",
							start,
						)
					})
			}
			_ => Err(self.error(FormatErrorKind::InvalidValue, start)),
		}
	}

	/// The root tag of a document, positioned after its `<`.
	fn root_tag(&mut self) -> CompileResult<TagNode> {
		if self.peek() == Some('~') {
			return Err(self.error_with(
				FormatErrorKind::InvalidRepetition,
				"Cannot have multiple root tags",
				self.offset,
			));
		}

		let offset = self.offset;
		let name = self.value(ValueOptions::NO_NUMBERS)?;

		if self.peek() == Some('*') {
			return Err(self.error_with(
				FormatErrorKind::InvalidTag,
				"Root tag cannot be repeated",
				self.offset,
			));
		}

		let children = self.handlers_until('>')?;
		Ok(TagNode {
			name,
			offset,
			children,
		})
	}

	/// A tag, positioned after its `<`.
	fn tag(&mut self) -> CompileResult<Node> {
		if self.eat('~') {
			return self.mapping_tag();
		}

		let offset = self.offset;
		let name = self.value(ValueOptions::NO_NUMBERS)?;

		let source = if self.eat('*') {
			Some(self.repetition_source()?)
		} else {
			None
		};

		let tag = Node::Tag(TagNode {
			name,
			offset,
			children: self.handlers_until('>')?,
		});

		Ok(match source {
			Some(source) => {
				Node::Repeat(RepeatNode {
					source: RepeatSource::Items(source),
					inner: Box::new(tag),
				})
			}
			None => tag,
		})
	}

	/// `<~source ...>`: one tag per mapping entry, named by the key, with the
	/// entry's value in scope for the children.
	fn mapping_tag(&mut self) -> CompileResult<Node> {
		let offset = self.offset;
		let source = self.value(ValueOptions::NO_NUMBERS)?;

		if self.peek() == Some('*') {
			return Err(self.error_with(
				FormatErrorKind::InvalidRepetition,
				"Tags generated from a mapping cannot be repeated",
				self.offset,
			));
		}

		let children = self.handlers_until('>')?;
		let tag = TagNode {
			name: ValueExpr::Lookup(vec![Key::Index(0)]),
			offset,
			children: vec![Node::Group(GroupNode {
				lookup: vec![Key::Index(1)],
				children,
			})],
		};

		Ok(Node::Repeat(RepeatNode {
			source: RepeatSource::Entries(source),
			inner: Box::new(Node::Tag(tag)),
		}))
	}

	fn repetition_source(&mut self) -> CompileResult<ValueExpr> {
		match self.current()? {
			'.' | '?' => self.value(ValueOptions::NO_STRINGS),
			c if c.is_ascii_digit() => self.value(ValueOptions::NO_STRINGS),
			_ => Err(self.error(FormatErrorKind::InvalidRepetition, self.offset)),
		}
	}

	/// Handlers up to and including the `end` delimiter.
	fn handlers_until(&mut self, end: char) -> CompileResult<Vec<Node>> {
		let mut handlers = vec![];
		while self.current()? != end {
			handlers.push(self.handler()?);
		}
		self.bump(end);
		Ok(handlers)
	}

	fn handler(&mut self) -> CompileResult<Node> {
		let start = self.offset;

		match self.current()? {
			'<' => {
				self.bump('<');
				self.tag()
			}
			'=' => {
				self.bump('=');
				self.attribute()
			}
			'&' => {
				self.bump('&');
				let value = self.value(ValueOptions::NO_NUMBERS)?;
				Ok(Node::Text(TextNode { value }))
			}
			'{' => {
				self.bump('{');
				let lookup = self.lookup_chain()?;
				let children = self.handlers_until('}')?;
				Ok(Node::Group(GroupNode { lookup, children }))
			}
			'~' => {
				self.bump('~');
				self.conditional()
			}
			other => {
				Err(self.error_with(
					FormatErrorKind::InvalidTag,
					format!("Unrecognized character {other:?}"),
					start,
				))
			}
		}
	}

	fn attribute(&mut self) -> CompileResult<Node> {
		let offset = self.offset;
		let name = self.value(ValueOptions::NO_NUMBERS).map_err(|error| {
			if error.offset == offset && error.kind == FormatErrorKind::InvalidValue {
				self.error_with(FormatErrorKind::InvalidName, "Invalid attribute name", offset)
			} else {
				error
			}
		})?;
		let value = self.value(ValueOptions::QUOTED_ONLY)?;

		Ok(Node::Attribute(AttributeNode {
			name,
			offset,
			value,
		}))
	}

	fn conditional(&mut self) -> CompileResult<Node> {
		let negate = self.eat('!');
		let lhs = self.value(ValueOptions::NO_STRINGS)?;

		let symbol = self.current()?;
		let operator = Operator::from_symbol(symbol).ok_or_else(|| {
			self.error_with(
				FormatErrorKind::InvalidCondition,
				"Unrecognized conditional operator",
				self.offset,
			)
		})?;
		self.bump(symbol);

		let rhs = if operator.is_binary() {
			Some(self.value(ValueOptions::ANY)?)
		} else {
			None
		};

		let then = Box::new(self.handler()?);
		let otherwise = if self.eat('~') {
			Some(Box::new(self.handler()?))
		} else {
			None
		};

		Ok(Node::Conditional(ConditionalNode {
			lhs,
			operator,
			negate,
			rhs,
			then,
			otherwise,
		}))
	}
}

/// Rewrite `\xNN` escapes as `\u{NN}` so they decode to the character with
/// that code point. Escaped backslashes are left alone.
pub(crate) fn expand_hex_escapes(raw: &str) -> Cow<'_, str> {
	if !raw.contains("\\x") {
		return Cow::Borrowed(raw);
	}

	let mut expanded = String::with_capacity(raw.len());
	let mut chars = raw.chars();

	while let Some(c) = chars.next() {
		if c != '\\' {
			expanded.push(c);
			continue;
		}

		match chars.next() {
			Some('x') => {
				let mut lookahead = chars.clone();
				match (lookahead.next(), lookahead.next()) {
					(Some(high), Some(low)) if high.is_ascii_hexdigit() && low.is_ascii_hexdigit() => {
						expanded.push_str("\\u{");
						expanded.push(high);
						expanded.push(low);
						expanded.push('}');
						chars = lookahead;
					}
					_ => expanded.push_str("\\x"),
				}
			}
			Some(escaped) => {
				expanded.push('\\');
				expanded.push(escaped);
			}
			None => expanded.push('\\'),
		}
	}

	Cow::Owned(expanded)
}
