use std::fmt;

use serde::Serialize;

use crate::Value;

/// One step of a lookup chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
	/// `.0`: a list index, falling back to an integer or string key.
	Index(u64),
	/// `.name` or `."quoted name"`: a mapping key or record field.
	Name(String),
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Index(index) => write!(f, "{index}"),
			Self::Name(name) => f.write_str(name),
		}
	}
}

/// How a value is derived from the current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueExpr {
	/// A constant from the format string: `"quoted"`, a bare word or an
	/// integer.
	Literal(Value),
	/// `?`
	Identity,
	/// `.a.b.0`
	Lookup(Vec<Key>),
}

/// Conditional operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
	/// `?`: the left-hand side is truthy.
	Truthy,
	/// `=`
	Eq,
	/// `<`
	Lt,
	/// `>`
	Gt,
	/// `/`: the left-hand side contains the right-hand side.
	Contains,
}

impl Operator {
	pub fn from_symbol(symbol: char) -> Option<Self> {
		match symbol {
			'?' => Some(Self::Truthy),
			'=' => Some(Self::Eq),
			'<' => Some(Self::Lt),
			'>' => Some(Self::Gt),
			'/' => Some(Self::Contains),
			_ => None,
		}
	}

	pub fn symbol(self) -> char {
		match self {
			Self::Truthy => '?',
			Self::Eq => '=',
			Self::Lt => '<',
			Self::Gt => '>',
			Self::Contains => '/',
		}
	}

	/// Whether the operator takes a right-hand side.
	pub fn is_binary(self) -> bool {
		!matches!(self, Self::Truthy)
	}
}

/// A compiled instruction. Nodes are immutable once compiled and can be
/// evaluated any number of times.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
	Tag(TagNode),
	Repeat(RepeatNode),
	Attribute(AttributeNode),
	Text(TextNode),
	Group(GroupNode),
	Conditional(ConditionalNode),
}

/// `<name children>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagNode {
	pub name: ValueExpr,
	/// Byte offset of the name in the format string.
	pub offset: usize,
	pub children: Vec<Node>,
}

/// `<name*source ...>` and `<~source ...>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeatNode {
	pub source: RepeatSource,
	pub inner: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatSource {
	/// Lists, mapping pairs, integer counts, characters or bytes.
	Items(ValueExpr),
	/// The `[key, value]` pairs of a mapping only.
	Entries(ValueExpr),
}

/// `=name value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeNode {
	pub name: ValueExpr,
	/// Byte offset of the name in the format string.
	pub offset: usize,
	pub value: ValueExpr,
}

/// `&value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextNode {
	pub value: ValueExpr,
}

/// `{.lookup children}`: re-scopes the current value without adding an
/// element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupNode {
	pub lookup: Vec<Key>,
	pub children: Vec<Node>,
}

/// `~[!]lhs op [rhs] then [~otherwise]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalNode {
	pub lhs: ValueExpr,
	pub operator: Operator,
	pub negate: bool,
	pub rhs: Option<ValueExpr>,
	pub then: Box<Node>,
	pub otherwise: Option<Box<Node>>,
}

/// The top of a compiled template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Root {
	/// Exactly one root element.
	Document(TagNode),
	/// Zero or more top-level elements.
	Fragment(Vec<Node>),
}

impl Root {
	pub fn is_document(&self) -> bool {
		matches!(self, Self::Document(_))
	}
}
