use derive_more::Deref;

/// A single attribute. The value is already escaped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
	pub name: String,
	pub value: String,
}

/// An element of the tree produced by evaluating a template.
///
/// Attributes keep their declaration order and are never de-duplicated: a
/// template that sets the same attribute twice emits it twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Element {
	pub tag: String,
	pub attrs: Vec<Attribute>,
	pub content: Vec<Content>,
}

impl Element {
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			attrs: vec![],
			content: vec![],
		}
	}

	/// The value of the first attribute called `name`.
	pub fn attr(&self, name: &str) -> Option<&str> {
		self.attrs
			.iter()
			.find(|attr| attr.name == name)
			.map(|attr| attr.value.as_str())
	}

	/// Child elements, skipping text.
	pub fn children(&self) -> impl Iterator<Item = &Element> {
		self.content.iter().filter_map(Content::as_element)
	}
}

/// An item of element content. Text is already escaped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Content {
	Element(Element),
	Text(String),
}

impl Content {
	pub fn as_element(&self) -> Option<&Element> {
		match self {
			Self::Element(element) => Some(element),
			Self::Text(_) => None,
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Element(_) => None,
			Self::Text(text) => Some(text),
		}
	}
}

impl From<Element> for Content {
	fn from(value: Element) -> Self {
		Self::Element(value)
	}
}

/// The top-level content of a fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deref)]
pub struct Fragment(Vec<Content>);

impl Fragment {
	pub fn new(content: Vec<Content>) -> Self {
		Self(content)
	}

	pub fn into_inner(self) -> Vec<Content> {
		self.0
	}
}

/// The result of evaluating a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Output {
	/// A single root element.
	Document(Element),
	/// Zero or more top-level items.
	Fragment(Fragment),
}

impl Output {
	pub fn is_document(&self) -> bool {
		matches!(self, Self::Document(_))
	}

	/// The root element of a document.
	pub fn into_document(self) -> Option<Element> {
		match self {
			Self::Document(element) => Some(element),
			Self::Fragment(_) => None,
		}
	}

	/// The top-level items. A document yields its single root.
	pub fn into_content(self) -> Vec<Content> {
		match self {
			Self::Document(element) => vec![Content::Element(element)],
			Self::Fragment(fragment) => fragment.into_inner(),
		}
	}
}
