use std::borrow::Cow;
use std::io;
use std::str::FromStr;

use tracing::debug;

use crate::FormatError;
use crate::Output;
use crate::Root;
use crate::Value;
use crate::ValueError;
use crate::XmlserResult;
use crate::compiler::Compiler;
use crate::eval;
use crate::write_output;

/// A compiled format string.
///
/// Compiling validates the whole grammar and every literal tag and
/// attribute name up front, so a `Template` can be evaluated against any
/// number of inputs and only fails when the data does not fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
	format: String,
	root: Root,
}

impl Template {
	/// Compile `format`. With `single_root` the format must describe exactly
	/// one root tag which may not be repeated. Otherwise it describes a
	/// fragment of zero or more top-level tags.
	pub fn compile(format: &str, single_root: bool) -> Result<Self, FormatError> {
		let root = Compiler::new(format).compile(single_root)?;

		Ok(Self {
			format: format.to_string(),
			root,
		})
	}

	/// The source format string.
	pub fn format(&self) -> &str {
		&self.format
	}

	/// The compiled tree.
	pub fn root(&self) -> &Root {
		&self.root
	}

	pub fn is_document(&self) -> bool {
		self.root.is_document()
	}

	/// Evaluate against `input`, producing an element tree.
	pub fn evaluate(&self, input: &Value) -> Result<Output, ValueError> {
		let output = eval::evaluate(&self.root, input)?;
		debug!(
			document = output.is_document(),
			input = input.type_name(),
			"evaluated template"
		);
		Ok(output)
	}

	/// Evaluate and render to a string. The `encoding` label only controls
	/// the XML declaration written ahead of a document.
	pub fn to_xml_string(&self, input: &Value, encoding: Option<&str>) -> XmlserResult<String> {
		let output = self.evaluate(input)?;
		let mut xml = String::new();
		write_output(&output, &mut xml, encoding)?;
		Ok(xml)
	}

	/// Evaluate and write the rendered UTF-8 text to `dest`.
	pub fn write_xml<W: io::Write>(
		&self,
		input: &Value,
		mut dest: W,
		encoding: Option<&str>,
	) -> XmlserResult<()> {
		let xml = self.to_xml_string(input, encoding)?;
		dest.write_all(xml.as_bytes())?;
		dest.flush()?;
		Ok(())
	}
}

/// Parses a single-root document format.
impl FromStr for Template {
	type Err = FormatError;

	fn from_str(format: &str) -> Result<Self, Self::Err> {
		Self::compile(format, true)
	}
}

/// Anything that can be used as the source of a [`serialize`] call.
///
/// Format strings are compiled as documents on every call. Pass a compiled
/// [`Template`] to reuse the work or to serialize a fragment.
pub trait ToTemplate {
	fn to_template(&self) -> Result<Cow<'_, Template>, FormatError>;
}

impl ToTemplate for str {
	fn to_template(&self) -> Result<Cow<'_, Template>, FormatError> {
		Template::compile(self, true).map(Cow::Owned)
	}
}

impl ToTemplate for String {
	fn to_template(&self) -> Result<Cow<'_, Template>, FormatError> {
		self.as_str().to_template()
	}
}

impl ToTemplate for Template {
	fn to_template(&self) -> Result<Cow<'_, Template>, FormatError> {
		Ok(Cow::Borrowed(self))
	}
}

/// Compile `source` if needed, evaluate it against `input` and return the
/// rendered XML.
///
/// ```rust
/// use xmlser_core::Value;
/// use xmlser_core::serialize;
///
/// let input = Value::map([("name", "Ada")]);
/// let xml = serialize("<person=name.name>", &input, None).unwrap();
/// assert_eq!(xml, r#"<person name="Ada"></person>"#);
/// ```
pub fn serialize<S>(source: &S, input: &Value, encoding: Option<&str>) -> XmlserResult<String>
where
	S: ToTemplate + ?Sized,
{
	source.to_template()?.to_xml_string(input, encoding)
}

/// Like [`serialize`] but writes to `dest` instead of returning the text.
pub fn serialize_to<S, W>(
	source: &S,
	input: &Value,
	dest: W,
	encoding: Option<&str>,
) -> XmlserResult<()>
where
	S: ToTemplate + ?Sized,
	W: io::Write,
{
	source.to_template()?.write_xml(input, dest, encoding)
}
