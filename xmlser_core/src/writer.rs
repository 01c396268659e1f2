use std::fmt;

use crate::Content;
use crate::Element;
use crate::Fragment;
use crate::Output;

/// Render an evaluated template.
///
/// Elements are written depth first as `<tag attr="value">content</tag>`.
/// Text and attribute values were escaped during evaluation and are written
/// verbatim. When `encoding` is set and the output is a document, an XML
/// declaration naming it is written first. Fragments never get one.
pub fn write_output<W: fmt::Write + ?Sized>(
	output: &Output,
	out: &mut W,
	encoding: Option<&str>,
) -> fmt::Result {
	match (output, encoding) {
		(Output::Document(root), Some(encoding)) => {
			write_declaration(out, encoding)?;
			write_element(root, out)
		}
		(Output::Document(root), None) => write_element(root, out),
		(Output::Fragment(fragment), _) => write_content(fragment, out),
	}
}

/// `<?xml version="1.0" encoding="ENC"?>`
pub fn write_declaration<W: fmt::Write + ?Sized>(out: &mut W, encoding: &str) -> fmt::Result {
	write!(out, "<?xml version=\"1.0\" encoding=\"{encoding}\"?>")
}

fn write_element<W: fmt::Write + ?Sized>(element: &Element, out: &mut W) -> fmt::Result {
	write!(out, "<{}", element.tag)?;
	for attr in &element.attrs {
		write!(out, " {}=\"{}\"", attr.name, attr.value)?;
	}
	out.write_char('>')?;
	write_content(&element.content, out)?;
	write!(out, "</{}>", element.tag)
}

fn write_content<W: fmt::Write + ?Sized>(content: &[Content], out: &mut W) -> fmt::Result {
	for item in content {
		match item {
			Content::Element(element) => write_element(element, out)?,
			Content::Text(text) => out.write_str(text)?,
		}
	}

	Ok(())
}

impl fmt::Display for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write_element(self, f)
	}
}

impl fmt::Display for Content {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write_content(std::slice::from_ref(self), f)
	}
}

impl fmt::Display for Fragment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write_content(self, f)
	}
}

/// Renders without a declaration.
impl fmt::Display for Output {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write_output(self, f, None)
	}
}
