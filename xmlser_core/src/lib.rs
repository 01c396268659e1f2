//! `xmlser_core` compiles compact format strings into reusable programs that
//! turn nested data into XML.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Format string
//!   -> Compiler (recursive descent, validates grammar and literal names)
//!   -> Template (immutable tree, evaluated any number of times)
//!   -> Evaluator (resolves lookups against a Value, builds an Element tree)
//!   -> Writer (depth-first rendering with an optional XML declaration)
//! ```
//!
//! ## Format Strings
//!
//! | Syntax                   | Meaning                                              |
//! | ------------------------ | ---------------------------------------------------- |
//! | `<name ...>`             | an element, children up to the closing `>`           |
//! | `<name*source ...>`      | one element per item of `source`                     |
//! | `<~source ...>`          | one element per mapping entry, named by its key      |
//! | `=name value`            | an attribute; the value is quoted, `?` or a lookup   |
//! | `&value`                 | text content                                         |
//! | `{.a.b ...}`             | run the children with `.a.b` as the current value    |
//! | `~[!]lhs op [rhs] a [~b]`| emit `a` when the test holds, `b` otherwise          |
//!
//! Values are `?` (the current value), lookups such as `.name.0`, quoted
//! strings and, where the position allows, bare words and integers. Quoted
//! strings take backslash escapes such as `\n`, `\"`, `\u{e9}` and `\xe9`.
//! Conditional operators are `?` (truthy), `=`, `<`, `>` and `/` (contains).
//!
//! ## Quick Start
//!
//! ```rust
//! use xmlser_core::Value;
//! use xmlser_core::compile;
//!
//! let template = compile("<people<person*.people=name.name&.age>>").unwrap();
//! let input = Value::map([(
//! 	"people",
//! 	Value::from(vec![
//! 		Value::map([("name", Value::from("Ada")), ("age", Value::from(36))]),
//! 		Value::map([("name", Value::from("Alan")), ("age", Value::from(41))]),
//! 	]),
//! )]);
//!
//! let xml = template.to_xml_string(&input, Some("UTF-8")).unwrap();
//! assert_eq!(
//! 	xml,
//! 	"<?xml version=\"1.0\" encoding=\"UTF-8\"?><people><person \
//! 	 name=\"Ada\">36</person><person name=\"Alan\">41</person></people>"
//! );
//! ```

pub use ast::*;
pub use config::*;
pub use element::*;
pub use error::*;
pub use template::*;
pub use value::*;
pub use writer::*;

mod ast;
mod compiler;
pub mod config;
mod element;
#[allow(unused_assignments)]
mod error;
mod eval;
mod template;
mod value;
mod writer;
pub mod xml;

/// Compile a single-root document format.
pub fn compile(format: &str) -> Result<Template, FormatError> {
	Template::compile(format, true)
}

/// Compile a fragment format with any number of top-level tags.
pub fn compile_fragment(format: &str) -> Result<Template, FormatError> {
	Template::compile(format, false)
}

#[cfg(test)]
mod __fixtures;
