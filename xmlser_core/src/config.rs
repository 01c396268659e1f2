use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::Template;
use crate::XmlserError;
use crate::XmlserResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["xmlser.toml", ".xmlser.toml", ".config/xmlser.toml"];

/// A named template in the `[templates]` table.
///
/// A plain string is a document format:
///
/// ```toml
/// [templates]
/// person = "<person=name.name&.bio>"
/// ```
///
/// Typed entries can compile a fragment or override the encoding:
///
/// ```toml
/// [templates]
/// people = { format = "<person*?&.name>", fragment = true }
/// ```
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum TemplateSource {
	Format(String),
	Typed(TypedTemplateSource),
}

impl TemplateSource {
	pub fn format(&self) -> &str {
		match self {
			Self::Format(format) => format,
			Self::Typed(typed) => &typed.format,
		}
	}

	pub fn is_fragment(&self) -> bool {
		match self {
			Self::Format(_) => false,
			Self::Typed(typed) => typed.fragment,
		}
	}

	/// The encoding override, if any.
	pub fn encoding(&self) -> Option<&str> {
		match self {
			Self::Format(_) => None,
			Self::Typed(typed) => typed.encoding.as_deref(),
		}
	}
}

#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct TypedTemplateSource {
	pub format: String,
	#[serde(default)]
	pub fragment: bool,
	#[serde(default)]
	pub encoding: Option<String>,
}

/// Configuration loaded from an `xmlser.toml` file.
///
/// ```toml
/// encoding = "UTF-8"
///
/// [templates]
/// person = "<person=name.name&.bio>"
/// people = { format = "<person*?&.name>", fragment = true }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct XmlserConfig {
	/// Encoding named in the declaration of rendered documents.
	#[serde(default)]
	pub encoding: Option<String>,
	/// Named templates.
	#[serde(default)]
	pub templates: BTreeMap<String, TemplateSource>,
}

impl XmlserConfig {
	/// Resolve the first discovered config file at `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> XmlserResult<Option<XmlserConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::from_toml(&content)?;
		debug!(
			path = %config_path.display(),
			templates = config.templates.len(),
			"loaded config"
		);

		Ok(Some(config))
	}

	pub fn from_toml(content: &str) -> XmlserResult<XmlserConfig> {
		toml::from_str(content).map_err(|e| XmlserError::ConfigParse(e.to_string()))
	}

	pub fn template(&self, name: &str) -> XmlserResult<&TemplateSource> {
		self.templates
			.get(name)
			.ok_or_else(|| XmlserError::UnknownTemplate(name.to_string()))
	}

	/// Compile the named template in the mode it declares.
	pub fn compile(&self, name: &str) -> XmlserResult<Template> {
		let source = self.template(name)?;
		Ok(Template::compile(source.format(), !source.is_fragment())?)
	}

	/// The encoding for the named template: its own override, then the
	/// top-level default.
	pub fn encoding_for(&self, name: &str) -> Option<&str> {
		self.templates
			.get(name)
			.and_then(TemplateSource::encoding)
			.or(self.encoding.as_deref())
	}
}
