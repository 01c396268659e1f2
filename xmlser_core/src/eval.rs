use std::borrow::Cow;
use std::cmp::Ordering;

use tracing::trace;

use crate::Attribute;
use crate::ConditionalNode;
use crate::Content;
use crate::Element;
use crate::Fragment;
use crate::Item;
use crate::Key;
use crate::NameTarget;
use crate::Node;
use crate::Operator;
use crate::Output;
use crate::RepeatNode;
use crate::RepeatSource;
use crate::Root;
use crate::TagNode;
use crate::Value;
use crate::ValueError;
use crate::ValueExpr;
use crate::value::entry_list;
use crate::value::lookup_error;
use crate::xml::check_attribute;
use crate::xml::check_tag;
use crate::xml::escape_attribute;
use crate::xml::escape_text;

static NULL: Value = Value::Null;

/// The value in scope while walking the tree.
///
/// `Skip` walks the structure without data: lookups resolve to `Skip`,
/// literals still resolve, attributes and text are not emitted,
/// repetitions visit their inner node once and conditionals visit both
/// branches. `Entry` is a mapping entry under repetition, resolved like
/// the list `[key, value]` without copying either side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Current<'v> {
	Value(&'v Value),
	Entry(&'v Value, &'v Value),
	Skip,
}

impl<'v> Current<'v> {
	fn is_skip(self) -> bool {
		self == Self::Skip
	}

	/// The value in scope, or `None` while skipping.
	fn value(self) -> Option<Cow<'v, Value>> {
		match self {
			Self::Value(value) => Some(Cow::Borrowed(value)),
			Self::Entry(key, value) => Some(Cow::Owned(entry_list(key, value))),
			Self::Skip => None,
		}
	}

	fn lookup(self, keys: &[Key]) -> Result<Self, ValueError> {
		match self {
			Self::Value(value) => value.resolve_path(keys).map(Self::Value),
			Self::Entry(key, value) => {
				let Some(first) = keys.first() else {
					return Ok(self);
				};
				Item::entry_step(key, value, first)
					.map_err(|reason| lookup_error(keys, 0, reason))?
					.resolve_path_from(keys, 1)
					.map(Self::Value)
			}
			Self::Skip => Ok(Self::Skip),
		}
	}
}

impl<'a> From<&'a Item<'_>> for Current<'a> {
	fn from(item: &'a Item<'_>) -> Self {
		match item {
			Item::Borrowed(value) => Self::Value(value),
			Item::Owned(value) => Self::Value(value),
			Item::Entry(key, value) => Self::Entry(key, value),
		}
	}
}

/// Evaluate a compiled root against `input`.
pub(crate) fn evaluate(root: &Root, input: &Value) -> Result<Output, ValueError> {
	let current = Current::Value(input);

	match root {
		Root::Document(tag) => build_tag(tag, current).map(Output::Document),
		Root::Fragment(nodes) => {
			let mut placeholder = Element::new(":");
			for node in nodes {
				walk(node, current, &mut placeholder)?;
			}
			Ok(Output::Fragment(Fragment::new(placeholder.content)))
		}
	}
}

/// Walk the whole tree with the skip sentinel. Only names that are known
/// without data can fail.
pub(crate) fn check(root: &Root) -> Result<(), ValueError> {
	match root {
		Root::Document(tag) => build_tag(tag, Current::Skip).map(drop),
		Root::Fragment(nodes) => {
			let mut scratch = Element::default();
			nodes
				.iter()
				.try_for_each(|node| walk(node, Current::Skip, &mut scratch))
		}
	}
}

pub(crate) fn resolve<'v>(
	expr: &'v ValueExpr,
	current: Current<'v>,
) -> Result<Current<'v>, ValueError> {
	match (expr, current) {
		(ValueExpr::Literal(value), _) => Ok(Current::Value(value)),
		(_, Current::Skip) => Ok(Current::Skip),
		(ValueExpr::Identity, current) => Ok(current),
		(ValueExpr::Lookup(keys), current) => current.lookup(keys),
	}
}

fn walk(node: &Node, current: Current<'_>, target: &mut Element) -> Result<(), ValueError> {
	match node {
		Node::Tag(tag) => {
			let element = build_tag(tag, current)?;
			if !current.is_skip() {
				target.content.push(Content::Element(element));
			}
		}
		Node::Repeat(repeat) => walk_repeat(repeat, current, target)?,
		Node::Attribute(attribute) => {
			let name = checked_name(
				&attribute.name,
				current,
				NameTarget::Attribute,
				attribute.offset,
			)?;
			let value = resolve(&attribute.value, current)?;

			if let (false, Some(name), Some(value)) = (current.is_skip(), name, value.value()) {
				target.attrs.push(Attribute {
					name,
					value: escape_attribute(&value.to_text()).into_owned(),
				});
			}
		}
		Node::Text(text) => {
			let value = resolve(&text.value, current)?;
			if let (false, Some(value)) = (current.is_skip(), value.value()) {
				target
					.content
					.push(Content::Text(escape_text(&value.to_text()).into_owned()));
			}
		}
		Node::Group(group) => {
			let scoped = current.lookup(&group.lookup)?;
			for child in &group.children {
				walk(child, scoped, target)?;
			}
		}
		Node::Conditional(conditional) => walk_conditional(conditional, current, target)?,
	}

	Ok(())
}

fn build_tag(tag: &TagNode, current: Current<'_>) -> Result<Element, ValueError> {
	let name = checked_name(&tag.name, current, NameTarget::Tag, tag.offset)?;
	let mut element = Element::new(name.unwrap_or_default());

	for child in &tag.children {
		walk(child, current, &mut element)?;
	}

	Ok(element)
}

/// Resolve and validate a tag or attribute name. `None` when the name
/// depends on data that is being skipped.
fn checked_name(
	expr: &ValueExpr,
	current: Current<'_>,
	target: NameTarget,
	offset: usize,
) -> Result<Option<String>, ValueError> {
	let Some(value) = resolve(expr, current)?.value() else {
		return Ok(None);
	};

	let name = value.to_text();
	let checked = match target {
		NameTarget::Tag => check_tag(&name),
		NameTarget::Attribute => check_attribute(&name),
	};

	match checked {
		Ok(()) => Ok(Some(name.into_owned())),
		Err(reason) => {
			Err(ValueError::InvalidName {
				target,
				name: name.into_owned(),
				reason,
				offset,
			})
		}
	}
}

fn walk_repeat(
	repeat: &RepeatNode,
	current: Current<'_>,
	target: &mut Element,
) -> Result<(), ValueError> {
	if current.is_skip() {
		return walk(&repeat.inner, Current::Skip, target);
	}

	let (expr, entries) = match &repeat.source {
		RepeatSource::Items(expr) => (expr, false),
		RepeatSource::Entries(expr) => (expr, true),
	};

	let Some(source) = resolve(expr, current)?.value() else {
		return walk(&repeat.inner, Current::Skip, target);
	};

	let items: Vec<Item<'_>> = if entries {
		source
			.entries()?
			.map(|(key, value)| Item::Entry(key, value))
			.collect()
	} else {
		source.repetition_items()?
	};

	trace!(items = items.len(), "repeating");

	for item in &items {
		walk(&repeat.inner, Current::from(item), target)?;
	}

	Ok(())
}

fn walk_conditional(
	conditional: &ConditionalNode,
	current: Current<'_>,
	target: &mut Element,
) -> Result<(), ValueError> {
	if current.is_skip() {
		walk(&conditional.then, Current::Skip, target)?;
		if let Some(otherwise) = &conditional.otherwise {
			walk(otherwise, Current::Skip, target)?;
		}
		return Ok(());
	}

	if test(conditional, current)? {
		walk(&conditional.then, current, target)
	} else if let Some(otherwise) = &conditional.otherwise {
		walk(otherwise, current, target)
	} else {
		Ok(())
	}
}

fn test(conditional: &ConditionalNode, current: Current<'_>) -> Result<bool, ValueError> {
	let Some(lhs) = resolve(&conditional.lhs, current)?.value() else {
		return Ok(false);
	};

	let rhs = match &conditional.rhs {
		Some(expr) => {
			match resolve(expr, current)?.value() {
				Some(value) => value,
				None => return Ok(false),
			}
		}
		None => Cow::Borrowed(&NULL),
	};

	let result = match conditional.operator {
		Operator::Truthy => lhs.is_truthy(),
		Operator::Eq => lhs.loose_eq(&rhs),
		Operator::Lt => lhs.compare(&rhs)? == Ordering::Less,
		Operator::Gt => lhs.compare(&rhs)? == Ordering::Greater,
		Operator::Contains => lhs.contains(&rhs)?,
	};

	trace!(
		operator = %conditional.operator.symbol(),
		negate = conditional.negate,
		result,
		"tested condition"
	);

	Ok(result != conditional.negate)
}
