use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use derive_more::Deref;
use float_cmp::approx_eq;
use serde::Serialize;

use crate::Key;
use crate::LookupFailure;
use crate::ValueError;

/// An input value a compiled template is evaluated against.
///
/// The variants cover the shapes lookups know how to walk: sequences
/// (`List`), insertion-ordered key/value mappings (`Map`) and named records
/// with fields (`Record`), plus the scalars that end up as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
	#[default]
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
	Bytes(Vec<u8>),
	List(Vec<Value>),
	Map(Mapping),
	Record(Record),
}

/// Key/value pairs kept in insertion order. Keys may be any value; lookups
/// compare them with [`Value::loose_eq`].
#[derive(Debug, Clone, Default, PartialEq, Deref, Serialize)]
pub struct Mapping(Vec<(Value, Value)>);

impl Mapping {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a pair. An existing equal key keeps its position and has its
	/// value replaced.
	pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) {
		let key = key.into();
		let value = value.into();

		match self.0.iter_mut().find(|(existing, _)| existing.loose_eq(&key)) {
			Some(entry) => entry.1 = value,
			None => self.0.push((key, value)),
		}
	}

	pub fn get(&self, key: &Value) -> Option<&Value> {
		self.0
			.iter()
			.find(|(existing, _)| existing.loose_eq(key))
			.map(|(_, value)| value)
	}

	pub fn get_str(&self, key: &str) -> Option<&Value> {
		self.0
			.iter()
			.find(|(existing, _)| matches!(existing, Value::Str(name) if name == key))
			.map(|(_, value)| value)
	}

	pub fn contains_key(&self, key: &Value) -> bool {
		self.get(key).is_some()
	}
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Mapping {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut mapping = Self::new();
		for (key, value) in iter {
			mapping.insert(key, value);
		}
		mapping
	}
}

/// One step of a repetition.
///
/// A mapping entry stays borrowed and behaves like the two item list
/// `[key, value]`: `.0` is the key, `.1` the value.
#[derive(Debug, Clone, PartialEq)]
pub enum Item<'v> {
	Borrowed(&'v Value),
	Owned(Value),
	Entry(&'v Value, &'v Value),
}

impl<'v> Item<'v> {
	/// Take the first lookup step into an entry, the same way a two item
	/// list would answer it.
	pub fn entry_step(
		key: &'v Value,
		value: &'v Value,
		step: &Key,
	) -> Result<&'v Value, LookupFailure> {
		match step {
			Key::Index(0) => Ok(key),
			Key::Index(1) => Ok(value),
			Key::Index(_) => Err(LookupFailure::IndexOutOfRange { len: 2 }),
			Key::Name(_) => Err(LookupFailure::Unsupported { type_name: "list" }),
		}
	}

	/// The item as a standalone value. Entries are copied into a list.
	pub fn to_value(&self) -> Cow<'_, Value> {
		match self {
			Self::Borrowed(value) => Cow::Borrowed(value),
			Self::Owned(value) => Cow::Borrowed(value),
			Self::Entry(key, value) => Cow::Owned(entry_list(key, value)),
		}
	}
}

pub(crate) fn entry_list(key: &Value, value: &Value) -> Value {
	Value::List(vec![key.clone(), value.clone()])
}

pub(crate) fn lookup_error(keys: &[Key], position: usize, reason: LookupFailure) -> ValueError {
	ValueError::Lookup {
		key: keys[..=position].iter().map(|key| format!(".{key}")).collect(),
		reason,
	}
}

/// A named value with ordered fields, the shape of a struct or object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
	name: String,
	fields: Vec<(String, Value)>,
}

impl Record {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			fields: vec![],
		}
	}

	/// Add or replace a field.
	#[must_use]
	pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		let name = name.into();
		let value = value.into();

		match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
			Some(field) => field.1 = value,
			None => self.fields.push((name, value)),
		}
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn field(&self, name: &str) -> Option<&Value> {
		self.fields
			.iter()
			.find(|(existing, _)| existing == name)
			.map(|(_, value)| value)
	}

	pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.fields.iter().map(|(name, value)| (name.as_str(), value))
	}
}

impl Value {
	/// Build a mapping value from key/value pairs, keeping their order.
	pub fn map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<Value>,
		V: Into<Value>,
	{
		Self::Map(pairs.into_iter().collect())
	}

	pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
		Self::Bytes(bytes.into())
	}

	/// Convert any serializable value. Structs and maps become mappings, with
	/// field and key order preserved.
	pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
		serde_json::to_value(value).map(Self::from)
	}

	pub fn type_name(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::Int(_) => "integer",
			Self::Float(_) => "float",
			Self::Str(_) => "string",
			Self::Bytes(_) => "bytes",
			Self::List(_) => "list",
			Self::Map(_) => "mapping",
			Self::Record(_) => "record",
		}
	}

	/// Take a single lookup step.
	///
	/// Numeric keys index lists, then try the integer and the string key on
	/// mappings. Name keys look up mapping keys, then record fields.
	pub fn resolve_step(&self, key: &Key) -> Result<&Value, LookupFailure> {
		match (self, key) {
			(Self::List(items), Key::Index(index)) => {
				usize::try_from(*index)
					.ok()
					.and_then(|index| items.get(index))
					.ok_or(LookupFailure::IndexOutOfRange { len: items.len() })
			}
			(Self::Map(mapping), Key::Index(index)) => {
				i64::try_from(*index)
					.ok()
					.and_then(|index| mapping.get(&Self::Int(index)))
					.or_else(|| mapping.get_str(&index.to_string()))
					.ok_or(LookupFailure::MissingKey)
			}
			(Self::Map(mapping), Key::Name(name)) => {
				mapping.get_str(name).ok_or(LookupFailure::MissingKey)
			}
			(Self::Record(record), key) => {
				record.field(&key.to_string()).ok_or_else(|| {
					LookupFailure::MissingField {
						record: record.name().to_string(),
					}
				})
			}
			(other, _) => {
				Err(LookupFailure::Unsupported {
					type_name: other.type_name(),
				})
			}
		}
	}

	/// Resolve a whole lookup chain, left to right.
	pub fn resolve_path(&self, keys: &[Key]) -> Result<&Value, ValueError> {
		self.resolve_path_from(keys, 0)
	}

	/// Resolve `keys[start..]`. Failures name the chain up to the failing
	/// key, including the keys before `start`.
	pub(crate) fn resolve_path_from(
		&self,
		keys: &[Key],
		start: usize,
	) -> Result<&Value, ValueError> {
		keys.iter()
			.enumerate()
			.skip(start)
			.try_fold(self, |current, (position, key)| {
				current
					.resolve_step(key)
					.map_err(|reason| lookup_error(keys, position, reason))
			})
	}

	/// The items a `*` repetition walks over.
	///
	/// Mappings yield their entries in insertion order, integers `n` yield
	/// `0..n`, lists their items, strings one string per character and bytes
	/// one integer per byte.
	pub fn repetition_items(&self) -> Result<Vec<Item<'_>>, ValueError> {
		match self {
			Self::Map(_) => {
				Ok(self
					.entries()?
					.map(|(key, value)| Item::Entry(key, value))
					.collect())
			}
			Self::Int(count) => Ok((0..*count).map(|index| Item::Owned(Self::Int(index))).collect()),
			Self::List(items) => Ok(items.iter().map(Item::Borrowed).collect()),
			Self::Str(text) => {
				Ok(text
					.chars()
					.map(|c| Item::Owned(Self::Str(c.to_string())))
					.collect())
			}
			Self::Bytes(bytes) => {
				Ok(bytes
					.iter()
					.map(|byte| Item::Owned(Self::Int(i64::from(*byte))))
					.collect())
			}
			other => {
				Err(ValueError::NotIterable {
					type_name: other.type_name(),
				})
			}
		}
	}

	/// The key/value pairs of a mapping, in insertion order.
	pub fn entries(&self) -> Result<impl Iterator<Item = (&Value, &Value)>, ValueError> {
		match self {
			Self::Map(mapping) => Ok(mapping.iter().map(|(key, value)| (key, value))),
			other => {
				Err(ValueError::NotMapping {
					type_name: other.type_name(),
				})
			}
		}
	}

	pub fn is_truthy(&self) -> bool {
		match self {
			Self::Null => false,
			Self::Bool(value) => *value,
			Self::Int(value) => *value != 0,
			Self::Float(value) => *value != 0.0,
			Self::Str(text) => !text.is_empty(),
			Self::Bytes(bytes) => !bytes.is_empty(),
			Self::List(items) => !items.is_empty(),
			Self::Map(mapping) => !mapping.is_empty(),
			Self::Record(_) => true,
		}
	}

	/// Equality as conditionals see it: integers and floats compare by
	/// numeric value, everything else must share a variant.
	pub fn loose_eq(&self, other: &Value) -> bool {
		match (self, other) {
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => approx_eq!(f64, *a, *b, ulps = 2),
			(Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => {
				approx_eq!(f64, *a as f64, *b, ulps = 2)
			}
			(Self::List(a), Self::List(b)) => {
				a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.loose_eq(b))
			}
			(Self::Map(a), Self::Map(b)) => {
				a.len() == b.len()
					&& a.iter()
						.all(|(key, value)| b.get(key).is_some_and(|other| value.loose_eq(other)))
			}
			_ => self == other,
		}
	}

	pub fn compare(&self, other: &Value) -> Result<Ordering, ValueError> {
		let ordering = match (self, other) {
			(Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
			(Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
				self.as_f64()
					.zip(other.as_f64())
					.and_then(|(a, b)| a.partial_cmp(&b))
			}
			(Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
			(Self::Str(a), Self::Str(b)) => Some(a.cmp(b)),
			(Self::Bytes(a), Self::Bytes(b)) => Some(a.cmp(b)),
			(Self::List(a), Self::List(b)) => {
				for (a, b) in a.iter().zip(b) {
					match a.compare(b)? {
						Ordering::Equal => {}
						ordering => return Ok(ordering),
					}
				}
				Some(a.len().cmp(&b.len()))
			}
			_ => None,
		};

		ordering.ok_or(ValueError::Incomparable {
			lhs: self.type_name(),
			rhs: other.type_name(),
		})
	}

	/// Whether `needle` is a member of this value.
	pub fn contains(&self, needle: &Value) -> Result<bool, ValueError> {
		match (self, needle) {
			(Self::List(items), _) => Ok(items.iter().any(|item| item.loose_eq(needle))),
			(Self::Map(mapping), _) => Ok(mapping.contains_key(needle)),
			(Self::Str(text), Self::Str(part)) => Ok(text.contains(part.as_str())),
			(Self::Bytes(bytes), Self::Int(byte)) => {
				Ok(u8::try_from(*byte).is_ok_and(|byte| bytes.contains(&byte)))
			}
			(Self::Str(_) | Self::Bytes(_), _) => {
				Err(ValueError::Incomparable {
					lhs: self.type_name(),
					rhs: needle.type_name(),
				})
			}
			_ => {
				Err(ValueError::NotContainer {
					type_name: self.type_name(),
				})
			}
		}
	}

	/// The textual form used for tag names, attribute values and text.
	pub fn to_text(&self) -> Cow<'_, str> {
		match self {
			Self::Str(text) => Cow::Borrowed(text),
			Self::Bytes(bytes) => decode_bytes(bytes),
			other => Cow::Owned(other.to_string()),
		}
	}

	fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Int(value) => Some(*value as f64),
			Self::Float(value) => Some(*value),
			_ => None,
		}
	}
}

/// Decode bytes as UTF-8, falling back to Latin-1. Latin-1 maps every byte
/// to a character so decoding never fails and never depends on the locale.
pub fn decode_bytes(bytes: &[u8]) -> Cow<'_, str> {
	match std::str::from_utf8(bytes) {
		Ok(text) => Cow::Borrowed(text),
		Err(_) => Cow::Owned(bytes.iter().copied().map(char::from).collect()),
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => Ok(()),
			Self::Bool(value) => write!(f, "{value}"),
			Self::Int(value) => write!(f, "{value}"),
			Self::Float(value) => write!(f, "{value:?}"),
			Self::Str(text) => f.write_str(text),
			Self::Bytes(bytes) => f.write_str(&decode_bytes(bytes)),
			Self::List(items) => {
				f.write_str("[")?;
				for (index, item) in items.iter().enumerate() {
					if index > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{item}")?;
				}
				f.write_str("]")
			}
			Self::Map(mapping) => {
				f.write_str("{")?;
				for (index, (key, value)) in mapping.iter().enumerate() {
					if index > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{key}: {value}")?;
				}
				f.write_str("}")
			}
			Self::Record(record) => {
				write!(f, "{} {{", record.name())?;
				for (index, (name, value)) in record.fields().enumerate() {
					if index > 0 {
						f.write_str(",")?;
					}
					write!(f, " {name}: {value}")?;
				}
				f.write_str(" }")
			}
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

macro_rules! from_integer {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for Value {
				fn from(value: $ty) -> Self {
					Self::Int(i64::from(value))
				}
			}
		)*
	};
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
	fn from(value: f32) -> Self {
		Self::Float(f64::from(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::Str(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

impl From<Mapping> for Value {
	fn from(value: Mapping) -> Self {
		Self::Map(value)
	}
}

impl From<Record> for Value {
	fn from(value: Record) -> Self {
		Self::Record(value)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

impl<T: Into<Value>> From<Vec<T>> for Value {
	fn from(value: Vec<T>) -> Self {
		Self::List(value.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<Value>> FromIterator<T> for Value {
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		Self::List(iter.into_iter().map(Into::into).collect())
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(value) => Self::Bool(value),
			serde_json::Value::Number(number) => {
				number
					.as_i64()
					.map(Self::Int)
					.or_else(|| number.as_f64().map(Self::Float))
					.unwrap_or_default()
			}
			serde_json::Value::String(text) => Self::Str(text),
			serde_json::Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
			serde_json::Value::Object(object) => {
				Self::Map(object.into_iter().map(|(key, value)| (key, Self::from(value))).collect())
			}
		}
	}
}
