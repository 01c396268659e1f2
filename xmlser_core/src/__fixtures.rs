use crate::Record;
use crate::Value;

pub fn ada() -> Value {
	Value::map([
		("name", Value::from("Ada")),
		("age", Value::from(36)),
		("tags", Value::from(vec!["math", "poetry"])),
	])
}

pub fn alan() -> Value {
	Value::map([
		("name", Value::from("Alan")),
		("age", Value::from(41)),
		("tags", Value::from(vec!["math", "logic"])),
	])
}

pub fn people() -> Value {
	Value::map([("people", Value::from(vec![ada(), alan()]))])
}

pub fn ada_record() -> Value {
	Record::new("Person")
		.with_field("name", "Ada")
		.with_field("age", 36)
		.into()
}

pub fn letters() -> Value {
	Value::from(vec!["a", "b"])
}

pub fn pairs() -> Value {
	Value::map([("a", 1), ("b", 2)])
}

pub fn flags(ok: bool) -> Value {
	Value::map([("ok", ok)])
}

pub fn number(n: impl Into<Value>) -> Value {
	Value::map([("n", n.into())])
}
