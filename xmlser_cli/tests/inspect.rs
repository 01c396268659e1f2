mod common;

use serde_json::json;
use similar_asserts::assert_eq;
use xmlser_core::AnyEmptyResult;

fn inspect(args: &[&str]) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
	let tmp = tempfile::tempdir()?;
	let output = common::xmlser_cmd()
		.arg("inspect")
		.arg("--path")
		.arg(tmp.path())
		.args(args)
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();

	Ok(serde_json::from_slice(&output)?)
}

#[test]
fn inspect_prints_document_tree() -> AnyEmptyResult {
	let tree = inspect(&["--format", "<root=id.id&?>"])?;

	assert_eq!(
		tree,
		json!({
			"document": {
				"name": { "literal": "root" },
				"offset": 1,
				"children": [
					{
						"attribute": {
							"name": { "literal": "id" },
							"offset": 6,
							"value": { "lookup": [{ "name": "id" }] }
						}
					},
					{ "text": { "value": "identity" } }
				]
			}
		})
	);

	Ok(())
}

#[test]
fn inspect_prints_fragment_tree() -> AnyEmptyResult {
	let tree = inspect(&["--format", "<item*3>", "--fragment"])?;

	assert_eq!(
		tree,
		json!({
			"fragment": [
				{
					"repeat": {
						"source": { "items": { "literal": 3 } },
						"inner": {
							"tag": {
								"name": { "literal": "item" },
								"offset": 1,
								"children": []
							}
						}
					}
				}
			]
		})
	);

	Ok(())
}

#[test]
fn inspect_shows_conditionals() -> AnyEmptyResult {
	let tree = inspect(&["--format", "<root~!.n<5<small>>"])?;
	let conditional = &tree["document"]["children"][0]["conditional"];

	assert_eq!(conditional["operator"], json!("lt"));
	assert_eq!(conditional["negate"], json!(true));
	assert_eq!(conditional["rhs"], json!({ "literal": 5 }));
	assert_eq!(conditional["otherwise"], json!(null));

	Ok(())
}
