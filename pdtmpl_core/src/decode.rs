use serde_yaml_ng::Mapping;
use serde_yaml_ng::Value;

use crate::PdtmplError;
use crate::PdtmplResult;

/// Decode the text of a metadata block into a mapping.
///
/// Text whose first non-blank character is `{` is tried as JSON first and
/// falls back to YAML, so flow mappings such as `{form: {id: a}}` decode too.
/// Everything else is read as YAML. An empty block (or one holding only
/// comments) decodes to an empty mapping. `line` is the line the error is
/// attributed to.
pub fn decode_mapping(text: &str, line: usize) -> PdtmplResult<Mapping> {
	if text.trim().is_empty() {
		return Ok(Mapping::new());
	}

	let json = if text.trim_start().starts_with('{') {
		serde_json::from_str::<serde_json::Value>(text).ok()
	} else {
		None
	};
	let value = match json {
		Some(json) => serde_yaml_ng::to_value(json).map_err(|e| decode_error(line, &e))?,
		None => serde_yaml_ng::from_str::<Value>(text).map_err(|e| decode_error(line, &e))?,
	};

	match value {
		Value::Null => Ok(Mapping::new()),
		Value::Mapping(mapping) => Ok(mapping),
		other => {
			Err(PdtmplError::NotAMapping {
				line,
				found: describe(&other).to_string(),
			})
		}
	}
}

/// Look up the `form` entry of a decoded block. Returns `None` unless the
/// entry exists and is itself a mapping.
pub fn form_mapping(mapping: &Mapping) -> Option<&Mapping> {
	mapping.get("form").and_then(Value::as_mapping)
}

/// Read a string-valued entry. Entries of any other type count as absent.
pub(crate) fn get_str(mapping: &Mapping, key: &str) -> Option<String> {
	mapping.get(key).and_then(Value::as_str).map(ToString::to_string)
}

/// Render a scalar as text. Sequences, mappings and nulls have no scalar
/// form.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Tagged(tagged) => scalar_to_string(&tagged.value),
		Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
	}
}

fn decode_error(line: usize, error: &impl std::fmt::Display) -> PdtmplError {
	PdtmplError::Decode {
		line,
		reason: error.to_string(),
	}
}

fn describe(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Sequence(_) => "a sequence",
		Value::Mapping(_) => "a mapping",
		Value::Tagged(_) => "a tagged value",
	}
}
