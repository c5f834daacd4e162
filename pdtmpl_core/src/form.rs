use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_yaml_ng::Mapping;
use serde_yaml_ng::Value;

use crate::WebFormConfig;
use crate::decode::get_str;
use crate::decode::scalar_to_string;

/// Field type used when an element declares none.
pub const DEFAULT_FIELD_TYPE: &str = "text";

/// Form-level attributes in emission order, paired with the HTML attribute
/// each one is written as.
const FORM_ATTRIBUTES: [(&str, &str); 5] = [
	("id", "id"),
	("name", "name"),
	("action", "action"),
	("method", "method"),
	("encoding", "enctype"),
];

/// A `form` mapping from a metadata block.
///
/// ```yaml
/// form:
///   id: guestbook
///   action: /api/guestbook
///   method: POST
///   elements:
///     - id: name
///       label: Your name
///       required: required
///     - id: message
///       type: textarea
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSpec {
	pub id: Option<String>,
	pub name: Option<String>,
	pub action: Option<String>,
	pub method: Option<String>,
	pub encoding: Option<String>,
	/// Fields in declaration order.
	pub elements: Vec<FieldSpec>,
}

impl FormSpec {
	/// Build a form from its decoded mapping. Missing or mistyped entries are
	/// left empty rather than rejected; `elements` entries that are not
	/// mappings are skipped.
	pub fn from_mapping(mapping: &Mapping) -> Self {
		let elements = mapping
			.get("elements")
			.and_then(Value::as_sequence)
			.map(|items| {
				items
					.iter()
					.filter_map(|item| {
						let field = item.as_mapping().map(FieldSpec::from_mapping);
						if field.is_none() {
							tracing::debug!(?item, "skipping form element that is not a mapping");
						}
						field
					})
					.collect()
			})
			.unwrap_or_default();

		Self {
			id: get_str(mapping, "id"),
			name: get_str(mapping, "name"),
			action: get_str(mapping, "action"),
			method: get_str(mapping, "method"),
			encoding: get_str(mapping, "encoding"),
			elements,
		}
	}

	fn attribute(&self, key: &str) -> Option<&str> {
		match key {
			"id" => self.id.as_deref(),
			"name" => self.name.as_deref(),
			"action" => self.action.as_deref(),
			"method" => self.method.as_deref(),
			"encoding" => self.encoding.as_deref(),
			_ => None,
		}
	}
}

/// One entry of a form's `elements` sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
	pub id: Option<String>,
	/// Normalized field type: never empty, and `button` is folded into
	/// `text`.
	pub field_type: String,
	pub label: Option<String>,
	pub class: Option<String>,
	pub name: Option<String>,
	pub value: Option<String>,
	pub required: Option<String>,
	pub placeholder_text: Option<String>,
	pub title: Option<String>,
	pub pattern: Option<String>,
	/// Option value to option label, for `select` fields only. Sorted by
	/// value.
	pub options: BTreeMap<String, String>,
}

impl Default for FieldSpec {
	fn default() -> Self {
		Self {
			id: None,
			field_type: DEFAULT_FIELD_TYPE.to_string(),
			label: None,
			class: None,
			name: None,
			value: None,
			required: None,
			placeholder_text: None,
			title: None,
			pattern: None,
			options: BTreeMap::new(),
		}
	}
}

impl FieldSpec {
	pub fn from_mapping(mapping: &Mapping) -> Self {
		let field_type = normalize_field_type(get_str(mapping, "type").as_deref());
		let options = if field_type == "select" {
			mapping
				.get("options")
				.and_then(Value::as_mapping)
				.map(collect_options)
				.unwrap_or_default()
		} else {
			BTreeMap::new()
		};

		Self {
			id: get_str(mapping, "id"),
			field_type,
			label: get_str(mapping, "label"),
			class: get_str(mapping, "class"),
			name: get_str(mapping, "name"),
			value: get_str(mapping, "value"),
			required: get_str(mapping, "required"),
			placeholder_text: get_str(mapping, "placeholdertext"),
			title: get_str(mapping, "title"),
			pattern: get_str(mapping, "pattern"),
			options,
		}
	}

	pub fn is_select(&self) -> bool {
		self.field_type == "select"
	}

	pub fn is_textarea(&self) -> bool {
		self.field_type == "textarea"
	}

	/// Optional attributes in emission order, paired with their HTML names.
	fn attributes(&self) -> [(&'static str, Option<&str>); 7] {
		[
			("class", self.class.as_deref()),
			("name", self.name.as_deref()),
			("value", self.value.as_deref()),
			("required", self.required.as_deref()),
			("placeholder", self.placeholder_text.as_deref()),
			("title", self.title.as_deref()),
			("pattern", self.pattern.as_deref()),
		]
	}
}

/// Resolve a declared field type. Absent or blank types become `text`, and
/// `button` is an alias for `text`.
pub fn normalize_field_type(declared: Option<&str>) -> String {
	match declared.map(str::trim) {
		None | Some("" | "button") => DEFAULT_FIELD_TYPE.to_string(),
		Some(other) => other.to_string(),
	}
}

fn collect_options(mapping: &Mapping) -> BTreeMap<String, String> {
	mapping
		.iter()
		.filter_map(|(value, label)| Some((scalar_to_string(value)?, scalar_to_string(label)?)))
		.collect()
}

/// Renders [`FormSpec`]s as HTML. Rendering never fails: anything missing is
/// simply left out of the markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormEmitter {
	config: WebFormConfig,
}

impl FormEmitter {
	pub fn new(config: WebFormConfig) -> Self {
		Self { config }
	}

	/// Render a complete `<form>` element. Each element sits on its own line
	/// and the result ends with a newline.
	pub fn render(&self, form: &FormSpec) -> String {
		let mut out = String::from("<form");
		for (key, html_name) in FORM_ATTRIBUTES {
			if let Some(value) = form.attribute(key) {
				self.push_attribute(&mut out, html_name, value);
			}
		}
		out.push_str(">\n");

		for field in &form.elements {
			self.render_field(&mut out, field);
		}

		out.push_str("</form>\n");
		out
	}

	fn render_field(&self, out: &mut String, field: &FieldSpec) {
		let id = field.id.as_deref().unwrap_or_default();

		if let Some(label) = &field.label {
			let text = if self.config.legacy_empty_labels {
				""
			} else {
				label.as_str()
			};
			out.push_str("<label");
			if !id.is_empty() {
				self.push_attribute(out, "for", id);
			}
			out.push_str(&format!(">{}</label>\n", self.text(text)));
		}

		let tag = if field.is_select() || field.is_textarea() {
			out.push_str(&format!("<{}", field.field_type));
			field.field_type.as_str()
		} else {
			out.push_str("<input");
			self.push_attribute(out, "type", &field.field_type);
			"input"
		};

		if !id.is_empty() {
			self.push_attribute(out, "id", id);
		}
		for (html_name, value) in field.attributes() {
			if let Some(value) = value {
				self.push_attribute(out, html_name, value);
			}
		}

		match tag {
			"select" => {
				out.push_str(">\n");
				for (value, label) in &field.options {
					out.push_str("<option");
					self.push_attribute(out, "value", value);
					out.push_str(&format!(">{}</option>\n", self.text(label)));
				}
				out.push_str("</select>\n");
			}
			"textarea" => out.push_str("></textarea>\n"),
			_ => out.push_str(">\n"),
		}
	}

	fn push_attribute(&self, out: &mut String, name: &str, value: &str) {
		let value = if self.config.escape_markup {
			html_escape::encode_double_quoted_attribute(value)
		} else {
			Cow::Borrowed(value)
		};
		out.push_str(&format!(" {name}=\"{value}\""));
	}

	fn text<'a>(&self, text: &'a str) -> Cow<'a, str> {
		if self.config.escape_markup {
			html_escape::encode_text(text)
		} else {
			Cow::Borrowed(text)
		}
	}
}
