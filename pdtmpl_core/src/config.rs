use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::PdtmplError;
use crate::PdtmplResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["pdtmpl.toml", ".pdtmpl.toml", ".config/pdtmpl.toml"];

/// Configuration loaded from a `pdtmpl.toml` file.
///
/// ```toml
/// [webform]
/// escape_markup = true
/// legacy_empty_labels = false
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct PdtmplConfig {
	/// Settings for rewriting `form` metadata blocks into HTML.
	#[serde(default)]
	pub webform: WebFormConfig,
}

/// Controls how form markup is emitted.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct WebFormConfig {
	/// HTML-escape attribute values, label text and option text. Defaults to
	/// `true`. Turning it off reproduces the raw, unescaped output of older
	/// releases and lets block authors inject arbitrary markup.
	#[serde(default = "default_escape_markup")]
	pub escape_markup: bool,
	/// Render every `<label>` with empty text, as older releases did, instead
	/// of the declared label text.
	#[serde(default)]
	pub legacy_empty_labels: bool,
}

impl Default for WebFormConfig {
	fn default() -> Self {
		Self {
			escape_markup: default_escape_markup(),
			legacy_empty_labels: false,
		}
	}
}

fn default_escape_markup() -> bool {
	true
}

impl PdtmplConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> PdtmplResult<Option<PdtmplConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;
		let config: PdtmplConfig =
			toml::from_str(&content).map_err(|e| PdtmplError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}

	/// Load the config at `root`, falling back to defaults when there is no
	/// config file.
	pub fn load_or_default(root: &Path) -> PdtmplResult<PdtmplConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}
}
