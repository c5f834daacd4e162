//! `pdtmpl_core` is the core library for the pdtmpl Pandoc preprocessor. It
//! scans a markdown document for `---` delimited metadata blocks and rewrites
//! every block that describes a `form` as an HTML web form, leaving the rest
//! of the document untouched.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Markdown document (line stream)
//!   → BlockScanner (fenced code / metadata block / plain text state machine)
//!   → Decoder (YAML or JSON block text → mapping)
//!   → FormSpec (tolerant, typed view of the `form` mapping)
//!   → FormEmitter (HTML markup written in place of the block)
//! ```
//!
//! Fenced code regions (`~~~`) are copied verbatim, even when they contain
//! `---` lines. Blocks without a `form` mapping are copied verbatim between
//! their delimiters. Blocks that fail to decode are copied verbatim too, and
//! reported as `line <N>: <message>` diagnostics.
//!
//! ## Modules
//!
//! - [`config`] — Configuration loading from `pdtmpl.toml`.
//! - [`scanner`] — The line-oriented block scanner.
//! - [`decode`] — Metadata block decoding.
//! - [`form`] — Form and field specs and the HTML emitter.
//! - [`webform`] — The streaming driver tying the pieces together.
//!
//! ## Quick Start
//!
//! ```rust
//! use pdtmpl_core::WebFormConfig;
//! use pdtmpl_core::render_web_form;
//!
//! let input = "---\nform:\n  id: login\n  elements:\n    - id: user\n---\n";
//! let result = render_web_form(input, WebFormConfig::default()).unwrap();
//!
//! assert_eq!(
//! 	result.output,
//! 	"<form id=\"login\">\n<input type=\"text\" id=\"user\">\n</form>\n"
//! );
//! assert!(result.summary.is_ok());
//! ```

pub use config::*;
pub use error::*;
pub use form::*;
pub use scanner::*;
pub use webform::*;

pub mod config;
pub mod decode;
#[allow(unused_assignments)]
mod error;
pub mod form;
pub mod scanner;
mod webform;
