//! Error types.
//!
//! None of these reach the end user: the component maps them to a "no data"
//! view, a deferred start, or a log line.

use thiserror::Error;

/// Why a simulation could not be initialized.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum LayoutError {
	#[error("graph has no nodes")]
	EmptyGraph,
	#[error("viewport {width}x{height} has no area")]
	ZeroViewport { width: f64, height: f64 },
}

/// Failure to read the embedded graph document from the page.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("missing page element: {0}")]
	MissingElement(&'static str),
	#[error("invalid graph document: {0}")]
	Json(#[from] serde_json::Error),
}
