use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures surfaced by the dashboard's browser-facing plumbing.
///
/// None of these are fatal: transport errors feed the reconnect loop, request
/// errors become a status line or are dropped, browser errors skip a frame.
#[derive(Debug, Error)]
pub enum DashboardError {
	#[error("socket: {0}")]
	Socket(String),
	#[error("malformed message: {0}")]
	Decode(#[from] serde_json::Error),
	#[error("request failed: {0}")]
	Request(String),
	#[error("browser: {0}")]
	Browser(String),
}

impl DashboardError {
	pub fn browser(context: &str, value: &JsValue) -> Self {
		Self::Browser(format!("{context}: {}", describe(value)))
	}

	pub fn socket(context: &str, value: &JsValue) -> Self {
		Self::Socket(format!("{context}: {}", describe(value)))
	}
}

impl From<gloo_net::Error> for DashboardError {
	fn from(err: gloo_net::Error) -> Self {
		Self::Request(err.to_string())
	}
}

fn describe(value: &JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
