//! Fire-and-forget calls to the organiser's HTTP endpoints.

use gloo_net::http::Request;
use log::{debug, info};
use serde::Deserialize;
use wasm_bindgen_futures::spawn_local;
use web_sys::{File, FormData};

use crate::config::DashboardConfig;
use crate::error::DashboardError;

/// Asks the backend to open `path` with the desktop's default application.
/// Best effort: failures are logged and otherwise invisible.
pub fn open_file(config: &DashboardConfig, path: &str) {
	let url = config.open_url(path);
	spawn_local(async move {
		match Request::get(&url).send().await {
			Ok(response) if response.ok() => debug!("open requested: {url}"),
			Ok(response) => debug!("open {url}: HTTP {}", response.status()),
			Err(err) => debug!("open {url}: {}", DashboardError::from(err)),
		}
	});
}

#[derive(Debug, Default, Deserialize)]
struct UploadReceipt {
	#[serde(default)]
	count: usize,
}

/// Posts `files` as one multipart form; returns the count the backend accepted.
pub async fn upload_files(config: &DashboardConfig, files: &[File]) -> Result<usize, DashboardError> {
	let form = FormData::new().map_err(|e| DashboardError::browser("FormData", &e))?;
	for file in files {
		form.append_with_blob_and_filename("files", file, &file.name())
			.map_err(|e| DashboardError::browser("FormData.append", &e))?;
	}
	let response = Request::post(&config.upload_url()).body(form)?.send().await?;
	if !response.ok() {
		return Err(DashboardError::Request(format!("HTTP {}", response.status())));
	}
	let receipt: UploadReceipt = response.json().await?;
	info!("uploaded {} of {} file(s)", receipt.count, files.len());
	Ok(receipt.count)
}
