use leptos::prelude::*;
use log::warn;
use wasm_bindgen_futures::spawn_local;
use web_sys::{File, FileList};

use crate::components::one_shot::OneShot;
use crate::config::DashboardConfig;
use crate::live::http;

/// How long a finished upload's status line stays up.
pub const STATUS_DISMISS_MS: u32 = 3_000;
/// Extensions the picker offers; the backend only extracts these.
pub const ACCEPTED_TYPES: &str = ".pdf,.txt";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadStatus {
	Uploading(usize),
	Uploaded(usize),
	Failed,
}

impl UploadStatus {
	pub fn message(self) -> String {
		match self {
			UploadStatus::Uploading(n) => format!("Uploading {n} file(s)..."),
			UploadStatus::Uploaded(n) => format!("Uploaded {n} file(s)"),
			UploadStatus::Failed => "Upload failed".to_string(),
		}
	}

	pub fn is_busy(self) -> bool {
		matches!(self, UploadStatus::Uploading(_))
	}
}

pub fn files_from(list: Option<FileList>) -> Vec<File> {
	let Some(list) = list else {
		return Vec::new();
	};
	(0..list.length()).filter_map(|i| list.get(i)).collect()
}

/// Upload status line plus the one-shot timer that clears it.
#[derive(Clone, Copy)]
pub struct Uploader {
	pub status: RwSignal<Option<UploadStatus>>,
	/// Bumped per upload; a response for an older upload is dropped.
	latest: StoredValue<u64>,
	dismiss: StoredValue<OneShot, LocalStorage>,
}

impl Default for Uploader {
	fn default() -> Self {
		Self::new()
	}
}

impl Uploader {
	pub fn new() -> Self {
		Self {
			status: RwSignal::new(None),
			latest: StoredValue::new(0),
			dismiss: StoredValue::new_local(OneShot::default()),
		}
	}

	/// Posts `files` and reports progress through [`Uploader::status`].
	pub fn upload(self, config: DashboardConfig, files: Vec<File>) {
		if files.is_empty() {
			return;
		}
		let upload = self.bump();
		self.dismiss.update_value(OneShot::cancel);
		self.status.set(Some(UploadStatus::Uploading(files.len())));
		spawn_local(async move {
			let outcome = match http::upload_files(&config, &files).await {
				Ok(count) => UploadStatus::Uploaded(count),
				Err(err) => {
					warn!("upload of {} file(s) failed: {err}", files.len());
					UploadStatus::Failed
				}
			};
			if self.latest.try_get_value() != Some(upload) {
				return;
			}
			self.status.try_set(Some(outcome));
			self.dismiss_later();
		});
	}

	fn bump(self) -> u64 {
		self.latest.update_value(|n| *n += 1);
		self.latest.get_value()
	}

	fn dismiss_later(self) {
		let status = self.status;
		self.dismiss.try_update_value(|timer| {
			timer.after(STATUS_DISMISS_MS, move || {
				status.try_set(None);
			})
		});
	}
}

/// Full-window overlay shown while files are dragged over the page.
#[component]
pub fn DropOverlay(visible: Signal<bool>) -> impl IntoView {
	view! {
		<Show when=move || visible.get()>
			<div class="drop-overlay">
				<h2>"Drop Files to Analyze"</h2>
				<p>".pdf and .txt files supported"</p>
			</div>
		</Show>
	}
}

#[component]
pub fn UploadStatusLine(status: Signal<Option<UploadStatus>>) -> impl IntoView {
	move || {
		status.get().map(|s| {
			view! {
				<div class="upload-status" class:busy=s.is_busy() class:failed=s == UploadStatus::Failed>
					{s.message()}
				</div>
			}
		})
	}
}
