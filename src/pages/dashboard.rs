use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use web_sys::{DragEvent, Event, HtmlInputElement};

use crate::components::activity_log::ActivityLog;
use crate::components::cluster_list::ClusterList;
use crate::components::connection_badge::ConnectionBadge;
use crate::components::force_graph::ForceGraphCanvas;
use crate::components::stats::StatsGrid;
use crate::components::upload::{ACCEPTED_TYPES, DropOverlay, UploadStatusLine, Uploader, files_from};
use crate::config::DashboardConfig;
use crate::live::http;
use crate::live::{
	BrowserTransport, Connection, ConnectionEvent, ConnectionState, GraphSnapshot, GraphStateStore, LogEntry,
	StoreChange,
};

/// Live organiser dashboard: stats, cluster browser, system log, uploads and
/// the cluster map overlay.
#[component]
pub fn Dashboard() -> impl IntoView {
	let config = use_context::<DashboardConfig>().unwrap_or_default();

	let snapshot = RwSignal::new(Arc::new(GraphSnapshot::default()));
	let logs = RwSignal::new(Vec::<LogEntry>::new());
	let connection_state = RwSignal::new(ConnectionState::Disconnected);
	let show_graph = RwSignal::new(false);
	let dragging = RwSignal::new(false);
	let uploader = Uploader::new();
	let file_input = NodeRef::<leptos::html::Input>::new();

	let store = Rc::new(RefCell::new(GraphStateStore::new()));
	store.borrow_mut().subscribe(move |store, change| match change {
		StoreChange::Graph => snapshot.set(store.snapshot()),
		StoreChange::Log => logs.set(store.logs().cloned().collect()),
	});

	let sink = Rc::clone(&store);
	let connection = Connection::open(
		config.socket_url.clone(),
		config.backoff,
		BrowserTransport::default(),
		move |event| match event {
			ConnectionEvent::State(state) => connection_state.set(state),
			ConnectionEvent::Message(message) => sink.borrow_mut().reduce(message),
		},
	);
	let live = StoredValue::new_local((connection, store));
	on_cleanup(move || {
		live.try_with_value(|(connection, _)| connection.close());
	});

	let open_config = config.clone();
	let on_open = Callback::new(move |path: String| http::open_file(&open_config, &path));
	let on_add_files = Callback::new(move |_| {
		if let Some(input) = file_input.get() {
			input.click();
		}
	});

	let pick_config = config.clone();
	let on_pick = move |ev: Event| {
		let input: HtmlInputElement = event_target(&ev);
		uploader.upload(pick_config.clone(), files_from(input.files()));
		input.set_value("");
	};

	let drop_config = config.clone();
	let on_drop = move |ev: DragEvent| {
		ev.prevent_default();
		ev.stop_propagation();
		dragging.set(false);
		let files = files_from(ev.data_transfer().and_then(|dt| dt.files()));
		uploader.upload(drop_config.clone(), files);
	};
	let on_dragover = move |ev: DragEvent| {
		ev.prevent_default();
		ev.stop_propagation();
		dragging.set(true);
	};
	let on_dragleave = move |ev: DragEvent| {
		ev.prevent_default();
		ev.stop_propagation();
		dragging.set(false);
	};

	view! {
		<div class="dashboard" on:dragover=on_dragover on:dragleave=on_dragleave on:drop=on_drop>
			<DropOverlay visible=dragging.into() />

			<Show when=move || show_graph.get()>
				<div class="graph-overlay">
					<header class="graph-overlay-header">
						<h2>"System Node Map"</h2>
						<button class="btn" on:click=move |_| show_graph.set(false)>
							"Close Visualization"
						</button>
					</header>
					<div class="graph-overlay-body">
						<ForceGraphCanvas snapshot=snapshot />
					</div>
				</div>
			</Show>

			<header class="app-header">
				<div class="brand">
					<span class="brand-name">"AuraFS"</span>
					<span class="brand-tagline">"Semantic Organization Engine"</span>
				</div>
				<div class="app-header-right">
					<button class="btn" on:click=move |_| show_graph.set(true)>
						"Cluster Visualization"
					</button>
					<ConnectionBadge state=connection_state.into() />
				</div>
			</header>

			<main class="dashboard-grid">
				<div class="dashboard-main">
					<StatsGrid snapshot=snapshot.into() on_add_files=on_add_files />
					<input
						node_ref=file_input
						type="file"
						multiple=true
						accept=ACCEPTED_TYPES
						class="hidden"
						on:change=on_pick
					/>
					<UploadStatusLine status=uploader.status.into() />
					<ClusterList snapshot=snapshot.into() on_open=on_open />
				</div>
				<ActivityLog logs=logs.into() />
			</main>
		</div>
	}
}
