use std::sync::Arc;

use leptos::prelude::*;

use super::force_graph::cluster_color;
use crate::live::{ClusterSummary, GraphSnapshot};

const PREVIEW_FILES: usize = 3;

/// One card in the cluster browser.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterCard {
	pub id: i64,
	pub name: String,
	pub color: &'static str,
	pub file_count: usize,
	/// `(file id, file name)` for the first few member files.
	pub preview: Vec<(String, String)>,
	pub more: usize,
}

impl ClusterCard {
	pub fn new(summary: &ClusterSummary, snapshot: &GraphSnapshot) -> Self {
		let preview: Vec<(String, String)> = snapshot
			.files_in(summary.id)
			.take(PREVIEW_FILES)
			.map(|f| (f.id.clone(), f.name.clone()))
			.collect();
		Self {
			id: summary.id,
			name: summary.name.clone(),
			color: cluster_color(summary.color_index()),
			file_count: summary.file_count,
			preview,
			more: summary.file_count.saturating_sub(PREVIEW_FILES),
		}
	}
}

pub fn cluster_cards(snapshot: &GraphSnapshot) -> Vec<ClusterCard> {
	snapshot
		.clusters
		.iter()
		.map(|c| ClusterCard::new(c, snapshot))
		.collect()
}

#[component]
pub fn ClusterList(snapshot: Signal<Arc<GraphSnapshot>>, on_open: Callback<String>) -> impl IntoView {
	let cards = Memo::new(move |_| snapshot.with(|s| cluster_cards(s)));

	view! {
		<section class="panel cluster-list">
			<header class="panel-header">
				<h3>"Semantic Clusters"</h3>
				<span class="subtle">{move || format!("{} Groups Active", cards.with(|c| c.len()))}</span>
			</header>
			<Show
				when=move || cards.with(|c| !c.is_empty())
				fallback=|| {
					view! {
						<div class="cluster-empty">
							<p class="title">"No clusters formed yet"</p>
							<p class="hint">"Upload 4+ files to start clustering"</p>
						</div>
					}
				}
			>
				<div class="cluster-grid">
					<For each=move || cards.get() key=|card| card.id let:card>
						<ClusterCardView card=card on_open=on_open />
					</For>
				</div>
			</Show>
		</section>
	}
}

#[component]
fn ClusterCardView(card: ClusterCard, on_open: Callback<String>) -> impl IntoView {
	let ClusterCard {
		name,
		color,
		file_count,
		preview,
		more,
		..
	} = card;
	view! {
		<div class="cluster-card">
			<span class="cluster-dot" style:background-color=color></span>
			<h4 class="cluster-name">{name}</h4>
			<div class="cluster-count mono">{format!("{file_count} FILES")}</div>
			<div class="cluster-files">
				{preview
					.into_iter()
					.map(|(id, name)| {
						view! {
							<div
								class="cluster-file"
								on:click=move |ev| {
									ev.stop_propagation();
									on_open.run(id.clone());
								}
							>
								{name}
							</div>
						}
					})
					.collect_view()}
				{(more > 0).then(|| view! { <div class="cluster-more">{format!("+{more} more...")}</div> })}
			</div>
		</div>
	}
}
