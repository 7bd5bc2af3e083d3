use std::sync::Arc;

use leptos::prelude::*;

use crate::live::GraphSnapshot;

/// Compact counter: `1.2K`, `3.4M`; small values are shown in full.
pub fn format_number(n: u64) -> String {
	if n >= 1_000_000 {
		format!("{:.1}M", n as f64 / 1_000_000.0)
	} else if n >= 1_000 {
		format!("{:.1}K", n as f64 / 1_000.0)
	} else {
		n.to_string()
	}
}

/// Width of the cluster bar, 10% per cluster, capped at 100%.
pub fn cluster_bar_percent(clusters: usize) -> usize {
	clusters.saturating_mul(10).min(100)
}

pub fn average_words(snapshot: &GraphSnapshot) -> u64 {
	match snapshot.files_tracked() as u64 {
		0 => 0,
		files => (snapshot.total_words() as f64 / files as f64).round() as u64,
	}
}

#[component]
pub fn StatsGrid(
	snapshot: Signal<Arc<GraphSnapshot>>,
	/// Opens the file picker.
	on_add_files: Callback<()>,
) -> impl IntoView {
	let files = move || snapshot.with(|s| s.files_tracked());
	let clusters = move || snapshot.with(|s| s.clusters.len());
	let words = move || snapshot.with(|s| format_number(s.total_words()));
	let average = move || snapshot.with(|s| average_words(s));

	view! {
		<div class="stats-grid">
			<div class="stat-card stat-card-action" on:click=move |_| on_add_files.run(())>
				<div class="stat-label">"Files Tracked"</div>
				<div class="stat-value">{files}</div>
				<div class="stat-footer">"+ Add Files to Organize"</div>
			</div>
			<div class="stat-card">
				<div class="stat-label">"Semantic Clusters"</div>
				<div class="stat-value">{clusters}</div>
				<div class="stat-bar">
					<div
						class="stat-bar-fill"
						style:width=move || format!("{}%", cluster_bar_percent(clusters()))
					></div>
				</div>
			</div>
			<div class="stat-card">
				<div class="stat-label">"Total Words"</div>
				<div class="stat-value">{words}</div>
				<div class="stat-footer mono">{move || format!("AVG: {} / FILE", average())}</div>
			</div>
		</div>
	}
}
