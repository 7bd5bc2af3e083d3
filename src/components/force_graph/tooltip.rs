use leptos::prelude::*;

use super::types::{NodeKind, SceneNode};

const OFFSET_X: f64 = 16.0;
const OFFSET_Y: f64 = 20.0;
const MARGIN: f64 = 8.0;
/// Horizontal room kept for the card so it never hangs off the right edge.
const CARD_WIDTH: f64 = 260.0;
const CARD_HEIGHT: f64 = 180.0;
pub const MAX_KEYWORDS: usize = 5;

/// Card contents and placement for a hovered file node.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipModel {
	pub file_id: String,
	pub name: String,
	pub color: &'static str,
	pub word_count: u64,
	pub cluster_name: String,
	pub keywords: Vec<String>,
	pub snippet: String,
	pub left: f64,
	pub top: f64,
}

impl TooltipModel {
	/// None for cluster nodes; they have no card.
	pub fn for_node(node: &SceneNode, x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
		let NodeKind::File {
			word_count,
			keywords,
			snippet,
			cluster_name,
		} = &node.kind
		else {
			return None;
		};
		let (left, top) = place(x, y, width, height);
		Some(Self {
			file_id: node.key.display_id(),
			name: node.label.clone(),
			color: node.color,
			word_count: *word_count,
			cluster_name: cluster_name.clone(),
			keywords: keywords.iter().take(MAX_KEYWORDS).cloned().collect(),
			snippet: snippet.clone(),
			left,
			top,
		})
	}
}

/// Near the pointer, clamped inside the viewport.
fn place(x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
	let left = (x + OFFSET_X).min(width - CARD_WIDTH).max(MARGIN);
	let top = (y - OFFSET_Y).min(height - CARD_HEIGHT).max(MARGIN);
	(left, top)
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(n: u64) -> String {
	let digits = n.to_string();
	let mut out = String::with_capacity(digits.len() + digits.len() / 3);
	for (i, ch) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			out.push(',');
		}
		out.push(ch);
	}
	out
}

#[component]
pub fn FileTooltip(
	model: Signal<Option<TooltipModel>>,
	on_open: Callback<String>,
	on_enter: Callback<()>,
	on_leave: Callback<()>,
) -> impl IntoView {
	move || {
		model.get().map(|tip| {
			let TooltipModel {
				file_id,
				name,
				color,
				word_count,
				cluster_name,
				keywords,
				snippet,
				left,
				top,
			} = tip;
			let style = format!("position: absolute; left: {left}px; top: {top}px; z-index: 999; max-width: 280px;");
			view! {
				<div
					class="graph-tooltip"
					style=style
					on:mouseenter=move |_| on_enter.run(())
					on:mouseleave=move |_| on_leave.run(())
				>
					<div class="graph-tooltip-title">
						<span class="graph-tooltip-dot" style=format!("background: {color};")></span>
						<span class="graph-tooltip-name">{name}</span>
					</div>
					<div class="graph-tooltip-meta">
						{(word_count > 0).then(|| view! { <span>{format!("{} words", group_thousands(word_count))}</span> })}
						{(!cluster_name.is_empty()).then(|| view! { <span>{cluster_name}</span> })}
					</div>
					{(!keywords.is_empty()).then(|| view! {
						<div class="graph-tooltip-keywords">
							{keywords.into_iter().map(|kw| view! { <span class="keyword">{kw}</span> }).collect_view()}
						</div>
					})}
					{(!snippet.is_empty()).then(|| view! { <p class="graph-tooltip-snippet">{snippet}</p> })}
					<button
						class="btn sm graph-tooltip-open"
						on:click=move |ev| {
							ev.stop_propagation();
							on_open.run(file_id.clone());
						}
					>
						"Open File"
					</button>
				</div>
			}
		})
	}
}
