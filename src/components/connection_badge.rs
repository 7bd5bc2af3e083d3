use leptos::prelude::*;

use crate::live::ConnectionState;

pub fn badge_label(state: ConnectionState) -> &'static str {
	if state.is_connected() {
		"System Online"
	} else {
		"Connecting..."
	}
}

#[component]
pub fn ConnectionBadge(state: Signal<ConnectionState>) -> impl IntoView {
	let online = move || state.get().is_connected();
	view! {
		<div class="connection-badge" class:online=online class:offline=move || !online()>
			<span class="connection-dot"></span>
			<span class="connection-label">{move || badge_label(state.get())}</span>
		</div>
	}
}
