use leptos::prelude::*;

use crate::live::LogEntry;

/// Scrolling system log; sticks to the newest entry.
#[component]
pub fn ActivityLog(logs: Signal<Vec<LogEntry>>) -> impl IntoView {
	let scroller = NodeRef::<leptos::html::Div>::new();

	Effect::new(move |_| {
		logs.track();
		if let Some(el) = scroller.get() {
			el.set_scroll_top(el.scroll_height());
		}
	});

	view! {
		<aside class="panel activity-log">
			<header class="panel-header">
				<h3>"System Log"</h3>
				<span class="live-dot"></span>
			</header>
			<div class="log-entries mono" node_ref=scroller>
				<Show
					when=move || logs.with(|l| !l.is_empty())
					fallback=|| view! { <div class="log-empty">"System ready... waiting for input"</div> }
				>
					{move || {
						logs.get()
							.into_iter()
							.map(|entry| {
								let LogEntry { time_str, message, kind, icon, .. } = entry;
								view! {
									<div class="log-entry">
										<span class=format!("log-dot {}", kind.css_class())></span>
										<div class="log-body">
											<div class="log-time">{time_str}</div>
											<div class="log-message">
												{icon.map(|i| view! { <span class="log-icon">{i}" "</span> })}
												{message}
											</div>
										</div>
									</div>
								}
							})
							.collect_view()
					}}
				</Show>
			</div>
		</aside>
	}
}
