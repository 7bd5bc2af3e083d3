//! Dashboard configuration: service endpoints, reconnect policy and layout tuning.

/// Socket endpoint used when no `AURAFS_SOCKET_URL` is set at build time.
pub const DEFAULT_SOCKET_URL: &str = "ws://localhost:8000/ws";
/// HTTP base used when no `AURAFS_API_BASE` is set at build time.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Exponential reconnect schedule: `min(max_ms, base_ms * 2^attempt)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
	pub base_ms: u32,
	pub max_ms: u32,
}

impl Default for BackoffPolicy {
	fn default() -> Self {
		Self {
			base_ms: 2_000,
			max_ms: 30_000,
		}
	}
}

impl BackoffPolicy {
	/// Delay before retry number `attempt` (0-based).
	pub fn delay_ms(&self, attempt: u32) -> u32 {
		2u64.checked_pow(attempt)
			.and_then(|factor| u64::from(self.base_ms).checked_mul(factor))
			.map_or(self.max_ms, |delay| delay.min(u64::from(self.max_ms)) as u32)
	}
}

/// Force simulation and camera tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
	pub velocity_decay: f32,
	pub alpha_decay: f64,
	pub alpha_min: f64,
	pub cooldown_ticks: u32,
	pub charge: f32,
	pub spring: f32,
	pub settle_delay_ms: f64,
	pub fit_padding: f64,
	pub cluster_fit_padding: f64,
	pub fit_duration_ms: f64,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			velocity_decay: 0.3,
			alpha_decay: 0.04,
			alpha_min: 0.001,
			cooldown_ticks: 80,
			charge: 150.0,
			spring: 0.05,
			settle_delay_ms: 500.0,
			fit_padding: 60.0,
			cluster_fit_padding: 80.0,
			fit_duration_ms: 400.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardConfig {
	pub socket_url: String,
	pub api_base: String,
	pub backoff: BackoffPolicy,
	pub layout: LayoutParams,
}

impl Default for DashboardConfig {
	fn default() -> Self {
		Self {
			socket_url: option_env!("AURAFS_SOCKET_URL")
				.unwrap_or(DEFAULT_SOCKET_URL)
				.to_string(),
			api_base: option_env!("AURAFS_API_BASE")
				.unwrap_or(DEFAULT_API_BASE)
				.trim_end_matches('/')
				.to_string(),
			backoff: BackoffPolicy::default(),
			layout: LayoutParams::default(),
		}
	}
}

impl DashboardConfig {
	pub fn open_url(&self, path: &str) -> String {
		format!("{}/open?path={}", self.api_base, encode_query_value(path))
	}

	pub fn upload_url(&self) -> String {
		format!("{}/upload", self.api_base)
	}
}

/// Percent-encodes everything except the `encodeURIComponent` unreserved set.
pub fn encode_query_value(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for byte in value.bytes() {
		match byte {
			b'A'..=b'Z'
			| b'a'..=b'z'
			| b'0'..=b'9'
			| b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => {
				out.push(byte as char)
			}
			_ => out.push_str(&format!("%{byte:02X}")),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn backoff_sequence_doubles_then_caps() {
		let policy = BackoffPolicy::default();
		let delays: Vec<u32> = (0..7).map(|n| policy.delay_ms(n)).collect();
		assert_eq!(delays, vec![2000, 4000, 8000, 16000, 30000, 30000, 30000]);
	}

	#[test]
	fn backoff_never_overflows() {
		let policy = BackoffPolicy::default();
		assert_eq!(policy.delay_ms(63), 30_000);
		assert_eq!(policy.delay_ms(64), 30_000);
		assert_eq!(policy.delay_ms(u32::MAX), 30_000);
	}

	#[test]
	fn open_url_encodes_path_like_encode_uri_component() {
		let config = DashboardConfig {
			api_base: "http://localhost:8000".into(),
			..DashboardConfig::default()
		};
		assert_eq!(
			config.open_url("/home/me/My Notes/a&b.txt"),
			"http://localhost:8000/open?path=%2Fhome%2Fme%2FMy%20Notes%2Fa%26b.txt"
		);
		assert_eq!(encode_query_value("résumé.pdf"), "r%C3%A9sum%C3%A9.pdf");
	}
}
