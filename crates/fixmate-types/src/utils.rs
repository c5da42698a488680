//! Utility functions shared across the workspace.

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current unix timestamp in seconds.
///
/// Falls back to zero if the system clock is before the epoch, which only
/// happens on badly misconfigured hosts.
pub fn unix_now() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}

/// Truncates an id for display purposes.
///
/// Shows only the first 8 characters followed by ".." for longer strings.
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 8 {
		id.to_string()
	} else {
		format!("{}..", &id[..8])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truncates_long_ids() {
		assert_eq!(truncate_id("abcdefghij"), "abcdefgh..");
		assert_eq!(truncate_id("short"), "short");
	}
}
