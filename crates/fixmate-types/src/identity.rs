//! Identity types for authenticated marketplace callers.
//!
//! Every authenticated request resolves to an [`Identity`] carrying the
//! caller's user id, display name and [`Role`]. Role checks at the API
//! boundary and ownership checks in the lifecycle handlers both work
//! against these types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketplace roles.
///
/// A caller holds exactly one role. Admins pass every role gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	/// Places supply orders and books services.
	Customer,
	/// Offers hourly labor services.
	Vendor,
	/// Sells physical products.
	Supplier,
	/// Fulfills supply-order deliveries.
	Driver,
	/// Platform administrator.
	Admin,
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Customer => write!(f, "customer"),
			Role::Vendor => write!(f, "vendor"),
			Role::Supplier => write!(f, "supplier"),
			Role::Driver => write!(f, "driver"),
			Role::Admin => write!(f, "admin"),
		}
	}
}

/// The resolved identity of an authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
	/// Stable user identifier.
	pub user_id: String,
	/// Display name, snapshotted into orders where needed.
	pub name: String,
	/// Contact phone, if known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	/// The caller's marketplace role.
	pub role: Role,
}

impl Identity {
	/// Returns true when the identity holds the given role or is an admin.
	pub fn has_role(&self, role: Role) -> bool {
		self.role == role || self.role == Role::Admin
	}

	/// Returns true when the identity is the platform administrator.
	pub fn is_admin(&self) -> bool {
		self.role == Role::Admin
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn admin_passes_every_role_gate() {
		let admin = Identity {
			user_id: "u-admin".into(),
			name: "Root".into(),
			phone: None,
			role: Role::Admin,
		};
		assert!(admin.has_role(Role::Customer));
		assert!(admin.has_role(Role::Driver));
		assert!(admin.is_admin());
	}

	#[test]
	fn role_wire_format_is_lowercase() {
		assert_eq!(serde_json::to_string(&Role::Driver).unwrap(), "\"driver\"");
		let parsed: Role = serde_json::from_str("\"supplier\"").unwrap();
		assert_eq!(parsed, Role::Supplier);
	}
}
