//! Configuration validation utilities for pluggable backends.
//!
//! Backend implementations (storage, auth, notify) receive their settings as
//! raw TOML tables. Each one declares a [`Schema`] describing the fields it
//! expects, and the engine builder validates the table before the backend is
//! constructed, so misconfiguration fails at startup instead of at first use.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// A required field is missing from the configuration table.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// A field is present but its value is rejected.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// A field has the wrong TOML type.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// The TOML type a configuration field must have.
#[derive(Debug)]
pub enum FieldType {
	String,
	/// An integer with optional inclusive bounds.
	Integer { min: Option<i64>, max: Option<i64> },
	Boolean,
	/// An array whose elements all share one type.
	Array(Box<FieldType>),
	/// A nested table validated by its own schema.
	Table(Schema),
}

impl FieldType {
	fn type_name(&self) -> &'static str {
		match self {
			FieldType::String => "string",
			FieldType::Integer { .. } => "integer",
			FieldType::Boolean => "boolean",
			FieldType::Array(_) => "array",
			FieldType::Table(_) => "table",
		}
	}

	/// Checks that `value` matches this type, recursing into arrays and tables.
	fn check(&self, field: &str, value: &toml::Value) -> Result<(), ValidationError> {
		let mismatch = || ValidationError::TypeMismatch {
			field: field.to_string(),
			expected: self.type_name().to_string(),
			actual: value.type_str().to_string(),
		};

		match self {
			FieldType::String => value.as_str().map(|_| ()).ok_or_else(mismatch),
			FieldType::Boolean => value.as_bool().map(|_| ()).ok_or_else(mismatch),
			FieldType::Integer { min, max } => {
				let n = value.as_integer().ok_or_else(mismatch)?;
				if let Some(lo) = min {
					if n < *lo {
						return Err(ValidationError::InvalidValue {
							field: field.to_string(),
							message: format!("value {} is less than minimum {}", n, lo),
						});
					}
				}
				if let Some(hi) = max {
					if n > *hi {
						return Err(ValidationError::InvalidValue {
							field: field.to_string(),
							message: format!("value {} is greater than maximum {}", n, hi),
						});
					}
				}
				Ok(())
			},
			FieldType::Array(elem) => {
				let items = value.as_array().ok_or_else(mismatch)?;
				for (i, item) in items.iter().enumerate() {
					elem.check(&format!("{}[{}]", field, i), item)?;
				}
				Ok(())
			},
			FieldType::Table(schema) => {
				value.as_table().ok_or_else(mismatch)?;
				schema.validate(value).map_err(|e| e.nest(field))
			},
		}
	}
}

impl ValidationError {
	/// Prefixes the offending field path with its parent table name.
	fn nest(self, parent: &str) -> Self {
		match self {
			ValidationError::MissingField(f) => {
				ValidationError::MissingField(format!("{}.{}", parent, f))
			},
			ValidationError::InvalidValue { field, message } => ValidationError::InvalidValue {
				field: format!("{}.{}", parent, field),
				message,
			},
			ValidationError::TypeMismatch {
				field,
				expected,
				actual,
			} => ValidationError::TypeMismatch {
				field: format!("{}.{}", parent, field),
				expected,
				actual,
			},
		}
	}
}

/// One field in a configuration schema.
#[derive(Debug)]
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
}

impl Field {
	/// Creates a new field with the given name and type.
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
		}
	}
}

/// A validation schema: required fields that must be present and optional
/// fields that are checked when present. Schemas nest through
/// [`FieldType::Table`].
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	/// Creates a new schema with required and optional fields.
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			field.field_type.check(&field.name, value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.field_type.check(&field.name, value)?;
			}
		}

		Ok(())
	}
}

/// Trait defining a configuration schema that can validate TOML values.
///
/// Backends return a boxed implementation of this from their
/// `config_schema()` so the builder can validate polymorphically.
#[async_trait]
pub trait ConfigSchema: Send + Sync {
	/// Validates a TOML configuration value against this schema.
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(s: &str) -> toml::Value {
		toml::from_str(s).unwrap()
	}

	#[test]
	fn missing_required_field_is_rejected() {
		let schema = Schema::new(vec![Field::new("url", FieldType::String)], vec![]);
		let err = schema.validate(&parse("other = 1")).unwrap_err();
		assert!(matches!(err, ValidationError::MissingField(f) if f == "url"));
	}

	#[test]
	fn integer_bounds_are_enforced() {
		let schema = Schema::new(
			vec![Field::new(
				"ttl",
				FieldType::Integer {
					min: Some(0),
					max: Some(60),
				},
			)],
			vec![],
		);
		assert!(schema.validate(&parse("ttl = 30")).is_ok());
		assert!(schema.validate(&parse("ttl = -1")).is_err());
		assert!(schema.validate(&parse("ttl = 61")).is_err());
	}

	#[test]
	fn nested_table_errors_carry_the_path() {
		let inner = Schema::new(vec![Field::new("token", FieldType::String)], vec![]);
		let schema = Schema::new(vec![Field::new("auth", FieldType::Table(inner))], vec![]);
		let err = schema.validate(&parse("[auth]\nother = 1")).unwrap_err();
		assert_eq!(err.to_string(), "Missing required field: auth.token");
	}

	#[test]
	fn array_elements_are_type_checked() {
		let schema = Schema::new(
			vec![Field::new(
				"tags",
				FieldType::Array(Box::new(FieldType::String)),
			)],
			vec![],
		);
		assert!(schema.validate(&parse("tags = [\"a\", \"b\"]")).is_ok());
		let err = schema.validate(&parse("tags = [\"a\", 3]")).unwrap_err();
		assert!(err.to_string().contains("tags[1]"));
	}
}
