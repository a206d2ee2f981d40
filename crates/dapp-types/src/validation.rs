//! Schema validation for implementation-specific TOML tables.
//!
//! Each pluggable backend (auth adapters in particular) owns a free-form
//! table in the configuration file. Before a backend is constructed its
//! table is checked against a [`Schema`] listing its required and optional
//! string fields and any extra rules on them.

use thiserror::Error;

/// Errors that can occur while validating a configuration table.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// A required field is absent.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// A field is present but its value was rejected.
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

/// Extra rule run after the type check; returns a message on failure.
pub type FieldValidator = Box<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// A named string field with an optional custom rule.
pub struct Field {
	pub name: String,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			validator: None,
		}
	}

	/// Attaches a custom rule to this field.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn check(&self, value: &toml::Value) -> Result<(), ValidationError> {
		let text = value.as_str().ok_or_else(|| ValidationError::TypeMismatch {
			field: self.name.clone(),
			expected: "string".to_string(),
			actual: value.type_str().to_string(),
		})?;
		if let Some(validator) = &self.validator {
			validator(text).map_err(|message| ValidationError::InvalidValue {
				field: self.name.clone(),
				message,
			})?;
		}
		Ok(())
	}
}

/// Required and optional fields of one TOML table.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	///
	/// Unknown keys are ignored so that newer configuration files keep
	/// loading with older builds.
	///
	/// # Errors
	///
	/// Returns the first problem found: the value is not a table, a required
	/// field is missing, a field is not a string or a custom rule rejects it.
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
			field.check(value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.check(value)?;
			}
		}

		Ok(())
	}
}

/// Implemented by each backend to validate its own configuration table.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}
