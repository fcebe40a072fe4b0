//! Error types for settings lookup.

use thiserror::Error;

/// Errors that can occur when reading or coercing settings.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// A discrete-valued setting holds a value outside its allowed set.
	#[error("unsupported configuration [name={name}, value={value}]. Choose value between: {}", quote_all(.allowed))]
	Unsupported {
		/// Setting name.
		name: String,
		/// The offending value.
		value: String,
		/// Every accepted value, default first.
		allowed: Vec<String>,
	},

	/// A value could not be coerced to the type the caller asked for.
	#[error("could not interpret configuration [name={name}, value={value}] as {target}")]
	Coercion {
		/// Setting name.
		name: String,
		/// The raw value as written.
		value: String,
		/// The requested type (`boolean`, `int`, `long`).
		target: &'static str,
	},

	/// Error parsing TOML syntax.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A TOML value kind that has no settings representation.
	#[error("unsupported TOML value for {name}: {kind}")]
	UnsupportedToml {
		/// Flattened setting name.
		name: String,
		/// TOML value kind (`float`, `datetime`, ...).
		kind: &'static str,
	},
}

fn quote_all(values: &[String]) -> String {
	values.iter().map(|v| format!("'{v}'")).collect::<Vec<_>>().join(", ")
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
