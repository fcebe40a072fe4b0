use keel_config::ConfigError;
use thiserror::Error;

use crate::SqlTypeCode;

/// Errors raised while setting up or querying the type registries.
#[derive(Debug, Error)]
pub enum TypeError {
	/// A setting that should name a type code could not be interpreted.
	#[error(
		"couldn't interpret '{value}' as type code or type code name for {setting}{}",
		suggestion.as_ref().map(|s| format!(" (did you mean '{s}'?)")).unwrap_or_default()
	)]
	InvalidTypeCodeName {
		setting: String,
		value: String,
		suggestion: Option<String>,
	},

	/// No descriptor is registered for the requested code.
	#[error("no descriptor registered for type code {0}")]
	UnknownTypeCode(SqlTypeCode),

	/// A preference points at a code the registry cannot resolve.
	#[error("preferred type code {preferred} for {code} has no registered descriptor")]
	MissingPreferredDescriptor { code: SqlTypeCode, preferred: SqlTypeCode },

	/// A type contributor reported a failure.
	#[error("type contributor {contributor} failed: {message}")]
	Contributor { contributor: String, message: String },

	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Result type for type-system operations.
pub type Result<T> = std::result::Result<T, TypeError>;
