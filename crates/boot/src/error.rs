//! Build errors.
//!
//! A build stops at the first error. Every variant names the offending key
//! and, where one exists, the origin of the source that introduced it.

use std::error::Error as StdError;
use std::fmt::Write as _;

use keel_config::ConfigError;
use keel_types::TypeError;
use thiserror::Error;

use crate::{ContributorId, Origin};

/// Error type returned by plugins.
pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Error)]
pub enum BuildError {
	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Type(#[from] TypeError),

	/// A subclass fragment names a superclass no source declares.
	#[error(
		"unknown superclass '{superclass}' of entity {entity} ({origin}){}",
		suggestion.as_ref().map(|s| format!("; did you mean '{s}'?")).unwrap_or_default()
	)]
	UnknownSuperclass {
		superclass: String,
		entity: String,
		origin: Origin,
		suggestion: Option<String>,
	},

	/// Subclass fragments extend each other in a loop.
	#[error("cyclic entity hierarchy among: {}", .entities.join(", "))]
	CyclicHierarchy { entities: Vec<String> },

	/// A name that should denote a registered element does not.
	#[error(
		"unresolved {kind} '{name}'{}",
		origin.as_ref().map(|o| format!(" ({o})")).unwrap_or_default()
	)]
	UnresolvedReference {
		kind: &'static str,
		name: String,
		origin: Option<Origin>,
	},

	/// A natural key was registered twice where override is not permitted.
	#[error("duplicate {kind} registration '{key}' (contributor {contributor})")]
	DuplicateRegistration {
		kind: &'static str,
		key: String,
		contributor: ContributorId,
	},

	/// More than one source describes the same entity.
	#[error("entity {entity} is described more than once ({origin})")]
	DuplicateEntity { entity: String, origin: Origin },

	/// A hierarchy root declares no identifier.
	#[error("entity {entity} declares no identifier ({origin})")]
	MissingIdentifier { entity: String, origin: Origin },

	/// Deferred work was enqueued while the deferred queue was draining.
	#[error("deferred step '{label}' enqueued while deferred work was draining")]
	RecursiveSecondPass { label: String },

	/// A plugin failed with an error of its own.
	#[error("contributor {contributor} failed")]
	Plugin {
		contributor: String,
		#[source]
		source: BoxError,
	},
}

impl BuildError {
	/// Wraps a plugin error, passing build errors raised inside the plugin through unchanged.
	pub fn from_plugin(contributor: &str, error: BoxError) -> Self {
		match error.downcast::<BuildError>() {
			Ok(build) => *build,
			Err(source) => Self::Plugin {
				contributor: contributor.to_string(),
				source,
			},
		}
	}

	/// Renders the error with its full source chain, one cause per line.
	pub fn format_detailed(&self) -> String {
		let mut out = self.to_string();
		let mut source = self.source();
		while let Some(cause) = source {
			let _ = write!(out, "\n  caused by: {cause}");
			source = cause.source();
		}
		out
	}
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;
