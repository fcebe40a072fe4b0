//! Duplicate-registration policies.
//!
//! Every registration call site names the policy it wants; there is no
//! collector-wide default.

use std::fmt::Display;
use std::hash::Hash;

use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::{debug, warn};

use crate::{BuildError, ContributorId, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
	/// Fail with [`BuildError::DuplicateRegistration`].
	Reject,
	/// Keep the existing registration; the incoming one is dropped.
	FirstWins,
	/// Replace the existing registration. Logged at warn level.
	LastWins,
}

/// Outcome of a registration that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
	Inserted,
	KeptExisting,
	ReplacedExisting,
}

impl Registration {
	/// Whether the incoming value is now the registered one.
	pub fn took_effect(self) -> bool {
		!matches!(self, Self::KeptExisting)
	}
}

pub(crate) fn register<K, V>(
	map: &mut IndexMap<K, V>,
	kind: &'static str,
	key: K,
	value: V,
	policy: DuplicatePolicy,
	contributor: &ContributorId,
) -> Result<Registration>
where
	K: Hash + Eq + Display,
{
	match map.entry(key) {
		Entry::Vacant(slot) => {
			slot.insert(value);
			Ok(Registration::Inserted)
		}
		Entry::Occupied(mut slot) => match policy {
			DuplicatePolicy::Reject => Err(BuildError::DuplicateRegistration {
				kind,
				key: slot.key().to_string(),
				contributor: contributor.clone(),
			}),
			DuplicatePolicy::FirstWins => {
				debug!(kind, key = %slot.key(), %contributor, "duplicate registration dropped");
				Ok(Registration::KeptExisting)
			}
			DuplicatePolicy::LastWins => {
				warn!(kind, key = %slot.key(), %contributor, "registration overridden");
				slot.insert(value);
				Ok(Registration::ReplacedExisting)
			}
		},
	}
}
