//! Process-wide cache of parsed type-code preferences.
//!
//! Parsing a preference is cheap but happens once per build for every
//! preference setting; hosts running many builds in one process share the
//! parsed codes. Entries are keyed by setting name and raw value, so two
//! builds with different values never observe each other's result.
//!
//! Failed parses are not cached.

use std::sync::LazyLock;

use keel_config::Settings;
use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;

use crate::{Result, SqlTypeCode};

static CACHE: LazyLock<Mutex<HashMap<(String, String), SqlTypeCode>>> = LazyLock::new(Default::default);

/// Returns the type code configured under `name`, or `default` when unset.
pub fn preferred_type_code(settings: &Settings, name: &str, default: SqlTypeCode) -> Result<SqlTypeCode> {
	let Some(raw) = settings.raw(name) else {
		return Ok(default);
	};

	let key = (name.to_string(), raw.to_string());
	if let Some(code) = CACHE.lock().get(&key) {
		return Ok(*code);
	}

	let code = SqlTypeCode::from_setting(name, raw)?;
	CACHE.lock().insert(key, code);
	Ok(code)
}

#[cfg(test)]
pub(crate) fn cached_entries() -> usize {
	CACHE.lock().len()
}
