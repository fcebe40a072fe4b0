use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap as HashMap;

use crate::{JdbcType, ValueType};

/// A named pairing of a value representation with a JDBC descriptor.
#[derive(Debug, Clone)]
pub struct BasicType {
	name: String,
	value_type: ValueType,
	jdbc_type: Arc<JdbcType>,
}

impl BasicType {
	pub fn new(name: impl Into<String>, value_type: ValueType, jdbc_type: Arc<JdbcType>) -> Self {
		Self {
			name: name.into(),
			value_type,
			jdbc_type,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn value_type(&self) -> ValueType {
		self.value_type
	}

	pub fn jdbc_type(&self) -> &Arc<JdbcType> {
		&self.jdbc_type
	}
}

/// An application-supplied basic type and the extra keys it answers to.
#[derive(Debug, Clone)]
pub struct BasicTypeRegistration {
	pub basic: BasicType,
	pub keys: Vec<String>,
}

impl BasicTypeRegistration {
	pub fn new(basic: BasicType, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			basic,
			keys: keys.into_iter().map(Into::into).collect(),
		}
	}
}

/// Basic types addressable by registration name, simple value name,
/// qualified value name and any extra keys.
///
/// Re-registering under an existing key replaces the binding for every key of
/// the new registration. A previous registration stays reachable through keys
/// the new one does not claim.
#[derive(Debug, Clone, Default)]
pub struct BasicTypeRegistry {
	by_name: IndexMap<String, Arc<BasicType>>,
	by_key: HashMap<String, Arc<BasicType>>,
}

impl BasicTypeRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, basic: BasicType, extra_keys: &[String]) -> Arc<BasicType> {
		let basic = Arc::new(basic);
		let value_type = basic.value_type();

		let keys = [basic.name(), value_type.simple_name, value_type.qualified_name]
			.into_iter()
			.map(str::to_string)
			.chain(extra_keys.iter().cloned());
		for key in keys {
			self.by_key.insert(key, Arc::clone(&basic));
		}
		self.by_name.insert(basic.name().to_string(), Arc::clone(&basic));
		basic
	}

	pub fn resolve(&self, key: &str) -> Option<&Arc<BasicType>> {
		self.by_key.get(key)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.by_key.contains_key(key)
	}

	/// Registrations in first-registration order of their names.
	pub fn iter(&self) -> impl Iterator<Item = &Arc<BasicType>> {
		self.by_name.values()
	}

	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}
}
