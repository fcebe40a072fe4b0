use std::borrow::Cow;
use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;

use crate::{Result, SqlTypeCode, TypeError};

bitflags::bitflags! {
	/// What a descriptor can do with values of its type.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct JdbcCapabilities: u32 {
		/// Binds values as statement parameters.
		const BIND = 1 << 0;
		/// Extracts values from result rows.
		const EXTRACT = 1 << 1;
		/// Renders values as SQL literals.
		const LITERAL = 1 << 2;
		/// Binds and extracts through streams (LOB locators).
		const STREAM = 1 << 3;
		/// Carries an explicit time-zone offset.
		const ZONED = 1 << 4;
		/// Normalizes temporal values to UTC.
		const UTC = 1 << 5;
		/// Structured, geometric or network values needing platform support.
		const STRUCTURED = 1 << 6;
		/// Materializes LOB values eagerly instead of streaming.
		const MATERIALIZED = 1 << 7;
	}
}

/// Binder/extractor capability descriptor for one relational type.
///
/// Descriptors are shared as `Arc<JdbcType>` and compared by identity, not
/// by value: two equal-looking descriptors registered by different parties
/// are different registrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JdbcType {
	code: SqlTypeCode,
	ddl_code: SqlTypeCode,
	name: Cow<'static, str>,
	capabilities: JdbcCapabilities,
}

impl JdbcType {
	/// Creates a descriptor binding as `code` with bind/extract/literal support.
	pub fn new(code: SqlTypeCode, name: impl Into<Cow<'static, str>>) -> Self {
		Self {
			code,
			ddl_code: code,
			name: name.into(),
			capabilities: JdbcCapabilities::BIND | JdbcCapabilities::EXTRACT | JdbcCapabilities::LITERAL,
		}
	}

	/// Uses a different code for DDL generation than for binding.
	pub fn with_ddl_code(mut self, ddl_code: SqlTypeCode) -> Self {
		self.ddl_code = ddl_code;
		self
	}

	pub fn with_capabilities(mut self, capabilities: JdbcCapabilities) -> Self {
		self.capabilities |= capabilities;
		self
	}

	pub fn without_capabilities(mut self, capabilities: JdbcCapabilities) -> Self {
		self.capabilities -= capabilities;
		self
	}

	/// The code values are bound and extracted as.
	pub fn code(&self) -> SqlTypeCode {
		self.code
	}

	/// The code used to pick a DDL type name for columns of this type.
	pub fn ddl_code(&self) -> SqlTypeCode {
		self.ddl_code
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn capabilities(&self) -> JdbcCapabilities {
		self.capabilities
	}

	pub fn supports(&self, capabilities: JdbcCapabilities) -> bool {
		self.capabilities.contains(capabilities)
	}

	pub fn into_shared(self) -> Arc<Self> {
		Arc::new(self)
	}
}

/// Standard descriptor for a well-known code, as platforms register it natively.
pub(crate) fn standard_descriptor(code: SqlTypeCode) -> Option<JdbcType> {
	use JdbcCapabilities as C;

	let name = code.name()?;
	let base = JdbcType::new(code, name);
	let descriptor = match code {
		SqlTypeCode::BLOB | SqlTypeCode::CLOB | SqlTypeCode::NCLOB => {
			base.with_capabilities(C::STREAM).without_capabilities(C::LITERAL)
		}
		SqlTypeCode::MATERIALIZED_BLOB => JdbcType::new(SqlTypeCode::BLOB, name)
			.with_ddl_code(code)
			.with_capabilities(C::MATERIALIZED)
			.without_capabilities(C::LITERAL),
		SqlTypeCode::MATERIALIZED_CLOB => JdbcType::new(SqlTypeCode::CLOB, name)
			.with_ddl_code(code)
			.with_capabilities(C::MATERIALIZED),
		SqlTypeCode::MATERIALIZED_NCLOB => JdbcType::new(SqlTypeCode::NCLOB, name)
			.with_ddl_code(code)
			.with_capabilities(C::MATERIALIZED),
		SqlTypeCode::TIMESTAMP_WITH_TIMEZONE | SqlTypeCode::TIME_WITH_TIMEZONE => base.with_capabilities(C::ZONED),
		SqlTypeCode::TIMESTAMP_UTC => JdbcType::new(SqlTypeCode::TIMESTAMP_WITH_TIMEZONE, name)
			.with_ddl_code(code)
			.with_capabilities(C::UTC),
		SqlTypeCode::TIME_UTC => JdbcType::new(SqlTypeCode::TIME_WITH_TIMEZONE, name)
			.with_ddl_code(code)
			.with_capabilities(C::UTC),
		SqlTypeCode::UUID | SqlTypeCode::INET | SqlTypeCode::INTERVAL_SECOND => {
			base.with_capabilities(C::STRUCTURED)
		}
		SqlTypeCode::GEOMETRY | SqlTypeCode::POINT | SqlTypeCode::GEOGRAPHY | SqlTypeCode::ARRAY | SqlTypeCode::STRUCT => {
			base.with_capabilities(C::STRUCTURED).without_capabilities(C::LITERAL)
		}
		SqlTypeCode::JSON => JdbcType::new(SqlTypeCode::VARCHAR, name).with_ddl_code(code),
		SqlTypeCode::SQLXML => JdbcType::new(SqlTypeCode::VARCHAR, "XML_AS_STRING").with_ddl_code(code),
		_ => base,
	};
	Some(descriptor)
}

/// Registry of descriptors keyed by the code they are registered under.
///
/// The slot a descriptor occupies need not match the descriptor's own
/// [`JdbcType::code`]: fallbacks and preferences redirect one code's slot to
/// another code's descriptor.
#[derive(Debug, Clone, Default)]
pub struct JdbcTypeRegistry {
	descriptors: HashMap<SqlTypeCode, Arc<JdbcType>>,
}

impl JdbcTypeRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a descriptor under its own code, returning the displaced one.
	pub fn add_descriptor(&mut self, descriptor: Arc<JdbcType>) -> Option<Arc<JdbcType>> {
		self.descriptors.insert(descriptor.code(), descriptor)
	}

	/// Registers a descriptor under `code`, returning the displaced one.
	pub fn add_descriptor_for(&mut self, code: SqlTypeCode, descriptor: Arc<JdbcType>) -> Option<Arc<JdbcType>> {
		self.descriptors.insert(code, descriptor)
	}

	/// Registers a descriptor under its own code unless that slot is taken.
	pub fn add_descriptor_if_absent(&mut self, descriptor: Arc<JdbcType>) -> bool {
		match self.descriptors.entry(descriptor.code()) {
			std::collections::hash_map::Entry::Vacant(v) => {
				v.insert(descriptor);
				true
			}
			std::collections::hash_map::Entry::Occupied(_) => false,
		}
	}

	pub fn find_descriptor(&self, code: SqlTypeCode) -> Option<&Arc<JdbcType>> {
		self.descriptors.get(&code)
	}

	pub fn has_registered_descriptor(&self, code: SqlTypeCode) -> bool {
		self.descriptors.contains_key(&code)
	}

	/// Returns the effective descriptor for `code`.
	pub fn resolve(&self, code: SqlTypeCode) -> Result<Arc<JdbcType>> {
		self.descriptors.get(&code).cloned().ok_or(TypeError::UnknownTypeCode(code))
	}

	pub fn len(&self) -> usize {
		self.descriptors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.descriptors.is_empty()
	}

	/// Registered codes in ascending order.
	pub fn codes(&self) -> Vec<SqlTypeCode> {
		let mut codes: Vec<_> = self.descriptors.keys().copied().collect();
		codes.sort();
		codes
	}
}
