//! In-memory value representations paired with relational types.

use crate::SqlTypeCode;

/// An in-memory value representation.
///
/// `default_code` is the type code a standard basic type for this value binds
/// through before any preference or time-zone override applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueType {
	pub qualified_name: &'static str,
	pub simple_name: &'static str,
	pub default_code: SqlTypeCode,
	/// Carries an explicit time-zone offset and is subject to time-zone storage overrides.
	pub zoned: bool,
}

impl ValueType {
	pub const fn new(qualified_name: &'static str, simple_name: &'static str, default_code: SqlTypeCode) -> Self {
		Self {
			qualified_name,
			simple_name,
			default_code,
			zoned: false,
		}
	}

	pub const fn zoned(mut self) -> Self {
		self.zoned = true;
		self
	}
}

pub const TEXT: ValueType = ValueType::new("keel::value::Text", "Text", SqlTypeCode::VARCHAR);
pub const INTEGER: ValueType = ValueType::new("keel::value::Integer", "Integer", SqlTypeCode::INTEGER);
pub const LONG: ValueType = ValueType::new("keel::value::Long", "Long", SqlTypeCode::BIGINT);
pub const BOOLEAN: ValueType = ValueType::new("keel::value::Boolean", "Boolean", SqlTypeCode::BOOLEAN);
pub const DECIMAL: ValueType = ValueType::new("keel::value::Decimal", "Decimal", SqlTypeCode::NUMERIC);
pub const BYTES: ValueType = ValueType::new("keel::value::Bytes", "Bytes", SqlTypeCode::VARBINARY);
pub const UUID: ValueType = ValueType::new("keel::value::Uuid", "Uuid", SqlTypeCode::UUID);
pub const INSTANT: ValueType = ValueType::new("keel::value::Instant", "Instant", SqlTypeCode::TIMESTAMP_UTC);
pub const OFFSET_DATE_TIME: ValueType =
	ValueType::new("keel::value::OffsetDateTime", "OffsetDateTime", SqlTypeCode::TIMESTAMP_WITH_TIMEZONE).zoned();
pub const ZONED_DATE_TIME: ValueType =
	ValueType::new("keel::value::ZonedDateTime", "ZonedDateTime", SqlTypeCode::TIMESTAMP_WITH_TIMEZONE).zoned();
pub const LOCAL_DATE_TIME: ValueType =
	ValueType::new("keel::value::LocalDateTime", "LocalDateTime", SqlTypeCode::TIMESTAMP);
pub const LOCAL_DATE: ValueType = ValueType::new("keel::value::LocalDate", "LocalDate", SqlTypeCode::DATE);
pub const DURATION: ValueType = ValueType::new("keel::value::Duration", "Duration", SqlTypeCode::INTERVAL_SECOND);
pub const JSON: ValueType = ValueType::new("keel::value::Json", "Json", SqlTypeCode::JSON);
pub const INET_ADDRESS: ValueType = ValueType::new("keel::value::InetAddress", "InetAddress", SqlTypeCode::INET);
pub const BLOB: ValueType = ValueType::new("keel::value::Blob", "Blob", SqlTypeCode::MATERIALIZED_BLOB);
pub const CLOB: ValueType = ValueType::new("keel::value::Clob", "Clob", SqlTypeCode::MATERIALIZED_CLOB);

/// Standard basic types as `(registration name, value type)`.
pub const STANDARD: &[(&str, ValueType)] = &[
	("string", TEXT),
	("integer", INTEGER),
	("long", LONG),
	("boolean", BOOLEAN),
	("big_decimal", DECIMAL),
	("binary", BYTES),
	("uuid", UUID),
	("instant", INSTANT),
	("offset_date_time", OFFSET_DATE_TIME),
	("zoned_date_time", ZONED_DATE_TIME),
	("local_date_time", LOCAL_DATE_TIME),
	("local_date", LOCAL_DATE),
	("duration", DURATION),
	("json", JSON),
	("inet", INET_ADDRESS),
	("materialized_blob", BLOB),
	("materialized_clob", CLOB),
];
