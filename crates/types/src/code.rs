use std::fmt;

use keel_config::SettingValue;

use crate::{Result, TypeError};

/// Platform-independent identifier for a relational column type.
///
/// Standard codes share their numeric values with the JDBC `Types` constants;
/// extension codes live at 3000 and above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SqlTypeCode(pub i32);

impl SqlTypeCode {
	pub const BIT: Self = Self(-7);
	pub const TINYINT: Self = Self(-6);
	pub const SMALLINT: Self = Self(5);
	pub const INTEGER: Self = Self(4);
	pub const BIGINT: Self = Self(-5);
	pub const FLOAT: Self = Self(6);
	pub const REAL: Self = Self(7);
	pub const DOUBLE: Self = Self(8);
	pub const NUMERIC: Self = Self(2);
	pub const DECIMAL: Self = Self(3);
	pub const CHAR: Self = Self(1);
	pub const VARCHAR: Self = Self(12);
	pub const LONGVARCHAR: Self = Self(-1);
	pub const NCHAR: Self = Self(-15);
	pub const NVARCHAR: Self = Self(-9);
	pub const DATE: Self = Self(91);
	pub const TIME: Self = Self(92);
	pub const TIMESTAMP: Self = Self(93);
	pub const TIME_WITH_TIMEZONE: Self = Self(2013);
	pub const TIMESTAMP_WITH_TIMEZONE: Self = Self(2014);
	pub const BINARY: Self = Self(-2);
	pub const VARBINARY: Self = Self(-3);
	pub const LONGVARBINARY: Self = Self(-4);
	pub const BOOLEAN: Self = Self(16);
	pub const OTHER: Self = Self(1111);
	pub const STRUCT: Self = Self(2002);
	pub const ARRAY: Self = Self(2003);
	pub const BLOB: Self = Self(2004);
	pub const CLOB: Self = Self(2005);
	pub const NCLOB: Self = Self(2011);
	pub const SQLXML: Self = Self(2009);

	pub const UUID: Self = Self(3000);
	pub const JSON: Self = Self(3001);
	pub const INET: Self = Self(3002);
	pub const TIMESTAMP_UTC: Self = Self(3003);
	pub const MATERIALIZED_BLOB: Self = Self(3004);
	pub const MATERIALIZED_CLOB: Self = Self(3005);
	pub const MATERIALIZED_NCLOB: Self = Self(3006);
	pub const TIME_UTC: Self = Self(3007);
	pub const INTERVAL_SECOND: Self = Self(3100);
	pub const GEOMETRY: Self = Self(3200);
	pub const POINT: Self = Self(3201);
	pub const GEOGRAPHY: Self = Self(3250);

	const NAMED: &'static [(&'static str, SqlTypeCode)] = &[
		("BIT", Self::BIT),
		("TINYINT", Self::TINYINT),
		("SMALLINT", Self::SMALLINT),
		("INTEGER", Self::INTEGER),
		("BIGINT", Self::BIGINT),
		("FLOAT", Self::FLOAT),
		("REAL", Self::REAL),
		("DOUBLE", Self::DOUBLE),
		("NUMERIC", Self::NUMERIC),
		("DECIMAL", Self::DECIMAL),
		("CHAR", Self::CHAR),
		("VARCHAR", Self::VARCHAR),
		("LONGVARCHAR", Self::LONGVARCHAR),
		("NCHAR", Self::NCHAR),
		("NVARCHAR", Self::NVARCHAR),
		("DATE", Self::DATE),
		("TIME", Self::TIME),
		("TIMESTAMP", Self::TIMESTAMP),
		("TIME_WITH_TIMEZONE", Self::TIME_WITH_TIMEZONE),
		("TIMESTAMP_WITH_TIMEZONE", Self::TIMESTAMP_WITH_TIMEZONE),
		("BINARY", Self::BINARY),
		("VARBINARY", Self::VARBINARY),
		("LONGVARBINARY", Self::LONGVARBINARY),
		("BOOLEAN", Self::BOOLEAN),
		("OTHER", Self::OTHER),
		("STRUCT", Self::STRUCT),
		("ARRAY", Self::ARRAY),
		("BLOB", Self::BLOB),
		("CLOB", Self::CLOB),
		("NCLOB", Self::NCLOB),
		("SQLXML", Self::SQLXML),
		("UUID", Self::UUID),
		("JSON", Self::JSON),
		("INET", Self::INET),
		("TIMESTAMP_UTC", Self::TIMESTAMP_UTC),
		("MATERIALIZED_BLOB", Self::MATERIALIZED_BLOB),
		("MATERIALIZED_CLOB", Self::MATERIALIZED_CLOB),
		("MATERIALIZED_NCLOB", Self::MATERIALIZED_NCLOB),
		("TIME_UTC", Self::TIME_UTC),
		("INTERVAL_SECOND", Self::INTERVAL_SECOND),
		("GEOMETRY", Self::GEOMETRY),
		("POINT", Self::POINT),
		("GEOGRAPHY", Self::GEOGRAPHY),
	];

	/// Looks up a code by its upper-case name.
	pub fn from_name(name: &str) -> Option<Self> {
		Self::NAMED.iter().find(|(n, _)| *n == name).map(|(_, code)| *code)
	}

	/// Returns the name of a well-known code.
	pub fn name(self) -> Option<&'static str> {
		Self::NAMED.iter().find(|(_, code)| *code == self).map(|(n, _)| *n)
	}

	/// Interprets a setting value as a type code.
	///
	/// Integers are taken verbatim. Strings are matched case-insensitively
	/// against the known names, then parsed as integers.
	pub fn from_setting(setting: &str, value: &SettingValue) -> Result<Self> {
		let raw = match value {
			SettingValue::Int(i) => {
				return i32::try_from(*i).map(Self).map_err(|_| invalid(setting, value.to_string()));
			}
			SettingValue::Str(s) => s.trim().to_ascii_uppercase(),
			SettingValue::Bool(_) => return Err(invalid(setting, value.to_string())),
		};

		if let Some(code) = Self::from_name(&raw) {
			return Ok(code);
		}
		raw.parse::<i32>().map(Self).map_err(|_| invalid(setting, raw))
	}
}

fn invalid(setting: &str, value: String) -> TypeError {
	let suggestion = SqlTypeCode::NAMED
		.iter()
		.map(|(name, _)| *name)
		.min_by_key(|name| strsim::levenshtein(&value, name))
		.filter(|name| strsim::levenshtein(&value, name) <= 3)
		.map(str::to_string);
	TypeError::InvalidTypeCodeName {
		setting: setting.to_string(),
		value,
		suggestion,
	}
}

impl fmt::Display for SqlTypeCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.name() {
			Some(name) => f.write_str(name),
			None => write!(f, "{}", self.0),
		}
	}
}
