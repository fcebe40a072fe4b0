use keel_config::{Settings, names};

use crate::preference::preferred_type_code;
use crate::{BasicTypeRegistration, Platform, Result, SqlTypeCode};

/// How values of zoned temporal types are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeZoneStorage {
	/// Whatever the platform descriptor for the zoned type does.
	#[default]
	Default,
	/// Keep the offset using the platform's zoned column type.
	Native,
	/// Convert to the host's local zone and store without offset.
	Normalize,
	/// Convert to UTC and store without offset.
	NormalizeUtc,
}

impl TimeZoneStorage {
	fn parse(settings: &Settings) -> Result<Self> {
		let value = settings.get_choice(
			names::TIMEZONE_DEFAULT_STORAGE,
			"default",
			&["native", "normalize", "normalize_utc"],
		)?;
		Ok(match value.as_str() {
			"native" => Self::Native,
			"normalize" => Self::Normalize,
			"normalize_utc" => Self::NormalizeUtc,
			_ => Self::Default,
		})
	}

	/// Code every zoned value type is rebound to, if this mode overrides it.
	pub fn override_code(self) -> Option<SqlTypeCode> {
		match self {
			Self::Normalize => Some(SqlTypeCode::TIMESTAMP),
			Self::NormalizeUtc => Some(SqlTypeCode::TIMESTAMP_UTC),
			Self::Default | Self::Native => None,
		}
	}
}

/// Type-system decisions read from settings before any registry is touched.
#[derive(Debug, Clone)]
pub struct TypeOptions {
	pub preferred_uuid: SqlTypeCode,
	pub preferred_array: SqlTypeCode,
	pub preferred_duration: SqlTypeCode,
	pub preferred_instant: SqlTypeCode,
	pub time_zone_storage: TimeZoneStorage,
	/// Application basic types, applied after the standard ones.
	pub basic_type_registrations: Vec<BasicTypeRegistration>,
}

impl TypeOptions {
	pub fn from_settings(settings: &Settings, platform: &dyn Platform) -> Result<Self> {
		Ok(Self {
			preferred_uuid: preferred_type_code(settings, names::PREFERRED_UUID_TYPE, SqlTypeCode::UUID)?,
			preferred_array: preferred_type_code(
				settings,
				names::PREFERRED_ARRAY_TYPE,
				platform.preferred_array_type_code(),
			)?,
			preferred_duration: preferred_type_code(
				settings,
				names::PREFERRED_DURATION_TYPE,
				SqlTypeCode::INTERVAL_SECOND,
			)?,
			preferred_instant: preferred_type_code(
				settings,
				names::PREFERRED_INSTANT_TYPE,
				SqlTypeCode::TIMESTAMP_UTC,
			)?,
			time_zone_storage: TimeZoneStorage::parse(settings)?,
			basic_type_registrations: Vec::new(),
		})
	}

	pub fn with_basic_type(mut self, registration: BasicTypeRegistration) -> Self {
		self.basic_type_registrations.push(registration);
		self
	}
}
