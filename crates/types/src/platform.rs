//! Target database platforms.

use crate::jdbc::standard_descriptor;
use crate::{DdlType, SqlTypeCode, TypeConfiguration};

/// A target database platform.
///
/// Platforms seed the JDBC and DDL registries with the descriptors they
/// support natively. Codes a platform leaves out are filled by fallbacks.
pub trait Platform: Send + Sync {
	fn name(&self) -> &str;

	fn contribute_types(&self, configuration: &mut TypeConfiguration);

	/// Code used for plural attributes when no preference is configured.
	fn preferred_array_type_code(&self) -> SqlTypeCode {
		SqlTypeCode::ARRAY
	}
}

const COMMON_DDL: &[(SqlTypeCode, &str)] = &[
	(SqlTypeCode::BIT, "bit"),
	(SqlTypeCode::TINYINT, "tinyint"),
	(SqlTypeCode::SMALLINT, "smallint"),
	(SqlTypeCode::INTEGER, "integer"),
	(SqlTypeCode::BIGINT, "bigint"),
	(SqlTypeCode::FLOAT, "float($p)"),
	(SqlTypeCode::REAL, "real"),
	(SqlTypeCode::DOUBLE, "double precision"),
	(SqlTypeCode::NUMERIC, "numeric($p,$s)"),
	(SqlTypeCode::DECIMAL, "decimal($p,$s)"),
	(SqlTypeCode::CHAR, "char($l)"),
	(SqlTypeCode::NCHAR, "nchar($l)"),
	(SqlTypeCode::DATE, "date"),
	(SqlTypeCode::TIME, "time"),
	(SqlTypeCode::TIMESTAMP, "timestamp"),
	(SqlTypeCode::TIME_WITH_TIMEZONE, "time with time zone"),
	(SqlTypeCode::TIMESTAMP_WITH_TIMEZONE, "timestamp with time zone"),
	(SqlTypeCode::TIMESTAMP_UTC, "timestamp with time zone"),
	(SqlTypeCode::TIME_UTC, "time with time zone"),
	(SqlTypeCode::BOOLEAN, "boolean"),
	(SqlTypeCode::BLOB, "blob"),
	(SqlTypeCode::CLOB, "clob"),
	(SqlTypeCode::NCLOB, "nclob"),
];

const COMMON_CODES: &[SqlTypeCode] = &[
	SqlTypeCode::BIT,
	SqlTypeCode::TINYINT,
	SqlTypeCode::SMALLINT,
	SqlTypeCode::INTEGER,
	SqlTypeCode::BIGINT,
	SqlTypeCode::FLOAT,
	SqlTypeCode::REAL,
	SqlTypeCode::DOUBLE,
	SqlTypeCode::NUMERIC,
	SqlTypeCode::DECIMAL,
	SqlTypeCode::CHAR,
	SqlTypeCode::VARCHAR,
	SqlTypeCode::LONGVARCHAR,
	SqlTypeCode::NCHAR,
	SqlTypeCode::NVARCHAR,
	SqlTypeCode::DATE,
	SqlTypeCode::TIME,
	SqlTypeCode::TIMESTAMP,
	SqlTypeCode::TIME_WITH_TIMEZONE,
	SqlTypeCode::TIMESTAMP_WITH_TIMEZONE,
	SqlTypeCode::TIMESTAMP_UTC,
	SqlTypeCode::TIME_UTC,
	SqlTypeCode::BINARY,
	SqlTypeCode::VARBINARY,
	SqlTypeCode::LONGVARBINARY,
	SqlTypeCode::BOOLEAN,
	SqlTypeCode::BLOB,
	SqlTypeCode::CLOB,
	SqlTypeCode::NCLOB,
];

fn seed(configuration: &mut TypeConfiguration, codes: &[SqlTypeCode], ddl: &[(SqlTypeCode, &'static str)]) {
	for code in codes {
		// Some standard descriptors bind as a neighbouring code; seed by slot.
		if let Some(descriptor) = standard_descriptor(*code) {
			configuration.jdbc_mut().add_descriptor_for(*code, descriptor.into_shared());
		}
	}
	for (code, template) in ddl {
		configuration.ddl_mut().add_descriptor(DdlType::new(*code, *template));
	}
}

/// A platform with only the standard scalar types.
///
/// UUID, ARRAY, INTERVAL_SECOND, network, geometric and JSON types all resolve
/// through fallbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericPlatform;

impl Platform for GenericPlatform {
	fn name(&self) -> &str {
		"generic"
	}

	fn contribute_types(&self, configuration: &mut TypeConfiguration) {
		seed(configuration, COMMON_CODES, COMMON_DDL);
		let ddl = configuration.ddl_mut();
		ddl.add_descriptor(DdlType::new(SqlTypeCode::VARCHAR, "varchar($l)").with_max_length(32_672));
		ddl.add_descriptor(DdlType::new(SqlTypeCode::NVARCHAR, "nvarchar($l)").with_max_length(32_672));
		ddl.add_descriptor(DdlType::new(SqlTypeCode::LONGVARCHAR, "long varchar"));
		ddl.add_descriptor(DdlType::new(SqlTypeCode::BINARY, "binary($l)"));
		ddl.add_descriptor(DdlType::new(SqlTypeCode::VARBINARY, "varbinary($l)").with_max_length(32_672));
		ddl.add_descriptor(DdlType::new(SqlTypeCode::LONGVARBINARY, "long varbinary"));
		ddl.add_descriptor(DdlType::new(SqlTypeCode::MATERIALIZED_BLOB, "blob"));
		ddl.add_descriptor(DdlType::new(SqlTypeCode::MATERIALIZED_CLOB, "clob"));
		ddl.add_descriptor(DdlType::new(SqlTypeCode::MATERIALIZED_NCLOB, "nclob"));
		ddl.add_descriptor(DdlType::new(SqlTypeCode::NUMERIC, "numeric($p,$s)"));
	}
}

/// PostgreSQL: native UUID, arrays, intervals, network addresses, geometry and JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresPlatform;

impl PostgresPlatform {
	const NATIVE: &'static [SqlTypeCode] = &[
		SqlTypeCode::UUID,
		SqlTypeCode::ARRAY,
		SqlTypeCode::INTERVAL_SECOND,
		SqlTypeCode::INET,
		SqlTypeCode::GEOMETRY,
		SqlTypeCode::POINT,
		SqlTypeCode::GEOGRAPHY,
		SqlTypeCode::JSON,
		SqlTypeCode::SQLXML,
	];

	const NATIVE_DDL: &'static [(SqlTypeCode, &'static str)] = &[
		(SqlTypeCode::UUID, "uuid"),
		(SqlTypeCode::INTERVAL_SECOND, "interval second($s)"),
		(SqlTypeCode::INET, "inet"),
		(SqlTypeCode::GEOMETRY, "geometry"),
		(SqlTypeCode::POINT, "point"),
		(SqlTypeCode::GEOGRAPHY, "geography"),
		(SqlTypeCode::JSON, "jsonb"),
		(SqlTypeCode::SQLXML, "xml"),
		(SqlTypeCode::BINARY, "bytea"),
		(SqlTypeCode::VARBINARY, "bytea"),
		(SqlTypeCode::LONGVARBINARY, "bytea"),
		(SqlTypeCode::BLOB, "oid"),
		(SqlTypeCode::CLOB, "oid"),
		(SqlTypeCode::NCLOB, "oid"),
		(SqlTypeCode::MATERIALIZED_BLOB, "bytea"),
		(SqlTypeCode::MATERIALIZED_CLOB, "text"),
		(SqlTypeCode::MATERIALIZED_NCLOB, "text"),
		(SqlTypeCode::LONGVARCHAR, "text"),
		(SqlTypeCode::DOUBLE, "float8"),
		(SqlTypeCode::TINYINT, "smallint"),
	];
}

impl Platform for PostgresPlatform {
	fn name(&self) -> &str {
		"postgresql"
	}

	fn contribute_types(&self, configuration: &mut TypeConfiguration) {
		seed(configuration, COMMON_CODES, COMMON_DDL);
		seed(configuration, Self::NATIVE, Self::NATIVE_DDL);
		let ddl = configuration.ddl_mut();
		ddl.add_descriptor(DdlType::new(SqlTypeCode::VARCHAR, "varchar($l)").with_max_length(10_485_760));
		ddl.add_descriptor(DdlType::new(SqlTypeCode::NVARCHAR, "varchar($l)").with_max_length(10_485_760));
	}
}
