//! Well-known setting names.

/// Whether external mapping documents are processed at all (bool, default `true`).
pub const XML_MAPPING_ENABLED: &str = "keel.mapping.xml_enabled";

/// Precedence of source kinds for hierarchy processing
/// (list of `mapping` / `declarative`, default `mapping,declarative`).
pub const SOURCE_PROCESSING_ORDER: &str = "keel.mapping.source_order";

/// Catalog applied to tables and sequences that do not name one.
pub const DEFAULT_CATALOG: &str = "keel.default_catalog";

/// Schema applied to tables and sequences that do not name one.
pub const DEFAULT_SCHEMA: &str = "keel.default_schema";

/// Preferred type code for UUID values (type-code name or integer).
pub const PREFERRED_UUID_TYPE: &str = "keel.type.preferred_uuid";

/// Preferred type code for array values (type-code name or integer).
pub const PREFERRED_ARRAY_TYPE: &str = "keel.type.preferred_array";

/// Preferred type code for duration values (type-code name or integer).
pub const PREFERRED_DURATION_TYPE: &str = "keel.type.preferred_duration";

/// Preferred type code for instant values (type-code name or integer).
pub const PREFERRED_INSTANT_TYPE: &str = "keel.type.preferred_instant";

/// Storage strategy for zoned timestamps
/// (`default`, `native`, `normalize`, `normalize_utc`).
pub const TIMEZONE_DEFAULT_STORAGE: &str = "keel.type.timezone_storage";
