//! Settings for the keel metadata build pipeline.
//!
//! Settings are a flat, insertion-ordered map of dotted names to scalar
//! values. They are populated programmatically or from TOML, where nested
//! tables flatten into dotted names:
//!
//! ```toml
//! [keel.mapping]
//! xml_enabled = false
//! source_order = ["declarative", "mapping"]
//!
//! [keel.type]
//! preferred_uuid = "BINARY"
//! timezone_storage = "normalize_utc"
//! ```
//!
//! Lookups are typed and take a fixed default for absent settings. Malformed
//! values never fall back to the default: they fail with a [`ConfigError`]
//! that names the setting and the offending value.

mod error;
pub mod names;
mod settings;

pub use error::{ConfigError, Result};
pub use settings::{SettingValue, Settings};
