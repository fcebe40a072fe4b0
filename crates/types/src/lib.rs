//! Relational type system for the keel metadata build.
//!
//! # Purpose
//!
//! Maps abstract [`SqlTypeCode`]s to binder/extractor descriptors
//! ([`JdbcType`]) and DDL type-name templates ([`DdlType`]), and pairs
//! in-memory value representations with those descriptors as named
//! [`BasicType`]s. A target [`Platform`] seeds the native descriptors;
//! [`handle_types`] layers plugin overrides, preferences and fallbacks on top.
//!
//! # Precedence Contract
//!
//! 1. **Platform defaults** seed the registries.
//! 2. **Type contributors** override or add descriptors.
//! 3. **Preferences** redirect a native slot only while that slot still holds
//!    the platform's descriptor (compared by `Arc` identity).
//! 4. **Fallbacks** fill codes nothing registered, never overwriting.
//! 5. **Time-zone storage** and the instant preference run last and may
//!    replace any basic type registered earlier.
//!
//! - Enforced in: [`fallback::handle_types`]
//! - Failure symptom: a contributor's UUID descriptor silently replaced by the
//!   configured preference.

mod basic;
mod code;
mod configuration;
mod contributions;
mod convert;
mod ddl;
mod error;
pub mod fallback;
mod jdbc;
mod options;
mod platform;
pub mod preference;
pub mod value;

pub use basic::{BasicType, BasicTypeRegistration, BasicTypeRegistry};
pub use code::SqlTypeCode;
pub use configuration::TypeConfiguration;
pub use contributions::{TypeContributions, TypeContributor};
pub use convert::ConverterDescriptor;
pub use ddl::{DdlType, DdlTypeRegistry, Size};
pub use error::{Result, TypeError};
pub use fallback::handle_types;
pub use jdbc::{JdbcCapabilities, JdbcType, JdbcTypeRegistry};
pub use options::{TimeZoneStorage, TypeOptions};
pub use platform::{GenericPlatform, Platform, PostgresPlatform};
pub use value::ValueType;
