//! Boot-time metadata build for the keel persistence engine.
//!
//! # Purpose
//!
//! Turns class-level declarative metadata and external mapping documents
//! into one validated [`Metadata`] model of entities, tables and value types.
//! Discovery and parsing happen elsewhere; this crate receives materialized
//! [`source`] structures through [`MetadataSources`].
//!
//! # Pipeline
//!
//! [`process::build`] runs, in order: option resolution, type-system setup
//! (`keel-types`), the [`processor`] phases, metadata contributors, deferred
//! work, named queries, the [`contribute`] window for mapping contributors and
//! producers, extra imports, and finally [`InFlightMetadataCollector::build_metadata`].
//!
//! # Invariants
//!
//! - Every registration names its [`DuplicatePolicy`]; there is no implicit
//!   overwrite.
//! - Everything is scoped to one build. The only process-wide state is the
//!   type-code preference cache in `keel-types`.
//! - The first error ends the build; no partial model is returned.

pub mod binder;
pub mod collector;
pub mod contribute;
mod error;
pub mod hierarchy;
mod metadata;
pub mod model;
pub mod options;
mod origin;
pub mod plugin;
pub mod process;
pub mod processor;
mod resources;
pub mod source;
#[cfg(test)]
mod testing;

pub use collector::{DuplicatePolicy, InFlightMetadataCollector, Registration};
pub use error::{BoxError, BuildError, Result};
pub use metadata::Metadata;
pub use origin::{ContributorId, Origin, OriginKind};
pub use plugin::{MappingContributor, MappingProducer, MetadataContributor, PluginDef, PluginRegistry};
pub use process::{Bootstrap, build, complete, prepare};
pub use resources::{ManagedResources, MetadataSources};
