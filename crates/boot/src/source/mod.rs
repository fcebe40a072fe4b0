//! Source model handed to the build by discovery and parsing.
//!
//! Two source kinds exist: [`MappingDocument`]s (external mapping units) and
//! [`DeclaredClass`]es (declarative metadata on classes). Both carry the same
//! [`Definitions`] and the same entity content; they differ in how entity
//! hierarchies are expressed.

mod declared;
mod definitions;
mod document;
mod entity;

pub use declared::{DeclaredClass, DeclaredKind};
pub(crate) use declared::unqualify;
pub use definitions::{
	AuxiliaryObject, Definitions, Fetch, FetchProfile, FetchStyle, FilterDefinition, GeneratorStrategy,
	IdentifierGenerator, NamedQuery, QueryRename, ResultSetMapping, TypeDefinition,
};
pub use document::MappingDocument;
pub use entity::{
	AttributeKind, AttributeSource, ColumnSpec, DiscriminatorSource, EntityContent, EntityFragment,
	IdentifierSource, InheritanceStrategy, RootContent, RootEntitySource, SubclassSource, TableSpec,
};
