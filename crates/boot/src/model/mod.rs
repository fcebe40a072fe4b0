//! Bound model elements produced by the binder and contributors.

mod mapping;
mod relational;

pub use mapping::{EntityBinding, GeneratorBinding, Identifier, Property, PropertyValue};
pub use relational::{Column, ForeignKey, QualifiedName, Sequence, Table};
