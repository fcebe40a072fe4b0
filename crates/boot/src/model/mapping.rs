use keel_types::SqlTypeCode;

use crate::model::QualifiedName;
use crate::source::InheritanceStrategy;
use crate::{ContributorId, Origin};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
	Basic {
		/// Type name as written in the source.
		type_name: String,
		/// Registration name of the resolved basic type.
		basic_type: String,
		/// Qualified name of the in-memory value type.
		value_type: String,
		code: SqlTypeCode,
	},
	ManyToOne {
		/// Resolved entity name of the target.
		target: String,
	},
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
	pub name: String,
	pub value: PropertyValue,
	pub table: QualifiedName,
	pub columns: Vec<String>,
	/// Attribute converter applied to this property.
	pub converter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorBinding {
	Assigned,
	Identity,
	Uuid,
	Sequence(QualifiedName),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
	pub property: Property,
	pub generator: GeneratorBinding,
}

/// A bound entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBinding {
	pub entity_name: String,
	pub class_name: Option<String>,
	pub root_entity: String,
	pub superclass: Option<String>,
	pub strategy: InheritanceStrategy,
	pub table: QualifiedName,
	pub secondary_tables: Vec<QualifiedName>,
	pub discriminator_value: Option<String>,
	/// Set on hierarchy roots only.
	pub identifier: Option<Identifier>,
	pub properties: Vec<Property>,
	pub origin: Origin,
	pub contributor: ContributorId,
}

impl EntityBinding {
	pub fn is_root(&self) -> bool {
		self.superclass.is_none()
	}

	pub fn property(&self, name: &str) -> Option<&Property> {
		self.properties.iter().find(|p| p.name == name)
	}
}
