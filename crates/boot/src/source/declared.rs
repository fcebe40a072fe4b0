use crate::source::{AttributeSource, Definitions, EntityContent, RootContent, TableSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredKind {
	Entity,
	/// Contributes attributes to entities extending it; never bound itself.
	MappedSuperclass,
}

/// A class carrying declarative mapping metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredClass {
	pub class_name: String,
	pub kind: DeclaredKind,
	/// Class name of the direct superclass, managed or not.
	pub superclass: Option<String>,
	pub content: EntityContent,
	pub root: Option<RootContent>,
	pub definitions: Definitions,
}

impl DeclaredClass {
	/// Declares an entity named after the last path segment of `class_name`.
	pub fn entity(class_name: impl Into<String>) -> Self {
		Self::declare(class_name.into(), DeclaredKind::Entity)
	}

	pub fn mapped_superclass(class_name: impl Into<String>) -> Self {
		Self::declare(class_name.into(), DeclaredKind::MappedSuperclass)
	}

	fn declare(class_name: String, kind: DeclaredKind) -> Self {
		let entity_name = unqualify(&class_name).to_string();
		Self {
			content: EntityContent::new(entity_name).class(class_name.clone()),
			class_name,
			kind,
			superclass: None,
			root: None,
			definitions: Definitions::default(),
		}
	}

	pub fn named(mut self, entity_name: impl Into<String>) -> Self {
		self.content.entity_name = entity_name.into();
		self
	}

	pub fn extends(mut self, superclass: impl Into<String>) -> Self {
		self.superclass = Some(superclass.into());
		self
	}

	pub fn root(mut self, root: RootContent) -> Self {
		self.root = Some(root);
		self
	}

	pub fn table(mut self, table: TableSpec) -> Self {
		self.content.table = Some(table);
		self
	}

	pub fn attribute(mut self, attribute: AttributeSource) -> Self {
		self.content.attributes.push(attribute);
		self
	}

	pub fn discriminator_value(mut self, value: impl Into<String>) -> Self {
		self.content.discriminator_value = Some(value.into());
		self
	}

	pub fn definitions(mut self, definitions: Definitions) -> Self {
		self.definitions = definitions;
		self
	}

	pub fn entity_name(&self) -> &str {
		&self.content.entity_name
	}
}

/// Last segment of a `.` or `::` separated path.
pub(crate) fn unqualify(name: &str) -> &str {
	let tail = name.rsplit("::").next().unwrap_or(name);
	tail.rsplit('.').next().unwrap_or(tail)
}
