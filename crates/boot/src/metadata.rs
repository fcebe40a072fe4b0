use indexmap::IndexMap;
use keel_types::{ConverterDescriptor, TypeConfiguration};

use crate::model::{EntityBinding, QualifiedName, Sequence, Table};
use crate::source::{
	AuxiliaryObject, FetchProfile, FilterDefinition, IdentifierGenerator, NamedQuery, ResultSetMapping,
	TypeDefinition,
};

/// The finished, immutable domain model of one build.
#[derive(Debug)]
pub struct Metadata {
	pub(crate) platform: String,
	pub(crate) types: TypeConfiguration,
	pub(crate) entities: IndexMap<String, EntityBinding>,
	pub(crate) tables: IndexMap<QualifiedName, Table>,
	pub(crate) sequences: IndexMap<QualifiedName, Sequence>,
	pub(crate) auxiliary_objects: IndexMap<String, AuxiliaryObject>,
	pub(crate) imports: IndexMap<String, String>,
	pub(crate) converters: IndexMap<String, ConverterDescriptor>,
	pub(crate) type_definitions: IndexMap<String, TypeDefinition>,
	pub(crate) generators: IndexMap<String, IdentifierGenerator>,
	pub(crate) filters: IndexMap<String, FilterDefinition>,
	pub(crate) fetch_profiles: IndexMap<String, FetchProfile>,
	pub(crate) named_queries: IndexMap<String, NamedQuery>,
	pub(crate) result_set_mappings: IndexMap<String, ResultSetMapping>,
}

impl Metadata {
	/// Name of the platform the model was built for.
	pub fn platform(&self) -> &str {
		&self.platform
	}

	pub fn type_configuration(&self) -> &TypeConfiguration {
		&self.types
	}

	/// Looks up an entity by entity name or import alias.
	pub fn entity(&self, name: &str) -> Option<&EntityBinding> {
		self.entities
			.get(name)
			.or_else(|| self.imports.get(name).and_then(|entity| self.entities.get(entity)))
	}

	pub fn entities(&self) -> impl Iterator<Item = &EntityBinding> {
		self.entities.values()
	}

	/// Entity name an import alias stands for.
	pub fn import(&self, alias: &str) -> Option<&str> {
		self.imports.get(alias).map(String::as_str)
	}

	pub fn imports(&self) -> impl Iterator<Item = (&str, &str)> {
		self.imports.iter().map(|(alias, entity)| (alias.as_str(), entity.as_str()))
	}

	/// Looks up a table by qualified rendering (`schema.name`) or, failing
	/// that, by unqualified name.
	pub fn table(&self, name: &str) -> Option<&Table> {
		self.tables
			.values()
			.find(|table| table.name().to_string() == name)
			.or_else(|| self.tables.values().find(|table| table.name().name == name))
	}

	pub fn tables(&self) -> impl Iterator<Item = &Table> {
		self.tables.values()
	}

	pub fn sequences(&self) -> impl Iterator<Item = &Sequence> {
		self.sequences.values()
	}

	pub fn auxiliary_objects(&self) -> impl Iterator<Item = &AuxiliaryObject> {
		self.auxiliary_objects.values()
	}

	/// Auxiliary objects that apply to the platform the model was built for.
	pub fn auxiliary_objects_for_platform(&self) -> impl Iterator<Item = &AuxiliaryObject> {
		self.auxiliary_objects
			.values()
			.filter(|object| object.applies_to(&self.platform))
	}

	pub fn named_query(&self, name: &str) -> Option<&NamedQuery> {
		self.named_queries.get(name)
	}

	pub fn named_queries(&self) -> impl Iterator<Item = &NamedQuery> {
		self.named_queries.values()
	}

	pub fn converters(&self) -> impl Iterator<Item = &ConverterDescriptor> {
		self.converters.values()
	}

	pub fn type_definition(&self, name: &str) -> Option<&TypeDefinition> {
		self.type_definitions.get(name)
	}

	pub fn identifier_generator(&self, name: &str) -> Option<&IdentifierGenerator> {
		self.generators.get(name)
	}

	pub fn filter(&self, name: &str) -> Option<&FilterDefinition> {
		self.filters.get(name)
	}

	pub fn fetch_profile(&self, name: &str) -> Option<&FetchProfile> {
		self.fetch_profiles.get(name)
	}

	pub fn result_set_mapping(&self, name: &str) -> Option<&ResultSetMapping> {
		self.result_set_mappings.get(name)
	}
}
