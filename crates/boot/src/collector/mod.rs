//! The mutable aggregation root of one build.
//!
//! # Purpose
//!
//! Processors, the binder and contributors all register into one
//! [`InFlightMetadataCollector`]. Once every source is bound and deferred work
//! has drained, [`InFlightMetadataCollector::build_metadata`] freezes it into
//! [`Metadata`].
//!
//! # Invariants
//!
//! - Registrations under an existing natural key follow the caller's
//!   [`DuplicatePolicy`].
//!   - Enforced in: [`policy::register`]
//!   - Tested by: `tests::reject_names_duplicate_key`, `tests::first_and_last_wins`
//!   - Failure symptom: a contributed table silently replacing a mapped one.
//! - Deferred work drains in FIFO order, exactly once, and never enqueues more.
//!   - Enforced in: [`InFlightMetadataCollector::process_second_passes`]
//!   - Tested by: `tests::second_passes_drain_in_order_once`, `tests::second_pass_cannot_enqueue`
//!   - Failure symptom: foreign keys resolved against a half-built model.

use std::sync::Arc;

use indexmap::IndexMap;
use keel_types::{BasicType, ConverterDescriptor, TypeConfiguration};
use tracing::{debug, trace};

use crate::metadata::Metadata;
use crate::model::{EntityBinding, PropertyValue, QualifiedName, Sequence, Table};
use crate::options::BuildingOptions;
use crate::source::{
	AuxiliaryObject, FetchProfile, FilterDefinition, IdentifierGenerator, NamedQuery, ResultSetMapping, TableSpec,
	TypeDefinition, unqualify,
};
use crate::{ContributorId, Result};

mod policy;
mod second_pass;
#[cfg(test)]
mod tests;

pub use policy::{DuplicatePolicy, Registration};
use policy::register;
pub use second_pass::SecondPass;
use second_pass::SecondPassQueue;

#[derive(Debug)]
pub struct InFlightMetadataCollector {
	types: TypeConfiguration,
	default_catalog: Option<String>,
	default_schema: Option<String>,
	entities: IndexMap<String, EntityBinding>,
	tables: IndexMap<QualifiedName, Table>,
	sequences: IndexMap<QualifiedName, Sequence>,
	auxiliary_objects: IndexMap<String, AuxiliaryObject>,
	imports: IndexMap<String, String>,
	converters: IndexMap<String, ConverterDescriptor>,
	type_definitions: IndexMap<String, TypeDefinition>,
	generators: IndexMap<String, IdentifierGenerator>,
	filters: IndexMap<String, FilterDefinition>,
	fetch_profiles: IndexMap<String, FetchProfile>,
	named_queries: IndexMap<String, NamedQuery>,
	result_set_mappings: IndexMap<String, ResultSetMapping>,
	second_passes: SecondPassQueue,
}

impl InFlightMetadataCollector {
	pub fn new(types: TypeConfiguration, options: &BuildingOptions) -> Self {
		Self {
			types,
			default_catalog: options.default_catalog.clone(),
			default_schema: options.default_schema.clone(),
			entities: IndexMap::new(),
			tables: IndexMap::new(),
			sequences: IndexMap::new(),
			auxiliary_objects: IndexMap::new(),
			imports: IndexMap::new(),
			converters: IndexMap::new(),
			type_definitions: IndexMap::new(),
			generators: IndexMap::new(),
			filters: IndexMap::new(),
			fetch_profiles: IndexMap::new(),
			named_queries: IndexMap::new(),
			result_set_mappings: IndexMap::new(),
			second_passes: SecondPassQueue::default(),
		}
	}

	pub fn type_configuration(&self) -> &TypeConfiguration {
		&self.types
	}

	/// Qualifies a source table location with the build's default catalog and schema.
	pub fn qualify(&self, spec: &TableSpec) -> QualifiedName {
		QualifiedName::qualified(
			spec.catalog.clone().or_else(|| self.default_catalog.clone()),
			spec.schema.clone().or_else(|| self.default_schema.clone()),
			spec.name.clone(),
		)
	}

	/// Qualifies a bare object name with the build's defaults.
	pub fn qualify_name(&self, name: &str) -> QualifiedName {
		self.qualify(&TableSpec::new(name))
	}

	/// Fills the catalog and schema a name leaves unset with the build's defaults.
	pub fn complete_name(&self, mut name: QualifiedName) -> QualifiedName {
		name.catalog = name.catalog.or_else(|| self.default_catalog.clone());
		name.schema = name.schema.or_else(|| self.default_schema.clone());
		name
	}

	// ~~~ relational ~~~

	pub fn register_table(
		&mut self,
		mut table: Table,
		policy: DuplicatePolicy,
		contributor: &ContributorId,
	) -> Result<Registration> {
		table.set_contributor(contributor.clone());
		let key = table.name().clone();
		register(&mut self.tables, "table", key, table, policy, contributor)
	}

	pub fn table(&self, name: &QualifiedName) -> Option<&Table> {
		self.tables.get(name)
	}

	pub fn table_mut(&mut self, name: &QualifiedName) -> Option<&mut Table> {
		self.tables.get_mut(name)
	}

	/// Finds a table by qualified rendering or unqualified name.
	pub fn find_table(&self, name: &str) -> Option<&QualifiedName> {
		self.tables
			.keys()
			.find(|key| key.to_string() == name)
			.or_else(|| self.tables.keys().find(|key| key.name == name))
	}

	pub fn tables(&self) -> impl Iterator<Item = &Table> {
		self.tables.values()
	}

	pub fn register_sequence(
		&mut self,
		sequence: Sequence,
		policy: DuplicatePolicy,
		contributor: &ContributorId,
	) -> Result<Registration> {
		let key = sequence.name.clone();
		register(&mut self.sequences, "sequence", key, sequence, policy, contributor)
	}

	pub fn sequence(&self, name: &QualifiedName) -> Option<&Sequence> {
		self.sequences.get(name)
	}

	pub fn add_auxiliary_object(
		&mut self,
		object: AuxiliaryObject,
		policy: DuplicatePolicy,
		contributor: &ContributorId,
	) -> Result<Registration> {
		if !object.dialect_scopes.is_empty() {
			debug!(object = %object.name, scopes = ?object.dialect_scopes, "platform-scoped auxiliary object");
		}
		let key = object.name.clone();
		register(&mut self.auxiliary_objects, "auxiliary object", key, object, policy, contributor)
	}

	// ~~~ names ~~~

	pub fn add_import(
		&mut self,
		alias: impl Into<String>,
		entity: impl Into<String>,
		policy: DuplicatePolicy,
		contributor: &ContributorId,
	) -> Result<Registration> {
		register(&mut self.imports, "import", alias.into(), entity.into(), policy, contributor)
	}

	pub fn import(&self, alias: &str) -> Option<&str> {
		self.imports.get(alias).map(String::as_str)
	}

	pub fn add_attribute_converter(
		&mut self,
		converter: ConverterDescriptor,
		policy: DuplicatePolicy,
		contributor: &ContributorId,
	) -> Result<Registration> {
		let key = converter.name.clone();
		register(&mut self.converters, "attribute converter", key, converter, policy, contributor)
	}

	pub fn add_type_definition(
		&mut self,
		definition: TypeDefinition,
		policy: DuplicatePolicy,
		contributor: &ContributorId,
	) -> Result<Registration> {
		let key = definition.name.clone();
		register(&mut self.type_definitions, "type definition", key, definition, policy, contributor)
	}

	/// Resolves a type name through type definitions, then basic type keys.
	pub fn resolve_basic_type(&self, type_name: &str) -> Option<Arc<BasicType>> {
		let key = self
			.type_definitions
			.get(type_name)
			.map_or(type_name, |definition| definition.basic_type.as_str());
		self.types.basic().resolve(key).cloned()
	}

	pub fn add_identifier_generator(
		&mut self,
		generator: IdentifierGenerator,
		policy: DuplicatePolicy,
		contributor: &ContributorId,
	) -> Result<Registration> {
		let key = generator.name.clone();
		register(&mut self.generators, "identifier generator", key, generator, policy, contributor)
	}

	pub fn identifier_generator(&self, name: &str) -> Option<&IdentifierGenerator> {
		self.generators.get(name)
	}

	pub fn add_filter_definition(
		&mut self,
		filter: FilterDefinition,
		policy: DuplicatePolicy,
		contributor: &ContributorId,
	) -> Result<Registration> {
		let key = filter.name.clone();
		register(&mut self.filters, "filter definition", key, filter, policy, contributor)
	}

	pub fn add_fetch_profile(
		&mut self,
		profile: FetchProfile,
		policy: DuplicatePolicy,
		contributor: &ContributorId,
	) -> Result<Registration> {
		let key = profile.name.clone();
		register(&mut self.fetch_profiles, "fetch profile", key, profile, policy, contributor)
	}

	pub fn add_named_query(
		&mut self,
		query: NamedQuery,
		policy: DuplicatePolicy,
		contributor: &ContributorId,
	) -> Result<Registration> {
		let key = query.name.clone();
		register(&mut self.named_queries, "named query", key, query, policy, contributor)
	}

	pub fn named_query(&self, name: &str) -> Option<&NamedQuery> {
		self.named_queries.get(name)
	}

	pub fn add_result_set_mapping(
		&mut self,
		mapping: ResultSetMapping,
		policy: DuplicatePolicy,
		contributor: &ContributorId,
	) -> Result<Registration> {
		let key = mapping.name.clone();
		register(&mut self.result_set_mappings, "result set mapping", key, mapping, policy, contributor)
	}

	pub fn result_set_mapping(&self, name: &str) -> Option<&ResultSetMapping> {
		self.result_set_mappings.get(name)
	}

	// ~~~ entities ~~~

	pub fn add_entity_binding(
		&mut self,
		binding: EntityBinding,
		policy: DuplicatePolicy,
	) -> Result<Registration> {
		let key = binding.entity_name.clone();
		let contributor = binding.contributor.clone();
		register(&mut self.entities, "entity", key, binding, policy, &contributor)
	}

	pub fn entity(&self, name: &str) -> Option<&EntityBinding> {
		self.entities.get(name)
	}

	pub(crate) fn entity_mut(&mut self, name: &str) -> Option<&mut EntityBinding> {
		self.entities.get_mut(name)
	}

	/// Resolves an entity name or import alias to a bound entity name.
	pub fn resolve_entity_name(&self, name: &str) -> Option<&str> {
		if let Some((entity, _)) = self.entities.get_key_value(name) {
			return Some(entity);
		}
		self.imports
			.get(name)
			.filter(|entity| self.entities.contains_key(entity.as_str()))
			.map(String::as_str)
	}

	pub fn entity_names(&self) -> impl Iterator<Item = &str> {
		self.entities.keys().map(String::as_str)
	}

	/// Binds auto-apply converters to unconverted basic properties of `entities`
	/// whose value type matches the converter's domain type.
	pub fn apply_auto_apply_converters(&mut self, entities: &[String]) {
		let auto: Vec<&ConverterDescriptor> = self.converters.values().filter(|c| c.auto_apply).collect();
		if auto.is_empty() {
			return;
		}

		for name in entities {
			let Some(entity) = self.entities.get_mut(name) else {
				continue;
			};
			for property in entity.properties.iter_mut().filter(|p| p.converter.is_none()) {
				if let PropertyValue::Basic { value_type, .. } = &property.value
					&& let Some(converter) = auto
						.iter()
						.find(|c| c.domain_type == *value_type || c.domain_type == unqualify(value_type))
				{
					trace!(entity = %name, property = %property.name, converter = %converter.name, "auto-apply converter");
					property.converter = Some(converter.name.clone());
				}
			}
		}
	}

	// ~~~ deferred work ~~~

	/// Queues a step to run once every source is bound.
	pub fn add_second_pass(
		&mut self,
		label: impl Into<String>,
		pass: impl FnOnce(&mut InFlightMetadataCollector) -> Result<()> + 'static,
	) -> Result<()> {
		self.second_passes.push(label.into(), Box::new(pass))
	}

	pub fn pending_second_passes(&self) -> usize {
		self.second_passes.len()
	}

	/// Runs queued steps in registration order. Draining an empty queue is a no-op.
	pub fn process_second_passes(&mut self) -> Result<()> {
		let queue = self.second_passes.begin_drain();
		if !queue.is_empty() {
			debug!(steps = queue.len(), "draining deferred work");
		}
		let result = queue.into_iter().try_for_each(|(label, pass)| {
			trace!(%label, "deferred step");
			pass(self)
		});
		self.second_passes.end_drain();
		result
	}

	/// Drains remaining deferred work and freezes the collector.
	pub fn build_metadata(mut self, platform: &str) -> Result<Metadata> {
		self.process_second_passes()?;
		debug!(
			entities = self.entities.len(),
			tables = self.tables.len(),
			sequences = self.sequences.len(),
			"metadata built"
		);
		Ok(Metadata {
			platform: platform.to_string(),
			types: self.types,
			entities: self.entities,
			tables: self.tables,
			sequences: self.sequences,
			auxiliary_objects: self.auxiliary_objects,
			imports: self.imports,
			converters: self.converters,
			type_definitions: self.type_definitions,
			generators: self.generators,
			filters: self.filters,
			fetch_profiles: self.fetch_profiles,
			named_queries: self.named_queries,
			result_set_mappings: self.result_set_mappings,
		})
	}
}
