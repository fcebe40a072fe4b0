//! Binding of assembled hierarchies into entity bindings and tables.
//!
//! # Purpose
//!
//! [`ModelBinder`] walks an [`EntityHierarchySource`] root to leaf. Each
//! entity gets its [`EntityBinding`], its tables and columns, and auto-import
//! aliases. References that may point at entities or tables not bound yet
//! (many-to-one targets, columns in tables named by another source) are
//! queued as second passes.
//!
//! # Invariants
//!
//! - A parent entity is bound before any of its subclasses.
//!   - Enforced in: [`ModelBinder::bind_entity_hierarchy`]
//!   - Tested by: `tests::joined_subclass_gets_keyed_table`
//!   - Failure symptom: subclass tables without the parent's key column.
//! - Subclass columns in a single-table hierarchy are nullable.
//!   - Enforced in: `ModelBinder::bind_subclass`
//!   - Tested by: `tests::single_table_subclass_shares_root_table`
//! - A many-to-one column takes the type of the target's identifier column.
//!   - Enforced in: `Reference::resolve`
//!   - Tested by: `tests::many_to_one_resolves_through_import`

use std::sync::Arc;

use keel_types::{BasicType, Size};
use tracing::{debug, trace};

use crate::collector::{DuplicatePolicy, InFlightMetadataCollector};
use crate::hierarchy::{EntityHierarchySource, HierarchyNode};
use crate::model::{
	Column, EntityBinding, ForeignKey, GeneratorBinding, Identifier, Property, PropertyValue, QualifiedName,
	Sequence, Table,
};
use crate::source::{
	AttributeKind, AttributeSource, ColumnSpec, EntityContent, GeneratorStrategy, InheritanceStrategy, TableSpec,
	unqualify,
};
use crate::{BuildError, ContributorId, Origin, Result};

#[cfg(test)]
mod tests;

/// Binds entity hierarchies into the collector.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelBinder;

/// Binding state an entity hands to its subclasses.
struct Parent {
	entity_name: String,
	root_entity: String,
	strategy: InheritanceStrategy,
	table: QualifiedName,
	/// Tables an attribute column may name: the entity's own and its ancestors'.
	tables: Vec<QualifiedName>,
	id_column: Column,
	discriminated: bool,
	/// Attributes a table-per-class subclass repeats in its own table.
	inherited: Vec<AttributeSource>,
}

impl ModelBinder {
	pub fn new() -> Self {
		Self
	}

	pub fn bind_entity_hierarchy(
		&self,
		collector: &mut InFlightMetadataCollector,
		hierarchy: &EntityHierarchySource,
	) -> Result<()> {
		debug!(
			root = hierarchy.root_entity_name(),
			strategy = ?hierarchy.strategy,
			"binding entity hierarchy"
		);
		let parent = self.bind_root(collector, hierarchy)?;
		for subclass in &hierarchy.root.subclasses {
			self.bind_subclass(collector, &parent, subclass)?;
		}
		Ok(())
	}

	fn bind_root(
		&self,
		collector: &mut InFlightMetadataCollector,
		hierarchy: &EntityHierarchySource,
	) -> Result<Parent> {
		let node = &hierarchy.root;
		let content = &node.content;
		let table_name = collector.qualify(&primary_table(content));
		let mut table = Table::new(table_name.clone());

		let id_attribute = &hierarchy.identifier.attribute;
		let AttributeKind::Basic { type_name } = &id_attribute.kind else {
			return Err(unresolved("basic identifier", &id_attribute.name, &node.origin));
		};
		let id_type = resolve_type(collector, type_name, &node.origin)?;
		let id_column = Column {
			nullable: false,
			..make_column(collector, &column_name(id_attribute), &id_type, &id_attribute.column)?
		};
		table.add_column(id_column.clone(), &node.contributor)?;
		table.set_primary_key(vec![id_column.name.clone()]);

		let discriminated = match hierarchy.strategy {
			InheritanceStrategy::SingleTable => true,
			InheritanceStrategy::Joined => hierarchy.discriminator.is_some(),
			InheritanceStrategy::TablePerClass => false,
		};
		if discriminated {
			let discriminator = hierarchy.discriminator.clone().unwrap_or_default();
			let basic = resolve_type(collector, &discriminator.type_name, &node.origin)?;
			table.add_column(
				Column {
					nullable: false,
					..make_column(collector, &discriminator.column, &basic, &ColumnSpec::default())?
				},
				&node.contributor,
			)?;
		}
		collector.register_table(table, DuplicatePolicy::Reject, &node.contributor)?;

		let secondary_tables = self.bind_secondary_tables(collector, node, &table_name, &id_column)?;
		let mut tables = vec![table_name.clone()];
		tables.extend(secondary_tables.iter().cloned());

		let generator = bind_generator(collector, hierarchy.identifier.generator.as_deref(), &table_name, node)?;
		let identifier = Identifier {
			property: Property {
				name: id_attribute.name.clone(),
				value: basic_value(type_name, &id_type),
				table: table_name.clone(),
				columns: vec![id_column.name.clone()],
				converter: None,
			},
			generator,
		};
		let properties = self.bind_attributes(collector, node, &content.attributes, &tables, false, true)?;

		register_entity(
			collector,
			EntityBinding {
				entity_name: content.entity_name.clone(),
				class_name: content.class_name.clone(),
				root_entity: content.entity_name.clone(),
				superclass: None,
				strategy: hierarchy.strategy,
				table: table_name.clone(),
				secondary_tables,
				discriminator_value: discriminated.then(|| discriminator_value(content)),
				identifier: Some(identifier),
				properties,
				origin: node.origin.clone(),
				contributor: node.contributor.clone(),
			},
		)?;

		Ok(Parent {
			entity_name: content.entity_name.clone(),
			root_entity: content.entity_name.clone(),
			strategy: hierarchy.strategy,
			table: table_name,
			tables,
			id_column,
			discriminated,
			inherited: content.attributes.clone(),
		})
	}

	fn bind_subclass(
		&self,
		collector: &mut InFlightMetadataCollector,
		parent: &Parent,
		node: &HierarchyNode,
	) -> Result<()> {
		let content = &node.content;
		let (table_name, force_nullable) = match parent.strategy {
			InheritanceStrategy::SingleTable => (parent.table.clone(), true),
			InheritanceStrategy::Joined | InheritanceStrategy::TablePerClass => {
				let name = collector.qualify(&primary_table(content));
				let mut table = Table::new(name.clone()).with_column(parent.id_column.clone());
				table.set_primary_key(vec![parent.id_column.name.clone()]);
				if parent.strategy == InheritanceStrategy::Joined {
					table.add_foreign_key(ForeignKey {
						columns: vec![parent.id_column.name.clone()],
						referenced_table: parent.table.clone(),
					});
				}
				collector.register_table(table, DuplicatePolicy::Reject, &node.contributor)?;
				(name, false)
			}
		};

		let secondary_tables = self.bind_secondary_tables(collector, node, &table_name, &parent.id_column)?;
		let mut tables = vec![table_name.clone()];
		tables.extend(secondary_tables.iter().cloned());
		tables.extend(parent.tables.iter().filter(|t| **t != table_name).cloned());

		if parent.strategy == InheritanceStrategy::TablePerClass {
			self.bind_attributes(collector, node, &parent.inherited, &tables, false, false)?;
		}
		let properties = self.bind_attributes(collector, node, &content.attributes, &tables, force_nullable, true)?;

		register_entity(
			collector,
			EntityBinding {
				entity_name: content.entity_name.clone(),
				class_name: content.class_name.clone(),
				root_entity: parent.root_entity.clone(),
				superclass: Some(parent.entity_name.clone()),
				strategy: parent.strategy,
				table: table_name.clone(),
				secondary_tables,
				discriminator_value: parent.discriminated.then(|| discriminator_value(content)),
				identifier: None,
				properties,
				origin: node.origin.clone(),
				contributor: node.contributor.clone(),
			},
		)?;

		let mut inherited = parent.inherited.clone();
		inherited.extend(content.attributes.iter().cloned());
		let this = Parent {
			entity_name: content.entity_name.clone(),
			root_entity: parent.root_entity.clone(),
			strategy: parent.strategy,
			table: table_name,
			tables,
			id_column: parent.id_column.clone(),
			discriminated: parent.discriminated,
			inherited,
		};
		for subclass in &node.subclasses {
			self.bind_subclass(collector, &this, subclass)?;
		}
		Ok(())
	}

	/// Registers each secondary table keyed by, and referencing, the primary table.
	fn bind_secondary_tables(
		&self,
		collector: &mut InFlightMetadataCollector,
		node: &HierarchyNode,
		primary: &QualifiedName,
		id_column: &Column,
	) -> Result<Vec<QualifiedName>> {
		let mut names = Vec::with_capacity(node.content.secondary_tables.len());
		for spec in &node.content.secondary_tables {
			let name = collector.qualify(spec);
			let mut table = Table::new(name.clone()).with_column(id_column.clone());
			table.set_primary_key(vec![id_column.name.clone()]);
			table.add_foreign_key(ForeignKey {
				columns: vec![id_column.name.clone()],
				referenced_table: primary.clone(),
			});
			collector.register_table(table, DuplicatePolicy::Reject, &node.contributor)?;
			names.push(name);
		}
		Ok(names)
	}

	/// Binds `attributes` into `tables[0]` or the table each column names.
	///
	/// With `record` unset, columns are added but no properties are kept:
	/// table-per-class subclasses repeat inherited columns this way.
	fn bind_attributes(
		&self,
		collector: &mut InFlightMetadataCollector,
		node: &HierarchyNode,
		attributes: &[AttributeSource],
		tables: &[QualifiedName],
		force_nullable: bool,
		record: bool,
	) -> Result<Vec<Property>> {
		let primary = &tables[0];
		let mut properties = Vec::with_capacity(attributes.len());
		for attribute in attributes {
			let placement = match &attribute.column.table {
				None => Placement::Known(primary.clone()),
				Some(name) => tables
					.iter()
					.find(|t| t.name == *name || t.to_string() == *name)
					.map_or_else(|| Placement::Deferred(name.clone()), |t| Placement::Known(t.clone())),
			};
			let column = column_name(attribute);
			let table = match &placement {
				Placement::Known(table) => table.clone(),
				Placement::Deferred(_) => primary.clone(),
			};

			let value = match &attribute.kind {
				AttributeKind::Basic { type_name } => {
					let basic = resolve_type(collector, type_name, &node.origin)?;
					let mut bound = make_column(collector, &column, &basic, &attribute.column)?;
					bound.nullable |= force_nullable;
					match placement {
						Placement::Known(table) => add_column(collector, &table, bound, &node.contributor)?,
						Placement::Deferred(_) => {
							let entity = node.entity_name().to_string();
							let name = attribute.name.clone();
							let origin = node.origin.clone();
							let contributor = node.contributor.clone();
							collector.add_second_pass(format!("column {entity}.{name}"), move |collector| {
								let table = placement.resolve(collector, &origin)?;
								add_column(collector, &table, bound, &contributor)?;
								if record {
									update_property(collector, &entity, &name, |p| p.table = table);
								}
								Ok(())
							})?;
						}
					}
					basic_value(type_name, &basic)
				}
				AttributeKind::ManyToOne { target } => {
					let reference = Reference {
						entity: node.entity_name().to_string(),
						attribute: attribute.name.clone(),
						target: target.clone(),
						column: column.clone(),
						nullable: attribute.column.nullable || force_nullable,
						unique: attribute.column.unique,
						placement,
						origin: node.origin.clone(),
						contributor: node.contributor.clone(),
						record,
					};
					collector.add_second_pass(
						format!("many-to-one {}.{}", reference.entity, reference.attribute),
						move |collector| reference.resolve(collector),
					)?;
					PropertyValue::ManyToOne { target: target.clone() }
				}
			};

			if record {
				properties.push(Property {
					name: attribute.name.clone(),
					value,
					table,
					columns: vec![column],
					converter: None,
				});
			}
		}
		Ok(properties)
	}
}

/// Where an attribute's column goes.
enum Placement {
	Known(QualifiedName),
	/// A table name not among the entity's tables, looked up once all
	/// sources are bound.
	Deferred(String),
}

impl Placement {
	fn resolve(self, collector: &InFlightMetadataCollector, origin: &Origin) -> Result<QualifiedName> {
		match self {
			Self::Known(table) => Ok(table),
			Self::Deferred(name) => collector
				.find_table(&name)
				.cloned()
				.ok_or_else(|| unresolved("table", &name, origin)),
		}
	}
}

/// A many-to-one association awaiting its target.
struct Reference {
	entity: String,
	attribute: String,
	target: String,
	column: String,
	nullable: bool,
	unique: bool,
	placement: Placement,
	origin: Origin,
	contributor: ContributorId,
	record: bool,
}

impl Reference {
	fn resolve(self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		let target = collector
			.resolve_entity_name(&self.target)
			.map(str::to_string)
			.ok_or_else(|| unresolved("entity", &self.target, &self.origin))?;
		let (referenced_table, id_column) =
			identifier_column(collector, &target).ok_or_else(|| unresolved("identifier", &target, &self.origin))?;
		let table = self.placement.resolve(collector, &self.origin)?;

		if let Some(owner) = collector.table_mut(&table) {
			owner.add_column(
				Column {
					name: self.column.clone(),
					nullable: self.nullable,
					unique: self.unique,
					..id_column
				},
				&self.contributor,
			)?;
			owner.add_foreign_key(ForeignKey {
				columns: vec![self.column],
				referenced_table,
			});
		}
		trace!(entity = %self.entity, attribute = %self.attribute, %target, "many-to-one resolved");
		if self.record {
			update_property(collector, &self.entity, &self.attribute, |p| {
				p.value = PropertyValue::ManyToOne { target };
				p.table = table;
			});
		}
		Ok(())
	}
}

/// Primary table and identifier column of `entity`'s hierarchy root.
fn identifier_column(collector: &InFlightMetadataCollector, entity: &str) -> Option<(QualifiedName, Column)> {
	let binding = collector.entity(entity)?;
	let root = collector.entity(&binding.root_entity)?;
	let property = &root.identifier.as_ref()?.property;
	let column = collector.table(&property.table)?.column(property.columns.first()?)?;
	Some((binding.table.clone(), column.clone()))
}

fn bind_generator(
	collector: &mut InFlightMetadataCollector,
	generator: Option<&str>,
	table: &QualifiedName,
	node: &HierarchyNode,
) -> Result<GeneratorBinding> {
	let Some(name) = generator else {
		return Ok(GeneratorBinding::Assigned);
	};
	let (strategy, default_sequence) = match collector.identifier_generator(name) {
		Some(declared) => (declared.strategy.clone(), format!("{name}_seq")),
		None => (
			builtin_generator(name).ok_or_else(|| unresolved("identifier generator", name, &node.origin))?,
			format!("{}_seq", table.name),
		),
	};

	Ok(match strategy {
		GeneratorStrategy::Assigned => GeneratorBinding::Assigned,
		GeneratorStrategy::Identity => GeneratorBinding::Identity,
		GeneratorStrategy::Uuid => GeneratorBinding::Uuid,
		GeneratorStrategy::Sequence {
			sequence_name,
			initial_value,
			increment,
		} => {
			let name = collector.qualify_name(&sequence_name.unwrap_or(default_sequence));
			// Entities sharing a generator share its sequence.
			collector.register_sequence(
				Sequence {
					name: name.clone(),
					initial_value,
					increment,
				},
				DuplicatePolicy::FirstWins,
				&node.contributor,
			)?;
			GeneratorBinding::Sequence(name)
		}
	})
}

fn builtin_generator(name: &str) -> Option<GeneratorStrategy> {
	match name {
		"assigned" => Some(GeneratorStrategy::Assigned),
		"identity" => Some(GeneratorStrategy::Identity),
		"uuid" => Some(GeneratorStrategy::Uuid),
		"sequence" => Some(GeneratorStrategy::Sequence {
			sequence_name: None,
			initial_value: 1,
			increment: 50,
		}),
		_ => None,
	}
}

fn register_entity(collector: &mut InFlightMetadataCollector, binding: EntityBinding) -> Result<()> {
	let entity = binding.entity_name.clone();
	let class_name = binding.class_name.clone();
	let contributor = binding.contributor.clone();
	collector.add_entity_binding(binding, DuplicatePolicy::Reject)?;

	collector.add_import(unqualify(&entity), &entity, DuplicatePolicy::FirstWins, &contributor)?;
	if let Some(class_name) = class_name {
		collector.add_import(class_name, &entity, DuplicatePolicy::FirstWins, &contributor)?;
	}
	trace!(%entity, "entity bound");
	Ok(())
}

fn update_property(
	collector: &mut InFlightMetadataCollector,
	entity: &str,
	attribute: &str,
	update: impl FnOnce(&mut Property),
) {
	if let Some(property) = collector
		.entity_mut(entity)
		.and_then(|binding| binding.properties.iter_mut().find(|p| p.name == attribute))
	{
		update(property);
	}
}

fn add_column(
	collector: &mut InFlightMetadataCollector,
	table: &QualifiedName,
	column: Column,
	contributor: &ContributorId,
) -> Result<()> {
	if let Some(table) = collector.table_mut(table) {
		table.add_column(column, contributor)?;
	}
	Ok(())
}

fn resolve_type(collector: &InFlightMetadataCollector, type_name: &str, origin: &Origin) -> Result<Arc<BasicType>> {
	collector
		.resolve_basic_type(type_name)
		.ok_or_else(|| unresolved("type", type_name, origin))
}

fn make_column(
	collector: &InFlightMetadataCollector,
	name: &str,
	basic: &BasicType,
	spec: &ColumnSpec,
) -> Result<Column> {
	let size = Size {
		length: spec.length,
		precision: spec.precision,
		scale: spec.scale,
	};
	let jdbc = basic.jdbc_type();
	let sql_type = collector.type_configuration().ddl().type_name(jdbc.ddl_code(), size)?;
	Ok(Column {
		name: name.to_string(),
		type_code: jdbc.code(),
		sql_type,
		nullable: spec.nullable,
		unique: spec.unique,
		size,
	})
}

fn basic_value(type_name: &str, basic: &BasicType) -> PropertyValue {
	PropertyValue::Basic {
		type_name: type_name.to_string(),
		basic_type: basic.name().to_string(),
		value_type: basic.value_type().qualified_name.to_string(),
		code: basic.jdbc_type().code(),
	}
}

fn column_name(attribute: &AttributeSource) -> String {
	attribute.column.name.clone().unwrap_or_else(|| match attribute.kind {
		AttributeKind::Basic { .. } => attribute.name.clone(),
		AttributeKind::ManyToOne { .. } => format!("{}_id", attribute.name),
	})
}

fn primary_table(content: &EntityContent) -> TableSpec {
	content
		.table
		.clone()
		.unwrap_or_else(|| TableSpec::new(unqualify(&content.entity_name)))
}

fn discriminator_value(content: &EntityContent) -> String {
	content
		.discriminator_value
		.clone()
		.unwrap_or_else(|| content.entity_name.clone())
}

fn unresolved(kind: &'static str, name: &str, origin: &Origin) -> BuildError {
	BuildError::UnresolvedReference {
		kind,
		name: name.to_string(),
		origin: Some(origin.clone()),
	}
}
