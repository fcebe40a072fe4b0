use keel_types::SqlTypeCode;
use pretty_assertions::assert_eq;

use super::*;
use crate::ContributorId;
use crate::hierarchy::EntityHierarchyBuilder;
use crate::source::{
	DiscriminatorSource, EntityFragment, IdentifierGenerator, IdentifierSource, RootContent, RootEntitySource,
	SubclassSource,
};
use crate::testing;

fn person(strategy: InheritanceStrategy) -> RootEntitySource {
	RootEntitySource::new(
		EntityContent::new("Person")
			.class("app.model.Person")
			.attribute(AttributeSource::basic("name", "string").column(ColumnSpec::default().not_null().length(100))),
		RootContent::new(IdentifierSource::new("id", "long")).strategy(strategy),
	)
}

fn employee() -> SubclassSource {
	SubclassSource::new(
		EntityContent::new("Employee").attribute(AttributeSource::basic("salary", "big_decimal").column(
			ColumnSpec::named("SALARY").not_null().precision(12, 2),
		)),
	)
}

fn bind(
	collector: &mut InFlightMetadataCollector,
	fragments: Vec<EntityFragment>,
) -> Result<()> {
	let mut builder = EntityHierarchyBuilder::new();
	for fragment in fragments {
		builder.index_fragment(fragment, Origin::resource("model.orm.toml"), ContributorId::ORM);
	}
	for hierarchy in builder.build_hierarchies()? {
		ModelBinder::new().bind_entity_hierarchy(collector, &hierarchy)?;
	}
	collector.process_second_passes()
}

fn table<'a>(collector: &'a InFlightMetadataCollector, name: &str) -> &'a Table {
	collector.table(&QualifiedName::new(name)).unwrap()
}

fn column_names(table: &Table) -> Vec<&str> {
	table.columns().map(|c| c.name.as_str()).collect()
}

#[test]
fn root_binds_table_identifier_and_imports() {
	let mut collector = testing::collector();
	bind(&mut collector, vec![EntityFragment::Root(person(InheritanceStrategy::SingleTable))]).unwrap();

	let table = table(&collector, "Person");
	assert_eq!(column_names(table), vec!["id", "DTYPE", "name"]);
	assert_eq!(table.primary_key(), ["id".to_string()]);

	let id = table.column("id").unwrap();
	assert_eq!(id.sql_type, "bigint");
	assert!(!id.nullable);
	assert_eq!(table.column("name").unwrap().sql_type, "varchar(100)");

	let binding = collector.entity("Person").unwrap();
	assert!(binding.is_root());
	assert_eq!(binding.discriminator_value.as_deref(), Some("Person"));
	let identifier = binding.identifier.as_ref().unwrap();
	assert_eq!(identifier.generator, GeneratorBinding::Assigned);
	assert!(matches!(
		identifier.property.value,
		PropertyValue::Basic { code: SqlTypeCode::BIGINT, .. }
	));

	assert_eq!(collector.import("app.model.Person"), Some("Person"));
	assert_eq!(collector.resolve_entity_name("app.model.Person"), Some("Person"));
}

#[test]
fn single_table_subclass_shares_root_table() {
	let mut collector = testing::collector();
	let root = person(InheritanceStrategy::SingleTable)
		.subclass(SubclassSource::new(EntityContent::new("Customer").discriminator_value("C")));
	bind(
		&mut collector,
		vec![
			EntityFragment::Root(root),
			EntityFragment::Subclass {
				extends: "Person".to_string(),
				source: employee(),
			},
		],
	)
	.unwrap();

	assert!(collector.table(&QualifiedName::new("Employee")).is_none());
	let table = table(&collector, "Person");
	let salary = table.column("SALARY").unwrap();
	assert!(salary.nullable, "single-table subclass columns are nullable");
	assert_eq!(salary.sql_type, "numeric(12,2)");

	let employee = collector.entity("Employee").unwrap();
	assert_eq!(employee.table, QualifiedName::new("Person"));
	assert_eq!(employee.root_entity, "Person");
	assert_eq!(employee.superclass.as_deref(), Some("Person"));
	assert_eq!(employee.discriminator_value.as_deref(), Some("Employee"));
	assert_eq!(
		collector.entity("Customer").unwrap().discriminator_value.as_deref(),
		Some("C")
	);
}

#[test]
fn joined_subclass_gets_keyed_table() {
	let mut collector = testing::collector();
	bind(
		&mut collector,
		vec![
			EntityFragment::Root(person(InheritanceStrategy::Joined)),
			EntityFragment::Subclass {
				extends: "Person".to_string(),
				source: employee(),
			},
		],
	)
	.unwrap();

	assert_eq!(column_names(table(&collector, "Person")), vec!["id", "name"]);
	let employee = table(&collector, "Employee");
	assert_eq!(column_names(employee), vec!["id", "SALARY"]);
	assert_eq!(employee.primary_key(), ["id".to_string()]);
	assert_eq!(employee.foreign_keys()[0].referenced_table, QualifiedName::new("Person"));
	assert!(!employee.column("SALARY").unwrap().nullable);
	assert_eq!(collector.entity("Employee").unwrap().discriminator_value, None);
}

#[test]
fn joined_hierarchy_keeps_explicit_discriminator() {
	let mut collector = testing::collector();
	let mut root = person(InheritanceStrategy::Joined);
	root.root = root.root.discriminator(DiscriminatorSource {
		column: "KIND".to_string(),
		type_name: "integer".to_string(),
	});
	bind(&mut collector, vec![EntityFragment::Root(root)]).unwrap();

	assert_eq!(table(&collector, "Person").column("KIND").unwrap().sql_type, "integer");
	assert_eq!(
		collector.entity("Person").unwrap().discriminator_value.as_deref(),
		Some("Person")
	);
}

#[test]
fn table_per_class_repeats_inherited_columns() {
	let mut collector = testing::collector();
	let root = person(InheritanceStrategy::TablePerClass).subclass(
		employee().subclass(SubclassSource::new(
			EntityContent::new("Manager").attribute(AttributeSource::basic("level", "integer")),
		)),
	);
	bind(&mut collector, vec![EntityFragment::Root(root)]).unwrap();

	assert_eq!(column_names(table(&collector, "Employee")), vec!["id", "name", "SALARY"]);
	let manager = table(&collector, "Manager");
	assert_eq!(column_names(manager), vec!["id", "name", "SALARY", "level"]);
	assert!(manager.foreign_keys().is_empty());

	let properties: Vec<_> = collector
		.entity("Manager")
		.unwrap()
		.properties
		.iter()
		.map(|p| p.name.as_str())
		.collect();
	assert_eq!(properties, vec!["level"]);
}

#[test]
fn many_to_one_resolves_through_import() {
	let mut collector = testing::collector();
	let order = RootEntitySource::new(
		EntityContent::new("Order")
			.table(TableSpec::new("ORDERS"))
			.attribute(AttributeSource::many_to_one("customer", "app.model.Person")),
		RootContent::new(IdentifierSource::new("id", "uuid").generated_by("uuid")),
	);
	bind(
		&mut collector,
		vec![
			EntityFragment::Root(order),
			EntityFragment::Root(person(InheritanceStrategy::SingleTable)),
		],
	)
	.unwrap();

	let orders = table(&collector, "ORDERS");
	let customer = orders.column("customer_id").unwrap();
	assert_eq!(customer.sql_type, "bigint");
	assert!(customer.nullable);
	assert_eq!(
		orders.foreign_keys(),
		[ForeignKey {
			columns: vec!["customer_id".to_string()],
			referenced_table: QualifiedName::new("Person"),
		}]
	);

	let order = collector.entity("Order").unwrap();
	assert_eq!(
		order.property("customer").unwrap().value,
		PropertyValue::ManyToOne {
			target: "Person".to_string()
		}
	);
	assert_eq!(order.identifier.as_ref().unwrap().generator, GeneratorBinding::Uuid);
	// Generic platforms store UUIDs as binary.
	assert_eq!(orders.column("id").unwrap().sql_type, "binary(255)");
}

#[test]
fn many_to_one_to_unknown_entity_fails() {
	let mut collector = testing::collector();
	let root = person(InheritanceStrategy::SingleTable);
	let root = RootEntitySource {
		content: root.content.attribute(AttributeSource::many_to_one("employer", "Company")),
		..root
	};
	let err = bind(&mut collector, vec![EntityFragment::Root(root)]).unwrap_err();

	assert_eq!(
		err.to_string(),
		"unresolved entity 'Company' (resource:model.orm.toml)"
	);
}

#[test]
fn unknown_attribute_type_fails() {
	let mut collector = testing::collector();
	let root = RootEntitySource::new(
		EntityContent::new("Invoice").attribute(AttributeSource::basic("total", "money")),
		RootContent::new(IdentifierSource::new("id", "long")),
	);
	let err = bind(&mut collector, vec![EntityFragment::Root(root)]).unwrap_err();

	assert!(matches!(err, BuildError::UnresolvedReference { kind: "type", ref name, .. } if name == "money"));
}

#[test]
fn secondary_table_columns_are_placed() {
	let mut collector = testing::collector();
	let root = RootEntitySource::new(
		EntityContent::new("Person")
			.secondary_table(TableSpec::new("PERSON_DETAIL"))
			.attribute(AttributeSource::basic("bio", "string").column(ColumnSpec::default().in_table("PERSON_DETAIL")))
			.attribute(AttributeSource::basic("note", "string").column(ColumnSpec::default().in_table("NOTES"))),
		RootContent::new(IdentifierSource::new("id", "long")),
	);
	let notes = RootEntitySource::new(
		EntityContent::new("Note").table(TableSpec::new("NOTES")),
		RootContent::new(IdentifierSource::new("id", "long")),
	);
	bind(&mut collector, vec![EntityFragment::Root(root), EntityFragment::Root(notes)]).unwrap();

	let detail = table(&collector, "PERSON_DETAIL");
	assert_eq!(column_names(detail), vec!["id", "bio"]);
	assert_eq!(detail.foreign_keys()[0].referenced_table, QualifiedName::new("Person"));
	assert!(table(&collector, "NOTES").column("note").is_some());

	let person = collector.entity("Person").unwrap();
	assert_eq!(person.secondary_tables, vec![QualifiedName::new("PERSON_DETAIL")]);
	assert_eq!(person.property("note").unwrap().table, QualifiedName::new("NOTES"));
}

#[test]
fn column_in_unknown_table_fails_after_binding() {
	let mut collector = testing::collector();
	let root = RootEntitySource::new(
		EntityContent::new("Person")
			.attribute(AttributeSource::basic("bio", "string").column(ColumnSpec::default().in_table("DETAILS"))),
		RootContent::new(IdentifierSource::new("id", "long")),
	);
	let err = bind(&mut collector, vec![EntityFragment::Root(root)]).unwrap_err();

	assert!(matches!(err, BuildError::UnresolvedReference { kind: "table", ref name, .. } if name == "DETAILS"));
}

#[test]
fn declared_sequence_generator_is_shared() {
	let mut collector = testing::collector();
	collector
		.add_identifier_generator(
			IdentifierGenerator::new(
				"ids",
				GeneratorStrategy::Sequence {
					sequence_name: None,
					initial_value: 1,
					increment: 10,
				},
			),
			DuplicatePolicy::Reject,
			&ContributorId::ORM,
		)
		.unwrap();
	let entity = |name: &str| {
		EntityFragment::Root(RootEntitySource::new(
			EntityContent::new(name),
			RootContent::new(IdentifierSource::new("id", "long").generated_by("ids")),
		))
	};
	bind(&mut collector, vec![entity("Invoice"), entity("Payment")]).unwrap();

	let sequence = QualifiedName::new("ids_seq");
	assert_eq!(collector.sequence(&sequence).unwrap().increment, 10);
	for name in ["Invoice", "Payment"] {
		let identifier = collector.entity(name).unwrap().identifier.as_ref().unwrap();
		assert_eq!(identifier.generator, GeneratorBinding::Sequence(sequence.clone()));
	}
}

#[test]
fn builtin_sequence_is_named_after_table() {
	let mut collector = testing::collector();
	let root = RootEntitySource::new(
		EntityContent::new("Invoice"),
		RootContent::new(IdentifierSource::new("id", "long").generated_by("sequence")),
	);
	bind(&mut collector, vec![EntityFragment::Root(root)]).unwrap();

	assert!(collector.sequence(&QualifiedName::new("Invoice_seq")).is_some());
}

#[test]
fn unknown_generator_fails() {
	let mut collector = testing::collector();
	let root = RootEntitySource::new(
		EntityContent::new("Invoice"),
		RootContent::new(IdentifierSource::new("id", "long").generated_by("hilo")),
	);
	let err = bind(&mut collector, vec![EntityFragment::Root(root)]).unwrap_err();

	assert_eq!(
		err.to_string(),
		"unresolved identifier generator 'hilo' (resource:model.orm.toml)"
	);
}

#[test]
fn duplicate_table_across_hierarchies_is_rejected() {
	let mut collector = testing::collector();
	let entity = |name: &str| {
		EntityFragment::Root(RootEntitySource::new(
			EntityContent::new(name).table(TableSpec::new("SHARED")),
			RootContent::new(IdentifierSource::new("id", "long")),
		))
	};
	let err = bind(&mut collector, vec![entity("A"), entity("B")]).unwrap_err();

	assert_eq!(err.to_string(), "duplicate table registration 'SHARED' (contributor orm)");
}

fn coded(name: &str, type_name: &str) -> SubclassSource {
	SubclassSource::new(EntityContent::new(name).attribute(AttributeSource::basic("code", type_name)))
}

#[test]
fn single_table_siblings_share_an_identical_column() {
	let mut collector = testing::collector();
	let root = person(InheritanceStrategy::SingleTable)
		.subclass(coded("Supplier", "string"))
		.subclass(coded("Carrier", "string"));
	bind(&mut collector, vec![EntityFragment::Root(root)]).unwrap();

	let table = table(&collector, "Person");
	assert_eq!(column_names(table), vec!["id", "DTYPE", "name", "code"]);
	assert_eq!(table.column("code").unwrap().sql_type, "varchar(255)");
}

#[test]
fn single_table_siblings_with_conflicting_column_types_fail() {
	let mut collector = testing::collector();
	let root = person(InheritanceStrategy::SingleTable)
		.subclass(coded("Supplier", "string"))
		.subclass(coded("Carrier", "long"));
	let err = bind(&mut collector, vec![EntityFragment::Root(root)]).unwrap_err();

	assert_eq!(err.to_string(), "duplicate column registration 'Person.code' (contributor orm)");
}

#[test]
fn many_to_one_column_conflicting_with_basic_column_fails() {
	let mut collector = testing::collector();
	let root = person(InheritanceStrategy::SingleTable).subclass(SubclassSource::new(
		EntityContent::new("Manager")
			.attribute(AttributeSource::basic("mentor_id", "string"))
			.attribute(AttributeSource::many_to_one("mentor", "Person")),
	));
	let err = bind(&mut collector, vec![EntityFragment::Root(root)]).unwrap_err();

	assert_eq!(
		err.to_string(),
		"duplicate column registration 'Person.mentor_id' (contributor orm)"
	);
	assert!(table(&collector, "Person").foreign_keys().is_empty());
}
