use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::source::{AttributeSource, RootEntitySource};

fn root(name: &str) -> EntityFragment {
	EntityFragment::Root(RootEntitySource::new(
		EntityContent::new(name).attribute(AttributeSource::basic("name", "string")),
		RootContent::new(IdentifierSource::new("id", "long")),
	))
}

fn sub(name: &str, extends: &str) -> EntityFragment {
	EntityFragment::Subclass {
		extends: extends.to_string(),
		source: SubclassSource::new(EntityContent::new(name)),
	}
}

fn origin(name: &str) -> Origin {
	Origin::resource(format!("{name}.orm.toml"))
}

fn build(fragments: Vec<(EntityFragment, Origin)>) -> Result<Vec<EntityHierarchySource>> {
	let mut builder = EntityHierarchyBuilder::new();
	for (fragment, origin) in fragments {
		builder.index_fragment(fragment, origin, ContributorId::ORM);
	}
	builder.build_hierarchies()
}

fn shape(node: &HierarchyNode) -> String {
	if node.subclasses.is_empty() {
		return node.entity_name().to_string();
	}
	let children: Vec<_> = node.subclasses.iter().map(shape).collect();
	format!("{}[{}]", node.entity_name(), children.join(","))
}

#[test]
fn subclass_indexed_before_root() {
	let hierarchies = build(vec![
		(sub("Employee", "Person"), origin("employee")),
		(root("Person"), origin("person")),
	])
	.unwrap();

	assert_eq!(hierarchies.len(), 1);
	let hierarchy = &hierarchies[0];
	assert_eq!(hierarchy.root_entity_name(), "Person");
	assert_eq!(hierarchy.root.subclasses.len(), 1);
	assert_eq!(hierarchy.root.subclasses[0].entity_name(), "Employee");
	assert_eq!(hierarchy.root.subclasses[0].origin, origin("employee"));
}

#[test]
fn forward_references_resolve_over_several_passes() {
	let hierarchies = build(vec![
		(sub("Manager", "Employee"), origin("manager")),
		(sub("Intern", "Employee"), origin("intern")),
		(sub("Employee", "Person"), origin("employee")),
		(root("Person"), origin("person")),
		(root("Account"), origin("account")),
	])
	.unwrap();

	let shapes: Vec<_> = hierarchies.iter().map(|h| shape(&h.root)).collect();
	assert_eq!(shapes, vec!["Account", "Person[Employee[Intern,Manager]]"]);
	assert_eq!(
		hierarchies[1].entity_names(),
		vec!["Person", "Employee", "Intern", "Manager"]
	);
}

#[test]
fn subclass_may_extend_nested_subclass_or_class_name() {
	let person = RootEntitySource::new(
		EntityContent::new("Person").class("app.model.Person"),
		RootContent::new(IdentifierSource::new("id", "long")),
	)
	.subclass(SubclassSource::new(EntityContent::new("Employee")));

	let hierarchies = build(vec![
		(sub("Contractor", "app.model.Person"), origin("contractor")),
		(sub("Manager", "Employee"), origin("manager")),
		(EntityFragment::Root(person), origin("person")),
	])
	.unwrap();

	assert_eq!(shape(&hierarchies[0].root), "Person[Contractor,Employee[Manager]]");
}

#[test]
fn missing_superclass_names_it() {
	let err = build(vec![
		(root("Person"), origin("person")),
		(sub("Employee", "Person"), origin("employee")),
		(sub("Invoice", "Documnet"), origin("invoice")),
	])
	.unwrap_err();

	match err {
		BuildError::UnknownSuperclass {
			superclass,
			entity,
			origin: at,
			..
		} => {
			assert_eq!(superclass, "Documnet");
			assert_eq!(entity, "Invoice");
			assert_eq!(at, origin("invoice"));
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[test]
fn missing_superclass_suggests_close_name() {
	let err = build(vec![(root("Person"), origin("person")), (sub("Employee", "Persn"), origin("employee"))])
		.unwrap_err();

	assert_eq!(
		err.to_string(),
		"unknown superclass 'Persn' of entity Employee (resource:employee.orm.toml); did you mean 'Person'?"
	);
}

#[test]
fn missing_superclass_behind_pending_chain() {
	let err = build(vec![
		(sub("Manager", "Employee"), origin("manager")),
		(sub("Employee", "Person"), origin("employee")),
	])
	.unwrap_err();

	assert!(matches!(err, BuildError::UnknownSuperclass { ref superclass, .. } if superclass == "Person"));
}

#[test]
fn cycles_are_reported() {
	let err = build(vec![
		(root("Person"), origin("person")),
		(sub("A", "B"), origin("a")),
		(sub("B", "A"), origin("b")),
	])
	.unwrap_err();

	assert_eq!(err.to_string(), "cyclic entity hierarchy among: A, B");
}

#[test]
fn duplicate_entity_is_rejected() {
	let err = build(vec![(root("Person"), origin("person")), (sub("Person", "Person"), origin("again"))])
		.unwrap_err();

	assert!(matches!(err, BuildError::DuplicateEntity { ref entity, ref origin } if entity == "Person" && origin.name.as_deref() == Some("again.orm.toml")));
}

#[test]
fn documents_are_indexed_with_their_origin_and_contributor() {
	let document = MappingDocument::new(origin("doc"))
		.contributed_by(ContributorId::new("audit"))
		.subclass("Person", SubclassSource::new(EntityContent::new("Employee")));
	let mut builder = EntityHierarchyBuilder::new();
	builder.index_mapping_document(&document);
	builder.index_fragment(root("Person"), origin("person"), ContributorId::ORM);

	let hierarchies = builder.build_hierarchies().unwrap();
	let employee = &hierarchies[0].root.subclasses[0];
	assert_eq!(employee.contributor.as_str(), "audit");
	assert_eq!(hierarchies[0].root.contributor, ContributorId::ORM);
}

fn fragment_set() -> Vec<(EntityFragment, Origin)> {
	vec![
		(root("Person"), origin("person")),
		(sub("Employee", "Person"), origin("employee")),
		(sub("Manager", "Employee"), origin("manager")),
		(sub("Customer", "Person"), origin("customer")),
		(root("Order"), origin("order")),
		(sub("RushOrder", "Order"), origin("rush")),
		(sub("Director", "Manager"), origin("director")),
		(root("Audit"), origin("audit")),
	]
}

proptest! {
	#[test]
	fn assembly_is_order_independent(fragments in Just(fragment_set()).prop_shuffle()) {
		let expected = build(fragment_set()).unwrap();
		let assembled = build(fragments).unwrap();
		prop_assert_eq!(assembled, expected);
	}

	#[test]
	fn missing_superclass_always_reported(
		fragments in Just(fragment_set()).prop_shuffle(),
		at in 0usize..8,
	) {
		let mut fragments = fragments;
		fragments.insert(at, (sub("Ghost", "Nowhere"), origin("ghost")));
		let err = build(fragments).unwrap_err();
		prop_assert!(
			matches!(err, BuildError::UnknownSuperclass { ref superclass, .. } if superclass == "Nowhere"),
			"{}", err
		);
	}
}
