use std::cell::RefCell;
use std::rc::Rc;

use keel_config::{Settings, names};
use pretty_assertions::assert_eq;

use super::*;
use crate::BuildError;
use crate::testing::{collector, collector_with};

fn audit_log() -> Table {
	Table::new(QualifiedName::new("AUDIT_LOG"))
}

#[test]
fn reject_names_duplicate_key() {
	let mut collector = collector();
	let first = ContributorId::new("audit");
	let second = ContributorId::new("history");

	collector.register_table(audit_log(), DuplicatePolicy::Reject, &first).unwrap();
	let err = collector
		.register_table(audit_log(), DuplicatePolicy::Reject, &second)
		.unwrap_err();

	assert_eq!(
		err.to_string(),
		"duplicate table registration 'AUDIT_LOG' (contributor history)"
	);
	assert_eq!(collector.table(&QualifiedName::new("AUDIT_LOG")).unwrap().contributor(), &first);
}

#[test]
fn first_and_last_wins() {
	let mut collector = collector();
	let orm = ContributorId::ORM;

	collector.add_import("Person", "app.Person", DuplicatePolicy::FirstWins, &orm).unwrap();
	let kept = collector
		.add_import("Person", "other.Person", DuplicatePolicy::FirstWins, &orm)
		.unwrap();
	assert_eq!(kept, Registration::KeptExisting);
	assert!(!kept.took_effect());
	assert_eq!(collector.import("Person"), Some("app.Person"));

	let replaced = collector
		.add_import("Person", "other.Person", DuplicatePolicy::LastWins, &orm)
		.unwrap();
	assert_eq!(replaced, Registration::ReplacedExisting);
	assert_eq!(collector.import("Person"), Some("other.Person"));
}

#[test]
fn qualify_applies_default_schema() {
	let settings = Settings::new().with(names::DEFAULT_SCHEMA, "app");
	let collector = collector_with(&settings);

	assert_eq!(collector.qualify(&TableSpec::new("person")).to_string(), "app.person");
	assert_eq!(
		collector.qualify(&TableSpec::new("person").schema("audit")).to_string(),
		"audit.person"
	);
}

#[test]
fn find_table_matches_qualified_or_simple_name() {
	let mut collector = collector();
	let name = QualifiedName::new("person").in_schema("app");
	collector
		.register_table(Table::new(name.clone()), DuplicatePolicy::Reject, &ContributorId::ORM)
		.unwrap();

	assert_eq!(collector.find_table("app.person"), Some(&name));
	assert_eq!(collector.find_table("person"), Some(&name));
	assert_eq!(collector.find_table("people"), None);
}

#[test]
fn type_definitions_shadow_basic_type_keys() {
	let mut collector = collector();
	assert_eq!(collector.resolve_basic_type("string").unwrap().name(), "string");

	collector
		.add_type_definition(
			TypeDefinition::new("string", "long"),
			DuplicatePolicy::LastWins,
			&ContributorId::ORM,
		)
		.unwrap();
	assert_eq!(collector.resolve_basic_type("string").unwrap().name(), "long");
	assert!(collector.resolve_basic_type("money").is_none());
}

#[test]
fn second_passes_drain_in_order_once() {
	let mut collector = collector();
	let seen = Rc::new(RefCell::new(Vec::new()));
	for step in ["tables", "keys", "profiles"] {
		let seen = Rc::clone(&seen);
		collector
			.add_second_pass(step, move |_| {
				seen.borrow_mut().push(step);
				Ok(())
			})
			.unwrap();
	}
	assert_eq!(collector.pending_second_passes(), 3);

	collector.process_second_passes().unwrap();
	collector.process_second_passes().unwrap();

	assert_eq!(*seen.borrow(), vec!["tables", "keys", "profiles"]);
	assert_eq!(collector.pending_second_passes(), 0);
}

#[test]
fn second_pass_cannot_enqueue() {
	let mut collector = collector();
	collector
		.add_second_pass("outer", |collector| collector.add_second_pass("inner", |_| Ok(())))
		.unwrap();

	let err = collector.process_second_passes().unwrap_err();
	assert!(matches!(err, BuildError::RecursiveSecondPass { ref label } if label == "inner"));

	collector.add_second_pass("after", |_| Ok(())).unwrap();
	assert_eq!(collector.pending_second_passes(), 1);
}

#[test]
fn build_metadata_drains_remaining_work() {
	let mut collector = collector();
	collector
		.add_second_pass("late table", |collector| {
			collector
				.register_table(audit_log(), DuplicatePolicy::Reject, &ContributorId::ORM)
				.map(drop)
		})
		.unwrap();

	let metadata = collector.build_metadata("generic").unwrap();
	assert!(metadata.table("AUDIT_LOG").is_some());
	assert_eq!(metadata.platform(), "generic");
}
