use keel_config::{Settings, names};
use keel_types::{ConverterDescriptor, GenericPlatform};
use pretty_assertions::assert_eq;

use super::*;
use crate::collector::DuplicatePolicy;
use crate::model::PropertyValue;
use crate::options::BuildingOptions;
use crate::resources::{ManagedResources, MetadataSources};
use crate::source::{
	AttributeSource, DeclaredClass, Definitions, EntityContent, FetchProfile, FetchStyle, FilterDefinition,
	IdentifierSource, MappingDocument, NamedQuery, QueryRename, ResultSetMapping, RootContent, RootEntitySource,
	SubclassSource, TypeDefinition,
};
use crate::{ContributorId, Origin, testing};

fn document(name: &str, entity: &str) -> MappingDocument {
	MappingDocument::new(Origin::resource(format!("{name}.orm.toml"))).root(RootEntitySource::new(
		EntityContent::new(entity).attribute(AttributeSource::basic("name", "string")),
		RootContent::new(IdentifierSource::new("id", "long")),
	))
}

fn declared(class_name: &str) -> DeclaredClass {
	DeclaredClass::entity(class_name).root(RootContent::new(IdentifierSource::new("id", "long")))
}

fn run(settings: &Settings, resources: &ManagedResources) -> Result<InFlightMetadataCollector> {
	let options = BuildingOptions::from_settings(settings, &GenericPlatform)?;
	let mut collector = testing::collector_with(settings);
	let mut coordinator = ProcessorCoordinator::new(resources, &options);
	coordinator.process_sources(&mut collector)?;
	collector.process_second_passes()?;
	coordinator.process_named_queries(&mut collector)?;
	coordinator.finish_up(&mut collector)?;
	Ok(collector)
}

fn resources(configure: impl FnOnce(&mut MetadataSources)) -> ManagedResources {
	let mut sources = MetadataSources::new();
	configure(&mut sources);
	sources.into_resources(true)
}

fn bound(collector: &InFlightMetadataCollector) -> Vec<&str> {
	collector.entity_names().collect()
}

#[test]
fn hierarchy_phases_follow_source_order() {
	let resources = resources(|sources| {
		sources.add_document(document("invoice", "Invoice"));
		sources.add_class(declared("app.Customer"));
	});

	let default_order = run(&Settings::new(), &resources).unwrap();
	assert_eq!(bound(&default_order), vec!["Invoice", "Customer"]);

	let settings = Settings::new().with(names::SOURCE_PROCESSING_ORDER, "declarative,mapping");
	let reversed = run(&settings, &resources).unwrap();
	assert_eq!(bound(&reversed), vec!["Customer", "Invoice"]);
}

#[test]
fn kinds_left_out_of_the_order_are_skipped() {
	let resources = resources(|sources| {
		sources.add_document(document("invoice", "Invoice"));
		sources.add_class(declared("app.Customer"));
	});

	let settings = Settings::new().with(names::SOURCE_PROCESSING_ORDER, "declarative");
	let collector = run(&settings, &resources).unwrap();
	assert_eq!(bound(&collector), vec!["Customer"]);

	let settings = Settings::new().with(names::XML_MAPPING_ENABLED, false);
	let collector = run(&settings, &resources).unwrap();
	assert_eq!(bound(&collector), vec!["Customer"]);
}

#[test]
fn entity_in_both_kinds_is_rejected() {
	let resources = resources(|sources| {
		sources.add_document(document("person", "Person"));
		sources.add_class(declared("app.Person"));
	});

	let err = run(&Settings::new(), &resources).unwrap_err();
	match err {
		BuildError::DuplicateEntity { entity, origin } => {
			assert_eq!(entity, "Person");
			assert_eq!(origin, Origin::declared("app.Person"));
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[test]
fn mapped_superclasses_lend_attributes_and_identifier() {
	let resources = resources(|sources| {
		sources
			.add_class(
				DeclaredClass::mapped_superclass("app.Base")
					.root(RootContent::new(IdentifierSource::new("id", "long").generated_by("identity")))
					.attribute(AttributeSource::basic("created", "instant")),
			)
			.add_class(
				DeclaredClass::mapped_superclass("app.Named")
					.extends("app.Base")
					.attribute(AttributeSource::basic("name", "string")),
			)
			.add_class(
				DeclaredClass::entity("app.Person")
					.extends("app.Named")
					.attribute(AttributeSource::basic("email", "string")),
			)
			.add_class(
				DeclaredClass::entity("app.Employee")
					.extends("app.Person")
					.attribute(AttributeSource::basic("salary", "big_decimal")),
			)
			.add_class(DeclaredClass::entity("app.Audit").extends("java.lang.Object").root(RootContent::new(
				IdentifierSource::new("id", "long"),
			)));
	});

	let collector = run(&Settings::new(), &resources).unwrap();
	let person = collector.entity("Person").unwrap();
	let names: Vec<_> = person.properties.iter().map(|p| p.name.as_str()).collect();
	assert_eq!(names, vec!["created", "name", "email"]);
	assert_eq!(person.identifier.as_ref().unwrap().property.name, "id");
	assert_eq!(person.origin, Origin::declared("app.Person"));

	let employee = collector.entity("Employee").unwrap();
	assert_eq!(employee.superclass.as_deref(), Some("Person"));
	assert!(collector.entity("Base").is_none());
	assert!(collector.entity("Audit").unwrap().is_root());
}

#[test]
fn declared_root_without_identifier_fails() {
	let resources = resources(|sources| {
		sources.add_class(DeclaredClass::entity("app.Orphan"));
	});

	let err = run(&Settings::new(), &resources).unwrap_err();
	assert_eq!(err.to_string(), "entity Orphan declares no identifier (declared:app.Orphan)");
}

#[test]
fn class_declared_twice_fails() {
	let resources = resources(|sources| {
		sources.add_class(declared("app.Person")).add_class(declared("app.Person"));
	});

	let err = run(&Settings::new(), &resources).unwrap_err();
	assert_eq!(err.to_string(), "duplicate class registration 'app.Person' (contributor orm)");
}

#[test]
fn mapped_superclass_cycle_fails() {
	let resources = resources(|sources| {
		sources
			.add_class(DeclaredClass::mapped_superclass("app.A").extends("app.B"))
			.add_class(DeclaredClass::mapped_superclass("app.B").extends("app.A"))
			.add_class(declared("app.C").extends("app.A"));
	});

	let err = run(&Settings::new(), &resources).unwrap_err();
	assert_eq!(err.to_string(), "cyclic entity hierarchy among: app.A, app.B, app.C");
}

#[test]
fn definitions_register_with_their_policies() {
	let definitions = Definitions {
		type_definitions: vec![TypeDefinition::new("money", "big_decimal").parameter("scale", "4")],
		query_renames: vec![QueryRename::new("Bill", "Invoice")],
		filters: vec![FilterDefinition::new("tenant").condition("tenant = :id").parameter("id", "money")],
		named_queries: vec![
			NamedQuery::native("invoiceTotals", "select * from Invoice").with_result_set_mapping("totals"),
		],
		result_set_mappings: vec![ResultSetMapping::new("totals").entity("Bill").scalar("total")],
		..Definitions::default()
	};
	let invoice = RootEntitySource::new(
		EntityContent::new("Invoice").attribute(AttributeSource::basic("total", "money")),
		RootContent::new(IdentifierSource::new("id", "long")),
	);
	let resources = resources(|sources| {
		sources.add_document(
			MappingDocument::new(Origin::resource("invoice.orm.toml"))
				.definitions(definitions)
				.root(invoice),
		);
	});

	let collector = run(&Settings::new(), &resources).unwrap();
	assert_eq!(collector.import("Bill"), Some("Invoice"));
	assert!(collector.named_query("invoiceTotals").unwrap().native);
	assert!(matches!(
		&collector.entity("Invoice").unwrap().property("total").unwrap().value,
		PropertyValue::Basic { basic_type, .. } if basic_type == "big_decimal"
	));
}

#[test]
fn named_query_with_unknown_mapping_fails() {
	let resources = resources(|sources| {
		sources.add_document(MappingDocument::new(Origin::resource("queries.orm.toml")).definitions(Definitions {
			named_queries: vec![NamedQuery::native("totals", "select 1").with_result_set_mapping("missing")],
			..Definitions::default()
		}));
	});

	let err = run(&Settings::new(), &resources).unwrap_err();
	assert_eq!(
		err.to_string(),
		"unresolved result set mapping 'missing' (resource:queries.orm.toml)"
	);
}

#[test]
fn filter_parameter_type_must_resolve() {
	let resources = resources(|sources| {
		sources.add_class(declared("app.Person").definitions(Definitions {
			filters: vec![FilterDefinition::new("tenant").parameter("id", "tenant_id")],
			..Definitions::default()
		}));
	});

	let err = run(&Settings::new(), &resources).unwrap_err();
	assert!(matches!(err, BuildError::UnresolvedReference { kind: "type", ref name, .. } if name == "tenant_id"));
}

#[test]
fn fetch_profile_checks_association_after_binding() {
	let order = RootEntitySource::new(
		EntityContent::new("Order")
			.attribute(AttributeSource::many_to_one("customer", "Customer"))
			.attribute(AttributeSource::basic("note", "string")),
		RootContent::new(IdentifierSource::new("id", "long")),
	);
	let with_profile = |profile: FetchProfile| {
		resources(|sources| {
			sources
				.add_document(
					MappingDocument::new(Origin::resource("order.orm.toml"))
						.definitions(Definitions {
							fetch_profiles: vec![profile],
							..Definitions::default()
						})
						.root(order.clone()),
				)
				.add_class(declared("app.Customer"));
		})
	};

	let ok = with_profile(FetchProfile::new("eager").fetch("Order", "customer", FetchStyle::Join));
	run(&Settings::new(), &ok).unwrap();

	let bad = with_profile(FetchProfile::new("eager").fetch("Order", "note", FetchStyle::Select));
	let err = run(&Settings::new(), &bad).unwrap_err();
	assert_eq!(
		err.to_string(),
		"unresolved association 'Order.note' (resource:order.orm.toml)"
	);
}

#[test]
fn duplicate_discriminator_values_are_rejected() {
	let root = RootEntitySource::new(
		EntityContent::new("Payment"),
		RootContent::new(IdentifierSource::new("id", "long")),
	)
	.subclass(SubclassSource::new(EntityContent::new("Card").discriminator_value("X")))
	.subclass(SubclassSource::new(EntityContent::new("Cash").discriminator_value("X")));
	let resources = resources(|sources| {
		sources.add_document(MappingDocument::new(Origin::resource("payment.orm.toml")).root(root));
	});

	let err = run(&Settings::new(), &resources).unwrap_err();
	assert_eq!(
		err.to_string(),
		"duplicate discriminator value registration 'Payment:X' (contributor orm)"
	);
}

#[test]
fn finish_up_applies_auto_apply_converters() {
	let resources = resources(|sources| {
		sources.add_document(document("person", "Person"));
	});
	let settings = Settings::new();
	let options = BuildingOptions::from_settings(&settings, &GenericPlatform).unwrap();
	let mut collector = testing::collector_with(&settings);
	collector
		.add_attribute_converter(
			ConverterDescriptor::new("trim", "Text", "keel::value::Text").auto_apply(),
			DuplicatePolicy::Reject,
			&ContributorId::ORM,
		)
		.unwrap();

	let mut coordinator = ProcessorCoordinator::new(&resources, &options);
	coordinator.process_sources(&mut collector).unwrap();
	coordinator.finish_up(&mut collector).unwrap();

	let name = collector.entity("Person").unwrap().property("name").unwrap();
	assert_eq!(name.converter.as_deref(), Some("trim"));
	assert!(coordinator.processed_entities().contains("Person"));
}

#[test]
fn no_op_processor_does_nothing() {
	let mut collector = testing::collector();
	let mut processor = Processor::NoOp(NoOpProcessor(SourceKind::Declarative));
	let mut processed = HashSet::default();

	run_all_phases(&mut processor, &mut collector, &mut processed).unwrap();
	assert_eq!(processor.kind(), SourceKind::Declarative);
	assert!(processed.is_empty());
	assert_eq!(collector.entity_names().count(), 0);
}
