//! End-to-end builds through the public pipeline.

use std::sync::Arc;

use keel_boot::model::{GeneratorBinding, QualifiedName, Table};
use keel_boot::source::{
	AttributeSource, AuxiliaryObject, ColumnSpec, DeclaredClass, Definitions, EntityContent, IdentifierGenerator,
	IdentifierSource, MappingDocument, NamedQuery, ResultSetMapping, RootContent, RootEntitySource, SubclassSource,
};
use keel_boot::{
	BoxError, Bootstrap, BuildError, InFlightMetadataCollector, MappingContributor, MetadataContributor,
	MetadataSources, Origin, PluginDef, PluginRegistry, build,
	contribute::AdditionalMappingContributions,
};
use keel_config::{ConfigError, Settings, names};
use keel_types::{
	ConverterDescriptor, GenericPlatform, JdbcType, PostgresPlatform, SqlTypeCode, TypeContributions,
	TypeContributor,
};
use pretty_assertions::assert_eq;

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn generic(settings: Settings) -> Bootstrap {
	init_tracing();
	Bootstrap::new(settings, Arc::new(GenericPlatform))
}

fn people_document() -> MappingDocument {
	MappingDocument::new(Origin::resource("people.orm.toml"))
		.definitions(Definitions {
			generators: vec![IdentifierGenerator::sequence("person_ids", "person_seq")],
			result_set_mappings: vec![ResultSetMapping::new("people").entity("Person")],
			named_queries: vec![
				NamedQuery::new("byName", "from Person p where p.name = :name"),
				NamedQuery::native("allPeople", "select * from Person").with_result_set_mapping("people"),
			],
			auxiliary_objects: vec![
				AuxiliaryObject::new("person_name_idx", "create index ...", "drop index ...").scoped_to("postgresql"),
			],
			..Definitions::default()
		})
		.root(RootEntitySource::new(
			EntityContent::new("Person")
				.class("app.model.Person")
				.attribute(AttributeSource::basic("name", "string").column(ColumnSpec::default().not_null())),
			RootContent::new(IdentifierSource::new("id", "long").generated_by("person_ids")),
		))
}

fn employee_document() -> MappingDocument {
	MappingDocument::new(Origin::resource("employee.orm.toml")).subclass(
		"Person",
		SubclassSource::new(EntityContent::new("Employee").attribute(AttributeSource::basic("salary", "big_decimal"))),
	)
}

fn order_class() -> DeclaredClass {
	DeclaredClass::entity("app.model.Order")
		.table(keel_boot::source::TableSpec::new("ORDERS"))
		.root(RootContent::new(IdentifierSource::new("id", "uuid").generated_by("uuid")))
		.attribute(AttributeSource::many_to_one("buyer", "app.model.Person"))
		.attribute(AttributeSource::basic("placed", "instant"))
}

#[test]
fn mixed_sources_build_one_model() {
	let mut sources = MetadataSources::new();
	sources
		.add_document(employee_document())
		.add_document(people_document())
		.add_class(order_class())
		.add_converter(ConverterDescriptor::new("trim", "Text", "keel::value::Text").auto_apply())
		.add_query_import("Buyer", "Person");

	let metadata = build(sources, &generic(Settings::new())).unwrap();

	let names: Vec<_> = metadata.entities().map(|e| e.entity_name.as_str()).collect();
	assert_eq!(names, vec!["Person", "Employee", "Order"]);

	let employee = metadata.entity("Employee").unwrap();
	assert_eq!(employee.superclass.as_deref(), Some("Person"));
	assert_eq!(metadata.entity("app.model.Person").unwrap().entity_name, "Person");
	assert_eq!(metadata.import("Buyer"), Some("Person"));

	let person = metadata.table("Person").unwrap();
	let columns: Vec<_> = person.columns().map(|c| c.name.as_str()).collect();
	assert_eq!(columns, vec!["id", "DTYPE", "name", "salary"]);

	let orders = metadata.table("ORDERS").unwrap();
	assert_eq!(orders.column("buyer_id").unwrap().sql_type, "bigint");
	assert_eq!(orders.foreign_keys()[0].referenced_table, QualifiedName::new("Person"));

	let identifier = metadata.entity("Person").unwrap().identifier.as_ref().unwrap();
	assert_eq!(identifier.generator, GeneratorBinding::Sequence(QualifiedName::new("person_seq")));
	assert_eq!(metadata.sequences().count(), 1);

	let name = metadata.entity("Person").unwrap().property("name").unwrap();
	assert_eq!(name.converter.as_deref(), Some("trim"));
	assert!(metadata.named_query("allPeople").unwrap().native);
	assert!(metadata.result_set_mapping("people").is_some());

	assert_eq!(metadata.platform(), "generic");
	assert_eq!(metadata.auxiliary_objects().count(), 1);
	assert_eq!(metadata.auxiliary_objects_for_platform().count(), 0);
}

#[test]
fn disabled_xml_mapping_drops_documents() {
	let mut sources = MetadataSources::new();
	sources.add_document(people_document()).add_class(
		DeclaredClass::entity("app.model.Audit").root(RootContent::new(IdentifierSource::new("id", "long"))),
	);
	let settings = Settings::new().with(names::XML_MAPPING_ENABLED, false);

	let metadata = build(sources, &generic(settings)).unwrap();
	let names: Vec<_> = metadata.entities().map(|e| e.entity_name.as_str()).collect();
	assert_eq!(names, vec!["Audit"]);
}

#[test]
fn bad_setting_fails_the_build() {
	let settings = Settings::new().with(names::PREFERRED_UUID_TYPE, "UUIDD");
	let err = build(MetadataSources::new(), &generic(settings)).unwrap_err();
	assert_eq!(
		err.to_string(),
		"couldn't interpret 'UUIDD' as type code or type code name for keel.type.preferred_uuid (did you mean 'UUID'?)"
	);

	let settings = Settings::new().with(names::SOURCE_PROCESSING_ORDER, "hbm");
	let err = build(MetadataSources::new(), &generic(settings)).unwrap_err();
	assert!(matches!(err, BuildError::Config(ConfigError::Unsupported { .. })));
}

struct NativeUuid;

impl TypeContributor for NativeUuid {
	fn name(&self) -> &str {
		"native-uuid"
	}

	fn contribute(&self, contributions: &mut TypeContributions<'_>, _: &Settings) -> keel_types::Result<()> {
		contributions
			.configuration()
			.jdbc_mut()
			.add_descriptor(JdbcType::new(SqlTypeCode::UUID, "NATIVE_UUID").into_shared());
		Ok(())
	}
}

fn uuid_column(plugins: PluginRegistry) -> String {
	init_tracing();
	let mut sources = MetadataSources::new();
	sources.add_class(order_class()).add_document(people_document());
	let settings = Settings::new().with(names::PREFERRED_UUID_TYPE, "CHAR");
	let bootstrap = Bootstrap::new(settings, Arc::new(PostgresPlatform)).with_plugins(plugins);

	let metadata = build(sources, &bootstrap).unwrap();
	metadata.table("ORDERS").unwrap().column("id").unwrap().sql_type.clone()
}

#[test]
fn uuid_preference_never_replaces_contributor_override() {
	assert_eq!(uuid_column(PluginRegistry::new()), "char(255)");

	let mut plugins = PluginRegistry::new();
	plugins.register_type_contributor(Arc::new(NativeUuid));
	assert_eq!(uuid_column(plugins), "uuid");
}

struct ExtraTable;

impl MetadataContributor for ExtraTable {
	fn name(&self) -> &str {
		"extra"
	}

	fn contribute(&self, collector: &mut InFlightMetadataCollector) -> Result<(), BoxError> {
		collector.register_table(
			Table::new(QualifiedName::new("EXTRA")),
			keel_boot::DuplicatePolicy::Reject,
			&keel_boot::ContributorId::new("extra"),
		)?;
		Ok(())
	}
}

#[test]
fn metadata_contributors_run_before_deferred_work() {
	let mut sources = MetadataSources::new();
	sources.add_class(
		DeclaredClass::entity("app.model.Note")
			.root(RootContent::new(IdentifierSource::new("id", "long")))
			.attribute(AttributeSource::basic("body", "string").column(ColumnSpec::default().in_table("EXTRA"))),
	);
	let mut plugins = PluginRegistry::new();
	plugins.register_metadata_contributor(Arc::new(ExtraTable));

	let metadata = build(sources, &generic(Settings::new()).with_plugins(plugins)).unwrap();
	let extra = metadata.table("EXTRA").unwrap();
	assert!(extra.column("body").is_some());
	assert_eq!(extra.contributor().as_str(), "extra");
}

struct AuditTables(&'static str);

impl MappingContributor for AuditTables {
	fn name(&self) -> &str {
		self.0
	}

	fn contribute(&self, contributions: &mut AdditionalMappingContributions<'_>) -> Result<(), BoxError> {
		contributions.contribute_table(Table::new(QualifiedName::new("AUDIT_LOG")))?;
		Ok(())
	}
}

fn register_audit(plugins: &mut PluginRegistry) {
	plugins.register_mapping_contributor(Arc::new(AuditTables("audit")));
}

inventory::submit! {
	PluginDef::new("audit", register_audit)
}

#[test]
fn discovered_plugins_take_part_in_the_build() {
	let plugins = PluginRegistry::discover();
	assert_eq!(plugins.mapping_contributors().len(), 1);

	let metadata = build(MetadataSources::new(), &generic(Settings::new()).with_plugins(plugins)).unwrap();
	assert_eq!(metadata.table("AUDIT_LOG").unwrap().contributor().as_str(), "audit");
}

#[test]
fn two_contributors_registering_audit_log_fail() {
	let mut plugins = PluginRegistry::discover();
	plugins.register_mapping_contributor(Arc::new(AuditTables("history")));

	let err = build(MetadataSources::new(), &generic(Settings::new()).with_plugins(plugins)).unwrap_err();
	assert_eq!(
		err.to_string(),
		"duplicate table registration 'AUDIT_LOG' (contributor history)"
	);
}

#[test]
fn subclass_fragment_with_missing_superclass_fails() {
	let mut sources = MetadataSources::new();
	sources.add_document(employee_document());

	let err = build(sources, &generic(Settings::new())).unwrap_err();
	assert_eq!(
		err.to_string(),
		"unknown superclass 'Person' of entity Employee (resource:employee.orm.toml)"
	);
}
