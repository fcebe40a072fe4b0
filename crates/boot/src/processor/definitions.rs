//! Definition phases shared by every processor.
//!
//! Type definitions and query renames override earlier registrations under
//! the same name; every other definition kind rejects duplicates. References
//! to entities are checked in second passes, once every hierarchy is bound.

use tracing::{debug, trace};

use crate::collector::{DuplicatePolicy, InFlightMetadataCollector};
use crate::model::PropertyValue;
use crate::source::Definitions;
use crate::{BuildError, ContributorId, Origin, Result};

/// One source's definitions together with its provenance.
#[derive(Debug, Clone)]
pub struct DefinitionSource<'a> {
	pub definitions: &'a Definitions,
	pub contributor: &'a ContributorId,
	pub origin: Origin,
}

pub(crate) fn type_definitions(collector: &mut InFlightMetadataCollector, sources: &[DefinitionSource<'_>]) -> Result<()> {
	for source in sources {
		for definition in &source.definitions.type_definitions {
			if collector.type_configuration().basic().resolve(&definition.basic_type).is_none() {
				return Err(unresolved("type", &definition.basic_type, &source.origin));
			}
			collector.add_type_definition(definition.clone(), DuplicatePolicy::LastWins, source.contributor)?;
		}
	}
	Ok(())
}

pub(crate) fn query_renames(collector: &mut InFlightMetadataCollector, sources: &[DefinitionSource<'_>]) -> Result<()> {
	for source in sources {
		for rename in &source.definitions.query_renames {
			collector.add_import(&rename.alias, &rename.entity, DuplicatePolicy::LastWins, source.contributor)?;
		}
	}
	Ok(())
}

pub(crate) fn auxiliary_objects(collector: &mut InFlightMetadataCollector, sources: &[DefinitionSource<'_>]) -> Result<()> {
	for source in sources {
		for object in &source.definitions.auxiliary_objects {
			collector.add_auxiliary_object(object.clone(), DuplicatePolicy::Reject, source.contributor)?;
		}
	}
	Ok(())
}

pub(crate) fn identifier_generators(
	collector: &mut InFlightMetadataCollector,
	sources: &[DefinitionSource<'_>],
) -> Result<()> {
	for source in sources {
		for generator in &source.definitions.generators {
			collector.add_identifier_generator(generator.clone(), DuplicatePolicy::Reject, source.contributor)?;
		}
	}
	Ok(())
}

pub(crate) fn filter_definitions(collector: &mut InFlightMetadataCollector, sources: &[DefinitionSource<'_>]) -> Result<()> {
	for source in sources {
		for filter in &source.definitions.filters {
			if let Some(type_name) = filter
				.parameters
				.values()
				.find(|type_name| collector.resolve_basic_type(type_name).is_none())
			{
				return Err(unresolved("type", type_name, &source.origin));
			}
			collector.add_filter_definition(filter.clone(), DuplicatePolicy::Reject, source.contributor)?;
		}
	}
	Ok(())
}

pub(crate) fn fetch_profiles(collector: &mut InFlightMetadataCollector, sources: &[DefinitionSource<'_>]) -> Result<()> {
	for source in sources {
		for profile in &source.definitions.fetch_profiles {
			collector.add_fetch_profile(profile.clone(), DuplicatePolicy::Reject, source.contributor)?;
			for fetch in &profile.fetches {
				let (entity, association) = (fetch.entity.clone(), fetch.association.clone());
				let origin = source.origin.clone();
				collector.add_second_pass(
					format!("fetch profile {} {entity}.{association}", profile.name),
					move |collector| check_association(collector, &entity, &association, &origin),
				)?;
			}
		}
	}
	Ok(())
}

/// Fails unless `entity`, or one of its superclasses, maps `association` as a many-to-one.
fn check_association(
	collector: &InFlightMetadataCollector,
	entity: &str,
	association: &str,
	origin: &Origin,
) -> Result<()> {
	let mut current = collector.resolve_entity_name(entity);
	if current.is_none() {
		return Err(unresolved("entity", entity, origin));
	}
	while let Some(name) = current {
		let Some(binding) = collector.entity(name) else {
			break;
		};
		if let Some(property) = binding.property(association) {
			if matches!(property.value, PropertyValue::ManyToOne { .. }) {
				return Ok(());
			}
			break;
		}
		current = binding.superclass.as_deref();
	}
	Err(unresolved("association", &format!("{entity}.{association}"), origin))
}

pub(crate) fn result_set_mappings(
	collector: &mut InFlightMetadataCollector,
	sources: &[DefinitionSource<'_>],
) -> Result<()> {
	for source in sources {
		for mapping in &source.definitions.result_set_mappings {
			collector.add_result_set_mapping(mapping.clone(), DuplicatePolicy::Reject, source.contributor)?;
			if mapping.entity_results.is_empty() {
				continue;
			}
			let entities = mapping.entity_results.clone();
			let origin = source.origin.clone();
			collector.add_second_pass(format!("result set mapping {}", mapping.name), move |collector| {
				match entities.iter().find(|e| collector.resolve_entity_name(e).is_none()) {
					Some(missing) => Err(unresolved("entity", missing, &origin)),
					None => Ok(()),
				}
			})?;
		}
	}
	Ok(())
}

/// Registers named queries. Runs after deferred work has drained, so every
/// result-set mapping is known.
pub(crate) fn named_queries(collector: &mut InFlightMetadataCollector, sources: &[DefinitionSource<'_>]) -> Result<()> {
	for source in sources {
		for query in &source.definitions.named_queries {
			if let Some(mapping) = &query.result_set_mapping
				&& collector.result_set_mapping(mapping).is_none()
			{
				return Err(unresolved("result set mapping", mapping, &source.origin));
			}
			trace!(query = %query.name, native = query.native, "named query");
			collector.add_named_query(query.clone(), DuplicatePolicy::Reject, source.contributor)?;
		}
	}
	Ok(())
}

/// Fails when two entities of one hierarchy share a discriminator value.
pub(crate) fn discriminator_values(collector: &InFlightMetadataCollector, entities: &[String]) -> Result<()> {
	let mut seen: Vec<(&str, &str)> = Vec::new();
	for name in entities {
		let Some(binding) = collector.entity(name) else {
			continue;
		};
		let Some(value) = binding.discriminator_value.as_deref() else {
			continue;
		};
		let key = (binding.root_entity.as_str(), value);
		if seen.contains(&key) {
			return Err(BuildError::DuplicateRegistration {
				kind: "discriminator value",
				key: format!("{}:{value}", binding.root_entity),
				contributor: binding.contributor.clone(),
			});
		}
		seen.push(key);
	}
	debug!(entities = entities.len(), "discriminator values checked");
	Ok(())
}

fn unresolved(kind: &'static str, name: &str, origin: &Origin) -> BuildError {
	BuildError::UnresolvedReference {
		kind,
		name: name.to_string(),
		origin: Some(origin.clone()),
	}
}
