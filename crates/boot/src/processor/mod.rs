//! Source processors and the phase contract they share.
//!
//! # Purpose
//!
//! Each source kind has one processor implementing
//! [`MetadataSourceProcessor`]. The [`ProcessorCoordinator`] drives all of
//! them through the same phase sequence; disabled kinds are represented by a
//! no-op processor so the sequence never branches.
//!
//! # Invariants
//!
//! - Hierarchy preparation and processing follow the configured source
//!   order; every other phase runs mapping documents first.
//!   - Enforced in: [`ProcessorCoordinator`]
//!   - Tested by: `tests::hierarchy_phases_follow_source_order`
//! - No entity name is bound twice across processors.
//!   - Enforced in: `bind_hierarchies`
//!   - Tested by: `tests::entity_in_both_kinds_is_rejected`
//!   - Failure symptom: an entity silently merged from two descriptions.

use rustc_hash::FxHashSet as HashSet;

use crate::binder::ModelBinder;
use crate::collector::InFlightMetadataCollector;
use crate::hierarchy::EntityHierarchySource;
use crate::options::SourceKind;
use crate::{BuildError, Result};

mod coordinator;
mod declarative;
mod definitions;
mod mapping_document;
#[cfg(test)]
mod tests;

pub use coordinator::ProcessorCoordinator;
pub use declarative::DeclarativeProcessor;
pub use definitions::DefinitionSource;
pub use mapping_document::MappingDocumentProcessor;

/// The phase contract every source kind implements.
///
/// Definition phases have default implementations driven by
/// [`definition_sources`](Self::definition_sources).
pub trait MetadataSourceProcessor {
	fn kind(&self) -> SourceKind;

	/// Definitions carried by this processor's sources, in source order.
	fn definition_sources(&self) -> Vec<DefinitionSource<'_>>;

	fn prepare(&mut self, _collector: &mut InFlightMetadataCollector) -> Result<()> {
		Ok(())
	}

	fn process_type_definitions(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		definitions::type_definitions(collector, &self.definition_sources())
	}

	fn process_query_renames(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		definitions::query_renames(collector, &self.definition_sources())
	}

	fn process_named_queries(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		definitions::named_queries(collector, &self.definition_sources())
	}

	fn process_auxiliary_database_objects(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		definitions::auxiliary_objects(collector, &self.definition_sources())
	}

	fn process_identifier_generators(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		definitions::identifier_generators(collector, &self.definition_sources())
	}

	fn process_filter_definitions(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		definitions::filter_definitions(collector, &self.definition_sources())
	}

	fn process_fetch_profiles(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		definitions::fetch_profiles(collector, &self.definition_sources())
	}

	/// Assembles this processor's entity hierarchies.
	fn prepare_for_entity_hierarchy_processing(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()>;

	/// Binds the assembled hierarchies. `processed` holds every entity name
	/// bound so far in this build, across processors.
	fn process_entity_hierarchies(
		&mut self,
		collector: &mut InFlightMetadataCollector,
		processed: &mut HashSet<String>,
	) -> Result<()>;

	/// Entities this processor bound, in binding order.
	fn bound_entities(&self) -> &[String];

	fn post_process_entity_hierarchies(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		definitions::discriminator_values(collector, self.bound_entities())
	}

	fn process_result_set_mappings(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		definitions::result_set_mappings(collector, &self.definition_sources())
	}

	fn finish_up(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		collector.apply_auto_apply_converters(self.bound_entities());
		Ok(())
	}
}

/// Stand-in for a disabled source kind.
#[derive(Debug, Clone, Copy)]
pub struct NoOpProcessor(pub SourceKind);

impl MetadataSourceProcessor for NoOpProcessor {
	fn kind(&self) -> SourceKind {
		self.0
	}

	fn definition_sources(&self) -> Vec<DefinitionSource<'_>> {
		Vec::new()
	}

	fn prepare_for_entity_hierarchy_processing(&mut self, _: &mut InFlightMetadataCollector) -> Result<()> {
		Ok(())
	}

	fn process_entity_hierarchies(
		&mut self,
		_: &mut InFlightMetadataCollector,
		_: &mut HashSet<String>,
	) -> Result<()> {
		Ok(())
	}

	fn bound_entities(&self) -> &[String] {
		&[]
	}
}

/// A processor of any kind, dispatched by variant.
pub enum Processor<'a> {
	MappingDocument(MappingDocumentProcessor<'a>),
	Declarative(DeclarativeProcessor<'a>),
	NoOp(NoOpProcessor),
}

macro_rules! dispatch {
	($self:ident.$method:ident($($arg:expr),*)) => {
		match $self {
			Processor::MappingDocument(p) => p.$method($($arg),*),
			Processor::Declarative(p) => p.$method($($arg),*),
			Processor::NoOp(p) => p.$method($($arg),*),
		}
	};
}

impl MetadataSourceProcessor for Processor<'_> {
	fn kind(&self) -> SourceKind {
		dispatch!(self.kind())
	}

	fn definition_sources(&self) -> Vec<DefinitionSource<'_>> {
		dispatch!(self.definition_sources())
	}

	fn prepare(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		dispatch!(self.prepare(collector))
	}

	fn prepare_for_entity_hierarchy_processing(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		dispatch!(self.prepare_for_entity_hierarchy_processing(collector))
	}

	fn process_entity_hierarchies(
		&mut self,
		collector: &mut InFlightMetadataCollector,
		processed: &mut HashSet<String>,
	) -> Result<()> {
		dispatch!(self.process_entity_hierarchies(collector, processed))
	}

	fn bound_entities(&self) -> &[String] {
		dispatch!(self.bound_entities())
	}
}

/// Binds `hierarchies`, recording every entity name in `processed` and `bound`.
pub(crate) fn bind_hierarchies(
	collector: &mut InFlightMetadataCollector,
	hierarchies: Vec<EntityHierarchySource>,
	processed: &mut HashSet<String>,
	bound: &mut Vec<String>,
) -> Result<()> {
	let binder = ModelBinder::new();
	for hierarchy in hierarchies {
		for node in hierarchy.nodes() {
			if !processed.insert(node.entity_name().to_string()) {
				return Err(BuildError::DuplicateEntity {
					entity: node.entity_name().to_string(),
					origin: node.origin.clone(),
				});
			}
		}
		binder.bind_entity_hierarchy(collector, &hierarchy)?;
		bound.extend(hierarchy.entity_names().into_iter().map(str::to_string));
	}
	Ok(())
}

/// Runs every phase of `processor` against a collector whose primary
/// sources are already bound, then drains the deferred work it queued.
pub(crate) fn run_all_phases(
	processor: &mut impl MetadataSourceProcessor,
	collector: &mut InFlightMetadataCollector,
	processed: &mut HashSet<String>,
) -> Result<()> {
	processor.prepare(collector)?;
	processor.process_type_definitions(collector)?;
	processor.process_query_renames(collector)?;
	processor.process_auxiliary_database_objects(collector)?;
	processor.process_identifier_generators(collector)?;
	processor.process_filter_definitions(collector)?;
	processor.process_fetch_profiles(collector)?;
	processor.prepare_for_entity_hierarchy_processing(collector)?;
	processor.process_entity_hierarchies(collector, processed)?;
	processor.post_process_entity_hierarchies(collector)?;
	processor.process_result_set_mappings(collector)?;
	collector.process_second_passes()?;
	processor.process_named_queries(collector)?;
	processor.finish_up(collector)
}
