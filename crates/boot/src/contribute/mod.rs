//! The additional-mapping contribution window.
//!
//! # Purpose
//!
//! Once primary sources are bound and deferred work has drained, mapping
//! contributors and mapping producers may add to the model. Each contributor
//! gets its own [`AdditionalMappingContributions`] handle carrying its
//! identity; tables, sequences and auxiliary objects go straight into the
//! collector, while contributed entities and documents accumulate and are
//! bound after every contributor has run.
//!
//! # Invariants
//!
//! - Everything a contributor registers is attributed to that contributor
//!   and no other.
//!   - Enforced in: [`process_additional_mapping_contributions`]
//!   - Tested by: `tests::registrations_carry_contributor_identity`
//!   - Failure symptom: duplicate-registration errors blaming the wrong plugin.
//! - A failing contributor aborts the build; later contributors do not run.
//!   - Enforced in: [`process_additional_mapping_contributions`]
//!   - Tested by: `tests::failing_contributor_stops_the_build`

use std::sync::Arc;

use rustc_hash::FxHashSet as HashSet;
use tracing::{debug, trace};

use crate::collector::{DuplicatePolicy, InFlightMetadataCollector};
use crate::model::{Sequence, Table};
use crate::plugin::{MappingContributor, MappingProducer};
use crate::processor::{DeclarativeProcessor, MappingDocumentProcessor, run_all_phases};
use crate::source::{AuxiliaryObject, DeclaredClass, MappingDocument};
use crate::{BuildError, ContributorId, Result};


/// Contributed sources awaiting binding.
#[derive(Debug, Default)]
struct ContributionAccumulator {
	classes: Vec<(DeclaredClass, ContributorId)>,
	documents: Vec<MappingDocument>,
}

/// One mapping contributor's view of the build.
pub struct AdditionalMappingContributions<'a> {
	contributor: ContributorId,
	collector: &'a mut InFlightMetadataCollector,
	accumulator: &'a mut ContributionAccumulator,
	xml_mapping_enabled: bool,
}

impl AdditionalMappingContributions<'_> {
	pub fn contributor(&self) -> &ContributorId {
		&self.contributor
	}

	/// The model built so far.
	pub fn collector(&self) -> &InFlightMetadataCollector {
		self.collector
	}

	/// Adds a class with declarative metadata, bound after all contributors run.
	pub fn contribute_entity(&mut self, class: DeclaredClass) {
		trace!(contributor = %self.contributor, class = %class.class_name, "contributed entity");
		self.accumulator.classes.push((class, self.contributor.clone()));
	}

	/// Adds a mapping document, attributed to this contributor. Ignored when
	/// mapping documents are disabled.
	pub fn contribute_binding(&mut self, mut document: MappingDocument) {
		if !self.xml_mapping_enabled {
			debug!(contributor = %self.contributor, origin = %document.origin, "mapping documents disabled; contribution ignored");
			return;
		}
		document.contributor = self.contributor.clone();
		self.accumulator.documents.push(document);
	}

	/// Registers a table, qualified with the build's default catalog and
	/// schema where its name leaves them unset.
	pub fn contribute_table(&mut self, mut table: Table) -> Result<()> {
		table.set_name(self.collector.complete_name(table.name().clone()));
		self.collector
			.register_table(table, DuplicatePolicy::Reject, &self.contributor)
			.map(drop)
	}

	/// Registers a sequence, qualified like [`Self::contribute_table`].
	pub fn contribute_sequence(&mut self, mut sequence: Sequence) -> Result<()> {
		sequence.name = self.collector.complete_name(sequence.name);
		self.collector
			.register_sequence(sequence, DuplicatePolicy::Reject, &self.contributor)
			.map(drop)
	}

	pub fn contribute_auxiliary_object(&mut self, object: AuxiliaryObject) -> Result<()> {
		self.collector
			.add_auxiliary_object(object, DuplicatePolicy::Reject, &self.contributor)
			.map(drop)
	}
}

/// Invokes each mapping contributor in order, then binds what they contributed.
pub fn process_additional_mapping_contributions(
	collector: &mut InFlightMetadataCollector,
	contributors: &[Arc<dyn MappingContributor>],
	xml_mapping_enabled: bool,
) -> Result<()> {
	let mut accumulator = ContributionAccumulator::default();
	for contributor in contributors {
		let mut contributions = AdditionalMappingContributions {
			contributor: ContributorId::new(contributor.name().to_string()),
			collector: &mut *collector,
			accumulator: &mut accumulator,
			xml_mapping_enabled,
		};
		trace!(contributor = contributor.name(), "mapping contributor");
		contributor
			.contribute(&mut contributions)
			.map_err(|error| BuildError::from_plugin(contributor.name(), error))?;
	}

	if accumulator.classes.is_empty() && accumulator.documents.is_empty() {
		return Ok(());
	}
	debug!(
		classes = accumulator.classes.len(),
		documents = accumulator.documents.len(),
		"binding contributed sources"
	);
	let mut processed: HashSet<String> = collector.entity_names().map(str::to_string).collect();
	if !accumulator.classes.is_empty() {
		let mut processor =
			DeclarativeProcessor::with_contributors(accumulator.classes.iter().map(|(class, id)| (class, id.clone())));
		run_all_phases(&mut processor, collector, &mut processed)?;
	}
	if !accumulator.documents.is_empty() {
		let mut processor = MappingDocumentProcessor::new(&accumulator.documents);
		run_all_phases(&mut processor, collector, &mut processed)?;
	}
	Ok(())
}

/// Collects documents from every producer and binds them together, so a
/// subclass from one producer may extend a root from another.
pub fn process_mapping_producers(
	collector: &mut InFlightMetadataCollector,
	producers: &[Arc<dyn MappingProducer>],
	xml_mapping_enabled: bool,
) -> Result<()> {
	if producers.is_empty() {
		return Ok(());
	}
	if !xml_mapping_enabled {
		debug!(producers = producers.len(), "mapping documents disabled; producers skipped");
		return Ok(());
	}

	let mut documents = Vec::new();
	for producer in producers {
		trace!(producer = producer.name(), "mapping producer");
		let produced = producer
			.produce(collector)
			.map_err(|error| BuildError::from_plugin(producer.name(), error))?;
		let id = ContributorId::new(producer.name().to_string());
		documents.extend(produced.into_iter().map(|document| document.contributed_by(id.clone())));
	}
	if documents.is_empty() {
		return Ok(());
	}

	let mut processed: HashSet<String> = collector.entity_names().map(str::to_string).collect();
	run_all_phases(&mut MappingDocumentProcessor::new(&documents), collector, &mut processed)
}
