use rustc_hash::FxHashSet as HashSet;
use tracing::debug;

use crate::collector::InFlightMetadataCollector;
use crate::options::{BuildingOptions, SourceKind};
use crate::processor::{
	DeclarativeProcessor, MappingDocumentProcessor, MetadataSourceProcessor, NoOpProcessor, Processor,
};
use crate::resources::ManagedResources;
use crate::Result;

/// Fans each phase out to the processor of every source kind.
///
/// Built once per build from the enabled kinds. Processors are held in
/// fixed order, mapping documents first; only the two hierarchy phases
/// consult the configured source order.
pub struct ProcessorCoordinator<'a> {
	processors: [Processor<'a>; 2],
	order: Vec<SourceKind>,
	processed: HashSet<String>,
}

impl<'a> ProcessorCoordinator<'a> {
	pub fn new(resources: &'a ManagedResources, options: &BuildingOptions) -> Self {
		let mapping = if options.is_enabled(SourceKind::MappingDocument) {
			Processor::MappingDocument(MappingDocumentProcessor::new(resources.documents()))
		} else {
			Processor::NoOp(NoOpProcessor(SourceKind::MappingDocument))
		};
		let declarative = if options.is_enabled(SourceKind::Declarative) {
			Processor::Declarative(DeclarativeProcessor::new(resources.classes()))
		} else {
			Processor::NoOp(NoOpProcessor(SourceKind::Declarative))
		};
		debug!(
			order = ?options.source_order,
			mapping = options.is_enabled(SourceKind::MappingDocument),
			declarative = options.is_enabled(SourceKind::Declarative),
			"source processors"
		);
		Self {
			processors: [mapping, declarative],
			order: options.source_order.clone(),
			processed: HashSet::default(),
		}
	}

	fn each(
		&mut self,
		phase: &str,
		mut run: impl FnMut(&mut Processor<'a>) -> Result<()>,
	) -> Result<()> {
		debug!(phase, "processor phase");
		self.processors.iter_mut().try_for_each(&mut run)
	}

	fn slot(kind: SourceKind) -> usize {
		match kind {
			SourceKind::MappingDocument => 0,
			SourceKind::Declarative => 1,
		}
	}

	pub fn prepare(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		self.each("prepare", |p| p.prepare(collector))
	}

	pub fn process_type_definitions(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		self.each("type definitions", |p| p.process_type_definitions(collector))
	}

	pub fn process_query_renames(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		self.each("query renames", |p| p.process_query_renames(collector))
	}

	pub fn process_auxiliary_database_objects(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		self.each("auxiliary database objects", |p| p.process_auxiliary_database_objects(collector))
	}

	pub fn process_identifier_generators(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		self.each("identifier generators", |p| p.process_identifier_generators(collector))
	}

	pub fn process_filter_definitions(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		self.each("filter definitions", |p| p.process_filter_definitions(collector))
	}

	pub fn process_fetch_profiles(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		self.each("fetch profiles", |p| p.process_fetch_profiles(collector))
	}

	pub fn prepare_for_entity_hierarchy_processing(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		debug!(phase = "hierarchy preparation", "processor phase");
		for kind in &self.order {
			self.processors[Self::slot(*kind)].prepare_for_entity_hierarchy_processing(collector)?;
		}
		Ok(())
	}

	pub fn process_entity_hierarchies(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		debug!(phase = "hierarchy processing", "processor phase");
		for kind in &self.order {
			self.processors[Self::slot(*kind)].process_entity_hierarchies(collector, &mut self.processed)?;
		}
		Ok(())
	}

	pub fn post_process_entity_hierarchies(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		self.each("hierarchy post-processing", |p| p.post_process_entity_hierarchies(collector))
	}

	pub fn process_result_set_mappings(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		self.each("result set mappings", |p| p.process_result_set_mappings(collector))
	}

	pub fn process_named_queries(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		self.each("named queries", |p| p.process_named_queries(collector))
	}

	pub fn finish_up(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		self.each("finish up", |p| p.finish_up(collector))
	}

	/// Runs the primary phase sequence up to and including result-set mappings.
	pub fn process_sources(&mut self, collector: &mut InFlightMetadataCollector) -> Result<()> {
		self.prepare(collector)?;
		self.process_type_definitions(collector)?;
		self.process_query_renames(collector)?;
		self.process_auxiliary_database_objects(collector)?;
		self.process_identifier_generators(collector)?;
		self.process_filter_definitions(collector)?;
		self.process_fetch_profiles(collector)?;
		self.prepare_for_entity_hierarchy_processing(collector)?;
		self.process_entity_hierarchies(collector)?;
		self.post_process_entity_hierarchies(collector)?;
		self.process_result_set_mappings(collector)
	}

	/// Entity names bound by any processor so far.
	pub fn processed_entities(&self) -> &HashSet<String> {
		&self.processed
	}
}
