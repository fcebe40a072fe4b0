use rustc_hash::FxHashSet as HashSet;
use tracing::debug;

use crate::collector::InFlightMetadataCollector;
use crate::hierarchy::{EntityHierarchyBuilder, EntityHierarchySource};
use crate::options::SourceKind;
use crate::processor::{DefinitionSource, MetadataSourceProcessor, bind_hierarchies};
use crate::source::MappingDocument;
use crate::Result;

/// Processes external mapping documents.
///
/// Subclass fragments may sit in any document; hierarchies are assembled
/// across all of them before anything is bound.
#[derive(Debug)]
pub struct MappingDocumentProcessor<'a> {
	documents: &'a [MappingDocument],
	hierarchies: Vec<EntityHierarchySource>,
	bound: Vec<String>,
}

impl<'a> MappingDocumentProcessor<'a> {
	pub fn new(documents: &'a [MappingDocument]) -> Self {
		Self {
			documents,
			hierarchies: Vec::new(),
			bound: Vec::new(),
		}
	}
}

impl MetadataSourceProcessor for MappingDocumentProcessor<'_> {
	fn kind(&self) -> SourceKind {
		SourceKind::MappingDocument
	}

	fn definition_sources(&self) -> Vec<DefinitionSource<'_>> {
		self.documents
			.iter()
			.map(|document| DefinitionSource {
				definitions: &document.definitions,
				contributor: &document.contributor,
				origin: document.origin.clone(),
			})
			.collect()
	}

	fn prepare(&mut self, _collector: &mut InFlightMetadataCollector) -> Result<()> {
		debug!(documents = self.documents.len(), "mapping documents");
		Ok(())
	}

	fn prepare_for_entity_hierarchy_processing(&mut self, _collector: &mut InFlightMetadataCollector) -> Result<()> {
		let mut builder = EntityHierarchyBuilder::new();
		for document in self.documents {
			builder.index_mapping_document(document);
		}
		self.hierarchies = builder.build_hierarchies()?;
		Ok(())
	}

	fn process_entity_hierarchies(
		&mut self,
		collector: &mut InFlightMetadataCollector,
		processed: &mut HashSet<String>,
	) -> Result<()> {
		let hierarchies = std::mem::take(&mut self.hierarchies);
		bind_hierarchies(collector, hierarchies, processed, &mut self.bound)
	}

	fn bound_entities(&self) -> &[String] {
		&self.bound
	}
}
