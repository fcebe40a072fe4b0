use indexmap::IndexMap;
use keel_types::ConverterDescriptor;
use tracing::debug;

use crate::source::{DeclaredClass, MappingDocument};

/// Mutable collection point for discovered sources.
#[derive(Debug, Clone, Default)]
pub struct MetadataSources {
	classes: Vec<DeclaredClass>,
	documents: Vec<MappingDocument>,
	converters: Vec<ConverterDescriptor>,
	extra_query_imports: IndexMap<String, String>,
}

impl MetadataSources {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_class(&mut self, class: DeclaredClass) -> &mut Self {
		self.classes.push(class);
		self
	}

	pub fn add_document(&mut self, document: MappingDocument) -> &mut Self {
		self.documents.push(document);
		self
	}

	pub fn add_converter(&mut self, converter: ConverterDescriptor) -> &mut Self {
		self.converters.push(converter);
		self
	}

	/// Registers `alias` as a query import for `entity` after all sources are bound.
	pub fn add_query_import(&mut self, alias: impl Into<String>, entity: impl Into<String>) -> &mut Self {
		self.extra_query_imports.insert(alias.into(), entity.into());
		self
	}

	/// Freezes the sources. Mapping documents are dropped when XML mapping is disabled.
	pub fn into_resources(self, xml_mapping_enabled: bool) -> ManagedResources {
		let documents = if xml_mapping_enabled {
			self.documents
		} else {
			if !self.documents.is_empty() {
				debug!(documents = self.documents.len(), "xml mapping disabled; documents dropped");
			}
			Vec::new()
		};
		ManagedResources {
			classes: self.classes,
			documents,
			converters: self.converters,
			extra_query_imports: self.extra_query_imports,
		}
	}
}

/// The read-only handoff between discovery and building.
#[derive(Debug, Clone, Default)]
pub struct ManagedResources {
	classes: Vec<DeclaredClass>,
	documents: Vec<MappingDocument>,
	converters: Vec<ConverterDescriptor>,
	extra_query_imports: IndexMap<String, String>,
}

impl ManagedResources {
	pub fn classes(&self) -> &[DeclaredClass] {
		&self.classes
	}

	pub fn documents(&self) -> &[MappingDocument] {
		&self.documents
	}

	pub fn converters(&self) -> &[ConverterDescriptor] {
		&self.converters
	}

	pub fn extra_query_imports(&self) -> impl Iterator<Item = (&str, &str)> {
		self.extra_query_imports.iter().map(|(a, e)| (a.as_str(), e.as_str()))
	}
}
