//! Plugin capabilities and their registry.
//!
//! A [`PluginRegistry`] holds the extension points one build invokes. Hosts
//! fill it programmatically, or with [`PluginRegistry::discover`] from
//! [`PluginDef`]s submitted through `inventory`.

use std::fmt;
use std::sync::Arc;

use keel_types::TypeContributor;
use tracing::debug;

use crate::collector::InFlightMetadataCollector;
use crate::contribute::AdditionalMappingContributions;
use crate::error::BoxError;
use crate::source::MappingDocument;

/// Generic contributor, run after every primary source is processed and
/// before deferred work drains.
pub trait MetadataContributor: Send + Sync {
	fn name(&self) -> &str;

	fn contribute(&self, collector: &mut InFlightMetadataCollector) -> Result<(), BoxError>;
}

/// Contributes entities, mapping documents and relational objects once the
/// primary model is complete.
pub trait MappingContributor: Send + Sync {
	fn name(&self) -> &str;

	fn contribute(&self, contributions: &mut AdditionalMappingContributions<'_>) -> Result<(), BoxError>;
}

/// Produces ready-made mapping documents from the model built so far.
pub trait MappingProducer: Send + Sync {
	fn name(&self) -> &str;

	fn produce(&self, collector: &InFlightMetadataCollector) -> Result<Vec<MappingDocument>, BoxError>;
}

/// Extension points for one build, in invocation order.
#[derive(Clone, Default)]
pub struct PluginRegistry {
	type_contributors: Vec<Arc<dyn TypeContributor>>,
	metadata_contributors: Vec<Arc<dyn MetadataContributor>>,
	mapping_contributors: Vec<Arc<dyn MappingContributor>>,
	mapping_producers: Vec<Arc<dyn MappingProducer>>,
}

impl PluginRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry filled by every submitted [`PluginDef`], in name order.
	pub fn discover() -> Self {
		let mut plugins: Vec<&'static PluginDef> = inventory::iter::<PluginDef>.into_iter().collect();
		plugins.sort_by(|a, b| a.name.cmp(b.name));

		let mut registry = Self::new();
		for plugin in plugins {
			debug!(plugin = plugin.name, "discovered plugin");
			(plugin.register)(&mut registry);
		}
		registry
	}

	pub fn register_type_contributor(&mut self, contributor: Arc<dyn TypeContributor>) -> &mut Self {
		self.type_contributors.push(contributor);
		self
	}

	pub fn register_metadata_contributor(&mut self, contributor: Arc<dyn MetadataContributor>) -> &mut Self {
		self.metadata_contributors.push(contributor);
		self
	}

	pub fn register_mapping_contributor(&mut self, contributor: Arc<dyn MappingContributor>) -> &mut Self {
		self.mapping_contributors.push(contributor);
		self
	}

	pub fn register_mapping_producer(&mut self, producer: Arc<dyn MappingProducer>) -> &mut Self {
		self.mapping_producers.push(producer);
		self
	}

	pub fn type_contributors(&self) -> &[Arc<dyn TypeContributor>] {
		&self.type_contributors
	}

	pub fn metadata_contributors(&self) -> &[Arc<dyn MetadataContributor>] {
		&self.metadata_contributors
	}

	pub fn mapping_contributors(&self) -> &[Arc<dyn MappingContributor>] {
		&self.mapping_contributors
	}

	pub fn mapping_producers(&self) -> &[Arc<dyn MappingProducer>] {
		&self.mapping_producers
	}

	pub fn is_empty(&self) -> bool {
		self.type_contributors.is_empty()
			&& self.metadata_contributors.is_empty()
			&& self.mapping_contributors.is_empty()
			&& self.mapping_producers.is_empty()
	}
}

impl fmt::Debug for PluginRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PluginRegistry")
			.field("type_contributors", &self.type_contributors.iter().map(|c| c.name()).collect::<Vec<_>>())
			.field(
				"metadata_contributors",
				&self.metadata_contributors.iter().map(|c| c.name()).collect::<Vec<_>>(),
			)
			.field(
				"mapping_contributors",
				&self.mapping_contributors.iter().map(|c| c.name()).collect::<Vec<_>>(),
			)
			.field("mapping_producers", &self.mapping_producers.iter().map(|p| p.name()).collect::<Vec<_>>())
			.finish()
	}
}

/// A statically submitted plugin.
///
/// ```ignore
/// inventory::submit! {
///     PluginDef::new("audit", |plugins| {
///         plugins.register_mapping_contributor(Arc::new(AuditTables));
///     })
/// }
/// ```
pub struct PluginDef {
	pub name: &'static str,
	/// Adds this plugin's capabilities to a registry.
	pub register: fn(&mut PluginRegistry),
}

inventory::collect!(PluginDef);

impl PluginDef {
	pub const fn new(name: &'static str, register: fn(&mut PluginRegistry)) -> Self {
		Self { name, register }
	}
}
