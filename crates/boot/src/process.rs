//! The build pipeline, from discovered sources to finished [`Metadata`].
//!
//! # Phase Order
//!
//! 1. Options are read from settings (fail fast).
//! 2. The type system is set up: platform, type contributors, preferences,
//!    fallbacks.
//! 3. Attribute converters: discovered ones reject duplicates, those from
//!    type contributors keep the first registration.
//! 4. Source processor phases, through result-set mappings.
//! 5. Metadata contributors.
//! 6. Deferred work drains.
//! 7. Named queries, then finish-up.
//! 8. Mapping contributors, then mapping producers.
//! 9. Extra query imports, overriding earlier aliases.
//! 10. Remaining deferred work drains and the model freezes.

use std::sync::Arc;

use keel_config::{Settings, names};
use keel_types::{Platform, TypeConfiguration, handle_types};
use tracing::{debug, info, trace};

use crate::collector::{DuplicatePolicy, InFlightMetadataCollector};
use crate::contribute::{process_additional_mapping_contributions, process_mapping_producers};
use crate::metadata::Metadata;
use crate::options::BuildingOptions;
use crate::plugin::PluginRegistry;
use crate::processor::ProcessorCoordinator;
use crate::resources::{ManagedResources, MetadataSources};
use crate::{BuildError, ContributorId, Result};

/// Everything a build needs besides its sources.
#[derive(Clone)]
pub struct Bootstrap {
	pub settings: Settings,
	pub platform: Arc<dyn Platform>,
	pub plugins: PluginRegistry,
}

impl Bootstrap {
	/// Bootstrap without plugins.
	pub fn new(settings: Settings, platform: Arc<dyn Platform>) -> Self {
		Self {
			settings,
			platform,
			plugins: PluginRegistry::new(),
		}
	}

	pub fn with_plugins(mut self, plugins: PluginRegistry) -> Self {
		self.plugins = plugins;
		self
	}
}

impl std::fmt::Debug for Bootstrap {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Bootstrap")
			.field("settings", &self.settings)
			.field("platform", &self.platform.name())
			.field("plugins", &self.plugins)
			.finish()
	}
}

/// Freezes discovered sources into [`ManagedResources`].
///
/// Mapping documents are dropped when XML mapping is disabled.
pub fn prepare(sources: MetadataSources, settings: &Settings) -> Result<ManagedResources> {
	let xml_mapping_enabled = settings.get_bool(names::XML_MAPPING_ENABLED, true)?;
	Ok(sources.into_resources(xml_mapping_enabled))
}

/// [`prepare`] then [`complete`].
pub fn build(sources: MetadataSources, bootstrap: &Bootstrap) -> Result<Metadata> {
	let resources = prepare(sources, &bootstrap.settings)?;
	complete(&resources, bootstrap)
}

/// Builds the domain model from prepared resources.
pub fn complete(resources: &ManagedResources, bootstrap: &Bootstrap) -> Result<Metadata> {
	let settings = &bootstrap.settings;
	let platform = bootstrap.platform.as_ref();
	let plugins = &bootstrap.plugins;
	info!(
		platform = platform.name(),
		classes = resources.classes().len(),
		documents = resources.documents().len(),
		"building metadata"
	);

	let options = BuildingOptions::from_settings(settings, platform)?;
	let mut types = TypeConfiguration::new();
	let contributed_converters = handle_types(
		&mut types,
		platform,
		plugins.type_contributors(),
		&options.types,
		settings,
	)?;
	let mut collector = InFlightMetadataCollector::new(types, &options);

	for converter in resources.converters() {
		collector.add_attribute_converter(converter.clone(), DuplicatePolicy::Reject, &ContributorId::ORM)?;
	}
	for converter in contributed_converters {
		collector.add_attribute_converter(converter, DuplicatePolicy::FirstWins, &ContributorId::ORM)?;
	}

	let mut coordinator = ProcessorCoordinator::new(resources, &options);
	coordinator.process_sources(&mut collector)?;

	for contributor in plugins.metadata_contributors() {
		trace!(contributor = contributor.name(), "metadata contributor");
		contributor
			.contribute(&mut collector)
			.map_err(|error| BuildError::from_plugin(contributor.name(), error))?;
	}

	collector.process_second_passes()?;
	coordinator.process_named_queries(&mut collector)?;
	coordinator.finish_up(&mut collector)?;

	process_additional_mapping_contributions(
		&mut collector,
		plugins.mapping_contributors(),
		options.xml_mapping_enabled,
	)?;
	process_mapping_producers(&mut collector, plugins.mapping_producers(), options.xml_mapping_enabled)?;

	for (alias, entity) in resources.extra_query_imports() {
		collector.add_import(alias, entity, DuplicatePolicy::LastWins, &ContributorId::ORM)?;
	}

	let metadata = collector.build_metadata(platform.name())?;
	debug!(
		entities = metadata.entities().count(),
		tables = metadata.tables().count(),
		"build complete"
	);
	Ok(metadata)
}
