//! Shared fixtures for unit tests.

use keel_config::Settings;
use keel_types::{GenericPlatform, TypeConfiguration, handle_types};

use crate::collector::InFlightMetadataCollector;
use crate::options::BuildingOptions;

/// A collector over the generic platform's fully reconciled type system.
pub(crate) fn collector() -> InFlightMetadataCollector {
	collector_with(&Settings::new())
}

pub(crate) fn collector_with(settings: &Settings) -> InFlightMetadataCollector {
	let _ = tracing_subscriber::fmt()
		.with_max_level(tracing::Level::TRACE)
		.with_test_writer()
		.try_init();
	let options = BuildingOptions::from_settings(settings, &GenericPlatform).unwrap();
	let mut types = TypeConfiguration::new();
	handle_types(&mut types, &GenericPlatform, &[], &options.types, settings).unwrap();
	InFlightMetadataCollector::new(types, &options)
}
