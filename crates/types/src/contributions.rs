use keel_config::Settings;

use crate::{ConverterDescriptor, Result, TypeConfiguration};

/// Handle passed to a [`TypeContributor`] for the duration of its turn.
pub struct TypeContributions<'a> {
	configuration: &'a mut TypeConfiguration,
	converters: Vec<ConverterDescriptor>,
}

impl<'a> TypeContributions<'a> {
	pub fn new(configuration: &'a mut TypeConfiguration) -> Self {
		Self {
			configuration,
			converters: Vec::new(),
		}
	}

	pub fn configuration(&mut self) -> &mut TypeConfiguration {
		self.configuration
	}

	pub fn contribute_converter(&mut self, converter: ConverterDescriptor) {
		self.converters.push(converter);
	}

	pub fn into_converters(self) -> Vec<ConverterDescriptor> {
		self.converters
	}
}

/// Plugin that adds or overrides type descriptors.
///
/// Contributors run after the platform seeded the registries and before
/// preferences and fallbacks apply, so their registrations are never replaced
/// by either.
pub trait TypeContributor: Send + Sync {
	fn name(&self) -> &str;

	fn contribute(&self, contributions: &mut TypeContributions<'_>, settings: &Settings) -> Result<()>;
}
