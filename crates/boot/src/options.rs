use std::fmt;

use keel_config::{ConfigError, Settings, names};
use keel_types::{Platform, TypeOptions};

use crate::Result;

/// A kind of metadata source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
	/// External mapping documents.
	MappingDocument,
	/// Declarative metadata on classes.
	Declarative,
}

impl SourceKind {
	const NAMES: [(&'static str, SourceKind); 2] =
		[("mapping", Self::MappingDocument), ("declarative", Self::Declarative)];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::MappingDocument => "mapping",
			Self::Declarative => "declarative",
		}
	}

	fn parse(value: &str) -> Option<Self> {
		Self::NAMES
			.iter()
			.find(|(name, _)| name.eq_ignore_ascii_case(value))
			.map(|(_, kind)| *kind)
	}
}

impl fmt::Display for SourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Every pipeline decision read from settings, resolved before building starts.
#[derive(Debug, Clone)]
pub struct BuildingOptions {
	pub xml_mapping_enabled: bool,
	/// Precedence for hierarchy preparation and processing. Kinds left out
	/// are not processed.
	pub source_order: Vec<SourceKind>,
	pub default_catalog: Option<String>,
	pub default_schema: Option<String>,
	pub types: TypeOptions,
}

impl BuildingOptions {
	pub fn from_settings(settings: &Settings, platform: &dyn Platform) -> Result<Self> {
		Ok(Self {
			xml_mapping_enabled: settings.get_bool(names::XML_MAPPING_ENABLED, true)?,
			source_order: source_order(settings)?,
			default_catalog: settings.get_string(names::DEFAULT_CATALOG).filter(|s| !s.is_empty()),
			default_schema: settings.get_string(names::DEFAULT_SCHEMA).filter(|s| !s.is_empty()),
			types: TypeOptions::from_settings(settings, platform)?,
		})
	}

	/// Whether `kind` takes part in the build at all.
	pub fn is_enabled(&self, kind: SourceKind) -> bool {
		if kind == SourceKind::MappingDocument && !self.xml_mapping_enabled {
			return false;
		}
		self.source_order.contains(&kind)
	}
}

fn source_order(settings: &Settings) -> Result<Vec<SourceKind>> {
	let listed = settings.get_list(names::SOURCE_PROCESSING_ORDER, ',');
	if listed.is_empty() {
		return Ok(vec![SourceKind::MappingDocument, SourceKind::Declarative]);
	}

	let mut order = Vec::with_capacity(2);
	for value in listed {
		let kind = SourceKind::parse(&value).ok_or_else(|| ConfigError::Unsupported {
			name: names::SOURCE_PROCESSING_ORDER.to_string(),
			value: value.clone(),
			allowed: SourceKind::NAMES.iter().map(|(name, _)| name.to_string()).collect(),
		})?;
		if !order.contains(&kind) {
			order.push(kind);
		}
	}
	Ok(order)
}
