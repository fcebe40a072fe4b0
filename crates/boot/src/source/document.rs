use crate::source::{Definitions, EntityFragment, RootEntitySource, SubclassSource};
use crate::{ContributorId, Origin};

/// One parsed external mapping unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingDocument {
	pub origin: Origin,
	pub contributor: ContributorId,
	pub definitions: Definitions,
	pub entities: Vec<EntityFragment>,
}

impl MappingDocument {
	pub fn new(origin: Origin) -> Self {
		Self {
			origin,
			contributor: ContributorId::ORM,
			definitions: Definitions::default(),
			entities: Vec::new(),
		}
	}

	pub fn contributed_by(mut self, contributor: ContributorId) -> Self {
		self.contributor = contributor;
		self
	}

	pub fn definitions(mut self, definitions: Definitions) -> Self {
		self.definitions = definitions;
		self
	}

	pub fn root(mut self, root: RootEntitySource) -> Self {
		self.entities.push(EntityFragment::Root(root));
		self
	}

	pub fn subclass(mut self, extends: impl Into<String>, source: SubclassSource) -> Self {
		self.entities.push(EntityFragment::Subclass {
			extends: extends.into(),
			source,
		});
		self
	}
}
