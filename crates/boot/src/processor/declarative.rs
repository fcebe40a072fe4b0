use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use tracing::{debug, trace};

use crate::collector::InFlightMetadataCollector;
use crate::hierarchy::{EntityHierarchyBuilder, EntityHierarchySource};
use crate::options::SourceKind;
use crate::processor::{DefinitionSource, MetadataSourceProcessor, bind_hierarchies};
use crate::source::{DeclaredClass, DeclaredKind, EntityFragment, RootEntitySource, SubclassSource};
use crate::{BuildError, ContributorId, Origin, Result};

/// Processes classes carrying declarative metadata.
///
/// Hierarchies follow the class superclass chain. Mapped superclasses
/// between an entity and its nearest entity ancestor lend their attributes
/// (farthest first) and, for roots, their identifier.
#[derive(Debug)]
pub struct DeclarativeProcessor<'a> {
	classes: Vec<(&'a DeclaredClass, ContributorId)>,
	origins: Vec<Origin>,
	hierarchies: Vec<EntityHierarchySource>,
	bound: Vec<String>,
}

impl<'a> DeclarativeProcessor<'a> {
	/// Processor over classes discovered for the primary pipeline.
	pub fn new(classes: &'a [DeclaredClass]) -> Self {
		Self::with_contributors(classes.iter().map(|class| (class, ContributorId::ORM)))
	}

	pub fn with_contributors(classes: impl IntoIterator<Item = (&'a DeclaredClass, ContributorId)>) -> Self {
		let classes: Vec<_> = classes.into_iter().collect();
		let origins = classes
			.iter()
			.map(|(class, _)| Origin::declared(class.class_name.clone()))
			.collect();
		Self {
			classes,
			origins,
			hierarchies: Vec::new(),
			bound: Vec::new(),
		}
	}

	fn fragment(
		&self,
		class: &DeclaredClass,
		origin: &Origin,
		by_name: &HashMap<&str, &DeclaredClass>,
	) -> Result<EntityFragment> {
		let mut mapped = Vec::new();
		let mut parent = None;
		for ancestor in ancestors(class, by_name)? {
			match ancestor.kind {
				DeclaredKind::Entity => {
					parent = Some(ancestor);
					break;
				}
				DeclaredKind::MappedSuperclass => mapped.push(ancestor),
			}
		}

		let mut content = class.content.clone();
		let mut attributes: Vec<_> = mapped
			.iter()
			.rev()
			.flat_map(|superclass| superclass.content.attributes.iter().cloned())
			.collect();
		attributes.append(&mut content.attributes);
		content.attributes = attributes;

		Ok(match parent {
			Some(parent) => EntityFragment::Subclass {
				extends: parent.entity_name().to_string(),
				source: SubclassSource::new(content),
			},
			None => {
				let root = class
					.root
					.clone()
					.or_else(|| mapped.iter().find_map(|superclass| superclass.root.clone()))
					.ok_or_else(|| BuildError::MissingIdentifier {
						entity: class.entity_name().to_string(),
						origin: origin.clone(),
					})?;
				EntityFragment::Root(RootEntitySource::new(content, root))
			}
		})
	}
}

/// Declared ancestors of `class`, nearest first, up to and including the
/// nearest entity. The walk stops at the first superclass nothing declares.
fn ancestors<'c>(class: &DeclaredClass, by_name: &HashMap<&str, &'c DeclaredClass>) -> Result<Vec<&'c DeclaredClass>> {
	let mut chain: Vec<&DeclaredClass> = Vec::new();
	let mut next = class.superclass.as_deref();
	while let Some(name) = next {
		let Some(ancestor) = by_name.get(name).copied() else {
			trace!(class = %class.class_name, superclass = name, "superclass carries no metadata");
			break;
		};
		if ancestor.class_name == class.class_name || chain.iter().any(|c| c.class_name == ancestor.class_name) {
			let mut entities: Vec<String> = chain.iter().map(|c| c.class_name.clone()).collect();
			entities.push(class.class_name.clone());
			entities.sort();
			entities.dedup();
			return Err(BuildError::CyclicHierarchy { entities });
		}
		chain.push(ancestor);
		if ancestor.kind == DeclaredKind::Entity {
			break;
		}
		next = ancestor.superclass.as_deref();
	}
	Ok(chain)
}

impl MetadataSourceProcessor for DeclarativeProcessor<'_> {
	fn kind(&self) -> SourceKind {
		SourceKind::Declarative
	}

	fn definition_sources(&self) -> Vec<DefinitionSource<'_>> {
		self.classes
			.iter()
			.zip(&self.origins)
			.map(|((class, contributor), origin)| DefinitionSource {
				definitions: &class.definitions,
				contributor,
				origin: origin.clone(),
			})
			.collect()
	}

	fn prepare(&mut self, _collector: &mut InFlightMetadataCollector) -> Result<()> {
		debug!(classes = self.classes.len(), "declared classes");
		Ok(())
	}

	fn prepare_for_entity_hierarchy_processing(&mut self, _collector: &mut InFlightMetadataCollector) -> Result<()> {
		let mut by_name: HashMap<&str, &DeclaredClass> = HashMap::default();
		for (class, contributor) in &self.classes {
			if by_name.insert(class.class_name.as_str(), *class).is_some() {
				return Err(BuildError::DuplicateRegistration {
					kind: "class",
					key: class.class_name.clone(),
					contributor: contributor.clone(),
				});
			}
		}

		let mut builder = EntityHierarchyBuilder::new();
		for ((class, contributor), origin) in self.classes.iter().zip(&self.origins) {
			if class.kind == DeclaredKind::MappedSuperclass {
				continue;
			}
			let fragment = self.fragment(class, origin, &by_name)?;
			builder.index_fragment(fragment, origin.clone(), contributor.clone());
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
