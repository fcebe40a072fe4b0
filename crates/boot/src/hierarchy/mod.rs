//! Assembly of entity hierarchies from unordered fragments.
//!
//! # Purpose
//!
//! Mapping documents may declare a subclass apart from its superclass, in any
//! document and in any order. [`EntityHierarchyBuilder`] indexes every
//! fragment first and attaches subclasses afterwards, in as many passes as
//! the forward references need.
//!
//! # Invariants
//!
//! - Assembly is order-independent: subclasses and hierarchies are sorted by
//!   entity name.
//!   - Enforced in: [`EntityHierarchyBuilder::build_hierarchies`]
//!   - Tested by: `tests::assembly_is_order_independent`
//!   - Failure symptom: binding order, and thus table column order, varying
//!     with document discovery order.
//! - A subclass whose superclass is declared nowhere fails the build, naming
//!   the superclass and the fragment's origin.
//!   - Enforced in: `unresolved`
//!   - Tested by: `tests::missing_superclass_names_it`

use rustc_hash::FxHashMap as HashMap;
use tracing::debug;

use crate::source::{
	DiscriminatorSource, EntityContent, EntityFragment, IdentifierSource, InheritanceStrategy, MappingDocument,
	RootContent, SubclassSource,
};
use crate::{BuildError, ContributorId, Origin, Result};

#[cfg(test)]
mod tests;

/// One entity in an assembled hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
	pub content: EntityContent,
	pub origin: Origin,
	pub contributor: ContributorId,
	/// Direct subclasses, sorted by entity name.
	pub subclasses: Vec<HierarchyNode>,
}

impl HierarchyNode {
	pub fn entity_name(&self) -> &str {
		&self.content.entity_name
	}

	fn collect<'a>(&'a self, out: &mut Vec<&'a HierarchyNode>) {
		out.push(self);
		for subclass in &self.subclasses {
			subclass.collect(out);
		}
	}
}

/// A complete inheritance hierarchy, ready for binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityHierarchySource {
	pub identifier: IdentifierSource,
	pub strategy: InheritanceStrategy,
	pub discriminator: Option<DiscriminatorSource>,
	pub root: HierarchyNode,
}

impl EntityHierarchySource {
	pub fn root_entity_name(&self) -> &str {
		self.root.entity_name()
	}

	/// Every node in the hierarchy, root first, depth first.
	pub fn nodes(&self) -> Vec<&HierarchyNode> {
		let mut nodes = Vec::new();
		self.root.collect(&mut nodes);
		nodes
	}

	pub fn entity_names(&self) -> Vec<&str> {
		self.nodes().into_iter().map(HierarchyNode::entity_name).collect()
	}
}

struct PendingRoot {
	content: EntityContent,
	root: RootContent,
	subclasses: Vec<SubclassSource>,
	origin: Origin,
	contributor: ContributorId,
}

struct PendingSubclass {
	extends: String,
	source: SubclassSource,
	origin: Origin,
	contributor: ContributorId,
}

struct ArenaNode {
	content: EntityContent,
	origin: Origin,
	contributor: ContributorId,
	children: Vec<usize>,
}

/// Indexes fragments and assembles them into hierarchies.
///
/// Consumed by [`build_hierarchies`](Self::build_hierarchies); a builder
/// serves exactly one assembly.
#[derive(Default)]
pub struct EntityHierarchyBuilder {
	roots: Vec<PendingRoot>,
	subclasses: Vec<PendingSubclass>,
}

impl EntityHierarchyBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn index_mapping_document(&mut self, document: &MappingDocument) {
		for fragment in &document.entities {
			self.index_fragment(fragment.clone(), document.origin.clone(), document.contributor.clone());
		}
	}

	pub fn index_fragment(&mut self, fragment: EntityFragment, origin: Origin, contributor: ContributorId) {
		match fragment {
			EntityFragment::Root(root) => self.roots.push(PendingRoot {
				content: root.content,
				root: root.root,
				subclasses: root.subclasses,
				origin,
				contributor,
			}),
			EntityFragment::Subclass { extends, source } => self.subclasses.push(PendingSubclass {
				extends,
				source,
				origin,
				contributor,
			}),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.roots.is_empty() && self.subclasses.is_empty()
	}

	pub fn build_hierarchies(self) -> Result<Vec<EntityHierarchySource>> {
		let mut arena = Arena::default();
		let mut hierarchies = Vec::with_capacity(self.roots.len());

		for root in self.roots {
			let index = arena.insert(root.content, root.subclasses, &root.origin, &root.contributor)?;
			hierarchies.push((index, root.root));
		}

		let mut pending = self.subclasses;
		let mut passes = 0usize;
		while !pending.is_empty() {
			passes += 1;
			let before = pending.len();
			let mut unattached = Vec::new();
			for fragment in pending {
				match arena.lookup(&fragment.extends) {
					Some(parent) => {
						let index = arena.insert(
							fragment.source.content,
							fragment.source.subclasses,
							&fragment.origin,
							&fragment.contributor,
						)?;
						arena.nodes[parent].children.push(index);
					}
					None => unattached.push(fragment),
				}
			}
			if unattached.len() == before {
				return Err(unresolved(&unattached, &arena));
			}
			pending = unattached;
		}

		let mut assembled: Vec<_> = hierarchies
			.into_iter()
			.map(|(index, root)| EntityHierarchySource {
				identifier: root.identifier,
				strategy: root.strategy,
				discriminator: root.discriminator,
				root: arena.assemble(index),
			})
			.collect();
		assembled.sort_by(|a, b| a.root_entity_name().cmp(b.root_entity_name()));
		debug!(hierarchies = assembled.len(), passes, "entity hierarchies assembled");
		Ok(assembled)
	}
}

#[derive(Default)]
struct Arena {
	nodes: Vec<ArenaNode>,
	/// Entity names and class names to node index.
	names: HashMap<String, usize>,
}

impl Arena {
	fn lookup(&self, name: &str) -> Option<usize> {
		self.names.get(name).copied()
	}

	fn insert(
		&mut self,
		content: EntityContent,
		subclasses: Vec<SubclassSource>,
		origin: &Origin,
		contributor: &ContributorId,
	) -> Result<usize> {
		let index = self.nodes.len();
		if self.names.contains_key(&content.entity_name) {
			return Err(BuildError::DuplicateEntity {
				entity: content.entity_name,
				origin: origin.clone(),
			});
		}
		self.names.insert(content.entity_name.clone(), index);
		if let Some(class_name) = &content.class_name {
			self.names.entry(class_name.clone()).or_insert(index);
		}
		self.nodes.push(ArenaNode {
			content,
			origin: origin.clone(),
			contributor: contributor.clone(),
			children: Vec::new(),
		});

		for subclass in subclasses {
			let child = self.insert(subclass.content, subclass.subclasses, origin, contributor)?;
			self.nodes[index].children.push(child);
		}
		Ok(index)
	}

	fn assemble(&self, index: usize) -> HierarchyNode {
		let node = &self.nodes[index];
		let mut subclasses: Vec<_> = node.children.iter().map(|child| self.assemble(*child)).collect();
		subclasses.sort_by(|a, b| a.entity_name().cmp(b.entity_name()));
		HierarchyNode {
			content: node.content.clone(),
			origin: node.origin.clone(),
			contributor: node.contributor.clone(),
			subclasses,
		}
	}
}

/// Error for fragments no pass could attach.
///
/// A fragment whose superclass no pending fragment declares either is a
/// missing superclass; if every superclass is itself pending, the fragments
/// extend each other in a loop.
fn unresolved(pending: &[PendingSubclass], arena: &Arena) -> BuildError {
	let mut declared: Vec<&str> = Vec::new();
	for fragment in pending {
		collect_declared(&fragment.source, &mut declared);
	}

	if let Some(missing) = pending.iter().find(|f| !declared.contains(&f.extends.as_str())) {
		let suggestion = arena
			.names
			.keys()
			.map(String::as_str)
			.chain(declared.iter().copied())
			.filter(|name| strsim::levenshtein(name, &missing.extends) <= 3)
			.min_by_key(|name| (strsim::levenshtein(name, &missing.extends), *name))
			.map(str::to_string);
		return BuildError::UnknownSuperclass {
			superclass: missing.extends.clone(),
			entity: missing.source.content.entity_name.clone(),
			origin: missing.origin.clone(),
			suggestion,
		};
	}

	let mut entities: Vec<String> = pending.iter().map(|f| f.source.content.entity_name.clone()).collect();
	entities.sort();
	BuildError::CyclicHierarchy { entities }
}

fn collect_declared<'a>(source: &'a SubclassSource, out: &mut Vec<&'a str>) {
	out.push(&source.content.entity_name);
	if let Some(class_name) = &source.content.class_name {
		out.push(class_name);
	}
	for nested in &source.subclasses {
		collect_declared(nested, out);
	}
}
