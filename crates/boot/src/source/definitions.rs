use indexmap::IndexMap;

/// A named parameterization of a basic type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
	pub name: String,
	/// Key of the basic type this definition specializes.
	pub basic_type: String,
	pub parameters: IndexMap<String, String>,
}

impl TypeDefinition {
	pub fn new(name: impl Into<String>, basic_type: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			basic_type: basic_type.into(),
			parameters: IndexMap::new(),
		}
	}

	pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.parameters.insert(name.into(), value.into());
		self
	}
}

/// An import alias usable in queries in place of an entity name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRename {
	pub alias: String,
	pub entity: String,
}

impl QueryRename {
	pub fn new(alias: impl Into<String>, entity: impl Into<String>) -> Self {
		Self {
			alias: alias.into(),
			entity: entity.into(),
		}
	}
}

/// Hand-written DDL emitted alongside the generated schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxiliaryObject {
	pub name: String,
	pub create: String,
	pub drop: String,
	/// Platform names this object applies to. Empty means every platform.
	pub dialect_scopes: Vec<String>,
}

impl AuxiliaryObject {
	pub fn new(name: impl Into<String>, create: impl Into<String>, drop: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			create: create.into(),
			drop: drop.into(),
			dialect_scopes: Vec::new(),
		}
	}

	pub fn scoped_to(mut self, platform: impl Into<String>) -> Self {
		self.dialect_scopes.push(platform.into());
		self
	}

	pub fn applies_to(&self, platform: &str) -> bool {
		self.dialect_scopes.is_empty() || self.dialect_scopes.iter().any(|scope| scope == platform)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorStrategy {
	/// Values drawn from a database sequence. Unnamed sequences default to
	/// `<generator>_seq`.
	Sequence {
		sequence_name: Option<String>,
		initial_value: i64,
		increment: i32,
	},
	Identity,
	Uuid,
	Assigned,
}

/// A named identifier generator entities refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierGenerator {
	pub name: String,
	pub strategy: GeneratorStrategy,
}

impl IdentifierGenerator {
	pub fn new(name: impl Into<String>, strategy: GeneratorStrategy) -> Self {
		Self {
			name: name.into(),
			strategy,
		}
	}

	pub fn sequence(name: impl Into<String>, sequence_name: impl Into<String>) -> Self {
		Self::new(
			name,
			GeneratorStrategy::Sequence {
				sequence_name: Some(sequence_name.into()),
				initial_value: 1,
				increment: 50,
			},
		)
	}
}

/// A named, parameterized row filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDefinition {
	pub name: String,
	pub condition: Option<String>,
	/// Parameter name to basic type key.
	pub parameters: IndexMap<String, String>,
}

impl FilterDefinition {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			condition: None,
			parameters: IndexMap::new(),
		}
	}

	pub fn condition(mut self, condition: impl Into<String>) -> Self {
		self.condition = Some(condition.into());
		self
	}

	pub fn parameter(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
		self.parameters.insert(name.into(), type_name.into());
		self
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStyle {
	#[default]
	Join,
	Select,
	Subselect,
}

/// One association fetch override inside a fetch profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetch {
	pub entity: String,
	pub association: String,
	pub style: FetchStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchProfile {
	pub name: String,
	pub fetches: Vec<Fetch>,
}

impl FetchProfile {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			fetches: Vec::new(),
		}
	}

	pub fn fetch(mut self, entity: impl Into<String>, association: impl Into<String>, style: FetchStyle) -> Self {
		self.fetches.push(Fetch {
			entity: entity.into(),
			association: association.into(),
			style,
		});
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedQuery {
	pub name: String,
	pub query: String,
	pub native: bool,
	pub result_set_mapping: Option<String>,
}

impl NamedQuery {
	pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			query: query.into(),
			native: false,
			result_set_mapping: None,
		}
	}

	pub fn native(name: impl Into<String>, query: impl Into<String>) -> Self {
		Self {
			native: true,
			..Self::new(name, query)
		}
	}

	pub fn with_result_set_mapping(mut self, mapping: impl Into<String>) -> Self {
		self.result_set_mapping = Some(mapping.into());
		self
	}
}

/// How rows of a native query map to entities and scalars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSetMapping {
	pub name: String,
	pub entity_results: Vec<String>,
	pub scalar_columns: Vec<String>,
}

impl ResultSetMapping {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			entity_results: Vec::new(),
			scalar_columns: Vec::new(),
		}
	}

	pub fn entity(mut self, entity: impl Into<String>) -> Self {
		self.entity_results.push(entity.into());
		self
	}

	pub fn scalar(mut self, column: impl Into<String>) -> Self {
		self.scalar_columns.push(column.into());
		self
	}
}

/// Non-entity definitions carried by a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
	pub type_definitions: Vec<TypeDefinition>,
	pub query_renames: Vec<QueryRename>,
	pub auxiliary_objects: Vec<AuxiliaryObject>,
	pub generators: Vec<IdentifierGenerator>,
	pub filters: Vec<FilterDefinition>,
	pub fetch_profiles: Vec<FetchProfile>,
	pub named_queries: Vec<NamedQuery>,
	pub result_set_mappings: Vec<ResultSetMapping>,
}

impl Definitions {
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}
