/// How an inheritance hierarchy maps onto tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InheritanceStrategy {
	/// One table for the whole hierarchy, rows told apart by a discriminator.
	#[default]
	SingleTable,
	/// One table per entity, joined to its parent's table on the identifier.
	Joined,
	/// One self-contained table per concrete entity.
	TablePerClass,
}

/// A table location as written in a source. Unset parts take the build defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TableSpec {
	pub catalog: Option<String>,
	pub schema: Option<String>,
	pub name: String,
}

impl TableSpec {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub fn schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}

	pub fn catalog(mut self, catalog: impl Into<String>) -> Self {
		self.catalog = Some(catalog.into());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
	/// Defaults to the attribute name (`<attribute>_id` for associations).
	pub name: Option<String>,
	pub nullable: bool,
	pub unique: bool,
	pub length: Option<u64>,
	pub precision: Option<u32>,
	pub scale: Option<i32>,
	/// Name of the table holding the column when it is not the entity's primary table.
	pub table: Option<String>,
}

impl Default for ColumnSpec {
	fn default() -> Self {
		Self {
			name: None,
			nullable: true,
			unique: false,
			length: None,
			precision: None,
			scale: None,
			table: None,
		}
	}
}

impl ColumnSpec {
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: Some(name.into()),
			..Self::default()
		}
	}

	pub fn not_null(mut self) -> Self {
		self.nullable = false;
		self
	}

	pub fn unique(mut self) -> Self {
		self.unique = true;
		self
	}

	pub fn length(mut self, length: u64) -> Self {
		self.length = Some(length);
		self
	}

	pub fn precision(mut self, precision: u32, scale: i32) -> Self {
		self.precision = Some(precision);
		self.scale = Some(scale);
		self
	}

	pub fn in_table(mut self, table: impl Into<String>) -> Self {
		self.table = Some(table.into());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
	/// A scalar, typed by a type definition or basic type key.
	Basic { type_name: String },
	/// A reference to another entity by entity name or import alias.
	ManyToOne { target: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSource {
	pub name: String,
	pub kind: AttributeKind,
	pub column: ColumnSpec,
}

impl AttributeSource {
	pub fn basic(name: impl Into<String>, type_name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind: AttributeKind::Basic {
				type_name: type_name.into(),
			},
			column: ColumnSpec::default(),
		}
	}

	pub fn many_to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind: AttributeKind::ManyToOne { target: target.into() },
			column: ColumnSpec::default(),
		}
	}

	pub fn column(mut self, column: ColumnSpec) -> Self {
		self.column = column;
		self
	}
}

/// Content every entity declaration carries, root or subclass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityContent {
	pub entity_name: String,
	pub class_name: Option<String>,
	pub table: Option<TableSpec>,
	pub secondary_tables: Vec<TableSpec>,
	pub attributes: Vec<AttributeSource>,
	/// Defaults to the entity name.
	pub discriminator_value: Option<String>,
}

impl EntityContent {
	pub fn new(entity_name: impl Into<String>) -> Self {
		Self {
			entity_name: entity_name.into(),
			..Self::default()
		}
	}

	pub fn class(mut self, class_name: impl Into<String>) -> Self {
		self.class_name = Some(class_name.into());
		self
	}

	pub fn table(mut self, table: TableSpec) -> Self {
		self.table = Some(table);
		self
	}

	pub fn secondary_table(mut self, table: TableSpec) -> Self {
		self.secondary_tables.push(table);
		self
	}

	pub fn attribute(mut self, attribute: AttributeSource) -> Self {
		self.attributes.push(attribute);
		self
	}

	pub fn discriminator_value(mut self, value: impl Into<String>) -> Self {
		self.discriminator_value = Some(value.into());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierSource {
	pub attribute: AttributeSource,
	/// Generator name: a declared generator or one of `identity`, `uuid`,
	/// `sequence`, `assigned`. Unset means assigned.
	pub generator: Option<String>,
}

impl IdentifierSource {
	pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
		Self {
			attribute: AttributeSource::basic(name, type_name),
			generator: None,
		}
	}

	pub fn generated_by(mut self, generator: impl Into<String>) -> Self {
		self.generator = Some(generator.into());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscriminatorSource {
	pub column: String,
	pub type_name: String,
}

impl Default for DiscriminatorSource {
	fn default() -> Self {
		Self {
			column: "DTYPE".to_string(),
			type_name: "string".to_string(),
		}
	}
}

/// Content only a hierarchy root declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootContent {
	pub identifier: IdentifierSource,
	pub strategy: InheritanceStrategy,
	pub discriminator: Option<DiscriminatorSource>,
}

impl RootContent {
	pub fn new(identifier: IdentifierSource) -> Self {
		Self {
			identifier,
			strategy: InheritanceStrategy::default(),
			discriminator: None,
		}
	}

	pub fn strategy(mut self, strategy: InheritanceStrategy) -> Self {
		self.strategy = strategy;
		self
	}

	pub fn discriminator(mut self, discriminator: DiscriminatorSource) -> Self {
		self.discriminator = Some(discriminator);
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootEntitySource {
	pub content: EntityContent,
	pub root: RootContent,
	pub subclasses: Vec<SubclassSource>,
}

impl RootEntitySource {
	pub fn new(content: EntityContent, root: RootContent) -> Self {
		Self {
			content,
			root,
			subclasses: Vec::new(),
		}
	}

	pub fn subclass(mut self, subclass: SubclassSource) -> Self {
		self.subclasses.push(subclass);
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubclassSource {
	pub content: EntityContent,
	pub subclasses: Vec<SubclassSource>,
}

impl SubclassSource {
	pub fn new(content: EntityContent) -> Self {
		Self {
			content,
			subclasses: Vec::new(),
		}
	}

	pub fn subclass(mut self, subclass: SubclassSource) -> Self {
		self.subclasses.push(subclass);
		self
	}
}

/// One top-level entity declaration in a mapping document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityFragment {
	Root(RootEntitySource),
	/// A subclass declared apart from its superclass, possibly in another document.
	Subclass { extends: String, source: SubclassSource },
}
