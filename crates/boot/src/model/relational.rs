use std::fmt;

use indexmap::IndexMap;
use keel_types::{Size, SqlTypeCode};

use crate::{BuildError, ContributorId, Result};

/// A catalog/schema qualified object name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
	pub catalog: Option<String>,
	pub schema: Option<String>,
	pub name: String,
}

impl QualifiedName {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub fn qualified(catalog: Option<String>, schema: Option<String>, name: impl Into<String>) -> Self {
		Self {
			catalog,
			schema,
			name: name.into(),
		}
	}

	pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}
}

impl fmt::Display for QualifiedName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for part in [&self.catalog, &self.schema].into_iter().flatten() {
			write!(f, "{part}.")?;
		}
		f.write_str(&self.name)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
	pub name: String,
	pub type_code: SqlTypeCode,
	/// Rendered DDL type name.
	pub sql_type: String,
	pub nullable: bool,
	pub unique: bool,
	pub size: Size,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
	pub columns: Vec<String>,
	pub referenced_table: QualifiedName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
	name: QualifiedName,
	columns: IndexMap<String, Column>,
	primary_key: Vec<String>,
	foreign_keys: Vec<ForeignKey>,
	contributor: ContributorId,
}

impl Table {
	pub fn new(name: QualifiedName) -> Self {
		Self {
			name,
			columns: IndexMap::new(),
			primary_key: Vec::new(),
			foreign_keys: Vec::new(),
			contributor: ContributorId::ORM,
		}
	}

	pub fn name(&self) -> &QualifiedName {
		&self.name
	}

	pub fn contributor(&self) -> &ContributorId {
		&self.contributor
	}

	pub(crate) fn set_name(&mut self, name: QualifiedName) {
		self.name = name;
	}

	pub(crate) fn set_contributor(&mut self, contributor: ContributorId) {
		self.contributor = contributor;
	}

	/// Adds a column; returns whether it was added.
	///
	/// Entities sharing a single table may map the same column, so a column
	/// of the same name and type is shared. One of another type is a
	/// duplicate registration by `contributor`.
	pub fn add_column(&mut self, column: Column, contributor: &ContributorId) -> Result<bool> {
		match self.columns.get(&column.name) {
			None => {
				self.columns.insert(column.name.clone(), column);
				Ok(true)
			}
			Some(existing) if existing.type_code == column.type_code && existing.sql_type == column.sql_type => {
				Ok(false)
			}
			Some(_) => Err(BuildError::DuplicateRegistration {
				kind: "column",
				key: format!("{}.{}", self.name, column.name),
				contributor: contributor.clone(),
			}),
		}
	}

	/// Builder form for a fresh table; replaces a column of the same name.
	pub fn with_column(mut self, column: Column) -> Self {
		self.columns.insert(column.name.clone(), column);
		self
	}

	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.get(name)
	}

	pub fn columns(&self) -> impl Iterator<Item = &Column> {
		self.columns.values()
	}

	pub fn set_primary_key(&mut self, columns: Vec<String>) {
		self.primary_key = columns;
	}

	pub fn primary_key(&self) -> &[String] {
		&self.primary_key
	}

	/// Adds a foreign key unless an identical one exists.
	pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) {
		if !self.foreign_keys.contains(&foreign_key) {
			self.foreign_keys.push(foreign_key);
		}
	}

	pub fn foreign_keys(&self) -> &[ForeignKey] {
		&self.foreign_keys
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
	pub name: QualifiedName,
	pub initial_value: i64,
	pub increment: i32,
}

impl Sequence {
	pub fn new(name: QualifiedName) -> Self {
		Self {
			name,
			initial_value: 1,
			increment: 50,
		}
	}
}
