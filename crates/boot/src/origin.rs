use std::borrow::Cow;
use std::fmt;

/// Where a source came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginKind {
	File,
	Resource,
	Url,
	InputStream,
	/// Declarative metadata attached to a class.
	Declared,
	Other,
}

impl fmt::Display for OriginKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::File => "file",
			Self::Resource => "resource",
			Self::Url => "url",
			Self::InputStream => "input_stream",
			Self::Declared => "declared",
			Self::Other => "other",
		})
	}
}

/// Provenance of a source, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
	pub kind: OriginKind,
	pub name: Option<String>,
}

impl Origin {
	pub fn new(kind: OriginKind, name: impl Into<String>) -> Self {
		Self {
			kind,
			name: Some(name.into()),
		}
	}

	pub fn unnamed(kind: OriginKind) -> Self {
		Self { kind, name: None }
	}

	pub fn resource(name: impl Into<String>) -> Self {
		Self::new(OriginKind::Resource, name)
	}

	pub fn declared(class_name: impl Into<String>) -> Self {
		Self::new(OriginKind::Declared, class_name)
	}
}

impl fmt::Display for Origin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.name {
			Some(name) => write!(f, "{}:{name}", self.kind),
			None => write!(f, "{}", self.kind),
		}
	}
}

/// Identity of the party that produced a source or registration.
///
/// The primary pipeline is `orm`; plugins are identified by their name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContributorId(Cow<'static, str>);

impl ContributorId {
	pub const ORM: Self = Self(Cow::Borrowed("orm"));

	pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
		Self(name.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_orm(&self) -> bool {
		*self == Self::ORM
	}
}

impl Default for ContributorId {
	fn default() -> Self {
		Self::ORM
	}
}

impl fmt::Display for ContributorId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
