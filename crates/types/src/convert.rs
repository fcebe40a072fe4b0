/// An attribute converter known to the build.
///
/// Converters translate between a domain value type and the relational type a
/// column stores. Auto-applied converters bind to every attribute whose value
/// type matches `domain_type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConverterDescriptor {
	pub name: String,
	pub domain_type: String,
	pub relational_type: String,
	pub auto_apply: bool,
}

impl ConverterDescriptor {
	pub fn new(name: impl Into<String>, domain_type: impl Into<String>, relational_type: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			domain_type: domain_type.into(),
			relational_type: relational_type.into(),
			auto_apply: false,
		}
	}

	pub fn auto_apply(mut self) -> Self {
		self.auto_apply = true;
		self
	}
}
