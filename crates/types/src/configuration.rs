use tracing::debug;

use crate::{BasicType, BasicTypeRegistry, DdlTypeRegistry, JdbcTypeRegistry, value};

/// The three registries making up one build's type system.
#[derive(Debug, Clone, Default)]
pub struct TypeConfiguration {
	jdbc: JdbcTypeRegistry,
	ddl: DdlTypeRegistry,
	basic: BasicTypeRegistry,
}

impl TypeConfiguration {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn jdbc(&self) -> &JdbcTypeRegistry {
		&self.jdbc
	}

	pub fn jdbc_mut(&mut self) -> &mut JdbcTypeRegistry {
		&mut self.jdbc
	}

	pub fn ddl(&self) -> &DdlTypeRegistry {
		&self.ddl
	}

	pub fn ddl_mut(&mut self) -> &mut DdlTypeRegistry {
		&mut self.ddl
	}

	pub fn basic(&self) -> &BasicTypeRegistry {
		&self.basic
	}

	pub fn basic_mut(&mut self) -> &mut BasicTypeRegistry {
		&mut self.basic
	}

	/// Registers a basic type for every standard value type whose code resolves.
	///
	/// Value types whose code has neither a native descriptor nor a fallback
	/// are skipped.
	pub fn register_standard_basic_types(&mut self) {
		for (name, value_type) in value::STANDARD {
			match self.jdbc.find_descriptor(value_type.default_code) {
				Some(jdbc) => {
					let basic = BasicType::new(*name, *value_type, jdbc.clone());
					self.basic.register(basic, &[]);
				}
				None => debug!(basic = name, code = %value_type.default_code, "no descriptor; basic type skipped"),
			}
		}
	}
}
