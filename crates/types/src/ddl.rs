use std::borrow::Cow;
use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;

use crate::{Result, SqlTypeCode, TypeError};

/// Column size parameters substituted into DDL templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
	pub length: Option<u64>,
	pub precision: Option<u32>,
	pub scale: Option<i32>,
}

impl Size {
	pub const DEFAULT_LENGTH: u64 = 255;
	pub const DEFAULT_PRECISION: u32 = 19;
	pub const DEFAULT_SCALE: i32 = 2;

	pub fn length(length: u64) -> Self {
		Self {
			length: Some(length),
			..Self::default()
		}
	}

	pub fn precision(precision: u32, scale: i32) -> Self {
		Self {
			precision: Some(precision),
			scale: Some(scale),
			..Self::default()
		}
	}
}

/// DDL type-name template for one type code.
///
/// Templates use `$l` for length, `$p` for precision and `$s` for scale,
/// e.g. `varchar($l)` or `numeric($p,$s)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlType {
	code: SqlTypeCode,
	template: Cow<'static, str>,
	max_length: Option<u64>,
}

impl DdlType {
	pub fn new(code: SqlTypeCode, template: impl Into<Cow<'static, str>>) -> Self {
		Self {
			code,
			template: template.into(),
			max_length: None,
		}
	}

	/// Largest length the platform accepts for this type.
	pub fn with_max_length(mut self, max_length: u64) -> Self {
		self.max_length = Some(max_length);
		self
	}

	pub fn code(&self) -> SqlTypeCode {
		self.code
	}

	pub fn template(&self) -> &str {
		&self.template
	}

	pub fn type_name(&self, size: Size) -> String {
		self.template
			.replace("$l", &size.length.unwrap_or(Size::DEFAULT_LENGTH).to_string())
			.replace("$p", &size.precision.unwrap_or(Size::DEFAULT_PRECISION).to_string())
			.replace("$s", &size.scale.unwrap_or(Size::DEFAULT_SCALE).to_string())
	}

	/// Type name at the largest supported length.
	pub fn largest_type_name(&self) -> String {
		self.type_name(Size {
			length: Some(self.max_length.unwrap_or(Size::DEFAULT_LENGTH)),
			..Size::default()
		})
	}
}

#[derive(Debug, Clone, Default)]
pub struct DdlTypeRegistry {
	descriptors: HashMap<SqlTypeCode, Arc<DdlType>>,
}

impl DdlTypeRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_descriptor(&mut self, descriptor: DdlType) -> Option<Arc<DdlType>> {
		self.descriptors.insert(descriptor.code(), Arc::new(descriptor))
	}

	pub fn add_descriptor_if_absent(&mut self, descriptor: DdlType) -> bool {
		if self.descriptors.contains_key(&descriptor.code()) {
			return false;
		}
		self.descriptors.insert(descriptor.code(), Arc::new(descriptor));
		true
	}

	pub fn descriptor(&self, code: SqlTypeCode) -> Option<&Arc<DdlType>> {
		self.descriptors.get(&code)
	}

	pub fn type_name(&self, code: SqlTypeCode, size: Size) -> Result<String> {
		self.descriptors
			.get(&code)
			.map(|ddl| ddl.type_name(size))
			.ok_or(TypeError::UnknownTypeCode(code))
	}

	pub fn largest_type_name(&self, code: SqlTypeCode) -> Option<String> {
		self.descriptors.get(&code).map(|ddl| ddl.largest_type_name())
	}

	pub fn len(&self) -> usize {
		self.descriptors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.descriptors.is_empty()
	}
}
