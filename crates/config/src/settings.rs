use std::fmt;

use indexmap::IndexMap;

use crate::{ConfigError, Result};


/// A single raw setting value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
	Bool(bool),
	Int(i64),
	Str(String),
}

impl fmt::Display for SettingValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(b) => write!(f, "{b}"),
			Self::Int(i) => write!(f, "{i}"),
			Self::Str(s) => f.write_str(s),
		}
	}
}

impl From<bool> for SettingValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for SettingValue {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for SettingValue {
	fn from(value: i32) -> Self {
		Self::Int(value.into())
	}
}

impl From<&str> for SettingValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_string())
	}
}

impl From<String> for SettingValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

/// Named settings with typed, defaulting lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
	values: IndexMap<String, SettingValue>,
}

impl Settings {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses TOML text, flattening nested tables into dotted names.
	///
	/// Arrays of scalars are joined with `,` so they read back through
	/// [`Settings::get_list`].
	pub fn from_toml_str(text: &str) -> Result<Self> {
		let table: toml::Table = toml::from_str(text)?;
		let mut settings = Self::new();
		settings.flatten_table(None, table)?;
		Ok(settings)
	}

	fn flatten_table(&mut self, prefix: Option<&str>, table: toml::Table) -> Result<()> {
		for (key, value) in table {
			let name = match prefix {
				Some(prefix) => format!("{prefix}.{key}"),
				None => key,
			};
			match value {
				toml::Value::Table(nested) => self.flatten_table(Some(&name), nested)?,
				toml::Value::Array(items) => {
					let joined = items
						.into_iter()
						.map(|item| scalar_from_toml(&name, item).map(|v| v.to_string()))
						.collect::<Result<Vec<_>>>()?
						.join(",");
					self.values.insert(name, SettingValue::Str(joined));
				}
				other => {
					let scalar = scalar_from_toml(&name, other)?;
					self.values.insert(name, scalar);
				}
			}
		}
		Ok(())
	}

	/// Sets (or replaces) a setting.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<SettingValue>) -> &mut Self {
		self.values.insert(name.into(), value.into());
		self
	}

	/// Builder-style [`Settings::set`].
	pub fn with(mut self, name: impl Into<String>, value: impl Into<SettingValue>) -> Self {
		self.set(name, value);
		self
	}

	pub fn contains(&self, name: &str) -> bool {
		self.values.contains_key(name)
	}

	/// Returns the raw value without coercion.
	pub fn raw(&self, name: &str) -> Option<&SettingValue> {
		self.values.get(name)
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Returns the value rendered as a string, if present.
	pub fn get_string(&self, name: &str) -> Option<String> {
		self.values.get(name).map(ToString::to_string)
	}

	pub fn get_string_or(&self, name: &str, default: &str) -> String {
		self.get_string(name).unwrap_or_else(|| default.to_string())
	}

	/// Returns a discrete-valued setting, failing on anything other than
	/// `default` or one of `others`.
	pub fn get_choice(&self, name: &str, default: &str, others: &[&str]) -> Result<String> {
		let value = self.get_string_or(name, default);
		if value == default || others.contains(&value.as_str()) {
			return Ok(value);
		}
		Err(ConfigError::Unsupported {
			name: name.to_string(),
			value,
			allowed: std::iter::once(default).chain(others.iter().copied()).map(str::to_string).collect(),
		})
	}

	/// Returns a boolean setting. Strings are accepted as `true`/`false` in any case.
	pub fn get_bool(&self, name: &str, default: bool) -> Result<bool> {
		match self.values.get(name) {
			None => Ok(default),
			Some(SettingValue::Bool(b)) => Ok(*b),
			Some(SettingValue::Str(s)) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
			Some(SettingValue::Str(s)) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
			Some(other) => Err(coercion(name, other, "boolean")),
		}
	}

	pub fn get_int(&self, name: &str, default: i32) -> Result<i32> {
		Ok(self.get_integer(name)?.unwrap_or(default))
	}

	/// Returns an optional integer setting. Blank strings count as absent.
	pub fn get_integer(&self, name: &str) -> Result<Option<i32>> {
		let Some(value) = self.values.get(name) else {
			return Ok(None);
		};
		match value {
			SettingValue::Int(i) => i32::try_from(*i).map(Some).map_err(|_| coercion(name, value, "int")),
			SettingValue::Str(s) if s.trim().is_empty() => Ok(None),
			SettingValue::Str(s) => s.trim().parse().map(Some).map_err(|_| coercion(name, value, "int")),
			SettingValue::Bool(_) => Err(coercion(name, value, "int")),
		}
	}

	pub fn get_long(&self, name: &str, default: i64) -> Result<i64> {
		match self.values.get(name) {
			None => Ok(default),
			Some(SettingValue::Int(i)) => Ok(*i),
			Some(value @ SettingValue::Str(s)) => s.trim().parse().map_err(|_| coercion(name, value, "long")),
			Some(value) => Err(coercion(name, value, "long")),
		}
	}

	/// Splits a string setting on `delimiter`, trimming entries and dropping empties.
	pub fn get_list(&self, name: &str, delimiter: char) -> Vec<String> {
		self.get_string(name)
			.map(|raw| {
				raw.split(delimiter)
					.map(str::trim)
					.filter(|s| !s.is_empty())
					.map(str::to_string)
					.collect()
			})
			.unwrap_or_default()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
		self.values.iter().map(|(k, v)| (k.as_str(), v))
	}
}

fn coercion(name: &str, value: &SettingValue, target: &'static str) -> ConfigError {
	ConfigError::Coercion {
		name: name.to_string(),
		value: value.to_string(),
		target,
	}
}

fn scalar_from_toml(name: &str, value: toml::Value) -> Result<SettingValue> {
	match value {
		toml::Value::String(s) => Ok(SettingValue::Str(s)),
		toml::Value::Integer(i) => Ok(SettingValue::Int(i)),
		toml::Value::Boolean(b) => Ok(SettingValue::Bool(b)),
		toml::Value::Float(_) => Err(unsupported(name, "float")),
		toml::Value::Datetime(_) => Err(unsupported(name, "datetime")),
		toml::Value::Array(_) => Err(unsupported(name, "nested array")),
		toml::Value::Table(_) => Err(unsupported(name, "table in array")),
	}
}

fn unsupported(name: &str, kind: &'static str) -> ConfigError {
	ConfigError::UnsupportedToml {
		name: name.to_string(),
		kind,
	}
}
