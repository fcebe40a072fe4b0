//! Type-system setup: platform seeding, contributor overrides, preferences
//! and fallbacks.
//!
//! # Resolution Order
//!
//! 1. Platform seeds native descriptors.
//! 2. The platform's UUID, ARRAY and INTERVAL_SECOND slots are captured.
//! 3. Type contributors run.
//! 4. Each captured slot is redirected to its preferred code's descriptor if
//!    the slot is still the captured `Arc`; otherwise, when no preference is
//!    configured, a fallback fills the slot if empty.
//! 5. Structured, JSON/XML and materialized LOB fallbacks, then DDL fallbacks.
//! 6. Standard and application basic types.
//! 7. Time-zone storage override and instant preference.
//!
//! # Invariants
//!
//! - A contributor override is never replaced by a preference.
//!   - Enforced in: [`adapt_to_preferred`]
//!   - Tested by: `tests::contributor_uuid_override_survives_preference`
//!   - Failure symptom: custom UUID binding silently replaced by CHAR.
//! - Fallbacks never overwrite a registered slot.
//!   - Enforced in: [`add_fallback_if_necessary`]
//!   - Tested by: `tests::fallback_keeps_existing_registration`
//!   - Failure symptom: native INET descriptor replaced by VARBINARY.

use std::sync::Arc;

use keel_config::Settings;
use tracing::{debug, trace};

use crate::{
	BasicType, ConverterDescriptor, DdlType, JdbcType, Platform, Result, SqlTypeCode, TypeConfiguration,
	TypeContributions, TypeContributor, TypeError, TypeOptions, jdbc::standard_descriptor, value,
};


/// Seeds and reconciles `configuration` for one build.
///
/// Returns the attribute converters contributed by type contributors, in
/// contribution order.
pub fn handle_types(
	configuration: &mut TypeConfiguration,
	platform: &dyn Platform,
	contributors: &[Arc<dyn TypeContributor>],
	options: &TypeOptions,
	settings: &Settings,
) -> Result<Vec<ConverterDescriptor>> {
	debug!(platform = platform.name(), contributors = contributors.len(), "type setup");
	platform.contribute_types(configuration);

	let jdbc = configuration.jdbc();
	let platform_uuid = jdbc.find_descriptor(SqlTypeCode::UUID).cloned();
	let platform_array = jdbc.find_descriptor(SqlTypeCode::ARRAY).cloned();
	let platform_interval = jdbc.find_descriptor(SqlTypeCode::INTERVAL_SECOND).cloned();

	let mut converters = Vec::new();
	for contributor in contributors {
		trace!(contributor = contributor.name(), "type contributor");
		let mut contributions = TypeContributions::new(configuration);
		contributor.contribute(&mut contributions, settings)?;
		converters.extend(contributions.into_converters());
	}

	let preferences = [
		(SqlTypeCode::UUID, platform_uuid, options.preferred_uuid, SqlTypeCode::BINARY),
		(
			SqlTypeCode::ARRAY,
			platform_array,
			options.preferred_array,
			SqlTypeCode::VARBINARY,
		),
		(
			SqlTypeCode::INTERVAL_SECOND,
			platform_interval,
			options.preferred_duration,
			SqlTypeCode::NUMERIC,
		),
	];
	for (code, captured, preferred, fallback) in preferences {
		if preferred != code {
			adapt_to_preferred(configuration, code, captured.as_ref(), preferred)?;
		} else {
			add_fallback_if_necessary(configuration, code, fallback);
		}
	}

	add_fallback_if_necessary(configuration, SqlTypeCode::INET, SqlTypeCode::VARBINARY);
	add_fallback_if_necessary(configuration, SqlTypeCode::GEOMETRY, SqlTypeCode::VARBINARY);
	add_fallback_if_necessary(configuration, SqlTypeCode::POINT, SqlTypeCode::VARBINARY);
	add_fallback_if_necessary(configuration, SqlTypeCode::GEOGRAPHY, SqlTypeCode::GEOMETRY);

	for code in [SqlTypeCode::JSON, SqlTypeCode::SQLXML] {
		if let Some(descriptor) = standard_descriptor(code)
			&& !configuration.jdbc().has_registered_descriptor(code)
		{
			configuration.jdbc_mut().add_descriptor_for(code, descriptor.into_shared());
		}
	}

	add_fallback_if_necessary(configuration, SqlTypeCode::MATERIALIZED_BLOB, SqlTypeCode::BLOB);
	add_fallback_if_necessary(configuration, SqlTypeCode::MATERIALIZED_CLOB, SqlTypeCode::CLOB);
	add_fallback_if_necessary(configuration, SqlTypeCode::MATERIALIZED_NCLOB, SqlTypeCode::NCLOB);

	add_ddl_fallbacks(configuration);

	configuration.register_standard_basic_types();
	for registration in &options.basic_type_registrations {
		configuration.basic_mut().register(registration.basic.clone(), &registration.keys);
	}

	if let Some(code) = options.time_zone_storage.override_code() {
		let jdbc = configuration.jdbc().resolve(code)?;
		for (name, value_type) in value::STANDARD.iter().filter(|(_, v)| v.zoned) {
			debug!(basic = name, code = %code, "time-zone storage override");
			configuration
				.basic_mut()
				.register(BasicType::new(*name, *value_type, Arc::clone(&jdbc)), &[]);
		}
	}

	if options.preferred_instant != SqlTypeCode::TIMESTAMP_UTC {
		let jdbc = preferred_descriptor(configuration, SqlTypeCode::TIMESTAMP_UTC, options.preferred_instant)?;
		configuration
			.basic_mut()
			.register(BasicType::new("instant", value::INSTANT, jdbc), &[]);
	}

	Ok(converters)
}

/// Redirects `code`'s slot to `preferred`'s descriptor while the slot still
/// holds what the platform registered.
fn adapt_to_preferred(
	configuration: &mut TypeConfiguration,
	code: SqlTypeCode,
	captured: Option<&Arc<JdbcType>>,
	preferred: SqlTypeCode,
) -> Result<()> {
	let current = configuration.jdbc().find_descriptor(code);
	let untouched = match (captured, current) {
		(Some(captured), Some(current)) => Arc::ptr_eq(captured, current),
		(None, None) => true,
		_ => false,
	};
	if !untouched {
		debug!(code = %code, preferred = %preferred, "slot overridden by contributor; preference ignored");
		return Ok(());
	}

	let descriptor = preferred_descriptor(configuration, code, preferred)?;
	configuration.jdbc_mut().add_descriptor_for(code, descriptor);
	Ok(())
}

fn preferred_descriptor(
	configuration: &TypeConfiguration,
	code: SqlTypeCode,
	preferred: SqlTypeCode,
) -> Result<Arc<JdbcType>> {
	configuration
		.jdbc()
		.find_descriptor(preferred)
		.cloned()
		.ok_or(TypeError::MissingPreferredDescriptor { code, preferred })
}

fn add_fallback_if_necessary(configuration: &mut TypeConfiguration, code: SqlTypeCode, fallback: SqlTypeCode) {
	let jdbc = configuration.jdbc();
	if jdbc.has_registered_descriptor(code) {
		return;
	}
	match jdbc.find_descriptor(fallback).cloned() {
		Some(descriptor) => {
			configuration.jdbc_mut().add_descriptor_for(code, descriptor);
		}
		None => debug!(code = %code, fallback = %fallback, "fallback target unregistered; skipped"),
	}
}

fn add_ddl_fallbacks(configuration: &mut TypeConfiguration) {
	let ddl = configuration.ddl();
	let varchar = ddl.largest_type_name(SqlTypeCode::VARCHAR);
	let geometry = ddl.descriptor(SqlTypeCode::GEOMETRY).map(|g| g.template().to_string());

	let ddl = configuration.ddl_mut();
	if let Some(varchar) = varchar {
		ddl.add_descriptor_if_absent(DdlType::new(SqlTypeCode::JSON, varchar.clone()));
		ddl.add_descriptor_if_absent(DdlType::new(SqlTypeCode::SQLXML, varchar));
	}
	if let Some(geometry) = geometry {
		ddl.add_descriptor_if_absent(DdlType::new(SqlTypeCode::GEOGRAPHY, geometry));
	}
}
