//! Mapping of GraphQL scalars to TypeScript types.

use std::collections::BTreeMap;
use crate::error::UnknownScalarError;

/// Wire scalar name to TypeScript type name, supplied once per compilation.
pub type ScalarOverrides = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinScalar {
    Id,
    String,
    Int,
    Float,
    Boolean,
}

impl BuiltinScalar {
    pub fn from_name(name: &str) -> Option<BuiltinScalar> {
        match name {
            "ID" => Some(BuiltinScalar::Id),
            "String" => Some(BuiltinScalar::String),
            "Int" => Some(BuiltinScalar::Int),
            "Float" => Some(BuiltinScalar::Float),
            "Boolean" => Some(BuiltinScalar::Boolean),
            _ => None,
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            BuiltinScalar::Id => "ID",
            BuiltinScalar::String => "String",
            BuiltinScalar::Int => "Int",
            BuiltinScalar::Float => "Float",
            BuiltinScalar::Boolean => "Boolean",
        }
    }

    fn default_target(self) -> &'static str {
        match self {
            BuiltinScalar::Id | BuiltinScalar::String => "string",
            BuiltinScalar::Int | BuiltinScalar::Float => "number",
            BuiltinScalar::Boolean => "boolean",
        }
    }
}

/// How values of a scalar cross the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarCodec {
    /// Checked and passed through by the runtime.
    Builtin(BuiltinScalar),
    /// Converted by the caller-provided codec registered under the wire name.
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetType {
    pub type_name: String,
    pub codec: ScalarCodec,
}

/// Resolves a scalar. An override for a built-in only changes the emitted
/// type name, the value is still handled as that built-in.
pub fn resolve(scalar_name: &str, overrides: &ScalarOverrides) -> Result<TargetType, UnknownScalarError> {
    let overridden = overrides.get(scalar_name);
    match BuiltinScalar::from_name(scalar_name) {
        Some(builtin) => Ok(TargetType {
            type_name: overridden
                .cloned()
                .unwrap_or_else(|| builtin.default_target().to_string()),
            codec: ScalarCodec::Builtin(builtin),
        }),
        None => match overridden {
            Some(type_name) => Ok(TargetType {
                type_name: type_name.clone(),
                codec: ScalarCodec::Custom(scalar_name.to_string()),
            }),
            None => Err(UnknownScalarError(scalar_name.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(entries: &[(&str, &str)]) -> ScalarOverrides {
        entries
            .iter()
            .map(|(name, target)| (name.to_string(), target.to_string()))
            .collect()
    }

    #[test]
    fn built_ins_resolve_without_overrides() {
        let empty = ScalarOverrides::new();
        assert_eq!(resolve("Int", &empty).unwrap().type_name, "number");
        assert_eq!(resolve("ID", &empty).unwrap().type_name, "string");
        assert_eq!(resolve("Boolean", &empty).unwrap().type_name, "boolean");
    }

    #[test]
    fn built_in_override_keeps_codec() {
        let target = resolve("ID", &overrides(&[("ID", "EntityId")])).unwrap();
        assert_eq!(target.type_name, "EntityId");
        assert_eq!(target.codec, ScalarCodec::Builtin(BuiltinScalar::Id));
    }

    #[test]
    fn custom_scalar_requires_override() {
        let empty = ScalarOverrides::new();
        assert_eq!(resolve("DateTime", &empty), Err(UnknownScalarError("DateTime".to_string())));

        let target = resolve("DateTime", &overrides(&[("DateTime", "Date")])).unwrap();
        assert_eq!(target.type_name, "Date");
        assert_eq!(target.codec, ScalarCodec::Custom("DateTime".to_string()));
    }
}
