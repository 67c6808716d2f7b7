use serde::Deserialize;
use serde_json::Deserializer;
use serde_path_to_error::deserialize;
use tracing::trace;
use crate::error::SchemaError;
use crate::schema::{
    Deprecation, EnumType, EnumValue, Field, InputObjectType, InputValue, InterfaceType, ObjectType,
    ScalarType, Schema, TypeDefinition, TypeRef, UnionType,
};

const INTROSPECTION_PREFIX: &str = "__";

/// Parses the JSON body of an introspection query response into a
/// validated [`Schema`].
pub fn from_response_body(response_body: &str) -> Result<Schema, SchemaError> {
    let deserializer = &mut Deserializer::from_str(response_body);
    let response: IntrospectionQueryResponse = deserialize(deserializer)
        .map_err(|error| SchemaError::MalformedInput(format!("{} at `{}`", error.inner(), error.path())))?;

    let data = match (response.data, response.errors) {
        (Some(data), _) => data,
        (None, Some(errors)) => {
            let messages: Vec<String> = errors.into_iter().map(|error| error.message).collect();
            return Err(SchemaError::MalformedInput(format!(
                "introspection failed: {}",
                messages.join("; ")
            )));
        }
        (None, None) => {
            return Err(SchemaError::MalformedInput("response contains no data".to_string()));
        }
    };
    let schema = data.schema;

    let mut builder = Schema::builder();
    if let Some(query) = schema.query_type {
        builder.query_type(query.name);
    }
    if let Some(mutation) = schema.mutation_type {
        builder.mutation_type(mutation.name);
    }
    if let Some(subscription) = schema.subscription_type {
        builder.subscription_type(subscription.name);
    }

    for full_type in schema.types {
        if full_type.name().starts_with(INTROSPECTION_PREFIX) {
            trace!(name = full_type.name(), "introspection type skipped");
            continue;
        }
        builder.add_type(to_type_definition(full_type)?)?;
    }
    builder.build()
}

#[derive(Deserialize)]
struct IntrospectionQueryResponse {
    data: Option<SchemaData>,
    errors: Option<Vec<ResponseError>>,
}

#[derive(Deserialize)]
struct ResponseError {
    message: String,
}

#[derive(Deserialize)]
struct SchemaData {
    #[serde(rename = "__schema")]
    schema: IntrospectionSchema,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionSchema {
    query_type: Option<NamedRef>,
    mutation_type: Option<NamedRef>,
    subscription_type: Option<NamedRef>,
    types: Vec<FullType>,
}

#[derive(Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Deserialize)]
#[serde(tag = "kind")]
enum FullType {
    #[serde(rename = "OBJECT")]
    Object {
        name: String,
        description: Option<String>,
        fields: Option<Vec<IntrospectionField>>,
        interfaces: Option<Vec<NamedRef>>,
    },
    #[serde(rename = "INTERFACE")]
    Interface {
        name: String,
        description: Option<String>,
        fields: Option<Vec<IntrospectionField>>,
        interfaces: Option<Vec<NamedRef>>,
    },
    #[serde(rename = "UNION")]
    Union {
        name: String,
        description: Option<String>,
        #[serde(rename = "possibleTypes")]
        possible_types: Option<Vec<NamedRef>>,
    },
    #[serde(rename = "ENUM")]
    Enum {
        name: String,
        description: Option<String>,
        #[serde(rename = "enumValues")]
        enum_values: Option<Vec<IntrospectionEnumValue>>,
    },
    #[serde(rename = "INPUT_OBJECT")]
    InputObject {
        name: String,
        description: Option<String>,
        #[serde(rename = "inputFields")]
        input_fields: Option<Vec<IntrospectionInputValue>>,
    },
    #[serde(rename = "SCALAR")]
    Scalar {
        name: String,
        description: Option<String>,
    },
}

impl FullType {
    fn name(&self) -> &str {
        match self {
            FullType::Object { name, .. }
            | FullType::Interface { name, .. }
            | FullType::Union { name, .. }
            | FullType::Enum { name, .. }
            | FullType::InputObject { name, .. }
            | FullType::Scalar { name, .. } => name,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionField {
    name: String,
    description: Option<String>,
    #[serde(default)]
    args: Vec<IntrospectionInputValue>,
    #[serde(rename = "type")]
    field_type: IntrospectionTypeRef,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionInputValue {
    name: String,
    description: Option<String>,
    #[serde(rename = "type")]
    input_type: IntrospectionTypeRef,
    default_value: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionEnumValue {
    name: String,
    description: Option<String>,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "kind")]
enum IntrospectionTypeRef {
    #[serde(rename = "NON_NULL")]
    NonNull {
        #[serde(rename = "ofType")]
        of_type: Box<IntrospectionTypeRef>,
    },
    #[serde(rename = "LIST")]
    List {
        #[serde(rename = "ofType")]
        of_type: Box<IntrospectionTypeRef>,
    },
    #[serde(rename = "SCALAR")]
    Scalar { name: String },
    #[serde(rename = "OBJECT")]
    Object { name: String },
    #[serde(rename = "INTERFACE")]
    Interface { name: String },
    #[serde(rename = "UNION")]
    Union { name: String },
    #[serde(rename = "ENUM")]
    Enum { name: String },
    #[serde(rename = "INPUT_OBJECT")]
    InputObject { name: String },
}

fn to_type_definition(full_type: FullType) -> Result<TypeDefinition, SchemaError> {
    let definition = match full_type {
        FullType::Object { name, description, fields, interfaces } => TypeDefinition::Object(ObjectType {
            fields: to_fields(&name, fields)?,
            interfaces: to_names(interfaces),
            name,
            description,
        }),
        FullType::Interface { name, description, fields, interfaces } => {
            TypeDefinition::Interface(InterfaceType {
                fields: to_fields(&name, fields)?,
                interfaces: to_names(interfaces),
                name,
                description,
            })
        }
        FullType::Union { name, description, possible_types } => TypeDefinition::Union(UnionType {
            name,
            description,
            members: to_names(possible_types),
        }),
        FullType::Enum { name, description, enum_values } => TypeDefinition::Enum(EnumType {
            name,
            description,
            values: enum_values
                .unwrap_or_default()
                .into_iter()
                .map(|value| EnumValue {
                    deprecation: to_deprecation(value.is_deprecated, value.deprecation_reason),
                    name: value.name,
                    description: value.description,
                })
                .collect(),
        }),
        FullType::InputObject { name, description, input_fields } => {
            TypeDefinition::InputObject(InputObjectType {
                fields: to_input_values(&name, input_fields.unwrap_or_default())?,
                name,
                description,
            })
        }
        FullType::Scalar { name, description } => TypeDefinition::Scalar(ScalarType { name, description }),
    };
    Ok(definition)
}

fn to_names(refs: Option<Vec<NamedRef>>) -> Vec<String> {
    refs.unwrap_or_default().into_iter().map(|named| named.name).collect()
}

fn to_fields(type_name: &str, fields: Option<Vec<IntrospectionField>>) -> Result<Vec<Field>, SchemaError> {
    fields
        .unwrap_or_default()
        .into_iter()
        .map(|field| {
            let from = format!("{}.{}", type_name, field.name);
            Ok(Field {
                arguments: to_input_values(&from, field.args)?,
                field_type: to_type_ref(&from, &field.field_type)?,
                deprecation: to_deprecation(field.is_deprecated, field.deprecation_reason),
                name: field.name,
                description: field.description,
            })
        })
        .collect()
}

fn to_input_values(owner: &str, values: Vec<IntrospectionInputValue>) -> Result<Vec<InputValue>, SchemaError> {
    values
        .into_iter()
        .map(|value| {
            let from = format!("{}.{}", owner, value.name);
            Ok(InputValue {
                value_type: to_type_ref(&from, &value.input_type)?,
                name: value.name,
                description: value.description,
                default_value: value.default_value,
            })
        })
        .collect()
}

fn to_deprecation(is_deprecated: bool, reason: Option<String>) -> Option<Deprecation> {
    is_deprecated.then_some(Deprecation { reason })
}

fn to_type_ref(from: &str, type_ref: &IntrospectionTypeRef) -> Result<TypeRef, SchemaError> {
    match type_ref {
        IntrospectionTypeRef::NonNull { of_type } => {
            if let IntrospectionTypeRef::NonNull { .. } = **of_type {
                return Err(SchemaError::MalformedInput(format!(
                    "`{}` wraps a non-null type in another non-null",
                    from
                )));
            }
            Ok(TypeRef::non_null(to_type_ref(from, of_type)?))
        }
        IntrospectionTypeRef::List { of_type } => Ok(TypeRef::list(to_type_ref(from, of_type)?)),
        IntrospectionTypeRef::Scalar { name }
        | IntrospectionTypeRef::Object { name }
        | IntrospectionTypeRef::Interface { name }
        | IntrospectionTypeRef::Union { name }
        | IntrospectionTypeRef::Enum { name }
        | IntrospectionTypeRef::InputObject { name } => Ok(TypeRef::named(name.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeKind;

    const RESPONSE: &str = r#"{
        "data": {
            "__schema": {
                "queryType": { "name": "Query" },
                "mutationType": null,
                "subscriptionType": null,
                "types": [
                    {
                        "kind": "OBJECT",
                        "name": "Query",
                        "description": null,
                        "fields": [
                            {
                                "name": "users",
                                "description": "All users",
                                "args": [
                                    {
                                        "name": "first",
                                        "description": null,
                                        "type": { "kind": "SCALAR", "name": "Int", "ofType": null },
                                        "defaultValue": "10"
                                    }
                                ],
                                "type": {
                                    "kind": "NON_NULL", "name": null,
                                    "ofType": {
                                        "kind": "LIST", "name": null,
                                        "ofType": { "kind": "OBJECT", "name": "User", "ofType": null }
                                    }
                                },
                                "isDeprecated": false,
                                "deprecationReason": null
                            }
                        ],
                        "inputFields": null,
                        "interfaces": [],
                        "enumValues": null,
                        "possibleTypes": null
                    },
                    {
                        "kind": "OBJECT",
                        "name": "User",
                        "description": null,
                        "fields": [
                            {
                                "name": "role",
                                "description": null,
                                "args": [],
                                "type": { "kind": "ENUM", "name": "Role", "ofType": null },
                                "isDeprecated": true,
                                "deprecationReason": "Use roles"
                            }
                        ],
                        "inputFields": null,
                        "interfaces": [],
                        "enumValues": null,
                        "possibleTypes": null
                    },
                    {
                        "kind": "ENUM",
                        "name": "Role",
                        "description": null,
                        "fields": null,
                        "inputFields": null,
                        "interfaces": null,
                        "enumValues": [
                            { "name": "ADMIN", "description": null, "isDeprecated": false, "deprecationReason": null }
                        ],
                        "possibleTypes": null
                    },
                    { "kind": "SCALAR", "name": "String", "description": null },
                    {
                        "kind": "OBJECT",
                        "name": "__Type",
                        "description": null,
                        "fields": [],
                        "interfaces": []
                    }
                ]
            }
        }
    }"#;

    #[test]
    fn response_is_converted_to_schema() {
        let schema = from_response_body(RESPONSE).unwrap();
        assert_eq!(schema.query_type(), "Query");
        assert_eq!(schema.kind_of("Role"), Some(TypeKind::Enum));
        assert!(schema.get("__Type").is_none());

        let users = &schema.object("Query").unwrap().fields[0];
        assert_eq!(users.field_type.to_string(), "[User]!");
        assert_eq!(users.arguments[0].default_value.as_deref(), Some("10"));

        let role = &schema.object("User").unwrap().fields[0];
        assert_eq!(role.deprecation, Some(Deprecation { reason: Some("Use roles".to_string()) }));
    }

    #[test]
    fn invalid_json_reports_path() {
        let body = r#"{ "data": { "__schema": { "types": [ { "kind": "OBJECT", "name": 5 } ] } } }"#;
        let SchemaError::MalformedInput(message) = from_response_body(body).unwrap_err() else {
            panic!("expected malformed input");
        };
        assert!(message.contains("types"), "{message}");
    }

    #[test]
    fn errors_without_data_are_reported() {
        let body = r#"{ "errors": [ { "message": "introspection disabled" } ] }"#;
        let error = from_response_body(body).unwrap_err();
        assert_eq!(
            error,
            SchemaError::MalformedInput("introspection failed: introspection disabled".to_string())
        );
    }

    #[test]
    fn double_non_null_is_rejected() {
        let body = r#"{ "data": { "__schema": {
            "queryType": { "name": "Query" },
            "types": [ {
                "kind": "OBJECT", "name": "Query", "interfaces": [],
                "fields": [ { "name": "a", "args": [], "type": {
                    "kind": "NON_NULL", "ofType": { "kind": "NON_NULL", "ofType": { "kind": "SCALAR", "name": "Int" } }
                } } ]
            } ]
        } } }"#;
        assert!(matches!(from_response_body(body), Err(SchemaError::MalformedInput(_))));
    }
}
