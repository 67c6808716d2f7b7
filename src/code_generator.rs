use std::collections::HashSet;
use tracing::debug;
use crate::code_writer::CodeFile;
use crate::options::CompileOptions;
use crate::resolver::{
    BaseType, CompositeKind, EmissionPlan, PlanItem, ResolvedComposite, ResolvedEnum, ResolvedField,
    ResolvedInputObject, ResolvedInputValue, ResolvedOperation, ResolvedScalar, TypeSignature,
    RUNTIME_IMPORTS, SCALARS_INTERFACE,
};
use crate::scalars::ScalarCodec;
use crate::schema::Deprecation;

pub const SCHEMA_FILE_NAME: &str = "schema.ts";

const GENERATED_HEADER: &str = "// Generated by graphql-freeze. Do not edit, changes will be overwritten.";

const RESERVED_MEMBERS: &[&str] = &["constructor", "with", "decode", "fields", "typeName"];

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub content: String,
}

pub fn generate(plan: &EmissionPlan<'_>, options: &CompileOptions) -> Vec<Artifact> {
    let mut file = CodeFile::new(&options.code_file_options());
    file.line(GENERATED_HEADER);
    file.line(&format!(
        "import {{ {} }} from \"{}\"",
        RUNTIME_IMPORTS.join(", "),
        options.runtime_package
    ));

    let scalars: Vec<&ResolvedScalar<'_>> = plan
        .items
        .iter()
        .filter_map(|item| match item {
            PlanItem::Scalar(scalar) => Some(scalar),
            _ => None,
        })
        .collect();
    write_scalars(&mut file, &scalars);

    let mut emitted_roots = HashSet::new();
    for item in &plan.items {
        match item {
            PlanItem::Scalar(_) => (),
            PlanItem::Enum(enum_def) => write_enum(&mut file, enum_def),
            PlanItem::InputObject(input) => write_input_object(&mut file, input),
            PlanItem::Composite(composite) => write_selection(&mut file, composite),
            PlanItem::Operation(operation) => {
                if emitted_roots.insert(operation.root.name) {
                    write_selection(&mut file, &operation.root);
                }
                write_operation(&mut file, operation);
            }
        }
    }

    let content = file.build_string();
    debug!(file = SCHEMA_FILE_NAME, bytes = content.len(), "artifact generated");
    vec![Artifact {
        file_name: SCHEMA_FILE_NAME.to_string(),
        content,
    }]
}

fn write_scalars(file: &mut CodeFile, scalars: &[&ResolvedScalar<'_>]) {
    file.blank_line();
    file.begin_indent(&format!("export interface {} {{", SCALARS_INTERFACE));
    for scalar in scalars {
        file.doc_comment(&doc_lines(scalar.definition.description.as_deref(), None, None));
        file.line(&format!(
            "{}: Scalar<{}>",
            scalar.definition.name, scalar.target.type_name
        ));
    }
    file.end_indent("}");
}

fn write_enum(file: &mut CodeFile, enum_def: &ResolvedEnum<'_>) {
    let name = ts_identifier(&enum_def.target_name);
    file.blank_line();
    file.doc_comment(&doc_lines(enum_def.definition.description.as_deref(), None, None));
    file.begin_indent(&format!("export enum {} {{", name));
    for value in &enum_def.values {
        file.doc_comment(&doc_lines(
            value.value.description.as_deref(),
            value.value.deprecation.as_ref(),
            None,
        ));
        file.line(&format!(
            "{} = \"{}\",",
            ts_identifier(&value.target_name),
            value.value.name
        ));
    }
    file.end_indent("}");

    file.blank_line();
    file.begin_indent(&format!(
        "export function decode{}(value: unknown): {} {{",
        name, name
    ));
    file.line(&format!(
        "return decodeEnum(value, \"{}\", Object.values({}))",
        enum_def.definition.name, name
    ));
    file.end_indent("}");
}

fn write_input_object(file: &mut CodeFile, input: &ResolvedInputObject<'_>) {
    let name = ts_identifier(&input.target_name);
    file.blank_line();
    file.doc_comment(&doc_lines(input.definition.description.as_deref(), None, None));
    file.begin_indent(&format!("export interface {} {{", name));
    for field in &input.fields {
        file.doc_comment(&doc_lines(
            field.value.description.as_deref(),
            None,
            field.value.default_value.as_deref(),
        ));
        file.line(&input_member(field));
    }
    file.end_indent("}");

    file.blank_line();
    file.begin_indent(&format!(
        "export function encode{}(value: {}, scalars: {}): Record<string, unknown> {{",
        name, name, SCALARS_INTERFACE
    ));
    file.begin_indent("return encodeInput({");
    for field in &input.fields {
        let subject = format!("value.{}", ts_identifier(&field.key));
        file.line(&format!(
            "\"{}\": {},",
            field.value.name,
            encode_input_value(field, &subject)
        ));
    }
    file.end_indent("})");
    file.end_indent("}");
}

fn write_selection(file: &mut CodeFile, composite: &ResolvedComposite<'_>) {
    let class = selection_class(&composite.target_name);
    let (base_class, default_shape) = match composite.kind {
        CompositeKind::Object => ("ObjectSelection", "{}"),
        CompositeKind::Interface | CompositeKind::Union => ("AbstractSelection", "{ __typename: string }"),
    };

    file.blank_line();
    file.doc_comment(&doc_lines(composite.description, None, None));
    file.begin_indent(&format!(
        "export class {}<T = {}> extends {}<T> {{",
        class, default_shape, base_class
    ));
    file.begin_indent("constructor(entries: ReadonlyArray<SelectionEntry> = []) {");
    file.line(&format!("super(\"{}\", entries)", composite.name));
    file.end_indent("}");

    for field in &composite.fields {
        file.blank_line();
        write_field_method(file, &class, field);
    }

    for possible in &composite.possible_types {
        let key = member_name(&possible.key);
        let branch = selection_class(&possible.target_name);
        file.blank_line();
        let widened = format!("{}<T & {{ {}: S | null }}>", class, key);
        file.begin_indent(&format!(
            "{}<S>(select: (selection: {}) => Selection<S>): {} {{",
            key, branch, widened
        ));
        file.line(&format!("const nested = select(new {}())", branch));
        file.line(&format!(
            "return new {}(this.with(fragment(\"{}\", \"{}\", nested)))",
            widened, possible.name, key
        ));
        file.end_indent("}");
    }

    file.end_indent("}");
}

fn write_field_method(file: &mut CodeFile, class: &str, field: &ResolvedField<'_>) {
    let key = member_name(&field.key);
    let value_type = ts_type(&field.signature, &leaf_type(&field.base));

    let mut parameters = Vec::new();
    let nested_class = match &field.base {
        BaseType::Composite(target) => {
            let nested_class = selection_class(target);
            parameters.push(format!("select: (selection: {}) => Selection<S>", nested_class));
            Some(nested_class)
        }
        _ => None,
    };
    if !field.arguments.is_empty() {
        let all_optional = field.arguments.iter().all(ResolvedInputValue::is_optional);
        parameters.push(format!(
            "args: {}{}",
            arguments_type(&field.arguments),
            if all_optional { " = {}" } else { "" }
        ));
    }
    let generic = if nested_class.is_some() { "<S>" } else { "" };

    file.doc_comment(&doc_lines(
        field.field.description.as_deref(),
        field.field.deprecation.as_ref(),
        None,
    ));
    let widened = format!("{}<T & {{ {}: {} }}>", class, key, value_type);
    file.begin_indent(&format!(
        "{}{}({}): {} {{",
        key,
        generic,
        parameters.join(", "),
        widened
    ));
    if let Some(nested_class) = &nested_class {
        file.line(&format!("const nested = select(new {}())", nested_class));
    }
    let nested = if nested_class.is_some() { "nested" } else { "null" };
    let decode = convert(Direction::Decode, &field.signature, &field.base, "value");
    file.line(&format!(
        "return new {}(this.with(field(\"{}\", \"{}\", {}, {}, (value, scalars) => {})))",
        widened,
        field.field.name,
        key,
        argument_entries(&field.arguments),
        nested,
        decode
    ));
    file.end_indent("}");
}

fn write_operation(file: &mut CodeFile, operation: &ResolvedOperation<'_>) {
    let keyword = operation.kind.keyword();
    let class = selection_class(&operation.root.target_name);
    file.blank_line();
    file.doc_comment(&[format!(
        "Builds a named {} operation selecting fields of `{}`.",
        keyword, operation.root.name
    )]);
    file.begin_indent(&format!(
        "export function {}<T>(name: string, select: (selection: {}) => Selection<T>): Operation<T> {{",
        keyword, class
    ));
    file.line(&format!(
        "return operation(\"{}\", name, select(new {}()))",
        keyword, class
    ));
    file.end_indent("}");
}

fn input_member(value: &ResolvedInputValue<'_>) -> String {
    let key = ts_identifier(&value.key);
    let optional = if value.is_optional() { "?" } else { "" };
    format!(
        "{}{}: {}",
        key,
        optional,
        ts_type(&value.signature, &leaf_type(&value.base))
    )
}

fn arguments_type(arguments: &[ResolvedInputValue<'_>]) -> String {
    let members: Vec<String> = arguments.iter().map(input_member).collect();
    format!("{{ {} }}", members.join(", "))
}

fn argument_entries(arguments: &[ResolvedInputValue<'_>]) -> String {
    let entries: Vec<String> = arguments
        .iter()
        .map(|argument| {
            format!(
                "argument(\"{}\", \"{}\", args.{}, (value, scalars) => {})",
                argument.value.name,
                argument.value.value_type,
                ts_identifier(&argument.key),
                encode_input_value(argument, "value")
            )
        })
        .collect();
    format!("[{}]", entries.join(", "))
}

fn selection_class(target_name: &str) -> String {
    format!("{}Selection", ts_identifier(target_name))
}

fn leaf_type(base: &BaseType) -> String {
    match base {
        BaseType::Scalar(target) => target.type_name.clone(),
        BaseType::Enum(name) | BaseType::InputObject(name) => ts_identifier(name),
        BaseType::Composite(_) => "S".to_string(),
    }
}

fn ts_type(signature: &TypeSignature, leaf: &str) -> String {
    fn wrap(signature: &TypeSignature, level: usize, nullable: bool, leaf: &str) -> String {
        if nullable {
            format!("{} | null", wrap(signature, level, false, leaf))
        } else if level < signature.list_depth {
            format!("Array<{}>", wrap(signature, level + 1, signature.item_nullable[level], leaf))
        } else {
            leaf.to_string()
        }
    }
    wrap(signature, 0, signature.nullable, leaf)
}

#[derive(Clone, Copy)]
enum Direction {
    Encode,
    Decode,
}

impl Direction {
    fn null_helper(self) -> &'static str {
        match self {
            Direction::Encode => "encodeNull",
            Direction::Decode => "decodeNull",
        }
    }

    fn list_helper(self) -> &'static str {
        match self {
            Direction::Encode => "encodeList",
            Direction::Decode => "decodeList",
        }
    }
}

// Defaulted non-null values may be left out, so they get the same absent
// guard as nullable ones.
fn encode_input_value(value: &ResolvedInputValue<'_>, subject: &str) -> String {
    let mut signature = value.signature.clone();
    signature.nullable = value.is_optional();
    convert(Direction::Encode, &signature, &value.base, subject)
}

fn convert(direction: Direction, signature: &TypeSignature, base: &BaseType, subject: &str) -> String {
    fn wrap(
        direction: Direction,
        signature: &TypeSignature,
        base: &BaseType,
        level: usize,
        nullable: bool,
        subject: &str,
    ) -> String {
        if nullable {
            let inner = wrap(direction, signature, base, level, false, "value");
            format!("{}({}, value => {})", direction.null_helper(), subject, inner)
        } else if level < signature.list_depth {
            let inner = wrap(direction, signature, base, level + 1, signature.item_nullable[level], "value");
            format!("{}({}, value => {})", direction.list_helper(), subject, inner)
        } else {
            convert_leaf(direction, base, subject)
        }
    }
    wrap(direction, signature, base, 0, signature.nullable, subject)
}

fn convert_leaf(direction: Direction, base: &BaseType, subject: &str) -> String {
    match (direction, base) {
        (Direction::Decode, BaseType::Scalar(target)) => match &target.codec {
            ScalarCodec::Builtin(builtin) => format!(
                "decodeBuiltin({}, \"{}\") as {}",
                subject,
                builtin.wire_name(),
                target.type_name
            ),
            ScalarCodec::Custom(name) => format!("scalars.{}.decode({})", name, subject),
        },
        (Direction::Encode, BaseType::Scalar(target)) => match &target.codec {
            ScalarCodec::Builtin(_) => subject.to_string(),
            ScalarCodec::Custom(name) => format!("scalars.{}.encode({})", name, subject),
        },
        (Direction::Decode, BaseType::Enum(name)) => format!("decode{}({})", ts_identifier(name), subject),
        (Direction::Decode, BaseType::Composite(_)) => format!("nested.decode({}, scalars)", subject),
        (Direction::Encode, BaseType::InputObject(name)) => {
            format!("encode{}({}, scalars)", ts_identifier(name), subject)
        }
        (Direction::Encode, BaseType::Enum(_))
        | (Direction::Encode, BaseType::Composite(_))
        | (Direction::Decode, BaseType::InputObject(_)) => subject.to_string(),
    }
}

fn doc_lines(description: Option<&str>, deprecation: Option<&Deprecation>, default_value: Option<&str>) -> Vec<String> {
    let mut lines: Vec<String> = description
        .map(|text| text.lines().map(|line| line.trim_end().to_string()).collect())
        .unwrap_or_default();
    if let Some(default_value) = default_value {
        lines.push(format!("@default {}", default_value));
    }
    if let Some(deprecation) = deprecation {
        match &deprecation.reason {
            Some(reason) => lines.push(format!("@deprecated {}", reason)),
            None => lines.push("@deprecated".to_string()),
        }
    }
    lines
}

fn ts_identifier(name: &str) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", name)
    } else {
        name.to_string()
    }
}

fn member_name(key: &str) -> String {
    let identifier = ts_identifier(key);
    if RESERVED_MEMBERS.contains(&identifier.as_str()) {
        format!("{}_", identifier)
    } else {
        identifier
    }
}
