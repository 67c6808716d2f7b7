use crate::code_writer::CodeFileOptions;
use crate::error::CompileError;
use crate::scalars::ScalarOverrides;

pub const DEFAULT_RUNTIME: &str = "graphql-freeze";
pub const DEFAULT_INDENT: &str = "    ";
pub const DEFAULT_LINE_BREAK: &str = "\n";

/// Everything that shapes one compilation besides the schema itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Wire scalar name to TypeScript type. Required for every custom scalar
    /// the schema references; built-ins may be remapped. Default: empty.
    pub scalar_overrides: ScalarOverrides,
    /// Module the generated code imports its runtime from. Default: `graphql-freeze`.
    pub runtime_package: String,
    /// One level of indentation. Default: four spaces.
    pub indent: String,
    /// Either `"\n"` (default) or `"\r\n"`.
    pub line_break: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            scalar_overrides: ScalarOverrides::new(),
            runtime_package: DEFAULT_RUNTIME.to_string(),
            indent: DEFAULT_INDENT.to_string(),
            line_break: DEFAULT_LINE_BREAK.to_string(),
        }
    }
}

impl CompileOptions {
    pub fn with_scalar(mut self, scalar: impl Into<String>, target: impl Into<String>) -> Self {
        self.scalar_overrides.insert(scalar.into(), target.into());
        self
    }

    pub fn validate(&self) -> Result<(), CompileError> {
        if self.runtime_package.trim().is_empty() {
            return Err(CompileError::InvalidOptions("runtime package must not be empty".to_string()));
        }
        if self.indent.is_empty() || !self.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(CompileError::InvalidOptions(
                "indent must consist of spaces or tabs".to_string(),
            ));
        }
        if self.line_break != "\n" && self.line_break != "\r\n" {
            return Err(CompileError::InvalidOptions(format!(
                "line break must be \\n or \\r\\n, got {:?}",
                self.line_break
            )));
        }
        for (scalar, target) in &self.scalar_overrides {
            if !is_graphql_name(scalar) {
                return Err(CompileError::InvalidOptions(format!(
                    "`{}` is not a valid scalar name",
                    scalar
                )));
            }
            if target.trim().is_empty() {
                return Err(CompileError::InvalidOptions(format!(
                    "scalar `{}` is mapped to an empty type",
                    scalar
                )));
            }
        }
        Ok(())
    }

    pub fn code_file_options(&self) -> CodeFileOptions {
        CodeFileOptions {
            line_break: self.line_break.clone(),
            indent: self.indent.clone(),
        }
    }
}

fn is_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}
