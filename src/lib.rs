//! Compiles a GraphQL schema into a typed TypeScript client module.
//!
//! The pipeline is pure: parse a [`Schema`] (from SDL or an introspection
//! response), resolve it into an [`EmissionPlan`](resolver::EmissionPlan) and
//! render that plan into [`Artifact`]s. Writing the artifacts to disk is left
//! to the caller.

pub mod code_generator;
pub mod code_writer;
pub mod error;
pub mod naming;
pub mod options;
pub mod resolver;
pub mod scalars;
pub mod schema;
pub mod schema_introspection;
pub mod schema_sdl;

use tracing::debug;

pub use code_generator::{Artifact, SCHEMA_FILE_NAME};
pub use error::{CompileError, SchemaError, UnknownScalarError};
pub use options::CompileOptions;
pub use schema::Schema;

/// Compiles a validated schema into the generated client sources.
///
/// Options are checked first, then every referenced scalar is mapped and the
/// type graph is ordered before anything is rendered, so a failing schema
/// never yields partial output.
pub fn compile(schema: &Schema, options: &CompileOptions) -> Result<Vec<Artifact>, CompileError> {
    options.validate()?;
    let plan = resolver::resolve(schema, &options.scalar_overrides)?;
    debug!(types = plan.items.len(), runtime = %options.runtime_package, "compiling schema");
    Ok(code_generator::generate(&plan, options))
}
