use std::path::Path;
use std::process::ExitCode;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use graphql_freeze_compiler::{compile, schema_introspection, schema_sdl, Schema};
use crate::config::{Cli, CodegenOptions, FetchMethod, ProcessMethod};

mod config;
mod output;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{:#}", error);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    let config = config::read_config_from_args(&args)?;
    let options = config::resolve_options(args, config)?;
    execute(options).await
}

async fn execute(options: CodegenOptions) -> Result<()> {
    let raw_content = match &options.fetch {
        FetchMethod::Endpoint { url } => read_endpoint(url).await?,
        FetchMethod::File { path } => read_file(path).await?,
        FetchMethod::Pipe => read_pipe().await?,
    };
    debug!(bytes = raw_content.len(), "schema source read");

    let schema: Schema = match options.process {
        ProcessMethod::Introspection => schema_introspection::from_response_body(&raw_content),
        ProcessMethod::Sdl => schema_sdl::from_sdl_string(&raw_content),
    }
    .context("Unable to read schema")?;

    let artifacts = compile(&schema, &options.compile).context("Unable to generate client")?;
    output::write_files(&artifacts, &options.output_directory, &options.compile).await
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Unable to read schema file {}", path.display()))
}

async fn read_endpoint(url: &str) -> Result<String> {
    let query = include_str!("../resources/introspect.gql");
    let input_body = GraphQLQuery { query };
    reqwest::Client::new()
        .post(url)
        .json(&input_body)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .with_context(|| format!("Introspection request to {} failed", url))?
        .text()
        .await
        .with_context(|| format!("Unable to read introspection response from {}", url))
}

async fn read_pipe() -> Result<String> {
    let mut buffer = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buffer)
        .await
        .context("Unable to read schema from standard input")?;
    Ok(buffer)
}

#[derive(Serialize)]
struct GraphQLQuery<'a> {
    query: &'a str,
}
