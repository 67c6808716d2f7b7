use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use graphql_freeze_compiler::options::{CompileOptions, DEFAULT_INDENT, DEFAULT_RUNTIME};

pub const DEFAULT_CONFIG_PATH: &str = "graphql-freeze.json";
pub const DEFAULT_PROFILE_NAME: &str = "default";

#[derive(Parser, Debug)]
#[command(name = "graphql-freeze", version, about = "Generates a typed TypeScript client from a GraphQL schema")]
pub struct Cli {
    #[arg(short, long, help = "Path to config file from working directory, default: graphql-freeze.json")]
    pub config: Option<String>,
    #[arg(short, long, help = "Profile used from config file, default: default")]
    pub profile: Option<String>,
    #[arg(short, long, help = "Generates client from introspection, override config file")]
    pub url: Option<String>,
    #[arg(short, long, help = "Generates client from SDL in file, override config file")]
    pub file: Option<String>,
    #[arg(short, long, help = "Output directory, override config file")]
    pub output: Option<String>,
    #[arg(
        short,
        long = "scalar",
        value_name = "NAME=TYPE",
        value_parser = parse_scalar_override,
        help = "Maps a GraphQL scalar to a TypeScript type, may be repeated, override config file"
    )]
    pub scalars: Vec<(String, String)>,
}

fn parse_scalar_override(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, target)) if !name.trim().is_empty() && !target.trim().is_empty() => {
            Ok((name.trim().to_string(), target.trim().to_string()))
        }
        _ => Err(format!("expected NAME=TYPE, got \"{}\"", value)),
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct CodegenJsonConfig {
    pub profiles: Option<HashMap<String, ConfigProfile>>,
    pub output_directory: Option<String>,
    #[serde(rename = "lineBreak")]
    pub line_break: Option<String>,
    pub indent: Option<String>,
    pub runtime: Option<String>,
    pub scalars: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "method")]
pub enum ConfigProfile {
    Endpoint { url: String },
    File { path: String },
    PipeResponse,
    PipeSdl,
}

/// Everything one run of the CLI needs, merged from flags and config file.
#[derive(Debug)]
pub struct CodegenOptions {
    pub compile: CompileOptions,
    pub output_directory: PathBuf,
    pub fetch: FetchMethod,
    pub process: ProcessMethod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMethod {
    File { path: PathBuf },
    Endpoint { url: String },
    Pipe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMethod {
    Sdl,
    Introspection,
}

pub fn read_config_from_args(args: &Cli) -> Result<Option<CodegenJsonConfig>> {
    match &args.config {
        Some(path) => match read_config(Path::new(path))? {
            Some(config) => Ok(Some(config)),
            None => bail!("Unable to locate config file {}", path),
        },
        None => read_config(Path::new(DEFAULT_CONFIG_PATH)),
    }
}

pub fn read_config(path: &Path) -> Result<Option<CodegenJsonConfig>> {
    let exists = path
        .try_exists()
        .with_context(|| format!("Unable to check for config file {}", path.display()))?;
    if !exists {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read config file {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(Some(config))
}

pub fn parse_config(content: &str) -> Result<CodegenJsonConfig> {
    let deserializer = &mut serde_json::Deserializer::from_str(content);
    Ok(serde_path_to_error::deserialize(deserializer)?)
}

/// Merges command line arguments over the config file. Flags win.
pub fn resolve_options(args: Cli, config: Option<CodegenJsonConfig>) -> Result<CodegenOptions> {
    let config = config.unwrap_or_default();

    let mut scalar_overrides = config.scalars.clone().unwrap_or_default();
    scalar_overrides.extend(args.scalars);

    let compile = CompileOptions {
        scalar_overrides,
        runtime_package: config.runtime.clone().unwrap_or_else(|| DEFAULT_RUNTIME.to_string()),
        indent: config.indent.clone().unwrap_or_else(|| DEFAULT_INDENT.to_string()),
        line_break: config.line_break.clone().unwrap_or_else(default_line_break),
    };

    let output_directory = match args.output.or_else(|| config.output_directory.clone()) {
        Some(output) => PathBuf::from(output),
        None => bail!("No output directory was given"),
    };

    let (fetch, process) = if let Some(url) = args.url {
        (FetchMethod::Endpoint { url }, ProcessMethod::Introspection)
    } else if let Some(file) = args.file {
        (FetchMethod::File { path: PathBuf::from(file) }, ProcessMethod::Sdl)
    } else {
        let profile_name = args.profile.unwrap_or_else(|| DEFAULT_PROFILE_NAME.to_string());
        let profiles = config.profiles.as_ref().ok_or_else(|| {
            anyhow!("No method to fetch schema was provided and no profiles are defined in config file")
        })?;
        match profiles.get(&profile_name) {
            Some(ConfigProfile::Endpoint { url }) => {
                (FetchMethod::Endpoint { url: url.clone() }, ProcessMethod::Introspection)
            }
            Some(ConfigProfile::File { path }) => {
                (FetchMethod::File { path: PathBuf::from(path) }, ProcessMethod::Sdl)
            }
            Some(ConfigProfile::PipeResponse) => (FetchMethod::Pipe, ProcessMethod::Introspection),
            Some(ConfigProfile::PipeSdl) => (FetchMethod::Pipe, ProcessMethod::Sdl),
            None => bail!("No profile named \"{}\"", profile_name),
        }
    };

    Ok(CodegenOptions {
        compile,
        output_directory,
        fetch,
        process,
    })
}

fn default_line_break() -> String {
    if cfg!(windows) {
        "\r\n"
    } else {
        "\n"
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("graphql-freeze").chain(args.iter().copied())).unwrap()
    }

    const CONFIG: &str = indoc! {r#"
        {
            "profiles": {
                "default": { "method": "Endpoint", "url": "http://localhost:4000/graphql" },
                "local": { "method": "File", "path": "schema.graphql" },
                "piped": { "method": "PipeSdl" }
            },
            "output_directory": "src/generated",
            "lineBreak": "\r\n",
            "indent": "\t",
            "runtime": "@acme/runtime",
            "scalars": { "DateTime": "string", "JSON": "unknown" }
        }
    "#};

    #[test]
    fn config_file_is_parsed() {
        let config = parse_config(CONFIG).unwrap();
        let profiles = config.profiles.unwrap();
        assert_eq!(profiles["local"], ConfigProfile::File { path: "schema.graphql".to_string() });
        assert_eq!(profiles["piped"], ConfigProfile::PipeSdl);
        assert_eq!(config.line_break.as_deref(), Some("\r\n"));
        assert_eq!(config.scalars.unwrap()["JSON"], "unknown");
    }

    #[test]
    fn invalid_config_reports_path() {
        let error = parse_config(r#"{ "profiles": { "default": { "method": "Carrier" } } }"#).unwrap_err();
        assert!(error.to_string().contains("profiles.default"), "{}", error);
    }

    #[test]
    fn default_profile_comes_from_config() {
        let options = resolve_options(cli(&[]), Some(parse_config(CONFIG).unwrap())).unwrap();
        assert_eq!(options.fetch, FetchMethod::Endpoint { url: "http://localhost:4000/graphql".to_string() });
        assert_eq!(options.process, ProcessMethod::Introspection);
        assert_eq!(options.output_directory, PathBuf::from("src/generated"));
        assert_eq!(options.compile.runtime_package, "@acme/runtime");
        assert_eq!(options.compile.indent, "\t");
    }

    #[test]
    fn flags_override_config() {
        let args = cli(&["--file", "other.graphql", "--output", "out", "--scalar", "DateTime=Date", "-s", "Url=URL"]);
        let options = resolve_options(args, Some(parse_config(CONFIG).unwrap())).unwrap();
        assert_eq!(options.fetch, FetchMethod::File { path: PathBuf::from("other.graphql") });
        assert_eq!(options.process, ProcessMethod::Sdl);
        assert_eq!(options.output_directory, PathBuf::from("out"));
        assert_eq!(options.compile.scalar_overrides["DateTime"], "Date");
        assert_eq!(options.compile.scalar_overrides["Url"], "URL");
        assert_eq!(options.compile.scalar_overrides["JSON"], "unknown");
    }

    #[test]
    fn named_profile_is_selected() {
        let options = resolve_options(cli(&["--profile", "piped"]), Some(parse_config(CONFIG).unwrap())).unwrap();
        assert_eq!(options.fetch, FetchMethod::Pipe);
        assert_eq!(options.process, ProcessMethod::Sdl);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let error = resolve_options(cli(&["-p", "staging"]), Some(parse_config(CONFIG).unwrap())).unwrap_err();
        assert_eq!(error.to_string(), "No profile named \"staging\"");
    }

    #[test]
    fn output_directory_is_required() {
        let error = resolve_options(cli(&["--url", "http://localhost"]), None).unwrap_err();
        assert_eq!(error.to_string(), "No output directory was given");
    }

    #[test]
    fn malformed_scalar_flag_is_rejected() {
        let result = Cli::try_parse_from(["graphql-freeze", "--scalar", "DateTime"]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_default_config_is_not_an_error() {
        let directory = tempfile::tempdir().unwrap();
        assert!(read_config(&directory.path().join(DEFAULT_CONFIG_PATH)).unwrap().is_none());

        let path = directory.path().join("custom.json");
        std::fs::write(&path, CONFIG).unwrap();
        let config = read_config(&path).unwrap().unwrap();
        assert_eq!(config.runtime.as_deref(), Some("@acme/runtime"));
    }
}
