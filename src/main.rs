//! Pipeline Paths CLI
//!
//! Usage:
//!   pipeline-paths [OPTIONS] <COMMAND>
//!
//! Commands:
//!   resolve       Print a template's fully expanded pattern
//!   format        Format key=value data against candidate templates
//!   parse         Recover data from a path
//!   publish-path  Publish path of an entity (JSON file)
//!   work-path     Work path of an entity (JSON file)
//!   collapse      Collapse per-frame paths into one record
//!   folders       List the configured root and shot folders

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use pipeline_paths::{
    collapse, Entity, HierarchyData, HostOs, Structure, StructureConfig, StructureError,
    TemplateError,
};

#[derive(Parser)]
#[command(name = "pipeline-paths", version)]
#[command(about = "Format and parse production paths from declarative templates")]
struct Cli {
    /// Structure file (TOML); the built-in example structure when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Storage location to build paths for
    #[arg(short, long, global = true, default_value = "long")]
    location: String,

    /// Host OS deciding mount point and separators (defaults to this machine)
    #[arg(long, global = true, value_enum)]
    os: Option<OsChoice>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a template's fully expanded pattern
    Resolve {
        /// Template name
        name: String,
    },
    /// Format data against candidate templates, first eligible wins
    Format {
        /// Candidate template names; all folder templates when omitted
        templates: Vec<String>,

        /// Placeholder value as key=value (repeatable)
        #[arg(short, long = "set", value_parser = parse_key_value)]
        set: Vec<(String, String)>,
    },
    /// Recover placeholder values from a path relative to the mount point
    Parse {
        path: String,

        /// Candidate template (repeatable); all folder templates when omitted
        #[arg(short, long = "template")]
        templates: Vec<String>,
    },
    /// Publish path of an entity read from a JSON file
    PublishPath { entity: PathBuf },
    /// Work path of an entity read from a JSON file
    WorkPath { entity: PathBuf },
    /// Collapse per-frame paths (or one `head%04dtail [1-3]` pattern)
    Collapse {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// List the configured root and shot folders
    Folders,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OsChoice {
    Windows,
    Linux,
}

impl From<OsChoice> for HostOs {
    fn from(choice: OsChoice) -> Self {
        match choice {
            OsChoice::Windows => HostOs::Windows,
            OsChoice::Linux => HostOs::Linux,
        }
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(message) = run(cli) {
        eprintln!("{}", message);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let structure = || build_structure(cli.config.as_deref(), &cli.location, cli.os);

    match cli.cmd {
        Command::Collapse { paths } => {
            let seq = collapse(&paths).map_err(|e| format!("Error: {}", e))?;
            print_json(&seq.record())?;
        }
        Command::Resolve { name } => {
            let structure = structure()?;
            let template = structure.templates().resolve(&name).map_err(error)?;
            println!("{}", template.pattern());
        }
        Command::Format { templates, set } => {
            let structure = structure()?;
            let data: HierarchyData = set.into_iter().collect();
            let path = if templates.is_empty() {
                structure.templates().format(&data, structure.candidates())
            } else {
                structure.templates().format(&data, &templates)
            };
            println!("{}", path.map_err(error)?);
        }
        Command::Parse { path, templates } => {
            let structure = structure()?;
            let data = if templates.is_empty() {
                structure.parse(&path).map_err(error)?
            } else {
                structure.templates().parse(&path, &templates).map_err(error)?
            };
            print_json(&data)?;
        }
        Command::PublishPath { entity } => {
            let structure = structure()?;
            let path = structure.publish_path(&read_entity(&entity)?).map_err(error)?;
            println!("{}", path);
        }
        Command::WorkPath { entity } => {
            let structure = structure()?;
            let path = structure.work_path(&read_entity(&entity)?).map_err(error)?;
            println!("{}", path);
        }
        Command::Folders => {
            let structure = structure()?;
            for folder in structure.root_folders().paths() {
                println!("{}", folder);
            }
            for folder in structure.shot_folders().paths() {
                println!("<shot>/{}", folder);
            }
        }
    }
    Ok(())
}

fn build_structure(
    config: Option<&Path>,
    location: &str,
    os: Option<OsChoice>,
) -> Result<Structure, String> {
    let config = match config {
        Some(path) => StructureConfig::from_file(path)
            .map_err(|e| format!("Error loading structure '{}': {}", path.display(), e))?,
        None => StructureConfig::default(),
    };
    let host = os.map(HostOs::from).unwrap_or_else(HostOs::current);

    Structure::new(config.clone(), location, host).map_err(|e| {
        // Malformed patterns get a source-annotated report
        if let StructureError::Template(template_err @ TemplateError::Malformed { name, .. }) = &e {
            let pattern = config
                .templates
                .iter()
                .chain(&config.file_templates)
                .find(|t| &t.name == name)
                .map_or("", |t| t.pattern.as_str());
            return template_err.report(pattern);
        }
        error(e)
    })
}

fn error(err: impl Into<StructureError>) -> String {
    format!("Error: {}", err.into())
}

fn read_entity(path: &Path) -> Result<Entity, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Error reading entity '{}': {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("Error parsing entity '{}': {}", path.display(), e))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| format!("Error: {}", e))?;
    println!("{}", json);
    Ok(())
}
