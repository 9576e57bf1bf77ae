//! Command-line interface implementation for cookiecutter-runner.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use indexmap::IndexMap;
use std::path::PathBuf;

use crate::constants::{DEFAULT_CACHE_DIR, VARIABLE_PREFIX};
use crate::layout::TemplateLayout;
use crate::orchestrator::RunOptions;

/// Command-line arguments structure for cookiecutter-runner.
#[derive(Parser, Debug)]
#[command(author, version, about = "Stage, generate, install and test cookiecutter templates", long_about = None)]
pub struct Args {
    /// Cookiecutter template directory
    #[arg(long, value_name = "DIR")]
    pub template: PathBuf,

    /// Directory where the generated projects will be created
    #[arg(long, value_name = "DIR")]
    pub output: PathBuf,

    /// Cache directory
    #[arg(long, value_name = "DIR", default_value = DEFAULT_CACHE_DIR)]
    pub cache: PathBuf,

    /// Template variable passed to the templating engine, may be repeated
    #[arg(long = "extra-context", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub extra_context: Vec<(String, String)>,

    /// Prefix of the variable-named project directory
    #[arg(long, value_name = "PREFIX", default_value = VARIABLE_PREFIX)]
    pub variable_prefix: String,

    /// Only stage the template into the cache directory
    #[arg(long)]
    pub stage_only: bool,

    /// Generate the projects without installing and testing them
    #[arg(long)]
    pub skip_install: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses a `KEY=VALUE` pair.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid KEY=VALUE: no `=` found in '{s}'")),
    }
}

impl Args {
    /// Extra context in command-line order; a repeated key keeps its last value.
    pub fn extra_context(&self) -> IndexMap<String, String> {
        self.extra_context.iter().cloned().collect()
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            template_dir: self.template.clone(),
            output_dir: self.output.clone(),
            cache_root: self.cache.clone(),
            layout: TemplateLayout::with_variable_prefix(self.variable_prefix.clone()),
            stage_only: self.stage_only,
            skip_install: self.skip_install,
        }
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let printed = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                if let Err(err) = printed {
                    eprintln!("{err}");
                }
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
