//! Command-line interface implementation for cpp-hub.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, ArgGroup, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use crate::loader::TemplateSource;

/// Command-line arguments structure for cpp-hub.
#[derive(Parser, Debug)]
#[command(author, version, about = "cpp-hub: manifest-driven project scaffolding tool", long_about = None)]
pub struct Args {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a new project from a template
    New(NewArgs),

    /// Check that a template's manifest loads
    Validate {
        /// Template root directory containing hub-manifest.json
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Search registry templates by id, name, description or tag
    Search {
        #[arg(value_name = "QUERY", required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// List registry templates
    List {
        /// Only list templates carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Fetch the latest registry index
    Update,

    /// Print version and registry information
    Version,
}

#[derive(clap::Args, Debug)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["template", "git", "path"])
))]
pub struct NewArgs {
    /// Registry template id
    #[arg(value_name = "TEMPLATE_ID")]
    pub template: Option<String>,

    /// Git repository URL to use as the template
    #[arg(long, value_name = "URL")]
    pub git: Option<String>,

    /// Branch to check out when using --git
    #[arg(long, value_name = "NAME", requires = "git")]
    pub branch: Option<String>,

    /// Local template directory
    #[arg(long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Use manifest defaults instead of prompting
    #[arg(long)]
    pub defaults: bool,

    /// Directory where the generated project will be created
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Skip confirmation prompts when executing post-generation hooks.
    /// Every hook declared by the template will run without asking first.
    #[arg(long)]
    pub skip_hooks_check: bool,
}

impl NewArgs {
    /// The template source selected on the command line.
    pub fn source(&self) -> Option<TemplateSource> {
        if let Some(url) = &self.git {
            return Some(TemplateSource::Git { url: url.clone(), branch: self.branch.clone() });
        }
        if let Some(path) = &self.path {
            return Some(TemplateSource::FileSystem(path.clone()));
        }
        self.template.clone().map(TemplateSource::Registry)
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 and the help text if no command is given
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                || e.kind() == ErrorKind::MissingSubcommand
            {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
