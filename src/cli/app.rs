//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::record::FieldArgs;
use super::report::ReportColumn;
use super::{query, record, report, share, suggest_cmd};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "medstock")]
#[command(author, version, about = "Local-first medication inventory")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Act as this actor ID instead of the configured one
    #[arg(long = "as", global = true, value_name = "ACTOR")]
    pub actor: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new medstock project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Add a medication
    Add {
        /// Medication name
        name: String,

        #[command(flatten)]
        fields: FieldArgs,

        /// Fill empty fields using the suggestion plugin
        #[arg(long)]
        suggest: bool,
    },

    /// Update a medication you may manage
    Edit {
        /// Record ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Remove a medication you may manage
    Remove {
        /// Record ID
        id: String,

        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Show medication details
    Show {
        /// Record ID
        id: String,
    },

    /// List medications, optionally filtered by a search term
    List {
        /// Matches name, ingredient, manufacturer, presentation, class,
        /// barcode or office (case-insensitive)
        term: Option<String>,
    },

    /// Show inventory counts
    Status,

    /// Print a Markdown report
    Report {
        /// Columns to include, comma separated
        #[arg(long, short, value_enum, value_delimiter = ',')]
        columns: Vec<ReportColumn>,
    },

    /// Extract medications from text or a document via the suggestion plugin
    #[command(group(ArgGroup::new("source").required(true).args(["text", "file"])))]
    Extract {
        /// Free text describing medications
        #[arg(long)]
        text: Option<String>,

        /// Image or PDF to read
        #[arg(long)]
        file: Option<PathBuf>,

        /// Add every extracted medication to the inventory
        #[arg(long)]
        save: bool,
    },

    /// Explain how an active ingredient works via the suggestion plugin
    Explain {
        /// Active ingredient
        ingredient: String,
    },

    /// Print a link carrying the whole inventory
    Share {
        /// URL to build the link on (defaults to [share] base_url)
        #[arg(long)]
        base_url: Option<String>,

        /// Do not gzip the payload
        #[arg(long)]
        plain: bool,
    },

    /// Replace the inventory with a shared one
    Import {
        /// Share link, or a bare transport string
        input: String,

        /// Treat a bare transport string as gzipped
        #[arg(long)]
        compressed: bool,

        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Write the inventory to a JSON file
    Backup {
        /// Destination file
        file: PathBuf,
    },

    /// Replace the inventory with a JSON backup
    Restore {
        /// Backup file
        file: PathBuf,

        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// List actors and their roles
    Actors,
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the level
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "medstock=debug" } else { "medstock=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load()
            .map(|c| OutputFormat::from(c.global.default_format))
            .unwrap_or_default(),
    };
    let output = Output::new(format, cli.verbose);
    let actor = cli.actor.as_deref();

    output.verbose("medstock starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx("init", &format!("Created .medstock directory at: {}", project.data_dir().display()));
            output.success(&format!("Initialized medstock project at {}", project.root().display()));
        }

        Commands::Add { name, fields, suggest } => record::add(&output, actor, name, fields, suggest)?,
        Commands::Edit { id, name, fields } => record::edit(&output, actor, &id, name, fields)?,
        Commands::Remove { id, yes } => record::remove(&output, actor, &id, yes)?,
        Commands::Show { id } => record::show(&output, actor, &id)?,
        Commands::List { term } => {
            output.verbose_ctx("list", &format!("Search term: {:?}", term));
            record::list(&output, actor, term.as_deref())?
        }

        Commands::Status => query::status(&output, actor)?,
        Commands::Report { columns } => report::run(&output, actor, &columns)?,

        Commands::Extract { text, file, save } => {
            suggest_cmd::extract(&output, actor, text.as_deref(), file.as_deref(), save)?
        }
        Commands::Explain { ingredient } => suggest_cmd::explain(&output, &ingredient)?,

        Commands::Share { base_url, plain } => share::share(&output, actor, base_url.as_deref(), plain)?,
        Commands::Import { input, compressed, yes } => {
            share::import(&output, actor, &input, compressed, yes)?
        }
        Commands::Backup { file } => share::backup(&output, actor, &file)?,
        Commands::Restore { file, yes } => share::restore(&output, actor, &file, yes)?,

        Commands::Actors => query::actors(&output, actor)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn report_columns_parse_comma_separated() {
        let cli = Cli::try_parse_from(["medstock", "report", "--columns", "name,pmc,officeNumber"]).unwrap();
        match cli.command {
            Commands::Report { columns } => assert_eq!(
                columns,
                vec![ReportColumn::Name, ReportColumn::Pmc, ReportColumn::OfficeNumber]
            ),
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn unknown_report_column_is_rejected() {
        assert!(Cli::try_parse_from(["medstock", "report", "--columns", "price"]).is_err());
    }

    #[test]
    fn extract_requires_a_source() {
        assert!(Cli::try_parse_from(["medstock", "extract"]).is_err());
        assert!(Cli::try_parse_from(["medstock", "extract", "--text", "a", "--file", "b"]).is_err());
    }

    #[test]
    fn as_flag_is_global() {
        let cli = Cli::try_parse_from(["medstock", "list", "--as", "user_authorized_1"]).unwrap();
        assert_eq!(cli.actor.as_deref(), Some("user_authorized_1"));
    }
}
