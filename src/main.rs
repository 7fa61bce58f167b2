use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

use yacs::index::{IndexBuilder, SpinnerListener};
use yacs::output::{ResultsView, print_results};
use yacs::parse_query;
use yacs::search::SearchRunner;
use yacs::settings::{PROJECT_FILE, ProjectData, Settings};
use yacs::utils::AppConfig;

#[derive(Parser)]
#[command(name = "yacs")]
#[command(about = "Query front end for the csearch/cindex code search tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Search query (when no subcommand is given)
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,

    /// Project file naming the index and folders
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the index
    Search {
        /// Query text, e.g. `MyClass file:.*rs$ case:no`
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Print match groups as JSON instead of the results pane
        #[arg(long)]
        json: bool,
    },
    /// Build or rebuild the index
    Index {
        /// Replace the indexed paths with the project's folders
        #[arg(long)]
        project_folders: bool,
    },
    /// Show how a query is parsed and the arguments it becomes
    Parse {
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Search {
            query,
            no_color,
            json,
        }) => {
            run_search(&query.join(" "), cli.project.as_deref(), !no_color, json)?;
        }
        Some(Commands::Index { project_folders }) => {
            run_index(cli.project.as_deref(), project_folders)?;
        }
        Some(Commands::Parse { query }) => {
            show_parse(&query.join(" "))?;
        }
        None => {
            if cli.query.is_empty() {
                Cli::command().print_help()?;
            } else {
                run_search(&cli.query.join(" "), cli.project.as_deref(), true, false)?;
            }
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("YACS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// Resolve settings from the user config and the project file (explicit, or
/// `.yacs.json` in the working directory when present).
fn load_settings(project: Option<&Path>, index_project_folders: bool) -> Result<Settings> {
    let config = AppConfig::load()?;

    let default_project = Path::new(PROJECT_FILE);
    let (data, base) = match project {
        Some(path) => ProjectData::load(path)?,
        None if default_project.is_file() => ProjectData::load(default_project)?,
        None => (
            ProjectData::default(),
            std::env::current_dir().context("Failed to read working directory")?,
        ),
    };

    Ok(Settings::resolve(&config, &data, &base, index_project_folders)?)
}

fn run_search(text: &str, project: Option<&Path>, color: bool, json: bool) -> Result<()> {
    let query = parse_query(text).with_context(|| format!("Invalid query: {text}"))?;
    let settings = load_settings(project, false)?;
    let groups = SearchRunner::from_settings(&settings).run(&query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    let view = ResultsView::render(text, Some(&query), &groups);
    print_results(&view, color)?;
    Ok(())
}

fn run_index(project: Option<&Path>, project_folders: bool) -> Result<()> {
    let settings = load_settings(project, project_folders)?;
    let builder = IndexBuilder::from_settings(&settings);

    for path in &builder.paths_to_index {
        println!("Indexing: {}", path.display());
    }

    let mut listener = SpinnerListener::new();
    let total = builder.run(&mut listener)?;

    println!("Total: {} files indexed", total);
    if let Some(index) = &settings.index_filename {
        println!("Index stored at: {}", index.display());
    }
    Ok(())
}

fn show_parse(text: &str) -> Result<()> {
    let query = parse_query(text).with_context(|| format!("Invalid query: {text}"))?;

    println!("Terms:          {:?}", query.terms);
    println!("File filter:    {}", query.effective_file_filter().unwrap_or("(any)"));
    println!("Case sensitive: {}", query.case_sensitive);
    println!("Canonical:      {}", query);
    match query.to_args() {
        Ok(args) => println!("Arguments:      {:?}", args),
        Err(e) => println!("Arguments:      ({})", e),
    }
    Ok(())
}
