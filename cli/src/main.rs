use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use settingsconfig_backend::accessor::{JsonSettingsAccessor, SettingsAccessor, apply_defaults};
use settingsconfig_backend::logger;
use settingsconfig_backend::{PlatformSelector, SelectorProvider, SettingsConfigLoader, Setup};

#[derive(Parser, Debug)]
#[command(author, version, about = "Settings schema loader CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// UI frontend name used to filter schema elements (e.g. "quick", "widgets").
    /// If not provided, the SETTINGS_FRONTEND environment variable will be used.
    #[arg(long, global = true, value_name = "NAME", env = "SETTINGS_FRONTEND")]
    frontend: Option<String>,

    /// Activate an extra selector besides the built-in platform selectors.
    /// Passing at least one (or --platform-selectors) enables selector filtering.
    #[arg(long = "selector", global = true, value_name = "NAME")]
    selectors: Vec<String>,

    /// Enable selector filtering with just the built-in platform selectors
    #[arg(long, global = true, default_value_t = false)]
    platform_selectors: bool,

    /// Treat all includes as optional, even without optional="true"
    #[arg(long, global = true, default_value_t = false)]
    includes_optional: bool,

    /// Log level: silent, error, warn, info or debug
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a settings schema, resolving includes and applying filters,
    /// and report a summary
    #[command(arg_required_else_help = true)]
    Validate {
        /// Path to the schema XML file
        #[arg(value_name = "SCHEMA_PATH")]
        schema: PathBuf,
    },

    /// Print the resolved schema tree (or the UI setup model) as JSON
    #[command(arg_required_else_help = true)]
    Dump {
        /// Path to the schema XML file
        #[arg(value_name = "SCHEMA_PATH")]
        schema: PathBuf,

        /// Convert to the UI setup model before printing
        #[arg(long, default_value_t = false)]
        setup: bool,
    },

    /// Print the active selector set
    Selectors,

    /// Write the schema's entry default values into a JSON settings file
    #[command(arg_required_else_help = true)]
    ApplyDefaults {
        /// Path to the schema XML file
        #[arg(value_name = "SCHEMA_PATH")]
        schema: PathBuf,

        /// Path to the JSON settings file (created if missing)
        #[arg(value_name = "SETTINGS_PATH")]
        settings_file: PathBuf,

        /// Overwrite values already present in the settings file
        #[arg(long, default_value_t = false)]
        overwrite: bool,
    },
}

fn validate(loader: &SettingsConfigLoader, schema: &Path) -> Result<()> {
    let config = loader
        .load_config(schema)
        .with_context(|| format!("Failed to load {}", schema.display()))?;
    let setup = Setup::from_config(&config);

    let sections: usize = setup.categories.iter().map(|c| c.sections.len()).sum();
    let groups: usize = setup
        .categories
        .iter()
        .flat_map(|c| c.sections.iter())
        .map(|s| s.groups.len())
        .sum();

    println!("OK: {}", schema.display());
    println!(
        "categories: {}, sections: {}, groups: {}, entries: {}",
        setup.categories.len(),
        sections,
        groups,
        setup.entries().count(),
    );

    Ok(())
}

fn dump(loader: &SettingsConfigLoader, schema: &Path, as_setup: bool) -> Result<()> {
    let config = loader
        .load_config(schema)
        .with_context(|| format!("Failed to load {}", schema.display()))?;

    let json = if as_setup {
        serde_json::to_string_pretty(&Setup::from_config(&config))?
    } else {
        serde_json::to_string_pretty(&config)?
    };
    println!("{}", json);

    Ok(())
}

fn print_selectors(selector: &PlatformSelector) {
    let mut names: Vec<String> = selector.all_selectors().into_iter().collect();
    names.sort();
    for name in names {
        println!("{}", name);
    }
}

fn apply_schema_defaults(
    loader: &SettingsConfigLoader,
    schema: &Path,
    settings_file: &Path,
    overwrite: bool,
) -> Result<()> {
    let setup = loader
        .load_setup(schema)
        .with_context(|| format!("Failed to load {}", schema.display()))?;

    let mut accessor = JsonSettingsAccessor::open(settings_file)?;
    let written = apply_defaults(&setup, &mut accessor, overwrite);
    accessor.sync()?;

    println!(
        "Wrote {} default values to {}",
        written,
        settings_file.display()
    );

    Ok(())
}

fn main() {
    // Attempt to load a .env file; it may define SETTINGS_FRONTEND or
    // LOG_LEVEL, which clap and the logger pick up from the environment.
    if dotenv().is_err() {
        // no .env file, nothing to do
    }

    let cli = Cli::parse();

    if let Some(level) = &cli.log_level {
        if !logger::set_log_level_str(level) {
            eprintln!("Invalid log level: {}", level);
            exit(1);
        }
    }

    let selector = if cli.platform_selectors || !cli.selectors.is_empty() {
        Some(PlatformSelector::with_extra_selectors(
            cli.selectors.clone(),
        ))
    } else {
        None
    };

    let mut loader = SettingsConfigLoader::new();
    loader.set_filters(
        cli.frontend.as_deref(),
        selector.as_ref().map(|s| s as &dyn SelectorProvider),
    );
    loader.set_includes_optional(cli.includes_optional);

    let command_result = match &cli.command {
        Commands::Validate { schema } => validate(&loader, schema),

        Commands::Dump { schema, setup } => dump(&loader, schema, *setup),

        Commands::Selectors => {
            let selector = selector
                .clone()
                .unwrap_or_else(|| PlatformSelector::with_extra_selectors(cli.selectors.clone()));
            print_selectors(&selector);
            Ok(())
        }

        Commands::ApplyDefaults {
            schema,
            settings_file,
            overwrite,
        } => apply_schema_defaults(&loader, schema, settings_file, *overwrite),
    };

    if let Err(e) = command_result {
        eprintln!("Error executing command: {:#}", e);
        exit(1);
    }
}
