use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scanalyze::adapters::{InMemoryGraphGateway, InMemoryProfileReader, PgUserProfileReader, SourceRegistry};
use scanalyze::application::{
    DecideProductCommand, DecideProductHandler, IdentityMapper, IngestProductCommand,
    IngestProductHandler, IngestProductResult,
};
use scanalyze::config::{AppConfig, ConfigError, DatabaseConfig, LoggingConfig, ValidationError};
use scanalyze::domain::decision::{DecisionEngine, ProductDecision, UserProfile};
use scanalyze::domain::foundation::{DomainError, ProductId, UserId};
use scanalyze::domain::hed::{DermalSafetyAssessment, DoseConverter, DoseError, MethodLimitations, Species};
use scanalyze::domain::label::extract_ingredients;
use scanalyze::ports::{SourceError, UserProfileReader};

#[derive(Parser)]
#[command(
    name = "scanalyze",
    version,
    about = "Cosmetic ingredient mapping, dose scaling and personalised risk scoring"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve ingredient names against the configured chemical sources
    Map {
        /// INCI names, in label order
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Scale an animal dose to a human-equivalent dose and a safe concentration
    Hed {
        /// Test species (rat, mouse, rabbit, dog, ...)
        #[arg(short, long)]
        species: String,

        /// Animal dose value
        #[arg(short, long)]
        dose: f64,

        /// Dose unit (mg/kg, mg/kg-day, mL/kg, ...)
        #[arg(short, long, default_value = "mg/kg")]
        unit: String,

        /// Include the method's documented exclusions
        #[arg(long)]
        limitations: bool,
    },
    /// Extract the ingredient list from label text
    Extract {
        /// Free label text
        text: String,
    },
    /// Map a product's ingredients and score it against a user profile
    Assess {
        /// Product identifier
        #[arg(short, long, default_value = "cli-product")]
        product: String,

        /// Profile JSON file
        #[arg(long, value_name = "FILE", conflicts_with = "user")]
        profile: Option<PathBuf>,

        /// User whose stored profile is read from the database
        #[arg(long)]
        user: Option<String>,

        /// Hazard routes to consider (default from configuration)
        #[arg(short, long = "route", value_name = "ROUTE")]
        routes: Vec<String>,

        /// Label text to extract names from instead of listing them
        #[arg(long)]
        label: Option<String>,

        /// INCI names, in label order
        names: Vec<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Dose(#[from] DoseError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid profile: {0}")]
    Profile(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(&'static str),
}

#[derive(Serialize)]
struct HedReport {
    species: &'static str,
    km: f64,
    animal_dose_mg_kg: f64,
    hed_mg_kg: f64,
    dermal_safety: DermalSafetyAssessment,
    #[serde(skip_serializing_if = "Option::is_none")]
    limitations: Option<MethodLimitations>,
}

#[derive(Serialize)]
struct AssessReport {
    ingestion: IngestProductResult,
    decision: ProductDecision,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), CliError> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.logging);

    match command {
        Commands::Map { names } => {
            let pool = connect(config.database.as_ref()).await?;
            let registry = SourceRegistry::from_config(&config.sources, pool)?;
            let mapper = IdentityMapper::new(registry, &config.mapper);

            let shutdown = shutdown_signal();
            let records = mapper.map_batch_until(&names, shutdown).await;
            if records.len() < names.len() {
                warn!(mapped = records.len(), requested = names.len(), "mapping interrupted");
            }
            print_json(&records)
        }
        Commands::Hed {
            species,
            dose,
            unit,
            limitations,
        } => {
            let species: Species = species.parse()?;
            let animal_dose_mg_kg = DoseConverter::normalize_dose(dose, &unit)?;
            let converter = DoseConverter::new(config.hed.human_weight_kg)?;
            let hed_mg_kg = converter.hed_by_km(animal_dose_mg_kg, species, None)?;
            let dermal_safety =
                converter.dermal_safety(animal_dose_mg_kg, species, config.hed.dermal_params())?;

            print_json(&HedReport {
                species: species.as_str(),
                km: species.km(),
                animal_dose_mg_kg,
                hed_mg_kg,
                dermal_safety,
                limitations: limitations.then(DoseConverter::limitations),
            })
        }
        Commands::Extract { text } => print_json(&extract_ingredients(&text)),
        Commands::Assess {
            product,
            profile,
            user,
            routes,
            label,
            names,
        } => {
            let names = match label {
                Some(text) => extract_ingredients(&text),
                None => names,
            };
            if names.is_empty() {
                return Err(CliError::Usage("no ingredient names given"));
            }

            let pool = connect(config.database.as_ref()).await?;
            let (user_id, profiles): (UserId, Arc<dyn UserProfileReader>) =
                match (profile, user) {
                    (Some(path), _) => {
                        let user_id = UserId::new("cli-user").map_err(DomainError::from)?;
                        let profile = read_profile(&path)?;
                        let reader = InMemoryProfileReader::with_profile(user_id.clone(), profile);
                        (user_id, Arc::new(reader))
                    }
                    (None, Some(user)) => {
                        let pool = pool
                            .clone()
                            .ok_or(CliError::Usage("--user needs a configured database"))?;
                        let user_id = UserId::new(user).map_err(DomainError::from)?;
                        (user_id, Arc::new(PgUserProfileReader::new(pool)))
                    }
                    (None, None) => {
                        return Err(CliError::Usage("either --profile or --user is required"))
                    }
                };

            let registry = SourceRegistry::from_config(&config.sources, pool)?;
            let graph = Arc::new(InMemoryGraphGateway::new());
            let product_id = ProductId::new(product).map_err(DomainError::from)?;

            let ingest = IngestProductHandler::new(
                IdentityMapper::new(registry, &config.mapper),
                config.hed.integrator()?,
                graph.clone(),
            );
            let ingestion = ingest
                .handle(IngestProductCommand {
                    product_id: product_id.clone(),
                    ingredient_names: names,
                })
                .await?;

            let engine = DecisionEngine::new(config.decision.weights).map_err(DomainError::from)?;
            let decide = DecideProductHandler::new(profiles, graph, engine)
                .with_default_routes(config.decision.default_routes.clone());
            let decision = decide
                .handle(DecideProductCommand {
                    user_id,
                    product_id,
                    routes: (!routes.is_empty()).then_some(routes),
                })
                .await?;

            print_json(&AssessReport {
                ingestion,
                decision,
            })
        }
    }
}

fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_lowercase()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn connect(database: Option<&DatabaseConfig>) -> Result<Option<PgPool>, CliError> {
    let Some(database) = database else {
        return Ok(None);
    };
    let pool = database.connect().await?;
    info!(max_connections = database.max_connections, "database pool ready");
    Ok(Some(pool))
}

/// Flips to `true` on Ctrl-C so a running batch stops after its chunk.
fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested, finishing current chunk");
            let _ = tx.send(true);
        }
    });
    rx
}

fn read_profile(path: &Path) -> Result<UserProfile, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
