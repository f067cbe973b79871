//! Queue wait-time estimator
//!
//! Seeds the `queuehistories` collection, trains a linear regression of
//! wait time on queue features, and predicts from the saved model.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use database::{create_pool, run_migrations};
use nextup::commands::{self, train::TrainOptions};
use nextup::stats::{DEFAULT_EMA_ALPHA, MOVING_AVERAGE_WINDOW};
use queue_features::parse_feature_list;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Queue wait-time estimator
#[derive(Parser)]
#[command(name = "nextup")]
#[command(about = "Trains and queries a wait-time model from queue history")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Model artifact path (overrides `MODEL_PATH`)
    #[arg(long, global = true)]
    model_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert synthetic queue history records
    Seed {
        /// Number of records to generate
        #[arg(short, long, default_value = "1000")]
        count: usize,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Insert the two reference records, or every record of a JSON file
    Insert {
        /// JSON array of queue history documents
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete every queue history record
    Clear,

    /// Train the wait-time model on all stored records
    Train {
        /// Comma-separated numeric features, in fit order
        #[arg(short, long, default_value = "queueLength,dayOfWeek,hourOfDay,minuteOfDay")]
        features: String,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value = "0.2")]
        test_ratio: f64,

        /// Shuffle seed for the train/evaluation split
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Predict a wait time from a JSON feature vector
    Predict {
        /// JSON array in stored feature order, e.g. `[3, 2, 14, 845, 1, 0]`,
        /// or an object such as `{"queueName": "deposit", "queueLength": 3, ...}`
        features: String,
    },

    /// Print the intercept and coefficients of the trained model
    Coefficients,

    /// Summarize one queue's history
    Report {
        /// Queue name, e.g. "deposit"
        queue_name: String,

        /// Number of recent wait times in the moving average
        #[arg(long, default_value_t = MOVING_AVERAGE_WINDOW)]
        window: usize,

        /// Smoothing factor of the exponential moving average
        #[arg(long, default_value_t = DEFAULT_EMA_ALPHA)]
        alpha: f64,
    },

    /// Run database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().with_model_path(cli.model_path);

    match cli.command {
        Commands::Seed { count, seed } => {
            let pool = connect(&config).await?;
            commands::seed::run(&pool, count, seed).await?;
        }
        Commands::Insert { file } => {
            let pool = connect(&config).await?;
            commands::insert::run(&pool, file.as_deref()).await?;
        }
        Commands::Clear => {
            let pool = connect(&config).await?;
            commands::clear::run(&pool).await?;
        }
        Commands::Train {
            features,
            test_ratio,
            seed,
        } => {
            let options = TrainOptions {
                model_path: config.model_path.clone(),
                features: parse_feature_list(&features)?,
                test_ratio,
                seed,
            };
            let pool = connect(&config).await?;
            commands::train::run(&pool, &options).await?;
        }
        Commands::Predict { features } => {
            let prediction = commands::predict::run(&config.model_path, &features)?;
            println!("{prediction}");
        }
        Commands::Coefficients => {
            commands::coefficients::run(&config.model_path)?;
        }
        Commands::Report {
            queue_name,
            window,
            alpha,
        } => {
            let pool = connect(&config).await?;
            commands::report::run(&pool, &queue_name, window, alpha).await?;
        }
        Commands::Migrate => {
            let pool = connect(&config).await?;
            run_migrations(&pool).await?;
            info!("Migrations completed successfully");
        }
    }

    Ok(())
}

/// Connects to the database named by the configuration.
async fn connect(config: &Config) -> Result<PgPool> {
    let database_url = config.require_database_url()?;
    create_pool(database_url)
        .await
        .context("Failed to connect to the queue history database")
}
