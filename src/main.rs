//! repcoach - Telegram AI fitness coach

use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};

use repcoach::bot;
use repcoach::catalog::Catalog;
use repcoach::config::Config;
use repcoach::db::{Database, SetLog};
use repcoach::planner::Planner;

const DB_PATH: &str = "repcoach.db";

/// User id for CLI usage without Telegram.
const LOCAL_USER_ID: i64 = 0;

#[derive(Parser)]
#[command(name = "repcoach")]
#[command(author, version, about = "Telegram AI fitness coach")]
struct Cli {
    /// Database file
    #[arg(long, env = "DATABASE_PATH", default_value = DB_PATH)]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start Telegram bot
    Bot {
        /// Telegram bot token (or set TELOXIDE_TOKEN env var)
        #[arg(short, long, env = "TELOXIDE_TOKEN")]
        token: String,
    },

    /// Generate a plan from a free-text request and store it locally
    Plan {
        /// The request, e.g. "3 days per week, 45 min, dumbbells only"
        request: Vec<String>,

        /// IANA timezone stamped into the plan
        #[arg(short, long, default_value = "UTC")]
        timezone: String,
    },

    /// Log a set, e.g. "Bench 3x5 @ 60kg RPE7"
    Log {
        entry: Vec<String>,
    },

    /// Show today's planned session
    Today,

    /// Show training statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bot { token } => {
            println!("Starting Telegram bot...");
            println!("Database: {}", cli.db);
            bot::run_bot(token, &cli.db).await?;
        }

        Commands::Plan { request, timezone } => {
            let request = request.join(" ");
            if request.trim().is_empty() {
                anyhow::bail!("empty plan request");
            }

            let db = Database::open(&cli.db)?;
            let catalog = Arc::new(Catalog::load_bundled()?);
            let planner = Planner::new(&Config::from_env(), catalog);
            let existing = db.get_plan(LOCAL_USER_ID)?;

            match planner.generate_schedule(&request, &timezone, existing.as_ref()).await {
                Ok(plan) => {
                    db.upsert_plan(LOCAL_USER_ID, &plan)?;
                    println!("{}", bot::render::plan_message(&plan));
                }
                Err(e) => anyhow::bail!("{}", e.user_message()),
            }
        }

        Commands::Log { entry } => {
            let entry = entry.join(" ");
            let Some(set) = bot::parsers::parse_set(&entry) else {
                anyhow::bail!("format: repcoach log Bench 3x5 @ 60kg RPE7");
            };

            let db = Database::open(&cli.db)?;
            let id = db.log_set(&SetLog {
                id: None,
                tg_user_id: LOCAL_USER_ID,
                exercise: set.exercise.clone(),
                sets: set.sets,
                reps: set.reps,
                weight_kg: set.weight_kg,
                rpe: set.rpe,
                is_warmup: false,
                logged_at: Utc::now(),
            })?;
            println!(
                "Logged: {} {}x{} @ {}kg (id: {})",
                set.exercise,
                set.sets,
                set.reps,
                bot::render::fmt_num(set.weight_kg),
                id
            );
        }

        Commands::Today => {
            let db = Database::open(&cli.db)?;
            let plan = db.get_plan(LOCAL_USER_ID)?;
            let weekday = Local::now().format("%a").to_string();
            println!("{}", bot::render::today_message(plan.as_ref(), &weekday));
        }

        Commands::Stats => {
            let db = Database::open(&cli.db)?;
            let sets = db.sets_for_user(LOCAL_USER_ID)?;
            println!("{}", bot::render::stats_message(&sets, Utc::now()));
        }
    }

    Ok(())
}
