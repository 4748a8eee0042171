mod data;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use sqlx::sqlite::SqlitePoolOptions;
use std::fs;
use std::time::Instant;

use crate::data::SeedPart;

#[derive(Parser)]
#[command(name = "seeder")]
#[command(about = "Database seeding utility for the part management system")]
struct Args {
    /// Extra randomly generated parts on top of the samples
    #[arg(long, default_value = "0")]
    count: usize,

    #[arg(long)]
    seed: Option<u64>,

    /// JSON array of additional part objects
    #[arg(long)]
    data_file: Option<String>,

    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://parts_dev.db?mode=rwc")]
    database_url: String,

    /// Seed even when the table already has parts
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    println!("{}", "=".repeat(80).cyan());
    println!("{}", "Part Management Database Seeder".bold().cyan());
    println!("{}", "=".repeat(80).cyan());
    println!();

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&args.database_url)
        .await
        .context("Failed to connect to database")?;

    parts_api::db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let existing = parts_api::db::count_parts(&pool).await?;
    if existing > 0 && !args.force {
        println!(
            "{} Database already has {} parts, skipping (use --force to seed anyway)",
            "ℹ".blue(),
            existing
        );
        return Ok(());
    }

    let mut rng: rand::rngs::StdRng = if let Some(seed) = args.seed {
        println!("{} Using seed: {}", "ℹ".blue(), seed);
        rand::SeedableRng::seed_from_u64(seed)
    } else {
        rand::SeedableRng::from_entropy()
    };

    let start_time = Instant::now();

    let samples = data::insert_parts(&pool, &data::sample_parts()).await?;
    println!("{} Created {} sample parts", "✓".green(), samples);

    if args.count > 0 {
        let generated = data::generated_parts(args.count, &mut rng);
        let created = data::insert_parts(&pool, &generated).await?;
        println!("{} Created {} generated parts", "✓".green(), created);
    }

    if let Some(ref file_path) = args.data_file {
        println!("{} Loading custom data from: {}", "ℹ".blue(), file_path);
        let custom = load_custom_data(file_path)?;
        let created = data::insert_parts(&pool, &custom).await?;
        println!("{} Created {} custom parts", "✓".green(), created);
    }

    let elapsed = start_time.elapsed();
    println!();
    println!("{}", "=".repeat(80).cyan());
    println!(
        "{} Seeding completed in {:.2}s",
        "✓".green().bold(),
        elapsed.as_secs_f64()
    );
    println!("{}", "=".repeat(80).cyan());

    Ok(())
}

fn load_custom_data(file_path: &str) -> Result<Vec<SeedPart>> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read data file: {}", file_path))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON: {}", file_path))?;

    let serde_json::Value::Array(records) = value else {
        bail!("{} must contain a JSON array of parts", file_path);
    };
    Ok(records.into_iter().map(SeedPart::new).collect())
}
