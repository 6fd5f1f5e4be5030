use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pipeline::UserPreferences;
use server::{load_aggregator, ModelPaths, RankedExercise, RankingArgs, RecommendationAggregator};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::warn;

/// RepRecs - Exercise Recommendation Engine
#[derive(Parser)]
#[command(name = "rep-recs")]
#[command(about = "Exercise recommendations ranked by TF-IDF similarity", long_about = None)]
struct Cli {
    #[command(flatten)]
    paths: ModelPaths,

    #[command(flatten)]
    ranking: RankingArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest exercises for a set of preferences
    Suggest {
        #[arg(long, default_value = "")]
        goal: String,

        #[arg(long, default_value = "")]
        experience: String,

        #[arg(long, default_value = "")]
        equipment: String,

        /// Comma-separated muscles, e.g. "chest, back"
        #[arg(long)]
        muscle: String,

        /// Show the score and matching muscle for each suggestion
        #[arg(long)]
        explain: bool,
    },

    /// List or search the exercise catalog
    Catalog {
        /// Case-insensitive substring of the name or muscle
        #[arg(long)]
        search: Option<String>,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show one exercise by exact name
    Show {
        #[arg(long)]
        name: String,
    },

    /// List the distinct muscle tags in the catalog
    Muscles,

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading catalog from {}...", cli.paths.catalog.display());
    let start = Instant::now();
    let aggregator = Arc::new(
        load_aggregator(&cli.paths, cli.ranking.to_config())
            .context("Failed to load recommendation models")?,
    );
    println!(
        "{} Loaded {} exercises in {:?}",
        "✓".green(),
        aggregator.catalog().len(),
        start.elapsed()
    );
    if !aggregator.is_ranker_available() {
        warn!("Ranker unavailable; suggestions will be empty");
    }

    match cli.command {
        Commands::Suggest {
            goal,
            experience,
            equipment,
            muscle,
            explain,
        } => {
            let preferences = UserPreferences {
                goal,
                experience,
                equipment,
                muscle,
            };
            handle_suggest(&aggregator, &preferences, explain)?
        }
        Commands::Catalog { search, limit } => handle_catalog(&aggregator, search, limit),
        Commands::Show { name } => handle_show(&aggregator, &name)?,
        Commands::Muscles => handle_muscles(&aggregator),
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(aggregator, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'suggest' command
fn handle_suggest(
    aggregator: &RecommendationAggregator,
    preferences: &UserPreferences,
    explain: bool,
) -> Result<()> {
    let start = Instant::now();
    let suggestions = aggregator.recommend_detailed(preferences)?;
    let elapsed = start.elapsed();

    if suggestions.is_empty() {
        println!("{}", "No suggestions.".yellow());
        return Ok(());
    }
    print_suggestions(&suggestions, explain);
    if explain {
        println!("Ranked in {:?}", elapsed);
    }
    Ok(())
}

/// Handle the 'catalog' command
fn handle_catalog(aggregator: &RecommendationAggregator, search: Option<String>, limit: usize) {
    let catalog = aggregator.catalog();
    let matches = match &search {
        Some(text) => catalog.search(text),
        None => catalog.records().iter().enumerate().collect(),
    };

    let header = match &search {
        Some(text) => format!("Search results for '{}' ({} found):", text, matches.len()),
        None => format!("Catalog ({} exercises):", matches.len()),
    };
    println!("{}", header.bold().blue());
    for (row, record) in matches.iter().take(limit) {
        println!(
            "{:>5}: {} [{}] {} / {}",
            row, record.name, record.muscle, record.equipment, record.difficulty
        );
    }
    if matches.len() > limit {
        println!("... and {} more", matches.len() - limit);
    }
}

/// Handle the 'show' command
fn handle_show(aggregator: &RecommendationAggregator, name: &str) -> Result<()> {
    let (row, record) = aggregator
        .catalog()
        .find_by_name(name)
        .ok_or_else(|| anyhow!("Exercise '{}' not found", name))?;

    println!("{}", format!("{} (row {})", record.name, row).bold().blue());
    println!("{}Muscle: {}", "• ".green(), record.muscle);
    println!("{}Equipment: {}", "• ".green(), record.equipment);
    println!("{}Difficulty: {}", "• ".green(), record.difficulty);
    if let Some(vector) = &record.feature_vector {
        println!("{}Feature vector: {} dims", "• ".cyan(), vector.len());
    }
    if let Some(text) = &record.combined_features {
        println!("{}Features: {}", "• ".cyan(), text);
    }
    Ok(())
}

/// Handle the 'muscles' command
fn handle_muscles(aggregator: &RecommendationAggregator) {
    let tags = aggregator.catalog().muscle_tags();
    println!("{}", format!("{} muscle tags:", tags.len()).bold().blue());
    for tag in tags {
        println!("  - {}", tag);
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    aggregator: Arc<RecommendationAggregator>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let tags = aggregator.catalog().muscle_tags();
    if tags.is_empty() || requests == 0 {
        return Err(anyhow!("Nothing to benchmark: empty catalog or zero requests"));
    }

    // one or two random muscles per request
    let workload: Vec<UserPreferences> = (0..requests)
        .map(|_| {
            let first = &tags[rand::random_range(0..tags.len())];
            let muscle = if rand::random_bool(0.5) {
                let second = &tags[rand::random_range(0..tags.len())];
                format!("{}, {}", first, second)
            } else {
                first.clone()
            };
            UserPreferences {
                goal: "strength".to_string(),
                experience: "beginner".to_string(),
                equipment: "dumbbell".to_string(),
                muscle,
            }
        })
        .collect();

    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_start = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for preferences in workload {
        let aggregator = aggregator.clone();
        let permits = permits.clone();
        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let result = tokio::task::spawn_blocking(move || {
                let start = Instant::now();
                aggregator.recommend(&preferences)?;
                Ok::<_, anyhow::Error>(start.elapsed())
            })
            .await??;
            Ok::<_, anyhow::Error>(result)
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let wall_time = wall_start.elapsed();

    let total_latency: Duration = timings.iter().sum();
    let avg_latency = total_latency / timings.len() as u32;
    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / wall_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", requests, concurrent.max(1));
    println!("Total time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print suggestions
fn print_suggestions(suggestions: &[RankedExercise], explain: bool) {
    println!("{}", "Exercise Suggestions:".bold().blue());
    for (i, ranked) in suggestions.iter().enumerate() {
        let summary = &ranked.summary;
        println!(
            "{}. {} [{}] - {} / {}",
            (i + 1).to_string().green(),
            summary.name,
            summary.muscle,
            summary.equipment,
            summary.difficulty
        );
        if explain {
            println!(
                "   Score: {:.3} (matched query for '{}')",
                ranked.similarity_score, ranked.query_muscle
            );
        }
    }
}
