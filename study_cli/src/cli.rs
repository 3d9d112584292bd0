//! CLI interface for the study tracker

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use learning_records::{CsvStorage, StudentId};
use serde::Serialize;
use std::path::PathBuf;
use study_engine::{
    badges, paginate, Badge, CalendarExport, ConfidenceFilter, JsonPlanExport, Page, PlanLayout,
    PlanRequest, Recommendation, Thresholds, Tracker, TrackerConfig, DEFAULT_PER_PAGE,
};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "study-tracker")]
#[command(about = "Track topic confidence, get study recommendations and build study plans", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "STUDY_TRACKER_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the CSV tables
    #[arg(short, long, env = "STUDY_TRACKER_DATA")]
    data_dir: Option<PathBuf>,

    /// Seed for generated confidence values
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List student ids
    Students,
    /// Show a student's confidence entries, scoring completed topics first
    Confidence {
        student: i64,
    },
    /// Recommend topics to study next
    Recommend {
        student: i64,
        /// Redirect weak topics to prerequisites and strong ones to follow-ups
        #[arg(long, conflicts_with = "review")]
        adaptive: bool,
        /// Mark strong topics for review instead of redirecting
        #[arg(long)]
        review: bool,
        /// Confidence band: all, weak, moderate or strong
        #[arg(long, default_value = "all")]
        filter: String,
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,
    },
    /// Strengths, weaknesses and badges
    Progress {
        student: i64,
    },
    /// Record a study session
    Study {
        student: i64,
        topic: String,
        /// Confidence points gained
        gain: u32,
    },
    /// Build and store a study plan
    Plan {
        student: i64,
        /// First study day (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Hours per day
        #[arg(long)]
        hours: String,
        /// Days available per week
        #[arg(long)]
        days: String,
        /// Restart each week after the available days
        #[arg(long)]
        weekly_reset: bool,
        /// Topics in study order; defaults to the adaptive recommendations
        topics: Vec<String>,
    },
    /// Print the stored study plan as JSON
    ExportPlan,
}

fn load_config(cli: &Cli) -> Result<TrackerConfig> {
    let mut config = match &cli.config {
        Some(path) => TrackerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TrackerConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data.dir = dir.clone();
    }
    if cli.seed.is_some() {
        config.confidence.seed = cli.seed;
    }
    Ok(config)
}

/// One page of recommendations plus the badges earned by the whole filtered list.
#[derive(Debug, Serialize)]
struct RecommendationView {
    #[serde(flatten)]
    page: Page<Recommendation>,
    badges: Vec<Badge>,
}

impl RecommendationView {
    fn new(
        recommendations: Vec<Recommendation>,
        filter: ConfidenceFilter,
        thresholds: &Thresholds,
        page: usize,
        per_page: usize,
    ) -> Self {
        let filtered: Vec<Recommendation> = recommendations
            .into_iter()
            .filter(|r| filter.matches(r.confidence, thresholds))
            .collect();
        Self {
            badges: badges(filtered.iter().map(|r| r.confidence), thresholds),
            page: paginate(&filtered, page, per_page),
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli)?;
    if let Commands::Plan { weekly_reset: true, .. } = cli.command {
        config.planner.layout = PlanLayout::WeeklyReset;
    }
    debug!(?config, "Loaded configuration");

    let storage = CsvStorage::new(config.data.clone());
    let tracker = Tracker::open(storage, config).with_context(|| "Failed to open study tables")?;

    match cli.command {
        Commands::Students => {
            print_json(&tracker.list_students()?)?;
        }
        Commands::Confidence { student } => {
            print_json(&tracker.ensure_confidence_scores(StudentId(student))?)?;
        }
        Commands::Recommend {
            student,
            adaptive,
            review,
            filter,
            page,
            per_page,
        } => {
            let filter: ConfidenceFilter = filter.parse()?;
            let student = StudentId(student);
            let recommendations = if adaptive {
                tracker.adaptive_recommendations(student)?
            } else if review {
                tracker.review_recommendations(student)?
            } else {
                tracker.next_recommendations(student)?
            };
            let thresholds = tracker.config().thresholds;
            print_json(&RecommendationView::new(
                recommendations,
                filter,
                &thresholds,
                page,
                per_page,
            ))?;
        }
        Commands::Progress { student } => {
            print_json(&tracker.progress(StudentId(student))?)?;
        }
        Commands::Study {
            student,
            topic,
            gain,
        } => {
            let confidence = tracker.record_study(StudentId(student), &topic, gain)?;
            println!("{topic}: {confidence}");
        }
        Commands::Plan {
            student,
            start,
            hours,
            days,
            topics,
            ..
        } => {
            let topics = if topics.is_empty() {
                tracker
                    .adaptive_recommendations(StudentId(student))?
                    .into_iter()
                    .map(|r| r.topic)
                    .collect()
            } else {
                topics
            };
            let request = PlanRequest::parse(&start, &hours, &days, topics)?;
            print_json(&tracker.create_plan(&request)?)?;
        }
        Commands::ExportPlan => {
            let exporter = JsonPlanExport { pretty: true };
            match tracker.export_plan(&exporter)? {
                Some(bytes) => {
                    debug!(content_type = exporter.content_type(), "Exporting study plan");
                    println!("{}", String::from_utf8_lossy(&bytes));
                }
                None => println!("No study plan generated yet"),
            }
        }
    }

    Ok(())
}
