//! Swim Hub CLI - goals, milestones, and training evidence from the shell.
//!
//! Works against a JSON file store in the current directory: author goals
//! and milestones, log practices and competition records, then run the
//! achievement engine over them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::Level;

use swimhub_core::{
    format_swim_time, parse_swim_time, CompetitionRecord, Goal, Milestone, MilestoneKind,
    MilestoneParams, PracticeId, PracticeLog, PracticeLogId, PracticeTime, RecordId,
    RepsTimeParams, SetParams, Stroke, SwimCategory, TimeParams, UserId,
};
use swimhub_engine::{MilestoneReconciler, ReconcilerConfig};
use swimhub_storage::{JsonStorage, MilestoneStore};

#[derive(Parser)]
#[command(name = "swimhub")]
#[command(about = "Swim goal and milestone tracking", long_about = None)]
struct Cli {
    /// Data directory
    #[arg(long, default_value = ".swimhub")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a goal
    AddGoal {
        /// Stroke (fr, ba, br, fly, im)
        #[arg(long)]
        style: Option<String>,
        /// Distance in meters
        #[arg(long)]
        distance: Option<u32>,
        /// Target time ("59.8" or "1:05.30")
        #[arg(long)]
        target: Option<String>,
        /// Baseline time when the goal is set
        #[arg(long)]
        start: Option<String>,
    },
    /// Add a milestone to a goal
    AddMilestone {
        /// Goal ID
        goal: String,
        /// Milestone title
        title: String,
        /// Criteria kind (time, reps_time, set)
        #[arg(long)]
        kind: String,
        /// Style label
        #[arg(long)]
        style: String,
        /// Distance per rep in meters
        #[arg(long)]
        distance: u32,
        /// Target time, or target average for reps_time
        #[arg(long)]
        target: Option<String>,
        /// Reps per set
        #[arg(long)]
        reps: Option<u32>,
        /// Number of sets
        #[arg(long)]
        sets: Option<u32>,
        /// Interval (circle) in seconds
        #[arg(long)]
        circle: Option<u32>,
        /// Training category (swim, pull, kick)
        #[arg(long, default_value = "swim")]
        category: String,
        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<NaiveDate>,
    },
    /// Log a practice entry
    LogPractice {
        /// Style label
        #[arg(long)]
        style: String,
        /// Distance per rep in meters
        #[arg(long)]
        distance: u32,
        /// Reps per set
        #[arg(long, default_value = "1")]
        reps: u32,
        /// Number of sets
        #[arg(long, default_value = "1")]
        sets: u32,
        /// Interval (circle) in seconds
        #[arg(long)]
        circle: Option<u32>,
        /// Training category (swim, pull, kick)
        #[arg(long, default_value = "swim")]
        category: String,
        /// Practice date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Lap time, repeatable, in swim order ("31.5" or "1:05.30", 0 for untimed)
        #[arg(long = "time")]
        times: Vec<String>,
    },
    /// Record a competition time
    AddRecord {
        /// Stroke (fr, ba, br, fly, im)
        #[arg(long)]
        style: String,
        /// Distance in meters
        #[arg(long)]
        distance: u32,
        /// Official time ("59.8" or "1:05.30")
        #[arg(long)]
        time: String,
        /// Pool length (short, long)
        #[arg(long, default_value = "short")]
        pool: String,
    },
    /// List goals with progress and milestones
    Goals,
    /// Evaluate one milestone against the evidence, without writing
    Evaluate {
        /// Milestone ID
        id: String,
    },
    /// Re-evaluate all open milestones and store earned transitions
    Reconcile {
        /// Ignore practice evidence dated before this day (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,
    },
    /// List unachieved milestones whose deadline passed
    Overdue,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    let storage = Arc::new(JsonStorage::new(&cli.store).await?);
    let user = local_user(&cli.store).await?;

    match cli.command {
        Commands::AddGoal {
            style,
            distance,
            target,
            start,
        } => {
            if style.is_some() != distance.is_some() {
                anyhow::bail!("--style and --distance go together");
            }
            let mut goal = Goal::new(user);
            if let (Some(style), Some(distance)) = (style.as_deref(), distance) {
                let stroke = parse_stroke(style)?;
                goal.style_id = Some(storage.ensure_style(stroke, distance).await?);
            }
            goal.target_time = parse_optional_time(target.as_deref())?;
            goal.start_time = parse_optional_time(start.as_deref())?;
            storage.save_goal(&goal).await?;
            println!("Added goal: {}", goal.id);
        }
        Commands::AddMilestone {
            goal,
            title,
            kind,
            style,
            distance,
            target,
            reps,
            sets,
            circle,
            category,
            deadline,
        } => {
            let goal_id = goal
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid goal ID"))?;
            let kind: MilestoneKind = kind.parse().map_err(anyhow::Error::msg)?;
            let category: SwimCategory = category.parse().map_err(anyhow::Error::msg)?;
            let params = match kind {
                MilestoneKind::Time => MilestoneParams::Time(TimeParams {
                    distance,
                    target_time: parse_time_arg(&require(target, "--target")?)?,
                    style,
                }),
                MilestoneKind::RepsTime => MilestoneParams::RepsTime(RepsTimeParams {
                    distance,
                    reps: require(reps, "--reps")?,
                    sets: require(sets, "--sets")?,
                    target_average_time: parse_time_arg(&require(target, "--target")?)?,
                    style,
                    swim_category: category,
                    circle: require(circle, "--circle")?,
                }),
                MilestoneKind::Set => MilestoneParams::Set(SetParams {
                    distance,
                    reps: require(reps, "--reps")?,
                    sets: require(sets, "--sets")?,
                    style,
                    swim_category: category,
                    circle: require(circle, "--circle")?,
                }),
            };
            let mut milestone = Milestone::new(goal_id, title, params)?;
            if let Some(deadline) = deadline {
                milestone = milestone.with_deadline(deadline);
            }
            storage.save_milestone(&milestone).await?;
            println!("Added milestone: {} - {}", milestone.id, milestone.title);
        }
        Commands::LogPractice {
            style,
            distance,
            reps,
            sets,
            circle,
            category,
            date,
            times,
        } => {
            let category: SwimCategory = category.parse().map_err(anyhow::Error::msg)?;
            let now = chrono::Utc::now();
            let log = PracticeLog {
                id: PracticeLogId::new(),
                user_id: user,
                practice_id: PracticeId::new(),
                style,
                swim_category: category,
                distance,
                rep_count: reps,
                set_count: sets,
                circle,
                date: date.unwrap_or_else(|| now.date_naive()),
                created_at: now,
            };

            // Times arrive in swim order; place them into the rep/set grid
            let reps_per_set = reps.max(1);
            let mut laps = Vec::new();
            for (i, raw) in times.iter().enumerate() {
                let i = i as u32;
                laps.push(PracticeTime {
                    practice_log_id: log.id,
                    set_number: i / reps_per_set + 1,
                    rep_number: i % reps_per_set + 1,
                    time: parse_time_arg(raw)?,
                    created_at: now,
                });
            }

            storage.save_practice_log(&log).await?;
            storage.save_practice_times(log.id, &laps).await?;
            println!(
                "Logged practice: {} ({}m {} x{}, {} lap times)",
                log.id,
                log.distance,
                log.style,
                log.rep_count * log.set_count,
                laps.len()
            );
        }
        Commands::AddRecord {
            style,
            distance,
            time,
            pool,
        } => {
            let stroke = parse_stroke(&style)?;
            let style_id = storage.ensure_style(stroke, distance).await?;
            let record = CompetitionRecord {
                id: RecordId::new(),
                user_id: user,
                competition_id: None,
                style_id,
                time: parse_time_arg(&time)?,
                pool_type: pool.parse().map_err(anyhow::Error::msg)?,
                created_at: chrono::Utc::now(),
            };
            storage.save_record(&record).await?;
            println!(
                "Recorded {} {}m: {}",
                stroke.label_en(),
                distance,
                format_swim_time(record.time)
            );
        }
        Commands::Goals => {
            let reconciler = MilestoneReconciler::new(storage.clone(), storage.clone());
            let goals = storage.load_goals(user).await?;
            println!("Goals ({}):", goals.len());
            for goal in goals {
                let progress = match reconciler.goal_progress(&goal).await? {
                    Some(p) => format!("{p:.0}%"),
                    None => "-".to_string(),
                };
                let target = goal
                    .target_time
                    .map_or_else(|| "-".to_string(), format_swim_time);
                println!(
                    "  {} | {} | target {} | progress {}",
                    goal.id, goal.status, target, progress
                );
                for milestone in storage.load_milestones(goal.id).await? {
                    println!(
                        "    {} | {} | {} | {}",
                        milestone.id, milestone.status, milestone.kind, milestone.title
                    );
                }
            }
        }
        Commands::Evaluate { id } => {
            let id = id
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid milestone ID"))?;
            let Some(milestone) = storage.load_milestone(id).await? else {
                println!("Milestone not found");
                return Ok(());
            };
            let reconciler = MilestoneReconciler::new(storage.clone(), storage.clone());
            let result = reconciler.evaluate_milestone(user, &milestone).await?;
            println!(
                "{} | {} | {}",
                milestone.id, milestone.status, milestone.title
            );
            println!("  progress: {}", result.has_progress);
            println!("  achieved: {}", result.achieved);
            if let Some(detail) = result.detail {
                match milestone.kind {
                    MilestoneKind::Set => {
                        println!("  evidence: {:.0} sets completed", detail.achieved_value)
                    }
                    _ => println!(
                        "  evidence: {} against target {}",
                        format_swim_time(detail.achieved_value),
                        format_swim_time(detail.target_value)
                    ),
                }
            }
        }
        Commands::Reconcile { since } => {
            let config = ReconcilerConfig {
                evidence_since: since,
                ..ReconcilerConfig::default()
            };
            let reconciler =
                MilestoneReconciler::with_config(storage.clone(), storage.clone(), config);
            let report = reconciler.reconcile(user).await?;
            if report.updated.is_empty() {
                println!("No status changes");
            }
            for id in &report.updated {
                let Some(milestone) = storage.load_milestone(*id).await? else {
                    continue;
                };
                println!(
                    "  {} | {} | {}",
                    milestone.id, milestone.status, milestone.title
                );
            }
            for failure in &report.errors {
                println!("  failed: {} - {}", failure.milestone, failure.error);
            }
        }
        Commands::Overdue => {
            let today = chrono::Utc::now().date_naive();
            let milestones = storage.load_overdue_milestones(user, today).await?;
            println!("Overdue milestones ({}):", milestones.len());
            for milestone in milestones {
                let deadline = milestone
                    .deadline
                    .map_or_else(|| "-".to_string(), |d| d.to_string());
                println!(
                    "  {} | due {} | {} | {}",
                    milestone.id, deadline, milestone.status, milestone.title
                );
            }
        }
    }

    Ok(())
}

/// Load the local swimmer identity, creating one on first use.
///
/// The CLI is single-user: a ULID stored next to the data files owns
/// everything in the store.
async fn local_user(root: &Path) -> anyhow::Result<UserId> {
    let path = root.join("user.json");
    match tokio::fs::read_to_string(&path).await {
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let user = UserId::new();
            tokio::fs::write(&path, serde_json::to_string_pretty(&user)?).await?;
            Ok(user)
        }
        Err(e) => Err(e.into()),
    }
}

fn parse_stroke(label: &str) -> anyhow::Result<Stroke> {
    Stroke::parse(label).ok_or_else(|| anyhow::anyhow!("Unknown style: {label}"))
}

fn parse_time_arg(raw: &str) -> anyhow::Result<f64> {
    parse_swim_time(raw)
        .ok_or_else(|| anyhow::anyhow!("Unreadable time {raw:?}, expected \"59.8\" or \"1:05.30\""))
}

fn parse_optional_time(value: Option<&str>) -> anyhow::Result<Option<f64>> {
    value.map(parse_time_arg).transpose()
}

fn require<T>(value: Option<T>, flag: &str) -> anyhow::Result<T> {
    value.ok_or_else(|| anyhow::anyhow!("{flag} is required for this milestone kind"))
}
