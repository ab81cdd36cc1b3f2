//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a small executable to drive `hyd_core` without the app shell.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Configuration comes from `HYD_DB_PATH`, `HYD_LOG_DIR`, `HYD_LOG_LEVEL`
//! and `HYD_LOCALE`. Notifications go to an in-memory center and are only
//! reported, never delivered.

use clap::{Parser, Subcommand, ValueEnum};
use hyd_core::{
    launch, AppConfig, AppError, HydApp, InMemoryNotificationCenter, Mood, ReminderId,
    ReminderItem,
};
use log::{info, warn};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "hyd")]
#[command(about = "Task and reminder core, driven from the terminal", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check core linkage and print its version
    Ping,
    /// Show the proposal for free text without storing it
    Classify {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Classify free text and store it as a reminder
    Add {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Open reminders, soonest first
    List,
    /// Completed reminders, latest first
    History,
    /// Complete a reminder and award its points
    Complete { id: ReminderId },
    /// Set today's mood
    Mood { mood: MoodArg },
    /// Set the user name
    Name {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Show name, points, rank and mood
    Profile,
    /// Completion statistics
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum MoodArg {
    Angry,
    Sad,
    Normal,
    Happy,
    Energized,
}

impl From<MoodArg> for Mood {
    fn from(value: MoodArg) -> Self {
        match value {
            MoodArg::Angry => Mood::Angry,
            MoodArg::Sad => Mood::Sad,
            MoodArg::Normal => Mood::Normal,
            MoodArg::Happy => Mood::Happy,
            MoodArg::Energized => Mood::Energized,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::Ping = cli.command {
        println!("hyd_core ping={}", hyd_core::ping());
        println!("hyd_core version={}", hyd_core::core_version());
        return ExitCode::SUCCESS;
    }

    match run(&cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            warn!("event=cli_command module=cli status=error");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: &Commands) -> Result<(), String> {
    let config = AppConfig::from_env();
    let mut launched = launch(&config).map_err(|err| launch_message(&err))?;
    let result = HydApp::new(&launched.conn, InMemoryNotificationCenter::new(), config.locale)
        .map_err(|err| err.to_string())
        .and_then(|mut app| execute(&mut app, command));
    launched.wait_for_sweep();
    result
}

fn execute(
    app: &mut HydApp<'_, InMemoryNotificationCenter>,
    command: &Commands,
) -> Result<(), String> {
    match command {
        Commands::Ping => {}
        Commands::Classify { text } => {
            let proposal = app.propose(&text.join(" "));
            println!("title={}", proposal.title);
            println!("type={}", proposal.task_type.label());
            println!("due={}", proposal.due_at.format("%Y-%m-%d %H:%M"));
            println!("date_detected={}", proposal.date_detected);
        }
        Commands::Add { text } => {
            let proposal = app.propose(&text.join(" "));
            let (item, report) = app.confirm(&proposal).map_err(|err| err.to_string())?;
            print_item(&item);
            println!(
                "notifications scheduled={} failed={} skipped_offsets={:?}",
                report.scheduled.len(),
                report.failed.len(),
                report.skipped_offsets
            );
        }
        Commands::List => {
            for item in app.active_reminders().map_err(|err| err.to_string())? {
                print_item(&item);
            }
        }
        Commands::History => {
            for item in app.completed_reminders().map_err(|err| err.to_string())? {
                print_item(&item);
            }
        }
        Commands::Complete { id } => {
            let outcome = app.complete(*id).map_err(|err| err.to_string())?;
            match outcome.award {
                Some(award) => {
                    println!(
                        "+{} points (total {}) rank={}",
                        award.points_added,
                        award.total_points,
                        award.rank.label()
                    );
                    if award.rank_changed() {
                        println!("rank up: {} -> {}", award.previous_rank, award.rank);
                    }
                }
                None => println!("already completed, no points awarded"),
            }
        }
        Commands::Mood { mood } => {
            let mood = Mood::from(*mood);
            app.set_mood(mood).map_err(|err| err.to_string())?;
            println!("mood={} {}", mood.as_tag(), mood.emoji());
        }
        Commands::Name { name } => {
            app.set_user_name(&name.join(" "))
                .map_err(|err| err.to_string())?;
            println!("name={}", app.profile().user_name);
        }
        Commands::Profile => {
            let profile = app.profile();
            let rank = app.rank();
            println!("name={}", profile.user_name);
            println!("points={}", profile.points);
            println!("rank={}", rank.label());
            match rank.next_threshold() {
                Some(next) => println!(
                    "next_rank_progress={}/{}",
                    profile.points - rank.min_points(),
                    next - rank.min_points()
                ),
                None => println!("next_rank_progress=max"),
            }
            match profile.mood {
                Some(mood) => println!("mood={} {}", mood.as_tag(), mood.emoji()),
                None => println!("mood=unset"),
            }
        }
        Commands::Stats => {
            let stats = app.stats().map_err(|err| err.to_string())?;
            println!("active={}", stats.active);
            println!("completed={}", stats.completed);
            println!("completion_ratio={:.2}", stats.completion_ratio);
        }
    }

    info!("event=cli_command module=cli status=ok");
    Ok(())
}

fn print_item(item: &ReminderItem) {
    println!(
        "{} [{}] {} due={}{}",
        item.id,
        item.task_type.label(),
        item.title,
        item.due_at.format("%Y-%m-%d %H:%M"),
        if item.is_completed { " done" } else { "" }
    );
}

fn launch_message(err: &AppError) -> String {
    if err.is_fatal() {
        format!("{err}; delete the database file to start over")
    } else {
        err.to_string()
    }
}
