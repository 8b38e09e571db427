//! The produktiv command line interface.
//!
//! Opens the SQLite database, runs the salary-cycle rollover check, and
//! prints scoped ledger summaries and goal progress for one user.

use std::{
    path::PathBuf,
    process::ExitCode,
    sync::{Arc, Mutex},
};

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde_json::json;
use time::{Date, macros::format_description};
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use produktiv::{
    AppConfig, Error,
    goal::{days_remaining, target_progress, task_progress},
    initialize_db,
    ledger::{aggregate, category_list, global_balance, run_rollover},
    models::UserId,
    scope::{Scope, Window, WindowOffset},
    stores::{
        GoalStore, GoalTaskStore, TransactionQuery, TransactionStore,
        sqlite::{
            SQLiteGoalStore, SQLiteGoalTaskStore, SQLiteRolloverStore, SQLiteTransactionStore,
        },
    },
    timezone,
};

#[derive(Parser)]
#[command(name = "produktiv", about = "Personal ledger and goal tracking", version)]
struct Cli {
    /// Path to the SQLite database file.
    #[arg(long, default_value = "produktiv.db")]
    db: PathBuf,

    /// The ID of the user whose records to operate on.
    #[arg(long)]
    user: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the ledger summary for a reporting window.
    Summary {
        /// The reporting scope: daily, weekly, or monthly.
        scope: String,

        /// Week or month offset relative to the current period.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,

        /// An absolute date (YYYY-MM-DD) for daily navigation.
        #[arg(long)]
        date: Option<String>,

        /// Only include this category ("all" disables the filter).
        #[arg(long)]
        category: Option<String>,

        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run the salary-cycle rollover check for today.
    Rollover,

    /// List goals with their task and target progress.
    Goals,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer().with_filter(
                filter::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| filter::EnvFilter::new("info")),
            ),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = AppConfig::from_env();
    let connection = Connection::open(&cli.db).map_err(Error::from)?;
    initialize_db(&connection).map_err(Error::from)?;
    let connection = Arc::new(Mutex::new(connection));
    let owner = UserId::new(cli.user);

    match cli.command {
        Command::Summary {
            scope,
            offset,
            date,
            category,
            json,
        } => print_summary(&connection, &config, &owner, &scope, offset, date, category, json),
        Command::Rollover => print_rollover(&connection, &config, &owner),
        Command::Goals => print_goals(&connection, &config, &owner),
    }
}

fn parse_date(input: &str) -> Result<Date, Error> {
    let format = format_description!("[year]-[month]-[day]");

    Date::parse(input, &format).map_err(|_| Error::InvalidDate(input.to_owned()))
}

#[allow(clippy::too_many_arguments)]
fn print_summary(
    connection: &Arc<Mutex<Connection>>,
    config: &AppConfig,
    owner: &UserId,
    scope: &str,
    offset: i64,
    date: Option<String>,
    category: Option<String>,
    json: bool,
) -> Result<(), Error> {
    let mut transactions = SQLiteTransactionStore::new(connection.clone());
    let mut rollovers = SQLiteRolloverStore::new(connection.clone());

    let now = timezone::now_in(&config.reporting_timezone)?;
    run_rollover(
        &mut transactions,
        &mut rollovers,
        owner,
        config.rollover_day,
        now,
    )?;

    let scope: Scope = scope.parse()?;
    let window_offset = match scope {
        Scope::Daily => match date {
            Some(date) => WindowOffset::Date(parse_date(&date)?),
            None => WindowOffset::None,
        },
        Scope::Weekly => WindowOffset::Weeks(offset),
        Scope::Monthly => WindowOffset::Months(offset),
    };
    let window = Window::resolve(scope, window_offset, now.date());
    let reporting_offset = timezone::reporting_offset(&config.reporting_timezone, now)?;

    // Daily and weekly views report over records filed under their own tab;
    // the monthly view reports over everything in the month.
    let records = match scope {
        Scope::Daily | Scope::Weekly => transactions.get_query(
            owner,
            TransactionQuery {
                scope: Some(scope),
                occurred_range: Some(window.bounds(reporting_offset)),
                ..Default::default()
            },
        )?,
        Scope::Monthly => transactions.get_all(owner)?,
    };

    let summary = aggregate(&records, &window, reporting_offset, category.as_deref());
    let all_records = transactions.get_all(owner)?;
    let balance = global_balance(&all_records);
    let categories = category_list(&records);

    if json {
        let output = json!({
            "window": window,
            "summary": summary,
            "global_balance": balance,
            "categories": categories,
        });
        let output = serde_json::to_string_pretty(&output)
            .map_err(|error| Error::Serialization(error.to_string()))?;
        println!("{output}");

        return Ok(());
    }

    println!("{}", window.label);
    println!();
    println!("  income:  {}", summary.total_income);
    println!("  expense: {}", summary.total_expense);
    println!("  balance: {}", summary.balance);
    println!("  global balance: {balance}");
    println!();
    println!("  categories: {}", categories.join(", "));
    println!();

    for bucket in &summary.series {
        println!(
            "  {:>5}  +{:<12} -{}",
            bucket.label, bucket.income, bucket.expense
        );
    }

    Ok(())
}

fn print_rollover(
    connection: &Arc<Mutex<Connection>>,
    config: &AppConfig,
    owner: &UserId,
) -> Result<(), Error> {
    let mut transactions = SQLiteTransactionStore::new(connection.clone());
    let mut rollovers = SQLiteRolloverStore::new(connection.clone());

    let now = timezone::now_in(&config.reporting_timezone)?;
    let inserted = run_rollover(
        &mut transactions,
        &mut rollovers,
        owner,
        config.rollover_day,
        now,
    )?;

    match inserted {
        Some(transaction) => println!(
            "balance reset: {} {} recorded",
            transaction.kind, transaction.amount
        ),
        None => println!("nothing to do"),
    }

    Ok(())
}

fn print_goals(
    connection: &Arc<Mutex<Connection>>,
    config: &AppConfig,
    owner: &UserId,
) -> Result<(), Error> {
    let goals = SQLiteGoalStore::new(connection.clone());
    let tasks = SQLiteGoalTaskStore::new(connection.clone());

    let today = timezone::today_in(&config.reporting_timezone)?;

    for goal in goals.get_all(owner, None)? {
        let goal_tasks = tasks.get_for_goal(owner, goal.id)?;
        let progress = task_progress(&goal_tasks);

        println!("[{}] {} ({})", goal.status, goal.title, goal.category);
        println!(
            "  tasks: {}/{} ({:.0}%)",
            progress.completed, progress.total, progress.percent
        );

        if let Some(percent) = target_progress(&goal) {
            let unit = goal.unit.as_deref().unwrap_or_default();
            println!(
                "  target: {}/{} {} ({percent:.0}%)",
                goal.current_value,
                goal.target_value.unwrap_or_default(),
                unit
            );
        }

        if let Some(days) = days_remaining(&goal, today) {
            println!("  deadline: {} days remaining", days);
        }
    }

    Ok(())
}
