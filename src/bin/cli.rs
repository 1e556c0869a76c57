use anyhow::Context;
use blind_gantt::{
    BuiltinHolidays, CalendarError, HolidayProvider, ItemRecord, PersistenceError,
    ResolutionStrategy, Schedule, ScheduleRun, WorkCalendarConfig, country_from_locale,
    load_schedule_from_csv, load_schedule_from_json, parse_sheet_date, resolve_calendar_for_items,
    save_items_to_csv, save_run_to_csv, save_schedule_to_json, schedule_years,
    scheduled_items_to_dataframe,
};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use polars::prelude::{AnyValue, DataFrame};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "blind-gantt")]
#[command(about = "Working-day schedule for tasks and milestones")]
struct Cli {
    /// Append log output to this file instead of stderr
    #[arg(long, global = true, env = "BLIND_GANTT_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a Task,Start,Duration,Predecessor sheet and print the result
    Schedule(ScheduleArgs),
}

#[derive(Args)]
struct ScheduleArgs {
    /// CSV sheet with Task, Start, Duration and Predecessor columns
    sheet: PathBuf,

    /// Reference date for status (YYYY-MM-DD), defaults to the local date
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Country code for public holidays (FR, US, BR)
    #[arg(long)]
    country: Option<String>,

    /// Locale to derive the country from when --country is absent
    #[arg(long, env = "LANG")]
    locale: Option<String>,

    /// Calendar configuration JSON (weekend_days, holidays)
    #[arg(long)]
    calendar: Option<PathBuf>,

    /// Resolve predecessors in a single pass over the sheet order
    #[arg(long)]
    single_pass: bool,

    /// Write shifted start dates back into the sheet
    #[arg(long)]
    write_back: bool,

    /// Write the scheduled items, with end date and status, to this CSV
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "blind_gantt=info,cli=info".into()),
    );

    match log_file {
        Some(path) => {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            let rule = "-".repeat(20);
            writeln!(
                file,
                "\n\n{rule} Run {} {rule}\n",
                Local::now().format("%Y-%m-%d %H:%M:%S")
            )?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .init();
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    match cli.command {
        Some(Commands::Schedule(args)) => run_batch(args),
        None => {
            run_prompt();
            Ok(())
        }
    }
}

fn run_batch(args: ScheduleArgs) -> anyhow::Result<()> {
    let mut schedule = match load_schedule_from_csv(&args.sheet) {
        Ok(schedule) => schedule,
        Err(err) => {
            error!(sheet = %args.sheet.display(), error = %err, "cannot load sheet");
            return Err(err).with_context(|| format!("loading {}", args.sheet.display()));
        }
    };
    println!("Valid tasks and milestones found: {}", schedule.len());

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let config = match &args.calendar {
        Some(path) => read_calendar_config(path)?,
        None => WorkCalendarConfig::default(),
    };
    let country = args.country.clone().or_else(|| {
        args.locale
            .as_deref()
            .and_then(|locale| match country_from_locale(locale) {
                Ok(country) => Some(country),
                Err(err) => {
                    warn!(error = %err, "cannot determine country from locale");
                    None
                }
            })
    });

    if args.single_pass {
        schedule.set_strategy(ResolutionStrategy::SinglePass);
    }
    let calendar = resolve_calendar_for_items(
        schedule.items(),
        schedule.strategy(),
        &config,
        &BuiltinHolidays,
        country.as_deref(),
        fallback_years(today),
    )?;
    schedule.set_calendar(calendar);

    let run = schedule.compute(today);
    print_run(&run)?;

    if args.write_back {
        schedule.apply_run_starts(&run);
        save_items_to_csv(&schedule, &args.sheet)?;
        println!("Start dates written back to {}", args.sheet.display());
    }
    if let Some(output) = &args.output {
        save_run_to_csv(&run, output)?;
        println!("Schedule saved to {}", output.display());
    }

    info!("execution successful");
    Ok(())
}

fn fallback_years(today: NaiveDate) -> RangeInclusive<i32> {
    today.year()..=today.year() + 1
}

fn read_calendar_config(path: &Path) -> anyhow::Result<WorkCalendarConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = serde_json::from_str(&contents)
        .with_context(|| format!("parsing calendar {}", path.display()))?;
    Ok(config)
}

fn print_run(run: &ScheduleRun) -> anyhow::Result<()> {
    let df = scheduled_items_to_dataframe(&run.items)?;
    println!("Schedule as of {} ({})", run.today, run.summary().to_cli_summary());
    for warning in &run.warnings {
        println!("warning: {warning}");
    }
    println!("{}", render_df_as_text_table(&df));
    Ok(())
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::Float64(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        other => other.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cells: Vec<Vec<String>> = (0..df.height())
        .map(|row_idx| {
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(value.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show the schedule as of the reference date\n  add <id> <start> <hours> [pred]    Upsert an item (0 hours = milestone, pred '-' = none)\n  delete <id>                        Delete an item and clear links to it\n  today [date]                       Show or set the reference date\n  compute                            Schedule and print summary and warnings\n  strategy <single|topological>      Choose how predecessors are resolved\n  calendar show                      Display weekend days and holidays\n  calendar set <json_path>           Load calendar config from JSON file\n  calendar save <json_path>          Save calendar config to JSON file\n  calendar country <code>            Add public holidays for a country (FR, US, BR)\n  calendar holiday <date>            Add a single holiday\n  save <json|csv> <path>             Persist items to disk\n  load <json|csv> <path>             Load items from disk\n  quit|exit                          Exit"
    );
}

fn print_calendar_info(schedule: &Schedule) {
    let config = schedule.calendar_config();
    let weekend = config
        .weekend_days()
        .iter()
        .map(|wd| wd.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let holidays = config
        .holidays()
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    println!("Strategy           : {}", schedule.strategy().as_str());
    println!("Weekend days       : {}", weekend);
    println!("Holidays           : {}", holidays);
}

fn parse_date_arg(value: &str) -> Option<NaiveDate> {
    parse_sheet_date(value).ok()
}

fn run_prompt() {
    let mut schedule = Schedule::new();
    let mut today = Local::now().date_naive();

    println!("Blind Gantt - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" | "compute" => {
                let run = schedule.compute(today);
                if cmd == "compute" {
                    println!("Computed ({})", run.summary().to_cli_summary());
                    for warning in &run.warnings {
                        println!("warning: {warning}");
                    }
                }
                match scheduled_items_to_dataframe(&run.items) {
                    Ok(df) => println!("{}", render_df_as_text_table(&df)),
                    Err(e) => println!("Error building table: {}", e),
                }
            }
            "add" => {
                let id = parts.next();
                let start_s = parts.next();
                let hours_s = parts.next();
                let pred = parts.next();
                match (id, start_s, hours_s) {
                    (Some(id), Some(start_s), Some(hours_s)) => {
                        let Some(start) = parse_date_arg(start_s) else {
                            println!("Invalid start date (YYYY-MM-DD or DD/MM/YYYY)");
                            continue;
                        };
                        let hours: f64 = match hours_s.replace(',', ".").parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid duration in hours");
                                continue;
                            }
                        };
                        let mut record = ItemRecord::new(id, start, hours);
                        if let Some(pred) = pred {
                            record = record.with_predecessor(pred);
                        }
                        match schedule.upsert_item(record) {
                            Ok(_) => println!("Item {id} saved."),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: add <id> <start> <hours> [pred]"),
                }
            }
            "delete" => match parts.next() {
                Some(id) => {
                    if schedule.delete_item(id) {
                        println!("Deleted item {id}.");
                    } else {
                        println!("Item {id} not found.");
                    }
                }
                None => println!("Usage: delete <id>"),
            },
            "today" => match parts.next() {
                None => println!("Reference date: {today}"),
                Some(value) => match parse_date_arg(value) {
                    Some(date) => {
                        today = date;
                        println!("Reference date set to {today}.");
                    }
                    None => println!("Invalid date (YYYY-MM-DD or DD/MM/YYYY)"),
                },
            },
            "strategy" => match parts
                .next()
                .and_then(|value| value.parse::<ResolutionStrategy>().ok())
            {
                Some(strategy) => {
                    schedule.set_strategy(strategy);
                    println!("Strategy set to {}.", strategy.as_str());
                }
                None => println!("Usage: strategy <single|topological>"),
            },
            "calendar" => handle_calendar(&mut schedule, parts.next(), parts.next(), today),
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                let result = match (fmt, path) {
                    (Some("json"), Some(path)) => save_schedule_to_json(&schedule, path),
                    (Some("csv"), Some(path)) => save_items_to_csv(&schedule, path),
                    _ => {
                        println!("Usage: save <json|csv> <path>");
                        continue;
                    }
                };
                match result {
                    Ok(_) => println!("Schedule saved to {}.", path.unwrap_or_default()),
                    Err(e) => println!("Error saving schedule: {}", e),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                let result = match (fmt, path) {
                    (Some("json"), Some(path)) => load_schedule_from_json(path),
                    (Some("csv"), Some(path)) => load_schedule_from_csv(path).map(|mut loaded| {
                        loaded.set_calendar(schedule.calendar().clone());
                        loaded.set_strategy(schedule.strategy());
                        loaded
                    }),
                    _ => {
                        println!("Usage: load <json|csv> <path>");
                        continue;
                    }
                };
                match result {
                    Ok(loaded) => {
                        schedule = loaded;
                        println!(
                            "Schedule loaded from {} ({} items).",
                            path.unwrap_or_default(),
                            schedule.len()
                        );
                    }
                    Err(PersistenceError::Invalid(errors)) => {
                        println!("Schedule not loaded: {}", errors);
                    }
                    Err(e) => println!("Error loading schedule: {}", e),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}

fn handle_calendar(
    schedule: &mut Schedule,
    action: Option<&str>,
    argument: Option<&str>,
    today: NaiveDate,
) {
    match (action, argument) {
        (Some("show") | None, _) => print_calendar_info(schedule),
        (Some("set"), Some(path)) => match read_calendar_config(Path::new(path)) {
            Ok(config) => match schedule.set_calendar_from_config(&config) {
                Ok(_) => {
                    println!("Calendar updated from {}.", path);
                    print_calendar_info(schedule);
                }
                Err(e) => println!("Error applying calendar: {}", e),
            },
            Err(e) => println!("Error reading calendar: {:#}", e),
        },
        (Some("save"), Some(path)) => match serde_json::to_string_pretty(&schedule.calendar_config())
        {
            Ok(json) => match fs::write(path, json) {
                Ok(_) => println!("Calendar saved to {}.", path),
                Err(e) => println!("Error writing {}: {}", path, e),
            },
            Err(e) => println!("Error serializing calendar: {}", e),
        },
        (Some("country"), Some(code)) => {
            let years = schedule_years(schedule.items(), schedule.calendar())
                .unwrap_or_else(|| fallback_years(today));
            if let Err(e) = BuiltinHolidays.holidays(code, years) {
                println!("Cannot load holidays for {code}: {e}");
                return;
            }
            let before = schedule.calendar().holidays().len();
            match resolve_calendar_for_items(
                schedule.items(),
                schedule.strategy(),
                &schedule.calendar_config(),
                &BuiltinHolidays,
                Some(code),
                fallback_years(today),
            ) {
                Ok(calendar) => {
                    let added = calendar.holidays().len().saturating_sub(before);
                    schedule.set_calendar(calendar);
                    println!("Added {added} holiday(s) for {code}.");
                }
                Err(CalendarError::NoWorkingDays) => {
                    println!("Calendar has no working days.");
                }
                Err(e) => println!("Error: {}", e),
            }
        }
        (Some("holiday"), Some(value)) => match parse_date_arg(value) {
            Some(date) => {
                let mut calendar = schedule.calendar().clone();
                calendar.add_holiday(date);
                schedule.set_calendar(calendar);
                println!("Holiday {date} added.");
            }
            None => println!("Invalid date (YYYY-MM-DD or DD/MM/YYYY)"),
        },
        (Some(other), _) => {
            println!("Unknown or incomplete calendar command '{}'.", other);
            println!("Usage: calendar show|set <json>|save <json>|country <code>|holiday <date>");
        }
    }
}
