//! Command line front end: prints period summaries and writes reports.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gym_summary::backup::{self, AppBackup};
use gym_summary::body_weight::{WeightLogs, trend_points, weekly_average_and_delta};
use gym_summary::catalog::{exercise_history, resolve_main_muscle, workouts_on};
use gym_summary::dates::{format_date, parse_date};
use gym_summary::settings::Settings;
use gym_summary::store::{AppData, JsonFileStore};
use gym_summary::summary::{PeriodSummary, format_delta};
use gym_summary::{Granularity, SetEntry, WeightUnit, export, report, summarize};

#[derive(Parser, Debug)]
#[command(name = "gym-summary", version, about = "Weekly and monthly training summaries")]
struct Cli {
    /// Read workouts from a backup file instead of the local store
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Period size: week or month
    #[arg(long, global = true)]
    period: Option<Granularity>,

    /// Display unit: kg or lb
    #[arg(long, global = true)]
    unit: Option<WeightUnit>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a card for every period
    Summary,
    /// Write an HTML report
    Report {
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        no_chart: bool,
    },
    /// Export summaries as JSON, or as CSV with --csv
    Export {
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        csv: bool,
        /// Also write a CSV of personal records next to the export
        #[arg(long)]
        prs: bool,
    },
    /// Merge a backup file into the local store
    Import { file: PathBuf },
    /// Write the local store to a backup file
    Backup { out: PathBuf },
    /// Save the given --period/--unit as defaults
    Configure {
        /// Keep the workout store in this directory
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Show logged body weight, or log one day: `weight DATE VALUE`.
    /// A date without a value clears that day.
    Weight {
        #[arg(value_parser = parse_day)]
        date: Option<NaiveDate>,
        /// Body weight in the display unit
        value: Option<f64>,
    },
    /// Add an exercise to the workout on DATE, prefilled from its last set
    Add {
        #[arg(value_parser = parse_day)]
        date: NaiveDate,
        exercise: String,
    },
    /// List every workout that included an exercise, newest first
    History { exercise: String },
    /// Show the workouts logged on one day
    Day {
        #[arg(value_parser = parse_day)]
        date: NaiveDate,
    },
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    parse_date(Some(s)).ok_or_else(|| format!("expected a date like 2024-01-31, got `{s}`"))
}

fn open_store(settings: &Settings) -> Result<JsonFileStore, Box<dyn std::error::Error>> {
    match &settings.data_dir {
        Some(dir) => Ok(JsonFileStore::new(dir)),
        None => JsonFileStore::default_location().ok_or_else(|| "no data directory available".into()),
    }
}

fn load_data(cli: &Cli, settings: &Settings) -> Result<AppData, Box<dyn std::error::Error>> {
    let store = open_store(settings)?;
    let mut data = AppData::load(&store);
    if let Some(path) = &cli.data {
        let imported = backup::import_file(path)?;
        log::info!(
            "Using {} workouts from {}",
            imported.workouts.len(),
            path.display()
        );
        data.workouts = imported.workouts;
        if !imported.exercises.is_empty() {
            data.exercises = imported.exercises;
        }
    }
    Ok(data)
}

fn print_summary(s: &PeriodSummary, unit: WeightUnit) {
    let d = s.deltas();
    println!("== {} ({}) ==", s.label, s.key);
    println!(
        "  workouts {} {}  reps {} {}  sets {} {}  new PRs {} {}",
        s.metrics.frequency,
        format_delta(d.frequency),
        s.metrics.total_reps,
        format_delta(d.total_reps),
        s.metrics.total_sets,
        format_delta(d.total_sets),
        s.metrics.prs.len(),
        format_delta(d.prs),
    );
    if let Some(avg) = s.body_weight_avg {
        println!(
            "  avg body weight {} {}",
            unit.format(avg),
            format_delta(d.body_weight.map(|kg| unit.to_display(kg)))
        );
    }
    for (muscle, reps) in &s.metrics.reps_by_muscle {
        let sets = s.metrics.sets_by_muscle.get(muscle).copied().unwrap_or(0);
        println!("  {muscle:<12} {reps:>5} reps {sets:>4} sets");
    }
    for pr in &s.metrics.prs {
        println!(
            "  PR {}: {} -> {} ({})",
            pr.exercise,
            unit.format(pr.prev_best),
            unit.format(pr.new_best),
            pr.date
        );
    }
}

fn format_sets(sets: &[SetEntry], unit: WeightUnit) -> String {
    sets.iter()
        .map(|s| format!("{} x {}", unit.format(s.weight), s.reps))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_weights(logs: &WeightLogs, unit: WeightUnit) {
    let points = trend_points(logs);
    if points.is_empty() {
        println!("No body weight logged yet.");
        return;
    }
    for (day, kg) in &points {
        println!("  {day}  {}", unit.format(*kg));
    }
    let week = weekly_average_and_delta(logs, Local::now().date_naive());
    println!(
        "This week: {} {}",
        week.current.map_or_else(|| "-".to_string(), |kg| unit.format(kg)),
        format_delta(week.delta.map(|kg| unit.to_display(kg)))
    );
}

fn print_history(data: &AppData, exercise: &str, unit: WeightUnit) {
    println!("{exercise} ({})", resolve_main_muscle(exercise, &data.exercises));
    let history = exercise_history(&data.workouts, exercise);
    if history.is_empty() {
        println!("  no workouts yet");
    }
    for (w, entry) in history {
        println!(
            "  {}  {}",
            w.date.as_deref().unwrap_or("-"),
            format_sets(&entry.sets, unit)
        );
    }
}

fn print_day(data: &AppData, day: NaiveDate, unit: WeightUnit) {
    let workouts = workouts_on(&data.workouts, day);
    if workouts.is_empty() {
        println!("No workouts on {day}.");
    }
    for w in workouts {
        println!("== {} ==", w.name);
        for ex in &w.exercises {
            println!("  {:<24} {}", ex.exercise_name, format_sets(&ex.sets, unit));
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::load();
    let granularity = cli.period.unwrap_or(settings.granularity);
    let unit = cli.unit.unwrap_or(settings.unit);

    match &cli.command {
        Command::Configure { data_dir } => {
            if let Some(period) = cli.period {
                settings.granularity = period;
            }
            if let Some(unit) = cli.unit {
                settings.unit = unit;
            }
            if let Some(dir) = data_dir {
                settings.data_dir = Some(dir.clone());
            }
            settings.save();
            println!("Saved defaults: period {}, unit {}", settings.granularity, settings.unit);
            if let Some(dir) = &settings.data_dir {
                println!("Data directory: {}", dir.display());
            }
            return Ok(());
        }
        Command::Weight {
            date: Some(date),
            value,
        } => {
            let mut store = open_store(&settings)?;
            let mut data = AppData::try_load(&store)?;
            let kg = value.filter(|v| v.is_finite()).map(|v| unit.from_display(v));
            data.record_weight(*date, kg);
            data.save(&mut store)?;
            match data.weight_logs.get(date) {
                Some(kg) => println!("Logged {} on {date}", unit.format(*kg)),
                None => println!("Cleared body weight on {date}"),
            }
            return Ok(());
        }
        Command::Add { date, exercise } => {
            let mut store = open_store(&settings)?;
            let mut data = AppData::try_load(&store)?;
            let entry = data
                .add_exercise(*date, exercise)
                .ok_or("exercise name is empty")?;
            println!(
                "Added {} on {}: {}",
                entry.exercise_name,
                format_date(*date),
                format_sets(&entry.sets, unit)
            );
            data.save(&mut store)?;
            return Ok(());
        }
        Command::Import { file } => {
            let mut store = open_store(&settings)?;
            let data = AppData::try_load(&store)?;
            let incoming = backup::import_file(file)?;
            let current = AppBackup {
                exercises: data.exercises.clone(),
                workouts: data.workouts.clone(),
            };
            let merged = current.merge(&incoming);
            let added = merged.workouts.len() - current.workouts.len();
            AppData {
                exercises: merged.exercises,
                workouts: merged.workouts,
                ..data
            }
            .save(&mut store)?;
            println!("Imported {added} workouts from {}", file.display());
            return Ok(());
        }
        _ => {}
    }

    let data = load_data(&cli, &settings)?;
    let summaries = summarize(&data.workouts, &data.exercises, &data.weight_logs, granularity);

    match &cli.command {
        Command::Summary => {
            if summaries.is_empty() {
                println!("No {granularity}ly data yet.");
            }
            for s in &summaries {
                print_summary(s, unit);
            }
        }
        Command::Report { out, no_chart } => {
            report::export_html_report(out, &summaries, unit, settings.report_chart && !no_chart)?;
            println!("Wrote {}", out.display());
        }
        Command::Export { out, csv, prs } => {
            if *csv {
                export::save_summaries_csv(out, &summaries, unit)?;
            } else {
                export::save_summaries_json(out, &summaries)?;
            }
            if *prs {
                export::save_prs_csv(out.with_extension("prs.csv"), &summaries, unit)?;
            }
            println!("Wrote {}", out.display());
        }
        Command::Backup { out } => {
            let backup = AppBackup {
                exercises: data.exercises,
                workouts: data.workouts,
            };
            backup::export_file(out, &backup)?;
            println!("Wrote {}", out.display());
        }
        Command::Weight { date: None, .. } => print_weights(&data.weight_logs, unit),
        Command::History { exercise } => print_history(&data, exercise, unit),
        Command::Day { date } => print_day(&data, *date, unit),
        Command::Configure { .. }
        | Command::Import { .. }
        | Command::Add { .. }
        | Command::Weight { date: Some(_), .. } => {}
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run(Cli::parse()) {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_options() {
        let cli = Cli::try_parse_from(["gym-summary", "summary", "--period", "month", "--unit", "lb"])
            .unwrap();
        assert_eq!(cli.period, Some(Granularity::Month));
        assert_eq!(cli.unit, Some(WeightUnit::Lb));
        assert!(matches!(cli.command, Command::Summary));
    }

    #[test]
    fn rejects_unknown_period() {
        assert!(Cli::try_parse_from(["gym-summary", "summary", "--period", "year"]).is_err());
    }

    #[test]
    fn configure_takes_data_dir() {
        let cli = Cli::try_parse_from(["gym-summary", "configure", "--data-dir", "/tmp/gym"]).unwrap();
        match cli.command {
            Command::Configure { data_dir } => assert_eq!(data_dir, Some(PathBuf::from("/tmp/gym"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn weight_arguments() {
        let cli = Cli::try_parse_from(["gym-summary", "weight", "2024-01-08", "80.5"]).unwrap();
        match cli.command {
            Command::Weight { date, value } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 8));
                assert_eq!(value, Some(80.5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        let show = Cli::try_parse_from(["gym-summary", "weight"]).unwrap();
        assert!(matches!(show.command, Command::Weight { date: None, value: None }));
        assert!(Cli::try_parse_from(["gym-summary", "weight", "08/01/2024", "80"]).is_err());
    }

    #[test]
    fn day_history_and_add() {
        let day = Cli::try_parse_from(["gym-summary", "day", "2024-01-08"]).unwrap();
        assert!(matches!(day.command, Command::Day { .. }));
        let history = Cli::try_parse_from(["gym-summary", "history", "Bench Press"]).unwrap();
        assert!(matches!(history.command, Command::History { exercise } if exercise == "Bench Press"));
        let add = Cli::try_parse_from(["gym-summary", "add", "2024-01-08", "Squat"]).unwrap();
        assert!(matches!(add.command, Command::Add { exercise, .. } if exercise == "Squat"));
    }

    #[test]
    fn format_sets_in_display_unit() {
        let sets = [SetEntry::new(1, 60.0, 5), SetEntry::new(2, 62.5, 3)];
        assert_eq!(format_sets(&sets, WeightUnit::Kg), "60 kg x 5, 62.5 kg x 3");
    }

    #[test]
    fn export_flags() {
        let cli = Cli::try_parse_from(["gym-summary", "export", "--out", "x.csv", "--csv"]).unwrap();
        match cli.command {
            Command::Export { out, csv, prs } => {
                assert_eq!(out, PathBuf::from("x.csv"));
                assert!(csv);
                assert!(!prs);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
