use crate::{
    dates::format_date,
    summary::{PeriodSummary, format_delta},
    units::WeightUnit,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(
    value: &T,
    path: P,
) -> std::io::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

pub fn write_csv<T: Serialize>(writer: impl Write, records: &[T]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in records {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(Into::into)
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    period: &'a str,
    label: &'a str,
    from: String,
    to: String,
    workouts: usize,
    workouts_delta: String,
    total_reps: u64,
    reps_delta: String,
    total_sets: usize,
    sets_delta: String,
    new_prs: usize,
    body_weight_avg: Option<f64>,
    body_weight_delta: String,
}

fn summary_rows(summaries: &[PeriodSummary], unit: WeightUnit) -> Vec<SummaryRow<'_>> {
    summaries
        .iter()
        .map(|s| {
            let d = s.deltas();
            SummaryRow {
                period: &s.key,
                label: &s.label,
                from: format_date(s.from.date()),
                to: format_date(s.to.date()),
                workouts: s.metrics.frequency,
                workouts_delta: format_delta(d.frequency),
                total_reps: s.metrics.total_reps,
                reps_delta: format_delta(d.total_reps),
                total_sets: s.metrics.total_sets,
                sets_delta: format_delta(d.total_sets),
                new_prs: s.metrics.prs.len(),
                body_weight_avg: s.body_weight_avg.map(|kg| unit.to_display(kg)),
                body_weight_delta: format_delta(d.body_weight.map(|kg| unit.to_display(kg))),
            }
        })
        .collect()
}

/// One row per period with totals and changes against the previous period.
pub fn write_summaries_csv(
    writer: impl Write,
    summaries: &[PeriodSummary],
    unit: WeightUnit,
) -> csv::Result<()> {
    write_csv(writer, &summary_rows(summaries, unit))
}

pub fn save_summaries_csv<P: AsRef<Path>>(
    path: P,
    summaries: &[PeriodSummary],
    unit: WeightUnit,
) -> csv::Result<()> {
    write_summaries_csv(std::fs::File::create(path)?, summaries, unit)
}

pub fn save_summaries_json<P: AsRef<Path>>(
    path: P,
    summaries: &[PeriodSummary],
) -> std::io::Result<()> {
    write_json(summaries, path)
}

/// One row per personal record with weights in `unit`.
pub fn save_prs_csv<P: AsRef<Path>>(
    path: P,
    summaries: &[PeriodSummary],
    unit: WeightUnit,
) -> csv::Result<()> {
    #[derive(Serialize)]
    struct Row<'a> {
        period: &'a str,
        exercise: &'a str,
        prev_best: f64,
        new_best: f64,
        unit: &'static str,
        date: String,
    }
    let rows: Vec<Row> = summaries
        .iter()
        .flat_map(|s| {
            s.metrics.prs.iter().map(move |pr| Row {
                period: &s.key,
                exercise: &pr.exercise,
                prev_best: unit.to_display(pr.prev_best),
                new_best: unit.to_display(pr.new_best),
                unit: unit.label(),
                date: format_date(pr.date),
            })
        })
        .collect();
    write_csv(std::fs::File::create(path)?, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body_weight::WeightLogs;
    use crate::periods::Granularity;
    use crate::summary::summarize;
    use crate::test_support::{exercise, set, workout};
    use crate::WorkoutRecord;

    fn records() -> Vec<WorkoutRecord> {
        vec![
            workout("a", "2024-01-01", vec![exercise("Bench Press", vec![set(60.0, 5)])]),
            workout("b", "2024-01-08", vec![exercise("Bench Press", vec![set(65.0, 5)])]),
        ]
    }

    #[test]
    fn summaries_csv_has_one_row_per_period() {
        let records = records();
        let summaries = summarize(&records, &[], &WeightLogs::new(), Granularity::Week);
        let mut out = Vec::new();
        write_summaries_csv(&mut out, &summaries, WeightUnit::Kg).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("period,label,from,to,workouts"));
        assert!(lines[1].starts_with("2024-02,2024-01-08 to 2024-01-14,2024-01-08,2024-01-14,1,±0,5,±0,1,±0,1,"));
        assert!(lines[2].contains(",—,"));
    }

    #[test]
    fn prs_csv_uses_display_unit() {
        let records = records();
        let summaries = summarize(&records, &[], &WeightLogs::new(), Granularity::Week);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prs.csv");
        save_prs_csv(&path, &summaries, WeightUnit::Lb).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            text,
            "period,exercise,prev_best,new_best,unit,date\n2024-02,Bench Press,132.3,143.3,lb,2024-01-08\n"
        );
    }

    #[test]
    fn summaries_json_round_trip() {
        let records = records();
        let summaries = summarize(&records, &[], &WeightLogs::new(), Granularity::Month);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/summary.json");
        save_summaries_json(&path, &summaries).unwrap();
        let back: Vec<PeriodSummary> =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back, summaries);
    }
}
