use crate::{
    WeightUnit,
    summary::{PeriodSummary, format_delta},
};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use plotters::prelude::*;
use std::path::Path;

trait FormatOption {
    fn fmt_opt(self) -> String;
}

impl FormatOption for Option<f64> {
    fn fmt_opt(self) -> String {
        self.map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "-".into())
    }
}

impl FormatOption for f64 {
    fn fmt_opt(self) -> String {
        format!("{:.1}", self)
    }
}

/// Write an HTML report with one card per period.
///
/// When `with_chart` is set a weekly reps chart is rendered inline as SVG;
/// if drawing fails the report is still written without it.
pub fn export_html_report<P: AsRef<Path>>(
    path: P,
    summaries: &[PeriodSummary],
    unit: WeightUnit,
    with_chart: bool,
) -> std::io::Result<()> {
    let chart = if with_chart {
        match render_reps_chart(summaries) {
            Ok(svg) => Some(svg),
            Err(e) => {
                log::warn!("Failed to generate chart: {}", e);
                None
            }
        }
    } else {
        None
    };
    let markup = build_html(summaries, unit, chart.as_deref());
    std::fs::write(path, markup.into_string())
}

/// Total reps per period, oldest on the left.
fn render_reps_chart(summaries: &[PeriodSummary]) -> Result<String, Box<dyn std::error::Error>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (800, 300)).into_drawing_area();
        root.fill(&WHITE)?;
        if !summaries.is_empty() {
            let points: Vec<(usize, f64)> = summaries
                .iter()
                .rev()
                .enumerate()
                .map(|(i, s)| (i, s.metrics.total_reps as f64))
                .collect();
            let max = points.iter().map(|(_, r)| *r).fold(1.0_f64, f64::max);
            let mut chart = ChartBuilder::on(&root)
                .caption("Total Reps", ("sans-serif", 20))
                .margin(5)
                .x_label_area_size(30)
                .y_label_area_size(40)
                .build_cartesian_2d(0..points.len(), 0f64..max * 1.1)?;
            chart
                .configure_mesh()
                .disable_mesh()
                .x_desc("Period")
                .y_desc("Reps")
                .draw()?;
            chart.draw_series(LineSeries::new(points, &BLUE))?;
        }
        root.present()?;
    }
    Ok(svg)
}

fn build_html(summaries: &[PeriodSummary], unit: WeightUnit, chart_svg: Option<&str>) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head { meta charset="utf-8"; title { "Training Summary" } }
            body {
                h1 { "Training Summary" }
                @if let Some(svg) = chart_svg {
                    div class="chart" { (PreEscaped(svg)) }
                }
                @if summaries.is_empty() {
                    p { "No workouts logged yet." }
                }
                @for s in summaries {
                    @let d = s.deltas();
                    section class="period" {
                        h2 { (s.label) }
                        table border="1" {
                            tr { th { "Workouts" } td { (s.metrics.frequency) " " (format_delta(d.frequency)) } }
                            tr { th { "Total Reps" } td { (s.metrics.total_reps) " " (format_delta(d.total_reps)) } }
                            tr { th { "Total Sets" } td { (s.metrics.total_sets) " " (format_delta(d.total_sets)) } }
                            tr { th { "New PRs" } td { (s.metrics.prs.len()) " " (format_delta(d.prs)) } }
                            @if s.body_weight_avg.is_some() || s.prev_body_weight_avg.is_some() {
                                tr {
                                    th { "Avg Body Weight (" (unit) ")" }
                                    td {
                                        (s.body_weight_avg.map(|kg| unit.to_display(kg)).fmt_opt())
                                        " "
                                        (format_delta(d.body_weight.map(|kg| unit.to_display(kg))))
                                    }
                                }
                            }
                        }
                        h3 { "Reps & Sets by Muscle" }
                        table border="1" {
                            tr { th { "Muscle" } th { "Reps" } th { "Sets" } th { "Prev Reps" } th { "Prev Sets" } }
                            @for (muscle, reps) in &s.metrics.reps_by_muscle {
                                tr {
                                    td { (muscle) }
                                    td { (reps) }
                                    td { (s.metrics.sets_by_muscle.get(muscle).copied().unwrap_or(0)) }
                                    td { (s.previous.as_ref().and_then(|p| p.reps_by_muscle.get(muscle)).map(|r| r.to_string()).unwrap_or_else(|| "-".into())) }
                                    td { (s.previous.as_ref().and_then(|p| p.sets_by_muscle.get(muscle)).map(|r| r.to_string()).unwrap_or_else(|| "-".into())) }
                                }
                            }
                        }
                        @if s.metrics.prs.is_empty() {
                            p { "No new PRs this period." }
                        } @else {
                            h3 { "New PRs this period" }
                            table border="1" {
                                tr { th { "Exercise" } th { "Previous" } th { "New" } th { "Date" } }
                                @for pr in &s.metrics.prs {
                                    tr {
                                        td { (pr.exercise) }
                                        td { (unit.format(pr.prev_best)) }
                                        td { b { (unit.format(pr.new_best)) } }
                                        td { (pr.date) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
