//! Full page layout: sidebar, header, form and the result panel.

use crate::config::APP_NAME;
use crate::models::prediction::HistoryEntry;
use crate::pipeline::processor::PredictionReport;
use crate::pipeline::reference::ReferenceStats;
use crate::ui::chart::render_comparison_chart;
use crate::ui::escape_html;
use crate::ui::form::{render_form, FormInput};
use crate::ui::history::render_history_table;

const PREVENTION_TIPS: [&str; 5] = [
    "Maintain healthy blood pressure",
    "Exercise regularly",
    "Eat a balanced diet",
    "Avoid smoking and alcohol",
    "Monitor BMI and glucose levels",
];

/// What appears under the form.
#[derive(Debug)]
pub enum Panel<'a> {
    /// No submission yet in this request. Shows earlier history, if any.
    Idle { history: &'a [HistoryEntry] },
    /// Successful prediction: result, chart, history.
    Report(&'a PredictionReport),
    /// Failed submission: only the error, no chart and no history.
    Error(String),
}

pub struct PageView<'a> {
    pub reference: &'a ReferenceStats,
    pub form: &'a FormInput,
    pub panel: Panel<'a>,
}

pub fn render_page(view: &PageView<'_>) -> String {
    let sidebar = render_sidebar(view.reference);
    let form = render_form(view.form);
    let panel = match &view.panel {
        Panel::Idle { history } => render_history_table(history),
        Panel::Report(report) => render_report(report),
        Panel::Error(message) => format!(
            r#"<div class="error" role="alert">Prediction error: {}</div>
"#,
            escape_html(message)
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{APP_NAME}</title>
<style>
*,*::before,*::after{{box-sizing:border-box}}
body{{margin:0;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:linear-gradient(160deg,#0f2027,#203a43,#2c5364);color:#f5f5f4;min-height:100vh;display:flex}}
aside{{width:280px;background:rgba(0,0,0,.35);padding:24px;flex-shrink:0}}
aside h1{{font-size:1.25rem;margin-top:0}}
main{{flex:1;max-width:760px;margin:0 auto;padding:24px}}
header h1{{text-align:center;color:white}}
header hr{{border:2px solid white}}
.columns{{display:flex;gap:24px}}
.column{{flex:1;display:flex;flex-direction:column}}
label{{margin-top:10px;font-size:.9rem}}
select,input{{padding:8px;border-radius:6px;border:1px solid #d6d3d1;font-size:1rem}}
button{{margin-top:20px;padding:10px 24px;border:none;border-radius:8px;background:#ef4444;color:white;font-size:1rem;cursor:pointer}}
.result h3,.verdict{{text-align:center}}
.verdict.high{{color:red}}
.verdict.low{{color:#22c55e}}
progress{{width:100%;height:18px}}
.chart{{width:100%;background:white;border-radius:8px}}
.error{{margin-top:20px;padding:12px 16px;border-radius:8px;background:#fee2e2;color:#991b1b}}
table{{width:100%;border-collapse:collapse;background:rgba(255,255,255,.08)}}
th,td{{padding:6px 10px;border-bottom:1px solid rgba(255,255,255,.2);text-align:left}}
</style>
</head>
<body>
{sidebar}<main>
<header>
  <h1>🧠 {APP_NAME}</h1>
  <hr>
</header>
{form}{panel}</main>
</body>
</html>
"#
    )
}

fn render_sidebar(reference: &ReferenceStats) -> String {
    let tips: String = PREVENTION_TIPS
        .iter()
        .map(|tip| format!("    <li>{tip}</li>\n"))
        .collect();
    format!(
        r#"<aside>
  <h1>🧠 Stroke Prediction Info</h1>
  <p><strong>Stroke Prevention Tips:</strong></p>
  <ul>
{tips}  </ul>
  <hr>
  <h2>Dataset Stats</h2>
  <p>Total Records: {total}</p>
  <p>Stroke Cases: {cases}</p>
</aside>
"#,
        total = reference.total_records,
        cases = reference.stroke_cases,
    )
}

fn render_report(report: &PredictionReport) -> String {
    let result = &report.result;
    let (class, icon) = match result.label.class() {
        1 => ("high", "⚠️"),
        _ => ("low", "✅"),
    };
    format!(
        r#"<section class="result">
  <h3>Probability of Stroke: {probability}</h3>
  <progress value="{progress}" max="100">{progress}%</progress>
  <h2 class="verdict {class}">{icon} {verdict}</h2>
  <h2>📊 Your Stats vs Dataset Average</h2>
{chart}</section>
{history}"#,
        probability = result.probability_display(),
        progress = result.progress_percent(),
        verdict = result.label.verdict(),
        chart = render_comparison_chart(&report.comparison),
        history = render_history_table(&report.history),
    )
}
