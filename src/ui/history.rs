//! Session prediction history table.

use crate::models::prediction::HistoryEntry;
use crate::ui::escape_html;

/// Table of past predictions, oldest first. Nothing at all when empty.
pub fn render_history_table(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let rows: String = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "      <tr><td>{i}</td><td>{age}</td><td>{prediction}</td><td>{probability}</td></tr>\n",
                age = entry.age,
                prediction = escape_html(&entry.prediction),
                probability = escape_html(&entry.probability),
            )
        })
        .collect();

    format!(
        r#"<section class="history">
  <h2>📝 Prediction History</h2>
  <table>
    <thead><tr><th></th><th>Age</th><th>Prediction</th><th>Probability</th></tr></thead>
    <tbody>
{rows}    </tbody>
  </table>
</section>
"#
    )
}
