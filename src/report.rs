use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dataset::{Tier, TARGET_YEAR};
use crate::extract::Extraction;
use crate::pipeline::ResultTable;

const ROLE_WIDTH: usize = 28;
const FIGURE_WIDTH: usize = 18;

/// `1234567.891` -> `1,234,567.89`
pub fn format_money(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}

pub fn render_table(table: &ResultTable) -> String {
    let mut out = String::new();
    out.push_str(&format!("Predicted Salaries for {}:\n", TARGET_YEAR));

    let headers: Vec<String> = Tier::ALL
        .iter()
        .map(|t| format!("{} {}", t.label(), TARGET_YEAR))
        .collect();
    out.push_str(&format!(
        "{:<rw$} | {:>fw$} | {:>fw$} | {:>fw$}\n",
        "Role",
        headers[0],
        headers[1],
        headers[2],
        rw = ROLE_WIDTH,
        fw = FIGURE_WIDTH
    ));
    out.push_str(&"-".repeat(ROLE_WIDTH + 3 * (FIGURE_WIDTH + 3)));
    out.push('\n');

    for row in &table.rows {
        out.push_str(&format!(
            "{:<rw$} | {:>fw$} | {:>fw$} | {:>fw$}\n",
            truncate(&row.role, ROLE_WIDTH),
            format_money(row.entry),
            format_money(row.mid),
            format_money(row.senior),
            rw = ROLE_WIDTH,
            fw = FIGURE_WIDTH
        ));
    }

    if table.rows.is_empty() {
        out.push_str("(no roles present in all three datasets)\n");
    }
    if !table.fallbacks.is_empty() {
        let names: Vec<&str> = table.fallbacks.iter().map(|s| s.as_str()).collect();
        out.push_str(&format!("\nBuilt-in data used for: {}\n", names.join(", ")));
    }
    out
}

#[derive(Serialize)]
struct Export<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    table: &'a ResultTable,
}

pub fn render_json(table: &ResultTable, generated_at: DateTime<Utc>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Export {
        generated_at,
        table,
    })
}

pub fn render_extractions(rows: &[Extraction]) -> String {
    let mut out = String::from("Extracted postings:\n");
    for (i, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>3} | {:<28} | {:<12} | {}\n",
            i + 1,
            truncate(&row.role, 28),
            truncate(&row.level, 12),
            row.salary_range.as_deref().unwrap_or("-")
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
