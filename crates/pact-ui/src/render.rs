//! Plain-text rendering of the calendar and table views.

use std::fmt::Write;

use chrono::Datelike;
use pact_calendar::{color_for_pact, AnnotatedWeek, MonthRef, WEEKDAY_LABELS};
use pact_services::{CalendarZone, Pact};

const CELL_WIDTH: usize = 5;

/// Render a month as a grid, followed by the pacts of each day.
///
/// Day numbers are marked `*` when the day has pacts, `.` when it only carries
/// the activity marker, and wrapped in brackets for today.
pub fn render_month(month: MonthRef, weeks: &[AnnotatedWeek]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", month.title());

    for label in WEEKDAY_LABELS {
        let _ = write!(out, "{:>width$}", label, width = CELL_WIDTH);
    }
    out.push('\n');

    for week in weeks {
        for slot in week {
            let text = match slot {
                None => String::new(),
                Some(cell) => {
                    let marker = if !cell.pacts.is_empty() {
                        "*"
                    } else if cell.has_activity {
                        "."
                    } else {
                        ""
                    };
                    if cell.is_today {
                        format!("[{}]{}", cell.date.day(), marker)
                    } else {
                        format!("{}{}", cell.date.day(), marker)
                    }
                }
            };
            let _ = write!(out, "{:>width$}", text, width = CELL_WIDTH);
        }
        out.push('\n');
    }

    let busy_days = weeks
        .iter()
        .flatten()
        .flatten()
        .filter(|cell| !cell.pacts.is_empty());
    for cell in busy_days {
        let _ = writeln!(out, "\n{}  {}", cell.date.format("%b %d"), cell.summary());
        for pact in &cell.pacts {
            let _ = writeln!(out, "    {} [{}]", pact.name, color_for_pact(pact));
        }
    }

    out
}

/// Render pacts as an aligned table.
pub fn render_table(pacts: &[Pact], zone: &CalendarZone) -> String {
    const HEADERS: [&str; 4] = ["Name", "Category", "Date", "Description"];

    let rows: Vec<[String; 4]> = pacts
        .iter()
        .map(|pact| {
            let date = match (pact.timestamp(), pact.date.as_deref()) {
                (Some(ts), _) => ts.day_key(zone).format("%Y-%m-%d").to_string(),
                (None, Some(raw)) => raw.to_string(),
                (None, None) => "-".to_string(),
            };
            [
                pact.name.clone(),
                pact.category.clone().unwrap_or_else(|| "-".to_string()),
                date,
                pact.description.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, field) in widths.iter_mut().zip(row) {
            *width = (*width).max(field.chars().count());
        }
    }

    let mut out = String::new();
    write_row(&mut out, &HEADERS.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
    for row in &rows {
        write_row(&mut out, row, &widths);
    }
    if rows.is_empty() {
        out.push_str("(no pacts)\n");
    }
    out
}

fn write_row(out: &mut String, fields: &[String; 4], widths: &[usize; 4]) {
    let cells: Vec<String> = fields
        .iter()
        .zip(widths)
        .map(|(field, width)| format!("{:<width$}", field, width = *width))
        .collect();
    let _ = writeln!(out, "{}", cells.join("  ").trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pact_calendar::{aggregate, annotate, build_month_grid};

    fn pact(name: &str, date: Option<&str>, category: Option<&str>) -> Pact {
        Pact {
            id: name.to_lowercase(),
            name: name.to_string(),
            description: "desc".to_string(),
            date: date.map(str::to_string),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn test_render_month_marks_days() {
        let zone = CalendarZone::utc();
        let pacts = vec![pact("Run 5k", Some("2025-03-10T07:00:00Z"), Some("health"))];
        let month = MonthRef::new(2025, 3).unwrap();
        let grid = build_month_grid(month);
        let buckets = aggregate(&pacts, &zone);
        let weeks = annotate(&grid, &buckets, NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(), false);

        let text = render_month(month, &weeks);
        assert!(text.starts_with("March 2025\n"));
        assert!(text.contains("10*"));
        assert!(text.contains("[12]"));
        assert!(text.contains("Mar 10  Pacts: Run 5k"));
        assert!(text.contains("Run 5k [#00ff00]"));
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let zone = CalendarZone::utc();
        let pacts = vec![
            pact("Read", None, Some("learning")),
            pact("Meditate", Some("2025-01-02T06:00:00Z"), None),
        ];
        let text = render_table(&pacts, &zone);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Name      Category"));
        assert!(lines[2].starts_with("Read      learning"));
        assert!(lines[3].contains("2025-01-02"));
    }

    #[test]
    fn test_render_empty_table() {
        let text = render_table(&[], &CalendarZone::utc());
        assert!(text.ends_with("(no pacts)\n"));
    }
}
