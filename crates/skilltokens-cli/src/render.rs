//! Human-readable report rendering.
//!
//! The reference column is labeled with the comparison ref's name here and
//! only here; the report itself uses a fixed `reference` field.

use skilltokens_core::{Report, SkillRows, SummaryEntry};
use std::fmt::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Plain aligned text table
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Headers for text columns; every column after `text_columns` is numeric
    pub fn new(headers: &[&str], text_columns: usize) -> Self {
        let align = (0..headers.len())
            .map(|i| if i < text_columns { Align::Left } else { Align::Right })
            .collect();
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            align,
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn write_line(&self, f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
        let mut line = String::new();
        for (i, width) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            if i > 0 {
                line.push_str("  ");
            }
            match self.align[i] {
                Align::Left => write!(line, "{:<width$}", cell, width = width)?,
                Align::Right => write!(line, "{:>width$}", cell, width = width)?,
            }
        }
        writeln!(f, "{}", line.trim_end())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        self.write_line(f, &self.headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        self.write_line(f, &rule, &widths)?;
        for row in &self.rows {
            self.write_line(f, row, &widths)?;
        }
        Ok(())
    }
}

/// Render the whole report as text
pub fn render_report(report: &Report) -> String {
    ReportText(report).to_string()
}

/// Human-readable view of a [`Report`]
struct ReportText<'a>(&'a Report);

impl fmt::Display for ReportText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let compare_ref = report.compare_ref.as_deref();

        match compare_ref {
            Some(r) => writeln!(
                f,
                "Analyzing {} skill(s) and comparing with [{}]...",
                report.skills.len(),
                r
            )?,
            None => writeln!(f, "Analyzing {} skill(s)...", report.skills.len())?,
        }

        for skill in &report.skills {
            match &skill.breakdown {
                SkillRows::Merged(rows) => {
                    let ref_label = compare_ref.unwrap_or("Reference");
                    writeln!(f, "\n--- Token Breakdown for {} ---", skill.name)?;
                    let mut table = Table::new(&["Entity", "Type", "Local", ref_label, "Delta"], 2);
                    for row in rows {
                        table.row(vec![
                            row.entity.clone(),
                            row.kind.to_string(),
                            row.local.to_string(),
                            row.reference.to_string(),
                            row.delta.to_string(),
                        ]);
                    }
                    write!(f, "{}", table)?;
                }
                SkillRows::Local(units) => {
                    writeln!(f, "\n--- Local Token Breakdown for {} ---", skill.name)?;
                    let mut table = Table::new(&["Entity", "Type", "Tokens"], 2);
                    for unit in units {
                        table.row(vec![
                            unit.entity.clone(),
                            unit.kind.to_string(),
                            unit.tokens.to_string(),
                        ]);
                    }
                    write!(f, "{}", table)?;
                }
            }
        }

        f.write_str("\n=========================================\n")?;
        f.write_str("--- Overall Skills Token Summary ---\n")?;
        write!(f, "{}", summary_table(report))?;

        match (compare_ref, report.grand_total_ref, report.grand_delta) {
            (Some(r), Some(total_ref), Some(delta)) => {
                writeln!(f, "\nGrand Total (Local): {}", report.grand_total_local)?;
                writeln!(f, "Grand Total ([{}]): {}", r, total_ref)?;
                writeln!(f, "Grand Delta: {}", delta)?;
            }
            _ => writeln!(f, "\nGrand Total Tokens: {}", report.grand_total_local)?,
        }
        f.write_str("=========================================\n")
    }
}

fn summary_table(report: &Report) -> Table {
    match report.compare_ref.as_deref() {
        Some(r) => {
            let mut table = Table::new(&["Skill", "Local", r, "Delta"], 1);
            for entry in &report.summary {
                if let SummaryEntry::Compared {
                    skill,
                    local,
                    reference,
                    delta,
                } = entry
                {
                    table.row(vec![
                        skill.clone(),
                        local.to_string(),
                        reference.to_string(),
                        delta.to_string(),
                    ]);
                }
            }
            table
        }
        None => {
            let mut table = Table::new(&["Skill", "Tokens"], 1);
            for entry in &report.summary {
                table.row(vec![
                    entry.skill().to_string(),
                    entry.local_total().to_string(),
                ]);
            }
            table
        }
    }
}
