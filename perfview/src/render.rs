//! Plain text presentation of the parsed models.

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color, Table};
use itertools::Itertools;
use num_format::{Locale, ToFormattedString};
use serde::Serialize;

use crate::annotation::{CorrelatedLine, Correlation};
use crate::event_table::EventTable;
use crate::report::{Report, ReportNode};
use crate::severity::SeverityBucket;

const SEVERITY_COLORS: [&str; 4] = ["black", "green", "orange", "red"];

pub fn severity_color(bucket: SeverityBucket) -> &'static str {
    SEVERITY_COLORS[bucket.level() as usize]
}

/// Anything above the coldest tier is shown in bold.
pub fn severity_emphasized(bucket: SeverityBucket) -> bool {
    !bucket.is_cold()
}

#[derive(Debug, Clone, Copy)]
pub struct ReportView {
    /// Hotspots with an index up to this value are offered for annotation.
    pub annotate_limit: usize,
    pub show_details: bool,
}

impl Default for ReportView {
    fn default() -> Self {
        ReportView {
            annotate_limit: 10,
            show_details: true,
        }
    }
}

pub fn report_title(name: &str) -> String {
    format!("Report of {name}")
}

pub fn render_report(report: &Report, view: &ReportView) -> String {
    let mut lines = vec![];

    for node in &report.nodes {
        match node {
            ReportNode::Line(line) => lines.push(line.text.clone()),
            ReportNode::Hotspot(hotspot) => {
                let mark = if hotspot.index <= view.annotate_limit {
                    '*'
                } else {
                    ' '
                };
                lines.push(format!("{:>4}{mark} {}", hotspot.index, hotspot.header.text));

                if view.show_details {
                    lines.extend(
                        hotspot
                            .details
                            .iter()
                            .map(|detail| format!("      {}", detail.text)),
                    );
                }
            }
        }
    }

    lines.iter().join("\n")
}

/// Names the event, hotspot and benchmark an annotation was recorded for.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnnotationContext {
    pub event: String,
    pub hotspot: String,
    pub bench: String,
}

impl AnnotationContext {
    pub fn title(&self) -> String {
        format!(
            "Annotation of \"{}\" in \"{}\" of \"{}\"",
            self.event, self.hotspot, self.bench
        )
    }
}

fn correlated_tag(line: &CorrelatedLine) -> String {
    match line {
        CorrelatedLine::NonInstruction { .. } => String::new(),
        CorrelatedLine::Ir { .. } => "ir".to_string(),
        CorrelatedLine::Instruction { severity, .. } => {
            let color = severity_color(*severity);
            if severity_emphasized(*severity) {
                format!("{color}*")
            } else {
                color.to_string()
            }
        }
    }
}

pub fn render_correlation(correlation: &Correlation, context: Option<&AnnotationContext>) -> String {
    let mut lines = vec![];

    if let Some(context) = context {
        lines.push(context.title());
    }

    for line in &correlation.lines {
        let tag = correlated_tag(line);
        match line {
            CorrelatedLine::NonInstruction { text } | CorrelatedLine::Ir { text } => {
                lines.push(format!("{tag:<8}| {text}"));
            }
            CorrelatedLine::Instruction {
                text, disassembly, ..
            } => {
                lines.push(format!("{tag:<8}| {text}"));
                if let Some(disassembly) = disassembly {
                    lines.push(format!("{:<8}| {disassembly}", "ir-asm"));
                }
            }
        }
    }

    lines.iter().join("\n")
}

pub fn hotspot_title(hotspot: &str, bench: &str) -> String {
    format!("{hotspot} in {bench}")
}

pub fn render_event_table(table: &EventTable) -> String {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .set_header(vec!["Event", "Rate", "Description", "Total"]);

    for row in &table.rows {
        let event = if row.reference {
            Cell::new(format!("REFERENCE EVENT: {}", row.display_name))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else if row.hot {
            Cell::new(&row.display_name)
                .fg(Color::Red)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(&row.display_name)
        };

        out.add_row(vec![
            event,
            Cell::new(format!("{}%", row.rate)).set_alignment(CellAlignment::Right),
            Cell::new(&row.description),
            Cell::new(row.total_count.to_formatted_string(&Locale::en))
                .set_alignment(CellAlignment::Right),
        ]);
    }

    format!(
        "Hot above {:.2}% (reference {}%, threshold {})\n{out}",
        table.boundary,
        table.reference_rate,
        table.threshold.value()
    )
}
