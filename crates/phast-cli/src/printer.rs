//! Output printers.

use crate::args::OutputMode;
use colored::Colorize;
use phast_common::issue::Severity;
use phast_common::IssueInstance;
use std::io::Write;

/// Renders a sorted stream of issue instances.
pub trait Printer {
    fn print(&self, out: &mut dyn Write, issues: &[IssueInstance]) -> std::io::Result<()>;
}

#[must_use]
pub fn printer_for(mode: OutputMode) -> Box<dyn Printer> {
    match mode {
        OutputMode::Plain => Box::new(PlainPrinter),
        OutputMode::Json => Box::new(JsonPrinter),
        OutputMode::Csv => Box::new(CsvPrinter),
        OutputMode::Checkstyle => Box::new(CheckstylePrinter),
    }
}

/// `file:line IssueType message`, the type colored by severity.
pub struct PlainPrinter;

impl Printer for PlainPrinter {
    fn print(&self, out: &mut dyn Write, issues: &[IssueInstance]) -> std::io::Result<()> {
        for issue in issues {
            let name = match issue.issue.severity {
                Severity::Critical => issue.issue.name.red().to_string(),
                Severity::Normal => issue.issue.name.yellow().to_string(),
                Severity::Low => issue.issue.name.normal().to_string(),
            };
            writeln!(
                out,
                "{}:{} {} {}",
                issue.file,
                issue.line,
                name,
                issue.message()
            )?;
        }
        Ok(())
    }
}

pub struct JsonPrinter;

impl Printer for JsonPrinter {
    fn print(&self, out: &mut dyn Write, issues: &[IssueInstance]) -> std::io::Result<()> {
        let rendered: Vec<serde_json::Value> = issues
            .iter()
            .map(|issue| {
                serde_json::json!({
                    "type": issue.issue.name,
                    "type_id": issue.issue.id,
                    "severity": issue.issue.severity.as_u8(),
                    "file": issue.file,
                    "line": issue.line,
                    "message": issue.message(),
                })
            })
            .collect();
        serde_json::to_writer_pretty(&mut *out, &rendered)
            .map_err(std::io::Error::other)?;
        writeln!(out)
    }
}

pub struct CsvPrinter;

impl Printer for CsvPrinter {
    fn print(&self, out: &mut dyn Write, issues: &[IssueInstance]) -> std::io::Result<()> {
        writeln!(out, "file,line,severity,type,message")?;
        for issue in issues {
            writeln!(
                out,
                "{},{},{},{},\"{}\"",
                issue.file,
                issue.line,
                issue.issue.severity.as_u8(),
                issue.issue.name,
                issue.message().replace('"', "\"\"")
            )?;
        }
        Ok(())
    }
}

pub struct CheckstylePrinter;

impl Printer for CheckstylePrinter {
    fn print(&self, out: &mut dyn Write, issues: &[IssueInstance]) -> std::io::Result<()> {
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(out, "<checkstyle>")?;
        let mut current_file: Option<&str> = None;
        for issue in issues {
            if current_file != Some(issue.file.as_str()) {
                if current_file.is_some() {
                    writeln!(out, "  </file>")?;
                }
                writeln!(out, "  <file name=\"{}\">", xml_escape(&issue.file))?;
                current_file = Some(issue.file.as_str());
            }
            writeln!(
                out,
                "    <error line=\"{}\" severity=\"{}\" message=\"{}\" source=\"{}\"/>",
                issue.line,
                issue.issue.severity.label(),
                xml_escape(&issue.message()),
                issue.issue.name
            )?;
        }
        if current_file.is_some() {
            writeln!(out, "  </file>")?;
        }
        writeln!(out, "</checkstyle>")
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use phast_common::issue::catalog;

    fn sample() -> Vec<IssueInstance> {
        vec![IssueInstance::new(
            &catalog::UNDECLARED_EXTENDED_CLASS,
            "src",
            1,
            vec!["\\C".to_owned()],
        )]
    }

    #[test]
    fn plain_format_matches_contract() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        PlainPrinter.print(&mut out, &sample()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "src:1 PhanUndeclaredExtendedClass Class extends undeclared class \\C\n"
        );
    }

    #[test]
    fn csv_escapes_quotes() {
        let mut out = Vec::new();
        CsvPrinter.print(&mut out, &sample()).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.starts_with("file,line,severity,type,message\n"));
        assert!(rendered.contains("src,1,10,PhanUndeclaredExtendedClass"));
    }

    #[test]
    fn checkstyle_is_well_formed_enough() {
        let mut out = Vec::new();
        CheckstylePrinter.print(&mut out, &sample()).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("<checkstyle>"));
        assert!(rendered.contains("</checkstyle>"));
        assert!(rendered.contains("source=\"PhanUndeclaredExtendedClass\""));
    }

    #[test]
    fn json_carries_type_ids() {
        let mut out = Vec::new();
        JsonPrinter.print(&mut out, &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["type"], "PhanUndeclaredExtendedClass");
        assert_eq!(value[0]["line"], 1);
    }
}
