//! Writing run reports as JSON or JSONL.
//!
//! JSONL reports are streamed as each run completes; a JSON array is buffered
//! and written on [`ReportWriter::finish`].

use std::io::{self, Write};

use crate::types::RunReport;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON array of reports
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Writes [`RunReport`]s and tallies their outcomes.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    pending: Vec<RunReport>,
    succeeded: usize,
    failed: usize,
}

impl<W: Write> ReportWriter<W> {
    /// `pretty` only affects the JSON array format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            pending: Vec::new(),
            succeeded: 0,
            failed: 0,
        }
    }

    /// Record one report, writing it immediately in JSONL mode.
    pub fn push(&mut self, report: RunReport) -> io::Result<()> {
        if report.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        match self.format {
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, &report).map_err(io::Error::other)?;
                writeln!(self.writer)?;
                self.writer.flush()
            }
            OutputFormat::Json => {
                self.pending.push(report);
                Ok(())
            }
        }
    }

    /// Write any buffered reports and flush. Returns `(succeeded, failed)`.
    pub fn finish(mut self) -> io::Result<(usize, usize)> {
        if self.format == OutputFormat::Json {
            if self.pretty {
                serde_json::to_writer_pretty(&mut self.writer, &self.pending)
                    .map_err(io::Error::other)?;
            } else {
                serde_json::to_writer(&mut self.writer, &self.pending).map_err(io::Error::other)?;
            }
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok((self.succeeded, self.failed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_report(name: &str) -> RunReport {
        RunReport {
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            image_id: Some(format!("id-{name}")),
            captions: vec![],
            error: None,
        }
    }

    #[test]
    fn test_jsonl_streams_each_report() {
        let mut buffer = Vec::new();
        let mut writer = ReportWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer.push(ok_report("a.png")).unwrap();
        writer
            .push(RunReport::failed("b.txt", "text/plain", "Unsupported file type: text/plain".into()))
            .unwrap();
        assert_eq!(writer.finish().unwrap(), (1, 1));

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"file_name\":\"a.png\""));
        assert!(lines[1].contains("Unsupported file type"));
    }

    #[test]
    fn test_json_writes_single_array_on_finish() {
        let mut buffer = Vec::new();
        let mut writer = ReportWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.push(ok_report("a.png")).unwrap();
        writer.push(ok_report("b.png")).unwrap();
        assert_eq!(writer.finish().unwrap(), (2, 0));

        let output = String::from_utf8(buffer).unwrap();
        let parsed: Vec<RunReport> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].image_id.as_deref(), Some("id-b.png"));
    }

    #[test]
    fn test_json_with_no_reports_is_empty_array() {
        let mut buffer = Vec::new();
        let writer = ReportWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.finish().unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap().trim(), "[]");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("jsonl"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("NDJSON"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("invalid"), None);
    }
}
