//! Human-readable text output for scan reports.
//!
//! ```text
//! show (2 files, 1.0 MiB reclaimable)
//!   * /media/x/show.mp4  1.0 MiB
//!     /media/y/show.mp4  1.0 MiB
//!
//! 3 videos scanned in 120ms: 1 duplicate set, 1 duplicate file, 1.0 MiB reclaimable
//! ```
//!
//! The primary copy (first discovered) is marked with `*`.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::{Paint, Style};

use crate::duplicates::DuplicateSet;
use crate::engine::ScanReport;
use crate::scanner::VideoFile;

const HEADER: Style = Style::new().bold().cyan();
const PRIMARY: Style = Style::new().green();
const DIM: Style = Style::new().dim();
const WARNING: Style = Style::new().yellow();

/// Text renderer for a finished scan.
pub struct TextOutput<'a> {
    report: &'a ScanReport,
    color: bool,
    show_skipped: bool,
}

impl<'a> TextOutput<'a> {
    /// Renderer with color on and skipped entries summarized.
    #[must_use]
    pub fn new(report: &'a ScanReport) -> Self {
        Self {
            report,
            color: true,
            show_skipped: false,
        }
    }

    /// Enable or disable ANSI styling.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// List every skipped entry instead of only counting them.
    #[must_use]
    pub fn with_skipped_details(mut self, show: bool) -> Self {
        self.show_skipped = show;
        self
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let sets = self.report.sets.as_slice();
        for set in sets {
            self.write_set(writer, set)?;
            writeln!(writer)?;
        }
        self.write_summary(writer, sets)
    }

    fn write_set<W: Write>(&self, writer: &mut W, set: &DuplicateSet) -> io::Result<()> {
        let mut header = format!("{} ({} files", set.name, set.len());
        if set.wasted_size() > 0 {
            header.push_str(&format!(", {} reclaimable", ByteSize::b(set.wasted_size())));
        }
        header.push(')');
        writeln!(writer, "{}", self.paint(&header, HEADER))?;
        if let Some(hash) = set.content_hash {
            writeln!(writer, "  {}", self.paint(&format!("blake3 {}", hash.short_hex()), DIM))?;
        }

        for (index, file) in set.files.iter().enumerate() {
            let line = format_member(file);
            if index == 0 {
                writeln!(writer, "  * {}", self.paint(&line, PRIMARY))?;
            } else {
                writeln!(writer, "    {line}")?;
            }
        }
        Ok(())
    }

    fn write_summary<W: Write>(&self, writer: &mut W, sets: &[DuplicateSet]) -> io::Result<()> {
        let duplicate_files: usize = sets.iter().map(|s| s.len().saturating_sub(1)).sum();
        let reclaimable: u64 = sets.iter().map(DuplicateSet::wasted_size).sum();
        let mode = if self.report.content_verify {
            "name + content"
        } else {
            "name only"
        };

        writeln!(
            writer,
            "{} videos scanned in {:.2?} ({}, key: {}): {} duplicate {}, {} duplicate {}, {} reclaimable",
            self.report.status.total_files_seen,
            self.report.duration,
            mode,
            self.report.key_policy,
            sets.len(),
            plural(sets.len(), "set", "sets"),
            duplicate_files,
            plural(duplicate_files, "file", "files"),
            ByteSize::b(reclaimable)
        )?;

        let skipped = &self.report.skipped;
        if !skipped.is_empty() {
            let line = format!(
                "{} {} skipped",
                skipped.len(),
                plural(skipped.len(), "entry", "entries")
            );
            writeln!(writer, "{}", self.paint(&line, WARNING))?;
            if self.show_skipped {
                for error in skipped {
                    writeln!(writer, "  - {error}")?;
                }
            }
        }
        Ok(())
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            text.paint(style).to_string()
        } else {
            text.to_string()
        }
    }
}

fn format_member(file: &VideoFile) -> String {
    match file.size {
        Some(size) => format!("{}  {}", file.path.display(), ByteSize::b(size)),
        None => file.path.display().to_string(),
    }
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}
