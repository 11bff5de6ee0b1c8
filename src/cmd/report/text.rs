use super::{ReportDocument, ReportSink};
use std::fmt::Write;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Modify, Style},
};

/// Plain-text tables; needs nothing beyond stdout, so it is also the fallback
pub struct TextSink;

impl ReportSink for TextSink {
    fn name(&self) -> &'static str {
        "text"
    }

    fn render(&self, documents: &[ReportDocument]) -> anyhow::Result<String> {
        let mut out = String::new();
        for document in documents {
            writeln!(out, "{}", document.title)?;
            writeln!(out, "{}", document.subtitle)?;
            for section in &document.sections {
                let mut builder = Builder::default();
                builder.push_record(section.columns.iter().cloned());
                for row in &section.rows {
                    builder.push_record(row.cells.iter().cloned());
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Columns::new(1..)).with(Alignment::right()));
                writeln!(out)?;
                writeln!(out, "{}", section.title)?;
                writeln!(out, "{}", table)?;
            }
            writeln!(out, "Input fingerprint: {}", document.fingerprint)?;
            writeln!(out)?;
        }
        Ok(out)
    }
}
