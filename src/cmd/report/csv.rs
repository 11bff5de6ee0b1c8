use super::{ReportDocument, ReportSink};

/// Every section as a block of CSV records, separated by blank records
pub struct CsvSink;

impl ReportSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn render(&self, documents: &[ReportDocument]) -> anyhow::Result<String> {
        let mut writer = ::csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        for document in documents {
            writer.write_record([document.title.as_str()])?;
            writer.write_record([document.subtitle.as_str()])?;
            writer.write_record(["Fingerprint", document.fingerprint.as_str()])?;
            for section in &document.sections {
                writer.write_record([""])?;
                writer.write_record([section.title.as_str()])?;
                writer.write_record(&section.columns)?;
                for row in &section.rows {
                    writer.write_record(&row.cells)?;
                }
            }
            writer.write_record([""])?;
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }
}
