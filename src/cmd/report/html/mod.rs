//! HTML report generation.

use super::{ReportDocument, ReportSink};
use std::fmt::Write;

const TEMPLATE: &str = include_str!("report.html");
const CSS: &str = include_str!("report.css");

/// Self-contained HTML page, optionally using a caller-supplied template
pub struct HtmlSink {
    template: Option<String>,
}

impl HtmlSink {
    pub fn new(template: Option<String>) -> Self {
        HtmlSink { template }
    }
}

impl ReportSink for HtmlSink {
    fn name(&self) -> &'static str {
        "html"
    }

    fn render(&self, documents: &[ReportDocument]) -> anyhow::Result<String> {
        let template = self.template.as_deref().unwrap_or(TEMPLATE);
        if !template.contains("__BODY__") {
            anyhow::bail!("HTML template has no __BODY__ placeholder");
        }

        let title = match documents {
            [single] => single.title.clone(),
            _ => format!("Income Tax Computations ({})", documents.len()),
        };
        let mut body = String::new();
        for document in documents {
            write_document(&mut body, document)?;
        }

        Ok(template
            .replace("__TITLE__", &escape(&title))
            .replace("__CSS__", CSS)
            .replace("__BODY__", &body))
    }
}

fn write_document(out: &mut String, document: &ReportDocument) -> std::fmt::Result {
    writeln!(out, "<article class=\"statement\">")?;
    writeln!(out, "<h1>{}</h1>", escape(&document.title))?;
    writeln!(out, "<p class=\"subtitle\">{}</p>", escape(&document.subtitle))?;
    for section in &document.sections {
        writeln!(out, "<section>")?;
        writeln!(out, "<h2>{}</h2>", escape(&section.title))?;
        writeln!(out, "<table>")?;
        write!(out, "<thead><tr>")?;
        for column in &section.columns {
            write!(out, "<th>{}</th>", escape(column))?;
        }
        writeln!(out, "</tr></thead>")?;
        writeln!(out, "<tbody>")?;
        for row in &section.rows {
            if row.emphasis {
                write!(out, "<tr class=\"total\">")?;
            } else {
                write!(out, "<tr>")?;
            }
            for (i, cell) in row.cells.iter().enumerate() {
                let class = if i == 0 { "label" } else { "amount" };
                write!(out, "<td class=\"{}\">{}</td>", class, escape(cell))?;
            }
            writeln!(out, "</tr>")?;
        }
        writeln!(out, "</tbody>")?;
        writeln!(out, "</table>")?;
        writeln!(out, "</section>")?;
    }
    writeln!(
        out,
        "<footer>Input fingerprint <code>{}</code></footer>",
        escape(&document.fingerprint)
    )?;
    writeln!(out, "</article>")
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::report::{Row, Section};

    fn document() -> ReportDocument {
        ReportDocument {
            title: "INCOME TAX COMPUTATION - A.Y. 2026-27".to_string(),
            subtitle: "Smith & <Sons> | New regime".to_string(),
            fingerprint: "abc123".to_string(),
            sections: vec![Section {
                title: "TAX COMPUTATION".to_string(),
                columns: vec!["Particulars".to_string(), "Amount".to_string()],
                rows: vec![Row {
                    cells: vec!["NET PAYABLE".to_string(), "₹31,200.00".to_string()],
                    emphasis: true,
                }],
            }],
        }
    }

    #[test]
    fn renders_builtin_template() {
        let html = HtmlSink::new(None).render(&[document()]).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>INCOME TAX COMPUTATION - A.Y. 2026-27</title>"));
        assert!(html.contains("Smith &amp; &lt;Sons&gt;"));
        assert!(html.contains("<tr class=\"total\"><td class=\"label\">NET PAYABLE</td>"));
        assert!(!html.contains("__CSS__"));
    }

    #[test]
    fn custom_template() {
        let template = "<html><h6>__TITLE__</h6>__BODY__</html>".to_string();
        let html = HtmlSink::new(Some(template)).render(&[document()]).unwrap();
        assert!(html.starts_with("<html><h6>INCOME TAX COMPUTATION"));
        assert!(html.contains("<code>abc123</code>"));
    }

    #[test]
    fn template_without_body_is_rejected() {
        let sink = HtmlSink::new(Some("<html>__TITLE__</html>".to_string()));
        assert!(sink.render(&[document()]).is_err());
    }
}
