use crate::analytics::aggregate;
use crate::domain::models::{DateRange, FeedbackRecord, CATEGORIES};
use serde::Serialize;

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Free text goes out as CDATA; an embedded `]]>` terminator is split so it
/// cannot close the section early.
fn cdata(value: &str) -> String {
    format!("<![CDATA[{}]]>", value.replace("]]>", "]]]]><![CDATA[>"))
}

/// Structured-markup export of the filtered view: one `<feedback>` element
/// per record, category ratings nested with the category id as attribute.
pub fn export_xml(view: &[FeedbackRecord]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<feedbacks>\n");
    for record in view {
        xml.push_str("  <feedback>\n");
        xml.push_str(&format!(
            "    <apartment>{}</apartment>\n",
            escape_xml(&record.apartment_number)
        ));
        xml.push_str(&format!("    <overall>{}</overall>\n", record.overall.value()));
        xml.push_str(&format!(
            "    <guestName>{}</guestName>\n",
            escape_xml(record.guest_name.as_deref().unwrap_or(""))
        ));
        xml.push_str(&format!(
            "    <guestEmail>{}</guestEmail>\n",
            escape_xml(record.guest_email.as_deref().unwrap_or(""))
        ));
        xml.push_str(&format!(
            "    <guestPhone>{}</guestPhone>\n",
            escape_xml(record.guest_phone.as_deref().unwrap_or(""))
        ));
        xml.push_str(&format!("    <comment>{}</comment>\n", cdata(&record.comments)));
        xml.push_str(&format!("    <timestamp>{}</timestamp>\n", record.timestamp));
        xml.push_str("    <categories>\n");
        for (id, level) in &record.categories {
            xml.push_str(&format!(
                "      <category id=\"{}\">{}</category>\n",
                escape_xml(id),
                level.value()
            ));
        }
        xml.push_str("    </categories>\n");
        xml.push_str("  </feedback>\n");
    }
    xml.push_str("</feedbacks>");
    xml
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLine {
    pub id: &'static str,
    pub label: &'static str,
    pub average: f64,
}

/// Print/document export driven by the same filtered view as the dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub period_start: String,
    pub period_end: String,
    pub overall_average: f64,
    pub total_feedbacks: usize,
    pub categories: Vec<CategoryLine>,
}

/// Open-bound labels preserved from the original report header.
pub fn period_labels(range: &DateRange) -> (String, String) {
    let start = range
        .start
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "Início".to_string());
    let end = range
        .end
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "Hoje".to_string());
    (start, end)
}

pub fn period_report(view: &[FeedbackRecord], range: &DateRange) -> PeriodReport {
    let (period_start, period_end) = period_labels(range);
    let categories = CATEGORIES
        .iter()
        .map(|c| CategoryLine {
            id: c.id,
            label: c.label,
            average: aggregate::category_average(view, c.id),
        })
        .collect();

    PeriodReport {
        period_start,
        period_end,
        overall_average: aggregate::overall_average(view),
        total_feedbacks: view.len(),
        categories,
    }
}

/// Plain-text rendering of the report for printing.
pub fn render_report_text(report: &PeriodReport) -> String {
    let mut out = String::new();
    out.push_str("RELATÓRIO DE EXPERIÊNCIA\n");
    out.push_str(&format!(
        "Período: {} até {}\n\n",
        report.period_start, report.period_end
    ));
    out.push_str(&format!("Média Geral: {:.1} / 5.0\n", report.overall_average));
    out.push_str(&format!("Avaliações no Período: {}\n\n", report.total_feedbacks));
    out.push_str("Performance por Setor\n");
    for line in &report.categories {
        out.push_str(&format!("  {:<28} {:.1}\n", line.label, line.average));
    }
    out
}
