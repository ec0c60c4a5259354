//! Bilingual contract document
//!
//! Builds the English page and the Khmer page from the same contract data,
//! joins them with a page break and wraps them in a printable HTML document.
//! Every text value on the Khmer page has its ASCII digits transliterated.

use chrono::NaiveDate;
use staffing_models::{ContractPeriod, LecturerSummary, SignerRole, TeachingContract};

use crate::figures::{group_thousands, ContractFigures};
use crate::khmer;
use crate::template::{escape_html, TemplateError, TemplateSet, TemplateValues};
use crate::upload::SignatureImage;

const PAGE_BREAK: &str = "<div class=\"page-break\"></div>";

const DOCUMENT_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  @page { size: A4; margin: 18mm 16mm; }
  body { font-family: "Times New Roman", serif; font-size: 12pt; }
  [lang="km"] { font-family: "Khmer OS Siemreap", "Noto Sans Khmer", serif; }
  .page-break { page-break-after: always; break-after: page; }
  table { border-collapse: collapse; width: 100%; margin: 8pt 0; }
  th, td { border: 1px solid #444; padding: 4pt 6pt; text-align: left; }
  .signatures { display: flex; justify-content: space-between; margin-top: 36pt; }
  .signature { width: 45%; text-align: center; }
  .signature .image { height: 60pt; }
  .signature img { max-height: 60pt; max-width: 100%; }
</style>
</head>
<body>
"#;

const DOCUMENT_TAIL: &str = "</body>\n</html>\n";

/// Everything needed to lay out one contract
#[derive(Debug, Clone)]
pub struct ContractDocument<'a> {
    pub contract: &'a TeachingContract,
    pub lecturer: &'a LecturerSummary,
    pub figures: ContractFigures,
    pub lecturer_signature: Option<SignatureImage>,
    pub management_signature: Option<SignatureImage>,
    pub issued_on: NaiveDate,
}

impl ContractDocument<'_> {
    fn signature_image(&self, role: SignerRole) -> Option<&SignatureImage> {
        match role {
            SignerRole::Lecturer => self.lecturer_signature.as_ref(),
            SignerRole::Management => self.management_signature.as_ref(),
        }
    }
}

pub struct DocumentRenderer {
    templates: TemplateSet,
}

impl DocumentRenderer {
    pub fn new(templates: TemplateSet) -> Self {
        Self { templates }
    }

    /// English page, page break, Khmer page
    pub fn render_html(&self, document: &ContractDocument<'_>) -> Result<String, TemplateError> {
        let shared = shared_values(document);

        let mut english = shared.clone();
        page_values(&mut english, document, Language::English)?;

        let mut khmer = shared.map_text(khmer::to_khmer_digits);
        page_values(&mut khmer, document, Language::Khmer)?;

        let english_page = self.templates.english.render(&english)?;
        let khmer_page = self.templates.khmer.render(&khmer)?;

        let mut html = String::with_capacity(
            DOCUMENT_HEAD.len() + english_page.len() + khmer_page.len() + 128,
        );
        html.push_str(DOCUMENT_HEAD);
        html.push_str(&english_page);
        html.push('\n');
        html.push_str(PAGE_BREAK);
        html.push('\n');
        html.push_str(&khmer_page);
        html.push('\n');
        html.push_str(DOCUMENT_TAIL);
        Ok(html)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Language {
    English,
    Khmer,
}

impl Language {
    fn date(self, date: NaiveDate) -> String {
        match self {
            Language::English => english_date(date),
            Language::Khmer => khmer::format_date(date),
        }
    }

    fn digits(self, text: &str) -> String {
        match self {
            Language::English => text.to_string(),
            Language::Khmer => khmer::to_khmer_digits(text),
        }
    }
}

/// `1 October 2025`
pub fn english_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Values identical on both pages apart from numerals
fn shared_values(document: &ContractDocument<'_>) -> TemplateValues {
    let contract = document.contract;
    let figures = &document.figures;
    let blank_or = |value: Option<rust_decimal::Decimal>| value.map(group_thousands).unwrap_or_default();

    let mut values = TemplateValues::new();
    values
        .text("contract_number", contract.id.to_string())
        .text("lecturer_name", document.lecturer.display_name.as_str())
        .text("academic_year", contract.academic_year.as_str())
        .text("term", contract.term.as_str())
        .text("year_level", contract.year_level.clone().unwrap_or_default())
        .text("subject", contract.subject_names())
        .text("total_hours", figures.total_hours.to_string())
        .text("hourly_rate", blank_or(figures.hourly_rate))
        .text("total_usd", blank_or(figures.display_usd()))
        .text("total_khr", blank_or(figures.display_khr()))
        .text("exchange_rate", group_thousands(figures.exchange_rate));
    values
}

fn page_values(
    values: &mut TemplateValues,
    document: &ContractDocument<'_>,
    language: Language,
) -> Result<(), TemplateError> {
    let contract = document.contract;

    values
        .text("issued_on", language.date(document.issued_on))
        .text("period", period_text(contract, language))
        .text(
            "start_date",
            contract.start_date.map(|d| language.date(d)).unwrap_or_default(),
        )
        .markup("course_rows", course_rows(contract, language)?);

    for (role, image_token, date_token) in [
        (SignerRole::Lecturer, "lecturer_signature", "lecturer_signed_on"),
        (SignerRole::Management, "management_signature", "management_signed_on"),
    ] {
        let signed_on = contract
            .signature(role)
            .map(|artifact| language.date(artifact.signed_at.date_naive()))
            .unwrap_or_default();
        values
            .markup(image_token, signature_markup(document.signature_image(role), role))
            .text(date_token, signed_on);
    }
    Ok(())
}

fn period_text(contract: &TeachingContract, language: Language) -> String {
    match (contract.period(), language) {
        (ContractPeriod::Dated { start, end: Some(end) }, Language::English) => {
            format!("from {} to {}", english_date(start), english_date(end))
        }
        (ContractPeriod::Dated { start, end: None }, Language::English) => {
            format!("from {}", english_date(start))
        }
        (ContractPeriod::Until { end }, Language::English) => {
            format!("for {} until {}", contract.term, english_date(end))
        }
        (ContractPeriod::TermBased, Language::English) => {
            format!("for {} of academic year {}", contract.term, contract.academic_year)
        }
        (ContractPeriod::Dated { start, end: Some(end) }, Language::Khmer) => {
            format!("ពី{} ដល់{}", khmer::format_date(start), khmer::format_date(end))
        }
        (ContractPeriod::Dated { start, end: None }, Language::Khmer) => {
            format!("ចាប់ពី{}", khmer::format_date(start))
        }
        (ContractPeriod::Until { end }, Language::Khmer) => format!(
            "{} រហូតដល់{}",
            khmer::to_khmer_digits(&contract.term),
            khmer::format_date(end)
        ),
        (ContractPeriod::TermBased, Language::Khmer) => khmer::to_khmer_digits(&format!(
            "សម្រាប់{} ឆ្នាំសិក្សា {}",
            contract.term, contract.academic_year
        )),
    }
}

fn course_rows(contract: &TeachingContract, language: Language) -> Result<String, TemplateError> {
    let mut rows = String::new();
    for item in &contract.line_items {
        let class = item.class_id.map(|id| id.to_string()).unwrap_or_default();
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html("course_name", &language.digits(&item.course_name))?,
            language.digits(&class),
            language.digits(&item.hours.to_string()),
        ));
    }
    Ok(rows)
}

fn signature_markup(image: Option<&SignatureImage>, role: SignerRole) -> String {
    match image {
        Some(image) => format!("<img src=\"{}\" alt=\"{} signature\">", image.data_uri(), role),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::fixtures::PNG;
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use staffing_models::{ContractLineItem, ContractStatus, SignatureArtifact};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract() -> TeachingContract {
        let now = Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap();
        TeachingContract {
            id: 12,
            lecturer_id: 10,
            created_by: 2,
            academic_year: "2025-2026".to_string(),
            term: "Term 1".to_string(),
            year_level: Some("2".to_string()),
            start_date: Some(date(2025, 10, 1)),
            end_date: Some(date(2026, 3, 31)),
            status: ContractStatus::Draft,
            lecturer_signature: None,
            management_signature: None,
            rendered_document: None,
            created_at: now,
            updated_at: now,
            line_items: vec![ContractLineItem {
                id: 1,
                contract_id: 12,
                course_id: 5,
                class_id: Some(7),
                course_name: "Databases".to_string(),
                year_level: Some("2".to_string()),
                term: "Term 1".to_string(),
                academic_year: "2025-2026".to_string(),
                hours: 40,
            }],
        }
    }

    fn lecturer(name: &str) -> LecturerSummary {
        LecturerSummary {
            id: 10,
            display_name: name.to_string(),
            email: "dara.sok@example.edu".to_string(),
            department_id: Some(3),
        }
    }

    fn renderer() -> DocumentRenderer {
        let english = "<p>{{lecturer_name}}|{{period}}|{{start_date}}|{{subject}}|{{course_rows}}|\
                       {{total_hours}}|{{hourly_rate}}|{{total_usd}}|{{total_khr}}|{{exchange_rate}}|\
                       {{lecturer_signature}}|{{management_signature}}|{{lecturer_signed_on}}</p>";
        let khmer = english.replace("<p>", "<p lang=\"km\">");
        DocumentRenderer::new(TemplateSet::from_sources(english, &khmer).unwrap())
    }

    fn document<'a>(
        contract: &'a TeachingContract,
        lecturer: &'a LecturerSummary,
        rate: Option<Decimal>,
    ) -> ContractDocument<'a> {
        ContractDocument {
            contract,
            lecturer,
            figures: ContractFigures::compute(contract.total_hours(), rate, Decimal::from(4100)),
            lecturer_signature: None,
            management_signature: None,
            issued_on: date(2025, 9, 15),
        }
    }

    fn pages(html: &str) -> (&str, &str) {
        html.split_once(PAGE_BREAK).unwrap()
    }

    #[test]
    fn test_forty_hours_at_twenty_five_dollars() {
        let contract = contract();
        let lecturer = lecturer("Sok Dara");
        let html = renderer()
            .render_html(&document(&contract, &lecturer, Some(Decimal::from(25))))
            .unwrap();
        let (english, khmer) = pages(&html);

        assert!(english.contains("|40|25|1,000|4,100,000|4,100|"));
        assert!(khmer.contains("|៤០|២៥|១,០០០|៤,១០០,០០០|៤,១០០|"));
        assert!(!khmer.contains("4,100,000"));
    }

    #[test]
    fn test_document_is_english_then_khmer() {
        let contract = contract();
        let lecturer = lecturer("Sok Dara");
        let html = renderer()
            .render_html(&document(&contract, &lecturer, None))
            .unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches(PAGE_BREAK).count(), 1);
        let (english, khmer) = pages(&html);
        assert!(english.contains("from 1 October 2025 to 31 March 2026"));
        assert!(khmer.contains("lang=\"km\""));
        assert!(khmer.contains("ពីថ្ងៃទី១ ខែតុលា ឆ្នាំ២០២៥ ដល់ថ្ងៃទី៣១ ខែមីនា ឆ្នាំ២០២៦"));
    }

    #[test]
    fn test_unknown_rate_renders_blank_figures() {
        let contract = contract();
        let lecturer = lecturer("Sok Dara");
        let html = renderer()
            .render_html(&document(&contract, &lecturer, None))
            .unwrap();
        let (english, _) = pages(&html);
        assert!(english.contains("|40||||4,100|"));
    }

    #[test]
    fn test_term_based_period_without_start_date() {
        let mut contract = contract();
        contract.start_date = None;
        contract.end_date = None;
        let lecturer = lecturer("Sok Dara");
        let html = renderer()
            .render_html(&document(&contract, &lecturer, None))
            .unwrap();
        let (english, khmer) = pages(&html);

        assert!(english.contains("|for Term 1 of academic year 2025-2026||"));
        assert!(khmer.contains("សម្រាប់Term ១ ឆ្នាំសិក្សា ២០២៥-២០២៦"));
    }

    #[test]
    fn test_end_date_without_start_date() {
        let mut contract = contract();
        contract.start_date = None;
        let lecturer = lecturer("Sok Dara");
        let html = renderer()
            .render_html(&document(&contract, &lecturer, None))
            .unwrap();
        let (english, khmer) = pages(&html);

        assert!(english.contains("|for Term 1 until 31 March 2026||"));
        assert!(khmer.contains("Term ១ រហូតដល់ថ្ងៃទី៣១ ខែមីនា ឆ្នាំ២០២៦"));
    }

    #[test]
    fn test_caller_text_is_escaped() {
        let mut contract = contract();
        contract.line_items[0].course_name = "<b>Networks</b>".to_string();
        let lecturer = lecturer("Dara <script>");
        let html = renderer()
            .render_html(&document(&contract, &lecturer, None))
            .unwrap();

        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>Networks"));
        assert!(html.contains("Dara &lt;script&gt;"));
        assert!(html.contains("<td>&lt;b&gt;Networks&lt;/b&gt;</td><td>7</td><td>40</td>"));
    }

    #[test]
    fn test_control_characters_fail_the_render() {
        let contract = contract();
        let lecturer = lecturer("Sok\u{7}Dara");
        let err = renderer()
            .render_html(&document(&contract, &lecturer, None))
            .unwrap_err();
        assert!(matches!(err, TemplateError::ControlCharacter { .. }));
    }

    #[test]
    fn test_signatures_are_embedded_on_both_pages() {
        let mut contract = contract();
        contract.lecturer_signature = Some(SignatureArtifact {
            path: "contracts/12/signatures/lecturer/abc.png".to_string(),
            signed_at: Utc.with_ymd_and_hms(2025, 10, 2, 9, 0, 0).unwrap(),
        });
        let lecturer = lecturer("Sok Dara");
        let mut document = document(&contract, &lecturer, None);
        document.lecturer_signature = SignatureImage::from_stored(Bytes::from_static(PNG));

        let html = renderer().render_html(&document).unwrap();
        let (english, khmer) = pages(&html);

        for page in [english, khmer] {
            assert!(page.contains("<img src=\"data:image/png;base64,"));
            assert!(page.contains("alt=\"lecturer signature\""));
        }
        assert!(english.ends_with("|2 October 2025</p>\n"));
        assert!(khmer.contains("|ថ្ងៃទី២ ខែតុលា ឆ្នាំ២០២៥</p>"));
    }

    #[test]
    fn test_english_date() {
        assert_eq!(english_date(date(2025, 10, 1)), "1 October 2025");
    }
}
