use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::{ComparisonResult, Period, TaxRequest, TaxResponse};

const FIELD_WIDTH: usize = 20;
const VALUE_WIDTH: usize = 12;
const MAX_LABEL_CHARS: usize = 11;
const SUMMARY_INNER_WIDTH: usize = 45;

type Extractor = fn(&TaxResponse) -> f64;

fn row(name: &'static str, extract: Extractor) -> (&'static str, Extractor) {
    (name, extract)
}

pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{amount:.2}");
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("£{sign}{grouped}.{dec_part}")
}

fn summary_rows() -> Vec<(&'static str, Extractor)> {
    vec![
        row("Gross Salary", |r| r.gross_pay),
        row("Tax Paid", |r| r.tax_paid),
        row("National Insurance", |r| r.national_insurance),
        row("Student Loan", |r| r.student_loan_repayment),
        row("Pension (You)", |r| r.pension_you),
        row("Net Pay", |r| r.net_pay),
    ]
}

fn verbose_rows() -> Vec<(&'static str, Extractor)> {
    vec![
        row("Gross Salary", |r| r.gross_pay),
        row("Additional Gross", |r| r.additional_gross),
        row("Tax Free Allowance", |r| r.tax_free_allowance),
        row("Taxable Pay", |r| r.taxable_pay),
        row("Basic Rate Tax", |r| r.bracket_amount("0")),
        row("Higher Rate Tax", |r| r.bracket_amount("1")),
        row("Additional Rate Tax", |r| r.bracket_amount("2")),
        row("Total Tax", |r| r.tax_paid),
        row("National Insurance", |r| r.national_insurance),
        row("Student Loan", |r| r.student_loan_repayment),
        row("Pension (You)", |r| r.pension_you),
        row("Pension Claimback", |r| r.pension_claimback),
        row("Net Pay", |r| r.net_pay),
    ]
}

fn employer_rows() -> Vec<(&'static str, Extractor)> {
    vec![
        row("Employer's NI", |r| r.employers_ni),
        row("Pension (HMRC)", |r| r.pension_hmrc),
        row("Total Cost", TaxResponse::total_cost),
    ]
}

#[derive(Copy, Clone)]
enum Border {
    Top,
    Middle,
    Bottom,
}

fn border(kind: Border, columns: usize) -> String {
    let (left, mid, right) = match kind {
        Border::Top => ('╔', '╦', '╗'),
        Border::Middle => ('╠', '╬', '╣'),
        Border::Bottom => ('╚', '╩', '╝'),
    };
    let mut line = String::new();
    line.push(left);
    line.push_str(&"═".repeat(FIELD_WIDTH + 2));
    for _ in 0..columns {
        line.push(mid);
        line.push_str(&"═".repeat(VALUE_WIDTH + 2));
    }
    line.push(right);
    line
}

fn truncate_label(label: &str) -> String {
    if label.chars().count() > MAX_LABEL_CHARS {
        let head: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
        format!("{head}…")
    } else {
        label.to_string()
    }
}

fn table_row<I>(field: &str, cells: I, align_right: bool) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut line = format!("║ {field:<FIELD_WIDTH$}");
    for cell in cells {
        if align_right {
            line.push_str(&format!(" ║ {cell:>VALUE_WIDTH$}"));
        } else {
            line.push_str(&format!(" ║ {cell:<VALUE_WIDTH$}"));
        }
    }
    line.push_str(" ║");
    line
}

fn compact_status(request: &TaxRequest) -> String {
    let mut parts = Vec::new();
    if request.is_married() {
        parts.push("M");
    }
    if request.is_blind() {
        parts.push("B");
    }
    if request.is_ni_exempt() {
        parts.push("NI");
    }
    parts.join("•")
}

pub fn render_comparison_table(results: &[ComparisonResult], verbose: bool) -> String {
    let columns = results.len();
    let value_row = |(field, extract): (&str, Extractor)| {
        table_row(
            field,
            results.iter().map(|r| format_currency(extract(&r.response))),
            true,
        )
    };

    let mut lines = vec![String::new(), border(Border::Top, columns)];
    lines.push(table_row(
        "Field",
        results.iter().map(|r| truncate_label(&r.label)),
        false,
    ));

    let statuses: Vec<String> = results.iter().map(|r| compact_status(&r.request)).collect();
    if statuses.iter().any(|status| !status.is_empty()) {
        lines.push(table_row("Status", statuses, false));
    }
    lines.push(border(Border::Middle, columns));

    let rows = if verbose { verbose_rows() } else { summary_rows() };
    lines.extend(rows.into_iter().map(value_row));
    lines.push(border(Border::Middle, columns));
    lines.extend(employer_rows().into_iter().map(value_row));
    lines.push(border(Border::Bottom, columns));
    lines.push(String::new());
    lines.join("\n")
}

#[derive(Serialize)]
struct OptionMetadata<'a> {
    tax_code: &'a str,
    tax_region: &'a str,
    tax_year: i32,
}

#[derive(Serialize)]
struct ComparisonJson<'a> {
    comparison: BTreeMap<&'static str, BTreeMap<&'a str, f64>>,
    metadata: BTreeMap<&'a str, OptionMetadata<'a>>,
    period: &'static str,
}

fn comparison_fields() -> Vec<(&'static str, Extractor)> {
    vec![
        row("gross_pay", |r| r.gross_pay),
        row("taxable_pay", |r| r.taxable_pay),
        row("additional_gross", |r| r.additional_gross),
        row("tax_free_allowance", |r| r.tax_free_allowance),
        row("tax_paid", |r| r.tax_paid),
        row("national_insurance", |r| r.national_insurance),
        row("student_loan", |r| r.student_loan_repayment),
        row("pension_you", |r| r.pension_you),
        row("pension_hmrc", |r| r.pension_hmrc),
        row("pension_claimback", |r| r.pension_claimback),
        row("net_pay", |r| r.net_pay),
        row("employers_ni", |r| r.employers_ni),
        row("total_cost", TaxResponse::total_cost),
        row("gross_sacrifice", |r| r.gross_sacrifice),
        row("childcare_amount", |r| r.childcare_amount),
        row("tax_free_married", |r| r.tax_free_married),
        row("tax_free_marriage_allowance", |r| r.tax_free_marriage_allowance),
        row("basic_rate_tax", |r| r.bracket_amount("0")),
        row("higher_rate_tax", |r| r.bracket_amount("1")),
        row("additional_rate_tax", |r| r.bracket_amount("2")),
    ]
}

pub fn render_comparison_json(
    results: &[ComparisonResult],
    period: Period,
) -> Result<String, serde_json::Error> {
    let comparison = comparison_fields()
        .into_iter()
        .map(|(field, extract)| {
            let values = results
                .iter()
                .map(|r| (r.label.as_str(), extract(&r.response)))
                .collect();
            (field, values)
        })
        .collect();
    let metadata = results
        .iter()
        .map(|r| {
            (
                r.label.as_str(),
                OptionMetadata {
                    tax_code: &r.response.tax_code,
                    tax_region: &r.response.tax_region,
                    tax_year: r.response.tax_year,
                },
            )
        })
        .collect();

    serde_json::to_string_pretty(&ComparisonJson {
        comparison,
        metadata,
        period: period.name(),
    })
}

pub fn render_check_json(response: &TaxResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(response)
}

fn status_parts(request: &TaxRequest) -> Vec<&'static str> {
    let mut parts = Vec::new();
    if request.is_married() {
        parts.push("Married");
    }
    if request.is_blind() {
        parts.push("Blind Allowance");
    }
    if request.is_ni_exempt() {
        parts.push("NI Exempt");
    }
    parts
}

fn boxed_line(text: &str) -> String {
    let padding = SUMMARY_INNER_WIDTH.saturating_sub(text.chars().count());
    format!("║ {text}{}║", " ".repeat(padding))
}

fn summary_row(field: &str, amount: f64) -> String {
    format!("║ {field:<25} {:>18} ║", format_currency(amount))
}

pub fn render_summary(response: &TaxResponse, request: &TaxRequest, period: Period) -> String {
    let rule = "═".repeat(SUMMARY_INNER_WIDTH + 1);
    let mut lines = vec![String::new(), format!("╔{rule}╗")];
    lines.push(boxed_line(&format!(
        "Tax Calculation for {} ({}) - {}",
        response.tax_year,
        response.tax_region,
        period.label()
    )));
    let status = status_parts(request);
    if !status.is_empty() {
        lines.push(boxed_line(&format!(" • {}", status.join(" • "))));
    }
    lines.push(format!("╠{rule}╣"));

    lines.push(summary_row("Gross Salary", response.gross_pay));
    lines.push(summary_row("Taxable Pay", response.taxable_pay));
    lines.push(summary_row("Tax Paid", response.tax_paid));
    lines.push(summary_row("National Insurance", response.national_insurance));
    if response.student_loan_repayment > 0.0 {
        lines.push(summary_row("Student Loan", response.student_loan_repayment));
    }
    lines.push(summary_row("Pension (You)", response.pension_you));
    lines.push(summary_row("Net Pay", response.net_pay));

    lines.push(format!("╠{rule}╣"));
    for (field, extract) in employer_rows() {
        lines.push(summary_row(field, extract(response)));
    }
    lines.push(format!("╚{rule}╝"));
    lines.push(String::new());
    lines.join("\n")
}

fn detail_row(field: &str, amount: f64) -> String {
    format!("  {:<20}{:>15}", format!("{field}:"), format_currency(amount))
}

pub fn render_detailed(response: &TaxResponse, request: &TaxRequest, period: Period) -> String {
    let mut lines = vec![format!(
        "Tax Year: {} ({}) - {}",
        response.tax_year,
        response.tax_region,
        period.label()
    )];
    if !response.tax_code.is_empty() {
        lines.push(format!("Tax Code: {}", response.tax_code));
    }
    let status = status_parts(request);
    if !status.is_empty() {
        lines.push(format!("Status: {}", status.join(" • ")));
    }
    lines.push(String::new());

    lines.push("Income:".to_string());
    lines.push(detail_row("Gross Salary", response.gross_pay));
    if response.additional_gross > 0.0 {
        lines.push(detail_row("Additional Gross", response.additional_gross));
    }
    lines.push(detail_row("Tax Free Allowance", response.tax_free_allowance));
    lines.push(detail_row("Taxable Pay", response.taxable_pay));
    lines.push(String::new());

    lines.push("Tax Breakdown:".to_string());
    for (key, name) in [("0", "Basic Rate"), ("1", "Higher Rate"), ("2", "Additional")] {
        if let Some(bracket) = response.tax_due.get(key).filter(|b| b.amount > 0.0) {
            let field = format!("{name} ({:.0}%)", bracket.rate * 100.0);
            lines.push(detail_row(&field, bracket.amount));
        }
    }
    lines.push(detail_row("Total Tax", response.tax_paid));
    lines.push(String::new());

    lines.push("Deductions:".to_string());
    lines.push(detail_row("National Insurance", response.national_insurance));
    if response.student_loan_repayment > 0.0 {
        lines.push(detail_row("Student Loan", response.student_loan_repayment));
    }
    lines.push(detail_row("Pension (You)", response.pension_you));
    let total_deductions = response.tax_paid
        + response.national_insurance
        + response.student_loan_repayment
        + response.pension_you;
    lines.push(detail_row("Total Deductions", total_deductions));
    lines.push(String::new());

    lines.push(format!(
        "{:<23}{:>15}",
        "Net Pay:",
        format_currency(response.net_pay)
    ));
    lines.push(String::new());

    lines.push("Employer Costs:".to_string());
    for (field, extract) in employer_rows() {
        lines.push(detail_row(field, extract(response)));
    }
    lines.join("\n")
}
