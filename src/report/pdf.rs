//! Paginated PDF reports: executive summary, comparative analysis and a
//! single-supplier sheet.

use chrono::{DateTime, Utc};
use serde_json::json;

use super::layout::{Column, PageWriter, Style, CONTENT_WIDTH};
use super::ReportError;
use crate::models::{SupplierEvaluation, TenderRecord};
use crate::ranking::{compliance_matrix, display_or_na, rank};

/// Rows in the executive ranking table.
pub const EXECUTIVE_TOP_N: usize = 5;
/// Suppliers whose risks appear in the executive summary.
pub const RISK_DIGEST_TOP_N: usize = 3;

const FOOTER: &str = "This evaluation was generated by an AI-assisted bid evaluation service. \
All scores are based on analysis of the submitted bid documents.";

// ═══════════════════════════════════════════════════════════
// Executive summary
// ═══════════════════════════════════════════════════════════

pub fn generate_executive_summary(
    tender: Option<&TenderRecord>,
    evaluations: &[SupplierEvaluation],
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ReportError> {
    let ranked = rank(evaluations);
    let mut w = PageWriter::new("Executive Summary")?;

    header(&mut w, generated_at);
    w.line("EXECUTIVE SUMMARY", 16.0, Style::Bold);
    w.gap(3.0);

    let tender = tender.cloned().unwrap_or_default();
    let info = vec![
        vec!["Tender Title".to_string(), display_or_na(&tender.title).to_string()],
        vec!["Tender Reference".to_string(), display_or_na(&tender.reference).to_string()],
        vec!["Organization".to_string(), display_or_na(&tender.issuing_organization).to_string()],
        vec!["Date Generated".to_string(), generated_at.format("%Y-%m-%d %H:%M UTC").to_string()],
        vec!["Number of Bidders".to_string(), evaluations.len().to_string()],
    ];
    w.table(
        &[
            Column { header: "Field", width: 50.0 },
            Column { header: "Value", width: CONTENT_WIDTH - 50.0 },
        ],
        &info,
        10.0,
    );

    w.heading("SUPPLIER RANKING");
    let rows: Vec<Vec<String>> = ranked
        .iter()
        .take(EXECUTIVE_TOP_N)
        .enumerate()
        .map(|(i, e)| {
            vec![
                (i + 1).to_string(),
                e.supplier_name.clone(),
                format!("{:.0}", e.overall_score),
                format!("{:.0}", e.category_scores.technical.score),
                format!("{:.0}", e.category_scores.commercial.score),
                format!("{:.0}", e.category_scores.compliance.score),
                e.tier().label().to_string(),
            ]
        })
        .collect();
    w.table(
        &[
            Column { header: "Rank", width: 12.0 },
            Column { header: "Supplier", width: 52.0 },
            Column { header: "Score", width: 16.0 },
            Column { header: "Technical", width: 20.0 },
            Column { header: "Commercial", width: 22.0 },
            Column { header: "Compliance", width: 22.0 },
            Column { header: "Recommendation", width: 26.0 },
        ],
        &rows,
        9.0,
    );

    if let Some(top) = ranked.first() {
        w.heading("TOP RECOMMENDATION");
        w.paragraph(
            &format!("{} is recommended as the preferred vendor.", display_or_na(&top.supplier_name)),
            10.0,
            0.0,
            Style::Bold,
        );
        w.gap(2.0);
        w.paragraph(&format!("Overall Score: {:.0}/100", top.overall_score), 10.0, 0.0, Style::Regular);
        let strengths = &top.category_scores.technical.strengths;
        if !strengths.is_empty() {
            w.gap(2.0);
            w.line("Key Strengths:", 10.0, Style::Regular);
            bullets(&mut w, strengths);
        }
    }

    let risks: Vec<_> = ranked
        .iter()
        .take(RISK_DIGEST_TOP_N)
        .filter(|e| !e.key_risks.is_empty())
        .collect();
    w.heading("KEY RISKS IDENTIFIED");
    for supplier in risks {
        w.paragraph(
            &format!("{}: {}", supplier.supplier_name, supplier.key_risks.join(", ")),
            10.0,
            0.0,
            Style::Regular,
        );
        w.gap(2.0);
    }

    footer(&mut w);

    let identity = identity("executive", Some(&tender), evaluations, None, generated_at)?;
    let pages = w.page_count();
    let bytes = w.finish(&identity, generated_at)?;
    tracing::info!(pages, bytes = bytes.len(), "Executive summary rendered");
    Ok(bytes)
}

// ═══════════════════════════════════════════════════════════
// Comparative analysis
// ═══════════════════════════════════════════════════════════

pub fn generate_comparative_report(
    tender: Option<&TenderRecord>,
    evaluations: &[SupplierEvaluation],
    trade_off: Option<&str>,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ReportError> {
    let ranked = rank(evaluations);
    let mut w = PageWriter::new("Comparative Analysis")?;

    header(&mut w, generated_at);
    w.line("COMPARATIVE ANALYSIS", 16.0, Style::Bold);
    if let Some(t) = tender.filter(|t| !t.title.trim().is_empty()) {
        w.paragraph(&t.title, 10.0, 0.0, Style::Italic);
    }

    w.heading("SCORE COMPARISON MATRIX");
    let rows: Vec<Vec<String>> = ranked.iter().map(|e| score_row(e)).collect();
    w.table(&score_columns(), &rows, 9.0);

    compliance_section(&mut w, evaluations);

    w.heading("TRADE-OFF ANALYSIS");
    match trade_off.filter(|t| !t.trim().is_empty()) {
        Some(text) => w.paragraph(text, 10.0, 0.0, Style::Regular),
        None => w.paragraph("No trade-off analysis has been generated.", 10.0, 0.0, Style::Italic),
    }

    footer(&mut w);

    let identity = identity("comparative", tender, evaluations, trade_off, generated_at)?;
    let pages = w.page_count();
    let bytes = w.finish(&identity, generated_at)?;
    tracing::info!(pages, bytes = bytes.len(), "Comparative report rendered");
    Ok(bytes)
}

// ═══════════════════════════════════════════════════════════
// Single supplier
// ═══════════════════════════════════════════════════════════

/// Detail sheet for one supplier at its position in the ranking.
pub fn generate_supplier_report(
    tender: Option<&TenderRecord>,
    evaluation: &SupplierEvaluation,
    rank: usize,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ReportError> {
    let e = evaluation;
    let mut w = PageWriter::new(&format!("Supplier Evaluation - {}", e.supplier_name))?;

    header(&mut w, generated_at);
    w.line("SUPPLIER EVALUATION", 16.0, Style::Bold);
    w.paragraph(
        &format!("#{rank} {}", display_or_na(&e.supplier_name)),
        12.0,
        0.0,
        Style::Bold,
    );
    if let Some(t) = tender.filter(|t| !t.title.trim().is_empty()) {
        w.paragraph(&t.title, 10.0, 0.0, Style::Italic);
    }
    w.gap(2.0);

    let facts = vec![
        vec!["Country".to_string(), display_or_na(&e.supplier_country).to_string()],
        vec!["Bid Reference".to_string(), display_or_na(&e.bid_reference).to_string()],
        vec!["Proposed Price".to_string(), display_or_na(&e.proposed_price).to_string()],
        vec!["Proposed Timeline".to_string(), display_or_na(&e.proposed_timeline).to_string()],
        vec!["Recommendation".to_string(), e.tier().label().to_string()],
    ];
    w.table(
        &[
            Column { header: "Field", width: 50.0 },
            Column { header: "Value", width: CONTENT_WIDTH - 50.0 },
        ],
        &facts,
        10.0,
    );

    w.heading("SCORES");
    w.table(&score_columns(), &[score_row(e)], 9.0);

    for (label, category) in [
        ("Technical", &e.category_scores.technical),
        ("Commercial", &e.category_scores.commercial),
        ("Compliance", &e.category_scores.compliance),
    ] {
        w.heading(&format!("{} ({:.0}/100)", label.to_uppercase(), category.score));
        if !category.summary.trim().is_empty() {
            w.paragraph(&category.summary, 10.0, 0.0, Style::Regular);
        }
        if !category.strengths.is_empty() {
            w.line("Strengths:", 10.0, Style::Bold);
            bullets(&mut w, &category.strengths);
        }
        if !category.gaps.is_empty() {
            w.line("Gaps:", 10.0, Style::Bold);
            bullets(&mut w, &category.gaps);
        }
    }

    if !e.criterion_scores.is_empty() {
        w.heading("CRITERION SCORES");
        let rows: Vec<Vec<String>> = e
            .criterion_scores
            .iter()
            .map(|c| {
                vec![
                    c.criterion.clone(),
                    format!("{:.0}", c.score),
                    display_or_na(&c.flag).to_string(),
                    c.evidence.clone(),
                ]
            })
            .collect();
        w.table(
            &[
                Column { header: "Criterion", width: 50.0 },
                Column { header: "Score", width: 14.0 },
                Column { header: "Flag", width: 26.0 },
                Column { header: "Evidence", width: CONTENT_WIDTH - 90.0 },
            ],
            &rows,
            9.0,
        );
    }

    if !e.mandatory_requirements_status.is_empty() {
        w.heading("MANDATORY REQUIREMENTS");
        for req in &e.mandatory_requirements_status {
            w.paragraph(
                &format!("[{}] {}", req.class().symbol(), req.requirement),
                10.0,
                0.0,
                Style::Bold,
            );
            if !req.evidence.trim().is_empty() {
                w.paragraph(&req.evidence, 9.0, 6.0, Style::Regular);
            }
        }
    }

    w.heading("HSE / ESG / CERTIFICATIONS");
    w.paragraph(
        &format!("HSE: {} {}", display_or_na(&e.hse_compliance.status), e.hse_compliance.details),
        10.0,
        0.0,
        Style::Regular,
    );
    w.paragraph(
        &format!("ESG: {} {}", display_or_na(&e.esg_compliance.status), e.esg_compliance.details),
        10.0,
        0.0,
        Style::Regular,
    );
    let iso = if e.iso_certifications.is_empty() {
        "None listed".to_string()
    } else {
        e.iso_certifications.join(", ")
    };
    w.paragraph(&format!("ISO certifications: {iso}"), 10.0, 0.0, Style::Regular);

    if !e.key_risks.is_empty() {
        w.heading("KEY RISKS");
        bullets(&mut w, &e.key_risks);
    }

    if !e.recommendation.trim().is_empty() {
        w.heading("RECOMMENDATION");
        w.paragraph(&e.recommendation, 10.0, 0.0, Style::Regular);
    }

    footer(&mut w);

    let identity = identity(
        &format!("supplier-{rank}"),
        tender,
        std::slice::from_ref(e),
        None,
        generated_at,
    )?;
    let bytes = w.finish(&identity, generated_at)?;
    tracing::info!(supplier = %e.supplier_name, bytes = bytes.len(), "Supplier report rendered");
    Ok(bytes)
}

// ═══════════════════════════════════════════════════════════
// Shared pieces
// ═══════════════════════════════════════════════════════════

fn header(w: &mut PageWriter, generated_at: DateTime<Utc>) {
    w.text_at("BID EVALUATION", 14.0, 0.0, Style::Bold);
    w.text_at(
        &format!("Date: {}", generated_at.format("%Y-%m-%d")),
        10.0,
        CONTENT_WIDTH - 40.0,
        Style::Bold,
    );
    w.gap(12.0);
}

fn footer(w: &mut PageWriter) {
    w.gap(10.0);
    w.paragraph(FOOTER, 8.0, 0.0, Style::Italic);
}

fn bullets(w: &mut PageWriter, items: &[String]) {
    for item in items {
        w.paragraph(&format!("- {item}"), 10.0, 4.0, Style::Regular);
    }
}

fn score_columns() -> [Column<'static>; 6] {
    [
        Column { header: "Supplier", width: 55.0 },
        Column { header: "Overall", width: 20.0 },
        Column { header: "Technical", width: 22.0 },
        Column { header: "Commercial", width: 24.0 },
        Column { header: "Compliance", width: 24.0 },
        Column { header: "Complete", width: 25.0 },
    ]
}

fn score_row(e: &SupplierEvaluation) -> Vec<String> {
    vec![
        e.supplier_name.clone(),
        format!("{:.0}", e.overall_score),
        format!("{:.0}", e.category_scores.technical.score),
        format!("{:.0}", e.category_scores.commercial.score),
        format!("{:.0}", e.category_scores.compliance.score),
        format!("{:.0}%", e.completeness_percentage),
    ]
}

fn compliance_section(w: &mut PageWriter, evaluations: &[SupplierEvaluation]) {
    w.heading("MANDATORY REQUIREMENTS COMPLIANCE");
    let matrix = compliance_matrix(evaluations);
    if matrix.is_empty() {
        w.paragraph("No mandatory requirement statuses were reported.", 10.0, 0.0, Style::Italic);
        return;
    }

    let requirement_width = 60.0;
    let supplier_width = ((CONTENT_WIDTH - requirement_width) / matrix.suppliers.len() as f32).max(8.0);
    let mut columns = vec![Column { header: "Requirement", width: requirement_width }];
    columns.extend(matrix.suppliers.iter().map(|s| Column {
        header: s.as_str(),
        width: supplier_width,
    }));

    let rows: Vec<Vec<String>> = matrix
        .rows
        .iter()
        .map(|row| {
            std::iter::once(row.requirement.clone())
                .chain(row.statuses.iter().map(|s| s.symbol().to_string()))
                .collect()
        })
        .collect();
    w.table(&columns, &rows, 8.0);
    w.paragraph("Y = compliant, N = non-compliant, ? = unclear or not reported", 8.0, 0.0, Style::Italic);
}

/// Everything a report depends on, serialized; hashed into the PDF id.
fn identity(
    kind: &str,
    tender: Option<&TenderRecord>,
    evaluations: &[SupplierEvaluation],
    trade_off: Option<&str>,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ReportError> {
    Ok(serde_json::to_vec(&json!({
        "kind": kind,
        "tender": tender,
        "evaluations": evaluations,
        "trade_off": trade_off,
        "generated_at": generated_at.to_rfc3339(),
    }))?)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::pipeline::extraction::pdf::extract_pdf_text;
    use crate::samples::{sample_evaluations, sample_tender};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    fn page_count(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn executive_summary_is_byte_reproducible() {
        let tender = sample_tender();
        let evals = sample_evaluations();
        let a = generate_executive_summary(Some(&tender), &evals, at()).unwrap();
        let b = generate_executive_summary(Some(&tender), &evals, at()).unwrap();
        assert!(a.starts_with(b"%PDF"));
        assert_eq!(a, b);
    }

    #[test]
    fn comparative_report_is_byte_reproducible() {
        let evals = sample_evaluations();
        let a = generate_comparative_report(None, &evals, Some("ValveTech leads."), at()).unwrap();
        let b = generate_comparative_report(None, &evals, Some("ValveTech leads."), at()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_give_different_bytes() {
        let evals = sample_evaluations();
        let a = generate_comparative_report(None, &evals, Some("One view."), at()).unwrap();
        let b = generate_comparative_report(None, &evals, Some("Another view."), at()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn executive_summary_contains_sections_and_leader() {
        let tender = sample_tender();
        let evals = sample_evaluations();
        let bytes = generate_executive_summary(Some(&tender), &evals, at()).unwrap();
        let text = extract_pdf_text(&bytes).unwrap();
        assert!(text.contains("EXECUTIVE SUMMARY"));
        assert!(text.contains("SUPPLIER RANKING"));
        assert!(text.contains("KEY RISKS IDENTIFIED"));
        assert!(text.contains("ValveTech Industries is recommended"));
        assert!(text.contains("RFQ-2026-BRG-001"));
    }

    #[test]
    fn reports_render_with_empty_store() {
        assert!(generate_executive_summary(None, &[], at()).is_ok());
        assert!(generate_comparative_report(None, &[], None, at()).is_ok());
    }

    #[test]
    fn many_suppliers_paginate() {
        let evals: Vec<SupplierEvaluation> = (0..80)
            .map(|i| SupplierEvaluation {
                supplier_name: format!("Supplier {i}"),
                overall_score: f64::from(i),
                ..Default::default()
            })
            .collect();
        let bytes = generate_comparative_report(None, &evals, None, at()).unwrap();
        assert!(page_count(&bytes) > 1);
    }

    #[test]
    fn supplier_sheet_renders_every_sample() {
        let tender = sample_tender();
        let evals = sample_evaluations();
        for (i, e) in rank(&evals).into_iter().enumerate() {
            let bytes = generate_supplier_report(Some(&tender), e, i + 1, at()).unwrap();
            assert!(page_count(&bytes) >= 1);
        }
    }
}
