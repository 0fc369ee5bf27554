//! Plain-text cards for assessments and evaluation reports.

use tripfix_risk::evaluation::EvaluationReport;
use tripfix_risk::{Action, RiskAssessment, RiskTier};

// ── Assessment ──

/// Print an assessment as a vertical card: headline, factors, patterns.
pub fn print_assessment(a: &RiskAssessment) {
    println!("=== {} ===", a.case_id());
    println!("{}", a.summary());
    println!();

    println!("Decision");
    println!("  {:<26} {:.3}", "confidence", a.confidence());
    println!("  {:<26} {}", "tier", a.tier());
    println!("  {:<26} {}", "action", a.action());
    if let Some(window) = review_label(a.action()) {
        println!("  {:<26} {}", "review within", window);
    }
    println!();

    println!("Factors");
    for f in a.factors() {
        println!(
            "  {:<26} {:.2} x {:.2}  {}",
            f.kind.label(),
            f.score,
            f.weight,
            f.rationale
        );
    }
    println!();

    if !a.patterns().is_empty() {
        println!("Patterns");
        for p in a.patterns() {
            let marker = if p.is_hard_override() { " (hard)" } else { "" };
            println!("  {p}{marker}");
        }
        println!();
    }
}

/// Human-readable review deadline, if the action routes to a reviewer.
fn review_label(action: Action) -> Option<String> {
    let window = action.review_window()?;
    if window.num_minutes() == 0 {
        Some("immediately".to_string())
    } else {
        Some(format!("{}h", window.num_hours()))
    }
}

// ── Evaluation ──

pub fn print_report(r: &EvaluationReport) {
    println!("=== Evaluation: {} cases ===", r.total);
    println!();

    println!("Handoff");
    println!("  {:<26} {:.1}%", "accuracy", r.handoff_accuracy * 100.0);
    println!("  {:<26} {:.3}", "precision", r.handoff_precision);
    println!("  {:<26} {:.3}", "recall", r.handoff_recall);
    println!("  {:<26} {:.3}", "f1", r.handoff_f1);
    println!(
        "  {:<26} tp={} fp={} fn={} tn={}",
        "confusion",
        r.confusion.true_positives,
        r.confusion.false_positives,
        r.confusion.false_negatives,
        r.confusion.true_negatives
    );
    println!();

    println!("Calibration");
    match r.tier_accuracy {
        Some(acc) => println!("  {:<26} {:.1}%", "tier accuracy", acc * 100.0),
        None => println!("  {:<26} (no tier labels)", "tier accuracy"),
    }
    println!("  {:<26} {:.3}", "expected calibration error", r.calibration_error);
    println!();

    println!("By difficulty");
    for (difficulty, acc) in &r.accuracy_by_difficulty {
        println!("  {:<26} {:.1}%", difficulty.as_str(), acc * 100.0);
    }
    println!();

    println!("Tier distribution");
    for tier in RiskTier::ALL {
        let count = r.tier_distribution.get(&tier).copied().unwrap_or(0);
        println!("  {:<26} {}", tier.as_str(), count);
    }
    println!();

    let failures: Vec<_> = r.failures().collect();
    if !failures.is_empty() {
        println!("Failures");
        for f in failures {
            let expected_tier = f
                .expected_tier
                .map(|t| t.as_str())
                .unwrap_or("-");
            println!(
                "  {:<26} expected handoff={} tier={}, got {} ({}, {:.2})",
                f.id, f.expected_handoff, expected_tier, f.action, f.tier, f.confidence
            );
        }
        println!();
    }
}
