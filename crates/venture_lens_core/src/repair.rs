//! crates/venture_lens_core/src/repair.rs
//!
//! Coerces raw model output into a `BusinessAnalysis` that always satisfies
//! the full schema. Parse failures fall back to a deterministic payload;
//! partial payloads are repaired field by field. This function never fails,
//! which is what lets every caller skip defensive checks on its result.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::schema::{
    BusinessAnalysis, CompetitorLandscape, FinancialProjection, License, NextSteps, Provenance,
    RiskAssessment, RoadmapPhase, SupportScheme, TargetAudience, ViabilityScore,
};

/// Validates and repairs `raw` into a schema-conformant analysis.
///
/// `business_idea` and `model` are stamped into the provenance metadata on
/// every path. Retry policy is deliberately not handled here; a caller that
/// wants a second model attempt must make it before calling `repair`.
pub fn repair(raw: &str, business_idea: &str, model: &str, now: DateTime<Utc>) -> BusinessAnalysis {
    let text = strip_code_fence(raw.trim());

    let root: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => return BusinessAnalysis::fallback(business_idea, model, now),
    };

    BusinessAnalysis {
        viability_score: viability_score(root.get("viabilityScore")),
        target_audience: target_audience(root.get("targetAudience")),
        competitor_landscape: competitor_landscape(root.get("competitorLandscape")),
        mandatory_licenses: object_list(root.get("mandatoryLicenses"), license),
        roadmap: object_list(root.get("roadmap"), roadmap_phase),
        financial_projection: financial_projection(root.get("financialProjection")),
        risk_assessment: risk_assessment(root.get("riskAssessment")),
        government_schemes: object_list(root.get("governmentSchemes"), support_scheme),
        next_steps: next_steps(root.get("nextSteps")),
        metadata: Provenance {
            model: model.to_string(),
            business_idea: business_idea.to_string(),
            timestamp: now,
            fallback: false,
        },
    }
}

/// Strips a single fenced-code wrapper (```json ... ``` or ``` ... ```).
/// The fence is a formatting artifact of the model, not semantic content.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag line, if any, then the closing fence.
    let body = match rest.split_once('\n') {
        Some((_tag, body)) => body,
        None => return text,
    };
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

//=========================================================================================
// Field-level coercion helpers
//=========================================================================================

fn string_or(value: Option<&Value>, default: &str) -> String {
    match value.and_then(Value::as_str) {
        Some(s) => s.to_string(),
        None => default.to_string(),
    }
}

/// A list of strings; non-string entries are dropped, non-arrays become empty.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value.and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

/// A numeric score clamped into 0..=100; anything unusable becomes the
/// mid-range 50.
fn score(value: Option<&Value>) -> u8 {
    match value.and_then(Value::as_f64) {
        Some(n) => n.clamp(0.0, 100.0).round() as u8,
        None => 50,
    }
}

/// A list of fixed-shape objects; items that are not objects are dropped,
/// items that are objects get per-field repair via `item`.
fn object_list<T>(value: Option<&Value>, item: fn(&Value) -> T) -> Vec<T> {
    match value.and_then(Value::as_array) {
        Some(items) => items.iter().filter(|v| v.is_object()).map(item).collect(),
        None => Vec::new(),
    }
}

fn viability_score(value: Option<&Value>) -> ViabilityScore {
    let Some(v) = value.filter(|v| v.is_object()) else {
        return ViabilityScore::neutral();
    };
    ViabilityScore {
        overall: score(v.get("overall")),
        market: score(v.get("market")),
        financial: score(v.get("financial")),
        regulatory: score(v.get("regulatory")),
        explanation: string_or(v.get("explanation"), "No explanation provided"),
    }
}

fn target_audience(value: Option<&Value>) -> TargetAudience {
    let Some(v) = value.filter(|v| v.is_object()) else {
        return TargetAudience::neutral();
    };
    TargetAudience {
        primary: string_or(v.get("primary"), "To be determined"),
        secondary: string_or(v.get("secondary"), "To be determined"),
        market_size: string_or(v.get("marketSize"), "Unknown"),
        demographics: string_list(v.get("demographics")),
    }
}

fn competitor_landscape(value: Option<&Value>) -> CompetitorLandscape {
    let Some(v) = value.filter(|v| v.is_object()) else {
        return CompetitorLandscape::neutral();
    };
    CompetitorLandscape {
        direct_competitors: string_list(v.get("directCompetitors")),
        indirect_competitors: string_list(v.get("indirectCompetitors")),
        market_gap: string_or(v.get("marketGap"), "Requires detailed market analysis"),
        competitive_advantage: string_or(
            v.get("competitiveAdvantage"),
            "To be defined based on unique value proposition",
        ),
    }
}

fn license(v: &Value) -> License {
    License {
        name: string_or(v.get("name"), "Unnamed license"),
        authority: string_or(v.get("authority"), "Unknown authority"),
        timeline: string_or(v.get("timeline"), "Unknown"),
        cost: string_or(v.get("cost"), "Unknown"),
        priority: string_or(v.get("priority"), "Medium"),
        description: string_or(v.get("description"), ""),
    }
}

fn roadmap_phase(v: &Value) -> RoadmapPhase {
    RoadmapPhase {
        phase: string_or(v.get("phase"), "Unnamed phase"),
        duration: string_or(v.get("duration"), "Unknown"),
        tasks: string_list(v.get("tasks")),
        milestones: string_list(v.get("milestones")),
        estimated_cost: string_or(v.get("estimatedCost"), "Unknown"),
    }
}

fn financial_projection(value: Option<&Value>) -> FinancialProjection {
    let Some(v) = value.filter(|v| v.is_object()) else {
        return FinancialProjection::neutral();
    };
    FinancialProjection {
        initial_investment: string_or(v.get("initialInvestment"), "To be estimated"),
        monthly_operating_cost: string_or(v.get("monthlyOperatingCost"), "To be estimated"),
        break_even_timeline: string_or(v.get("breakEvenTimeline"), "Unknown"),
        revenue_streams: string_list(v.get("revenueStreams")),
    }
}

fn risk_assessment(value: Option<&Value>) -> RiskAssessment {
    let Some(v) = value.filter(|v| v.is_object()) else {
        return RiskAssessment::neutral();
    };
    RiskAssessment {
        high: string_list(v.get("high")),
        medium: string_list(v.get("medium")),
        low: string_list(v.get("low")),
        mitigation: string_or(v.get("mitigation"), "Requires a fuller risk review"),
    }
}

fn support_scheme(v: &Value) -> SupportScheme {
    SupportScheme {
        name: string_or(v.get("name"), "Unnamed scheme"),
        kind: string_or(v.get("type"), "Government"),
        eligibility: string_or(v.get("eligibility"), "Unknown"),
        benefits: string_or(v.get("benefits"), "Unknown"),
        application_process: string_or(v.get("applicationProcess"), "Unknown"),
    }
}

fn next_steps(value: Option<&Value>) -> NextSteps {
    let Some(v) = value.filter(|v| v.is_object()) else {
        return NextSteps::neutral();
    };
    let neutral = NextSteps::neutral();
    NextSteps {
        immediate: string_or(v.get("immediate"), &neutral.immediate),
        short_term: string_or(v.get("shortTerm"), &neutral.short_term),
        long_term: string_or(v.get("longTerm"), &neutral.long_term),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDEA: &str = "cloud kitchen in Mumbai";
    const MODEL: &str = "gpt-4o-mini";

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn garbage_text_yields_the_deterministic_fallback() {
        let out = repair("the model rambled instead of emitting JSON", IDEA, MODEL, now());
        assert!(out.metadata.fallback);
        assert_eq!(out.metadata.business_idea, IDEA);
        assert_eq!(out.viability_score.overall, 60);
        assert_eq!(out.mandatory_licenses.len(), 2);
    }

    #[test]
    fn truncated_json_yields_the_fallback() {
        let out = repair(r#"{"viabilityScore": {"overall": 80, "mar"#, IDEA, MODEL, now());
        assert!(out.metadata.fallback);
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let raw = "```json\n{\"viabilityScore\": {\"overall\": 80, \"market\": 70, \"financial\": 60, \"regulatory\": 90, \"explanation\": \"solid\"}}\n```";
        let out = repair(raw, IDEA, MODEL, now());
        assert!(!out.metadata.fallback);
        assert_eq!(out.viability_score.overall, 80);
        assert_eq!(out.viability_score.explanation, "solid");
    }

    #[test]
    fn bare_fence_without_language_tag_is_unwrapped() {
        let raw = "```\n{\"roadmap\": []}\n```";
        let out = repair(raw, IDEA, MODEL, now());
        assert!(!out.metadata.fallback);
        assert!(out.roadmap.is_empty());
    }

    #[test]
    fn missing_fields_are_replaced_by_neutral_defaults() {
        let out = repair("{}", IDEA, MODEL, now());
        assert!(!out.metadata.fallback);
        assert_eq!(out.viability_score, ViabilityScore::neutral());
        assert_eq!(out.target_audience, TargetAudience::neutral());
        assert!(out.mandatory_licenses.is_empty());
        assert!(out.roadmap.is_empty());
        assert!(out.government_schemes.is_empty());
        assert_eq!(out.next_steps, NextSteps::neutral());
    }

    #[test]
    fn wrong_shapes_are_repaired_per_field_not_rejected() {
        let raw = r#"{
            "viabilityScore": {"overall": "eighty", "market": 170, "financial": -3, "regulatory": 55},
            "targetAudience": "young people",
            "mandatoryLicenses": "FSSAI",
            "roadmap": [{"phase": "Phase 1", "tasks": ["a", 7, "b"]}, "not an object"],
            "riskAssessment": {"high": ["rent"], "mitigation": 42}
        }"#;
        let out = repair(raw, IDEA, MODEL, now());
        assert!(!out.metadata.fallback);
        assert_eq!(out.viability_score.overall, 50);
        assert_eq!(out.viability_score.market, 100);
        assert_eq!(out.viability_score.financial, 0);
        assert_eq!(out.viability_score.regulatory, 55);
        assert_eq!(out.target_audience, TargetAudience::neutral());
        assert!(out.mandatory_licenses.is_empty());
        assert_eq!(out.roadmap.len(), 1);
        assert_eq!(out.roadmap[0].tasks, vec!["a", "b"]);
        assert_eq!(out.risk_assessment.high, vec!["rent"]);
        assert_eq!(out.risk_assessment.mitigation, "Requires a fuller risk review");
    }

    #[test]
    fn conformant_payload_passes_through_intact() {
        let raw = r#"{
            "viabilityScore": {"overall": 75, "market": 80, "financial": 70, "regulatory": 85, "explanation": "ok"},
            "targetAudience": {"primary": "office workers", "secondary": "students", "marketSize": "large", "demographics": ["urban"]},
            "competitorLandscape": {"directCompetitors": ["X"], "indirectCompetitors": [], "marketGap": "gap", "competitiveAdvantage": "edge"},
            "mandatoryLicenses": [{"name": "FSSAI", "authority": "FSSAI", "timeline": "30 days", "cost": "₹2,000", "priority": "High", "description": "food license"}],
            "roadmap": [{"phase": "Phase 1", "duration": "1 month", "tasks": ["t"], "milestones": ["m"], "estimatedCost": "₹10,000"}],
            "financialProjection": {"initialInvestment": "₹5,00,000", "monthlyOperatingCost": "₹80,000", "breakEvenTimeline": "10 months", "revenueStreams": ["orders"]},
            "riskAssessment": {"high": [], "medium": ["supply"], "low": [], "mitigation": "diversify"},
            "governmentSchemes": [{"name": "MUDRA Loan", "type": "Government", "eligibility": "MSME", "benefits": "loan", "applicationProcess": "bank"}],
            "nextSteps": {"immediate": "register", "shortTerm": "pilot", "longTerm": "expand"}
        }"#;
        let out = repair(raw, IDEA, MODEL, now());
        assert!(!out.metadata.fallback);
        assert_eq!(out.viability_score.overall, 75);
        assert_eq!(out.mandatory_licenses[0].name, "FSSAI");
        assert_eq!(out.government_schemes[0].kind, "Government");
        assert_eq!(out.next_steps.immediate, "register");
        assert_eq!(out.metadata.model, MODEL);
    }

    #[test]
    fn output_round_trips_through_the_wire_shape() {
        let out = repair("{}", IDEA, MODEL, now());
        let json = serde_json::to_value(&out).unwrap();
        // Wire names stay camelCase with the metadata under `_metadata`.
        assert!(json.get("viabilityScore").is_some());
        assert!(json.get("_metadata").unwrap().get("fallback").is_some());
        let back: BusinessAnalysis = serde_json::from_value(json).unwrap();
        assert_eq!(back, out);
    }
}
