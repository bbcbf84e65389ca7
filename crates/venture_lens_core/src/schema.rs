//! crates/venture_lens_core/src/schema.rs
//!
//! The fixed analysis schema. Every validated model response is coerced
//! into `BusinessAnalysis`; callers can rely on the full field set being
//! present without defensive checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViabilityScore {
    pub overall: u8,
    pub market: u8,
    pub financial: u8,
    pub regulatory: u8,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetAudience {
    pub primary: String,
    pub secondary: String,
    pub market_size: String,
    pub demographics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorLandscape {
    pub direct_competitors: Vec<String>,
    pub indirect_competitors: Vec<String>,
    pub market_gap: String,
    pub competitive_advantage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub name: String,
    pub authority: String,
    pub timeline: String,
    pub cost: String,
    pub priority: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapPhase {
    pub phase: String,
    pub duration: String,
    pub tasks: Vec<String>,
    pub milestones: Vec<String>,
    pub estimated_cost: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProjection {
    pub initial_investment: String,
    pub monthly_operating_cost: String,
    pub break_even_timeline: String,
    pub revenue_streams: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
    pub mitigation: String,
}

/// A government or private support scheme relevant to the idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportScheme {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub eligibility: String,
    pub benefits: String,
    pub application_process: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextSteps {
    pub immediate: String,
    pub short_term: String,
    pub long_term: String,
}

/// Provenance stamped on every analysis, whatever path produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub model: String,
    pub business_idea: String,
    pub timestamp: DateTime<Utc>,
    pub fallback: bool,
}

/// The full validated analysis payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessAnalysis {
    pub viability_score: ViabilityScore,
    pub target_audience: TargetAudience,
    pub competitor_landscape: CompetitorLandscape,
    pub mandatory_licenses: Vec<License>,
    pub roadmap: Vec<RoadmapPhase>,
    pub financial_projection: FinancialProjection,
    pub risk_assessment: RiskAssessment,
    pub government_schemes: Vec<SupportScheme>,
    pub next_steps: NextSteps,
    #[serde(rename = "_metadata")]
    pub metadata: Provenance,
}

//=========================================================================================
// Neutral per-field defaults, used when the model dropped or mangled a field
//=========================================================================================

impl ViabilityScore {
    pub fn neutral() -> Self {
        Self {
            overall: 50,
            market: 50,
            financial: 50,
            regulatory: 50,
            explanation: "Insufficient data for detailed analysis".to_string(),
        }
    }
}

impl TargetAudience {
    pub fn neutral() -> Self {
        Self {
            primary: "To be determined".to_string(),
            secondary: "To be determined".to_string(),
            market_size: "Unknown".to_string(),
            demographics: Vec::new(),
        }
    }
}

impl CompetitorLandscape {
    pub fn neutral() -> Self {
        Self {
            direct_competitors: Vec::new(),
            indirect_competitors: Vec::new(),
            market_gap: "Requires detailed market analysis".to_string(),
            competitive_advantage: "To be defined based on unique value proposition"
                .to_string(),
        }
    }
}

impl FinancialProjection {
    pub fn neutral() -> Self {
        Self {
            initial_investment: "To be estimated".to_string(),
            monthly_operating_cost: "To be estimated".to_string(),
            break_even_timeline: "Unknown".to_string(),
            revenue_streams: Vec::new(),
        }
    }
}

impl RiskAssessment {
    pub fn neutral() -> Self {
        Self {
            high: Vec::new(),
            medium: Vec::new(),
            low: Vec::new(),
            mitigation: "Requires a fuller risk review".to_string(),
        }
    }
}

impl NextSteps {
    pub fn neutral() -> Self {
        Self {
            immediate: "Conduct detailed market research and validate the business concept"
                .to_string(),
            short_term: "Develop a comprehensive business plan and identify funding sources"
                .to_string(),
            long_term: "Build a strong team and establish market presence".to_string(),
        }
    }
}

impl BusinessAnalysis {
    /// The deterministic fallback used when the model's output cannot be
    /// parsed at all. Content mirrors the generic guidance the product has
    /// always shown in that situation.
    pub fn fallback(business_idea: &str, model: &str, now: DateTime<Utc>) -> Self {
        Self {
            viability_score: ViabilityScore {
                overall: 60,
                market: 65,
                financial: 55,
                regulatory: 60,
                explanation:
                    "Analysis requires more specific information about the business model and target market."
                        .to_string(),
            },
            target_audience: TargetAudience {
                primary: "General consumers".to_string(),
                secondary: "Small businesses".to_string(),
                market_size: "To be determined based on specific market research".to_string(),
                demographics: vec![
                    "Urban middle class".to_string(),
                    "Tech-savvy consumers".to_string(),
                ],
            },
            competitor_landscape: CompetitorLandscape {
                direct_competitors: vec!["To be identified through market research".to_string()],
                indirect_competitors: vec!["Traditional alternatives".to_string()],
                market_gap: "Requires detailed market analysis".to_string(),
                competitive_advantage: "To be defined based on unique value proposition"
                    .to_string(),
            },
            mandatory_licenses: vec![
                License {
                    name: "Business Registration".to_string(),
                    authority: "Registrar of Companies / Local Authority".to_string(),
                    timeline: "15-30 days".to_string(),
                    cost: "₹5,000 - ₹25,000".to_string(),
                    priority: "High".to_string(),
                    description: "Basic business entity registration".to_string(),
                },
                License {
                    name: "GST Registration".to_string(),
                    authority: "GST Department".to_string(),
                    timeline: "7-15 days".to_string(),
                    cost: "Free (if eligible)".to_string(),
                    priority: "High".to_string(),
                    description:
                        "Goods and Services Tax registration if turnover exceeds threshold"
                            .to_string(),
                },
            ],
            roadmap: vec![
                RoadmapPhase {
                    phase: "Phase 1: Planning & Research".to_string(),
                    duration: "1-2 months".to_string(),
                    tasks: vec![
                        "Market research".to_string(),
                        "Business plan development".to_string(),
                        "Legal structure setup".to_string(),
                    ],
                    milestones: vec![
                        "Completed market analysis".to_string(),
                        "Finalized business model".to_string(),
                    ],
                    estimated_cost: "₹50,000 - ₹1,00,000".to_string(),
                },
                RoadmapPhase {
                    phase: "Phase 2: Setup & Launch".to_string(),
                    duration: "2-3 months".to_string(),
                    tasks: vec![
                        "Obtain licenses".to_string(),
                        "Setup operations".to_string(),
                        "Initial marketing".to_string(),
                    ],
                    milestones: vec![
                        "All licenses obtained".to_string(),
                        "Operations ready".to_string(),
                    ],
                    estimated_cost: "₹2,00,000 - ₹5,00,000".to_string(),
                },
            ],
            financial_projection: FinancialProjection {
                initial_investment: "₹2,00,000 - ₹10,00,000".to_string(),
                monthly_operating_cost: "₹50,000 - ₹2,00,000".to_string(),
                break_even_timeline: "12-18 months".to_string(),
                revenue_streams: vec![
                    "Primary service/product sales".to_string(),
                    "Secondary revenue streams".to_string(),
                ],
            },
            risk_assessment: RiskAssessment {
                high: vec![
                    "Market competition".to_string(),
                    "Regulatory changes".to_string(),
                ],
                medium: vec![
                    "Economic fluctuations".to_string(),
                    "Technology disruption".to_string(),
                ],
                low: vec!["Seasonal variations".to_string()],
                mitigation:
                    "Diversify revenue streams, maintain regulatory compliance, continuous market monitoring"
                        .to_string(),
            },
            government_schemes: vec![
                SupportScheme {
                    name: "MUDRA Loan".to_string(),
                    kind: "Government".to_string(),
                    eligibility: "Micro and small enterprises".to_string(),
                    benefits: "Collateral-free loans up to ₹10 lakhs".to_string(),
                    application_process: "Apply through participating banks".to_string(),
                },
                SupportScheme {
                    name: "Startup India".to_string(),
                    kind: "Government".to_string(),
                    eligibility: "Innovative startups".to_string(),
                    benefits: "Tax exemptions, easier compliance, funding opportunities"
                        .to_string(),
                    application_process: "Register on Startup India portal".to_string(),
                },
            ],
            next_steps: NextSteps::neutral(),
            metadata: Provenance {
                model: model.to_string(),
                business_idea: business_idea.to_string(),
                timestamp: now,
                fallback: true,
            },
        }
    }
}
