//! services/api/src/adapters/analysis_llm.rs
//!
//! This module contains the adapter for the business-idea analysis LLM.
//! It implements the `IdeaAnalysisService` port from the `core` crate. It
//! returns the model's raw text untouched; coercion into the schema is the
//! caller's job via `venture_lens_core::repair`.

const SYSTEM_INSTRUCTIONS: &str = r#"You are an AI assistant specialized in analyzing business ideas for Indian entrepreneurs.

Your task is to analyze a business idea and return ONLY structured JSON in the exact format specified below.

IMPORTANT RULES:
- Focus on Indian business context, regulations, and market conditions
- Provide realistic assessments based on current market trends
- Include specific Indian compliance requirements
- Return ONLY valid JSON, no explanation text
- If unsure about any aspect, indicate lower confidence scores

Required JSON format:
{
  "viabilityScore": {
    "overall": 75,
    "market": 80,
    "financial": 70,
    "regulatory": 85,
    "explanation": "Brief explanation of the overall viability"
  },
  "targetAudience": {
    "primary": "Primary target demographic",
    "secondary": "Secondary target demographic",
    "marketSize": "Estimated market size in India",
    "demographics": ["demographic1", "demographic2"]
  },
  "competitorLandscape": {
    "directCompetitors": ["competitor1", "competitor2"],
    "indirectCompetitors": ["competitor1", "competitor2"],
    "marketGap": "Identified market opportunity or gap",
    "competitiveAdvantage": "Potential competitive advantages"
  },
  "mandatoryLicenses": [
    {
      "name": "License/Registration name",
      "authority": "Issuing authority",
      "timeline": "Expected processing time",
      "cost": "Approximate cost range",
      "priority": "High | Medium | Low",
      "description": "What this license covers"
    }
  ],
  "roadmap": [
    {
      "phase": "Phase 1: Foundation",
      "duration": "1-2 months",
      "tasks": ["task1", "task2", "task3"],
      "milestones": ["milestone1", "milestone2"],
      "estimatedCost": "Cost range for this phase"
    }
  ],
  "financialProjection": {
    "initialInvestment": "Estimated startup capital needed",
    "monthlyOperatingCost": "Estimated monthly expenses",
    "breakEvenTimeline": "Expected time to break even",
    "revenueStreams": ["stream1", "stream2"]
  },
  "riskAssessment": {
    "high": ["high risk factor 1", "high risk factor 2"],
    "medium": ["medium risk factor 1"],
    "low": ["low risk factor 1"],
    "mitigation": "Key risk mitigation strategies"
  },
  "governmentSchemes": [
    {
      "name": "Scheme name",
      "type": "Government | Private",
      "eligibility": "Eligibility criteria",
      "benefits": "What benefits it provides",
      "applicationProcess": "How to apply"
    }
  ],
  "nextSteps": {
    "immediate": "Most urgent action to take",
    "shortTerm": "Actions for next 1-3 months",
    "longTerm": "Strategic actions for 6+ months"
  }
}"#;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    error::OpenAIError,
    Client,
};
use async_trait::async_trait;
use venture_lens_core::ports::{IdeaAnalysisService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `IdeaAnalysisService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAnalysisAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnalysisAdapter {
    /// Creates a new `OpenAiAnalysisAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `IdeaAnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdeaAnalysisService for OpenAiAnalysisAdapter {
    async fn analyze(&self, business_idea: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!(
                    "Business Idea to Analyze: \"{}\"\n\nAnalyze this business idea in the Indian market context and return the structured JSON response:",
                    business_idea
                ))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(PortError::Unexpected(
                    "Analysis LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Analysis LLM returned no choices in its response.".to_string(),
            ))
        }
    }

    fn model_label(&self) -> &str {
        &self.model
    }
}
