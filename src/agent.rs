//! Language-Model Collaborator
//!
//! The model call itself lives outside this crate. This module fixes the
//! request shape, the explicit per-call configuration and token accounting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub pricing: TokenPricing,
}

fn default_model() -> String { "gemini-2.0-flash".to_string() }
fn default_max_output_tokens() -> u32 { 6000 }
fn default_temperature() -> f64 { 0.2 }

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            pricing: TokenPricing::default(),
        }
    }
}

/// USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenPricing {
    #[serde(default = "default_input_per_million")]
    pub input_per_million: f64,
    #[serde(default = "default_output_per_million")]
    pub output_per_million: f64,
}

fn default_input_per_million() -> f64 { 0.10 }
fn default_output_per_million() -> f64 { 0.40 }

impl Default for TokenPricing {
    fn default() -> Self {
        Self {
            input_per_million: default_input_per_million(),
            output_per_million: default_output_per_million(),
        }
    }
}

impl TokenPricing {
    pub fn cost(&self, usage: &TokenUsage) -> f64 {
        (usage.input_tokens as f64 * self.input_per_million
            + usage.output_tokens as f64 * self.output_per_million)
            / 1_000_000.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    /// Composed kernel, sent as system instructions
    pub system_instructions: String,
    pub user_message: String,
    #[serde(default)]
    pub context: String,
}

impl AgentRequest {
    pub fn new(system_instructions: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            system_instructions: system_instructions.into(),
            user_message: user_message.into(),
            context: String::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// User-turn contents: context, blank line, message.
    pub fn contents(&self) -> String {
        if self.context.is_empty() {
            self.user_message.clone()
        } else {
            format!("{}\n\n{}", self.context, self.user_message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub text: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Model request failed: {0}")]
    Request(String),

    #[error("Model returned no text")]
    EmptyResponse,
}

/// Black-box text generation: instructions + message in, text + token counts out.
pub trait LanguageModel {
    fn generate(&self, config: &AgentConfig, request: &AgentRequest) -> Result<AgentResponse, AgentError>;
}

/// Usage row for the caller's token ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub tenant_id: String,
    pub user_id: String,
    pub request_type: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
}

impl UsageRecord {
    pub fn new(
        tenant_id: impl Into<String>,
        user_id: impl Into<String>,
        request_type: impl Into<String>,
        config: &AgentConfig,
        usage: TokenUsage,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            request_type: request_type.into(),
            model: config.model.clone(),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            cost: config.pricing.cost(&usage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoModel;

    impl LanguageModel for EchoModel {
        fn generate(&self, _config: &AgentConfig, request: &AgentRequest) -> Result<AgentResponse, AgentError> {
            let contents = request.contents();
            Ok(AgentResponse {
                usage: TokenUsage {
                    input_tokens: (request.system_instructions.len() + contents.len()) as u64,
                    output_tokens: contents.len() as u64,
                },
                text: contents,
            })
        }
    }

    #[test]
    fn test_contents_with_and_without_context() {
        let request = AgentRequest::new("kernel", "Is acetone flammable?");
        assert_eq!(request.contents(), "Is acetone flammable?");
        let request = request.with_context("SDS: acetone");
        assert_eq!(request.contents(), "SDS: acetone\n\nIs acetone flammable?");
    }

    #[test]
    fn test_default_config_and_cost() {
        let config = AgentConfig::default();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.max_output_tokens, 6000);

        let usage = TokenUsage { input_tokens: 1_000_000, output_tokens: 500_000 };
        let cost = config.pricing.cost(&usage);
        assert!((cost - 0.30).abs() < 1e-9);
    }

    #[test]
    fn test_usage_record_from_model_response() {
        let config = AgentConfig::default();
        let response = EchoModel
            .generate(&config, &AgentRequest::new("k", "hello"))
            .unwrap();
        let record = UsageRecord::new("t1", "u1", "question", &config, response.usage);
        assert_eq!(record.input_tokens, 6);
        assert_eq!(record.output_tokens, 5);
        assert!(record.cost > 0.0);
    }

    #[test]
    fn test_partial_config_json_uses_defaults() {
        let config: AgentConfig = serde_json::from_str(r#"{"temperature": 0.5}"#).unwrap();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.pricing, TokenPricing::default());
    }
}
