//! services/api/src/adapters/enhancement_llm.rs
//!
//! This module contains the adapter for the list-enhancing LLM, reached through
//! OpenRouter's OpenAI-compatible API. It implements the `EnhancementService` port
//! from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use packing_list_core::{
    domain::{Destination, ItemCategory, Language, Season, TripConfiguration},
    enhancement::{EnhancementRequest, EnhancementResponse, RawSuggestion},
    ports::{EnhancementService, PortError, PortResult},
};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `EnhancementService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenRouterEnhancementAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenRouterEnhancementAdapter {
    /// Creates a new `OpenRouterEnhancementAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
        }
    }

    /// Sends one chat request and returns the text of the first choice.
    async fn complete(&self, request: CreateChatCompletionRequest) -> PortResult<String> {
        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                PortError::Unavailable(format!(
                    "Enhancement model did not answer within {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e: OpenAIError| PortError::Unavailable(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| PortError::Unexpected("Enhancement model returned no content".to_string()))
    }
}

//=========================================================================================
// `EnhancementService` Trait Implementation
//=========================================================================================

#[async_trait]
impl EnhancementService for OpenRouterEnhancementAdapter {
    async fn suggest(&self, request: &EnhancementRequest) -> PortResult<EnhancementResponse> {
        let language = request.response_language.prompt_name();
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(format!(
                    "You are a helpful travel assistant specializing in packing lists. Respond ONLY with valid JSON. Be conservative with suggestions: only suggest items that are truly essential. Always respond in {} language.",
                    language
                ))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_enhancement_prompt(request))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .max_tokens(1500u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let content = self.complete(chat_request).await?;
        tracing::debug!(chars = content.len(), "Received enhancement response");
        parse_enhancement_response(&content)
    }

    async fn item_tip(
        &self,
        item_name: &str,
        trip: &TripConfiguration,
        language: Language,
    ) -> PortResult<String> {
        let destination = match trip.destination() {
            Destination::Home => "Home",
            Destination::General => "a destination",
        };
        let messages: Vec<ChatCompletionRequestMessage> = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(format!(
                "For a {}-day trip during {} to {}, what's a quick tip about packing \"{}\"? Keep it to 1-2 sentences. Respond in {} language.",
                trip.number_of_days,
                trip.current_season,
                destination,
                item_name,
                language.prompt_name()
            ))
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .max_tokens(100u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(self.complete(chat_request).await?.trim().to_string())
    }
}

//=========================================================================================
// Disabled Enhancement
//=========================================================================================

/// Stands in when no API key is configured. Every call reports the service as unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledEnhancement;

#[async_trait]
impl EnhancementService for DisabledEnhancement {
    async fn suggest(&self, _request: &EnhancementRequest) -> PortResult<EnhancementResponse> {
        Err(PortError::Unavailable("Enhancement is not configured".to_string()))
    }

    async fn item_tip(&self, _: &str, _: &TripConfiguration, _: Language) -> PortResult<String> {
        Err(PortError::Unavailable("Enhancement is not configured".to_string()))
    }
}

//=========================================================================================
// Prompt and Response Helpers
//=========================================================================================

fn season_description(season: Season) -> &'static str {
    match season {
        Season::Spring => "spring (mild temperatures, possible rain)",
        Season::Summer => "summer (hot and sunny)",
        Season::Fall => "fall (cooling temperatures, variable weather)",
        Season::Winter => "winter (cold temperatures)",
    }
}

pub fn build_enhancement_prompt(request: &EnhancementRequest) -> String {
    let destination = match request.destination {
        Destination::Home => "home (visiting family)",
        Destination::General => "general destination",
    };
    let luggage = if request.has_large_luggage {
        "I am bringing big luggage."
    } else {
        "I am travelling with a backpack only."
    };
    let items = request
        .item_names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {}", i + 1, name))
        .collect::<Vec<_>>()
        .join("\n");
    let categories = ItemCategory::ALL
        .iter()
        .filter(|category| **category != ItemCategory::Pending)
        .map(|category| category.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let language = request.response_language.prompt_name();

    format!(
        r#"I'm traveling for {days} days during {season} to {destination}. {luggage}

My current packing list includes:
{items}

Please respond with a JSON object in this EXACT format (no additional text outside the JSON):
{{
  "summary_text": "General packing advice in markdown. Include tips for the season, weather and important reminders. Keep it to 3-5 bullet points.",
  "suggested_items": [
    {{
      "name": "Item name",
      "category": "one of: {categories}",
      "quantity": 1,
      "reason": "Brief explanation why this is important"
    }}
  ]
}}

GUIDELINES:
1. Only suggest items that are STRICTLY NECESSARY for safety, legal requirements or critical comfort
2. Do NOT suggest items that are already in the list
3. Suggest at most 3 items; an empty list is fine
4. Common items like "phone" or "wallet" should NOT be suggested
5. Focus on season-specific needs and trip duration
6. Use markdown formatting (**, -) in summary_text
7. Respond in {language}. summary_text, item names and reasons must all be in {language}."#,
        days = request.number_of_days,
        season = season_description(request.season),
        destination = destination,
        luggage = luggage,
        items = items,
        categories = categories,
        language = language,
    )
}

fn code_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$").expect("code fence pattern is valid")
    })
}

/// Removes a surrounding markdown code fence, if any.
pub fn strip_code_fences(text: &str) -> &str {
    match code_fence().captures(text).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str(),
        None => text.trim(),
    }
}

/// Parses the model output. A body that is not a JSON object is an error; a suggestion
/// that does not have the expected shape is kept as an empty one, which the core drops.
pub fn parse_enhancement_response(text: &str) -> PortResult<EnhancementResponse> {
    let value: Value = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| PortError::Unexpected(format!("Enhancement response is not JSON: {}", e)))?;
    let object = value.as_object().ok_or_else(|| {
        PortError::Unexpected("Enhancement response is not a JSON object".to_string())
    })?;

    let summary_text = object
        .get("summary_text")
        .and_then(Value::as_str)
        .map(str::to_string);
    let suggested_items = object
        .get("suggested_items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| serde_json::from_value::<RawSuggestion>(item.clone()).unwrap_or_default())
                .collect()
        });

    Ok(EnhancementResponse {
        summary_text,
        suggested_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_json_is_unwrapped() {
        let fenced = "```json\n{\"summary_text\": \"Pack light\"}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"summary_text\": \"Pack light\"}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn response_fields_are_read_leniently() {
        let response = parse_enhancement_response(
            r#"```
            {
              "summary_text": "- Bring layers",
              "suggested_items": [
                {"name": "Thermos", "category": "misc", "quantity": 1, "reason": "Cold mornings"},
                {"name": "Gloves", "category": "clothes", "quantity": "two", "reason": "Wind"}
              ]
            }
            ```"#,
        )
        .unwrap();

        assert_eq!(response.summary_text.as_deref(), Some("- Bring layers"));
        let items = response.suggested_items.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name.as_deref(), Some("Thermos"));
        assert_eq!(items[1], RawSuggestion::default());
    }

    #[test]
    fn missing_array_is_reported_as_none() {
        let response = parse_enhancement_response(r#"{"summary_text": "ok", "suggested_items": "none"}"#)
            .unwrap();
        assert!(response.suggested_items.is_none());
    }

    #[test]
    fn non_json_is_an_error() {
        assert!(parse_enhancement_response("Sure! Here are my tips.").is_err());
        assert!(parse_enhancement_response("[1, 2]").is_err());
    }

    #[test]
    fn prompt_mentions_trip_and_items() {
        let request = EnhancementRequest {
            number_of_days: 4,
            season: Season::Winter,
            destination: Destination::Home,
            has_large_luggage: false,
            item_names: vec!["Coat".to_string(), "Gloves".to_string()],
            response_language: Language::Es,
        };
        let prompt = build_enhancement_prompt(&request);
        assert!(prompt.contains("4 days during winter (cold temperatures) to home"));
        assert!(prompt.contains("1. Coat\n2. Gloves"));
        assert!(prompt.contains("Respond in Spanish"));
        assert!(!prompt.contains("pending"));
    }

    #[tokio::test]
    async fn disabled_service_is_unavailable() {
        let trip = TripConfiguration {
            number_of_days: 1,
            is_home_destination: false,
            has_large_luggage: false,
            current_season: Season::Summer,
            use_enhancement: true,
        };
        assert!(matches!(
            DisabledEnhancement.item_tip("Hat", &trip, Language::En).await,
            Err(PortError::Unavailable(_))
        ));
    }
}
