//! Request payload scenarios.
//!
//! Each scenario is a fixed request shape parameterized by model,
//! temperature, and token budget. Payloads are built once per run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::Error;

/// Named request payload variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Single short user turn.
    Text,
    /// Large fixed system preamble plus a three-turn conversation.
    Caching,
    /// One declared tool and a user turn asking to invoke it.
    Tool,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Text, Scenario::Caching, Scenario::Tool];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Text => "text",
            Scenario::Caching => "caching",
            Scenario::Tool => "tool",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.as_str() == s)
            .ok_or_else(|| Error::config(format!("Unknown scenario: {}", s)))
    }
}

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Extended reasoning settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thinking {
    #[serde(rename = "type")]
    pub kind: String,
    pub budget_tokens: u32,
}

/// Tool declaration with a JSON input schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Streaming messages request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub model: String,
    pub stream: bool,
    pub temperature: f64,
    pub max_tokens: u32,
    pub thinking: Thinking,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tools: Option<Vec<ToolDefinition>>,
    pub messages: Vec<Message>,
}

const CONTEXT_LINE: &str = "// Large codebase file content line\n";
const CONTEXT_LINES: usize = 1000;

fn large_system_prompt() -> String {
    let mut prompt =
        String::from("You are an expert software engineer. Here is important context:\n");
    prompt.push_str(&CONTEXT_LINE.repeat(CONTEXT_LINES));
    prompt
}

fn weather_tool() -> ToolDefinition {
    ToolDefinition {
        name: "get_weather".to_string(),
        description: "Get the current weather for a location".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "location": { "type": "string", "description": "City name" },
            },
            "required": ["location"],
        }),
    }
}

/// Build the request body for `scenario`.
pub fn build_payload(
    scenario: Scenario,
    model: &str,
    temperature: f64,
    max_tokens: u32,
) -> MessagesRequest {
    let mut request = MessagesRequest {
        model: model.to_string(),
        stream: true,
        temperature,
        max_tokens,
        thinking: Thinking {
            kind: "enabled".to_string(),
            budget_tokens: max_tokens,
        },
        system: None,
        tools: None,
        messages: Vec::new(),
    };

    match scenario {
        Scenario::Text => {
            request.messages = vec![Message::user("Say hello in one sentence.")];
        }
        Scenario::Caching => {
            request.system = Some(large_system_prompt());
            request.messages = vec![
                Message::user("Turn 1: briefly explain what a hash function is."),
                Message::assistant(
                    "A hash function maps input data to a fixed-size digest in a deterministic way.",
                ),
                Message::user("Turn 2: now explain what a collision is in one sentence."),
            ];
        }
        Scenario::Tool => {
            request.tools = Some(vec![weather_tool()]);
            request.messages = vec![Message::user(
                "Call get_weather for location \"Istanbul\" and then summarize the result.",
            )];
        }
    }

    request
}
