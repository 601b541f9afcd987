//! Chat-completions client for graph extraction (Groq by default, any
//! OpenAI-compatible endpoint works).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use kgraph_core::{GraphDocument, Node, Relationship};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::config::OracleConfig;
use crate::oracle::GraphOracle;
use crate::schema::ExtractionSchema;
use crate::{AgentError, Result};

const SYSTEM_PROMPT: &str = "You build knowledge graphs from text. \
Identify the entities mentioned in the text as nodes and the connections between them as relationships. \
Use the most specific name of an entity as its id and keep ids consistent: \
the same entity must always get the same id, and every relationship endpoint must be one of the listed node ids. \
Use general, reusable types such as Person, Organization, Location, Event or Concept. \
Relationship types are short verbs in UPPER_SNAKE_CASE such as WORKS_AT or FOUNDED. \
Only include information stated in the text. Output a single JSON object and nothing else.";

const RESPONSE_SCHEMA: &str = r#"{"nodes":[{"id":string,"type":string}],"relationships":[{"source":string,"source_type":string,"target":string,"target_type":string,"type":string}]}"#;

/// Extraction backed by a hosted language model
#[derive(Clone)]
pub struct GroqOracle {
    client: Client,
    config: OracleConfig,
}

impl GroqOracle {
    pub fn new(config: OracleConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn complete(&self, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: json!({ "type": "json_object" }),
        };

        let mut builder = self
            .client
            .post(self.config.completions_url())
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Oracle(format!("{}: {}", status, body)));
        }

        let body = response.text().await?;
        let response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| AgentError::InvalidResponse(format!("completion body: {}", e)))?;
        if let Some(usage) = &response.usage {
            debug!(
                "Completion used {} prompt / {} completion tokens",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AgentError::InvalidResponse("response contained no choices".into()))
    }
}

#[async_trait]
impl GraphOracle for GroqOracle {
    #[instrument(skip(self, text, schema), fields(model = %self.config.model))]
    async fn extract_graph(
        &self,
        text: &str,
        schema: &ExtractionSchema,
    ) -> Result<Vec<GraphDocument>> {
        let generated = self.complete(build_prompt(text, schema)).await?;
        let document = parse_graph_document(extract_json_object(&generated))?;
        debug!(
            "Parsed {} nodes and {} relationships",
            document.nodes.len(),
            document.relationships.len()
        );
        Ok(vec![document.with_source(text)])
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: Value,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

fn build_prompt(text: &str, schema: &ExtractionSchema) -> String {
    let mut prompt = format!(
        "Return ONLY valid JSON. No markdown, no extra keys.\n\nSchema:\n{}\n\nRules:\n- Strings only, double-quoted\n- If nothing can be extracted, return empty arrays",
        RESPONSE_SCHEMA
    );
    if let Some(hint) = schema.prompt_hint() {
        prompt.push('\n');
        prompt.push_str(&hint);
    }
    prompt.push_str("\n\nText:\n");
    prompt.push_str(text);
    prompt
}

/// Cut the JSON object out of a completion that may be fenced or wrapped in prose
fn extract_json_object(payload: &str) -> &str {
    let body = strip_code_fence(payload.trim());
    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Opening fence may carry a language tag
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_graph_document(payload: &str) -> Result<GraphDocument> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| AgentError::InvalidResponse(format!("{} ({})", payload, e)))?;

    if !value.is_object() {
        return Err(AgentError::InvalidResponse(format!(
            "expected a JSON object, got {}",
            payload
        )));
    }

    let nodes: Vec<Node> = value
        .get("nodes")
        .or_else(|| value.get("entities"))
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(parse_node).collect())
        .unwrap_or_default();

    // Endpoints often omit their type; borrow it from the node list
    let known_types: HashMap<&str, &str> = nodes
        .iter()
        .map(|node| (node.id.as_str(), node.node_type.as_str()))
        .collect();

    let relationships = value
        .get("relationships")
        .or_else(|| value.get("edges"))
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| parse_relationship(item, &known_types))
                .collect()
        })
        .unwrap_or_default();

    Ok(GraphDocument::new(nodes, relationships))
}

fn parse_node(item: &Value) -> Option<Node> {
    match item {
        Value::String(id) => Some(Node::new(id.as_str(), "")),
        Value::Object(obj) => {
            let id = obj
                .get("id")
                .or_else(|| obj.get("name"))
                .or_else(|| obj.get("entity"))
                .or_else(|| obj.get("value"))
                .and_then(text_of)?;
            let node_type = obj
                .get("type")
                .or_else(|| obj.get("entity_type"))
                .or_else(|| obj.get("label"))
                .or_else(|| obj.get("category"))
                .and_then(text_of)
                .unwrap_or_default();
            Some(Node::new(id, node_type))
        }
        _ => None,
    }
}

fn parse_relationship(item: &Value, known_types: &HashMap<&str, &str>) -> Option<Relationship> {
    let source = parse_endpoint(
        item,
        &["source", "from", "head", "entity1"],
        &["source_type", "head_type"],
        known_types,
    )?;
    let target = parse_endpoint(
        item,
        &["target", "to", "tail", "entity2"],
        &["target_type", "tail_type"],
        known_types,
    )?;
    let rel_type = item
        .get("type")
        .or_else(|| item.get("relationship_type"))
        .or_else(|| item.get("relation_type"))
        .or_else(|| item.get("relation"))
        .and_then(|v| v.as_str())?;

    Some(Relationship::new(source, target, rel_type))
}

fn parse_endpoint(
    item: &Value,
    id_keys: &[&str],
    type_keys: &[&str],
    known_types: &HashMap<&str, &str>,
) -> Option<Node> {
    let raw = id_keys.iter().find_map(|key| item.get(*key))?;

    // Either a bare id or a nested node object
    let (id, nested_type) = match raw {
        Value::Object(_) => {
            let node = parse_node(raw)?;
            (node.id, Some(node.node_type).filter(|t| !t.is_empty()))
        }
        other => (text_of(other)?, None),
    };

    let node_type = nested_type
        .or_else(|| {
            type_keys
                .iter()
                .find_map(|key| item.get(*key))
                .and_then(text_of)
        })
        .or_else(|| known_types.get(id.as_str()).map(|t| t.to_string()))
        .unwrap_or_default();

    Some(Node::new(id, node_type))
}

/// Ids sometimes arrive as numbers, lists or nested objects
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        Value::Array(items) => items.iter().find_map(text_of),
        Value::Object(_) => parse_node(value).map(|node| node.id),
        Value::Null => None,
    }
}
