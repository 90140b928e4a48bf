use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{Config, ProviderKind};
use crate::errors::GenerationError;
use crate::prompt::Prompt;
use crate::schema::Generated;
use crate::wire::GenerationRequest;

pub mod gemini;
pub mod openai;
pub mod scripted;

/// One external completion backend. Returns the raw text of the reply.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, req: &GenerationRequest) -> Result<String, GenerationError>;
}

pub type DynProvider = Box<dyn Provider + Send + Sync>;

/// Read the credential from the environment. A blank value counts as missing.
pub fn read_credential(env_var: &str) -> Result<String, GenerationError> {
    match std::env::var(env_var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(GenerationError::Configuration(format!("{env_var} env var is not set"))),
    }
}

/// Build the configured backend. Fails up front when the credential is missing.
pub fn make_provider(cfg: &Config) -> Result<DynProvider, GenerationError> {
    let api_key = read_credential(&cfg.api_key_env())?;
    let model = cfg.model();
    let api_base = cfg.api_base.clone();
    match cfg.provider {
        ProviderKind::Gemini => {
            let mut p = gemini::GeminiProvider::new(api_key, model);
            if let Some(base) = api_base {
                p = p.with_api_base(base);
            }
            Ok(Box::new(p))
        }
        ProviderKind::OpenAI => {
            let mut p = openai::OpenAIProvider::new(api_key, model);
            if let Some(base) = api_base {
                p = p.with_api_base(base);
            }
            Ok(Box::new(p))
        }
    }
}

/// Stateless wrapper that turns provider text into a validated entity.
///
/// Each call is a single attempt; failures are returned to the caller as-is.
pub struct GenerationClient {
    provider: DynProvider,
}

impl GenerationClient {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn generate<T: Generated>(&self, prompt: &Prompt) -> Result<T, GenerationError> {
        let req = GenerationRequest {
            call: prompt.call,
            system: prompt.system.clone(),
            user: prompt.user.clone(),
            schema: T::schema(),
            thinking_budget: prompt.thinking_budget,
        };
        debug!(
            provider = self.provider.name(),
            call = %req.call,
            budget = req.thinking_budget,
            output = T::NAME,
            "sending generation request"
        );

        let text = self.provider.complete(&req).await?;
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse(self.provider.name().to_string()));
        }

        decode::<T>(&text).map_err(|e| {
            warn!(call = %req.call, error = %e, "model output rejected");
            e
        })
    }
}

/// Parse, check against `T::schema()`, then deserialize.
pub fn decode<T: Generated>(text: &str) -> Result<T, GenerationError> {
    let mut value = parse_json(text)
        .map_err(|e| GenerationError::Decode(format!("{} is not valid JSON: {e}", T::NAME)))?;
    let schema = T::schema();
    schema
        .validate(&value)
        .map_err(|v| GenerationError::Decode(format!("{} does not match schema {v}", T::NAME)))?;
    schema.drop_optional_nulls(&mut value);
    serde_json::from_value(value).map_err(|e| GenerationError::Decode(format!("{}: {e}", T::NAME)))
}

fn parse_json(text: &str) -> Result<Value, serde_json::Error> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(v) => Ok(v),
        Err(e) => {
            // Fallback: the model wrapped the object in prose or a code fence.
            if let Some(obj) = extract_first_json_object(text) {
                if let Ok(v) = serde_json::from_str::<Value>(obj) {
                    return Ok(v);
                }
            }
            Err(e)
        }
    }
}

/// Extracts the first top-level JSON object substring from a string.
/// Braces inside string literals are ignored; returns None if not found.
fn extract_first_json_object(s: &str) -> Option<&str> {
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' if start.is_some() => in_string = true,
            b'{' => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|st| &s[st..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
