//! Schema registry: the declared output shape of each generation call.
//!
//! A [`Schema`] is a plain value. It is rendered into the dialect a provider
//! understands (JSON Schema for OpenAI, the OpenAPI subset for Gemini) and is
//! also used to check the decoded response before it becomes a typed entity.

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::wire::{AnalysisResult, DesignResult, LogicCategory, ProjectInput, VisualResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    kind: Kind,
    description: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    String { choices: Option<Vec<&'static str>> },
    Integer,
    Array(Box<Schema>),
    Object {
        properties: Vec<(&'static str, Schema)>,
        required: Vec<&'static str>,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("at {path}: {reason}")]
pub struct SchemaViolation {
    pub path: String,
    pub reason: String,
}

impl Schema {
    fn new(kind: Kind) -> Self {
        Self { kind, description: None }
    }

    pub fn string() -> Self {
        Self::new(Kind::String { choices: None })
    }

    pub fn one_of(choices: &[&'static str]) -> Self {
        Self::new(Kind::String { choices: Some(choices.to_vec()) })
    }

    pub fn integer() -> Self {
        Self::new(Kind::Integer)
    }

    pub fn array(items: Schema) -> Self {
        Self::new(Kind::Array(Box::new(items)))
    }

    pub fn object<I>(properties: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Schema)>,
    {
        Self::new(Kind::Object { properties: properties.into_iter().collect(), required: Vec::new() })
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Mark properties of an object schema as mandatory. No-op on other kinds.
    pub fn require<I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        if let Kind::Object { required, .. } = &mut self.kind {
            required.extend(names);
        }
        self
    }

    /// Remove null-valued optional properties so they deserialize as defaults.
    pub fn drop_optional_nulls(&self, value: &mut Value) {
        match (&self.kind, value) {
            (Kind::Array(items), Value::Array(arr)) => {
                for v in arr {
                    items.drop_optional_nulls(v);
                }
            }
            (Kind::Object { properties, required }, Value::Object(obj)) => {
                for (name, schema) in properties {
                    let is_null = matches!(obj.get(*name), Some(Value::Null));
                    if is_null && !required.contains(name) {
                        obj.remove(*name);
                    } else if let Some(v) = obj.get_mut(*name) {
                        schema.drop_optional_nulls(v);
                    }
                }
            }
            _ => {}
        }
    }

    /// Lowercase JSON Schema, as accepted by OpenAI structured outputs.
    pub fn to_json_schema(&self) -> Value {
        self.render(false)
    }

    /// Uppercase OpenAPI subset, as accepted by Gemini `responseSchema`.
    pub fn to_openapi(&self) -> Value {
        self.render(true)
    }

    fn render(&self, openapi: bool) -> Value {
        let ty = |lower: &str| if openapi { lower.to_uppercase() } else { lower.to_string() };
        let mut out = Map::new();
        match &self.kind {
            Kind::String { choices } => {
                out.insert("type".into(), json!(ty("string")));
                if let Some(choices) = choices {
                    out.insert("enum".into(), json!(choices));
                }
            }
            Kind::Integer => {
                out.insert("type".into(), json!(ty("integer")));
            }
            Kind::Array(items) => {
                out.insert("type".into(), json!(ty("array")));
                out.insert("items".into(), items.render(openapi));
            }
            Kind::Object { properties, required } => {
                out.insert("type".into(), json!(ty("object")));
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(name, s)| (name.to_string(), s.render(openapi)))
                    .collect();
                out.insert("properties".into(), Value::Object(props));
                if !required.is_empty() {
                    out.insert("required".into(), json!(required));
                }
                if openapi {
                    let order: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
                    out.insert("propertyOrdering".into(), json!(order));
                }
            }
        }
        if let Some(d) = self.description {
            out.insert("description".into(), json!(d));
        }
        Value::Object(out)
    }

    /// Check a decoded JSON value against this schema.
    ///
    /// Optional properties may be absent or null; unknown properties are ignored.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at(value, "$")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), SchemaViolation> {
        let violation = |reason: String| SchemaViolation { path: path.to_string(), reason };
        match &self.kind {
            Kind::String { choices } => {
                let s = value
                    .as_str()
                    .ok_or_else(|| violation(format!("expected string, got {}", type_name(value))))?;
                if let Some(choices) = choices {
                    if !choices.iter().any(|c| *c == s) {
                        return Err(violation(format!("{s:?} is not one of {choices:?}")));
                    }
                }
                Ok(())
            }
            Kind::Integer => {
                if value.is_i64() || value.is_u64() {
                    Ok(())
                } else {
                    Err(violation(format!("expected integer, got {}", type_name(value))))
                }
            }
            Kind::Array(items) => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| violation(format!("expected array, got {}", type_name(value))))?;
                for (i, v) in arr.iter().enumerate() {
                    items.validate_at(v, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }
            Kind::Object { properties, required } => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| violation(format!("expected object, got {}", type_name(value))))?;
                for (name, schema) in properties {
                    match obj.get(*name) {
                        None | Some(Value::Null) => {
                            if required.contains(name) {
                                return Err(violation(format!("missing required field '{name}'")));
                            }
                        }
                        Some(v) => schema.validate_at(v, &format!("{path}.{name}"))?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_schema().serialize(serializer)
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// An entity produced by exactly one schema-constrained call.
pub trait Generated: DeserializeOwned + Serialize {
    const NAME: &'static str;

    fn schema() -> Schema;
}

impl Generated for ProjectInput {
    const NAME: &'static str = "ProjectInput";

    fn schema() -> Schema {
        project_input()
    }
}

impl Generated for AnalysisResult {
    const NAME: &'static str = "AnalysisResult";

    fn schema() -> Schema {
        analysis_result()
    }
}

impl Generated for DesignResult {
    const NAME: &'static str = "DesignResult";

    fn schema() -> Schema {
        design_result()
    }
}

impl Generated for VisualResult {
    const NAME: &'static str = "VisualResult";

    fn schema() -> Schema {
        visual_result()
    }
}

pub fn project_input() -> Schema {
    Schema::object([
        ("projectName", Schema::string()),
        ("coreGoal", Schema::string()),
        ("targetAudience", Schema::string()),
        ("cycle", Schema::string()),
        ("coreMetaphor", Schema::string()),
        ("keyActions", Schema::string()),
        ("moodKeywords", Schema::string()),
        ("wildIdeas", Schema::string().describe("从想法中推断出的创意或具体实现细节")),
    ])
    .require(["projectName", "coreGoal", "coreMetaphor", "moodKeywords"])
}

pub fn analysis_result() -> Schema {
    let anchors = Schema::object([
        ("identity", Schema::string().describe("项目名称和潜在的标语/身份")),
        ("background", Schema::string().describe("时间背景和目标受众摘要")),
        ("coreNeed", Schema::string().describe("核心隐喻和基本元素")),
    ])
    .require(["identity", "background", "coreNeed"]);

    let risk = Schema::object([
        ("category", Schema::one_of(&LogicCategory::tags())),
        ("risk", Schema::string().describe("识别出的潜在逻辑缺陷 (中文)")),
        ("solution", Schema::string().describe("修复缺陷的架构方案 (中文)")),
    ])
    .require(["category", "risk", "solution"]);

    Schema::object([
        ("anchors", anchors),
        ("risks", Schema::array(risk)),
        ("rawAnalysis", Schema::string().describe("分析简述 (中文)")),
    ])
    .require(["anchors", "risks", "rawAnalysis"])
}

pub fn design_result() -> Schema {
    let dna = Schema::object([
        ("typography", Schema::string().describe("中文描述")),
        ("controls", Schema::string().describe("中文描述")),
        ("lighting", Schema::string().describe("中文描述")),
    ])
    .require(["typography", "controls", "lighting"]);

    let stage = Schema::object([
        ("stageNumber", Schema::integer()),
        ("stageName", Schema::string().describe("阶段名称 (中文)")),
        ("logic", Schema::string().describe("交互逻辑和状态处理 (中文)")),
        ("visuals", Schema::string().describe("视觉描述 (中文)")),
    ])
    .require(["stageNumber", "stageName", "logic", "visuals"]);

    Schema::object([("visualDNA", dna), ("stages", Schema::array(stage))])
        .require(["visualDNA", "stages"])
}

pub fn visual_result() -> Schema {
    let keyframe = Schema::object([
        ("stepName", Schema::string()),
        ("logicPurpose", Schema::string().describe("逻辑与目的描述")),
        ("nanoPrompt", Schema::string().describe("Nano Pro 风格的绘图提示词")),
    ])
    .require(["stepName", "logicPurpose", "nanoPrompt"]);

    Schema::object([("keyframes", Schema::array(keyframe))]).require(["keyframes"])
}
