use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::schema::Schema;

/// ========================================
/// Stage entities exchanged with the model
/// ========================================

/// Structured creative brief. Created empty or parsed from a free-text idea.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub project_name: String,
    pub core_goal: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub cycle: String,
    pub core_metaphor: String,
    #[serde(default)]
    pub key_actions: String,
    pub mood_keywords: String,
    #[serde(default)]
    pub wild_ideas: String,
}

/// Closed set of logic-risk dimensions. Any other tag fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicCategory {
    #[serde(rename = "Time-State")]
    TimeState,
    #[serde(rename = "Feedback Loop")]
    FeedbackLoop,
    #[serde(rename = "Navigation")]
    Navigation,
    #[serde(rename = "Redundancy")]
    Redundancy,
}

impl LogicCategory {
    pub const ALL: [LogicCategory; 4] = [
        LogicCategory::TimeState,
        LogicCategory::FeedbackLoop,
        LogicCategory::Navigation,
        LogicCategory::Redundancy,
    ];

    /// Wire tag, exactly as it appears in the schema enum.
    pub fn as_str(self) -> &'static str {
        match self {
            LogicCategory::TimeState => "Time-State",
            LogicCategory::FeedbackLoop => "Feedback Loop",
            LogicCategory::Navigation => "Navigation",
            LogicCategory::Redundancy => "Redundancy",
        }
    }

    /// Display label shown next to a risk.
    pub fn label(self) -> &'static str {
        match self {
            LogicCategory::TimeState => "时态逻辑",
            LogicCategory::FeedbackLoop => "反馈循环",
            LogicCategory::Navigation => "导航拓扑",
            LogicCategory::Redundancy => "冗余检查",
        }
    }

    pub fn tags() -> [&'static str; 4] {
        Self::ALL.map(LogicCategory::as_str)
    }
}

impl fmt::Display for LogicCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown logic risk category: {s:?}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicRisk {
    pub category: LogicCategory,
    pub risk: String,
    pub solution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchors {
    pub identity: String,
    pub background: String,
    pub core_need: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub anchors: Anchors,
    pub risks: Vec<LogicRisk>,
    pub raw_analysis: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignStage {
    pub stage_number: u32,
    pub stage_name: String,
    pub logic: String,
    pub visuals: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualDna {
    pub typography: String,
    pub controls: String,
    pub lighting: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignResult {
    #[serde(rename = "visualDNA")]
    pub visual_dna: VisualDna,
    pub stages: Vec<DesignStage>,
}

impl DesignResult {
    /// Replace the stage list with an edited copy, keeping the visual DNA.
    pub fn with_stages(mut self, stages: Vec<DesignStage>) -> Self {
        self.stages = stages;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualKeyframe {
    pub step_name: String,
    pub logic_purpose: String,
    pub nano_prompt: String,
}

/// One keyframe per design stage, matched by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualResult {
    pub keyframes: Vec<VisualKeyframe>,
}

/// ========================================
/// Request sent to a generation provider
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    ParseIdea,
    Analyze,
    Design,
    Refine,
    Visualize,
}

impl CallKind {
    /// Stable name used in logs and artifact file names.
    pub fn as_str(self) -> &'static str {
        match self {
            CallKind::ParseIdea => "parse_idea",
            CallKind::Analyze => "analyze",
            CallKind::Design => "design",
            CallKind::Refine => "refine",
            CallKind::Visualize => "visualize",
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub call: CallKind,
    pub system: String,
    pub user: String,
    pub schema: Schema,
    /// Reasoning-effort hint; scales with how creative the call is.
    pub thinking_budget: u32,
}
