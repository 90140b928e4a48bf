//! The wizard as an explicit finite-state machine.
//!
//! A transition runs in three parts so the busy step stays observable:
//! [`Workflow::begin`] commits the caller's value and enters the busy step,
//! [`Pending::run`] performs the single generation call on private copies,
//! and [`Workflow::complete`] installs the result or falls back to the
//! nearest editable step. While a step is busy every event is refused.

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::{GenerationError, WorkflowError};
use crate::prompt;
use crate::provider::GenerationClient;
use crate::wire::{AnalysisResult, CallKind, DesignResult, DesignStage, ProjectInput, VisualResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Step {
    #[default]
    Idea,
    ParsingIdea,
    Input,
    Analyzing,
    Adjustment,
    Designing,
    Refining,
    Result,
    Visualizing,
    VisualResult,
}

impl Step {
    /// A generation call is in flight.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            Step::ParsingIdea | Step::Analyzing | Step::Designing | Step::Refining | Step::Visualizing
        )
    }

    pub fn is_workspace(self) -> bool {
        !matches!(self, Step::Idea | Step::ParsingIdea)
    }

    /// Header shown while inside the workspace.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Step::Idea | Step::ParsingIdea => None,
            Step::Input => Some("STAGE 1: CONFIGURATION"),
            Step::Analyzing => Some("STAGE 2: ANALYSIS"),
            Step::Adjustment => Some("STAGE 2: REVIEW"),
            Step::Designing => Some("STAGE 3: GENERATION"),
            Step::Refining => Some("STAGE 3: REFINEMENT"),
            Step::Result => Some("STAGE 3: FINALIZATION"),
            Step::Visualizing => Some("STAGE 4: VISUALIZING"),
            Step::VisualResult => Some("STAGE 4: PROTOTYPING"),
        }
    }

    /// Title and subtitle for the progress indicator of a busy step.
    pub fn progress(self) -> Option<(&'static str, &'static str)> {
        match self {
            Step::ParsingIdea => Some(("正在构建工作区", "正在理解您的创意并初始化项目参数...")),
            Step::Analyzing => Some(("逻辑压力测试中", "正在分析业务死角与交互闭环...")),
            Step::Designing => Some(("生成交互脚本", "正在编排视觉 DNA 与用户旅程...")),
            Step::Refining => Some(("优化设计", "正在基于您的修改进行逻辑回检...")),
            Step::Visualizing => Some(("构建 Nano 视觉原型", "正在将交互逻辑转化为黑白极简指令...")),
            _ => None,
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Step::ParsingIdea => "无法解析创意，请尝试手动输入。",
            Step::Analyzing => "分析失败，请重试。",
            Step::Designing => "设计生成失败，请重试。",
            Step::Refining => "逻辑回检失败，请重试。",
            Step::Visualizing => "视觉脚本生成失败，请重试。",
            _ => "操作失败，请重试。",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SubmitIdea(String),
    Skip,
    SubmitProject(ProjectInput),
    ConfirmAnalysis(AnalysisResult),
    Refine(Vec<DesignStage>),
    GenerateVisuals(Vec<DesignStage>),
    Back,
    /// Discard everything. The caller asks the user before sending it.
    Reset,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::SubmitIdea(_) => "submit_idea",
            Event::Skip => "skip",
            Event::SubmitProject(_) => "submit_project",
            Event::ConfirmAnalysis(_) => "confirm_analysis",
            Event::Refine(_) => "refine",
            Event::GenerateVisuals(_) => "generate_visuals",
            Event::Back => "back",
            Event::Reset => "reset",
        }
    }
}

/// The error banner: one stage-specific message plus the underlying cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub step: Step,
    pub message: &'static str,
    pub cause: GenerationError,
}

impl Failure {
    pub fn is_fatal(&self) -> bool {
        self.cause.is_fatal()
    }
}

/// Owned snapshot handed to a checkpoint editor.
#[derive(Debug, Clone, PartialEq)]
pub enum Checkpoint {
    Project(ProjectInput),
    Analysis(AnalysisResult),
    Design(DesignResult),
    Visual(VisualResult),
}

#[derive(Debug, Clone)]
enum Job {
    ParseIdea { idea: String },
    Analyze { project: ProjectInput },
    Design { project: ProjectInput, analysis: AnalysisResult },
    Refine { project: ProjectInput, analysis: AnalysisResult, stages: Vec<DesignStage> },
    Visualize { project: ProjectInput, design: DesignResult },
}

/// A generation call that has been accepted but not yet performed.
#[derive(Debug, Clone)]
pub struct Pending {
    job: Job,
}

#[derive(Debug)]
pub enum Outcome {
    Parsed(Result<ProjectInput, GenerationError>),
    Analyzed(Result<AnalysisResult, GenerationError>),
    Designed(Result<DesignResult, GenerationError>),
    Refined(Result<DesignResult, GenerationError>),
    Visualized(Result<VisualResult, GenerationError>),
}

impl Outcome {
    fn name(&self) -> &'static str {
        match self {
            Outcome::Parsed(_) => "parsed",
            Outcome::Analyzed(_) => "analyzed",
            Outcome::Designed(_) => "designed",
            Outcome::Refined(_) => "refined",
            Outcome::Visualized(_) => "visualized",
        }
    }

    fn busy_step(&self) -> Step {
        match self {
            Outcome::Parsed(_) => Step::ParsingIdea,
            Outcome::Analyzed(_) => Step::Analyzing,
            Outcome::Designed(_) => Step::Designing,
            Outcome::Refined(_) => Step::Refining,
            Outcome::Visualized(_) => Step::Visualizing,
        }
    }
}

impl Pending {
    pub fn call(&self) -> CallKind {
        match &self.job {
            Job::ParseIdea { .. } => CallKind::ParseIdea,
            Job::Analyze { .. } => CallKind::Analyze,
            Job::Design { .. } => CallKind::Design,
            Job::Refine { .. } => CallKind::Refine,
            Job::Visualize { .. } => CallKind::Visualize,
        }
    }

    pub async fn run(self, client: &GenerationClient) -> Outcome {
        match self.job {
            Job::ParseIdea { idea } => {
                Outcome::Parsed(client.generate(&prompt::parse_idea(&idea)).await)
            }
            Job::Analyze { project } => {
                Outcome::Analyzed(client.generate(&prompt::analyze(&project)).await)
            }
            Job::Design { project, analysis } => {
                Outcome::Designed(client.generate(&prompt::design(&project, &analysis)).await)
            }
            Job::Refine { project, analysis, stages } => Outcome::Refined(
                client.generate(&prompt::refine(&project, &analysis, &stages)).await,
            ),
            Job::Visualize { project, design } => {
                let result = client
                    .generate::<VisualResult>(&prompt::visualize(&project, &design))
                    .await
                    .and_then(|visual| check_correspondence(&design, visual));
                Outcome::Visualized(result)
            }
        }
    }
}

/// Keyframes pair with stages by position, so the counts must agree.
fn check_correspondence(design: &DesignResult, visual: VisualResult) -> Result<VisualResult, GenerationError> {
    let expected = design.stages.len();
    let got = visual.keyframes.len();
    if expected != got {
        return Err(GenerationError::Decode(format!(
            "expected {expected} keyframes (one per design stage), got {got}"
        )));
    }
    Ok(visual)
}

/// Sole owner of the current step and of every accumulated entity.
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    step: Step,
    project: ProjectInput,
    analysis: Option<AnalysisResult>,
    design: Option<DesignResult>,
    visual: Option<VisualResult>,
    failure: Option<Failure>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn project(&self) -> &ProjectInput {
        &self.project
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn design(&self) -> Option<&DesignResult> {
        self.design.as_ref()
    }

    pub fn visual(&self) -> Option<&VisualResult> {
        self.visual.as_ref()
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn dismiss_failure(&mut self) {
        self.failure = None;
    }

    /// The entity an editor should show for the current step.
    pub fn checkpoint(&self) -> Option<Checkpoint> {
        match self.step {
            Step::Idea | Step::ParsingIdea => None,
            Step::Input | Step::Analyzing => Some(Checkpoint::Project(self.project.clone())),
            Step::Adjustment | Step::Designing => self.analysis.clone().map(Checkpoint::Analysis),
            Step::Result | Step::Refining | Step::Visualizing => {
                self.design.clone().map(Checkpoint::Design)
            }
            Step::VisualResult => self.visual.clone().map(Checkpoint::Visual),
        }
    }

    /// Accept an event. Generating events return the call to perform;
    /// the others take effect immediately and return `None`.
    pub fn begin(&mut self, event: Event) -> Result<Option<Pending>, WorkflowError> {
        if self.step.is_busy() {
            return Err(WorkflowError::Busy(self.step));
        }

        let job = match (self.step, event) {
            (Step::Idea, Event::SubmitIdea(idea)) => {
                if idea.trim().is_empty() {
                    return Err(WorkflowError::EmptyIdea);
                }
                self.enter(Step::ParsingIdea);
                Job::ParseIdea { idea }
            }
            (Step::Idea, Event::Skip) => {
                self.project = ProjectInput::default();
                self.failure = None;
                self.enter(Step::Input);
                return Ok(None);
            }
            (Step::Input | Step::Adjustment | Step::Result, Event::SubmitProject(project)) => {
                self.project = project.clone();
                self.enter(Step::Analyzing);
                Job::Analyze { project }
            }
            (Step::Adjustment, Event::ConfirmAnalysis(analysis)) => {
                self.analysis = Some(analysis.clone());
                self.enter(Step::Designing);
                Job::Design { project: self.project.clone(), analysis }
            }
            (Step::Result, Event::Refine(stages)) => {
                let analysis = self.analysis.clone().ok_or(WorkflowError::MissingData("analysis"))?;
                if self.design.is_none() {
                    return Err(WorkflowError::MissingData("design"));
                }
                self.enter(Step::Refining);
                Job::Refine { project: self.project.clone(), analysis, stages }
            }
            (Step::Result, Event::GenerateVisuals(stages)) => {
                let design = self
                    .design
                    .clone()
                    .ok_or(WorkflowError::MissingData("design"))?
                    .with_stages(stages);
                self.design = Some(design.clone());
                self.enter(Step::Visualizing);
                Job::Visualize { project: self.project.clone(), design }
            }
            (Step::VisualResult, Event::Back) => {
                self.enter(Step::Result);
                return Ok(None);
            }
            (step, Event::Reset) if step.is_workspace() => {
                info!(from = ?step, "workflow reset");
                *self = Workflow::default();
                return Ok(None);
            }
            (step, event) => {
                return Err(WorkflowError::InvalidTransition { step, event: event.name() });
            }
        };

        self.failure = None;
        Ok(Some(Pending { job }))
    }

    /// Install the result of a finished call, or record the failure and fall back.
    pub fn complete(&mut self, outcome: Outcome) -> Result<Step, WorkflowError> {
        let busy = self.step;
        if outcome.busy_step() != busy {
            return Err(WorkflowError::UnexpectedOutcome { step: busy, outcome: outcome.name() });
        }

        let next = match outcome {
            Outcome::Parsed(Ok(project)) => {
                self.project = project;
                Step::Input
            }
            Outcome::Parsed(Err(e)) => self.fail(e, Step::Input),
            Outcome::Analyzed(Ok(analysis)) => {
                self.analysis = Some(analysis);
                Step::Adjustment
            }
            Outcome::Analyzed(Err(e)) => self.fail(e, Step::Input),
            Outcome::Designed(Ok(design)) | Outcome::Refined(Ok(design)) => {
                self.design = Some(design);
                Step::Result
            }
            Outcome::Designed(Err(e)) => self.fail(e, Step::Adjustment),
            Outcome::Refined(Err(e)) => self.fail(e, Step::Result),
            Outcome::Visualized(Ok(visual)) => {
                self.visual = Some(visual);
                Step::VisualResult
            }
            Outcome::Visualized(Err(e)) => self.fail(e, Step::Result),
        };

        self.enter(next);
        Ok(next)
    }

    /// `begin`, `run` and `complete` in one go.
    pub async fn dispatch(&mut self, event: Event, client: &GenerationClient) -> Result<Step, WorkflowError> {
        match self.begin(event)? {
            Some(pending) => {
                let outcome = pending.run(client).await;
                self.complete(outcome)
            }
            None => Ok(self.step),
        }
    }

    fn fail(&mut self, cause: GenerationError, fallback: Step) -> Step {
        let message = self.step.failure_message();
        warn!(step = ?self.step, ?fallback, error = %cause, "{message}");
        self.failure = Some(Failure { step: self.step, message, cause });
        fallback
    }

    fn enter(&mut self, next: Step) {
        info!(from = ?self.step, to = ?next, "transition");
        self.step = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::scripted::ScriptedProvider;
    use crate::wire::{Anchors, LogicCategory, LogicRisk, VisualDna, VisualKeyframe};

    fn project(name: &str) -> ProjectInput {
        ProjectInput {
            project_name: name.into(),
            core_goal: "goal".into(),
            core_metaphor: "metaphor".into(),
            mood_keywords: "mood".into(),
            ..ProjectInput::default()
        }
    }

    fn analysis(identity: &str) -> AnalysisResult {
        AnalysisResult {
            anchors: Anchors { identity: identity.into(), background: "b".into(), core_need: "c".into() },
            risks: vec![LogicRisk {
                category: LogicCategory::FeedbackLoop,
                risk: "no ack".into(),
                solution: "toast".into(),
            }],
            raw_analysis: "raw".into(),
        }
    }

    fn stages(n: u32) -> Vec<DesignStage> {
        (0..n)
            .map(|i| DesignStage {
                stage_number: i,
                stage_name: format!("stage {i}"),
                logic: format!("logic {i}"),
                visuals: format!("visuals {i}"),
            })
            .collect()
    }

    fn design(n: u32) -> DesignResult {
        DesignResult {
            visual_dna: VisualDna { typography: "t".into(), controls: "c".into(), lighting: "l".into() },
            stages: stages(n),
        }
    }

    fn visual(n: usize) -> VisualResult {
        VisualResult {
            keyframes: (0..n)
                .map(|i| VisualKeyframe {
                    step_name: format!("frame {i}"),
                    logic_purpose: "p".into(),
                    nano_prompt: "黑白简单的元素".into(),
                })
                .collect(),
        }
    }

    fn client() -> (ScriptedProvider, GenerationClient) {
        let script = ScriptedProvider::new();
        let client = GenerationClient::new(Box::new(script.clone()));
        (script, client)
    }

    /// Drive a fresh workflow to Result with 8 stages.
    async fn at_result(script: &ScriptedProvider, client: &GenerationClient) -> Workflow {
        let mut wf = Workflow::new();
        wf.dispatch(Event::Skip, client).await.unwrap();
        script.push_json(&analysis("first"));
        wf.dispatch(Event::SubmitProject(project("P")), client).await.unwrap();
        script.push_json(&design(8));
        wf.dispatch(Event::ConfirmAnalysis(analysis("first")), client).await.unwrap();
        assert_eq!(wf.step(), Step::Result);
        wf
    }

    #[test]
    fn step_classification() {
        assert!(!Step::Idea.is_workspace());
        assert!(!Step::ParsingIdea.is_workspace());
        assert!(Step::Input.is_workspace());
        assert!(Step::Refining.is_busy() && Step::Visualizing.is_busy());
        assert!(!Step::Result.is_busy());
        for s in [Step::ParsingIdea, Step::Analyzing, Step::Designing, Step::Refining, Step::Visualizing] {
            assert!(s.progress().is_some(), "{s:?}");
        }
        assert_eq!(Step::Adjustment.label(), Some("STAGE 2: REVIEW"));
        assert_eq!(Step::Idea.label(), None);
    }

    #[test]
    fn skip_lands_in_input_with_an_empty_form() {
        let mut wf = Workflow::new();
        assert!(wf.begin(Event::Skip).unwrap().is_none());
        assert_eq!(wf.step(), Step::Input);
        assert_eq!(wf.project(), &ProjectInput::default());
        assert_eq!(wf.checkpoint(), Some(Checkpoint::Project(ProjectInput::default())));
    }

    #[test]
    fn blank_idea_is_refused_without_moving() {
        let mut wf = Workflow::new();
        assert_eq!(wf.begin(Event::SubmitIdea("   ".into())).unwrap_err(), WorkflowError::EmptyIdea);
        assert_eq!(wf.step(), Step::Idea);
    }

    #[test]
    fn busy_step_refuses_every_event() {
        let mut wf = Workflow::new();
        let pending = wf.begin(Event::SubmitIdea("idea".into())).unwrap();
        assert!(pending.is_some());
        assert_eq!(wf.step(), Step::ParsingIdea);

        for event in [
            Event::SubmitIdea("again".into()),
            Event::Skip,
            Event::SubmitProject(project("X")),
            Event::Reset,
            Event::Back,
        ] {
            assert_eq!(wf.begin(event).unwrap_err(), WorkflowError::Busy(Step::ParsingIdea));
        }
    }

    #[test]
    fn events_outside_the_table_are_rejected() {
        let mut wf = Workflow::new();
        let err = wf.begin(Event::Back).unwrap_err();
        assert_eq!(err, WorkflowError::InvalidTransition { step: Step::Idea, event: "back" });
        assert!(matches!(wf.begin(Event::Reset), Err(WorkflowError::InvalidTransition { .. })));

        wf.begin(Event::Skip).unwrap();
        assert!(matches!(
            wf.begin(Event::ConfirmAnalysis(analysis("a"))),
            Err(WorkflowError::InvalidTransition { step: Step::Input, .. })
        ));
        assert!(matches!(wf.begin(Event::Refine(stages(1))), Err(WorkflowError::InvalidTransition { .. })));
    }

    #[test]
    fn outcome_for_another_step_is_rejected() {
        let mut wf = Workflow::new();
        wf.begin(Event::SubmitIdea("idea".into())).unwrap();
        let err = wf.complete(Outcome::Designed(Ok(design(1)))).unwrap_err();
        assert_eq!(err, WorkflowError::UnexpectedOutcome { step: Step::ParsingIdea, outcome: "designed" });
        assert_eq!(wf.step(), Step::ParsingIdea);
    }

    #[tokio::test]
    async fn idea_failure_keeps_the_prior_form_and_raises_the_banner() {
        let (script, client) = client();
        script.push_error(GenerationError::Transport("down".into()));
        let mut wf = Workflow::new();

        let step = wf.dispatch(Event::SubmitIdea("an idea".into()), &client).await.unwrap();

        assert_eq!(step, Step::Input);
        assert_eq!(wf.project(), &ProjectInput::default());
        let failure = wf.failure().unwrap();
        assert_eq!(failure.step, Step::ParsingIdea);
        assert_eq!(failure.message, "无法解析创意，请尝试手动输入。");
        assert!(!failure.is_fatal());

        wf.dismiss_failure();
        assert!(wf.failure().is_none());
    }

    #[tokio::test]
    async fn analysis_failure_returns_to_input_with_submitted_form() {
        let (script, client) = client();
        let mut wf = Workflow::new();
        wf.dispatch(Event::Skip, &client).await.unwrap();
        script.push_reply("not json at all");

        let step = wf.dispatch(Event::SubmitProject(project("Mine")), &client).await.unwrap();

        assert_eq!(step, Step::Input);
        assert_eq!(wf.project().project_name, "Mine");
        assert!(wf.analysis().is_none());
        assert!(matches!(wf.failure().unwrap().cause, GenerationError::Decode(_)));
    }

    #[tokio::test]
    async fn revised_brief_is_reanalyzed_from_review_and_result() {
        let (script, client) = client();
        let mut wf = Workflow::new();
        wf.dispatch(Event::Skip, &client).await.unwrap();
        script.push_json(&analysis("first"));
        wf.dispatch(Event::SubmitProject(project("P")), &client).await.unwrap();
        assert_eq!(wf.step(), Step::Adjustment);

        script.push_json(&analysis("second"));
        let step = wf.dispatch(Event::SubmitProject(project("P2")), &client).await.unwrap();
        assert_eq!(step, Step::Adjustment);
        assert_eq!(wf.project().project_name, "P2");
        assert_eq!(wf.analysis().unwrap().anchors.identity, "second");

        let mut wf = at_result(&script, &client).await;
        let analysis_before = wf.analysis().cloned();
        let design_before = wf.design().cloned();
        script.push_error(GenerationError::Transport("down".into()));
        let step = wf.dispatch(Event::SubmitProject(project("Q")), &client).await.unwrap();

        assert_eq!(step, Step::Input);
        assert_eq!(wf.project().project_name, "Q");
        assert_eq!(wf.analysis().cloned(), analysis_before);
        assert_eq!(wf.design().cloned(), design_before);
        assert_eq!(wf.failure().unwrap().message, "分析失败，请重试。");
    }

    #[test]
    fn brief_cannot_be_resubmitted_from_the_visual_board() {
        let mut wf = Workflow { step: Step::VisualResult, ..Workflow::default() };
        assert!(matches!(
            wf.begin(Event::SubmitProject(project("X"))),
            Err(WorkflowError::InvalidTransition { step: Step::VisualResult, event: "submit_project" })
        ));
    }

    #[tokio::test]
    async fn design_failure_keeps_the_confirmed_analysis() {
        let (script, client) = client();
        let mut wf = Workflow::new();
        wf.dispatch(Event::Skip, &client).await.unwrap();
        script.push_json(&analysis("generated"));
        wf.dispatch(Event::SubmitProject(project("P")), &client).await.unwrap();
        assert_eq!(wf.step(), Step::Adjustment);

        script.push_error(GenerationError::EmptyResponse("scripted".into()));
        let step = wf.dispatch(Event::ConfirmAnalysis(analysis("edited")), &client).await.unwrap();

        assert_eq!(step, Step::Adjustment);
        assert_eq!(wf.analysis().unwrap().anchors.identity, "edited");
        assert!(wf.design().is_none());
        assert_eq!(wf.failure().unwrap().message, "设计生成失败，请重试。");
    }

    #[tokio::test]
    async fn refine_failure_leaves_the_design_untouched() {
        let (script, client) = client();
        let mut wf = at_result(&script, &client).await;
        let before = wf.design().cloned();

        let mut edited = stages(8);
        edited[3].logic = "user edit".into();
        script.push_error(GenerationError::Transport("reset by peer".into()));
        let step = wf.dispatch(Event::Refine(edited), &client).await.unwrap();

        assert_eq!(step, Step::Result);
        assert_eq!(wf.design().cloned(), before);
        assert_eq!(wf.failure().unwrap().step, Step::Refining);
    }

    #[tokio::test]
    async fn refine_success_replaces_the_design_wholesale() {
        let (script, client) = client();
        let mut wf = at_result(&script, &client).await;

        let refined = design(5);
        script.push_json(&refined);
        let step = wf.dispatch(Event::Refine(stages(8)), &client).await.unwrap();

        assert_eq!(step, Step::Result);
        assert_eq!(wf.design(), Some(&refined));
        let last = script.requests().pop().unwrap();
        assert_eq!(last.call, CallKind::Refine);
    }

    #[tokio::test]
    async fn visualize_rejects_a_keyframe_count_mismatch() {
        let (script, client) = client();
        let mut wf = at_result(&script, &client).await;

        script.push_json(&visual(7));
        let step = wf.dispatch(Event::GenerateVisuals(stages(8)), &client).await.unwrap();

        assert_eq!(step, Step::Result);
        assert!(wf.visual().is_none());
        match &wf.failure().unwrap().cause {
            GenerationError::Decode(msg) => assert!(msg.contains("expected 8 keyframes")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn back_and_reset() {
        let (script, client) = client();
        let mut wf = at_result(&script, &client).await;
        script.push_json(&visual(8));
        wf.dispatch(Event::GenerateVisuals(stages(8)), &client).await.unwrap();
        assert_eq!(wf.step(), Step::VisualResult);
        assert!(matches!(wf.checkpoint(), Some(Checkpoint::Visual(_))));

        assert_eq!(wf.dispatch(Event::Back, &client).await.unwrap(), Step::Result);
        assert!(wf.visual().is_some());
        assert!(matches!(wf.checkpoint(), Some(Checkpoint::Design(_))));

        assert_eq!(wf.dispatch(Event::Reset, &client).await.unwrap(), Step::Idea);
        assert!(wf.analysis().is_none() && wf.design().is_none() && wf.visual().is_none());
        assert_eq!(wf.project(), &ProjectInput::default());
        assert_eq!(wf.checkpoint(), None);
    }

    #[tokio::test]
    async fn configuration_failure_is_fatal() {
        let (script, client) = client();
        script.push_error(GenerationError::Configuration("API_KEY env var is not set".into()));
        let mut wf = Workflow::new();
        wf.dispatch(Event::SubmitIdea("idea".into()), &client).await.unwrap();
        assert!(wf.failure().unwrap().is_fatal());
    }
}
