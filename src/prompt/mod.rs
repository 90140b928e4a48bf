use crate::wire::{AnalysisResult, CallKind, DesignResult, DesignStage, LogicRisk, ProjectInput};

pub const IDEA_BUDGET: u32 = 1024;
pub const ANALYSIS_BUDGET: u32 = 2048;
pub const DESIGN_BUDGET: u32 = 4096;

/// Rendered instruction pair for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub call: CallKind,
    pub system: String,
    pub user: String,
    pub thinking_budget: u32,
}

fn creative_director() -> &'static str {
r#"你是一位专家创意总监。
将用户给出的粗略项目想法转化为结构化的创意简报 (中文)。
根据上下文创造性地推断缺失的细节。"#
}

fn analyst() -> &'static str {
r#"你是一位高级产品经理和逻辑架构师。
你的目标是分析“创意输入表”，提取“需求锚点”并执行“逻辑压力测试”。

**阶段 0：锚点提取**
提取：
- 项目身份（名称、Slogan 概念）
- 场景语境（时间、人群）
- 核心需求（隐喻、元素）

**阶段 2：逻辑压力测试（关键）**
针对这 4 个维度分析用户的想法，并提供具体的中文解决方案：
1. 时态逻辑（活动前 vs 活动中的差异）。 分类标记: Time-State
2. 反馈循环（系统是否确认用户操作？）。 分类标记: Feedback Loop
3. 导航拓扑（是否有死胡同？）。 分类标记: Navigation
4. 冗余检查（信息是否不必要地重复？）。 分类标记: Redundancy"#
}

fn designer() -> &'static str {
r#"你是一位精通 UI/UX 的专家交互视觉设计师。
你的角色是接收“需求锚点”和“逻辑风险”，并输出“全链路用户流程”和“视觉设计规范”。

**工作流阶段 1：视觉 DNA 解码**
基于核心隐喻和情绪，定义：
1. 排版与布局规则。
2. 控件与材质风格（按钮、容器）。
3. 灯光与氛围逻辑。

**工作流阶段 2：全链路映射**
将请求映射到这 8 个阶段：
Stage 0: 氛围加载 (Atmosphere Loading)
Stage 1: 智能入口 (Smart Entrance - 逻辑: 时间感知)
Stage 2: 新手引导 (Onboarding)
Stage 3: 核心选择 (Core Selection)
Stage 4: 数据输入 (Data Input)
Stage 5: 有效反馈 (Effective Feedback - 处理状态)
Stage 6: 结果揭晓 (The Reveal)
Stage 7: 循环与分享 (Loop & Share - 逻辑: 无死角)

每一阶段都需要提供具体的**交互逻辑**和**视觉呈现**文案，无需生成代码或Prompt。"#
}

fn nano_pro() -> &'static str {
r#"Role: Nano Pro 极简交互原型专家 (Minimalist Interaction Prototype Expert)
Profile: 你是一位擅长将复杂交互转化为清晰、具象、带注释的黑白线稿的视觉专家。你拒绝过度抽象，也拒绝过度真实。你追求的是 “功能显性化（Functional Explicit）”。你生成的画面不仅是界面截图，更是一张交互说明书——通过视觉符号（箭头、手势、高亮）明确标记出用户操作的逻辑与目的。

Constraint & Rules (核心思考模型):
1. 具象但简化 (Concrete but Simplified)：
   - 允许具象：描述具体的物体（如“扭蛋机”、“手”），让用户一眼认出。
   - 拒绝真实：严禁照片级质感。所有物体必须为 矢量线条（Vector Lines） 或 扁平色块（Flat Shapes）。
   - 强制元素：每一个 Prompt 必须明确包含“黑白简单的元素”和“黑白灰的对比图”这两个关键词，确保视觉语言的统一性。
2. 黑白灰层级美学 (Greyscale Hierarchy)：
   - 色彩约束：仅限 纯黑、纯白、中性灰。
   - 对比原则：核心主体 = 纯黑实心。背景/次要 = 灰色细线。
3. 交互逻辑显性化 (Visualize the Logic)：
   - 必须标记目的：每一张图都必须通过视觉元素解释“我在做什么”。
   - 视觉辅助符号：手势、路径虚线、状态反色。

Output Requirement:
你需要输出 JSON 格式。交互方案中的每一个阶段对应一个 keyframe（通常为 8 个），顺序与阶段顺序一致，不得合并或遗漏。
每个 keyframe 包含：
- stepName: 步骤名称
- logicPurpose: 逻辑与目的的描述（中文）
- nanoPrompt: 符合 Nano Pro 风格的绘画提示词（中文为主，包含特定关键词）"#
}

/// Every risk with its category, the flaw and the fix, one per line.
fn risk_lines(risks: &[LogicRisk]) -> String {
    if risks.is_empty() {
        return "(无)".to_string();
    }
    risks
        .iter()
        .map(|r| format!("- {} ({}): 风险: {} | 方案: {}", r.category, r.category.label(), r.risk, r.solution))
        .collect::<Vec<_>>()
        .join("\n")
}

fn stages_json(stages: &[DesignStage]) -> String {
    serde_json::to_string_pretty(stages).unwrap_or_else(|_| "<stages-json-unavailable>".to_string())
}

pub fn parse_idea(idea: &str) -> Prompt {
    let user = format!(
"用户想法: \"{idea}\"

要求:
- 推断一个朗朗上口的 \"projectName\" (项目名称)。
- 确定 \"coreMetaphor\" (核心隐喻，对视觉设计至关重要)。
- 提取 \"moodKeywords\" (情绪关键词)。
- 如果缺少细节，请根据现代交互式 Web 体验的标准，产生合理且高质量的默认值。",
        idea = idea.trim()
    );
    Prompt {
        call: CallKind::ParseIdea,
        system: creative_director().to_string(),
        user,
        thinking_budget: IDEA_BUDGET,
    }
}

pub fn analyze(input: &ProjectInput) -> Prompt {
    let user = format!(
"分析此项目输入 (请用中文输出分析结果):
项目: {name}
目标: {goal}
受众: {audience}
周期: {cycle}
隐喻: {metaphor}
动作: {actions}
情绪: {mood}
狂野想法: {wild}",
        name = input.project_name,
        goal = input.core_goal,
        audience = input.target_audience,
        cycle = input.cycle,
        metaphor = input.core_metaphor,
        actions = input.key_actions,
        mood = input.mood_keywords,
        wild = input.wild_ideas,
    );
    Prompt {
        call: CallKind::Analyze,
        system: analyst().to_string(),
        user,
        thinking_budget: ANALYSIS_BUDGET,
    }
}

pub fn design(input: &ProjectInput, analysis: &AnalysisResult) -> Prompt {
    let user = format!(
"基于这些已批准的锚点生成高保真设计规范 (全中文输出):

[语境]
项目: {name}
隐喻: {metaphor}
情绪: {mood}

[锚点]
身份: {identity}
背景: {background}
核心需求: {need}

[逻辑风险与解决方案 (必须在流程中实现)]
{risks}",
        name = input.project_name,
        metaphor = input.core_metaphor,
        mood = input.mood_keywords,
        identity = analysis.anchors.identity,
        background = analysis.anchors.background,
        need = analysis.anchors.core_need,
        risks = risk_lines(&analysis.risks),
    );
    Prompt {
        call: CallKind::Design,
        system: designer().to_string(),
        user,
        thinking_budget: DESIGN_BUDGET,
    }
}

/// Re-review a user-edited stage list. Shares the designer persona.
pub fn refine(input: &ProjectInput, analysis: &AnalysisResult, stages: &[DesignStage]) -> Prompt {
    let user = format!(
"用户已经手动修改了设计流程的草稿。
请作为一位资深的逻辑架构师，重新审查用户修改后的流程。

[任务]
1. 尊重用户的修改意图（不要随意覆盖用户的创意）。
2. 执行“逻辑回检”：检查修改后的流程是否引入了新的逻辑漏洞（基于原始的风险分析）。
3. 润色文案：使交互逻辑更严密，视觉描述更具画面感。
4. 重新生成完整的 DesignResult 对象，保持阶段数量与编号不变。

[原始语境]
项目: {name}
核心隐喻: {metaphor}

[原始风险清单]
{risks}

[用户修改后的流程草稿]
{stages}",
        name = input.project_name,
        metaphor = input.core_metaphor,
        risks = risk_lines(&analysis.risks),
        stages = stages_json(stages),
    );
    Prompt {
        call: CallKind::Refine,
        system: designer().to_string(),
        user,
        thinking_budget: DESIGN_BUDGET,
    }
}

pub fn visualize(input: &ProjectInput, design: &DesignResult) -> Prompt {
    let count = design.stages.len();
    let user = format!(
"请接收我的【交互方案】，并将其转化为 {count} 段 Nano Pro 极简黑白交互原型视觉指令。

[项目背景]
项目名称: {name}
核心隐喻: {metaphor}

[交互方案 (由交互设计师提供)]
{stages}

[任务]
1. 为这 {count} 个阶段逐一生成对应的 Nano Pro Prompt，keyframes 数量必须恰好为 {count}，顺序与阶段一致。
2. 严格遵循 System Prompt 中的“黑白灰层级美学”和“交互逻辑显性化”规则。
3. 确保输出为 JSON 格式。",
        count = count,
        name = input.project_name,
        metaphor = input.core_metaphor,
        stages = stages_json(&design.stages),
    );
    Prompt {
        call: CallKind::Visualize,
        system: nano_pro().to_string(),
        user,
        thinking_budget: DESIGN_BUDGET,
    }
}
