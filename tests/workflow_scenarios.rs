use serde_json::{json, Value};

use design_architect::log;
use design_architect::provider::scripted::ScriptedProvider;
use design_architect::wire::{CallKind, DesignStage, ProjectInput};
use design_architect::{Checkpoint, Event, GenerationClient, GenerationError, Step, Workflow};

fn client() -> (ScriptedProvider, GenerationClient) {
    let script = ScriptedProvider::new();
    let client = GenerationClient::new(Box::new(script.clone()));
    (script, client)
}

fn analysis_json() -> Value {
    json!({
        "anchors": { "identity": "夜班骑手", "background": "雨夜街头", "coreNeed": "准时送达" },
        "risks": [
            { "category": "Time-State", "risk": "订单超时后状态未定义", "solution": "增加超时态" },
            { "category": "Feedback Loop", "risk": "接单无确认", "solution": "震动反馈" },
            { "category": "Navigation", "risk": "无法返回地图", "solution": "常驻返回" },
            { "category": "Redundancy", "risk": "重复的筛选入口", "solution": "合并" }
        ],
        "rawAnalysis": "整体风险可控"
    })
}

fn design_json(n: u32) -> Value {
    let stages: Vec<Value> = (1..=n)
        .map(|i| {
            json!({
                "stageNumber": i,
                "stageName": format!("阶段 {i}"),
                "logic": format!("逻辑 {i}"),
                "visuals": format!("视觉 {i}")
            })
        })
        .collect();
    json!({
        "visualDNA": { "typography": "等宽", "controls": "硬边", "lighting": "霓虹" },
        "stages": stages
    })
}

fn visual_json(n: usize) -> Value {
    let keyframes: Vec<Value> = (1..=n)
        .map(|i| {
            json!({
                "stepName": format!("帧 {i}"),
                "logicPurpose": "展示状态",
                "nanoPrompt": "黑白简单的元素, 极简线框"
            })
        })
        .collect();
    json!({ "keyframes": keyframes })
}

/// Walk from the idea screen to Result with an 8-stage design.
async fn to_result(script: &ScriptedProvider, client: &GenerationClient) -> Workflow {
    let mut wf = Workflow::new();
    script.push_json(&json!({
        "projectName": "霓虹快递",
        "coreGoal": "雨夜准时送达",
        "coreMetaphor": "赛博朋克快递",
        "moodKeywords": "霓虹, 潮湿"
    }));
    wf.dispatch(Event::SubmitIdea("赛博朋克风格的外卖应用".into()), client).await.unwrap();
    let project = wf.project().clone();

    script.push_json(&analysis_json());
    wf.dispatch(Event::SubmitProject(project), client).await.unwrap();
    let analysis = wf.analysis().cloned().unwrap();

    script.push_json(&design_json(8));
    wf.dispatch(Event::ConfirmAnalysis(analysis), client).await.unwrap();
    assert_eq!(wf.step(), Step::Result);
    wf
}

#[tokio::test]
async fn idea_is_parsed_into_a_filled_form() {
    let (script, client) = client();
    let mut wf = Workflow::new();
    script.push_reply(
        "好的，这是结果：\n{\"projectName\": \"霓虹快递\", \"coreGoal\": \"送达\", \
         \"coreMetaphor\": \"赛博朋克快递\", \"moodKeywords\": \"霓虹\"}\n祝顺利",
    );

    let step = wf.dispatch(Event::SubmitIdea("赛博朋克风格的外卖应用".into()), &client).await.unwrap();

    assert_eq!(step, Step::Input);
    assert!(!wf.project().project_name.is_empty());
    assert!(!wf.project().core_metaphor.is_empty());
    assert_eq!(wf.project().target_audience, "");

    let req = &script.requests()[0];
    assert_eq!(req.call, CallKind::ParseIdea);
    assert!(req.user.contains("赛博朋克风格的外卖应用"));
}

#[tokio::test]
async fn sparse_form_is_still_sent_for_analysis() {
    let (script, client) = client();
    let mut wf = Workflow::new();
    wf.dispatch(Event::Skip, &client).await.unwrap();

    let sparse = ProjectInput { project_name: "X".into(), ..ProjectInput::default() };
    script.push_json(&analysis_json());
    let step = wf.dispatch(Event::SubmitProject(sparse.clone()), &client).await.unwrap();

    let req = script.requests().pop().unwrap();
    assert_eq!(req.call, CallKind::Analyze);
    assert!(req.user.contains("项目: X"));
    match step {
        Step::Adjustment => assert_eq!(wf.analysis().unwrap().risks.len(), 4),
        Step::Input => {
            assert!(wf.failure().is_some());
            assert_eq!(wf.project(), &sparse);
        }
        other => panic!("unexpected step {other:?}"),
    }
}

#[tokio::test]
async fn eight_stages_produce_eight_keyframes() {
    let (script, client) = client();
    let mut wf = to_result(&script, &client).await;
    let stages = wf.design().unwrap().stages.clone();
    assert_eq!(stages.len(), 8);

    script.push_json(&visual_json(8));
    let step = wf.dispatch(Event::GenerateVisuals(stages), &client).await.unwrap();

    assert_eq!(step, Step::VisualResult);
    let visual = wf.visual().unwrap();
    assert_eq!(visual.keyframes.len(), 8);
    assert!(visual.keyframes.iter().all(|k| k.nano_prompt.contains("黑白简单的元素")));
    assert!(script.requests().last().unwrap().user.contains("恰好为 8"));
}

#[tokio::test]
async fn short_keyframe_list_fails_back_to_result() {
    let (script, client) = client();
    let mut wf = to_result(&script, &client).await;
    let design = wf.design().cloned().unwrap();

    script.push_json(&visual_json(7));
    let step = wf.dispatch(Event::GenerateVisuals(design.stages.clone()), &client).await.unwrap();

    assert_eq!(step, Step::Result);
    assert!(wf.visual().is_none());
    assert!(matches!(wf.failure().unwrap().cause, GenerationError::Decode(_)));
    assert_eq!(wf.design(), Some(&design));
}

#[tokio::test]
async fn unchanged_refine_with_a_deterministic_model_keeps_the_design() {
    let (script, client) = client();
    let mut wf = to_result(&script, &client).await;
    let before = wf.design().cloned().unwrap();
    let stages = before.stages.clone();

    script.push_json(&before);
    wf.dispatch(Event::Refine(stages.clone()), &client).await.unwrap();
    assert_eq!(wf.design(), Some(&before));

    script.push_json(&before);
    wf.dispatch(Event::Refine(stages), &client).await.unwrap();
    let after = wf.design().unwrap();
    assert_eq!(after, &before);
    assert_eq!(after.visual_dna.lighting, "霓虹");
    for (stage, i) in after.stages.iter().zip(1..=8u32) {
        assert_eq!(stage.stage_number, i);
        assert_eq!(stage.stage_name, format!("阶段 {i}"));
    }

    let reqs = script.requests();
    let (a, b) = (&reqs[reqs.len() - 2], &reqs[reqs.len() - 1]);
    assert_eq!(a.call, CallKind::Refine);
    assert_eq!(a.user, b.user);
    assert_eq!(a.system, b.system);
}

#[tokio::test]
async fn edited_stages_reach_the_visual_call_and_the_stored_design() {
    let (script, client) = client();
    let mut wf = to_result(&script, &client).await;
    let original = wf.design().cloned().unwrap();

    let mut edited: Vec<DesignStage> = original.stages.clone();
    edited[2].logic = "手动改写的逻辑".into();

    script.push_json(&visual_json(8));
    wf.dispatch(Event::GenerateVisuals(edited.clone()), &client).await.unwrap();

    let req = script.requests().pop().unwrap();
    assert_eq!(req.call, CallKind::Visualize);
    assert!(req.user.contains("手动改写的逻辑"));
    let stored = wf.design().unwrap();
    assert_eq!(stored.stages, edited);
    assert_eq!(stored.visual_dna, original.visual_dna);
}

#[tokio::test]
async fn every_failed_call_keeps_what_was_already_there() {
    let (script, client) = client();
    let mut wf = to_result(&script, &client).await;
    let project = wf.project().clone();
    let analysis = wf.analysis().cloned();
    let design = wf.design().cloned();

    script.push_reply("not json at all");
    assert_eq!(wf.dispatch(Event::Refine(design.clone().unwrap().stages), &client).await.unwrap(), Step::Result);
    script.push_error(GenerationError::Transport("503".into()));
    assert_eq!(
        wf.dispatch(Event::GenerateVisuals(design.clone().unwrap().stages), &client).await.unwrap(),
        Step::Result
    );

    assert_eq!(wf.project(), &project);
    assert_eq!(wf.analysis().cloned(), analysis);
    assert_eq!(wf.design().cloned(), design);
    assert!(wf.visual().is_none());
    assert!(wf.failure().is_some());
}

#[tokio::test]
async fn blank_reply_is_an_empty_response() {
    let (script, client) = client();
    let mut wf = Workflow::new();
    script.push_reply("   ");

    let step = wf.dispatch(Event::SubmitIdea("idea".into()), &client).await.unwrap();

    assert_eq!(step, Step::Input);
    assert_eq!(wf.failure().unwrap().cause, GenerationError::EmptyResponse("scripted".into()));
    assert_eq!(wf.project(), &ProjectInput::default());
}

#[tokio::test]
async fn checkpoints_are_written_under_the_run_directory() {
    let (script, client) = client();
    let root = tempfile::tempdir().unwrap();
    let run = log::start_run(root.path(), client.provider_name(), "scripted-model").unwrap();

    let wf = to_result(&script, &client).await;
    let Some(checkpoint @ Checkpoint::Design(_)) = wf.checkpoint() else {
        panic!("expected a design checkpoint");
    };
    let path = log::save_checkpoint(&run, &checkpoint).unwrap();

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(saved["stages"].as_array().unwrap().len(), 8);
    assert!(saved.get("visualDNA").is_some());
}
