//! Tests for the retrying agent on a scripted gateway.

use dcore::{
    AgentSpec, ModelError, Role, Tool, ToolChoice,
    model::{FinishReason, ScriptedModel},
};
use delegate_runtime::{Agent, AgentError, RegistryError, ToolRegistry};
use std::time::Duration;
use tokio::time::Instant;

fn spec() -> AgentSpec {
    AgentSpec::new("Test Agent")
        .model("test/model")
        .system_prompt("You are a test.")
}

fn agent(model: &ScriptedModel) -> Agent<ScriptedModel> {
    Agent::new(spec(), model.clone(), &ToolRegistry::new()).unwrap()
}

fn echo_toolbox() -> ToolRegistry {
    let mut toolbox = ToolRegistry::new();
    toolbox
        .register(
            Tool {
                name: "echo".into(),
                description: "Echoes the arguments".into(),
                parameters: schemars::schema_for!(String),
                strict: false,
            },
            |args| async move { Ok(format!("echoed {args}")) },
        )
        .unwrap();
    toolbox
}

#[tokio::test(start_paused = true)]
async fn transient_failures_exhaust_with_doubling_delays() {
    let model = ScriptedModel::new().always_fail(ModelError::Transport("reset".into()));
    let start = Instant::now();

    let err = agent(&model).run_with_attempts("hi", 4).await.unwrap_err();

    assert!(matches!(err, AgentError::Exhausted { attempts: 4, .. }));
    assert_eq!(err.model_error(), &ModelError::Transport("reset".into()));
    assert_eq!(model.requests().len(), 4);
    // 1s + 2s + 4s between the four attempts.
    assert_eq!(start.elapsed(), Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn default_run_makes_three_attempts() {
    let model = ScriptedModel::new().always_fail(ModelError::Malformed("garbage".into()));
    let start = Instant::now();

    let err = agent(&model).run("hi").await.unwrap_err();

    assert_eq!(err.attempts(), 3);
    assert_eq!(model.requests().len(), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert_eq!(
        err.to_string(),
        "agent 'Test Agent' failed after 3 attempts: malformed response: garbage"
    );
}

#[tokio::test(start_paused = true)]
async fn rejected_requests_are_not_retried() {
    let model = ScriptedModel::new().always_fail(ModelError::Provider {
        status: 401,
        message: "bad key".into(),
    });
    let start = Instant::now();

    let err = agent(&model).run("hi").await.unwrap_err();

    assert!(matches!(err, AgentError::Rejected { attempts: 1, .. }));
    assert_eq!(model.requests().len(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn each_attempt_starts_a_fresh_conversation() {
    let model = ScriptedModel::new()
        .fail(ModelError::Transport("reset".into()))
        .reply("recovered");

    let answer = agent(&model).run("hi").await.unwrap();

    assert_eq!(answer, "recovered");
    let requests = model.requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, "You are a test.");
        assert_eq!(request.messages[1].content, "hi");
    }
}

#[tokio::test(start_paused = true)]
async fn empty_answers_are_retried() {
    let model = ScriptedModel::new().reply("  ").reply("ok");
    assert_eq!(agent(&model).run("hi").await.unwrap(), "ok");
    assert_eq!(model.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn truncated_answers_are_retried() {
    let model = ScriptedModel::new()
        .reply_with_reason("The indemnity clause in section 4.2 sti", FinishReason::Length)
        .reply("The indemnity clause in section 4.2 stands.");
    let start = Instant::now();

    let answer = agent(&model).run("hi").await.unwrap();

    assert_eq!(answer, "The indemnity clause in section 4.2 stands.");
    assert_eq!(model.requests().len(), 2);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn aborted_answers_are_retried() {
    let model = ScriptedModel::new()
        .reply_with_reason("The indemnity clause in section 4.2 sti", FinishReason::Error)
        .reply("The indemnity clause in section 4.2 stands.");
    let start = Instant::now();

    let answer = agent(&model).run("hi").await.unwrap();

    assert_eq!(answer, "The indemnity clause in section 4.2 stands.");
    assert_eq!(model.requests().len(), 2);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn aborted_answers_never_escape() {
    let model = ScriptedModel::new()
        .reply_with_reason("partial", FinishReason::Error)
        .reply_with_reason("partial", FinishReason::Error)
        .reply_with_reason("partial", FinishReason::Error);

    let err = agent(&model).run("hi").await.unwrap_err();

    assert!(matches!(err, AgentError::Exhausted { attempts: 3, .. }));
    assert_eq!(
        err.model_error(),
        &ModelError::Incomplete("provider aborted generation".into())
    );
}

#[tokio::test]
async fn requests_carry_generation_settings() {
    let model = ScriptedModel::new().reply("ok");
    agent(&model).run("hi").await.unwrap();

    let request = &model.requests()[0];
    assert_eq!(request.model, "test/model");
    assert_eq!(request.temperature, Some(0.1));
    assert_eq!(request.top_p, Some(0.1));
    assert!(request.reasoning.is_some());
    assert!(request.tools.is_none());
    assert!(request.tool_choice.is_none());
}

#[tokio::test]
async fn tool_results_are_fed_back() {
    let model = ScriptedModel::new()
        .call("call_1", "echo", r#"{"x":1}"#)
        .reply("done");
    let agent = Agent::new(spec().tool("echo"), model.clone(), &echo_toolbox()).unwrap();

    assert_eq!(agent.run("hi").await.unwrap(), "done");

    let requests = model.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tools.as_ref().map(Vec::len), Some(1));
    assert_eq!(requests[0].tool_choice, Some(ToolChoice::Auto));

    let conversation = &requests[1].messages;
    assert_eq!(conversation.len(), 4);
    assert_eq!(conversation[2].role, Role::Assistant);
    assert_eq!(conversation[2].tool_calls[0].function.name, "echo");
    assert_eq!(conversation[3].role, Role::Tool);
    assert_eq!(conversation[3].tool_call_id, "call_1");
    assert_eq!(conversation[3].content, r#"echoed {"x":1}"#);
}

#[tokio::test]
async fn unknown_tool_calls_become_text() {
    let model = ScriptedModel::new()
        .call("call_1", "launch", "{}")
        .reply("done");
    let agent = Agent::new(spec().tool("echo"), model.clone(), &echo_toolbox()).unwrap();

    assert_eq!(agent.run("hi").await.unwrap(), "done");
    assert_eq!(
        model.requests()[1].messages[3].content,
        "tool unavailable: function launch not available"
    );
}

#[tokio::test]
async fn tool_rounds_are_bounded() {
    let mut model = ScriptedModel::new();
    for i in 0..delegate_runtime::MAX_TOOL_ROUNDS {
        model = model.call(&format!("call_{i}"), "echo", "{}");
    }
    model = model.reply("never reached");
    let agent = Agent::new(spec().tool("echo"), model.clone(), &echo_toolbox()).unwrap();

    let err = agent.run_with_attempts("hi", 1).await.unwrap_err();

    assert_eq!(
        err.model_error(),
        &ModelError::Incomplete("exceeded 16 tool rounds".into())
    );
    assert_eq!(model.requests().len(), delegate_runtime::MAX_TOOL_ROUNDS);
}

#[test]
fn unknown_tool_reference_fails_construction() {
    let err = Agent::new(
        spec().tool("missing"),
        ScriptedModel::new(),
        &ToolRegistry::new(),
    )
    .err();
    assert_eq!(err, Some(RegistryError::Unknown("missing".into())));
}

#[tokio::test]
async fn same_prompt_same_answer() {
    let model = ScriptedModel::new().always_reply("stable");
    let agent = agent(&model);
    let first = agent.run("hi").await.unwrap();
    let second = agent.run("hi").await.unwrap();
    assert_eq!(first, second);
}
