//! Tests for sub-agent delegation through tools.

use dcore::{AgentSpec, ModelError, model::ScriptedModel};
use delegate_runtime::{
    Agent, Contract, LegalRequest, RegistryError, ToolDescriptor, ToolRegistry, bridge,
    extract_input,
};
use std::sync::Arc;

fn agent(name: &str, model: &str, scripted: &ScriptedModel) -> Agent<ScriptedModel> {
    let spec = AgentSpec::new(name)
        .model(model)
        .description(format!("{name} description"))
        .system_prompt(format!("You are the {name}."));
    Agent::new(spec, scripted.clone(), &ToolRegistry::new()).unwrap()
}

#[test]
fn tool_names_follow_agent_names() {
    let legal = ToolDescriptor::structured::<LegalRequest>(&AgentSpec::new("Legal Agent"));
    assert_eq!(legal.name, "ask_legal_agent");
    assert!(matches!(legal.contract, Contract::Structured(_)));

    let research = ToolDescriptor::free_text(&AgentSpec::new("Research Agent"));
    assert_eq!(research.name, "ask_research_agent");
    assert_eq!(research.contract, Contract::FreeText);
}

#[test]
fn free_text_tool_takes_single_input() {
    let spec = AgentSpec::new("Research Agent").description("Finds things.");
    let tool = ToolDescriptor::free_text(&spec).tool();
    assert_eq!(tool.description, "Finds things.");
    assert!(tool.strict);

    let schema = serde_json::to_value(&tool.parameters).unwrap();
    assert_eq!(schema["required"], serde_json::json!(["input"]));
}

#[test]
fn structured_tool_uses_request_schema() {
    let tool = ToolDescriptor::structured::<LegalRequest>(&AgentSpec::new("Legal Agent")).tool();
    assert!(!tool.strict);

    let schema = serde_json::to_value(&tool.parameters).unwrap();
    let properties = schema["properties"].as_object().unwrap();
    assert!(properties.contains_key("mode"));
    assert!(properties.contains_key("prompt"));
    assert!(properties.contains_key("write_document"));
}

#[test]
fn extract_input_requires_the_field() {
    assert_eq!(extract_input(r#"{"input":"find GDPR fines"}"#).unwrap(), "find GDPR fines");
    assert!(extract_input(r#"{"query":"x"}"#).is_err());
    assert!(extract_input("not json").is_err());
}

#[test]
fn exposing_twice_is_rejected() {
    let scripted = ScriptedModel::new();
    let mut manager = agent("Manager Agent", "m", &scripted);
    let research = Arc::new(agent("Research Agent", "r", &scripted));

    bridge::expose(Arc::clone(&research), &mut manager).unwrap();
    let err = bridge::expose(research, &mut manager).unwrap_err();
    assert_eq!(err, RegistryError::Duplicate("ask_research_agent".into()));
}

#[tokio::test]
async fn free_text_delegation_round_trip() {
    let scripted = ScriptedModel::new()
        .call("call_1", "ask_research_agent", r#"{"input":"find x"}"#)
        .reply("found x")
        .reply("final answer");
    let mut manager = agent("Manager Agent", "manager/model", &scripted);
    let research = agent("Research Agent", "research/model", &scripted);
    bridge::expose(Arc::new(research), &mut manager).unwrap();

    assert_eq!(manager.run("question").await.unwrap(), "final answer");

    let requests = scripted.requests();
    let models: Vec<_> = requests.iter().map(|r| r.model.as_str()).collect();
    assert_eq!(models, ["manager/model", "research/model", "manager/model"]);
    assert_eq!(requests[1].messages[1].content, "find x");

    let tool_message = &requests[2].messages[3];
    assert_eq!(tool_message.tool_call_id, "call_1");
    assert_eq!(tool_message.content, "found x");
}

#[tokio::test]
async fn structured_requests_are_passed_as_json() {
    let scripted = ScriptedModel::new()
        .call("call_1", "ask_legal_agent", r#"{"prompt":"nda","mode":"draft"}"#)
        .reply("drafted")
        .reply("done");
    let mut manager = agent("Manager Agent", "manager/model", &scripted);
    let legal = agent("Legal Agent", "legal/model", &scripted);
    bridge::expose_structured::<LegalRequest, _, _>(Arc::new(legal), &mut manager).unwrap();

    assert_eq!(manager.run("question").await.unwrap(), "done");
    assert_eq!(
        scripted.requests()[1].messages[1].content,
        r#"{"mode":"draft","prompt":"nda","write_document":false}"#
    );
}

#[tokio::test]
async fn failed_delegation_becomes_tool_output() {
    let scripted = ScriptedModel::new()
        .call("call_1", "ask_legal_agent", r#"{"mode":"review","prompt":"lease"}"#)
        .fail(ModelError::Provider {
            status: 401,
            message: "bad key".into(),
        })
        .reply("sorry, legal is unavailable");
    let mut manager = agent("Manager Agent", "manager/model", &scripted);
    let legal = agent("Legal Agent", "legal/model", &scripted);
    bridge::expose_structured::<LegalRequest, _, _>(Arc::new(legal), &mut manager).unwrap();

    let answer = manager.run("question").await.unwrap();

    assert_eq!(answer, "sorry, legal is unavailable");
    let requests = scripted.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(
        requests[2].messages[3].content,
        "delegation failed: agent 'Legal Agent' request rejected: provider returned 401: bad key"
    );
}

#[tokio::test]
async fn invalid_structured_arguments_skip_the_agent() {
    let scripted = ScriptedModel::new()
        .call("call_1", "ask_legal_agent", r#"{"mode":"litigate","prompt":"x"}"#)
        .reply("done");
    let mut manager = agent("Manager Agent", "manager/model", &scripted);
    let legal = agent("Legal Agent", "legal/model", &scripted);
    bridge::expose_structured::<LegalRequest, _, _>(Arc::new(legal), &mut manager).unwrap();

    assert_eq!(manager.run("question").await.unwrap(), "done");
    let requests = scripted.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.model == "manager/model"));
    assert!(requests[1].messages[3].content.starts_with("invalid arguments: "));
}

#[tokio::test]
async fn nested_delegation_is_refused() {
    let scripted = ScriptedModel::new()
        .call("call_1", "ask_legal_agent", r#"{"mode":"draft","prompt":"nda"}"#)
        .call("call_2", "ask_research_agent", r#"{"input":"precedents"}"#)
        .reply("legal done")
        .reply("final");
    let mut manager = agent("Manager Agent", "manager/model", &scripted);
    let mut legal = agent("Legal Agent", "legal/model", &scripted);
    let research = agent("Research Agent", "research/model", &scripted);
    bridge::expose(Arc::new(research), &mut legal).unwrap();
    bridge::expose_structured::<LegalRequest, _, _>(Arc::new(legal), &mut manager).unwrap();

    assert_eq!(manager.run("question").await.unwrap(), "final");

    let requests = scripted.requests();
    let models: Vec<_> = requests.iter().map(|r| r.model.as_str()).collect();
    assert_eq!(
        models,
        ["manager/model", "legal/model", "legal/model", "manager/model"]
    );
    assert!(
        requests[2].messages[3]
            .content
            .starts_with("delegation depth exceeded: ")
    );
    assert_eq!(requests[3].messages[3].content, "legal done");
}
