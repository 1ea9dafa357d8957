use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{ ErrorSeverity, PatentError, PatentResult, RecoverableError };
use crate::implementations::agent::AgentContext;
use crate::implementations::markush_extractor::MarkushExtractor;
use crate::implementations::pipeline::{ InfringementPipeline, NoopObserver };
use crate::implementations::prompts::PromptLibrary;
use crate::implementations::substituent_matcher::{ RuleBasedEstimator, SubstituentMatcher };
use crate::models::common::{ AgentRole, ExecutionMode, PipelineStep, Verdict };
use crate::models::markush::MarkushStructure;
use crate::models::matching::{ EstimatorKind, EstimatorOutput };
use crate::models::report::AssessmentRequest;
use crate::samples::{
    SampleMolecule,
    SAMPLE_PATENT_CLAIM,
    SAMPLE_PROTECTED_MOLECULE,
    SAMPLE_QUERY_MOLECULE,
};
use crate::traits::SubstituentMatchingService;
use crate::tests::support::{ pipeline, RecordingObserver, ScriptedModelClient };

fn sample_request(molecule: &str) -> AssessmentRequest {
    AssessmentRequest::new(molecule, SAMPLE_PATENT_CLAIM)
}

struct UnloadedEstimator;

#[async_trait]
impl SubstituentMatchingService for UnloadedEstimator {
    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Learned
    }

    async fn estimate(&self, _query: &str, _markush: &MarkushStructure) -> PatentResult<EstimatorOutput> {
        Err(PatentError::MatchingError("model weights not loaded".to_string()))
    }
}

#[tokio::test]
async fn thiophene_molecule_is_protected() {
    let client = Arc::new(ScriptedModelClient::new());
    let report = pipeline(&client, ExecutionMode::Blocking)
        .run(&sample_request(SAMPLE_PROTECTED_MOLECULE), &mut NoopObserver).await
        .unwrap();

    assert_eq!(report.verdict(), Verdict::Protected);
    assert_eq!(report.match_result.r_group_mapping["B[5]"], "c1cccs1");
    assert_eq!(report.model, "scripted-model");

    let fact_prompt = client.last_prompt(AgentRole::FactChecker).unwrap();
    assert!(fact_prompt.contains("Infringement: protected"));
}

#[tokio::test]
async fn pyridazine_molecule_is_not_protected() {
    let client = Arc::new(ScriptedModelClient::new());
    let report = pipeline(&client, ExecutionMode::Blocking)
        .run(&sample_request(SAMPLE_QUERY_MOLECULE), &mut NoopObserver).await
        .unwrap();

    assert_eq!(report.verdict(), Verdict::NotProtected);
    assert_eq!(report.match_result.r_group_mapping["B[5]"], "c1ccnnc1");
    assert!(client.last_prompt(AgentRole::FactChecker).unwrap().contains("Infringement: not protected"));
    assert_eq!(
        client.roles(),
        vec![AgentRole::Examiner, AgentRole::FactChecker, AgentRole::Planner]
    );
}

#[tokio::test]
async fn every_agent_sees_what_it_needs() {
    let client = Arc::new(ScriptedModelClient::new());
    pipeline(&client, ExecutionMode::Blocking)
        .run(&sample_request(SAMPLE_QUERY_MOLECULE), &mut NoopObserver).await
        .unwrap();

    let calls = client.calls();
    let examiner = &calls[0];
    assert!(examiner.user_prompt.contains("- B[5]: `c1ccnnc1`"));
    assert!(examiner.user_prompt.contains(SAMPLE_QUERY_MOLECULE));
    assert!(examiner.system_prompt.contains("extended SMILES"));
    assert_eq!(examiner.temperature, 1.0);

    // Fact checker gets the examiner's full text
    assert!(calls[1].user_prompt.contains("the ring contains no sulfur"));
    assert_eq!(calls[1].temperature, 0.2);

    let planner = &calls[2].user_prompt;
    assert!(planner.contains("Skeleton match: true"));
    assert!(planner.contains("Claim 1 defines B5"));
    assert!(planner.contains("B[5]: optionally substituted thiophenyl"));
}

#[tokio::test]
async fn streaming_and_blocking_produce_the_same_report() {
    let blocking_client = Arc::new(ScriptedModelClient::new());
    let blocking = pipeline(&blocking_client, ExecutionMode::Blocking)
        .run(&sample_request(SAMPLE_PROTECTED_MOLECULE), &mut NoopObserver).await
        .unwrap();

    let streaming_client = Arc::new(ScriptedModelClient::new().fragment_chars(7));
    let mut observer = RecordingObserver::default();
    let streaming = pipeline(&streaming_client, ExecutionMode::Streaming)
        .run(&sample_request(SAMPLE_PROTECTED_MOLECULE), &mut observer).await
        .unwrap();

    assert_eq!(streaming.examination, blocking.examination);
    assert_eq!(streaming.fact_check, blocking.fact_check);
    assert_eq!(streaming.report, blocking.report);
    assert_eq!(streaming.mode, ExecutionMode::Streaming);

    // Fragments arrive in order and add up to the step's text
    assert_eq!(
        observer.streamed_text(PipelineStep::RequirementsExamination),
        streaming.examination.text
    );
    assert_eq!(observer.streamed_text(PipelineStep::ReportPlanning), streaming.report.markdown);
    assert!(observer.fragments.len() > 3);
    assert!(observer.streamed_text(PipelineStep::SubstituentMatching).is_empty());
}

#[tokio::test]
async fn steps_run_in_order() {
    let client = Arc::new(ScriptedModelClient::new());
    let mut observer = RecordingObserver::default();
    pipeline(&client, ExecutionMode::Blocking)
        .run(&sample_request(SAMPLE_QUERY_MOLECULE), &mut observer).await
        .unwrap();

    let expected: Vec<String> = PipelineStep::ALL.iter()
        .flat_map(|s| vec![format!("start:{}", s.number()), format!("done:{}", s.number())])
        .collect();
    assert_eq!(observer.events, expected);
}

#[tokio::test]
async fn empty_inputs_make_no_model_calls() {
    let client = Arc::new(ScriptedModelClient::new());
    let pipeline = pipeline(&client, ExecutionMode::Blocking);
    let mut observer = RecordingObserver::default();

    let err = pipeline.run(&sample_request("  "), &mut observer).await.unwrap_err();
    assert!(matches!(err, PatentError::InvalidInput(_)));
    assert_eq!(err.failed_step(), None);

    let err = pipeline
        .run(&AssessmentRequest::new(SAMPLE_QUERY_MOLECULE, ""), &mut observer).await
        .unwrap_err();
    assert!(matches!(err, PatentError::InvalidInput(_)));

    assert_eq!(client.call_count(), 0);
    assert!(observer.started().is_empty());
}

#[tokio::test]
async fn failing_step_is_named_and_later_steps_do_not_run() {
    let client = Arc::new(ScriptedModelClient::new().failing_on(AgentRole::FactChecker));
    let mut observer = RecordingObserver::default();
    let err = pipeline(&client, ExecutionMode::Blocking)
        .run(&sample_request(SAMPLE_QUERY_MOLECULE), &mut observer).await
        .unwrap_err();

    assert_eq!(err.failed_step(), Some(PipelineStep::FactCheck));
    assert!(err.to_string().starts_with("Step 4 (Fact check) failed"));
    assert!(!err.is_recoverable());
    assert!(err.recovery_strategy().is_some());
    assert_eq!(client.roles(), vec![AgentRole::Examiner, AgentRole::FactChecker]);
    assert!(!observer.events.contains(&"start:5".to_string()));
}

#[tokio::test]
async fn bundled_samples_get_their_expected_verdicts() {
    for sample in [SampleMolecule::Protected, SampleMolecule::NotProtected] {
        let client = Arc::new(ScriptedModelClient::new());
        let report = pipeline(&client, ExecutionMode::Blocking)
            .run(&sample_request(sample.smiles()), &mut NoopObserver).await
            .unwrap();
        assert_eq!(report.verdict(), sample.expected_verdict(), "{}", sample.label());
    }
    assert_eq!(SampleMolecule::identify(SAMPLE_PROTECTED_MOLECULE), Some(SampleMolecule::Protected));
    assert_eq!(SampleMolecule::identify("CCO"), None);
}

#[tokio::test]
async fn custom_matcher_failure_stops_at_step_two() {
    let client = Arc::new(ScriptedModelClient::new());
    let matcher = SubstituentMatcher::new(Arc::new(RuleBasedEstimator), Arc::new(UnloadedEstimator));
    let pipeline = InfringementPipeline::with_components(
        MarkushExtractor::default(),
        matcher,
        AgentContext::new(client.clone()),
        ExecutionMode::Blocking
    );
    let err = pipeline
        .run(&sample_request(SAMPLE_QUERY_MOLECULE), &mut NoopObserver).await
        .unwrap_err();

    assert_eq!(err.failed_step(), Some(PipelineStep::SubstituentMatching));
    assert_eq!(err.severity(), ErrorSeverity::Error);
    assert_eq!(client.call_count(), 0);
}

#[test]
fn severity_follows_the_underlying_error() {
    let rejected_key = PatentError::HttpError { status: 401, message: "invalid x-api-key".to_string() };
    assert_eq!(rejected_key.in_step(PipelineStep::FactCheck).severity(), ErrorSeverity::Fatal);
    assert_eq!(
        PatentError::HttpError { status: 503, message: "busy".to_string() }.severity(),
        ErrorSeverity::Error
    );
    assert_eq!(PatentError::InvalidInput("empty".to_string()).severity(), ErrorSeverity::Warning);
    assert_eq!(PatentError::ConfigError("no key".to_string()).severity(), ErrorSeverity::Fatal);
    assert_eq!(
        PatentError::NetworkError("reset".to_string())
            .in_step(PipelineStep::ReportPlanning)
            .severity(),
        ErrorSeverity::Error
    );
}

#[tokio::test]
async fn streaming_failure_is_attributed_too() {
    let client = Arc::new(ScriptedModelClient::new().failing_on(AgentRole::Examiner));
    let err = pipeline(&client, ExecutionMode::Streaming)
        .run(&sample_request(SAMPLE_QUERY_MOLECULE), &mut NoopObserver).await
        .unwrap_err();
    assert_eq!(err.failed_step(), Some(PipelineStep::RequirementsExamination));
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn broken_template_fails_before_the_model_is_called() {
    let client = Arc::new(ScriptedModelClient::new());
    let mut overrides = HashMap::new();
    overrides.insert("examiner.user".to_string(), "Judge {{molecule_name}}".to_string());
    let mut context = AgentContext::new(client.clone());
    context.prompts = Arc::new(PromptLibrary::with_overrides(&overrides));

    let err = InfringementPipeline::new(context, ExecutionMode::Blocking)
        .run(&sample_request(SAMPLE_QUERY_MOLECULE), &mut NoopObserver).await
        .unwrap_err();

    assert_eq!(err.failed_step(), Some(PipelineStep::RequirementsExamination));
    assert!(err.to_string().contains("molecule_name"));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn missing_verdict_line_counts_as_not_protected() {
    let client = Arc::new(
        ScriptedModelClient::new().with_responder(|request| {
            match request.role {
                AgentRole::Examiner => "The molecule appears to be PROTECTED.".to_string(),
                _ => "ok".to_string(),
            }
        })
    );
    let report = pipeline(&client, ExecutionMode::Blocking)
        .run(&sample_request(SAMPLE_PROTECTED_MOLECULE), &mut NoopObserver).await
        .unwrap();

    assert_eq!(report.verdict(), Verdict::Undetermined);
    assert!(client.last_prompt(AgentRole::FactChecker).unwrap().contains("Infringement: not protected"));
}

#[tokio::test]
async fn long_claim_text_is_truncated_per_step() {
    let client = Arc::new(ScriptedModelClient::new());
    let claim = format!("{}{}", "a".repeat(4000), "b".repeat(1000));
    let request = AssessmentRequest::new(SAMPLE_QUERY_MOLECULE, claim);
    pipeline(&client, ExecutionMode::Blocking).run(&request, &mut NoopObserver).await.unwrap();

    let examiner = client.last_prompt(AgentRole::Examiner).unwrap();
    assert!(examiner.contains(&"a".repeat(4000)));
    assert!(!examiner.contains(&"a".repeat(4001)));
    assert!(!examiner.contains("abbb"));

    let fact = client.last_prompt(AgentRole::FactChecker).unwrap();
    assert!(fact.contains(&"a".repeat(3000)));
    assert!(!fact.contains(&"a".repeat(3001)));

    let planner = client.last_prompt(AgentRole::Planner).unwrap();
    assert!(planner.contains(&"a".repeat(2000)));
    assert!(!planner.contains(&"a".repeat(2001)));
}

#[tokio::test]
async fn report_renders_to_markdown() {
    let client = Arc::new(ScriptedModelClient::new());
    let report = pipeline(&client, ExecutionMode::Blocking)
        .run(&sample_request(SAMPLE_QUERY_MOLECULE), &mut NoopObserver).await
        .unwrap();

    let markdown = report.to_markdown();
    assert!(markdown.contains("- Verdict: **NOT PROTECTED**"));
    assert!(markdown.contains("| B[5] | `c1ccnnc1` | `CC1C=NN=CC=1` | `c1ccnnc1` |"));
    assert!(markdown.contains("## 5. Infringement Report"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["examination"]["verdict"], "NOT_PROTECTED");
}
