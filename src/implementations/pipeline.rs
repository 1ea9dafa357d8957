use chrono::Utc;
use log::{ info, warn };

use crate::errors::PatentResult;
use crate::implementations::agent::AgentContext;
use crate::implementations::examiner::{ interpret, RequirementsExaminer };
use crate::implementations::fact_checker::FactChecker;
use crate::implementations::markush_extractor::MarkushExtractor;
use crate::implementations::planner::Planner;
use crate::implementations::substituent_matcher::SubstituentMatcher;
use crate::models::common::{ ExecutionMode, PipelineStep };
use crate::models::markush::MarkushStructure;
use crate::models::matching::MatchResult;
use crate::models::report::{
    AssessmentReport,
    AssessmentRequest,
    ExaminationVerdict,
    FactCheckResult,
    InfringementReport,
};
use crate::traits::{ collect_text, ModelClient, TextStream };

/// What a finished step handed to the next one
#[derive(Debug, Clone, Copy)]
pub enum StepOutput<'a> {
    Markush(&'a MarkushStructure),
    Match(&'a MatchResult),
    Examination(&'a ExaminationVerdict),
    FactCheck(&'a FactCheckResult),
    Report(&'a InfringementReport),
}

/// Progress hooks for a pipeline run. All methods default to doing nothing.
pub trait PipelineObserver: Send {
    fn on_step_started(&mut self, _step: PipelineStep) {}

    /// A streamed fragment of a model-backed step, in delivery order
    fn on_fragment(&mut self, _step: PipelineStep, _fragment: &str) {}

    fn on_step_completed(&mut self, _step: PipelineStep, _output: StepOutput<'_>) {}
}

/// Observer that ignores every event
#[derive(Debug, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// The five-step infringement assessment
#[derive(Clone)]
pub struct InfringementPipeline {
    extractor: MarkushExtractor,
    matcher: SubstituentMatcher,
    examiner: RequirementsExaminer,
    fact_checker: FactChecker,
    planner: Planner,
    mode: ExecutionMode,
    model_id: String,
}

impl InfringementPipeline {
    /// Stub extractor and estimators, model-backed agents sharing `context`
    pub fn new(context: AgentContext, mode: ExecutionMode) -> Self {
        Self::with_components(
            MarkushExtractor::default(),
            SubstituentMatcher::default(),
            context,
            mode
        )
    }

    pub fn with_components(
        extractor: MarkushExtractor,
        matcher: SubstituentMatcher,
        context: AgentContext,
        mode: ExecutionMode
    ) -> Self {
        let model_id = context.client.model_id().to_string();
        Self {
            extractor,
            matcher,
            examiner: RequirementsExaminer::new(context.clone()),
            fact_checker: FactChecker::new(context.clone()),
            planner: Planner::new(context),
            mode,
            model_id,
        }
    }

    /// Run all five steps. Input is validated before any step starts; a failing
    /// step aborts the run with `PatentError::StepFailed`.
    pub async fn run(
        &self,
        request: &AssessmentRequest,
        observer: &mut dyn PipelineObserver
    ) -> PatentResult<AssessmentReport> {
        request.validate()?;
        let started_at = Utc::now();
        let mode = self.mode;
        info!("Starting assessment of {} ({:?} mode)", request.query_molecule, mode);

        // Step 1
        let step = PipelineStep::MarkushExtraction;
        observer.on_step_started(step);
        let markush = self.extractor
            .extract(&request.patent_text).await
            .map_err(|e| e.in_step(step))?;
        observer.on_step_completed(step, StepOutput::Markush(&markush));

        // Step 2
        let step = PipelineStep::SubstituentMatching;
        observer.on_step_started(step);
        let match_result = self.matcher
            .match_substituents(&request.query_molecule, &markush).await
            .map_err(|e| e.in_step(step))?;
        observer.on_step_completed(step, StepOutput::Match(&match_result));

        // Step 3
        let step = PipelineStep::RequirementsExamination;
        observer.on_step_started(step);
        let text = match mode {
            ExecutionMode::Blocking =>
                self.examiner.examine(
                    &markush.core_smiles,
                    &request.query_molecule,
                    &match_result,
                    &request.patent_text
                ).await,
            ExecutionMode::Streaming => {
                let stream = self.examiner.examine_stream(
                    &markush.core_smiles,
                    &request.query_molecule,
                    &match_result,
                    &request.patent_text
                ).await;
                drain(stream, step, observer).await
            }
        };
        let examination = interpret(text.map_err(|e| e.in_step(step))?);
        observer.on_step_completed(step, StepOutput::Examination(&examination));

        // Step 4
        let step = PipelineStep::FactCheck;
        observer.on_step_started(step);
        let is_protected = examination.verdict.is_protected();
        let text = match mode {
            ExecutionMode::Blocking =>
                self.fact_checker.check(
                    &request.query_molecule,
                    &request.patent_text,
                    is_protected,
                    &examination.text
                ).await,
            ExecutionMode::Streaming => {
                let stream = self.fact_checker.check_stream(
                    &request.query_molecule,
                    &request.patent_text,
                    is_protected,
                    &examination.text
                ).await;
                drain(stream, step, observer).await
            }
        };
        let fact_check = FactCheckResult { text: text.map_err(|e| e.in_step(step))? };
        observer.on_step_completed(step, StepOutput::FactCheck(&fact_check));

        // Step 5
        let step = PipelineStep::ReportPlanning;
        observer.on_step_started(step);
        let text = match mode {
            ExecutionMode::Blocking =>
                self.planner.plan(
                    &request.query_molecule,
                    &request.patent_text,
                    &markush,
                    &match_result,
                    &examination.text,
                    &fact_check.text
                ).await,
            ExecutionMode::Streaming => {
                let stream = self.planner.plan_stream(
                    &request.query_molecule,
                    &request.patent_text,
                    &markush,
                    &match_result,
                    &examination.text,
                    &fact_check.text
                ).await;
                drain(stream, step, observer).await
            }
        };
        let report = InfringementReport { markdown: text.map_err(|e| e.in_step(step))? };
        observer.on_step_completed(step, StepOutput::Report(&report));

        let finished_at = Utc::now();
        info!(
            "Assessment finished in {} ms: {}",
            (finished_at - started_at).num_milliseconds(),
            examination.verdict
        );

        Ok(AssessmentReport {
            request: request.clone(),
            model: self.model_id.clone(),
            mode,
            started_at,
            finished_at,
            markush,
            match_result,
            examination,
            fact_check,
            report,
        })
    }
}

/// Consume a fragment stream, forwarding each fragment to the observer
async fn drain(
    stream: PatentResult<TextStream>,
    step: PipelineStep,
    observer: &mut dyn PipelineObserver
) -> PatentResult<String> {
    let text = collect_text(stream?, |fragment| observer.on_fragment(step, fragment)).await?;
    if text.is_empty() {
        warn!("{} stream produced no text", step);
    }
    Ok(text)
}
