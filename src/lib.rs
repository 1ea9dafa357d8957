pub mod models;
pub mod traits;
pub mod errors;
pub mod config;
pub mod implementations;
pub mod samples;
#[cfg(test)]
pub mod tests;

// Re-export core components
pub use config::{ truncate_chars, PromptBudgets, RetryPolicy };
pub use errors::{ ErrorSeverity, PatentError, PatentResult, RecoverableError };
pub use implementations::{
    agent::AgentContext,
    config::{ ClientConfig, Provider },
    examiner::RequirementsExaminer,
    fact_checker::FactChecker,
    llm_client::LlmClient,
    markush_extractor::{ MarkushExtractor, StaticMarkushParser },
    pipeline::{ InfringementPipeline, NoopObserver, PipelineObserver, StepOutput },
    planner::Planner,
    prompts::PromptLibrary,
    retry::RetryingModelClient,
    substituent_matcher::{ LearnedEstimator, RuleBasedEstimator, SubstituentMatcher },
};
pub use models::{
    common::{ AgentRole, ExecutionMode, PipelineStep, Verdict },
    markush::{ MarkushStructure, SubstituentPosition },
    matching::{ EstimatorKind, EstimatorOutput, MatchResult, MatchStatus, SubstituentAnalysis },
    report::{
        AssessmentReport,
        AssessmentRequest,
        ExaminationVerdict,
        FactCheckResult,
        InfringementReport,
    },
};
pub use traits::{
    collect_text,
    MarkushParsingService,
    ModelClient,
    ModelEvent,
    ModelRequest,
    SubstituentMatchingService,
    TextStream,
};
