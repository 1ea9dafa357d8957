pub mod common;
pub mod markush;
pub mod matching;
pub mod report;

// Re-export common model types
pub use common::{ AgentRole, ExecutionMode, PipelineStep, Verdict };
pub use markush::{ MarkushStructure, SubstituentPosition };
pub use matching::{ EstimatorKind, EstimatorOutput, MatchResult, MatchStatus, SubstituentAnalysis };
pub use report::{
    AssessmentReport,
    AssessmentRequest,
    ExaminationVerdict,
    FactCheckResult,
    InfringementReport,
};
