// ABOUTME: Requirement analysis, impact analysis and code generation stages
// ABOUTME: Plus the pipeline that chains them and the chunking used for long documents

pub mod chunking;
pub mod code_generation;
pub mod error;
pub mod impact_analysis;
pub mod outcome;
pub mod pipeline;
pub mod requirement_analysis;

pub use code_generation::CodeGenerationStage;
pub use error::{AgentError, Result, StageName};
pub use impact_analysis::ImpactAnalysisStage;
pub use outcome::{SkipReason, StageOutcome};
pub use pipeline::{Pipeline, PipelineReport};
pub use requirement_analysis::RequirementAnalysisStage;
