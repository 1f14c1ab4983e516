// ABOUTME: Data model for the requirements pipeline
// ABOUTME: Entities, their output contracts, and the sentinel values used when a stage is skipped

pub mod contracts;
pub mod types;

pub use types::{
    AffectedComponent, AnalysisResult, CodeGenerationResponse, EffortEstimation,
    ExclusivityViolation, FunctionalRequirement, GeneratedFile, ImpactAssessment,
    CONVERSATIONAL_JUSTIFICATION, NOT_APPLICABLE, NO_CODE_SUMMARY,
};
