// ABOUTME: Built-in inputs used when no file or stdin is given, and canned offline replies
// ABOUTME: Offline replies are keyed by output contract name for the fixed-response provider

use copilot_ai::SchemaContract;
use copilot_models::{
    AffectedComponent, AnalysisResult, CodeGenerationResponse, EffortEstimation,
    FunctionalRequirement, GeneratedFile, ImpactAssessment,
};

/// Used by `analyze` and `run` when no document is supplied
pub const SAMPLE_DOCUMENT: &str = "The system should allow users to create a new fund type \
'Hedge Fund' with specific fee structures.";

/// Input for `impact` when no AnalysisResult is supplied
pub fn sample_analysis() -> AnalysisResult {
    AnalysisResult {
        business_objective: "Dummy Objective".to_string(),
        client_type: "Dummy Client".to_string(),
        functional_requirements: vec![FunctionalRequirement {
            id: "FR-DUMMY".to_string(),
            description: "Dummy Req".to_string(),
            acceptance_criteria: vec!["AC1".to_string()],
            priority: "Low".to_string(),
        }],
        risk_tolerance: "Low".to_string(),
        ..AnalysisResult::default()
    }
}

/// Input for `generate` when no ImpactAssessment is supplied
pub fn sample_impact() -> ImpactAssessment {
    ImpactAssessment {
        affected_components: vec![AffectedComponent {
            component_name: "STDT_PF_FUND_MASTER".to_string(),
            component_type: "Table".to_string(),
            nature_of_change: "Modify".to_string(),
        }],
        schema_changes: vec!["ALTER TABLE STDT_PF_FUND_MASTER ADD VINTAGE_YEAR DATE".to_string()],
        code_changes: vec!["FCIS_PF_PKG.body".to_string()],
        effort_estimation: EffortEstimation {
            complexity: "Medium".to_string(),
            person_days: 10,
            justification: "Table change + Logic".to_string(),
        },
        overall_risk: "Medium".to_string(),
        mitigation_strategies: vec!["Backup before DDL".to_string()],
    }
}

fn offline_analysis() -> AnalysisResult {
    AnalysisResult {
        business_objective: "Mock Objective".to_string(),
        client_type: "Mock Client".to_string(),
        functional_requirements: vec![FunctionalRequirement {
            id: "FR-001".to_string(),
            description: "Mock functionality".to_string(),
            acceptance_criteria: vec!["Criteria 1".to_string()],
            priority: "High".to_string(),
        }],
        risk_tolerance: "Low".to_string(),
        ..AnalysisResult::default()
    }
}

fn offline_code() -> CodeGenerationResponse {
    CodeGenerationResponse {
        files: vec![GeneratedFile {
            file_name: "stdt_pf_fund_master_alter.sql".to_string(),
            file_content: "ALTER TABLE STDT_PF_FUND_MASTER ADD VINTAGE_YEAR DATE;\n".to_string(),
            file_type: "DDL".to_string(),
        }],
        summary: "Mock DDL adding the vintage year column".to_string(),
    }
}

/// Canned provider replies for `--offline`, one per contract
pub fn offline_replies() -> serde_json::Result<Vec<(&'static str, String)>> {
    Ok(vec![
        (AnalysisResult::NAME, serde_json::to_string(&offline_analysis())?),
        (ImpactAssessment::NAME, serde_json::to_string(&sample_impact())?),
        (
            CodeGenerationResponse::NAME,
            serde_json::to_string(&offline_code())?,
        ),
    ])
}
