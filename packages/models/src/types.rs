// ABOUTME: Type definitions for requirements, impact assessments and generated code
// ABOUTME: Wire form is JSON with snake_case names; every type round-trips through serde

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker for a scalar category or complexity that does not apply
pub const NOT_APPLICABLE: &str = "N/A";
/// Effort justification on the impact sentinel
pub const CONVERSATIONAL_JUSTIFICATION: &str = "Conversational Input";
/// Summary on the code generation sentinel
pub const NO_CODE_SUMMARY: &str = "No code needed for conversational input.";

fn not_applicable() -> String {
    NOT_APPLICABLE.to_string()
}

fn medium_priority() -> String {
    "Medium".to_string()
}

/// A result carrying both a conversational reply and extracted categories
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("analysis result has a conversation response and {populated} populated categories")]
pub struct ExclusivityViolation {
    pub populated: usize,
}

/// One atomic extracted requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionalRequirement {
    /// Identifier such as FR-001
    pub id: String,
    pub description: String,
    pub acceptance_criteria: Vec<String>,
    /// High, Medium or Low (not enforced)
    #[serde(default = "medium_priority")]
    pub priority: String,
}

/// The 13-category extraction of a document, or a conversational reply.
///
/// Exactly one of "categories populated" and "`conversation_response` set"
/// is expected to hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default = "not_applicable")]
    pub business_objective: String,
    #[serde(default = "not_applicable")]
    pub client_type: String,
    #[serde(default)]
    pub regulatory_constraints: Vec<String>,
    #[serde(default)]
    pub functional_requirements: Vec<FunctionalRequirement>,
    #[serde(default)]
    pub non_functional_requirements: Vec<String>,
    #[serde(default)]
    pub business_rules: Vec<String>,
    #[serde(default)]
    pub data_requirements: Vec<String>,
    #[serde(default)]
    pub interface_requirements: Vec<String>,
    #[serde(default)]
    pub ui_ux_requirements: Vec<String>,
    #[serde(default)]
    pub reporting_requirements: Vec<String>,
    #[serde(default)]
    pub audit_and_logging: Vec<String>,
    #[serde(default)]
    pub historical_issues: Vec<String>,
    #[serde(default = "not_applicable")]
    pub risk_tolerance: String,
    /// Reply when the input was a general question rather than a BRD/CR
    #[serde(default)]
    pub conversation_response: Option<String>,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            business_objective: not_applicable(),
            client_type: not_applicable(),
            regulatory_constraints: Vec::new(),
            functional_requirements: Vec::new(),
            non_functional_requirements: Vec::new(),
            business_rules: Vec::new(),
            data_requirements: Vec::new(),
            interface_requirements: Vec::new(),
            ui_ux_requirements: Vec::new(),
            reporting_requirements: Vec::new(),
            audit_and_logging: Vec::new(),
            historical_issues: Vec::new(),
            risk_tolerance: not_applicable(),
            conversation_response: None,
        }
    }
}

impl AnalysisResult {
    /// A conversational reply with every category at its default
    pub fn conversational(reply: impl Into<String>) -> Self {
        Self {
            conversation_response: Some(reply.into()),
            ..Self::default()
        }
    }

    pub fn is_conversational(&self) -> bool {
        self.conversation_response
            .as_deref()
            .is_some_and(|reply| !reply.trim().is_empty())
    }

    /// True when any of the 13 categories differs from its default
    pub fn has_extracted_categories(&self) -> bool {
        self.populated_categories() > 0
    }

    /// Mutual exclusivity between a conversational reply and extracted categories
    pub fn is_consistent(&self) -> bool {
        self.check_exclusivity().is_ok()
    }

    pub fn check_exclusivity(&self) -> Result<(), ExclusivityViolation> {
        if !self.is_conversational() {
            return Ok(());
        }
        let populated = self.populated_categories();
        if populated == 0 {
            Ok(())
        } else {
            Err(ExclusivityViolation { populated })
        }
    }

    fn populated_categories(&self) -> usize {
        let scalar_set = |value: &str| value != NOT_APPLICABLE && !value.trim().is_empty();
        let scalars = [&self.business_objective, &self.client_type, &self.risk_tolerance]
            .iter()
            .filter(|value| scalar_set(value))
            .count();
        let lists = [
            &self.regulatory_constraints,
            &self.non_functional_requirements,
            &self.business_rules,
            &self.data_requirements,
            &self.interface_requirements,
            &self.ui_ux_requirements,
            &self.reporting_requirements,
            &self.audit_and_logging,
            &self.historical_issues,
        ]
        .iter()
        .filter(|list| !list.is_empty())
        .count();
        scalars + lists + usize::from(!self.functional_requirements.is_empty())
    }
}

/// One technical artifact touched by a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedComponent {
    pub component_name: String,
    /// Table, Package, Screen, API or Job
    pub component_type: String,
    /// New, Modify or Deprecate
    pub nature_of_change: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffortEstimation {
    /// Low, Medium, High, or N/A for skipped work
    pub complexity: String,
    pub person_days: u32,
    pub justification: String,
}

/// Technical translation of an [`AnalysisResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactAssessment {
    pub affected_components: Vec<AffectedComponent>,
    /// DDL/DML statements required
    pub schema_changes: Vec<String>,
    /// Files or packages to be modified
    pub code_changes: Vec<String>,
    pub effort_estimation: EffortEstimation,
    /// High, Medium or Low
    pub overall_risk: String,
    pub mitigation_strategies: Vec<String>,
}

impl ImpactAssessment {
    /// Structurally valid, semantically empty assessment for skipped work
    pub fn skipped(justification: impl Into<String>) -> Self {
        Self {
            affected_components: Vec::new(),
            schema_changes: Vec::new(),
            code_changes: Vec::new(),
            effort_estimation: EffortEstimation {
                complexity: NOT_APPLICABLE.to_string(),
                person_days: 0,
                justification: justification.into(),
            },
            overall_risk: "Low".to_string(),
            mitigation_strategies: Vec::new(),
        }
    }

    /// Matches the sentinel produced by [`ImpactAssessment::skipped`]
    pub fn is_skipped(&self) -> bool {
        self.affected_components.is_empty() && self.effort_estimation.complexity == NOT_APPLICABLE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// e.g. sttm_fund_ext.sql
    pub file_name: String,
    pub file_content: String,
    /// DDL, DML, INC, PLSQL, ...
    pub file_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeGenerationResponse {
    pub files: Vec<GeneratedFile>,
    pub summary: String,
}

impl CodeGenerationResponse {
    pub fn skipped(summary: impl Into<String>) -> Self {
        Self {
            files: Vec::new(),
            summary: summary.into(),
        }
    }
}
