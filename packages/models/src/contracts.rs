// ABOUTME: Output contracts for each data model entity
// ABOUTME: Declares the shape the generator must produce, mirroring the serde defaults

use copilot_ai::{Field, Schema, SchemaContract};
use serde_json::{json, Value};

use crate::types::*;

fn string_list() -> Schema {
    Schema::array_of(Schema::string())
}

fn defaulted_list(name: &'static str, description: &'static str) -> Field {
    Field::optional(name, description, string_list(), json!([]))
}

fn defaulted_scalar(name: &'static str, description: &'static str) -> Field {
    Field::optional(name, description, Schema::string(), json!(NOT_APPLICABLE))
}

impl SchemaContract for FunctionalRequirement {
    const NAME: &'static str = "FunctionalRequirement";

    fn schema() -> Schema {
        Schema::object(vec![
            Field::required(
                "id",
                "Unique identifier for the requirement (e.g., FR-001)",
                Schema::string(),
            ),
            Field::required(
                "description",
                "Clear, concise description of the functional requirement",
                Schema::string(),
            ),
            Field::required(
                "acceptance_criteria",
                "List of testable acceptance criteria",
                string_list(),
            ),
            Field::optional(
                "priority",
                "Priority level (High, Medium, Low)",
                Schema::string(),
                json!("Medium"),
            ),
        ])
    }
}

impl SchemaContract for AnalysisResult {
    const NAME: &'static str = "AnalysisResult";

    fn schema() -> Schema {
        Schema::object(vec![
            defaulted_scalar("business_objective", "1. Business Objective"),
            defaulted_scalar("client_type", "2. Client Type"),
            defaulted_list("regulatory_constraints", "3. Regulatory Constraints"),
            Field::optional(
                "functional_requirements",
                "4. Functional Requirements",
                Schema::array_of(FunctionalRequirement::schema()),
                json!([]),
            ),
            defaulted_list("non_functional_requirements", "5. Non-Functional Requirements"),
            defaulted_list("business_rules", "6. Business Rules"),
            defaulted_list("data_requirements", "7. Data Requirements"),
            defaulted_list("interface_requirements", "8. Interface Requirements"),
            defaulted_list("ui_ux_requirements", "9. UI/UX Requirements"),
            defaulted_list("reporting_requirements", "10. Reporting Requirements"),
            defaulted_list("audit_and_logging", "11. Audit & Logging"),
            defaulted_list("historical_issues", "12. Historical Issues"),
            defaulted_scalar("risk_tolerance", "13. Risk Tolerance"),
            Field::optional(
                "conversation_response",
                "Response if input is a general conversation/question, not a BRD",
                Schema::nullable(Schema::string()),
                Value::Null,
            ),
        ])
    }
}

impl SchemaContract for AffectedComponent {
    const NAME: &'static str = "AffectedComponent";

    fn schema() -> Schema {
        Schema::object(vec![
            Field::required(
                "component_name",
                "Name of the component (e.g., STDCIF, FCIS_PC_PKG)",
                Schema::string(),
            ),
            Field::required(
                "component_type",
                "Type: Table, Package, Screen, API, Job",
                Schema::string(),
            ),
            Field::required("nature_of_change", "New, Modify, Deprecate", Schema::string()),
        ])
    }
}

impl SchemaContract for EffortEstimation {
    const NAME: &'static str = "EffortEstimation";

    fn schema() -> Schema {
        Schema::object(vec![
            Field::required("complexity", "Low, Medium, High", Schema::string()),
            Field::required(
                "person_days",
                "Estimated person-days",
                Schema::non_negative_integer(),
            ),
            Field::required("justification", "Reason for the estimate", Schema::string()),
        ])
    }
}

impl SchemaContract for ImpactAssessment {
    const NAME: &'static str = "ImpactAssessment";

    fn schema() -> Schema {
        Schema::object(vec![
            Field::required(
                "affected_components",
                "List of all technical components touched",
                Schema::array_of(AffectedComponent::schema()),
            ),
            Field::required("schema_changes", "SQL changes required (DDL/DML)", string_list()),
            Field::required("code_changes", "Files/Packages to be modified", string_list()),
            Field::required("effort_estimation", "", EffortEstimation::schema()),
            Field::required("overall_risk", "High/Medium/Low risk score", Schema::string()),
            Field::required(
                "mitigation_strategies",
                "Technical mitigations for identified risks",
                string_list(),
            ),
        ])
    }
}

impl SchemaContract for GeneratedFile {
    const NAME: &'static str = "GeneratedFile";

    fn schema() -> Schema {
        Schema::object(vec![
            Field::required(
                "file_name",
                "Name of the file (e.g., sttm_fund_ext.sql)",
                Schema::string(),
            ),
            Field::required("file_content", "Content of the file", Schema::string()),
            Field::required(
                "file_type",
                "Type of file (e.g., DDL, DML, INC, PLSQL)",
                Schema::string(),
            ),
        ])
    }
}

impl SchemaContract for CodeGenerationResponse {
    const NAME: &'static str = "CodeGenerationResponse";

    fn schema() -> Schema {
        Schema::object(vec![
            Field::required("files", "", Schema::array_of(GeneratedFile::schema())),
            Field::required("summary", "Brief summary of generated code", Schema::string()),
        ])
    }
}
