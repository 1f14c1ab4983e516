// ABOUTME: Centralized prompt management for the pipeline stages
// ABOUTME: Built-in JSON prompt documents with on-disk overrides and parameter substitution

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const STRUCTURED_OUTPUT: &str = "structured_output";
pub const REQUIREMENT_ANALYSIS: &str = "requirement_analysis";
pub const IMPACT_ANALYSIS: &str = "impact_analysis";
pub const CODE_GENERATION: &str = "code_generation";

/// (category, id, embedded document)
const BUILTIN_PROMPTS: &[(&str, &str, &str)] = &[
    (
        "system",
        STRUCTURED_OUTPUT,
        include_str!("../system/structured_output.json"),
    ),
    (
        "stages",
        REQUIREMENT_ANALYSIS,
        include_str!("../stages/requirement_analysis.json"),
    ),
    (
        "stages",
        IMPACT_ANALYSIS,
        include_str!("../stages/impact_analysis.json"),
    ),
    (
        "stages",
        CODE_GENERATION,
        include_str!("../stages/code_generation.json"),
    ),
];

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Prompt not found: {0}")]
    NotFound(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Failed to read prompt file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse prompt JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid prompt format: {0}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMetadata {
    pub version: String,
    #[serde(rename = "lastModified")]
    pub last_modified: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub name: String,
    pub category: String,
    pub template: String,
    pub parameters: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PromptMetadata>,
}

/// Immutable prompt registry, safe to share across requests
#[derive(Debug, Clone)]
pub struct PromptManager {
    prompts: HashMap<String, Prompt>,
}

impl PromptManager {
    /// Load the built-in prompts only
    pub fn builtin() -> Result<Self, PromptError> {
        let mut prompts = HashMap::new();
        for (_, id, source) in BUILTIN_PROMPTS {
            let prompt = parse_prompt(source, id)?;
            prompts.insert(prompt.id.clone(), prompt);
        }
        Ok(Self { prompts })
    }

    /// Load the built-in prompts, then replace any that exist under
    /// `<overrides_dir>/<category>/<id>.json`
    pub fn new(overrides_dir: Option<PathBuf>) -> Result<Self, PromptError> {
        let mut manager = Self::builtin()?;

        if let Some(dir) = overrides_dir {
            for (category, id, _) in BUILTIN_PROMPTS {
                let path = dir.join(category).join(format!("{}.json", id));
                if !path.exists() {
                    continue;
                }
                let prompt = load_prompt_from_path(&path)?;
                if prompt.id != *id {
                    return Err(PromptError::InvalidFormat(format!(
                        "{} declares id '{}' but overrides '{}'",
                        path.display(),
                        prompt.id,
                        id
                    )));
                }
                info!("Using prompt override for '{}' from {}", id, path.display());
                manager.prompts.insert(prompt.id.clone(), prompt);
            }
        }

        Ok(manager)
    }

    /// Get a prompt by ID with parameter substitution
    pub fn get_prompt(
        &self,
        prompt_id: &str,
        parameters: &[(&str, &str)],
    ) -> Result<String, PromptError> {
        let prompt = self.get_prompt_metadata(prompt_id)?;
        debug!(
            "Rendering prompt '{}' v{:?}",
            prompt_id,
            prompt.metadata.as_ref().map(|m| &m.version)
        );
        substitute_parameters(&prompt.template, parameters, &prompt.parameters)
    }

    /// Get prompt metadata without substitution
    pub fn get_prompt_metadata(&self, prompt_id: &str) -> Result<&Prompt, PromptError> {
        self.prompts
            .get(prompt_id)
            .ok_or_else(|| PromptError::NotFound(prompt_id.to_string()))
    }

    /// List all prompt ids in a category
    pub fn list_prompts(&self, category: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .prompts
            .values()
            .filter(|p| p.category == category)
            .map(|p| p.id.clone())
            .collect();
        ids.sort();
        ids
    }
}

/// Replace `{{parameter}}` placeholders in a single pass so substituted values
/// are never re-scanned for placeholders
fn substitute_parameters(
    template: &str,
    parameters: &[(&str, &str)],
    required_params: &[String],
) -> Result<String, PromptError> {
    let param_map: HashMap<&str, &str> = parameters.iter().copied().collect();

    for required in required_params {
        if !param_map.contains_key(required.as_str()) {
            return Err(PromptError::MissingParameter(required.clone()));
        }
    }

    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        match after_open.find("}}") {
            Some(close) => {
                let key = &after_open[..close];
                match param_map.get(key) {
                    Some(value) => result.push_str(value),
                    None => {
                        result.push_str("{{");
                        result.push_str(key);
                        result.push_str("}}");
                    }
                }
                rest = &after_open[close + 2..];
            }
            None => {
                result.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);

    Ok(result)
}

fn parse_prompt(source: &str, origin: &str) -> Result<Prompt, PromptError> {
    let prompt: Prompt = serde_json::from_str(source)?;

    if prompt.id.is_empty() || prompt.template.is_empty() || prompt.category.is_empty() {
        return Err(PromptError::InvalidFormat(format!(
            "Invalid prompt format in {}",
            origin
        )));
    }

    Ok(prompt)
}

fn load_prompt_from_path(path: &Path) -> Result<Prompt, PromptError> {
    let content = fs::read_to_string(path)?;
    parse_prompt(&content, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_prompts_load() {
        let manager = PromptManager::builtin().unwrap();
        assert_eq!(
            manager.list_prompts("stages"),
            vec![
                CODE_GENERATION.to_string(),
                IMPACT_ANALYSIS.to_string(),
                REQUIREMENT_ANALYSIS.to_string()
            ]
        );
        assert_eq!(manager.list_prompts("system"), vec![STRUCTURED_OUTPUT]);
    }

    #[test]
    fn test_requirement_prompt_embeds_document() {
        let manager = PromptManager::builtin().unwrap();
        let prompt = manager
            .get_prompt(REQUIREMENT_ANALYSIS, &[("document", "Add a Hedge Fund type")])
            .unwrap();
        assert!(prompt.contains("Add a Hedge Fund type"));
        assert!(prompt.contains("conversation_response"));
        assert!(prompt.contains("risk_tolerance"));
    }

    #[test]
    fn test_impact_prompt_carries_policy() {
        let manager = PromptManager::builtin().unwrap();
        let prompt = manager
            .get_prompt(IMPACT_ANALYSIS, &[("requirements", "{}")])
            .unwrap();
        assert!(prompt.contains("extension tables"));
        assert!(prompt.contains("core kernels"));
        assert!(prompt.contains("touchpoints"));
    }

    #[test]
    fn test_missing_parameter_error() {
        let manager = PromptManager::builtin().unwrap();
        let result = manager.get_prompt(CODE_GENERATION, &[]);
        assert!(matches!(result, Err(PromptError::MissingParameter(p)) if p == "impact"));
    }

    #[test]
    fn test_prompt_not_found() {
        let manager = PromptManager::builtin().unwrap();
        let result = manager.get_prompt("nonexistent", &[]);
        assert!(matches!(result, Err(PromptError::NotFound(_))));
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let template = "schema={{schema}} contract={{contract}}";
        let required = vec!["schema".to_string(), "contract".to_string()];
        let rendered = substitute_parameters(
            template,
            &[("schema", "{{contract}}"), ("contract", "AnalysisResult")],
            &required,
        )
        .unwrap();
        assert_eq!(rendered, "schema={{contract}} contract=AnalysisResult");
    }

    #[test]
    fn test_unknown_placeholder_is_kept() {
        let rendered = substitute_parameters("a {{b}} c {{", &[], &[]).unwrap();
        assert_eq!(rendered, "a {{b}} c {{");
    }

    #[test]
    fn test_override_directory_replaces_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let stages = dir.path().join("stages");
        fs::create_dir_all(&stages).unwrap();
        fs::write(
            stages.join("impact_analysis.json"),
            r#"{"id":"impact_analysis","name":"Custom","category":"stages",
                "template":"CUSTOM {{requirements}}","parameters":["requirements"]}"#,
        )
        .unwrap();

        let manager = PromptManager::new(Some(dir.path().to_path_buf())).unwrap();
        let prompt = manager
            .get_prompt(IMPACT_ANALYSIS, &[("requirements", "R")])
            .unwrap();
        assert_eq!(prompt, "CUSTOM R");

        // Untouched prompts keep their built-in template
        let code = manager.get_prompt(CODE_GENERATION, &[("impact", "I")]).unwrap();
        assert!(code.contains("_PKG"));
    }

    #[test]
    fn test_override_with_mismatched_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let stages = dir.path().join("stages");
        fs::create_dir_all(&stages).unwrap();
        fs::write(
            stages.join("code_generation.json"),
            r#"{"id":"other","name":"X","category":"stages","template":"T","parameters":[]}"#,
        )
        .unwrap();

        let result = PromptManager::new(Some(dir.path().to_path_buf()));
        assert!(matches!(result, Err(PromptError::InvalidFormat(_))));
    }
}
