use serde::{Deserialize, Serialize};

/// Per-method or per-file complexity rating. A Summary that never mentions
/// complexity resolves to `Medium` at the call site that would otherwise
/// leave it absent; `Invalid` is reserved for a value that was present but
/// unrecognized. Variants are renamed to the uppercase wire vocabulary the
/// Response Validator normalizes model output into, so deserializing a
/// validated `Summary` straight from JSON matches without a manual mapping
/// step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Complexity {
    Low,
    Medium,
    High,
    #[serde(other)]
    Invalid,
}

impl Default for Complexity {
    fn default() -> Self {
        Complexity::Medium
    }
}

/// How a file integrates with a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mechanism {
    Jdbc,
    Orm,
    StoredProcedure,
    RawSql,
    #[serde(other)]
    Invalid,
}

/// CRUD classification for a database operation or integration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Create,
    Read,
    Update,
    Delete,
    #[serde(other)]
    Invalid,
}

/// Direction of an integration point relative to the analyzed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Inbound,
    Outbound,
    #[serde(other)]
    Invalid,
}

/// Recognized code smell categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeSmell {
    LongMethod,
    GodClass,
    DuplicatedCode,
    DeadCode,
    MagicNumber,
    #[serde(other)]
    Invalid,
}

/// A database integration observed in one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseIntegration {
    pub mechanism: Mechanism,
    pub operations: Vec<OperationType>,
    pub tables: Vec<String>,
}

/// One integration endpoint (REST call, message queue, RPC, ...) observed
/// in one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationPoint {
    pub name: String,
    pub direction: Direction,
    pub target: Option<String>,
}

/// Per-file/per-method code quality metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeQualityMetrics {
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub code_smells: Vec<CodeSmell>,
}

/// The structured, schema-valid JSON object produced by the LLM execution
/// pipeline for one file. Field presence varies by canonical file type; the
/// superset is modeled here so downstream readers (out of scope) have a
/// single shape to match on regardless of which fields a given file's
/// schema populated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub namespace: Option<String>,
    pub purpose: String,
    pub implementation: String,
    #[serde(default)]
    pub internal_references: Vec<String>,
    #[serde(default)]
    pub external_references: Vec<String>,
    #[serde(default)]
    pub public_methods: Vec<String>,
    #[serde(default)]
    pub public_constants: Vec<String>,
    pub database_integration: Option<DatabaseIntegration>,
    #[serde(default)]
    pub integration_points: Vec<IntegrationPoint>,
    #[serde(default)]
    pub stored_procedures: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub scheduled_jobs: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub jsp_metrics: Option<serde_json::Value>,
    pub ui_framework: Option<String>,
    pub code_quality_metrics: Option<CodeQualityMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_complexity_defaults_to_medium() {
        let metrics: CodeQualityMetrics = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(metrics.complexity, Complexity::Medium);
    }

    #[test]
    fn unrecognized_complexity_deserializes_to_invalid() {
        let metrics: CodeQualityMetrics =
            serde_json::from_value(serde_json::json!({"complexity": "medium-ish"})).unwrap();
        assert_eq!(metrics.complexity, Complexity::Invalid);
    }

    #[test]
    fn recognized_wire_vocabulary_deserializes_without_a_manual_mapping_step() {
        let mechanism: Mechanism = serde_json::from_value(serde_json::json!("STORED_PROCEDURE")).unwrap();
        assert_eq!(mechanism, Mechanism::StoredProcedure);

        let operation: OperationType = serde_json::from_value(serde_json::json!("UPDATE")).unwrap();
        assert_eq!(operation, OperationType::Update);

        let direction: Direction = serde_json::from_value(serde_json::json!("OUTBOUND")).unwrap();
        assert_eq!(direction, Direction::Outbound);

        let smell: CodeSmell = serde_json::from_value(serde_json::json!("MAGIC_NUMBER")).unwrap();
        assert_eq!(smell, CodeSmell::MagicNumber);
    }

    #[test]
    fn unrecognized_wire_value_deserializes_to_invalid_variant() {
        let mechanism: Mechanism = serde_json::from_value(serde_json::json!("GRAPHQL")).unwrap();
        assert_eq!(mechanism, Mechanism::Invalid);
    }
}
