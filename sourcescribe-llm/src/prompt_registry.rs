use sourcescribe_types::CanonicalFileType;
use std::collections::HashMap;

/// Everything needed to ask an adapter for a structured summary of one
/// file: the schema its output must validate against, the pre-composed
/// instruction text, and a couple of rendering hints. Instructions are
/// fixed text fragments — the registry itself never interpolates a string.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub response_schema: serde_json::Value,
    pub content_description: &'static str,
    pub instructions: &'static str,
    pub wrap_content_in_code_block: bool,
    pub has_complex_schema: bool,
}

/// Closed vocabularies the Response Validator's `normalize_enums` pass
/// normalizes against. Declared as real `enum` constraints (rather than
/// bare `"type": "string"`) so unrecognized model output actually gets
/// caught and mapped to the `INVALID` sentinel instead of passing through
/// schema validation unexamined.
fn mechanism_enum() -> serde_json::Value {
    serde_json::json!({"type": "string", "enum": ["JDBC", "ORM", "STORED_PROCEDURE", "RAW_SQL"]})
}

fn operation_type_enum() -> serde_json::Value {
    serde_json::json!({"type": "string", "enum": ["CREATE", "READ", "UPDATE", "DELETE"]})
}

fn direction_enum() -> serde_json::Value {
    serde_json::json!({"type": "string", "enum": ["INBOUND", "OUTBOUND"]})
}

fn complexity_enum() -> serde_json::Value {
    serde_json::json!({"type": "string", "enum": ["LOW", "MEDIUM", "HIGH"]})
}

fn code_smell_enum() -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "enum": ["LONG_METHOD", "GOD_CLASS", "DUPLICATED_CODE", "DEAD_CODE", "MAGIC_NUMBER"]
    })
}

fn simple_summary_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "required": ["purpose", "implementation"],
        "properties": {
            "name": {"type": "string"},
            "kind": {"type": "string"},
            "namespace": {"type": "string"},
            "purpose": {"type": "string"},
            "implementation": {"type": "string"},
            "internalReferences": {"type": "array", "items": {"type": "string"}},
            "externalReferences": {"type": "array", "items": {"type": "string"}},
            "publicMethods": {"type": "array", "items": {"type": "string"}},
            "publicConstants": {"type": "array", "items": {"type": "string"}},
            "codeQualityMetrics": {
                "type": "object",
                "properties": {
                    "complexity": complexity_enum(),
                    "codeSmells": {"type": "array", "items": code_smell_enum()}
                }
            }
        }
    })
}

fn database_integration_schema() -> serde_json::Value {
    let mut schema = simple_summary_schema();
    schema["properties"]["databaseIntegration"] = serde_json::json!({
        "type": "object",
        "properties": {
            "mechanism": mechanism_enum(),
            "operations": {"type": "array", "items": operation_type_enum()},
            "tables": {"type": "array", "items": {"type": "string"}}
        }
    });
    schema["properties"]["storedProcedures"] = serde_json::json!({"type": "array", "items": {"type": "string"}});
    schema["properties"]["triggers"] = serde_json::json!({"type": "array", "items": {"type": "string"}});
    schema
}

fn integration_schema() -> serde_json::Value {
    let mut schema = simple_summary_schema();
    schema["properties"]["integrationPoints"] = serde_json::json!({
        "type": "array",
        "items": {
            "type": "object",
            "required": ["name", "direction"],
            "properties": {
                "name": {"type": "string"},
                "direction": direction_enum(),
                "target": {"type": "string"}
            }
        }
    });
    schema
}

/// Maps a canonical file type to its `PromptTemplate`. Built once at
/// construction; lookup is a pure, infallible `HashMap` read that falls
/// back to the `default` entry, which is always present.
pub struct PromptTemplateRegistry {
    templates: HashMap<CanonicalFileType, PromptTemplate>,
}

impl PromptTemplateRegistry {
    pub fn new() -> Self {
        use CanonicalFileType::*;
        let mut templates = HashMap::new();

        templates.insert(
            Java,
            PromptTemplate {
                response_schema: database_integration_schema(),
                content_description: "a Java source file",
                instructions: "Identify the file's purpose, public API, and any JDBC or ORM \
                    database access including affected tables and operation types. List stored \
                    procedures and triggers referenced, if any.",
                wrap_content_in_code_block: true,
                has_complex_schema: true,
            },
        );

        templates.insert(
            Javascript,
            PromptTemplate {
                response_schema: integration_schema(),
                content_description: "a JavaScript or TypeScript source file",
                instructions: "Identify the file's purpose, exported API, and any outbound HTTP, \
                    RPC, or message-queue calls it makes, plus any inbound routes or handlers it \
                    defines.",
                wrap_content_in_code_block: true,
                has_complex_schema: true,
            },
        );

        templates.insert(
            Csharp,
            PromptTemplate {
                response_schema: database_integration_schema(),
                content_description: "a C# source file",
                instructions: "Identify the file's purpose, public API, and any ADO.NET or \
                    Entity Framework database access including affected tables and operation \
                    types.",
                wrap_content_in_code_block: true,
                has_complex_schema: true,
            },
        );

        templates.insert(
            Sql,
            PromptTemplate {
                response_schema: database_integration_schema(),
                content_description: "a SQL script",
                instructions: "Identify every table referenced, the operation type(s) performed \
                    against each, and any stored procedures or triggers defined in the script.",
                wrap_content_in_code_block: false,
                has_complex_schema: false,
            },
        );

        templates.insert(
            Python,
            PromptTemplate {
                response_schema: integration_schema(),
                content_description: "a Python source file",
                instructions: "Identify the file's purpose, public API, and any outbound network \
                    calls or scheduled-job decorators it defines.",
                wrap_content_in_code_block: true,
                has_complex_schema: true,
            },
        );

        templates.insert(
            Default,
            PromptTemplate {
                response_schema: simple_summary_schema(),
                content_description: "a source file",
                instructions: "Identify the file's purpose, implementation approach, and public \
                    API, if any.",
                wrap_content_in_code_block: true,
                has_complex_schema: false,
            },
        );

        Self { templates }
    }

    /// Look up the template for a canonical type. Never errors: falls back
    /// to the `Default` entry, which is always present in a freshly
    /// constructed registry.
    pub fn get(&self, file_type: CanonicalFileType) -> &PromptTemplate {
        self.templates
            .get(&file_type)
            .or_else(|| self.templates.get(&CanonicalFileType::Default))
            .expect("Default template is always registered")
    }
}

impl Default for PromptTemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
