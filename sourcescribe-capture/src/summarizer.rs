use sourcescribe_llm::adapter::{CompletionOptions, LlmAdapter};
use sourcescribe_llm::{PipelineInput, PromptTemplateRegistry, ResponseValidator, TokenBudgetEstimator};
use sourcescribe_types::{CanonicalFileType, Clock, RetryConfig, Summary};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// For one file: resolves its canonical type, renders the type's prompt
/// template around the file's content, invokes the LLM Execution Pipeline,
/// and returns either a validated `Summary` or an error string suitable for
/// `SourceRecord::summaryError`.
pub struct FileSummarizer {
    registry: PromptTemplateRegistry,
    validator: ResponseValidator,
    estimator: TokenBudgetEstimator,
}

impl FileSummarizer {
    pub fn new() -> Self {
        Self {
            registry: PromptTemplateRegistry::new(),
            validator: ResponseValidator::new(),
            estimator: TokenBudgetEstimator::default(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn summarize(
        &self,
        filepath: &str,
        filename: &str,
        extension: Option<&str>,
        content: &str,
        adapters: Vec<Arc<dyn LlmAdapter>>,
        retry_config: RetryConfig,
        stats: &sourcescribe_types::StatsRecorder,
        clock: &dyn Clock,
        cancellation: &CancellationToken,
    ) -> Result<Summary, String> {
        let canonical_type = CanonicalFileType::resolve(filename, extension);
        let template = self.registry.get(canonical_type);

        let content_desc = template.content_description;
        let instructions = template.instructions;
        let wrap_in_code_block = template.wrap_content_in_code_block;
        let schema_text = template.response_schema.to_string();

        let render = Arc::new(move |content: &str| -> String {
            let content_block = if wrap_in_code_block {
                format!("```\n{content}\n```")
            } else {
                content.to_string()
            };
            format!(
                "You are analyzing {content_desc}.\n\n{instructions}\n\n\
                 Respond with only a JSON object matching this schema:\n{schema_text}\n\n\
                 Content:\n{content_block}"
            )
        });

        let input = PipelineInput {
            resource_name: filepath.to_string(),
            content: content.to_string(),
            render,
            template_id: format!("{canonical_type:?}"),
            schema: template.response_schema.clone(),
            adapters,
            retry_config,
            completion_options: CompletionOptions::default(),
        };

        let validated = sourcescribe_llm::run_pipeline(input, &self.validator, &self.estimator, stats, clock, cancellation)
            .await?;

        serde_json::from_value(validated).map_err(|e| format!("validated JSON did not match Summary shape: {e}"))
    }
}

impl Default for FileSummarizer {
    fn default() -> Self {
        Self::new()
    }
}
