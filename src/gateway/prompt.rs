//! Map an intent onto an instruction template plus user content.

use sigma_core::{
    config::Prompts,
    intent::Intent,
    prompt::{sniff_image_mime, PromptContent, PromptRequest, TemplateId},
};

/// Build the backend request for `intent`.
///
/// Returns `None` for fast-path intents; those never reach the AI backend.
/// `chart_model` overrides the provider's model for chart screenshots only.
pub(crate) fn build(
    intent: Intent,
    prompts: &Prompts,
    chart_model: Option<&str>,
) -> Option<PromptRequest> {
    if intent.is_fast_path() {
        return None;
    }

    let (template, instruction, content, model) = match intent {
        Intent::GeneralQuery { text } => (
            TemplateId::GeneralQuery,
            &prompts.general_query,
            PromptContent::Text(text),
            None,
        ),
        Intent::ChartAnalysis { image_bytes } => {
            let mime_type = sniff_image_mime(&image_bytes).to_string();
            (
                TemplateId::ChartAnalysis,
                &prompts.chart_analysis,
                PromptContent::Image {
                    bytes: image_bytes,
                    mime_type,
                },
                chart_model,
            )
        }
        _ => return None,
    };

    Some(PromptRequest {
        template,
        instruction: instruction.clone(),
        content,
        model: model.map(str::to_string),
    })
}
