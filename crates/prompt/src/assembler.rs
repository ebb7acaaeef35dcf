//! Prompt assembly: renders the fused context and question into the
//! generation prompt.

use grounded_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// The fixed answer-generation template.
///
/// Instructional framing: answer from the provided sources, attribute
/// facts to local documents or web search, surface conflicts between
/// sources, format in markdown, and admit when nothing was found
/// instead of fabricating.
const ANSWER_TEMPLATE: &str = "\
Based on the following information sources, answer the user's question.
If using information from web search, explicitly mention that the information comes from the web.
If using information from local documents, mention that as well.
If you find conflicting information between sources, acknowledge this and explain the differences.
If no relevant information was found, state this honestly instead of making up an answer.

{{context}}

User Question: {{question}}
Answer (please format in markdown):
";

/// Render the generation prompt from a fused context and question.
///
/// Pure string templating; fails only if the template itself cannot be
/// registered or rendered, which is a programming error rather than a
/// runtime condition.
pub fn assemble(context: &str, question: &str) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // The prompt is plain text, not HTML.
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("answer", ANSWER_TEMPLATE)
        .map_err(|e| AppError::Other(format!("Failed to register prompt template: {}", e)))?;

    let mut variables: HashMap<&str, &str> = HashMap::new();
    variables.insert("context", context);
    variables.insert("question", question);

    let rendered = handlebars
        .render("answer", &variables)
        .map_err(|e| AppError::Other(format!("Failed to render prompt template: {}", e)))?;

    tracing::debug!("Assembled prompt of {} chars", rendered.len());

    Ok(rendered)
}
