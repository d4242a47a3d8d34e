//! Prompt templates
//!
//! Prompts are in Portuguese: the service classifies Brazilian Portuguese
//! news content and the category labels are Portuguese words.

use super::ToolSpec;
use crate::model::{EvidenceBundle, MAX_QUERIES};
use serde_json::json;

/// System prompt shared by every classification call
pub const CLASSIFIER_SYSTEM_PROMPT: &str =
    "Você é um assistente especializado em análise de texto para detectar desinformação. \
     Responda SOMENTE com um objeto JSON válido.";

/// System prompt for the query planning call
pub const PLANNER_SYSTEM_PROMPT: &str =
    "Você é um pesquisador de checagem de fatos. Gere consultas curtas de busca na web \
     que ajudem a verificar as alegações de um texto.";

/// Name of the planning tool
pub const SEARCH_QUERY_TOOL: &str = "generate_search_queries";

/// Content beyond this many characters is cut before planning
const PLANNER_CONTENT_CHARS: usize = 4000;

/// Build the final classification prompt
pub fn build_classification_prompt(content: &str, evidence: Option<&EvidenceBundle>) -> String {
    let mut prompt = String::from(
        "Analise o conteúdo textual abaixo e classifique-o em exatamente uma das categorias:\n\
         - \"verdadeiro\": informação factual e verificável.\n\
         - \"fake_news\": informação falsa ou enganosa apresentada como fato.\n\
         - \"satira\": humor ou ironia que não pretende ser lido como fato.\n\
         - \"opiniao\": ponto de vista ou editorial, sem alegação factual central.\n\
         - \"tendencioso\": fatos apresentados de forma parcial ou distorcida.\n\
         - \"indefinido\": não há informação suficiente para decidir.\n\n",
    );

    if let Some(evidence) = evidence {
        prompt.push_str("Resultados de busca na web para apoiar a análise:\n");
        prompt.push_str(&evidence.formatted_text);
        prompt.push_str("\n\n");
    }

    prompt.push_str(
        "Justifique brevemente a classificação. Retorne a resposta em JSON no formato:\n\
         {\"classification\": \"categoria\", \"message\": \"justificativa\", \"sources\": [\"url\"]}\n\n",
    );
    prompt.push_str("Conteúdo: ");
    prompt.push_str(content);
    prompt
}

/// Build the query planning prompt
pub fn build_planning_prompt(content: &str) -> String {
    let truncated = match content.char_indices().nth(PLANNER_CONTENT_CHARS) {
        Some((idx, _)) => &content[..idx],
        None => content,
    };
    format!(
        "Leia o texto abaixo e gere até {} consultas de busca na web, curtas e objetivas, \
         que permitam verificar suas principais alegações. Use a ferramenta {}.\n\nTexto: {}",
        MAX_QUERIES, SEARCH_QUERY_TOOL, truncated
    )
}

/// Tool definition used by the planner
pub fn search_query_tool() -> ToolSpec {
    ToolSpec {
        name: SEARCH_QUERY_TOOL.to_string(),
        description: "Registra as consultas de busca que serão executadas para verificar o texto."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "queries": {
                    "type": "array",
                    "items": { "type": "string" },
                    "maxItems": MAX_QUERIES,
                    "description": "Consultas de busca na web"
                }
            },
            "required": ["queries"]
        }),
    }
}
