// Prompt assembly module
// Pure construction of the chat prompt from retrieved passages


use crate::database::ScoredPassage;

/// Persona instruction sent as the system message with every request. The
/// model always answers in English; translation happens separately.
pub const SYSTEM_PROMPT: &str = "You are Valmiki, the sage-poet and author of the Ramayana. \
You have deep knowledge of all events, characters, and teachings of the Ramayana. \
Answer questions thoughtfully and accurately based on the provided context passages. \
If the context does not contain enough information, draw on your knowledge of the Ramayana. \
Keep answers concise (3-5 sentences) unless the question requires detail. \
Always respond in English — the response will be translated separately.";

const EMPTY_CONTEXT_NOTE: &str = "No passages were retrieved for this question. \
Answer from your general knowledge of the Ramayana.";

/// The assembled prompt pair handed to the answer generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub system: String,
    pub user: String,
}

/// Build the prompt from the ordered retrieved passages and the question.
/// Deterministic: identical inputs always produce identical strings.
#[inline]
pub fn assemble(passages: &[ScoredPassage], question_en: &str) -> AssembledPrompt {
    let context = if passages.is_empty() {
        EMPTY_CONTEXT_NOTE.to_string()
    } else {
        passages
            .iter()
            .enumerate()
            .map(|(i, p)| {
                format!(
                    "[Passage {} — {}, Topic: {}]\n{}",
                    i + 1,
                    p.metadata.kanda,
                    p.metadata.topic,
                    p.metadata.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    let user = format!(
        "Context from the Ramayana:\n\n{}\n\nQuestion: {}\n\nAnswer as Valmiki the sage:",
        context, question_en
    );

    AssembledPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}
