// Pipeline module
// Linear orchestration: translate in, retrieve, assemble, generate,
// translate out. One run per user action, nothing overlapping.


use tracing::{debug, info};

use crate::Result;
use crate::config::GenerationConfig;
use crate::database::ScoredPassage;
use crate::prompt;
use crate::retrieval::Retriever;
use crate::sarvam::{Language, SarvamClient};

/// One completed conversation turn. Transient; the chat surface keeps a
/// session-scoped list for display, nothing persists across sessions.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// The question as the user asked it
    pub question: String,
    /// The question in the English pivot used for retrieval and generation
    pub question_en: String,
    /// The raw completion in English
    pub answer_en: String,
    /// The answer in the user's language (same as answer_en for English)
    pub answer: String,
    /// Passages handed to the prompt assembler, in retrieval order
    pub passages: Vec<ScoredPassage>,
    pub language: Language,
}

pub struct Pipeline {
    retriever: Retriever,
    sarvam: SarvamClient,
    generation: GenerationConfig,
}

impl Pipeline {
    #[inline]
    pub fn new(retriever: Retriever, sarvam: SarvamClient, generation: GenerationConfig) -> Self {
        Self {
            retriever,
            sarvam,
            generation,
        }
    }

    #[inline]
    pub fn sarvam(&self) -> &SarvamClient {
        &self.sarvam
    }

    /// Run the full pipeline for one question. Any stage failure aborts the
    /// turn and surfaces to the caller; no partial turn is produced.
    #[inline]
    pub async fn ask(&self, question: &str, language: Language) -> Result<ChatTurn> {
        info!("Processing question ({})", language);

        let question_en = self
            .sarvam
            .translate(question, language, Language::English)
            .await?;

        let passages = self.retriever.retrieve(&question_en).await?;
        debug!("Using {} passages as context", passages.len());

        let assembled = prompt::assemble(&passages, &question_en);
        let answer_en = self
            .sarvam
            .chat_completion(&assembled, &self.generation)
            .await?;

        let answer = self
            .sarvam
            .translate(&answer_en, Language::English, language)
            .await?;

        Ok(ChatTurn {
            question: question.to_string(),
            question_en,
            answer_en,
            answer,
            passages,
            language,
        })
    }
}
