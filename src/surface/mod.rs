// Chat surface module
// Interactive terminal conversation over the pipeline

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Select};
use indicatif::ProgressBar;
use tracing::debug;

use crate::pipeline::{ChatTurn, Pipeline};
use crate::sarvam::Language;

/// Starter questions shown by `:samples`.
pub const SAMPLE_QUESTIONS: [&str; 8] = [
    "Who is Hanuman?",
    "Why was Rama exiled?",
    "How did Sita get abducted?",
    "What is the Lakshmana Rekha?",
    "How was the bridge to Lanka built?",
    "Who wrote the Ramayana?",
    "What happened to Jatayu?",
    "Why did Ravana kidnap Sita?",
];

enum Action {
    Continue,
    Exit,
}

/// One interactive chat session. Keeps the turn history for the session
/// only; nothing survives the process.
pub struct ChatSession {
    pipeline: Pipeline,
    language: Language,
    audio_dir: PathBuf,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    #[inline]
    pub fn new(pipeline: Pipeline, language: Language, audio_dir: PathBuf) -> Self {
        Self {
            pipeline,
            language,
            audio_dir,
            history: Vec::new(),
        }
    }

    #[inline]
    pub async fn run(&mut self) -> Result<()> {
        eprintln!("{}", style("🪔 Ramayana Chatbot 🪔").bold().yellow());
        eprintln!(
            "{}",
            style("Ask anything about the Ramayana — type :help for commands").dim()
        );
        eprintln!("Language: {}", style(self.language).cyan());
        eprintln!();

        loop {
            let line: String = Input::new()
                .with_prompt(style("You").bold().to_string())
                .allow_empty(true)
                .interact_text()?;
            let line = line.trim().to_string();

            if line.is_empty() {
                continue;
            }

            if let Some(command) = line.strip_prefix(':') {
                match self.handle_command(command).await? {
                    Action::Exit => break,
                    Action::Continue => {}
                }
                continue;
            }

            self.ask_and_render(&line).await;
        }

        Ok(())
    }

    /// Run one pipeline turn and render it. A failed turn prints an inline
    /// error and the conversation continues; nothing is added to history.
    async fn ask_and_render(&mut self, question: &str) {
        let spinner = spinner("Consulting the sage Valmiki...");
        let result = self.pipeline.ask(question, self.language).await;
        spinner.finish_and_clear();

        match result {
            Ok(turn) => {
                eprintln!("{}", style("🧘 Valmiki says").bold().green());
                eprintln!("{}", turn.answer);
                if turn.passages.is_empty() {
                    eprintln!(
                        "{}",
                        style("(no passages found; answered from general knowledge)").dim()
                    );
                }
                eprintln!();
                self.history.push(turn);
            }
            Err(e) => {
                eprintln!("{} {}", style("⚠").red().bold(), style(e).red());
                eprintln!();
            }
        }
    }

    async fn handle_command(&mut self, command: &str) -> Result<Action> {
        let (name, arg) = match command.split_once(' ') {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        match name {
            "quit" | "exit" => return Ok(Action::Exit),
            "help" => print_help(),
            "samples" => {
                for question in SAMPLE_QUESTIONS {
                    eprintln!("  {}", question);
                }
            }
            "language" => self.select_language()?,
            "sources" => self.show_sources(),
            "english" => self.show_english(),
            "listen" => self.listen().await,
            "speak" => self.speak(arg).await,
            other => {
                eprintln!(
                    "{}",
                    style(format!("Unknown command :{}; try :help", other)).yellow()
                );
            }
        }

        Ok(Action::Continue)
    }

    fn select_language(&mut self) -> Result<()> {
        let labels: Vec<&str> = Language::ALL.iter().map(|l| l.label()).collect();
        let current = Language::ALL
            .iter()
            .position(|l| *l == self.language)
            .unwrap_or(0);

        let index = Select::new()
            .with_prompt("Choose your language")
            .default(current)
            .items(&labels)
            .interact()
            .context("Language selection failed")?;

        self.language = Language::ALL[index];
        eprintln!("Language set to {}", style(self.language).cyan());
        Ok(())
    }

    fn show_sources(&self) {
        let Some(turn) = self.history.last() else {
            eprintln!("{}", style("No answers yet").dim());
            return;
        };

        if turn.passages.is_empty() {
            eprintln!("{}", style("The last answer used no passages").dim());
            return;
        }

        eprintln!("{}", style("📜 Source passages used").bold());
        for (i, passage) in turn.passages.iter().enumerate() {
            eprintln!(
                "  {}. {} — {} (score {:.3})",
                i + 1,
                style(&passage.metadata.topic).bold(),
                style(&passage.metadata.kanda).italic(),
                passage.score
            );
            eprintln!("     {}", passage.metadata.text);
        }
    }

    fn show_english(&self) {
        let Some(turn) = self.history.last() else {
            eprintln!("{}", style("No answers yet").dim());
            return;
        };

        if turn.language == Language::English {
            eprintln!("{}", style("The last answer is already in English").dim());
        } else {
            eprintln!("{}", turn.answer_en);
        }
    }

    /// Synthesize the last answer to a WAV file in the audio directory.
    async fn listen(&self) {
        let Some(turn) = self.history.last() else {
            eprintln!("{}", style("No answers yet").dim());
            return;
        };

        let spinner = spinner("Generating audio...");
        let result = self
            .pipeline
            .sarvam()
            .synthesize(&turn.answer, turn.language)
            .await;
        spinner.finish_and_clear();

        let audio = match result {
            Ok(audio) => audio,
            Err(e) => {
                eprintln!("{} {}", style("⚠ TTS error:").red().bold(), style(e).red());
                return;
            }
        };

        let path = self.audio_dir.join(format!("answer-{}.wav", self.history.len()));
        if let Err(e) = std::fs::create_dir_all(&self.audio_dir)
            .and_then(|()| std::fs::write(&path, &audio))
        {
            eprintln!("{} {}", style("⚠ Could not write audio:").red().bold(), e);
            return;
        }

        debug!("Wrote {} bytes of audio", audio.len());
        eprintln!("🔊 Audio saved to {}", style(path.display()).cyan());
    }

    /// Transcribe a WAV file and ask the transcript as the next question.
    async fn speak(&mut self, path: &str) {
        if path.is_empty() {
            eprintln!("{}", style("Usage: :speak <path-to-wav>").yellow());
            return;
        }

        let audio = match std::fs::read(path) {
            Ok(audio) => audio,
            Err(e) => {
                eprintln!("{} {}", style("⚠ Could not read audio:").red().bold(), e);
                return;
            }
        };

        let spinner = spinner("Transcribing your voice...");
        let result = self.pipeline.sarvam().transcribe(audio, self.language).await;
        spinner.finish_and_clear();

        match result {
            Ok(transcription) if transcription.transcript.trim().is_empty() => {
                eprintln!("{}", style("Heard nothing in that recording").yellow());
            }
            Ok(transcription) => {
                eprintln!("🎙️ Heard: {}", style(&transcription.transcript).italic());
                self.ask_and_render(&transcription.transcript).await;
            }
            Err(e) => {
                eprintln!("{} {}", style("⚠ STT error:").red().bold(), style(e).red());
            }
        }
    }
}

fn print_help() {
    eprintln!("{}", style("Commands").bold());
    eprintln!("  :help              show this help");
    eprintln!("  :samples           show sample questions");
    eprintln!("  :language          switch the answer language");
    eprintln!("  :sources           show passages behind the last answer");
    eprintln!("  :english           show the last answer in English");
    eprintln!("  :listen            synthesize the last answer to a WAV file");
    eprintln!("  :speak <path>      transcribe a WAV file and ask it");
    eprintln!("  :quit              leave the chat");
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner().with_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
