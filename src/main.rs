use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ramayana_chat::Result;
use ramayana_chat::commands::{ask, chat, seed, show_status};
use ramayana_chat::config::{run_interactive_config, show_config};
use ramayana_chat::sarvam::Language;

#[derive(Parser)]
#[command(name = "ramayana-chat")]
#[command(about = "A retrieval-augmented Ramayana chatbot with multilingual answers and speech")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure embedding, retrieval, and generation settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Seed the vector store from the passage corpus
    Seed {
        /// Path to the corpus JSON file
        #[arg(long)]
        corpus: Option<PathBuf>,
        /// Drop the existing collection before seeding
        #[arg(long)]
        rebuild: bool,
    },
    /// Ask a single question and print the answer
    Ask {
        /// The question, in the selected language
        question: String,
        /// Answer language, e.g. "Hindi" or "Tamil"
        #[arg(long, default_value = "English")]
        language: Language,
    },
    /// Start an interactive chat session
    Chat {
        /// Initial answer language; switch later with :language
        #[arg(long, default_value = "English")]
        language: Language,
        /// Directory for synthesized answer audio
        #[arg(long)]
        audio_dir: Option<PathBuf>,
    },
    /// Show the state of the store, the embedding service, and the credential
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Seed { corpus, rebuild } => {
            seed(corpus, rebuild).await?;
        }
        Commands::Ask { question, language } => {
            ask(&question, language).await?;
        }
        Commands::Chat {
            language,
            audio_dir,
        } => {
            chat(language, audio_dir).await?;
        }
        Commands::Status => {
            show_status().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["ramayana-chat", "status"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Status);
        }
    }

    #[test]
    fn ask_command_with_language() {
        let cli = Cli::try_parse_from([
            "ramayana-chat",
            "ask",
            "Who is Rama?",
            "--language",
            "hindi",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ask { question, language } = parsed.command {
                assert_eq!(question, "Who is Rama?");
                assert_eq!(language, Language::Hindi);
            }
        }
    }

    #[test]
    fn ask_defaults_to_english() {
        let cli = Cli::try_parse_from(["ramayana-chat", "ask", "Who is Rama?"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ask { language, .. } = parsed.command {
                assert_eq!(language, Language::English);
            }
        }
    }

    #[test]
    fn ask_rejects_unknown_language() {
        let cli = Cli::try_parse_from([
            "ramayana-chat",
            "ask",
            "Who is Rama?",
            "--language",
            "Latin",
        ]);
        assert!(cli.is_err());
    }

    #[test]
    fn seed_command_flags() {
        let cli = Cli::try_parse_from([
            "ramayana-chat",
            "seed",
            "--corpus",
            "data/passages.json",
            "--rebuild",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Seed { corpus, rebuild } = parsed.command {
                assert_eq!(corpus, Some(PathBuf::from("data/passages.json")));
                assert!(rebuild);
            }
        }
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["ramayana-chat", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["ramayana-chat", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["ramayana-chat", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
