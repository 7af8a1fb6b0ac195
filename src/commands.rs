use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::ProgressBar;
use tracing::info;

use crate::config::{ApiKey, Config};
use crate::corpus::DEFAULT_CORPUS_PATH;
use crate::database::VectorStore;
use crate::embeddings::OllamaClient;
use crate::indexer::Indexer;
use crate::pipeline::Pipeline;
use crate::retrieval::Retriever;
use crate::sarvam::{Language, SarvamClient};
use crate::surface::ChatSession;

/// Seed the vector store from the passage corpus
#[inline]
pub async fn seed(corpus: Option<PathBuf>, rebuild: bool) -> Result<()> {
    let config = Config::load()?;
    let corpus_path = corpus.unwrap_or_else(|| PathBuf::from(DEFAULT_CORPUS_PATH));

    info!("Seeding vector store from {}", corpus_path.display());

    let store = VectorStore::new(&config).await?;
    let mut indexer = Indexer::new(&config, store)?;

    let spinner = spinner("Embedding and storing passages...");
    let stats = indexer.seed(&corpus_path, rebuild).await;
    spinner.finish_and_clear();
    let stats = stats?;

    println!(
        "Seeded {} passages ({} dimensions, model {})",
        stats.passages, stats.dimension, stats.model
    );
    println!("Vector store: {}", config.vector_db_path().display());

    // Quick sanity check so a broken index is caught before chat time
    let store = indexer.into_store();
    let embedder = OllamaClient::new(&config.embedding)?;
    let retriever = Retriever::new(store, embedder, 2);
    match retriever.retrieve("Who is Hanuman?").await {
        Ok(results) if results.is_empty() => {
            println!("Sanity check returned no passages; the store may be empty");
        }
        Ok(results) => {
            println!("Sanity check ('Who is Hanuman?'):");
            for passage in &results {
                let preview: String = passage.metadata.text.chars().take(80).collect();
                println!("  → {} (score {:.3})", preview, passage.score);
            }
        }
        Err(e) => println!("Sanity check failed: {}", e),
    }

    Ok(())
}

/// Ask a single question and print the answer
#[inline]
pub async fn ask(question: &str, language: Language) -> Result<()> {
    let config = Config::load()?;
    let pipeline = build_pipeline(&config).await?;

    let spinner = spinner("Consulting the sage Valmiki...");
    let turn = pipeline.ask(question, language).await;
    spinner.finish_and_clear();
    let turn = turn?;

    println!("{}", turn.answer);

    if turn.language != Language::English {
        println!();
        println!("{}", style("In English:").dim());
        println!("{}", style(&turn.answer_en).dim());
    }

    if turn.passages.is_empty() {
        println!();
        println!(
            "{}",
            style("(no passages found; answered from general knowledge)").dim()
        );
    } else {
        println!();
        println!("{}", style("Sources:").dim());
        for passage in &turn.passages {
            println!(
                "{}",
                style(format!(
                    "  {} — {} (score {:.3})",
                    passage.metadata.topic, passage.metadata.kanda, passage.score
                ))
                .dim()
            );
        }
    }

    Ok(())
}

/// Start an interactive chat session
#[inline]
pub async fn chat(language: Language, audio_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::load()?;
    let audio_dir = audio_dir.unwrap_or_else(|| config.audio_dir_path());

    let pipeline = build_pipeline(&config).await?;
    ChatSession::new(pipeline, language, audio_dir).run().await
}

/// Show the state of the store, the embedding service, and the credential
#[inline]
pub async fn show_status() -> Result<()> {
    let config = Config::load()?;

    println!("Configuration: {}", config.config_file_path().display());
    println!("Vector store:  {}", config.vector_db_path().display());
    println!("Corpus:        {}", DEFAULT_CORPUS_PATH);
    println!();

    let store = VectorStore::new(&config).await?;
    let count = store.count().await?;
    if count == 0 {
        println!("Indexed passages: 0 (run `ramayana-chat seed` first)");
    } else {
        println!("Indexed passages: {}", count);
    }

    let embedder = OllamaClient::new(&config.embedding)?;
    match embedder.ping() {
        Ok(()) => println!(
            "Embedding service: reachable ({}:{})",
            config.embedding.host, config.embedding.port
        ),
        Err(_) => println!(
            "Embedding service: unreachable ({}:{})",
            config.embedding.host, config.embedding.port
        ),
    }

    match ApiKey::from_env() {
        Ok(_) => println!("Sarvam API key: set"),
        Err(e) => println!("Sarvam API key: {}", e),
    }

    Ok(())
}

/// Construct the shared handles for one process: store, embedder, and the
/// Sarvam client. The API key is read here so its absence fails at startup.
async fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let api_key = ApiKey::from_env().context("Startup credential check failed")?;

    let store = VectorStore::new(config).await?;
    let embedder = OllamaClient::new(&config.embedding)?;
    let retriever = Retriever::new(store, embedder, config.retrieval.top_k);
    let sarvam = SarvamClient::new(&config.sarvam, &api_key)?;

    Ok(Pipeline::new(retriever, sarvam, config.generation.clone()))
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner().with_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
