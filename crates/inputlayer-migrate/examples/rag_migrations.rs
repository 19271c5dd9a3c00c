//! Example: migrations for a RAG document store.
//!
//! Registers document and chunk relations plus an HNSW index, generates
//! the initial migration into a temporary directory, then applies it
//! against a mock executor that prints every command it receives.
//!
//! Run with: cargo run --example rag_migrations -p inputlayer-migrate

use inputlayer_core::executor::{CommandResult, Execute, ExecuteError};
use inputlayer_core::index::{HnswIndex, Metric};
use inputlayer_core::types::{Timestamp, Vector};
use inputlayer_derive::Relation;
use inputlayer_migrate::cli::cmd_makemigrations;
use inputlayer_migrate::executor::migrate;
use inputlayer_migrate::loader::load_migrations;
use inputlayer_migrate::state::ModelSet;

/// A source document.
#[derive(Debug, Clone, Relation)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub ingested_at: Timestamp,
}

/// An embedded chunk of a document.
#[derive(Debug, Clone, Relation)]
pub struct Chunk {
    pub id: i64,
    pub document_id: i64,
    pub text: String,
    #[column(dim = 384)]
    pub embedding: Vector,
}

/// Prints every command instead of talking to a server.
struct PrintingStore;

impl Execute for PrintingStore {
    fn execute(&mut self, program: &str) -> Result<CommandResult, ExecuteError> {
        println!("  -> {program}");
        Ok(CommandResult::empty())
    }
}

fn main() -> anyhow::Result<()> {
    let models = ModelSet::new()
        .relation::<Document>()
        .relation::<Chunk>()
        .index(
            HnswIndex::new::<Chunk>("chunk_embedding_idx", "embedding")
                .metric(Metric::Cosine)
                .ef_search(80),
        );

    let dir = std::env::temp_dir().join("inputlayer-rag-migrations");
    if dir.exists() {
        std::fs::remove_dir_all(&dir)?;
    }

    match cmd_makemigrations(&models, &dir, None)? {
        Some(path) => println!("Wrote {}", path.display()),
        None => println!("No changes detected."),
    }

    let migrations = load_migrations(&dir)?;
    println!("Applying {} migration(s):", migrations.len());
    let mut store = PrintingStore;
    let applied = migrate(&mut store, &migrations, None)?;
    for name in applied {
        println!("  [X] {name}");
    }

    Ok(())
}
