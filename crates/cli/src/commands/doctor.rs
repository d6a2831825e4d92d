//! `vahed doctor`: diagnose configuration and corpus files.

use std::path::Path;
use vahed_config::AppConfig;
use vahed_corpus::{load_documents, CurriculumCorpus};

pub async fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("vahed doctor: system diagnostics");
    println!("================================\n");

    let config = if config_path.exists() {
        match AppConfig::load_with_env(config_path) {
            Ok(config) => {
                println!("  ✅ Config file valid ({})", config_path.display());
                config
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                println!();
                println!("  ⚠️  1 issue(s) found. See above for details.");
                return Ok(());
            }
        }
    } else {
        println!("  ⚠️  No config file at {}, using defaults and environment", config_path.display());
        AppConfig::load_with_env(config_path)?
    };

    let issues = check(&config);

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Print one line per check and return the number of failures.
fn check(config: &AppConfig) -> usize {
    let mut issues = 0;

    if config.api_key_for(&config.provider).is_some() || config.provider_is_keyless() {
        println!("  ✅ Credential available for '{}'", config.provider);
    } else {
        println!("  ❌ No API key for '{}': set api_key or GOOGLE_API_KEY", config.provider);
        issues += 1;
    }

    let router = vahed_providers::build_from_config(config);
    println!("  ✅ Providers registered: {}", router.list().join(", "));
    if router.embedder(config).is_none() {
        println!(
            "  ❌ Embedding provider '{}' is not available",
            config.retrieval.embedding_provider
        );
        issues += 1;
    }

    match &config.corpus.curriculum_path {
        Some(path) => match CurriculumCorpus::load(path) {
            Ok(corpus) => {
                println!(
                    "  ✅ Curriculum file: {} records, {} programs",
                    corpus.len(),
                    corpus.programs().len()
                );
                if corpus.skipped() > 0 {
                    println!("  ⚠️  {} malformed curriculum line(s) skipped", corpus.skipped());
                }
            }
            Err(e) => {
                println!("  ❌ {e}");
                issues += 1;
            }
        },
        None => {
            println!("  ❌ corpus.curriculum_path (or JSONL_FILE) is not set");
            issues += 1;
        }
    }

    match &config.corpus.documents_path {
        Some(path) => match load_documents(path) {
            Ok(docs) => println!("  ✅ Timetable documents: {} sections", docs.len()),
            Err(e) => {
                println!("  ❌ {e}");
                issues += 1;
            }
        },
        None => {
            println!("  ❌ corpus.documents_path (or RAG_FILE) is not set");
            issues += 1;
        }
    }

    issues
}
