//! `vahed programs`: list the programs in the curriculum file.

use std::path::Path;
use vahed_config::AppConfig;
use vahed_corpus::CurriculumCorpus;

pub async fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config =
        AppConfig::load_with_env(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let path = config
        .corpus
        .curriculum_path
        .ok_or("corpus.curriculum_path (or JSONL_FILE) is not set")?;

    let corpus = CurriculumCorpus::load(&path)?;
    for program in corpus.programs() {
        let courses = corpus
            .records()
            .iter()
            .filter(|r| r.program == program)
            .count();
        println!("  {program} ({courses} courses)");
    }
    if corpus.skipped() > 0 {
        println!();
        println!("  {} malformed line(s) skipped", corpus.skipped());
    }

    Ok(())
}
