//! CLI `doctor` command: database diagnostics, model reachability, and a health report.

use anyhow::{Context, Result};

use crate::config::LevelupConfig;
use crate::db;
use crate::suggest::OllamaGenerator;

/// Run diagnostics and print a health report.
pub async fn doctor(config: &LevelupConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `levelup serve` or `levelup mcp` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path)
        .map(|m| m.len())
        .unwrap_or(0);

    let conn = db::open_database(&db_path)
        .context("failed to open database (may be corrupt)")?;

    let report = db::check_database_health(&conn)
        .context("failed to run health check")?;

    let ollama_up = OllamaGenerator::new(&config.llm)?.is_reachable().await;

    println!("levelup Health Report");
    println!("=====================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!();
    println!("Ollama:            {}", config.llm.base_url);
    if ollama_up {
        println!("  Status:          reachable");
    } else {
        println!("  Status:          UNREACHABLE (suggestions will use the fallback task)");
    }
    println!("  Balanced model:  {}", config.llm.balanced_model);
    println!("  Creative model:  {}", config.llm.creative_model);
    println!("  Analytical:      {}", config.llm.analytical_model);
    println!("  Fast model:      {}", config.llm.fast_model);
    println!();
    println!("Row counts:");
    println!("  Tasks:           {}", report.task_count);
    println!("  Goals:           {}", report.goal_count);
    println!("  Achievements:    {}", report.achievement_count);
    println!("  Activity log:    {}", report.log_count);
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db ~/.levelup/levelup.db");
        println!("  2. Or start over: levelup reset");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
