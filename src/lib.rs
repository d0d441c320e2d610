//! Gamified personal progress tracking over REST and MCP.
//!
//! levelup turns tasks and goals into a role-playing progression: completing a
//! task awards XP scaled by difficulty and goal alignment, XP drives a level
//! curve that grants skill points, related goals advance automatically, and a
//! catalogue of achievements unlocks as milestones are crossed. A local
//! [Ollama](https://ollama.com/) model can propose new tasks.
//!
//! | Difficulty | XP range | Default base XP |
//! |------------|----------|-----------------|
//! | **Easy** | 5-20 | 15 |
//! | **Medium** | 20-35 | 25 |
//! | **Hard** | 35-50 | 40 |
//! | **Expert** | 50-75 | 60 |
//!
//! # Architecture
//!
//! - **Storage**: SQLite (bundled) behind one shared connection
//! - **Transport**: REST via axum, and MCP over stdio or Streamable HTTP at `/mcp`
//! - **Suggestions**: Ollama `/api/generate` with a response cache, a cooldown,
//!   and learned patterns from user feedback
//!
//! # Modules
//!
//! - [`progression`]: pure level, reward, skill, goal-matching and achievement rules
//! - [`tracker`]: persisted profile, tasks, goals, achievements and activity log
//! - [`suggest`]: the language-model task suggestion pipeline
//! - [`api`]: the REST router
//! - [`tools`]: the MCP tool surface
//! - [`config`]: configuration loading from TOML files and environment variables
//! - [`db`]: SQLite initialization, schema, migrations, and health checks

pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod progression;
pub mod server;
pub mod suggest;
pub mod tools;
pub mod tracker;
