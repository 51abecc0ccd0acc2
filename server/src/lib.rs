//! Smellscan: a static-analysis engine for Python source that detects code,
//! structural, and architectural smells across a project's module graph.

pub mod cli;
pub mod models;
pub mod services;
