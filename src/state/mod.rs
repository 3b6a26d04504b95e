/// State management module
///
/// This module handles all application state, including:
/// - Database connection and queries (library.rs)
/// - Shared data structures (data.rs)
/// - The message-driven controller behind the window (app.rs)

pub mod app;
pub mod data;
pub mod library;
