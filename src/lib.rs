//! Lyra: turn rough, informally written requests into structured prompts.
//!
//! Lyra collects a rough idea plus a few optional details, assembles them
//! into a fixed-structure prompt document for an external AI assistant, and
//! keeps a CSV log of every generated prompt.
//!
//! # Architecture
//!
//! - **Template**: Optional starter ideas loaded from a CSV table
//! - **Form**: The user's inputs and the render cycle tying everything together
//! - **Prompt**: The pure prompt assembler
//! - **History**: The append-only session log
//! - **Export**: Writing the document out as `.txt` / `.md`
//! - **UI**: The interactive terminal form

pub mod config;
pub mod export;
mod form;
pub mod history;
mod prompt;
pub mod template;
pub mod ui;

pub use config::Config;
pub use form::{ANSWER_SLOTS, DEFAULT_QUESTIONS, FormState, Render, Session};
pub use history::{SessionLog, SessionLogRow};
pub use prompt::{Answers, Mode, TargetAi, build_prompt};
pub use template::{CategoryFilter, Template, TemplateStore};
