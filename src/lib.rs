//! Pitaya - template-driven slide deck synthesis
//!
//! Pitaya turns a slide-deck template (a zip+XML presentation container)
//! plus free-form model text into a finished deck and a preview thumbnail.
//! The engine introspects the template's layout and placeholder
//! vocabulary, builds the model prompt from that description, parses the
//! model's semi-structured reply back into a content plan, and surgically
//! mutates the document tree so the template's visual identity survives.
//!
//! # Pipeline
//!
//! Introspect → prompt → complete → parse → assemble → render → upload,
//! one logical unit of work per generation request:
//!
//! ```no_run
//! use pitaya::config::EngineConfig;
//! use pitaya::pipeline::{GenerationRequest, Generator};
//! use pitaya::services::{NoTemplateFetcher, NullBlobStore, StaticCompletionClient};
//!
//! let generator = Generator::new(
//!     StaticCompletionClient::new(r#"{"slides":[{"layout":"TITLE","title":"Hello"}]}"#),
//!     NoTemplateFetcher,
//!     NullBlobStore,
//!     EngineConfig::default(),
//! );
//!
//! let request = GenerationRequest {
//!     title: "Hello".to_string(),
//!     prompt: "One-slide demo".to_string(),
//!     template_ref: None,
//!     slide_count: None,
//!     style: None,
//! };
//! let outcome = generator.run_job("demo", &request);
//! println!("deck at {:?}", outcome.deck_url);
//! ```
//!
//! # Working with templates directly
//!
//! The stages are plain functions and can be driven individually:
//!
//! ```no_run
//! let template = std::fs::read("template.pptx")?;
//! if let Some(info) = pitaya::introspect::inspect_template(&template) {
//!     println!("{} layouts, {} placeholders", info.layouts.len(), info.placeholders.len());
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

/// Open Packaging Conventions container handling (zip, parts,
/// relationships).
pub mod opc;

/// PowerPoint presentation parts, shape analysis, and text-body mutation.
pub mod pptx;

/// Crate-level error types.
pub mod error;

/// Engine configuration.
pub mod config;

/// Shared XML text utilities.
pub mod xmlutil;

/// `{{ name }}` token scanning.
pub mod placeholder;

/// Template introspection into a `TemplateInfo` description.
pub mod introspect;

/// Prompt construction for the completion service.
pub mod prompt;

/// Content plan parsing, with deterministic fallback.
pub mod plan;

/// Deck assembly in placeholder and layout modes.
pub mod assemble;

/// First-slide thumbnail rendering.
pub mod thumbnail;

/// Collaborator service interfaces (completion, template fetch, upload).
pub mod services;

/// Job orchestration.
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testkit;

// Re-export the types most embedders touch
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use introspect::{TemplateInfo, inspect_template};
pub use pipeline::{AssembledDeck, GenerationRequest, Generator, JobOutcome, JobStatus};
pub use plan::ContentPlan;
