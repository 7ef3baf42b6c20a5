//! Job orchestration: one generation request in, one deck (and outcome
//! record) out.
//!
//! The pipeline sequences introspection, prompting, the completion call,
//! plan parsing, assembly, thumbnail rendering and uploads as a single
//! logical unit of work. It owns no worker scheduling and no persistence:
//! the embedding system runs `run_job` on whatever worker it likes and
//! stores the returned outcome. Nothing here retries, and a failure at a
//! fatal stage aborts the remaining stages.

use crate::assemble::assemble;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::introspect::{TemplateInfo, inspect_template};
use crate::plan::build_plan;
use crate::prompt::build_prompt;
use crate::services::{BlobStore, CompletionClient, TemplateFetcher};
use crate::thumbnail::render_thumbnail;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

const DECK_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
const THUMB_CONTENT_TYPE: &str = "image/png";

/// Title used when a request arrives with a blank one.
const DEFAULT_DECK_TITLE: &str = "Untitled";

/// A deck generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Deck topic and default title
    pub title: String,
    /// Free-form content requirements
    pub prompt: String,
    /// Template reference: an id or URL the fetcher can resolve
    pub template_ref: Option<String>,
    /// Desired number of slides
    pub slide_count: Option<u32>,
    /// Requested visual style, advisory only
    pub style: Option<String>,
}

/// Terminal job states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Generating,
    Success,
    Failed,
}

/// The record a finished job leaves behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub status: JobStatus,
    pub deck_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub generation_time_seconds: u64,
    pub error_message: Option<String>,
}

/// The assembled artifacts of one generation job.
#[derive(Debug, Clone)]
pub struct AssembledDeck {
    /// Final deck bytes
    pub deck: Vec<u8>,
    /// First-slide preview, when rendering succeeded
    pub thumbnail: Option<Vec<u8>>,
}

/// The generation engine, wired to its three collaborators.
pub struct Generator<C, T, B> {
    completion: C,
    templates: T,
    blobs: B,
    config: EngineConfig,
}

impl<C, T, B> Generator<C, T, B>
where
    C: CompletionClient,
    T: TemplateFetcher,
    B: BlobStore,
{
    pub fn new(completion: C, templates: T, blobs: B, config: EngineConfig) -> Self {
        Self { completion, templates, blobs, config }
    }

    /// Run one generation job to completion and report its outcome.
    ///
    /// Never panics or bubbles an error: every failure becomes a `Failed`
    /// outcome with a bounded, human-readable message.
    pub fn run_job(&self, job_id: &str, request: &GenerationRequest) -> JobOutcome {
        info!("generating deck for job {job_id}: '{}'", request.title);
        let started = Instant::now();

        match self.execute(job_id, request) {
            Ok((deck_url, thumbnail_url)) => {
                let elapsed = started.elapsed().as_secs();
                info!("job {job_id} finished in {elapsed}s");
                JobOutcome {
                    status: JobStatus::Success,
                    deck_url: Some(deck_url),
                    thumbnail_url,
                    generation_time_seconds: elapsed,
                    error_message: None,
                }
            },
            Err(e) => {
                error!("job {job_id} failed: {e}");
                JobOutcome {
                    status: JobStatus::Failed,
                    deck_url: None,
                    thumbnail_url: None,
                    generation_time_seconds: started.elapsed().as_secs(),
                    error_message: Some(self.truncate_error(&e.to_string())),
                }
            },
        }
    }

    /// Produce the deck and thumbnail for a request without uploading.
    pub fn generate(&self, request: &GenerationRequest) -> Result<AssembledDeck> {
        let template = self.fetch_template(request);
        let info = template.as_deref().and_then(inspect_template);
        self.synthesize(request, info.as_ref(), template.as_deref())
    }

    fn execute(
        &self,
        job_id: &str,
        request: &GenerationRequest,
    ) -> Result<(String, Option<String>)> {
        let assembled = self.generate(request)?;

        let prefix = &self.config.object_prefix;
        let deck_url =
            self.blobs.upload(&format!("{prefix}/{job_id}.pptx"), &assembled.deck, DECK_CONTENT_TYPE)?;
        let thumbnail_url = match &assembled.thumbnail {
            Some(thumbnail) => Some(self.blobs.upload(
                &format!("{prefix}/{job_id}_thumb.png"),
                thumbnail,
                THUMB_CONTENT_TYPE,
            )?),
            None => None,
        };

        Ok((deck_url, thumbnail_url))
    }

    fn synthesize(
        &self,
        request: &GenerationRequest,
        info: Option<&TemplateInfo>,
        template: Option<&[u8]>,
    ) -> Result<AssembledDeck> {
        let prompt = build_prompt(request, info);
        let raw = self.completion.complete(&prompt)?;

        let desired_slides = self.config.clamp_slide_count(request.slide_count);
        let plan = build_plan(&raw, info, &request.title, desired_slides);

        let title = request.title.trim();
        let title = if title.is_empty() { DEFAULT_DECK_TITLE } else { title };
        let deck = assemble(info, &plan, template, title)?;

        let thumbnail = match render_thumbnail(&deck) {
            Ok(png) => Some(png),
            Err(e) => {
                warn!("thumbnail rendering failed, continuing without one: {e}");
                None
            },
        };

        Ok(AssembledDeck { deck, thumbnail })
    }

    /// Resolve template bytes; any failure degrades to template-less
    /// generation.
    fn fetch_template(&self, request: &GenerationRequest) -> Option<Vec<u8>> {
        let reference = request.template_ref.as_deref()?.trim();
        if reference.is_empty() {
            return None;
        }
        match self.templates.fetch(reference) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("template fetch failed, generating without template: {e}");
                None
            },
        }
    }

    fn truncate_error(&self, message: &str) -> String {
        let limit = self.config.error_message_limit;
        if message.chars().count() <= limit {
            return message.to_string();
        }
        message.chars().take(limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::services::{NoTemplateFetcher, NullBlobStore, StaticCompletionClient};

    struct FailingCompletion;

    impl CompletionClient for FailingCompletion {
        fn complete(&self, _prompt: &str) -> Result<String> {
            Err(Error::Completion("model unavailable".to_string()))
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            title: "AI Trends".to_string(),
            prompt: "history and outlook".to_string(),
            template_ref: None,
            slide_count: Some(2),
            style: None,
        }
    }

    #[test]
    fn test_run_job_success() {
        let response = r#"{"slides":[
            {"layout":"TITLE","title":"AI Trends"},
            {"layout":"TITLE_AND_CONTENT","title":"History","bullets":["1950s","2020s"]}
        ]}"#;
        let generator = Generator::new(
            StaticCompletionClient::new(response),
            NoTemplateFetcher,
            NullBlobStore,
            EngineConfig::default(),
        );

        let outcome = generator.run_job("job1", &request());
        assert_eq!(outcome.status, JobStatus::Success);
        assert_eq!(outcome.deck_url.as_deref(), Some("null://ppt/job1.pptx"));
        assert_eq!(outcome.thumbnail_url.as_deref(), Some("null://ppt/job1_thumb.png"));
        assert!(outcome.error_message.is_none());
    }

    #[test]
    fn test_run_job_failure_is_bounded() {
        let generator = Generator::new(
            FailingCompletion,
            NoTemplateFetcher,
            NullBlobStore,
            EngineConfig { error_message_limit: 10, ..EngineConfig::default() },
        );

        let outcome = generator.run_job("job2", &request());
        assert_eq!(outcome.status, JobStatus::Failed);
        assert!(outcome.deck_url.is_none());
        let message = outcome.error_message.unwrap();
        assert_eq!(message.chars().count(), 10);
    }

    #[test]
    fn test_generate_yields_deck_and_thumbnail() {
        let generator = Generator::new(
            StaticCompletionClient::new("free-form prose\n\nSection\npoint"),
            NoTemplateFetcher,
            NullBlobStore,
            EngineConfig::default(),
        );

        let assembled = generator.generate(&request()).unwrap();
        assert!(!assembled.deck.is_empty());
        assert!(assembled.thumbnail.is_some());
    }
}
