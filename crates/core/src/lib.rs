//! Browser-driven bulk document download.
//!
//! `docgrab` drives a real browser to a document portal, selects every
//! document, triggers the portal's bulk "download selected" action, waits for
//! the archive through download lifecycle events, extracts it and removes the
//! archive.
//!
//! # Example
//!
//! ```ignore
//! use docgrab::{Pipeline, PipelineConfig, chrome::ChromeLauncher};
//!
//! let config = PipelineConfig::default().with_output_dir("downloads");
//! let launcher = ChromeLauncher::new(config.browser.clone());
//! let report = Pipeline::new(config, launcher).run().await?;
//! println!("{} files", report.extracted.files);
//! ```
//!
//! # Layout
//!
//! - [`browser`]: the [`BrowserSession`]/[`SessionFactory`] boundary and [`Selector`]
//! - [`chrome`]: the Chrome DevTools Protocol backend
//! - [`download`]: download events and the completion listener
//! - [`orchestrator`]: session lifecycle and page driving under a deadline
//! - [`extract`]: zip extraction with containment checks
//! - [`cleanup`]: archive removal
//! - [`pipeline`]: stage sequencing

pub mod browser;
pub mod chrome;
pub mod cleanup;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod pipeline;

pub use browser::{BrowserSession, Selector, SessionFactory};
pub use config::{BrowserOptions, PagePlan, PipelineConfig};
pub use download::{DownloadEvent, DownloadState};
pub use error::{Error, Result};
pub use extract::{ExtractReport, extract_archive};
pub use orchestrator::Orchestrator;
pub use pipeline::{Pipeline, RunReport, RunState, Stage, StageError};
