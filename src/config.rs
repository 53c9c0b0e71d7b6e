//! Configuration for an extraction run.
//!
//! Every knob lives in [`ExtractConfig`], built through
//! [`ExtractConfigBuilder`]. The defaults reproduce the canonical run: fetch
//! the 2025 document with `curl`, write everything under `data/`.

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Published list of minimum points of qualified candidates, 2025 intake.
pub const DEFAULT_PDF_URL: &str = "https://edukacja.um.warszawa.pl/documents/66399/127344221/Minimalna%2Bliczba%2Bpunkt%C3%B3w_zakwalifikowani_2025.pdf";

/// Default working directory for the downloaded PDF, text dump and JSON.
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PDF_FILE: &str = "minimalne-punkty-2025.pdf";
pub const DEFAULT_TEXT_FILE: &str = "source.txt";
pub const DEFAULT_JSON_FILE: &str = "schools-2025.json";

/// Configuration for a fetch → convert → parse → write run.
///
/// # Example
/// ```rust
/// use warsaw_minpoints::{ExtractConfig, FetchBackend};
///
/// let config = ExtractConfig::builder()
///     .data_dir("/tmp/minpoints")
///     .fetcher(FetchBackend::Http)
///     .pretty(true)
///     .build()
///     .unwrap();
/// assert!(config.json_path().ends_with("schools-2025.json"));
/// ```
#[derive(Clone)]
pub struct ExtractConfig {
    /// URL of the PDF document.
    pub url: String,

    /// Directory holding the PDF, the text dump and (by default) the JSON.
    pub data_dir: PathBuf,

    /// File name of the downloaded PDF inside `data_dir`.
    pub pdf_file: String,

    /// File name of the text dump inside `data_dir`.
    pub text_file: String,

    /// Output JSON path. `None` means `data_dir/schools-2025.json`.
    pub output: Option<PathBuf>,

    /// How the PDF is fetched. Default: [`FetchBackend::Curl`].
    pub fetcher: FetchBackend,

    /// `curl` executable. Default: `curl`.
    pub curl_program: String,

    /// `pdftotext` executable. Default: `pdftotext`.
    pub pdftotext_program: String,

    /// Timeout for the in-process HTTP backend, seconds. `None` waits forever.
    ///
    /// `curl` runs to completion; this only applies to [`FetchBackend::Http`].
    pub download_timeout_secs: Option<u64>,

    /// Accept invalid TLS certificates. Default: true.
    ///
    /// The city server has shipped an incomplete chain before; the `curl`
    /// backend passes `-k` when this is set.
    pub accept_invalid_certs: bool,

    /// Pretty-print the JSON output. Default: false (single line).
    pub pretty: bool,

    /// Optional progress callback fired at each stage boundary.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PDF_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            pdf_file: DEFAULT_PDF_FILE.to_string(),
            text_file: DEFAULT_TEXT_FILE.to_string(),
            output: None,
            fetcher: FetchBackend::default(),
            curl_program: "curl".to_string(),
            pdftotext_program: "pdftotext".to_string(),
            download_timeout_secs: None,
            accept_invalid_certs: true,
            pretty: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractConfig")
            .field("url", &self.url)
            .field("data_dir", &self.data_dir)
            .field("pdf_file", &self.pdf_file)
            .field("text_file", &self.text_file)
            .field("output", &self.output)
            .field("fetcher", &self.fetcher)
            .field("curl_program", &self.curl_program)
            .field("pdftotext_program", &self.pdftotext_program)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("pretty", &self.pretty)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractConfig {
    /// Create a new builder for `ExtractConfig`.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder {
            config: Self::default(),
        }
    }

    /// Path of the downloaded PDF.
    pub fn pdf_path(&self) -> PathBuf {
        self.data_dir.join(&self.pdf_file)
    }

    /// Path of the text dump produced by `pdftotext`.
    pub fn text_path(&self) -> PathBuf {
        self.data_dir.join(&self.text_file)
    }

    /// Path of the JSON output.
    pub fn json_path(&self) -> PathBuf {
        match self.output {
            Some(ref p) => p.clone(),
            None => self.data_dir.join(DEFAULT_JSON_FILE),
        }
    }
}

/// Builder for [`ExtractConfig`].
#[derive(Debug)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    pub fn data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.data_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn pdf_file(mut self, name: impl Into<String>) -> Self {
        self.config.pdf_file = name.into();
        self
    }

    pub fn text_file(mut self, name: impl Into<String>) -> Self {
        self.config.text_file = name.into();
        self
    }

    pub fn output(mut self, path: impl AsRef<Path>) -> Self {
        self.config.output = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn fetcher(mut self, backend: FetchBackend) -> Self {
        self.config.fetcher = backend;
        self
    }

    pub fn curl_program(mut self, program: impl Into<String>) -> Self {
        self.config.curl_program = program.into();
        self
    }

    pub fn pdftotext_program(mut self, program: impl Into<String>) -> Self {
        self.config.pdftotext_program = program.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = Some(secs);
        self
    }

    pub fn accept_invalid_certs(mut self, v: bool) -> Self {
        self.config.accept_invalid_certs = v;
        self
    }

    pub fn pretty(mut self, v: bool) -> Self {
        self.config.pretty = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractConfig, ExtractError> {
        let c = &self.config;
        if !(c.url.starts_with("http://") || c.url.starts_with("https://")) {
            return Err(ExtractError::InvalidConfig(format!(
                "URL must be http:// or https://, got '{}'",
                c.url
            )));
        }
        for (field, value) in [("pdf_file", &c.pdf_file), ("text_file", &c.text_file)] {
            if value.trim().is_empty() {
                return Err(ExtractError::InvalidConfig(format!(
                    "{field} must not be empty"
                )));
            }
        }
        for (field, value) in [
            ("curl_program", &c.curl_program),
            ("pdftotext_program", &c.pdftotext_program),
        ] {
            if value.trim().is_empty() {
                return Err(ExtractError::InvalidConfig(format!(
                    "{field} must not be empty"
                )));
            }
        }
        if c.download_timeout_secs == Some(0) {
            return Err(ExtractError::InvalidConfig(
                "download timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How the PDF is retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FetchBackend {
    /// Run the external `curl` client (`-L`, optionally `-k`). (default)
    #[default]
    Curl,
    /// Download in-process with reqwest.
    Http,
}
