//! Fetch stage: put the remote PDF at `config.pdf_path()`.
//!
//! Two backends:
//!
//! * [`FetchBackend::Curl`] shells out to `curl -L [-k] -o <pdf> <url>`.
//!   A non-zero exit aborts with curl's captured output.
//! * [`FetchBackend::Http`] downloads in-process with reqwest and writes the
//!   body in one go.
//!
//! Either way the file is checked for the `%PDF` magic before the run moves
//! on, so an HTML error page never reaches `pdftotext`.

use crate::config::{ExtractConfig, FetchBackend};
use crate::error::ExtractError;
use crate::pipeline::command;
use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Download `config.url` to `config.pdf_path()` and return that path.
pub async fn fetch_pdf(config: &ExtractConfig) -> Result<PathBuf, ExtractError> {
    let pdf_path = config.pdf_path();
    super::ensure_parent(&pdf_path).await?;

    info!("Downloading PDF from: {}", config.url);
    match config.fetcher {
        FetchBackend::Curl => {
            let args = curl_args(&config.url, &pdf_path, config.accept_invalid_certs);
            command::run(&config.curl_program, &args).await?;
        }
        FetchBackend::Http => download_http(config, &pdf_path).await?,
    }

    check_pdf_magic(&pdf_path)?;
    info!("Downloaded to: {}", pdf_path.display());
    Ok(pdf_path)
}

/// Arguments for `curl`: follow redirects, optionally skip TLS verification.
pub fn curl_args(url: &str, dest: &Path, insecure: bool) -> Vec<OsString> {
    let flags = if insecure { "-Lk" } else { "-L" };
    vec![
        OsString::from(flags),
        OsString::from("-o"),
        dest.as_os_str().to_os_string(),
        OsString::from(url),
    ]
}

async fn download_http(config: &ExtractConfig, dest: &Path) -> Result<(), ExtractError> {
    let url = config.url.as_str();

    let mut builder =
        reqwest::Client::builder().danger_accept_invalid_certs(config.accept_invalid_certs);
    if let Some(secs) = config.download_timeout_secs {
        builder = builder.timeout(std::time::Duration::from_secs(secs));
    }
    let client = builder.build().map_err(|e| ExtractError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let map_send_err = |e: reqwest::Error| {
        if e.is_timeout() {
            ExtractError::DownloadTimeout {
                url: url.to_string(),
                secs: config.download_timeout_secs.unwrap_or_default(),
            }
        } else {
            ExtractError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(map_send_err)?;

    if !response.status().is_success() {
        return Err(ExtractError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(map_send_err)?;
    debug!("Received {} bytes", bytes.len());

    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })
}

/// Fail with [`ExtractError::NotAPdf`] unless the file starts with `%PDF`.
///
/// Files shorter than four bytes are left to `pdftotext` to reject.
pub fn check_pdf_magic(path: &Path) -> Result<(), ExtractError> {
    let mut f = std::fs::File::open(path).map_err(|e| ExtractError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut magic = [0u8; 4];
    if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
        return Err(ExtractError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curl_args_follow_redirects_and_skip_tls_check() {
        let args = curl_args("https://example.com/a.pdf", Path::new("data/a.pdf"), true);
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, ["-Lk", "-o", "data/a.pdf", "https://example.com/a.pdf"]);
    }

    #[test]
    fn curl_args_strict_tls() {
        let args = curl_args("https://example.com/a.pdf", Path::new("a.pdf"), false);
        assert_eq!(args[0], OsString::from("-L"));
    }

    #[test]
    fn magic_accepts_pdf_and_rejects_html() {
        let dir = tempfile::tempdir().unwrap();

        let pdf = dir.path().join("ok.pdf");
        std::fs::write(&pdf, b"%PDF-1.7\n...").unwrap();
        assert!(check_pdf_magic(&pdf).is_ok());

        let html = dir.path().join("bad.pdf");
        std::fs::write(&html, b"<html><body>404</body></html>").unwrap();
        match check_pdf_magic(&html) {
            Err(ExtractError::NotAPdf { magic, .. }) => assert_eq!(&magic, b"<htm"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn magic_on_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_pdf_magic(&dir.path().join("nope.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::ReadFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_curl_aborts_with_command_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExtractConfig::builder()
            .data_dir(dir.path())
            .curl_program("false")
            .build()
            .unwrap();
        let err = fetch_pdf(&config).await.unwrap_err();
        assert!(matches!(err, ExtractError::CommandFailed { .. }), "got {err:?}");
    }
}
