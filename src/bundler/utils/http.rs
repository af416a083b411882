//! HTTP utilities for downloading bundler tools.

use crate::bundler::error::{ErrorExt, Result};
use futures_lite::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Streams the body of `url` into `dest`.
///
/// The body is written to `<dest>.part` and renamed into place only after
/// the whole response arrived, so `dest` either holds a complete download
/// or does not exist.
pub async fn download_to_file(url: &str, dest: &Path) -> Result<u64> {
    log::info!("Downloading {}", url);

    let response = reqwest::get(url).await?.error_for_status()?;

    let part = partial_path(dest);
    let result = write_body(response, &part).await;

    match result {
        Ok(written) => {
            tokio::fs::rename(&part, dest)
                .await
                .fs_context("moving download into place", dest)?;
            Ok(written)
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&part).await;
            Err(e)
        }
    }
}

async fn write_body(response: reqwest::Response, part: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(part)
        .await
        .fs_context("creating download file", part)?;

    let mut written = 0u64;
    let mut stream = std::pin::pin!(response.bytes_stream());
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .fs_context("writing download", part)?;
        written += chunk.len() as u64;
    }

    file.flush().await.fs_context("flushing download", part)?;
    Ok(written)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}
