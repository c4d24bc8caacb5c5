//! Conversion worker - multipart request with upload progress and response decoding

use bytes::Bytes;
use futures_util::StreamExt;
use log::{debug, info, warn};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Url};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use super::disposition::filename_from_disposition;
use super::types::{detail_from_body, ConvertError, ConvertProgress};
use crate::form::{FormData, FormValue};

/// Read size for attachment streaming (64 KB); each chunk produces one progress update
const CHUNK_SIZE: usize = 64 * 1024;

pub(crate) type ProgressCallback = Arc<dyn Fn(ConvertProgress) + Send + Sync>;

/// Successful (200) reply of the conversion service
#[derive(Debug)]
pub(crate) struct ConversionResponse {
    pub file_name: String,
    pub body: Bytes,
}

/// Build the multipart body for `fields`.
///
/// Attachments are streamed from disk; progress is reported over the total
/// attachment size, which is known up front from file metadata.
pub(crate) async fn build_multipart(
    fields: &FormData,
    on_progress: ProgressCallback,
) -> Result<(Form, u64), String> {
    let mut total_bytes = 0u64;
    for (_, value) in fields.iter() {
        if let FormValue::File(file) = value {
            let metadata = tokio::fs::metadata(&file.path)
                .await
                .map_err(|e| format!("Failed to read {}: {}", file.path.display(), e))?;
            total_bytes += metadata.len();
        }
    }

    let sent = Arc::new(AtomicU64::new(0));
    let next_log_percent = Arc::new(AtomicU8::new(10));
    let mut form = Form::new();

    for (name, value) in fields.iter() {
        let part = match value {
            FormValue::Text(text) => Part::text(text.clone()),
            FormValue::File(file) => {
                let handle = File::open(&file.path)
                    .await
                    .map_err(|e| format!("Failed to open {}: {}", file.path.display(), e))?;
                let length = handle
                    .metadata()
                    .await
                    .map_err(|e| format!("Failed to read {}: {}", file.path.display(), e))?
                    .len();

                let sent = sent.clone();
                let next_log_percent = next_log_percent.clone();
                let on_progress = on_progress.clone();
                let stream = ReaderStream::with_capacity(handle, CHUNK_SIZE).map(move |chunk| {
                    let chunk = chunk?;
                    let new_total =
                        sent.fetch_add(chunk.len() as u64, Ordering::SeqCst) + chunk.len() as u64;

                    if let Some(progress) = ConvertProgress::new(new_total, total_bytes) {
                        let threshold = next_log_percent.load(Ordering::SeqCst);
                        if progress.percent >= threshold as f64
                            && next_log_percent
                                .compare_exchange(
                                    threshold,
                                    threshold.saturating_add(10),
                                    Ordering::SeqCst,
                                    Ordering::SeqCst,
                                )
                                .is_ok()
                        {
                            debug!(
                                "convert_upload_progress: percent={} bytes={}",
                                progress.label(),
                                new_total
                            );
                        }
                        on_progress(progress);
                    }

                    Ok::<Bytes, std::io::Error>(chunk)
                });

                Part::stream_with_length(Body::wrap_stream(stream), length)
                    .file_name(file.file_name.clone())
                    .mime_str(&file.mime)
                    .map_err(|e| format!("Invalid MIME type {}: {}", file.mime, e))?
            }
        };
        form = form.part(name.to_string(), part);
    }

    Ok((form, total_bytes))
}

/// POST `form` to `endpoint` and classify the reply.
///
/// Only status 200 counts as success; every other status is a server error
/// carrying the `detail` of its body when one can be read.
pub(crate) async fn send_conversion(
    client: &Client,
    endpoint: &Url,
    form: Form,
) -> Result<ConversionResponse, ConvertError> {
    let response = client
        .post(endpoint.clone())
        .multipart(form)
        .send()
        .await
        .map_err(|e| {
            warn!("convert_request_failed: {} error={}", endpoint, e);
            ConvertError::Network(e.to_string())
        })?;

    let status = response.status();
    let disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let body = response.bytes().await.map_err(|e| {
        warn!("convert_response_failed: {} status={} error={}", endpoint, status, e);
        ConvertError::Network(e.to_string())
    })?;

    info!(
        "convert_response: {} status={} bytes={}",
        endpoint,
        status.as_u16(),
        body.len()
    );

    if status.as_u16() != 200 {
        return Err(ConvertError::Server {
            status: status.as_u16(),
            detail: detail_from_body(&body),
        });
    }

    Ok(ConversionResponse {
        file_name: filename_from_disposition(disposition.as_deref()),
        body,
    })
}
