//! Upload-and-download handler
//!
//! One `submit` call is one form submission: reset the view, send the form
//! with progress, save the book or surface an error, re-enable submit.

use log::{debug, info, warn};
use reqwest::{Client, Url};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::download::DownloadTarget;
use super::types::{ConvertError, ConvertProgress, DownloadedFile, STATUS_DONE};
use super::view::ConvertView;
use super::worker::{build_multipart, send_conversion, ProgressCallback};
use crate::form::{prepare_fields, FormData};
use crate::settings::ClientSettings;

pub const CONVERT_PATH: &str = "/convert";

/// Holds the in-flight flag for the lifetime of one submission
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

pub struct ConvertHandler {
    client: Client,
    endpoint: Url,
    target: DownloadTarget,
    view: Arc<dyn ConvertView>,
    in_flight: Arc<AtomicBool>,
}

impl ConvertHandler {
    pub fn new(settings: &ClientSettings, view: Arc<dyn ConvertView>) -> Result<Self, String> {
        Self::with_client(Client::new(), settings, view)
    }

    pub fn with_client(
        client: Client,
        settings: &ClientSettings,
        view: Arc<dyn ConvertView>,
    ) -> Result<Self, String> {
        Ok(Self {
            client,
            endpoint: settings.endpoint(CONVERT_PATH)?,
            target: DownloadTarget::new(settings.output_dir.clone()),
            view,
            in_flight: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Submit `form` converted for the `WxH` preset `profile`.
    ///
    /// While a submission is in flight further calls return
    /// [`ConvertError::Busy`] without touching the view.
    pub async fn submit(
        &self,
        form: &FormData,
        profile: &str,
    ) -> Result<DownloadedFile, ConvertError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("convert_rejected: submission already in flight");
            return Err(ConvertError::Busy);
        };

        self.view.set_status("");
        self.view.show_progress();
        self.view.set_progress(0.0);
        self.view.set_submit_enabled(false);

        let result = self.run(form, profile).await;

        self.view.set_submit_enabled(true);
        match &result {
            Ok(saved) => {
                info!(
                    "convert_saved: {} bytes={}",
                    saved.path.display(),
                    saved.bytes
                );
                self.view.set_status(STATUS_DONE);
            }
            Err(err) => {
                warn!("convert_failed: {} error={}", self.endpoint, err);
                self.view.set_status(&err.user_message());
            }
        }

        result
    }

    async fn run(&self, form: &FormData, profile: &str) -> Result<DownloadedFile, ConvertError> {
        let fields = prepare_fields(form, profile).map_err(ConvertError::Unexpected)?;

        let view = self.view.clone();
        let on_progress: ProgressCallback =
            Arc::new(move |progress: ConvertProgress| view.set_progress(progress.percent));
        let (multipart, total_bytes) = build_multipart(&fields, on_progress)
            .await
            .map_err(ConvertError::Unexpected)?;

        info!(
            "convert_start: {} fields={} total_bytes={}",
            self.endpoint,
            fields.len(),
            total_bytes
        );

        let response = send_conversion(&self.client, &self.endpoint, multipart).await?;

        self.target
            .save(&response.file_name, response.body)
            .await
            .map_err(ConvertError::Unexpected)
    }
}
