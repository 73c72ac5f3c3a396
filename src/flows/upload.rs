use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::client::{
    models::{FileReference, PaperFile},
    RemoteService,
};
use crate::flows::UploadError;
use crate::notify::Notifier;

pub const INVALID_TYPE_NOTICE: &str = "Please upload a PDF file.";
pub const UPLOADED_NOTICE: &str = "PDF uploaded successfully. Analyzing paper...";
pub const ANALYZED_NOTICE: &str = "Paper analysis completed!";
pub const FAILED_NOTICE: &str = "Failed to process PDF. Please try again.";
pub const BUSY_NOTICE: &str = "An upload is already in progress.";

/// A paper the backend has accepted and analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPaper {
    pub file_reference: FileReference,
    pub file_name: String,
}

/// Validates a file, uploads it, then asks the backend to analyze it.
///
/// Does not touch the session store; the caller turns an [`UploadedPaper`] into a
/// session.
pub struct UploadFlow {
    service: Arc<dyn RemoteService>,
    notifier: Arc<dyn Notifier>,
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl UploadFlow {
    pub fn new(service: Arc<dyn RemoteService>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            notifier,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub async fn submit(&self, file: &PaperFile) -> Result<UploadedPaper, UploadError> {
        if !file.is_pdf() {
            warn!("Rejected {} with media type {}", file.name, file.media_type);
            self.notifier.error(INVALID_TYPE_NOTICE);
            return Err(UploadError::InvalidFileType(file.name.clone()));
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Ignoring {} while another upload is running", file.name);
            self.notifier.error(BUSY_NOTICE);
            return Err(UploadError::AlreadyUploading);
        }
        let _busy = BusyGuard(&self.busy);

        let file_reference = match self.service.submit_file(file).await {
            Ok(reference) => reference,
            Err(e) => {
                warn!("Upload of {} failed: {}", file.name, e);
                self.notifier.error(FAILED_NOTICE);
                return Err(UploadError::UploadFailed(e));
            }
        };
        self.notifier.success(UPLOADED_NOTICE);

        // The file now exists server-side even if analysis fails; nothing is rolled back.
        if let Err(e) = self.service.request_analysis(&file_reference).await {
            warn!("Analysis of {} failed: {}", file_reference, e);
            self.notifier.error(FAILED_NOTICE);
            return Err(UploadError::AnalysisFailed { file_reference, source: e });
        }
        self.notifier.success(ANALYZED_NOTICE);

        info!("{} is ready as {}", file.name, file_reference);
        Ok(UploadedPaper {
            file_reference,
            file_name: file.name.clone(),
        })
    }
}
