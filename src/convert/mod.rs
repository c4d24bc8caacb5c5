//! PDF to EPUB conversion requests
//!
//! Provides the client side of `POST /convert`:
//! - Multipart form assembly with derived `width`/`height` and fallback defaults
//! - Upload progress reported to an injected view
//! - `Content-Disposition` filename extraction
//! - Saving the returned book through a temporary file
//! - One submission in flight per handler

mod disposition;
mod download;
mod handler;
mod types;
mod view;
mod worker;

pub use disposition::{filename_from_disposition, DEFAULT_FILENAME};
pub use download::{safe_file_name, DownloadTarget};
pub use handler::{ConvertHandler, CONVERT_PATH};
pub use types::{
    detail_from_body, ConvertError, ConvertProgress, DownloadedFile, STATUS_BUSY,
    STATUS_CONVERSION_ERROR, STATUS_DONE, STATUS_NETWORK_ERROR, STATUS_UNEXPECTED,
};
pub use view::ConvertView;
