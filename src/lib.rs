//! Client for the Manga PDF to Kindle EPUB conversion service.
//!
//! Uploads a PDF with its conversion options to `POST /convert`, reports
//! upload progress and saves the returned EPUB.

pub mod console;
pub mod convert;
pub mod form;
pub mod health;
pub mod settings;

pub use convert::{ConvertError, ConvertHandler, ConvertView, DownloadedFile};
pub use form::{FileField, FormData, FormValue, Profile};
pub use settings::ClientSettings;
