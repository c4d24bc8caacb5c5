//! Form field set sent to the conversion service
//!
//! Mirrors a browser `FormData`: an ordered multimap where `append` keeps
//! earlier entries and `set` collapses every entry of a name into one.

use std::fmt;
use std::path::{Path, PathBuf};

/// Fields that get a fixed value when left blank, in the order they are checked
pub const FALLBACK_DEFAULTS: [(&str, &str); 3] = [
    ("jpeg_quality", "80"),
    ("title", "My Manga"),
    ("rtl", "on"),
];

/// Device preset used when none is configured (Kindle Paperwhite)
pub const DEFAULT_PROFILE: &str = "1264x1680";

/// Field name the PDF attachment travels under
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, PartialEq)]
pub struct FileField {
    pub path: PathBuf,
    pub file_name: String,
    pub mime: String,
}

impl FileField {
    /// Attachment for a file on disk, named after its last path component
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = guess_mime(&path).to_string();
        Self {
            path,
            file_name,
            mime,
        }
    }
}

fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File(FileField),
}

impl FormValue {
    /// Absent-or-empty test used for the fallback defaults; attachments always count as set
    pub fn is_blank(&self) -> bool {
        match self {
            FormValue::Text(text) => text.is_empty(),
            FormValue::File(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            FormValue::File(_) => None,
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<FileField> for FormValue {
    fn from(value: FileField) -> Self {
        FormValue::File(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace every entry named `name` with a single one, keeping the position
    /// of the first occurrence (or appending when the name is new).
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter().position(|(n, _)| *n == name) {
            Some(first) => {
                self.entries[first].1 = value;
                let mut index = 0;
                self.entries.retain(|(n, _)| {
                    let keep = index <= first || *n != name;
                    index += 1;
                    keep
                });
            }
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FormValue> + 'a {
        self.entries
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn is_blank(&self, name: &str) -> bool {
        self.get(name).map_or(true, FormValue::is_blank)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fill `jpeg_quality`, `title` and `rtl` when blank. Running it twice changes nothing.
    pub fn apply_fallback_defaults(&mut self) {
        for (name, default) in FALLBACK_DEFAULTS {
            if self.is_blank(name) {
                self.set(name, default);
            }
        }
    }
}

/// Target resolution parsed from a `WxH` preset value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile {
    pub width: f64,
    pub height: f64,
}

impl Profile {
    /// Split on a literal `x` and read the first two parts as numbers.
    /// Parts past the second are ignored.
    pub fn parse(value: &str) -> Result<Self, String> {
        let mut parts = value.split('x');
        let width = parse_dimension(parts.next(), "width", value)?;
        let height = parse_dimension(parts.next(), "height", value)?;
        Ok(Self { width, height })
    }

    pub fn width_field(&self) -> String {
        format_number(self.width)
    }

    pub fn height_field(&self) -> String {
        format_number(self.height)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width_field(), self.height_field())
    }
}

fn parse_dimension(part: Option<&str>, label: &str, profile: &str) -> Result<f64, String> {
    let raw = part
        .map(str::trim)
        .ok_or_else(|| format!("Profile '{}' has no {}", profile, label))?;
    // blank reads as zero, like `Number("")`
    if raw.is_empty() {
        return Ok(0.0);
    }
    let number: f64 = raw
        .parse()
        .map_err(|_| format!("Profile '{}' has a non-numeric {}: {}", profile, label, raw))?;
    if !number.is_finite() {
        return Err(format!("Profile '{}' has a non-finite {}", profile, label));
    }
    Ok(number)
}

/// Integral values print without a fractional part, like `String(Number(..))`
fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Copy of `form` with the derived `width`/`height` appended and the fallback defaults applied
pub fn prepare_fields(form: &FormData, profile: &str) -> Result<FormData, String> {
    let profile = Profile::parse(profile)?;
    let mut fields = form.clone();
    fields.append("width", profile.width_field());
    fields.append("height", profile.height_field());
    fields.apply_fallback_defaults();
    Ok(fields)
}
