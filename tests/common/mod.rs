#![allow(dead_code)]

use manga2epub_lib::{ClientSettings, ConvertView};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Status(String),
    ShowProgress,
    Progress(f64),
    SubmitEnabled(bool),
}

/// View that remembers every call in order
#[derive(Debug, Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<f64> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Progress(percent) => Some(percent),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|event| match event {
            ViewEvent::Status(text) => Some(text),
            _ => None,
        })
    }

    pub fn submit_enabled(&self) -> Option<bool> {
        self.events().into_iter().rev().find_map(|event| match event {
            ViewEvent::SubmitEnabled(enabled) => Some(enabled),
            _ => None,
        })
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ConvertView for RecordingView {
    fn set_status(&self, text: &str) {
        self.push(ViewEvent::Status(text.to_string()));
    }

    fn show_progress(&self) {
        self.push(ViewEvent::ShowProgress);
    }

    fn set_progress(&self, percent: f64) {
        self.push(ViewEvent::Progress(percent));
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.push(ViewEvent::SubmitEnabled(enabled));
    }
}

pub fn settings_for(server: &str, output_dir: &Path) -> ClientSettings {
    ClientSettings {
        server: server.to_string(),
        output_dir: output_dir.to_path_buf(),
        ..ClientSettings::default()
    }
}

/// Small fake PDF of `size` bytes
pub fn write_pdf(dir: &Path, name: &str, size: usize) -> PathBuf {
    let mut data = b"%PDF-1.4\n".to_vec();
    data.resize(size.max(data.len()), b'a');
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

/// Text parts of a multipart body, in order; file parts are skipped
pub fn text_fields(body: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(body);
    let delimiter = text.lines().next().unwrap_or_default().trim_end().to_string();
    assert!(delimiter.starts_with("--"), "not a multipart body");

    text.split(delimiter.as_str())
        .filter_map(|part| {
            let part = part.strip_prefix("\r\n")?;
            let (headers, value) = part.split_once("\r\n\r\n")?;
            if headers.contains("filename=") {
                return None;
            }
            let name = headers.split("name=\"").nth(1)?.split('"').next()?;
            let value = value.strip_suffix("\r\n").unwrap_or(value);
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

pub fn field<'a>(fields: &'a [(String, String)], name: &str) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(n, _)| n == name)
        .map(|(_, value)| value.as_str())
        .collect()
}
