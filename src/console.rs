//! Terminal rendition of the conversion view
//!
//! Progress goes to stderr as a redrawn bar, status text to stdout.

use log::debug;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::convert::ConvertView;

const BAR_WIDTH: usize = 30;

#[derive(Debug, Default)]
pub struct ConsoleView {
    progress_visible: AtomicBool,
    bar_drawn: AtomicBool,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConvertView for ConsoleView {
    fn set_status(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        // finish the bar line before printing below it
        if self.bar_drawn.swap(false, Ordering::SeqCst) {
            eprintln!();
        }
        println!("{}", text);
    }

    fn show_progress(&self) {
        self.progress_visible.store(true, Ordering::SeqCst);
    }

    fn set_progress(&self, percent: f64) {
        if !self.progress_visible.load(Ordering::SeqCst) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r{}", render_bar(percent, BAR_WIDTH));
        let _ = stderr.flush();
        self.bar_drawn.store(true, Ordering::SeqCst);
    }

    fn set_submit_enabled(&self, enabled: bool) {
        debug!("submit_enabled: {}", enabled);
    }
}

/// `[#####.....]  50.0%` with `width` cells
pub fn render_bar(percent: f64, width: usize) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    format!(
        "[{}{}] {:>5.1}%",
        "#".repeat(filled),
        ".".repeat(width - filled),
        percent
    )
}
