//! UI surfaces a conversion drives
//!
//! The handler never looks these up itself; whoever owns the screen (terminal,
//! webview bridge, test recorder) passes an implementation in.

pub trait ConvertView: Send + Sync {
    /// Replace the status text; an empty string clears it
    fn set_status(&self, text: &str);

    /// Make the progress indicator visible
    fn show_progress(&self);

    /// Fill the progress indicator to `percent` (0..=100, one decimal place)
    fn set_progress(&self, percent: f64);

    fn set_submit_enabled(&self, enabled: bool);
}
