//! Console status lines shown to the user. Diagnostics go through `tracing` instead.

use console::style;

pub fn banner() {
    println!("SharePoint/Stream Video Downloader using a headless browser and yt-dlp");
    println!("-----------------------------------------------------------------------");
}

/// Plain progress line.
pub fn status(message: impl AsRef<str>) {
    println!("{}", message.as_ref());
}

pub fn success(message: impl AsRef<str>) {
    println!("{}", style(message.as_ref()).green());
}

pub fn warning(message: impl AsRef<str>) {
    println!("{}", style(message.as_ref()).yellow());
}

pub fn error(message: impl AsRef<str>) {
    eprintln!("{} {}", style("Error:").red().bold(), style(message.as_ref()).red());
}

/// Relayed downloader stdout.
pub fn tool_output(tool: &str, line: &str) {
    println!("[{}] {}", tool, line);
}

/// Relayed downloader stderr.
pub fn tool_error(tool: &str, line: &str) {
    println!("{}", style(format!("[{} ERR] {}", tool, line)).yellow());
}

/// First `max` characters of a long URL, with an ellipsis.
pub fn preview(text: &str, max: usize) -> String {
    let mut short: String = text.chars().take(max).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use super::preview;

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("ab", 100), "ab...");
        assert_eq!(preview("ééé", 2), "éé...");
    }
}
