use std::sync::OnceLock;

use ghost_notes_lib::notes::NoteColor;
use regex::Regex;

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const GRAY: &str = "\x1b[90m";
    pub const PINK: &str = "\x1b[95m";
}

/// Closest ANSI color for a note theme
pub fn note_color(color: NoteColor) -> &'static str {
    match color {
        NoteColor::Yellow => Color::YELLOW,
        NoteColor::Green => Color::GREEN,
        NoteColor::Pink => Color::PINK,
        NoteColor::Purple => Color::MAGENTA,
        NoteColor::Blue => Color::BLUE,
        NoteColor::Gray | NoteColor::Charcoal => Color::GRAY,
    }
}

fn block_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|blockquote|pre)>").expect("valid regex")
    })
}

fn list_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<li[^>]*>").expect("valid regex"))
}

/// Render the editor's markup as plain terminal text
pub fn render_content(html: &str) -> String {
    let text = block_break().replace_all(html, "\n");
    let text = list_item().replace_all(&text, "\n  - ");
    let text = strip_html(&text);

    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let mut out = lines.join("\n").trim().to_string();
    if out.is_empty() {
        out.push_str("(empty)");
    }
    out
}

/// Strip HTML tags and decode entities
fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;

    for ch in html.chars() {
        if ch == '<' {
            in_tag = true;
        } else if ch == '>' {
            in_tag = false;
        } else if !in_tag {
            result.push(ch);
        }
    }

    result
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
