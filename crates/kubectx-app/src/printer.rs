use std::io::{self, Write};

use crossterm::style::{Color, Stylize};
use kubectx_config::AppConfig;

/// Formats user-facing messages, with or without ANSI colors.
#[derive(Debug, Clone)]
pub struct Printer {
    color: bool,
    current_fg: Option<Color>,
    current_bg: Option<Color>,
}

impl Printer {
    pub fn new(color: bool) -> Self {
        Self { color, current_fg: Some(Color::Yellow), current_bg: None }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            color: config.color_enabled(),
            current_fg: parse_color(&config.list.current_fg),
            current_bg: parse_color(&config.list.current_bg),
        }
    }

    pub fn success(&self, w: &mut dyn Write, msg: &str) -> io::Result<()> {
        if self.color {
            writeln!(w, "{} {msg}", "✔".green())
        } else {
            writeln!(w, "✔ {msg}")
        }
    }

    pub fn warning(&self, w: &mut dyn Write, msg: &str) -> io::Result<()> {
        if self.color {
            writeln!(w, "{} {msg}", "warning:".yellow())
        } else {
            writeln!(w, "warning: {msg}")
        }
    }

    pub fn error(&self, w: &mut dyn Write, msg: &str) -> io::Result<()> {
        if self.color {
            writeln!(w, "{} {msg}", "error:".red())
        } else {
            writeln!(w, "error: {msg}")
        }
    }

    /// Wraps a quoted name in the success color, e.g. `"prod"`.
    pub fn name(&self, name: &str) -> String {
        if self.color {
            format!("\"{}\"", name.green())
        } else {
            format!("\"{name}\"")
        }
    }

    /// Renders one line of the context listing.
    pub fn list_entry(&self, name: &str, is_current: bool) -> String {
        if !self.color || !is_current {
            return name.to_string();
        }
        let mut styled = name.bold();
        if let Some(fg) = self.current_fg {
            styled = styled.with(fg);
        }
        if let Some(bg) = self.current_bg {
            styled = styled.on(bg);
        }
        styled.to_string()
    }
}

fn parse_color(raw: &str) -> Option<Color> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match Color::try_from(raw) {
        Ok(color) => Some(color),
        Err(()) => {
            tracing::warn!("unknown color {raw:?}, ignoring");
            None
        }
    }
}
