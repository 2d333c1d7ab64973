use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run(app: &App, id: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let note = app.find_note(id)?;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&note)?);
        return Ok(());
    }

    if use_color {
        println!("{}{}{}", Color::BOLD, note.id, Color::RESET);
    } else {
        println!("{}", note.id);
    }

    let mut meta = format!(
        "{} | created {} | updated {}",
        note.color,
        note.created_at.format("%Y-%m-%d %H:%M"),
        note.updated_at.format("%Y-%m-%d %H:%M")
    );
    if let Some(bounds) = note.bounds() {
        meta.push_str(&format!(
            " | {}x{} at ({}, {})",
            bounds.width, bounds.height, bounds.x, bounds.y
        ));
    }
    if note.is_open {
        meta.push_str(" | open");
    }
    if use_color {
        println!("{}{}{}", Color::DIM, meta, Color::RESET);
    } else {
        println!("{}", meta);
    }

    println!();
    println!("{}", terminal::render_content(&note.content));

    Ok(())
}
