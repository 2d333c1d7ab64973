use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run(app: &App, only_open: bool, format: &OutputFormat, use_color: bool) -> Result<()> {
    let notes: Vec<_> = app
        .load_notes()?
        .into_iter()
        .filter(|n| !only_open || n.is_open)
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&notes)?);
        }
        OutputFormat::Plain => {
            if notes.is_empty() {
                println!("(no notes)");
            }
            for note in &notes {
                let open = if note.is_open { "*" } else { " " };
                let id = short_id(&note.id);
                let updated = note.updated_at.format("%Y-%m-%d %H:%M");
                let preview = note.preview(60);
                if use_color {
                    println!(
                        "{} {}{}{} {}{:<8}{} {}{}{}  {}",
                        open,
                        Color::DIM,
                        id,
                        Color::RESET,
                        terminal::note_color(note.color),
                        note.color,
                        Color::RESET,
                        Color::GRAY,
                        updated,
                        Color::RESET,
                        preview
                    );
                } else {
                    println!("{} {} {:<8} {}  {}", open, id, note.color, updated, preview);
                }
            }
        }
    }

    Ok(())
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
