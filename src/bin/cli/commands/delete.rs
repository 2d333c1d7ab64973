use anyhow::{Context, Result};

use ghost_notes_lib::sync::{push_tombstone, CloudClient};

use crate::app::App;

pub fn run(app: &App, id: &str, local_only: bool) -> Result<()> {
    let note = app.find_note(id)?;
    app.notes.remove(&note.id);
    println!("Deleted {}", note.id);

    if local_only || !app.config.load().is_authenticated() {
        return Ok(());
    }

    let client = CloudClient::new(&app.cloud_settings().api_base)?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    match runtime.block_on(push_tombstone(&client, &app.config, &note.id)) {
        Ok(()) => println!("Tombstone pushed"),
        // Local delete stands either way
        Err(e) => eprintln!("Cloud delete failed: {}", e),
    }

    Ok(())
}
