use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let config = app.config.load();
    let redacted = config.redacted();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&redacted)?);
        }
        OutputFormat::Plain => {
            println!("Data directory:   {}", app.data_dir.display());
            println!("Notes file:       {}", app.notes.notes_path().display());
            println!("Onboarding done:  {}", redacted.onboarding_complete);
            println!("Dark mode:        {}", redacted.dark_mode);
            println!("Confirm delete:   {}", redacted.confirm_delete);
            match &redacted.user {
                Some(user) => println!(
                    "Signed in as:     {}",
                    user.email.as_deref().unwrap_or(&user.id)
                ),
                None => println!("Signed in as:     (signed out)"),
            }
            println!("API base:         {}", app.cloud_settings().api_base);
        }
    }

    Ok(())
}
