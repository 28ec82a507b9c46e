use anyhow::Result;
use inquire::{Confirm, Editor, Text};

/// Prompts for a new team name and its roster
pub fn prompt_new_team() -> Result<(String, String)> {
    let name = Text::new("Team name:").prompt()?;

    // One member per line
    let roster = Editor::new("Members (one per line):").prompt()?;

    Ok((name, roster))
}

/// Prompts for a competence description
pub fn prompt_new_competence() -> Result<String> {
    Ok(Text::new("Description:").prompt()?)
}

/// Asks for confirmation, defaulting to no
pub fn confirm(message: &str) -> Result<bool> {
    Ok(Confirm::new(message).with_default(false).prompt()?)
}
