use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::session::Session;

/// Export the session to pretty-printed JSON
pub fn export_json(session: &Session) -> Result<String> {
    serde_json::to_string_pretty(&session.to_data()).context("Failed to serialize session to JSON")
}

/// Render a Markdown competence matrix using current names
pub fn export_markdown(session: &Session) -> String {
    let mut output = String::new();
    output.push_str("# Competence Matrix\n\n");

    output.push_str("## Competences\n\n");
    if session.competences().is_empty() {
        output.push_str("_No competences._\n\n");
    }
    for competence in session.competences() {
        output.push_str(&format!("### {}\n\n", competence));
        if competence.linked_to.is_empty() {
            output.push_str("_Not held by anyone._\n\n");
            continue;
        }
        for entry in &competence.linked_to {
            let team_name = session
                .team(entry.team)
                .map(|t| t.name.as_str())
                .unwrap_or("?");
            output.push_str(&format!("- **{} : {}**\n", entry.team, team_name));
            for member in &entry.members {
                match session.member(member) {
                    Some(m) => output.push_str(&format!("  - {}\n", m)),
                    None => output.push_str(&format!("  - {}\n", member)),
                }
            }
        }
        output.push('\n');
    }

    output.push_str("## Teams\n\n");
    if session.teams().is_empty() {
        output.push_str("_No teams._\n");
    }
    for team in session.teams() {
        output.push_str(&format!("### {}\n\n", team));
        for member in &team.members {
            let held: Vec<String> = session
                .competences_held_by(&[member.id])
                .into_iter()
                .filter_map(|id| session.competence(id))
                .map(|c| c.description.clone())
                .collect();
            if held.is_empty() {
                output.push_str(&format!("- {}\n", member));
            } else {
                output.push_str(&format!("- {} ({})\n", member, held.join(", ")));
            }
        }
        output.push('\n');
    }

    output
}

/// Write an export to disk
pub fn write_export(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write export to {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemberId, TeamId};
    use tempfile::tempdir;

    fn sample() -> Session {
        let mut session = Session::new();
        let backend = session.add_team("Backend", "Alice\nBob");
        let python = session.add_competence("Python");
        session.add_competence("Cobol");
        session.link(&[python], &[backend], &[MemberId::new(TeamId(1), 1)]);
        session
    }

    #[test]
    fn test_export_markdown_uses_current_names() {
        let mut session = sample();
        session.rename_member(&MemberId::new(TeamId(1), 1), "Alicia");
        let md = export_markdown(&session);

        assert!(md.contains("### 01 : Python"));
        assert!(md.contains("- **01 : Backend**"));
        assert!(md.contains("  - 01.01 : Alicia"));
        assert!(md.contains("_Not held by anyone._"));
        assert!(md.contains("- 01.01 : Alicia (Python)"));
        assert!(md.contains("- 01.02 : Bob\n"));
    }

    #[test]
    fn test_export_json_contains_links() {
        let json = export_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["teams"][0]["name"], "Backend");
        assert_eq!(value["competences"][0]["linked_to"][0]["members"][0], "01.01");
    }

    #[test]
    fn test_write_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matrix.md");
        write_export(&path, "# x\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# x\n");
    }
}
