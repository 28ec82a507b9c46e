mod cli;
mod prompts;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::debug;
use std::path::Path;

use competence_core::export::{export_json, export_markdown, write_export};
use competence_core::{
    determine_session_path, get_config_path, CompetenceId, Config, MemberId, Session,
    StorageError, TeamId,
};

use crate::cli::{
    Cli, Command, CompetenceCommand, ConfigCommand, ExportFormat, MemberCommand, QueryCommand,
    TeamCommand,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Command::Config(config_cmd) = &cli.command {
        return handle_config_command(config_cmd);
    }

    // Determine which session file to use
    let session_path = determine_session_path(cli.file.as_deref())?;
    debug!("using session file {:?}", session_path);
    let mut session = load_session(&session_path)?;

    match &cli.command {
        Command::Team(team_cmd) => handle_team_command(team_cmd, &mut session)?,
        Command::Member(member_cmd) => handle_member_command(member_cmd, &mut session)?,
        Command::Comp(comp_cmd) => handle_competence_command(comp_cmd, &mut session)?,
        Command::Link {
            comps,
            teams,
            members,
        } => {
            let before = session.links().len();
            session.link(comps, teams, members);
            println!(
                "{} {} new link(s)",
                "Linked:".green(),
                session.links().len() - before
            );
        }
        Command::Unlink {
            comps,
            teams,
            members,
        } => {
            let before = session.links().len();
            match (teams.is_empty(), members.is_empty()) {
                (false, true) => session.unlink_teams(comps, teams),
                (true, false) => session.unlink_members(comps, members),
                (false, false) => session.unlink(comps, teams, members),
                (true, true) => anyhow::bail!("Give --team, --member, or both to unlink."),
            }
            println!(
                "{} {} link(s)",
                "Removed:".yellow(),
                before - session.links().len()
            );
        }
        Command::Query(query_cmd) => handle_query_command(query_cmd, &session),
        Command::New { yes } => {
            if !*yes && !prompts::confirm("Discard every team and competence in this file?")? {
                println!("{}", "Cancelled.".yellow());
                return Ok(());
            }
            session.reset();
        }
        Command::Sample { count } => {
            session.populate_sample(*count);
            println!("{}", "Sample data added.".green());
        }
        Command::Export { format, output } => {
            let contents = match format {
                ExportFormat::Json => export_json(&session)?,
                ExportFormat::Markdown => export_markdown(&session),
            };
            match output {
                Some(path) => {
                    write_export(path, &contents)?;
                    println!("Exported to {}", path.display());
                }
                None => print!("{}", contents),
            }
        }
        Command::Config(_) => unreachable!("handled above"),
    }

    if !is_read_only(&cli.command) && !session.is_saved() {
        session
            .save_as(&session_path)
            .with_context(|| format!("Failed to save {:?}", session_path))?;
    }

    Ok(())
}

fn is_read_only(command: &Command) -> bool {
    matches!(
        command,
        Command::Query(_)
            | Command::Export { .. }
            | Command::Team(TeamCommand::List)
            | Command::Comp(CompetenceCommand::List)
    )
}

/// Opens the session file, treating a missing file as an empty session
fn load_session(path: &Path) -> Result<Session> {
    match Session::from_file(path) {
        Ok(session) => Ok(session),
        Err(StorageError::NotFound(_)) => Ok(Session::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to open {:?}", path)),
    }
}

fn handle_team_command(cmd: &TeamCommand, session: &mut Session) -> Result<()> {
    match cmd {
        TeamCommand::Add {
            name,
            members,
            roster,
        } => {
            let (name, roster) = match name {
                Some(name) => {
                    let roster = roster.clone().unwrap_or_else(|| members.join("\n"));
                    (name.clone(), roster)
                }
                None => prompts::prompt_new_team()?,
            };
            let id = session.add_team(name, &roster);
            println!("{}", "Team added successfully!".green());
            if let Some(team) = session.team(id) {
                print_team(team);
            }
        }
        TeamCommand::List => {
            if session.teams().is_empty() {
                println!("{}", "No teams.".yellow());
            }
            for team in session.teams() {
                print_team(team);
            }
        }
        TeamCommand::Rename { id, name } => {
            if !session.rename_team(*id, name.clone()) {
                anyhow::bail!("Team {} not found", id);
            }
            println!("{}", "Team renamed.".green());
        }
        TeamCommand::Del { ids, yes } => {
            println!("{}", "Teams to delete:".yellow());
            for id in ids {
                match session.team(*id) {
                    Some(team) => println!("  {}", team),
                    None => println!("  {} {}", id, "(not found)".dimmed()),
                }
            }
            if !*yes && !prompts::confirm("Delete these teams and all their links?")? {
                println!("{}", "Deletion cancelled.".yellow());
                return Ok(());
            }
            session.remove_teams(ids);
            println!("{}", "Teams deleted.".green());
        }
    }
    Ok(())
}

fn handle_member_command(cmd: &MemberCommand, session: &mut Session) -> Result<()> {
    match cmd {
        MemberCommand::Add { team, name } => {
            let id = session
                .add_member(*team, name.clone())
                .with_context(|| format!("Team {} not found", team))?;
            println!("{} {}", "Member added:".green(), id);
        }
        MemberCommand::Rename { id, name } => {
            if !session.rename_member(id, name.clone()) {
                anyhow::bail!("Member {} not found", id);
            }
            println!("{}", "Member renamed.".green());
        }
        MemberCommand::Del { ids, yes } => {
            println!("{}", "Members to delete:".yellow());
            for id in ids {
                match session.member(id) {
                    Some(member) => println!("  {}", member),
                    None => println!("  {} {}", id, "(not found)".dimmed()),
                }
            }
            if !*yes && !prompts::confirm("Delete these members and all their links?")? {
                println!("{}", "Deletion cancelled.".yellow());
                return Ok(());
            }
            session.remove_members(ids);
            println!("{}", "Members deleted.".green());
        }
    }
    Ok(())
}

fn handle_competence_command(cmd: &CompetenceCommand, session: &mut Session) -> Result<()> {
    match cmd {
        CompetenceCommand::Add { description } => {
            let description = match description {
                Some(d) => d.clone(),
                None => prompts::prompt_new_competence()?,
            };
            let id = session.add_competence(description);
            println!("{} {}", "Competence added:".green(), id);
        }
        CompetenceCommand::List => {
            if session.competences().is_empty() {
                println!("{}", "No competences.".yellow());
            }
            for competence in session.competences() {
                println!("{}", competence.to_string().bold());
                for entry in &competence.linked_to {
                    let team = session
                        .team(entry.team)
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| entry.team.to_string());
                    println!("  {}", team.cyan());
                    for member in &entry.members {
                        println!("    {}", member_label(session, member));
                    }
                }
            }
        }
        CompetenceCommand::Rename { id, description } => {
            if !session.rename_competence(*id, description.clone()) {
                anyhow::bail!("Competence {} not found", id);
            }
            println!("{}", "Competence renamed.".green());
        }
        CompetenceCommand::Del { ids, yes } => {
            println!("{}", "Competences to delete:".yellow());
            for id in ids {
                match session.competence(*id) {
                    Some(competence) => println!("  {}", competence),
                    None => println!("  {} {}", id, "(not found)".dimmed()),
                }
            }
            if !*yes && !prompts::confirm("Delete these competences?")? {
                println!("{}", "Deletion cancelled.".yellow());
                return Ok(());
            }
            session.remove_competences(ids);
            println!("{}", "Competences deleted.".green());
        }
    }
    Ok(())
}

fn handle_query_command(cmd: &QueryCommand, session: &Session) {
    match cmd {
        QueryCommand::Teams { comps } => {
            print_teams(session, &session.teams_with_all(comps));
        }
        QueryCommand::Members { comps, teams } => {
            for id in session.members_with(comps, teams) {
                println!("{}", member_label(session, &id));
            }
        }
        QueryCommand::Comps { members } => {
            print_competences(session, &session.competences_held_by(members));
        }
    }
}

fn handle_config_command(cmd: &ConfigCommand) -> Result<()> {
    let config_path = get_config_path()?;
    match cmd {
        ConfigCommand::Path => {
            println!("{}", config_path.display());
        }
        ConfigCommand::SetDefault { file } => {
            let mut config = Config::load_or_default(&config_path)?;
            config.default_file = Some(file.display().to_string());
            config.save(&config_path)?;
            println!("{} {}", "Default session file:".green(), file.display());
        }
    }
    Ok(())
}

fn print_team(team: &competence_core::Team) {
    println!("{}", team.to_string().bold());
    for member in &team.members {
        println!("  {}", member);
    }
}

fn print_teams(session: &Session, ids: &[TeamId]) {
    for id in ids {
        if let Some(team) = session.team(*id) {
            println!("{}", team);
        }
    }
}

fn print_competences(session: &Session, ids: &[CompetenceId]) {
    for id in ids {
        if let Some(competence) = session.competence(*id) {
            println!("{}", competence);
        }
    }
}

fn member_label(session: &Session, id: &MemberId) -> String {
    session
        .member(id)
        .map(|m| m.to_string())
        .unwrap_or_else(|| id.to_string())
}
