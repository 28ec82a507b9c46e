use clap::{Parser, Subcommand, ValueEnum};
use competence_core::{CompetenceId, MemberId, TeamId};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Manage teams, members and the competences they hold")]
pub struct Cli {
    /// Path to the session file
    #[clap(long, short = 'f')]
    pub file: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Add a new team
    Add {
        /// Name of the team
        #[clap(long)]
        name: Option<String>,

        /// Member names (repeatable)
        #[clap(long = "member")]
        members: Vec<String>,

        /// Newline-delimited roster
        #[clap(long, conflicts_with = "members")]
        roster: Option<String>,
    },

    /// List all teams and their members
    List,

    /// Rename a team
    Rename {
        id: TeamId,

        #[clap(long)]
        name: String,
    },

    /// Delete teams and every link filed under them
    Del {
        #[clap(required = true, num_args = 1..)]
        ids: Vec<TeamId>,

        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum MemberCommand {
    /// Add a member to a team
    Add {
        #[clap(long)]
        team: TeamId,

        #[clap(long)]
        name: String,
    },

    /// Rename a member (id as TT.MM)
    Rename {
        id: MemberId,

        #[clap(long)]
        name: String,
    },

    /// Delete members and every link they hold
    Del {
        #[clap(required = true, num_args = 1..)]
        ids: Vec<MemberId>,

        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum CompetenceCommand {
    /// Add a new competence
    Add {
        #[clap(long)]
        description: Option<String>,
    },

    /// List all competences and who holds them
    List,

    /// Change a competence description
    Rename {
        id: CompetenceId,

        #[clap(long)]
        description: String,
    },

    /// Delete competences
    Del {
        #[clap(required = true, num_args = 1..)]
        ids: Vec<CompetenceId>,

        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum QueryCommand {
    /// Teams where every given competence is present
    Teams {
        #[clap(long = "comp", value_delimiter = ',', required = true)]
        comps: Vec<CompetenceId>,
    },

    /// Members holding the given competences
    Members {
        #[clap(long = "comp", value_delimiter = ',', required = true)]
        comps: Vec<CompetenceId>,

        /// Only look inside these teams
        #[clap(long = "team", value_delimiter = ',')]
        teams: Vec<TeamId>,
    },

    /// Competences held by any of the given members
    Comps {
        #[clap(long = "member", value_delimiter = ',', required = true)]
        members: Vec<MemberId>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the path of the configuration file
    Path,

    /// Set the session file used when --file is not given
    SetDefault { file: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ExportFormat {
    Json,
    Markdown,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Team management commands
    #[clap(subcommand)]
    Team(TeamCommand),

    /// Member management commands
    #[clap(subcommand)]
    Member(MemberCommand),

    /// Competence management commands
    #[clap(subcommand)]
    Comp(CompetenceCommand),

    /// Link members of teams to competences (every combination)
    Link {
        #[clap(long = "comp", value_delimiter = ',', required = true)]
        comps: Vec<CompetenceId>,

        #[clap(long = "team", value_delimiter = ',', required = true)]
        teams: Vec<TeamId>,

        #[clap(long = "member", value_delimiter = ',', required = true)]
        members: Vec<MemberId>,
    },

    /// Unlink competences from whole teams, from members, or both
    Unlink {
        #[clap(long = "comp", value_delimiter = ',', required = true)]
        comps: Vec<CompetenceId>,

        #[clap(long = "team", value_delimiter = ',')]
        teams: Vec<TeamId>,

        #[clap(long = "member", value_delimiter = ',')]
        members: Vec<MemberId>,
    },

    /// Read-only queries over the links
    #[clap(subcommand)]
    Query(QueryCommand),

    /// Discard everything in the session file
    New {
        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Fill the session with generated teams and competences
    Sample {
        #[clap(long, default_value_t = 5)]
        count: u32,
    },

    /// Export the session
    Export {
        #[clap(long, value_enum, default_value_t = ExportFormat::Markdown)]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[clap(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Configuration commands
    #[clap(subcommand)]
    Config(ConfigCommand),
}
