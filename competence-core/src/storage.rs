use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::StorageError;
use crate::models::{Competence, Team};

/// Current on-disk document version
pub const FORMAT_VERSION: u32 = 1;

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_RETRY: Duration = Duration::from_millis(100);

/// Everything a session file holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub competences: Vec<Competence>,
}

impl SessionData {
    pub fn new(teams: Vec<Team>, competences: Vec<Competence>) -> Self {
        Self {
            version: FORMAT_VERSION,
            saved_at: Utc::now(),
            teams,
            competences,
        }
    }

    /// Checks ids are unique and every link points at an existing member of
    /// the team it is filed under
    pub fn validate(&self) -> Result<(), String> {
        if self.version != FORMAT_VERSION {
            return Err(format!("unsupported format version {}", self.version));
        }

        let mut team_ids = HashSet::new();
        for team in &self.teams {
            if !team_ids.insert(team.id) {
                return Err(format!("duplicate team id {}", team.id));
            }
            let mut member_ids = HashSet::new();
            for member in &team.members {
                if member.id.team != team.id {
                    return Err(format!("member {} filed under team {}", member.id, team.id));
                }
                if !member_ids.insert(member.id) {
                    return Err(format!("duplicate member id {}", member.id));
                }
            }
        }

        let mut competence_ids = HashSet::new();
        for competence in &self.competences {
            if !competence_ids.insert(competence.id) {
                return Err(format!("duplicate competence id {}", competence.id));
            }
            let mut linked_teams = HashSet::new();
            for entry in &competence.linked_to {
                if !linked_teams.insert(entry.team) {
                    return Err(format!(
                        "competence {} lists team {} twice",
                        competence.id, entry.team
                    ));
                }
                let team = self
                    .teams
                    .iter()
                    .find(|t| t.id == entry.team)
                    .ok_or_else(|| {
                        format!("competence {} links unknown team {}", competence.id, entry.team)
                    })?;
                if entry.members.is_empty() {
                    return Err(format!(
                        "competence {} has an empty entry for team {}",
                        competence.id, entry.team
                    ));
                }
                let mut seen = HashSet::new();
                for member in &entry.members {
                    if !team.has_member(member) {
                        return Err(format!(
                            "competence {} links unknown member {} of team {}",
                            competence.id, member, entry.team
                        ));
                    }
                    if !seen.insert(*member) {
                        return Err(format!(
                            "competence {} links member {} twice",
                            competence.id, member
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Handles saving and loading session files with advisory file locking
pub struct Storage {
    file_path: PathBuf,
    lock_file_path: PathBuf,
}

impl Storage {
    /// Creates a new Storage instance
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        let file_path = file_path.as_ref().to_path_buf();
        let mut lock_name = file_path.clone().into_os_string();
        lock_name.push(".lock");
        Self {
            file_path,
            lock_file_path: PathBuf::from(lock_name),
        }
    }

    /// Returns the path to the storage file
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn exists(&self) -> bool {
        self.file_path.exists()
    }

    fn open_lock_file(&self) -> Result<File, StorageError> {
        if let Some(parent) = self.lock_file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
            }
        }
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_file_path)
            .map_err(|e| StorageError::io(&self.lock_file_path, e))
    }

    /// Retries `try_lock` until it succeeds or the timeout expires
    fn wait_for_lock<F>(&self, lock_file: &File, try_lock: F) -> Result<(), StorageError>
    where
        F: Fn(&File) -> std::io::Result<()>,
    {
        let start = Instant::now();
        loop {
            match try_lock(lock_file) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                    if start.elapsed() > LOCK_TIMEOUT {
                        return Err(StorageError::FileLocked(self.file_path.clone()));
                    }
                    std::thread::sleep(LOCK_RETRY);
                }
                Err(e) => return Err(StorageError::io(&self.lock_file_path, e)),
            }
        }
    }

    /// Loads and validates a session file.
    ///
    /// Nothing is returned unless the whole file parsed and validated.
    pub fn load(&self) -> Result<SessionData, StorageError> {
        if !self.file_path.exists() {
            return Err(StorageError::NotFound(self.file_path.clone()));
        }

        let lock_file = self.open_lock_file()?;
        self.wait_for_lock(&lock_file, |f| FileExt::try_lock_shared(f))?;

        let file =
            File::open(&self.file_path).map_err(|e| StorageError::io(&self.file_path, e))?;
        let data: SessionData =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|source| StorageError::Parse {
                path: self.file_path.clone(),
                source,
            })?;

        // Lock is released when lock_file is dropped
        drop(lock_file);

        if let Err(reason) = data.validate() {
            warn!("rejecting {:?}: {}", self.file_path, reason);
            return Err(StorageError::Corrupt(reason));
        }

        info!(
            "loaded {:?}: {} team(s), {} competence(s)",
            self.file_path,
            data.teams.len(),
            data.competences.len()
        );
        Ok(data)
    }

    /// Saves a session file under an exclusive lock
    pub fn save(&self, data: &SessionData) -> Result<(), StorageError> {
        let yaml = serde_yaml::to_string(data)?;

        let mut lock_file = self.open_lock_file()?;
        self.wait_for_lock(&lock_file, |f| FileExt::try_lock_exclusive(f))?;

        // Write lock holder info (optional, for debugging)
        let _ = lock_file.set_len(0);
        let _ = writeln!(
            lock_file,
            "Locked by PID {} at {}",
            std::process::id(),
            Utc::now().to_rfc3339()
        );

        fs::write(&self.file_path, yaml).map_err(|e| StorageError::io(&self.file_path, e))?;

        info!("saved {:?}", self.file_path);
        Ok(())
    }
}
