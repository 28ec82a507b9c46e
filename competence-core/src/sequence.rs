//! Identity sequencing for teams, competences and members
//!
//! Next ids are always "one past the current maximum". Nothing remembers
//! ids that were handed out before, so deleting the highest entity frees
//! its id for the next insert.

use crate::list::EntityList;
use crate::models::Team;

/// Entities numbered by the sequencer
pub trait Sequenced {
    fn seq(&self) -> u32;
}

/// Next id for a team or competence list: one past the current maximum
pub fn next_id<T: Sequenced>(list: &EntityList<T>) -> u32 {
    list.iter().map(Sequenced::seq).max().map_or(1, |max| max + 1)
}

/// Next member sub-id within `team`
pub fn next_member_seq(team: &Team) -> u32 {
    team.members
        .iter()
        .map(|m| m.id.seq)
        .max()
        .map_or(1, |max| max + 1)
}
