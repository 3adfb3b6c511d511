use super::{Squad, TimeRange};

/// A candidate assignment of one squad to one slot.
/// Two sessions are the same session only if their ids match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Session {
    pub id: usize,
    /// Id of the squad, which is also its index in the squad pool.
    pub squad: usize,
    pub range: TimeRange,
}

/// Crosses every squad with every slot and keeps the sessions both members are free for.
/// Session ids follow the output order.
#[must_use]
pub fn generate_sessions(squads: &[Squad], slots: &[TimeRange]) -> Vec<Session> {
    let mut sessions = Vec::new();

    for squad in squads {
        for slot in slots.iter().filter(|slot| squad.is_free(slot)) {
            sessions.push(Session {
                id: sessions.len(),
                squad: squad.id,
                range: *slot,
            });
        }
    }

    sessions
}
