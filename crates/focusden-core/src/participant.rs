//! Room membership view.
//!
//! The roster mirrors what the transport reports: who is in the room,
//! their display names, and the order in which they joined. It is the
//! sole input to authority resolution.

use uuid::Uuid;

/// Unique identity of one connected client.
///
/// Wraps a UUID so transport peer IDs map onto it directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(pub Uuid);

impl ParticipantId {
    /// Generate a fresh random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short form for log output.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for ParticipantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// One room participant as seen by the local client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    /// The participant's own claim of how many others were present when
    /// it joined. `None` until its presence announcement arrives.
    pub join_order: Option<u32>,
}

impl Participant {
    /// Join order used for authority comparison. Peers that have not
    /// announced themselves yet sort last.
    pub fn effective_join_order(&self) -> u32 {
        self.join_order.unwrap_or(u32::MAX)
    }
}

/// Ordered membership view of the room, including the local client once
/// it has joined.
#[derive(Clone, Debug, Default)]
pub struct RoomRoster {
    participants: Vec<Participant>,
    local_id: Option<ParticipantId>,
}

impl RoomRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the local client's own membership. Called once the
    /// transport has assigned us an identity.
    pub fn local_joined(&mut self, id: ParticipantId, display_name: &str, join_order: u32) {
        self.local_id = Some(id);
        self.upsert(id, Some(display_name.to_string()), Some(join_order));
    }

    pub fn local_id(&self) -> Option<ParticipantId> {
        self.local_id
    }

    /// Add a peer if it is not already present. Returns true if new.
    pub fn add_peer(&mut self, id: ParticipantId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.participants.push(Participant {
            id,
            display_name: format!("peer-{}", id.short()),
            join_order: None,
        });
        true
    }

    /// Apply a peer's presence announcement.
    pub fn announce(&mut self, id: ParticipantId, display_name: &str, join_order: u32) {
        self.upsert(id, Some(display_name.to_string()), Some(join_order));
    }

    pub fn remove_peer(&mut self, id: ParticipantId) {
        self.participants.retain(|p| p.id != id);
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.participants.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Number of peers other than the local client.
    pub fn peer_count(&self) -> usize {
        match self.local_id {
            Some(local) => self.participants.iter().filter(|p| p.id != local).count(),
            None => self.participants.len(),
        }
    }

    /// Participants sorted by join order, transport identity as tiebreak.
    ///
    /// The tiebreak keeps the ordering deterministic across clients even
    /// while two participants claim the same join order.
    pub fn ordered(&self) -> Vec<&Participant> {
        let mut out: Vec<&Participant> = self.participants.iter().collect();
        out.sort_by_key(|p| (p.effective_join_order(), p.id));
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    /// Drop everything, including the local entry. Used on disconnect.
    pub fn clear(&mut self) {
        self.participants.clear();
        self.local_id = None;
    }

    /// Insert a participant or update the fields supplied for an existing
    /// one. `None` fields leave the current value untouched.
    fn upsert(&mut self, id: ParticipantId, display_name: Option<String>, join_order: Option<u32>) {
        if let Some(p) = self.participants.iter_mut().find(|p| p.id == id) {
            if let Some(name) = display_name {
                p.display_name = name;
            }
            if let Some(order) = join_order {
                p.join_order = Some(order);
            }
        } else {
            self.participants.push(Participant {
                id,
                display_name: display_name.unwrap_or_default(),
                join_order,
            });
        }
    }
}
