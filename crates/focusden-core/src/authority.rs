//! Authority resolution.
//!
//! The participant with the lowest join order is the single authority
//! for shared timer and video state. There is no election exchange:
//! every client derives the same answer from its own membership view.
//! While two clients' views diverge, both may briefly act as authority;
//! the periodic full-state broadcasts make that self-correcting.

use crate::participant::{ParticipantId, RoomRoster};

/// The participant currently holding authority, if any.
pub fn authority_of(roster: &RoomRoster) -> Option<ParticipantId> {
    roster
        .iter()
        .min_by_key(|p| (p.effective_join_order(), p.id))
        .map(|p| p.id)
}

/// Whether the local client is the authority.
///
/// An empty roster (not yet joined) never grants authority.
pub fn is_authority(roster: &RoomRoster) -> bool {
    match roster.local_id() {
        Some(local) => authority_of(roster) == Some(local),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn pid(n: u128) -> ParticipantId {
        ParticipantId(Uuid::from_u128(n))
    }

    #[test]
    fn test_empty_roster_has_no_authority() {
        let roster = RoomRoster::new();
        assert_eq!(authority_of(&roster), None);
        assert!(!is_authority(&roster));
    }

    #[test]
    fn test_lowest_join_order_wins() {
        let mut roster = RoomRoster::new();
        roster.local_joined(pid(10), "me", 1);
        roster.add_peer(pid(4));
        roster.announce(pid(4), "first", 0);

        assert_eq!(authority_of(&roster), Some(pid(4)));
        assert!(!is_authority(&roster));

        roster.remove_peer(pid(4));
        assert!(is_authority(&roster));
    }

    #[test]
    fn test_exactly_one_authority_per_membership_view() {
        // Build the same membership view from three local perspectives
        // and check they all agree on a single authority.
        let members = [(pid(7), 0u32), (pid(2), 1), (pid(9), 1)];

        let mut winners = Vec::new();
        for (local, order) in members {
            let mut roster = RoomRoster::new();
            roster.local_joined(local, "self", order);
            for (other, other_order) in members {
                if other != local {
                    roster.add_peer(other);
                    roster.announce(other, "other", other_order);
                }
            }
            if is_authority(&roster) {
                winners.push(local);
            }
            assert_eq!(authority_of(&roster), Some(pid(7)));
        }
        assert_eq!(winners, vec![pid(7)]);
    }

    #[test]
    fn test_id_breaks_join_order_ties() {
        let mut roster = RoomRoster::new();
        roster.local_joined(pid(3), "me", 0);
        roster.add_peer(pid(8));
        roster.announce(pid(8), "other", 0);

        assert_eq!(authority_of(&roster), Some(pid(3)));
    }
}
