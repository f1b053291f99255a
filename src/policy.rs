//! Duplicate retention policy
//!
//! A single pure function decides the fate of every occurrence of an
//! identity, so the identity and divergence stages cannot drift apart.

/// What to do with one occurrence of a duplicated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DupeAction {
    /// Leave the file in place
    Keep,
    /// Remove the file and mark its record
    Delete,
}

/// Decide the action for the `occurrence`-th sighting of an identity.
///
/// Occurrences are 1-based. The first `allowance` sightings are always
/// kept; later ones are deleted only when deletion is enabled.
pub fn resolve(occurrence: u64, allowance: u64, delete_enabled: bool) -> DupeAction {
    if delete_enabled && occurrence > allowance {
        DupeAction::Delete
    } else {
        DupeAction::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everything_kept_when_deletion_disabled() {
        for occurrence in 1..=5 {
            assert_eq!(resolve(occurrence, 1, false), DupeAction::Keep);
        }
    }

    #[test]
    fn test_occurrences_over_allowance_are_deleted() {
        assert_eq!(resolve(1, 1, true), DupeAction::Keep);
        assert_eq!(resolve(2, 1, true), DupeAction::Delete);
        assert_eq!(resolve(3, 1, true), DupeAction::Delete);
    }

    #[test]
    fn test_allowance_widens_the_kept_set() {
        assert_eq!(resolve(2, 3, true), DupeAction::Keep);
        assert_eq!(resolve(3, 3, true), DupeAction::Keep);
        assert_eq!(resolve(4, 3, true), DupeAction::Delete);
    }
}
