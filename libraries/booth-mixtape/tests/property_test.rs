//! Property-based tests for mixtape logic
//!
//! Uses proptest to verify invariants across many random inputs.

use booth_core::{Contributor, MixtapeId, MixtapeTrack, Participant, TrackDraft, UserId};
use booth_mixtape::duration::{remaining, split_sides, total_duration};
use booth_mixtape::{whose_turn, ChangeEvent, Reconciler, Tracklist};
use proptest::prelude::*;
use std::collections::HashSet;

// ===== Helpers =====

fn participants(n: usize) -> Vec<Participant> {
    (0..n)
        .map(|i| {
            if i == 0 {
                Participant::owner(UserId::new("owner"))
            } else {
                Participant::collaborator(UserId::new(format!("c{}", i)), i as u32)
            }
        })
        .collect()
}

fn track(id: usize, position: u32, duration_ms: u64) -> MixtapeTrack {
    let mut track = MixtapeTrack::from_draft(
        MixtapeId::new("tape"),
        position,
        TrackDraft::new(format!("Track {}", id), "Artist", duration_ms),
        Contributor::User(UserId::new("owner")),
    );
    track.id = booth_core::TrackId::new(format!("t{:03}", id));
    track
}

fn arbitrary_durations() -> impl Strategy<Value = Vec<u64>> {
    // 1 second to 15 minutes
    prop::collection::vec(1_000u64..900_000, 0..40)
}

// ===== Property Tests =====

proptest! {
    /// Property: every participant gets exactly one turn per N contributions
    #[test]
    fn round_robin_covers_everyone(n in 1usize..12, rounds in 1usize..6) {
        let participants = participants(n);

        for round in 0..rounds {
            let mut seen = HashSet::new();
            for offset in 0..n {
                let turn = whose_turn(&participants, round * n + offset).unwrap();
                prop_assert!(seen.insert(turn.user_id.clone()), "Participant repeated in round");
            }
            prop_assert_eq!(seen.len(), n);
        }

        prop_assert_eq!(&whose_turn(&participants, 0).unwrap().user_id, &UserId::new("owner"));
    }

    /// Property: no participants means no turn owner, at any count
    #[test]
    fn empty_rotation_never_has_a_turn(count in 0usize..100_000) {
        prop_assert!(whose_turn(&[], count).is_none());
    }

    /// Property: total duration does not depend on order
    #[test]
    fn total_duration_is_order_independent(durations in arbitrary_durations()) {
        let expected: u64 = durations.iter().sum();
        let mut reversed = durations.clone();
        reversed.reverse();

        prop_assert_eq!(total_duration(&durations), expected);
        prop_assert_eq!(total_duration(&reversed), expected);
    }

    /// Property: remaining is capacity minus total, sign and all
    #[test]
    fn remaining_is_capacity_minus_total(
        durations in arbitrary_durations(),
        capacity in 0u64..10_000_000,
    ) {
        let total = total_duration(&durations) as i64;
        prop_assert_eq!(remaining(&durations, capacity), capacity as i64 - total);
    }

    /// Property: sides partition the list and respect the threshold
    #[test]
    fn sides_partition_tracklist(
        durations in arbitrary_durations(),
        threshold in 0u64..6_000_000,
    ) {
        let sides = split_sides(&durations, threshold);
        prop_assert_eq!(sides.side_a.len() + sides.side_b.len(), durations.len());

        if !durations.is_empty() {
            prop_assert!(!sides.side_a.is_empty(), "First track must be on Side A");
        }

        // Every Side A track after the first started before the threshold
        let mut elapsed = 0u64;
        for (index, duration) in sides.side_a.iter().enumerate() {
            if index > 0 {
                prop_assert!(elapsed < threshold);
            }
            elapsed += duration;
        }

        // Side B begins only once the threshold has been reached
        if !sides.side_b.is_empty() {
            prop_assert!(total_duration(sides.side_a) >= threshold);
        }
    }

    /// Property: applying an insert twice equals applying it once
    #[test]
    fn reconciler_insert_is_idempotent(count in 1usize..20, repeat in 0usize..20) {
        let mut once = Reconciler::new();
        let mut twice = Reconciler::new();

        for i in 0..count {
            once.apply(ChangeEvent::Insert(track(i, i as u32, 1_000)));
            twice.apply(ChangeEvent::Insert(track(i, i as u32, 1_000)));
        }
        let dup = repeat % count;
        twice.apply(ChangeEvent::Insert(track(dup, dup as u32, 1_000)));

        let once_ids: Vec<_> = once.rows().iter().map(|t| t.id.clone()).collect();
        let twice_ids: Vec<_> = twice.rows().iter().map(|t| t.id.clone()).collect();
        prop_assert_eq!(&once_ids, &twice_ids);

        let unique: HashSet<_> = twice_ids.iter().collect();
        prop_assert_eq!(unique.len(), twice.len());
    }

    /// Property: final order follows positions, whatever the arrival order
    #[test]
    fn reconciler_order_ignores_arrival(
        order in Just((0..15usize).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let mut reconciler = Reconciler::new();
        for &i in &order {
            reconciler.apply(ChangeEvent::Insert(track(i, i as u32, 1_000)));
        }

        let positions: Vec<u32> = reconciler.rows().iter().map(|t| t.position).collect();
        let expected: Vec<u32> = (0..15).collect();
        prop_assert_eq!(positions, expected);
    }

    /// Property: removals keep positions contiguous
    #[test]
    fn tracklist_stays_contiguous(
        count in 1usize..30,
        removals in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let mut list = Tracklist::new(MixtapeId::new("tape"));
        for i in 0..count {
            list.append(
                TrackDraft::new(format!("Track {}", i), "Artist", 60_000),
                Contributor::guest("Sam"),
            );
        }

        for index in removals {
            if list.is_empty() {
                break;
            }
            let id = list.tracks()[index.index(list.len())].id.clone();
            list.remove(&id);
            prop_assert!(list.is_contiguous());
        }
    }
}

#[test]
fn stale_update_after_delete_leaves_list_unchanged() {
    let mut reconciler =
        Reconciler::from_rows(vec![track(0, 0, 1_000), track(1, 1, 1_000), track(2, 2, 1_000)]);

    let deleted = track(1, 1, 1_000);
    reconciler.apply(ChangeEvent::Delete(deleted.id.clone()));
    let after_delete = reconciler.rows().to_vec();

    reconciler.apply(ChangeEvent::Update(deleted));
    assert_eq!(reconciler.rows(), after_delete.as_slice());
}
