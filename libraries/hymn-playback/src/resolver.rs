//! Repeat/shuffle resolution
//!
//! Pure decision logic for "what plays next/previous". Nothing here mutates
//! the queue; the session applies the returned `Resolution` via
//! `Queue::commit`. Randomness is injected so shuffle draws are reproducible
//! under a seeded generator.

use crate::queue::Queue;
use crate::types::RepeatMode;
use hymn_core::types::Track;
use rand::seq::SliceRandom;
use rand::Rng;

/// Outcome of a next/previous resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Replay the current track (repeat one)
    Current,

    /// Play the queue entry at `index`
    ///
    /// `reload` marks the start of a new repeat cycle: the played set is
    /// reset before the entry is marked.
    Entry { index: usize, reload: bool },
}

/// Resolve the track that follows the current one
///
/// Repeat decides whether an exhausted queue reloads at all; shuffle decides
/// which entry is drawn inside each cycle.
pub fn resolve_next<R: Rng + ?Sized>(
    current: Option<&Track>,
    queue: &Queue,
    repeat: RepeatMode,
    shuffle: bool,
    rng: &mut R,
) -> Option<Resolution> {
    if repeat == RepeatMode::One && current.is_some() {
        return Some(Resolution::Current);
    }

    if shuffle {
        resolve_shuffled(queue, repeat, rng)
    } else {
        resolve_in_order(queue, repeat)
    }
}

/// Resolve the track before the current one
///
/// Always walks original order, whatever the shuffle flag says. Nothing
/// precedes the head of the queue, in any repeat mode other than one.
pub fn resolve_previous(
    current: Option<&Track>,
    queue: &Queue,
    repeat: RepeatMode,
) -> Option<Resolution> {
    if repeat == RepeatMode::One && current.is_some() {
        return Some(Resolution::Current);
    }

    let behind = match queue.current_index() {
        Some(index) => index,
        None => queue.head(),
    };

    behind.checked_sub(1).map(|index| Resolution::Entry {
        index,
        reload: false,
    })
}

fn resolve_in_order(queue: &Queue, repeat: RepeatMode) -> Option<Resolution> {
    if queue.head() < queue.len() {
        return Some(Resolution::Entry {
            index: queue.head(),
            reload: false,
        });
    }

    if repeat == RepeatMode::All && !queue.is_empty() {
        return Some(Resolution::Entry {
            index: 0,
            reload: true,
        });
    }

    None
}

fn resolve_shuffled<R: Rng + ?Sized>(
    queue: &Queue,
    repeat: RepeatMode,
    rng: &mut R,
) -> Option<Resolution> {
    let current = queue.current_index();

    if let Some(&index) = queue.unplayed_indices().choose(rng) {
        return Some(Resolution::Entry {
            index,
            reload: false,
        });
    }

    if repeat != RepeatMode::All || queue.is_empty() {
        return None;
    }

    // New cycle: avoid replaying the current track back-to-back when there
    // is anything else to choose.
    let mut pool: Vec<usize> = (0..queue.len()).filter(|i| Some(*i) != current).collect();
    if pool.is_empty() {
        pool.extend(current);
    }

    pool.choose(rng).map(|&index| Resolution::Entry {
        index,
        reload: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn track(id: &str) -> Track {
        Track::new(id, format!("Hymn {}", id), "Choir", "3:00", format!("{}.mp3", id))
    }

    fn loaded(names: &[&str], start: usize) -> Queue {
        let mut queue = Queue::new();
        queue.load(names.iter().map(|n| track(n)).collect(), start);
        queue
    }

    fn current(queue: &Queue) -> Option<Track> {
        queue.current_index().map(|i| queue.entries()[i].clone())
    }

    #[test]
    fn repeat_one_returns_current_both_ways() {
        let queue = loaded(&["a", "b"], 0);
        let cur = current(&queue);
        let mut rng = StdRng::seed_from_u64(7);

        for shuffle in [false, true] {
            assert_eq!(
                resolve_next(cur.as_ref(), &queue, RepeatMode::One, shuffle, &mut rng),
                Some(Resolution::Current)
            );
        }
        assert_eq!(
            resolve_previous(cur.as_ref(), &queue, RepeatMode::One),
            Some(Resolution::Current)
        );
    }

    #[test]
    fn in_order_next_takes_entry_after_cursor() {
        let queue = loaded(&["a", "b", "c"], 0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            resolve_next(current(&queue).as_ref(), &queue, RepeatMode::Off, false, &mut rng),
            Some(Resolution::Entry {
                index: 1,
                reload: false
            })
        );
    }

    #[test]
    fn exhausted_queue_reloads_only_with_repeat_all() {
        let queue = loaded(&["a", "b"], 1);
        let cur = current(&queue);
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            resolve_next(cur.as_ref(), &queue, RepeatMode::Off, false, &mut rng),
            None
        );
        assert_eq!(
            resolve_next(cur.as_ref(), &queue, RepeatMode::All, false, &mut rng),
            Some(Resolution::Entry {
                index: 0,
                reload: true
            })
        );
    }

    #[test]
    fn previous_walks_original_order_and_stops_at_head() {
        let queue = loaded(&["a", "b", "c"], 2);
        assert_eq!(
            resolve_previous(current(&queue).as_ref(), &queue, RepeatMode::Off),
            Some(Resolution::Entry {
                index: 1,
                reload: false
            })
        );

        let queue = loaded(&["a", "b", "c"], 0);
        assert_eq!(
            resolve_previous(current(&queue).as_ref(), &queue, RepeatMode::Off),
            None
        );
        assert_eq!(
            resolve_previous(current(&queue).as_ref(), &queue, RepeatMode::All),
            None
        );
    }

    #[test]
    fn previous_after_current_removed_uses_preceding_entry() {
        let mut queue = loaded(&["a", "b", "c"], 1);
        let cur = current(&queue);
        queue.remove_track(&hymn_core::TrackId::new("b"));

        assert_eq!(
            resolve_previous(cur.as_ref(), &queue, RepeatMode::Off),
            Some(Resolution::Entry {
                index: 0,
                reload: false
            })
        );
    }

    #[test]
    fn shuffle_draws_every_entry_once_per_cycle() {
        let mut queue = loaded(&["a", "b", "c", "d", "e"], 0);
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();

        for _ in 0..4 {
            let cur = current(&queue);
            let res = resolve_next(cur.as_ref(), &queue, RepeatMode::Off, true, &mut rng)
                .expect("unplayed entries remain");
            let track = queue.commit(res).unwrap();
            assert!(seen.insert(track.id().clone()), "drew {} twice", track.id());
        }

        let cur = current(&queue);
        assert_eq!(
            resolve_next(cur.as_ref(), &queue, RepeatMode::Off, true, &mut rng),
            None
        );
    }

    #[test]
    fn shuffle_with_repeat_all_starts_new_cycle_without_back_to_back_repeat() {
        let queue = loaded(&["a", "b"], 1);
        let mut queue = queue;
        queue.commit(Resolution::Entry {
            index: 0,
            reload: false,
        });
        let cur = current(&queue);
        let mut rng = StdRng::seed_from_u64(3);

        let res = resolve_next(cur.as_ref(), &queue, RepeatMode::All, true, &mut rng);
        assert_eq!(
            res,
            Some(Resolution::Entry {
                index: 1,
                reload: true
            })
        );
    }

    #[test]
    fn single_entry_repeat_all_replays_itself() {
        let queue = loaded(&["a"], 0);
        let cur = current(&queue);
        let mut rng = StdRng::seed_from_u64(3);

        for shuffle in [false, true] {
            assert_eq!(
                resolve_next(cur.as_ref(), &queue, RepeatMode::All, shuffle, &mut rng),
                Some(Resolution::Entry {
                    index: 0,
                    reload: true
                })
            );
        }
    }

    #[test]
    fn empty_queue_resolves_nothing() {
        let queue = Queue::new();
        let mut rng = StdRng::seed_from_u64(3);
        for repeat in [RepeatMode::Off, RepeatMode::All, RepeatMode::One] {
            assert_eq!(resolve_next(None, &queue, repeat, true, &mut rng), None);
            assert_eq!(resolve_next(None, &queue, repeat, false, &mut rng), None);
            assert_eq!(resolve_previous(None, &queue, repeat), None);
        }
    }
}
