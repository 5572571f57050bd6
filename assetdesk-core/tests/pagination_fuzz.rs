mod support;

use std::collections::HashSet;

use assetdesk_core::{BrowserState, Message};
use assetdesk_model::AssetId;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use support::*;

const UNIVERSE: usize = 60;
const PAGE_SIZE: usize = 8;

fn name(n: usize) -> String {
    format!("asset-{n:03}")
}

fn assert_consistent(state: &BrowserState, deleted: &HashSet<String>, seed: u64) {
    let ids: Vec<String> = view(state);
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len(), "seed {seed}: duplicate in {ids:?}");
    assert_eq!(ids.len(), state.collection().len(), "seed {seed}: slot drift");

    for gone in deleted {
        assert!(
            !state.collection().contains(&AssetId::new(gone.as_str())),
            "seed {seed}: deleted {gone} still in view"
        );
    }
    for picked in state.selection().ordered(state.collection()) {
        assert!(state.collection().contains(&picked), "seed {seed}");
    }
    assert_eq!(
        state.selection().ordered(state.collection()).len(),
        state.selection().len(),
        "seed {seed}: selection holds identities missing from the store"
    );
}

/// A page whose window drifts backwards by a random amount, as happens when
/// the server-side collection shifts between fetches.
fn overlapping_page(rng: &mut StdRng, index: usize) -> Vec<String> {
    let drift = rng.random_range(0..=PAGE_SIZE / 2);
    let start = (index * PAGE_SIZE).saturating_sub(drift);
    let mut page: Vec<String> = (start..start + PAGE_SIZE)
        .filter(|n| *n < UNIVERSE)
        .map(name)
        .collect();
    if rng.random_bool(0.3) && !page.is_empty() {
        let repeat = page[rng.random_range(0..page.len())].clone();
        page.push(repeat);
    }
    page.shuffle(rng);
    page
}

#[test]
fn increasing_page_loads_never_duplicate() {
    for seed in 0..64u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = BrowserState::new(config(PAGE_SIZE));
        let deleted = HashSet::new();

        for index in 0..(UNIVERSE / PAGE_SIZE + 2) {
            if state.collection().is_exhausted() {
                break;
            }
            let ids = overlapping_page(&mut rng, index);
            let documents = ids.iter().map(|id| image(id, 0)).collect();
            load_page(&mut state, index, documents);
            assert_consistent(&state, &deleted, seed);
        }
    }
}

#[test]
fn interleaved_feed_traffic_keeps_invariants() {
    for seed in 0..64u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = BrowserState::new(config(PAGE_SIZE));
        let mut deleted: HashSet<String> = HashSet::new();
        let mut pending = None;
        let mut next_index = 0;

        for _ in 0..120 {
            match rng.random_range(0..6) {
                0 if pending.is_none() && !state.collection().is_exhausted() => {
                    pending = Some(begin_page(&mut state, next_index));
                }
                1 => {
                    if let Some(ticket) = pending.take() {
                        let ids = overlapping_page(&mut rng, next_index);
                        let documents =
                            ids.iter().map(|id| image(id, 0)).collect();
                        complete_page(&mut state, ticket, documents);
                        next_index += 1;
                    }
                }
                2 => {
                    let victim = name(rng.random_range(0..UNIVERSE));
                    step(&mut state, asset_disappear(&victim));
                    deleted.insert(victim);
                }
                3 => {
                    let target = name(rng.random_range(0..UNIVERSE));
                    step(&mut state, Message::Pick(AssetId::new(target)));
                }
                4 => {
                    // A feed update brings an identity back to life.
                    let revived = name(rng.random_range(0..UNIVERSE));
                    let minute = rng.random_range(1..59);
                    step(&mut state, asset_update(image(&revived, minute)));
                    deleted.remove(&revived);
                }
                _ => {
                    step(&mut state, Message::PickAll);
                }
            }
            assert_consistent(&state, &deleted, seed);
        }
    }
}
