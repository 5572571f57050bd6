mod support;

use assetdesk_core::{
    BrowserError, BulkActionKind, Effect, ErrorOrigin, GateError, Message,
    TagLabel, update,
};
use assetdesk_model::{AssetId, TagId};

use support::*;

fn id(raw: &str) -> AssetId {
    AssetId::new(raw)
}

#[test]
fn deletions_prune_view_and_selection_then_bulk_delete_empties_both() {
    let mut state = assetdesk_core::BrowserState::new(config(3));
    load_page(&mut state, 0, vec![image("A", 0), image("B", 0), image("C", 0)]);

    step(&mut state, Message::Pick(id("A")));
    step(&mut state, Message::Pick(id("C")));

    step(&mut state, asset_disappear("B"));
    assert_eq!(view(&state), vec!["A", "C"]);
    assert_eq!(state.snapshot().picked, vec![id("A"), id("C")]);

    step(&mut state, asset_disappear("A"));
    assert_eq!(view(&state), vec!["C"]);
    assert_eq!(state.snapshot().picked, vec![id("C")]);

    let request = step(&mut state, Message::RequestDeletePicked);
    assert!(!request.is_rejected());
    let confirm = step(&mut state, Message::Confirm);
    assert_eq!(confirm.effects, vec![Effect::DeleteAssets { ids: vec![id("C")] }]);
    assert!(view(&state).is_empty());
    assert!(state.selection().is_empty());

    step(&mut state, Message::BulkActionFinished(Ok(())));
    step(&mut state, asset_disappear("C"));
    assert!(view(&state).is_empty());
    assert!(state.selection().is_empty());
    assert!(state.gate().is_idle());
}

#[test]
fn failed_first_page_retried_never_duplicates() {
    let mut state = assetdesk_core::BrowserState::new(config(2));
    let ticket = begin_page(&mut state, 0);
    step(
        &mut state,
        Message::PageLoaded {
            ticket,
            result: Err(unavailable()),
        },
    );
    assert_eq!(
        state.error().map(|e| e.origin.clone()),
        Some(ErrorOrigin::PageLoad { index: 0 })
    );

    load_page(&mut state, 0, vec![image("a", 0), image("b", 0)]);
    load_page(&mut state, 1, vec![image("b", 0), image("c", 0)]);

    assert_eq!(view(&state), vec!["a", "b", "c"]);
    assert!(state.error().is_none());
}

#[test]
fn update_for_unloaded_asset_appears_in_front_bucket() {
    let mut state = assetdesk_core::BrowserState::new(config(2));
    load_page(&mut state, 0, vec![image("a", 0), image("b", 0)]);

    step(&mut state, asset_update(image("new", 5)));

    assert_eq!(view(&state), vec!["new", "a", "b"]);
    assert_eq!(state.collection().page_count(), 1);
    assert_eq!(state.collection().front(), &[id("new")]);
}

#[test]
fn picking_absent_identity_changes_nothing() {
    let mut state = assetdesk_core::BrowserState::new(config(2));
    load_page(&mut state, 0, vec![image("a", 0)]);
    let before = state.snapshot();

    step(&mut state, Message::Pick(id("ghost")));

    assert_eq!(state.snapshot(), before);
}

#[test]
fn second_request_while_pending_is_rejected() {
    let mut state = assetdesk_core::BrowserState::new(config(2));
    load_page(&mut state, 0, vec![image("a", 0), image("b", 0)]);
    step(&mut state, Message::RequestDeleteAssets(vec![id("a")]));

    let second = step(&mut state, Message::RequestDeleteTag(TagId::new("t")));
    assert_eq!(
        second.rejection,
        Some(BrowserError::Gate(GateError::AlreadyPending))
    );
    let pending = state
        .snapshot()
        .pending_confirmation
        .expect("first request still pending");
    assert_eq!(pending.action, BulkActionKind::DeleteAssets);
    assert_eq!(pending.targets, vec!["a".to_owned()]);
}

#[test]
fn cancel_leaves_store_untouched() {
    let mut state = assetdesk_core::BrowserState::new(config(2));
    load_page(&mut state, 0, vec![image("a", 0), image("b", 0)]);
    step(&mut state, Message::Pick(id("a")));
    step(&mut state, Message::RequestDeletePicked);

    let result = step(&mut state, Message::Cancel);

    assert!(result.effects.is_empty());
    assert_eq!(view(&state), vec!["a", "b"]);
    assert!(state.is_picked(&id("a")));
    assert!(state.gate().is_idle());
}

#[test]
fn confirm_skips_targets_removed_by_the_feed() {
    let mut state = assetdesk_core::BrowserState::new(config(3));
    load_page(&mut state, 0, vec![image("a", 0), image("b", 0), image("c", 0)]);
    step(&mut state, Message::PickAll);
    step(&mut state, Message::RequestDeletePicked);

    step(&mut state, asset_disappear("b"));
    let confirm = step(&mut state, Message::Confirm);

    assert_eq!(
        confirm.effects,
        vec![Effect::DeleteAssets {
            ids: vec![id("a"), id("c")]
        }]
    );
    assert!(view(&state).is_empty());
}

#[test]
fn confirm_with_every_target_gone_returns_to_idle() {
    let mut state = assetdesk_core::BrowserState::new(config(3));
    load_page(&mut state, 0, vec![image("a", 0)]);
    step(&mut state, Message::RequestDeleteAssets(vec![id("a")]));
    step(&mut state, asset_disappear("a"));

    let confirm = step(&mut state, Message::Confirm);

    assert!(confirm.effects.is_empty());
    assert!(!confirm.is_rejected());
    assert!(state.gate().is_idle());
}

#[test]
fn failed_bulk_delete_restores_unconfirmed_assets() {
    let mut state = assetdesk_core::BrowserState::new(config(3));
    load_page(&mut state, 0, vec![image("a", 0), image("b", 0), image("c", 0)]);
    step(&mut state, Message::RequestDeleteAssets(vec![id("a"), id("b")]));
    step(&mut state, Message::Confirm);
    assert_eq!(view(&state), vec!["c"]);

    // The backend managed to delete `b` before failing.
    step(&mut state, asset_disappear("b"));
    step(&mut state, Message::BulkActionFinished(Err(unavailable())));

    assert_eq!(view(&state), vec!["a", "c"]);
    let error = state.error().expect("failure should be visible");
    assert_eq!(error.origin, ErrorOrigin::DeleteAssets { count: 2 });

    step(&mut state, Message::DismissError);
    assert!(state.error().is_none());
}

#[test]
fn tag_delete_is_optimistic_and_rolls_back() {
    let mut state = assetdesk_core::BrowserState::new(config(3));
    assert!(!state.snapshot().tags_loaded);
    load_tags(&mut state, vec![tag("t1", "Cats"), tag("t2", "Dogs")]);
    assert!(state.snapshot().tags_loaded);
    load_page(&mut state, 0, vec![image_tagged("a", 0, &["t1"])]);

    step(&mut state, Message::RequestDeleteTag(TagId::new("t1")));
    let confirm = step(&mut state, Message::Confirm);
    assert_eq!(
        confirm.effects,
        vec![Effect::DeleteTag {
            id: TagId::new("t1")
        }]
    );
    assert_eq!(state.snapshot().tag_names(), vec!["Dogs"]);

    step(&mut state, Message::BulkActionFinished(Err(unavailable())));
    assert_eq!(state.snapshot().tag_names(), vec!["Cats", "Dogs"]);
}

#[test]
fn dangling_tag_reference_renders_unknown() {
    let mut state = assetdesk_core::BrowserState::new(config(3));
    load_tags(&mut state, vec![tag("t1", "Cats")]);
    load_page(&mut state, 0, vec![image_tagged("a", 0, &["t1", "gone"])]);

    let snapshot = state.snapshot();
    let asset = snapshot.asset("a").expect("asset in view");
    assert_eq!(
        asset.tags,
        vec![
            TagLabel::Known {
                id: TagId::new("t1"),
                name: "Cats".into()
            },
            TagLabel::Unknown {
                id: TagId::new("gone")
            },
        ]
    );

    step(&mut state, tag_event("t1", None, "disappear"));
    let snapshot = state.snapshot();
    let asset = snapshot.asset("a").expect("asset survives tag removal");
    assert!(asset.tags.iter().all(|label| !label.is_known()));
}

#[test]
fn tag_appear_and_update_reach_the_directory() {
    let mut state = assetdesk_core::BrowserState::new(config(3));
    step(&mut state, tag_event("t1", Some(tag("t1", "cats")), "appear"));
    assert_eq!(state.snapshot().tag_names(), vec!["cats"]);

    let mut renamed = tag("t1", "felines");
    renamed["_updatedAt"] = "2026-06-01T13:00:00Z".into();
    step(&mut state, tag_event("t1", Some(renamed), "update"));
    assert_eq!(state.snapshot().tag_names(), vec!["felines"]);
}

#[test]
fn asset_appear_is_not_surfaced() {
    let mut state = assetdesk_core::BrowserState::new(config(3));
    step(
        &mut state,
        Message::Feed {
            kind: assetdesk_model::EntityKind::Asset,
            event: assetdesk_contracts::FeedEvent::new(
                "a",
                Some(image("a", 0)),
                "appear",
            ),
        },
    );
    assert!(state.collection().is_empty());
}

#[test]
fn stale_feed_update_does_not_overwrite_newer_page_data() {
    let mut state = assetdesk_core::BrowserState::new(config(3));
    load_page(&mut state, 0, vec![image("a", 30)]);

    step(&mut state, asset_update(image("a", 10)));

    let snapshot = state.snapshot();
    let held = snapshot.asset("a").expect("asset in view");
    assert_eq!(held.asset.revision.rev, "a-30");
}

#[test]
fn deletion_before_page_arrives_keeps_asset_out() {
    let mut state = assetdesk_core::BrowserState::new(config(3));
    let ticket = begin_page(&mut state, 0);
    step(&mut state, asset_disappear("b"));
    complete_page(&mut state, ticket, vec![image("a", 0), image("b", 0)]);

    assert_eq!(view(&state), vec!["a"]);
}

#[test]
fn configured_tombstone_capacity_bounds_remembered_deletions() {
    let mut state = assetdesk_core::BrowserState::new(
        assetdesk_config::BrowserConfig {
            tombstone_capacity: 1,
            ..config(3)
        },
    );
    let ticket = begin_page(&mut state, 0);
    step(&mut state, asset_disappear("a"));
    step(&mut state, asset_disappear("b"));
    assert_eq!(state.collection().tombstone_count(), 1);

    complete_page(
        &mut state,
        ticket,
        vec![image("a", 0), image("b", 0), image("c", 0)],
    );
    assert_eq!(view(&state), vec!["a", "c"]);
}

#[test]
fn every_interleaving_of_page_load_and_delete_leaves_target_absent() {
    // Positions of the delete relative to: begin page 0, complete page 0,
    // pick, begin page 1, complete page 1.
    for delete_at in 0..=5 {
        let mut state = assetdesk_core::BrowserState::new(config(2));
        let mut ops = vec!["begin0", "complete0", "pick", "begin1", "complete1"];
        ops.insert(delete_at, "delete");

        let mut ticket = None;
        for op in ops {
            match op {
                "begin0" => ticket = Some(begin_page(&mut state, 0)),
                "complete0" => {
                    let t = ticket.take().expect("page 0 begun");
                    complete_page(&mut state, t, vec![image("x", 0), image("y", 0)]);
                }
                "pick" => {
                    step(&mut state, Message::Pick(id("x")));
                }
                "begin1" => ticket = Some(begin_page(&mut state, 1)),
                "complete1" => {
                    let t = ticket.take().expect("page 1 begun");
                    complete_page(&mut state, t, vec![image("x", 0), image("z", 0)]);
                }
                "delete" => {
                    step(&mut state, asset_disappear("x"));
                }
                other => unreachable!("unknown op {other}"),
            }
        }

        assert!(
            !state.collection().contains(&id("x")),
            "x present with delete at {delete_at}"
        );
        assert!(!state.is_picked(&id("x")), "x picked with delete at {delete_at}");
        assert!(state.collection().contains(&id("z")));
    }
}

#[test]
fn drafts_from_the_feed_are_filtered() {
    let mut state = assetdesk_core::BrowserState::new(config(3));
    step(&mut state, asset_update(image("drafts.a", 0)));
    assert!(state.collection().is_empty());
}

#[test]
fn batched_messages_take_effect_in_arrival_order() {
    let mut state = assetdesk_core::BrowserState::new(config(3));
    load_page(&mut state, 0, vec![image("x", 0), image("y", 0)]);
    step(&mut state, Message::RequestDeleteAssets(vec![id("x")]));

    // One actor turn: nothing is flushed until the batch is over.
    update(&mut state, asset_update(image("x", 5)));
    let confirm = update(&mut state, Message::Confirm);
    update(&mut state, asset_disappear("y"));
    update(&mut state, Message::Pick(id("y")));
    update(&mut state, Message::BulkActionFinished(Ok(())));
    state.flush_all();

    assert_eq!(confirm.effects, vec![Effect::DeleteAssets { ids: vec![id("x")] }]);
    assert!(view(&state).is_empty());
    assert!(state.selection().is_empty());
    assert!(state.gate().is_idle());
}
