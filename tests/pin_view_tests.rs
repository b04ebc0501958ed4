// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use pintour::models::{Coordinate, LikeDeltaEvent, LikeDirection, PinId, UserId, Waypoint};
use pintour::runtime::PinViewHandle;
use pintour::services::{FlushOutcome, InMemoryDirectory, LikeAction, PinDirectory, PresentationEvent};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{eventually, view_deps, view_deps_with, wait_for, ScriptedDirectory, WALKER};

const PIN: &str = "fountain";

fn pin() -> Waypoint {
    Waypoint::new(PIN, Some(Coordinate::new(37.7710, -122.4200)), "guide")
}

/// Directory holding the test pin with `likes` likes from other users.
async fn directory_with_likes(likes: usize) -> InMemoryDirectory {
    let directory = InMemoryDirectory::new();
    directory.insert_pin(pin());
    for i in 0..likes {
        directory
            .commit_like(&UserId::from(format!("fan-{}", i)), &PinId::from(PIN))
            .await
            .expect("Seeding like failed");
    }
    directory
}

fn engagement(displayed: i64, liked: bool) -> impl FnMut(&PresentationEvent) -> bool {
    move |event| {
        matches!(
            event,
            PresentationEvent::EngagementChanged { displayed_count, liked: l, .. }
                if *displayed_count == displayed && *l == liked
        )
    }
}

#[tokio::test]
async fn test_like_then_live_delta_then_close() {
    let directory = directory_with_likes(10).await;
    let (deps, mut events) = view_deps(WALKER, directory.clone());
    let view = PinViewHandle::open(deps, pin());
    let pin_id = PinId::from(PIN);

    wait_for(&mut events, engagement(10, false)).await;
    assert_eq!(directory.subscriber_count(&pin_id), 1);

    // Optimistic toggle moves the icon, not the number
    view.toggle_like().unwrap();
    wait_for(&mut events, engagement(10, true)).await;

    // Someone else likes the pin meanwhile
    directory
        .commit_like(&UserId::from("stranger"), &pin_id)
        .await
        .unwrap();
    wait_for(&mut events, engagement(11, true)).await;

    let outcome = view.close().await.unwrap();
    assert_eq!(outcome, FlushOutcome::Commit(LikeAction::Like));
    assert_eq!(directory.subscriber_count(&pin_id), 0);

    eventually(|| directory.like_count(&pin_id) == 12).await;
    assert!(directory
        .fetch_user_like(&pin_id, &UserId::from(WALKER))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_double_toggle_commits_nothing() {
    let directory = directory_with_likes(3).await;
    let (deps, mut events) = view_deps(WALKER, directory.clone());
    let view = PinViewHandle::open(deps, pin());

    wait_for(&mut events, engagement(3, false)).await;
    view.toggle_like().unwrap();
    view.toggle_like().unwrap();
    wait_for(&mut events, engagement(3, false)).await;

    assert_eq!(view.close().await.unwrap(), FlushOutcome::NoOp);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(directory.like_count(&PinId::from(PIN)), 3);
}

#[tokio::test]
async fn test_unlike_removes_existing_record() {
    let directory = directory_with_likes(2).await;
    let pin_id = PinId::from(PIN);
    let walker = UserId::from(WALKER);
    directory.commit_like(&walker, &pin_id).await.unwrap();

    let (deps, mut events) = view_deps(WALKER, directory.clone());
    let view = PinViewHandle::open(deps, pin());
    wait_for(&mut events, engagement(3, true)).await;

    view.toggle_like().unwrap();
    wait_for(&mut events, engagement(3, false)).await;

    assert_eq!(
        view.close().await.unwrap(),
        FlushOutcome::Commit(LikeAction::Unlike)
    );
    eventually(|| directory.like_count(&pin_id) == 2).await;
    assert_eq!(directory.fetch_user_like(&pin_id, &walker).await.unwrap(), None);
}

#[tokio::test]
async fn test_dropping_handle_flushes_once() {
    let directory = directory_with_likes(0).await;
    let (deps, mut events) = view_deps(WALKER, directory.clone());
    let view = PinViewHandle::open(deps, pin());

    wait_for(&mut events, engagement(0, false)).await;
    view.toggle_like().unwrap();
    wait_for(&mut events, engagement(0, true)).await;
    drop(view);

    let pin_id = PinId::from(PIN);
    eventually(|| directory.like_count(&pin_id) == 1).await;
    assert_eq!(directory.subscriber_count(&pin_id), 0);
}

#[tokio::test]
async fn test_comment_refresh_only_on_count_change() {
    let directory = directory_with_likes(0).await;
    let pin_id = PinId::from(PIN);
    let first = directory.add_comment(&pin_id, &UserId::from("guide"), "Lovely spot");

    let (deps, mut events) = view_deps(WALKER, directory.clone());
    let view = PinViewHandle::open(deps, pin());

    let PresentationEvent::CommentsChanged { comments, .. } = wait_for(&mut events, |e| {
        matches!(e, PresentationEvent::CommentsChanged { .. })
    })
    .await
    else {
        unreachable!()
    };
    assert_eq!(comments.len(), 1);

    // Same count: the edit is not picked up
    assert!(directory.edit_comment(&pin_id, &first.id, "Lovely spot, bring water"));
    view.refresh_comments().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    directory.add_comment(&pin_id, &UserId::from(WALKER), "Agreed");
    view.refresh_comments().unwrap();

    let PresentationEvent::CommentsChanged { comments, .. } = wait_for(&mut events, |e| {
        matches!(e, PresentationEvent::CommentsChanged { .. })
    })
    .await
    else {
        unreachable!()
    };
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[1].text, "Agreed");

    view.close().await.unwrap();
}

#[tokio::test]
async fn test_comment_icon_reflects_own_comment() {
    let directory = directory_with_likes(0).await;
    directory.add_comment(&PinId::from(PIN), &UserId::from(WALKER), "Been here");

    let (deps, mut events) = view_deps(WALKER, directory);
    let view = PinViewHandle::open(deps, pin());

    assert_eq!(
        wait_for(&mut events, |e| matches!(
            e,
            PresentationEvent::CommentIconChanged { .. }
        ))
        .await,
        PresentationEvent::CommentIconChanged {
            pin: PinId::from(PIN),
            has_commented: true,
        }
    );
    view.close().await.unwrap();
}

#[tokio::test]
async fn test_opening_marks_others_pins_viewed() {
    let directory = directory_with_likes(0).await;
    let (deps, _events) = view_deps(WALKER, directory.clone());
    let view = PinViewHandle::open(deps, pin());

    let walker = UserId::from(WALKER);
    let pin_id = PinId::from(PIN);
    eventually(|| directory.has_viewed(&walker, &pin_id)).await;
    view.close().await.unwrap();

    // Owners do not record views of their own pins
    let (deps, _events) = view_deps("guide", directory.clone());
    let view = PinViewHandle::open(deps, pin());
    view.close().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!directory.has_viewed(&UserId::from("guide"), &pin_id));
}

#[tokio::test]
async fn test_write_failures_do_not_break_the_view() {
    let directory = directory_with_likes(4).await;
    directory.set_fail_writes(true);

    let (deps, mut events) = view_deps(WALKER, directory.clone());
    let view = PinViewHandle::open(deps, pin());
    wait_for(&mut events, engagement(4, false)).await;

    view.toggle_like().unwrap();
    assert_eq!(
        view.close().await.unwrap(),
        FlushOutcome::Commit(LikeAction::Like)
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    let pin_id = PinId::from(PIN);
    assert_eq!(directory.like_count(&pin_id), 4);
    assert!(!directory.has_viewed(&UserId::from(WALKER), &pin_id));
}

#[tokio::test]
async fn test_reopening_subscribes_again() {
    let directory = directory_with_likes(0).await;
    let (deps, _events) = view_deps(WALKER, directory.clone());
    let view = PinViewHandle::open(deps.clone(), pin());
    view.close().await.unwrap();

    let view = PinViewHandle::open(deps, pin());
    assert_eq!(directory.subscriber_count(&PinId::from(PIN)), 1);
    view.close().await.unwrap();
    assert_eq!(directory.subscriber_count(&PinId::from(PIN)), 0);
}

#[tokio::test]
async fn test_live_deltas_are_pin_scoped_and_applied_per_delivery() {
    let (directory, deltas) = ScriptedDirectory::new(5);
    let cancelled = directory.subscription_cancelled();
    let (deps, mut events) = view_deps_with(WALKER, Arc::new(directory));
    let view = PinViewHandle::open(deps, pin());
    wait_for(&mut events, engagement(5, false)).await;

    let like = |pin: &str| LikeDeltaEvent {
        pin_id: PinId::from(pin),
        direction: LikeDirection::Like,
        actor: UserId::from("stranger"),
    };
    deltas.send(like("other-pin")).unwrap();
    // The same event delivered twice counts twice
    deltas.send(like(PIN)).unwrap();
    deltas.send(like(PIN)).unwrap();

    let mut displayed = Vec::new();
    while displayed.len() < 2 {
        if let PresentationEvent::EngagementChanged {
            pin,
            displayed_count,
            ..
        } = wait_for(&mut events, |e| {
            matches!(e, PresentationEvent::EngagementChanged { .. })
        })
        .await
        {
            assert_eq!(pin, PinId::from(PIN));
            displayed.push(displayed_count);
        }
    }
    assert_eq!(displayed, vec![6, 7]);

    // The event for the other pin left no trace
    tokio::time::sleep(Duration::from_millis(50)).await;
    while let Ok(event) = events.try_recv() {
        assert!(
            !matches!(event, PresentationEvent::EngagementChanged { .. }),
            "Unexpected engagement change: {:?}",
            event
        );
    }

    assert_eq!(view.close().await.unwrap(), FlushOutcome::NoOp);
    assert!(cancelled.load(Ordering::SeqCst));
}
