mod common;

use std::time::Duration;

use common::{photo, Call, FakeCapabilities, FakePoster, Harness};
use memstream_core::storage::SharePromptConfig;
use memstream_core::{
    Clock, Contact, ContactBook, Event, Photo, PromptChoice, PromptReport, Relationship,
    SharePromptTimer, SocialPlatform, TimerKind,
};

fn prompt_timer(h: &Harness, config: SharePromptConfig) -> SharePromptTimer {
    SharePromptTimer::new(config, Duration::from_secs(10), "look at this", h.ctx.clone())
}

fn choosing(choice: PromptChoice) -> FakeCapabilities {
    FakeCapabilities {
        prompt_choice: choice,
        ..FakeCapabilities::default()
    }
}

#[tokio::test(start_paused = true)]
async fn prompt_defers_for_remaining_snooze() {
    let h = Harness::new(
        choosing(PromptChoice::SharePublic),
        FakePoster::default(),
        vec![photo("a")],
    );
    let timer = prompt_timer(&h, SharePromptConfig::default());
    h.snooze.snooze_for(Duration::from_secs(10), h.clock.now()).unwrap();
    h.clock.advance(Duration::from_secs(3));

    assert_eq!(
        timer.fire().await,
        PromptReport::Deferred {
            delay: Duration::from_secs(7)
        }
    );
    assert!(h.caps.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn share_publicly_opens_intent_and_snoozes() {
    let h = Harness::new(
        choosing(PromptChoice::SharePublic),
        FakePoster::default(),
        vec![photo("a"), photo("b")],
    );
    let timer = prompt_timer(&h, SharePromptConfig::default());

    let report = timer.fire().await;

    assert_eq!(
        report,
        PromptReport::Shown {
            photo_id: "a".into(),
            choice: PromptChoice::SharePublic
        }
    );
    let calls = h.caps.calls();
    assert_eq!(
        calls[0],
        Call::Prompt {
            photo_id: "a".into(),
            candidates: 2
        }
    );
    match &calls[1] {
        Call::OpenUrl(url) => {
            assert!(url.starts_with("https://twitter.com/intent/tweet?"));
            assert!(url.contains("example.com%2Fa.jpg"));
        }
        other => panic!("expected an intent url, got {other:?}"),
    }
    assert!(h.snooze.is_snoozing(h.clock.now()));
}

#[tokio::test(start_paused = true)]
async fn share_publicly_skips_local_photos_without_snoozing() {
    let mut h = Harness::new(
        choosing(PromptChoice::SharePublic),
        FakePoster::default(),
        vec![Photo::new("local", "file:///sdcard/DCIM/a.jpg", "Local")],
    );
    let timer = prompt_timer(&h, SharePromptConfig::default());

    let report = timer.fire().await;

    assert_eq!(
        report,
        PromptReport::Shown {
            photo_id: "local".into(),
            choice: PromptChoice::SharePublic
        }
    );
    assert!(!h
        .caps
        .calls()
        .iter()
        .any(|c| matches!(c, Call::OpenUrl(_))));
    assert!(h.snooze.snooze_until().is_none());

    let mut skipped = false;
    while let Ok(event) = h.events.try_recv() {
        if let Event::PublicShareSkipped { photo_id, url, .. } = event {
            assert_eq!(photo_id, "local");
            assert_eq!(url, "file:///sdcard/DCIM/a.jpg");
            skipped = true;
        }
    }
    assert!(skipped);
}

#[tokio::test(start_paused = true)]
async fn share_with_person_falls_back_to_clipboard() {
    let h = Harness::new(
        choosing(PromptChoice::SharePerson),
        FakePoster::default(),
        vec![photo("a")],
    );
    let timer = prompt_timer(&h, SharePromptConfig::default());

    timer.fire().await;

    assert_eq!(
        &h.caps.calls()[1..],
        &[
            Call::ShareApp("https://example.com/a.jpg".into()),
            Call::Clipboard("https://example.com/a.jpg".into()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn dismissing_the_prompt_does_not_snooze() {
    let h = Harness::new(
        choosing(PromptChoice::Dismissed),
        FakePoster::default(),
        vec![photo("a")],
    );
    let timer = prompt_timer(&h, SharePromptConfig::default());

    timer.fire().await;

    assert_eq!(h.caps.calls().len(), 1);
    assert!(!h.snooze.is_snoozing(h.clock.now()));
}

#[tokio::test(start_paused = true)]
async fn prompt_ranking_uses_stored_contacts_and_platforms() {
    let h = Harness::new(
        choosing(PromptChoice::ShareGallery),
        FakePoster::new(vec![SocialPlatform::LinkedIn], true),
        vec![photo("a")],
    );
    let mut book = ContactBook::new();
    book.tag_photo("a", Contact::new("mom", "Mom", Relationship::Family));
    book.save(h.store.as_ref()).unwrap();
    let timer = prompt_timer(&h, SharePromptConfig::default());

    timer.fire().await;

    // LinkedIn(4) plus Mom as the family entry.
    assert_eq!(
        h.caps.calls(),
        vec![
            Call::Prompt {
                photo_id: "a".into(),
                candidates: 2
            },
            Call::Gallery("https://example.com/a.jpg".into()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn no_photos_means_no_prompt() {
    let h = Harness::new(choosing(PromptChoice::SharePublic), FakePoster::default(), vec![]);
    let timer = prompt_timer(&h, SharePromptConfig::default());
    assert_eq!(timer.fire().await, PromptReport::Idle);
}

#[tokio::test(start_paused = true)]
async fn run_fires_after_base_delay() {
    let mut h = Harness::new(
        choosing(PromptChoice::Dismissed),
        FakePoster::default(),
        vec![photo("a")],
    );
    let timer = std::sync::Arc::new(prompt_timer(
        &h,
        SharePromptConfig {
            enabled: true,
            min_delay_secs: 20,
            max_delay_secs: 20,
        },
    ));
    let task = {
        let timer = timer.clone();
        tokio::spawn(async move { timer.run().await })
    };

    let started = tokio::time::Instant::now();
    loop {
        match h.events.recv().await.unwrap() {
            Event::TimerArmed {
                timer: TimerKind::SharePrompt,
                delay_ms,
                ..
            } => assert_eq!(delay_ms, 20_000),
            Event::SharePromptShown { photo_id, .. } => {
                assert_eq!(photo_id, "a");
                break;
            }
            _ => {}
        }
    }
    assert!(tokio::time::Instant::now() - started >= Duration::from_secs(20));

    h.lifecycle.dispose();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn disabled_prompt_never_fires() {
    let h = Harness::new(
        choosing(PromptChoice::SharePublic),
        FakePoster::default(),
        vec![photo("a")],
    );
    let timer = std::sync::Arc::new(prompt_timer(
        &h,
        SharePromptConfig {
            enabled: false,
            ..SharePromptConfig::default()
        },
    ));
    let task = {
        let timer = timer.clone();
        tokio::spawn(async move { timer.run().await })
    };
    tokio::time::sleep(Duration::from_secs(600)).await;
    h.lifecycle.dispose();
    task.await.unwrap();
    assert!(h.caps.calls().is_empty());
}
