//! Translation enrichment integration tests.
//!
//! The translator is a mock; these tests check that enrichment attaches
//! through the normal update path, never runs twice at once for a ticket
//! and never gets in the way of the workflow.

use std::sync::Arc;
use std::time::Duration;

use fixdesk_core::{
    storage::MemoryStorage,
    testing::{fixtures, MockTranslator},
    Config, Desk, TicketId, TicketStatus, Translator,
};

async fn desk_with(translator: Arc<MockTranslator>) -> Arc<Desk> {
    Desk::open(
        Arc::new(MemoryStorage::new()),
        Config::default(),
        Some(translator as Arc<dyn Translator>),
    )
    .await
    .expect("desk should open")
}

async fn wait_until_idle(desk: &Desk, id: &TicketId) {
    for _ in 0..200 {
        if !desk.translation_in_flight(id) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("translation for {} never finished", id);
}

#[tokio::test]
async fn test_translation_attached_after_create() {
    let translator = Arc::new(MockTranslator::new("מיקום: חדר 310"));
    let desk = desk_with(translator.clone()).await;

    let ticket = desk
        .create_ticket(fixtures::draft("Noa Levi", "Drain is blocked"))
        .await
        .unwrap();
    wait_until_idle(&desk, &ticket.id).await;

    let stored = desk.get_ticket(&ticket.id).await.unwrap();
    assert_eq!(stored.hebrew_translation.as_deref(), Some("מיקום: חדר 310"));
    assert_eq!(stored.status, TicketStatus::New);

    let contexts = translator.recorded_contexts();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].ticket_id, ticket.id);
    assert_eq!(contexts[0].description, "Drain is blocked");
}

#[tokio::test]
async fn test_concurrent_triggers_keep_one_request_in_flight() {
    let translator = Arc::new(MockTranslator::new("תרגום").with_delay(Duration::from_millis(50)));
    let desk = desk_with(translator.clone()).await;
    let seed = TicketId::new(1001);

    let (a, b, c) = tokio::join!(
        desk.request_translation(&seed),
        desk.request_translation(&seed),
        desk.request_translation(&seed),
    );
    let started: Vec<_> = [a, b, c].into_iter().flatten().collect();
    assert_eq!(started.len(), 1);
    assert!(desk.translation_in_flight(&seed));

    for handle in started {
        handle.await.unwrap();
    }

    assert_eq!(translator.call_count(), 1);
    assert_eq!(translator.max_concurrent(), 1);
    assert!(!desk.translation_in_flight(&seed));

    // Already translated, nothing more to do
    assert!(desk.request_translation(&seed).await.is_none());
}

#[tokio::test]
async fn test_failed_translation_leaves_ticket_usable() {
    let translator = Arc::new(MockTranslator::failing());
    let desk = desk_with(translator.clone()).await;
    let seed = TicketId::new(1001);

    let handle = desk.request_translation(&seed).await.unwrap();
    handle.await.unwrap();

    let ticket = desk.get_ticket(&seed).await.unwrap();
    assert!(ticket.hebrew_translation.is_none());

    let started = desk.start_work(&seed).await.unwrap();
    assert_eq!(started.status, TicketStatus::InProcess);

    // Not retried on its own, but can be asked for again
    assert_eq!(translator.call_count(), 1);
    translator.set_failing(false);
    let handle = desk.request_translation(&seed).await.unwrap();
    handle.await.unwrap();
    assert!(desk.get_ticket(&seed).await.unwrap().hebrew_translation.is_some());
}

#[tokio::test]
async fn test_pending_translation_does_not_block_workflow() {
    let translator =
        Arc::new(MockTranslator::new("תרגום").with_delay(Duration::from_millis(100)));
    let desk = desk_with(translator).await;
    let seed = TicketId::new(1001);

    let handle = desk.request_translation(&seed).await.unwrap();

    desk.assign_worker(&seed, "Beni").await.unwrap();
    let started = desk.start_work(&seed).await.unwrap();
    assert_eq!(started.status, TicketStatus::InProcess);
    assert!(started.hebrew_translation.is_none());

    handle.await.unwrap();

    // The late translation merges without undoing the status change
    let ticket = desk.get_ticket(&seed).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::InProcess);
    assert_eq!(ticket.assigned_worker.as_deref(), Some("Beni"));
    assert_eq!(ticket.hebrew_translation.as_deref(), Some("תרגום"));
}

#[tokio::test]
async fn test_enrich_pending_covers_untranslated_tickets() {
    let translator = Arc::new(MockTranslator::new("תרגום").with_delay(Duration::from_millis(20)));
    let desk = desk_with(translator.clone()).await;

    let handles = desk.enrich_pending().await;
    assert_eq!(handles.len(), 1);
    for handle in handles {
        handle.await.unwrap();
    }

    assert!(desk.enrich_pending().await.is_empty());
    assert_eq!(translator.call_count(), 1);
}
