use std::sync::Arc;
use std::thread;

use rust_decimal_macros::dec;

use tally_core::{ExpenseId, Money, ParticipantId};
use tally_expenses::ExpenseUpdate;
use tally_ledger::LedgerEvent;
use tally_service::{ServiceConfig, SharingService};
use tally_splitting::{ExpenseSpec, Split};

fn p(id: &str) -> ParticipantId {
    ParticipantId::new(id).unwrap()
}

fn money(s: &str) -> Money {
    s.parse().unwrap()
}

fn spec(payer: &str, total: &str, split: Split, participants: &[&str]) -> ExpenseSpec {
    ExpenseSpec::new(
        p(payer),
        money(total),
        split,
        participants.iter().map(|id| p(id)).collect(),
    )
}

fn service() -> SharingService<tally_events::InMemoryEventBus<tally_service::LedgerEnvelope>> {
    tally_observability::init();
    SharingService::in_memory(ServiceConfig::default())
}

#[test]
fn equal_then_exact_expenses_are_netted() {
    let service = service();

    service
        .record_expense("dinner", spec("u1", "1000", Split::Equal, &["u1", "u2", "u3", "u4"]))
        .unwrap();
    let sheet = service.all_balances().unwrap();
    assert_eq!(sheet.len(), 3);
    assert_eq!(sheet.owed(&p("u4"), &p("u1")), money("250"));

    service
        .record_expense(
            "groceries",
            spec("u2", "1200", Split::Exact(vec![dec!(480), dec!(720)]), &["u1", "u3"]),
        )
        .unwrap();

    let u1 = service.user_balances(&p("u1")).unwrap();
    assert_eq!(u1.owes(&p("u2")), money("230"));
    assert_eq!(u1.owed_by(&p("u3")), money("250"));
    assert_eq!(u1.owed_by(&p("u4")), money("250"));

    let u3 = service.user_balances(&p("u3")).unwrap();
    assert_eq!(u3.owes(&p("u2")), money("720"));
}

#[test]
fn percent_split_absorbs_remainder_on_last_participant() {
    let service = service();
    service
        .record_expense(
            "taxi",
            spec("u4", "1200", Split::Percent(vec![dec!(40), dec!(20), dec!(20), dec!(20)]), &["u1", "u2", "u3", "u4"]),
        )
        .unwrap();

    let sheet = service.all_balances().unwrap();
    assert_eq!(sheet.owed(&p("u1"), &p("u4")), money("480"));
    assert_eq!(sheet.owed(&p("u2"), &p("u4")), money("240"));
    assert_eq!(sheet.owed(&p("u3"), &p("u4")), money("240"));
    assert_eq!(sheet.len(), 3);
}

#[test]
fn invalid_expense_is_rejected_and_changes_nothing() {
    let service = service();
    let subscription = service.subscribe();
    service
        .record_expense("lunch", spec("u1", "100", Split::Equal, &["u1", "u2"]))
        .unwrap();
    let before = service.all_balances().unwrap();

    let err = service
        .record_expense(
            "broken",
            spec("u1", "1250", Split::Exact(vec![dec!(300), dec!(500)]), &["u2", "u3"]),
        )
        .unwrap_err();
    assert!(err.is_validation());

    let err = service
        .record_expense(
            "broken",
            spec("u1", "100", Split::Percent(vec![dec!(50), dec!(40)]), &["u2", "u3"]),
        )
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(service.all_balances().unwrap(), before);
    assert_eq!(service.passbook(&p("u1")).unwrap().len(), 1);
    assert_eq!(subscription.drain().len(), 1);
}

#[test]
fn simplification_collapses_chains_and_can_be_reverted() {
    let service = service();
    service
        .record_expense("a", spec("b", "100", Split::Equal, &["a"]))
        .unwrap();
    service
        .record_expense("b", spec("c", "100", Split::Equal, &["b"]))
        .unwrap();

    service.set_simplification_enabled(true).unwrap();
    assert!(service.simplification_enabled().unwrap());
    let sheet = service.all_balances().unwrap();
    assert_eq!(sheet.len(), 1);
    assert_eq!(sheet.owed(&p("a"), &p("c")), money("100"));
    assert!(service.user_balances(&p("b")).unwrap().is_empty());

    service.set_simplification_enabled(false).unwrap();
    let sheet = service.all_balances().unwrap();
    assert_eq!(sheet.len(), 2);
    assert_eq!(sheet.owed(&p("b"), &p("c")), money("100"));
}

#[test]
fn simplify_on_start_serves_simplified_view() {
    tally_observability::init();
    let service = SharingService::in_memory(ServiceConfig {
        simplify_on_start: true,
        ..ServiceConfig::default()
    });
    assert!(service.simplification_enabled().unwrap());

    service
        .record_expense("x", spec("b", "30", Split::Equal, &["a"]))
        .unwrap();
    service
        .record_expense("y", spec("c", "30", Split::Equal, &["b"]))
        .unwrap();
    assert_eq!(service.all_balances().unwrap().owed(&p("a"), &p("c")), money("30"));
}

#[test]
fn events_are_published_in_sequence() {
    let service = service();
    let subscription = service.subscribe();
    let ledger_id = service.ledger_id().unwrap().to_string();

    let expense_id = service
        .record_expense("rent", spec("u1", "90", Split::Share(vec![dec!(1), dec!(2)]), &["u2", "u3"]))
        .unwrap();
    service.set_simplification_enabled(true).unwrap();
    // Same mode again: nothing is published.
    service.set_simplification_enabled(true).unwrap();

    let envelopes = subscription.drain();
    assert_eq!(envelopes.len(), 2);
    assert!(envelopes.iter().all(|e| e.stream() == ledger_id));
    assert_eq!(envelopes[0].sequence_number(), 1);
    assert_eq!(envelopes[1].sequence_number(), 2);
    assert_eq!(envelopes[0].event_type(), "ledger.expense_recorded");

    match envelopes[0].payload() {
        LedgerEvent::ExpenseRecorded(e) => {
            assert_eq!(e.expense_id, expense_id);
            let amounts: Vec<Money> = e.shares.iter().map(|s| s.amount).collect();
            assert_eq!(amounts, vec![money("30"), money("60")]);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let json = serde_json::to_value(&envelopes[1]).unwrap();
    assert_eq!(json["event_type"], "ledger.simplification_toggled");
}

#[test]
fn metadata_updates_leave_balances_alone() {
    let service = service();
    let id = service
        .record_expense("trip", spec("u1", "300", Split::Equal, &["u1", "u2", "u3"]))
        .unwrap();
    let before = service.all_balances().unwrap();

    let updated = service
        .update_expense(
            &id,
            ExpenseUpdate {
                name: Some("road trip".into()),
                notes: Some("fuel and tolls".into()),
                ..ExpenseUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name(), "road trip");
    assert_eq!(service.expense(&id).unwrap().notes(), "fuel and tolls");
    assert_eq!(service.all_balances().unwrap(), before);

    let missing = ExpenseId::new();
    assert!(service.update_expense(&missing, ExpenseUpdate::default()).unwrap_err().is_not_found());
    assert!(service.expense(&missing).unwrap_err().is_not_found());
}

#[test]
fn passbook_lists_expenses_in_recording_order() {
    let service = service();
    let first = service
        .record_expense("one", spec("u1", "20", Split::Equal, &["u2"]))
        .unwrap();
    service
        .record_expense("two", spec("u3", "20", Split::Equal, &["u4"]))
        .unwrap();
    let third = service
        .record_expense("three", spec("u4", "20", Split::Equal, &["u1"]))
        .unwrap();

    let ids: Vec<ExpenseId> = service
        .passbook(&p("u1"))
        .unwrap()
        .iter()
        .map(|e| e.id_typed())
        .collect();
    assert_eq!(ids, vec![first, third]);
    assert!(service.passbook(&p("nobody")).unwrap().is_empty());
}

#[test]
fn concurrent_writers_and_readers_see_consistent_totals() {
    let service = Arc::new(service());
    let writers: Vec<_> = (0..4)
        .map(|w| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..25 {
                    service
                        .record_expense(
                            "coffee",
                            spec(&format!("w{w}"), "4", Split::Equal, &["shared"]),
                        )
                        .unwrap();
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..25 {
                    let total = service.user_balances(&p("shared")).unwrap().net();
                    // Every expense moves exactly 4.00 onto "shared".
                    assert_eq!(total.minor() % 400, 0);
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    let shared = service.user_balances(&p("shared")).unwrap();
    assert_eq!(shared.net(), money("-400"));
    for w in 0..4 {
        assert_eq!(shared.owes(&p(&format!("w{w}"))), money("100"));
    }
}

#[test]
fn overflowing_expense_is_rejected_without_poisoning_the_service() {
    let service = service();
    let huge = ExpenseSpec::new(
        p("u1"),
        Money::from_minor(i64::MAX / 2 + 10),
        Split::Equal,
        vec![p("u2")],
    );

    service.record_expense("first", huge.clone()).unwrap();
    let before = service.all_balances().unwrap();
    let err = service.record_expense("second", huge).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(service.all_balances().unwrap(), before);
    assert_eq!(service.passbook(&p("u1")).unwrap().len(), 1);

    service
        .record_expense("small", spec("u3", "10", Split::Equal, &["u4"]))
        .unwrap();
    assert_eq!(service.all_balances().unwrap().owed(&p("u4"), &p("u3")), money("10"));
}
