// Status lifecycle state machine: the transition table, terminal-state
// rejection, once-only timestamps, and the paid-over-overdue tie break.

use chrono::{NaiveDate, Utc};
use faktura::core::AppError;
use faktura::invoices::{Invoice, InvoiceStatus, LifecycleEvent};
use rust_decimal_macros::dec;

fn invoice_due(due: NaiveDate) -> Invoice {
    let mut invoice = Invoice::new(
        "user-1".to_string(),
        "INV7".to_string(),
        None,
        None,
        dec!(0),
        dec!(0),
        due,
        0,
    )
    .unwrap();
    invoice.total_amount = dec!(200);
    invoice
}

fn sent_invoice() -> Invoice {
    let mut invoice = invoice_due(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    invoice.apply_event(LifecycleEvent::Send, Utc::now()).unwrap();
    invoice
}

#[test]
fn test_draft_to_sent_sets_sent_at_once() {
    let mut invoice = invoice_due(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    let t0 = Utc::now();

    invoice.apply_event(LifecycleEvent::Send, t0).unwrap();

    assert_eq!(invoice.status, InvoiceStatus::Sent);
    assert_eq!(invoice.sent_at, Some(t0));
}

#[test]
fn test_resending_a_sent_invoice_is_rejected() {
    let mut invoice = sent_invoice();

    let result = invoice.apply_event(LifecycleEvent::Send, Utc::now());
    assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));
}

#[test]
fn test_sent_to_viewed_sets_viewed_at() {
    let mut invoice = sent_invoice();
    let t1 = Utc::now();

    invoice.apply_event(LifecycleEvent::MarkViewed, t1).unwrap();

    assert_eq!(invoice.status, InvoiceStatus::Viewed);
    assert_eq!(invoice.viewed_at, Some(t1));
}

#[test]
fn test_partial_payment_moves_to_partial() {
    let mut invoice = sent_invoice();
    invoice.paid_amount = dec!(80);

    invoice
        .apply_event(LifecycleEvent::PaymentRecorded, Utc::now())
        .unwrap();

    assert_eq!(invoice.status, InvoiceStatus::Partial);
    assert!(invoice.paid_at.is_none());
}

#[test]
fn test_full_payment_moves_to_paid_and_stamps_paid_at() {
    let mut invoice = sent_invoice();
    invoice.paid_amount = dec!(200);
    let t1 = Utc::now();

    invoice
        .apply_event(LifecycleEvent::PaymentRecorded, t1)
        .unwrap();

    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.paid_at, Some(t1));
}

#[test]
fn test_overpayment_still_moves_to_paid() {
    let mut invoice = sent_invoice();
    invoice.paid_amount = dec!(250);

    invoice
        .apply_event(LifecycleEvent::PaymentRecorded, Utc::now())
        .unwrap();

    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.balance_due(), dec!(-50));
}

#[test]
fn test_payment_on_draft_is_rejected() {
    let mut invoice = invoice_due(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    invoice.paid_amount = dec!(50);

    let result = invoice.apply_event(LifecycleEvent::PaymentRecorded, Utc::now());
    assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));
    assert_eq!(invoice.status, InvoiceStatus::Draft);
}

#[test]
fn test_sent_past_due_becomes_overdue() {
    // status sent, due date in the past, nothing paid
    let mut invoice = sent_invoice();
    let after_due = NaiveDate::from_ymd_opt(2025, 7, 2).unwrap();

    assert!(invoice.evaluate_overdue(after_due));
    assert_eq!(invoice.status, InvoiceStatus::Overdue);
}

#[test]
fn test_not_overdue_on_the_due_date_itself() {
    let mut invoice = sent_invoice();
    let on_due = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();

    assert!(!invoice.evaluate_overdue(on_due));
    assert_eq!(invoice.status, InvoiceStatus::Sent);
}

#[test]
fn test_partial_past_due_becomes_overdue() {
    let mut invoice = sent_invoice();
    invoice.paid_amount = dec!(80);
    invoice
        .apply_event(LifecycleEvent::PaymentRecorded, Utc::now())
        .unwrap();

    assert!(invoice.evaluate_overdue(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    assert_eq!(invoice.status, InvoiceStatus::Overdue);
}

#[test]
fn test_full_payment_wins_over_overdue() {
    // both conditions true at once: fully paid and past due
    let mut invoice = sent_invoice();
    invoice.paid_amount = dec!(200);

    invoice
        .apply_event(LifecycleEvent::PaymentRecorded, Utc::now())
        .unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);

    // a fully paid invoice is never overdue regardless of date
    assert!(!invoice.evaluate_overdue(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    assert_eq!(invoice.status, InvoiceStatus::Paid);
}

#[test]
fn test_full_payment_recovers_an_overdue_invoice() {
    let mut invoice = sent_invoice();
    invoice.evaluate_overdue(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    assert_eq!(invoice.status, InvoiceStatus::Overdue);

    invoice.paid_amount = dec!(200);
    invoice
        .apply_event(LifecycleEvent::PaymentRecorded, Utc::now())
        .unwrap();

    assert_eq!(invoice.status, InvoiceStatus::Paid);
}

#[test]
fn test_partial_payment_leaves_overdue_in_place() {
    let mut invoice = sent_invoice();
    invoice.evaluate_overdue(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());

    invoice.paid_amount = dec!(80);
    invoice
        .apply_event(LifecycleEvent::PaymentRecorded, Utc::now())
        .unwrap();

    assert_eq!(invoice.status, InvoiceStatus::Overdue);
}

#[test]
fn test_cancel_reachable_from_every_non_terminal_state() {
    for setup in [
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Viewed,
        InvoiceStatus::Partial,
        InvoiceStatus::Overdue,
    ] {
        let mut invoice = invoice_due(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        invoice.status = setup;

        invoice.apply_event(LifecycleEvent::Cancel, Utc::now()).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Cancelled);
    }
}

#[test]
fn test_terminal_states_reject_every_event() {
    for terminal in [InvoiceStatus::Paid, InvoiceStatus::Cancelled] {
        for event in [
            LifecycleEvent::Send,
            LifecycleEvent::MarkViewed,
            LifecycleEvent::PaymentRecorded,
            LifecycleEvent::Cancel,
        ] {
            let mut invoice = invoice_due(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
            invoice.status = terminal;

            let result = invoice.apply_event(event, Utc::now());
            assert!(
                matches!(result, Err(AppError::InvalidStateTransition(_))),
                "{:?} must reject {:?}",
                terminal,
                event
            );
            assert_eq!(invoice.status, terminal);
        }
    }
}

#[test]
fn test_overdue_evaluation_leaves_terminal_states_alone() {
    for terminal in [InvoiceStatus::Paid, InvoiceStatus::Cancelled] {
        let mut invoice = invoice_due(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        invoice.status = terminal;

        assert!(!invoice.evaluate_overdue(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
        assert_eq!(invoice.status, terminal);
    }
}

#[test]
fn test_sent_at_survives_later_transitions() {
    let mut invoice = invoice_due(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    let t0 = Utc::now();
    invoice.apply_event(LifecycleEvent::Send, t0).unwrap();

    let t1 = Utc::now();
    invoice.apply_event(LifecycleEvent::MarkViewed, t1).unwrap();

    assert_eq!(invoice.sent_at, Some(t0));
    assert_eq!(invoice.viewed_at, Some(t1));
}
