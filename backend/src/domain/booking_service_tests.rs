//! Tests for the booking orchestrator.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{BookingStoreError, MockBookingStore, MockConfirmationSender};
use crate::test_support::clock::MutableClock;

fn clock() -> Arc<dyn Clock> {
    Arc::new(MutableClock::at("2026-04-30T08:00:00Z"))
}

#[fixture]
fn request() -> CreateBookingRequest {
    CreateBookingRequest {
        place_id: "gym-1".into(),
        slot_id: "2026-05-04T18:30:00.000Z~60".into(),
        people: Some(2),
        email: Some("Anna@Example.IT".into()),
        phone: None,
        token: "req-1".into(),
    }
}

fn service(
    store: MockBookingStore,
    sender: MockConfirmationSender,
) -> BookingService<MockBookingStore, MockConfirmationSender> {
    BookingService::new(Arc::new(store), Arc::new(sender), clock())
}

fn is_create(transaction: &BookingTransaction) -> bool {
    matches!(transaction, BookingTransaction::Create { .. })
}

fn is_release(transaction: &BookingTransaction) -> bool {
    matches!(transaction, BookingTransaction::Release { .. })
}

#[rstest]
#[tokio::test]
async fn successful_booking_persists_notifies_and_returns_receipt(request: CreateBookingRequest) {
    let mut store = MockBookingStore::new();
    store
        .expect_apply()
        .withf(|transaction, token| is_create(transaction) && token.as_str() == "req-1")
        .times(1)
        .returning(|_, _| Ok(()));
    let mut sender = MockConfirmationSender::new();
    sender
        .expect_send_confirmation()
        .withf(|booking| booking.email().map(EmailAddress::as_str) == Some("anna@example.it"))
        .times(1)
        .returning(|_| Ok(()));

    let receipt = service(store, sender)
        .book(request)
        .await
        .expect("booking succeeds");

    assert_eq!(receipt.booked_people, 2);
    assert_eq!(receipt.method, ContactMethod::Email);
    assert_eq!(receipt.duration, 60);
    assert_eq!(receipt.created_at, receipt.last_update);
}

#[rstest]
#[case::missing_people(|r: &mut CreateBookingRequest| r.people = None)]
#[case::zero_people(|r: &mut CreateBookingRequest| r.people = Some(0))]
#[case::negative_people(|r: &mut CreateBookingRequest| r.people = Some(-3))]
#[case::oversized_people(|r: &mut CreateBookingRequest| r.people = Some(i64::MAX))]
#[case::both_contacts(|r: &mut CreateBookingRequest| r.phone = Some("3331234567".into()))]
#[case::no_contact(|r: &mut CreateBookingRequest| r.email = Some("  ".into()))]
#[case::bad_email(|r: &mut CreateBookingRequest| r.email = Some("anna@".into()))]
#[case::bad_phone(|r: &mut CreateBookingRequest| {
    r.email = None;
    r.phone = Some("+441234567890".into());
})]
#[case::bad_slot(|r: &mut CreateBookingRequest| r.slot_id = "tomorrow".into())]
#[case::empty_place(|r: &mut CreateBookingRequest| r.place_id = String::new())]
#[case::bad_token(|r: &mut CreateBookingRequest| r.token = "has space".into())]
#[tokio::test]
async fn invalid_input_has_no_side_effects(
    mut request: CreateBookingRequest,
    #[case] mutate: fn(&mut CreateBookingRequest),
) {
    mutate(&mut request);
    let mut store = MockBookingStore::new();
    store.expect_apply().never();
    let mut sender = MockConfirmationSender::new();
    sender.expect_send_confirmation().never();

    let error = service(store, sender)
        .book(request)
        .await
        .expect_err("validation fails");

    assert!(matches!(error, BookingError::Validation { .. }));
}

#[rstest]
fn phone_only_request_is_normalised(mut request: CreateBookingRequest) {
    request.email = None;
    request.phone = Some("0039 333 123 4567".into());

    let (new_booking, _) = validate_booking_request(request).expect("valid");

    assert_eq!(new_booking.method, ContactMethod::Phone);
    assert_eq!(
        new_booking.phone.as_ref().map(|p| p.as_str()),
        Some("+393331234567")
    );
    assert!(new_booking.email.is_none());
}

#[rstest]
#[case(BookingStoreError::conflict("slot full"), ErrorCode::Conflict)]
#[case(BookingStoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[tokio::test]
async fn store_failure_skips_notification(
    request: CreateBookingRequest,
    #[case] failure: BookingStoreError,
    #[case] expected: ErrorCode,
) {
    let mut store = MockBookingStore::new();
    store
        .expect_apply()
        .times(1)
        .return_once(move |_, _| Err(failure));
    let mut sender = MockConfirmationSender::new();
    sender.expect_send_confirmation().never();

    let error = service(store, sender)
        .create_booking(request)
        .await
        .expect_err("store rejects");

    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn failed_confirmation_releases_the_booking_under_the_rollback_token(
    request: CreateBookingRequest,
) {
    let rollback_token = TransactionToken::new("req-1").expect("token").rollback();
    let mut store = MockBookingStore::new();
    store
        .expect_apply()
        .withf(|transaction, _| is_create(transaction))
        .times(1)
        .returning(|_, _| Ok(()));
    store
        .expect_apply()
        .withf(move |transaction, token| {
            is_release(transaction) && *token == rollback_token
        })
        .times(1)
        .returning(|_, _| Ok(()));
    let mut sender = MockConfirmationSender::new();
    sender
        .expect_send_confirmation()
        .times(1)
        .returning(|_| Err(NotificationError::delivery("relay down")));

    let error = service(store, sender)
        .book(request)
        .await
        .expect_err("confirmation fails");

    assert_eq!(
        error,
        BookingError::Notification(NotificationError::delivery("relay down"))
    );
}

#[rstest]
#[tokio::test]
async fn failed_rollback_reports_both_errors(request: CreateBookingRequest) {
    let mut store = MockBookingStore::new();
    store
        .expect_apply()
        .withf(|transaction, _| is_create(transaction))
        .times(1)
        .returning(|_, _| Ok(()));
    store
        .expect_apply()
        .withf(|transaction, _| is_release(transaction))
        .times(1)
        .returning(|_, _| Err(BookingStoreError::connection("pool exhausted")));
    let mut sender = MockConfirmationSender::new();
    sender
        .expect_send_confirmation()
        .times(1)
        .returning(|_| Err(NotificationError::bad_request("no email")));

    let error = service(store, sender)
        .book(request)
        .await
        .expect_err("rollback fails");

    assert_eq!(
        error,
        BookingError::RollbackFailed {
            trigger: NotificationError::bad_request("no email"),
            rollback: BookingStoreError::connection("pool exhausted"),
        }
    );
    assert_eq!(Error::from(error).code(), ErrorCode::RollbackFailed);
}

#[tokio::test]
async fn persist_and_confirm_releases_what_it_stored() {
    let booking = create_booking(
        NewBooking {
            place_id: PlaceId::new("gym-1").expect("place"),
            slot_id: SlotId::parse("2026-05-04T18:30:00.000Z~60").expect("slot"),
            people: 3,
            method: ContactMethod::Email,
            email: None,
            phone: None,
        },
        clock().as_ref(),
        &mut rand::thread_rng(),
    );
    let expected = booking.locator();
    let mut store = MockBookingStore::new();
    store
        .expect_apply()
        .withf(|transaction, _| is_create(transaction))
        .times(1)
        .returning(|_, _| Ok(()));
    store
        .expect_apply()
        .withf(move |transaction, _| {
            matches!(transaction, BookingTransaction::Release { locator, .. } if *locator == expected)
        })
        .times(1)
        .returning(|_, _| Ok(()));
    let mut sender = MockConfirmationSender::new();
    sender
        .expect_send_confirmation()
        .times(1)
        .returning(|_| Err(NotificationError::bad_request("no email")));

    let error = service(store, sender)
        .persist_and_confirm(booking, &TransactionToken::new("req-9").expect("token"))
        .await
        .expect_err("no email to confirm");

    assert!(matches!(
        error,
        BookingError::Notification(NotificationError::BadRequest { .. })
    ));
}
