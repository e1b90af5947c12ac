//! Dispatch rule coverage for [`ConfirmationDispatcher`].

use super::*;
use crate::domain::ports::{
    EmailTransportError, MockEmailTransport, MockPlaceDirectory, MockSmsTransport,
    PlaceDirectoryError, SmsTransportError,
};
use crate::domain::{EmailAddress, NewBooking, PlaceId, SlotId, create_booking, normalize_phone};
use crate::test_support::clock::MutableClock;
use crate::test_support::transports::{
    RecordingEmailTransport, RecordingSmsTransport, StaticPlaceDirectory,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rstest::rstest;

fn booking(method: ContactMethod, email: Option<&str>, phone: Option<&str>) -> Booking {
    create_booking(
        NewBooking {
            place_id: PlaceId::new("gym-1").expect("place"),
            slot_id: SlotId::parse("2026-05-04T18:30:00Z~60").expect("slot"),
            people: 1,
            method,
            email: email.map(|e| EmailAddress::parse(e).expect("email")),
            phone: phone.map(|p| normalize_phone(p).expect("phone")),
        },
        &MutableClock::at("2026-04-30T08:00:00Z"),
        &mut StdRng::seed_from_u64(21),
    )
}

fn dispatcher(
    email: Arc<dyn EmailTransport>,
    sms: Arc<dyn SmsTransport>,
    places: Arc<dyn PlaceDirectory>,
) -> ConfirmationDispatcher {
    ConfirmationDispatcher::new(email, sms, places, ConfirmationSettings::default())
}

#[tokio::test]
async fn email_method_sends_one_email_with_place_name() {
    let email = Arc::new(RecordingEmailTransport::default());
    let sms = Arc::new(RecordingSmsTransport::default());
    let places = Arc::new(StaticPlaceDirectory::default().with_place("gym-1", "Palestra Centrale"));
    let booking = booking(ContactMethod::Email, Some("anna@example.it"), None);

    dispatcher(email.clone(), sms.clone(), places)
        .send_confirmation(&booking)
        .await
        .expect("confirmation sent");

    let sent = email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to.as_str(), "anna@example.it");
    assert!(sent[0].text_body.contains("Palestra Centrale"));
    assert!(sms.sent().is_empty());
}

#[tokio::test]
async fn phone_method_sends_one_sms() {
    let email = Arc::new(RecordingEmailTransport::default());
    let sms = Arc::new(RecordingSmsTransport::default());
    let booking = booking(ContactMethod::Phone, None, Some("3331234567"));

    dispatcher(email.clone(), sms.clone(), Arc::new(StaticPlaceDirectory::default()))
        .send_confirmation(&booking)
        .await
        .expect("confirmation sent");

    let sent = sms.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to.as_str(), "+393331234567");
    assert!(sent[0].body.contains(booking.public_id().as_str()));
    assert!(email.sent().is_empty());
}

#[rstest]
#[case(ContactMethod::Email, None, Some("3331234567"))]
#[case(ContactMethod::Phone, Some("anna@example.it"), None)]
#[case(ContactMethod::Email, None, None)]
#[tokio::test]
async fn mismatched_contact_is_a_bad_request_without_delivery(
    #[case] method: ContactMethod,
    #[case] email_value: Option<&str>,
    #[case] phone_value: Option<&str>,
) {
    let mut email = MockEmailTransport::new();
    email.expect_send().never();
    let mut sms = MockSmsTransport::new();
    sms.expect_send().never();
    let mut places = MockPlaceDirectory::new();
    places.expect_place_name().never();

    let result = dispatcher(Arc::new(email), Arc::new(sms), Arc::new(places))
        .send_confirmation(&booking(method, email_value, phone_value))
        .await;

    assert!(matches!(result, Err(NotificationError::BadRequest { .. })));
}

#[tokio::test]
async fn place_lookup_failure_falls_back_to_the_raw_id() {
    let email = Arc::new(RecordingEmailTransport::default());
    let mut places = MockPlaceDirectory::new();
    places
        .expect_place_name()
        .times(1)
        .returning(|_| Err(PlaceDirectoryError::connection("timeout")));

    dispatcher(email.clone(), Arc::new(RecordingSmsTransport::default()), Arc::new(places))
        .send_confirmation(&booking(ContactMethod::Email, Some("anna@example.it"), None))
        .await
        .expect("confirmation still sent");

    assert!(email.sent()[0].text_body.contains("per gym-1 del"));
}

#[tokio::test]
async fn email_transport_failure_is_a_delivery_error() {
    let email = Arc::new(RecordingEmailTransport::failing(EmailTransportError::delivery(
        "relay refused",
    )));

    let result = dispatcher(
        email,
        Arc::new(RecordingSmsTransport::default()),
        Arc::new(StaticPlaceDirectory::default()),
    )
    .send_confirmation(&booking(ContactMethod::Email, Some("anna@example.it"), None))
    .await;

    assert!(matches!(result, Err(NotificationError::Delivery { .. })));
}

#[tokio::test]
async fn sms_transport_failure_is_a_delivery_error() {
    let sms = Arc::new(RecordingSmsTransport::failing(SmsTransportError::rejected(
        "price too high",
    )));

    let result = dispatcher(
        Arc::new(RecordingEmailTransport::default()),
        sms,
        Arc::new(StaticPlaceDirectory::default()),
    )
    .send_confirmation(&booking(ContactMethod::Phone, None, Some("3331234567")))
    .await;

    assert!(matches!(result, Err(NotificationError::Delivery { message }) if message.contains("price too high")));
}
