//! Confirmation message rendering.

use crate::domain::{Booking, EmailAddress, PhoneNumber};
use crate::domain::ports::{EmailMessage, SmsMessage};

use super::ConfirmationSettings;

const EMAIL_SUBJECT: &str = "Conferma la tua prenotazione";
const EMAIL_TAG: (&str, &str) = ("EmailType", "BookingConfirmation");

/// The three facts every confirmation carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationContent {
    /// Base URL followed by the public booking id.
    pub url: String,
    /// Secret code, as `XXX-XXX` when it has six digits.
    pub code: String,
    /// Start time in the configured time zone and locale.
    pub date: String,
}

impl ConfirmationContent {
    pub fn for_booking(booking: &Booking, settings: &ConfirmationSettings) -> Self {
        let url = format!("{}{}", settings.base_url, booking.public_id());
        let code = booking.secret_code().display_form();
        let date = booking
            .starts_at()
            .with_timezone(&settings.time_zone)
            .format_localized(&settings.date_format, settings.locale)
            .to_string();
        Self { url, code, date }
    }

    pub fn email(
        &self,
        to: &EmailAddress,
        place_name: &str,
        settings: &ConfirmationSettings,
    ) -> EmailMessage {
        let Self { url, code, date } = self;
        let html_body = format!(
            "Ciao,<br />\n\
             puoi vedere qui la tua prenotazione per {place_name} del {date}: {url}.<br />\n\
             Se all'ingresso ti chiedono il codice di prenotazione, fornisci <strong>{code}</strong>.<br />\n\
             Se hai cambiato idea, ricordati di cancellare la tua prenotazione al link: {url}.\n"
        );
        let text_body = format!(
            "Ciao,\n\
             puoi vedere qui la tua prenotazione per {place_name} del {date}: {url}.\n\
             Se all'ingresso ti chiedono il codice di prenotazione, fornisci {code}.\n\
             Se hai cambiato idea, ricordati di cancellare la tua prenotazione al link: {url}.\n"
        );
        EmailMessage {
            to: to.clone(),
            from: settings.sender_mailbox(),
            subject: format!("{EMAIL_SUBJECT} con {}", settings.sender_name),
            html_body,
            text_body,
            tags: vec![(EMAIL_TAG.0.to_owned(), EMAIL_TAG.1.to_owned())],
        }
    }

    pub fn sms(&self, to: &PhoneNumber, settings: &ConfirmationSettings) -> SmsMessage {
        let Self { url, code, date } = self;
        SmsMessage {
            to: to.clone(),
            body: format!(
                "Ciao, conferma la prenotazione del {date} visitando {url}.\nIl tuo codice è: {code}"
            ),
            sender_id: settings.sms_sender_id.clone(),
            max_price: settings.sms_max_price.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ContactMethod, NewBooking, PlaceId, SlotId, create_booking, normalize_phone,
    };
    use crate::test_support::clock::MutableClock;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::{fixture, rstest};

    #[fixture]
    fn booking() -> Booking {
        create_booking(
            NewBooking {
                place_id: PlaceId::new("gym-1").expect("place"),
                // 18:30 UTC is 20:30 in Rome during summer time.
                slot_id: SlotId::parse("2026-05-04T18:30:00.000Z~60").expect("slot"),
                people: 1,
                method: ContactMethod::Email,
                email: Some(EmailAddress::parse("anna@example.it").expect("email")),
                phone: None,
            },
            &MutableClock::at("2026-04-30T08:00:00Z"),
            &mut StdRng::seed_from_u64(9),
        )
    }

    #[rstest]
    fn content_uses_url_code_and_local_date(booking: Booking) {
        let content = ConfirmationContent::for_booking(&booking, &ConfirmationSettings::default());

        assert_eq!(
            content.url,
            format!("https://test.virgym.com/b/{}", booking.public_id())
        );
        let raw = booking.secret_code().as_str();
        assert_eq!(content.code, format!("{}-{}", &raw[..3], &raw[3..]));
        assert_eq!(content.date, "4 maggio alle 20:30");
    }

    #[rstest]
    fn date_follows_configured_zone_and_locale(booking: Booking) {
        let settings = ConfirmationSettings::default()
            .with_time_zone("Europe/London")
            .and_then(|s| s.with_locale("en_GB"))
            .expect("known zone and locale")
            .with_date_format("%-d %B %H:%M");

        let content = ConfirmationContent::for_booking(&booking, &settings);
        assert_eq!(content.date, "4 May 19:30");
    }

    #[rstest]
    fn email_carries_sender_tag_and_both_bodies(booking: Booking) {
        let settings = ConfirmationSettings::default();
        let content = ConfirmationContent::for_booking(&booking, &settings);
        let to = booking.email().expect("email").clone();

        let message = content.email(&to, "Palestra Centrale", &settings);

        assert_eq!(message.from, "Avatarlab <no-reply@test.virgym>");
        assert_eq!(message.subject, "Conferma la tua prenotazione con Avatarlab");
        assert_eq!(
            message.tags,
            vec![("EmailType".to_owned(), "BookingConfirmation".to_owned())]
        );
        for body in [&message.html_body, &message.text_body] {
            assert!(body.contains("Palestra Centrale"));
            assert!(body.contains(&content.url));
            assert!(body.contains(&content.code));
            assert!(body.contains(&content.date));
        }
        assert!(message.html_body.contains("<strong>"));
        assert!(!message.text_body.contains("<strong>"));
    }

    #[rstest]
    fn sms_is_short_and_carries_sender_metadata(booking: Booking) {
        let settings = ConfirmationSettings::default();
        let content = ConfirmationContent::for_booking(&booking, &settings);
        let phone = normalize_phone("3331234567").expect("phone");

        let message = content.sms(&phone, &settings);

        assert_eq!(message.to, phone);
        assert_eq!(message.sender_id, "Avatarlab");
        assert_eq!(message.max_price, "0.10");
        assert!(message.body.contains(&content.url));
        assert!(message.body.contains(&content.code));
        assert!(message.body.contains("4 maggio alle 20:30"));
    }
}
