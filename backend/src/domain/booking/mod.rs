//! Booking entity, identifiers and storage keys.
//!
//! A [`Booking`] is built once by [`create_booking`], persisted once, and
//! afterwards only ever deleted as a whole (cancellation or compensating
//! rollback). The entry flag belongs to the check-in flow and always starts
//! as `false` here.

mod identifiers;
mod keys;
mod slot_id;

pub use identifiers::{
    IdentifierValidationError, PublicBookingId, SecretCode, new_booking_id, new_secret_code,
};
pub use keys::{BookingKey, PlaceInfoKey, PlaceKey, PublicBookingKey, SlotKey};
pub use slot_id::{PlaceId, SlotId, SlotIdValidationError};

use chrono::{DateTime, Utc};
use mockable::Clock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EmailAddress, PhoneNumber};

/// Channel used to confirm a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContactMethod {
    Email,
    Phone,
}

impl ContactMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

/// Inputs of [`create_booking`].
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub place_id: PlaceId,
    pub slot_id: SlotId,
    pub people: u32,
    pub method: ContactMethod,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
}

/// One reservation of `people` places in a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    place_id: PlaceId,
    slot_id: SlotId,
    public_id: PublicBookingId,
    secret_code: SecretCode,
    people: u32,
    method: ContactMethod,
    email: Option<EmailAddress>,
    phone: Option<PhoneNumber>,
    created_at: DateTime<Utc>,
    last_update: DateTime<Utc>,
    entered: bool,
}

/// Build a booking with fresh identifiers.
///
/// Pure construction: nothing is stored. Creation and last-update times are
/// the same clock reading. Contact consistency is not checked here; the
/// orchestrator validates input before building.
///
/// # Examples
/// ```
/// use booking::domain::{
///     ContactMethod, EmailAddress, NewBooking, PlaceId, SlotId, create_booking,
/// };
/// use mockable::DefaultClock;
///
/// let booking = create_booking(
///     NewBooking {
///         place_id: PlaceId::new("gym-1").expect("place"),
///         slot_id: SlotId::parse("2026-05-04T18:30:00Z~60").expect("slot"),
///         people: 2,
///         method: ContactMethod::Email,
///         email: Some(EmailAddress::parse("anna@example.it").expect("email")),
///         phone: None,
///     },
///     &DefaultClock,
///     &mut rand::thread_rng(),
/// );
/// assert_eq!(booking.created_at(), booking.last_update());
/// assert_eq!(booking.duration_minutes(), 60);
/// ```
pub fn create_booking(new: NewBooking, clock: &dyn Clock, rng: &mut impl Rng) -> Booking {
    let now = clock.utc();
    let secret_code = SecretCode::generate(rng);
    let public_id = PublicBookingId::generate(rng);
    Booking {
        place_id: new.place_id,
        slot_id: new.slot_id,
        public_id,
        secret_code,
        people: new.people,
        method: new.method,
        email: new.email,
        phone: new.phone,
        created_at: now,
        last_update: now,
        entered: false,
    }
}

impl Booking {
    pub fn place_id(&self) -> &PlaceId {
        &self.place_id
    }

    pub fn slot_id(&self) -> &SlotId {
        &self.slot_id
    }

    pub fn public_id(&self) -> &PublicBookingId {
        &self.public_id
    }

    pub fn secret_code(&self) -> &SecretCode {
        &self.secret_code
    }

    pub fn people(&self) -> u32 {
        self.people
    }

    pub fn method(&self) -> ContactMethod {
        self.method
    }

    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    pub fn entered(&self) -> bool {
        self.entered
    }

    pub fn starts_at(&self) -> DateTime<Utc> {
        self.slot_id.starts_at()
    }

    pub fn start_raw(&self) -> &str {
        self.slot_id.start_raw()
    }

    pub fn duration_minutes(&self) -> u32 {
        self.slot_id.duration_minutes()
    }

    pub fn place_key(&self) -> PlaceKey {
        PlaceKey::for_place(&self.place_id)
    }

    pub fn slot_key(&self) -> SlotKey {
        SlotKey::for_slot(&self.slot_id)
    }

    pub fn booking_key(&self) -> BookingKey {
        BookingKey::new(&self.slot_id, &self.secret_code)
    }

    pub fn public_key(&self) -> PublicBookingKey {
        PublicBookingKey::for_booking(&self.public_id)
    }

    /// Handle for deleting this booking again.
    pub fn locator(&self) -> BookingLocator {
        BookingLocator {
            place_id: self.place_id.clone(),
            slot_id: self.slot_id.clone(),
            booking_key: self.booking_key(),
            people: self.people,
        }
    }

    /// Customer-facing view without the public id, secret code or keys.
    pub fn receipt(&self) -> BookingReceipt {
        BookingReceipt {
            place_id: self.place_id.to_string(),
            slot_id: self.slot_id.to_string(),
            start_datetime: self.start_raw().to_owned(),
            duration: self.duration_minutes(),
            booked_people: self.people,
            method: self.method,
            email: self.email.as_ref().map(ToString::to_string),
            phone: self.phone.as_ref().map(ToString::to_string),
            created_at: self.created_at,
            last_update: self.last_update,
            entered: self.entered,
        }
    }
}

/// Everything needed to delete a stored booking and give its places back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingLocator {
    pub place_id: PlaceId,
    pub slot_id: SlotId,
    pub booking_key: BookingKey,
    pub people: u32,
}

impl BookingLocator {
    pub fn place_key(&self) -> PlaceKey {
        PlaceKey::for_place(&self.place_id)
    }

    pub fn slot_key(&self) -> SlotKey {
        SlotKey::for_slot(&self.slot_id)
    }
}

/// Response body of a successful booking.
///
/// The public id and secret code only ever reach the customer through the
/// confirmation message, proving control of the contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    #[schema(example = "gym-1")]
    pub place_id: String,
    #[schema(example = "2026-05-04T18:30:00.000Z~60")]
    pub slot_id: String,
    #[schema(example = "2026-05-04T18:30:00.000Z")]
    pub start_datetime: String,
    /// Slot length in minutes.
    #[schema(example = 60)]
    pub duration: u32,
    #[schema(example = 2)]
    pub booked_people: u32,
    pub method: ContactMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub entered: bool,
}
