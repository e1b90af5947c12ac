//! Storage key constructors.
//!
//! All rows of a place share a partition key; the sort key tells slot rows,
//! booking rows and the place information row apart. Adapters must build keys
//! through these types only.
//!
//! | Key                  | Format                     |
//! |----------------------|----------------------------|
//! | [`PlaceKey`]         | `p-<placeId>`              |
//! | [`SlotKey`]          | `s-<slotId>`               |
//! | [`BookingKey`]       | `b-<slotId>~<secretCode>`  |
//! | [`PublicBookingKey`] | `b-<publicId>`             |
//! | [`PlaceInfoKey`]     | `p-info`                   |

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{PlaceId, PublicBookingId, SecretCode, SlotId};

macro_rules! storage_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

storage_key! {
    /// Partition shared by every row of one place.
    PlaceKey
}

storage_key! {
    /// Capacity row of one slot.
    SlotKey
}

storage_key! {
    /// Internal booking row key. Contains the secret code; never exposed.
    BookingKey
}

storage_key! {
    /// Secondary index entry resolving a public id to its booking.
    PublicBookingKey
}

storage_key! {
    /// Display information row of a place.
    PlaceInfoKey
}

impl PlaceKey {
    pub fn for_place(place_id: &PlaceId) -> Self {
        Self(format!("p-{place_id}"))
    }
}

impl SlotKey {
    pub fn for_slot(slot_id: &SlotId) -> Self {
        Self(format!("s-{slot_id}"))
    }
}

impl BookingKey {
    pub fn new(slot_id: &SlotId, secret_code: &SecretCode) -> Self {
        Self(format!("b-{slot_id}~{}", secret_code.as_str()))
    }

    /// Rehydrate a key read back from storage.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl PublicBookingKey {
    pub fn for_booking(public_id: &PublicBookingId) -> Self {
        Self(format!("b-{public_id}"))
    }
}

impl PlaceInfoKey {
    pub fn new() -> Self {
        Self("p-info".to_owned())
    }
}

impl Default for PlaceInfoKey {
    fn default() -> Self {
        Self::new()
    }
}
