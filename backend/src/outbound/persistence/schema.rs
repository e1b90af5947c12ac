//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Key columns hold
//! the typed storage keys (`p-…`, `s-…`, `b-…`) rather than raw identifiers.

diesel::table! {
    /// Display information per place (`p-info` row).
    places (place_key) {
        place_key -> Text,
        name -> Text,
        last_update -> Timestamptz,
    }
}

diesel::table! {
    /// Capacity counter per slot.
    ///
    /// A check constraint keeps `0 <= available_places <= allowed_places`.
    slots (place_key, slot_key) {
        place_key -> Text,
        slot_key -> Text,
        allowed_places -> Int4,
        available_places -> Int4,
        last_update -> Timestamptz,
    }
}

diesel::table! {
    /// Booking rows; `public_key` carries a unique index for reverse lookup.
    bookings (place_key, booking_key) {
        place_key -> Text,
        booking_key -> Text,
        public_key -> Text,
        place_id -> Text,
        slot_id -> Text,
        start_datetime -> Text,
        duration -> Int4,
        secret_code -> Text,
        booked_people -> Int4,
        method -> Text,
        email -> Nullable<Text>,
        phone -> Nullable<Text>,
        created_at -> Timestamptz,
        last_update -> Timestamptz,
        entered -> Bool,
    }
}

diesel::table! {
    /// Consumed transaction tokens.
    transaction_tokens (token) {
        token -> Text,
        fingerprint -> Bytea,
        applied_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(places, slots, bookings, transaction_tokens);
