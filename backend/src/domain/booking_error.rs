//! Failures of the booking and cancellation orchestrators.

use crate::domain::Error;
use crate::domain::ports::{BookingStoreError, NotificationError};

pub(crate) const SLOT_FULL_MESSAGE: &str = "Lo slot selezionato è pieno, prova con un altro slot.";
pub(crate) const DELIVERY_FAILED_MESSAGE: &str =
    "Impossibile inviare conferma all'indirizzo email o al numero di telefono impostato";
pub(crate) const BOOKING_NOT_FOUND_MESSAGE: &str = "Non ho trovato la prenotazione";
pub(crate) const CANCELLATION_REJECTED_MESSAGE: &str = "Cancellazione non effettuata.";

/// Tagged orchestrator error, translated to [`Error`] at the driving port.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    /// Input rejected before anything was built or stored.
    #[error("invalid booking request: {message}")]
    Validation { message: String },
    /// The store refused the transaction (capacity, duplicate key or token
    /// collision).
    #[error("booking transaction rejected: {message}")]
    Conflict { message: String },
    #[error("booking {public_id} not found")]
    NotFound { public_id: String },
    /// Confirmation failed and the booking was rolled back.
    #[error(transparent)]
    Notification(#[from] NotificationError),
    /// Confirmation failed and so did the compensating release.
    #[error("rollback after `{trigger}` failed: {rollback}")]
    RollbackFailed {
        trigger: NotificationError,
        rollback: BookingStoreError,
    },
    #[error("booking store unavailable: {message}")]
    Unavailable { message: String },
    #[error("internal booking error: {message}")]
    Internal { message: String },
}

impl BookingError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<BookingStoreError> for BookingError {
    fn from(error: BookingStoreError) -> Self {
        match error {
            BookingStoreError::Conflict { message } => Self::Conflict { message },
            BookingStoreError::Connection { message } => Self::Unavailable { message },
            BookingStoreError::Query { message } => Self::Internal { message },
        }
    }
}

impl From<BookingError> for Error {
    fn from(error: BookingError) -> Self {
        let message = error.to_string();
        match error {
            BookingError::Validation { .. } => Error::invalid_request(message),
            BookingError::Conflict { .. } => {
                Error::conflict(message).with_user_message(SLOT_FULL_MESSAGE)
            }
            BookingError::NotFound { .. } => {
                Error::not_found(message).with_user_message(BOOKING_NOT_FOUND_MESSAGE)
            }
            BookingError::Notification(NotificationError::BadRequest { .. }) => {
                Error::invalid_request(message).with_user_message(DELIVERY_FAILED_MESSAGE)
            }
            BookingError::Notification(NotificationError::Delivery { .. }) => {
                Error::delivery_failed(message).with_user_message(DELIVERY_FAILED_MESSAGE)
            }
            BookingError::RollbackFailed { .. } => Error::rollback_failed(message),
            BookingError::Unavailable { .. } => Error::service_unavailable(message),
            BookingError::Internal { .. } => Error::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(BookingStoreError::conflict("condition failed"), ErrorCode::Conflict)]
    #[case(BookingStoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(BookingStoreError::query("syntax"), ErrorCode::InternalError)]
    fn store_errors_reach_the_expected_code(
        #[case] store: BookingStoreError,
        #[case] expected: ErrorCode,
    ) {
        let error = Error::from(BookingError::from(store));
        assert_eq!(error.code(), expected);
    }

    #[test]
    fn validation_carries_no_user_message() {
        let error = Error::from(BookingError::validation("people must be a positive integer"));
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert!(error.user_message().is_none());
        assert!(error.message().contains("people must be a positive integer"));
    }

    #[test]
    fn conflict_tells_the_customer_the_slot_is_full() {
        let error = Error::from(BookingError::Conflict {
            message: "condition failed".into(),
        });
        assert_eq!(error.user_message(), Some(SLOT_FULL_MESSAGE));
    }

    #[rstest]
    #[case(NotificationError::bad_request("no email"), ErrorCode::InvalidRequest)]
    #[case(NotificationError::delivery("relay down"), ErrorCode::DeliveryFailed)]
    fn notification_failures_keep_their_kind(
        #[case] cause: NotificationError,
        #[case] expected: ErrorCode,
    ) {
        let error = Error::from(BookingError::from(cause));
        assert_eq!(error.code(), expected);
        assert_eq!(error.user_message(), Some(DELIVERY_FAILED_MESSAGE));
    }

    #[test]
    fn rollback_failure_names_both_causes() {
        let error = BookingError::RollbackFailed {
            trigger: NotificationError::delivery("relay down"),
            rollback: BookingStoreError::connection("pool exhausted"),
        };
        let rendered = error.to_string();
        assert!(rendered.contains("relay down"));
        assert!(rendered.contains("pool exhausted"));
        assert_eq!(Error::from(error).code(), ErrorCode::RollbackFailed);
    }
}
