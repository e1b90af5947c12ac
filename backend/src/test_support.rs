//! Test doubles shared by unit tests and the integration suites in `tests/`.
//!
//! Compiled for `cfg(test)` and behind the `test-support` feature.

pub mod clock {
    //! Controllable clock.

    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        /// Parse an RFC 3339 instant, panicking on malformed fixtures.
        pub fn at(rfc3339: &str) -> Self {
            match DateTime::parse_from_rfc3339(rfc3339) {
                Ok(parsed) => Self::new(parsed.with_timezone(&Utc)),
                Err(error) => panic!("fixture instant {rfc3339} is invalid: {error}"),
            }
        }

        pub fn now(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }

        pub fn advance(&self, delta: Duration) {
            let delta = match TimeDelta::from_std(delta) {
                Ok(delta) => delta,
                Err(error) => panic!("failed to convert {delta:?} to TimeDelta: {error}"),
            };
            *self.lock_clock() += delta;
        }

        fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.now()
        }
    }
}

pub mod transports {
    //! Recording notification transports and a static place directory.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::domain::PlaceId;
    use crate::domain::ports::{
        EmailMessage, EmailTransport, EmailTransportError, PlaceDirectory, PlaceDirectoryError,
        SmsMessage, SmsTransport, SmsTransportError,
    };

    fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("transport mutex"),
        }
    }

    /// Email transport keeping every message; optionally refusing delivery.
    #[derive(Default)]
    pub struct RecordingEmailTransport {
        sent: Mutex<Vec<EmailMessage>>,
        failure: Option<EmailTransportError>,
    }

    impl RecordingEmailTransport {
        pub fn failing(error: EmailTransportError) -> Self {
            Self {
                sent: Mutex::default(),
                failure: Some(error),
            }
        }

        pub fn sent(&self) -> Vec<EmailMessage> {
            lock(&self.sent).clone()
        }
    }

    #[async_trait]
    impl EmailTransport for RecordingEmailTransport {
        async fn send(&self, message: &EmailMessage) -> Result<(), EmailTransportError> {
            if let Some(error) = &self.failure {
                return Err(error.clone());
            }
            lock(&self.sent).push(message.clone());
            Ok(())
        }
    }

    /// SMS transport keeping every message; optionally refusing delivery.
    #[derive(Default)]
    pub struct RecordingSmsTransport {
        sent: Mutex<Vec<SmsMessage>>,
        failure: Option<SmsTransportError>,
    }

    impl RecordingSmsTransport {
        pub fn failing(error: SmsTransportError) -> Self {
            Self {
                sent: Mutex::default(),
                failure: Some(error),
            }
        }

        pub fn sent(&self) -> Vec<SmsMessage> {
            lock(&self.sent).clone()
        }
    }

    #[async_trait]
    impl SmsTransport for RecordingSmsTransport {
        async fn send(&self, message: &SmsMessage) -> Result<(), SmsTransportError> {
            if let Some(error) = &self.failure {
                return Err(error.clone());
            }
            lock(&self.sent).push(message.clone());
            Ok(())
        }
    }

    /// Place directory answering from a fixed map.
    #[derive(Default)]
    pub struct StaticPlaceDirectory(HashMap<String, String>);

    impl StaticPlaceDirectory {
        pub fn with_place(mut self, place_id: &str, name: &str) -> Self {
            self.0.insert(place_id.to_owned(), name.to_owned());
            self
        }
    }

    #[async_trait]
    impl PlaceDirectory for StaticPlaceDirectory {
        async fn place_name(&self, place_id: &PlaceId) -> Result<Option<String>, PlaceDirectoryError> {
            Ok(self.0.get(place_id.as_str()).cloned())
        }
    }
}
