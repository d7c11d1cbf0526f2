//! Connection failure classification.
//!
//! The driver's SQLSTATE codes are authoritative; message-substring matching
//! is the fallback for errors stringified before they reach us (protocol
//! rejections, timeouts wrapped upstream).

/// What a failed connection attempt most likely means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureClass {
    /// The server's pg_hba.conf has no rule admitting this client address.
    HostRejected,
    /// Wrong username or password.
    BadCredentials,
    /// The requested database does not exist on the server.
    UnknownDatabase,
    /// Nothing recognizable: network trouble, a timeout, or an unusual
    /// server-side refusal.
    Unclassified,
}

impl FailureClass {
    /// One-line operator guidance, where the class has any.
    pub fn guidance(self) -> Option<&'static str> {
        match self {
            Self::HostRejected => {
                Some("Authentication issue: this client address is not allowed by pg_hba.conf")
            }
            Self::BadCredentials => Some("Wrong username/password"),
            Self::UnknownDatabase => Some("Database does not exist"),
            Self::Unclassified => None,
        }
    }
}

/// Classify a connection error, SQLSTATE first.
pub fn classify(error: &sqlx::Error) -> FailureClass {
    if let sqlx::Error::Database(db_err) = error {
        if let Some(code) = db_err.code() {
            match code.as_ref() {
                // invalid_authorization_specification: pg_hba rejection
                "28000" => return FailureClass::HostRejected,
                // invalid_password
                "28P01" => return FailureClass::BadCredentials,
                // invalid_catalog_name
                "3D000" => return FailureClass::UnknownDatabase,
                _ => {}
            }
        }
    }

    classify_message(&error.to_string())
}

/// Substring fallback for errors carrying no SQLSTATE.
pub fn classify_message(message: &str) -> FailureClass {
    if message.contains("pg_hba.conf entry") {
        FailureClass::HostRejected
    } else if message.contains("authentication failed") {
        FailureClass::BadCredentials
    } else if message.contains("database") && message.contains("does not exist") {
        FailureClass::UnknownDatabase
    } else {
        FailureClass::Unclassified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_message_hba() {
        let msg = "FATAL: no pg_hba.conf entry for host \"203.0.113.7\", \
                   user \"orca\", database \"orca\", no encryption";
        assert_eq!(classify_message(msg), FailureClass::HostRejected);
    }

    #[test]
    fn test_classify_message_credentials() {
        let msg = "FATAL: password authentication failed for user \"orca\"";
        assert_eq!(classify_message(msg), FailureClass::BadCredentials);
    }

    #[test]
    fn test_classify_message_unknown_database() {
        let msg = "FATAL: database \"weborca\" does not exist";
        assert_eq!(classify_message(msg), FailureClass::UnknownDatabase);
    }

    #[test]
    fn test_classify_message_unclassified() {
        assert_eq!(
            classify_message("connection refused"),
            FailureClass::Unclassified
        );
    }

    #[test]
    fn test_classify_io_error_falls_through() {
        let err = sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "connection attempt timed out",
        ));
        assert_eq!(classify(&err), FailureClass::Unclassified);
    }

    #[test]
    fn test_guidance_present_for_known_classes() {
        assert!(FailureClass::HostRejected.guidance().is_some());
        assert!(FailureClass::BadCredentials.guidance().is_some());
        assert!(FailureClass::UnknownDatabase.guidance().is_some());
        assert!(FailureClass::Unclassified.guidance().is_none());
    }
}
