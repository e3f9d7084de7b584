//! Closed error taxonomy shared by every fallible operation.

/// Every way a cycle step can fail.
///
/// The orchestrator is the only place that turns one of these into a
/// rendered message; nothing in the firmware aborts on them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    // Connectivity.
    NoConnection,
    Timeout,
    NotInitialised,
    // Generic I/O.
    Error,
    InvalidResponse,
    NoData,
    // HTTP status subset.
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError,
    BadGateway,
    ServiceUnavailable,
    // Buckets for everything else on the wire.
    ClientError,
    ServerError,
    UnknownStatus,
    // Header handling.
    DateParse,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoConnection => "NO_CONNECTION",
            Self::Timeout => "TIMEOUT",
            Self::NotInitialised => "NOT_INITIALISED",
            Self::Error => "ERROR",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::NoData => "NO_DATA",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::BadGateway => "BAD_GATEWAY",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::ClientError => "CLIENT_ERROR",
            Self::ServerError => "SERVER_ERROR",
            Self::UnknownStatus => "UNKNOWN_STATUS",
            Self::DateParse => "DATE_PARSE",
        }
    }
}

/// Maps an HTTP status code into the closed taxonomy.
///
/// Total and pure: 200..=204 is success, recognised 4xx/5xx codes get
/// their named kind, the rest of each range buckets into the generic
/// client/server kinds, and anything outside both ranges is unknown.
pub fn check_status(code: u16) -> Result<(), ErrorKind> {
    match code {
        200..=204 => Ok(()),
        400 => Err(ErrorKind::BadRequest),
        401 => Err(ErrorKind::Unauthorized),
        403 => Err(ErrorKind::Forbidden),
        404 => Err(ErrorKind::NotFound),
        500 => Err(ErrorKind::InternalServerError),
        502 => Err(ErrorKind::BadGateway),
        503 => Err(ErrorKind::ServiceUnavailable),
        400..=499 => Err(ErrorKind::ClientError),
        500..=599 => Err(ErrorKind::ServerError),
        _ => Err(ErrorKind::UnknownStatus),
    }
}

/// Classifies a transport read failure during a response transfer.
///
/// Before the body starts any failure means a malformed exchange. After
/// that, an inactivity abort is a timeout and everything else a hard
/// transport loss; a truncated body must never pass as success. A clean
/// close is the caller's end-of-stream and is not routed through here.
pub fn transfer_failure(body_started: bool, timed_out: bool) -> ErrorKind {
    if !body_started {
        ErrorKind::InvalidResponse
    } else if timed_out {
        ErrorKind::Timeout
    } else {
        ErrorKind::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_200_to_204() {
        for code in [200, 201, 202, 203, 204] {
            assert_eq!(check_status(code), Ok(()));
        }
        assert_ne!(check_status(205), Ok(()));
    }

    #[test]
    fn named_codes_map_to_named_kinds() {
        assert_eq!(check_status(400), Err(ErrorKind::BadRequest));
        assert_eq!(check_status(401), Err(ErrorKind::Unauthorized));
        assert_eq!(check_status(403), Err(ErrorKind::Forbidden));
        assert_eq!(check_status(404), Err(ErrorKind::NotFound));
        assert_eq!(check_status(500), Err(ErrorKind::InternalServerError));
        assert_eq!(check_status(502), Err(ErrorKind::BadGateway));
        assert_eq!(check_status(503), Err(ErrorKind::ServiceUnavailable));
    }

    #[test]
    fn unrecognised_codes_bucket_by_range() {
        assert_eq!(check_status(430), Err(ErrorKind::ClientError));
        assert_eq!(check_status(418), Err(ErrorKind::ClientError));
        assert_eq!(check_status(599), Err(ErrorKind::ServerError));
        assert_eq!(check_status(199), Err(ErrorKind::UnknownStatus));
        assert_eq!(check_status(600), Err(ErrorKind::UnknownStatus));
        assert_eq!(check_status(0), Err(ErrorKind::UnknownStatus));
    }

    #[test]
    fn transport_loss_mid_body_is_never_success() {
        assert_eq!(transfer_failure(true, true), ErrorKind::Timeout);
        assert_eq!(transfer_failure(true, false), ErrorKind::Error);
    }

    #[test]
    fn transport_loss_before_body_is_a_bad_exchange() {
        assert_eq!(transfer_failure(false, false), ErrorKind::InvalidResponse);
        assert_eq!(transfer_failure(false, true), ErrorKind::InvalidResponse);
    }
}
