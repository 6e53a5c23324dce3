//! HTTP status catalog.
//!
//! Two parallel immutable mappings over the same table: symbolic name to
//! numeric code ([`code_for`]) and numeric code to symbolic name
//! ([`name_for`]). Both are generated from a single list so they cannot
//! drift apart.
//!
//! ```
//! use routekit_core::status::{self, HttpStatus};
//!
//! assert_eq!(HttpStatus::NOT_FOUND.code, 404);
//! assert_eq!(status::name_for(429), Some("TOO_MANY_REQUESTS"));
//! assert_eq!(status::code_for("MULTI_STATUS"), Some(207));
//! ```

/// One row of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpStatus {
    pub name: &'static str,
    pub code: u16,
}

macro_rules! status_catalog {
    ($($name:ident = $code:literal),+ $(,)?) => {
        #[allow(missing_docs)]
        impl HttpStatus {
            $(
                pub const $name: HttpStatus = HttpStatus { name: stringify!($name), code: $code };
            )+
        }

        /// Every catalogued status, ordered by code.
        pub const ALL: &[HttpStatus] = &[$(HttpStatus::$name),+];

        /// Symbolic name -> numeric code.
        pub fn code_for(name: &str) -> Option<u16> {
            ALL.iter().find(|s| s.name == name).map(|s| s.code)
        }

        /// Numeric code -> symbolic name.
        pub fn name_for(code: u16) -> Option<&'static str> {
            match code {
                $($code => Some(stringify!($name)),)+
                _ => None,
            }
        }
    };
}

status_catalog! {
    CONTINUE = 100,
    SWITCHING_PROTOCOLS = 101,
    PROCESSING = 102,
    EARLY_HINTS = 103,

    OK = 200,
    CREATED = 201,
    ACCEPTED = 202,
    NON_AUTHORITATIVE_INFORMATION = 203,
    NO_CONTENT = 204,
    RESET_CONTENT = 205,
    PARTIAL_CONTENT = 206,
    MULTI_STATUS = 207,
    ALREADY_REPORTED = 208,
    IM_USED = 226,

    MULTIPLE_CHOICES = 300,
    MOVED_PERMANENTLY = 301,
    FOUND = 302,
    SEE_OTHER = 303,
    NOT_MODIFIED = 304,
    USE_PROXY = 305,
    TEMPORARY_REDIRECT = 307,
    PERMANENT_REDIRECT = 308,

    BAD_REQUEST = 400,
    UNAUTHORIZED = 401,
    PAYMENT_REQUIRED = 402,
    FORBIDDEN = 403,
    NOT_FOUND = 404,
    METHOD_NOT_ALLOWED = 405,
    NOT_ACCEPTABLE = 406,
    PROXY_AUTHENTICATION_REQUIRED = 407,
    REQUEST_TIMEOUT = 408,
    CONFLICT = 409,
    GONE = 410,
    LENGTH_REQUIRED = 411,
    PRECONDITION_FAILED = 412,
    PAYLOAD_TOO_LARGE = 413,
    URI_TOO_LONG = 414,
    UNSUPPORTED_MEDIA_TYPE = 415,
    RANGE_NOT_SATISFIABLE = 416,
    EXPECTATION_FAILED = 417,
    IM_A_TEAPOT = 418,
    INSUFFICIENT_SPACE_ON_RESOURCE = 419,
    METHOD_FAILURE = 420,
    MISDIRECTED_REQUEST = 421,
    UNPROCESSABLE_ENTITY = 422,
    LOCKED = 423,
    FAILED_DEPENDENCY = 424,
    TOO_EARLY = 425,
    UPGRADE_REQUIRED = 426,
    PRECONDITION_REQUIRED = 428,
    TOO_MANY_REQUESTS = 429,
    REQUEST_HEADER_FIELDS_TOO_LARGE = 431,
    UNAVAILABLE_FOR_LEGAL_REASONS = 451,

    INTERNAL_SERVER_ERROR = 500,
    NOT_IMPLEMENTED = 501,
    BAD_GATEWAY = 502,
    SERVICE_UNAVAILABLE = 503,
    GATEWAY_TIMEOUT = 504,
    HTTP_VERSION_NOT_SUPPORTED = 505,
    VARIANT_ALSO_NEGOTIATES = 506,
    INSUFFICIENT_STORAGE = 507,
    LOOP_DETECTED = 508,
    NOT_EXTENDED = 510,
    NETWORK_AUTHENTICATION_REQUIRED = 511,
}

impl HttpStatus {
    pub fn from_code(code: u16) -> Option<Self> {
        name_for(code).map(|name| Self { name, code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_name_to_code_round_trips_through_code_to_name() {
        for status in ALL {
            assert_eq!(code_for(status.name), Some(status.code), "{}", status.name);
            assert_eq!(name_for(status.code), Some(status.name), "{}", status.code);
        }
    }

    #[test]
    fn test_catalog_is_one_to_one() {
        let names: HashSet<_> = ALL.iter().map(|s| s.name).collect();
        let codes: HashSet<_> = ALL.iter().map(|s| s.code).collect();
        assert_eq!(names.len(), ALL.len());
        assert_eq!(codes.len(), ALL.len());
    }

    #[test]
    fn test_every_code_in_range_maps_back() {
        for code in 100..=599u16 {
            if let Some(name) = name_for(code) {
                assert_eq!(code_for(name), Some(code));
            }
        }
    }

    #[test]
    fn test_catalog_bounds_and_extensions() {
        assert_eq!(ALL.first().map(|s| s.code), Some(100));
        assert_eq!(ALL.last().map(|s| s.code), Some(511));
        assert_eq!(code_for("MULTI_STATUS"), Some(207));
        assert_eq!(code_for("LOCKED"), Some(423));
        assert_eq!(code_for("INSUFFICIENT_STORAGE"), Some(507));
        assert_eq!(code_for("TOO_MANY_REQUESTS"), Some(429));
    }

    #[test]
    fn test_unknown_entries() {
        assert_eq!(code_for("NOT_A_STATUS"), None);
        assert_eq!(name_for(299), None);
        assert_eq!(HttpStatus::from_code(999), None);
        assert_eq!(HttpStatus::from_code(301), Some(HttpStatus::MOVED_PERMANENTLY));
    }
}
