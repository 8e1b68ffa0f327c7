use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monitored backend service.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Service {
    #[serde(rename = "auth-service")]
    #[display("auth-service")]
    Auth,
    #[serde(rename = "user-profile-service")]
    #[display("user-profile-service")]
    UserProfile,
    #[serde(rename = "video-streaming-service")]
    #[display("video-streaming-service")]
    VideoStreaming,
    #[serde(rename = "alert-service")]
    #[display("alert-service")]
    Alert,
}

impl Service {
    pub const LEN: usize = 4;
    pub const ALL: [Service; Self::LEN] = [
        Service::Auth,
        Service::UserProfile,
        Service::VideoStreaming,
        Service::Alert,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unsupported HTTP status code {_0}")]
pub struct UnknownStatusCode(#[error(not(source))] pub u16);

/// HTTP status code reported by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum StatusCode {
    Ok,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError,
}

impl StatusCode {
    pub const ALL: [StatusCode; 5] = [
        StatusCode::Ok,
        StatusCode::Unauthorized,
        StatusCode::Forbidden,
        StatusCode::NotFound,
        StatusCode::InternalServerError,
    ];

    #[must_use]
    pub fn as_u16(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Unauthorized => 401,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Only `200 OK` counts as a success.
    #[must_use]
    pub fn is_success(self) -> bool {
        self == StatusCode::Ok
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.as_u16(), f)
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> Self {
        code.as_u16()
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = UnknownStatusCode;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        StatusCode::ALL
            .into_iter()
            .find(|c| c.as_u16() == code)
            .ok_or(UnknownStatusCode(code))
    }
}

/// A deserialized event whose error flag contradicts its status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("event #{id} has error flag {flag} but status code {status_code}")]
pub struct InconsistentErrorFlag {
    pub id: usize,
    pub status_code: StatusCode,
    pub flag: bool,
}

/// One request observed on a service.
///
/// When deserialized, `error` may be omitted and is then derived from the status
/// code; a flag that disagrees with the status code is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSystemEvent")]
pub struct SystemEvent {
    /// Sequence number within the batch, starting at 1.
    pub id: usize,
    /// When the request was observed.
    pub timestamp: DateTime<Utc>,
    /// Service that handled the request.
    pub service: Service,
    /// Response time in whole milliseconds.
    pub response_time_ms: u32,
    /// Status code returned.
    pub status_code: StatusCode,
    /// `true` for any non-success status code.
    pub error: bool,
}

#[derive(Deserialize)]
struct RawSystemEvent {
    id: usize,
    timestamp: DateTime<Utc>,
    service: Service,
    response_time_ms: u32,
    status_code: StatusCode,
    #[serde(default)]
    error: Option<bool>,
}

impl TryFrom<RawSystemEvent> for SystemEvent {
    type Error = InconsistentErrorFlag;

    fn try_from(raw: RawSystemEvent) -> Result<Self, Self::Error> {
        let event = SystemEvent::new(
            raw.id,
            raw.timestamp,
            raw.service,
            raw.response_time_ms,
            raw.status_code,
        );
        match raw.error {
            Some(flag) if flag != event.error => Err(InconsistentErrorFlag {
                id: raw.id,
                status_code: raw.status_code,
                flag,
            }),
            _ => Ok(event),
        }
    }
}

impl SystemEvent {
    #[must_use]
    pub fn new(
        id: usize,
        timestamp: DateTime<Utc>,
        service: Service,
        response_time_ms: u32,
        status_code: StatusCode,
    ) -> Self {
        Self {
            id,
            timestamp,
            service,
            response_time_ms,
            status_code,
            error: !status_code.is_success(),
        }
    }

    /// Response times of a batch, as measurements.
    #[must_use]
    pub fn response_times(events: &[Self]) -> Vec<f64> {
        events
            .iter()
            .map(|e| f64::from(e.response_time_ms))
            .collect()
    }

    /// Services of a batch, in event order.
    #[must_use]
    pub fn services(events: &[Self]) -> Vec<Service> {
        events.iter().map(|e| e.service).collect()
    }

    /// Status codes of a batch, in event order.
    #[must_use]
    pub fn status_codes(events: &[Self]) -> Vec<StatusCode> {
        events.iter().map(|e| e.status_code).collect()
    }

    /// Services of the failed events of a batch, in event order.
    #[must_use]
    pub fn failed_services(events: &[Self]) -> Vec<Service> {
        events
            .iter()
            .filter(|e| e.error)
            .map(|e| e.service)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn event(id: usize, service: Service, rt: u32, status: StatusCode) -> SystemEvent {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        SystemEvent::new(id, ts, service, rt, status)
    }

    #[test]
    fn test_error_flag_follows_status() {
        assert!(!event(1, Service::Auth, 80, StatusCode::Ok).error);
        for status in [
            StatusCode::Unauthorized,
            StatusCode::Forbidden,
            StatusCode::NotFound,
            StatusCode::InternalServerError,
        ] {
            assert!(event(1, Service::Auth, 80, status).error, "{status}");
        }
    }

    #[test]
    fn test_status_code_conversions() {
        for code in StatusCode::ALL {
            assert_eq!(StatusCode::try_from(code.as_u16()), Ok(code));
        }
        assert_eq!(StatusCode::try_from(418), Err(UnknownStatusCode(418)));
        assert_eq!(StatusCode::InternalServerError.to_string(), "500");
    }

    #[test]
    fn test_service_display_matches_serde() {
        for service in Service::ALL {
            let json = serde_json::to_string(&service).unwrap();
            assert_eq!(json, format!("\"{service}\""));
            assert_eq!(serde_json::from_str::<Service>(&json).unwrap(), service);
        }
        assert_eq!(Service::VideoStreaming.to_string(), "video-streaming-service");
    }

    #[test]
    fn test_json_shape() {
        let e = event(7, Service::Alert, 1500, StatusCode::InternalServerError);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["service"], "alert-service");
        assert_eq!(json["status_code"], 500);
        assert_eq!(json["error"], true);

        let back: SystemEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn test_error_flag_is_checked_on_load() {
        let json = r#"[
            {"id":1,"timestamp":"2024-05-01T12:00:00Z","service":"auth-service","response_time_ms":10,"status_code":200,"error":true},
            {"id":2,"timestamp":"2024-05-01T12:00:00Z","service":"alert-service","response_time_ms":1500,"status_code":500,"error":false}
        ]"#;
        let err = serde_json::from_str::<Vec<SystemEvent>>(json).unwrap_err();
        assert!(
            err.to_string()
                .contains("event #1 has error flag true but status code 200"),
            "{err}"
        );

        let json = r#"{"id":2,"timestamp":"2024-05-01T12:00:00Z","service":"alert-service","response_time_ms":1500,"status_code":500,"error":false}"#;
        let err = serde_json::from_str::<SystemEvent>(json).unwrap_err();
        assert!(err.to_string().contains("event #2"), "{err}");
    }

    #[test]
    fn test_missing_error_flag_is_derived() {
        let json = r#"{"id":3,"timestamp":"2024-05-01T12:00:00Z","service":"user-profile-service","response_time_ms":210,"status_code":500}"#;
        let e = serde_json::from_str::<SystemEvent>(json).unwrap();
        assert!(e.error);
        assert_eq!(e.service, Service::UserProfile);
    }

    #[test]
    fn test_unknown_status_code_is_rejected() {
        let json = r#"{"id":1,"timestamp":"2024-05-01T12:00:00Z","service":"auth-service","response_time_ms":10,"status_code":302,"error":true}"#;
        assert!(serde_json::from_str::<SystemEvent>(json).is_err());
    }

    #[test]
    fn test_projections() {
        let events = [
            event(1, Service::Auth, 100, StatusCode::Ok),
            event(2, Service::Alert, 1200, StatusCode::InternalServerError),
            event(3, Service::Auth, 90, StatusCode::Forbidden),
        ];
        assert_eq!(SystemEvent::response_times(&events), [100.0, 1200.0, 90.0]);
        assert_eq!(
            SystemEvent::services(&events),
            [Service::Auth, Service::Alert, Service::Auth]
        );
        assert_eq!(
            SystemEvent::status_codes(&events),
            [
                StatusCode::Ok,
                StatusCode::InternalServerError,
                StatusCode::Forbidden
            ]
        );
        assert_eq!(
            SystemEvent::failed_services(&events),
            [Service::Alert, Service::Auth]
        );
    }
}
