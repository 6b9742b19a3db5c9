/// Key-value store key holding the JSON-encoded [`DeviceIdentity`](crate::DeviceIdentity)
pub const KEY_DEVICE_ENROLLMENT: &str = "deviceEnrollment";

/// Key-value store key holding the plain device-id string
pub const KEY_DEVICE_ID: &str = "deviceId";

/// Key-value store key holding the JSON-encoded array of visit headers
pub const KEY_VISIT_HISTORY: &str = "visitHistory";

/// Remote route accepting a device enrollment record
pub const ROUTE_ENROLLMENT: &str = "/api/DeviceUserEnrollment";

/// Remote route accepting a batch of visit details
pub const ROUTE_VISIT_DETAILS: &str = "/api/VisitDetails";

/// Remote route accepting a single visit header
pub const ROUTE_VISIT_HEADER: &str = "/api/VisitHeader";

/// Prefix tag for generated device ids (`DEV-{millis}-{random}`)
pub const DEVICE_ID_PREFIX: &str = "DEV";

/// Bound on every remote write, in seconds.
/// The backend contract only specified this for enrollment; visit writes
/// use the same bound so no submission can hang a form session.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Date format used for history display (`DD/MM/YYYY`)
pub const HISTORY_DATE_FORMAT: &str = "%d/%m/%Y";
