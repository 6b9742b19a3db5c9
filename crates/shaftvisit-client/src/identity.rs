//! Device identity and enrollment.
//!
//! Enrollment is a one-time, low-frequency operation gating every later
//! screen, so it is optimistic: once the four identity fields validate and
//! the device is reachable, the record is persisted and the device is
//! treated as enrolled even when the backend rejects or times out.  The
//! remote failure is logged, never surfaced.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use shaftvisit_net::{Connectivity, EnrollmentPayload, VisitGateway};
use shaftvisit_shared::constants::{DEVICE_ID_PREFIX, KEY_DEVICE_ENROLLMENT, KEY_DEVICE_ID};
use shaftvisit_shared::{DeviceIdentity, FieldError};
use shaftvisit_store::{KeyValueStore, StoreError};

/// User-entered enrollment fields, untrimmed.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentForm {
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub designation: String,
}

/// Errors produced by [`IdentityManager::enroll`].
#[derive(Error, Debug)]
pub enum EnrollError {
    /// One or more required fields are blank; every missing field is named.
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Validation(Vec<FieldError>),

    /// The device is offline; nothing was persisted.
    #[error("No internet connection")]
    Offline,

    /// The local write failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns device-id generation and the persisted enrollment record.
pub struct IdentityManager {
    store: Arc<dyn KeyValueStore>,
    connectivity: Arc<dyn Connectivity>,
    gateway: Arc<dyn VisitGateway>,
}

impl IdentityManager {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        connectivity: Arc<dyn Connectivity>,
        gateway: Arc<dyn VisitGateway>,
    ) -> Self {
        Self {
            store,
            connectivity,
            gateway,
        }
    }

    /// Read the persisted enrollment record.
    ///
    /// Read or decode failures are logged and treated as "not enrolled";
    /// this runs on every app start to decide initial routing and must
    /// never take the app down.
    pub async fn load_identity(&self) -> Option<DeviceIdentity> {
        let raw = match self.store.get(KEY_DEVICE_ENROLLMENT).await {
            Ok(value) => value?,
            Err(e) => {
                tracing::error!(error = %e, "failed to read enrollment record");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::error!(error = %e, "corrupt enrollment record");
                None
            }
        }
    }

    /// Return the persisted device id, generating and persisting one on
    /// first use.  The id is stable for the life of the install.
    pub async fn ensure_device_id(&self) -> Result<String, StoreError> {
        if let Some(id) = self.store.get(KEY_DEVICE_ID).await? {
            return Ok(id);
        }

        let id = format!(
            "{}-{}-{:08x}",
            DEVICE_ID_PREFIX,
            Utc::now().timestamp_millis(),
            rand::random::<u32>()
        );
        self.store.set(KEY_DEVICE_ID, &id).await?;

        tracing::info!(device_id = %id, "generated device id");
        Ok(id)
    }

    /// Enroll this device for the given employee.
    ///
    /// Validation collects every blank field.  Offline returns
    /// [`EnrollError::Offline`] with nothing persisted.  When online, the
    /// remote enrollment call is attempted with the bounded timeout, but
    /// any remote failure only gets logged: the device counts as enrolled
    /// once the local record exists.
    pub async fn enroll(&self, form: &EnrollmentForm) -> Result<DeviceIdentity, EnrollError> {
        let employee_code = form.employee_code.trim();
        let first_name = form.first_name.trim();
        let last_name = form.last_name.trim();
        let designation = form.designation.trim();

        let mut errors = Vec::new();
        if employee_code.is_empty() {
            errors.push(FieldError::header("employeeCode"));
        }
        if first_name.is_empty() {
            errors.push(FieldError::header("firstName"));
        }
        if last_name.is_empty() {
            errors.push(FieldError::header("lastName"));
        }
        if designation.is_empty() {
            errors.push(FieldError::header("designation"));
        }
        if !errors.is_empty() {
            return Err(EnrollError::Validation(errors));
        }

        if !self.connectivity.fetch_now().await.is_connected {
            return Err(EnrollError::Offline);
        }

        let identity = DeviceIdentity {
            device_id: self.ensure_device_id().await?,
            employee_code: employee_code.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            designation: designation.to_string(),
            date_enrolled: Utc::now(),
            last_sync: None,
            connection_status_at_enrollment: true,
        };

        // Never block the user on the backend: log and continue locally.
        if let Err(e) = self
            .gateway
            .enroll_device(&EnrollmentPayload::from(&identity))
            .await
        {
            tracing::warn!(
                error = %e,
                "remote enrollment failed; continuing with local enrollment"
            );
        }

        let json = serde_json::to_string(&identity).map_err(StoreError::from)?;
        self.store.set(KEY_DEVICE_ENROLLMENT, &json).await?;

        tracing::info!(
            employee_code = %identity.employee_code,
            device_id = %identity.device_id,
            "device enrolled"
        );
        Ok(identity)
    }

    /// Delete the persisted enrollment record.  Idempotent.
    pub async fn clear_enrollment(&self) -> Result<(), StoreError> {
        self.store.remove(KEY_DEVICE_ENROLLMENT).await
    }

    /// Record a successful sync.  The only permitted mutation of an
    /// existing enrollment record; returns `false` when none exists.
    pub async fn touch_last_sync(&self, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let Some(raw) = self.store.get(KEY_DEVICE_ENROLLMENT).await? else {
            return Ok(false);
        };

        let mut identity: DeviceIdentity =
            serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
                key: KEY_DEVICE_ENROLLMENT.to_string(),
                source: e,
            })?;
        identity.last_sync = Some(at);

        let json = serde_json::to_string(&identity)?;
        self.store.set(KEY_DEVICE_ENROLLMENT, &json).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use shaftvisit_net::{DetailPayload, GatewayError, HeaderPayload, SharedConnectivity};
    use shaftvisit_store::MemoryStore;

    use super::*;

    /// Gateway double that records calls and fails on demand.
    #[derive(Default)]
    struct FakeGateway {
        calls: Mutex<Vec<&'static str>>,
        fail_enroll: bool,
    }

    impl FakeGateway {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VisitGateway for FakeGateway {
        async fn enroll_device(&self, _: &EnrollmentPayload) -> Result<(), GatewayError> {
            self.calls.lock().unwrap().push("enroll");
            if self.fail_enroll {
                return Err(GatewayError::Status { status: 500 });
            }
            Ok(())
        }

        async fn submit_details(&self, _: &[DetailPayload]) -> Result<(), GatewayError> {
            self.calls.lock().unwrap().push("details");
            Ok(())
        }

        async fn submit_header(&self, _: &HeaderPayload) -> Result<(), GatewayError> {
            self.calls.lock().unwrap().push("header");
            Ok(())
        }
    }

    fn manager(
        online: bool,
        fail_enroll: bool,
    ) -> (IdentityManager, Arc<MemoryStore>, Arc<FakeGateway>) {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(FakeGateway {
            fail_enroll,
            ..Default::default()
        });
        let manager = IdentityManager::new(
            store.clone(),
            Arc::new(SharedConnectivity::new(online)),
            gateway.clone(),
        );
        (manager, store, gateway)
    }

    fn valid_form() -> EnrollmentForm {
        EnrollmentForm {
            employee_code: " EMP-001 ".into(),
            first_name: "Besa".into(),
            last_name: "Mwale".into(),
            designation: "Shift Boss".into(),
        }
    }

    #[tokio::test]
    async fn ensure_device_id_is_idempotent() {
        let (manager, _, _) = manager(true, false);

        let first = manager.ensure_device_id().await.unwrap();
        let second = manager.ensure_device_id().await.unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with("DEV-"));
    }

    #[tokio::test]
    async fn enroll_trims_and_persists() {
        let (manager, _, _) = manager(true, false);

        let identity = manager.enroll(&valid_form()).await.unwrap();
        assert_eq!(identity.employee_code, "EMP-001");
        assert!(identity.connection_status_at_enrollment);
        assert_eq!(identity.last_sync, None);

        let loaded = manager.load_identity().await.unwrap();
        assert_eq!(loaded, identity);
    }

    #[tokio::test]
    async fn enroll_succeeds_despite_remote_failure() {
        let (manager, _, gateway) = manager(true, true);

        let identity = manager.enroll(&valid_form()).await.unwrap();
        assert_eq!(gateway.calls(), vec!["enroll"]);

        // Enrolled locally regardless of the 500.
        assert_eq!(manager.load_identity().await, Some(identity));
    }

    #[tokio::test]
    async fn enroll_offline_persists_nothing() {
        let (manager, _, gateway) = manager(false, false);

        let err = manager.enroll(&valid_form()).await.unwrap_err();
        assert!(matches!(err, EnrollError::Offline));
        assert!(gateway.calls().is_empty());
        assert!(manager.load_identity().await.is_none());
    }

    #[tokio::test]
    async fn enroll_reports_every_blank_field() {
        let (manager, _, gateway) = manager(true, false);

        let form = EnrollmentForm {
            employee_code: String::new(),
            first_name: "  ".into(),
            ..valid_form()
        };

        let err = manager.enroll(&form).await.unwrap_err();
        let EnrollError::Validation(errors) = err else {
            panic!("expected validation error");
        };

        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["employeeCode", "firstName"]);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn enroll_with_only_employee_code_blank() {
        let (manager, _, _) = manager(true, false);

        let form = EnrollmentForm {
            employee_code: String::new(),
            ..valid_form()
        };

        let err = manager.enroll(&form).await.unwrap_err();
        let EnrollError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors, vec![FieldError::header("employeeCode")]);
    }

    #[tokio::test]
    async fn clear_enrollment_is_idempotent() {
        let (manager, _, _) = manager(true, false);

        manager.enroll(&valid_form()).await.unwrap();
        manager.clear_enrollment().await.unwrap();
        assert!(manager.load_identity().await.is_none());

        // Clearing again is not an error.
        manager.clear_enrollment().await.unwrap();
    }

    #[tokio::test]
    async fn touch_last_sync_updates_only_that_field() {
        let (manager, _, _) = manager(true, false);

        assert!(!manager.touch_last_sync(Utc::now()).await.unwrap());

        let identity = manager.enroll(&valid_form()).await.unwrap();
        let when = Utc::now();
        assert!(manager.touch_last_sync(when).await.unwrap());

        let loaded = manager.load_identity().await.unwrap();
        assert_eq!(loaded.last_sync, Some(when));
        assert_eq!(loaded.employee_code, identity.employee_code);
        assert_eq!(loaded.date_enrolled, identity.date_enrolled);
    }

    #[tokio::test]
    async fn corrupt_record_loads_as_absent() {
        let (manager, store, _) = manager(true, false);
        store.set(KEY_DEVICE_ENROLLMENT, "{broken").await.unwrap();
        assert!(manager.load_identity().await.is_none());
    }
}
