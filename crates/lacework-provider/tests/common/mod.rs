use async_trait::async_trait;
use lacework_api::{
    ApiError, ApiResponse, Integration, IntegrationState, IntegrationType, IntegrationsApi,
    IntegrationsResponse, Result,
};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// In-memory Lacework integrations API
#[derive(Default)]
pub struct MockApi {
    records: Mutex<BTreeMap<String, Integration>>,
    next_id: AtomicU32,

    pub creates: AtomicU32,
    pub updates: AtomicU32,
    pub deletes: AtomicU32,
    pub tests: AtomicU32,

    failing_creates: AtomicU32,
    test_error: Mutex<Option<String>>,
    delete_error: Mutex<Option<String>>,
    create_response: Mutex<Option<Vec<Integration>>>,
    masked: Mutex<Vec<&'static str>>,
}

#[allow(dead_code)]
impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` creates with a 500.
    pub fn fail_creates(self, n: u32) -> Self {
        self.failing_creates.store(n, Ordering::SeqCst);
        self
    }

    pub fn fail_tests(self, message: &str) -> Self {
        *self.test_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn fail_deletes(self, message: &str) -> Self {
        *self.delete_error.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Answer creates with these records instead of storing anything.
    pub fn respond_to_create(self, records: Vec<Integration>) -> Self {
        *self.create_response.lock().unwrap() = Some(records);
        self
    }

    /// Return `"****"` at this JSON pointer inside `DATA`.
    pub fn mask(self, pointer: &'static str) -> Self {
        self.masked.lock().unwrap().push(pointer);
        self
    }

    pub fn insert(&self, record: Integration) {
        self.records
            .lock()
            .unwrap()
            .insert(record.guid.clone(), record);
    }

    pub fn remove(&self, guid: &str) {
        self.records.lock().unwrap().remove(guid);
    }

    pub fn stored(&self, guid: &str) -> Option<Integration> {
        self.records.lock().unwrap().get(guid).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn count(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }

    fn masked_copy(&self, record: &Integration) -> Integration {
        let mut record = record.clone();
        for pointer in self.masked.lock().unwrap().iter() {
            if let Some(value) = record.data.pointer_mut(pointer) {
                *value = serde_json::Value::String("****".to_string());
            }
        }
        record
    }

    fn response(&self, records: Vec<Integration>) -> IntegrationsResponse {
        ApiResponse {
            ok: true,
            message: "SUCCESS".to_string(),
            data: records.iter().map(|r| self.masked_copy(r)).collect(),
        }
    }
}

fn status(method: &str, path: &str, status: u16, message: &str) -> ApiError {
    ApiError::Status {
        method: method.to_string(),
        url: format!("https://acme.lacework.net/api/v1/external/integrations{}", path),
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl IntegrationsApi for MockApi {
    async fn create(&self, integration: &Integration) -> Result<IntegrationsResponse> {
        self.creates.fetch_add(1, Ordering::SeqCst);

        let failing = self.failing_creates.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_creates.store(failing - 1, Ordering::SeqCst);
            return Err(status("POST", "", 500, "role not assumable yet"));
        }

        if let Some(records) = self.create_response.lock().unwrap().clone() {
            return Ok(self.response(records));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut record = integration
            .clone()
            .with_guid(format!("ACME_{:04}", n));
        record.type_name = integration.integration_type.as_str().to_string();
        record.created_or_updated_time = "2026-01-15T10:00:00.000Z".to_string();
        record.created_or_updated_by = "ops@acme.example".to_string();
        record.state = Some(IntegrationState {
            ok: true,
            last_updated_time: "2026-01-15T10:00:00.000Z".to_string(),
            last_successful_time: "2026-01-15T10:00:00.000Z".to_string(),
        });

        self.insert(record.clone());
        Ok(self.response(vec![record]))
    }

    async fn get(&self, guid: &str) -> Result<IntegrationsResponse> {
        match self.stored(guid) {
            Some(record) => Ok(self.response(vec![record])),
            None => Err(status("GET", &format!("/{}", guid), 404, "Not Found")),
        }
    }

    async fn update(&self, integration: &Integration) -> Result<IntegrationsResponse> {
        self.updates.fetch_add(1, Ordering::SeqCst);

        let Some(existing) = self.stored(&integration.guid) else {
            return Err(status(
                "PATCH",
                &format!("/{}", integration.guid),
                404,
                "Not Found",
            ));
        };

        let mut record = integration.clone();
        record.type_name = existing.type_name;
        record.created_or_updated_by = existing.created_or_updated_by;
        record.created_or_updated_time = "2026-01-16T10:00:00.000Z".to_string();
        record.state = existing.state;

        self.insert(record.clone());
        Ok(self.response(vec![record]))
    }

    async fn delete(&self, guid: &str) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.delete_error.lock().unwrap().clone() {
            return Err(status("DELETE", &format!("/{}", guid), 500, &message));
        }

        match self.records.lock().unwrap().remove(guid) {
            Some(_) => Ok(()),
            None => Err(status("DELETE", &format!("/{}", guid), 404, "Not Found")),
        }
    }

    async fn test(&self, guid: &str) -> Result<()> {
        self.tests.fetch_add(1, Ordering::SeqCst);

        match self.test_error.lock().unwrap().clone() {
            Some(message) => Err(ApiError::Status {
                method: "POST".to_string(),
                url: format!("https://acme.lacework.net/api/v2/AlertChannels/{}/test", guid),
                status: 400,
                message,
            }),
            None => Ok(()),
        }
    }

    async fn list(&self, integration_type: IntegrationType) -> Result<IntegrationsResponse> {
        let records = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.integration_type == integration_type)
            .cloned()
            .collect();
        Ok(self.response(records))
    }
}

/// A record as Lacework would return it
#[allow(dead_code)]
pub fn record(guid: &str, name: &str, integration_type: IntegrationType) -> Integration {
    let mut record = Integration::new(name, integration_type, serde_json::json!({}))
        .with_guid(guid);
    record.type_name = integration_type.as_str().to_string();
    record
}
