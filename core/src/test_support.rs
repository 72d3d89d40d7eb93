//! In-memory fakes for the API seams.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::ops::RangeInclusive;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::api::{AlertApi, ObjectStorage, PhotoApi};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Alert, AlertId, AlertQuery, AlertStatus, AlertType, AlertUpdate, NewAlert, PhotoId, PhotoKey,
    PhotoRecord, UploadSlot,
};

pub fn alert(id: AlertId, alert_type: AlertType) -> Alert {
    Alert {
        id,
        alert_type,
        status: AlertStatus::Active,
        title: format!("Alert {}", id),
        pet_name: None,
        breed: "Mixed".to_string(),
        color: None,
        sex: None,
        age: None,
        size: None,
        description: String::new(),
        location: None,
        postal_code: None,
        country_code: None,
        contact_phone: None,
        contact_email: None,
        reward: None,
        chip_number: None,
        date: None,
        username: "owner".to_string(),
        photo_urls: vec![],
        created_at: None,
    }
}

pub fn alerts(ids: RangeInclusive<AlertId>) -> Vec<Alert> {
    ids.map(|id| alert(id, AlertType::Lost)).collect()
}

pub fn slots_for(alert_id: AlertId, count: usize) -> Vec<UploadSlot> {
    (0..count)
        .map(|i| UploadSlot {
            s3_object_key: format!("alerts/{}/photo_{}.jpg", alert_id, i),
            presigned_url: format!("https://bucket.test/alerts/{}/photo_{}.jpg?sig", alert_id, i),
        })
        .collect()
}

#[derive(Default)]
pub struct FakeApi {
    pages: Mutex<VecDeque<ApiResult<Vec<Alert>>>>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    queries: Mutex<Vec<AlertQuery>>,
    created: Mutex<Vec<NewAlert>>,
    update_bodies: Mutex<Vec<serde_json::Value>>,
    mutation_error: Mutex<Option<ApiError>>,
    slots: Mutex<Option<ApiResult<Vec<UploadSlot>>>>,
    slot_requests: Mutex<Vec<(AlertId, Vec<String>)>>,
    photos: Mutex<Option<ApiResult<Vec<PhotoRecord>>>>,
    detail: Mutex<Option<Alert>>,
    deleted_photos: Mutex<Vec<(AlertId, PhotoKey)>>,
}

impl FakeApi {
    /// Queues the response of the next list call
    pub fn push_page(&self, page: ApiResult<Vec<Alert>>) {
        self.pages.lock().unwrap().push_back(page);
    }

    /// Holds the next list call until the sender fires
    pub fn gate_next_list(&self, gate: oneshot::Receiver<()>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    pub fn queries(&self) -> Vec<AlertQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<NewAlert> {
        self.created.lock().unwrap().clone()
    }

    pub fn update_bodies(&self) -> Vec<serde_json::Value> {
        self.update_bodies.lock().unwrap().clone()
    }

    pub fn fail_mutations(&self, error: ApiError) {
        *self.mutation_error.lock().unwrap() = Some(error);
    }

    pub fn set_slots(&self, slots: ApiResult<Vec<UploadSlot>>) {
        *self.slots.lock().unwrap() = Some(slots);
    }

    pub fn slot_requests(&self) -> Vec<(AlertId, Vec<String>)> {
        self.slot_requests.lock().unwrap().clone()
    }

    pub fn set_photos(&self, photos: ApiResult<Vec<PhotoRecord>>) {
        *self.photos.lock().unwrap() = Some(photos);
    }

    pub fn set_detail(&self, detail: Alert) {
        *self.detail.lock().unwrap() = Some(detail);
    }

    pub fn deleted_photos(&self) -> Vec<(AlertId, PhotoKey)> {
        self.deleted_photos.lock().unwrap().clone()
    }

    fn mutation_error(&self) -> ApiResult<()> {
        match self.mutation_error.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AlertApi for FakeApi {
    async fn list_alerts(&self, query: &AlertQuery) -> ApiResult<Vec<Alert>> {
        self.queries.lock().unwrap().push(query.clone());
        let response = self.pages.lock().unwrap().pop_front().unwrap_or(Ok(vec![]));
        let gate = self.gate.lock().unwrap().take();

        if let Some(gate) = gate {
            let _ = gate.await;
        }
        response
    }

    async fn get_alert(&self, id: AlertId) -> ApiResult<Alert> {
        let detail = self.detail.lock().unwrap().clone();
        Ok(detail
            .filter(|a| a.id == id)
            .unwrap_or_else(|| alert(id, AlertType::Lost)))
    }

    async fn create_alert(&self, new_alert: &NewAlert) -> ApiResult<Alert> {
        self.mutation_error()?;
        self.created.lock().unwrap().push(new_alert.clone());

        let mut created = alert(100, new_alert.alert_type);
        created.title = new_alert.title.clone();
        created.breed = new_alert.breed.clone();
        created.description = new_alert.description.clone();
        created.contact_phone = new_alert.contact_phone.clone();
        created.contact_email = new_alert.contact_email.clone();
        created.username = new_alert.username.clone();
        Ok(created)
    }

    async fn update_alert(&self, id: AlertId, update: &AlertUpdate) -> ApiResult<Alert> {
        self.mutation_error()?;
        self.update_bodies
            .lock()
            .unwrap()
            .push(serde_json::to_value(update).unwrap());

        let mut updated = alert(id, AlertType::Lost);
        if let Some(title) = &update.title {
            updated.title = title.clone();
        }
        if let Some(status) = update.status() {
            updated.status = status;
        }
        Ok(updated)
    }

    async fn delete_alert(&self, _id: AlertId) -> ApiResult<()> {
        self.mutation_error()
    }
}

#[async_trait]
impl PhotoApi for FakeApi {
    async fn request_upload_slots(
        &self,
        alert_id: AlertId,
        filenames: &[String],
    ) -> ApiResult<Vec<UploadSlot>> {
        self.slot_requests
            .lock()
            .unwrap()
            .push((alert_id, filenames.to_vec()));

        match self.slots.lock().unwrap().clone() {
            Some(slots) => slots,
            None => Ok(slots_for(alert_id, filenames.len())),
        }
    }

    async fn list_photos(&self, _alert_id: AlertId) -> ApiResult<Vec<PhotoRecord>> {
        self.photos.lock().unwrap().clone().unwrap_or(Ok(vec![]))
    }

    async fn delete_photo(&self, alert_id: AlertId, key: &PhotoKey) -> ApiResult<()> {
        self.mutation_error()?;
        self.deleted_photos
            .lock()
            .unwrap()
            .push((alert_id, key.clone()));
        Ok(())
    }

    async fn update_photo_description(
        &self,
        photo_id: PhotoId,
        description: &str,
    ) -> ApiResult<PhotoRecord> {
        self.mutation_error()?;
        Ok(PhotoRecord {
            id: photo_id,
            s3_object_key: None,
            presigned_url: None,
            description: Some(description.to_string()),
            uploaded_at: None,
        })
    }
}

/// Object storage that records every PUT and fails configured URLs
#[derive(Default)]
pub struct FakeStorage {
    failures: Mutex<HashMap<String, u16>>,
    puts: Mutex<Vec<(String, Vec<u8>, String)>>,
}

impl FakeStorage {
    pub fn fail_url(&self, url: &str, status: u16) {
        self.failures
            .lock()
            .unwrap()
            .insert(url.to_string(), status);
    }

    /// (url, body, content type) of every attempted PUT
    pub fn puts(&self) -> Vec<(String, Vec<u8>, String)> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn put_object(&self, url: &str, body: Vec<u8>, content_type: &str) -> ApiResult<()> {
        if let Some(status) = self.failures.lock().unwrap().get(url) {
            return Err(ApiError::from_status(*status, None));
        }
        self.puts
            .lock()
            .unwrap()
            .push((url.to_string(), body, content_type.to_string()));
        Ok(())
    }
}
