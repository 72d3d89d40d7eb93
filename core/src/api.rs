//! Seams between the client-side state and the outside world.
//!
//! The CLI implements these over HTTP; tests implement them in memory.

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{
    Alert, AlertId, AlertQuery, AlertUpdate, NewAlert, PhotoId, PhotoKey, PhotoRecord, UploadSlot,
};

/// Alert resource of the backend
#[async_trait]
pub trait AlertApi: Send + Sync {
    /// One page of alerts, in server order
    async fn list_alerts(&self, query: &AlertQuery) -> ApiResult<Vec<Alert>>;

    async fn get_alert(&self, id: AlertId) -> ApiResult<Alert>;

    async fn create_alert(&self, alert: &NewAlert) -> ApiResult<Alert>;

    async fn update_alert(&self, id: AlertId, update: &AlertUpdate) -> ApiResult<Alert>;

    /// Hard delete
    async fn delete_alert(&self, id: AlertId) -> ApiResult<()>;
}

/// Photo endpoints. Photo listing falls back to the alert detail, hence the
/// supertrait.
#[async_trait]
pub trait PhotoApi: AlertApi {
    /// Asks for one upload slot per filename, in the same order
    async fn request_upload_slots(
        &self,
        alert_id: AlertId,
        filenames: &[String],
    ) -> ApiResult<Vec<UploadSlot>>;

    async fn list_photos(&self, alert_id: AlertId) -> ApiResult<Vec<PhotoRecord>>;

    async fn delete_photo(&self, alert_id: AlertId, key: &PhotoKey) -> ApiResult<()>;

    async fn update_photo_description(
        &self,
        photo_id: PhotoId,
        description: &str,
    ) -> ApiResult<PhotoRecord>;
}

/// Object storage reachable through presigned URLs
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(&self, url: &str, body: Vec<u8>, content_type: &str) -> ApiResult<()>;
}
