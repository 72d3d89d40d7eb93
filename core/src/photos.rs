//! Photo upload orchestration and photo listing for alerts.
//!
//! A batch upload first reads and downscales every image, asks the backend
//! for one presigned slot per image in a single call, then pushes every
//! image to object storage concurrently.
//! Only slot acquisition can fail the whole batch; each transfer reports its
//! own outcome.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageFormat};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{ObjectStorage, PhotoApi};
use crate::error::{ApiError, ApiResult, UploadError};
use crate::models::{AlertId, AlertPhoto, PhotoKey, PhotoRecord, UploadSlot};

pub const MAX_DIMENSION: u32 = 1200;
pub const JPEG_QUALITY: u8 = 80;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A locally picked image waiting to be uploaded
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImage {
    pub source: ImageSource,
    pub description: Option<String>,
}

impl PendingImage {
    pub fn from_path(path: impl Into<PathBuf>, description: Option<String>) -> Self {
        PendingImage {
            source: ImageSource::Path(path.into()),
            description,
        }
    }

    pub fn from_bytes(bytes: Vec<u8>, description: Option<String>) -> Self {
        PendingImage {
            source: ImageSource::Bytes(bytes),
            description,
        }
    }

    async fn read(self) -> std::io::Result<Vec<u8>> {
        match self.source {
            ImageSource::Path(path) => tokio::fs::read(&path).await,
            ImageSource::Bytes(bytes) => Ok(bytes),
        }
    }
}

/// Outcome of one image in a batch
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub s3_object_key: String,
    pub description: String,
    pub uploaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Results of a batch, one per input image and in input order
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadBatch {
    pub results: Vec<UploadResult>,
}

impl UploadBatch {
    pub fn uploaded_count(&self) -> usize {
        self.results.iter().filter(|r| r.uploaded).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.uploaded_count()
    }

    pub fn is_complete(&self) -> bool {
        self.failed_count() == 0
    }

    /// e.g. "3 of 5 uploaded"
    pub fn summary(&self) -> String {
        format!("{} of {} uploaded", self.uploaded_count(), self.results.len())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Prepares image bytes for upload
pub trait ImageProcessor: Send + Sync {
    fn process(&self, original: &[u8]) -> Result<ProcessedImage, ImageError>;
}

/// Fits images inside a square bound and re-encodes them as JPEG
#[derive(Debug, Clone)]
pub struct JpegDownscaler {
    pub max_dimension: u32,
    pub quality: u8,
}

impl Default for JpegDownscaler {
    fn default() -> Self {
        JpegDownscaler {
            max_dimension: MAX_DIMENSION,
            quality: JPEG_QUALITY,
        }
    }
}

impl ImageProcessor for JpegDownscaler {
    fn process(&self, original: &[u8]) -> Result<ProcessedImage, ImageError> {
        let decoded = image::load_from_memory(original)?;

        let resized = if decoded.width() > self.max_dimension
            || decoded.height() > self.max_dimension
        {
            decoded.resize(self.max_dimension, self.max_dimension, FilterType::Triangle)
        } else {
            decoded
        };

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

        let mut bytes = Vec::new();
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, self.quality))?;

        Ok(ProcessedImage {
            bytes,
            content_type: "image/jpeg".to_string(),
        })
    }
}

/// Content type of raw bytes, judged by their magic number
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

fn check_slots(images: usize, slots: usize) -> Result<(), UploadError> {
    if images == 0 {
        return Err(UploadError::EmptyBatch);
    }
    if slots != images {
        return Err(UploadError::SlotCountMismatch {
            requested: images,
            received: slots,
        });
    }
    Ok(())
}

/// Filename extension for a content type, `bin` when it is not an image
fn extension_for(content_type: &str) -> &'static str {
    ImageFormat::from_mime_type(content_type)
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("bin")
}

/// An image that has been read and processed, ready to be transferred
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImage {
    pub description: Option<String>,
    payload: Result<ProcessedImage, String>,
}

impl PreparedImage {
    /// Extension of the bytes that will actually be sent
    pub fn extension(&self) -> &'static str {
        match &self.payload {
            Ok(processed) => extension_for(&processed.content_type),
            Err(_) => "bin",
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.payload.as_ref().ok().map(|p| p.content_type.as_str())
    }
}

/// One filename per image, unique through a shared time-ordered token and
/// named after the format each image is uploaded in
pub fn filenames_for(images: &[PreparedImage]) -> Vec<String> {
    let token = ulid::Ulid::new().to_string().to_lowercase();
    images
        .iter()
        .enumerate()
        .map(|(index, image)| format!("photo_{}_{}.{}", token, index, image.extension()))
        .collect()
}

fn passthrough(original: Arc<Vec<u8>>) -> ProcessedImage {
    let bytes = Arc::try_unwrap(original).unwrap_or_else(|shared| shared.as_ref().clone());
    ProcessedImage {
        content_type: sniff_content_type(&bytes).to_string(),
        bytes,
    }
}

pub struct PhotoService<P, S, I = JpegDownscaler> {
    api: P,
    storage: S,
    processor: Arc<I>,
}

impl<P: PhotoApi, S: ObjectStorage> PhotoService<P, S> {
    pub fn new(api: P, storage: S) -> Self {
        Self::with_processor(api, storage, JpegDownscaler::default())
    }
}

impl<P: PhotoApi, S: ObjectStorage, I: ImageProcessor + 'static> PhotoService<P, S, I> {
    pub fn with_processor(api: P, storage: S, processor: I) -> Self {
        PhotoService {
            api,
            storage,
            processor: Arc::new(processor),
        }
    }

    pub fn api(&self) -> &P {
        &self.api
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads and processes every image concurrently. Decoding and encoding
    /// run on the blocking pool.
    ///
    /// An image that cannot be read keeps its error until transfer time, so
    /// the result always has one entry per input, in input order.
    pub async fn prepare(&self, images: Vec<PendingImage>) -> Vec<PreparedImage> {
        join_all(images.into_iter().map(|image| self.prepare_one(image))).await
    }

    async fn prepare_one(&self, image: PendingImage) -> PreparedImage {
        let description = image.description.clone();
        let payload = match image.read().await {
            Ok(original) => Ok(self.process(original).await),
            Err(e) => Err(format!("could not read image: {}", e)),
        };

        PreparedImage {
            description,
            payload,
        }
    }

    async fn process(&self, original: Vec<u8>) -> ProcessedImage {
        let original = Arc::new(original);
        let processor = Arc::clone(&self.processor);
        let input = Arc::clone(&original);

        let outcome =
            tokio::task::spawn_blocking(move || processor.process(input.as_slice())).await;

        match outcome {
            Ok(Ok(processed)) => processed,
            Ok(Err(e)) => {
                debug!(error = %e, "Image processing failed, uploading original bytes");
                passthrough(original)
            }
            Err(e) => {
                warn!(error = %e, "Image processing task failed, uploading original bytes");
                passthrough(original)
            }
        }
    }

    /// Uploads `images` as photos of `alert_id`.
    ///
    /// Fails as a whole only for an empty batch, a missing alert or a slot
    /// request that does not return exactly one slot per image. Transfer
    /// failures are reported per image in the returned batch.
    pub async fn upload_batch(
        &self,
        images: Vec<PendingImage>,
        alert_id: Option<AlertId>,
    ) -> Result<UploadBatch, UploadError> {
        if images.is_empty() {
            return Err(UploadError::EmptyBatch);
        }
        if alert_id.is_none() {
            return Err(UploadError::MissingAlert);
        }

        let prepared = self.prepare(images).await;
        self.upload_prepared(prepared, alert_id).await
    }

    /// Requests one slot per prepared image, then transfers them
    pub async fn upload_prepared(
        &self,
        images: Vec<PreparedImage>,
        alert_id: Option<AlertId>,
    ) -> Result<UploadBatch, UploadError> {
        if images.is_empty() {
            return Err(UploadError::EmptyBatch);
        }
        let alert_id = alert_id.ok_or(UploadError::MissingAlert)?;

        let filenames = filenames_for(&images);
        info!(alert_id, count = images.len(), "Requesting upload slots");

        let slots = self
            .api
            .request_upload_slots(alert_id, &filenames)
            .await
            .map_err(UploadError::Slots)?;

        self.upload_prepared_to_slots(images, slots).await
    }

    /// Transfers `images` to already issued `slots`, matched by position
    pub async fn upload_to_slots(
        &self,
        images: Vec<PendingImage>,
        slots: Vec<UploadSlot>,
    ) -> Result<UploadBatch, UploadError> {
        check_slots(images.len(), slots.len())?;

        let prepared = self.prepare(images).await;
        self.upload_prepared_to_slots(prepared, slots).await
    }

    pub async fn upload_prepared_to_slots(
        &self,
        images: Vec<PreparedImage>,
        slots: Vec<UploadSlot>,
    ) -> Result<UploadBatch, UploadError> {
        check_slots(images.len(), slots.len())?;

        let transfers = images
            .into_iter()
            .zip(slots)
            .enumerate()
            .map(|(index, (image, slot))| self.upload_one(index, image, slot));

        let batch = UploadBatch {
            results: join_all(transfers).await,
        };

        if batch.is_complete() {
            info!(summary = %batch.summary(), "Photo batch finished");
        } else {
            warn!(
                summary = %batch.summary(),
                failed = batch.failed_count(),
                "Photo batch finished with failures"
            );
        }

        Ok(batch)
    }

    async fn upload_one(
        &self,
        index: usize,
        image: PreparedImage,
        slot: UploadSlot,
    ) -> UploadResult {
        let description = image
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("Photo {}", index + 1));

        let outcome = match image.payload {
            Ok(processed) => self
                .storage
                .put_object(&slot.presigned_url, processed.bytes, &processed.content_type)
                .await
                .map_err(|e| e.to_string()),
            Err(message) => Err(message),
        };

        match outcome {
            Ok(()) => {
                debug!(index, key = %slot.s3_object_key, "Photo uploaded");
                UploadResult {
                    s3_object_key: slot.s3_object_key,
                    description,
                    uploaded: true,
                    error: None,
                }
            }
            Err(message) => {
                warn!(index, key = %slot.s3_object_key, error = %message, "Photo upload failed");
                UploadResult {
                    s3_object_key: slot.s3_object_key,
                    description,
                    uploaded: false,
                    error: Some(message),
                }
            }
        }
    }

    /// Photos of an alert, in server order.
    ///
    /// Prefers the photo listing (stable ids) and falls back to the photos
    /// embedded in the alert detail. Photos from the fallback with no id or
    /// object key come back without a key and cannot be deleted.
    pub async fn fetch_alert_photos(&self, alert_id: AlertId) -> ApiResult<Vec<AlertPhoto>> {
        match self.api.list_photos(alert_id).await {
            Ok(records) if !records.is_empty() => {
                return Ok(records.into_iter().map(AlertPhoto::from).collect());
            }
            Ok(_) => debug!(alert_id, "Photo listing empty, checking alert detail"),
            Err(e) => debug!(alert_id, error = %e, "Photo listing failed, checking alert detail"),
        }

        let alert = self.api.get_alert(alert_id).await?;
        Ok(alert.photo_urls.into_iter().map(AlertPhoto::from).collect())
    }

    /// Deletes a photo addressed by id or object key under its alert
    pub async fn delete_photo(&self, key: &PhotoKey, alert_id: AlertId) -> ApiResult<()> {
        if let PhotoKey::ObjectKey(k) = key {
            if k.trim().is_empty() {
                return Err(ApiError::InvalidInput("photo key is empty".to_string()));
            }
        }

        self.api.delete_photo(alert_id, key).await?;
        info!(alert_id, key = %key, "Photo deleted");
        Ok(())
    }

    pub async fn update_photo_description(
        &self,
        photo: &AlertPhoto,
        description: &str,
    ) -> ApiResult<PhotoRecord> {
        let photo_id = photo.photo_id().ok_or_else(|| {
            ApiError::InvalidInput("only photos with a stable id can be edited".to_string())
        })?;

        self.api
            .update_photo_description(photo_id, description)
            .await
    }
}
