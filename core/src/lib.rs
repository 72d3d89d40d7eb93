#![deny(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

pub mod api;
pub mod error;
pub mod legacy;
pub mod models;
pub mod photos;
pub mod store;
pub mod validation;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use api::{AlertApi, ObjectStorage, PhotoApi};
pub use error::{ApiError, ApiResult, UploadError};
pub use legacy::{parse_legacy_description, LegacyFields};
pub use models::{
    Alert, AlertId, AlertPhoto, AlertQuery, AlertStatus, AlertType, AlertUpdate, ClearableField,
    NewAlert, NewPost, NewUser, PetSex, PetSize, PhotoId, PhotoKey, PhotoRecord, Post, UploadSlot,
    User,
};
pub use photos::{PendingImage, PhotoService, PreparedImage, UploadBatch, UploadResult};
pub use store::{AlertEvent, AlertState, AlertStore, FilterChange, Filters, DEFAULT_PAGE_SIZE};
pub use validation::ValidationError;
