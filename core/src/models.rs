use serde::{Deserialize, Serialize};

/// Server-assigned alert identifier
pub type AlertId = i64;

/// Server-assigned photo identifier
pub type PhotoId = i64;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    #[default]
    Lost,
    /// A sighting of a pet that looks lost (the "found" side)
    Seen,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Lost => "LOST",
            AlertType::Seen => "SEEN",
        }
    }
}

impl std::str::FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOST" => Ok(AlertType::Lost),
            // FOUND is the historical alias the backend maps to SEEN
            "SEEN" | "FOUND" => Ok(AlertType::Seen),
            other => Err(format!("unknown alert type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    #[default]
    Active,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "ACTIVE",
            AlertStatus::Resolved => "RESOLVED",
        }
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(AlertStatus::Active),
            "RESOLVED" => Ok(AlertStatus::Resolved),
            other => Err(format!("unknown alert status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PetSex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl std::str::FromStr for PetSex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MALE" => Ok(PetSex::Male),
            "FEMALE" => Ok(PetSex::Female),
            "UNKNOWN" => Ok(PetSex::Unknown),
            other => Err(format!("unknown sex '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PetSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl std::str::FromStr for PetSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SMALL" => Ok(PetSize::Small),
            "MEDIUM" => Ok(PetSize::Medium),
            "LARGE" => Ok(PetSize::Large),
            other => Err(format!("unknown size '{}'", other)),
        }
    }
}

/// A lost/seen pet report as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: AlertId,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    #[serde(default)]
    pub status: AlertStatus,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pet_name: Option<String>,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub sex: Option<PetSex>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub size: Option<PetSize>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub reward: Option<f64>,
    #[serde(default)]
    pub chip_number: Option<String>,
    /// Date of the loss or sighting, as sent by the backend
    #[serde(default)]
    pub date: Option<String>,
    pub username: String,
    /// Embedded photos (read URLs on detail, write slots right after create)
    #[serde(default)]
    pub photo_urls: Vec<EmbeddedPhoto>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Alert {
    /// Advisory ownership check. The backend remains the authority.
    pub fn is_owned_by(&self, username: &str) -> bool {
        !username.is_empty() && self.username == username
    }

    /// Display name: the pet's name when known, the title otherwise
    pub fn display_name(&self) -> &str {
        match self.pet_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.title,
        }
    }
}

/// Photo entry embedded in an alert payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedPhoto {
    #[serde(default)]
    pub id: Option<PhotoId>,
    #[serde(default)]
    pub s3_object_key: Option<String>,
    #[serde(default)]
    pub presigned_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(true)
}

/// Payload for creating an alert. Blank optional fields are not sent.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub status: AlertStatus,
    pub title: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub pet_name: Option<String>,
    pub breed: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<PetSex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<PetSize>,
    pub description: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<f64>,
    #[serde(skip_serializing_if = "is_blank")]
    pub chip_number: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub date: Option<String>,
    pub username: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub photo_filenames: Vec<String>,
}

/// Optional alert field that an update can set back to empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearableField {
    PetName,
    Color,
    Age,
    PostalCode,
    ContactEmail,
    Reward,
    ChipNumber,
}

impl std::str::FromStr for ClearableField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "pet-name" => Ok(ClearableField::PetName),
            "color" => Ok(ClearableField::Color),
            "age" => Ok(ClearableField::Age),
            "postal-code" => Ok(ClearableField::PostalCode),
            "email" => Ok(ClearableField::ContactEmail),
            "reward" => Ok(ClearableField::Reward),
            "chip" => Ok(ClearableField::ChipNumber),
            other => Err(format!(
                "'{}' cannot be cleared (pet-name, color, age, postal-code, email, reward, chip)",
                other
            )),
        }
    }
}

/// Unset, or set to a value; `Some(None)` is sent as `null`
fn is_unchanged(value: &Option<Option<String>>) -> bool {
    match value {
        None => true,
        Some(None) => false,
        Some(Some(v)) => v.trim().is_empty(),
    }
}

/// Partial update of an alert's descriptive fields.
///
/// Carries no `username`, `id` or `type`: those are fixed at
/// creation. The status can only be moved forward through [`AlertUpdate::resolve`].
///
/// Fields of type `Option<Option<_>>` are left alone when `None`, set when
/// `Some(Some(_))` and cleared on the server when `Some(None)`.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlertUpdate {
    #[serde(skip_serializing_if = "is_blank")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "is_unchanged")]
    pub pet_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "is_blank")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "is_unchanged")]
    pub color: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<PetSex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<PetSize>,
    #[serde(skip_serializing_if = "is_blank")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "is_unchanged")]
    pub postal_code: Option<Option<String>>,
    #[serde(skip_serializing_if = "is_blank")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "is_unchanged")]
    pub contact_email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<Option<f64>>,
    #[serde(skip_serializing_if = "is_unchanged")]
    pub chip_number: Option<Option<String>>,
    #[serde(skip_serializing_if = "is_blank")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) status: Option<AlertStatus>,
}

impl AlertUpdate {
    /// Marks the alert as resolved. There is no way back to ACTIVE.
    pub fn resolve(mut self) -> Self {
        self.status = Some(AlertStatus::Resolved);
        self
    }

    pub fn clear(&mut self, field: ClearableField) {
        match field {
            ClearableField::PetName => self.pet_name = Some(None),
            ClearableField::Color => self.color = Some(None),
            ClearableField::Age => self.age = Some(None),
            ClearableField::PostalCode => self.postal_code = Some(None),
            ClearableField::ContactEmail => self.contact_email = Some(None),
            ClearableField::Reward => self.reward = Some(None),
            ClearableField::ChipNumber => self.chip_number = Some(None),
        }
    }

    pub fn status(&self) -> Option<AlertStatus> {
        self.status
    }

    pub fn is_empty(&self) -> bool {
        *self == AlertUpdate::default()
    }
}

/// Query for one page of the alert list
#[derive(Debug, Clone, PartialEq)]
pub struct AlertQuery {
    pub page: u32,
    pub size: u32,
    pub alert_type: Option<AlertType>,
    pub status: Option<AlertStatus>,
}

/// Server-issued upload slot for one photo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadSlot {
    pub s3_object_key: String,
    pub presigned_url: String,
}

/// Photo record from the dedicated photos endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub id: PhotoId,
    #[serde(default)]
    pub s3_object_key: Option<String>,
    #[serde(default, alias = "url")]
    pub presigned_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

/// How a photo can be addressed for deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PhotoKey {
    Id(PhotoId),
    ObjectKey(String),
}

impl PhotoKey {
    /// Path segment used by the deletion route
    pub fn as_path_segment(&self) -> String {
        match self {
            PhotoKey::Id(id) => id.to_string(),
            PhotoKey::ObjectKey(key) => key.clone(),
        }
    }
}

impl std::fmt::Display for PhotoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhotoKey::Id(id) => write!(f, "#{}", id),
            PhotoKey::ObjectKey(key) => write!(f, "{}", key),
        }
    }
}

impl std::str::FromStr for PhotoKey {
    type Err = std::convert::Infallible;

    /// Numeric strings are photo ids, anything else is an object key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<PhotoId>() {
            Ok(id) => PhotoKey::Id(id),
            Err(_) => PhotoKey::ObjectKey(s.to_string()),
        })
    }
}

/// A photo attached to an alert, as shown in a gallery.
///
/// `key` is `None` when the listing could not provide a stable handle. Such
/// photos can be viewed but not edited or deleted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlertPhoto {
    pub key: Option<PhotoKey>,
    pub url: Option<String>,
    pub description: String,
    pub uploaded_at: Option<String>,
}

impl AlertPhoto {
    pub fn is_deletable(&self) -> bool {
        self.key.is_some()
    }

    pub fn photo_id(&self) -> Option<PhotoId> {
        match self.key {
            Some(PhotoKey::Id(id)) => Some(id),
            _ => None,
        }
    }
}

impl From<PhotoRecord> for AlertPhoto {
    fn from(record: PhotoRecord) -> Self {
        AlertPhoto {
            key: Some(PhotoKey::Id(record.id)),
            url: record.presigned_url,
            description: record.description.unwrap_or_default(),
            uploaded_at: record.uploaded_at,
        }
    }
}

impl From<EmbeddedPhoto> for AlertPhoto {
    fn from(photo: EmbeddedPhoto) -> Self {
        let key = match (photo.id, photo.s3_object_key) {
            (Some(id), _) => Some(PhotoKey::Id(id)),
            (None, Some(key)) if !key.is_empty() => Some(PhotoKey::ObjectKey(key)),
            _ => None,
        };

        AlertPhoto {
            key,
            url: photo.presigned_url,
            description: photo.description.unwrap_or_default(),
            uploaded_at: photo.uploaded_at,
        }
    }
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub subscription_email: Option<String>,
}

/// User record as kept locally after login/registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A comment on an alert
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewPost {
    pub username: String,
    pub content: String,
}
