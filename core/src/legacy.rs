//! Reads structured pet details out of free-text descriptions written before
//! alerts had dedicated fields.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Alert;

static NAME: LazyLock<Regex> = LazyLock::new(|| line_pattern("Nombre"));
static COLOR: LazyLock<Regex> = LazyLock::new(|| line_pattern("Color"));
static AGE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^\s*Edad:\s*(\d+)"));
static LOCATION: LazyLock<Regex> = LazyLock::new(|| line_pattern("Ubicación específica"));
static CONTACT: LazyLock<Regex> = LazyLock::new(|| line_pattern("Contacto"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| line_pattern("Email"));

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("legacy label regex is valid")
}

fn line_pattern(label: &str) -> Regex {
    compile(&format!(r"(?m)^\s*{}:[ \t]*(.*?)\s*$", regex::escape(label)))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyFields {
    pub pet_name: Option<String>,
    pub color: Option<String>,
    pub age: Option<u32>,
    pub location: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

impl LegacyFields {
    pub fn is_empty(&self) -> bool {
        *self == LegacyFields::default()
    }
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Extracts the labelled lines of a legacy description.
///
/// Only the leading digits of the age line are kept ("3 años" → 3).
pub fn parse_legacy_description(text: &str) -> LegacyFields {
    LegacyFields {
        pet_name: capture(&NAME, text),
        color: capture(&COLOR, text),
        age: capture(&AGE, text).and_then(|age| age.parse().ok()),
        location: capture(&LOCATION, text),
        contact_phone: capture(&CONTACT, text),
        contact_email: capture(&EMAIL, text),
    }
}

fn fill(slot: &mut Option<String>, legacy: Option<String>) {
    let empty = slot.as_deref().map(|v| v.trim().is_empty()).unwrap_or(true);
    if empty && legacy.is_some() {
        *slot = legacy;
    }
}

impl Alert {
    /// Fills empty structured fields from the description. Fields that are
    /// already set are never overwritten.
    pub fn with_legacy_fields(mut self) -> Self {
        let legacy = parse_legacy_description(&self.description);
        if legacy.is_empty() {
            return self;
        }

        fill(&mut self.pet_name, legacy.pet_name);
        fill(&mut self.color, legacy.color);
        fill(&mut self.location, legacy.location);
        fill(&mut self.contact_phone, legacy.contact_phone);
        fill(&mut self.contact_email, legacy.contact_email);
        if self.age.is_none() {
            self.age = legacy.age;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertStatus, AlertType};

    const DESCRIPTION: &str = "Beautiful golden retriever lost in park\n\n\
        Nombre: Buddy\n\
        Color: Golden\n\
        Edad: 3 años\n\
        Ubicación específica: Parque del Retiro\n\
        Contacto: 987654321\n\
        Email: owner@example.com";

    fn bare_alert(description: &str) -> Alert {
        Alert {
            id: 1,
            alert_type: AlertType::Lost,
            status: AlertStatus::Active,
            title: "Buddy perdido".to_string(),
            pet_name: None,
            breed: "Golden".to_string(),
            color: None,
            sex: None,
            age: None,
            size: None,
            description: description.to_string(),
            location: None,
            postal_code: None,
            country_code: None,
            contact_phone: None,
            contact_email: None,
            reward: None,
            chip_number: None,
            date: None,
            username: "ana".to_string(),
            photo_urls: vec![],
            created_at: None,
        }
    }

    #[test]
    fn test_parses_all_labels() {
        let fields = parse_legacy_description(DESCRIPTION);

        assert_eq!(fields.pet_name.as_deref(), Some("Buddy"));
        assert_eq!(fields.color.as_deref(), Some("Golden"));
        assert_eq!(fields.age, Some(3));
        assert_eq!(fields.location.as_deref(), Some("Parque del Retiro"));
        assert_eq!(fields.contact_phone.as_deref(), Some("987654321"));
        assert_eq!(fields.contact_email.as_deref(), Some("owner@example.com"));
    }

    #[test]
    fn test_plain_text_yields_nothing() {
        let fields = parse_legacy_description("Small dog, very friendly. Edad desconocida");
        assert!(fields.is_empty());
    }

    #[test]
    fn test_non_numeric_age_is_ignored() {
        let fields = parse_legacy_description("Edad: unknown\nColor:   ");
        assert_eq!(fields.age, None);
        assert_eq!(fields.color, None);
    }

    #[test]
    fn test_explicit_fields_win() {
        let mut alert = bare_alert(DESCRIPTION);
        alert.pet_name = Some("Max".to_string());
        alert.age = Some(5);

        let alert = alert.with_legacy_fields();

        assert_eq!(alert.pet_name.as_deref(), Some("Max"));
        assert_eq!(alert.age, Some(5));
        assert_eq!(alert.color.as_deref(), Some("Golden"));
        assert_eq!(alert.contact_email.as_deref(), Some("owner@example.com"));
    }

    #[test]
    fn test_blank_fields_are_filled() {
        let mut alert = bare_alert(DESCRIPTION);
        alert.location = Some("  ".to_string());

        let alert = alert.with_legacy_fields();

        assert_eq!(alert.location.as_deref(), Some("Parque del Retiro"));
        assert_eq!(alert.description, DESCRIPTION);
    }
}
