use std::io::{self, Write};

use chrono::{DateTime, Local, NaiveDateTime};
use petsignal_core::{Alert, AlertPhoto, AlertState, AlertStatus, AlertType, Post, UploadBatch, User};
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::args::OutputFormat;

/// Renders command results to stdout in the selected format
pub struct Printer {
    format: OutputFormat,
    out: StandardStream,
}

impl Printer {
    pub fn new(format: OutputFormat) -> Self {
        let choice = match format {
            OutputFormat::Pretty => ColorChoice::Auto,
            _ => ColorChoice::Never,
        };
        Printer {
            format,
            out: StandardStream::stdout(choice),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        writeln!(self.out, "{}", text)
    }

    fn colored(&mut self, color: Color, bold: bool, text: &str) -> io::Result<()> {
        self.out
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))?;
        write!(self.out, "{}", text)?;
        self.out.reset()
    }

    /// Plain status line, or `{"message": ...}` in JSON mode
    pub fn message(&mut self, text: &str) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({ "message": text })),
            _ => writeln!(self.out, "{}", text),
        }
    }

    pub fn value<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        self.json(value)
    }

    pub fn alert_list(&mut self, state: &AlertState) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&serde_json::json!({
                "items": state.items,
                "page": state.pagination.page,
                "hasMore": state.pagination.has_more,
                "counts": state.type_counts,
            }));
        }

        for alert in &state.items {
            self.alert_line(alert)?;
        }

        if self.format == OutputFormat::Pretty {
            writeln!(
                self.out,
                "\n{} shown (lost {}, seen {}){}",
                state.items.len(),
                state.count_for(AlertType::Lost),
                state.count_for(AlertType::Seen),
                if state.pagination.has_more {
                    ", more available"
                } else {
                    ""
                }
            )?;
        }
        Ok(())
    }

    fn alert_line(&mut self, alert: &Alert) -> io::Result<()> {
        match self.format {
            OutputFormat::Plain => writeln!(
                self.out,
                "{}\t{}\t{}\t{}\t{}",
                alert.id,
                alert.alert_type.as_str(),
                alert.status.as_str(),
                alert.display_name(),
                alert.location.as_deref().unwrap_or("")
            ),
            _ => {
                self.colored(Color::Yellow, false, &format!("#{:<6}", alert.id))?;
                let type_color = match alert.alert_type {
                    AlertType::Lost => Color::Red,
                    AlertType::Seen => Color::Green,
                };
                self.colored(type_color, true, &format!("{:<5}", alert.alert_type.as_str()))?;
                write!(self.out, " {}", alert.display_name())?;
                if alert.status == AlertStatus::Resolved {
                    self.colored(Color::Cyan, false, " [resolved]")?;
                }
                if let Some(location) = alert.location.as_deref() {
                    write!(self.out, " · {}", location)?;
                }
                writeln!(self.out)
            }
        }
    }

    pub fn alert(&mut self, alert: &Alert) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(alert);
        }

        self.alert_line(alert)?;

        let fields = [
            ("Title", Some(alert.title.clone())),
            ("Breed", Some(alert.breed.clone())),
            ("Color", alert.color.clone()),
            ("Age", alert.age.map(|a| a.to_string())),
            ("Date", alert.date.clone()),
            ("Location", alert.location.clone()),
            ("Postal code", alert.postal_code.clone()),
            ("Phone", alert.contact_phone.clone()),
            ("Email", alert.contact_email.clone()),
            ("Reward", alert.reward.map(|r| format!("{:.2}", r))),
            ("Chip", alert.chip_number.clone()),
            ("Posted by", Some(alert.username.clone())),
            ("Posted on", alert.created_at.as_deref().map(format_timestamp)),
            ("Photos", Some(alert.photo_urls.len().to_string())),
        ];

        for (label, value) in fields {
            let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            match self.format {
                OutputFormat::Pretty => {
                    self.colored(Color::Blue, true, &format!("  {:<12}", label))?;
                    writeln!(self.out, "{}", value)?;
                }
                _ => writeln!(self.out, "{}: {}", label, value)?,
            }
        }

        if !alert.description.trim().is_empty() {
            writeln!(self.out, "\n{}", alert.description.trim())?;
        }
        Ok(())
    }

    pub fn photos(&mut self, photos: &[AlertPhoto]) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(photos);
        }

        for photo in photos {
            let key = photo
                .key
                .as_ref()
                .map(|k| k.to_string())
                .unwrap_or_else(|| "-".to_string());
            let url = photo.url.as_deref().unwrap_or("");
            match self.format {
                OutputFormat::Plain => {
                    writeln!(self.out, "{}\t{}\t{}", key, photo.description, url)?
                }
                _ => {
                    self.colored(Color::Yellow, false, &format!("{:<10}", key))?;
                    writeln!(self.out, " {} {}", photo.description, url)?;
                }
            }
        }
        Ok(())
    }

    pub fn upload_batch(&mut self, batch: &UploadBatch) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&serde_json::json!({
                "summary": batch.summary(),
                "results": batch.results,
            }));
        }

        for result in &batch.results {
            if result.uploaded {
                self.colored(Color::Green, true, "ok    ")?;
                writeln!(self.out, "{} ({})", result.s3_object_key, result.description)?;
            } else {
                self.colored(Color::Red, true, "failed")?;
                writeln!(
                    self.out,
                    " {}: {}",
                    result.s3_object_key,
                    result.error.as_deref().unwrap_or("unknown error")
                )?;
            }
        }
        writeln!(self.out, "{}", batch.summary())
    }

    pub fn posts(&mut self, posts: &[Post]) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(posts);
        }

        for post in posts {
            let when = post
                .created_at
                .as_deref()
                .map(format_timestamp)
                .unwrap_or_default();
            match self.format {
                OutputFormat::Plain => {
                    writeln!(self.out, "{}\t{}\t{}", post.username, when, post.content)?
                }
                _ => {
                    self.colored(Color::Cyan, true, &post.username)?;
                    writeln!(self.out, " {}\n  {}", when, post.content)?;
                }
            }
        }
        Ok(())
    }

    pub fn user(&mut self, user: &User) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(user);
        }

        writeln!(self.out, "{}", user.username)?;
        if let Some(email) = &user.email {
            writeln!(self.out, "email: {}", email)?;
        }
        if let Some(phone) = &user.phone_number {
            writeln!(self.out, "phone: {}", phone)?;
        }
        if let Some(role) = &user.role {
            writeln!(self.out, "role: {}", role)?;
        }
        Ok(())
    }
}

/// Backend timestamps come with or without an offset; both are shown in local time
fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}
