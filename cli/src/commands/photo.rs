use petsignal_core::{AlertApi, AlertPhoto, PendingImage, PhotoKey};

use crate::{
    args::PhotoCommand,
    commands::{ensure_owner, CommandContext},
};

pub async fn photo_cmd(mut ctx: CommandContext, command: PhotoCommand) -> anyhow::Result<()> {
    let service = ctx.photo_service()?;

    match command {
        PhotoCommand::Upload {
            alert_id,
            paths,
            description,
        } => {
            let username = ctx.username()?;
            let alert = service.api().get_alert(alert_id).await?;
            ensure_owner(&alert, &username)?;

            let mut descriptions = description.into_iter();
            let images = paths
                .into_iter()
                .map(|path| PendingImage::from_path(path, descriptions.next()))
                .collect();

            let batch = service.upload_batch(images, Some(alert_id)).await?;
            ctx.printer.upload_batch(&batch)?;
            if !batch.is_complete() {
                anyhow::bail!("{} photo(s) failed to upload", batch.failed_count());
            }
        }
        PhotoCommand::List { alert_id } => {
            let photos = service.fetch_alert_photos(alert_id).await?;
            ctx.printer.photos(&photos)?;
        }
        PhotoCommand::Delete { alert_id, key } => {
            let username = ctx.username()?;
            let alert = service.api().get_alert(alert_id).await?;
            ensure_owner(&alert, &username)?;

            service.delete_photo(&key, alert_id).await?;
            ctx.printer.message(&format!("Photo {} deleted", key))?;
        }
        PhotoCommand::Describe { photo_id, text } => {
            ctx.username()?;
            let photo = AlertPhoto {
                key: Some(PhotoKey::Id(photo_id)),
                url: None,
                description: String::new(),
                uploaded_at: None,
            };

            let updated = service
                .update_photo_description(&photo, text.join(" ").trim())
                .await?;
            ctx.printer.message(&format!(
                "Photo #{} description set to \"{}\"",
                updated.id,
                updated.description.unwrap_or_default()
            ))?;
        }
    }

    Ok(())
}
