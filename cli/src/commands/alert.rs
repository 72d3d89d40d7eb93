use petsignal_core::photos::filenames_for;
use petsignal_core::validation::validate_new_alert;
use petsignal_core::{
    Alert, AlertApi, AlertStatus, AlertStore, AlertType, AlertUpdate, ApiError, ClearableField,
    FilterChange, NewAlert, PendingImage, PreparedImage, UploadSlot,
};

use crate::{
    args::{AlertCommand, AlertCreateArgs, AlertFieldArgs, AlertListArgs},
    commands::{ensure_owner, CommandContext},
};

pub async fn alert_cmd(mut ctx: CommandContext, command: AlertCommand) -> anyhow::Result<()> {
    let store = AlertStore::with_page_size(ctx.client()?, ctx.config.page_size);

    match command {
        AlertCommand::List(args) => list(&mut ctx, &store, args).await?,
        AlertCommand::Show { id } => {
            let alert = store.load_alert_by_id(id).await?.with_legacy_fields();
            ctx.printer.alert(&alert)?;
        }
        AlertCommand::Create(args) => create(&mut ctx, &store, args).await?,
        AlertCommand::Update { id, fields, clear } => {
            let username = ctx.username()?;
            let update = build_update(fields, &clear);
            if update.is_empty() {
                anyhow::bail!("Nothing to update");
            }

            let existing = store.api().get_alert(id).await?;
            ensure_owner(&existing, &username)?;

            let updated = store.update_alert(id, update).await?;
            ctx.printer.alert(&updated)?;
        }
        AlertCommand::Resolve { id } => {
            let username = ctx.username()?;
            let existing = store.api().get_alert(id).await?;
            ensure_owner(&existing, &username)?;
            if existing.status == AlertStatus::Resolved {
                ctx.printer
                    .message(&format!("Alert #{} is already resolved", id))?;
                return Ok(());
            }

            store.resolve_alert(id).await?;
            ctx.printer.message(&format!("Alert #{} resolved", id))?;
        }
        AlertCommand::Delete { id } => {
            let username = ctx.username()?;
            let existing = store.api().get_alert(id).await?;
            ensure_owner(&existing, &username)?;

            store.remove_alert(id).await?;
            ctx.printer.message(&format!("Alert #{} deleted", id))?;
        }
    }

    Ok(())
}

async fn list<A: AlertApi>(
    ctx: &mut CommandContext,
    store: &AlertStore<A>,
    args: AlertListArgs,
) -> anyhow::Result<()> {
    store
        .set_filters(FilterChange {
            alert_type: Some(args.alert_type),
            status: Some(args.status),
        })
        .await?;

    for _ in 1..args.pages.max(1) {
        if !store.load_more_alerts().await? {
            break;
        }
    }

    ctx.printer.alert_list(&store.snapshot())?;
    Ok(())
}

async fn create<A: AlertApi>(
    ctx: &mut CommandContext,
    store: &AlertStore<A>,
    args: AlertCreateArgs,
) -> anyhow::Result<()> {
    let username = ctx.username()?;
    let mut new_alert = build_new_alert(
        args.alert_type,
        args.fields,
        &ctx.config.country_code,
        username,
        vec![],
    );
    validate_new_alert(&new_alert).map_err(ApiError::from)?;

    let prepared = if args.photos.is_empty() {
        vec![]
    } else {
        let images = args
            .photos
            .into_iter()
            .map(|path| PendingImage::from_path(path, None))
            .collect();
        ctx.photo_service()?.prepare(images).await
    };
    new_alert.photo_filenames = filenames_for(&prepared);

    let created = store.create_alert(new_alert).await?;
    ctx.printer.alert(&created)?;

    if !prepared.is_empty() {
        upload_created_photos(ctx, &created, prepared).await?;
    }
    Ok(())
}

/// Uses the write slots returned with the created alert when there is one per
/// photo, otherwise asks for fresh slots.
async fn upload_created_photos(
    ctx: &mut CommandContext,
    created: &Alert,
    images: Vec<PreparedImage>,
) -> anyhow::Result<()> {
    let service = ctx.photo_service()?;

    let slots: Vec<UploadSlot> = created
        .photo_urls
        .iter()
        .filter_map(|p| {
            Some(UploadSlot {
                s3_object_key: p.s3_object_key.clone()?,
                presigned_url: p.presigned_url.clone()?,
            })
        })
        .collect();

    let batch = if slots.len() == images.len() {
        service.upload_prepared_to_slots(images, slots).await?
    } else {
        service.upload_prepared(images, Some(created.id)).await?
    };

    ctx.printer.upload_batch(&batch)?;
    if !batch.is_complete() {
        anyhow::bail!("{} photo(s) failed to upload", batch.failed_count());
    }
    Ok(())
}

fn build_new_alert(
    alert_type: AlertType,
    fields: AlertFieldArgs,
    default_country: &str,
    username: String,
    photo_filenames: Vec<String>,
) -> NewAlert {
    NewAlert {
        alert_type,
        status: AlertStatus::Active,
        title: fields.title.unwrap_or_default(),
        pet_name: fields.pet_name,
        breed: fields.breed.unwrap_or_default(),
        color: fields.color,
        sex: fields.sex,
        age: fields.age,
        size: fields.size,
        description: fields.description.unwrap_or_default(),
        location: fields.location,
        postal_code: fields.postal_code,
        country_code: fields
            .country_code
            .or_else(|| Some(default_country.to_string())),
        contact_phone: fields.contact_phone,
        contact_email: fields.contact_email,
        reward: fields.reward,
        chip_number: fields.chip_number,
        date: fields.date,
        username,
        photo_filenames,
    }
}

fn build_update(fields: AlertFieldArgs, clear: &[ClearableField]) -> AlertUpdate {
    let mut update = AlertUpdate::default();
    update.title = fields.title;
    update.pet_name = fields.pet_name.map(Some);
    update.breed = fields.breed;
    update.color = fields.color.map(Some);
    update.sex = fields.sex;
    update.age = fields.age.map(Some);
    update.size = fields.size;
    update.description = fields.description;
    update.location = fields.location;
    update.postal_code = fields.postal_code.map(Some);
    update.country_code = fields.country_code;
    update.contact_phone = fields.contact_phone;
    update.contact_email = fields.contact_email.map(Some);
    update.reward = fields.reward.map(Some);
    update.chip_number = fields.chip_number.map(Some);
    update.date = fields.date;
    for field in clear {
        update.clear(*field);
    }
    update
}
