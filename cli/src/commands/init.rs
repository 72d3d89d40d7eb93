use std::path::Path;

use crate::{app_config::AppConfig, args::InitArgs, formatters::Printer, profile::Profile};

/// Writes a profile file from the resolved configuration and init flags
pub fn init_cmd(
    config: &AppConfig,
    profile_path: &Path,
    args: InitArgs,
    printer: &mut Printer,
) -> anyhow::Result<()> {
    if profile_path.exists() && !args.force {
        anyhow::bail!(
            "Profile '{}' already exists at {}. Use --force to overwrite",
            config.profile_name,
            profile_path.display()
        );
    }

    let profile = Profile {
        api_url: Some(config.api_url.clone()),
        timeout_secs: Some(args.timeout_secs.unwrap_or(config.timeout_secs)),
        page_size: Some(args.page_size.unwrap_or(config.page_size)),
        country_code: Some(
            args.country_code
                .unwrap_or_else(|| config.country_code.clone())
                .to_uppercase(),
        ),
    };
    profile.save(profile_path)?;

    printer.message(&format!(
        "Profile '{}' written to {}",
        config.profile_name,
        profile_path.display()
    ))?;
    Ok(())
}
