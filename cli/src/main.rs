#![deny(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::process::ExitCode;

use app_config::AppConfig;
use args::{CliArgs, Command};
use clap::{CommandFactory, Parser};
use commands::{
    account, alert::alert_cmd, comment::comment_cmd, config::config_cmd, init::init_cmd,
    photo::photo_cmd, profile::profile_cmd, CommandContext,
};
use formatters::Printer;
use petsignal_core::{ApiError, UploadError};
use profile::{validate_profile_name, Profile, ProfileDirs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app_config;
mod args;
mod commands;
mod credentials;
mod formatters;
mod profile;
mod web_client;

#[cfg(test)]
mod test;

#[tokio::main]
async fn main() -> ExitCode {
    setup_env();
    setup_tracing();

    let args = CliArgs::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", describe_error(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> anyhow::Result<()> {
    let Some(command) = args.command else {
        CliArgs::command().print_help()?;
        return Ok(());
    };

    let dirs = ProfileDirs::locate();
    let profile_name = dirs.resolve(args.config.profile_path.as_deref());
    validate_profile_name(&profile_name)?;
    let profile_path = dirs.settings_path(&profile_name);
    let profile = Profile::load(&profile_path)?;
    let config = AppConfig::from_args(&args.config, &dirs, &profile_name, profile.as_ref());
    let mut printer = Printer::new(args.config.output);

    match command {
        Command::Config => config_cmd(&config)?,
        Command::Init(init) => init_cmd(&config, &profile_path, init, &mut printer)?,
        Command::Profile { command } => profile_cmd(&dirs, command, &mut printer)?,
        command => {
            let ctx = CommandContext::load(config, printer)?;
            match command {
                Command::Login(login) => account::login_cmd(ctx, login).await?,
                Command::Logout => account::logout_cmd(ctx)?,
                Command::Whoami => account::whoami_cmd(ctx)?,
                Command::Session => account::session_cmd(ctx).await?,
                Command::Register(register) => account::register_cmd(ctx, register).await?,
                Command::Password(password) => account::password_cmd(ctx, password).await?,
                Command::Alert(alert) => alert_cmd(ctx, alert).await?,
                Command::Photo(photo) => photo_cmd(ctx, photo).await?,
                Command::Comment(comment) => comment_cmd(ctx, comment).await?,
                Command::Config | Command::Init(_) | Command::Profile { .. } => {}
            }
        }
    }

    Ok(())
}

/// API failures are shown with their user-facing message
fn describe_error(error: &anyhow::Error) -> String {
    if let Some(api) = error.downcast_ref::<ApiError>() {
        return api.user_message();
    }
    if let Some(UploadError::Slots(api)) = error.downcast_ref::<UploadError>() {
        return format!("Could not start the upload: {}", api.user_message());
    }
    format!("{:#}", error)
}

fn setup_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{crate_name}=warn,petsignal_core=warn",
                    crate_name = env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn setup_env() {
    dotenvy::dotenv().ok();
}
