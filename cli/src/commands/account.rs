use petsignal_core::{ApiError, NewUser, User};
use tracing::info;

use crate::{
    args::{LoginArgs, PasswordCommand, RegisterArgs},
    commands::CommandContext,
    credentials::{Credentials, Session},
    web_client::RestClient,
};

fn bare_user(username: &str) -> User {
    User {
        id: None,
        username: username.to_string(),
        email: None,
        phone_number: None,
        role: None,
        created_at: None,
    }
}

/// Validates the credentials against the API, then stores them.
///
/// A user record kept from registration is reused when it belongs to the
/// same username.
pub async fn login_cmd(mut ctx: CommandContext, args: LoginArgs) -> anyhow::Result<()> {
    let credentials = Credentials {
        username: args.username.trim().to_string(),
        password: args.password,
    };
    let client = RestClient::new(
        &ctx.config.api_url,
        ctx.config.timeout(),
        Some(credentials.clone()),
    )?;

    client.validate_credentials().await?;

    let user = ctx
        .session
        .user
        .take()
        .filter(|u| u.username == credentials.username)
        .unwrap_or_else(|| bare_user(&credentials.username));

    let session = Session {
        credentials: Some(credentials),
        user: Some(user),
    };
    session.save(ctx.config.credentials_path())?;
    info!(profile = %ctx.config.profile_name, "Credentials stored");

    ctx.printer
        .message(&format!("Logged in as {}", session.username().unwrap_or("")))?;
    Ok(())
}

pub fn logout_cmd(mut ctx: CommandContext) -> anyhow::Result<()> {
    Session::clear(ctx.config.credentials_path())?;
    ctx.printer.message("Logged out")?;
    Ok(())
}

pub fn whoami_cmd(mut ctx: CommandContext) -> anyhow::Result<()> {
    let username = ctx.username()?;
    let user = ctx.session.user.clone().unwrap_or_else(|| bare_user(&username));
    ctx.printer.user(&user)?;
    Ok(())
}

/// Re-checks stored credentials. This is the only place a rejected login is
/// cleared automatically.
pub async fn session_cmd(mut ctx: CommandContext) -> anyhow::Result<()> {
    let username = ctx.username()?;

    match ctx.client()?.validate_credentials().await {
        Ok(()) => {
            ctx.printer
                .message(&format!("Session valid for {}", username))?;
            Ok(())
        }
        Err(ApiError::Unauthorized) => {
            Session::clear(ctx.config.credentials_path())?;
            anyhow::bail!("Stored credentials for {} were rejected, logged out", username)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn register_cmd(mut ctx: CommandContext, args: RegisterArgs) -> anyhow::Result<()> {
    let new_user = NewUser {
        username: args.username.trim().to_string(),
        email: args.email.trim().to_string(),
        password: args.password,
        phone_number: args.phone,
        subscription_email: args
            .subscription_email
            .or_else(|| Some(args.email.trim().to_string())),
    };

    let client = RestClient::new(&ctx.config.api_url, ctx.config.timeout(), None)?;
    let created = client.register(&new_user).await?;

    let user = User {
        id: created.id,
        username: new_user.username.clone(),
        email: created.email.or(Some(new_user.email)),
        phone_number: created.phone_number.or(new_user.phone_number),
        role: created.role.or_else(|| Some("USER".to_string())),
        created_at: created.created_at,
    };

    // Keep an existing login of another user untouched
    if !ctx.session.is_logged_in() {
        let session = Session {
            credentials: None,
            user: Some(user.clone()),
        };
        session.save(ctx.config.credentials_path())?;
    }

    ctx.printer.message(&format!(
        "Registered {}. Run `petsignal login {}` to sign in",
        user.username, user.username
    ))?;
    Ok(())
}

pub async fn password_cmd(mut ctx: CommandContext, command: PasswordCommand) -> anyhow::Result<()> {
    let client = RestClient::new(&ctx.config.api_url, ctx.config.timeout(), None)?;

    match command {
        PasswordCommand::Forgot { email } => {
            client.forgot_password(&email).await?;
            ctx.printer
                .message("If the address is registered, a reset link is on its way")?;
        }
        PasswordCommand::Verify { token } => {
            client.verify_reset_token(&token).await?;
            ctx.printer.message("Reset token is valid")?;
        }
        PasswordCommand::Reset {
            token,
            new_password,
        } => {
            client.reset_password(&token, &new_password).await?;
            ctx.printer.message("Password changed")?;
        }
    }
    Ok(())
}
