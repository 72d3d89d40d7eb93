use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use petsignal_core::{
    AlertId, AlertStatus, AlertType, ClearableField, PetSex, PetSize, PhotoId, PhotoKey,
};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(
    name = "petsignal",
    version,
    about,
    long_about = "Command line client for PetSignal lost and seen pet alerts"
)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Args, Serialize)]
pub struct ConfigArgs {
    /// Name of the profile to use
    #[arg(long, short, env = "PETSIGNAL_PROFILE", global = true)]
    pub profile_path: Option<String>,

    /// Base URL of the PetSignal API, overrides the profile
    #[arg(long, env = "PETSIGNAL_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format (pretty, plain, or json)
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Plain,
    Json,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// Prints out current configuration
    Config,
    /// Initializes a new profile
    Init(InitArgs),
    /// Manage profiles
    Profile {
        #[clap(subcommand)]
        command: Option<ProfileCommand>,
    },
    /// Validates credentials and stores them for the profile
    Login(LoginArgs),
    /// Forgets stored credentials
    Logout,
    /// Shows the logged in user
    Whoami,
    /// Re-validates stored credentials, clearing them when rejected
    Session,
    /// Creates a new account
    Register(RegisterArgs),
    /// Password reset
    #[clap(subcommand)]
    Password(PasswordCommand),
    /// Lost and seen pet alerts
    #[clap(subcommand)]
    Alert(AlertCommand),
    /// Photos attached to an alert
    #[clap(subcommand)]
    Photo(PhotoCommand),
    /// Comments on an alert
    #[clap(subcommand)]
    Comment(CommentCommand),
}

#[derive(Debug, Args, PartialEq)]
pub struct InitArgs {
    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Alerts per page
    #[arg(long)]
    pub page_size: Option<u32>,
    /// Default country code for new alerts
    #[arg(long)]
    pub country_code: Option<String>,
    /// Overwrite an existing profile
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum ProfileCommand {
    /// Switches to a profile, creating it when missing
    Use { name: String },
    /// Lists profiles
    List,
    /// Shows the active profile
    Current,
}

#[derive(Debug, Args, PartialEq)]
pub struct LoginArgs {
    pub username: String,
    #[arg(long, env = "PETSIGNAL_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args, PartialEq)]
pub struct RegisterArgs {
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "PETSIGNAL_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub phone: Option<String>,
    /// Address for alert notifications, defaults to --email
    #[arg(long)]
    pub subscription_email: Option<String>,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum PasswordCommand {
    /// Requests a reset token by email
    Forgot { email: String },
    /// Checks that a reset token is still valid
    Verify { token: String },
    /// Sets a new password using a reset token
    Reset {
        token: String,
        #[arg(long, env = "PETSIGNAL_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum AlertCommand {
    /// Lists alerts
    List(AlertListArgs),
    /// Shows a single alert
    Show { id: AlertId },
    /// Creates an alert
    Create(AlertCreateArgs),
    /// Updates descriptive fields of an alert you own
    Update {
        id: AlertId,
        #[command(flatten)]
        fields: AlertFieldArgs,
        /// Empties an optional field: pet-name, color, age, postal-code,
        /// email, reward or chip. Wins over a value given for the same field.
        #[arg(long, value_name = "FIELD")]
        clear: Vec<ClearableField>,
    },
    /// Marks an alert you own as resolved
    Resolve { id: AlertId },
    /// Deletes an alert you own
    Delete { id: AlertId },
}

#[derive(Debug, Args, PartialEq)]
pub struct AlertListArgs {
    /// Only LOST or SEEN alerts
    #[arg(long = "type")]
    pub alert_type: Option<AlertType>,
    /// ACTIVE or RESOLVED
    #[arg(long, default_value = "ACTIVE")]
    pub status: AlertStatus,
    /// Number of pages to fetch
    #[arg(long, default_value_t = 1)]
    pub pages: u32,
}

#[derive(Debug, Args, PartialEq)]
pub struct AlertCreateArgs {
    #[arg(long = "type", default_value = "LOST")]
    pub alert_type: AlertType,
    #[command(flatten)]
    pub fields: AlertFieldArgs,
    /// Photo to attach, may be repeated
    #[arg(long = "photo", value_name = "PATH")]
    pub photos: Vec<PathBuf>,
}

/// Descriptive alert fields shared by create and update
#[derive(Debug, Args, PartialEq, Default)]
pub struct AlertFieldArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub pet_name: Option<String>,
    #[arg(long)]
    pub breed: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub sex: Option<PetSex>,
    #[arg(long)]
    pub age: Option<u32>,
    #[arg(long)]
    pub size: Option<PetSize>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub postal_code: Option<String>,
    #[arg(long)]
    pub country_code: Option<String>,
    #[arg(long = "phone")]
    pub contact_phone: Option<String>,
    #[arg(long = "email")]
    pub contact_email: Option<String>,
    #[arg(long)]
    pub reward: Option<f64>,
    #[arg(long = "chip")]
    pub chip_number: Option<String>,
    /// Date of the loss or sighting (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum PhotoCommand {
    /// Uploads photos to an alert you own
    Upload {
        alert_id: AlertId,
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
        /// Description for each photo, in order
        #[arg(long)]
        description: Vec<String>,
    },
    /// Lists photos of an alert
    List { alert_id: AlertId },
    /// Deletes a photo by id or object key
    Delete { alert_id: AlertId, key: PhotoKey },
    /// Changes the description of a photo
    Describe {
        photo_id: PhotoId,
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum CommentCommand {
    /// Lists comments on an alert
    List { alert_id: AlertId },
    /// Adds a comment to an alert
    Add {
        alert_id: AlertId,
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
}
