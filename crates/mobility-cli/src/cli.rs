use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use mobility_core::VERSION;

/// Mobility - encrypted administration of travellers, scooters and operators
#[derive(Parser)]
#[command(name = "mobility")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, env = "MOBILITY_CONFIG")]
    pub config: Option<String>,

    /// Username to act as
    #[arg(short, long, global = true, env = "MOBILITY_USER")]
    pub user: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_input: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the field key, the store and the config file
    Init(InitArgs),

    /// Check credentials and show pending alerts
    Login,

    /// Change your own password
    Passwd,

    /// Manage operator and administrator accounts
    #[command(subcommand)]
    Users(UserCommand),

    /// Manage traveller records
    #[command(subcommand)]
    Travellers(TravellerCommand),

    /// Manage scooters
    #[command(subcommand)]
    Scooters(ScooterCommand),

    /// Create, list and directly restore backups
    #[command(subcommand)]
    Backups(BackupCommand),

    /// Request, issue and redeem restore codes
    #[command(subcommand)]
    Restore(RestoreCommand),

    /// Read the audit log
    #[command(subcommand)]
    Logs(LogCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Directory for the store and backups
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<String>,

    /// Path of the field key file to create
    #[arg(long, value_name = "PATH")]
    pub key_file: Option<String>,

    /// Username of the built-in super administrator
    #[arg(long, default_value = "super_admin")]
    pub super_username: String,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Shared search flags
#[derive(Args)]
pub struct SearchArgs {
    /// Search text (case-insensitive substring)
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Search a single field instead of the classified field set
    #[arg(long)]
    pub field: Option<String>,

    /// Maximum number of matches
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create an account (password from MOBILITY_NEW_PASSWORD or prompt)
    Add(UserAddArgs),
    /// List accounts
    List,
    /// Show one account
    Show { id: i64 },
    /// Change profile fields or role
    Update(UserUpdateArgs),
    /// Delete an account
    Delete { id: i64 },
    /// Issue a temporary password
    ResetPassword { id: i64 },
    /// Search accounts
    Search(SearchArgs),
}

#[derive(Args)]
pub struct UserAddArgs {
    #[arg(value_name = "USERNAME")]
    pub username: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// operator or administrator
    #[arg(long, default_value = "operator")]
    pub role: String,
}

#[derive(Args)]
pub struct UserUpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
}

#[derive(Subcommand)]
pub enum TravellerCommand {
    /// Register a traveller
    Add(TravellerAddArgs),
    /// List travellers
    List,
    /// Show one traveller
    Show { id: i64 },
    /// Change traveller fields
    Update(TravellerUpdateArgs),
    /// Delete a traveller
    Delete { id: i64 },
    /// Search travellers
    Search(SearchArgs),
}

#[derive(Args)]
pub struct TravellerAddArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub birth_date: String,
    #[arg(long)]
    pub gender: String,
    #[arg(long)]
    pub street_name: String,
    #[arg(long)]
    pub house_number: String,
    #[arg(long)]
    pub zip_code: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub email: String,
    /// Eight digits, or +31-6-DDDDDDDD
    #[arg(long)]
    pub mobile_phone: String,
    #[arg(long)]
    pub license_number: String,
}

#[derive(Args)]
pub struct TravellerUpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub birth_date: Option<String>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub street_name: Option<String>,
    #[arg(long)]
    pub house_number: Option<String>,
    #[arg(long)]
    pub zip_code: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub mobile_phone: Option<String>,
    #[arg(long)]
    pub license_number: Option<String>,
}

#[derive(Subcommand)]
pub enum ScooterCommand {
    /// Put a scooter into service
    Add(ScooterAddArgs),
    /// List scooters
    List,
    /// Show one scooter
    Show { id: i64 },
    /// Change scooter fields
    Update(ScooterUpdateArgs),
    /// Delete a scooter
    Delete { id: i64 },
    /// Search scooters
    Search(SearchArgs),
}

#[derive(Args)]
pub struct ScooterAddArgs {
    #[arg(long)]
    pub brand: String,
    #[arg(long)]
    pub model: String,
    #[arg(long)]
    pub serial_number: String,
    /// km/h
    #[arg(long)]
    pub top_speed: u32,
    /// Wh
    #[arg(long)]
    pub battery_capacity: u32,
    #[arg(long)]
    pub state_of_charge: u8,
    #[arg(long)]
    pub target_soc_min: u8,
    #[arg(long)]
    pub target_soc_max: u8,
    #[arg(long, allow_negative_numbers = true)]
    pub latitude: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub longitude: f64,
    #[arg(long)]
    pub out_of_service: bool,
    /// km
    #[arg(long, default_value_t = 0.0)]
    pub mileage: f64,
    /// YYYY-MM-DD
    #[arg(long)]
    pub last_maintenance: Option<String>,
}

#[derive(Args)]
pub struct ScooterUpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub serial_number: Option<String>,
    #[arg(long)]
    pub top_speed: Option<u32>,
    #[arg(long)]
    pub battery_capacity: Option<u32>,
    #[arg(long)]
    pub state_of_charge: Option<u8>,
    #[arg(long)]
    pub target_soc_min: Option<u8>,
    #[arg(long)]
    pub target_soc_max: Option<u8>,
    #[arg(long, allow_negative_numbers = true)]
    pub latitude: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub longitude: Option<f64>,
    #[arg(long)]
    pub out_of_service: Option<bool>,
    #[arg(long)]
    pub mileage: Option<f64>,
    #[arg(long)]
    pub last_maintenance: Option<String>,
}

#[derive(Subcommand)]
pub enum BackupCommand {
    /// Write an encrypted backup of the store
    Create,
    /// List backups, oldest first
    List,
    /// Restore a backup directly (super administrator)
    Restore {
        #[arg(value_name = "BACKUP_ID")]
        backup_id: i64,
    },
}

#[derive(Subcommand)]
pub enum RestoreCommand {
    /// Ask for a restore code for a backup
    Request {
        #[arg(value_name = "BACKUP_ID")]
        backup_id: i64,
    },
    /// Show your own restore requests
    Mine,
    /// Withdraw one of your restore requests
    Cancel { id: i64 },
    /// Show requests awaiting a code (super administrator)
    Pending,
    /// Mint a restore code for a request (super administrator)
    Issue { id: i64 },
    /// Revoke a request or its code (super administrator)
    Revoke { id: i64 },
    /// Redeem a restore code and restore its backup
    Redeem {
        #[arg(value_name = "CODE")]
        code: String,
    },
}

#[derive(Subcommand)]
pub enum LogCommand {
    /// Show the audit log, newest first, and mark it seen
    List,
    /// Count suspicious entries not yet seen
    Alerts,
}
