//! CLI probe for `perfreview_core`.
//!
//! # Responsibility
//! - Verify core crate linkage with deterministic output.
//! - Open a configured store and report what it holds.
//! - Print the effective allow-list and evaluate the access gate for one
//!   email address.

use clap::Parser;
use log::info;
use perfreview_core::repo::employee_repo::EmployeeRepository;
use perfreview_core::repo::profile_repo::{ProfileOrder, ProfileRepository};
use perfreview_core::{
    open_store, AccessDecision, AccessPolicy, AppConfig, Identity, SqliteReviewRepository,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "perfreview")]
#[command(about = "Performance review core probe")]
#[command(version)]
struct Args {
    /// JSON configuration file; opens the store and prints record counts
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Email address to check against the allow-list
    #[arg(long, value_name = "EMAIL")]
    check_access: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    println!("perfreview_core ping={}", perfreview_core::ping());
    println!("perfreview_core version={}", perfreview_core::core_version());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => Some(AppConfig::from_file(path)?),
        None => None,
    };

    if let Some(config) = &config {
        perfreview_core::init_from_config(config)?;
        let conn = open_store(&config.store)?;
        let repo = SqliteReviewRepository::try_new(&conn)?;
        let profiles = repo.list_profiles(ProfileOrder::CreatedDesc)?.len();
        let employees = repo.list_employees()?.len();
        info!("event=cli_store_summary module=cli status=ok profiles={profiles} employees={employees}");
        println!("store profiles={profiles} employees={employees}");
    }

    if let Some(email) = &args.check_access {
        let policy = match &config {
            Some(config) => AccessPolicy::new(config.allowed_emails.iter()),
            None => AccessPolicy::default(),
        };
        println!("{}", allow_list_line(&policy));
        let identity = Identity::with_email(email.as_str());
        match policy.evaluate(Some(&identity)) {
            AccessDecision::Allowed => println!("access=allowed email={email}"),
            AccessDecision::Denied { message } => println!("access=denied message={message}"),
            AccessDecision::SignedOut => println!("access=signed_out"),
        }
    }

    Ok(())
}

/// Effective allow-list as one `access allowed=` line.
fn allow_list_line(policy: &AccessPolicy) -> String {
    let emails: Vec<&str> = policy.allowed_emails().collect();
    format!("access allowed={}", emails.join(","))
}

#[cfg(test)]
mod tests {
    use super::allow_list_line;
    use perfreview_core::AccessPolicy;

    #[test]
    fn allow_list_line_lists_normalized_emails_in_order() {
        let policy = AccessPolicy::new(["Zed@Example.com", " ana@example.com "]);
        assert_eq!(
            allow_list_line(&policy),
            "access allowed=ana@example.com,zed@example.com"
        );
    }

    #[test]
    fn default_allow_list_is_not_empty() {
        assert_ne!(allow_list_line(&AccessPolicy::default()), "access allowed=");
    }
}
