//! Config command handlers.

use serde::Serialize;
use tabled::Tabled;

use tabloctl_config::{Config, config_path, load_config_or_default, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ProfileSummary {
    name: String,
    email: Option<String>,
    device: Option<String>,
    server_id: Option<String>,
    default: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Recorder")]
    device: String,
    #[tabled(rename = "Default")]
    default: String,
}

impl From<&ProfileSummary> for ProfileRow {
    fn from(s: &ProfileSummary) -> Self {
        Self {
            name: s.name.clone(),
            email: s.email.clone().unwrap_or_default(),
            device: s
                .device
                .clone()
                .or_else(|| s.server_id.clone())
                .unwrap_or_default(),
            default: if s.default { "*".into() } else { String::new() },
        }
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let mut cfg = load_config_or_default();
            // Never echo stored passwords back.
            for profile in cfg.profiles.values_mut() {
                if profile.password.is_some() {
                    profile.password = Some("<redacted>".into());
                }
            }
            let out = output::render_single(
                &global.output,
                &cfg,
                describe_config,
                |c| c.default_profile.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = load_config_or_default();
            let summaries = profile_summaries(&cfg);
            let out = output::render_list(
                &global.output,
                &summaries,
                |s| ProfileRow::from(s),
                |s| s.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound { name });
            }
            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Default profile set to '{name}'");
            }
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let cfg = load_config_or_default();
            let name = profile
                .or_else(|| global.profile.clone())
                .or_else(|| cfg.default_profile.clone())
                .unwrap_or_else(|| "default".into());
            let password = rpassword::prompt_password(format!("Password for profile '{name}': "))?;
            tabloctl_config::store_password(&name, &password)?;
            if !global.quiet {
                eprintln!("Password stored in keyring for '{name}'");
            }
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config_path().display());
            Ok(())
        }
    }
}

fn profile_summaries(cfg: &Config) -> Vec<ProfileSummary> {
    let mut summaries: Vec<ProfileSummary> = cfg
        .profiles
        .iter()
        .map(|(name, profile)| ProfileSummary {
            name: name.clone(),
            email: profile.email.clone(),
            device: profile.device_name.clone(),
            server_id: profile.server_id.clone(),
            default: cfg.default_profile.as_deref() == Some(name),
        })
        .collect();
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}

fn describe_config(cfg: &Config) -> String {
    let mut lines = vec![
        format!("Config file:     {}", config_path().display()),
        format!(
            "Default profile: {}",
            cfg.default_profile.as_deref().unwrap_or("(none)")
        ),
    ];
    if cfg.profiles.is_empty() {
        lines.push("Profiles:        (none — run `tabloctl login <email>`)".into());
    } else {
        let mut names: Vec<&String> = cfg.profiles.keys().collect();
        names.sort();
        lines.push(format!(
            "Profiles:        {}",
            names
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    lines.join("\n")
}
