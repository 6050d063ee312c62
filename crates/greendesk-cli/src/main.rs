mod display;
mod quota;
mod report;

use anyhow::Context;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use greendesk_client::config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use greendesk_client::resources::{
    BillingQuery, EstablishmentInput, EstablishmentQuery, QuotaQuery,
};
use greendesk_client::{ApiClient, ClientConfig, Level, Notifier};
use greendesk_core::{Law, Month, Quarter, ViewMode};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use crate::quota::{SetRequest, TargetArg};

#[derive(Parser)]
#[command(name = "greendesk", version, about = "Environmental compliance admin console")]
struct Cli {
    /// Backend base URL.
    #[arg(long, global = true, env = "GREENDESK_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Bearer token for the backend.
    #[arg(long, global = true, env = "GREENDESK_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = "GREENDESK_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspection quotas.
    Quota {
        #[command(subcommand)]
        command: QuotaCommand,
    },
    /// Establishment registry.
    Establishments {
        #[command(subcommand)]
        command: EstablishmentCommand,
    },
    /// Billing records.
    Billing {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        quarter: Option<Quarter>,
        #[arg(long)]
        month: Option<Month>,
        #[arg(long)]
        law: Option<Law>,
        #[arg(long, default_value = "monthly")]
        view: ViewMode,
    },
    /// Audit log.
    Audit {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    /// Compliance report: accomplishments against quota targets.
    Report {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, default_value = "monthly")]
        view: ViewMode,
    },
    /// Database backups.
    Backup {
        #[command(subcommand)]
        command: BackupCommand,
    },
    /// System configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum QuotaCommand {
    /// Which quarters and months are past, set, or still open.
    Status {
        #[arg(long)]
        year: Option<i32>,
        /// Show only this quarter.
        #[arg(long)]
        quarter: Option<Quarter>,
    },
    /// List quota records.
    List {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<Month>,
        #[arg(long)]
        quarter: Option<Quarter>,
        #[arg(long)]
        law: Option<Law>,
    },
    /// Set quota targets for months of one quarter.
    Set {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        quarter: Quarter,
        /// Month to include (repeatable).
        #[arg(long = "month", required = true)]
        months: Vec<Month>,
        /// Law to include (repeatable).
        #[arg(long = "law")]
        laws: Vec<Law>,
        /// Include all five laws.
        #[arg(long, conflicts_with = "laws")]
        all_laws: bool,
        /// Target as MONTH:LAW=N (repeatable).
        #[arg(long = "target")]
        targets: Vec<TargetArg>,
        /// Show the plan without saving.
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum EstablishmentCommand {
    /// List establishments.
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        law: Option<Law>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    /// Show one establishment.
    Show { id: u64 },
    /// Register an establishment.
    Add {
        name: String,
        #[arg(long)]
        proponent: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        municipality: Option<String>,
        #[arg(long = "law")]
        laws: Vec<Law>,
    },
}

#[derive(Subcommand)]
enum BackupCommand {
    /// List backups.
    List,
    /// Trigger a new backup.
    Create,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show all settings.
    Show,
    /// Set one setting. VALUE is parsed as JSON, falling back to a string.
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("greendesk v{}", env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::new(cli.api_url)
        .with_token(cli.api_token)
        .with_timeout_secs(cli.timeout_secs);
    let client = ApiClient::new(config).context("building API client")?;

    let notifier = Notifier::default();
    let printer = tokio::spawn(print_notifications(notifier.subscribe()));

    let result = run(cli.command, &client, &notifier).await;

    // Closing the bus lets the printer drain and exit.
    drop(notifier);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "notification printer failed");
    }
    result
}

async fn print_notifications(mut rx: tokio::sync::broadcast::Receiver<greendesk_client::Notification>) {
    loop {
        match rx.recv().await {
            Ok(note) => {
                let tag = match note.level {
                    Level::Info => "info",
                    Level::Success => "ok",
                    Level::Warning => "warn",
                    Level::Error => "error",
                };
                eprintln!("[{tag}] {}", note.message);
            }
            Err(RecvError::Lagged(n)) => eprintln!("[warn] {n} notification(s) dropped"),
            Err(RecvError::Closed) => break,
        }
    }
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

async fn run(command: Command, client: &ApiClient, notifier: &Notifier) -> anyhow::Result<()> {
    match command {
        Command::Quota { command } => match command {
            QuotaCommand::Status { year, quarter } => {
                let year = year.unwrap_or_else(current_year);
                quota::run_status(client, notifier, year, quarter).await
            }
            QuotaCommand::List {
                year,
                month,
                quarter,
                law,
            } => {
                let query = QuotaQuery {
                    year: year.or_else(|| Some(current_year())),
                    month,
                    quarter,
                    law,
                };
                quota::run_list(client, notifier, query).await
            }
            QuotaCommand::Set {
                year,
                quarter,
                months,
                laws,
                all_laws,
                targets,
                dry_run,
            } => {
                let laws = if all_laws { Law::ALL.to_vec() } else { laws };
                let req = SetRequest {
                    year: year.unwrap_or_else(current_year),
                    quarter,
                    months,
                    laws,
                    targets,
                    dry_run,
                };
                quota::run_set(client, notifier, req).await
            }
        },

        Command::Establishments { command } => match command {
            EstablishmentCommand::List {
                search,
                law,
                page,
                page_size,
            } => {
                let query = EstablishmentQuery {
                    search,
                    law,
                    page: Some(page),
                    page_size: Some(page_size),
                };
                let page = client
                    .list_establishments(&query)
                    .await
                    .inspect_err(|e| {
                        notifier.error(format!("Could not load establishments: {e}"));
                    })?;
                display::print_establishments(&page);
                Ok(())
            }
            EstablishmentCommand::Show { id } => {
                let est = client.get_establishment(id).await.inspect_err(|e| {
                    notifier.error(format!("Could not load establishment #{id}: {e}"));
                })?;
                display::print_establishment_card(&est);
                Ok(())
            }
            EstablishmentCommand::Add {
                name,
                proponent,
                address,
                municipality,
                laws,
            } => {
                let input = EstablishmentInput {
                    name,
                    proponent,
                    address,
                    municipality,
                    laws,
                };
                let est = client.create_establishment(&input).await.inspect_err(|e| {
                    notifier.error(format!("Could not register establishment: {e}"));
                })?;
                notifier.success(format!("Registered {} (#{})", est.name, est.id));
                display::print_establishment_card(&est);
                Ok(())
            }
        },

        Command::Billing {
            year,
            quarter,
            month,
            law,
            view,
        } => {
            let query = BillingQuery {
                year: year.or_else(|| Some(current_year())),
                quarter,
                month,
                law,
                view_mode: Some(view),
            };
            let rows = client.list_billing(&query).await.inspect_err(|e| {
                notifier.error(format!("Could not load billing: {e}"));
            })?;
            display::print_billing(&rows);
            Ok(())
        }

        Command::Audit { page, page_size } => {
            let page = client
                .list_audit_logs(page, page_size)
                .await
                .inspect_err(|e| {
                    notifier.error(format!("Could not load audit log: {e}"));
                })?;
            display::print_audit(&page);
            Ok(())
        }

        Command::Report { year, view } => {
            report::run(client, notifier, year.unwrap_or_else(current_year), view).await
        }

        Command::Backup { command } => match command {
            BackupCommand::List => {
                let backups = client.list_backups().await.inspect_err(|e| {
                    notifier.error(format!("Could not list backups: {e}"));
                })?;
                display::print_backups(&backups);
                Ok(())
            }
            BackupCommand::Create => {
                let backup = client.create_backup().await.inspect_err(|e| {
                    notifier.error(format!("Backup failed: {e}"));
                })?;
                notifier.success(format!("Backup created: {}", backup.file_name));
                Ok(())
            }
        },

        Command::Config { command } => match command {
            ConfigCommand::Show => {
                let config = client.get_system_config().await.inspect_err(|e| {
                    notifier.error(format!("Could not load configuration: {e}"));
                })?;
                display::print_config(&config);
                Ok(())
            }
            ConfigCommand::Set { key, value } => {
                let mut config = client.get_system_config().await.inspect_err(|e| {
                    notifier.error(format!("Could not load configuration: {e}"));
                })?;
                let parsed = serde_json::from_str(&value)
                    .unwrap_or(serde_json::Value::String(value));
                config.insert(key.clone(), parsed);
                let saved = client.update_system_config(&config).await.inspect_err(|e| {
                    notifier.error(format!("Could not save configuration: {e}"));
                })?;
                notifier.success(format!("Saved {key}"));
                display::print_config(&saved);
                Ok(())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn quota_status_takes_quarter() {
        let cli = Cli::try_parse_from(["greendesk", "quota", "status", "--year", "2025", "--quarter", "Q2"])
            .unwrap();
        match cli.command {
            Command::Quota {
                command: QuotaCommand::Status { year, quarter },
            } => {
                assert_eq!(year, Some(2025));
                assert_eq!(quarter, Some(Quarter::Q2));
            }
            _ => panic!("expected quota status"),
        }
    }

    #[test]
    fn quota_set_rejects_misspelt_month() {
        let res = Cli::try_parse_from([
            "greendesk", "quota", "set", "--quarter", "2", "--month", "junk", "--all-laws",
        ]);
        assert!(res.is_err());
    }
}
