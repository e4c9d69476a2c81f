//! Folio command-line front end.
//!
//! Generates balance sheet snapshots and drives their lifecycle against the
//! configured database. Every command prints JSON on success.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_core::statement::{
    AuditAction, BaselineKind, GenerateStatementInput, PeriodType, StatementPatch,
    StatementStatus,
};
use folio_core::{StatementError, StatementService};
use folio_db::PgRepository;
use folio_shared::types::{StatementId, TenantId, UserId};
use folio_shared::{AppConfig, AppError};

#[derive(Parser)]
#[command(name = "folio", about = "Balance sheet snapshots over a tenant's ledger")]
struct Cli {
    /// Tenant to operate on.
    #[arg(long, global = true)]
    tenant: Option<TenantId>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Period {
    Monthly,
    Quarterly,
    Yearly,
}

impl From<Period> for PeriodType {
    fn from(period: Period) -> Self {
        match period {
            Period::Monthly => Self::Monthly,
            Period::Quarterly => Self::Quarterly,
            Period::Yearly => Self::Yearly,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Status {
    Review,
    Approved,
    Final,
}

impl From<Status> for StatementStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Review => Self::Review,
            Status::Approved => Self::Approved,
            Status::Final => Self::Final,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Baseline {
    Previous,
    YearAgo,
}

impl From<Baseline> for BaselineKind {
    fn from(baseline: Baseline) -> Self {
        match baseline {
            Baseline::Previous => Self::Previous,
            Baseline::YearAgo => Self::YearAgo,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Generate a draft snapshot as of a date.
    Generate {
        /// `YYYY-MM-DD` or RFC 3339 timestamp.
        #[arg(long)]
        as_of: String,
        #[arg(long, value_enum, default_value = "monthly")]
        period: Period,
        /// Requesting user.
        #[arg(long)]
        user: UserId,
    },
    /// Print a stored snapshot.
    Show {
        #[arg(long)]
        id: StatementId,
    },
    /// Advance a snapshot to the next status.
    Transition {
        #[arg(long)]
        id: StatementId,
        #[arg(long, value_enum)]
        to: Status,
        #[arg(long)]
        user: UserId,
    },
    /// Replace the notes of a draft snapshot.
    Annotate {
        #[arg(long)]
        id: StatementId,
        /// New notes; an empty string clears them.
        #[arg(long)]
        notes: String,
        #[arg(long)]
        user: UserId,
    },
    /// Record that a snapshot was exported.
    Export {
        #[arg(long)]
        id: StatementId,
        #[arg(long)]
        user: UserId,
        /// Destination shown in the audit trail.
        #[arg(long, default_value = "stdout")]
        target: String,
    },
    /// Delete a draft snapshot.
    Delete {
        #[arg(long)]
        id: StatementId,
    },
    /// Compare a snapshot against its baseline.
    Compare {
        #[arg(long)]
        id: StatementId,
        #[arg(long, value_enum, default_value = "previous")]
        baseline: Baseline,
    },
    /// Point-in-time balance of one account.
    Balance {
        #[arg(long)]
        code: String,
        #[arg(long)]
        as_of: String,
    },
    /// Income summary for the period containing a date.
    Income {
        #[arg(long)]
        as_of: String,
        #[arg(long, value_enum, default_value = "monthly")]
        period: Period,
    },
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "folio=info,folio_core=info,folio_db=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(
    service: &StatementService<PgRepository>,
    tenant: Option<TenantId>,
    command: Command,
) -> anyhow::Result<()> {
    let tenant_id = tenant.ok_or(StatementError::MissingTenant)?;
    match command {
        Command::Generate {
            as_of,
            period,
            user,
        } => {
            let snapshot = service
                .generate(GenerateStatementInput {
                    tenant_id,
                    as_of,
                    period_type: period.into(),
                    requested_by: user,
                })
                .await?;
            print_json(&snapshot)
        }
        Command::Show { id } => print_json(&service.get_by_id(tenant_id, id).await?),
        Command::Transition { id, to, user } => {
            print_json(&service.update_status(tenant_id, id, to.into(), user).await?)
        }
        Command::Annotate { id, notes, user } => {
            let patch = StatementPatch {
                notes: Some(notes),
                ..StatementPatch::default()
            };
            print_json(&service.update_draft(tenant_id, id, patch, user).await?)
        }
        Command::Export { id, user, target } => {
            let details = format!("Exported to {target}");
            let snapshot = service
                .append_audit(tenant_id, id, AuditAction::Exported, user, &details, None)
                .await?;
            print_json(&snapshot)
        }
        Command::Delete { id } => {
            service.delete(tenant_id, id).await?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        Command::Compare { id, baseline } => {
            print_json(&service.compare(tenant_id, id, baseline.into()).await?)
        }
        Command::Balance { code, as_of } => {
            let balance = service.account_balance(tenant_id, &code, &as_of).await?;
            print_json(&serde_json::json!({ "account_code": code, "as_of": as_of, "balance": balance }))
        }
        Command::Income { as_of, period } => {
            print_json(&service.income_summary(tenant_id, &as_of, period.into()).await?)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = AppConfig::load()?;

    let db = folio_db::connect_with(&config.database).await?;
    info!("Connected to database");

    let repo = Arc::new(PgRepository::new(db));
    let service = StatementService::new(repo, config.statements.clone());

    match run(&service, cli.tenant, cli.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast::<StatementError>() {
            Ok(statement_err) => {
                let app = AppError::from(statement_err);
                eprintln!("{}: {app}", app.error_code());
                Ok(ExitCode::FAILURE)
            }
            Err(other) => Err(other),
        },
    }
}
