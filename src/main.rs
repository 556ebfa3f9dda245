use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use lumo_accounts::infrastructure::logging::init_logging;
use lumo_accounts::infrastructure::AppConfig;
use lumo_accounts::{AccountService, Credentials, JwtTokenIssuer, NewAccount, NewMember, PgStore};

#[derive(Parser)]
#[command(name = "lumo-accounts")]
#[command(about = "Lumo account management", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Create an account and its member
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        /// Department number, repeatable
        #[arg(long = "department")]
        departments: Vec<i32>,
        /// Profession id, repeatable
        #[arg(long = "profession")]
        professions: Vec<i64>,
    },
    /// Check credentials and print the issued token as JSON
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let _guard = init_logging(Some(config.logging.clone()))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let store = Arc::new(
        PgStore::connect(&config.database_url, config.database_pool_size)
            .await
            .context("failed to connect to database")?,
    );

    if let Commands::Migrate = cli.command {
        store.migrate().await?;
        return Ok(());
    }

    let service = AccountService::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(JwtTokenIssuer::new(config.token.clone())),
    );

    match cli.command {
        Commands::Migrate => {}
        Commands::Create {
            email,
            password,
            first_name,
            departments,
            professions,
        } => {
            let account = service
                .create_account(Some(NewAccount {
                    email: Some(email),
                    password: Some(password),
                    created_at: None,
                    member: Some(NewMember {
                        id: None,
                        first_name,
                        department_numbers: departments,
                        profession_ids: professions,
                    }),
                }))
                .await?;
            info!("Account {} created", account.email);
            println!("{}", account.member.id);
        }
        Commands::Login { email, password } => {
            let token = service.login(&Credentials { email, password }).await?;
            println!("{}", serde_json::to_string_pretty(&token)?);
        }
    }

    Ok(())
}
