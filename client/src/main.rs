//! `chakula` command-line client.
//!
//! Renders and exports CPS identifier patterns offline, and signs in to the
//! Chakula Poa backend through the authenticated request pipeline.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::BufRead;
use std::sync::Arc;

use camino::Utf8PathBuf;
use chakula_client::config::ClientSettings;
use chakula_client::domain::{
    ApiResult, AuthApi, IdentifierCard, LoginCredentials, RequestPipeline, ShareOutcome, User,
};
use chakula_client::domain::ports::UnsupportedShareTarget;
use chakula_client::outbound::http::ReqwestTransport;
use chakula_client::outbound::storage::FileCredentialStore;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use cps_pattern::DEFAULT_SIZE;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

/// Environment variable holding the login password.
const PASSWORD_ENV: &str = "CHAKULA_PASSWORD";

type ClientApi = AuthApi<FileCredentialStore, ReqwestTransport>;

/// `chakula` command arguments.
#[derive(Debug, Parser)]
#[command(name = "chakula", about = "Chakula Poa command-line client", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render, export or share a CPS identifier pattern.
    #[command(subcommand)]
    Qr(QrCommand),
    /// Sign in and store the session tokens.
    ///
    /// The password is read from `CHAKULA_PASSWORD` unless `--password-stdin`
    /// is given.
    Login {
        /// Account phone number.
        #[arg(long = "phone", value_name = "number")]
        phone: String,
        /// Read the password from the first line of standard input.
        #[arg(long = "password-stdin")]
        password_stdin: bool,
    },
    /// Clear stored tokens and sign out.
    Logout,
    /// Show the signed-in account.
    Me,
}

#[derive(Debug, Subcommand)]
enum QrCommand {
    /// Print the SVG pattern to stdout.
    Render(PatternArgs),
    /// Write the SVG pattern into a directory.
    Export {
        #[command(flatten)]
        pattern: PatternArgs,
        /// Destination directory.
        #[arg(long = "dir", value_name = "path")]
        dir: Utf8PathBuf,
    },
    /// Offer the identifier to the platform share action.
    Share {
        /// CPS number to share.
        #[arg(long = "identifier", value_name = "id")]
        identifier: String,
    },
}

#[derive(Debug, Args)]
struct PatternArgs {
    /// CPS number to render.
    #[arg(long = "identifier", value_name = "id")]
    identifier: String,
    /// Width and height in pixels.
    #[arg(long = "size", value_name = "pixels", default_value_t = DEFAULT_SIZE)]
    size: u32,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build chakula runtime")?;
    runtime.block_on(run(cli.command))
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Qr(qr) => run_qr(qr).await,
        Command::Login {
            phone,
            password_stdin,
        } => {
            let password = read_password(
                password_stdin,
                std::env::var_os(PASSWORD_ENV),
                std::io::stdin().lock(),
            )?;
            let credentials = LoginCredentials::try_from_parts(&phone, &password)?;
            let session = expect_success(build_api()?.login(&credentials).await)?;
            info!("login succeeded");
            println!("Signed in as {}", session.user.display_name());
            if let Some(cps) = session.cps_number {
                println!("CPS number: {cps}");
            }
            Ok(())
        }
        Command::Logout => {
            let result = build_api()?.logout().await;
            if let Some(message) = result.error() {
                info!(status = result.status(), %message, "server logout not acknowledged");
            }
            println!("Signed out");
            Ok(())
        }
        Command::Me => {
            let user = expect_success(build_api()?.me().await)?;
            print_user(&user);
            Ok(())
        }
    }
}

async fn run_qr(command: QrCommand) -> Result<()> {
    match command {
        QrCommand::Render(args) => {
            let card = IdentifierCard::new(&args.identifier, args.size)?;
            println!("{}", card.svg());
        }
        QrCommand::Export { pattern, dir } => {
            let card = IdentifierCard::new(&pattern.identifier, pattern.size)?;
            let path = card
                .export_to(&dir)
                .wrap_err_with(|| format!("failed to export pattern into {dir}"))?;
            println!("{path}");
        }
        QrCommand::Share { identifier } => {
            let card = IdentifierCard::new(&identifier, DEFAULT_SIZE)?;
            match card.share(&UnsupportedShareTarget).await {
                ShareOutcome::Shared => println!("Shared {identifier}"),
                ShareOutcome::Skipped => {
                    println!("Sharing is not available here; CPS number: {identifier}");
                }
            }
        }
    }
    Ok(())
}

fn read_password(
    from_stdin: bool,
    env_value: Option<OsString>,
    mut input: impl BufRead,
) -> Result<Zeroizing<String>> {
    if from_stdin {
        let mut line = Zeroizing::new(String::new());
        input
            .read_line(&mut line)
            .wrap_err("failed to read password from standard input")?;
        return Ok(Zeroizing::new(
            line.trim_end_matches(['\r', '\n']).to_owned(),
        ));
    }
    match env_value {
        Some(value) => value
            .into_string()
            .map(Zeroizing::new)
            .map_err(|_| eyre!("{PASSWORD_ENV} is not valid UTF-8")),
        None => Err(eyre!("set {PASSWORD_ENV} or pass --password-stdin")),
    }
}

fn build_api() -> Result<ClientApi> {
    let settings = ClientSettings::load_from_iter([OsString::from("chakula")])
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let base_url = settings.api_url()?;
    let credentials_dir = settings.credentials_dir();
    let store = FileCredentialStore::open(&credentials_dir)
        .wrap_err_with(|| format!("failed to open credential store at {credentials_dir}"))?;
    let transport =
        ReqwestTransport::new(settings.request_timeout()).wrap_err("failed to build transport")?;
    Ok(AuthApi::new(RequestPipeline::new(
        &base_url,
        Arc::new(store),
        Arc::new(transport),
    )))
}

fn expect_success<T>(result: ApiResult<T>) -> Result<T> {
    let status = result.status();
    result
        .into_result()?
        .ok_or_else(|| eyre!("server returned status {status} without a usable body"))
}

fn print_user(user: &User) {
    println!("Name: {}", user.display_name());
    println!("Phone: {}", user.phone_number);
    if let Some(cps) = &user.cps_number {
        println!("CPS number: {cps}");
    }
    if let Some(university) = &user.university_name {
        println!("University: {university}");
    }
    println!("Role: {:?}", user.role);
}
