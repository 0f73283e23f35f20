use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use common::config::CliSource;
use common::context::Context;
use common::{logging, signal};
use tokio::signal::unix::SignalKind;
use tokio::{select, time};

use crate::api::jwt::AuthJwtPayload;
use crate::config::AppConfig;
use crate::database::User;

mod api;
mod config;
mod database;
mod global;
mod media;
mod pagination;

#[cfg(test)]
mod tests;

#[derive(Debug, Parser)]
#[command(name = "yatube-api", version, about)]
struct Args {
	/// Config file to load, it must exist
	#[arg(long, short = 'c')]
	config_file: Option<String>,

	/// Create this user if needed, print a bearer token for them and exit
	#[arg(long)]
	issue_token: Option<String>,

	/// Address the API binds to
	#[arg(long)]
	bind_address: Option<String>,

	/// Override any config value, e.g. `--set cache.index_ttl=0`
	#[arg(long = "set", value_name = "KEY=VALUE")]
	overrides: Vec<String>,
}

impl Args {
	fn into_cli_source(self) -> anyhow::Result<CliSource> {
		let mut cli = CliSource {
			config_file: self.config_file,
			..Default::default()
		}
		.with_assignments(self.overrides.iter().map(String::as_str))?;

		if let Some(username) = self.issue_token {
			cli = cli.with_value("issue_token", username);
		}

		if let Some(bind_address) = self.bind_address {
			cli = cli.with_value("api.bind_address", bind_address);
		}

		Ok(cli)
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let config = AppConfig::parse(Args::parse().into_cli_source()?)?;

	logging::init(&config.logging.level, config.logging.mode)?;

	tracing::info!(name = %config.name, "starting");

	if let Some(file) = &config.config_file {
		tracing::info!(file = file, "loaded config from file");
	}

	tracing::debug!("config: {:#?}", config);

	let db = database::connect(&config.database)
		.await
		.context("failed to open database")?;

	if let Some(username) = &config.issue_token {
		let user = User::get_or_create(&db, username).await.context("failed to create user")?;
		let token = AuthJwtPayload::new(&config.jwt, user.id)
			.serialize(&config.jwt)
			.context("failed to sign token")?;

		tracing::info!(user_id = user.id, username = %user.username, "issued token");
		println!("{token}");

		return Ok(());
	}

	let (ctx, handler) = Context::new();

	let global = Arc::new(global::GlobalState::new(config, db, ctx));

	let api_future = tokio::spawn(api::run(global.clone()));

	// Listen on both sigint and sigterm and cancel the context when either is received
	let mut signal_handler = signal::SignalHandler::new()
		.with_signal(SignalKind::interrupt())?
		.with_signal(SignalKind::terminate())?;

	select! {
		r = api_future => tracing::error!("api stopped unexpectedly: {:?}", r),
		_ = signal_handler.recv() => tracing::info!("shutting down"),
	}

	// The handler waits for every context, including the one held by the global state.
	drop(global);

	tracing::info!("waiting for tasks to finish");

	select! {
		_ = time::sleep(Duration::from_secs(60)) => tracing::warn!("force shutting down"),
		_ = signal_handler.recv() => tracing::warn!("force shutting down"),
		_ = handler.cancel() => tracing::info!("shutting down"),
	}

	Ok(())
}
