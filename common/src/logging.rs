use std::str::FromStr;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter};

type ReloadFn = Box<dyn Fn(&str) -> Result<(), LoggingError> + Sync + Send>;

static RELOAD: OnceCell<ReloadFn> = OnceCell::new();

/// Output format of the fmt subscriber.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	#[default]
	Default,
	Json,
	Pretty,
	Compact,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
	#[error("invalid log filter: {0}")]
	InvalidFilter(#[from] tracing_subscriber::filter::ParseError),
	#[error("failed to install subscriber: {0}")]
	Init(#[from] tracing_subscriber::util::TryInitError),
	#[error("failed to reload log filter: {0}")]
	Reload(#[from] reload::Error),
}

/// Installs the global subscriber on the first call.
///
/// The output mode is fixed once installed, later calls only swap the
/// filter to `level`.
pub fn init(level: &str, mode: Mode) -> Result<(), LoggingError> {
	let reload = RELOAD.get_or_try_init(|| install(level, mode))?;
	reload(level)
}

fn install(level: &str, mode: Mode) -> Result<ReloadFn, LoggingError> {
	let (filter, handle) = reload::Layer::new(EnvFilter::from_str(level)?);
	let registry = tracing_subscriber::registry().with(filter);
	let fmt = tracing_subscriber::fmt::layer().with_file(true).with_line_number(true);

	match mode {
		Mode::Default => registry.with(fmt).try_init()?,
		Mode::Json => registry.with(fmt.json()).try_init()?,
		Mode::Pretty => registry.with(fmt.pretty()).try_init()?,
		Mode::Compact => registry.with(fmt.compact()).try_init()?,
	}

	Ok(Box::new(move |level: &str| {
		handle.reload(EnvFilter::from_str(level)?)?;
		Ok(())
	}))
}
