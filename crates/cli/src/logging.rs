use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

pub fn init_logging(verbosity: u8) {
	// 0 = errors from the CLI only, SDK internals silent
	// 1 (-v) = info for the CLI and SDK, warn for the HTTP/storage runtime
	// 2+ (-vv) = debug for everything
	let filter = match verbosity {
		0 => "error,stavax=off,stavax_runtime=off",
		1 => "info,stavax_runtime=warn",
		_ => "debug",
	};

	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}
