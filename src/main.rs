extern crate dotenv;

use docker_link::handlers::link_handler::run_link;
use docker_link::utils::config_utils::LinkConfig;
use docker_link::utils::{docker_utils, logging_utils};
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>>{
	dotenv().ok();

	let config = LinkConfig::from_env()?;
	logging_utils::init_logging(&config.log_level)?;

	let engine = match docker_utils::connect().await {
		Ok(engine) => engine,
		Err(err) => {
			tracing::error!(step = err.step(), error = %err, "Link run failed");
			return Err(err.into());
		}
	};

	let mut stdout = std::io::stdout();
	let mut stderr = std::io::stderr();
	match run_link(&engine, &config, &mut stdout, &mut stderr).await {
		Ok(report) => {
			let report_json = serde_json::to_string(&report)?;
			tracing::info!(report = %report_json, "Link report");
			if let Some(stop_err) = report.server_stop_error.as_deref() {
				tracing::warn!(error = %stop_err, "Server was not stopped cleanly");
			}
			for failure in report.cleanup_failures.iter() {
				tracing::warn!(failure = %failure, "Cleanup left a resource behind");
			}
		},
		Err(err) => {
			tracing::error!(step = err.step(), error = %err, "Link run failed");
			return Err(err.into());
		}
	}
	return Ok(())
}
