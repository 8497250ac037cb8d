//! Log output for the server.
//!
//! Events are filtered by `RUST_LOG` when it is set, otherwise by the level
//! associated with the deployment environment (see
//! [`AppEnv::default_log_level`]). Local and dev builds print human-readable
//! multi-line records; prod emits one JSON object per line for log shippers.
//!
//! HTTP requests get their own spans from `tower_http::trace::TraceLayer`,
//! so events logged by the handlers and services are nested under the
//! request that produced them.

use crate::server::config::AppEnv;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry(app_env: AppEnv) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(app_env.default_log_level()))?;

    let registry = tracing_subscriber::registry().with(filter);

    match app_env {
        AppEnv::Local | AppEnv::Dev => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_target(false)
                    .with_timer(ChronoLocal::rfc_3339())
                    .with_file(true)
                    .pretty(),
            )
            .try_init()?,
        AppEnv::Prod => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_timer(ChronoLocal::rfc_3339())
                    .json(),
            )
            .try_init()?,
    }

    Ok(())
}
