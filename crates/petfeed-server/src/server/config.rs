use anyhow::{anyhow, bail};
use chrono::{NaiveDate, Offset, TimeZone};
use chrono_tz::Tz;
use clap::Parser;
use core::fmt;
use core::str::FromStr;

/// Deployment environment, read from `APP_ENV`.
///
/// Selects which dotenv file is loaded at startup and the log level used when
/// `RUST_LOG` is not set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AppEnv {
    #[default]
    Local,
    Dev,
    Prod,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid APP_ENV `{0}` (expected one of: local, dev, prod)")]
pub struct UnknownAppEnv(String);

impl FromStr for AppEnv {
    type Err = UnknownAppEnv;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            _ => Err(UnknownAppEnv(s.to_owned())),
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Dev => "dev",
            Self::Prod => "prod",
        })
    }
}

impl AppEnv {
    /// Reads `APP_ENV` from the process environment, defaulting to
    /// [`AppEnv::Local`] when unset.
    pub fn detect() -> anyhow::Result<Self> {
        match std::env::var("APP_ENV") {
            Ok(raw) => Ok(raw.parse()?),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(err) => Err(anyhow!("cannot read APP_ENV: {err}")),
        }
    }

    /// The dotenv file loaded for this environment, if any.
    pub const fn dotenv_file(self) -> Option<&'static str> {
        match self {
            Self::Local => Some(".env.local"),
            Self::Dev => None,
            Self::Prod => Some(".env"),
        }
    }

    /// Loads the environment's dotenv file. A missing file is not an error;
    /// variables already set in the process win.
    pub fn load_dotenv(self) {
        if let Some(file) = self.dotenv_file() {
            let _ = dotenvy::from_filename(file);
        }
    }

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub const fn default_log_level(self) -> &'static str {
        match self {
            Self::Local => "debug",
            Self::Dev => "info",
            Self::Prod => "warn",
        }
    }
}

/// Runtime configuration for the `petfeed-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (after
/// the environment's dotenv file has been loaded), with defaults suitable for
/// local development.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "petfeed-server",
    version,
    about = "HTTP backend for posts, comments and likes"
)]
pub struct CliArgs {
    /// Deployment environment: `local`, `dev` or `prod`.
    ///
    /// Environment variable: `APP_ENV`
    #[arg(long, env = "APP_ENV", default_value_t = AppEnv::Local)]
    pub app_env: AppEnv,

    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8000"))]
    pub server_addr: String,

    /// Page size used when a list request does not specify `limit`.
    ///
    /// Environment variable: `DEFAULT_PAGE_SIZE`
    #[arg(long, env = "DEFAULT_PAGE_SIZE", default_value_t = 10)]
    pub default_page_size: i64,

    /// Upper bound applied to any requested `limit`.
    ///
    /// Environment variable: `MAX_PAGE_SIZE`
    #[arg(long, env = "MAX_PAGE_SIZE", default_value_t = 100)]
    pub max_page_size: i64,

    /// How many fresh post ids to try when an insert loses the race for an id
    /// to a concurrent request.
    ///
    /// Environment variable: `ID_INSERT_ATTEMPTS`
    #[arg(long, env = "ID_INSERT_ATTEMPTS", default_value_t = 3)]
    pub id_insert_attempts: usize,

    /// IANA timezone in which post ids are stamped and journey dates are
    /// interpreted.
    ///
    /// Environment variable: `ID_TIMEZONE`
    #[arg(long, env = "ID_TIMEZONE", default_value_t = String::from("Asia/Seoul"))]
    pub id_timezone: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub app_env: AppEnv,
    pub server_addr: String,
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub id_insert_attempts: usize,
    pub timezone: Tz,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.default_page_size <= 0 {
            bail!("DEFAULT_PAGE_SIZE must be greater than 0");
        }

        if args.max_page_size <= 0 {
            bail!("MAX_PAGE_SIZE must be greater than 0");
        }

        if args.default_page_size > args.max_page_size {
            bail!(
                "DEFAULT_PAGE_SIZE ({}) exceeds MAX_PAGE_SIZE ({})",
                args.default_page_size,
                args.max_page_size
            );
        }

        if args.id_insert_attempts == 0 {
            bail!("ID_INSERT_ATTEMPTS must be greater than 0");
        }

        let timezone = args
            .id_timezone
            .parse::<Tz>()
            .map_err(|err| anyhow!("invalid ID_TIMEZONE `{}`: {err}", args.id_timezone))?;
        if !has_fixed_offset(timezone) {
            bail!(
                "ID_TIMEZONE `{}` observes daylight saving; ids would repeat when clocks go back",
                args.id_timezone
            );
        }

        Ok(Self {
            app_env: args.app_env,
            server_addr: args.server_addr,
            default_page_size: args.default_page_size,
            max_page_size: args.max_page_size,
            id_insert_attempts: args.id_insert_attempts,
            timezone,
        })
    }
}

impl ServerConfig {
    /// Clamps a requested page size to the configured maximum, falling back
    /// to the default when none was given. Non-positive values pass through
    /// so the paginator can reject them.
    pub fn page_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }
}

/// Whether `tz` keeps one UTC offset all year. Samples twice a month over a
/// handful of years, which catches every current DST rule.
fn has_fixed_offset(tz: Tz) -> bool {
    let mut offsets = (2024..=2030)
        .flat_map(|year| (1..=12).flat_map(move |month| [(year, month, 1), (year, month, 15)]))
        .filter_map(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day))
        .filter_map(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| tz.offset_from_utc_datetime(&naive).fix());
    match offsets.next() {
        Some(first) => offsets.all(|offset| offset == first),
        None => true,
    }
}

#[cfg(test)]
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app_env: AppEnv::Local,
            server_addr: "127.0.0.1:0".into(),
            default_page_size: 10,
            max_page_size: 100,
            id_insert_attempts: 3,
            timezone: petfeed::DEFAULT_TIMEZONE,
        }
    }
}
