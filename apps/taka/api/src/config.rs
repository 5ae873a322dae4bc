use core_config::{app_info, env_or_default, env_parse, server::ServerConfig, AppInfo, FromEnv};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application configuration composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Apply pending migrations at startup (`RUN_MIGRATIONS`, default true)
    pub run_migrations: bool,
    /// Code accepted by the placeholder OTP verifier (`OTP_PLACEHOLDER_CODE`)
    pub otp_placeholder_code: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?;
        let server = ServerConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            environment,
            run_migrations: env_parse("RUN_MIGRATIONS", "true")?,
            otp_placeholder_code: env_or_default(
                "OTP_PLACEHOLDER_CODE",
                domain_accounts::otp::DEFAULT_PLACEHOLDER_CODE,
            ),
        })
    }
}
