use super::parsing::{
    env_optional, env_or_default, normalize_prefix, parse_bool, parse_cors_origins,
    parse_environment, parse_f64, parse_tips_provider, parse_u16, parse_u32, parse_u64,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    AiSettings, AnalyticsSettings, ApiSettings, ConfigError, CorsSettings, DatabaseSettings,
    RuntimeSettings, SecuritySettings, ServerHost, ServerPort, ServerSettings, Settings,
    TelemetrySettings, TipsProviderMode,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("STUDYHALL_HOST", "0.0.0.0");
        let port = env_or_default("STUDYHALL_PORT", "8000");

        let environment = parse_environment(
            env_optional("STUDYHALL_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config =
            env_optional("STUDYHALL_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Studyhall API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let prefix = normalize_prefix(env_or_default("API_PREFIX", "/api"));

        let secret_key = match env_optional("SECRET_KEY") {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };

        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "10080"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "studyhall");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "studyhall_db");
        let database_url = env_optional("DATABASE_URL");
        let max_connections =
            parse_u32("DATABASE_MAX_CONNECTIONS", env_or_default("DATABASE_MAX_CONNECTIONS", "20"))?;
        let acquire_timeout_seconds = parse_u64(
            "DATABASE_ACQUIRE_TIMEOUT",
            env_or_default("DATABASE_ACQUIRE_TIMEOUT", "30"),
        )?;

        let tips_provider = parse_tips_provider(env_optional("AI_TIPS_PROVIDER"))?;
        let openai_api_key = env_or_default("OPENAI_API_KEY", "");
        let openai_base_url = env_or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");
        let ai_model = env_or_default("AI_MODEL", "gpt-4o-mini");
        let ai_max_tokens = parse_u32("AI_MAX_TOKENS", env_or_default("AI_MAX_TOKENS", "200"))?;
        let ai_temperature =
            parse_f64("AI_TEMPERATURE", env_or_default("AI_TEMPERATURE", "0.4"))?;
        let ai_request_timeout =
            parse_u64("AI_REQUEST_TIMEOUT", env_or_default("AI_REQUEST_TIMEOUT", "20"))?;

        let weak_accuracy_threshold = parse_u32(
            "WEAK_ACCURACY_THRESHOLD",
            env_or_default("WEAK_ACCURACY_THRESHOLD", "60"),
        )?;
        let weak_area_limit =
            parse_u64("WEAK_AREA_LIMIT", env_or_default("WEAK_AREA_LIMIT", "3"))? as usize;

        let log_level = env_or_default("STUDYHALL_LOG_LEVEL", "info");
        let json = env_optional("STUDYHALL_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, prefix },
            security: SecuritySettings { secret_key, access_token_expire_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections,
                acquire_timeout_seconds,
            },
            ai: AiSettings {
                tips_provider,
                openai_api_key,
                openai_base_url,
                ai_model,
                ai_max_tokens,
                ai_temperature,
                ai_request_timeout,
            },
            analytics: AnalyticsSettings { weak_accuracy_threshold, weak_area_limit },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn ai(&self) -> &AiSettings {
        &self.ai
    }

    pub(crate) fn analytics(&self) -> &AnalyticsSettings {
        &self.analytics
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.ai.ai_temperature) {
            return Err(ConfigError::InvalidValue {
                field: "AI_TEMPERATURE",
                value: self.ai.ai_temperature.to_string(),
            });
        }

        if self.ai.ai_request_timeout == 0 {
            return Err(ConfigError::InvalidValue {
                field: "AI_REQUEST_TIMEOUT",
                value: "0".to_string(),
            });
        }

        if self.analytics.weak_accuracy_threshold > 100 {
            return Err(ConfigError::InvalidValue {
                field: "WEAK_ACCURACY_THRESHOLD",
                value: self.analytics.weak_accuracy_threshold.to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.ai.tips_provider == TipsProviderMode::Remote && self.ai.openai_api_key.is_empty() {
            return Err(ConfigError::MissingSecret("OPENAI_API_KEY"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn clear_ai_env() {
        for key in ["AI_TIPS_PROVIDER", "OPENAI_API_KEY", "AI_TEMPERATURE", "STUDYHALL_STRICT_CONFIG"] {
            std::env::remove_var(key);
        }
    }

    #[tokio::test]
    async fn defaults_load_with_api_prefix() {
        let _guard = test_support::env_lock().await;
        clear_ai_env();
        std::env::set_var("SECRET_KEY", "test-secret");
        std::env::remove_var("API_PREFIX");

        let settings = Settings::load().expect("settings");
        assert_eq!(settings.api().prefix, "/api");
        assert_eq!(settings.analytics().weak_accuracy_threshold, 60);
        assert_eq!(settings.analytics().weak_area_limit, 3);
        assert_eq!(settings.ai().ai_model, "gpt-4o-mini");
        assert!(!settings.ai().remote_tips_enabled());
    }

    #[tokio::test]
    async fn auto_provider_turns_remote_with_api_key() {
        let _guard = test_support::env_lock().await;
        clear_ai_env();
        std::env::set_var("SECRET_KEY", "test-secret");
        std::env::set_var("OPENAI_API_KEY", "sk-test");

        let settings = Settings::load().expect("settings");
        assert!(settings.ai().remote_tips_enabled());

        std::env::set_var("AI_TIPS_PROVIDER", "heuristic");
        let settings = Settings::load().expect("settings");
        assert!(!settings.ai().remote_tips_enabled());

        clear_ai_env();
    }

    #[tokio::test]
    async fn strict_mode_requires_key_for_forced_remote_provider() {
        let _guard = test_support::env_lock().await;
        clear_ai_env();
        std::env::set_var("SECRET_KEY", "test-secret");
        std::env::set_var("DATABASE_URL", "postgresql://u:p@localhost:5432/db");
        std::env::set_var("STUDYHALL_STRICT_CONFIG", "1");
        std::env::set_var("AI_TIPS_PROVIDER", "remote");

        let err = Settings::load().expect_err("missing key");
        assert!(matches!(err, ConfigError::MissingSecret("OPENAI_API_KEY")));

        clear_ai_env();
    }

    #[tokio::test]
    async fn rejects_out_of_range_temperature() {
        let _guard = test_support::env_lock().await;
        clear_ai_env();
        std::env::set_var("SECRET_KEY", "test-secret");
        std::env::set_var("AI_TEMPERATURE", "3.5");

        let err = Settings::load().expect_err("temperature");
        assert!(matches!(err, ConfigError::InvalidValue { field: "AI_TEMPERATURE", .. }));

        clear_ai_env();
    }
}
