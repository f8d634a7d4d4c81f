use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tutor_core::grading::Difficulty;
use tutor_core::policy::Limits;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Absent keys are tolerated at startup; grading requests then fail
    /// with a credential error instead of the process refusing to boot.
    pub gemini_api_key: Option<String>,
    pub chat_model: String,
    pub lesson_file: PathBuf,
    pub passing_score: u8,
    pub max_attempts: u32,
    pub max_time_on_question: u64,
    pub difficulty: Difficulty,
    pub attempt_log_file: PathBuf,
    pub disable_logging: bool,
    pub log_level: Level,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());

        let chat_model =
            std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gemini-flash-latest".to_string());

        let lesson_file = std::env::var("LESSON_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("lesson.txt"));

        let passing_score = parse_var("PASSING_SCORE", 70u8)?;
        let max_attempts = parse_var("MAX_ATTEMPTS", 2u32)?;
        let max_time_on_question = parse_var("MAX_TIME_ON_QUESTION", 120u64)?;

        let difficulty = match std::env::var("GRADER_DIFFICULTY") {
            Ok(raw) => raw
                .parse::<Difficulty>()
                .map_err(|e| ConfigError::InvalidValue("GRADER_DIFFICULTY".to_string(), e))?,
            Err(_) => Difficulty::Normal,
        };

        let attempt_log_file = std::env::var("ATTEMPT_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("tutor_log.csv"));

        let disable_logging = std::env::var("DISABLE_LOGGING")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            gemini_api_key,
            chat_model,
            lesson_file,
            passing_score,
            max_attempts,
            max_time_on_question,
            difficulty,
            attempt_log_file,
            disable_logging,
            log_level,
        })
    }

    /// The progression thresholds as the core policy consumes them.
    pub fn limits(&self) -> Limits {
        Limits {
            passing_score: self.passing_score,
            max_attempts: self.max_attempts,
            max_time: Duration::from_secs(self.max_time_on_question),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("BIND_ADDRESS");
            env::remove_var("GEMINI_API_KEY");
            env::remove_var("CHAT_MODEL");
            env::remove_var("LESSON_FILE");
            env::remove_var("PASSING_SCORE");
            env::remove_var("MAX_ATTEMPTS");
            env::remove_var("MAX_TIME_ON_QUESTION");
            env::remove_var("GRADER_DIFFICULTY");
            env::remove_var("ATTEMPT_LOG_FILE");
            env::remove_var("DISABLE_LOGGING");
            env::remove_var("RUST_LOG");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env_vars();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.gemini_api_key, None);
        assert_eq!(config.chat_model, "gemini-flash-latest");
        assert_eq!(config.lesson_file, PathBuf::from("lesson.txt"));
        assert_eq!(config.passing_score, 70);
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.max_time_on_question, 120);
        assert_eq!(config.difficulty, Difficulty::Normal);
        assert_eq!(config.attempt_log_file, PathBuf::from("tutor_log.csv"));
        assert!(!config.disable_logging);
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    #[serial]
    fn test_config_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            env::set_var("GEMINI_API_KEY", "test-key");
            env::set_var("CHAT_MODEL", "gemini-2.0-flash");
            env::set_var("LESSON_FILE", "/lessons/ai_literacy.txt");
            env::set_var("PASSING_SCORE", "80");
            env::set_var("MAX_ATTEMPTS", "3");
            env::set_var("MAX_TIME_ON_QUESTION", "90");
            env::set_var("GRADER_DIFFICULTY", "easy");
            env::set_var("DISABLE_LOGGING", "TRUE");
            env::set_var("RUST_LOG", "debug");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.gemini_api_key, Some("test-key".to_string()));
        assert_eq!(config.chat_model, "gemini-2.0-flash");
        assert_eq!(config.lesson_file, PathBuf::from("/lessons/ai_literacy.txt"));
        assert_eq!(config.passing_score, 80);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.max_time_on_question, 90);
        assert_eq!(config.difficulty, Difficulty::Easy);
        assert!(config.disable_logging);
        assert_eq!(config.log_level, Level::DEBUG);

        let limits = config.limits();
        assert_eq!(limits.passing_score, 80);
        assert_eq!(limits.max_attempts, 3);
        assert_eq!(limits.max_time, Duration::from_secs(90));
    }

    #[test]
    #[serial]
    fn test_config_invalid_bind_address() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "not-a-valid-address");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "BIND_ADDRESS"),
            _ => panic!("Expected InvalidValue for BIND_ADDRESS"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_passing_score() {
        clear_env_vars();
        unsafe {
            env::set_var("PASSING_SCORE", "seventy");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "PASSING_SCORE"),
            _ => panic!("Expected InvalidValue for PASSING_SCORE"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_difficulty() {
        clear_env_vars();
        unsafe {
            env::set_var("GRADER_DIFFICULTY", "brutal");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, msg) => {
                assert_eq!(var, "GRADER_DIFFICULTY");
                assert!(msg.contains("brutal"));
            }
            _ => panic!("Expected InvalidValue for GRADER_DIFFICULTY"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        unsafe {
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }
    }

    #[test]
    #[serial]
    fn test_empty_api_key_counts_as_missing() {
        clear_env_vars();
        unsafe {
            env::set_var("GEMINI_API_KEY", "");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.gemini_api_key, None);
    }
}
