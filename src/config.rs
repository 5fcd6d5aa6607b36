use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::FrontendError;

pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_UPLOAD_FIELD: &str = "nlcfile";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024;
/// Batch size cap of the hosted classify_collection endpoint.
pub const DEFAULT_MAX_ROWS: usize = 30;

#[derive(Debug, Clone)]
pub struct Settings {
    pub classifier: ClassifierSettings,
    pub upload: UploadSettings,
    /// Main HTTP server port (upload page, upload endpoint, health)
    pub http_port: u16,
}

#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub url: String,
    pub classifier_id: String,
    pub credentials: Credentials,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Directory for request-scoped temp files
    pub dir: PathBuf,
    /// Multipart field carrying the CSV
    pub field: String,
    pub max_upload_bytes: usize,
    pub max_rows: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: env::temp_dir(),
            field: DEFAULT_UPLOAD_FIELD.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

/// Credentials for the classifier service.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// IAM API key, sent as basic auth with the `apikey` user.
    ApiKey(String),
    Basic { username: String, password: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("ApiKey(***)"),
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

impl Settings {
    /// Validates the settings and returns an error if invalid.
    pub fn validate(&self) -> Result<(), FrontendError> {
        validate_url(&self.classifier.url)?;
        validate_not_empty("classifier id", &self.classifier.classifier_id)?;
        validate_port(self.http_port)?;
        validate_not_empty("upload field", &self.upload.field)?;
        validate_positive("MAX_UPLOAD_BYTES", self.upload.max_upload_bytes)?;
        validate_positive("MAX_ROWS", self.upload.max_rows)?;
        if self.classifier.timeout.is_zero() {
            return Err(FrontendError::Config("NLC_TIMEOUT_MS cannot be 0".into()));
        }
        Ok(())
    }
}

fn validate_url(url: &str) -> Result<(), FrontendError> {
    validate_not_empty("classifier URL", url)?;
    let parsed = Url::parse(url)
        .map_err(|e| FrontendError::Config(format!("Invalid classifier URL {url}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FrontendError::Config(format!(
            "Classifier URL must be http or https: {url}"
        )));
    }
    Ok(())
}

fn validate_not_empty(what: &str, value: &str) -> Result<(), FrontendError> {
    if value.trim().is_empty() {
        return Err(FrontendError::Config(format!("{what} cannot be empty")));
    }
    Ok(())
}

fn validate_port(port: u16) -> Result<(), FrontendError> {
    if port == 0 {
        return Err(FrontendError::Config("Port cannot be 0".into()));
    }
    Ok(())
}

fn validate_positive(name: &str, value: usize) -> Result<(), FrontendError> {
    if value == 0 {
        return Err(FrontendError::Config(format!("{name} cannot be 0")));
    }
    Ok(())
}

fn required(env_name: &str) -> Result<String, FrontendError> {
    env::var(env_name).map_err(|_| {
        FrontendError::Config(format!("Missing required environment variable: {env_name}"))
    })
}

/// Read a secret from `{env_name}_FILE` (Docker Secrets) or `{env_name}`.
fn optional_env_or_file(env_name: &str) -> Result<Option<String>, FrontendError> {
    let file_env = format!("{env_name}_FILE");
    if let Ok(file_path) = env::var(&file_env) {
        return fs::read_to_string(&file_path)
            .map(|content| Some(content.trim().to_string()).filter(|v| !v.is_empty()))
            .map_err(|e| FrontendError::Config(format!("Failed to read {file_env}: {e}")));
    }

    Ok(env::var(env_name).ok().filter(|v| !v.is_empty()))
}

fn parse_or<T>(env_name: &str, default: T) -> Result<T, FrontendError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match env::var(env_name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| FrontendError::Config(format!("Invalid value for {env_name}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn credentials_from_env() -> Result<Credentials, FrontendError> {
    if let Some(api_key) = optional_env_or_file("NLC_IAM_APIKEY")? {
        return Ok(Credentials::ApiKey(api_key));
    }

    let username = env::var("NLC_USERNAME").ok().filter(|v| !v.is_empty());
    let password = optional_env_or_file("NLC_PASSWORD")?;
    match (username, password) {
        (Some(username), Some(password)) => Ok(Credentials::Basic { username, password }),
        _ => Err(FrontendError::Config(
            "No classifier credentials: set NLC_IAM_APIKEY or NLC_USERNAME and NLC_PASSWORD"
                .into(),
        )),
    }
}

/// Port the server listens on, also used by the healthcheck subcommand.
pub fn http_port() -> Result<u16, FrontendError> {
    parse_or("HTTP_PORT", DEFAULT_HTTP_PORT)
}

pub fn get_configuration() -> Result<Settings, FrontendError> {
    let classifier = ClassifierSettings {
        url: required("NLC_URL")?,
        classifier_id: required("NLC_CLASSIFIER_ID")?,
        credentials: credentials_from_env()?,
        connect_timeout: Duration::from_millis(parse_or("NLC_CONNECT_TIMEOUT_MS", 3_000)?),
        timeout: Duration::from_millis(parse_or("NLC_TIMEOUT_MS", 30_000)?),
    };

    let upload = UploadSettings {
        dir: env::var_os("UPLOAD_DIR").map_or_else(env::temp_dir, PathBuf::from),
        field: env::var("UPLOAD_FIELD").unwrap_or_else(|_| DEFAULT_UPLOAD_FIELD.to_string()),
        max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        max_rows: parse_or("MAX_ROWS", DEFAULT_MAX_ROWS)?,
    };

    let settings = Settings {
        classifier,
        upload,
        http_port: http_port()?,
    };

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN_ENV: [(&str, Option<&str>); 14] = [
        ("NLC_URL", Some("https://nlc.example.com/api")),
        ("NLC_CLASSIFIER_ID", Some("abc123-nlc-1")),
        ("NLC_IAM_APIKEY", None),
        ("NLC_IAM_APIKEY_FILE", None),
        ("NLC_USERNAME", None),
        ("NLC_PASSWORD", None),
        ("NLC_PASSWORD_FILE", None),
        ("NLC_CONNECT_TIMEOUT_MS", None),
        ("NLC_TIMEOUT_MS", None),
        ("HTTP_PORT", None),
        ("UPLOAD_DIR", None),
        ("UPLOAD_FIELD", None),
        ("MAX_UPLOAD_BYTES", None),
        ("MAX_ROWS", None),
    ];

    fn with_env<F: FnOnce()>(overrides: &[(&str, Option<&str>)], f: F) {
        let mut vars: Vec<(&str, Option<&str>)> = CLEAN_ENV.to_vec();
        for (name, value) in overrides {
            vars.retain(|(existing, _)| existing != name);
            vars.push((*name, *value));
        }
        temp_env::with_vars(vars, f);
    }

    fn valid_settings() -> Settings {
        Settings {
            classifier: ClassifierSettings {
                url: "https://nlc.example.com/api".into(),
                classifier_id: "abc123-nlc-1".into(),
                credentials: Credentials::ApiKey("key".into()),
                connect_timeout: Duration::from_secs(3),
                timeout: Duration::from_secs(30),
            },
            upload: UploadSettings::default(),
            http_port: DEFAULT_HTTP_PORT,
        }
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let err = validate_port(0).unwrap_err();
        assert!(err.to_string().contains("Port cannot be 0"));
        assert!(validate_port(1).is_ok());
        assert!(validate_port(65535).is_ok());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://gateway.example.com/natural-language-classifier/api").is_ok());
        assert!(validate_url("http://127.0.0.1:8080").is_ok());
        assert!(validate_url("").is_err());
        assert!(validate_url("   ").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_settings_validate_success() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn test_settings_validate_empty_classifier_id_fails() {
        let mut settings = valid_settings();
        settings.classifier.classifier_id = " ".into();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("classifier id cannot be empty"));
    }

    #[test]
    fn test_settings_validate_zero_limits_fail() {
        let mut settings = valid_settings();
        settings.upload.max_rows = 0;
        assert!(settings.validate().is_err());

        let mut settings = valid_settings();
        settings.upload.max_upload_bytes = 0;
        assert!(settings.validate().is_err());

        let mut settings = valid_settings();
        settings.classifier.timeout = Duration::ZERO;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let api_key = format!("{:?}", Credentials::ApiKey("s3cret".into()));
        assert!(!api_key.contains("s3cret"));

        let basic = format!(
            "{:?}",
            Credentials::Basic {
                username: "user".into(),
                password: "hunter2".into(),
            }
        );
        assert!(basic.contains("user"));
        assert!(!basic.contains("hunter2"));
    }

    #[test]
    fn test_get_configuration_defaults() {
        with_env(&[("NLC_IAM_APIKEY", Some("key-1"))], || {
            let settings = get_configuration().unwrap();
            assert_eq!(settings.classifier.classifier_id, "abc123-nlc-1");
            assert_eq!(settings.classifier.credentials, Credentials::ApiKey("key-1".into()));
            assert_eq!(settings.classifier.timeout, Duration::from_secs(30));
            assert_eq!(settings.http_port, DEFAULT_HTTP_PORT);
            assert_eq!(settings.upload.field, "nlcfile");
            assert_eq!(settings.upload.max_rows, DEFAULT_MAX_ROWS);
        });
    }

    #[test]
    fn test_get_configuration_basic_credentials() {
        with_env(
            &[
                ("NLC_USERNAME", Some("svc-user")),
                ("NLC_PASSWORD", Some("pw")),
                ("HTTP_PORT", Some("8088")),
                ("MAX_ROWS", Some("5")),
                ("UPLOAD_DIR", Some("/srv/nlc/uploads")),
                ("UPLOAD_FIELD", Some("questions")),
            ],
            || {
                let settings = get_configuration().unwrap();
                assert_eq!(
                    settings.classifier.credentials,
                    Credentials::Basic {
                        username: "svc-user".into(),
                        password: "pw".into(),
                    }
                );
                assert_eq!(settings.http_port, 8088);
                assert_eq!(settings.upload.max_rows, 5);
                assert_eq!(settings.upload.dir, PathBuf::from("/srv/nlc/uploads"));
                assert_eq!(settings.upload.field, "questions");
            },
        );
    }

    #[test]
    fn test_api_key_wins_over_basic_credentials() {
        with_env(
            &[
                ("NLC_IAM_APIKEY", Some("key-2")),
                ("NLC_USERNAME", Some("svc-user")),
                ("NLC_PASSWORD", Some("pw")),
            ],
            || {
                let settings = get_configuration().unwrap();
                assert_eq!(settings.classifier.credentials, Credentials::ApiKey("key-2".into()));
            },
        );
    }

    #[test]
    fn test_api_key_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let secret = dir.path().join("apikey");
        fs::write(&secret, "file-key\n").unwrap();
        let secret = secret.to_str().unwrap().to_string();

        with_env(&[("NLC_IAM_APIKEY_FILE", Some(secret.as_str()))], || {
            let settings = get_configuration().unwrap();
            assert_eq!(settings.classifier.credentials, Credentials::ApiKey("file-key".into()));
        });
    }

    #[test]
    fn test_empty_api_key_file_falls_back_to_basic_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let secret = dir.path().join("apikey");
        fs::write(&secret, "  \n").unwrap();
        let secret = secret.to_str().unwrap().to_string();

        with_env(
            &[
                ("NLC_IAM_APIKEY_FILE", Some(secret.as_str())),
                ("NLC_USERNAME", Some("svc-user")),
                ("NLC_PASSWORD", Some("pw")),
            ],
            || {
                let settings = get_configuration().unwrap();
                assert_eq!(
                    settings.classifier.credentials,
                    Credentials::Basic {
                        username: "svc-user".into(),
                        password: "pw".into(),
                    }
                );
            },
        );

        with_env(&[("NLC_IAM_APIKEY_FILE", Some(secret.as_str()))], || {
            let err = get_configuration().unwrap_err();
            assert!(err.to_string().contains("No classifier credentials"));
        });
    }

    #[test]
    fn test_missing_credentials_fail() {
        with_env(&[], || {
            let err = get_configuration().unwrap_err();
            assert!(err.to_string().contains("No classifier credentials"));
        });
    }

    #[test]
    fn test_missing_url_fails() {
        with_env(&[("NLC_URL", None), ("NLC_IAM_APIKEY", Some("k"))], || {
            let err = get_configuration().unwrap_err();
            assert!(err.to_string().contains("NLC_URL"));
        });
    }

    #[test]
    fn test_invalid_number_fails() {
        with_env(
            &[("NLC_IAM_APIKEY", Some("k")), ("NLC_TIMEOUT_MS", Some("soon"))],
            || {
                let err = get_configuration().unwrap_err();
                assert!(err.to_string().contains("Invalid value for NLC_TIMEOUT_MS"));
            },
        );
    }
}
