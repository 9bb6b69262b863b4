use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub booking: BookingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let booking = BookingConfig {
            utc_offset_minutes: read_setting(
                "BOOKING_UTC_OFFSET_MINUTES",
                BookingConfig::DEFAULT_UTC_OFFSET_MINUTES,
            )?,
            window_days: read_setting("BOOKING_WINDOW_DAYS", BookingConfig::DEFAULT_WINDOW_DAYS)?,
            opening_hour: read_setting(
                "BOOKING_OPENING_HOUR",
                BookingConfig::DEFAULT_OPENING_HOUR,
            )?,
            closing_hour: read_setting(
                "BOOKING_CLOSING_HOUR",
                BookingConfig::DEFAULT_CLOSING_HOUR,
            )?,
        };
        booking.validate()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            booking,
        })
    }
}

fn read_setting<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidBookingSetting { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Scheduling rules applied when a new appointment is admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingConfig {
    /// Offset of the business clock from UTC, in minutes east.
    pub utc_offset_minutes: i32,
    /// Number of calendar days after today that remain bookable.
    pub window_days: u32,
    /// First bookable hour (inclusive).
    pub opening_hour: u32,
    /// Hour at which bookings stop (exclusive).
    pub closing_hour: u32,
}

impl BookingConfig {
    pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 5 * 60 + 30;
    pub const DEFAULT_WINDOW_DAYS: u32 = 2;
    pub const DEFAULT_OPENING_HOUR: u32 = 9;
    pub const DEFAULT_CLOSING_HOUR: u32 = 19;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::InvalidBookingSetting {
                key: "BOOKING_UTC_OFFSET_MINUTES",
                value: self.utc_offset_minutes.to_string(),
            });
        }
        if self.closing_hour > 24 {
            return Err(ConfigError::InvalidBookingSetting {
                key: "BOOKING_CLOSING_HOUR",
                value: self.closing_hour.to_string(),
            });
        }
        if self.opening_hour >= self.closing_hour {
            return Err(ConfigError::InvalidBookingSetting {
                key: "BOOKING_OPENING_HOUR",
                value: self.opening_hour.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: Self::DEFAULT_UTC_OFFSET_MINUTES,
            window_days: Self::DEFAULT_WINDOW_DAYS,
            opening_hour: Self::DEFAULT_OPENING_HOUR,
            closing_hour: Self::DEFAULT_CLOSING_HOUR,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidBookingSetting { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBookingSetting { key, value } => {
                write!(f, "{key} has an unusable value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidBookingSetting { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
