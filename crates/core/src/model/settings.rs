use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_HISTORY_LIMIT: usize = 10;
const DEFAULT_MAX_RESULTS_PER_PARAGRAPH: usize = 10;
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_PREVIEW_LENGTH: usize = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("history limit must be > 0")]
    InvalidHistoryLimit,

    #[error("max results per paragraph must be > 0")]
    InvalidMaxResultsPerParagraph,

    #[error("tick interval must be > 0")]
    InvalidTickInterval,

    #[error("preview length must be > 0")]
    InvalidPreviewLength,
}

/// Validated quiz configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    history_limit: usize,
    max_results_per_paragraph: usize,
    tick_interval: Duration,
    feedback_delay: Duration,
    preview_length: usize,
}

/// Unvalidated settings, typically assembled from the environment.
#[derive(Debug, Clone, Default)]
pub struct QuizSettingsDraft {
    pub history_limit: Option<usize>,
    pub max_results_per_paragraph: Option<usize>,
    pub tick_interval: Option<Duration>,
    pub feedback_delay: Option<Duration>,
    pub preview_length: Option<usize>,
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from `MEMO_*` environment variables.
    ///
    /// Unset or unparsable values are left empty and fall back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            history_limit: env_number("MEMO_HISTORY_LIMIT"),
            max_results_per_paragraph: env_number("MEMO_MAX_RESULTS_PER_PARAGRAPH"),
            tick_interval: env_number("MEMO_TICK_INTERVAL_MS").map(Duration::from_millis),
            feedback_delay: env_number("MEMO_FEEDBACK_DELAY_MS").map(Duration::from_millis),
            preview_length: env_number("MEMO_PREVIEW_LENGTH"),
        }
    }

    /// Fill defaults and validate.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if any limit or interval is zero.
    pub fn validate(self) -> Result<QuizSettings, SettingsError> {
        let settings = QuizSettings {
            history_limit: self.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
            max_results_per_paragraph: self
                .max_results_per_paragraph
                .unwrap_or(DEFAULT_MAX_RESULTS_PER_PARAGRAPH),
            tick_interval: self.tick_interval.unwrap_or(DEFAULT_TICK_INTERVAL),
            feedback_delay: self.feedback_delay.unwrap_or(DEFAULT_FEEDBACK_DELAY),
            preview_length: self.preview_length.unwrap_or(DEFAULT_PREVIEW_LENGTH),
        };

        if settings.history_limit == 0 {
            return Err(SettingsError::InvalidHistoryLimit);
        }
        if settings.max_results_per_paragraph == 0 {
            return Err(SettingsError::InvalidMaxResultsPerParagraph);
        }
        if settings.tick_interval.is_zero() {
            return Err(SettingsError::InvalidTickInterval);
        }
        if settings.preview_length == 0 {
            return Err(SettingsError::InvalidPreviewLength);
        }
        Ok(settings)
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.trim().parse().ok()
}

impl QuizSettings {
    #[must_use]
    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    #[must_use]
    pub fn max_results_per_paragraph(&self) -> usize {
        self.max_results_per_paragraph
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// How long a renderer should hold the "correct" feedback before moving on.
    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    #[must_use]
    pub fn preview_length(&self) -> usize {
        self.preview_length
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            max_results_per_paragraph: DEFAULT_MAX_RESULTS_PER_PARAGRAPH,
            tick_interval: DEFAULT_TICK_INTERVAL,
            feedback_delay: DEFAULT_FEEDBACK_DELAY,
            preview_length: DEFAULT_PREVIEW_LENGTH,
        }
    }
}
