use thiserror::Error;

use crate::model::question::DEFAULT_QUESTION_TIME_SECS;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("default time limit must be > 0 seconds")]
    InvalidTimeLimit,
}

/// Session-wide knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    default_time_limit_secs: u32,
    shuffle_options: bool,
}

impl SessionSettings {
    /// Creates custom session settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidTimeLimit` if the time limit is zero.
    pub fn new(default_time_limit_secs: u32, shuffle_options: bool) -> Result<Self, SettingsError> {
        if default_time_limit_secs == 0 {
            return Err(SettingsError::InvalidTimeLimit);
        }
        Ok(Self {
            default_time_limit_secs,
            shuffle_options,
        })
    }

    /// Seconds given to questions without their own time limit.
    #[must_use]
    pub fn default_time_limit_secs(&self) -> u32 {
        self.default_time_limit_secs
    }

    #[must_use]
    pub fn shuffle_options(&self) -> bool {
        self.shuffle_options
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_time_limit_secs: DEFAULT_QUESTION_TIME_SECS,
            shuffle_options: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_time_limit_is_rejected() {
        assert_eq!(
            SessionSettings::new(0, false),
            Err(SettingsError::InvalidTimeLimit)
        );
    }

    #[test]
    fn defaults_use_global_time_limit() {
        let settings = SessionSettings::default();
        assert_eq!(settings.default_time_limit_secs(), DEFAULT_QUESTION_TIME_SECS);
        assert!(!settings.shuffle_options());
    }
}
