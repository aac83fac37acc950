//! UI state - presentation state separate from domain data

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Transient message shown in the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// Remaining ticks before the message disappears
    ttl_ticks: u32,
}

impl Notification {
    /// Info messages fade after ~4s at the default tick rate
    const INFO_TTL: u32 = 40;
    /// Errors stay longer
    const ERROR_TTL: u32 = 100;

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
            ttl_ticks: Self::INFO_TTL,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            ttl_ticks: Self::ERROR_TTL,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }

    /// Count down one tick; returns `true` once expired
    pub fn tick(&mut self) -> bool {
        self.ttl_ticks = self.ttl_ticks.saturating_sub(1);
        self.ttl_ticks == 0
    }
}
