use std::time::Duration;

pub const DEFAULT_REWRITE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_INPUT_CHARS: usize = 500;
pub const DEFAULT_COPY_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Seed the transcript with the two-exchange demo conversation.
    pub demo_mode: bool,
    pub rewrite_timeout: Duration,
    pub max_input_chars: usize,
    pub copy_window: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            demo_mode: false,
            rewrite_timeout: DEFAULT_REWRITE_TIMEOUT,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            copy_window: DEFAULT_COPY_WINDOW,
        }
    }
}

impl SessionConfig {
    pub fn demo() -> Self {
        Self {
            demo_mode: true,
            ..Self::default()
        }
    }
}
