use chrono::TimeDelta;
use forma_domain::{DEFAULT_SEARCH_DELAY_MS, MODAL_SEARCH_LIMIT, QUICK_SEARCH_LIMIT, QuickSearch};
use log::error;

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, String>;
    async fn set_settings(&self, settings: Settings) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

/// User preferences. Missing fields of stored settings take their default value.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub search_delay_ms: u32,
    pub quick_search_limit: usize,
    pub modal_search_limit: usize,
}

impl Settings {
    #[must_use]
    pub fn current_theme(&self) -> Theme {
        match self.theme {
            Theme::System => preferred_theme().unwrap_or_else(|err| {
                error!("failed to determine preferred color scheme: {err}");
                Theme::Light
            }),
            Theme::Light | Theme::Dark => self.theme,
        }
    }

    /// Search of the workout builder.
    #[must_use]
    pub fn quick_search(&self) -> QuickSearch {
        QuickSearch::new(self.search_delay(), self.quick_search_limit)
    }

    /// Search of the dialog for adding an exercise.
    #[must_use]
    pub fn modal_search(&self) -> QuickSearch {
        QuickSearch::new(self.search_delay(), self.modal_search_limit)
    }

    fn search_delay(&self) -> TimeDelta {
        TimeDelta::milliseconds(i64::from(self.search_delay_ms))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            search_delay_ms: DEFAULT_SEARCH_DELAY_MS,
            quick_search_limit: QUICK_SEARCH_LIMIT,
            modal_search_limit: MODAL_SEARCH_LIMIT,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    System,
    Light,
    Dark,
}

fn preferred_theme() -> Result<Theme, &'static str> {
    let window = web_sys::window().ok_or("no window")?;
    let media_query_list = window
        .match_media("(prefers-color-scheme: dark)")
        .map_err(|_| "failed to match media")?
        .ok_or("media query not supported")?;
    Ok(if media_query_list.matches() {
        Theme::Dark
    } else {
        Theme::Light
    })
}
