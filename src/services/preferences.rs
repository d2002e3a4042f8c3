use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::{
    fs,
    sync::{watch, Mutex},
};
use tracing::debug;

use crate::{
    error::AppError,
    models::{
        settings::{DateFormat, Preferences, ThemeMode, UserSettings},
        trip::TripId,
    },
};

/// Small key-value store for UI conveniences: the ongoing session pointer and
/// user settings. Domain truth never lives here.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn ongoing_session_id(&self) -> Result<Option<TripId>, AppError>;

    async fn set_ongoing_session_id(&self, id: TripId) -> Result<(), AppError>;

    async fn clear_ongoing_session_id(&self) -> Result<(), AppError>;

    fn observe_ongoing_session_id(&self) -> watch::Receiver<Option<TripId>>;

    async fn settings(&self) -> Result<UserSettings, AppError>;

    async fn set_theme_mode(&self, mode: ThemeMode) -> Result<(), AppError>;

    async fn set_default_guide(&self, guide: &str) -> Result<(), AppError>;

    async fn set_show_delete_confirmation(&self, show: bool) -> Result<(), AppError>;

    async fn set_date_format(&self, format: DateFormat) -> Result<(), AppError>;

    /// Restores every setting to its default. The ongoing session is kept.
    async fn reset_settings(&self) -> Result<(), AppError>;

    fn observe_settings(&self) -> watch::Receiver<UserSettings>;
}

/// Preferences kept as one pretty-printed JSON document.
#[derive(Clone)]
pub struct JsonPreferenceStore {
    path: Arc<PathBuf>,
    current: Arc<Mutex<Preferences>>,
    session_tx: Arc<watch::Sender<Option<TripId>>>,
    settings_tx: Arc<watch::Sender<UserSettings>>,
}

impl JsonPreferenceStore {
    pub async fn open(path: PathBuf) -> Result<Self, AppError> {
        let prefs = load_preferences(&path).await?;
        let (session_tx, _) = watch::channel(prefs.ongoing_session_id);
        let (settings_tx, _) = watch::channel(prefs.settings.clone());
        Ok(Self {
            path: Arc::new(path),
            current: Arc::new(Mutex::new(prefs)),
            session_tx: Arc::new(session_tx),
            settings_tx: Arc::new(settings_tx),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn modify(&self, change: impl FnOnce(&mut Preferences)) -> Result<(), AppError> {
        let mut prefs = self.current.lock().await;
        let mut next = prefs.clone();
        change(&mut next);
        if next == *prefs {
            return Ok(());
        }
        save_preferences(self.path(), &next).await?;
        if next.ongoing_session_id != prefs.ongoing_session_id {
            self.session_tx.send_replace(next.ongoing_session_id);
        }
        if next.settings != prefs.settings {
            self.settings_tx.send_replace(next.settings.clone());
        }
        *prefs = next;
        Ok(())
    }
}

async fn load_preferences(path: &Path) -> Result<Preferences, AppError> {
    if !fs::try_exists(path).await? {
        return Ok(Preferences::default());
    }
    let raw = fs::read(path).await?;
    if raw.is_empty() {
        return Ok(Preferences::default());
    }
    serde_json::from_slice(&raw).map_err(|err| AppError::Other(err.into()))
}

async fn save_preferences(path: &Path, prefs: &Preferences) -> Result<(), AppError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).await?;
    }
    let data = serde_json::to_vec_pretty(prefs).map_err(|err| AppError::Other(err.into()))?;
    fs::write(path, data).await?;
    debug!("preferences written to {}", path.display());
    Ok(())
}

#[async_trait]
impl PreferenceStore for JsonPreferenceStore {
    async fn ongoing_session_id(&self) -> Result<Option<TripId>, AppError> {
        Ok(self.current.lock().await.ongoing_session_id)
    }

    async fn set_ongoing_session_id(&self, id: TripId) -> Result<(), AppError> {
        self.modify(|prefs| prefs.ongoing_session_id = Some(id)).await
    }

    async fn clear_ongoing_session_id(&self) -> Result<(), AppError> {
        self.modify(|prefs| prefs.ongoing_session_id = None).await
    }

    fn observe_ongoing_session_id(&self) -> watch::Receiver<Option<TripId>> {
        self.session_tx.subscribe()
    }

    async fn settings(&self) -> Result<UserSettings, AppError> {
        Ok(self.current.lock().await.settings.clone())
    }

    async fn set_theme_mode(&self, mode: ThemeMode) -> Result<(), AppError> {
        self.modify(|prefs| prefs.settings.theme_mode = mode).await
    }

    async fn set_default_guide(&self, guide: &str) -> Result<(), AppError> {
        let guide = guide.trim().to_string();
        self.modify(|prefs| prefs.settings.default_guide = guide).await
    }

    async fn set_show_delete_confirmation(&self, show: bool) -> Result<(), AppError> {
        self.modify(|prefs| prefs.settings.show_delete_confirmation = show)
            .await
    }

    async fn set_date_format(&self, format: DateFormat) -> Result<(), AppError> {
        self.modify(|prefs| prefs.settings.date_format = format).await
    }

    async fn reset_settings(&self) -> Result<(), AppError> {
        self.modify(|prefs| prefs.settings = UserSettings::default())
            .await
    }

    fn observe_settings(&self) -> watch::Receiver<UserSettings> {
        self.settings_tx.subscribe()
    }
}
