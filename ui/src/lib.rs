//! User interface for Clipshelf.

mod keys;
mod modal;
mod properties;
mod style;
#[path = "../../app/src/config.rs"]
mod app_config;

pub use keys::{Action, KeyCombo, KeyContext, KeyRegistry, ShortcutError, Shortcuts};
pub use modal::{FocusRegistry, ModalError, ModalKind, ModalManager};
pub use properties::{parse_property_value, render_property_value, ValidationError};

use app_config::AppConfig;
use bridge::{Bridge, DatabaseInfo, PropertyDef, VideoEntry, VideoPage};
use dispatch::IdGen;
use iced::event::{self, Event};
use iced::keyboard;
use iced::subscription;
use iced::widget::{
    button, checkbox, column, container, pick_list, row, scrollable, text, text_input, Column,
};
use iced::{executor, Application, Command, Element, Length, Settings, Subscription, Theme};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use style::Palette;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};

const ERROR_DISPLAY_DURATION: Duration = Duration::from_secs(5);
const TOAST_DISPLAY_DURATION: Duration = Duration::from_secs(4);

/// Everything the application shell wires up before the window opens.
pub struct UiFlags {
    pub bridge: Bridge,
    pub shortcuts: Shortcuts,
    pub notifications: Option<mpsc::UnboundedReceiver<Value>>,
    pub config_path: PathBuf,
}

pub fn run(flags: UiFlags) -> iced::Result {
    ClipshelfUI::run(Settings::with_flags(flags))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Filename,
    Size,
    Duration,
    Date,
}

impl SortField {
    const ALL: [SortField; 4] = [
        SortField::Filename,
        SortField::Size,
        SortField::Duration,
        SortField::Date,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            SortField::Filename => "filename",
            SortField::Size => "size",
            SortField::Duration => "duration",
            SortField::Date => "date",
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SortField::Filename => "Filename",
            SortField::Size => "Size",
            SortField::Duration => "Duration",
            SortField::Date => "Date",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    LoadDatabases,
    DatabasesLoaded(Result<Vec<String>, String>),
    ShowOpenDatabase,
    OpenPathChanged(String),
    OpenUpdateToggled(bool),
    ChooseDirectory,
    DirectoryChosen(Result<Option<String>, String>),
    ConfirmOpenDatabase,
    DatabaseOpened(Result<DatabaseInfo, String>),
    CloseDatabase,
    DatabaseClosed(Result<(), String>),
    LoadVideos,
    VideosLoaded(Result<VideoPage, String>),
    PropTypesLoaded(Result<Vec<PropertyDef>, String>),
    NextPage,
    PreviousPage,
    SortChanged(SortField),
    DescendingToggled(bool),
    SearchInputChanged(String),
    PerformSearch,
    SelectVideo(VideoEntry),
    CloseVideo,
    OpenContainingFolder,
    FolderOpened(Result<(), String>),
    ShowRenameVideo,
    RenameTitleChanged(String),
    ConfirmRenameVideo,
    VideoRenamed(Result<String, String>),
    ShowDeleteVideo,
    ConfirmDeleteVideo,
    VideoDeleted(Result<(), String>),
    PropertyInputChanged(String, String),
    SaveProperties,
    PropertiesSaved(Result<Map<String, Value>, String>),
    ShowSettings,
    SettingsLogLevelChanged(String),
    SettingsBackendUrlChanged(String),
    SettingsPageSizeChanged(String),
    SaveSettings,
    CancelModal,
    Notification(Value),
    DismissToast,
    DismissError(u64),
    ClearErrors,
    KeyPressed(KeyCombo),
}

#[derive(Debug)]
enum ViewState {
    Grid,
    SelectedVideo { video: VideoEntry },
}

pub struct ClipshelfUI {
    bridge: Bridge,
    shortcuts: Shortcuts,
    notification_receiver: Option<Arc<Mutex<mpsc::UnboundedReceiver<Value>>>>,
    config_path: PathBuf,

    databases: Vec<String>,
    open_database: Option<DatabaseInfo>,
    videos: Vec<VideoEntry>,
    total_count: u64,
    page: u64,
    page_size: u64,
    sort: SortField,
    descending: bool,
    search_input: String,
    active_search: Option<String>,
    prop_types: Vec<PropertyDef>,
    loading: bool,

    state: ViewState,
    modals: ModalManager,
    focused: Option<String>,
    open_path_input: String,
    open_update: bool,
    rename_input: String,
    property_inputs: Vec<(String, String)>,
    settings_log_level: String,
    settings_backend_url: String,
    settings_page_size: String,

    errors: Vec<(u64, String)>,
    error_ids: IdGen,
    toast: Option<String>,
}

impl ClipshelfUI {
    /// Expose current state for testing purposes
    pub fn state_debug(&self) -> String {
        format!("{:?}", self.state)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn video_count(&self) -> usize {
        self.videos.len()
    }

    pub fn database_count(&self) -> usize {
        self.databases.len()
    }

    pub fn modal(&self) -> Option<ModalKind> {
        self.modals.active()
    }

    pub fn page_index(&self) -> u64 {
        self.page
    }

    pub fn search_query(&self) -> String {
        self.search_input.clone()
    }

    pub fn sort_field(&self) -> SortField {
        self.sort
    }

    pub fn open_path_input(&self) -> String {
        self.open_path_input.clone()
    }

    pub fn rename_input(&self) -> String {
        self.rename_input.clone()
    }

    pub fn settings_log_level(&self) -> String {
        self.settings_log_level.clone()
    }

    pub fn settings_backend_url(&self) -> String {
        self.settings_backend_url.clone()
    }

    pub fn toast(&self) -> Option<String> {
        self.toast.clone()
    }

    pub fn property_input(&self, name: &str) -> Option<String> {
        self.property_inputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn focus_registry(&self) -> &FocusRegistry {
        self.modals.focus()
    }

    fn selected_video(&self) -> Option<&VideoEntry> {
        match &self.state {
            ViewState::SelectedVideo { video } => Some(video),
            ViewState::Grid => None,
        }
    }

    fn push_error(&mut self, msg: impl Into<String>) -> Command<Message> {
        let msg = msg.into();
        tracing::warn!("{}", msg);
        let id = self.error_ids.next();
        self.errors.push((id, msg));
        Self::error_timeout()
    }

    fn error_timeout() -> Command<Message> {
        Command::perform(
            async {
                sleep(ERROR_DISPLAY_DURATION).await;
            },
            |_| Message::ClearErrors,
        )
    }

    fn toast_timeout() -> Command<Message> {
        Command::perform(
            async {
                sleep(TOAST_DISPLAY_DURATION).await;
            },
            |_| Message::DismissToast,
        )
    }

    fn load_videos_command(&mut self) -> Command<Message> {
        if self.open_database.is_none() {
            return Command::none();
        }
        self.loading = true;
        let bridge = self.bridge.clone();
        let (page, page_size) = (self.page, self.page_size);
        let sort = self.sort.as_str();
        let descending = self.descending;
        let search = self.active_search.clone();
        Command::perform(
            async move {
                bridge
                    .list_videos(page, page_size, sort, descending, search.as_deref())
                    .await
                    .map_err(|e| e.to_string())
            },
            Message::VideosLoaded,
        )
    }

    fn set_selected_video(&mut self, video: VideoEntry) {
        self.clear_selected_video();
        self.property_inputs = self
            .prop_types
            .iter()
            .map(|def| {
                let value = video
                    .properties
                    .get(&def.name)
                    .map(render_property_value)
                    .unwrap_or_default();
                (def.name.clone(), value)
            })
            .collect();
        for (i, def) in self.prop_types.iter().enumerate() {
            self.modals
                .focus_mut()
                .add(format!("prop-{}", def.name), 1 + i as i32);
        }
        self.state = ViewState::SelectedVideo { video };
    }

    fn clear_selected_video(&mut self) {
        let names: Vec<String> = self
            .property_inputs
            .iter()
            .map(|(name, _)| format!("prop-{}", name))
            .collect();
        for name in names {
            self.modals.focus_mut().remove(&name);
        }
        self.property_inputs.clear();
        self.focused = None;
        self.state = ViewState::Grid;
    }

    fn focus_control(&mut self, name: &str) -> Command<Message> {
        self.focused = Some(name.to_string());
        text_input::focus(text_input::Id::new(name.to_string()))
    }

    fn apply_action(&mut self, action: Action) -> Command<Message> {
        match action {
            Action::CloseModal => self.update(Message::CancelModal),
            Action::Back => {
                if self.selected_video().is_some() {
                    self.update(Message::CloseVideo)
                } else {
                    Command::none()
                }
            }
            Action::ShowOpenDatabase => self.update(Message::ShowOpenDatabase),
            Action::ShowSettings => self.update(Message::ShowSettings),
            Action::FocusSearch => self.focus_control("search"),
            Action::FocusNext => {
                let next = self
                    .modals
                    .focus()
                    .next_after(self.focused.as_deref())
                    .map(str::to_string);
                match next {
                    Some(name) => self.focus_control(&name),
                    None => Command::none(),
                }
            }
            Action::FocusPrevious => {
                let prev = self
                    .modals
                    .focus()
                    .prev_before(self.focused.as_deref())
                    .map(str::to_string);
                match prev {
                    Some(name) => self.focus_control(&name),
                    None => Command::none(),
                }
            }
            Action::NextPage => self.update(Message::NextPage),
            Action::PreviousPage => self.update(Message::PreviousPage),
            Action::Refresh => self.update(Message::LoadVideos),
            Action::RenameSelected => self.update(Message::ShowRenameVideo),
            Action::DeleteSelected => self.update(Message::ShowDeleteVideo),
        }
    }
}

impl Application for ClipshelfUI {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = UiFlags;

    fn new(flags: UiFlags) -> (Self, Command<Message>) {
        let cfg = AppConfig::load_from(Some(flags.config_path.clone()));

        let mut focus = FocusRegistry::new();
        focus.add("search", 0);

        let app = Self {
            bridge: flags.bridge,
            shortcuts: flags.shortcuts,
            notification_receiver: flags.notifications.map(|rx| Arc::new(Mutex::new(rx))),
            config_path: flags.config_path,
            databases: Vec::new(),
            open_database: None,
            videos: Vec::new(),
            total_count: 0,
            page: 0,
            page_size: cfg.page_size as u64,
            sort: SortField::Filename,
            descending: false,
            search_input: String::new(),
            active_search: None,
            prop_types: Vec::new(),
            loading: false,
            state: ViewState::Grid,
            modals: ModalManager::new(focus),
            focused: None,
            open_path_input: String::new(),
            open_update: false,
            rename_input: String::new(),
            property_inputs: Vec::new(),
            settings_log_level: cfg.log_level,
            settings_backend_url: cfg.backend_url,
            settings_page_size: cfg.page_size.to_string(),
            errors: Vec::new(),
            error_ids: IdGen::new(),
            toast: None,
        };

        (
            app,
            Command::perform(async {}, |_| Message::LoadDatabases),
        )
    }

    fn title(&self) -> String {
        match &self.open_database {
            Some(db) => format!("Clipshelf - {}", db.name),
            None => String::from("Clipshelf"),
        }
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::LoadDatabases => {
                let bridge = self.bridge.clone();
                return Command::perform(
                    async move { bridge.list_databases().await.map_err(|e| e.to_string()) },
                    Message::DatabasesLoaded,
                );
            }
            Message::DatabasesLoaded(result) => match result {
                Ok(databases) => self.databases = databases,
                Err(e) => return self.push_error(format!("Failed to list databases: {}", e)),
            },
            Message::ShowOpenDatabase => {
                if let Err(e) = self.modals.open(ModalKind::OpenDatabase) {
                    return self.push_error(e.to_string());
                }
                return self.focus_control("open-path");
            }
            Message::OpenPathChanged(path) => self.open_path_input = path,
            Message::OpenUpdateToggled(update) => self.open_update = update,
            Message::ChooseDirectory => {
                let bridge = self.bridge.clone();
                let start = if self.open_path_input.is_empty() {
                    None
                } else {
                    Some(self.open_path_input.clone())
                };
                return Command::perform(
                    async move {
                        bridge
                            .select_directory(start.as_deref())
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::DirectoryChosen,
                );
            }
            Message::DirectoryChosen(result) => match result {
                Ok(Some(path)) => self.open_path_input = path,
                Ok(None) => {}
                Err(e) => return self.push_error(format!("Directory selection failed: {}", e)),
            },
            Message::ConfirmOpenDatabase => {
                let path = self.open_path_input.trim().to_string();
                if path.is_empty() {
                    return self.push_error("Open database: path must not be empty");
                }
                self.modals.close();
                self.loading = true;
                let bridge = self.bridge.clone();
                let update = self.open_update;
                return Command::perform(
                    async move {
                        bridge
                            .open_database(&path, update)
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::DatabaseOpened,
                );
            }
            Message::DatabaseOpened(result) => match result {
                Ok(info) => {
                    tracing::info!(path = %info.path, videos = info.video_count, "database opened");
                    self.open_database = Some(info);
                    self.page = 0;
                    self.clear_selected_video();
                    let bridge = self.bridge.clone();
                    return Command::batch(vec![
                        self.load_videos_command(),
                        Command::perform(
                            async move { bridge.get_prop_types().await.map_err(|e| e.to_string()) },
                            Message::PropTypesLoaded,
                        ),
                    ]);
                }
                Err(e) => {
                    self.loading = false;
                    return self.push_error(format!("Failed to open database: {}", e));
                }
            },
            Message::CloseDatabase => {
                let bridge = self.bridge.clone();
                return Command::perform(
                    async move { bridge.close_database().await.map_err(|e| e.to_string()) },
                    Message::DatabaseClosed,
                );
            }
            Message::DatabaseClosed(result) => match result {
                Ok(()) => {
                    self.open_database = None;
                    self.videos.clear();
                    self.total_count = 0;
                    self.page = 0;
                    self.prop_types.clear();
                    self.active_search = None;
                    self.clear_selected_video();
                }
                Err(e) => return self.push_error(format!("Failed to close database: {}", e)),
            },
            Message::LoadVideos => return self.load_videos_command(),
            Message::VideosLoaded(result) => {
                self.loading = false;
                match result {
                    Ok(page) => {
                        self.videos = page.videos;
                        self.total_count = page.total_count;
                    }
                    Err(e) => return self.push_error(format!("Failed to load videos: {}", e)),
                }
            }
            Message::PropTypesLoaded(result) => match result {
                Ok(defs) => self.prop_types = defs,
                Err(e) => return self.push_error(format!("Failed to load property types: {}", e)),
            },
            Message::NextPage => {
                if (self.page + 1) * self.page_size < self.total_count {
                    self.page += 1;
                    return self.load_videos_command();
                }
            }
            Message::PreviousPage => {
                if self.page > 0 {
                    self.page -= 1;
                    return self.load_videos_command();
                }
            }
            Message::SortChanged(sort) => {
                self.sort = sort;
                self.page = 0;
                return self.load_videos_command();
            }
            Message::DescendingToggled(descending) => {
                self.descending = descending;
                self.page = 0;
                return self.load_videos_command();
            }
            Message::SearchInputChanged(query) => self.search_input = query,
            Message::PerformSearch => {
                let query = self.search_input.trim();
                self.active_search = if query.is_empty() {
                    None
                } else {
                    Some(query.to_string())
                };
                self.page = 0;
                return self.load_videos_command();
            }
            Message::SelectVideo(video) => self.set_selected_video(video),
            Message::CloseVideo => self.clear_selected_video(),
            Message::OpenContainingFolder => {
                if let Some(video) = self.selected_video() {
                    let bridge = self.bridge.clone();
                    let video_id = video.video_id;
                    return Command::perform(
                        async move {
                            bridge
                                .open_containing_folder(video_id)
                                .await
                                .map_err(|e| e.to_string())
                        },
                        Message::FolderOpened,
                    );
                }
            }
            Message::FolderOpened(result) => {
                if let Err(e) = result {
                    return self.push_error(format!("Failed to open folder: {}", e));
                }
            }
            Message::ShowRenameVideo => {
                let Some(filename) = self.selected_video().map(|v| v.filename.clone()) else {
                    return Command::none();
                };
                self.rename_input = filename;
                if let Err(e) = self.modals.open(ModalKind::RenameVideo) {
                    return self.push_error(e.to_string());
                }
                return self.focus_control("rename-title");
            }
            Message::RenameTitleChanged(title) => self.rename_input = title,
            Message::ConfirmRenameVideo => {
                let Some(video_id) = self.selected_video().map(|v| v.video_id) else {
                    return Command::none();
                };
                let title = self.rename_input.trim().to_string();
                if title.is_empty() {
                    return self.push_error("Rename: title must not be empty");
                }
                self.modals.close();
                let bridge = self.bridge.clone();
                return Command::perform(
                    async move {
                        bridge
                            .rename_video(video_id, &title)
                            .await
                            .map(|_| title)
                            .map_err(|e| e.to_string())
                    },
                    Message::VideoRenamed,
                );
            }
            Message::VideoRenamed(result) => match result {
                Ok(title) => {
                    if let ViewState::SelectedVideo { video } = &mut self.state {
                        video.filename = title;
                    }
                    self.toast = Some("Video renamed".to_string());
                    return Command::batch(vec![
                        self.load_videos_command(),
                        Self::toast_timeout(),
                    ]);
                }
                Err(e) => return self.push_error(format!("Failed to rename video: {}", e)),
            },
            Message::ShowDeleteVideo => {
                if self.selected_video().is_none() {
                    return Command::none();
                }
                if let Err(e) = self.modals.open(ModalKind::DeleteVideo) {
                    return self.push_error(e.to_string());
                }
            }
            Message::ConfirmDeleteVideo => {
                let Some(video_id) = self.selected_video().map(|v| v.video_id) else {
                    return Command::none();
                };
                self.modals.close();
                let bridge = self.bridge.clone();
                return Command::perform(
                    async move {
                        bridge
                            .delete_video(video_id)
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::VideoDeleted,
                );
            }
            Message::VideoDeleted(result) => match result {
                Ok(()) => {
                    self.clear_selected_video();
                    self.toast = Some("Video deleted".to_string());
                    return Command::batch(vec![
                        self.load_videos_command(),
                        Self::toast_timeout(),
                    ]);
                }
                Err(e) => return self.push_error(format!("Failed to delete video: {}", e)),
            },
            Message::PropertyInputChanged(name, value) => {
                if let Some(entry) = self.property_inputs.iter_mut().find(|(n, _)| *n == name) {
                    entry.1 = value;
                }
            }
            Message::SaveProperties => {
                let Some(video_id) = self.selected_video().map(|v| v.video_id) else {
                    return Command::none();
                };
                let mut properties = Map::new();
                let mut invalid = None;
                for def in &self.prop_types {
                    let raw = self.property_input(&def.name).unwrap_or_default();
                    match parse_property_value(def, &raw) {
                        Ok(value) => {
                            properties.insert(def.name.clone(), value);
                        }
                        Err(e) => {
                            invalid = Some(e);
                            break;
                        }
                    }
                }
                // Local validation failure, surfaced without a backend
                // round trip.
                if let Some(e) = invalid {
                    return self.push_error(e.to_string());
                }
                let bridge = self.bridge.clone();
                return Command::perform(
                    async move {
                        bridge
                            .set_video_properties(video_id, properties.clone())
                            .await
                            .map(|_| properties)
                            .map_err(|e| e.to_string())
                    },
                    Message::PropertiesSaved,
                );
            }
            Message::PropertiesSaved(result) => match result {
                Ok(properties) => {
                    if let ViewState::SelectedVideo { video } = &mut self.state {
                        video.properties = properties
                            .into_iter()
                            .filter(|(_, v)| !v.is_null())
                            .collect();
                    }
                    self.toast = Some("Properties saved".to_string());
                    return Command::batch(vec![
                        self.load_videos_command(),
                        Self::toast_timeout(),
                    ]);
                }
                Err(e) => return self.push_error(format!("Failed to save properties: {}", e)),
            },
            Message::ShowSettings => {
                let cfg = AppConfig::load_from(Some(self.config_path.clone()));
                self.settings_log_level = cfg.log_level;
                self.settings_backend_url = cfg.backend_url;
                self.settings_page_size = cfg.page_size.to_string();
                if let Err(e) = self.modals.open(ModalKind::Settings) {
                    return self.push_error(e.to_string());
                }
            }
            Message::SettingsLogLevelChanged(level) => self.settings_log_level = level,
            Message::SettingsBackendUrlChanged(url) => self.settings_backend_url = url,
            Message::SettingsPageSizeChanged(size) => self.settings_page_size = size,
            Message::SaveSettings => {
                let page_size = match self.settings_page_size.trim().parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        return self.push_error(format!(
                            "Settings: '{}' is not a valid page size",
                            self.settings_page_size
                        ))
                    }
                };
                let cfg = AppConfig {
                    log_level: self.settings_log_level.clone(),
                    backend_url: self.settings_backend_url.clone(),
                    page_size,
                };
                if let Err(e) = cfg.save_to(Some(self.config_path.clone())) {
                    return self.push_error(format!("Failed to save settings: {}", e));
                }
                self.page_size = page_size as u64;
                self.modals.close();
            }
            Message::CancelModal => {
                self.modals.close();
            }
            Message::Notification(payload) => {
                // Logging happens at the registry subscriber; here the
                // payload only drives the toast.
                let event = payload.get("event").and_then(Value::as_str);
                self.toast = Some(match event {
                    Some(name) => name.replace('_', " "),
                    None => payload.to_string(),
                });
                let mut commands = vec![Self::toast_timeout()];
                if event == Some("database_changed") && self.open_database.is_some() {
                    commands.push(self.load_videos_command());
                }
                return Command::batch(commands);
            }
            Message::DismissToast => self.toast = None,
            Message::DismissError(id) => self.errors.retain(|(eid, _)| *eid != id),
            Message::ClearErrors => self.errors.clear(),
            Message::KeyPressed(combo) => {
                let ctx = KeyContext {
                    combo,
                    modal_open: self.modals.is_open(),
                };
                if let Some(action) = self.shortcuts.dispatch(&ctx) {
                    return self.apply_action(action);
                }
            }
        }
        Command::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subs: Vec<Subscription<Message>> = Vec::new();

        if let Some(notification_rx) = &self.notification_receiver {
            let notification_rx = notification_rx.clone();
            subs.push(subscription::unfold(
                "notifications",
                notification_rx,
                |rx| async move {
                    let msg = {
                        let mut lock = rx.lock().await;
                        match lock.recv().await {
                            Some(payload) => Message::Notification(payload),
                            None => futures::future::pending().await,
                        }
                    };
                    (msg, rx)
                },
            ));
        }

        subs.push(event::listen_with(|event, status| {
            if status == event::Status::Captured {
                return None;
            }
            match event {
                Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) => {
                    Some(Message::KeyPressed(KeyCombo::from_event(key, modifiers)))
                }
                _ => None,
            }
        }));

        Subscription::batch(subs)
    }

    fn view(&self) -> Element<Message> {
        let mut header = row![
            text("Clipshelf").size(24),
            button("Open Database…")
                .style(style::button_primary())
                .on_press(Message::ShowOpenDatabase),
            button("Settings")
                .style(style::button_primary())
                .on_press(Message::ShowSettings),
        ];

        if let Some(db) = &self.open_database {
            header = header
                .push(text(format!("{} ({} videos)", db.name, db.video_count)))
                .push(
                    button("Close")
                        .style(style::button_danger())
                        .on_press(Message::CloseDatabase),
                )
                .push(
                    text_input("Search", &self.search_input)
                        .id(text_input::Id::new("search"))
                        .style(style::text_input_basic())
                        .on_input(Message::SearchInputChanged)
                        .on_submit(Message::PerformSearch),
                )
                .push(
                    button("Search")
                        .style(style::button_primary())
                        .on_press(Message::PerformSearch),
                )
                .push(pick_list(
                    &SortField::ALL[..],
                    Some(self.sort),
                    Message::SortChanged,
                ))
                .push(
                    checkbox("Desc", self.descending)
                        .style(style::checkbox_primary())
                        .on_toggle(Message::DescendingToggled),
                );
        }

        header = header
            .spacing(Palette::SPACING)
            .align_items(iced::Alignment::Center);

        let error_banner = if self.errors.is_empty() {
            None
        } else {
            let mut list = Column::new().spacing(5);
            for (id, msg) in &self.errors {
                let entry = row![
                    text(msg.clone()).size(16),
                    button("Dismiss")
                        .style(style::button_primary())
                        .on_press(Message::DismissError(*id))
                ]
                .spacing(10)
                .align_items(iced::Alignment::Center);
                list = list.push(entry);
            }
            Some(
                container(list)
                    .style(style::error_banner())
                    .padding(10)
                    .width(Length::Fill),
            )
        };

        let toast = self.toast.as_ref().map(|msg| {
            row![
                container(text(msg.clone()).size(16))
                    .style(style::toast())
                    .padding(10),
                button("x")
                    .style(style::button_primary())
                    .on_press(Message::DismissToast)
            ]
            .spacing(5)
        });

        let content: Element<Message> = match &self.state {
            ViewState::Grid => {
                if self.open_database.is_none() {
                    column![
                        text("No database open.").size(18),
                        text("Open a video database to browse your library.").size(14),
                    ]
                    .spacing(10)
                    .into()
                } else if self.loading {
                    column![text("Loading videos...").size(16)].into()
                } else {
                    let mut list = Column::new().spacing(5);
                    for video in &self.videos {
                        let label = format!(
                            "{}  ·  {}  ·  {}  ·  {}x{}",
                            video.filename,
                            format_size(video.file_size),
                            format_duration(video.duration),
                            video.width,
                            video.height,
                        );
                        list = list.push(
                            button(text(label))
                                .style(style::button_primary())
                                .width(Length::Fill)
                                .on_press(Message::SelectVideo(video.clone())),
                        );
                    }
                    let total_pages = self.total_count.div_ceil(self.page_size).max(1);
                    let pager = row![
                        button("Prev")
                            .style(style::button_primary())
                            .on_press(Message::PreviousPage),
                        text(format!("Page {} of {}", self.page + 1, total_pages)),
                        button("Next")
                            .style(style::button_primary())
                            .on_press(Message::NextPage),
                        text(format!("{} videos", self.total_count)),
                    ]
                    .spacing(10)
                    .align_items(iced::Alignment::Center);
                    column![scrollable(list).height(Length::Fill), pager]
                        .spacing(10)
                        .into()
                }
            }
            ViewState::SelectedVideo { video } => {
                let details = column![
                    text(&video.filename).size(20),
                    text(format!(
                        "{}  ·  {}  ·  {}x{}",
                        format_size(video.file_size),
                        format_duration(video.duration),
                        video.width,
                        video.height,
                    ))
                    .size(14),
                    text(format_date(video.date.as_deref())).size(14),
                ]
                .spacing(5);

                let mut form = Column::new().spacing(8);
                for def in &self.prop_types {
                    let value = self.property_input(&def.name).unwrap_or_default();
                    let name = def.name.clone();
                    form = form.push(
                        row![
                            text(def.name.clone()).width(Length::Fixed(140.0)),
                            text_input("", &value)
                                .id(text_input::Id::new(format!("prop-{}", def.name)))
                                .style(style::text_input_basic())
                                .on_input(move |v| Message::PropertyInputChanged(name.clone(), v)),
                        ]
                        .spacing(10)
                        .align_items(iced::Alignment::Center),
                    );
                }

                let actions = row![
                    button("Save Properties")
                        .style(style::button_primary())
                        .on_press(Message::SaveProperties),
                    button("Rename")
                        .style(style::button_primary())
                        .on_press(Message::ShowRenameVideo),
                    button("Open Folder")
                        .style(style::button_primary())
                        .on_press(Message::OpenContainingFolder),
                    button("Delete")
                        .style(style::button_danger())
                        .on_press(Message::ShowDeleteVideo),
                    button("Back")
                        .style(style::button_primary())
                        .on_press(Message::CloseVideo),
                ]
                .spacing(10);

                container(column![details, form, actions].spacing(Palette::SPACING))
                    .style(style::card())
                    .padding(16)
                    .width(Length::Fill)
                    .into()
            }
        };

        let dialog: Option<Column<Message>> = match self.modals.active() {
            Some(ModalKind::OpenDatabase) => {
                let mut known = Column::new().spacing(5);
                for db in &self.databases {
                    known = known.push(
                        button(text(db.clone()))
                            .style(style::button_primary())
                            .on_press(Message::OpenPathChanged(db.clone())),
                    );
                }
                Some(
                    column![
                        text("Open database").size(16),
                        known,
                        text_input("Path to database", &self.open_path_input)
                            .id(text_input::Id::new("open-path"))
                            .style(style::text_input_basic())
                            .on_input(Message::OpenPathChanged)
                            .on_submit(Message::ConfirmOpenDatabase),
                        checkbox("Re-scan files on open", self.open_update)
                            .style(style::checkbox_primary())
                            .on_toggle(Message::OpenUpdateToggled),
                        row![
                            button("Browse…")
                                .style(style::button_primary())
                                .on_press(Message::ChooseDirectory),
                            button("Open")
                                .style(style::button_primary())
                                .on_press(Message::ConfirmOpenDatabase),
                            button("Cancel")
                                .style(style::button_primary())
                                .on_press(Message::CancelModal)
                        ]
                        .spacing(10)
                    ]
                    .spacing(10),
                )
            }
            Some(ModalKind::RenameVideo) => Some(
                column![
                    text_input("New title", &self.rename_input)
                        .id(text_input::Id::new("rename-title"))
                        .style(style::text_input_basic())
                        .on_input(Message::RenameTitleChanged)
                        .on_submit(Message::ConfirmRenameVideo),
                    row![
                        button("Rename")
                            .style(style::button_primary())
                            .on_press(Message::ConfirmRenameVideo),
                        button("Cancel")
                            .style(style::button_primary())
                            .on_press(Message::CancelModal)
                    ]
                    .spacing(10)
                ]
                .spacing(10),
            ),
            Some(ModalKind::DeleteVideo) => Some(
                column![
                    text("Delete this video from the library?").size(16),
                    row![
                        button("Delete")
                            .style(style::button_danger())
                            .on_press(Message::ConfirmDeleteVideo),
                        button("Cancel")
                            .style(style::button_primary())
                            .on_press(Message::CancelModal)
                    ]
                    .spacing(10)
                ]
                .spacing(10),
            ),
            Some(ModalKind::Settings) => Some(
                column![
                    text("Settings").size(16),
                    text_input("Log level", &self.settings_log_level)
                        .style(style::text_input_basic())
                        .on_input(Message::SettingsLogLevelChanged),
                    text_input("Backend URL", &self.settings_backend_url)
                        .style(style::text_input_basic())
                        .on_input(Message::SettingsBackendUrlChanged),
                    text_input("Page size", &self.settings_page_size)
                        .style(style::text_input_basic())
                        .on_input(Message::SettingsPageSizeChanged),
                    row![
                        button("Save")
                            .style(style::button_primary())
                            .on_press(Message::SaveSettings),
                        button("Cancel")
                            .style(style::button_primary())
                            .on_press(Message::CancelModal)
                    ]
                    .spacing(10)
                ]
                .spacing(10),
            ),
            None => None,
        };

        let mut screen = Column::new().spacing(Palette::SPACING).push(header);
        if let Some(banner) = error_banner {
            screen = screen.push(banner);
        }
        if let Some(toast) = toast {
            screen = screen.push(toast);
        }
        screen = screen.push(content);
        if let Some(dialog) = dialog {
            screen = screen.push(container(dialog).style(style::card()).padding(16));
        }

        container(screen)
            .padding(16)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes >= KIB * KIB * KIB {
        format!("{:.1} GiB", bytes / (KIB * KIB * KIB))
    } else if bytes >= KIB * KIB {
        format!("{:.1} MiB", bytes / (KIB * KIB))
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes / KIB)
    } else {
        format!("{} B", bytes as u64)
    }
}

/// Timestamps arrive as `2023-06-01 10:12:00`; unparseable ones pass through.
fn format_date(date: Option<&str>) -> String {
    let Some(raw) = date else {
        return "No date".to_string();
    };
    match chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        Ok(dt) => dt.format("%e %b %Y %H:%M").to_string().trim().to_string(),
        Err(_) => raw.to_string(),
    }
}

fn format_duration(seconds: f64) -> String {
    let total = seconds.round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_render_human_readable() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(73400320), "70.0 MiB");
        assert_eq!(format_size(3_221_225_472), "3.0 GiB");
    }

    #[test]
    fn durations_render_clock_style() {
        assert_eq!(format_duration(59.4), "0:59");
        assert_eq!(format_duration(61.0), "1:01");
        assert_eq!(format_duration(3725.0), "1:02:05");
    }

    #[test]
    fn dates_render_human_readable() {
        assert_eq!(format_date(Some("2023-06-01 10:12:00")), "1 Jun 2023 10:12");
        assert_eq!(format_date(Some("last tuesday")), "last tuesday");
        assert_eq!(format_date(None), "No date");
    }

    #[test]
    fn sort_fields_map_to_wire_names() {
        assert_eq!(SortField::Filename.as_str(), "filename");
        assert_eq!(SortField::Date.as_str(), "date");
    }
}
