pub mod registry;
pub mod settings;

pub use registry::WidgetRegistry;
pub use settings::{
    apply_patch, load_settings_file, normalize_settings, save_settings_file, SettingsError,
    SettingsPatch,
};

use crate::layout;
use screen::{
    LayoutEntry, PropsKindMismatch, ScreenDocument, Settings, ShapeError, Signal, WidgetInstance,
    WidgetKind, WidgetProps,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("widget `{0}` not found")]
    UnknownWidget(String),
    #[error(transparent)]
    KindMismatch(#[from] PropsKindMismatch),
}

/// Everything the store holds, as one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub settings: Settings,
    pub widgets: Vec<WidgetInstance>,
    pub layout: Vec<LayoutEntry>,
}

impl Snapshot {
    pub fn from_document(document: ScreenDocument, settings: Settings) -> Self {
        Self {
            settings,
            widgets: document.components,
            layout: document.layout,
        }
    }

    pub fn document(&self) -> ScreenDocument {
        ScreenDocument {
            layout: self.layout.clone(),
            components: self.widgets.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Snapshot)>;

/// The single mutation authority for settings, widgets and layout.
///
/// Every mutating method applies its change completely and only then calls
/// the subscribers, in subscription order, with the resulting snapshot.
/// Failed mutations leave the store untouched and notify nobody.
pub struct ConfigStore {
    settings: Settings,
    default_settings: Settings,
    registry: WidgetRegistry,
    layout: Vec<LayoutEntry>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::with_default_settings(Settings::default())
    }

    /// A store whose reset target is `defaults` rather than the built-in
    /// settings, populated with the default screen.
    pub fn with_default_settings(defaults: Settings) -> Self {
        let mut store = Self {
            settings: defaults.clone(),
            default_settings: defaults,
            registry: WidgetRegistry::new(),
            layout: Vec::new(),
            subscribers: Vec::new(),
            next_subscription: 1,
        };
        store.populate_default_screen();
        store
    }

    fn populate_default_screen(&mut self) {
        for kind in WidgetKind::ALL {
            let id = self.registry.add(kind);
            let placement = layout::default_placement(kind, &self.layout);
            self.layout.push(LayoutEntry::new(id, placement));
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn default_settings(&self) -> &Settings {
        &self.default_settings
    }

    pub fn widgets(&self) -> &[WidgetInstance] {
        self.registry.widgets()
    }

    pub fn widget(&self, id: &str) -> Option<&WidgetInstance> {
        self.registry.get(id)
    }

    pub fn layout(&self) -> &[LayoutEntry] {
        &self.layout
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            settings: self.settings.clone(),
            widgets: self.registry.widgets().to_vec(),
            layout: self.layout.clone(),
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Snapshot) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        before != self.subscribers.len()
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, callback) in &mut self.subscribers {
            callback(&snapshot);
        }
    }

    pub fn add_widget(&mut self, kind: WidgetKind) -> String {
        let id = self.registry.add(kind);
        let placement = layout::default_placement(kind, &self.layout);
        self.layout.push(LayoutEntry::new(id.clone(), placement));
        log::debug!("added {kind:?} widget `{id}` at ({}, {})", placement.x, placement.y);
        self.notify();
        id
    }

    /// Removes the widget and, in the same step, every layout entry that
    /// points at it.
    pub fn remove_widget(&mut self, id: &str) -> Result<(), StoreError> {
        self.registry.remove(id)?;
        let dropped = screen::remove_widget_layout(&mut self.layout, id);
        log::debug!("removed widget `{id}` and {dropped} layout entries");
        self.notify();
        Ok(())
    }

    pub fn update_widget_props(&mut self, id: &str, props: WidgetProps) -> Result<(), StoreError> {
        self.registry.update_props(id, props)?;
        self.notify();
        Ok(())
    }

    /// Takes the positions reported by the grid after a drag or resize.
    pub fn apply_layout_change(&mut self, entries: &[LayoutEntry]) {
        self.layout = layout::reconcile(entries, self.registry.widgets());
        self.notify();
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        let next = apply_patch(&self.settings, patch);
        if next == self.settings {
            return;
        }
        self.settings = next;
        self.notify();
    }

    pub fn apply_settings_json(&mut self, json: &str) -> Result<(), SettingsError> {
        let patch = SettingsPatch::from_json(json)?;
        self.update_settings(patch);
        Ok(())
    }

    pub fn toggle_signal(&mut self, signal: Signal) {
        if !self.settings.selected_signals.remove(&signal) {
            self.settings.selected_signals.insert(signal);
        }
        self.notify();
    }

    pub fn reset_settings(&mut self) {
        self.settings = self.default_settings.clone();
        self.notify();
    }

    /// Default settings plus a fresh default widget set. New ids are issued;
    /// ids of the discarded widgets stay retired.
    pub fn reset_screen(&mut self) {
        self.settings = self.default_settings.clone();
        self.registry.replace_all(Vec::new());
        self.layout.clear();
        self.populate_default_screen();
        log::info!("screen reset to defaults");
        self.notify();
    }

    /// Replaces settings, widgets and layout in one step.
    ///
    /// Fails without touching anything if two widgets share an id. Layout
    /// entries for unknown widgets are dropped and widgets without an entry
    /// get a default placement. Settings are normalized on the way in.
    pub fn replace_all(&mut self, snapshot: Snapshot) -> Result<(), ShapeError> {
        if let Some(id) = screen::duplicate_widget_id(&snapshot.widgets) {
            return Err(ShapeError::DuplicateWidgetId(id.to_string()));
        }
        let layout = layout::reconcile(&snapshot.layout, &snapshot.widgets);
        self.registry.replace_all(snapshot.widgets);
        self.settings = normalize_settings(snapshot.settings);
        self.layout = layout;
        log::info!("loaded screen with {} widgets", self.registry.len());
        self.notify();
        Ok(())
    }

    /// Applies a loaded screen document, keeping the current settings.
    pub fn apply_document(&mut self, document: ScreenDocument) -> Result<(), ShapeError> {
        let snapshot = Snapshot::from_document(document, self.settings.clone());
        self.replace_all(snapshot)
    }
}
