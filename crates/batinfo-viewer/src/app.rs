//! Application state and input handling

use batinfo_config::{AppConfig, DeviceCatalog, Language, OverrideStore, UserOverrides};
use batinfo_estimate::{
    BatteryReport, EditOutcome, OverrideEditor, OverrideField, ReportInputs, RowAction, Strings,
};
use batinfo_hal::{PowerEvent, PowerSnapshot, PowerSource, PowerWatcher};
use crossterm::event::KeyCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Modal dialog on top of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    None,
    /// Numeric input for an override
    Input(OverrideField),
    /// Rejected input, offering re-entry
    Error(OverrideField),
}

/// Application state
pub struct App {
    /// Configuration
    config: AppConfig,

    /// Device catalog
    catalog: DeviceCatalog,

    /// Resolved model identifier
    model: Option<String>,

    /// Latest power state
    snapshot: PowerSnapshot,

    /// Stored user overrides
    overrides: UserOverrides,
    store: OverrideStore,

    /// Power state subscription
    watcher: PowerWatcher,

    capacity_editor: OverrideEditor,
    health_editor: OverrideEditor,

    /// Selected row, counted across all sections
    pub selected: usize,

    /// Open dialog
    pub dialog: Dialog,

    /// Status message
    pub status: String,

    /// Should quit
    pub should_quit: bool,
}

impl App {
    /// Create the application and start watching the power source
    pub fn new(
        config: AppConfig,
        catalog: DeviceCatalog,
        model: Option<String>,
        source: Arc<dyn PowerSource>,
    ) -> Self {
        let store = OverrideStore::new(config.overrides_path());
        let overrides = store.load().unwrap_or_else(|e| {
            warn!("Failed to read overrides from {}: {}", store.path().display(), e);
            UserOverrides::default()
        });

        let mut watcher = PowerWatcher::new(
            source,
            Duration::from_millis(config.refresh_interval_ms),
        );
        let snapshot = watcher.start().unwrap_or_else(|e| {
            warn!("Failed to read power state: {}", e);
            PowerSnapshot::default()
        });

        let capacity_editor = OverrideEditor::new(
            OverrideField::MeasuredCapacity,
            overrides.measured_capacity.clone(),
        );
        let health_editor =
            OverrideEditor::new(OverrideField::HealthPercent, overrides.health_percent.clone());

        let status = match &model {
            Some(model) if catalog.resolve(Some(model)).is_some() => model.clone(),
            Some(model) => format!("{} (not in catalog)", model),
            None => "Unknown device".to_string(),
        };

        Self {
            config,
            catalog,
            model,
            snapshot,
            overrides,
            store,
            watcher,
            capacity_editor,
            health_editor,
            selected: 0,
            dialog: Dialog::None,
            status,
            should_quit: false,
        }
    }

    pub fn strings(&self) -> &'static Strings {
        Strings::for_language(self.config.language)
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn overrides(&self) -> &UserOverrides {
        &self.overrides
    }

    /// Design capacity of the current device, or the localized placeholder
    pub fn design_capacity(&self) -> &str {
        self.catalog
            .resolve(self.model())
            .map(|spec| spec.battery_capacity.as_str())
            .unwrap_or(self.strings().not_available)
    }

    /// Build the report from the current state
    pub fn report(&self) -> BatteryReport {
        BatteryReport::build(&ReportInputs {
            model: self.model(),
            spec: self.catalog.resolve(self.model()),
            snapshot: &self.snapshot,
            overrides: &self.overrides,
            language: self.config.language,
        })
    }

    pub fn editor(&self, field: OverrideField) -> &OverrideEditor {
        match field {
            OverrideField::MeasuredCapacity => &self.capacity_editor,
            OverrideField::HealthPercent => &self.health_editor,
        }
    }

    fn editor_mut(&mut self, field: OverrideField) -> &mut OverrideEditor {
        match field {
            OverrideField::MeasuredCapacity => &mut self.capacity_editor,
            OverrideField::HealthPercent => &mut self.health_editor,
        }
    }

    /// Apply queued power events
    pub fn on_tick(&mut self) {
        for event in self.watcher.drain() {
            self.apply_power_event(event);
        }
    }

    fn apply_power_event(&mut self, event: PowerEvent) {
        debug!("Applying {:?}", event);
        event.apply(&mut self.snapshot);
    }

    /// Handle input
    pub fn handle_input(&mut self, key: KeyCode) {
        match self.dialog {
            Dialog::None => self.handle_list_input(key),
            Dialog::Input(field) => self.handle_dialog_input(field, key),
            Dialog::Error(field) => self.handle_error_input(field, key),
        }
    }

    /// Handle list input
    fn handle_list_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => self.select_prev(),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => self.select_next(),
            KeyCode::Enter | KeyCode::Char('a') => self.activate_selected(),
            KeyCode::Char('l') | KeyCode::Char('L') => self.toggle_language(),
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    /// Handle input dialog keys
    fn handle_dialog_input(&mut self, field: OverrideField, key: KeyCode) {
        match key {
            KeyCode::Char(c) => {
                self.editor_mut(field).push_char(c);
            }
            KeyCode::Backspace => self.editor_mut(field).pop_char(),
            KeyCode::Enter => self.submit(field),
            KeyCode::Esc => {
                self.editor_mut(field).cancel();
                self.dialog = Dialog::None;
            }
            _ => {}
        }
    }

    /// Handle error dialog keys
    fn handle_error_input(&mut self, field: OverrideField, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Char('r') => {
                self.editor_mut(field).acknowledge_error();
                self.dialog = Dialog::Input(field);
            }
            KeyCode::Esc | KeyCode::Char('c') => {
                self.editor_mut(field).dismiss_error();
                self.dialog = Dialog::None;
            }
            _ => {}
        }
    }

    fn row_count(&self) -> usize {
        self.report().rows().count()
    }

    fn select_prev(&mut self) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        self.selected = if self.selected == 0 {
            count - 1
        } else {
            self.selected - 1
        };
    }

    fn select_next(&mut self) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        self.selected = if self.selected + 1 >= count {
            0
        } else {
            self.selected + 1
        };
    }

    fn activate_selected(&mut self) {
        let action = self.report().rows().nth(self.selected).map(|row| row.action);

        match action {
            Some(RowAction::Edit(field)) => {
                self.editor_mut(field).begin_edit();
                self.dialog = Dialog::Input(field);
            }
            Some(RowAction::Placeholder) => {
                self.status = "Detailed report is not available yet".to_string();
            }
            _ => {}
        }
    }

    fn submit(&mut self, field: OverrideField) {
        match self.editor_mut(field).submit() {
            EditOutcome::Committed(value) => {
                self.persist(field, &value);
                self.dialog = Dialog::None;
            }
            EditOutcome::Rejected { truncated } => {
                // The truncated value is kept even though the user is asked again
                self.persist(field, &truncated);
                self.dialog = Dialog::Error(field);
            }
            EditOutcome::Ignored => {}
        }
    }

    /// Store an override and refresh the in-memory copy
    fn persist(&mut self, field: OverrideField, value: &str) {
        let key = field.storage_key();

        match self.store.set_value(key, value) {
            Ok(overrides) => {
                info!("Saved {} = {:?}", key, value);
                self.overrides = overrides;
                self.status = "Saved".to_string();
            }
            Err(e) => {
                warn!("Failed to save {}: {}", key, e);
                self.overrides.set(key, value);
                self.status = format!("Error: {}", e);
            }
        }
    }

    fn toggle_language(&mut self) {
        self.config.language = match self.config.language {
            Language::En => Language::ZhCn,
            Language::ZhCn => Language::En,
        };
    }
}
