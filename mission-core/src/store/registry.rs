use screen::{WidgetInstance, WidgetKind, WidgetProps};
use std::collections::HashSet;

use super::StoreError;

/// Live widgets plus every id this registry has ever handed out or seen.
/// An id is never issued twice, even after the widget is gone.
#[derive(Debug)]
pub struct WidgetRegistry {
    widgets: Vec<WidgetInstance>,
    issued: HashSet<String>,
    next_sequence: u64,
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self {
            widgets: Vec::new(),
            issued: HashSet::new(),
            next_sequence: 1,
        }
    }

    pub fn widgets(&self) -> &[WidgetInstance] {
        &self.widgets
    }

    pub fn get(&self, id: &str) -> Option<&WidgetInstance> {
        self.widgets.iter().find(|w| w.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    fn issue_id(&mut self, kind: WidgetKind) -> String {
        loop {
            let id = format!("{}-{}", kind.id_prefix(), self.next_sequence);
            self.next_sequence += 1;
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    pub fn add(&mut self, kind: WidgetKind) -> String {
        let id = self.issue_id(kind);
        self.widgets
            .push(WidgetInstance::with_default_props(id.clone(), kind));
        id
    }

    pub fn remove(&mut self, id: &str) -> Result<WidgetInstance, StoreError> {
        let index = self
            .widgets
            .iter()
            .position(|w| w.id() == id)
            .ok_or_else(|| StoreError::UnknownWidget(id.to_string()))?;
        Ok(self.widgets.remove(index))
    }

    pub fn update_props(&mut self, id: &str, props: WidgetProps) -> Result<(), StoreError> {
        let widget = self
            .widgets
            .iter_mut()
            .find(|w| w.id() == id)
            .ok_or_else(|| StoreError::UnknownWidget(id.to_string()))?;
        widget.replace_props(props)?;
        Ok(())
    }

    /// Swaps the whole widget set. Incoming ids are remembered so later
    /// `add` calls cannot collide with them.
    pub fn replace_all(&mut self, widgets: Vec<WidgetInstance>) {
        for widget in &widgets {
            self.issued.insert(widget.id().to_string());
        }
        self.widgets = widgets;
    }
}
