//! Form state: identifier slots and the device purpose classifier.
//!
//! A [`FormState`] is owned by one form instance and changes only through
//! the transitions defined here. Visibility and the `required` flag of an
//! input are derived from the slot mode, so a slot can never show both
//! of its inputs at once.

use certgate_core::models::device::DevicePurpose;
use certgate_core::models::identifier::{IdentifierKind, SlotMode};
use certgate_core::models::request::CertificateRequest;
use certgate_core::models::validation::{TopLevelError, ValidationErrors};
use tracing::debug;
use uuid::Uuid;

use crate::config::FormConfig;
use crate::error::FormError;
use crate::validator;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Input {
    value: String,
    error: Option<String>,
}

/// One {unset | FQDN | IP} choice with an input and error per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSlot {
    mode: SlotMode,
    fqdn: Input,
    ip: Input,
}

impl IdentifierSlot {
    pub fn mode(&self) -> SlotMode {
        self.mode
    }

    /// Switch the active input.
    ///
    /// Selecting a kind empties the other input and its error; `Unset`
    /// empties both. Re-selecting the current mode changes nothing.
    pub fn set_mode(&mut self, mode: SlotMode) {
        if self.mode == mode {
            return;
        }
        match mode {
            SlotMode::Unset => {
                self.fqdn = Input::default();
                self.ip = Input::default();
            }
            SlotMode::Fqdn => {
                self.ip = Input::default();
                self.fqdn.error = None;
            }
            SlotMode::Ip => {
                self.fqdn = Input::default();
                self.ip.error = None;
            }
        }
        self.mode = mode;
    }

    /// Checkbox semantics: checking selects `kind`, unchecking the
    /// active kind returns the slot to `Unset`.
    pub fn toggle(&mut self, kind: IdentifierKind, checked: bool) {
        if checked {
            self.set_mode(kind.into());
        } else if self.mode.kind() == Some(kind) {
            self.set_mode(SlotMode::Unset);
        }
    }

    /// Value of the active input, if any.
    pub fn value(&self) -> Option<&str> {
        self.mode.kind().map(|kind| self.input(kind).value.as_str())
    }

    pub fn input_value(&self, kind: IdentifierKind) -> &str {
        &self.input(kind).value
    }

    pub fn error(&self, kind: IdentifierKind) -> Option<&str> {
        self.input(kind).error.as_deref()
    }

    pub fn is_visible(&self, kind: IdentifierKind) -> bool {
        self.mode.kind() == Some(kind)
    }

    pub fn is_required(&self, kind: IdentifierKind) -> bool {
        self.is_visible(kind)
    }

    fn input(&self, kind: IdentifierKind) -> &Input {
        match kind {
            IdentifierKind::Fqdn => &self.fqdn,
            IdentifierKind::Ip => &self.ip,
        }
    }

    fn input_mut(&mut self, kind: IdentifierKind) -> &mut Input {
        match kind {
            IdentifierKind::Fqdn => &mut self.fqdn,
            IdentifierKind::Ip => &mut self.ip,
        }
    }

    /// Returns `false` when `kind` is not the active input.
    fn set_value(&mut self, kind: IdentifierKind, value: &str) -> bool {
        if !self.is_visible(kind) {
            return false;
        }
        let input = self.input_mut(kind);
        input.value = value.to_string();
        input.error = None;
        true
    }

    fn set_error(&mut self, kind: IdentifierKind, error: Option<String>) {
        self.input_mut(kind).error = error;
    }
}

/// Single-choice device class selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurposeClassifier {
    selected: Option<DevicePurpose>,
    error: Option<String>,
}

impl PurposeClassifier {
    pub fn selected(&self) -> Option<DevicePurpose> {
        self.selected
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Selecting one class deselects the others.
    pub fn select(&mut self, device: Option<DevicePurpose>) {
        self.selected = device;
        if device.is_some() {
            self.error = None;
        }
    }

    pub fn toggle(&mut self, device: DevicePurpose, checked: bool) {
        if checked {
            self.select(Some(device));
        } else if self.selected == Some(device) {
            self.select(None);
        }
    }

    pub fn is_checked(&self, device: DevicePurpose) -> bool {
        self.selected == Some(device)
    }
}

/// The whole state of one certificate request form.
#[derive(Debug, Clone)]
pub struct FormState {
    id: Uuid,
    config: FormConfig,
    slots: Vec<IdentifierSlot>,
    classifier: Option<PurposeClassifier>,
    top_level: Vec<TopLevelError>,
    visible: bool,
}

impl FormState {
    pub fn new(config: FormConfig) -> Self {
        let classifier = config
            .has_device_classifier()
            .then(PurposeClassifier::default);
        Self {
            id: Uuid::new_v4(),
            slots: vec![IdentifierSlot::default(); config.slot_count],
            classifier,
            top_level: Vec::new(),
            visible: true,
            config,
        }
    }

    /// Identifies this form instance in logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn slots(&self) -> &[IdentifierSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&IdentifierSlot> {
        self.slots.get(index)
    }

    pub fn classifier(&self) -> Option<&PurposeClassifier> {
        self.classifier.as_ref()
    }

    pub fn top_level_errors(&self) -> &[TopLevelError] {
        &self.top_level
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_mode(&mut self, index: usize, mode: SlotMode) -> Result<(), FormError> {
        self.slot_mut(index)?.set_mode(mode);
        debug!(form_id = %self.id, slot = index, ?mode, "identifier slot mode changed");
        Ok(())
    }

    pub fn toggle(
        &mut self,
        index: usize,
        kind: IdentifierKind,
        checked: bool,
    ) -> Result<(), FormError> {
        self.slot_mut(index)?.toggle(kind, checked);
        Ok(())
    }

    /// Type into the active input of a slot.
    pub fn set_value(
        &mut self,
        index: usize,
        kind: IdentifierKind,
        value: &str,
    ) -> Result<(), FormError> {
        if self.slot_mut(index)?.set_value(kind, value) {
            Ok(())
        } else {
            Err(FormError::InactiveInput { slot: index, kind })
        }
    }

    pub fn select_device(&mut self, device: Option<DevicePurpose>) -> Result<(), FormError> {
        let classifier = self.classifier.as_mut().ok_or(FormError::NoClassifier)?;
        classifier.select(device);
        if device.is_some() {
            self.top_level.retain(|e| *e != TopLevelError::NoDevicePurpose);
        }
        Ok(())
    }

    pub fn toggle_device(&mut self, device: DevicePurpose, checked: bool) -> Result<(), FormError> {
        let classifier = self.classifier.as_mut().ok_or(FormError::NoClassifier)?;
        classifier.toggle(device, checked);
        if classifier.selected().is_some() {
            self.top_level.retain(|e| *e != TopLevelError::NoDevicePurpose);
        }
        Ok(())
    }

    /// Page-load reset: every slot unset, no device class, no errors.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.set_mode(SlotMode::Unset);
        }
        if let Some(classifier) = &mut self.classifier {
            *classifier = PurposeClassifier::default();
        }
        self.top_level.clear();
        self.visible = true;
    }

    /// Validate the current state and attach the resulting error text.
    ///
    /// Slot modes and values are never touched.
    pub fn validate(&mut self) -> Result<CertificateRequest, ValidationErrors> {
        let result = validator::validate(&self.slots, self.classifier.as_ref(), &self.config);
        let errors = result.as_ref().err().cloned().unwrap_or_default();
        self.attach_errors(&errors);
        result
    }

    fn attach_errors(&mut self, errors: &ValidationErrors) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(kind) = slot.mode().kind() {
                let message = errors.field(index, kind).map(|e| e.message().to_string());
                slot.set_error(kind, message);
            }
        }
        if let Some(classifier) = &mut self.classifier {
            classifier.error = errors
                .has_top_level(TopLevelError::NoDevicePurpose)
                .then(|| TopLevelError::NoDevicePurpose.message().to_string());
        }
        self.top_level = errors.top_level.clone();
    }

    pub(crate) fn hide(&mut self) {
        self.visible = false;
    }

    pub(crate) fn show(&mut self) {
        self.visible = true;
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut IdentifierSlot, FormError> {
        self.slots.get_mut(index).ok_or(FormError::NoSuchSlot(index))
    }
}
