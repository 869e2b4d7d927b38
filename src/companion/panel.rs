//! Configuration panels for assembled systems.
//!
//! Panels describe the editable state of a system as a list of fields and
//! write changes straight through to the live system. Rendering is left to
//! whichever front end displays them.

use std::sync::{Arc, Weak};

use crate::system::{StereoSystem, SystemId, SystemKind};

/// Value shown by a panel field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Toggle(bool),
}

/// One labelled row of a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelField {
    pub label: &'static str,
    pub value: FieldValue,
}

impl PanelField {
    fn new(label: &'static str, value: FieldValue) -> Self {
        Self { label, value }
    }
}

/// Configuration panel matching a system's kind.
#[derive(Debug)]
pub enum ConfigPanel {
    DualCamera(DualCameraConfigPanel),
    /// Stand-in for kinds without a dedicated panel.
    Placeholder(PlaceholderPanel),
}

impl ConfigPanel {
    /// Build the panel for `system`'s kind.
    pub fn for_system(system: &Arc<StereoSystem>) -> Self {
        match system.kind() {
            SystemKind::DualCamera => ConfigPanel::DualCamera(DualCameraConfigPanel::new(system)),
            SystemKind::SingleCamera => {
                ConfigPanel::Placeholder(PlaceholderPanel::not_implemented(system.kind()))
            }
        }
    }

    pub fn title(&self) -> String {
        match self {
            ConfigPanel::DualCamera(_) => SystemKind::DualCamera.display_name().to_string(),
            ConfigPanel::Placeholder(panel) => panel.kind.display_name().to_string(),
        }
    }

    /// Whether this panel is a stand-in with nothing to configure.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ConfigPanel::Placeholder(_))
    }

    pub fn fields(&self) -> Vec<PanelField> {
        match self {
            ConfigPanel::DualCamera(panel) => panel.fields(),
            ConfigPanel::Placeholder(panel) => {
                vec![PanelField::new("Status", FieldValue::Text(panel.message.clone()))]
            }
        }
    }
}

/// Panel for dual camera systems.
#[derive(Debug)]
pub struct DualCameraConfigPanel {
    system: Weak<StereoSystem>,
    system_id: SystemId,
}

impl DualCameraConfigPanel {
    pub fn new(system: &Arc<StereoSystem>) -> Self {
        Self {
            system: Arc::downgrade(system),
            system_id: system.id(),
        }
    }

    /// Id of the system this panel was built for.
    pub fn system_id(&self) -> SystemId {
        self.system_id
    }

    /// The system, while it is alive.
    pub fn system(&self) -> Option<Arc<StereoSystem>> {
        self.system.upgrade()
    }

    /// Current field values; empty once the system is gone.
    pub fn fields(&self) -> Vec<PanelField> {
        let Some(system) = self.system() else {
            return Vec::new();
        };

        let mut fields: Vec<PanelField> = ["Left camera", "Right camera"]
            .into_iter()
            .zip(system.cameras())
            .map(|(label, camera)| PanelField::new(label, FieldValue::Text(camera.name().to_string())))
            .collect();

        let projection = system.projection();
        fields.push(PanelField::new(
            "Projector",
            FieldValue::Text(format!(
                "{}x{} ({} frames)",
                projection.projector_width,
                projection.projector_height,
                projection.frame_count()
            )),
        ));

        let params = system.parameters();
        fields.push(PanelField::new(
            "Max valid distance",
            FieldValue::Number(params.max_valid_distance),
        ));
        fields.push(PanelField::new(
            "Show decoded images",
            FieldValue::Toggle(params.debug_show_decoded_images),
        ));
        fields.push(PanelField::new(
            "Show fringe points",
            FieldValue::Toggle(params.debug_show_fringes),
        ));
        fields
    }

    /// Returns false when the system is gone or the value is not positive.
    pub fn set_max_valid_distance(&self, distance: f64) -> bool {
        if !(distance > 0.0 && distance.is_finite()) {
            return false;
        }
        self.update(|p| p.max_valid_distance = distance)
    }

    pub fn set_debug_show_decoded_images(&self, show: bool) -> bool {
        self.update(|p| p.debug_show_decoded_images = show)
    }

    pub fn set_debug_show_fringes(&self, show: bool) -> bool {
        self.update(|p| p.debug_show_fringes = show)
    }

    fn update<F>(&self, update: F) -> bool
    where
        F: FnOnce(&mut crate::system::StereoParameters),
    {
        match self.system() {
            Some(system) => {
                system.update_parameters(update);
                true
            }
            None => false,
        }
    }
}

/// Panel shown for system kinds without a dedicated panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderPanel {
    pub kind: SystemKind,
    pub message: String,
}

impl PlaceholderPanel {
    pub fn not_implemented(kind: SystemKind) -> Self {
        Self {
            kind,
            message: "Not implemented yet".to_string(),
        }
    }
}
