// View state domain model - which panel is visible and the "no data" notice
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Live,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub active_panel: Panel,
    pub no_data_notice_visible: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            active_panel: Panel::Live,
            no_data_notice_visible: false,
        }
    }
}

impl ViewState {
    /// Live-panel button
    pub fn show_live(&mut self) {
        self.active_panel = Panel::Live;
    }

    /// History-panel button
    pub fn show_history(&mut self) {
        self.active_panel = Panel::History;
    }

    pub fn set_no_data(&mut self, visible: bool) {
        self.no_data_notice_visible = visible;
    }
}
