// View service - Navigation between the live and history panels
use crate::domain::view::ViewState;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct ViewService {
    view: Arc<RwLock<ViewState>>,
}

impl ViewService {
    pub fn new(view: Arc<RwLock<ViewState>>) -> Self {
        Self { view }
    }

    pub async fn current(&self) -> ViewState {
        self.view.read().await.clone()
    }

    pub async fn show_live(&self) -> ViewState {
        let mut view = self.view.write().await;
        view.show_live();
        view.clone()
    }

    pub async fn show_history(&self) -> ViewState {
        let mut view = self.view.write().await;
        view.show_history();
        view.clone()
    }
}
