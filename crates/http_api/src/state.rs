use tracker_app::AppState;

#[derive(Clone)]
pub struct HttpState {
    pub app: AppState,
}

impl HttpState {
    pub fn new(app: AppState) -> Self {
        Self { app }
    }
}
