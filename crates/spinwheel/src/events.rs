/// Requests reaching the UI from background services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Spin,
    Reset,
    ConfigReload,
}
