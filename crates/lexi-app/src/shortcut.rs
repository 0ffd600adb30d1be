/// Command name the lookup shortcut is bound to
pub const LOOKUP_COMMAND: &str = "lookup-definition";

/// Platform binding for [`LOOKUP_COMMAND`]
pub fn default_binding() -> &'static str {
    if cfg!(target_os = "macos") {
        "Command+Shift+L"
    } else {
        "Ctrl+Shift+L"
    }
}
