/// Selected text as the lookup flow sees it: trimmed, or empty when nothing is selected
pub fn capture_text(raw: Option<&str>) -> String {
    raw.map(str::trim).unwrap_or_default().to_string()
}
