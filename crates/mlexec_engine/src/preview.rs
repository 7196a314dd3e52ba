const TRUNCATED_MARKER: &str = "\n.[truncated]";
pub const MAX_PREVIEW_CONTENT: usize = 40_960;

pub fn prepare_preview_content(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        text.to_string()
    } else {
        let mut end = max_bytes;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        let truncated = &text[..end];
        format!("{truncated}{TRUNCATED_MARKER}")
    }
}
