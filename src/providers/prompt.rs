/// The instruction sent to extraction services.
///
/// Loaded from `prompt.txt` at compile time so it can be edited without
/// dealing with Rust string syntax.
pub const EXTRACTION_PROMPT: &str = include_str!("prompt.txt");

/// Build the full prompt for one pasted message.
pub fn build_extraction_prompt(message: &str) -> String {
    format!("{}\nMessage:\n\"{}\"", EXTRACTION_PROMPT, message.trim())
}
