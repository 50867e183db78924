const COMMANDS: &[&str] = &[
    "ready",
    "get_pending_pdfs",
    "has_pending_pdfs",
    "clear_pending_pdfs",
];

fn main() {
    // Android intents and content streams are read over JNI from Rust, so there
    // is no Kotlin library to register and no .android_path() here.
    tauri_plugin::Builder::new(COMMANDS).build();
}
