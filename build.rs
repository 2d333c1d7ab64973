fn main() {
    // The Tauri context is only generated for the desktop shell
    #[cfg(feature = "desktop")]
    tauri_build::build();
}
