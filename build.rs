const COMMANDS: &[&str] = &[
    "register_callback",
    "unregister_callback",
    "start_scan",
    "stop_scan",
    "has_permissions",
];

fn main() {
    tauri_plugin::Builder::new(COMMANDS)
        .android_path("android")
        .build();
}
