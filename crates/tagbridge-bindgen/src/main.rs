/// Generates the Swift and Kotlin bindings for the `tagbridge` library
///
/// Usage: `cargo run -p tagbridge-bindgen -- generate --library <path> --language <swift|kotlin> --out-dir <dir>`
fn main() {
    uniffi::uniffi_bindgen_main()
}
