// Generates Kotlin / Swift bindings from the compiled library:
//
//   cargo run -p peekblock-mobile --bin uniffi-bindgen -- \
//       generate --library target/release/libpeekblock_mobile.so \
//       --language kotlin --out-dir target/generated-sources/uniffi/kotlin

fn main() {
    uniffi::uniffi_bindgen_main()
}
