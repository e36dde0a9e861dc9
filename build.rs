fn main() {
    println!("cargo:rerun-if-changed=src/ffi.rs");
    if std::env::var_os("CARGO_FEATURE_FFI").is_none() {
        return;
    }
    cbindgen::Builder::new()
        .with_crate(".")
        .with_language(cbindgen::Language::C)
        .with_include_guard("CRUST_PTR_H")
        .generate()
        .expect("Unable to generate bindings")
        .write_to_file("crust_ptr.h");
}
