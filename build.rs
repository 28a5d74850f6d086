fn main() {
    println!("cargo:rerun-if-env-changed=BSEC_LIB_DIR");
    println!("cargo:rerun-if-env-changed=COMPONENT_CONFIG_JSON");

    // BSEC2 ships as a prebuilt static archive per target. Point
    // BSEC_LIB_DIR at the directory holding libalgobsec.a for the chip.
    #[cfg(feature = "espidf")]
    {
        match std::env::var("BSEC_LIB_DIR") {
            Ok(dir) => {
                println!("cargo:rustc-link-search=native={dir}");
                println!("cargo:rustc-link-lib=static=algobsec");
            }
            Err(_) => {
                println!("cargo:warning=BSEC_LIB_DIR not set; link will fail on bsec_* symbols");
            }
        }

        embuild::espidf::sysenv::output();
    }
}
