use shadow_rs::ShadowBuilder;

fn main() {
    // Embedded migrations are read at compile time
    println!("cargo:rerun-if-changed=migrations");

    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}
