use std::fs;

fn main() {
    // Validate bundled data at compile time
    let config_path = "src/default_config.toml";
    let samples_path = "src/sample_posts.json";
    println!("cargo:rerun-if-changed={}", config_path);
    println!("cargo:rerun-if-changed={}", samples_path);

    let content = fs::read_to_string(config_path).expect("Failed to read default_config.toml");
    if let Err(e) = content.parse::<toml::Table>() {
        panic!("Invalid default_config.toml: {}", e);
    }

    let content = fs::read_to_string(samples_path).expect("Failed to read sample_posts.json");
    let doc: serde_json::Value = match serde_json::from_str(&content) {
        Ok(doc) => doc,
        Err(e) => panic!("Invalid sample_posts.json: {}", e),
    };
    if !doc["posts"].as_array().is_some_and(|posts| !posts.is_empty()) {
        panic!("sample_posts.json must contain a non-empty \"posts\" array");
    }
}
