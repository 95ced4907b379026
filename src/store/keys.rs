pub fn reference_key(name: &str) -> String {
    name.to_ascii_lowercase()
}
