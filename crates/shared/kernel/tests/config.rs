use fhub_domain::config::ApiConfig;
use fhub_kernel::config::load_config;
use std::io::Write;

#[test]
fn loads_layered_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "[server]\nport = 9100\n\n[storage]\nroot = \"/tmp/files\"\npublic_base = \"/static\"\n"
    )
    .unwrap();

    let cfg: ApiConfig = load_config(Some(&path)).unwrap();
    assert_eq!(cfg.server.port, 9100);
    assert_eq!(cfg.storage.public_base, "/static");
    // Untouched sections keep their defaults.
    assert_eq!(cfg.upload.max_chunk_size, 32 * 1024 * 1024);
}

#[test]
fn missing_file_is_an_error() {
    let result: Result<ApiConfig, _> = load_config(Some("/definitely/not/here"));
    assert!(result.is_err());
}
