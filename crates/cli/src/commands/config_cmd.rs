//! `mostrador config` — Inspect the persisted configuration.

use anyhow::Result;

use mostrador_config::ConfigStore;

pub async fn show() -> Result<()> {
    let store = ConfigStore::open();
    let toml_str = toml::to_string_pretty(store.current())?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<()> {
    let config_path = ConfigStore::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use mostrador_config::ConfigStore;

    #[test]
    fn config_path_is_valid() {
        let path = ConfigStore::config_dir().join("config.toml");
        assert!(path.to_str().unwrap().contains("config.toml"));
    }

    #[test]
    fn missing_file_renders_defaults_as_toml() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open_at(dir.path().join("config.toml"));
        let rendered = toml::to_string_pretty(store.current()).unwrap();
        assert!(rendered.contains("personality"));
        assert!(rendered.contains("gemini-2.5-flash"));
    }
}
