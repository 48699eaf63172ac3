use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pocketbase: PocketBaseConfig,
    pub openai: OpenAiConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

/// Document store connection and collection layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PocketBaseConfig {
    pub base_url: String,
    pub products_collection: String,
    pub equivalences_collection: String,
    /// Field on an equivalence record pointing at its parent product
    pub relation_field: String,
    pub product_page_size: u32,
    pub ai_product_page_size: u32,
    pub equivalence_page_size: u32,
    pub join_sort: String,
}

impl Default for PocketBaseConfig {
    fn default() -> Self {
        Self {
            base_url: "http://pocketbase:8080/api".to_string(),
            products_collection: "perfumes".to_string(),
            equivalences_collection: "equivalencias".to_string(),
            relation_field: "perfume_id".to_string(),
            product_page_size: 50,
            ai_product_page_size: 20,
            equivalence_page_size: 100,
            join_sort: "title".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
        }
    }
}

/// Fields matched by the filter builder, per collection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub product_fields: Vec<String>,
    pub equivalence_fields: Vec<String>,
    pub missing_parent_title: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            product_fields: vec!["title".into(), "brand".into(), "description".into()],
            equivalence_fields: vec!["title".into(), "description".into(), "store".into()],
            missing_parent_title: "Nombre de Perfume Original no Disponible".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `config.toml` (or `$APP_CONFIG`), then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var("APP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Environment wins over the file. `lookup` is injected so tests don't touch process env.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port: {port}"))?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(url) = lookup("POCKETBASE_URL") {
            self.pocketbase.base_url = url;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.openai.model = model;
        }

        // An empty key is the same as no key
        if self
            .openai
            .api_key
            .as_deref()
            .is_some_and(|key| key.trim().is_empty())
        {
            self.openai.api_key = None;
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
