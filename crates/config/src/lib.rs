//! Assistant configuration for mostrador.
//!
//! Loads the persisted record from `~/.mostrador/config.toml`, merges it over
//! hard-coded defaults, and writes the full effective record back after every
//! committed save. Persistence is best-effort: a failed read or write is
//! logged and the in-memory configuration stays authoritative.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use mostrador_core::ModelId;

/// Maximum number of FAQ entries a configuration may hold.
pub const MAX_FAQS: usize = 10;
/// Maximum FAQ question length, in characters.
pub const MAX_QUESTION_CHARS: usize = 200;
/// Maximum FAQ answer length, in characters.
pub const MAX_ANSWER_CHARS: usize = 500;

/// One frequently-asked-question entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqItem {
    /// Unique id, assigned at creation
    pub id: String,

    pub question: String,

    pub answer: String,
}

impl FaqItem {
    /// Create an entry with a fresh unique id. Question and answer are
    /// truncated to their caps.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            question: truncate_chars(&question.into(), MAX_QUESTION_CHARS),
            answer: truncate_chars(&answer.into(), MAX_ANSWER_CHARS),
        }
    }
}

/// The effective assistant configuration.
///
/// Mutations are staged by the caller on a clone and committed atomically
/// through [`ConfigStore::save`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Persona text prepended to every instruction
    #[serde(default = "default_personality")]
    pub personality: String,

    /// Which model answers
    #[serde(default)]
    pub model: ModelId,

    /// Reserved lower bound on generated tokens. Stored and surfaced but
    /// consumed by nothing yet.
    #[serde(default = "default_min_tokens")]
    pub min_tokens: u32,

    /// Cap on generated tokens per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Company description block
    #[serde(default = "default_company_info")]
    pub company_info: String,

    /// Character limit for `company_info`, enforced by truncation on save
    #[serde(default = "default_company_info_char_limit")]
    pub company_info_char_limit: usize,

    /// Products and services block
    #[serde(default = "default_products_info")]
    pub products_info: String,

    #[serde(default = "default_products_info_char_limit")]
    pub products_info_char_limit: usize,

    /// Current promotions block
    #[serde(default = "default_promotions_info")]
    pub promotions_info: String,

    #[serde(default = "default_promotions_info_char_limit")]
    pub promotions_info_char_limit: usize,

    /// FAQ entries, at most [`MAX_FAQS`]
    #[serde(default = "default_faqs")]
    pub faqs: Vec<FaqItem>,

    /// Speak assistant replies aloud
    #[serde(default)]
    pub enable_speech: bool,

    /// Preferred synthesis voice, when speech is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_voice: Option<String>,

    /// Greet the visitor proactively at session start
    #[serde(default)]
    pub proactive_assistant: bool,

    /// Let the model consult calendar availability
    #[serde(default)]
    pub google_calendar_integration: bool,
}

fn default_personality() -> String {
    "Eres un asistente de atención al cliente servicial y amigable. Tu \
     objetivo es resolver las dudas de los clientes sobre nuestros productos, \
     servicios y políticas de la empresa de manera clara y concisa."
        .into()
}
fn default_min_tokens() -> u32 {
    100
}
fn default_max_tokens() -> u32 {
    400
}
fn default_company_info() -> String {
    "Somos 'Innovatech Solutions', una empresa líder en soluciones de \
     software personalizadas. Fundada en 2010, nuestra misión es ayudar a las \
     empresas a optimizar sus procesos a través de la tecnología. Nuestros \
     valores son la innovación, la calidad y la satisfacción del cliente."
        .into()
}
fn default_company_info_char_limit() -> usize {
    2000
}
fn default_products_info() -> String {
    "Ofrecemos tres productos principales:\n1. **Optimizador Pro**: Un \
     sistema ERP para la gestión de recursos empresariales.\n2. **Conecta \
     CRM**: Una plataforma para la gestión de relaciones con los clientes.\n\
     3. **Analítica Web**: Herramientas de análisis de datos para sitios web \
     y aplicaciones."
        .into()
}
fn default_products_info_char_limit() -> usize {
    2000
}
fn default_promotions_info() -> String {
    "Actualmente tenemos dos promociones:\n- **20% de descuento** en la \
     primera suscripción anual de 'Optimizador Pro'.\n- **Prueba gratuita de \
     30 días** para 'Conecta CRM' para nuevos clientes."
        .into()
}
fn default_promotions_info_char_limit() -> usize {
    1000
}
fn default_faqs() -> Vec<FaqItem> {
    vec![
        FaqItem {
            id: "faq-1".into(),
            question: "¿Cuál es el horario de atención al cliente?".into(),
            answer: "Nuestro equipo de soporte está disponible de lunes a \
                     viernes, de 9:00 a.m. a 6:00 p.m. (hora central)."
                .into(),
        },
        FaqItem {
            id: "faq-2".into(),
            question: "¿Ofrecen demostraciones de sus productos?".into(),
            answer: "Sí, ofrecemos demostraciones personalizadas de todos \
                     nuestros productos. Puedes solicitar una en nuestro \
                     sitio web."
                .into(),
        },
        FaqItem {
            id: "faq-3".into(),
            question: "¿Qué métodos de pago aceptan?".into(),
            answer: "Aceptamos tarjetas de crédito (Visa, MasterCard, \
                     American Express) y transferencias bancarias."
                .into(),
        },
    ]
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            personality: default_personality(),
            model: ModelId::default(),
            min_tokens: default_min_tokens(),
            max_tokens: default_max_tokens(),
            company_info: default_company_info(),
            company_info_char_limit: default_company_info_char_limit(),
            products_info: default_products_info(),
            products_info_char_limit: default_products_info_char_limit(),
            promotions_info: default_promotions_info(),
            promotions_info_char_limit: default_promotions_info_char_limit(),
            faqs: default_faqs(),
            enable_speech: false,
            speech_voice: None,
            proactive_assistant: false,
            google_calendar_integration: false,
        }
    }
}

impl ChatConfig {
    /// Add an FAQ entry with a fresh id. Returns `false` when the list is
    /// already at [`MAX_FAQS`].
    pub fn add_faq(
        &mut self,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> bool {
        if self.faqs.len() >= MAX_FAQS {
            return false;
        }
        self.faqs.push(FaqItem::new(question, answer));
        true
    }

    /// Remove the entry with the given id. Order of the remaining entries is
    /// preserved.
    pub fn remove_faq(&mut self, id: &str) {
        self.faqs.retain(|f| f.id != id);
    }

    /// Clamp each knowledge field to its own character limit. Applied at
    /// save time; edits may transiently exceed the limit before commit.
    fn clamp_knowledge_fields(&mut self) {
        self.company_info =
            truncate_chars(&self.company_info, self.company_info_char_limit);
        self.products_info =
            truncate_chars(&self.products_info, self.products_info_char_limit);
        self.promotions_info = truncate_chars(
            &self.promotions_info,
            self.promotions_info_char_limit,
        );
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than 0".into(),
            ));
        }
        if self.company_info_char_limit == 0
            || self.products_info_char_limit == 0
            || self.promotions_info_char_limit == 0
        {
            return Err(ConfigError::ValidationError(
                "knowledge-field character limits must be greater than 0".into(),
            ));
        }
        if self.faqs.len() > MAX_FAQS {
            return Err(ConfigError::ValidationError(format!(
                "at most {MAX_FAQS} FAQ entries are allowed"
            )));
        }
        Ok(())
    }
}

/// The persisted shape of [`ChatConfig`]: every field optional.
///
/// Merging an overlay over the defaults gives forward and backward schema
/// tolerance with the field set checked at compile time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfigOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_info: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_info_char_limit: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products_info: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products_info_char_limit: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotions_info: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotions_info_char_limit: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faqs: Option<Vec<FaqItem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_speech: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_voice: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proactive_assistant: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_calendar_integration: Option<bool>,
}

impl ChatConfigOverlay {
    /// Apply this overlay to `base`: present fields win, absent fields keep
    /// the base value.
    pub fn apply(self, mut base: ChatConfig) -> ChatConfig {
        if let Some(v) = self.personality {
            base.personality = v;
        }
        if let Some(v) = self.model {
            base.model = v;
        }
        if let Some(v) = self.min_tokens {
            base.min_tokens = v;
        }
        if let Some(v) = self.max_tokens {
            base.max_tokens = v;
        }
        if let Some(v) = self.company_info {
            base.company_info = v;
        }
        if let Some(v) = self.company_info_char_limit {
            base.company_info_char_limit = v;
        }
        if let Some(v) = self.products_info {
            base.products_info = v;
        }
        if let Some(v) = self.products_info_char_limit {
            base.products_info_char_limit = v;
        }
        if let Some(v) = self.promotions_info {
            base.promotions_info = v;
        }
        if let Some(v) = self.promotions_info_char_limit {
            base.promotions_info_char_limit = v;
        }
        if let Some(v) = self.faqs {
            base.faqs = v;
        }
        if let Some(v) = self.enable_speech {
            base.enable_speech = v;
        }
        if let Some(v) = self.speech_voice {
            base.speech_voice = Some(v);
        }
        if let Some(v) = self.proactive_assistant {
            base.proactive_assistant = v;
        }
        if let Some(v) = self.google_calendar_integration {
            base.google_calendar_integration = v;
        }
        base
    }
}

/// Owns the effective configuration and its backing file.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    effective: ChatConfig,
}

impl ConfigStore {
    /// Open the store at the default path (`~/.mostrador/config.toml`).
    pub fn open() -> Self {
        Self::open_at(Self::config_dir().join("config.toml"))
    }

    /// Open the store at a specific path, producing the effective
    /// configuration: persisted overlay merged over defaults. A missing,
    /// unreadable, or malformed file yields the defaults; it never fails.
    pub fn open_at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let effective = match Self::read_overlay(&path) {
            Ok(Some(overlay)) => {
                let merged = overlay.apply(ChatConfig::default());
                match merged.validate() {
                    Ok(()) => merged,
                    Err(e) => {
                        tracing::warn!(
                            "Persisted config at {} is invalid ({e}), using defaults",
                            path.display()
                        );
                        ChatConfig::default()
                    }
                }
            }
            Ok(None) => {
                tracing::info!(
                    "No config file found at {}, using defaults",
                    path.display()
                );
                ChatConfig::default()
            }
            Err(e) => {
                tracing::warn!(
                    "Could not load config from {} ({e}), using defaults",
                    path.display()
                );
                ChatConfig::default()
            }
        };
        Self { path, effective }
    }

    /// Read the persisted overlay. `Ok(None)` when no file exists.
    fn read_overlay(path: &Path) -> Result<Option<ChatConfigOverlay>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let overlay =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Some(overlay))
    }

    /// The effective configuration.
    pub fn current(&self) -> &ChatConfig {
        &self.effective
    }

    /// Commit a staged configuration: clamp the knowledge fields to their
    /// limits, replace the effective record, and persist the full record.
    /// A persist failure is logged and never blocks the in-memory update.
    pub fn save(&mut self, mut staged: ChatConfig) -> &ChatConfig {
        staged.clamp_knowledge_fields();
        self.effective = staged;

        if let Err(e) = self.persist() {
            tracing::warn!(
                "Could not persist config to {}: {e}",
                self.path.display()
            );
        }
        &self.effective
    }

    fn persist(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        }
        let content =
            toml::to_string_pretty(&self.effective).map_err(|e| {
                ConfigError::SerializeError(e.to_string())
            })?;
        std::fs::write(&self.path, content).map_err(|e| ConfigError::WriteError {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".mostrador")
    }
}

/// Truncate to at most `max_chars` characters, never splitting a character.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to write config file at {path}: {reason}")]
    WriteError { path: PathBuf, reason: String },

    #[error("Failed to serialize config: {0}")]
    SerializeError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
