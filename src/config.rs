//! Runtime configuration for both pipeline steps.
use config::{ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Settings shared by the fetch and populate steps. The defaults are the
/// constants of the original DECODE harvest; `data/config.toml` overrides
/// them and `DECODE_*` environment variables override both.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Dataset table to enumerate.
    pub table: String,
    /// Records per list page.
    pub page_size: u32,
    /// Upper bound on the number of pages fetched.
    pub max_pages: u32,
    pub summary_file: String,
    pub detail_file: String,
    /// Ontology schema, RDF Turtle.
    pub schema_file: String,
    /// Populated graph output, RDF Turtle.
    pub output_file: String,
    /// Namespace that record subjects and ontology terms live in.
    pub namespace: String,
    /// Prefix bound to that namespace in serialized output.
    pub prefix: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        config::Config::builder()
            .set_default("base_url", "https://de-crypt.org/decrypt-web/api")?
            .set_default("table", "records")?
            .set_default("page_size", 100)?
            .set_default("max_pages", 4025)?
            .set_default("summary_file", "decode_records_summary.json")?
            .set_default("detail_file", "decode_records_detailed.json")?
            .set_default("schema_file", "data/decryptonto.ttl")?
            .set_default("output_file", "populated_decryptontology.ttl")?
            .set_default("namespace", "https://de-crypt.org/r/")?
            .set_default("prefix", "decryptonto")?
            .add_source(File::new("data/config.toml", FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("decode"))
            .build()?
            .try_deserialize()
    }
}
