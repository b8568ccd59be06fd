//! Loading quiz configuration (bank location, count choices, sampling ratios) from TOML.
//!
//! See `QuizConfig` for the expected schema. Every field is optional.

use serde::Deserialize;
use tracing::{error, info};

use crate::sampler::{TypeRatio, TypeRatios};

const DEFAULT_BANK_PATH: &str = "./final_questions_new.json";

#[derive(Clone, Debug, Deserialize)]
pub struct QuizConfig {
  #[serde(default = "default_bank_path")]
  pub bank_path: String,
  /// Question counts offered to the player on the start screen.
  #[serde(default = "default_count_choices")]
  pub count_choices: Vec<usize>,
  #[serde(default = "default_count")]
  pub default_count: usize,
  /// Sessions older than this are dropped when the next one starts.
  #[serde(default = "default_session_ttl_secs")]
  pub session_ttl_secs: u64,
  #[serde(default)]
  pub sampling: SamplingCfg,
}

/// `[[sampling.ratios]]` rows; empty means the built-in table.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct SamplingCfg {
  #[serde(default)] pub ratios: Vec<TypeRatio>,
}

fn default_bank_path() -> String { DEFAULT_BANK_PATH.into() }
fn default_count_choices() -> Vec<usize> { vec![10, 25, 50] }
fn default_count() -> usize { 10 }
fn default_session_ttl_secs() -> u64 { 3600 }

impl Default for QuizConfig {
  fn default() -> Self {
    Self {
      bank_path: default_bank_path(),
      count_choices: default_count_choices(),
      default_count: default_count(),
      session_ttl_secs: default_session_ttl_secs(),
      sampling: SamplingCfg::default(),
    }
  }
}

impl QuizConfig {
  /// Ratio table to sample with. An invalid configured table is logged and ignored.
  pub fn type_ratios(&self) -> TypeRatios {
    if self.sampling.ratios.is_empty() {
      return TypeRatios::default();
    }
    match TypeRatios::new(self.sampling.ratios.clone()) {
      Ok(r) => r,
      Err(e) => {
        error!(target: "memory_quiz", error = %e, "Invalid sampling ratios in config; using defaults");
        TypeRatios::default()
      }
    }
  }
}

/// Load `QuizConfig` from QUIZ_CONFIG_PATH, then apply QUIZ_BANK_PATH.
/// On any read/parse error the defaults are used.
pub fn load_quiz_config_from_env() -> QuizConfig {
  let mut cfg = std::env::var("QUIZ_CONFIG_PATH")
    .ok()
    .and_then(|path| load_quiz_config(&path))
    .unwrap_or_default();
  if let Ok(bank_path) = std::env::var("QUIZ_BANK_PATH") {
    cfg.bank_path = bank_path;
  }
  cfg
}

fn load_quiz_config(path: &str) -> Option<QuizConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<QuizConfig>(&s) {
      Ok(cfg) => {
        info!(target: "memory_quiz", %path, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "memory_quiz", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "memory_quiz", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
