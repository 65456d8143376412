//! qdk-config
//!
//! Layered YAML configuration for the quote desk, plus the typed
//! [`PricingPolicy`] consumed by the pricing and lifecycle engines.
//!
//! Layering: documents merge in order, later documents override earlier
//! ones (base file, then per-deployment overrides).  The effective config is
//! canonicalized to JSON and fingerprinted with SHA-256 so two deployments
//! can prove they price quotes under the same policy.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

// ---------------------------------------------------------------------------
// Loaded config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// SHA-256 hex of `canonical_json` — the policy fingerprint.
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

/// Read and merge YAML files in order; earlier paths are base, later paths
/// override.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

/// Merge already-read YAML documents in order and fingerprint the result.
pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let canonical_json =
        serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Pricing policy
// ---------------------------------------------------------------------------

/// Pricing knobs read by the pricing engine.
///
/// `min_price_major` is the minimum dispatch fee in whole currency units —
/// the floor every computed total is clamped to before logistics and tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Minimum billable total, whole currency units.
    pub min_price_major: i64,
    /// Tax percentage applied when an invoice is requested (16 = 16%).
    pub invoice_tax_percent: u32,
    /// Catalog fallback city when a quote's own city has no entry.
    pub base_city: String,
}

impl PricingPolicy {
    pub fn defaults() -> Self {
        Self {
            min_price_major: 5_900,
            invoice_tax_percent: 16,
            base_city: "Mérida".to_string(),
        }
    }

    /// Extract the policy from an effective config, falling back to
    /// [`PricingPolicy::defaults`] per key.
    ///
    /// Read keys: `/pricing/min_price`, `/pricing/invoice_tax_percent`,
    /// `/pricing/base_city`.
    pub fn from_config(cfg: &LoadedConfig) -> Result<Self> {
        let d = Self::defaults();
        let root = &cfg.config_json;

        let min_price_major = match root.pointer("/pricing/min_price") {
            Some(v) => v
                .as_i64()
                .context("/pricing/min_price must be an integer")?,
            None => d.min_price_major,
        };
        let invoice_tax_percent = match root.pointer("/pricing/invoice_tax_percent") {
            Some(v) => v
                .as_u64()
                .context("/pricing/invoice_tax_percent must be a non-negative integer")?
                as u32,
            None => d.invoice_tax_percent,
        };
        let base_city = match root.pointer("/pricing/base_city") {
            Some(v) => v
                .as_str()
                .context("/pricing/base_city must be a string")?
                .to_string(),
            None => d.base_city,
        };

        let policy = Self {
            min_price_major,
            invoice_tax_percent,
            base_city,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_price_major < 0 {
            bail!(
                "PRICING_POLICY_INVALID: min_price must be >= 0, got {}",
                self.min_price_major
            );
        }
        if self.invoice_tax_percent > 100 {
            bail!(
                "PRICING_POLICY_INVALID: invoice_tax_percent must be <= 100, got {}",
                self.invoice_tax_percent
            );
        }
        if self.base_city.trim().is_empty() {
            bail!("PRICING_POLICY_INVALID: base_city must not be empty");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
