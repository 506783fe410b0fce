use anyhow::{Context, Result, bail};
use carbon_chase_game::{decode_share_code, encode_share_code, seed_label, share_code_seeds};
use std::collections::HashMap;

/// Seed plus the share code it was given as, if any.
#[derive(Debug, Clone)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, code: None }
    }

    #[must_use]
    pub const fn from_share_code(seed: u64, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
        }
    }

    /// The code the seed was given as, else [`seed_label`].
    #[must_use]
    pub fn label(&self) -> String {
        self.code.clone().unwrap_or_else(|| seed_label(self.seed))
    }
}

/// Resolve a list of CLI seed arguments into canonical seed metadata.
///
/// Supports literal integers, share codes, and the special keywords
/// `all` / `available` which expand to every share-code seed.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();
    let mut request_all = false;

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("all") || token.eq_ignore_ascii_case("available") {
            request_all = true;
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        if let Some(seed) = decode_share_code(token) {
            pending.push(SeedInfo::from_share_code(seed, token.trim().to_uppercase()));
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    if request_all {
        pending.extend(generate_all_share_code_seeds()?);
    }

    let mut deduped: Vec<SeedInfo> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for info in pending {
        if let Some(&existing) = index.get(&info.seed) {
            if let Some(entry) = deduped.get_mut(existing)
                && entry.code.is_none()
                && info.code.is_some()
            {
                *entry = info;
            }
        } else {
            index.insert(info.seed, deduped.len());
            deduped.push(info);
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(1337));
    }

    Ok(deduped)
}

fn generate_all_share_code_seeds() -> Result<Vec<SeedInfo>> {
    share_code_seeds()
        .map(|seed| {
            let code = encode_share_code(seed)
                .with_context(|| format!("seed {seed} has no share code"))?;
            Ok(SeedInfo::from_share_code(seed, code))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_numeric_and_share_code() {
        let raw = vec![
            "42".to_string(),
            "-7".to_string(),
            "cc-solar42".to_string(),
        ];
        let seeds = resolve_seed_inputs(&raw).unwrap();
        assert!(seeds.iter().any(|s| s.seed == 42 && s.code.is_none()));
        assert!(seeds.iter().any(|s| s.seed == 7 && s.code.is_none()));
        assert!(
            seeds
                .iter()
                .any(|s| s.code.as_deref() == Some("CC-SOLAR42"))
        );
    }

    #[test]
    fn rejects_garbage_tokens() {
        assert!(resolve_seed_inputs(&["not-a-seed".to_string()]).is_err());
    }

    #[test]
    fn defaults_when_empty() {
        let seeds = resolve_seed_inputs(&[]).unwrap();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].seed, 1337);
        assert_eq!(seeds[0].code, None);
        assert_eq!(seeds[0].label(), "1337");
    }

    #[test]
    fn expands_all_share_codes() {
        let seeds = resolve_seed_inputs(&["all".to_string()]).unwrap();
        assert_eq!(seeds.len(), 6_400);
        for info in seeds.iter().step_by(61) {
            let code = info.code.as_deref().unwrap();
            assert_eq!(decode_share_code(code), Some(info.seed), "{code}");
        }
    }

    #[test]
    fn duplicate_seed_prefers_share_code() {
        let code = "CC-WIND07".to_string();
        let seed = decode_share_code(&code).unwrap();
        let seeds = resolve_seed_inputs(&[seed.to_string(), code.clone()]).unwrap();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].code.as_deref(), Some(code.as_str()));
    }

    #[test]
    fn labels_always_name_the_seed_they_run() {
        let raw = vec!["1337".to_string(), "42".to_string(), "CC-TIDAL05".to_string()];
        for info in resolve_seed_inputs(&raw).unwrap() {
            let label = info.label();
            let reparsed = resolve_seed_inputs(&[label.clone()]).unwrap();
            assert_eq!(reparsed[0].seed, info.seed, "{label}");
        }
    }
}
