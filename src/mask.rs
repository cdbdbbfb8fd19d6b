//! Sensitive value masking for uploaded evidence.
//!
//! Secrets are replaced globally, longest first, so that a secret which contains
//! another one is masked as a whole instead of being split by the shorter match.

const MASK_CHAR: char = '*';

/// How an occurrence of a secret is rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum MaskStrategy {
    /// Every character is replaced.
    AllStars,
    /// First and last character survive for values longer than two characters.
    #[default]
    KeepFirstLast,
}

/// Replace every occurrence of every secret in `text`.
pub fn mask(text: &str, secrets: &[String], strategy: MaskStrategy) -> String {
    let mut ordered: Vec<&String> = secrets.iter().filter(|s| !s.is_empty()).collect();
    // Stable sort keeps caller order among secrets of equal length
    ordered.sort_by_key(|s| std::cmp::Reverse(s.chars().count()));

    let mut result = text.to_string();
    for secret in ordered {
        if result.contains(secret.as_str()) {
            result = result.replace(secret.as_str(), &masked_value(secret, strategy));
        }
    }
    result
}

/// Secrets to hide in evidence, and how
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Masking {
    pub values: Vec<String>,
    pub strategy: MaskStrategy,
}

impl Masking {
    pub fn new(values: Vec<String>) -> Self {
        Self { values, strategy: MaskStrategy::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| v.is_empty())
    }

    /// Mask `text`, skipping all work when there is nothing to hide.
    pub fn apply(&self, text: &str) -> String {
        if self.is_empty() { text.to_string() } else { mask(text, &self.values, self.strategy) }
    }
}

fn masked_value(value: &str, strategy: MaskStrategy) -> String {
    let len = value.chars().count();
    match strategy {
        MaskStrategy::AllStars => MASK_CHAR.to_string().repeat(len),
        MaskStrategy::KeepFirstLast if len <= 2 => MASK_CHAR.to_string().repeat(len),
        MaskStrategy::KeepFirstLast => {
            let mut chars = value.chars();
            let first = chars.next().unwrap_or(MASK_CHAR);
            let last = chars.next_back().unwrap_or(MASK_CHAR);
            format!("{}{}{}", first, MASK_CHAR.to_string().repeat(len - 2), last)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_masks_single_value() {
        let output = mask("hello my name is secret", &secrets(&["secret"]), MaskStrategy::KeepFirstLast);
        assert_eq!(output, "hello my name is s****t");
    }

    #[test]
    fn test_overlapping_values_mask_longest_first() {
        let input = "hello my name is secret, and this secretName one is secret too";
        let output = mask(input, &secrets(&["secret", "secretName"]), MaskStrategy::KeepFirstLast);
        assert_eq!(output, "hello my name is s****t, and this s********e one is s****t too");
    }

    #[test]
    fn test_all_stars_strategy() {
        let output = mask("token=abc123;", &secrets(&["abc123"]), MaskStrategy::AllStars);
        assert_eq!(output, "token=******;");
    }

    #[test]
    fn test_short_values_fully_masked() {
        let output = mask("id: ab, x", &secrets(&["ab", "x"]), MaskStrategy::KeepFirstLast);
        assert_eq!(output, "id: **, *");
    }

    #[test]
    fn test_empty_secret_is_ignored() {
        let output = mask("unchanged", &secrets(&[""]), MaskStrategy::AllStars);
        assert_eq!(output, "unchanged");
    }

    #[test]
    fn test_masked_output_never_contains_secret() {
        let cases = ["password", "SecretNameAgain", "abc", "ünïcødé"];
        for secret in cases {
            let text = format!("{s} and {s}{s} and x{s}x", s = secret);
            let output = mask(&text, &secrets(&[secret]), MaskStrategy::KeepFirstLast);
            assert!(!output.contains(secret), "{} leaked in {}", secret, output);

            let first = secret.chars().next().unwrap();
            let last = secret.chars().last().unwrap();
            assert!(output.starts_with(first), "first char kept in {}", output);
            let masked = masked_value(secret, MaskStrategy::KeepFirstLast);
            assert!(masked.ends_with(last));
            assert_eq!(masked.chars().count(), secret.chars().count());
        }
    }

    #[test]
    fn test_masking_without_secrets_is_identity() {
        assert_eq!(Masking::default().apply("keep me"), "keep me");
        assert!(Masking::new(vec![String::new()]).is_empty());
    }

    #[test]
    fn test_masking_uses_its_strategy() {
        let masking = Masking { values: secrets(&["hunter2"]), strategy: MaskStrategy::AllStars };
        assert_eq!(masking.apply("pw=hunter2"), "pw=*******");
        assert_eq!(Masking::new(secrets(&["hunter2"])).apply("pw=hunter2"), "pw=h*****2");
    }
}
