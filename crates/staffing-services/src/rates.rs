//! Hourly rate lookup
//!
//! Contracts carry no link to the recruitment record, so the rate is found
//! by matching the lecturer's cleaned display name, then their email. Any
//! miss, unusable rate or lookup failure degrades to `None`.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use staffing_db::CandidateDirectory;
use staffing_models::CandidateRecord;
use tracing::{debug, warn};

const HONORIFICS: [&str; 7] = ["mr", "ms", "mrs", "dr", "prof", "professor", "miss"];

/// Drop one leading honorific, collapse whitespace, trim
pub fn normalize_name(raw: &str) -> String {
    let mut tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() > 1 {
        let first = tokens[0].strip_suffix('.').unwrap_or(tokens[0]);
        if HONORIFICS.iter().any(|h| h.eq_ignore_ascii_case(first)) {
            tokens.remove(0);
        }
    }
    tokens.join(" ")
}

/// Parse a stored rate such as `25`, `12.50` or `$ 30`; negatives are unusable
pub fn parse_rate(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    let amount = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
    match Decimal::from_str(amount) {
        Ok(rate) if rate >= Decimal::ZERO => Some(rate),
        _ => None,
    }
}

fn usable_rate(candidate: &CandidateRecord) -> Option<Decimal> {
    let rate = candidate.hourly_rate.as_deref().and_then(parse_rate);
    if rate.is_none() {
        debug!(candidate_id = candidate.id, "Candidate has no usable hourly rate");
    }
    rate
}

#[derive(Clone)]
pub struct RateResolver {
    candidates: Arc<dyn CandidateDirectory>,
}

impl RateResolver {
    pub fn new(candidates: Arc<dyn CandidateDirectory>) -> Self {
        Self { candidates }
    }

    /// Hourly rate in USD for a lecturer, if a recruitment record yields one
    pub async fn resolve(&self, display_name: &str, email: &str) -> Option<Decimal> {
        let name = normalize_name(display_name);
        if !name.is_empty() {
            match self.candidates.find_by_normalized_name(&name).await {
                Ok(Some(candidate)) => {
                    if let Some(rate) = usable_rate(&candidate) {
                        return Some(rate);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "Candidate lookup by name failed");
                    return None;
                }
            }
        }

        let email = email.trim();
        if email.is_empty() {
            return None;
        }
        match self.candidates.find_by_email(email).await {
            Ok(candidate) => candidate.as_ref().and_then(usable_rate),
            Err(e) => {
                warn!(error = %e, "Candidate lookup by email failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staffing_db::MemoryCandidateDirectory;

    fn candidate(id: i64, name: &str, email: Option<&str>, rate: Option<&str>) -> CandidateRecord {
        CandidateRecord {
            id,
            full_name: name.to_string(),
            email: email.map(str::to_string),
            hourly_rate: rate.map(str::to_string),
        }
    }

    async fn resolver(candidates: Vec<CandidateRecord>) -> (RateResolver, Arc<MemoryCandidateDirectory>) {
        let directory = Arc::new(MemoryCandidateDirectory::new());
        for c in candidates {
            directory.add(c).await;
        }
        (RateResolver::new(directory.clone()), directory)
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Dr. Sok   Dara "), "Sok Dara");
        assert_eq!(normalize_name("PROF Chan Sophea"), "Chan Sophea");
        assert_eq!(normalize_name("professor. Keo Mony"), "Keo Mony");
        assert_eq!(normalize_name("Mr Mrs Lim"), "Mrs Lim");
        assert_eq!(normalize_name("Drake Sok"), "Drake Sok");
        assert_eq!(normalize_name("Dr"), "Dr");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("25"), Some(Decimal::from(25)));
        assert_eq!(parse_rate(" $12.50 "), Decimal::from_str("12.50").ok());
        assert_eq!(parse_rate("0"), Some(Decimal::ZERO));
        assert_eq!(parse_rate("-5"), None);
        assert_eq!(parse_rate("twenty"), None);
        assert_eq!(parse_rate(""), None);
    }

    #[tokio::test]
    async fn test_honorific_and_spacing_still_match() {
        let (resolver, _) = resolver(vec![candidate(1, "Sok  Dara", None, Some("25"))]).await;
        assert_eq!(
            resolver.resolve("Dr. sok dara", "nobody@example.edu").await,
            Some(Decimal::from(25))
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_email() {
        let (resolver, _) = resolver(vec![candidate(
            1,
            "Dara Sok",
            Some("dara.sok@example.edu"),
            Some("30"),
        )])
        .await;
        assert_eq!(
            resolver.resolve("Sok Dara", "dara.sok@example.edu").await,
            Some(Decimal::from(30))
        );
    }

    #[tokio::test]
    async fn test_unparseable_rate_is_no_match() {
        let (resolver, _) = resolver(vec![
            candidate(1, "Sok Dara", None, Some("negotiable")),
            candidate(2, "Someone Else", Some("dara.sok@example.edu"), Some("-3")),
        ])
        .await;
        assert_eq!(resolver.resolve("Sok Dara", "dara.sok@example.edu").await, None);
    }

    #[tokio::test]
    async fn test_unusable_name_match_tries_email() {
        let (resolver, _) = resolver(vec![
            candidate(1, "Sok Dara", None, None),
            candidate(2, "S. Dara", Some("dara.sok@example.edu"), Some("22.5")),
        ])
        .await;
        assert_eq!(
            resolver.resolve("Sok Dara", "dara.sok@example.edu").await,
            Decimal::from_str("22.5").ok()
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_degrades_to_none() {
        let (resolver, directory) = resolver(vec![candidate(1, "Sok Dara", None, Some("25"))]).await;
        directory.fail_with("connection reset").await;
        assert_eq!(resolver.resolve("Sok Dara", "").await, None);
    }

    #[tokio::test]
    async fn test_lowest_id_wins_on_duplicate_names() {
        let (resolver, _) = resolver(vec![
            candidate(7, "Sok Dara", None, Some("40")),
            candidate(3, "Sok Dara", None, Some("20")),
        ])
        .await;
        assert_eq!(resolver.resolve("Sok Dara", "").await, Some(Decimal::from(20)));
    }
}
