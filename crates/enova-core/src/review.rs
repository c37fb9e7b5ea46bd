//! LLM review of a certificate text: prompt construction and response parsing.
//!
//! The model is asked to answer with four `Key: value` sections. Answers may
//! wrap over several lines; continuation lines are joined with a space.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Section keys the model is asked to answer with.
pub const REVIEW_KEYS: [&str; 4] = [
    "Innmeldt_av",
    "Antall_registrerte_enheter",
    "Positive_ting",
    "Forbedringspotensiale",
];

/// Optional facts that give the model more context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewContext {
    pub energikarakter: Option<String>,
    pub oppvarmingskarakter: Option<String>,
    /// Latitude and longitude of the address.
    pub location: Option<(f64, f64)>,
}

/// Structured answer parsed from the model response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateReview {
    /// Who registered the certificate (company, person or both).
    pub innmeldt_av: Option<String>,
    /// Number of units the certificate covers, as written by the model.
    pub antall_registrerte_enheter: Option<String>,
    /// Positive aspects of the building's energy efficiency.
    pub positive_ting: Option<String>,
    /// Areas with improvement potential.
    pub forbedringspotensiale: Option<String>,
}

impl CertificateReview {
    fn section_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "Innmeldt_av" => Some(&mut self.innmeldt_av),
            "Antall_registrerte_enheter" => Some(&mut self.antall_registrerte_enheter),
            "Positive_ting" => Some(&mut self.positive_ting),
            "Forbedringspotensiale" => Some(&mut self.forbedringspotensiale),
            _ => None,
        }
    }

    /// Keys with no answer.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let values = [
            &self.innmeldt_av,
            &self.antall_registrerte_enheter,
            &self.positive_ting,
            &self.forbedringspotensiale,
        ];
        REVIEW_KEYS
            .iter()
            .zip(values)
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| *k)
            .collect()
    }
}

/// Build the review prompt for one certificate text.
pub fn build_prompt(attest_text: &str, context: &ReviewContext) -> String {
    let mut metadata = String::new();
    if let Some(karakter) = context.energikarakter.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(metadata, "Energikarakter: {}", karakter);
    }
    if let Some(karakter) = context.oppvarmingskarakter.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(metadata, "Oppvarmingskarakter: {}", karakter);
    }
    if let Some((lat, lng)) = context.location {
        let _ = writeln!(metadata, "Lokasjon: {}, {}", lat, lng);
    }

    let mut prompt = String::new();
    prompt.push_str(
        "Jeg ønsker at du leser fra denne energiattesten og gir meg følgende informasjon.\n\n",
    );
    prompt.push_str(&metadata);
    let _ = writeln!(prompt, "Attest tekst: {}\n", attest_text);
    prompt.push_str(
        "Bruk gjerne energikarakter, oppvarmingskarakter og lokasjon som kontekst i din analyse.\n\n",
    );
    prompt.push_str("Svaret skal være på dette formatet:\n");
    prompt.push_str(
        "Innmeldt_av: navn på den som hart laget rapporten firma eller person eller begge deler\n",
    );
    prompt.push_str("Antall_registrerte_enheter: antall enheter attesten gjelder som et tall\n");
    prompt.push_str(
        "Positive_ting: kort oppsummering av positive aspekter ved energieffektiviteten til bygget/enheten\n",
    );
    prompt.push_str(
        "Forbedringspotensiale: kort oppsummering av områder som kan forbedres for bedre energieffektivitet\n",
    );
    prompt
}

/// Parse a model response into review sections.
///
/// Lines before the first recognised key are ignored. A repeated key
/// replaces the earlier answer.
pub fn parse_response(content: &str) -> CertificateReview {
    let mut review = CertificateReview::default();
    let mut current: Option<&'static str> = None;

    for line in content.trim().lines() {
        let line = line.trim();

        let started = REVIEW_KEYS.iter().find_map(|key| {
            line.strip_prefix(key)
                .and_then(|rest| rest.strip_prefix(':'))
                .map(|rest| (*key, rest.trim()))
        });

        if let Some((key, rest)) = started {
            current = Some(key);
            if let Some(section) = review.section_mut(key) {
                *section = Some(rest.to_string());
            }
        } else if let Some(key) = current.filter(|_| !line.is_empty()) {
            if let Some(Some(text)) = review.section_mut(key) {
                text.push(' ');
                text.push_str(line);
            }
        }
    }

    review
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_response() {
        let content = r#"
Her er svaret:
Innmeldt_av: Ola Nordmann, Energirådgivning AS
Antall_registrerte_enheter: 34
Positive_ting: God isolasjon i yttervegger.
Nye vinduer fra 2015.

Forbedringspotensiale: Etterisolering av tak.
"#;
        let review = parse_response(content);

        assert_eq!(
            review,
            CertificateReview {
                innmeldt_av: Some("Ola Nordmann, Energirådgivning AS".to_string()),
                antall_registrerte_enheter: Some("34".to_string()),
                positive_ting: Some("God isolasjon i yttervegger. Nye vinduer fra 2015.".to_string()),
                forbedringspotensiale: Some("Etterisolering av tak.".to_string()),
            }
        );
        assert!(review.missing_keys().is_empty());
    }

    #[test]
    fn test_repeated_key_overwrites() {
        let review = parse_response("Innmeldt_av: A\nInnmeldt_av: B\nfortsatt");
        assert_eq!(review.innmeldt_av.as_deref(), Some("B fortsatt"));
    }

    #[test]
    fn test_missing_keys() {
        let review = parse_response("Positive_ting: Varmepumpe");
        assert_eq!(
            review.missing_keys(),
            vec!["Innmeldt_av", "Antall_registrerte_enheter", "Forbedringspotensiale"]
        );
    }

    #[test]
    fn test_prompt_includes_context() {
        let context = ReviewContext {
            energikarakter: Some("C".to_string()),
            oppvarmingskarakter: None,
            location: Some((59.41, 5.27)),
        };
        let prompt = build_prompt("| BRA | 120 m² |", &context);

        assert!(prompt.contains("Energikarakter: C\n"));
        assert!(!prompt.contains("Oppvarmingskarakter:"));
        assert!(prompt.contains("Lokasjon: 59.41, 5.27\n"));
        assert!(prompt.contains("Attest tekst: | BRA | 120 m² |"));
        assert!(prompt.contains("som kontekst i din analyse"));
        for key in REVIEW_KEYS {
            assert!(prompt.contains(&format!("{}:", key)));
        }
    }

    #[test]
    fn test_prompt_without_context() {
        let prompt = build_prompt("tekst", &ReviewContext::default());
        assert!(prompt.contains("som kontekst i din analyse"));
        assert!(!prompt.contains("Lokasjon:"));
        assert!(!prompt.contains("Energikarakter:"));
    }
}
