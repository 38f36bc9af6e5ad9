//! `AllergyClassifier` (§4.2): free text → severity + forbidden/allowed
//! drug classes. Pure function over the KB's `allergy_rules` table.

use abx_contracts::kb::{AllergyRule, AllergySeverity};

const NONE_TOKENS: &[&str] = &["none", "nkda", "no known drug allergy"];

#[derive(Debug, Clone, PartialEq)]
pub struct AllergyClassification {
    pub severity: AllergySeverity,
    pub forbidden_classes: Vec<String>,
    pub allowed_classes: Vec<String>,
    pub cross_reactivity_pct: f64,
    pub notes: Vec<String>,
}

impl AllergyClassification {
    fn none() -> Self {
        AllergyClassification {
            severity: AllergySeverity::None,
            forbidden_classes: Vec::new(),
            allowed_classes: Vec::new(),
            cross_reactivity_pct: 0.0,
            notes: Vec::new(),
        }
    }
}

/// Reduce `allergies_text` to a classification using `rules` (§4.2).
///
/// Rules are scanned in declaration order; the KB is expected to list
/// severe-allergy rules before mild ones so the first keyword match governs
/// (step 2). Unmatched non-empty text defaults to `severe_pcn`-equivalent
/// severity per the conservative-default safety invariant (step 3).
pub fn classify(allergies_text: Option<&str>, rules: &[AllergyRule]) -> AllergyClassification {
    let text = match allergies_text {
        None => return AllergyClassification::none(),
        Some(t) => t.trim().to_lowercase(),
    };

    if text.is_empty() || NONE_TOKENS.contains(&text.as_str()) {
        return AllergyClassification::none();
    }

    for rule in rules {
        if rule
            .keyword_list
            .iter()
            .any(|kw| text.contains(&kw.to_lowercase()))
        {
            return AllergyClassification {
                severity: rule.severity,
                forbidden_classes: rule.forbidden_classes.clone(),
                allowed_classes: rule.allowed_classes.clone(),
                cross_reactivity_pct: rule.cross_reactivity_pct,
                notes: Vec::new(),
            };
        }
    }

    // Conservative default: no explicit pattern matched non-empty text.
    let forbidden_classes = rules
        .iter()
        .find(|r| r.severity == AllergySeverity::SeverePcn)
        .map(|r| r.forbidden_classes.clone())
        .unwrap_or_else(|| vec!["penicillin".to_string(), "cephalosporin".to_string(), "carbapenem".to_string()]);

    AllergyClassification {
        severity: AllergySeverity::SeverePcn,
        forbidden_classes,
        allowed_classes: Vec::new(),
        cross_reactivity_pct: 0.0,
        notes: vec!["no known allergy pattern matched — treated conservatively".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<AllergyRule> {
        vec![
            AllergyRule {
                severity: AllergySeverity::SeverePcn,
                keyword_list: vec!["anaphylaxis".into(), "sjs".into(), "angioedema".into()],
                allowed_classes: vec!["monobactam".into()],
                forbidden_classes: vec!["penicillin".into(), "cephalosporin".into(), "carbapenem".into()],
                cross_reactivity_pct: 1.0,
            },
            AllergyRule {
                severity: AllergySeverity::MildPcn,
                keyword_list: vec!["rash".into(), "hives".into()],
                allowed_classes: vec!["cephalosporin".into(), "carbapenem".into()],
                forbidden_classes: vec!["penicillin".into()],
                cross_reactivity_pct: 2.0,
            },
        ]
    }

    #[test]
    fn empty_text_is_none() {
        let c = classify(None, &rules());
        assert_eq!(c.severity, AllergySeverity::None);
        assert!(c.forbidden_classes.is_empty());
    }

    #[test]
    fn nkda_token_is_none() {
        let c = classify(Some("NKDA"), &rules());
        assert_eq!(c.severity, AllergySeverity::None);
    }

    #[test]
    fn anaphylaxis_matches_severe_before_mild_keywords() {
        let c = classify(Some("Penicillin (anaphylaxis), also some rash"), &rules());
        assert_eq!(c.severity, AllergySeverity::SeverePcn);
        assert!(c.forbidden_classes.contains(&"cephalosporin".to_string()));
    }

    #[test]
    fn mild_rash_matches_mild_rule() {
        let c = classify(Some("isolated rash with amoxicillin"), &rules());
        assert_eq!(c.severity, AllergySeverity::MildPcn);
        assert!(!c.forbidden_classes.contains(&"cephalosporin".to_string()));
    }

    #[test]
    fn unmatched_nonempty_text_defaults_to_severe_and_notes_it() {
        let c = classify(Some("some vague reaction nobody wrote down"), &rules());
        assert_eq!(c.severity, AllergySeverity::SeverePcn);
        assert!(!c.notes.is_empty());
    }
}
