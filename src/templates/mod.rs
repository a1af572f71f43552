//! Team templates: named probability overlays on the canonical topology.
//!
//! A template holds an incomplete mapping
//! `{state key -> {target key -> probability}}`. The composer picks, for
//! every state, the template of the team acting in it and replaces the
//! default probabilities of the targets the template names.
//!
//! Entries are role-agnostic: when a template has no entry for a state but
//! has one for its mirror (`s_set_good` for `r_set_good`), the mirror entry
//! is reflected by swapping every key prefix. Skill entries for the phases
//! both sides play therefore only need to be written once.
//!
//! # Example
//!
//! ```rust
//! use rally_machine::templates::{create_state_machine_from_teams, TeamTemplate};
//! use rust_decimal_macros::dec;
//!
//! let big_server = TeamTemplate::new("big server").with_state(
//!     "s_serve_ready",
//!     [
//!         ("s_serve_ace", dec!(0.15)),
//!         ("s_serve_error", dec!(0.15)),
//!         ("s_serve_in_play", dec!(0.70)),
//!     ],
//! );
//!
//! let machine =
//!     create_state_machine_from_teams(&big_server, &TeamTemplate::intermediate()).unwrap();
//! let serve = machine.get_next_states("s_serve_ready").unwrap();
//! assert_eq!(serve[0].probability, dec!(0.15));
//! ```

mod catalog;
mod composer;
pub mod error;

pub use catalog::{builtin_templates, BEGINNER, ELITE, INTERMEDIATE};
pub use composer::{compose, create_state_machine_from_teams};
pub use error::{CompositionIssue, TemplateCompositionError};

use crate::core::mirror_key;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Probability overrides for one state, keyed by target state.
pub type StateOverrides = BTreeMap<String, Decimal>;

/// A named set of probability overrides representing a skill level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamTemplate {
    pub name: String,
    #[serde(default)]
    pub overrides: BTreeMap<String, StateOverrides>,
}

impl TeamTemplate {
    /// Create an empty template (canonical defaults everywhere).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overrides: BTreeMap::new(),
        }
    }

    /// Override target probabilities of `state`, merging with earlier entries.
    pub fn with_state<K: Into<String>>(
        mut self,
        state: impl Into<String>,
        entries: impl IntoIterator<Item = (K, Decimal)>,
    ) -> Self {
        let overrides = self.overrides.entry(state.into()).or_default();
        for (target, probability) in entries {
            overrides.insert(target.into(), probability);
        }
        self
    }

    /// Parse a template from JSON.
    ///
    /// Probabilities may be given as strings (`"0.12"`) to keep them exact.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Entry written for exactly `state`.
    pub fn entry(&self, state: &str) -> Option<&StateOverrides> {
        self.overrides.get(state)
    }

    /// Overrides applying to `state`: its own entry, otherwise its mirror's
    /// entry reflected to this side.
    pub fn resolve(&self, state: &str) -> Option<Cow<'_, StateOverrides>> {
        if let Some(entry) = self.overrides.get(state) {
            return Some(Cow::Borrowed(entry));
        }
        self.overrides
            .get(&mirror_key(state))
            .map(|entry| Cow::Owned(reflect(entry)))
    }

    /// Copy of this template with every key's team prefix swapped.
    pub fn reflected(&self) -> Self {
        Self {
            name: self.name.clone(),
            overrides: self
                .overrides
                .iter()
                .map(|(state, entry)| (mirror_key(state), reflect(entry)))
                .collect(),
        }
    }

    pub fn elite() -> Self {
        catalog::elite()
    }

    pub fn intermediate() -> Self {
        catalog::intermediate()
    }

    pub fn beginner() -> Self {
        catalog::beginner()
    }
}

fn reflect(entry: &StateOverrides) -> StateOverrides {
    entry
        .iter()
        .map(|(target, probability)| (mirror_key(target), *probability))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn direct_entry_wins_over_mirror() {
        let template = TeamTemplate::new("t")
            .with_state("s_set_good", [("s_attack_kill", dec!(0.5))])
            .with_state("r_set_good", [("r_attack_kill", dec!(0.3))]);

        let resolved = template.resolve("r_set_good").unwrap();
        assert_eq!(resolved.get("r_attack_kill"), Some(&dec!(0.3)));
    }

    #[test]
    fn mirror_entry_is_reflected() {
        let template = TeamTemplate::new("t").with_state(
            "s_attack_blocked",
            [("r_block_kill", dec!(0.2)), ("s_cover", dec!(0.1))],
        );

        let resolved = template.resolve("r_attack_blocked").unwrap();
        assert!(matches!(resolved, Cow::Owned(_)));
        assert_eq!(resolved.get("s_block_kill"), Some(&dec!(0.2)));
        assert_eq!(resolved.get("r_cover"), Some(&dec!(0.1)));
        assert!(template.resolve("r_set_good").is_none());
    }

    #[test]
    fn reflected_template_swaps_every_key() {
        let template = TeamTemplate::elite().reflected();
        assert!(template.entry("r_serve_ready").is_some());
        assert!(template.entry("s_serve_ready").is_none());
        let entry = template.entry("s_reception_perfect").unwrap();
        assert_eq!(entry.get("s_set_perfect"), Some(&dec!(0.74)));
    }

    #[test]
    fn with_state_merges_entries() {
        let template = TeamTemplate::new("t")
            .with_state("s_serve_ready", [("s_serve_ace", dec!(0.1))])
            .with_state("s_serve_ready", [("s_serve_error", dec!(0.1))]);
        assert_eq!(template.entry("s_serve_ready").unwrap().len(), 2);
    }

    #[test]
    fn template_parses_from_json() {
        let json = r#"{
            "name": "custom",
            "overrides": {
                "s_serve_ready": {
                    "s_serve_ace": "0.06",
                    "s_serve_error": "0.10",
                    "s_serve_in_play": "0.84"
                }
            }
        }"#;

        let template = TeamTemplate::from_json(json).unwrap();
        assert_eq!(template.name, "custom");
        let entry = template.entry("s_serve_ready").unwrap();
        assert_eq!(entry.get("s_serve_ace"), Some(&dec!(0.06)));

        let back = TeamTemplate::from_json(&template.to_json().unwrap()).unwrap();
        assert_eq!(back, template);
    }

    #[test]
    fn missing_overrides_default_to_empty() {
        let template = TeamTemplate::from_json(r#"{"name": "plain"}"#).unwrap();
        assert!(template.is_empty());
    }

    #[test]
    fn builtins_are_named_by_key() {
        let templates = builtin_templates();
        assert_eq!(templates.len(), 3);
        assert_eq!(templates[ELITE].name, ELITE);
        assert!(templates[INTERMEDIATE].is_empty());
        assert!(!templates[BEGINNER].is_empty());
    }
}
