//! Script catalog: the fixed narrative beats of each case type
//!
//! A script is consumed strictly in order, one beat per accepted question.
//! Beats are never replayed or reordered.

use crate::data::{CaseStatus, CaseType, Clue, SuspectProfile};
use std::collections::HashMap;

/// One scripted step of a case
#[derive(Debug, Clone)]
pub struct ScriptBeat {
    pub response: String,
    pub new_clues: Vec<Clue>,
    pub suspects: Option<Vec<SuspectProfile>>,  // Replaces the whole roster when set
    pub status: Option<CaseStatus>,
}

impl ScriptBeat {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            new_clues: Vec::new(),
            suspects: None,
            status: None,
        }
    }

    pub fn revealing(mut self, clue: Clue) -> Self {
        self.new_clues.push(clue);
        self
    }

    pub fn with_suspects(mut self, suspects: Vec<SuspectProfile>) -> Self {
        self.suspects = Some(suspects);
        self
    }

    pub fn with_status(mut self, status: CaseStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// The complete script for one case type
#[derive(Debug, Clone)]
pub struct Script {
    pub title: String,
    pub synopsis: String,
    pub suspects: Vec<SuspectProfile>,  // Initial roster
    pub beats: Vec<ScriptBeat>,
}

/// Scripts keyed by case type
#[derive(Debug, Clone, Default)]
pub struct ScriptCatalog {
    scripts: HashMap<CaseType, Script>,
}

impl ScriptCatalog {
    /// A catalog with no scripts
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in scripts for every case type
    pub fn standard() -> Self {
        let mut catalog = Self::empty();
        catalog.register(CaseType::Homicide, casebook::homicide());
        catalog.register(CaseType::MissingPerson, casebook::missing_person());
        catalog.register(CaseType::Heist, casebook::heist());
        catalog
    }

    pub fn register(&mut self, case_type: CaseType, script: Script) {
        self.scripts.insert(case_type, script);
    }

    pub fn get(&self, case_type: CaseType) -> Option<&Script> {
        self.scripts.get(&case_type)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

/// Built-in case scripts
pub mod casebook {
    use super::*;
    use crate::data::{ClueCategory, TrustLevel};

    pub fn homicide() -> Script {
        let suspects = vec![
            SuspectProfile::new(
                "Ali Demir",
                "Former prosecutor",
                "Lost the case the victim threatened to reopen",
                "Claims he was home alone at 21:00",
                TrustLevel::Skeptical,
            ),
            SuspectProfile::new(
                "Zeynep Korkmaz",
                "Journalist",
                "Wanted the murder series as her headline",
                "Says she was live on air",
                TrustLevel::Cooperative,
            ),
        ];

        // Ali admits he was at the hotel once the glass is traced to him
        let confronted: Vec<SuspectProfile> = suspects
            .iter()
            .map(|s| {
                if s.name == "Ali Demir" {
                    s.revised(TrustLevel::Hostile, "Was at the hotel at 22:15 but left shortly after")
                } else {
                    s.clone()
                }
            })
            .collect();

        Script {
            title: "Blood in Room 12".to_string(),
            synopsis: "A murder in a luxury hotel room. Does it point to a political plot?".to_string(),
            suspects: suspects.clone(),
            beats: vec![
                ScriptBeat::new(
                    "You find a note at the scene. It reads: 'Don't leave me alone.' The room is a mess, \
                     the window is ajar and there is broken glass on the floor.",
                )
                .revealing(Clue::new(
                    "Handwritten Note",
                    "The note says 'Don't leave me alone.' The ink is fresh.",
                    ClueCategory::Document,
                ))
                .with_suspects(suspects.clone())
                .with_status(CaseStatus::Investigation),
                ScriptBeat::new(
                    "No fingerprints, but the handwriting matches an old letter from Ali Demir. \
                     The hotel camera went dark at 22:13.",
                )
                .revealing(Clue::new(
                    "Camera Gap",
                    "No footage between 22:13 and 22:27.",
                    ClueCategory::Document,
                ))
                .with_suspects(suspects.clone()),
                ScriptBeat::new(
                    "Ali Demir admits he was at the hotel at 22:15 but swears the victim was alive. \
                     Zeynep says the broken glass came from a tumbler Ali smashed.",
                )
                .revealing(Clue::new(
                    "Broken Crystal Tumbler",
                    "A glass from Ali Demir's own collection.",
                    ClueCategory::PhysicalEvidence,
                ))
                .with_suspects(confronted),
                ScriptBeat::new(
                    "You recover the camera footage. After Ali leaves, someone else walks in. \
                     Zeynep claims the figure is a hotel employee.",
                )
                .revealing(Clue::new(
                    "Mysterious Silhouette",
                    "The camera caught a faceless figure leaving the room.",
                    ClueCategory::PhysicalEvidence,
                ))
                .with_suspects(suspects.clone()),
                ScriptBeat::new(
                    "You prove the silhouette is the hotel's head of security. He confesses to hiding \
                     evidence on behalf of a local politician. Case solved: a chain of political \
                     blackmail sits behind it.",
                )
                .with_suspects(suspects)
                .with_status(CaseStatus::Solved),
            ],
        }
    }

    pub fn missing_person() -> Script {
        let suspects = vec![SuspectProfile::new(
            "Melis Akin",
            "Fashion designer",
            "A secret relationship with the missing reporter",
            "Reportedly on stage at a launch that night",
            TrustLevel::Skeptical,
        )];

        Script {
            title: "The Missing Story".to_string(),
            synopsis: "A young reporter disappeared while chasing a big story.".to_string(),
            suspects: suspects.clone(),
            beats: vec![
                ScriptBeat::new(
                    "On reporter Ayse's desk you find a locked USB stick and a travel ticket. \
                     The ticket shows a midnight departure to Ankara.",
                )
                .revealing(Clue::new(
                    "USB Stick",
                    "Holds an encrypted file labelled 'Operation-F'.",
                    ClueCategory::Document,
                ))
                .with_suspects(suspects.clone())
                .with_status(CaseStatus::Investigation),
                ScriptBeat::new(
                    "Decrypting the USB exposes documents about a bribery ring at city hall. \
                     Ayse's last message says: 'Find me at the terminal if you have to.'",
                )
                .revealing(Clue::new("Last Message", "A request to meet at the bus terminal.", ClueCategory::Document))
                .with_suspects(suspects.clone()),
                ScriptBeat::new(
                    "You catch Melis Akin at the terminal. She says she was meant to meet Ayse, \
                     who never showed. The cameras show Ayse being forced into a minibus.",
                )
                .revealing(Clue::new(
                    "Terminal Camera",
                    "Ayse is pushed into a minibus.",
                    ClueCategory::PhysicalEvidence,
                ))
                .with_suspects(suspects.clone()),
                ScriptBeat::new(
                    "The minibus belongs to the municipal garage. Inside you find Ayse safe, \
                     documents intact. The bribery ring is exposed.",
                )
                .with_suspects(suspects)
                .with_status(CaseStatus::Solved),
            ],
        }
    }

    pub fn heist() -> Script {
        let suspects = vec![SuspectProfile::new(
            "Baran Gunes",
            "Former vault designer",
            "Revenge for his bankrupt company",
            "Claims he was abroad that night",
            TrustLevel::Skeptical,
        )];

        Script {
            title: "The Shadow Vault".to_string(),
            synopsis: "A three-layer security system was beaten. Was there help from inside?".to_string(),
            suspects: suspects.clone(),
            beats: vec![
                ScriptBeat::new(
                    "No sign of forced entry on the vault. The alarm was disabled and only the \
                     opening code was used. Sprayed on the wall: 'The shadows collect their debts.'",
                )
                .revealing(Clue::new(
                    "Graffiti Message",
                    "'The shadows collect their debts.'",
                    ClueCategory::Document,
                ))
                .with_suspects(suspects.clone())
                .with_status(CaseStatus::Investigation),
                ScriptBeat::new(
                    "One of Baran's former students leaked the vault's opening protocol on a forum. \
                     Guard Nurten says Baran was hanging around the vault that evening.",
                )
                .with_suspects(suspects.clone()),
                ScriptBeat::new(
                    "Nurten admits she saw a second key belonging to Baran. The backup codes were \
                     never rotated, and the deputy manager had been mailing them around.",
                )
                .revealing(Clue::new("Mail Chain", "The codes were sent in plain-text email.", ClueCategory::Document))
                .with_suspects(suspects.clone()),
                ScriptBeat::new(
                    "Baran moved the stolen jewels into a multi-signature vault. His partners were \
                     the head of security and the finance director. You arrest all three.",
                )
                .with_suspects(suspects)
                .with_status(CaseStatus::Solved),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_covers_every_case_type() {
        let catalog = ScriptCatalog::standard();
        for case_type in CaseType::ALL {
            let script = catalog.get(case_type).unwrap();
            assert!(!script.beats.is_empty());
            assert!(!script.suspects.is_empty());
        }
    }

    #[test]
    fn every_script_ends_solved() {
        let catalog = ScriptCatalog::standard();
        for case_type in CaseType::ALL {
            let last = catalog.get(case_type).unwrap().beats.last().unwrap();
            assert_eq!(last.status, Some(CaseStatus::Solved));
        }
    }

    #[test]
    fn confrontation_beat_turns_ali_hostile() {
        let script = casebook::homicide();
        let roster = script.beats[2].suspects.as_ref().unwrap();
        let ali = roster.iter().find(|s| s.name == "Ali Demir").unwrap();
        assert_eq!(ali.trust, crate::data::TrustLevel::Hostile);
        assert_eq!(ali.id, script.suspects[0].id);
    }
}
