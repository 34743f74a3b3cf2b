//! Built-in themes, authored in pattern notation.
//!
//! Every theme shares the 20-bar arrangement below. Ambient drum banks are
//! a single bar of rests; drums enter with the transition fill.

use alloc::vec::Vec;

use crate::notation::{parse_pattern, NotationError};
use crate::pattern::{Part, PatternBank};
use crate::track::{Arrangement, PartBanks, Track, TrackCatalog};

/// Pattern notation for one set of part banks.
#[derive(Clone, Copy, Debug)]
pub struct BankSource {
    pub melody: &'static [&'static str],
    pub harmony: &'static [&'static str],
    pub bass: &'static [&'static str],
    pub drums: &'static [&'static str],
}

/// Pattern notation for one theme.
#[derive(Clone, Copy, Debug)]
pub struct ThemeSource {
    pub id: &'static str,
    pub ambient: BankSource,
    pub active: BankSource,
    pub transition_fill: &'static str,
    pub arrangement: &'static [u8],
}

impl BankSource {
    fn load(&self) -> Result<PartBanks, NotationError> {
        PartBanks::new(
            load_bank(Part::Melody, self.melody)?,
            load_bank(Part::Harmony, self.harmony)?,
            load_bank(Part::Bass, self.bass)?,
            load_bank(Part::Drums, self.drums)?,
        )
    }
}

impl ThemeSource {
    /// Parse and validate the theme.
    pub fn load(&self) -> Result<Track, NotationError> {
        let build = || -> Result<Track, NotationError> {
            Track::new(
                self.id,
                self.ambient.load()?,
                self.active.load()?,
                parse_pattern(Part::Drums, self.transition_fill)?,
                Arrangement::new(self.arrangement)?,
            )
        };
        build().map_err(|e| e.in_theme(self.id))
    }
}

fn load_bank(part: Part, bars: &[&str]) -> Result<PatternBank, NotationError> {
    let patterns = bars.iter().map(|bar| parse_pattern(part, bar)).collect::<Result<Vec<_>, _>>()?;
    PatternBank::new(part, patterns)
}

/// Load every built-in theme into a catalog.
pub fn load_builtin() -> Result<TrackCatalog, NotationError> {
    let tracks = BUILTIN.iter().map(ThemeSource::load).collect::<Result<Vec<_>, _>>()?;
    TrackCatalog::new(tracks)
}

const ARRANGEMENT: &[u8] = &[0, 0, 1, 1, 2, 2, 3, 3, 0, 1, 2, 3, 0, 0, 1, 1, 2, 3, 2, 3];

const SILENT_DRUMS: &[&str] = &[". . . . . . . . . . . . . . . ."];

const STANDARD_FILL: &str = "K . . . K . S . K S K S S S K S";

// --- E minor (default, jungle) ---

const E_MINOR_AMBIENT: BankSource = BankSource {
    melody: &[
        "E3 . . . B3 . . . A3 . . . B3 . . .",
        "E3 . . . B3 . . . G3 . . . E3 . . .",
        "A3 . . . B3 . . . D4 . . . E4 . . .",
        "D4 . . . B3 . . . A3 . . . E3 . . .",
    ],
    harmony: &[
        "E3 . . . . . . . . . . . . . . .",
        "G3 . . . . . . . . . . . . . . .",
        "B3 . . . . . . . . . . . . . . .",
        "E3 . . . . . . . . . . . . . . .",
    ],
    bass: &[
        "E2 . . . . . . . . . . . . . . .",
        "E2 . . . . . . . . . . . . . . .",
        "G2 . . . . . . . . . . . . . . .",
        "E2 . . . . . . . . . . . . . . .",
    ],
    drums: SILENT_DRUMS,
};

const E_MINOR_ACTIVE: BankSource = BankSource {
    melody: &[
        "E4 . E4 G4 . F#4 E4 . D4 . E4 . B3 . . .",
        "E4 . G4 . A4 . B4 . A4 . G4 F#4 E4 . . .",
        "B4 . B4 A4 . G4 . F#4 E4 . F#4 G4 A4 . G4 .",
        "E5 . D5 . B4 . A4 . G4 F#4 E4 . D4 . E4 .",
    ],
    harmony: &[
        ". . B3 . . . B3 . . . A3 . . G3 . .",
        ". . B3 . . . D4 . . . C4 . . B3 . .",
        ". E3 . . E3 . . D3 . . D3 . . C3 . .",
        ". G3 . G3 . . F#3 . . E3 . . D3 . . E3",
    ],
    bass: &[
        "E2 . E2 . E2 . E2 . D2 . D2 . E2 . E2 .",
        "E2 . E2 . G2 . G2 . A2 . A2 . B2 . B2 .",
        "E2 . E2 . D2 . D2 . C2 . C2 . D2 . D2 .",
        "E2 . E2 E2 G2 . F#2 . E2 . D2 . C2 . E2 .",
    ],
    drums: &[
        "K H . H S H . H K H K H S H . H",
        "K H H H S H K H K H H H S H H H",
        "K H K H S H K H K K H H S H K S",
        "K K H K S H K H K K H K S S K S",
    ],
};

// --- E Dorian (dungeon) ---

const E_DORIAN_AMBIENT: BankSource = BankSource {
    melody: &[
        "B3 . . . A3 . . . G3 . . . E3 . . .",
        "B3 . . . C#4 . . . B3 . . . A3 . . .",
        "G3 . . . A3 . . . B3 . . . C#4 . . .",
        "D4 . . . B3 . . . A3 . . . B3 . . .",
    ],
    harmony: &[
        "G3 . . . . . . . . . . . . . . .",
        "A3 . . . . . . . . . . . . . . .",
        "E3 . . . . . . . . . . . . . . .",
        "G3 . . . . . . . . . . . . . . .",
    ],
    bass: &[
        "E2 . . . . . . . . . . . . . . .",
        "A2 . . . . . . . . . . . . . . .",
        "G2 . . . . . . . . . . . . . . .",
        "B2 . . . . . . . . . . . . . . .",
    ],
    drums: SILENT_DRUMS,
};

const E_DORIAN_ACTIVE: BankSource = BankSource {
    melody: &[
        "E5 . B4 . C#5 D5 B4 . A4 . . . E4 . . .",
        "E5 . B4 . C#5 D5 B4 . A4 . B4 . . . . .",
        "E5 . D5 C#5 B4 . A4 . G4 . A4 B4 C#5 . D5 .",
        "B4 . . . A4 . . . G4 . A4 . B4 . D5 E5",
    ],
    harmony: &[
        ". . . . . . . . G3 . . . . . . .",
        ". . . . . . . . E3 . G3 . . . . .",
        ". . A3 . . . G3 . . . . . A3 . . .",
        ". . . . G3 . . . . . . . . . G3 G3",
    ],
    bass: &[
        "E2 . E2 E2 E2 . E2 E2 E2 . E2 E2 E2 . E2 E2",
        "A2 . A2 A2 A2 . A2 A2 A2 . A2 A2 B2 . B2 B2",
        "E2 . E2 E2 E2 . E2 E2 E2 . E2 E2 E2 . E2 E2",
        "B2 . B2 B2 B2 . B2 B2 E2 . E2 E2 E2 . E2 E2",
    ],
    drums: &[
        "K . . K . K . . S . . K . K . .",
        "K . . K . K H . S . . K . K H .",
        "K K . K S . K K . K . K S . K S",
        "K . . K S . . . K . . . K . K K",
    ],
};

// --- E Phrygian dominant (desert) ---

const DESERT_AMBIENT: BankSource = BankSource {
    melody: &[
        "E3 . . . G#3 . . . A3 . . . B3 . . .",
        "C4 . . . B3 . . . A3 . . . G#3 . . .",
        "A3 . . . B3 . . . C4 . . . D4 . . .",
        "C4 . . . A3 . . . G#3 . . . B3 . . .",
    ],
    harmony: &[
        "B2 . . . . . . . . . . . . . . .",
        "E3 . . . . . . . . . . . . . . .",
        "G#3 . . . . . . . . . . . . . . .",
        "E3 . . . . . . . . . . . . . . .",
    ],
    bass: &[
        "E2 . . . . . . . . . . . . . . .",
        "A2 . . . . . . . . . . . . . . .",
        "G#2 . . . . . . . . . . . . . . .",
        "B2 . . . . . . . . . . . . . . .",
    ],
    drums: SILENT_DRUMS,
};

const DESERT_ACTIVE: BankSource = BankSource {
    melody: &[
        "E4 . F4 G#4 . A4 G#4 . F4 . E4 . D4 E4 F4 .",
        "G#4 . A4 . B4 . C5 . B4 . A4 G#4 . F4 G#4 A4",
        "B4 . C5 B4 A4 . G#4 . A4 . B4 . A4 . G#4 F4",
        "G#4 . F4 E4 D4 . E4 . F4 . E4 . D4 . F4 E4",
    ],
    harmony: &[
        ". . B3 . . . G#3 . . . B3 . . G#3 . .",
        ". . . . G#3 . . . B3 . G#3 . . . E3 .",
        ". G#3 . . . . B3 . . . G#3 . . . B3 .",
        ". . B3 . . . G#3 . . . G#3 . . . B3 B3",
    ],
    bass: &[
        "E2 . E2 E2 E2 . E2 E2 F2 . F2 F2 E2 . E2 E2",
        "E2 . E2 E2 G#2 . G#2 G#2 A2 . A2 A2 B2 . B2 B2",
        "A2 . A2 A2 G#2 . G#2 G#2 F2 . F2 F2 E2 . E2 E2",
        "F2 . F2 F2 E2 . E2 E2 D2 . D2 D2 E2 . E2 E2",
    ],
    drums: &[
        "K H H K S H H K K H H K S H H K",
        "K H K K S H H K K H K K S H K H",
        "K K H K S H K H K K H K S K K S",
        "K H H K S H K K K H H K S S K H",
    ],
};

// --- C harmonic minor (ice) ---

const ICE_AMBIENT: BankSource = BankSource {
    melody: &[
        "C3 . . . . . . . G3 . . . . . . .",
        "F3 . . . . . . . D#3 . . . . . . .",
        "G#3 . . . . . . . G3 . . . . . . .",
        "D3 . . . . . . . C3 . . . . . . .",
    ],
    harmony: &[
        "D#3 . . . . . . . . . . . . . . .",
        "G3 . . . . . . . . . . . . . . .",
        "D#3 . . . . . . . . . . . . . . .",
        "G3 . . . . . . . . . . . . . . .",
    ],
    bass: &[
        "C2 . . . . . . . . . . . . . . .",
        "G2 . . . . . . . . . . . . . . .",
        "G#2 . . . . . . . . . . . . . . .",
        "G2 . . . . . . . . . . . . . . .",
    ],
    drums: SILENT_DRUMS,
};

const ICE_ACTIVE: BankSource = BankSource {
    melody: &[
        "G4 . . . . . F4 D#4 D4 . . . C4 . . .",
        "G4 . . . . . G#4 G4 F4 . . . D#4 . . .",
        "B4 . G4 G#4 B4 . G4 . F4 . . . D#4 . . .",
        "F4 . . . D#4 . D4 . D#4 . . . . . B3 C4",
    ],
    harmony: &[
        ". . . . . . . . D#3 . . . . . . .",
        ". . . . . . . . G3 . . . . . . .",
        ". . D#3 . . . G3 . . . . . G3 . . .",
        ". . . . G3 . . . . . . . . . D#3 D#3",
    ],
    bass: &[
        "C2 . . . . . . . C2 . . . . . . .",
        "D#2 . . . . . . . D#2 . . . . . . .",
        "G2 . . . . . . . F2 . . . . . . .",
        "G#2 . . . . . . . G2 . . . C2 . . .",
    ],
    drums: &[
        "K . . . S . . . K . . . S . . .",
        "K . . H S . . . K . . H S . . .",
        "K K H K S H K H K K H K S K K S",
        "K . . . S . . . K . . . S . K K",
    ],
};

// --- D harmonic minor (volcano) ---

const VOLCANO_AMBIENT: BankSource = BankSource {
    melody: &[
        "D3 . . . A3 . . . G3 . . . F3 . . .",
        "E3 . . . F3 . . . E3 . . . C#3 . . .",
        "A3 . . . D4 . . . C#4 . . . A3 . . .",
        "F3 . . . E3 . . . D3 . . . A3 . . .",
    ],
    harmony: &[
        "D3 . . . . . . . . . . . . . . .",
        "A#2 . . . . . . . . . . . . . . .",
        "F3 . . . . . . . . . . . . . . .",
        "D3 . . . . . . . . . . . . . . .",
    ],
    bass: &[
        "D2 . . . . . . . . . . . . . . .",
        "A#1 . . . . . . . . . . . . . . .",
        "F2 . . . . . . . . . . . . . . .",
        "A2 . . . . . . . . . . . . . . .",
    ],
    drums: SILENT_DRUMS,
};

const VOLCANO_ACTIVE: BankSource = BankSource {
    melody: &[
        "D4 . D4 F4 . G4 A4 . A#4 . A4 . G4 F4 E4 .",
        "F4 . G4 . A4 . C#5 . D5 . C#5 A4 . A#4 A4 G4",
        "A4 . A#4 A4 G4 . A4 . D5 . C#5 . A#4 . A4 G4",
        "A4 . G4 F4 E4 . F4 . G4 . F4 . E4 . C#4 D4",
    ],
    harmony: &[
        ". . F3 . . . F3 . . . F3 . . A3 . .",
        ". . . . F3 . . . A#3 . A3 . . . F3 .",
        ". F3 . . . . F3 . . . A3 . . . F3 .",
        ". . E3 . . . A3 . . . A3 . . . F3 F3",
    ],
    bass: &[
        "D2 . D2 D2 D2 . D2 D2 C#2 . C#2 C#2 D2 . D2 D2",
        "D2 . D2 D2 F2 . F2 F2 G2 . G2 G2 A2 . A2 A2",
        "A2 . A2 A2 G2 . G2 G2 F2 . F2 F2 E2 . E2 E2",
        "A2 . A2 A2 A2 . A2 A2 A2 . A2 A2 D2 . D2 D2",
    ],
    drums: &[
        "K H H K S H H K K H H K S H H K",
        "K H K K S H K H K H K K S H K H",
        "K K H K S K K H K K H K S K K S",
        "K H K H S H K K K H H K S S K S",
    ],
};

/// All compiled-in themes.
pub static BUILTIN: &[ThemeSource] = &[
    ThemeSource {
        id: "default",
        ambient: E_MINOR_AMBIENT,
        active: E_MINOR_ACTIVE,
        transition_fill: STANDARD_FILL,
        arrangement: ARRANGEMENT,
    },
    ThemeSource {
        id: "dungeon",
        ambient: E_DORIAN_AMBIENT,
        active: E_DORIAN_ACTIVE,
        transition_fill: STANDARD_FILL,
        arrangement: ARRANGEMENT,
    },
    ThemeSource {
        id: "jungle",
        ambient: E_MINOR_AMBIENT,
        active: E_MINOR_ACTIVE,
        transition_fill: STANDARD_FILL,
        arrangement: ARRANGEMENT,
    },
    ThemeSource {
        id: "desert",
        ambient: DESERT_AMBIENT,
        active: DESERT_ACTIVE,
        transition_fill: "K . . . K . K . S . K S S S K S",
        arrangement: ARRANGEMENT,
    },
    ThemeSource {
        id: "ice",
        ambient: ICE_AMBIENT,
        active: ICE_ACTIVE,
        transition_fill: "K . . . K . K K K S K S S S K S",
        arrangement: ARRANGEMENT,
    },
    ThemeSource {
        id: "volcano",
        ambient: VOLCANO_AMBIENT,
        active: VOLCANO_ACTIVE,
        transition_fill: "K . . . K . K K K K S K S S K S",
        arrangement: ARRANGEMENT,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{Step, MAX_VARIANTS};
    use crate::track::DEFAULT_THEME;

    #[test]
    fn all_builtin_themes_load() {
        for source in BUILTIN {
            let track = source.load().unwrap_or_else(|e| panic!("{}", e));
            assert_eq!(track.name(), source.id);
            assert_eq!(track.arrangement().len(), 20);
            for part in Part::ALL {
                assert!(track.active().bank(part).len() == MAX_VARIANTS, "{} {}", source.id, part);
            }
        }
    }

    #[test]
    fn catalog_has_default_and_six_themes() {
        let catalog = load_builtin().unwrap();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.default_track().name(), DEFAULT_THEME);
        for id in ["default", "dungeon", "jungle", "desert", "ice", "volcano"] {
            assert!(catalog.get(id).is_some(), "missing {}", id);
        }
    }

    #[test]
    fn ambient_drums_are_silent() {
        let catalog = load_builtin().unwrap();
        for id in catalog.theme_ids() {
            let track = catalog.get_or_default(id);
            let drums = track.ambient().bank(Part::Drums);
            assert!(drums.iter().all(|p| p.event_count() == 0), "{} has ambient drums", id);
        }
    }

    #[test]
    fn fills_end_on_a_snare_run() {
        let catalog = load_builtin().unwrap();
        for id in catalog.theme_ids() {
            let fill = catalog.get_or_default(id).transition_fill().clone();
            assert!(!fill.step(0).is_rest());
            assert_eq!(fill.step(13), Step::Hit(crate::pattern::DrumHit::Snare), "{}", id);
        }
    }

    #[test]
    fn bad_source_reports_theme() {
        let bad = ThemeSource {
            id: "broken",
            ambient: E_MINOR_AMBIENT,
            active: E_MINOR_ACTIVE,
            transition_fill: "K . K",
            arrangement: ARRANGEMENT,
        };
        let err = bad.load().unwrap_err();
        assert!(matches!(err, NotationError::Theme { ref theme, .. } if theme == "broken"));
    }
}
