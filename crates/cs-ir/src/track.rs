//! Tracks and the theme catalog.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::notation::NotationError;
use crate::pattern::{Part, Pattern, PatternBank, MAX_VARIANTS};

/// Theme id used when a lookup misses.
pub const DEFAULT_THEME: &str = "default";

/// Looped sequence of variant indices, one entry per bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Arrangement(Vec<u8>);

impl Arrangement {
    pub fn new(entries: impl Into<Vec<u8>>) -> Result<Self, NotationError> {
        let entries = entries.into();
        if entries.is_empty() {
            return Err(NotationError::EmptyArrangement);
        }
        if let Some(bar) = entries.iter().position(|&v| v as usize >= MAX_VARIANTS) {
            let value = entries[bar];
            return Err(NotationError::VariantOutOfRange { bar, value, max: MAX_VARIANTS });
        }
        Ok(Self(entries))
    }

    /// Variant index for `bar`, looping over the arrangement.
    pub fn variant_for_bar(&self, bar: u64) -> usize {
        self.0[(bar % self.0.len() as u64) as usize] as usize
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; arrangements are never empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One pattern bank per part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartBanks {
    melody: PatternBank,
    harmony: PatternBank,
    bass: PatternBank,
    drums: PatternBank,
}

impl PartBanks {
    pub fn new(
        melody: PatternBank,
        harmony: PatternBank,
        bass: PatternBank,
        drums: PatternBank,
    ) -> Result<Self, NotationError> {
        for (expected, bank) in Part::ALL.iter().zip([&melody, &harmony, &bass, &drums]) {
            if bank.part() != *expected {
                return Err(NotationError::PartMismatch { expected: *expected, found: bank.part() });
            }
        }
        Ok(Self { melody, harmony, bass, drums })
    }

    /// Banks of rests for every part.
    pub fn silent() -> Self {
        Self {
            melody: PatternBank::silent(Part::Melody),
            harmony: PatternBank::silent(Part::Harmony),
            bass: PatternBank::silent(Part::Bass),
            drums: PatternBank::silent(Part::Drums),
        }
    }

    pub fn bank(&self, part: Part) -> &PatternBank {
        match part {
            Part::Melody => &self.melody,
            Part::Harmony => &self.harmony,
            Part::Bass => &self.bass,
            Part::Drums => &self.drums,
        }
    }
}

/// A complete theme: ambient and active banks, a one-bar transition fill and
/// the arrangement both intensities follow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    name: String,
    ambient: PartBanks,
    active: PartBanks,
    transition_fill: Pattern,
    arrangement: Arrangement,
}

impl Track {
    pub fn new(
        name: impl Into<String>,
        ambient: PartBanks,
        active: PartBanks,
        transition_fill: Pattern,
        arrangement: Arrangement,
    ) -> Result<Self, NotationError> {
        if transition_fill.part() != Part::Drums {
            return Err(NotationError::FillNotDrums(transition_fill.part()));
        }
        Ok(Self { name: name.into(), ambient, active, transition_fill, arrangement })
    }

    /// A track that plays nothing.
    pub fn silent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: PartBanks::silent(),
            active: PartBanks::silent(),
            transition_fill: Pattern::silent(Part::Drums),
            arrangement: Arrangement(alloc::vec![0]),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ambient(&self) -> &PartBanks {
        &self.ambient
    }

    pub fn active(&self) -> &PartBanks {
        &self.active
    }

    pub fn transition_fill(&self) -> &Pattern {
        &self.transition_fill
    }

    pub fn arrangement(&self) -> &Arrangement {
        &self.arrangement
    }
}

/// Immutable mapping from theme id to track, with a mandatory default.
#[derive(Clone, Debug)]
pub struct TrackCatalog {
    tracks: BTreeMap<String, Arc<Track>>,
    default: Arc<Track>,
}

impl TrackCatalog {
    /// Build a catalog. One of the tracks must be named [`DEFAULT_THEME`].
    pub fn new(tracks: impl IntoIterator<Item = Track>) -> Result<Self, NotationError> {
        let tracks: BTreeMap<String, Arc<Track>> =
            tracks.into_iter().map(|t| (t.name.clone(), Arc::new(t))).collect();
        let default = tracks
            .get(DEFAULT_THEME)
            .cloned()
            .ok_or(NotationError::MissingDefault(DEFAULT_THEME))?;
        Ok(Self { tracks, default })
    }

    /// The compiled-in themes.
    pub fn builtin() -> Result<Self, NotationError> {
        crate::themes::load_builtin()
    }

    /// A catalog with a single silent default track.
    pub fn silent() -> Self {
        let default = Arc::new(Track::silent(DEFAULT_THEME));
        let mut tracks = BTreeMap::new();
        tracks.insert(String::from(DEFAULT_THEME), default.clone());
        Self { tracks, default }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Track>> {
        self.tracks.get(id)
    }

    /// Track for `id`, falling back to the default.
    pub fn get_or_default(&self, id: &str) -> Arc<Track> {
        self.get(id).unwrap_or(&self.default).clone()
    }

    pub fn default_track(&self) -> &Arc<Track> {
        &self.default
    }

    /// Theme ids in sorted order.
    pub fn theme_ids(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
