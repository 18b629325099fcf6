//! Letter slots and letter tray for the spelling games.

use crate::config::LayoutConfig;
use crate::geometry::{Canvas, Orientation, Point};
use crate::ids::{IdSeq, TargetId, TokenId};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Rows wrapped to the canvas width.
    Grid,
    /// Evenly spaced along a sine wave.
    Curve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Correct,
    Incorrect,
}

/// Slot for one character of the target word.
#[derive(Debug, Clone, PartialEq)]
pub struct LetterTarget {
    pub id: TargetId,
    pub index: usize,
    /// Center of the slot.
    pub position: Point,
    pub expected: char,
    pub filled: Option<char>,
    pub verdict: Option<Verdict>,
    /// Shown from the start; never takes a token.
    pub prefilled: bool,
}

impl LetterTarget {
    pub fn is_open(&self) -> bool {
        self.filled.is_none()
    }

    pub fn is_satisfied(&self) -> bool {
        self.filled == Some(self.expected)
    }

    /// Keeps its content across a relayout.
    fn is_settled(&self) -> bool {
        self.prefilled || self.verdict == Some(Verdict::Correct)
    }
}

/// A draggable letter in the tray.
#[derive(Debug, Clone, PartialEq)]
pub struct LetterToken {
    pub id: TokenId,
    pub letter: char,
    /// False for decoys.
    pub contributes: bool,
    /// Logical tray slot center, used for hit-testing.
    pub slot: Point,
    /// Cosmetic offset from `slot`.
    pub jitter: (f64, f64),
    pub rotation_deg: f64,
    /// Sitting on a target while an incorrect attempt is shown.
    pub held: bool,
}

impl LetterToken {
    pub fn display_position(&self) -> Point {
        self.slot.offset(self.jitter.0, self.jitter.1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordLayout {
    pub word: String,
    pub mode: LayoutMode,
    /// Mode the positions were actually computed with.
    pub effective_mode: LayoutMode,
    pub targets: Vec<LetterTarget>,
    pub tokens: Vec<LetterToken>,
}

impl WordLayout {
    pub fn is_complete(&self) -> bool {
        self.targets.iter().all(LetterTarget::is_satisfied)
    }

    pub fn target(&self, id: TargetId) -> Option<&LetterTarget> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn target_mut(&mut self, id: TargetId) -> Option<&mut LetterTarget> {
        self.targets.iter_mut().find(|t| t.id == id)
    }

    pub fn token(&self, id: TokenId) -> Option<&LetterToken> {
        self.tokens.iter().find(|t| t.id == id)
    }

    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut LetterToken> {
        self.tokens.iter_mut().find(|t| t.id == id)
    }

    pub fn open_targets(&self) -> impl Iterator<Item = &LetterTarget> {
        self.targets.iter().filter(|t| t.is_open())
    }
}

/// Canonical case used for comparisons and display.
pub fn normalize_word(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Case-insensitive letter comparison.
pub fn same_letter(a: char, b: char) -> bool {
    a.to_uppercase().eq(b.to_uppercase())
}

/// Blank count for the fill game: half the letters, at least one, at most `max`.
pub fn blank_count(letters: usize, max: usize) -> usize {
    if letters == 0 {
        return 0;
    }
    letters.div_ceil(2).clamp(1, max.max(1)).min(letters)
}

/// Decoys added next to `contributors` correct tokens.
pub fn decoy_count(contributors: usize) -> usize {
    if contributors == 0 {
        0
    } else {
        (contributors / 2).max(1)
    }
}

/// Sine amplitude (as a share of the cross axis) and cycles over the word.
fn curve_shape(letters: usize) -> (f64, f64) {
    match letters {
        0..=4 => (0.12, 0.5),
        5..=7 => (0.18, 1.0),
        8..=10 => (0.24, 1.5),
        _ => (0.30, 2.0),
    }
}

fn symmetric<R: Rng + ?Sized>(rng: &mut R, bound: f64) -> f64 {
    if bound > 0.0 {
        rng.gen_range(-bound..=bound)
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
pub struct SlotLayoutGenerator {
    config: LayoutConfig,
}

impl SlotLayoutGenerator {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out `word` and builds its shuffled letter pool.
    ///
    /// With `subset`, only a few letters are blank and everything else is shown
    /// pre-filled; otherwise every letter is blank. Non-letters are always pre-filled.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        word: &str,
        canvas: Canvas,
        mode: LayoutMode,
        subset: bool,
        ids: &mut IdSeq,
        rng: &mut R,
    ) -> WordLayout {
        let word = normalize_word(word);
        let chars: Vec<char> = word.chars().collect();
        let (positions, effective_mode) = self.target_positions(chars.len(), canvas, mode);

        let letters: Vec<usize> = chars
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| i)
            .collect();
        let blanks: Vec<usize> = if subset {
            let n = blank_count(letters.len(), self.config.max_blanks);
            let mut picked: Vec<usize> = index::sample(rng, letters.len(), n)
                .into_iter()
                .map(|i| letters[i])
                .collect();
            picked.sort_unstable();
            picked
        } else {
            letters
        };

        let targets: Vec<LetterTarget> = chars
            .iter()
            .zip(positions)
            .enumerate()
            .map(|(index, (&expected, position))| {
                let blank = blanks.binary_search(&index).is_ok();
                LetterTarget {
                    id: ids.next_target(),
                    index,
                    position,
                    expected,
                    filled: (!blank).then_some(expected),
                    verdict: None,
                    prefilled: !blank,
                }
            })
            .collect();

        let mut letters_needed: Vec<char> = targets
            .iter()
            .filter(|t| t.is_open())
            .map(|t| t.expected)
            .collect();
        let decoys = self.decoys(&chars, decoy_count(letters_needed.len()), rng);

        let mut pool: Vec<(char, bool)> = letters_needed.drain(..).map(|c| (c, true)).collect();
        pool.extend(decoys.into_iter().map(|c| (c, false)));
        pool.shuffle(rng);

        let tokens = self
            .tray_slots(pool.len(), canvas)
            .into_iter()
            .zip(pool)
            .map(|(slot, (letter, contributes))| LetterToken {
                id: ids.next_token(),
                letter,
                contributes,
                slot,
                jitter: (
                    symmetric(rng, self.config.jitter),
                    symmetric(rng, self.config.jitter),
                ),
                rotation_deg: symmetric(rng, self.config.max_rotation_deg),
                held: false,
            })
            .collect();

        WordLayout {
            word,
            mode,
            effective_mode,
            targets,
            tokens,
        }
    }

    /// Recomputes positions for a new canvas.
    ///
    /// Correctly filled and pre-filled slots keep their content by index; every other
    /// slot is reopened. The remaining tokens keep their ids and letters and are laid
    /// into the new tray.
    pub fn regenerate<R: Rng + ?Sized>(
        &self,
        previous: &WordLayout,
        canvas: Canvas,
        rng: &mut R,
    ) -> WordLayout {
        let (positions, effective_mode) =
            self.target_positions(previous.targets.len(), canvas, previous.mode);

        let targets = previous
            .targets
            .iter()
            .zip(positions)
            .map(|(old, position)| {
                let mut target = old.clone();
                target.position = position;
                if !old.is_settled() {
                    target.filled = None;
                    target.verdict = None;
                }
                target
            })
            .collect();

        let tokens = self
            .tray_slots(previous.tokens.len(), canvas)
            .into_iter()
            .zip(previous.tokens.iter())
            .map(|(slot, old)| LetterToken {
                slot,
                jitter: (
                    symmetric(rng, self.config.jitter),
                    symmetric(rng, self.config.jitter),
                ),
                rotation_deg: symmetric(rng, self.config.max_rotation_deg),
                held: false,
                ..old.clone()
            })
            .collect();

        WordLayout {
            word: previous.word.clone(),
            mode: previous.mode,
            effective_mode,
            targets,
            tokens,
        }
    }

    /// Slot centers for a word of `count` characters.
    ///
    /// Curve mode falls back to the grid when the progression axis is too short to
    /// keep neighbouring slots apart.
    pub fn target_positions(
        &self,
        count: usize,
        canvas: Canvas,
        mode: LayoutMode,
    ) -> (Vec<Point>, LayoutMode) {
        match mode {
            LayoutMode::Curve => match self.curve_positions(count, canvas) {
                Some(points) => (points, LayoutMode::Curve),
                None => {
                    tracing::debug!(count, "word too long for curve, using grid");
                    (self.grid_positions(count, canvas), LayoutMode::Grid)
                }
            },
            LayoutMode::Grid => (self.grid_positions(count, canvas), LayoutMode::Grid),
        }
    }

    fn band(&self, canvas: Canvas) -> (f64, f64) {
        let top = self.config.top_reserved;
        let bottom = (canvas.height - self.config.bottom_reserved).max(top);
        (top, bottom - top)
    }

    fn grid_positions(&self, count: usize, canvas: Canvas) -> Vec<Point> {
        let (top, height) = self.band(canvas);
        self.wrapped_centers(count, canvas.width, top, height)
    }

    fn curve_positions(&self, count: usize, canvas: Canvas) -> Option<Vec<Point>> {
        if count == 0 {
            return Some(Vec::new());
        }
        let t = self.config.token_size;
        let m = self.config.margin;
        let (band_top, band_height) = self.band(canvas);
        let (amp_share, cycles) = curve_shape(count);
        let phase = |i: usize| {
            let progress = if count > 1 {
                i as f64 / (count - 1) as f64
            } else {
                0.0
            };
            (TAU * cycles * progress).sin()
        };

        match canvas.orientation() {
            Orientation::Portrait => {
                let spacing = band_height / count as f64;
                if spacing < t + self.config.gap {
                    return None;
                }
                let center_x = canvas.width / 2.0;
                let max_amp = (canvas.width / 2.0 - m - t / 2.0).max(0.0);
                let amp = (amp_share * canvas.width).min(max_amp);
                Some(
                    (0..count)
                        .map(|i| {
                            Point::new(
                                center_x + amp * phase(i),
                                band_top + spacing * (i as f64 + 0.5),
                            )
                        })
                        .collect(),
                )
            }
            Orientation::Landscape => {
                let axis = (canvas.width - 2.0 * m).max(0.0);
                let spacing = axis / count as f64;
                if spacing < t + self.config.gap {
                    return None;
                }
                let center_y = band_top + band_height / 2.0;
                let max_amp = (band_height / 2.0 - t / 2.0).max(0.0);
                let amp = (amp_share * band_height).min(max_amp);
                Some(
                    (0..count)
                        .map(|i| {
                            Point::new(m + spacing * (i as f64 + 0.5), center_y + amp * phase(i))
                        })
                        .collect(),
                )
            }
        }
    }

    /// Logical tray slots, filled row by row under the word.
    ///
    /// The tray grows upward into the reserved bottom area when the pool needs more
    /// rows than `tray_height` holds, and packs its rows tighter past that.
    fn tray_slots(&self, count: usize, canvas: Canvas) -> Vec<Point> {
        let floor = (canvas.height - self.config.margin).max(0.0);
        let ceiling = (canvas.height - self.config.bottom_reserved).clamp(0.0, floor);
        let room = (floor - ceiling).max(self.config.tray_height.min(floor));
        let (_, rows) = self.grid_shape(count, canvas.width);
        let height = self
            .config
            .tray_height
            .max(self.block_height(rows))
            .min(room);
        self.wrapped_centers(count, canvas.width, floor - height, height)
    }

    /// Columns and rows of a centered grid holding `count` cells.
    fn grid_shape(&self, count: usize, width: f64) -> (usize, usize) {
        let t = self.config.token_size;
        let g = self.config.gap;
        let avail = (width - 2.0 * self.config.margin).max(t);
        let cols = (((avail + g) / (t + g)).floor() as usize).clamp(1, count.max(1));
        (cols, count.div_ceil(cols))
    }

    fn block_height(&self, rows: usize) -> f64 {
        match rows {
            0 => 0.0,
            n => n as f64 * self.config.token_size + (n - 1) as f64 * self.config.gap,
        }
    }

    /// Centers of `count` cells wrapped into rows, each row centered horizontally and
    /// the whole block centered vertically in `[top, top + height]`.
    ///
    /// Rows that do not fit at full pitch are squeezed together so the block never
    /// leaves the band.
    fn wrapped_centers(&self, count: usize, width: f64, top: f64, height: f64) -> Vec<Point> {
        if count == 0 {
            return Vec::new();
        }
        let t = self.config.token_size;
        let g = self.config.gap;
        let (cols, rows) = self.grid_shape(count, width);

        let full = self.block_height(rows);
        let pitch = if full > height && rows > 1 {
            ((height - t) / (rows - 1) as f64).max(0.0)
        } else {
            t + g
        };
        let block_height = (rows - 1) as f64 * pitch + t;
        let y0 = top + ((height - block_height) / 2.0).max(0.0);

        (0..count)
            .map(|i| {
                let row = i / cols;
                let col = i % cols;
                let in_row = cols.min(count - row * cols);
                let row_width = in_row as f64 * t + (in_row - 1) as f64 * g;
                let x0 = (width - row_width) / 2.0;
                Point::new(
                    x0 + col as f64 * (t + g) + t / 2.0,
                    y0 + row as f64 * pitch + t / 2.0,
                )
            })
            .collect()
    }

    fn decoys<R: Rng + ?Sized>(&self, word: &[char], count: usize, rng: &mut R) -> Vec<char> {
        let candidates: Vec<char> = self
            .config
            .alphabet
            .to_uppercase()
            .chars()
            .filter(|c| !word.iter().any(|w| same_letter(*w, *c)))
            .collect();
        candidates.choose_multiple(rng, count).copied().collect()
    }
}
