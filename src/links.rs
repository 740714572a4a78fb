//! Proximity links between particles.
//!
//! Every unordered pair is checked each frame, O(n²), with no spatial index.
//! At the densities a page background uses (one particle per ~10k px²) that
//! is a few thousand distance checks.
//!
//! Which links get the highlight style is decided by a [`Highlight`]
//! implementation. The default, [`RandomHighlight`], flips a biased coin per
//! link per frame; tests swap in [`NeverHighlight`], [`AlwaysHighlight`] or a
//! closure.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decides whether the link between particles `a` and `b` (`a < b`) is drawn
/// in the highlight style this frame.
///
/// The decision only affects style. A link inside the proximity threshold
/// is drawn either way.
pub trait Highlight {
    fn highlight(&mut self, a: usize, b: usize) -> bool;
}

impl<F> Highlight for F
where
    F: FnMut(usize, usize) -> bool,
{
    fn highlight(&mut self, a: usize, b: usize) -> bool {
        self(a, b)
    }
}

/// Never highlights.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverHighlight;

impl Highlight for NeverHighlight {
    fn highlight(&mut self, _a: usize, _b: usize) -> bool {
        false
    }
}

/// Always highlights.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysHighlight;

impl Highlight for AlwaysHighlight {
    fn highlight(&mut self, _a: usize, _b: usize) -> bool {
        true
    }
}

/// Independent per-link, per-frame coin flip.
#[derive(Debug, Clone)]
pub struct RandomHighlight {
    chance: f64,
    rng: StdRng,
}

impl RandomHighlight {
    /// `chance` is clamped to `0.0..=1.0`.
    pub fn new(chance: f64) -> Self {
        Self::with_rng(chance, StdRng::from_entropy())
    }

    pub fn seeded(chance: f64, seed: u64) -> Self {
        Self::with_rng(chance, StdRng::seed_from_u64(seed))
    }

    fn with_rng(chance: f64, rng: StdRng) -> Self {
        let chance = if chance.is_finite() {
            chance.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { chance, rng }
    }

    pub fn chance(&self) -> f64 {
        self.chance
    }
}

impl Highlight for RandomHighlight {
    fn highlight(&mut self, _a: usize, _b: usize) -> bool {
        self.rng.gen_bool(self.chance)
    }
}

/// Two particles within linking distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Index of the first particle (`a < b`).
    pub a: usize,
    pub b: usize,
    pub from: Vec2,
    pub to: Vec2,
    pub distance: f32,
}

/// Visit every pair `(i, j)` with `i < j` whose points are closer than
/// `proximity`, in index order.
pub fn for_each_link(points: &[Vec2], proximity: f32, mut visit: impl FnMut(Link)) {
    if proximity <= 0.0 {
        return;
    }
    let threshold_sq = proximity * proximity;
    for (i, &from) in points.iter().enumerate() {
        for (j, &to) in points.iter().enumerate().skip(i + 1) {
            let distance_sq = from.distance_squared(to);
            if distance_sq < threshold_sq {
                visit(Link {
                    a: i,
                    b: j,
                    from,
                    to,
                    distance: distance_sq.sqrt(),
                });
            }
        }
    }
}

/// Collect the links [`for_each_link`] would visit.
pub fn find_links(points: &[Vec2], proximity: f32) -> Vec<Link> {
    let mut links = Vec::new();
    for_each_link(points, proximity, |link| links.push(link));
    links
}
