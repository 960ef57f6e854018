/// Scroll-driven page effects: one-shot section reveals, stat counters and the navbar state
use log::debug;

use crate::easing::Ease;
use crate::reveal::{eased_progress, ElementState};

/// Vertical offset (pixels) scroll-revealed elements rise from
pub const SCROLL_RISE: f32 = 40.0;

/// Page scroll (pixels) past which the navbar takes its scrolled style
pub const NAVBAR_SCROLL_OFFSET: f32 = 80.0;

/// Kinds of scroll-triggered page elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollKind {
    /// Section headings and copy
    RevealText,
    /// Cards and list items, staggered in rows of three
    RevealUp,
    /// Numbers that count up from zero
    StatNumber,
}

impl ScrollKind {
    pub const ALL: [ScrollKind; 3] = [ScrollKind::RevealText, ScrollKind::RevealUp, ScrollKind::StatNumber];

    /// CSS selector of the page elements of this kind
    pub fn selector(self) -> &'static str {
        match self {
            ScrollKind::RevealText => ".reveal-text",
            ScrollKind::RevealUp => ".reveal-up",
            ScrollKind::StatNumber => ".stat-number",
        }
    }

    /// Fraction of the viewport height an element's top must reach to fire
    pub fn trigger_line(self) -> f32 {
        match self {
            ScrollKind::RevealText => 0.85,
            ScrollKind::RevealUp => 0.88,
            ScrollKind::StatNumber => 0.90,
        }
    }

    pub fn duration(self) -> f32 {
        match self {
            ScrollKind::RevealText => 1.0,
            ScrollKind::RevealUp => 0.8,
            ScrollKind::StatNumber => 2.0,
        }
    }

    pub fn ease(self) -> Ease {
        match self {
            ScrollKind::RevealText | ScrollKind::RevealUp => Ease::Power3Out,
            ScrollKind::StatNumber => Ease::Power2Out,
        }
    }

    /// Start delay after the trigger fires
    pub fn delay(self, index: usize) -> f32 {
        match self {
            ScrollKind::RevealUp => (index % 3) as f32 * 0.1,
            _ => 0.0,
        }
    }
}

/// Fires once, the first time its element's top crosses the trigger line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTrigger {
    pub kind: ScrollKind,
    pub index: usize,
    fired_at: Option<f32>,
}

impl ScrollTrigger {
    pub fn new(kind: ScrollKind, index: usize) -> Self {
        Self {
            kind,
            index,
            fired_at: None,
        }
    }

    pub fn fired_at(&self) -> Option<f32> {
        self.fired_at
    }

    /// `top` is the element's top edge relative to the top of the viewport.
    /// Returns true only on the call that fires the trigger.
    pub fn check(&mut self, top: f32, viewport_height: f32, now: f32) -> bool {
        if self.fired_at.is_some() || top > viewport_height * self.kind.trigger_line() {
            return false;
        }
        self.fired_at = Some(now);
        true
    }

    /// Eased progress of the triggered animation at `now`; 0 before it fires
    pub fn progress(&self, now: f32) -> f32 {
        match self.fired_at {
            Some(fired) => eased_progress(
                self.kind.ease(),
                fired + self.kind.delay(self.index),
                self.kind.duration(),
                now,
            ),
            None => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollElement {
    pub kind: ScrollKind,
    pub index: usize,
    pub state: ElementState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterValue {
    pub index: usize,
    /// `None` until the counter's trigger fires
    pub value: Option<u32>,
}

/// State of every scroll-driven element at one instant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollFrame {
    pub reveals: Vec<ScrollElement>,
    pub counters: Vec<CounterValue>,
    pub navbar_scrolled: bool,
}

/// All scroll-triggered effects of one page
#[derive(Debug, Clone, Default)]
pub struct ScrollEffects {
    reveals: Vec<ScrollTrigger>,
    counters: Vec<(ScrollTrigger, u32)>,
    navbar_scrolled: bool,
}

impl ScrollEffects {
    /// Effects for a page with `reveal_text` and `reveal_up` elements and one
    /// counter per entry of `counter_targets`
    pub fn new(reveal_text: usize, reveal_up: usize, counter_targets: &[u32]) -> Self {
        let reveals = (0..reveal_text)
            .map(|i| ScrollTrigger::new(ScrollKind::RevealText, i))
            .chain((0..reveal_up).map(|i| ScrollTrigger::new(ScrollKind::RevealUp, i)))
            .collect();
        let counters = counter_targets
            .iter()
            .enumerate()
            .map(|(i, &target)| (ScrollTrigger::new(ScrollKind::StatNumber, i), target))
            .collect();
        Self {
            reveals,
            counters,
            navbar_scrolled: false,
        }
    }

    pub fn navbar_scrolled(&self) -> bool {
        self.navbar_scrolled
    }

    /// React to a scroll position.
    ///
    /// `top_of(kind, index)` reports an element's top relative to the viewport,
    /// or `None` if the element is missing. Returns how many triggers fired.
    pub fn on_scroll<F>(&mut self, scroll_y: f32, viewport_height: f32, now: f32, mut top_of: F) -> usize
    where
        F: FnMut(ScrollKind, usize) -> Option<f32>,
    {
        let scrolled = scroll_y > NAVBAR_SCROLL_OFFSET;
        if scrolled != self.navbar_scrolled {
            debug!("navbar scrolled: {}", scrolled);
            self.navbar_scrolled = scrolled;
        }

        let triggers = self
            .reveals
            .iter_mut()
            .chain(self.counters.iter_mut().map(|(trigger, _)| trigger));
        let mut fired = 0;
        for trigger in triggers {
            if trigger.fired_at().is_some() {
                continue;
            }
            let Some(top) = top_of(trigger.kind, trigger.index) else {
                continue;
            };
            if trigger.check(top, viewport_height, now) {
                debug!("{:?} #{} revealed at {:.3}s", trigger.kind, trigger.index, now);
                fired += 1;
            }
        }
        fired
    }

    pub fn sample(&self, now: f32) -> ScrollFrame {
        let hidden = ElementState {
            opacity: 0.0,
            offset_y: SCROLL_RISE,
        };
        ScrollFrame {
            reveals: self
                .reveals
                .iter()
                .map(|trigger| ScrollElement {
                    kind: trigger.kind,
                    index: trigger.index,
                    state: ElementState::lerp(hidden, ElementState::SHOWN, trigger.progress(now)),
                })
                .collect(),
            counters: self
                .counters
                .iter()
                .map(|(trigger, target)| CounterValue {
                    index: trigger.index,
                    value: trigger
                        .fired_at()
                        .map(|_| (*target as f32 * trigger.progress(now)).floor() as u32),
                })
                .collect(),
            navbar_scrolled: self.navbar_scrolled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT_H: f32 = 1000.0;

    #[test]
    fn test_trigger_fires_once_at_line() {
        let mut trigger = ScrollTrigger::new(ScrollKind::RevealText, 0);
        assert!(!trigger.check(860.0, VIEWPORT_H, 1.0));
        assert!(trigger.check(840.0, VIEWPORT_H, 2.0));
        assert!(!trigger.check(100.0, VIEWPORT_H, 3.0));
        assert_eq!(trigger.fired_at(), Some(2.0));
    }

    #[test]
    fn test_elements_already_passed_fire() {
        let mut trigger = ScrollTrigger::new(ScrollKind::StatNumber, 0);
        assert!(trigger.check(-400.0, VIEWPORT_H, 0.0));
    }

    #[test]
    fn test_reveal_up_staggers_in_rows_of_three() {
        let delays: Vec<f32> = (0..6).map(|i| ScrollKind::RevealUp.delay(i)).collect();
        for (got, want) in delays.iter().zip([0.0, 0.1, 0.2, 0.0, 0.1, 0.2]) {
            assert!((got - want).abs() < 1e-6);
        }
        assert_eq!(ScrollKind::RevealText.delay(4), 0.0);
    }

    #[test]
    fn test_reveal_plays_after_scroll() {
        let mut effects = ScrollEffects::new(1, 3, &[]);
        let frame = effects.sample(0.0);
        assert!(frame
            .reveals
            .iter()
            .all(|e| e.state == ElementState { opacity: 0.0, offset_y: SCROLL_RISE }));

        // Only the heading and the first card are in view
        let fired = effects.on_scroll(300.0, VIEWPORT_H, 1.0, |kind, index| match (kind, index) {
            (ScrollKind::RevealText, _) => Some(200.0),
            (ScrollKind::RevealUp, 0) => Some(870.0),
            _ => Some(1500.0),
        });
        assert_eq!(fired, 2);

        let frame = effects.sample(3.0);
        assert_eq!(frame.reveals[0].state, ElementState::SHOWN);
        assert_eq!(frame.reveals[1].state, ElementState::SHOWN);
        assert_eq!(frame.reveals[2].state.opacity, 0.0);

        // Halfway through the heading's second: power3.out is past 0.8 already
        let mid = effects.sample(1.5);
        assert!((mid.reveals[0].state.opacity - 0.875).abs() < 1e-5);
        assert!((mid.reveals[0].state.offset_y - SCROLL_RISE * 0.125).abs() < 1e-4);
    }

    #[test]
    fn test_missing_elements_are_skipped() {
        let mut effects = ScrollEffects::new(2, 0, &[10]);
        let fired = effects.on_scroll(0.0, VIEWPORT_H, 0.0, |_, index| (index == 0).then_some(0.0));
        assert_eq!(fired, 2);
        let frame = effects.sample(5.0);
        assert_eq!(frame.reveals[1].state.opacity, 0.0);
        assert_eq!(frame.counters[0].value, Some(10));
    }

    #[test]
    fn test_counter_counts_up() {
        let mut effects = ScrollEffects::new(0, 0, &[150]);
        assert_eq!(effects.sample(1.0).counters[0].value, None);

        effects.on_scroll(0.0, VIEWPORT_H, 1.0, |_, _| Some(800.0));
        let values: Vec<u32> = (0..=30)
            .map(|i| effects.sample(1.0 + i as f32 * 0.1).counters[0].value.unwrap_or(0))
            .collect();

        assert_eq!(values[0], 0);
        // power2.out at the halfway mark: 0.75 of the target
        assert_eq!(values[10], 112);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(values[20], 150);
        assert_eq!(values[30], 150);
    }

    #[test]
    fn test_navbar_toggles_past_offset() {
        let mut effects = ScrollEffects::default();
        effects.on_scroll(80.0, VIEWPORT_H, 0.0, |_, _| None);
        assert!(!effects.navbar_scrolled());
        effects.on_scroll(81.0, VIEWPORT_H, 0.0, |_, _| None);
        assert!(effects.navbar_scrolled());
        assert!(effects.sample(0.0).navbar_scrolled);
        effects.on_scroll(0.0, VIEWPORT_H, 0.0, |_, _| None);
        assert!(!effects.navbar_scrolled());
    }
}
