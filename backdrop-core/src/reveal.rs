/// Entry reveal: a one-shot timeline of fade/slide-in tweens for the hero section
use log::{debug, warn};

use crate::easing::Ease;

/// Vertical offset (pixels) title words rise from
pub const TITLE_WORD_RISE: f32 = 40.0;

/// Visual state of one element at an instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementState {
    pub opacity: f32,
    /// Downward displacement in pixels
    pub offset_y: f32,
}

impl ElementState {
    pub const HIDDEN: ElementState = ElementState {
        opacity: 0.0,
        offset_y: 0.0,
    };
    pub const SHOWN: ElementState = ElementState {
        opacity: 1.0,
        offset_y: 0.0,
    };

    pub fn lerp(from: ElementState, to: ElementState, k: f32) -> Self {
        Self {
            opacity: from.opacity + (to.opacity - from.opacity) * k,
            offset_y: from.offset_y + (to.offset_y - from.offset_y) * k,
        }
    }
}

/// The five groups of hero elements, in reveal order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevealGroup {
    Tag,
    TitleWord,
    Subtitle,
    CallToAction,
    ScrollIndicator,
}

impl RevealGroup {
    pub const ALL: [RevealGroup; 5] = [
        RevealGroup::Tag,
        RevealGroup::TitleWord,
        RevealGroup::Subtitle,
        RevealGroup::CallToAction,
        RevealGroup::ScrollIndicator,
    ];

    /// CSS selector of the page elements in this group
    pub fn selector(self) -> &'static str {
        match self {
            RevealGroup::Tag => ".hero-tag",
            RevealGroup::TitleWord => ".hero-title .word",
            RevealGroup::Subtitle => ".hero-subtitle",
            RevealGroup::CallToAction => ".hero-cta",
            RevealGroup::ScrollIndicator => ".scroll-indicator",
        }
    }
}

/// Where a tween starts relative to the end of the timeline so far
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Sequential,
    /// Start this many seconds before the current end (never before 0)
    Overlap(f32),
}

/// A single element's transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub group: RevealGroup,
    pub index: usize,
    pub start: f32,
    pub duration: f32,
    pub ease: Ease,
    pub from: ElementState,
    pub to: ElementState,
}

impl Tween {
    pub fn end(&self) -> f32 {
        self.start + self.duration
    }

    /// State at `t` seconds into the timeline
    pub fn state_at(&self, t: f32) -> ElementState {
        let k = eased_progress(self.ease, self.start, self.duration, t);
        ElementState::lerp(self.from, self.to, k)
    }
}

/// Eased progress at `t` of a transition running from `start` for `duration` seconds
pub fn eased_progress(ease: Ease, start: f32, duration: f32, t: f32) -> f32 {
    let progress = if duration <= 0.0 {
        if t >= start { 1.0 } else { 0.0 }
    } else {
        (t - start) / duration
    };
    ease.apply(progress)
}

/// Tween parameters for one group
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub group: RevealGroup,
    pub count: usize,
    pub from: ElementState,
    pub to: ElementState,
    pub duration: f32,
    /// Delay between consecutive elements of the group
    pub stagger: f32,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct Timeline {
    tweens: Vec<Tween>,
    ease: Ease,
    duration: f32,
}

impl Timeline {
    pub fn new(ease: Ease) -> Self {
        Self {
            tweens: Vec::new(),
            ease,
            duration: 0.0,
        }
    }

    /// Append a group's tweens using the timeline's default ease
    pub fn to(&mut self, step: Step) -> &mut Self {
        let start = match step.position {
            Position::Sequential => self.duration,
            Position::Overlap(by) => (self.duration - by).max(0.0),
        };

        for index in 0..step.count {
            let tween = Tween {
                group: step.group,
                index,
                start: start + step.stagger * index as f32,
                duration: step.duration,
                ease: self.ease,
                from: step.from,
                to: step.to,
            };
            self.duration = self.duration.max(tween.end());
            self.tweens.push(tween);
        }
        self
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    pub fn sample(&self, t: f32) -> RevealFrame {
        RevealFrame {
            elements: self
                .tweens
                .iter()
                .map(|tween| RevealElement {
                    group: tween.group,
                    index: tween.index,
                    state: tween.state_at(t),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealElement {
    pub group: RevealGroup,
    pub index: usize,
    pub state: ElementState,
}

/// Every hero element's state at one instant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevealFrame {
    pub elements: Vec<RevealElement>,
}

impl RevealFrame {
    pub fn group(&self, group: RevealGroup) -> impl Iterator<Item = &RevealElement> {
        self.elements.iter().filter(move |e| e.group == group)
    }

    /// State of a single element, if the group has one at `index`
    pub fn element(&self, group: RevealGroup, index: usize) -> Option<ElementState> {
        self.group(group)
            .find(|e| e.index == index)
            .map(|e| e.state)
    }
}

/// The hero entry animation, fired once by the loader
#[derive(Debug, Clone)]
pub struct RevealSequence {
    timeline: Timeline,
    started_at: Option<f32>,
}

impl RevealSequence {
    /// Build the five-group hero sequence for a title of `title_words` words
    pub fn hero(title_words: usize) -> Self {
        let mut timeline = Timeline::new(Ease::Power3Out);
        let fade = |group, position| Step {
            group,
            count: 1,
            from: ElementState::HIDDEN,
            to: ElementState::SHOWN,
            duration: 0.8,
            stagger: 0.0,
            position,
        };

        timeline
            .to(fade(RevealGroup::Tag, Position::Sequential))
            .to(Step {
                group: RevealGroup::TitleWord,
                count: title_words,
                from: ElementState {
                    opacity: 0.0,
                    offset_y: TITLE_WORD_RISE,
                },
                to: ElementState::SHOWN,
                duration: 1.0,
                stagger: 0.1,
                position: Position::Overlap(0.4),
            })
            .to(fade(RevealGroup::Subtitle, Position::Overlap(0.5)))
            .to(fade(RevealGroup::CallToAction, Position::Overlap(0.5)))
            .to(fade(RevealGroup::ScrollIndicator, Position::Overlap(0.3)));

        Self {
            timeline,
            started_at: None,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Start playing at `now`. Only the first call has an effect.
    pub fn trigger(&mut self, now: f32) -> bool {
        if let Some(started) = self.started_at {
            warn!("reveal sequence already started at {:.3}s; ignoring trigger", started);
            return false;
        }
        debug!(
            "reveal sequence started at {:.3}s, runs {:.2}s",
            now,
            self.timeline.duration()
        );
        self.started_at = Some(now);
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.started_at.is_some()
    }

    /// Element states at `now`. Before the trigger every element is at its start state.
    pub fn sample(&self, now: f32) -> RevealFrame {
        match self.started_at {
            Some(started) => self.timeline.sample(now - started),
            None => self.timeline.sample(f32::NEG_INFINITY),
        }
    }

    pub fn is_complete(&self, now: f32) -> bool {
        self.started_at
            .map(|started| now - started >= self.timeline.duration())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_positions() {
        let sequence = RevealSequence::hero(3);
        let tweens = sequence.timeline().tweens();
        let starts: Vec<(RevealGroup, f32)> = tweens.iter().map(|t| (t.group, t.start)).collect();

        let expected = [
            (RevealGroup::Tag, 0.0),
            (RevealGroup::TitleWord, 0.4),
            (RevealGroup::TitleWord, 0.5),
            (RevealGroup::TitleWord, 0.6),
            (RevealGroup::Subtitle, 1.1),
            (RevealGroup::CallToAction, 1.4),
            (RevealGroup::ScrollIndicator, 1.9),
        ];
        assert_eq!(starts.len(), expected.len());
        for ((group, start), (eg, es)) in starts.iter().zip(expected.iter()) {
            assert_eq!(group, eg);
            assert!((start - es).abs() < 1e-5, "{:?} starts at {}", group, start);
        }
        assert!((sequence.timeline().duration() - 2.7).abs() < 1e-5);
    }

    #[test]
    fn test_each_group_starts_before_previous_ends() {
        let sequence = RevealSequence::hero(4);
        let tweens = sequence.timeline().tweens();
        for pair in RevealGroup::ALL.windows(2) {
            let prev_end = tweens
                .iter()
                .filter(|t| t.group == pair[0])
                .map(Tween::end)
                .fold(0.0, f32::max);
            let next_start = tweens
                .iter()
                .filter(|t| t.group == pair[1])
                .map(|t| t.start)
                .fold(f32::MAX, f32::min);
            assert!(next_start < prev_end);
        }
    }

    #[test]
    fn test_hidden_until_triggered() {
        let sequence = RevealSequence::hero(2);
        let frame = sequence.sample(100.0);
        assert!(frame.elements.iter().all(|e| e.state.opacity == 0.0));
        assert_eq!(
            frame.element(RevealGroup::TitleWord, 1),
            Some(ElementState {
                opacity: 0.0,
                offset_y: TITLE_WORD_RISE
            })
        );
        assert!(!sequence.is_complete(100.0));
    }

    #[test]
    fn test_reaches_end_states() {
        let mut sequence = RevealSequence::hero(3);
        assert!(sequence.trigger(5.0));

        assert!(!sequence.is_complete(6.0));
        assert!(sequence.is_complete(8.0));

        let frame = sequence.sample(8.0);
        for group in RevealGroup::ALL {
            assert!(frame.group(group).count() > 0);
        }
        for element in &frame.elements {
            assert_eq!(element.state, ElementState::SHOWN);
        }
    }

    #[test]
    fn test_opacity_never_regresses() {
        let mut sequence = RevealSequence::hero(5);
        sequence.trigger(0.0);

        let mut last = sequence.sample(0.0);
        for step in 1..=400 {
            let frame = sequence.sample(step as f32 * 0.01);
            for (before, after) in last.elements.iter().zip(&frame.elements) {
                assert!(after.state.opacity >= before.state.opacity);
                assert!(after.state.offset_y <= before.state.offset_y);
                if before.state.opacity >= 1.0 {
                    assert_eq!(after.state.opacity, 1.0);
                }
            }
            last = frame;
        }
    }

    #[test]
    fn test_trigger_is_one_shot() {
        let mut sequence = RevealSequence::hero(1);
        assert!(!sequence.is_triggered());
        assert!(sequence.trigger(1.0));
        assert!(sequence.is_triggered());
        assert!(!sequence.trigger(3.0));

        // Still timed from the first trigger
        assert!(!sequence.is_complete(3.0));
        assert!(sequence.is_complete(1.1 + sequence.timeline().duration()));
    }

    #[test]
    fn test_empty_title_still_reveals_other_groups() {
        let mut sequence = RevealSequence::hero(0);
        sequence.trigger(0.0);
        let frame = sequence.sample(10.0);
        assert_eq!(frame.group(RevealGroup::TitleWord).count(), 0);
        assert_eq!(frame.elements.len(), 4);
        assert!(frame.elements.iter().all(|e| e.state == ElementState::SHOWN));
    }
}
