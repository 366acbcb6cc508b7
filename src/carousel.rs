//! Auto-rotating slide carousel.
//!
//! A carousel finds its `.slider-track` inside a container, clones every
//! slide once so the strip is twice as long, and then moves the strip one
//! slide at a time with a CSS transform. When the index reaches the number of
//! original slides the strip jumps back without animation and continues from
//! slide 1, so forward motion looks endless.
//!
//! The carousel holds no reference to the document or the clock: every
//! operation that touches either takes it as a parameter.
//!
//! ```
//! use constellation::carousel::{Carousel, CarouselOptions};
//! use constellation::dom::MemoryDom;
//! use constellation::time::ManualTimers;
//!
//! let mut dom = MemoryDom::parse_fragment(
//!     r#"<div id="team"><div class="slider-track"><div>A</div><div>B</div></div></div>"#,
//! );
//! let mut timers = ManualTimers::new();
//! let mut carousel = Carousel::mount(&mut dom, &mut timers, "team", CarouselOptions::default()).unwrap();
//! carousel.next(&mut dom);
//! assert_eq!(carousel.offset(), -324.0);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dom::{Dom, NodeId};
use crate::time::{TimerHandle, TimerHost};

/// Transition restored on the track after an instant jump.
pub const TRACK_TRANSITION: &str = "transform 0.5s ease-out";

/// Carousel options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CarouselOptions {
    /// Milliseconds between automatic advances.
    pub interval: u64,
    /// Slide width in pixels.
    pub slide_width: f32,
    /// Space between slides in pixels.
    pub gap: f32,
    pub auto_rotate: bool,
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            interval: 3000,
            slide_width: 300.0,
            gap: 24.0,
            auto_rotate: true,
        }
    }
}

impl CarouselOptions {
    /// Replace unset or unusable values with defaults. A zero interval, a
    /// non-positive width and a non-positive gap all fall back, so an explicit
    /// `gap: 0` becomes 24.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            interval: if self.interval == 0 {
                defaults.interval
            } else {
                self.interval
            },
            slide_width: if self.slide_width > 0.0 {
                self.slide_width
            } else {
                defaults.slide_width
            },
            gap: if self.gap > 0.0 { self.gap } else { defaults.gap },
            auto_rotate: self.auto_rotate,
        }
    }

    /// Distance the strip moves per slide.
    pub fn stride(&self) -> f32 {
        self.slide_width + self.gap
    }
}

/// Observable run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselState {
    /// No timer registered.
    Stopped,
    /// Timer registered and ticks advance the strip.
    Running,
    /// The pointer is over the carousel; ticks are absorbed.
    Hovered,
}

/// A mounted carousel.
#[derive(Debug)]
pub struct Carousel {
    container: NodeId,
    track: NodeId,
    prev_button: Option<NodeId>,
    next_button: Option<NodeId>,
    original_count: usize,
    options: CarouselOptions,
    index: usize,
    hovered: bool,
    timer: Option<TimerHandle>,
    resets: usize,
}

impl Carousel {
    /// Mount on the element with id `container_id`.
    ///
    /// Returns `None` if the container or its `.slider-track` is missing.
    /// Starts the timer when `auto_rotate` is set.
    pub fn mount<D, T>(dom: &mut D, timers: &mut T, container_id: &str, options: CarouselOptions) -> Option<Self>
    where
        D: Dom + ?Sized,
        T: TimerHost + ?Sized,
    {
        let container = dom.element_by_id(container_id)?;
        let Some(track) = dom.descendant_by_class(container, "slider-track") else {
            log::warn!("carousel #{} has no .slider-track", container_id);
            return None;
        };

        let slides = dom.element_children(track);
        for slide in &slides {
            dom.append_clone(track, *slide);
        }

        let mut carousel = Self {
            container,
            track,
            prev_button: dom.descendant_by_class(container, "prev-btn"),
            next_button: dom.descendant_by_class(container, "next-btn"),
            original_count: slides.len(),
            options: options.normalized(),
            index: 0,
            hovered: false,
            timer: None,
            resets: 0,
        };
        log::debug!(
            "mounted carousel #{} with {} slides ({} after cloning)",
            container_id,
            carousel.original_count,
            carousel.slide_count()
        );
        carousel.play(timers);
        Some(carousel)
    }

    /// Advance one slide.
    pub fn next<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        if self.original_count == 0 {
            return;
        }
        self.index += 1;
        self.reposition(dom);
    }

    /// Go back one slide. From the first slide this snaps to the last
    /// original slide without a wrap animation.
    pub fn prev<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        if self.original_count == 0 {
            return;
        }
        self.index = match self.index.checked_sub(1) {
            Some(i) => i,
            None => self.original_count - 1,
        };
        self.reposition(dom);
    }

    fn reposition<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        if self.index >= self.original_count {
            dom.set_style(self.track, "transition", "none");
            self.index = 0;
            dom.set_style(self.track, "transform", "translateX(0px)");
            dom.force_layout(self.track);
            dom.set_style(self.track, "transition", TRACK_TRANSITION);
            self.index = 1;
            self.resets += 1;
            log::trace!("carousel wrapped after {} slides", self.original_count);
        }

        let transform = format!("translateX({}px)", self.offset());
        dom.set_style(self.track, "transform", &transform);
    }

    /// Start automatic rotation. Does nothing if rotation is disabled or a
    /// timer is already running.
    pub fn play<T: TimerHost + ?Sized>(&mut self, timers: &mut T) {
        if !self.options.auto_rotate || self.timer.is_some() {
            return;
        }
        self.timer = Some(timers.set_interval(Duration::from_millis(self.options.interval)));
    }

    /// Stop automatic rotation. Does nothing if stopped.
    pub fn pause<T: TimerHost + ?Sized>(&mut self, timers: &mut T) {
        if let Some(handle) = self.timer.take() {
            timers.clear_interval(handle);
        }
    }

    /// Handle a timer firing. Returns `true` if the handle belongs to this
    /// carousel, whether or not the strip moved.
    pub fn on_timer<D: Dom + ?Sized>(&mut self, dom: &mut D, handle: TimerHandle) -> bool {
        if self.timer != Some(handle) {
            return false;
        }
        if !self.hovered {
            self.next(dom);
        }
        true
    }

    /// Pointer entered the container.
    pub fn pointer_enter<T: TimerHost + ?Sized>(&mut self, timers: &mut T) {
        self.hovered = true;
        self.pause(timers);
    }

    /// Pointer left the container.
    pub fn pointer_leave<T: TimerHost + ?Sized>(&mut self, timers: &mut T) {
        self.hovered = false;
        self.play(timers);
    }

    /// Route a click. Returns `true` if `target` is one of this carousel's
    /// controls.
    pub fn click<D: Dom + ?Sized>(&mut self, dom: &mut D, target: NodeId) -> bool {
        if Some(target) == self.prev_button {
            self.prev(dom);
            true
        } else if Some(target) == self.next_button {
            self.next(dom);
            true
        } else {
            false
        }
    }

    pub fn state(&self) -> CarouselState {
        if self.hovered {
            CarouselState::Hovered
        } else if self.timer.is_some() {
            CarouselState::Running
        } else {
            CarouselState::Stopped
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Current horizontal translation of the track in pixels.
    pub fn offset(&self) -> f32 {
        let offset = -(self.index as f32 * self.options.stride());
        // Avoid printing "-0px".
        if offset == 0.0 {
            0.0
        } else {
            offset
        }
    }

    /// Number of slides before cloning.
    pub fn original_count(&self) -> usize {
        self.original_count
    }

    /// Number of slides on the track after cloning.
    pub fn slide_count(&self) -> usize {
        self.original_count * 2
    }

    /// How many times the strip jumped back to the start.
    pub fn resets(&self) -> usize {
        self.resets
    }

    pub fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    pub fn options(&self) -> &CarouselOptions {
        &self.options
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn track(&self) -> NodeId {
        self.track
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;
    use crate::time::ManualTimers;

    fn page(slides: usize) -> MemoryDom {
        let cards: String = (0..slides).map(|i| format!("<div class=\"card\">{i}</div>")).collect();
        MemoryDom::parse_fragment(&format!(
            r#"<section id="alumni-slider">
                 <button class="prev-btn">&lt;</button>
                 <div class="slider-track">{cards}</div>
                 <button class="next-btn">&gt;</button>
               </section>"#
        ))
    }

    fn manual() -> CarouselOptions {
        CarouselOptions {
            auto_rotate: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_container_is_none() {
        let mut dom = page(3);
        let mut timers = ManualTimers::new();
        assert!(Carousel::mount(&mut dom, &mut timers, "nope", CarouselOptions::default()).is_none());
        assert_eq!(timers.active(), 0);
    }

    #[test]
    fn test_missing_track_is_none() {
        let mut dom = MemoryDom::parse_fragment(r#"<div id="s"><div class="cards"></div></div>"#);
        let mut timers = ManualTimers::new();
        assert!(Carousel::mount(&mut dom, &mut timers, "s", CarouselOptions::default()).is_none());
    }

    #[test]
    fn test_mount_clones_slides() {
        let mut dom = page(5);
        let mut timers = ManualTimers::new();
        let c = Carousel::mount(&mut dom, &mut timers, "alumni-slider", manual()).unwrap();
        assert_eq!(c.original_count(), 5);
        assert_eq!(c.slide_count(), 10);
        assert_eq!(dom.element_children(c.track()).len(), 10);
        assert_eq!(c.state(), CarouselState::Stopped);
    }

    #[test]
    fn test_five_nexts_wrap_once() {
        let mut dom = page(5);
        let mut timers = ManualTimers::new();
        let mut c = Carousel::mount(&mut dom, &mut timers, "alumni-slider", manual()).unwrap();
        for _ in 0..4 {
            c.next(&mut dom);
        }
        assert_eq!(c.index(), 4);
        assert_eq!(c.resets(), 0);

        c.next(&mut dom);
        assert_eq!(c.resets(), 1);
        assert_eq!(c.index(), 1);
        assert_eq!(c.offset(), -324.0);
        assert_eq!(dom.layout_flushes(c.track()), 1);
        assert_eq!(dom.style(c.track(), "transform").as_deref(), Some("translateX(-324px)"));
        assert_eq!(dom.style(c.track(), "transition").as_deref(), Some(TRACK_TRANSITION));
    }

    #[test]
    fn test_prev_from_zero_snaps_to_last_original() {
        let mut dom = page(5);
        let mut timers = ManualTimers::new();
        let mut c = Carousel::mount(&mut dom, &mut timers, "alumni-slider", manual()).unwrap();
        c.prev(&mut dom);
        assert_eq!(c.index(), 4);
        assert_eq!(c.resets(), 0);
        assert_eq!(dom.style(c.track(), "transform").as_deref(), Some("translateX(-1296px)"));
        c.prev(&mut dom);
        assert_eq!(c.index(), 3);
    }

    #[test]
    fn test_play_pause_never_double_schedules() {
        let mut dom = page(3);
        let mut timers = ManualTimers::new();
        let mut c = Carousel::mount(&mut dom, &mut timers, "alumni-slider", CarouselOptions::default()).unwrap();
        assert_eq!(timers.active(), 1);

        c.play(&mut timers);
        c.play(&mut timers);
        assert_eq!(timers.active(), 1);

        c.pause(&mut timers);
        c.pause(&mut timers);
        assert_eq!(timers.active(), 0);

        c.play(&mut timers);
        c.pause(&mut timers);
        c.play(&mut timers);
        c.play(&mut timers);
        assert_eq!(timers.active(), 1);
        assert!(timers.is_active(c.timer().unwrap()));
    }

    #[test]
    fn test_manual_carousel_never_starts_timer() {
        let mut dom = page(3);
        let mut timers = ManualTimers::new();
        let mut c = Carousel::mount(&mut dom, &mut timers, "alumni-slider", manual()).unwrap();
        c.play(&mut timers);
        c.pointer_leave(&mut timers);
        assert_eq!(timers.active(), 0);
    }

    #[test]
    fn test_ticks_advance_and_hover_pauses() {
        let mut dom = page(3);
        let mut timers = ManualTimers::new();
        let mut c = Carousel::mount(&mut dom, &mut timers, "alumni-slider", CarouselOptions::default()).unwrap();

        for handle in timers.advance(Duration::from_millis(6000)) {
            assert!(c.on_timer(&mut dom, handle));
        }
        assert_eq!(c.index(), 2);

        c.pointer_enter(&mut timers);
        assert_eq!(c.state(), CarouselState::Hovered);
        assert!(timers.advance(Duration::from_millis(9000)).is_empty());
        assert_eq!(c.index(), 2);

        c.pointer_leave(&mut timers);
        assert_eq!(c.state(), CarouselState::Running);
        for handle in timers.advance(Duration::from_millis(3000)) {
            c.on_timer(&mut dom, handle);
        }
        // 3 originals: index 3 wraps to 1
        assert_eq!(c.index(), 1);
        assert_eq!(c.resets(), 1);
    }

    #[test]
    fn test_hovered_tick_is_absorbed() {
        let mut dom = page(3);
        let mut timers = ManualTimers::new();
        let mut c = Carousel::mount(&mut dom, &mut timers, "alumni-slider", CarouselOptions::default()).unwrap();
        let handle = c.timer().unwrap();
        c.hovered = true;
        assert!(c.on_timer(&mut dom, handle));
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn test_foreign_timer_ignored() {
        let mut dom = page(3);
        let mut timers = ManualTimers::new();
        let mut c = Carousel::mount(&mut dom, &mut timers, "alumni-slider", CarouselOptions::default()).unwrap();
        assert!(!c.on_timer(&mut dom, TimerHandle(999)));
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn test_buttons_route_to_prev_and_next() {
        let mut dom = page(4);
        let mut timers = ManualTimers::new();
        let mut c = Carousel::mount(&mut dom, &mut timers, "alumni-slider", manual()).unwrap();
        let next = dom.elements_by_class("next-btn")[0];
        let prev = dom.elements_by_class("prev-btn")[0];

        assert!(c.click(&mut dom, next));
        assert_eq!(c.index(), 1);
        assert!(c.click(&mut dom, prev));
        assert!(c.click(&mut dom, prev));
        assert_eq!(c.index(), 3);
        assert!(!c.click(&mut dom, c.track()));
        // manual navigation leaves the timer alone
        assert_eq!(c.state(), CarouselState::Stopped);
    }

    #[test]
    fn test_empty_track_is_inert() {
        let mut dom = page(0);
        let mut timers = ManualTimers::new();
        let mut c = Carousel::mount(&mut dom, &mut timers, "alumni-slider", manual()).unwrap();
        c.next(&mut dom);
        c.prev(&mut dom);
        assert_eq!(c.index(), 0);
        assert_eq!(dom.style(c.track(), "transform"), None);
    }

    #[test]
    fn test_options_normalized_and_deserialized() {
        let opts: CarouselOptions = serde_json::from_str(r#"{"interval": 2000, "slideWidth": 320}"#).unwrap();
        assert_eq!(opts.interval, 2000);
        assert_eq!(opts.slide_width, 320.0);
        assert_eq!(opts.gap, 24.0);
        assert!(opts.auto_rotate);

        let fixed = CarouselOptions {
            interval: 0,
            slide_width: -1.0,
            gap: 0.0,
            auto_rotate: false,
        }
        .normalized();
        assert_eq!(fixed.interval, 3000);
        assert_eq!(fixed.slide_width, 300.0);
        assert_eq!(fixed.gap, 24.0);
        assert_eq!(fixed.stride(), 324.0);
    }

    #[test]
    fn test_zero_and_negative_gap_use_default() {
        let with_gap = |gap| CarouselOptions { gap, ..CarouselOptions::default() }.normalized().gap;
        assert_eq!(with_gap(0.0), 24.0);
        assert_eq!(with_gap(-8.0), 24.0);
        assert_eq!(with_gap(12.0), 12.0);
    }
}
