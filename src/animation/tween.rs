use std::fmt;

use crate::animation::{AnimFrame, Animate, Timeline, next_animation_id};
use crate::event::StopHandler;
use crate::scene::Node;

/// Timeline-driven scalar stream: eased interpolation from `from` to `to`,
/// delivered to a callback every tick. Carries no node target; the callback
/// owns the effect.
pub struct Tween {
    id: u64,
    timeline: Timeline,
    from: f64,
    to: f64,
    applied: bool,
    on_frame: Box<dyn FnMut(f64)>,
    on_stop: Option<StopHandler>,
}

impl Tween {
    pub fn new(
        from: f64,
        to: f64,
        timeline: Timeline,
        on_frame: impl FnMut(f64) + 'static,
    ) -> Self {
        Self {
            id: next_animation_id(),
            timeline,
            from,
            to,
            applied: false,
            on_frame: Box::new(on_frame),
            on_stop: None,
        }
    }

    pub fn on_stop(mut self, handler: StopHandler) -> Self {
        self.on_stop = Some(handler);
        self
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    fn emit(&mut self, eased: f64) {
        let value = self.from + (self.to - self.from) * eased;
        self.applied = true;
        (self.on_frame)(value);
    }

    fn notify(&mut self, finished: bool) {
        if let Some(handler) = &self.on_stop {
            handler.call(finished);
        }
    }
}

impl Animate for Tween {
    fn id(&self) -> u64 {
        self.id
    }

    fn start(&mut self, now: f64) {
        self.timeline.start(now);
    }

    fn tick(&mut self, _root: &mut Node, now: f64) -> AnimFrame {
        if !self.timeline.is_started() || self.timeline.is_paused() {
            return AnimFrame::none();
        }
        let Some(raw) = self.timeline.progress(now) else {
            return AnimFrame {
                active: true,
                touched: None,
            };
        };
        let eased = if raw >= 1.0 {
            1.0
        } else {
            self.timeline.timing.sample(raw)
        };
        self.emit(eased);
        if raw >= 1.0 {
            self.timeline.stop();
            self.notify(true);
            return AnimFrame::none();
        }
        AnimFrame {
            active: true,
            touched: None,
        }
    }

    fn pause(&mut self, now: f64) {
        self.timeline.pause(now);
    }

    fn resume(&mut self, now: f64) {
        self.timeline.resume(now);
    }

    fn finish(&mut self, _root: &mut Node) -> AnimFrame {
        if !self.timeline.is_started() {
            return AnimFrame::none();
        }
        self.emit(1.0);
        self.timeline.stop();
        self.notify(true);
        AnimFrame::none()
    }

    fn cancel(&mut self, _root: &mut Node) -> AnimFrame {
        if !self.timeline.is_started() {
            return AnimFrame::none();
        }
        if self.applied {
            self.emit(0.0);
        }
        self.timeline.stop();
        self.notify(false);
        AnimFrame::none()
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("id", &self.id)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("timeline", &self.timeline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::animation::TimeFunction;

    fn collector() -> (Rc<RefCell<Vec<f64>>>, impl FnMut(f64)) {
        let values = Rc::new(RefCell::new(Vec::new()));
        let sink = values.clone();
        (values, move |value| sink.borrow_mut().push(value))
    }

    #[test]
    fn streams_linearly_interpolated_values() {
        let (values, sink) = collector();
        let mut tween = Tween::new(0.0, 10.0, Timeline::new(1000), sink);
        let mut root = Node::group();
        tween.start(0.0);

        assert!(tween.tick(&mut root, 0.25).active);
        assert!(tween.tick(&mut root, 0.5).active);
        assert!(!tween.tick(&mut root, 1.0).active);
        assert_eq!(*values.borrow(), vec![2.5, 5.0, 10.0]);
    }

    #[test]
    fn timing_function_shapes_the_stream() {
        let (values, sink) = collector();
        let mut tween = Tween::new(
            0.0,
            10.0,
            Timeline::new(1000).timing(TimeFunction::EaseIn),
            sink,
        );
        let mut root = Node::group();
        tween.start(0.0);

        tween.tick(&mut root, 0.5);
        assert_eq!(*values.borrow(), vec![2.5]);
    }

    #[test]
    fn finish_emits_the_exact_end_value() {
        let (values, sink) = collector();
        let outcome = Rc::new(Cell::new(None));
        let seen = outcome.clone();
        let mut tween = Tween::new(3.0, 7.0, Timeline::new(1000), sink)
            .on_stop(StopHandler::new(move |finished| seen.set(Some(finished))));
        let mut root = Node::group();
        tween.start(0.0);
        tween.tick(&mut root, 0.25);

        tween.finish(&mut root);
        assert_eq!(values.borrow().last(), Some(&7.0));
        assert_eq!(outcome.get(), Some(true));
    }

    #[test]
    fn cancel_reemits_the_start_only_after_a_tick_ran() {
        let (values, sink) = collector();
        let mut tween = Tween::new(3.0, 7.0, Timeline::new(1000), sink);
        let mut root = Node::group();
        tween.start(0.0);

        tween.cancel(&mut root);
        assert!(values.borrow().is_empty());

        tween.start(0.0);
        tween.tick(&mut root, 0.5);
        tween.cancel(&mut root);
        assert_eq!(values.borrow().last(), Some(&3.0));
    }
}
