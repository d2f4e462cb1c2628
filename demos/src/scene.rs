//! Builds a small scene from a declarative record, clicks a button in it,
//! animates a panel across the stage through manually pumped frames, and
//! prints every draw op the recording surface saw.

use std::rc::Rc;

use easel::animation::{AnimProperty, Keyframe, KeyframeAnimation, TimeFunction, Timeline};
use easel::event::{Event, EventKind, PointerId};
use easel::record::{NodeRecord, OptionValue};
use easel::registry::node_from_record;
use easel::scene::node_by_uid_mut;
use easel::schedule::ManualPump;
use easel::stage::Stage;
use easel::surface::RecordingSurface;
use easel_shapes::register_shape_kinds;
use log::info;

fn scene_record() -> NodeRecord {
    NodeRecord::new("flow")
        .option("id", OptionValue::Str("toolbar".into()))
        .option("y", OptionValue::Float(10.0))
        .option("gap", OptionValue::Float(12.0))
        .option("height", OptionValue::Float(40.0))
        .option("stretch_x", OptionValue::Float(1.0))
        .child(
            NodeRecord::new("rect")
                .option("id", OptionValue::Str("button".into()))
                .option("width", OptionValue::Float(120.0))
                .option("height", OptionValue::Float(40.0))
                .option("fill", OptionValue::Str("#4060c0".into()))
                .child(
                    NodeRecord::new("label")
                        .option("text", OptionValue::Str("Launch".into()))
                        .option("x", OptionValue::Float(12.0))
                        .option("y", OptionValue::Float(12.0))
                        .option("font", OptionValue::Str("14px sans-serif".into())),
                ),
        )
        .child(
            NodeRecord::new("disc")
                .option("width", OptionValue::Float(40.0))
                .option("height", OptionValue::Float(40.0))
                .option("fill", OptionValue::Str("#c04040".into())),
        )
}

fn main() {
    env_logger::init();
    register_shape_kinds();

    let mut stage = Stage::new(RecordingSurface::new(640.0, 360.0), Rc::new(ManualPump));

    let toolbar = node_from_record(&scene_record()).expect("scene record should instantiate");
    let toolbar = stage
        .root_mut()
        .append_child(toolbar)
        .expect("toolbar attaches to the root");
    let button = stage
        .root()
        .select_id("button")
        .expect("button exists")
        .uid();

    node_by_uid_mut(stage.root_mut(), button)
        .expect("button")
        .on(EventKind::Click, |event: &mut Event| {
            info!("button clicked at {:?}", event.pointer.point);
        });

    stage.update_now();
    stage.render_now();
    info!("initial frame: {} draw ops", stage.surface_mut().take_ops().len());

    // A press-and-release on the button synthesizes a click.
    stage.pointer_start(PointerId::MOUSE, 30.0, 30.0);
    stage.pointer_end(PointerId::MOUSE, 30.0, 30.0);

    // Slide the toolbar down-right over one second of simulated time.
    stage.play(
        KeyframeAnimation::new(
            toolbar,
            Timeline::new(1000).timing(TimeFunction::EaseInOut),
        )
        .track(AnimProperty::OffsetX, vec![Keyframe::new(1.0, 80.0)])
        .track(
            AnimProperty::OffsetY,
            vec![Keyframe::new(0.5, 60.0), Keyframe::new(1.0, 120.0)],
        ),
        0.0,
    );

    let mut frame = 0;
    let mut now = 0.0;
    while stage.scheduler().borrow().has_work() {
        stage.run_frame(now);
        frame += 1;
        now += 1.0 / 60.0;
    }
    info!("animation settled after {frame} frames");

    for op in stage.surface_mut().take_ops() {
        println!("{op:?}");
    }
}
