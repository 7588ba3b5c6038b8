use super::*;
use crate::{foundation::core::Point, image::memory::MemoryImage};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShiftParam {
    Enabled,
    Offset,
}

struct ShiftWarp(f64);

impl WarpFunction for ShiftWarp {
    fn warp_point(&self, p: Point) -> Point {
        Point::new(p.x + self.0, p.y)
    }

    fn hash_params(&self, h: &mut StableHasher) {
        h.write_str("shift");
        h.write_f64(self.0);
    }
}

struct ShiftVariant {
    params: RwLock<(bool, f64)>,
}

impl WarpVariant for ShiftVariant {
    type Param = ShiftParam;
    type Warp = ShiftWarp;

    fn enabled(&self) -> bool {
        self.params.read().0
    }

    fn warp(&self, _input: &dyn ImageSource) -> WarpResult<Option<ShiftWarp>> {
        let (enabled, dx) = *self.params.read();
        Ok(enabled.then_some(ShiftWarp(dx)))
    }

    fn warped_data_window(&self, w: &ShiftWarp, input: &dyn ImageSource) -> WarpResult<Box2i> {
        let dx = -(w.0.round() as i32);
        Ok(input.data_window()?.translated(dx, 0))
    }

    fn param_affects(&self, p: ShiftParam) -> AffectedOutputs {
        match p {
            ShiftParam::Enabled => AffectedOutputs::ALL,
            ShiftParam::Offset => {
                AffectedOutputs::of(&[ImageOutput::DataWindow, ImageOutput::ChannelData])
            }
        }
    }
}

fn node(enabled: bool, dx: f64) -> WarpProcessor<ShiftVariant> {
    let dw = Box2i::new(Vec2i::new(0, 0), Vec2i::new(99, 49));
    let img = MemoryImage::from_fn(Format::new(100, 50), dw, &["R", "G"], |c, x, y| {
        (c as i32 * 7 + x * 100 + y) as f32
    })
    .unwrap();
    WarpProcessor::new(
        ShiftVariant {
            params: RwLock::new((enabled, dx)),
        },
        Arc::new(img),
    )
}

#[test]
fn disabled_node_is_a_passthrough() {
    let n = node(false, 4.0);
    let input = n.input().clone();
    let o = Vec2i::new(64, 0);
    assert!(!n.enabled());
    assert_eq!(n.data_window().unwrap(), input.data_window().unwrap());
    assert_eq!(
        &n.channel_tile("G", o).unwrap()[..],
        &input.channel_tile("G", o).unwrap()[..]
    );
    assert_eq!(
        n.hash_channel_tile("G", o).unwrap(),
        input.hash_channel_tile("G", o).unwrap()
    );
    assert_eq!(n.hash_data_window().unwrap(), input.hash_data_window().unwrap());
    assert_eq!(n.hash_format().unwrap(), input.hash_format().unwrap());
}

#[test]
fn enabled_node_warps_and_rehashes() {
    let n = node(true, 4.0);
    let input = n.input().clone();
    let o = Vec2i::new(0, 0);
    assert_eq!(
        n.data_window().unwrap(),
        Box2i::new(Vec2i::new(-4, 0), Vec2i::new(95, 49))
    );
    assert_eq!(n.channel_tile("R", o).unwrap()[0], 400.0);
    assert_ne!(
        n.hash_channel_tile("R", o).unwrap(),
        input.hash_channel_tile("R", o).unwrap()
    );
    assert_ne!(n.hash_data_window().unwrap(), input.hash_data_window().unwrap());
    assert_eq!(n.format().unwrap(), input.format().unwrap());
    assert_eq!(n.channel_names().unwrap(), input.channel_names().unwrap());
}

#[test]
fn settings_changes_are_validated_and_rehash_tiles() {
    let n = node(true, 1.0);
    let o = Vec2i::new(0, 0);
    let before = n.hash_channel_tile("R", o).unwrap();
    assert!(n.set_filter(Some(FilterKind::Cubic), -1.0).is_err());
    assert_eq!(n.hash_channel_tile("R", o).unwrap(), before);

    n.set_bounding_mode(BoundingMode::Periodic).unwrap();
    assert_eq!(n.settings().bounding_mode, BoundingMode::Periodic);
    assert_ne!(n.hash_channel_tile("R", o).unwrap(), before);
}

#[test]
fn affects_follows_enabled_state() {
    let on = node(true, 1.0);
    let off = node(false, 1.0);
    let up = NodeInput::Upstream(ImageOutput::Format);
    assert!(on.affects(up).contains(ImageOutput::DataWindow));
    assert_eq!(off.affects(up), AffectedOutputs::of(&[ImageOutput::Format]));
    assert_eq!(
        on.affects(NodeInput::Param(WarpParam::Filter)),
        AffectedOutputs::of(&[ImageOutput::ChannelData])
    );
    assert_eq!(
        on.affects(NodeInput::Param(WarpParam::Variant(ShiftParam::Enabled))),
        AffectedOutputs::ALL
    );
    assert!(
        !on.affects(NodeInput::Param(WarpParam::Variant(ShiftParam::Offset)))
            .contains(ImageOutput::Format)
    );
}
