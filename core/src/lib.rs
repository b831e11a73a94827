pub mod card;
pub mod config;
pub mod controller;
pub mod coordinator;
pub mod effect;
pub mod geometry;
pub mod gesture;
pub mod registry;

pub use card::{Card, CardId, SlotPosition, Zone};
pub use config::{ConfigError, HandConfig, DEFAULT_CARD_COUNT, HAND_CONFIG_ATTRIBUTE};
pub use controller::{HandController, HandHost};
pub use coordinator::{LayoutMode, PreviewState};
pub use effect::{
    render_frame, Channel, EffectConfig, EffectConfigPatch, EffectFrame, EffectState, FrameGate,
    LayerStyle, OpacitySet,
};
pub use geometry::{Point, Rect};
pub use gesture::{
    DropHover, GestureCommand, GestureMachine, GestureSettings, GestureState, Placeholder,
    PointerId, SessionId, Surfaces, DRAG_THRESHOLD_PX, HAND_HIT_PAD_PX, HOLD_DELAY_MS,
};
pub use registry::{CardRegistry, MountHost, RegistryError, TABLE_CAPACITY};
