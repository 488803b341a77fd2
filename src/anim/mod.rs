pub mod counter;
pub mod easing;
pub mod lerp;
pub mod spring;
pub mod timeline;
pub mod tween;
pub mod window;

pub use counter::{CounterAnimator, CounterState};
pub use easing::{Easing, ParseEasingError};
pub use lerp::{lerp, Lerp, Offset, Rgba};
pub use spring::{Decay, Smooth, Spring, SpringParams};
pub use timeline::Timeline;
pub use tween::{fade_in_up, fade_in_up_with, FadeState, Transition, Tween};
pub use window::{stagger_window, BreakpointTable, TableError};
