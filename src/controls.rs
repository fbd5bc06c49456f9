use crate::gesture::{Gesture, GestureVector};
use crate::warn_once;
use log::{debug, trace};
use vrdriver::{DriverInput, InputComponentHandle, InputError, ScalarUnits, TrackedDeviceIndex};

const CLICK: f32 = 0.75;
const TOUCH: f32 = 0.5;
const GRIP_TOUCH: f32 = 0.25;
const TRACKPAD_PRESS: f32 = 0.5;

/// The inputs of an Index controller, in registration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IndexButton {
    SystemClick = 0,
    SystemTouch,
    TriggerClick,
    TriggerValue,
    TrackpadX,
    TrackpadY,
    TrackpadTouch,
    TrackpadForce,
    GripTouch,
    GripForce,
    GripValue,
    ThumbstickClick,
    ThumbstickTouch,
    ThumbstickX,
    ThumbstickY,
    AClick,
    ATouch,
    BClick,
    BTouch,
    FingerIndex,
    FingerMiddle,
    FingerRing,
    FingerPinky,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControlKind {
    Boolean,
    Scalar(ScalarUnits),
}

impl IndexButton {
    pub const COUNT: usize = 23;
    pub const ALL: [IndexButton; Self::COUNT] = {
        use IndexButton::*;
        [
            SystemClick,
            SystemTouch,
            TriggerClick,
            TriggerValue,
            TrackpadX,
            TrackpadY,
            TrackpadTouch,
            TrackpadForce,
            GripTouch,
            GripForce,
            GripValue,
            ThumbstickClick,
            ThumbstickTouch,
            ThumbstickX,
            ThumbstickY,
            AClick,
            ATouch,
            BClick,
            BTouch,
            FingerIndex,
            FingerMiddle,
            FingerRing,
            FingerPinky,
        ]
    };

    pub fn path(self) -> &'static str {
        use IndexButton::*;
        match self {
            SystemClick => "/input/system/click",
            SystemTouch => "/input/system/touch",
            TriggerClick => "/input/trigger/click",
            TriggerValue => "/input/trigger/value",
            TrackpadX => "/input/trackpad/x",
            TrackpadY => "/input/trackpad/y",
            TrackpadTouch => "/input/trackpad/touch",
            TrackpadForce => "/input/trackpad/force",
            GripTouch => "/input/grip/touch",
            GripForce => "/input/grip/force",
            GripValue => "/input/grip/value",
            ThumbstickClick => "/input/thumbstick/click",
            ThumbstickTouch => "/input/thumbstick/touch",
            ThumbstickX => "/input/thumbstick/x",
            ThumbstickY => "/input/thumbstick/y",
            AClick => "/input/a/click",
            ATouch => "/input/a/touch",
            BClick => "/input/b/click",
            BTouch => "/input/b/touch",
            FingerIndex => "/input/finger/index",
            FingerMiddle => "/input/finger/middle",
            FingerRing => "/input/finger/ring",
            FingerPinky => "/input/finger/pinky",
        }
    }

    pub fn kind(self) -> ControlKind {
        use IndexButton::*;
        match self {
            SystemClick | SystemTouch | TriggerClick | TrackpadTouch | GripTouch
            | ThumbstickClick | ThumbstickTouch | AClick | ATouch | BClick | BTouch => {
                ControlKind::Boolean
            }
            TrackpadX | TrackpadY | ThumbstickX | ThumbstickY => {
                ControlKind::Scalar(ScalarUnits::NormalizedTwoSided)
            }
            TriggerValue | TrackpadForce | GripForce | GripValue | FingerIndex | FingerMiddle
            | FingerRing | FingerPinky => ControlKind::Scalar(ScalarUnits::NormalizedOneSided),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ControlValue {
    Boolean(bool),
    Scalar(f32),
}

impl ControlValue {
    fn zero(kind: ControlKind) -> Self {
        match kind {
            ControlKind::Boolean => Self::Boolean(false),
            ControlKind::Scalar(_) => Self::Scalar(0.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogicalControl {
    button: IndexButton,
    value: ControlValue,
    dirty: bool,
    handle: InputComponentHandle,
}

impl LogicalControl {
    fn new(button: IndexButton) -> Self {
        Self {
            button,
            value: ControlValue::zero(button.kind()),
            dirty: false,
            handle: InputComponentHandle::INVALID,
        }
    }

    #[inline]
    pub fn button(&self) -> IndexButton {
        self.button
    }

    #[inline]
    pub fn value(&self) -> ControlValue {
        self.value
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn handle(&self) -> InputComponentHandle {
        self.handle
    }

    fn set(&mut self, value: ControlValue) {
        if std::mem::discriminant(&value) != std::mem::discriminant(&self.value) {
            warn_once!("control kind mismatch on {:?}", self.button);
            return;
        }
        if self.value != value {
            self.value = value;
            self.dirty = true;
        }
    }
}

/// The device's inputs, each remembering whether it changed since the last flush.
#[derive(Clone, Debug)]
pub struct ControlBank {
    controls: [LogicalControl; IndexButton::COUNT],
}

impl Default for ControlBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlBank {
    pub fn new() -> Self {
        Self {
            controls: IndexButton::ALL.map(LogicalControl::new),
        }
    }

    /// Creates a host component for every control, in order.
    pub fn register(
        &mut self,
        device: TrackedDeviceIndex,
        input: &(impl DriverInput + ?Sized),
    ) -> Result<(), InputError> {
        for control in &mut self.controls {
            let path = control.button.path();
            control.handle = match control.button.kind() {
                ControlKind::Boolean => input.create_boolean_component(device, path)?,
                ControlKind::Scalar(units) => input.create_scalar_component(device, path, units)?,
            };
            debug!("registered {path} as {:?}", control.handle);
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, button: IndexButton) -> &LogicalControl {
        &self.controls[button as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogicalControl> {
        self.controls.iter()
    }

    #[inline]
    pub fn set_state(&mut self, button: IndexButton, state: bool) {
        self.controls[button as usize].set(ControlValue::Boolean(state));
    }

    #[inline]
    pub fn set_value(&mut self, button: IndexButton, value: f32) {
        self.controls[button as usize].set(ControlValue::Scalar(value));
    }

    /// Maps one frame of gestures onto the controls.
    pub fn apply_gestures(&mut self, gestures: &GestureVector) {
        use IndexButton::*;

        let trigger = gestures[Gesture::Trigger];
        self.set_value(TriggerValue, trigger);
        self.set_state(TriggerClick, trigger >= CLICK);

        let grip = gestures[Gesture::Grab];
        self.set_value(GripValue, grip);
        self.set_state(GripTouch, grip >= GRIP_TOUCH);
        self.set_value(
            GripForce,
            if grip >= CLICK {
                (grip - CLICK) * 4.0
            } else {
                0.0
            },
        );

        let press = gestures[Gesture::ThumbPress];
        let pressed = press >= TRACKPAD_PRESS;
        self.set_state(TrackpadTouch, pressed);
        self.set_value(
            TrackpadForce,
            if pressed {
                (press - TRACKPAD_PRESS) * 2.0
            } else {
                0.0
            },
        );
        // the pad reads centered whenever it isn't touched
        let (x, y) = if pressed {
            (
                gestures[Gesture::PalmPointX] * 2.0 - 1.0,
                gestures[Gesture::PalmPointY] * 2.0 - 1.0,
            )
        } else {
            (0.0, 0.0)
        };
        self.set_value(TrackpadX, x);
        self.set_value(TrackpadY, y);

        for (gesture, touch, click) in [
            (Gesture::OpisthenarTouch, SystemTouch, SystemClick),
            (Gesture::PalmTouch, BTouch, BClick),
            (Gesture::MiddleCrossTouch, ATouch, AClick),
            (Gesture::ThumbCrossTouch, ThumbstickTouch, ThumbstickClick),
        ] {
            let v = gestures[gesture];
            self.set_state(touch, v >= TOUCH);
            self.set_state(click, v >= CLICK);
        }

        self.set_value(FingerIndex, gestures[Gesture::IndexBend]);
        self.set_value(FingerMiddle, gestures[Gesture::MiddleBend]);
        self.set_value(FingerRing, gestures[Gesture::RingBend]);
        self.set_value(FingerPinky, gestures[Gesture::PinkyBend]);
    }

    /// Sends every changed control to the host once and clears its flag.
    /// Controls without a host component stay pending.
    pub fn flush(&mut self, input: &(impl DriverInput + ?Sized)) {
        for control in self.controls.iter_mut().filter(|c| c.dirty) {
            if !control.handle.is_valid() {
                continue;
            }
            let ret = match control.value {
                ControlValue::Boolean(state) => {
                    input.update_boolean_component(control.handle, state, 0.0)
                }
                ControlValue::Scalar(value) => {
                    input.update_scalar_component(control.handle, value, 0.0)
                }
            };
            if let Err(e) = ret {
                warn_once!("failed to publish control: {}", e);
            }
            trace!("{:?} -> {:?}", control.button, control.value);
            control.dirty = false;
        }
    }

    /// Zeroes every control and drops its host component.
    pub fn reset(&mut self) {
        for control in &mut self.controls {
            *control = LogicalControl::new(control.button);
        }
    }
}
