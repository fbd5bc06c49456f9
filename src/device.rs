use crate::arbitration::arbitrate;
use crate::config::DriverConfig;
use crate::controls::ControlBank;
use crate::driver::FrameContext;
use crate::gesture::GestureVector;
use crate::pose::Pose;
use crate::sample::{Hand, HandSample};
use crate::skeleton::Skeleton;
use crate::{tracy_span, warn_once};
use derive_more::Display;
use log::{debug, info};
use vrdriver::{
    BoolProperty, Host, InputComponentHandle, InputError, Int32Property, ServerDriverHost,
    SkeletalMotionRange, StringProperty, TrackedDeviceClass, TrackedDeviceIndex,
};

/// Resource root of every device this driver registers. Other drivers' devices are told apart
/// from ours by it.
pub const RESOURCE_ROOT: &str = "leap";
const HAND_SELECTION_PRIORITY: i32 = -10;

#[derive(Debug, Display)]
pub enum ActivateError {
    #[display("device is already active")]
    AlreadyActive,
    #[display("failed to create input component: {_0}")]
    Input(InputError),
}

impl std::error::Error for ActivateError {}

impl From<InputError> for ActivateError {
    fn from(value: InputError) -> Self {
        Self::Input(value)
    }
}

/// One simulated Index controller driven by one tracked hand.
pub struct HandController {
    hand: Hand,
    index: Option<TrackedDeviceIndex>,
    enabled: bool,
    pose: Pose,
    skeleton: Skeleton,
    controls: ControlBank,
    skeleton_handle: InputComponentHandle,
    haptic_handle: InputComponentHandle,
}

impl HandController {
    pub fn new(hand: Hand) -> Self {
        Self {
            hand,
            index: None,
            enabled: false,
            pose: Pose::default(),
            skeleton: Skeleton::open_hand(hand),
            controls: ControlBank::new(),
            skeleton_handle: InputComponentHandle::INVALID,
            haptic_handle: InputComponentHandle::INVALID,
        }
    }

    #[inline]
    pub fn hand(&self) -> Hand {
        self.hand
    }

    #[inline]
    pub fn index(&self) -> Option<TrackedDeviceIndex> {
        self.index
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    #[inline]
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    #[inline]
    pub fn controls(&self) -> &ControlBank {
        &self.controls
    }

    #[inline]
    pub fn haptic_handle(&self) -> InputComponentHandle {
        self.haptic_handle
    }

    pub fn serial_number(&self) -> &'static str {
        match self.hand {
            Hand::Left => "LHR-E217CD00",
            Hand::Right => "LHR-E217CD01",
        }
    }

    /// Registers the device's properties and input components under `index`.
    pub fn activate(
        &mut self,
        index: TrackedDeviceIndex,
        host: &(impl Host + ?Sized),
        config: &DriverConfig,
    ) -> Result<(), ActivateError> {
        if self.index.is_some() {
            return Err(ActivateError::AlreadyActive);
        }

        let serial = self.serial_number();
        let side = self.hand.as_str();
        let strings = [
            (StringProperty::TrackingSystemName, "lighthouse".to_owned()),
            (StringProperty::SerialNumber, serial.to_owned()),
            (StringProperty::ModelNumber, format!("Leap {side}")),
            (StringProperty::ManufacturerName, "Valve".to_owned()),
            (StringProperty::ControllerType, "knuckles".to_owned()),
            (StringProperty::ResourceRoot, RESOURCE_ROOT.to_owned()),
            (
                StringProperty::RegisteredDeviceType,
                format!("valve/index_controller{serial}"),
            ),
            (
                StringProperty::InputProfilePath,
                format!("{{{RESOURCE_ROOT}}}/input/index_controller_profile.json"),
            ),
        ];
        for (prop, value) in &strings {
            host.set_string_property(index, *prop, value);
        }

        host.set_int32_property(
            index,
            Int32Property::DeviceClass,
            TrackedDeviceClass::Controller as i32,
        );
        host.set_controller_role_hint(index, self.hand.role());
        host.set_hand_selection_priority(index, HAND_SELECTION_PRIORITY);

        for (prop, value) in [
            (BoolProperty::WillDriftInYaw, false),
            (BoolProperty::DeviceIsWireless, true),
            (BoolProperty::DeviceIsCharging, false),
            (BoolProperty::Identifiable, true),
        ] {
            host.set_bool_property(index, prop, value);
        }

        self.controls.register(index, host)?;
        self.skeleton_handle = host.create_skeleton_component(
            index,
            &format!("/input/skeleton/{side}"),
            &format!("/skeleton/hand/{side}"),
            "/pose/raw",
            config.tracking_level.into(),
        )?;
        self.haptic_handle = host.create_haptic_component(index, "/output/haptic")?;

        self.index = Some(index);
        info!("activated {side} hand as device {index} ({serial})");
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.controls.reset();
        self.skeleton_handle = InputComponentHandle::INVALID;
        self.haptic_handle = InputComponentHandle::INVALID;
        if let Some(index) = self.index.take() {
            info!("deactivated {} hand (device {index})", self.hand.as_str());
        }
    }

    /// Connects or disconnects the device and tells the host right away.
    pub fn set_enabled(&mut self, enabled: bool, host: &(impl ServerDriverHost + ?Sized)) {
        self.enabled = enabled;
        self.publish_pose(host);
    }

    fn publish_pose(&self, host: &(impl ServerDriverHost + ?Sized)) {
        if let Some(index) = self.index {
            host.tracked_device_pose_updated(index, &self.pose.to_driver_pose(self.enabled));
        }
    }

    /// Advances the device by one tracking frame. `other` is the opposite hand, used for
    /// two handed gestures.
    pub fn run_frame(
        &mut self,
        ctx: &FrameContext,
        host: &(impl Host + ?Sized),
        sample: Option<&HandSample>,
        other: Option<&HandSample>,
    ) {
        tracy_span!("HandController::run_frame");
        let Some(index) = self.index else {
            return;
        };
        if !self.enabled {
            self.publish_pose(host);
            return;
        }

        self.pose.update(self.hand, sample, ctx.reference, ctx.config);
        if ctx.config.arbitration {
            let ret = arbitrate(self.hand, self.pose.position, ctx.snapshot, RESOURCE_ROOT);
            host.set_controller_role_hint(index, ret.claim.role);
            host.set_hand_selection_priority(index, ret.claim.priority);
            for (device, role) in &ret.nudges {
                host.set_controller_role_hint(*device, *role);
            }
            if ret.conceded() {
                debug!("{} hand invalidated by arbitration", self.hand.as_str());
                self.pose.invalidate();
            }
        }
        self.publish_pose(host);

        if let Some(sample) = sample {
            self.controls
                .apply_gestures(&GestureVector::extract(sample, other));
        }
        self.skeleton
            .update(self.hand, sample, ctx.config.knuckle_layout);
        self.controls.flush(host);

        if self.skeleton_handle.is_valid() {
            for range in [
                SkeletalMotionRange::WithController,
                SkeletalMotionRange::WithoutController,
            ] {
                if let Err(e) = host.update_skeleton_component(
                    self.skeleton_handle,
                    range,
                    self.skeleton.transforms(),
                ) {
                    warn_once!("failed to publish skeleton: {}", e);
                }
            }
        }
    }
}
