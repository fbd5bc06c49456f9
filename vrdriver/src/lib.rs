//! The driver-side surface of the host runtime: the pose, skeleton and input types a
//! tracked device driver exchanges with the host, and the host services it calls into.
//!
//! Layouts follow `openvr_driver.h` closely so a thin FFI shim can forward them verbatim.

mod convert;

pub use convert::matrix34_to_affine;

pub type TrackedDeviceIndex = u32;

/// The head mounted reference device is always registered first.
pub const TRACKED_DEVICE_INDEX_HMD: TrackedDeviceIndex = 0;
pub const MAX_TRACKED_DEVICE_COUNT: usize = 32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputComponentHandle(pub u64);

impl InputComponentHandle {
    pub const INVALID: Self = Self(0);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for InputComponentHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HmdQuaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl HmdQuaternion {
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
}

impl Default for HmdQuaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HmdQuaternionf {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl HmdQuaternionf {
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
}

impl Default for HmdQuaternionf {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Homogeneous position, `v[3]` is always 1.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HmdVector4 {
    pub v: [f32; 4],
}

impl Default for HmdVector4 {
    fn default() -> Self {
        Self {
            v: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Row major 3x4 rigid transform.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HmdMatrix34 {
    pub m: [[f32; 4]; 3],
}

impl HmdMatrix34 {
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ],
    };
}

/// A bone transform relative to its parent bone.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BoneTransform {
    pub position: HmdVector4,
    pub orientation: HmdQuaternionf,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TrackingResult {
    #[default]
    Uninitialized = 1,
    RunningOk = 200,
    RunningOutOfRange = 201,
}

/// What a driver reports for one of its devices.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DriverPose {
    pub pose_time_offset: f64,
    pub position: [f64; 3],
    pub rotation: HmdQuaternion,
    pub velocity: [f64; 3],
    pub result: TrackingResult,
    pub pose_is_valid: bool,
    pub device_is_connected: bool,
}

impl Default for DriverPose {
    fn default() -> Self {
        Self {
            pose_time_offset: 0.0,
            position: [0.0; 3],
            rotation: HmdQuaternion::IDENTITY,
            velocity: [0.0; 3],
            result: TrackingResult::Uninitialized,
            pose_is_valid: false,
            device_is_connected: false,
        }
    }
}

/// What the host reports for any registered device.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TrackedDevicePose {
    pub device_to_absolute_tracking: HmdMatrix34,
    pub velocity: [f32; 3],
    pub result: TrackingResult,
    pub pose_is_valid: bool,
    pub device_is_connected: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ControllerRole {
    #[default]
    Invalid = 0,
    LeftHand = 1,
    RightHand = 2,
    OptOut = 3,
}

impl ControllerRole {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::LeftHand,
            2 => Self::RightHand,
            3 => Self::OptOut,
            _ => Self::Invalid,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrackedDeviceClass {
    Invalid = 0,
    Hmd = 1,
    Controller = 2,
    GenericTracker = 3,
    TrackingReference = 4,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkeletalMotionRange {
    WithController = 0,
    WithoutController = 1,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkeletalTrackingLevel {
    Estimated = 0,
    Partial = 1,
    Full = 2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScalarUnits {
    NormalizedOneSided,
    NormalizedTwoSided,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StringProperty {
    TrackingSystemName,
    ModelNumber,
    SerialNumber,
    ManufacturerName,
    ControllerType,
    ResourceRoot,
    RegisteredDeviceType,
    InputProfilePath,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Int32Property {
    DeviceClass,
    ControllerRoleHint,
    ControllerHandSelectionPriority,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BoolProperty {
    WillDriftInYaw,
    DeviceIsWireless,
    DeviceIsCharging,
    Identifiable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputError {
    InvalidDevice,
    InvalidHandle,
    InvalidPath(String),
    WrongType,
    MaxCapacityReached,
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDevice => f.write_str("invalid device"),
            Self::InvalidHandle => f.write_str("invalid component handle"),
            Self::InvalidPath(path) => write!(f, "invalid component path {path:?}"),
            Self::WrongType => f.write_str("component type mismatch"),
            Self::MaxCapacityReached => f.write_str("too many components"),
        }
    }
}

impl std::error::Error for InputError {}

/// Pose sink and raw pose source.
pub trait ServerDriverHost {
    fn tracked_device_pose_updated(&self, device: TrackedDeviceIndex, pose: &DriverPose);

    /// Fills `poses` with the latest raw pose of devices `0..poses.len()`.
    fn get_raw_tracked_device_poses(&self, poses: &mut [TrackedDevicePose]);
}

/// Input component registration and publishing.
pub trait DriverInput {
    fn create_boolean_component(
        &self,
        device: TrackedDeviceIndex,
        name: &str,
    ) -> Result<InputComponentHandle, InputError>;

    fn create_scalar_component(
        &self,
        device: TrackedDeviceIndex,
        name: &str,
        units: ScalarUnits,
    ) -> Result<InputComponentHandle, InputError>;

    fn create_skeleton_component(
        &self,
        device: TrackedDeviceIndex,
        name: &str,
        skeleton_path: &str,
        base_pose_path: &str,
        tracking_level: SkeletalTrackingLevel,
    ) -> Result<InputComponentHandle, InputError>;

    fn create_haptic_component(
        &self,
        device: TrackedDeviceIndex,
        name: &str,
    ) -> Result<InputComponentHandle, InputError>;

    fn update_boolean_component(
        &self,
        handle: InputComponentHandle,
        value: bool,
        time_offset: f64,
    ) -> Result<(), InputError>;

    fn update_scalar_component(
        &self,
        handle: InputComponentHandle,
        value: f32,
        time_offset: f64,
    ) -> Result<(), InputError>;

    fn update_skeleton_component(
        &self,
        handle: InputComponentHandle,
        motion_range: SkeletalMotionRange,
        transforms: &[BoneTransform],
    ) -> Result<(), InputError>;
}

/// Per-device property store. Role hints, hand selection priority and resource roots
/// live here, which makes it the device registry other drivers see.
pub trait Properties {
    fn set_string_property(&self, device: TrackedDeviceIndex, prop: StringProperty, value: &str);
    fn get_string_property(&self, device: TrackedDeviceIndex, prop: StringProperty)
        -> Option<String>;
    fn set_int32_property(&self, device: TrackedDeviceIndex, prop: Int32Property, value: i32);
    fn get_int32_property(&self, device: TrackedDeviceIndex, prop: Int32Property) -> Option<i32>;
    fn set_bool_property(&self, device: TrackedDeviceIndex, prop: BoolProperty, value: bool);

    fn controller_role_hint(&self, device: TrackedDeviceIndex) -> ControllerRole {
        self.get_int32_property(device, Int32Property::ControllerRoleHint)
            .map(ControllerRole::from_raw)
            .unwrap_or_default()
    }

    fn set_controller_role_hint(&self, device: TrackedDeviceIndex, role: ControllerRole) {
        self.set_int32_property(device, Int32Property::ControllerRoleHint, role as i32);
    }

    fn set_hand_selection_priority(&self, device: TrackedDeviceIndex, priority: i32) {
        self.set_int32_property(
            device,
            Int32Property::ControllerHandSelectionPriority,
            priority,
        );
    }

    fn resource_root(&self, device: TrackedDeviceIndex) -> Option<String> {
        self.get_string_property(device, StringProperty::ResourceRoot)
    }
}

/// Everything a driver needs from the host.
pub trait Host: ServerDriverHost + DriverInput + Properties {}
impl<T: ServerDriverHost + DriverInput + Properties + ?Sized> Host for T {}
