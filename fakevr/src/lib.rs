//! An in-memory host runtime. Every call a driver makes is recorded so tests can assert on
//! what was published, and device poses/properties can be injected to stand in for other
//! drivers' devices.

use glam::{DAffine3, DQuat, DVec3};
use slotmap::{Key, KeyData, SlotMap};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use vrdriver::{
    BoneTransform, BoolProperty, DriverInput, DriverPose, InputComponentHandle, InputError,
    Int32Property, Properties, ScalarUnits, ServerDriverHost, SkeletalMotionRange,
    SkeletalTrackingLevel, StringProperty, TrackedDeviceIndex, TrackedDevicePose, TrackingResult,
    MAX_TRACKED_DEVICE_COUNT,
};

slotmap::new_key_type! {
    struct ComponentKey;
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ComponentKind {
    Boolean,
    Scalar(ScalarUnits),
    Skeleton(SkeletalTrackingLevel),
    Haptic,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ComponentValue {
    Boolean(bool),
    Scalar(f32),
}

#[derive(Clone, Debug)]
pub struct Component {
    pub device: TrackedDeviceIndex,
    pub name: String,
    pub kind: ComponentKind,
    pub value: Option<ComponentValue>,
    /// Number of times the value was updated.
    pub updates: usize,
}

#[derive(Default)]
struct DeviceProperties {
    strings: HashMap<StringProperty, String>,
    ints: HashMap<Int32Property, i32>,
    bools: HashMap<BoolProperty, bool>,
}

#[derive(Default)]
struct State {
    raw_poses: HashMap<TrackedDeviceIndex, TrackedDevicePose>,
    published_poses: Vec<(TrackedDeviceIndex, DriverPose)>,
    components: SlotMap<ComponentKey, Component>,
    skeletons: Vec<(InputComponentHandle, SkeletalMotionRange, Vec<BoneTransform>)>,
    properties: HashMap<TrackedDeviceIndex, DeviceProperties>,
}

#[derive(Default)]
pub struct FakeHost {
    state: Mutex<State>,
}

fn handle_for(key: ComponentKey) -> InputComponentHandle {
    InputComponentHandle(key.data().as_ffi())
}

fn key_for(handle: InputComponentHandle) -> ComponentKey {
    KeyData::from_ffi(handle.0).into()
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Sets the raw pose the host reports for `device`.
    pub fn set_device_pose(&self, device: TrackedDeviceIndex, rotation: DQuat, position: DVec3) {
        self.state().raw_poses.insert(
            device,
            TrackedDevicePose {
                device_to_absolute_tracking: DAffine3::from_rotation_translation(
                    rotation, position,
                )
                .into(),
                velocity: [0.0; 3],
                result: TrackingResult::RunningOk,
                pose_is_valid: true,
                device_is_connected: true,
            },
        );
    }

    /// Keeps the last pose of `device` but flags it invalid.
    pub fn invalidate_device_pose(&self, device: TrackedDeviceIndex) {
        let mut state = self.state();
        let pose = state.raw_poses.entry(device).or_default();
        pose.pose_is_valid = false;
        pose.result = TrackingResult::RunningOutOfRange;
    }

    /// Registers a device owned by some other driver.
    pub fn add_foreign_device(
        &self,
        device: TrackedDeviceIndex,
        resource_root: &str,
        role: vrdriver::ControllerRole,
        position: DVec3,
    ) {
        self.set_device_pose(device, DQuat::IDENTITY, position);
        self.set_string_property(device, StringProperty::ResourceRoot, resource_root);
        self.set_controller_role_hint(device, role);
    }

    pub fn published_poses(&self) -> Vec<(TrackedDeviceIndex, DriverPose)> {
        self.state().published_poses.clone()
    }

    pub fn last_pose(&self, device: TrackedDeviceIndex) -> Option<DriverPose> {
        self.state()
            .published_poses
            .iter()
            .rev()
            .find(|(idx, _)| *idx == device)
            .map(|(_, pose)| *pose)
    }

    pub fn clear_published(&self) {
        let mut state = self.state();
        state.published_poses.clear();
        state.skeletons.clear();
        for (_, component) in state.components.iter_mut() {
            component.updates = 0;
        }
    }

    pub fn component(&self, device: TrackedDeviceIndex, name: &str) -> Option<Component> {
        self.state()
            .components
            .values()
            .find(|c| c.device == device && c.name == name)
            .cloned()
    }

    pub fn components(&self, device: TrackedDeviceIndex) -> Vec<Component> {
        self.state()
            .components
            .values()
            .filter(|c| c.device == device)
            .cloned()
            .collect()
    }

    pub fn skeleton_updates(
        &self,
    ) -> Vec<(InputComponentHandle, SkeletalMotionRange, Vec<BoneTransform>)> {
        self.state().skeletons.clone()
    }

    pub fn int32_property(&self, device: TrackedDeviceIndex, prop: Int32Property) -> Option<i32> {
        self.get_int32_property(device, prop)
    }

    fn create_component(
        &self,
        device: TrackedDeviceIndex,
        name: &str,
        kind: ComponentKind,
    ) -> Result<InputComponentHandle, InputError> {
        if device as usize >= MAX_TRACKED_DEVICE_COUNT {
            return Err(InputError::InvalidDevice);
        }
        if !name.starts_with('/') {
            return Err(InputError::InvalidPath(name.to_owned()));
        }
        let key = self.state().components.insert(Component {
            device,
            name: name.to_owned(),
            kind,
            value: None,
            updates: 0,
        });
        Ok(handle_for(key))
    }

    fn update_component(
        &self,
        handle: InputComponentHandle,
        value: ComponentValue,
    ) -> Result<(), InputError> {
        let mut state = self.state();
        let component = state
            .components
            .get_mut(key_for(handle))
            .ok_or(InputError::InvalidHandle)?;
        match (component.kind, value) {
            (ComponentKind::Boolean, ComponentValue::Boolean(_))
            | (ComponentKind::Scalar(_), ComponentValue::Scalar(_)) => {}
            _ => return Err(InputError::WrongType),
        }
        component.value = Some(value);
        component.updates += 1;
        Ok(())
    }
}

impl ServerDriverHost for FakeHost {
    /// Published poses also become the device's raw pose, the way the real host reports
    /// driver devices back to every other driver.
    fn tracked_device_pose_updated(&self, device: TrackedDeviceIndex, pose: &DriverPose) {
        let mut state = self.state();
        state.published_poses.push((device, *pose));
        state.raw_poses.insert(
            device,
            TrackedDevicePose {
                device_to_absolute_tracking: DAffine3::from_rotation_translation(
                    pose.rotation.into(),
                    DVec3::from_array(pose.position),
                )
                .into(),
                velocity: pose.velocity.map(|v| v as f32),
                result: pose.result,
                pose_is_valid: pose.pose_is_valid,
                device_is_connected: pose.device_is_connected,
            },
        );
    }

    fn get_raw_tracked_device_poses(&self, poses: &mut [TrackedDevicePose]) {
        let state = self.state();
        for (idx, pose) in poses.iter_mut().enumerate() {
            *pose = state
                .raw_poses
                .get(&(idx as TrackedDeviceIndex))
                .copied()
                .unwrap_or_default();
        }
    }
}

impl DriverInput for FakeHost {
    fn create_boolean_component(
        &self,
        device: TrackedDeviceIndex,
        name: &str,
    ) -> Result<InputComponentHandle, InputError> {
        self.create_component(device, name, ComponentKind::Boolean)
    }

    fn create_scalar_component(
        &self,
        device: TrackedDeviceIndex,
        name: &str,
        units: ScalarUnits,
    ) -> Result<InputComponentHandle, InputError> {
        self.create_component(device, name, ComponentKind::Scalar(units))
    }

    fn create_skeleton_component(
        &self,
        device: TrackedDeviceIndex,
        name: &str,
        skeleton_path: &str,
        _base_pose_path: &str,
        tracking_level: SkeletalTrackingLevel,
    ) -> Result<InputComponentHandle, InputError> {
        if !skeleton_path.starts_with("/skeleton/hand/") {
            return Err(InputError::InvalidPath(skeleton_path.to_owned()));
        }
        self.create_component(device, name, ComponentKind::Skeleton(tracking_level))
    }

    fn create_haptic_component(
        &self,
        device: TrackedDeviceIndex,
        name: &str,
    ) -> Result<InputComponentHandle, InputError> {
        self.create_component(device, name, ComponentKind::Haptic)
    }

    fn update_boolean_component(
        &self,
        handle: InputComponentHandle,
        value: bool,
        _time_offset: f64,
    ) -> Result<(), InputError> {
        self.update_component(handle, ComponentValue::Boolean(value))
    }

    fn update_scalar_component(
        &self,
        handle: InputComponentHandle,
        value: f32,
        _time_offset: f64,
    ) -> Result<(), InputError> {
        self.update_component(handle, ComponentValue::Scalar(value))
    }

    fn update_skeleton_component(
        &self,
        handle: InputComponentHandle,
        motion_range: SkeletalMotionRange,
        transforms: &[BoneTransform],
    ) -> Result<(), InputError> {
        let mut state = self.state();
        match state.components.get(key_for(handle)) {
            Some(Component {
                kind: ComponentKind::Skeleton(_),
                ..
            }) => {}
            Some(_) => return Err(InputError::WrongType),
            None => return Err(InputError::InvalidHandle),
        }
        state
            .skeletons
            .push((handle, motion_range, transforms.to_vec()));
        Ok(())
    }
}

impl Properties for FakeHost {
    fn set_string_property(&self, device: TrackedDeviceIndex, prop: StringProperty, value: &str) {
        self.state()
            .properties
            .entry(device)
            .or_default()
            .strings
            .insert(prop, value.to_owned());
    }

    fn get_string_property(
        &self,
        device: TrackedDeviceIndex,
        prop: StringProperty,
    ) -> Option<String> {
        self.state()
            .properties
            .get(&device)
            .and_then(|p| p.strings.get(&prop).cloned())
    }

    fn set_int32_property(&self, device: TrackedDeviceIndex, prop: Int32Property, value: i32) {
        self.state()
            .properties
            .entry(device)
            .or_default()
            .ints
            .insert(prop, value);
    }

    fn get_int32_property(&self, device: TrackedDeviceIndex, prop: Int32Property) -> Option<i32> {
        self.state()
            .properties
            .get(&device)
            .and_then(|p| p.ints.get(&prop).copied())
    }

    fn set_bool_property(&self, device: TrackedDeviceIndex, prop: BoolProperty, value: bool) {
        self.state()
            .properties
            .entry(device)
            .or_default()
            .bools
            .insert(prop, value);
    }
}
