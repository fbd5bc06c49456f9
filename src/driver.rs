use crate::arbitration::DeviceSnapshot;
use crate::config::DriverConfig;
use crate::device::{ActivateError, HandController};
use crate::reference::ReferenceFrame;
use crate::sample::{Hand, HandSample};
use crate::tracy_span;
use log::{info, trace};
use vrdriver::{Host, TrackedDeviceIndex};

/// One frame as delivered by the hand tracker.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackingFrame {
    pub id: u64,
    pub hands: Vec<HandSample>,
}

impl TrackingFrame {
    /// First sample for `side`, if the tracker saw that hand.
    pub fn hand(&self, side: Hand) -> Option<&HandSample> {
        self.hands.iter().find(|h| h.side == side)
    }
}

/// State shared by both hands for the duration of one frame.
pub struct FrameContext<'a> {
    pub config: &'a DriverConfig,
    pub reference: &'a ReferenceFrame,
    pub snapshot: &'a DeviceSnapshot,
}

pub struct HandDriver {
    config: DriverConfig,
    reference: ReferenceFrame,
    left: HandController,
    right: HandController,
}

impl HandDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            reference: ReferenceFrame::default(),
            left: HandController::new(Hand::Left),
            right: HandController::new(Hand::Right),
        }
    }

    #[inline]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    #[inline]
    pub fn reference(&self) -> &ReferenceFrame {
        &self.reference
    }

    pub fn controller(&self, hand: Hand) -> &HandController {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    pub fn controller_mut(&mut self, hand: Hand) -> &mut HandController {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    /// Registers both hands with the host and connects them.
    pub fn activate(
        &mut self,
        host: &(impl Host + ?Sized),
        left: TrackedDeviceIndex,
        right: TrackedDeviceIndex,
    ) -> Result<(), ActivateError> {
        self.left.activate(left, host, &self.config)?;
        self.right.activate(right, host, &self.config)?;
        self.left.set_enabled(true, host);
        self.right.set_enabled(true, host);
        info!("hand driver ready ({:?} mode)", self.config.orientation_mode);
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.left.deactivate();
        self.right.deactivate();
    }

    pub fn run_frame(&mut self, host: &(impl Host + ?Sized), frame: &TrackingFrame) {
        tracy_span!("HandDriver::run_frame");
        trace!("frame {} with {} hand(s)", frame.id, frame.hands.len());

        // both hands must see the same headset pose and device registry
        self.reference.refresh(host);
        let snapshot = DeviceSnapshot::capture(host);
        let ctx = FrameContext {
            config: &self.config,
            reference: &self.reference,
            snapshot: &snapshot,
        };

        let left = frame.hand(Hand::Left);
        let right = frame.hand(Hand::Right);
        self.left.run_frame(&ctx, host, left, right);
        self.right.run_frame(&ctx, host, right, left);
    }
}
