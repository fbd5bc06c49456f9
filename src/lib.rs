#![deny(clippy::all)]

mod arbitration;
mod config;
mod controls;
mod device;
mod driver;
mod gesture;
mod math;
mod pose;
mod reference;
mod sample;
mod skeleton;


pub use arbitration::{
    arbitrate, Arbitration, DeviceSnapshot, RoleClaim, SnapshotEntry, CONFLICT_DISTANCE,
};
pub use config::{ConfigError, DriverConfig, KnuckleLayout, OrientationMode, TrackingLevel};
pub use controls::{ControlBank, ControlKind, ControlValue, IndexButton, LogicalControl};
pub use device::{ActivateError, HandController, RESOURCE_ROOT};
pub use driver::{FrameContext, HandDriver, TrackingFrame};
pub use gesture::{Gesture, GestureVector};
pub use pose::Pose;
pub use reference::ReferenceFrame;
pub use sample::{Bone, Digit, Finger, Hand, HandSample, Palm};
pub use skeleton::{wrist_rotation, HandSkeletonBone, Skeleton, BONE_COUNT};

pub use vrdriver as vr;

macro_rules! warn_once {
    ($literal:literal $(,$($tt:tt)*)?) => {{
        static ONCE: std::sync::Once = std::sync::Once::new();
        ONCE.call_once(|| {
            log::warn!(concat!("[ONCE] ", $literal) $(,$($tt)*)?);
        });
    }}
}
use warn_once;

#[cfg(feature = "tracing")]
macro_rules! tracy_span {
    ($($tt:tt)*) => {
        let _span = tracy_client::span!($($tt)*);
    }
}

#[cfg(not(feature = "tracing"))]
macro_rules! tracy_span {
    ($($tt:tt)*) => {};
}
use tracy_span;

#[cfg(feature = "tracing")]
tracy_client::register_demangler!();

pub fn init_logging() {
    static ONCE: std::sync::Once = std::sync::Once::new();

    ONCE.call_once(|| {
        let mut builder = env_logger::Builder::new();
        #[allow(unused_mut)]
        let mut startup_err: Option<String> = None;

        #[cfg(not(test))]
        {
            use std::path::Path;

            struct ComboWriter(std::fs::File, std::io::Stderr);

            impl std::io::Write for ComboWriter {
                fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                    let _ = self.0.write(buf)?;
                    self.1.write(buf)
                }

                fn flush(&mut self) -> std::io::Result<()> {
                    self.0.flush()?;
                    self.1.flush()
                }
            }

            let state_dir = std::env::var("XDG_STATE_HOME")
                .or_else(|_| std::env::var("HOME").map(|h| h + "/.local/state"));

            if let Ok(state) = state_dir {
                let path = Path::new(&state).join("handrig");
                match std::fs::create_dir_all(&path) {
                    Ok(_) => match std::fs::File::create(path.join("handrig.txt")) {
                        Ok(file) => {
                            let writer = ComboWriter(file, std::io::stderr());
                            builder.target(env_logger::Target::Pipe(Box::new(writer)));
                        }
                        Err(e) => startup_err = Some(format!("Failed to create log file: {e:?}")),
                    },
                    Err(e) => {
                        startup_err = Some(format!(
                            "Failed to create log directory ({path:?}): {e:?}"
                        ))
                    }
                }
            }
        }

        // safety: the driver is loaded before the host spawns its frame threads
        unsafe {
            time::util::local_offset::set_soundness(time::util::local_offset::Soundness::Unsound)
        };

        builder
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .is_test(cfg!(test))
            .format(|buf, record| {
                use std::io::Write;
                use time::macros::format_description;

                let style = buf.default_level_style(record.level());
                let now = time::OffsetDateTime::now_local()
                    .unwrap_or_else(|_| time::OffsetDateTime::now_utc());
                let now = now
                    .format(format_description!(
                        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]"
                    ))
                    .map_err(std::io::Error::other)?;

                write!(buf, "[{now} {style}{:5}{style:#}", record.level())?;
                if let Some(path) = record.module_path() {
                    write!(buf, " {}", path)?;
                }
                writeln!(buf, "] {}", record.args())
            })
            .try_init()
            .ok();

        log::info!("Initializing handrig");
        if let Some(err) = startup_err {
            log::warn!("{err}");
        }
    });
}
