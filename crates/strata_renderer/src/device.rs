//! Render devices.
//!
//! A device is an independent execution context with its own worker pool.
//! Devices never share live scene data: each builds its own world, renders
//! its own band and hands back plain pixels.

use crate::error::{check, RenderError, RenderResult};
use std::num::NonZeroUsize;

/// Most devices enumerated from host parallelism when `STRATA_DEVICES` is
/// not set.
const DEFAULT_MAX_DEVICES: usize = 4;

/// One render device: an id and a private pool of worker threads.
pub struct Device {
    id: usize,
    pool: rayon::ThreadPool,
}

impl Device {
    /// Bring up device `id` with `threads` workers.
    pub fn open(id: usize, threads: usize) -> RenderResult<Self> {
        let pool = check(
            id,
            "ThreadPoolBuilder::build",
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads.max(1))
                .thread_name(move |worker| format!("strata-dev{}-{}", id, worker))
                .build(),
        )?;
        log::debug!("Opened device {} with {} workers", id, pool.current_num_threads());
        Ok(Self { id, pool })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` on this device's workers.
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }

    /// Allocate an empty buffer able to hold `len` items without growing.
    #[track_caller]
    pub fn alloc<T>(&self, len: usize, call: &'static str) -> RenderResult<Vec<T>> {
        let mut buffer = Vec::new();
        check(self.id, call, buffer.try_reserve_exact(len))?;
        Ok(buffer)
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("threads", &self.threads())
            .finish()
    }
}

/// How many devices are available.
///
/// `STRATA_DEVICES` wins when set (and may be 0); otherwise the host's
/// parallelism decides, capped at a handful of devices.
pub fn query_device_count() -> RenderResult<usize> {
    match std::env::var("STRATA_DEVICES") {
        Ok(value) => value.trim().parse().map_err(|_| {
            RenderError::InvalidConfig(format!("STRATA_DEVICES is not a count: {:?}", value))
        }),
        Err(_) => Ok(host_parallelism().min(DEFAULT_MAX_DEVICES)),
    }
}

fn host_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Open `count` devices, splitting the host's threads evenly between them.
pub fn enumerate_devices(count: usize) -> RenderResult<Vec<Device>> {
    if count == 0 {
        return Err(RenderError::NoDevices);
    }
    let threads = (host_parallelism() / count).max(1);
    (0..count).map(|id| Device::open(id, threads)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_devices_is_an_environment_error() {
        assert!(matches!(enumerate_devices(0), Err(RenderError::NoDevices)));
    }

    #[test]
    fn test_enumerate_devices() {
        let devices = enumerate_devices(3).unwrap();
        let ids: Vec<usize> = devices.iter().map(Device::id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(devices.iter().all(|d| d.threads() >= 1));
    }

    #[test]
    fn test_install_runs_on_device_pool() {
        let device = Device::open(5, 2).unwrap();
        let name = device.install(|| std::thread::current().name().map(str::to_string));
        assert_eq!(name.as_deref().map(|n| n.starts_with("strata-dev5-")), Some(true));
    }

    #[test]
    fn test_alloc_reserves_capacity() {
        let device = Device::open(0, 1).unwrap();
        let buffer: Vec<u64> = device.alloc(128, "alloc test").unwrap();
        assert!(buffer.is_empty());
        assert!(buffer.capacity() >= 128);
    }

    #[test]
    fn test_impossible_alloc_is_a_device_error() {
        let device = Device::open(1, 1).unwrap();
        let result: RenderResult<Vec<u64>> = device.alloc(usize::MAX, "alloc huge");
        match result {
            Err(RenderError::Device { device, call, .. }) => {
                assert_eq!(device, 1);
                assert_eq!(call, "alloc huge");
            }
            other => panic!("expected device error, got {:?}", other),
        }
    }
}
