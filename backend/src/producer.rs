use devicemon_shared::{DeviceId, Frame};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound (inclusive) of every synthesized value.
pub const MAX_VALUE: u32 = 99;

/// Independent generator for one client session.
///
/// With a configured seed every session replays the same stream; otherwise
/// each session is seeded from the thread-local RNG.
pub fn session_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

pub fn generate_frame<R: Rng>(rng: &mut R, device_id: &DeviceId) -> Frame {
    Frame {
        device_id: device_id.clone(),
        voltage: rng.random_range(0..=MAX_VALUE),
        current: rng.random_range(0..=MAX_VALUE),
        temperature: rng.random_range(0..=MAX_VALUE),
    }
}

/// One tick's worth of encoded messages: one per device, in device order.
pub fn generate_tick<R: Rng>(rng: &mut R, devices: &[DeviceId]) -> Vec<String> {
    devices
        .iter()
        .map(|id| generate_frame(rng, id).encode())
        .collect()
}
