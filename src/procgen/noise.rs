/// Coherent noise channels used by terrain and zoning
use noise::{NoiseFn, Perlin};

/// Independent noise channels. Each channel is a separately seeded field, so
/// sampling one never correlates with another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoiseChannel {
    /// Low-frequency continental shape
    Elevation,
    /// Medium-frequency hills and valleys
    Roughness,
    /// High-frequency surface detail
    Detail,
    /// Vegetation moisture (grass vs forest)
    Moisture,
    /// Spatially coherent placement gating for buildings and trees
    Clustering,
}

impl NoiseChannel {
    pub const ALL: [NoiseChannel; 5] = [
        NoiseChannel::Elevation,
        NoiseChannel::Roughness,
        NoiseChannel::Detail,
        NoiseChannel::Moisture,
        NoiseChannel::Clustering,
    ];

    fn index(self) -> usize {
        match self {
            NoiseChannel::Elevation => 0,
            NoiseChannel::Roughness => 1,
            NoiseChannel::Detail => 2,
            NoiseChannel::Moisture => 3,
            NoiseChannel::Clustering => 4,
        }
    }
}

/// A seeded 2D coherent-noise function.
///
/// Implementations return values roughly in `[-1, 1]` and must be pure: the
/// same channel and coordinates always yield the same value.
pub trait NoiseSource: Send + Sync {
    fn noise_2d(&self, channel: NoiseChannel, x: f64, y: f64) -> f64;
}

/// Map a `[-1, 1]` noise sample into `[0, 1]`.
pub fn normalized(value: f64) -> f64 {
    ((value + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Perlin-backed noise source with one generator per channel
pub struct PerlinNoise {
    channels: [Perlin; 5],
}

impl PerlinNoise {
    /// Create a new noise source with the given seed
    pub fn new(seed: u32) -> Self {
        Self {
            channels: NoiseChannel::ALL.map(|c| Perlin::new(seed.wrapping_add(c.index() as u32))),
        }
    }

    /// Fold a 64-bit world seed into the 32-bit Perlin seed space.
    pub fn from_world_seed(seed: u64) -> Self {
        Self::new((seed ^ (seed >> 32)) as u32)
    }
}

impl NoiseSource for PerlinNoise {
    fn noise_2d(&self, channel: NoiseChannel, x: f64, y: f64) -> f64 {
        self.channels[channel.index()].get([x, y])
    }
}

/// Channel-independent constant field. Handy for forcing degenerate terrain.
#[derive(Debug, Clone, Copy)]
pub struct ConstantNoise(pub f64);

impl NoiseSource for ConstantNoise {
    fn noise_2d(&self, _channel: NoiseChannel, _x: f64, _y: f64) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_noise() {
        let noise1 = PerlinNoise::new(12345);
        let noise2 = PerlinNoise::new(12345);

        for channel in NoiseChannel::ALL {
            let val1 = noise1.noise_2d(channel, 1.37, 2.11);
            let val2 = noise2.noise_2d(channel, 1.37, 2.11);
            assert_eq!(val1, val2);
        }
    }

    #[test]
    fn test_different_seeds_produce_different_values() {
        let noise1 = PerlinNoise::new(12345);
        let noise2 = PerlinNoise::new(54321);

        let found_difference = (0..5).any(|x| {
            (0..5).any(|y| {
                let (px, py) = (x as f64 * 0.37 + 0.1, y as f64 * 0.41 + 0.2);
                noise1.noise_2d(NoiseChannel::Elevation, px, py)
                    != noise2.noise_2d(NoiseChannel::Elevation, px, py)
            })
        });

        assert!(found_difference, "Different seeds should produce different values");
    }

    #[test]
    fn test_channels_are_independent() {
        let noise = PerlinNoise::new(42);
        let differs = (0..10).any(|i| {
            let p = i as f64 * 0.31 + 0.17;
            noise.noise_2d(NoiseChannel::Elevation, p, p)
                != noise.noise_2d(NoiseChannel::Moisture, p, p)
        });
        assert!(differs);
    }

    #[test]
    fn test_noise_roughly_in_range() {
        let noise = PerlinNoise::new(42);

        for x in 0..10 {
            for y in 0..10 {
                let val = noise.noise_2d(NoiseChannel::Detail, x as f64 * 0.13, y as f64 * 0.13);
                assert!(val.is_finite());
                assert!(val > -1.5 && val < 1.5, "Noise value {} out of expected range", val);
            }
        }
    }

    #[test]
    fn test_normalized_clamps() {
        assert_eq!(normalized(-1.0), 0.0);
        assert_eq!(normalized(1.0), 1.0);
        assert_eq!(normalized(0.0), 0.5);
        assert_eq!(normalized(3.0), 1.0);
        assert_eq!(normalized(-3.0), 0.0);
    }
}
