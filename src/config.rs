use crate::error::{Error, Result};
use crate::IntOpenHashMap;

/// Expected number of entries used when none is given.
pub const DEFAULT_EXPECTED_SIZE: usize = 16;

/// Load factor used when none is given.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Largest table the map will allocate.
pub(crate) const MAX_CAPACITY: usize = 1 << 30;

/// Sizing parameters for an IntOpenHashMap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    pub(crate) expected_size: usize,
    pub(crate) load_factor: f32,
}

impl MapConfig {
    /// Create a new config with defaults (16 expected entries, load factor 0.75).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of entries the map should hold without growing.
    pub fn expected_size(mut self, expected: usize) -> Self {
        self.expected_size = expected;
        self
    }

    /// Set the load factor. Must be strictly between 0 and 1.
    pub fn load_factor(mut self, f: f32) -> Result<Self> {
        validate_load_factor(f)?;
        self.load_factor = f;
        Ok(self)
    }

    /// Table capacity this configuration starts with.
    pub fn initial_capacity(&self) -> Result<usize> {
        array_size(self.expected_size, self.load_factor)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            expected_size: DEFAULT_EXPECTED_SIZE,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

/// Builder for creating an IntOpenHashMap with custom sizing and a default
/// return value.
pub struct IntOpenHashMapBuilder<V> {
    config: MapConfig,
    default_value: Option<V>,
}

impl<V> IntOpenHashMapBuilder<V> {
    /// Create a new builder with default configuration and no default value.
    pub fn new() -> Self {
        Self {
            config: MapConfig::default(),
            default_value: None,
        }
    }

    /// Set the number of entries the map should hold without growing.
    pub fn expected_size(mut self, expected: usize) -> Self {
        self.config = self.config.expected_size(expected);
        self
    }

    /// Set the load factor. Must be strictly between 0 and 1.
    pub fn load_factor(mut self, f: f32) -> Result<Self> {
        self.config = self.config.load_factor(f)?;
        Ok(self)
    }

    /// Value returned by default-substituting accessors on a miss.
    pub fn default_return_value(mut self, value: V) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Build an IntOpenHashMap with the configured settings.
    pub fn build(self) -> Result<IntOpenHashMap<V>> {
        let mut map = IntOpenHashMap::with_config(self.config)?;
        map.set_default_return_value(self.default_value);
        Ok(map)
    }
}

impl<V> Default for IntOpenHashMapBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_load_factor(f: f32) -> Result<()> {
    // NaN fails both comparisons.
    if f > 0.0 && f < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidLoadFactor(f))
    }
}

/// Smallest power-of-two table able to hold `expected` entries at load
/// factor `f`, never below 2.
pub(crate) fn array_size(expected: usize, f: f32) -> Result<usize> {
    let wanted = (expected as f64 / f as f64).ceil();
    if wanted > MAX_CAPACITY as f64 {
        return Err(Error::CapacityOverflow {
            expected,
            load_factor: f,
        });
    }
    Ok((wanted as usize).next_power_of_two().max(2))
}

/// Number of entries a table of capacity `n` accepts before growing.
/// Always leaves at least one empty slot so probing terminates.
pub(crate) fn max_fill(n: usize, f: f32) -> usize {
    let fill = (n as f64 * f as f64).ceil() as usize;
    fill.min(n - 1)
}
