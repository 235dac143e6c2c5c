//! Key/Value Codec
//!
//! Maps a key-space id to its key and its fixed-size value.
//!
//! ## Layout
//! ```text
//! key   = decimal(id)
//! value = ┌──────────────┬──────────────────────────────┐
//!         │ decimal(id)  │ fill byte ... (size total)   │
//!         └──────────────┴──────────────────────────────┘
//! ```
//!
//! Values depend on nothing but `(id, size, fill)`, so a reader can check any
//! observed value without keeping expected values around.

/// Default value size in bytes
pub const DEFAULT_VALUE_SIZE: usize = 1024;

/// Default filler byte
pub const DEFAULT_FILL: u8 = b'a';

/// Encode an id as its key
pub fn encode_key(id: u64) -> Vec<u8> {
    id.to_string().into_bytes()
}

/// Width in bytes of the widest key for a population of `population` ids
pub fn key_width(population: u64) -> usize {
    population.saturating_sub(1).to_string().len()
}

/// Recover the id written at the front of a value
///
/// Returns `None` when the value does not start with a digit or the digits
/// overflow a `u64`.
pub fn decode_id_prefix(value: &[u8]) -> Option<u64> {
    let digits = value.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    std::str::from_utf8(&value[..digits]).ok()?.parse().ok()
}

/// Builds and checks fixed-size values
#[derive(Debug, Clone)]
pub struct ValueCodec {
    size: usize,
    fill: u8,
    filler: Vec<u8>,
}

impl ValueCodec {
    pub fn new(size: usize, fill: u8) -> Self {
        Self {
            size,
            fill,
            filler: vec![fill; size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn fill(&self) -> u8 {
        self.fill
    }

    /// Encode the value for `id`
    ///
    /// If the id's text is longer than `size` it is cut to `size` bytes.
    pub fn encode(&self, id: u64) -> Vec<u8> {
        let mut value = self.filler.clone();
        self.write_prefix(id, &mut value);
        value
    }

    /// True iff `observed` is exactly the value for `id`
    pub fn verify(&self, id: u64, observed: &[u8]) -> bool {
        if observed.len() != self.size {
            return false;
        }
        let text = id.to_string();
        let prefix = text.len().min(self.size);
        observed[..prefix] == text.as_bytes()[..prefix] && observed[prefix..] == self.filler[prefix..]
    }

    fn write_prefix(&self, id: u64, value: &mut [u8]) {
        let text = id.to_string();
        let n = text.len().min(value.len());
        value[..n].copy_from_slice(&text.as_bytes()[..n]);
    }
}

impl Default for ValueCodec {
    fn default() -> Self {
        Self::new(DEFAULT_VALUE_SIZE, DEFAULT_FILL)
    }
}
