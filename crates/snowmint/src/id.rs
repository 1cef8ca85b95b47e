use core::{fmt, str::FromStr};

use crate::error::{Error, Result};

/// A 64-bit Snowflake ID.
///
/// - 1 bit reserved (always zero, keeps the ID positive as an `i64`)
/// - 41 bits timestamp (ms since the generator's [`Epoch`])
/// - 10 bits machine ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21             12 11             0
///              +--------------+----------------+-----------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | machine ID (10) | sequence (12) |
///              +--------------+----------------+-----------------+---------------+
///              |<----------- MSB ---------- 64 bits ----------- LSB ------------>|
/// ```
///
/// Ordering on the raw integer is ordering on `(timestamp, machine_id,
/// sequence)`, so IDs minted by one generator compare in mint order.
///
/// # Example
///
/// ```
/// use snowmint::SnowflakeId;
///
/// let id = SnowflakeId::from_components(1000, 5, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.machine_id(), 5);
/// assert_eq!(id.sequence(), 1);
/// assert_eq!(id.to_raw(), (1000 << 22) | (5 << 12) | 1);
/// ```
///
/// [`Epoch`]: crate::Epoch
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 22
    /// through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << 41) - 1;

    /// Bitmask for extracting the 10-bit machine ID field. Occupies bits 12
    /// through 21.
    pub const MACHINE_ID_MASK: u64 = (1 << 10) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: u64 = (1 << 12) - 1;

    /// Number of bits to shift the timestamp to its correct position (bit 22).
    pub const TIMESTAMP_SHIFT: u64 = 22;

    /// Number of bits to shift the machine ID to its correct position (bit 12).
    pub const MACHINE_ID_SHIFT: u64 = 12;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u64 = 0;

    /// Mask of the reserved high bit.
    pub const RESERVED_MASK: u64 = 1 << 63;

    /// Packs the three fields into an ID. Each field is masked to its width.
    pub const fn from_components(timestamp: u64, machine_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let machine_id = (machine_id & Self::MACHINE_ID_MASK) << Self::MACHINE_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | machine_id | sequence,
        }
    }

    /// Wraps a raw integer without validation. See [`Self::is_valid`].
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the raw integer representation.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Extracts the timestamp (ms since the epoch) from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the machine ID from the packed ID.
    pub const fn machine_id(&self) -> u64 {
        (self.id >> Self::MACHINE_ID_SHIFT) & Self::MACHINE_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Largest value the 41-bit timestamp field can hold.
    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    /// Largest value the 10-bit machine ID field can hold.
    pub const fn max_machine_id() -> u64 {
        Self::MACHINE_ID_MASK
    }

    /// Largest value the 12-bit sequence field can hold.
    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    /// Returns `true` if the reserved bit is clear.
    pub const fn is_valid(&self) -> bool {
        self.id & Self::RESERVED_MASK == 0
    }

    /// Returns true if the current sequence value can be incremented.
    pub const fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::max_sequence()
    }

    /// Returns a new ID with the sequence incremented.
    pub const fn increment_sequence(&self) -> Self {
        Self::from_components(self.timestamp(), self.machine_id(), self.sequence() + 1)
    }

    /// Returns a new ID for a newer timestamp with sequence reset to zero.
    pub const fn rollover_to_timestamp(&self, timestamp: u64) -> Self {
        Self::from_components(timestamp, self.machine_id(), 0)
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.id
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp())
            .field("machine_id", &self.machine_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

impl FromStr for SnowflakeId {
    type Err = Error;

    /// Parses the decimal representation produced by [`fmt::Display`].
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidId {
            input: s.to_owned(),
        };
        let id = Self::from_raw(s.trim().parse::<u64>().map_err(|_| invalid())?);
        if !id.is_valid() {
            return Err(invalid());
        }
        Ok(id)
    }
}

/// A validated machine identifier in `[0, 1023]`.
///
/// ```
/// use snowmint::MachineId;
///
/// assert!(MachineId::new(1023).is_ok());
/// assert!(MachineId::new(1024).is_err());
/// assert!(MachineId::new(-1).is_err());
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MachineId(u16);

impl MachineId {
    /// The largest machine ID the 10-bit field can hold.
    pub const MAX: u16 = SnowflakeId::MACHINE_ID_MASK as u16;

    /// Validates `machine_id` against the 10-bit machine field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMachineId`] when `machine_id` is negative or
    /// greater than [`Self::MAX`].
    pub fn new(machine_id: i64) -> Result<Self> {
        match u16::try_from(machine_id) {
            Ok(id) if id <= Self::MAX => Ok(Self(id)),
            _ => Err(Error::InvalidMachineId {
                machine_id,
                max: Self::MAX,
            }),
        }
    }

    /// Returns the validated value.
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for MachineId {
    type Error = Error;

    fn try_from(machine_id: i64) -> Result<Self> {
        Self::new(machine_id)
    }
}

impl From<MachineId> for u16 {
    fn from(id: MachineId) -> Self {
        id.0
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
