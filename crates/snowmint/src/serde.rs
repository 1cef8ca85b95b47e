use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::id::SnowflakeId;

/// Serializes as the native `u64` representation.
impl Serialize for SnowflakeId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_raw().serialize(s)
    }
}

/// Deserializes from the native `u64` representation, rejecting values with
/// the reserved bit set.
impl<'de> Deserialize<'de> for SnowflakeId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = Self::from_raw(u64::deserialize(d)?);
        if !id.is_valid() {
            return Err(de::Error::custom(format_args!(
                "snowflake id {} has the reserved bit set",
                id.to_raw()
            )));
        }
        Ok(id)
    }
}
