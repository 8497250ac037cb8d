use crate::SequentialId;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

impl Serialize for SequentialId {
    /// Serializes as the 18-character decimal string.
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SequentialId {
    /// Deserializes from the 18-character decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying deserializer fails or the string is
    /// not a well-formed identifier.
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct SequentialIdVisitor;

        impl de::Visitor<'_> for SequentialIdVisitor {
            type Value = SequentialId;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("an 18-digit sequential id string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(de::Error::custom)
            }
        }

        d.deserialize_str(SequentialIdVisitor)
    }
}
