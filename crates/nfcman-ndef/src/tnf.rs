/// Type Name Format, the 3-bit field classifying a record's `type_`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum Tnf {
    Empty,
    WellKnown,
    Mime,
    AbsoluteUri,
    External,
    Unknown,
    /// Only valid on the middle and final records of a chunked payload
    Unchanged,
}

impl Tnf {
    pub const RESERVED: u8 = 7;

    pub fn as_u8(self) -> u8 {
        match self {
            Tnf::Empty => 0,
            Tnf::WellKnown => 1,
            Tnf::Mime => 2,
            Tnf::AbsoluteUri => 3,
            Tnf::External => 4,
            Tnf::Unknown => 5,
            Tnf::Unchanged => 6,
        }
    }
}

impl TryFrom<u8> for Tnf {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let tnf = match value {
            0 => Tnf::Empty,
            1 => Tnf::WellKnown,
            2 => Tnf::Mime,
            3 => Tnf::AbsoluteUri,
            4 => Tnf::External,
            5 => Tnf::Unknown,
            6 => Tnf::Unchanged,
            other => return Err(other),
        };

        Ok(tnf)
    }
}

impl From<Tnf> for u8 {
    fn from(tnf: Tnf) -> Self {
        tnf.as_u8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_value_is_rejected() {
        assert_eq!(Tnf::try_from(Tnf::RESERVED), Err(7));
        assert_eq!(Tnf::try_from(5), Ok(Tnf::Unknown));
        assert_eq!(u8::from(Tnf::Unchanged), 6);
    }
}
