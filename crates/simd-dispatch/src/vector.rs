use std::fmt;

/// Opaque 128-bit value operated on by the [`OperationTable`](crate::OperationTable).
///
/// The value carries no lane type. Whether the 16 bytes are four `f32` or
/// four `i32` lanes depends only on the operation applied, so conversions
/// between views are bit reinterpretations. Lanes are stored in native
/// memory order (lane 0 at the lowest address), the same layout a 128-bit
/// register spill produces on a little-endian host.
///
/// Equality is bitwise: two NaNs with the same payload compare equal, `0.0`
/// and `-0.0` do not.
///
/// # Examples
///
/// ```
/// use simd_dispatch::VectorValue;
///
/// let one = VectorValue::from_f32x4([1.0; 4]);
/// assert_eq!(one.to_u32x4(), [0x3f80_0000; 4]);
/// ```
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash)]
#[repr(C, align(16))]
pub struct VectorValue {
    bytes: [u8; 16],
}

impl VectorValue {
    /// All bits cleared.
    pub const ZERO: Self = Self { bytes: [0; 16] };

    /// Wraps raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.bytes
    }

    /// Borrows the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    /// Mutably borrows the raw bytes.
    pub const fn as_bytes_mut(&mut self) -> &mut [u8; 16] {
        &mut self.bytes
    }

    /// Builds a value from four 32-bit lane bit patterns.
    #[must_use]
    pub fn from_u32x4(lanes: [u32; 4]) -> Self {
        let mut bytes = [0u8; 16];
        for (dst, lane) in bytes.chunks_exact_mut(4).zip(lanes) {
            dst.copy_from_slice(&lane.to_ne_bytes());
        }
        Self { bytes }
    }

    /// Reads the four 32-bit lane bit patterns.
    #[must_use]
    pub fn to_u32x4(self) -> [u32; 4] {
        let (lanes, _) = self.bytes.as_chunks::<4>();
        std::array::from_fn(|i| u32::from_ne_bytes(lanes[i]))
    }

    /// Builds a value from four single-precision lanes.
    #[must_use]
    pub fn from_f32x4(lanes: [f32; 4]) -> Self {
        Self::from_u32x4(lanes.map(f32::to_bits))
    }

    /// Reinterprets the value as four single-precision lanes.
    #[must_use]
    pub fn to_f32x4(self) -> [f32; 4] {
        self.to_u32x4().map(f32::from_bits)
    }

    /// Builds a value from four signed 32-bit lanes.
    #[must_use]
    pub fn from_i32x4(lanes: [i32; 4]) -> Self {
        Self::from_u32x4(lanes.map(i32::cast_unsigned))
    }

    /// Reinterprets the value as four signed 32-bit lanes.
    #[must_use]
    pub fn to_i32x4(self) -> [i32; 4] {
        self.to_u32x4().map(u32::cast_signed)
    }
}

impl From<[f32; 4]> for VectorValue {
    fn from(lanes: [f32; 4]) -> Self {
        Self::from_f32x4(lanes)
    }
}

impl From<[i32; 4]> for VectorValue {
    fn from(lanes: [i32; 4]) -> Self {
        Self::from_i32x4(lanes)
    }
}

impl fmt::Debug for VectorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.to_u32x4();
        write!(
            f,
            "VectorValue([{a:#010x}, {b:#010x}, {c:#010x}, {d:#010x}])"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_and_int_views_share_bits() {
        let value = VectorValue::from_f32x4([1.0, -0.0, 2.5, f32::INFINITY]);
        assert_eq!(
            value.to_i32x4(),
            [0x3f80_0000, i32::MIN, 0x4020_0000, 0x7f80_0000]
        );
        assert_eq!(VectorValue::from_i32x4(value.to_i32x4()), value);
    }

    #[test]
    fn lane_zero_is_lowest_address() {
        let value = VectorValue::from_u32x4([0x0403_0201, 0, 0, 0x1111_1111]);
        assert_eq!(&value.as_bytes()[..4], &0x0403_0201u32.to_ne_bytes());
        assert_eq!(&value.as_bytes()[12..], &[0x11; 4]);
    }

    #[test]
    fn equality_is_bitwise() {
        assert_ne!(
            VectorValue::from_f32x4([0.0; 4]),
            VectorValue::from_f32x4([-0.0; 4])
        );
        let nan = VectorValue::from_f32x4([f32::NAN; 4]);
        assert_eq!(nan, nan);
    }

    #[test]
    fn storage_is_sixteen_aligned() {
        assert_eq!(std::mem::size_of::<VectorValue>(), 16);
        assert_eq!(std::mem::align_of::<VectorValue>(), 16);
    }

    #[test]
    fn debug_prints_lanes_in_hex() {
        let text = format!("{:?}", VectorValue::from_u32x4([1, 2, 3, 0xdead_beef]));
        assert_eq!(
            text,
            "VectorValue([0x00000001, 0x00000002, 0x00000003, 0xdeadbeef])"
        );
    }
}
