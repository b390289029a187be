/// Element type of an [`NDArray`](crate::array::NDArray).
///
/// Features are one of the four float types and graph indices one of the two
/// signed integer types. Arrays may hold the remaining types, but no kernel is
/// instantiated for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DType {
    BF16,
    F16,
    F32,
    F64,
    BOOL,
    U8,
    U32,
    I32,
    I64,
}

impl DType {
    pub const FLOATS: [DType; 4] = [DType::BF16, DType::F16, DType::F32, DType::F64];
    pub const INDICES: [DType; 2] = [DType::I32, DType::I64];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BF16 => "bf16",
            Self::F16 => "f16",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::BOOL => "bool",
            Self::U8 => "u8",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::I64 => "i64",
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        match self {
            Self::BOOL | Self::U8 => 1,
            Self::BF16 | Self::F16 => 2,
            Self::F32 | Self::U32 | Self::I32 => 4,
            Self::F64 | Self::I64 => 8,
        }
    }

    /// Signed integer types usable as graph indices and argmin/argmax records.
    pub fn is_index(&self) -> bool {
        Self::INDICES.contains(self)
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
