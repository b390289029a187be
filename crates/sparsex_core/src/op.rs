use crate::error::{Error, Result};
use std::{fmt, str::FromStr};

/// Per-edge combine operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Inner product over the last feature dimension.
    Dot,
    /// `copy_u` in SpMM, `copy_lhs` in SDDMM.
    CopyLhs,
    /// `copy_e` in SpMM, `copy_rhs` in SDDMM.
    CopyRhs,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Dot => "dot",
            Self::CopyLhs => "copy_lhs",
            Self::CopyRhs => "copy_rhs",
        }
    }

    pub fn uses_lhs(&self) -> bool {
        !matches!(self, Self::CopyRhs)
    }

    pub fn uses_rhs(&self) -> bool {
        !matches!(self, Self::CopyLhs)
    }
}

impl FromStr for BinaryOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(Self::Add),
            "sub" => Ok(Self::Sub),
            "mul" => Ok(Self::Mul),
            "div" => Ok(Self::Div),
            "dot" => Ok(Self::Dot),
            "copy_u" | "copy_lhs" => Ok(Self::CopyLhs),
            "copy_e" | "copy_rhs" => Ok(Self::CopyRhs),
            _ => Err(Error::InvalidArgument(format!("unknown binary operator '{}'", s))),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-destination (or per-segment) reduce operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReduceOp {
    Sum,
    Max,
    Min,
    Mean,
}

impl ReduceOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Max => "max",
            Self::Min => "min",
            Self::Mean => "mean",
        }
    }

    /// Max and min record which input won each output position.
    pub fn is_cmp(&self) -> bool {
        matches!(self, Self::Max | Self::Min)
    }
}

impl FromStr for ReduceOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sum" => Ok(Self::Sum),
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            "mean" => Ok(Self::Mean),
            _ => Err(Error::InvalidArgument(format!("unknown reduce operator '{}'", s))),
        }
    }
}

impl fmt::Display for ReduceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which structural entity an SDDMM operand is indexed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Target {
    Src = 0,
    Edge = 1,
    Dst = 2,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Src => "source",
            Self::Edge => "edge",
            Self::Dst => "destination",
        }
    }
}

impl TryFrom<i32> for Target {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::Src),
            1 => Ok(Self::Edge),
            2 => Ok(Self::Dst),
            _ => Err(Error::InvalidArgument(format!("unknown target code {}", value))),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
