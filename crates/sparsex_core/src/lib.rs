pub mod array;
pub mod bcast;
pub mod buffer;
pub mod device;
pub mod dtype;
pub mod error;
pub mod layout;
pub mod op;
pub mod scalar;

pub use half::{bf16, f16};

/// Runs `$body` with `$I` bound to the Rust index type matching `$dtype`.
///
/// The body must evaluate to a `Result`; non-index dtypes produce `InvalidArgument`.
#[macro_export]
macro_rules! id_type_switch {
    ($dtype:expr, $I:ident => $body:block) => {
        match $dtype {
            $crate::dtype::DType::I32 => {
                #[allow(dead_code)]
                type $I = i32;
                $body
            },
            $crate::dtype::DType::I64 => {
                #[allow(dead_code)]
                type $I = i64;
                $body
            },
            other => Err($crate::error::Error::InvalidArgument(format!(
                "expected an index dtype (i32 or i64), got {}",
                other
            ))),
        }
    };
}
