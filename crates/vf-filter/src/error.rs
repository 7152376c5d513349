use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("array dimensions {size_x}x{size_y} do not match buffer length {len}")]
    DimensionMismatch {
        size_x: usize,
        size_y: usize,
        len: usize,
    },
    #[error("polynomial order {order} exceeds the supported maximum of {max}")]
    OrderTooHigh { order: usize, max: usize },
    #[error("shift {shift} is not smaller than array length {len}")]
    ShiftTooLarge { shift: usize, len: usize },
    #[error("normal equations for polynomial fit are singular")]
    SingularSystem,
}

pub type Result<T> = std::result::Result<T, FilterError>;
