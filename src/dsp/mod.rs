//! # DSP (Digital Signal Processing) Primitives
//!
//! - **`delay_line`**: A constant-length FIFO ring that hands back the
//!   sample pushed exactly `N` steps ago. This is the memory behind the
//!   echo.

pub mod delay_line;
