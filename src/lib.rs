//! Incremental Metal rendering tutorials for macOS.
//!
//! Each checkpoint takes the previous one a step further, from opening
//! a bare window to spinning a textured quad with multisampling and
//! depth testing. The active checkpoint is the compile-time constant
//! [`app::STAGE`].
//!
//! # Example
//! ```no_run
//! use metal_tutorial::app::App;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     App::run()
//! }
//! ```

pub mod app;
pub mod core;
pub mod math;
pub mod renderer;
