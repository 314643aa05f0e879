pub mod length;
pub mod mass;
pub mod mass_rate;
pub mod time;
pub mod velocity;

#[cfg(test)]
mod time_test;

pub use length::Length;
pub use mass::{AMU_KG, Mass};
pub use mass_rate::MassRate;
pub use time::Time;
pub use velocity::Velocity;
