pub mod runtime;
pub mod strategies;
pub mod strategy;

pub mod prelude {
    pub use super::runtime::*;
    pub use super::strategy::*;
}
