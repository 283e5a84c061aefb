mod blog;
mod carousel;
mod class;
mod santri;
mod schedule;

pub use blog::*;
pub use carousel::*;
pub use class::*;
pub use santri::*;
pub use schedule::*;
