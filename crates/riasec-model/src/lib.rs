pub mod interest;
pub mod combination;
pub mod occupation;
pub mod table;
pub mod dedupe;
pub mod merge;
pub mod stage;
pub mod title;

pub use interest::*;
pub use combination::*;
pub use occupation::*;
pub use table::*;
pub use stage::*;
pub use title::*;
