mod index;
mod init;
mod merge;
mod verify;

pub use index::*;
pub use init::*;
pub use merge::*;
pub use verify::*;
