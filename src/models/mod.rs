pub mod chat;
pub mod enums;
pub mod evaluation;
pub mod lenient;
pub mod tender;

pub use chat::*;
pub use enums::*;
pub use evaluation::*;
pub use tender::*;
