pub mod mode;
pub mod op;
pub mod reg;
pub mod word;

pub use mode::{Are, Mode};
pub use op::OpKind;
pub use reg::Reg;
pub use word::Word;
