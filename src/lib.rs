mod comparable;
mod condition;
mod date;
mod matcher;
mod operator;
mod options;
mod outcome;
mod properties;
mod property_value;
mod test_common;
mod util;

pub use comparable::*;
pub use condition::*;
pub use matcher::*;
pub use operator::*;
pub use options::*;
pub use outcome::*;
pub use properties::*;
pub use property_value::*;
