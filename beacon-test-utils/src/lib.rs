pub mod builder;
pub mod error;
pub mod fixtures;
pub mod setup;

pub use builder::TestBuilder;
pub use error::TestError;
pub use fixtures::starsystem::{payload_json, StarsystemRow};
pub use setup::TestSetup;

pub mod prelude {
    pub use crate::{
        fixtures::starsystem::{payload_json, StarsystemRow},
        test_setup_with_schema, TestBuilder, TestError, TestSetup,
    };
}
