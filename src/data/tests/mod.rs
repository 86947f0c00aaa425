use beacon_test_utils::prelude::*;

use crate::{
    data::StarSystemStore,
    model::payload::Decoded,
    util::test::{mock::mock_star_system, setup::test_store},
};
