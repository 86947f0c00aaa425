use std::sync::Arc;

use beacon_test_utils::prelude::*;
use chrono::{Duration, TimeZone, Utc};

use crate::{
    service::provider::ResolveOptions,
    util::test::{
        fetcher::{MockAuthority, MockFetcher},
        mock::{mock_incomplete_star_system, mock_star_system},
        setup::test_provider,
    },
};

mod resolve;
