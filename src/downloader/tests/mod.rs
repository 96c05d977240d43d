use super::test_helpers::{FakeFetcher, create_test_downloader};
use super::*;
use crate::types::Stage;
