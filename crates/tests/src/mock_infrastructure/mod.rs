//! Mock infrastructure for the gateway's integration tests.
//!
//! - [`UpstreamMock`]: one mockito server standing in for the full node (`/rpc`), the block
//!   indexer (`/api/`), `BitDB` (`/bitdb/`) and the SDK backend (`/v2/`)
//! - [`fakes`]: in-process SDK capabilities for tests that should not touch HTTP
//! - [`test_helpers`]: config and router construction, request helpers
//!
//! ```ignore
//! let mut upstream = UpstreamMock::new().await;
//! upstream.mock_block(&hash, block_fixture(&hash, 100)).await;
//!
//! let app = test_app(test_state(&upstream.config()));
//! let (status, body) = get(&app, &format!("/block/detailsByHash/{hash}")).await;
//! ```

pub mod fakes;
pub mod test_helpers;

pub use fakes::{FakeAddressCodec, FakeSlpValidator, FakeTokenLedger};
pub use test_helpers::*;
pub use upstream_mock::{block_fixture, genesis_fixture, UpstreamMock};
