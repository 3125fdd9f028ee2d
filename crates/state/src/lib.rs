#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod account;
pub use account::TrieAccount;

mod provider;
pub use provider::{MemoryStateProvider, StateProvider};

mod journal;
pub use journal::Snapshot;

mod commit;
pub use commit::{StateCommit, StateWitness};

mod state;
pub use state::State;

mod errors;
pub use errors::{StateError, StateResult};
