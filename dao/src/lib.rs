//! The guild DAO.
//!
//! Ties the share ledger and the governance engine together behind the
//! externally callable surface: initialization, propose / sponsor / vote /
//! process, the ERC20-style ledger operations, signed (off-chain) votes,
//! delegations and permits, and the extension entry point.
//!
//! Every entry point is one logical transaction: it either completes or
//! leaves no trace. Passed proposals are executed inside the same
//! transaction as `process_proposal`, including calls into external
//! contracts deployed on the [`Host`]. `vote`, `process_proposal` and
//! `call_extension` share one reentrancy guard.

pub mod config;
pub mod dao;
pub mod error;
pub mod events;
pub mod execution;
pub mod guard;
pub mod host;
pub mod signatures;
pub mod token;

pub use config::{DaoConfig, ExtensionSetup, MemberAllocation};
pub use dao::Dao;
pub use error::DaoError;
pub use events::DaoEvent;
pub use guard::{GuardToken, ReentrancyGuard};
pub use host::{CallContext, Contract, ContractError, ExtensionOutcome, Host};
pub use signatures::{
    DelegationMessage, PermitMessage, SignatureVerifier, SignedMessage, SignedPayload,
    VoteMessage,
};

pub use guild_governance::{
    GovernanceSettings, Proposal, ProposalAction, ProposalCategory, ProposalDraft,
    ProposalStatus, VoteType,
};
